use clap::Subcommand;
use studyroom_core::api::{Goal, GoalPatch, NewGoal, MAX_GOALS_PER_SET};
use studyroom_core::{CoreError, Settings};

use super::{api_client, block_on, forget_on_unauthorized};

#[derive(Subcommand)]
pub enum GoalsAction {
    /// List goals, optionally for one session set
    List {
        /// Session set number (1-4)
        #[arg(long)]
        set: Option<u32>,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a goal to a session set
    Add {
        text: String,
        #[arg(long, default_value = "1")]
        set: u32,
    },
    /// Mark a goal completed
    Done { id: String },
    /// Mark a goal not completed
    Undone { id: String },
    /// Replace a goal's text
    Edit { id: String, text: String },
    /// Delete a goal
    Remove { id: String },
}

fn print_goals(goals: &[Goal], set: Option<u32>) {
    if let Some(set) = set {
        let completed = goals.iter().filter(|g| g.completed).count();
        println!(
            "Session {set}: {completed} of {} completed, {} slots free",
            goals.len(),
            MAX_GOALS_PER_SET.saturating_sub(goals.len())
        );
    }
    if goals.is_empty() {
        println!("no goals yet");
    }
    for goal in goals {
        let mark = if goal.completed { "x" } else { " " };
        println!("[{mark}] {}  {}  (set {})", goal.id, goal.text, goal.set_number);
    }
}

pub fn run(action: GoalsAction) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load_or_default();
    let client = api_client(&settings)?;
    if !client.has_token() {
        return Err("not logged in; run `studyroom auth login` first".into());
    }

    match action {
        GoalsAction::List { set, json } => {
            let goals = match set {
                Some(n) => forget_on_unauthorized(block_on(client.goals_by_set(n))?)?,
                None => forget_on_unauthorized(block_on(client.goals())?)?,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&goals)?);
            } else {
                print_goals(&goals, set);
            }
        }
        GoalsAction::Add { text, set } => {
            let goal = NewGoal::new(&text, set)?;
            let created = match block_on(client.create_goal(&goal))? {
                Err(CoreError::Api(e)) => forget_on_unauthorized(Err(e))?,
                other => other?,
            };
            println!("goal created: {}", created.id);
        }
        GoalsAction::Done { id } => {
            forget_on_unauthorized(block_on(client.update_goal(&id, &GoalPatch::completed(true)))?)?;
            println!("ok");
        }
        GoalsAction::Undone { id } => {
            forget_on_unauthorized(block_on(client.update_goal(&id, &GoalPatch::completed(false)))?)?;
            println!("ok");
        }
        GoalsAction::Edit { id, text } => {
            let patch = GoalPatch::text(&text)?;
            forget_on_unauthorized(block_on(client.update_goal(&id, &patch))?)?;
            println!("ok");
        }
        GoalsAction::Remove { id } => {
            forget_on_unauthorized(block_on(client.delete_goal(&id))?)?;
            println!("goal deleted");
        }
    }
    Ok(())
}
