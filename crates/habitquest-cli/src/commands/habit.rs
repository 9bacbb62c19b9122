use clap::Subcommand;
use habitquest_core::{EntityId, EntityKind, Habit};

use super::{print_json, report, runtime, App, CliResult};

#[derive(Subcommand)]
pub enum HabitAction {
    /// List today's habits
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a habit done
    Complete {
        /// Habit ID
        id: EntityId,
    },
}

pub fn run(action: HabitAction) -> CliResult {
    let app = App::open()?;
    let rt = runtime()?;
    match action {
        HabitAction::List { json } => rt.block_on(list(&app, json)),
        HabitAction::Complete { id } => rt.block_on(complete(&app, id)),
    }
}

async fn list(app: &App, json: bool) -> CliResult {
    app.orchestrator.reconciler().load_entities().await?;
    let habits: Vec<Habit> = app.orchestrator.reconciler().cache().habits().cloned().collect();
    if json {
        return print_json(&habits);
    }
    if habits.is_empty() {
        println!("no habits");
    }
    for h in &habits {
        println!(
            "[{}] #{} {} ({:?}, streak {})",
            if h.state.is_completed() { "x" } else { " " },
            h.id,
            h.title,
            h.difficulty,
            h.current_streak,
        );
    }
    Ok(())
}

async fn complete(app: &App, id: EntityId) -> CliResult {
    app.orchestrator.load().await?;
    let outcome = app.orchestrator.complete(id, EntityKind::Habit).await?;
    report(&outcome)
}
