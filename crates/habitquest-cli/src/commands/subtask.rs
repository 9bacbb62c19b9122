use clap::Subcommand;
use habitquest_core::EntityId;

use super::{print_json, runtime, App, CliResult};

#[derive(Subcommand)]
pub enum SubtaskAction {
    /// Flip a subtask between done and not done
    Toggle {
        /// Subtask ID
        id: EntityId,
    },
}

pub fn run(action: SubtaskAction) -> CliResult {
    let app = App::open()?;
    match action {
        SubtaskAction::Toggle { id } => runtime()?.block_on(toggle(&app, id)),
    }
}

async fn toggle(app: &App, id: EntityId) -> CliResult {
    app.orchestrator.reconciler().load_entities().await?;
    match app.orchestrator.toggle_subtask(id).await? {
        Some(event) => print_json(&event),
        None => {
            eprintln!("subtask #{id} did not settle; try again");
            Ok(())
        }
    }
}
