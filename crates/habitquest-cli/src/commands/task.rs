use clap::Subcommand;
use habitquest_core::{EntityId, EntityKind, Task};

use super::{print_json, report, runtime, App, CliResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// List tasks with their subtasks
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a task (and all its subtasks) done
    Complete {
        /// Task ID
        id: EntityId,
    },
}

pub fn run(action: TaskAction) -> CliResult {
    let app = App::open()?;
    let rt = runtime()?;
    match action {
        TaskAction::List { json } => rt.block_on(list(&app, json)),
        TaskAction::Complete { id } => rt.block_on(complete(&app, id)),
    }
}

fn mark(done: bool) -> &'static str {
    if done {
        "x"
    } else {
        " "
    }
}

async fn list(app: &App, json: bool) -> CliResult {
    app.orchestrator.reconciler().load_entities().await?;
    let tasks: Vec<Task> = app.orchestrator.reconciler().cache().tasks().cloned().collect();
    if json {
        return print_json(&tasks);
    }
    if tasks.is_empty() {
        println!("no tasks");
    }
    for t in &tasks {
        println!(
            "[{}] #{} {} ({:?})",
            mark(t.state.is_completed()),
            t.id,
            t.title,
            t.difficulty
        );
        for s in &t.subtasks {
            println!("    [{}] #{} {}", mark(s.state.is_completed()), s.id, s.description);
        }
    }
    Ok(())
}

async fn complete(app: &App, id: EntityId) -> CliResult {
    app.orchestrator.load().await?;
    let outcome = app.orchestrator.complete(id, EntityKind::Task).await?;
    report(&outcome)
}
