use std::time::Duration;

use clap::Subcommand;
use habitquest_core::{Config, Event, SessionClock, SessionConfig, SessionPhase};

use super::{print_json, report, runtime, App, CliResult};

/// Poll faster than the 1 s tick so the countdown never visibly skips.
const POLL_INTERVAL_MS: u64 = 200;

#[derive(Subcommand)]
pub enum FocusAction {
    /// Run a focus session in the foreground (Ctrl-C cancels)
    Run {
        /// Work minutes (defaults to focus.work_minutes)
        #[arg(long)]
        work: Option<u32>,
        /// Break minutes (defaults to focus.break_minutes)
        #[arg(long = "break")]
        break_minutes: Option<u32>,
        /// Number of work intervals (defaults to focus.repeat_count)
        #[arg(long)]
        repeat: Option<u32>,
        /// Print every event as JSON instead of a countdown
        #[arg(long)]
        json: bool,
    },
    /// Print the configured default session as JSON
    Show,
}

pub fn run(action: FocusAction) -> CliResult {
    match action {
        FocusAction::Run {
            work,
            break_minutes,
            repeat,
            json,
        } => {
            let app = App::open()?;
            let focus = &app.config.focus;
            let config = SessionConfig::from_minutes(
                work.unwrap_or(focus.work_minutes),
                break_minutes.unwrap_or(focus.break_minutes),
                repeat.unwrap_or(focus.repeat_count),
            );
            runtime()?.block_on(run_session(&app, config, json))
        }
        FocusAction::Show => print_json(&Config::load()?.focus_config()?),
    }
}

async fn run_session(app: &App, config: SessionConfig, json: bool) -> CliResult {
    // Baseline for the XP delta; a stale cached copy is better than none.
    if let Err(e) = app.orchestrator.refresh_dashboard().await {
        tracing::warn!(error = %e, "could not refresh dashboard before focus session");
    }

    let mut clock = SessionClock::default();
    emit(&clock.configure(config)?, json)?;
    emit(&clock.start()?, json)?;

    let mut ticker = tokio::time::interval(Duration::from_millis(POLL_INTERVAL_MS));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let events = clock.poll();
                for event in &events {
                    emit(event, json)?;
                }
                if let Some(outcome) = app.orchestrator.handle_clock_events(&events).await {
                    report(&outcome)?;
                }
                if clock.phase().is_terminal() {
                    break;
                }
                if !json {
                    eprint!(
                        "\r{} {} ({}/{})   ",
                        label(clock.phase()),
                        clock.formatted_remaining(),
                        clock.current_iteration(),
                        clock.config().repeat_count,
                    );
                }
            }
            _ = &mut ctrl_c => {
                if let Some(event) = clock.close() {
                    emit(&event, json)?;
                }
                break;
            }
        }
    }
    Ok(())
}

fn emit(event: &Event, json: bool) -> CliResult {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }
    match event {
        Event::SessionFinished { completion, .. } => eprintln!(
            "\rsession finished: {} x {} min",
            completion.sessions_completed, completion.duration_minutes
        ),
        Event::SessionCancelled { .. } => eprintln!("\rsession cancelled"),
        Event::PhaseChanged { to, .. } => eprintln!("\r{}", label(*to)),
        _ => {}
    }
    Ok(())
}

fn label(phase: SessionPhase) -> &'static str {
    match phase {
        SessionPhase::Idle => "idle",
        SessionPhase::Configuring => "configuring",
        SessionPhase::RunningWork => "work",
        SessionPhase::RunningBreak => "break",
        SessionPhase::Paused => "paused",
        SessionPhase::Finished => "finished",
        SessionPhase::Cancelled => "cancelled",
    }
}
