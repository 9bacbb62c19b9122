use clap::Args;
use habitquest_core::DashboardSnapshot;

use super::{print_json, runtime, App, CliResult};

#[derive(Args)]
pub struct DashboardArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
    /// Show the cached snapshot without contacting the server
    #[arg(long)]
    offline: bool,
}

pub fn run(args: DashboardArgs) -> CliResult {
    let app = App::open()?;
    if !args.offline {
        if let Err(e) = runtime()?.block_on(app.orchestrator.refresh_dashboard()) {
            tracing::warn!(error = %e, "dashboard refresh failed; showing cached copy");
        }
    }

    let Some(snapshot) = app.orchestrator.snapshots().current() else {
        return Err("no dashboard data yet; check `habitquest auth set-token` and the backend".into());
    };
    if args.json {
        return print_json(&snapshot);
    }
    print_summary(&snapshot);
    Ok(())
}

fn print_summary(s: &DashboardSnapshot) {
    if !s.first_name.is_empty() {
        println!("Hi {}!", s.first_name);
    }
    println!("Level {}  ({} XP total)", s.level, s.total_xp);
    println!(
        "Progress {}/{} XP ({:.0}%)",
        s.current_level_xp,
        s.xp_for_next_level,
        s.progress_pct()
    );
    if let Some(motivation) = &s.motivation {
        println!("{motivation}");
    }
}
