pub mod auth;
pub mod config;
pub mod dashboard;
pub mod focus;
pub mod habit;
pub mod subtask;
pub mod task;

use std::error::Error;
use std::rc::Rc;

use habitquest_core::clock::SystemTimeSource;
use habitquest_core::storage::credentials;
use habitquest_core::{
    Config, Database, FeedbackSelector, HttpBackend, KvSnapshotPersistence, Orchestrator, Outcome,
    SnapshotStore,
};
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn Error>>;

/// Everything a command needs to talk to the backend.
pub struct App {
    pub config: Config,
    pub orchestrator: Orchestrator<HttpBackend>,
}

impl App {
    pub fn open() -> habitquest_core::error::Result<Self> {
        let config = Config::load()?;
        let token = credentials::access_token()?;
        if token.is_none() {
            tracing::warn!("no access token stored; run `habitquest auth set-token`");
        }
        let backend = HttpBackend::new(&config.backend.base_url, token, config.request_timeout())?;
        let store = SnapshotStore::open(KvSnapshotPersistence::new(Database::open()?));
        let feedback = FeedbackSelector::with_ttl(SystemTimeSource, config.feedback.ttl_ms);
        let orchestrator = Orchestrator::new(Rc::new(backend), Rc::new(store), feedback);
        Ok(Self {
            config,
            orchestrator,
        })
    }
}

/// Rc-based state cannot cross threads, so every command runs on one.
pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

pub fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Human line on stderr, JSON on stdout.
pub fn report(outcome: &Outcome) -> CliResult {
    match outcome {
        Outcome::Rewarded { notification, .. } => {
            eprintln!("[{}] {}", notification.mascot_key, notification.message_text)
        }
        Outcome::StillPending => eprintln!("an earlier request for this item is still pending"),
        Outcome::Discarded => eprintln!("item was removed before the server answered"),
        Outcome::Quiet => {}
    }
    print_json(outcome)
}
