use clap::Subcommand;
use habitquest_core::storage::credentials;

use super::{App, CliResult};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Store the backend access token in the OS keyring
    SetToken {
        /// Access token issued by the backend at login
        token: String,
    },
    /// Remove the stored access token
    Clear,
    /// Check whether a token is available
    Status,
}

pub fn run(action: AuthAction) -> CliResult {
    match action {
        AuthAction::SetToken { token } => {
            let token = token.trim();
            if token.is_empty() {
                return Err("token must not be empty".into());
            }
            credentials::set_access_token(token)?;
            println!("token stored");
        }
        AuthAction::Clear => {
            credentials::clear_access_token()?;
            println!("token cleared");
        }
        AuthAction::Status => {
            println!(
                "{}",
                if credentials::access_token()?.is_some() {
                    "authenticated"
                } else {
                    "not authenticated"
                }
            );
        }
    }
    Ok(())
}

/// Drop the token and everything cached for the current user.
pub fn logout() -> CliResult {
    let app = App::open()?;
    app.orchestrator.logout();
    credentials::clear_access_token()?;
    println!("logged out");
    Ok(())
}
