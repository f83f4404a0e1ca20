//! confsync-provider-google - Google Calendar provider for confsync
//!
//! This binary implements the confsync provider protocol, communicating
//! with confsync via JSON over stdin/stdout. Logs go to stderr.
//!
//! The provider manages its own credentials and tokens:
//!   ~/.config/confsync/providers/google/app_config.toml
//!   ~/.config/confsync/providers/google/session/{account}.toml

mod app_config;
mod commands;
mod google_event;
mod remote_config;
mod session;

use std::future::Future;
use std::io::{self, BufRead, Write};

use confsync_core::remote::protocol::{Command, ErrorCode, Request, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use crate::commands::delete_event::EventNotFound;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => handle_request(request).await,
            Err(e) => Response::error(&format!("Failed to parse request: {}", e)),
        };

        if writeln!(stdout, "{}", response)
            .and_then(|_| stdout.flush())
            .is_err()
        {
            break;
        }
    }
}

async fn handle_request(request: Request) -> String {
    debug!(command = ?request.command, "Handling request");

    match request.command {
        Command::AuthInit => dispatch(request.params, commands::auth_init::handle).await,
        Command::AuthSubmit => dispatch(request.params, commands::auth_submit::handle).await,
        Command::ListEvents => dispatch(request.params, commands::list_events::handle).await,
        Command::CreateEvent => dispatch(request.params, commands::create_event::handle).await,
        Command::DeleteEvent => dispatch(request.params, commands::delete_event::handle).await,
    }
}

/// Decode the params into the command type, run the handler and encode the result.
async fn dispatch<C, R, F, Fut>(params: serde_json::Value, handler: F) -> String
where
    C: DeserializeOwned,
    R: Serialize,
    F: FnOnce(C) -> Fut,
    Fut: Future<Output = anyhow::Result<R>>,
{
    let cmd: C = match serde_json::from_value(params) {
        Ok(cmd) => cmd,
        Err(e) => return Response::error(&format!("Invalid params: {}", e)),
    };

    match handler(cmd).await {
        Ok(data) => Response::success(data),
        Err(e) => error_response(&e),
    }
}

fn error_response(e: &anyhow::Error) -> String {
    error!("{:#}", e);

    if e.downcast_ref::<EventNotFound>().is_some() {
        Response::error_with_code(&format!("{:#}", e), ErrorCode::NotFound)
    } else {
        Response::error(&format!("{:#}", e))
    }
}
