//! Provider subprocess client.
//!
//! Talks to external provider binaries (e.g. `confsync-provider-google`)
//! using JSON over stdin/stdout. Any executable that speaks the protocol
//! can be a provider. Each call spawns one process, sends one request line
//! and reads one response.
//!
//! Providers manage their own credentials and tokens. Core just passes
//! provider-specific parameters from the remote config.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;
use tracing::debug;

use crate::error::{SyncError, SyncResult};
use crate::remote::protocol::{
    AuthInit, AuthSubmit, Command, ErrorCode, OAuthData, ProviderCommand, Request, Response,
};

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);
/// Auth commands wait on the user in a browser.
const AUTH_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Provider(String);

impl Provider {
    pub fn from_name(name: &str) -> Self {
        Provider(name.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn binary_name(&self) -> String {
        format!("confsync-provider-{}", self.0)
    }

    fn binary_path(&self) -> SyncResult<PathBuf> {
        let binary_name = self.binary_name();
        which::which(&binary_name).map_err(|_| {
            SyncError::RemoteUnavailable(format!(
                "Provider '{}' not found. Install it with:\n  cargo install {}",
                self.0, binary_name
            ))
        })
    }

    /// Ask the provider where to send the user to authorize.
    pub async fn auth_init(&self, redirect_uri: &str) -> SyncResult<OAuthData> {
        self.call_with_timeout(
            AUTH_TIMEOUT,
            AuthInit {
                redirect_uri: redirect_uri.to_string(),
            },
        )
        .await
    }

    /// Hand the authorization code to the provider. Returns the account identifier.
    pub async fn auth_submit(
        &self,
        code: &str,
        state: &str,
        redirect_uri: &str,
    ) -> SyncResult<String> {
        self.call_with_timeout(
            AUTH_TIMEOUT,
            AuthSubmit {
                code: code.to_string(),
                state: state.to_string(),
                redirect_uri: redirect_uri.to_string(),
            },
        )
        .await
    }

    /// Call a typed provider command and return the result.
    ///
    /// The response type is inferred from the command's associated type.
    pub async fn call<C: ProviderCommand>(&self, cmd: C) -> SyncResult<C::Response> {
        self.call_with_timeout(PROVIDER_TIMEOUT, cmd).await
    }

    /// Like [`Provider::call`], but hands coded errors back to the caller,
    /// which knows what the code means for the command it sent.
    pub async fn call_coded<C: ProviderCommand>(
        &self,
        cmd: C,
    ) -> SyncResult<Result<C::Response, ErrorCode>> {
        timeout(PROVIDER_TIMEOUT, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| timed_out(PROVIDER_TIMEOUT))?
    }

    async fn call_with_timeout<C: ProviderCommand>(
        &self,
        limit: Duration,
        cmd: C,
    ) -> SyncResult<C::Response> {
        let response = timeout(limit, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| timed_out(limit))??;

        response.map_err(|code| {
            SyncError::RemoteUnavailable(format!("Provider reported error code {:?}", code))
        })
    }

    /// Low-level call that sends a command with params and deserializes the response.
    async fn call_raw<P: Serialize, R: serde::de::DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> SyncResult<Result<R, ErrorCode>> {
        let params =
            serde_json::to_value(params).map_err(|e| SyncError::Serialization(e.to_string()))?;
        let request = Request { command, params };
        let request_json =
            serde_json::to_string(&request).map_err(|e| SyncError::Serialization(e.to_string()))?;

        let binary_path = self.binary_path()?;
        debug!(provider = %self.0, ?command, "Calling provider");

        let mut child = TokioCommand::new(&binary_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                SyncError::RemoteUnavailable(format!(
                    "Failed to spawn {}: {}",
                    binary_path.display(),
                    e
                ))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| SyncError::RemoteUnavailable("Provider stdin unavailable".into()))?;
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await?;
        drop(stdin);

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(SyncError::RemoteUnavailable(format!(
                "Provider exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        let response_str = String::from_utf8_lossy(&output.stdout);
        if response_str.trim().is_empty() {
            return Err(SyncError::RemoteUnavailable(
                "Provider returned no response".into(),
            ));
        }

        parse_response(&response_str)
    }
}

fn timed_out(limit: Duration) -> SyncError {
    SyncError::RemoteUnavailable(format!(
        "Provider request timed out after {}s",
        limit.as_secs()
    ))
}

/// Uncoded provider errors are `RemoteUnavailable`; coded ones go back to the caller.
fn parse_response<R: serde::de::DeserializeOwned>(raw: &str) -> SyncResult<Result<R, ErrorCode>> {
    let response: Response<R> = serde_json::from_str(raw.trim()).map_err(|e| {
        SyncError::RemoteUnavailable(format!("Failed to parse provider response: {}", e))
    })?;

    match response {
        Response::Success { data } => Ok(Ok(data)),
        Response::Error {
            error,
            code: Some(code),
        } => {
            debug!(?code, %error, "Provider returned coded error");
            Ok(Err(code))
        }
        Response::Error { error, code: None } => Err(SyncError::RemoteUnavailable(error)),
    }
}
