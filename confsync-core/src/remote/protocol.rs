//! Defines the JSON protocol used for communication between confsync
//! and provider binaries over stdin/stdout.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::event::{Event, RemoteEvent, RemoteId};

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    AuthInit,
    AuthSubmit,
    ListEvents,
    CreateEvent,
    DeleteEvent,
}

/// Request sent from confsync to a provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Machine-readable error class, for errors the caller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The addressed event does not exist (anymore).
    NotFound,
}

/// Response sent from a provider back to confsync.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success {
        data: T,
    },
    Error {
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<ErrorCode>,
    },
}

impl<T: Serialize> Response<T> {
    pub fn success(data: T) -> String {
        match serde_json::to_string(&Response::Success { data }) {
            Ok(json) => json,
            Err(e) => Response::<()>::error(&format!("Failed to serialize response: {e}")),
        }
    }
}

impl Response<()> {
    pub fn error(msg: &str) -> String {
        serde_json::json!({ "status": "error", "error": msg }).to_string()
    }

    pub fn error_with_code(msg: &str, code: ErrorCode) -> String {
        serde_json::json!({ "status": "error", "error": msg, "code": code }).to_string()
    }
}

// ============================================================================
// Auth
// ============================================================================

/// Start an OAuth flow. The caller listens on `redirect_uri`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthInit {
    pub redirect_uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthData {
    pub authorization_url: String,
    pub state: String,
    pub scopes: Vec<String>,
}

impl ProviderCommand for AuthInit {
    type Response = OAuthData;
    fn command() -> Command {
        Command::AuthInit
    }
}

/// Exchange the authorization code received on the redirect.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthSubmit {
    pub code: String,
    pub state: String,
    pub redirect_uri: String,
}

impl ProviderCommand for AuthSubmit {
    type Response = String; // Account identifier (e.g., email)
    fn command() -> Command {
        Command::AuthSubmit
    }
}

// ============================================================================
// Events
// ============================================================================

/// List events that have not yet concluded at `from`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListEvents {
    /// Provider-specific config (e.g., google_account, google_calendar_id)
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    /// RFC 3339 timestamp
    pub from: String,
}

impl ProviderCommand for ListEvents {
    type Response = Vec<RemoteEvent>;
    fn command() -> Command {
        Command::ListEvents
    }
}

/// Create a new event. The provider assigns the id.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateEvent {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub event: Event,
}

impl ProviderCommand for CreateEvent {
    type Response = RemoteEvent;
    fn command() -> Command {
        Command::CreateEvent
    }
}

/// Delete an event by id.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteEvent {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub event_id: RemoteId,
}

impl ProviderCommand for DeleteEvent {
    type Response = ();
    fn command() -> Command {
        Command::DeleteEvent
    }
}
