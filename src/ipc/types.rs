use serde::Deserialize;

use crate::session::{AttemptSession, ReviewSession};

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Everything the daemon holds between requests: at most one open
/// attempt and one open review. Opening again replaces the previous
/// one, mirroring a page navigation.
pub struct AppState {
    pub session: Option<AttemptSession>,
    pub review: Option<ReviewSession>,
}
