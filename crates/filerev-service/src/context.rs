//! Request context identifying the acting user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use filerev_core::types::UserId;

/// Context for the current request.
///
/// Built by the caller (authentication and authorization have already
/// happened upstream) and passed into service methods so every recorded
/// version knows *who* acted and *when*.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting user's ID.
    pub actor_id: UserId,
    /// The acting user's display name, denormalized into version records.
    pub actor_name: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context stamped with the current time.
    pub fn new(actor_id: UserId, actor_name: impl Into<String>) -> Self {
        Self {
            actor_id,
            actor_name: actor_name.into(),
            request_time: Utc::now(),
        }
    }
}
