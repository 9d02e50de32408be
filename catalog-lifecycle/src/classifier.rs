//! Conflict classification for refused deletes.
//!
//! The catalog service does not report "still referenced" with a dedicated
//! status. It answers with a generic 400/409, sometimes a 500, and a message
//! that may or may not mention the dependent records. Classification is
//! therefore a heuristic, kept behind the [`ConflictClassifier`] trait so the
//! rules can be tightened without touching the delete state machine.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::transport::ServiceResponse;

/// Body fields searched for a message, in order.
const MESSAGE_FIELDS: [&str; 4] = ["message", "title", "detail", "error"];

/// Verdict for one failed delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The entity is still referenced by other records.
    Conflict { message: Option<String> },
    /// Anything else. The message is surfaced to the caller.
    UnknownFailure { message: Option<String> },
}

impl Classification {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Classification::Conflict { .. })
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Classification::Conflict { message } | Classification::UnknownFailure { message } => {
                message.as_deref()
            }
        }
    }
}

/// Decides whether a failed delete means "still referenced elsewhere".
///
/// Called only for non-2xx, non-404 responses to a `DELETE`.
pub trait ConflictClassifier: Send + Sync {
    fn classify(&self, response: &ServiceResponse) -> Classification;
}

/// Rules used by [`HeuristicClassifier`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictPolicy {
    /// Statuses that signal a conflict on their own.
    pub conflict_statuses: Vec<u16>,
    /// Treat `500` as a conflict signal.
    ///
    /// The service reports some referential failures as internal errors, so
    /// this is on by default. It also turns genuine server faults into
    /// "still referenced"; [`ConflictPolicy::strict`] turns it off.
    pub server_error_is_conflict: bool,
    /// Case-insensitive substrings that mark a conflict message regardless
    /// of status.
    pub marker_tokens: Vec<String>,
}

impl Default for ConflictPolicy {
    fn default() -> Self {
        Self {
            conflict_statuses: vec![400, 409],
            server_error_is_conflict: true,
            marker_tokens: ["linked", "product", "vinculad", "produto"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl ConflictPolicy {
    /// Default rules without the `500` fallback.
    pub fn strict() -> Self {
        Self {
            server_error_is_conflict: false,
            ..Self::default()
        }
    }

    pub fn status_signals_conflict(&self, status: u16) -> bool {
        self.conflict_statuses.contains(&status)
            || (status == 500 && self.server_error_is_conflict)
    }

    pub fn message_signals_conflict(&self, message: &str) -> bool {
        let message = message.to_lowercase();
        self.marker_tokens
            .iter()
            .filter(|token| !token.is_empty())
            .any(|token| message.contains(&token.to_lowercase()))
    }
}

/// Status and message-marker heuristic driven by a [`ConflictPolicy`].
#[derive(Debug, Clone, Default)]
pub struct HeuristicClassifier {
    policy: ConflictPolicy,
}

impl HeuristicClassifier {
    pub fn new(policy: ConflictPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ConflictPolicy {
        &self.policy
    }
}

impl ConflictClassifier for HeuristicClassifier {
    fn classify(&self, response: &ServiceResponse) -> Classification {
        let message = extract_message(response.body.as_deref());

        let by_status = self.policy.status_signals_conflict(response.status);
        let by_marker = message
            .as_deref()
            .is_some_and(|m| self.policy.message_signals_conflict(m));

        debug!(
            "Classified status {} (status rule: {}, marker rule: {})",
            response.status, by_status, by_marker
        );

        if by_status || by_marker {
            Classification::Conflict { message }
        } else {
            Classification::UnknownFailure { message }
        }
    }
}

/// Pulls a human-readable message out of an error body.
///
/// JSON objects are searched for `message`, `title`, `detail` and `error` in
/// that order; a JSON string is used as-is; anything else falls back to the
/// trimmed raw text. Blank results are `None`.
pub fn extract_message(body: Option<&str>) -> Option<String> {
    let raw = body?.trim();
    if raw.is_empty() {
        return None;
    }

    let from_json = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(fields)) => MESSAGE_FIELDS
            .iter()
            .filter_map(|key| fields.get(*key).and_then(|v| v.as_str()))
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(String::from),
        Ok(serde_json::Value::String(text)) => Some(text.trim().to_string()),
        _ => None,
    };

    from_json
        .or_else(|| Some(raw.to_string()))
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_prefers_message_over_later_fields() {
        let body = r#"{"error":"e","detail":"d","title":"t","message":"m"}"#;
        assert_eq!(extract_message(Some(body)).as_deref(), Some("m"));
    }

    #[test]
    fn extract_skips_blank_and_non_string_fields() {
        let body = r#"{"message":"  ","title":42,"detail":"useful"}"#;
        assert_eq!(extract_message(Some(body)).as_deref(), Some("useful"));
    }

    #[test]
    fn extract_falls_back_to_raw_text() {
        assert_eq!(
            extract_message(Some("  Erro interno ")).as_deref(),
            Some("Erro interno")
        );
    }

    #[test]
    fn extract_object_without_known_fields_uses_raw_json() {
        let body = r#"{"code":17}"#;
        assert_eq!(extract_message(Some(body)).as_deref(), Some(body));
    }

    #[test]
    fn extract_json_string_body() {
        assert_eq!(
            extract_message(Some(r#""category linked""#)).as_deref(),
            Some("category linked")
        );
    }

    #[test]
    fn extract_empty_bodies() {
        assert_eq!(extract_message(None), None);
        assert_eq!(extract_message(Some("   ")), None);
        assert_eq!(extract_message(Some(r#""""#)), None);
    }
}
