//! Anonymous session identity for a single upload-to-match cycle.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const SESSION_PREFIX: &str = "session_";

/// Opaque per-run key linking a candidate's profile and match queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps an identifier minted elsewhere (e.g. one typed on the command line).
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Mints a new session id: `session_<unix millis>_<8 hex chars>`.
///
/// The millisecond clock alone collides when two runs start inside the same
/// millisecond, so a random fragment is appended.
pub fn new_session_id() -> SessionId {
    let millis = Utc::now().timestamp_millis();
    let entropy = Uuid::new_v4().simple().to_string();
    SessionId(format!("{SESSION_PREFIX}{millis}_{}", &entropy[..8]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_session_id_shape() {
        let id = new_session_id();
        let rest = id.as_str().strip_prefix(SESSION_PREFIX).unwrap();
        let (millis, fragment) = rest.split_once('_').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(fragment.len(), 8);
        assert!(fragment.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_session_ids_unique_within_a_run() {
        let ids: HashSet<SessionId> = (0..1000).map(|_| new_session_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_session_id_serializes_as_plain_string() {
        let id = SessionId::from_raw("session_1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"session_1\"");
    }
}
