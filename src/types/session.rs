use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

const SESSION_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A client-generated conversation scope.
///
/// Sessions are created once and never mutated.  Clearing the conversation
/// replaces the session with a fresh one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session identifier.
    pub id: String,

    /// When the session was created.
    #[serde(with = "crate::utils::time")]
    pub created_at: OffsetDateTime,
}

impl Session {
    /// Allocate a new session with a freshly generated id.
    ///
    /// Ids look like `session_1717171717171_k3j9x0a2b`: creation time in unix
    /// milliseconds followed by nine random base36 characters.
    pub fn generate() -> Self {
        let created_at = crate::utils::time::now();
        let millis = created_at.unix_timestamp_nanos() / 1_000_000;
        let mut rng = rand::thread_rng();
        let suffix: String = (0..SESSION_SUFFIX_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        Self {
            id: format!("session_{millis}_{suffix}"),
            created_at,
        }
    }

    /// Reopen a session whose id is already known.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: crate::utils::time::now(),
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_have_expected_shape() {
        let session = Session::generate();
        let parts: Vec<&str> = session.id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "session");
        assert!(parts[1].parse::<u128>().is_ok());
        assert_eq!(parts[2].len(), SESSION_SUFFIX_LEN);
        assert!(
            parts[2]
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
    }

    #[test]
    fn generated_ids_differ() {
        let a = Session::generate();
        let b = Session::generate();
        assert_ne!(a.id, b.id);
    }
}
