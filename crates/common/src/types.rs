use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Identity of the account behind a connected session, reported by the
/// transport once authentication completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub phone_number: String,
    pub display_name: Option<String>,
}

/// Maximum accepted session id length.
pub const MAX_SESSION_ID_LEN: usize = 64;

/// Validate a caller-supplied session id.
///
/// Ids key filesystem paths in the credential store, so only a conservative
/// character set is accepted.
pub fn validate_session_id(id: &str) -> Result<(), Error> {
    if id.is_empty() {
        return Err(Error::Validation("session_id is required".into()));
    }
    if id.len() > MAX_SESSION_ID_LEN {
        return Err(Error::Validation(format!(
            "session_id exceeds {MAX_SESSION_ID_LEN} characters"
        )));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(Error::Validation(
            "session_id may only contain alphanumerics, '-', '_' and '.'".into(),
        ));
    }
    Ok(())
}
