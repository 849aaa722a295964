use std::fmt;

use serde::{Deserialize, Serialize};

/// Domain suffix for individual user addresses on the messaging network.
pub const DEFAULT_USER_SERVER: &str = "s.whatsapp.net";

/// A fully qualified network address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Jid(String);

impl Jid {
    /// Canonicalize a recipient: bare identifiers gain the default user
    /// server suffix, already-qualified addresses pass through unchanged.
    pub fn normalize(input: &str) -> Self {
        if input.contains('@') {
            Self(input.to_string())
        } else {
            Self(format!("{input}@{DEFAULT_USER_SERVER}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The local part, before the `@`.
    pub fn user(&self) -> &str {
        self.0.split('@').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
