use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Permissions an admin caller may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Change plugin-wide settings such as the model API key.
    ManageOptions,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ManageOptions => "manage_options",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "manage_options" => Ok(Self::ManageOptions),
            _ => Err(()),
        }
    }
}

/// An authenticated admin user, as asserted by the fronting proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user: String,
    pub capabilities: Vec<Capability>,
}

impl Caller {
    pub fn new(user: impl Into<String>, capabilities: Vec<Capability>) -> Self {
        Self {
            user: user.into(),
            capabilities,
        }
    }

    /// Build a caller from a user name and a comma-separated capability
    /// list. Unknown capability names are ignored.
    pub fn from_parts(user: &str, capabilities: Option<&str>) -> Result<Self, AuthError> {
        let user = user.trim();
        if user.is_empty() {
            return Err(AuthError::MissingCaller);
        }
        let capabilities = capabilities
            .unwrap_or_default()
            .split(',')
            .filter_map(|c| c.parse().ok())
            .collect();
        Ok(Self::new(user, capabilities))
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn require(&self, capability: Capability) -> Result<(), AuthError> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(AuthError::Forbidden {
                required: capability,
            })
        }
    }
}
