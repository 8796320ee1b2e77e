//! User identity and display profiles

use serde::{Deserialize, Serialize};

/// Display name shown when a profile has no name (or failed to load)
pub const FALLBACK_DISPLAY_NAME: &str = "User";

/// Public display profile of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// User id
    pub id: String,
    /// Display name
    pub name: String,
    /// Avatar image URL
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Short biography
    #[serde(default)]
    pub bio: Option<String>,
}

impl Profile {
    /// Create a profile with only a name
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar_url: None,
            bio: None,
        }
    }

    /// Name to render, falling back to a generic label
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            FALLBACK_DISPLAY_NAME
        } else {
            &self.name
        }
    }
}

/// The signed-in user as reported by the auth collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User id
    pub id: String,
    /// Account email, when known
    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    /// Create a user with no email
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
        }
    }
}
