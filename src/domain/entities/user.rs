//! User entity: a semi-structured record keyed by username.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the primary-key attribute.
pub const USERNAME_KEY: &str = "username";

/// Open attribute set of a user record.
pub type Attributes = Map<String, Value>;

/// A user record.
///
/// Serialized flat: `{"username": "john", "email": "j@example.com"}`.
/// The `attributes` map never contains [`USERNAME_KEY`]; constructors strip it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    username: String,
    #[serde(flatten)]
    attributes: Attributes,
}

impl User {
    /// Builds a record from a username and an attribute map.
    ///
    /// Any `username` key present in `attributes` is discarded; the
    /// explicit `username` argument always wins.
    pub fn new(username: impl Into<String>, mut attributes: Attributes) -> Self {
        attributes.remove(USERNAME_KEY);
        Self {
            username: username.into(),
            attributes,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Applies a merge-patch: keys in `patch` overwrite, absent keys are kept.
    ///
    /// `username` in the patch is ignored.
    pub fn merge(&mut self, patch: &Attributes) {
        for (key, value) in patch {
            if key == USERNAME_KEY {
                continue;
            }
            self.attributes.insert(key.clone(), value.clone());
        }
    }

    /// Splits the record back into its username and attributes.
    pub fn into_parts(self) -> (String, Attributes) {
        (self.username, self.attributes)
    }
}

/// Removes the primary key from a patch so it can never be rewritten.
pub fn strip_username(mut attributes: Attributes) -> Attributes {
    attributes.remove(USERNAME_KEY);
    attributes
}
