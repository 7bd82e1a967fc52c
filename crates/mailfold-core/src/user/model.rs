//! User model types.

use serde::{Deserialize, Serialize};

use crate::message::EmailAddress;

/// A mailbox owner profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

impl User {
    /// The user as a sender/recipient address.
    #[must_use]
    pub fn address(&self) -> EmailAddress {
        EmailAddress::new(&self.name, &self.email)
    }
}
