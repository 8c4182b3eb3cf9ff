//! User aggregate and related types.

mod aggregate;
mod commands;
mod events;
mod service;
mod value_objects;

pub use aggregate::User;
pub use commands::*;
pub use events::{
    ActivatedData, DisabledData, EnabledData, PasswordChangedData, RegisteredData,
    UnregisteredData, UserEvent,
};
pub use service::UserService;
pub use value_objects::{Login, LoginFingerprint, Password, PasswordHash};

use thiserror::Error;

/// Errors that can occur during user commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
    /// The user is already active.
    #[error("User is already activated")]
    AlreadyActivated,

    /// Enabling requires an active, currently disabled user.
    #[error("Cannot enable user (active: {active}, enabled: {enabled})")]
    EnableNotAllowed { active: bool, enabled: bool },

    /// Disabling requires an active, currently enabled user.
    #[error("Cannot disable user (active: {active}, enabled: {enabled})")]
    DisableNotAllowed { active: bool, enabled: bool },

    /// Password changes require an active and enabled user.
    #[error("Cannot change password (active: {active}, enabled: {enabled})")]
    PasswordChangeNotAllowed { active: bool, enabled: bool },

    /// The new password is the same as the current one.
    #[error("New password must differ from the current password")]
    PasswordUnchanged,
}

impl UserError {
    /// Returns true if the command was refused because of the user's
    /// lifecycle state rather than the data it carried.
    pub fn is_invariant_violation(&self) -> bool {
        !matches!(self, UserError::PasswordUnchanged)
    }
}
