//! User commands.

use common::AggregateId;

use crate::command::Command;

use super::User;

/// Command to register a new user.
///
/// Login and password are raw input; they are validated when the command is
/// handled.
#[derive(Clone)]
pub struct RegisterUser {
    /// The user ID to create.
    pub user_id: AggregateId,

    pub login: String,

    pub password: String,
}

impl RegisterUser {
    /// Creates a new RegisterUser command.
    pub fn new(
        user_id: AggregateId,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            login: login.into(),
            password: password.into(),
        }
    }

    /// Creates a new RegisterUser command with a generated user ID.
    pub fn with_generated_id(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self::new(AggregateId::generate(), login, password)
    }
}

impl std::fmt::Debug for RegisterUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterUser")
            .field("user_id", &self.user_id)
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}

impl Command for RegisterUser {
    type Aggregate = User;

    fn aggregate_id(&self) -> AggregateId {
        self.user_id
    }
}

/// Declares a command that carries nothing but the target user.
macro_rules! user_command {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name {
            pub user_id: AggregateId,
        }

        impl $name {
            pub fn new(user_id: AggregateId) -> Self {
                Self { user_id }
            }
        }

        impl Command for $name {
            type Aggregate = User;

            fn aggregate_id(&self) -> AggregateId {
                self.user_id
            }
        }
    };
}

user_command!(
    /// Command to activate a user.
    ActivateUser
);

user_command!(
    /// Command to enable an active user.
    EnableUser
);

user_command!(
    /// Command to disable an enabled user.
    DisableUser
);

user_command!(
    /// Command to unregister a user.
    UnregisterUser
);

/// Command to change a user's password.
#[derive(Clone)]
pub struct ChangePassword {
    pub user_id: AggregateId,

    pub new_password: String,
}

impl ChangePassword {
    /// Creates a new ChangePassword command.
    pub fn new(user_id: AggregateId, new_password: impl Into<String>) -> Self {
        Self {
            user_id,
            new_password: new_password.into(),
        }
    }
}

impl std::fmt::Debug for ChangePassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangePassword")
            .field("user_id", &self.user_id)
            .field("new_password", &"***")
            .finish()
    }
}

impl Command for ChangePassword {
    type Aggregate = User;

    fn aggregate_id(&self) -> AggregateId {
        self.user_id
    }
}
