//! User aggregate implementation.

use common::AggregateId;

use crate::aggregate::Aggregate;
use crate::bus::EventBus;

use super::{
    Login, LoginFingerprint, Password, PasswordHash, UserError, UserEvent,
    events::{
        ActivatedData, DisabledData, EnabledData, PasswordChangedData, RegisteredData,
        UnregisteredData,
    },
};

/// User aggregate root.
///
/// Every field except the identity is written only by the `apply_*`
/// handlers below. A user can only be enabled while active; the commands
/// keep it that way and the handlers rely on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: AggregateId,
    login: Option<Login>,
    password_hash: Option<PasswordHash>,
    active: bool,
    enabled: bool,
}

impl Aggregate for User {
    type Event = UserEvent;
    type Error = UserError;

    fn aggregate_type() -> &'static str {
        "User"
    }

    fn blank(id: AggregateId) -> Self {
        Self {
            id,
            login: None,
            password_hash: None,
            active: false,
            enabled: false,
        }
    }

    fn id(&self) -> AggregateId {
        self.id
    }

    fn set_id(&mut self, id: AggregateId) {
        self.id = id;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            UserEvent::Registered(data) => self.apply_registered(data),
            UserEvent::Activated(data) => self.apply_activated(data),
            UserEvent::Enabled(data) => self.apply_enabled(data),
            UserEvent::Disabled(data) => self.apply_disabled(data),
            UserEvent::PasswordChanged(data) => self.apply_password_changed(data),
            UserEvent::Unregistered(data) => self.apply_unregistered(data),
        }
    }
}

// Query methods
impl User {
    /// Returns the login, or None for a blank aggregate.
    pub fn login(&self) -> Option<&Login> {
        self.login.as_ref()
    }

    /// Returns the current password hash.
    pub fn password_hash(&self) -> Option<&PasswordHash> {
        self.password_hash.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the lookup fingerprint of the login.
    pub fn fingerprint(&self) -> Option<LoginFingerprint> {
        self.login.as_ref().map(LoginFingerprint::of)
    }
}

// Command methods (record events)
impl User {
    /// Registers a new user. The user starts inactive and disabled.
    pub fn register(
        id: AggregateId,
        login: Login,
        password: &Password,
        bus: &dyn EventBus<UserEvent>,
    ) -> Self {
        let mut user = Self::blank(id);
        let password_hash = PasswordHash::from_password(password);
        user.record_that(UserEvent::registered(id, login, password_hash), bus);
        user
    }

    /// Activates the user.
    pub fn activate(&mut self, bus: &dyn EventBus<UserEvent>) -> Result<(), UserError> {
        if self.active {
            return Err(UserError::AlreadyActivated);
        }

        self.record_that(UserEvent::activated(self.id), bus);
        Ok(())
    }

    /// Enables an active, currently disabled user.
    pub fn enable(&mut self, bus: &dyn EventBus<UserEvent>) -> Result<(), UserError> {
        if !self.active || self.enabled {
            return Err(UserError::EnableNotAllowed {
                active: self.active,
                enabled: self.enabled,
            });
        }

        self.record_that(UserEvent::enabled(self.id), bus);
        Ok(())
    }

    /// Disables an active, currently enabled user.
    pub fn disable(&mut self, bus: &dyn EventBus<UserEvent>) -> Result<(), UserError> {
        if !self.active || !self.enabled {
            return Err(UserError::DisableNotAllowed {
                active: self.active,
                enabled: self.enabled,
            });
        }

        self.record_that(UserEvent::disabled(self.id), bus);
        Ok(())
    }

    /// Changes the password of an active, enabled user.
    pub fn change_password(
        &mut self,
        new_password: &Password,
        bus: &dyn EventBus<UserEvent>,
    ) -> Result<(), UserError> {
        if !self.active || !self.enabled {
            return Err(UserError::PasswordChangeNotAllowed {
                active: self.active,
                enabled: self.enabled,
            });
        }

        let password_hash = PasswordHash::from_password(new_password);
        if self.password_hash.as_ref() == Some(&password_hash) {
            return Err(UserError::PasswordUnchanged);
        }

        self.record_that(UserEvent::password_changed(self.id, password_hash), bus);
        Ok(())
    }

    /// Unregisters the user, leaving it inactive and disabled.
    pub fn unregister(&mut self, bus: &dyn EventBus<UserEvent>) -> Result<(), UserError> {
        self.record_that(UserEvent::unregistered(self.id), bus);
        Ok(())
    }
}

// Apply event helpers
impl User {
    fn apply_registered(&mut self, data: RegisteredData) {
        self.login = Some(data.login);
        self.password_hash = Some(data.password_hash);
        self.active = data.active;
        self.enabled = data.enabled;
    }

    fn apply_activated(&mut self, data: ActivatedData) {
        self.active = data.active;
        self.enabled = data.enabled;
    }

    fn apply_enabled(&mut self, data: EnabledData) {
        self.enabled = data.enabled;
    }

    fn apply_disabled(&mut self, data: DisabledData) {
        self.enabled = data.enabled;
    }

    fn apply_password_changed(&mut self, data: PasswordChangedData) {
        self.password_hash = Some(data.password_hash);
    }

    fn apply_unregistered(&mut self, data: UnregisteredData) {
        self.active = data.active;
        self.enabled = data.enabled;
    }
}
