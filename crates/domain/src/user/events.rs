//! User domain events.

use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::{Login, PasswordHash};

/// Events that can occur on a user aggregate.
///
/// Each event carries the resulting values of the fields it changes, so
/// folding never has to derive them from other state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UserEvent {
    /// User was registered.
    #[serde(rename = "UserRegistered")]
    Registered(RegisteredData),

    /// User was activated.
    #[serde(rename = "UserActivated")]
    Activated(ActivatedData),

    /// User was enabled.
    #[serde(rename = "UserEnabled")]
    Enabled(EnabledData),

    /// User was disabled.
    #[serde(rename = "UserDisabled")]
    Disabled(DisabledData),

    /// User's password was changed.
    #[serde(rename = "UserPasswordChanged")]
    PasswordChanged(PasswordChangedData),

    /// User was unregistered.
    #[serde(rename = "UserUnregistered")]
    Unregistered(UnregisteredData),
}

impl DomainEvent for UserEvent {
    const EVENT_TYPES: &'static [&'static str] = &[
        "UserRegistered",
        "UserActivated",
        "UserEnabled",
        "UserDisabled",
        "UserPasswordChanged",
        "UserUnregistered",
    ];

    fn event_type(&self) -> &'static str {
        match self {
            UserEvent::Registered(_) => "UserRegistered",
            UserEvent::Activated(_) => "UserActivated",
            UserEvent::Enabled(_) => "UserEnabled",
            UserEvent::Disabled(_) => "UserDisabled",
            UserEvent::PasswordChanged(_) => "UserPasswordChanged",
            UserEvent::Unregistered(_) => "UserUnregistered",
        }
    }

    fn aggregate_id(&self) -> AggregateId {
        match self {
            UserEvent::Registered(data) => data.user_id,
            UserEvent::Activated(data) => data.user_id,
            UserEvent::Enabled(data) => data.user_id,
            UserEvent::Disabled(data) => data.user_id,
            UserEvent::PasswordChanged(data) => data.user_id,
            UserEvent::Unregistered(data) => data.user_id,
        }
    }
}

/// Data for UserRegistered event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredData {
    pub user_id: AggregateId,
    pub login: Login,
    pub password_hash: PasswordHash,
    pub active: bool,
    pub enabled: bool,
}

/// Data for UserActivated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivatedData {
    pub user_id: AggregateId,
    pub active: bool,
    pub enabled: bool,
}

/// Data for UserEnabled event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledData {
    pub user_id: AggregateId,
    pub enabled: bool,
}

/// Data for UserDisabled event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisabledData {
    pub user_id: AggregateId,
    pub enabled: bool,
}

/// Data for UserPasswordChanged event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordChangedData {
    pub user_id: AggregateId,
    pub password_hash: PasswordHash,
}

/// Data for UserUnregistered event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnregisteredData {
    pub user_id: AggregateId,
    pub active: bool,
    pub enabled: bool,
}

// Convenience constructors for events
impl UserEvent {
    /// Creates a UserRegistered event. New users start inactive and disabled.
    pub fn registered(user_id: AggregateId, login: Login, password_hash: PasswordHash) -> Self {
        UserEvent::Registered(RegisteredData {
            user_id,
            login,
            password_hash,
            active: false,
            enabled: false,
        })
    }

    /// Creates a UserActivated event. Activation leaves the user disabled.
    pub fn activated(user_id: AggregateId) -> Self {
        UserEvent::Activated(ActivatedData {
            user_id,
            active: true,
            enabled: false,
        })
    }

    /// Creates a UserEnabled event.
    pub fn enabled(user_id: AggregateId) -> Self {
        UserEvent::Enabled(EnabledData {
            user_id,
            enabled: true,
        })
    }

    /// Creates a UserDisabled event.
    pub fn disabled(user_id: AggregateId) -> Self {
        UserEvent::Disabled(DisabledData {
            user_id,
            enabled: false,
        })
    }

    /// Creates a UserPasswordChanged event.
    pub fn password_changed(user_id: AggregateId, password_hash: PasswordHash) -> Self {
        UserEvent::PasswordChanged(PasswordChangedData {
            user_id,
            password_hash,
        })
    }

    /// Creates a UserUnregistered event.
    pub fn unregistered(user_id: AggregateId) -> Self {
        UserEvent::Unregistered(UnregisteredData {
            user_id,
            active: false,
            enabled: false,
        })
    }
}
