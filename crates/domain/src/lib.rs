//! Domain layer for the user aggregate engine.
//!
//! This crate provides the core domain abstractions including:
//! - Aggregate trait for event-sourced entities, rebuilt by folding events
//! - AggregateHistory, the ordered events replayed into an aggregate
//! - EventBus, the sink newly recorded events are published to
//! - CommandHandler for loading, commanding and storing aggregates
//! - User aggregate with its lifecycle commands

pub mod aggregate;
pub mod bus;
pub mod command;
pub mod error;
pub mod history;
pub mod user;

pub use aggregate::{Aggregate, DomainEvent};
pub use bus::{EventBus, InMemoryEventBus};
pub use command::{Command, CommandHandler, CommandResult};
pub use error::DomainError;
pub use history::{AggregateHistory, HistoryMismatchError};
pub use user::{
    ActivateUser, ChangePassword, DisableUser, EnableUser, Login, LoginFingerprint, Password,
    PasswordHash, RegisterUser, UnregisterUser, User, UserError, UserEvent, UserService,
};
