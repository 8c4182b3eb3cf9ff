//! User service providing a simplified API for user operations.

use common::AggregateId;
use event_store::EventStore;

use crate::bus::EventBus;
use crate::command::{CommandHandler, CommandResult};
use crate::error::DomainError;

use super::{
    ActivateUser, ChangePassword, DisableUser, EnableUser, Login, Password, RegisterUser,
    UnregisterUser, User, UserEvent,
};

/// Service for managing users.
///
/// Validates raw command input, then runs each command through the command
/// handler so that recorded events are stored before they are published.
pub struct UserService<S, B>
where
    S: EventStore,
    B: EventBus<UserEvent>,
{
    handler: CommandHandler<S, User, B>,
}

impl<S, B> UserService<S, B>
where
    S: EventStore,
    B: EventBus<UserEvent>,
{
    /// Creates a new user service over an event store and an outgoing bus.
    pub fn new(store: S, bus: B) -> Self {
        Self {
            handler: CommandHandler::new(store, bus),
        }
    }

    /// Returns a reference to the underlying command handler.
    pub fn handler(&self) -> &CommandHandler<S, User, B> {
        &self.handler
    }

    /// Registers a new user.
    #[tracing::instrument(skip(self))]
    pub async fn register(&self, cmd: RegisterUser) -> Result<CommandResult<User>, DomainError> {
        let login = Login::new(cmd.login)?;
        let password = Password::new(cmd.password)?;
        let user_id = cmd.user_id;

        self.handler
            .create(user_id, |bus| Ok(User::register(user_id, login, &password, bus)))
            .await
    }

    /// Activates a user.
    #[tracing::instrument(skip(self))]
    pub async fn activate(&self, cmd: ActivateUser) -> Result<CommandResult<User>, DomainError> {
        self.handler
            .execute(cmd.user_id, |user, bus| user.activate(bus))
            .await
    }

    /// Enables an active user.
    #[tracing::instrument(skip(self))]
    pub async fn enable(&self, cmd: EnableUser) -> Result<CommandResult<User>, DomainError> {
        self.handler
            .execute(cmd.user_id, |user, bus| user.enable(bus))
            .await
    }

    /// Disables an enabled user.
    #[tracing::instrument(skip(self))]
    pub async fn disable(&self, cmd: DisableUser) -> Result<CommandResult<User>, DomainError> {
        self.handler
            .execute(cmd.user_id, |user, bus| user.disable(bus))
            .await
    }

    /// Changes a user's password.
    #[tracing::instrument(skip(self))]
    pub async fn change_password(
        &self,
        cmd: ChangePassword,
    ) -> Result<CommandResult<User>, DomainError> {
        let password = Password::new(cmd.new_password)?;

        self.handler
            .execute(cmd.user_id, |user, bus| user.change_password(&password, bus))
            .await
    }

    /// Unregisters a user.
    #[tracing::instrument(skip(self))]
    pub async fn unregister(
        &self,
        cmd: UnregisterUser,
    ) -> Result<CommandResult<User>, DomainError> {
        self.handler
            .execute(cmd.user_id, |user, bus| user.unregister(bus))
            .await
    }

    /// Gets a user by ID, or None if it was never registered.
    #[tracing::instrument(skip(self))]
    pub async fn get_user(&self, user_id: AggregateId) -> Result<Option<User>, DomainError> {
        self.handler.load_existing(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{Aggregate, DomainEvent};
    use crate::bus::InMemoryEventBus;
    use crate::user::UserError;
    use common::InvalidArgumentError;
    use event_store::InMemoryEventStore;
    use std::sync::Arc;

    type Service = UserService<InMemoryEventStore, Arc<InMemoryEventBus<UserEvent>>>;

    fn service() -> (Service, Arc<InMemoryEventBus<UserEvent>>) {
        let bus = Arc::new(InMemoryEventBus::new());
        (UserService::new(InMemoryEventStore::new(), bus.clone()), bus)
    }

    #[tokio::test]
    async fn test_register_and_get_user() {
        let (service, bus) = service();
        let cmd = RegisterUser::with_generated_id(" alice ", "correct horse");
        let user_id = cmd.user_id;

        let result = service.register(cmd).await.unwrap();
        assert_eq!(result.aggregate.id().surrogate_id(), Some(1));

        let user = service.get_user(user_id).await.unwrap().unwrap();
        assert_eq!(user.login().map(Login::as_str), Some("alice"));
        assert_eq!(user.id().surrogate_id(), Some(1));
        assert_eq!(bus.len(), 1);
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_input() {
        let (service, bus) = service();

        let bad_login = service
            .register(RegisterUser::with_generated_id("a b", "correct horse"))
            .await;
        assert!(matches!(
            bad_login,
            Err(DomainError::InvalidArgument(
                InvalidArgumentError::InvalidLogin { .. }
            ))
        ));

        let weak = service
            .register(RegisterUser::with_generated_id("alice", "short"))
            .await;
        assert!(matches!(
            weak,
            Err(DomainError::InvalidArgument(
                InvalidArgumentError::WeakPassword { .. }
            ))
        ));
        assert!(bus.is_empty());
    }

    #[tokio::test]
    async fn test_lifecycle_commands() {
        let (service, bus) = service();
        let cmd = RegisterUser::with_generated_id("alice", "correct horse");
        let user_id = cmd.user_id;
        service.register(cmd).await.unwrap();

        service.activate(ActivateUser::new(user_id)).await.unwrap();
        service.enable(EnableUser::new(user_id)).await.unwrap();
        service
            .change_password(ChangePassword::new(user_id, "battery staple"))
            .await
            .unwrap();
        service.disable(DisableUser::new(user_id)).await.unwrap();
        let result = service
            .unregister(UnregisterUser::new(user_id))
            .await
            .unwrap();

        assert!(!result.aggregate.is_active());
        let types: Vec<_> = bus.published().iter().map(|e| e.event_type()).collect();
        assert_eq!(
            types,
            vec![
                "UserRegistered",
                "UserActivated",
                "UserEnabled",
                "UserPasswordChanged",
                "UserDisabled",
                "UserUnregistered",
            ]
        );
    }

    #[tokio::test]
    async fn test_rejected_command_surfaces_user_error() {
        let (service, _) = service();
        let cmd = RegisterUser::with_generated_id("alice", "correct horse");
        let user_id = cmd.user_id;
        service.register(cmd).await.unwrap();

        let result = service.disable(DisableUser::new(user_id)).await;
        assert!(matches!(
            result,
            Err(DomainError::User(UserError::DisableNotAllowed { .. }))
        ));
    }

    #[tokio::test]
    async fn test_get_unknown_user() {
        let (service, _) = service();
        let user = service.get_user(AggregateId::generate()).await.unwrap();
        assert!(user.is_none());
    }
}
