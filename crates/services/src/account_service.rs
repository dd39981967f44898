use std::sync::Arc;

use lingo_core::model::{ProfileRecord, UserId};
use storage::repository::ProfileRepository;
use tracing::info;

use crate::Clock;
use crate::error::AccountError;
use crate::identity::{Identity, LocalIdentity};

/// Creates accounts and switches the signed-in user.
#[derive(Clone)]
pub struct AccountService {
    clock: Clock,
    identity: Arc<LocalIdentity>,
    profiles: Arc<dyn ProfileRepository>,
}

impl AccountService {
    #[must_use]
    pub fn new(
        clock: Clock,
        identity: Arc<LocalIdentity>,
        profiles: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            clock,
            identity,
            profiles,
        }
    }

    /// Create a fresh user with a default profile and sign them in.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Storage` if the profile cannot be persisted.
    pub async fn sign_up(&self, username: Option<String>) -> Result<ProfileRecord, AccountError> {
        let user_id = UserId::random();
        let profile = ProfileRecord::new(user_id, username, self.clock.now());
        self.profiles.insert_profile(&profile).await?;
        self.identity.sign_in(user_id);
        info!(%user_id, "account created");
        Ok(profile)
    }

    /// Sign in as an existing user.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::UnknownUser` when no profile exists for the id.
    pub async fn sign_in(&self, user_id: UserId) -> Result<ProfileRecord, AccountError> {
        let profile = self
            .profiles
            .get_profile(user_id)
            .await?
            .ok_or(AccountError::UnknownUser(user_id))?;
        self.identity.sign_in(user_id);
        Ok(profile)
    }

    pub fn sign_out(&self) {
        self.identity.sign_out();
    }

    #[must_use]
    pub fn current_user(&self) -> Option<UserId> {
        self.identity.current_user()
    }
}
