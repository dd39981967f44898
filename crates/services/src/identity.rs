use std::sync::{PoisonError, RwLock};

use lingo_core::model::UserId;

/// Source of the signed-in user for mutation-capable services.
pub trait Identity: Send + Sync {
    fn current_user(&self) -> Option<UserId>;
}

/// Process-local sign-in state for a single user at a time.
#[derive(Debug, Default)]
pub struct LocalIdentity {
    current: RwLock<Option<UserId>>,
}

impl LocalIdentity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn signed_in(user_id: UserId) -> Self {
        Self {
            current: RwLock::new(Some(user_id)),
        }
    }

    pub fn sign_in(&self, user_id: UserId) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(user_id);
    }

    pub fn sign_out(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl Identity for LocalIdentity {
    fn current_user(&self) -> Option<UserId> {
        *self.current.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_and_out() {
        let identity = LocalIdentity::new();
        assert_eq!(identity.current_user(), None);

        let user = UserId::random();
        identity.sign_in(user);
        assert_eq!(identity.current_user(), Some(user));

        identity.sign_out();
        assert_eq!(identity.current_user(), None);
    }
}
