use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{UserId, VocabularyId};

/// A word a user has starred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteMark {
    pub user_id: UserId,
    pub vocabulary_id: VocabularyId,
    pub created_at: DateTime<Utc>,
}

impl FavoriteMark {
    #[must_use]
    pub fn new(user_id: UserId, vocabulary_id: VocabularyId, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            vocabulary_id,
            created_at,
        }
    }
}

/// What a favorite toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteToggle {
    Added,
    Removed,
}
