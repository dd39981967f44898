use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::UserId;

/// XP needed to climb one level.
pub const XP_PER_LEVEL: u64 = 100;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProfileError {
    #[error("stored level {stored} does not match {expected} derived from {total_xp} xp")]
    LevelMismatch {
        stored: u32,
        expected: u32,
        total_xp: u64,
    },

    #[error("xp amount must be positive")]
    NonPositiveXp,
}

/// `floor(total_xp / 100) + 1`.
#[must_use]
pub fn level_for_xp(total_xp: u64) -> u32 {
    u32::try_from(total_xp / XP_PER_LEVEL)
        .unwrap_or(u32::MAX - 1)
        .saturating_add(1)
}

//
// ─── STREAK ────────────────────────────────────────────────────────────────────
//

/// How a completed session moves the daily streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakTransition {
    /// No prior activity; streak begins at 1.
    Started,
    /// Activity yesterday; streak grows by one.
    Extended,
    /// Already active today; nothing changes.
    SameDay,
    /// A gap of two or more days; streak restarts at 1.
    Reset,
    /// Last activity is in the future relative to today; left untouched.
    ClockSkew,
}

impl StreakTransition {
    /// Classify the move from `last` to `today` in whole calendar days.
    #[must_use]
    pub fn between(last: Option<NaiveDate>, today: NaiveDate) -> Self {
        let Some(last) = last else {
            return Self::Started;
        };
        match today.signed_duration_since(last).num_days() {
            0 => Self::SameDay,
            1 => Self::Extended,
            d if d > 1 => Self::Reset,
            _ => Self::ClockSkew,
        }
    }

    /// Whether the profile must be written back.
    #[must_use]
    pub fn changes_profile(self) -> bool {
        matches!(self, Self::Started | Self::Extended | Self::Reset)
    }
}

//
// ─── PROFILE RECORD ────────────────────────────────────────────────────────────
//

/// Account-level aggregates: XP, level, and streak.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    user_id: UserId,
    username: Option<String>,
    total_xp: u64,
    current_level: u32,
    streak_days: u32,
    last_activity_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProfileRecord {
    /// Fresh profile: 0 xp, level 1, no streak, no activity.
    #[must_use]
    pub fn new(user_id: UserId, username: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            username: clean_username(username),
            total_xp: 0,
            current_level: 1,
            streak_days: 0,
            last_activity_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rehydrate a profile from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::LevelMismatch` when the level is not derived from XP.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        user_id: UserId,
        username: Option<String>,
        total_xp: u64,
        current_level: u32,
        streak_days: u32,
        last_activity_date: Option<NaiveDate>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, ProfileError> {
        let expected = level_for_xp(total_xp);
        if expected != current_level {
            return Err(ProfileError::LevelMismatch {
                stored: current_level,
                expected,
                total_xp,
            });
        }
        Ok(Self {
            user_id,
            username,
            total_xp,
            current_level,
            streak_days,
            last_activity_date,
            created_at,
            updated_at,
        })
    }

    /// Add XP, re-derive the level and stamp today's activity.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::NonPositiveXp` for a zero amount.
    pub fn add_xp(
        &mut self,
        amount: u32,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<(), ProfileError> {
        if amount == 0 {
            return Err(ProfileError::NonPositiveXp);
        }
        self.total_xp = self.total_xp.saturating_add(u64::from(amount));
        self.current_level = level_for_xp(self.total_xp);
        self.last_activity_date = Some(today);
        self.updated_at = now;
        Ok(())
    }

    /// Apply a completed session to the streak and report what happened.
    pub fn record_session_day(&mut self, today: NaiveDate, now: DateTime<Utc>) -> StreakTransition {
        self.record_session_day_after(self.last_activity_date, today, now)
    }

    /// Like `record_session_day`, but measures the gap from `previous`, the
    /// last activity observed before the session awarded any XP.
    pub fn record_session_day_after(
        &mut self,
        previous: Option<NaiveDate>,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> StreakTransition {
        let transition = match StreakTransition::between(previous, today) {
            // XP from an abandoned session today stamped the date without a streak.
            StreakTransition::SameDay if self.streak_days == 0 => StreakTransition::Started,
            other => other,
        };
        match transition {
            StreakTransition::Started | StreakTransition::Reset => self.streak_days = 1,
            StreakTransition::Extended => self.streak_days = self.streak_days.saturating_add(1),
            StreakTransition::SameDay | StreakTransition::ClockSkew => return transition,
        }
        self.last_activity_date = Some(today);
        self.updated_at = now;
        transition
    }

    pub fn set_username(&mut self, username: Option<String>, now: DateTime<Utc>) {
        self.username = clean_username(username);
        self.updated_at = now;
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    #[must_use]
    pub fn total_xp(&self) -> u64 {
        self.total_xp
    }

    #[must_use]
    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    #[must_use]
    pub fn streak_days(&self) -> u32 {
        self.streak_days
    }

    #[must_use]
    pub fn last_activity_date(&self) -> Option<NaiveDate> {
        self.last_activity_date
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// XP earned inside the current level.
    #[must_use]
    pub fn level_progress(&self) -> u64 {
        self.total_xp % XP_PER_LEVEL
    }

    #[must_use]
    pub fn xp_to_next_level(&self) -> u64 {
        XP_PER_LEVEL - self.level_progress()
    }
}

fn clean_username(username: Option<String>) -> Option<String> {
    username
        .map(|u| u.trim().to_owned())
        .filter(|u| !u.is_empty())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
