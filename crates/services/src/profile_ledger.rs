use std::sync::Arc;

use chrono::NaiveDate;
use lingo_core::model::{ProfileError, ProfileRecord, StreakTransition, UserId};
use storage::repository::ProfileRepository;
use tracing::{debug, info};

use crate::Clock;
use crate::error::LedgerError;
use crate::identity::Identity;

/// Last activity date captured before a session's first XP award.
///
/// XP awards stamp today as active, so a streak measured against the stored
/// date at session end would always see a same-day repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakBaseline(Option<NaiveDate>);

impl StreakBaseline {
    #[must_use]
    pub fn last_activity_date(self) -> Option<NaiveDate> {
        self.0
    }
}

/// Account-level XP, level and streak bookkeeping for the signed-in user.
#[derive(Clone)]
pub struct ProfileLedger {
    clock: Clock,
    identity: Arc<dyn Identity>,
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileLedger {
    #[must_use]
    pub fn new(
        clock: Clock,
        identity: Arc<dyn Identity>,
        profiles: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            clock,
            identity,
            profiles,
        }
    }

    fn user(&self) -> Result<UserId, LedgerError> {
        self.identity
            .current_user()
            .ok_or(LedgerError::NotAuthenticated)
    }

    async fn load(&self, user_id: UserId) -> Result<ProfileRecord, LedgerError> {
        self.profiles
            .get_profile(user_id)
            .await?
            .ok_or(LedgerError::ProfileMissing(user_id))
    }

    /// Add `amount` XP, re-derive the level, and stamp today as active.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotAuthenticated` or `LedgerError::Profile` for a
    /// zero amount without touching storage. Returns
    /// `LedgerError::ProfileMissing` when the user has no profile, and
    /// `LedgerError::Storage` if persistence fails.
    pub async fn add_xp(&self, amount: u32) -> Result<ProfileRecord, LedgerError> {
        let user_id = self.user()?;
        if amount == 0 {
            return Err(ProfileError::NonPositiveXp.into());
        }

        let mut profile = self.load(user_id).await?;
        let level_before = profile.current_level();
        profile.add_xp(amount, self.clock.today(), self.clock.now())?;
        self.profiles.update_profile(&profile).await?;

        if profile.current_level() > level_before {
            info!(
                %user_id,
                level = profile.current_level(),
                total_xp = profile.total_xp(),
                "level up"
            );
        } else {
            debug!(%user_id, amount, total_xp = profile.total_xp(), "xp added");
        }
        Ok(profile)
    }

    /// Apply one completed session to the daily streak.
    ///
    /// Same-day repeats and a last-activity date after today leave the profile
    /// untouched and skip the write.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotAuthenticated`, `LedgerError::ProfileMissing`,
    /// or `LedgerError::Storage`.
    pub async fn update_streak(&self) -> Result<ProfileRecord, LedgerError> {
        self.apply_streak(None).await
    }

    /// Snapshot the stored last activity date ahead of a session's effects.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotAuthenticated`, `LedgerError::ProfileMissing`,
    /// or `LedgerError::Storage`.
    pub async fn streak_baseline(&self) -> Result<StreakBaseline, LedgerError> {
        Ok(StreakBaseline(self.profile().await?.last_activity_date()))
    }

    /// Apply a completed session to the streak, measuring from `baseline`.
    ///
    /// # Errors
    ///
    /// Same as `update_streak`.
    pub async fn update_streak_from(
        &self,
        baseline: StreakBaseline,
    ) -> Result<ProfileRecord, LedgerError> {
        self.apply_streak(Some(baseline)).await
    }

    async fn apply_streak(
        &self,
        baseline: Option<StreakBaseline>,
    ) -> Result<ProfileRecord, LedgerError> {
        let user_id = self.user()?;
        let mut profile = self.load(user_id).await?;
        let today = self.clock.today();
        let previous = baseline.map_or(profile.last_activity_date(), |b| b.0);

        let transition = profile.record_session_day_after(previous, today, self.clock.now());
        if transition.changes_profile() {
            self.profiles.update_profile(&profile).await?;
        }

        match transition {
            StreakTransition::ClockSkew => info!(
                %user_id,
                %today,
                last_activity = ?profile.last_activity_date(),
                "last activity is after today; streak left unchanged"
            ),
            other => debug!(
                %user_id,
                transition = ?other,
                streak_days = profile.streak_days(),
                "streak updated"
            ),
        }
        Ok(profile)
    }

    /// # Errors
    ///
    /// Returns `LedgerError::NotAuthenticated`, `LedgerError::ProfileMissing`,
    /// or `LedgerError::Storage`.
    pub async fn profile(&self) -> Result<ProfileRecord, LedgerError> {
        let user_id = self.user()?;
        self.load(user_id).await
    }

    /// Replace the display name; blank clears it.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotAuthenticated`, `LedgerError::ProfileMissing`,
    /// or `LedgerError::Storage`.
    pub async fn set_username(
        &self,
        username: Option<String>,
    ) -> Result<ProfileRecord, LedgerError> {
        let user_id = self.user()?;
        let mut profile = self.load(user_id).await?;
        profile.set_username(username, self.clock.now());
        self.profiles.update_profile(&profile).await?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use lingo_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    use crate::identity::LocalIdentity;

    fn ledger_on(clock: Clock, repo: &InMemoryRepository, user: UserId) -> ProfileLedger {
        ProfileLedger::new(
            clock,
            Arc::new(LocalIdentity::signed_in(user)),
            Arc::new(repo.clone()),
        )
    }

    async fn seeded(user: UserId) -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        repo.insert_profile(&ProfileRecord::new(user, None, fixed_clock().now()))
            .await
            .unwrap();
        repo
    }

    #[tokio::test]
    async fn xp_accumulates_and_levels() {
        let user = UserId::random();
        let repo = seeded(user).await;
        let ledger = ledger_on(fixed_clock(), &repo, user);

        ledger.add_xp(120).await.unwrap();
        let profile = ledger.add_xp(130).await.unwrap();
        assert_eq!(profile.total_xp(), 250);
        assert_eq!(profile.current_level(), 3);
        assert_eq!(profile.last_activity_date(), Some(fixed_clock().today()));

        let stored = repo.get_profile(user).await.unwrap().unwrap();
        assert_eq!(stored, profile);
    }

    #[tokio::test]
    async fn zero_xp_is_rejected_before_storage() {
        let user = UserId::random();
        let repo = seeded(user).await;
        let ledger = ledger_on(fixed_clock(), &repo, user);
        assert!(matches!(
            ledger.add_xp(0).await,
            Err(LedgerError::Profile(ProfileError::NonPositiveXp))
        ));
    }

    #[tokio::test]
    async fn missing_profile_is_reported() {
        let user = UserId::random();
        let ledger = ledger_on(fixed_clock(), &InMemoryRepository::new(), user);
        assert!(matches!(
            ledger.add_xp(15).await,
            Err(LedgerError::ProfileMissing(u)) if u == user
        ));
    }

    #[tokio::test]
    async fn streak_over_consecutive_and_skipped_days() {
        let user = UserId::random();
        let repo = seeded(user).await;
        let day0 = fixed_clock();

        let profile = ledger_on(day0, &repo, user).update_streak().await.unwrap();
        assert_eq!(profile.streak_days(), 1);

        let profile = ledger_on(day0, &repo, user).update_streak().await.unwrap();
        assert_eq!(profile.streak_days(), 1, "same-day repeat leaves streak alone");

        let profile = ledger_on(day0.days_later(1), &repo, user)
            .update_streak()
            .await
            .unwrap();
        assert_eq!(profile.streak_days(), 2);

        let profile = ledger_on(day0.days_later(4), &repo, user)
            .update_streak()
            .await
            .unwrap();
        assert_eq!(profile.streak_days(), 1);
        assert_eq!(profile.last_activity_date(), Some(day0.days_later(4).today()));
    }

    #[tokio::test]
    async fn backdated_clock_is_a_no_op() {
        let user = UserId::random();
        let repo = seeded(user).await;
        let later = fixed_clock().days_later(3);
        ledger_on(later, &repo, user).update_streak().await.unwrap();
        let before = repo.get_profile(user).await.unwrap().unwrap();

        let profile = ledger_on(fixed_clock(), &repo, user)
            .update_streak()
            .await
            .unwrap();
        assert_eq!(profile, before);
        assert_eq!(repo.get_profile(user).await.unwrap().unwrap(), before);
    }

    #[tokio::test]
    async fn baseline_survives_xp_awarded_during_the_session() {
        let user = UserId::random();
        let repo = seeded(user).await;
        ledger_on(fixed_clock(), &repo, user).update_streak().await.unwrap();

        let next_day = ledger_on(fixed_clock().days_later(1), &repo, user);
        let baseline = next_day.streak_baseline().await.unwrap();
        next_day.add_xp(15).await.unwrap();

        let skewed = next_day.update_streak().await.unwrap();
        assert_eq!(skewed.streak_days(), 1, "stored date already reads today");

        let profile = next_day.update_streak_from(baseline).await.unwrap();
        assert_eq!(profile.streak_days(), 2);
        assert_eq!(profile.total_xp(), 15);
    }

    #[tokio::test]
    async fn signed_out_ledger_fails_fast() {
        let ledger = ProfileLedger::new(
            fixed_clock(),
            Arc::new(LocalIdentity::new()),
            Arc::new(InMemoryRepository::new()),
        );
        assert!(matches!(
            ledger.update_streak().await,
            Err(LedgerError::NotAuthenticated)
        ));
        assert!(matches!(
            ledger.add_xp(10).await,
            Err(LedgerError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn username_updates_persist() {
        let user = UserId::random();
        let repo = seeded(user).await;
        let ledger = ledger_on(fixed_clock(), &repo, user);

        let profile = ledger.set_username(Some(" sari ".into())).await.unwrap();
        assert_eq!(profile.username(), Some("sari"));
        assert_eq!(ledger.profile().await.unwrap().username(), Some("sari"));
    }
}
