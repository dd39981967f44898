use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Source of "now" for XP stamps, streak days and session timestamps.
///
/// Streak days are UTC calendar dates, so a frozen clock is enough to script
/// multi-day histories in tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Frozen(DateTime<Utc>),
}

impl Clock {
    /// Wall-clock time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::System
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Frozen(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Frozen(at) => *at,
        }
    }

    /// The UTC calendar day that streaks are counted in.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Move a frozen clock forward; the system clock ignores this.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Frozen(at) = self {
            *at += delta;
        }
    }

    /// The same clock `days` calendar days on.
    #[must_use]
    pub fn days_later(mut self, days: i64) -> Self {
        self.advance(Duration::days(days));
        self
    }
}

/// 2024-03-04T09:30:00Z, a Monday morning.
const FIXTURE_UNIX_SECONDS: i64 = 1_709_544_600;

/// Deterministic timestamp shared by tests and fixtures.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXTURE_UNIX_SECONDS, 0).unwrap_or_default()
}

/// A clock frozen at `fixed_now()`.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn frozen_clock_reports_its_utc_day() {
        assert_eq!(fixed_clock().today(), day(2024, 3, 4));
    }

    #[test]
    fn days_later_crosses_month_ends() {
        let clock = Clock::fixed(fixed_now() - Duration::days(4)).days_later(1);
        assert_eq!(clock.today(), day(2024, 3, 1));
        assert_eq!(clock.days_later(-1).today(), day(2024, 2, 29));
    }

    #[test]
    fn late_evening_advance_rolls_the_day() {
        let mut clock = fixed_clock();
        clock.advance(Duration::hours(14) + Duration::minutes(29));
        assert_eq!(clock.today(), day(2024, 3, 4));
        clock.advance(Duration::minutes(1));
        assert_eq!(clock.today(), day(2024, 3, 5));
    }

    #[test]
    fn system_clock_ignores_advance() {
        let mut clock = Clock::default_clock();
        clock.advance(Duration::days(3));
        assert!(matches!(clock, Clock::System));
    }
}
