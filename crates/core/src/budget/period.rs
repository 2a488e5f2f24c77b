//! Evaluation period boundaries.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};

use super::error::BudgetError;

/// The calendar month a budget is evaluated over.
///
/// Stored as the half-open interval `[start, end)`, which contains every
/// instant up to and including the last instant of the month's last day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationPeriod {
    first_day: NaiveDate,
    last_day: NaiveDate,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl EvaluationPeriod {
    /// Returns the calendar month containing `now`, in `now`'s timezone.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::InvalidPeriod` if a month boundary cannot be
    /// mapped to an instant in that timezone.
    pub fn month_containing<Tz: TimeZone>(now: &DateTime<Tz>) -> Result<Self, BudgetError> {
        let today = now.date_naive();
        let first_day = today.with_day(1).ok_or(BudgetError::InvalidPeriod(today))?;
        let next_first = first_day
            .checked_add_months(Months::new(1))
            .ok_or(BudgetError::InvalidPeriod(first_day))?;
        let last_day = next_first
            .pred_opt()
            .ok_or(BudgetError::InvalidPeriod(next_first))?;

        let tz = now.timezone();
        Ok(Self {
            first_day,
            last_day,
            start: start_of_day(&tz, first_day)?,
            end: start_of_day(&tz, next_first)?,
        })
    }

    /// First instant of the month (inclusive).
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// First instant of the following month (exclusive).
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Last representable instant of the month (inclusive).
    #[must_use]
    pub fn last_instant(&self) -> DateTime<Utc> {
        self.end - TimeDelta::nanoseconds(1)
    }

    /// First calendar day of the month.
    #[must_use]
    pub const fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// Last calendar day of the month.
    #[must_use]
    pub const fn last_day(&self) -> NaiveDate {
        self.last_day
    }

    /// Returns true if `at` falls anywhere within the month.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }

    /// Days left in the month after `today`; zero on or after the last day.
    #[must_use]
    pub fn days_left(&self, today: NaiveDate) -> u32 {
        if today >= self.last_day {
            return 0;
        }
        if today < self.first_day {
            return self.last_day.day();
        }
        self.last_day.day() - today.day()
    }
}

/// Midnight of `date` in `tz`; the first valid instant after a DST gap.
fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Result<DateTime<Utc>, BudgetError> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            (1..=24)
                .map(|minutes| midnight + TimeDelta::minutes(minutes * 15))
                .find_map(|local| tz.from_local_datetime(&local).earliest())
        })
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or(BudgetError::InvalidPeriod(date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::Sao_Paulo;
    use chrono_tz::Asia::Jakarta;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn test_month_bounds_in_utc() {
        let period = EvaluationPeriod::month_containing(&utc(2026, 10, 19, 8, 30, 0)).unwrap();

        assert_eq!(period.start(), utc(2026, 10, 1, 0, 0, 0));
        assert_eq!(period.end(), utc(2026, 11, 1, 0, 0, 0));
        assert_eq!(period.last_day(), NaiveDate::from_ymd_opt(2026, 10, 31).unwrap());
    }

    #[test]
    fn test_first_instant_included_previous_month_excluded() {
        let period = EvaluationPeriod::month_containing(&utc(2026, 10, 19, 8, 30, 0)).unwrap();

        assert!(period.contains(utc(2026, 10, 1, 0, 0, 0)));
        assert!(!period.contains(utc(2026, 10, 1, 0, 0, 0) - TimeDelta::nanoseconds(1)));
        assert!(!period.contains(utc(2026, 9, 30, 23, 59, 59)));
    }

    #[test]
    fn test_last_day_included_through_end_of_day() {
        let period = EvaluationPeriod::month_containing(&utc(2026, 10, 19, 8, 30, 0)).unwrap();

        assert!(period.contains(utc(2026, 10, 31, 23, 59, 59)));
        assert!(period.contains(period.last_instant()));
        assert!(!period.contains(utc(2026, 11, 1, 0, 0, 0)));
    }

    #[test]
    fn test_december_rolls_into_next_year() {
        let period = EvaluationPeriod::month_containing(&utc(2025, 12, 31, 23, 0, 0)).unwrap();
        assert_eq!(period.end(), utc(2026, 1, 1, 0, 0, 0));
        assert_eq!(period.last_day().day(), 31);
    }

    #[test]
    fn test_leap_february() {
        let period = EvaluationPeriod::month_containing(&utc(2028, 2, 10, 0, 0, 0)).unwrap();
        assert_eq!(period.last_day().day(), 29);
    }

    #[test]
    fn test_month_follows_local_calendar() {
        // 2026-10-31 20:00 UTC is already November 1st in Jakarta (UTC+7).
        let now = utc(2026, 10, 31, 20, 0, 0).with_timezone(&Jakarta);
        let period = EvaluationPeriod::month_containing(&now).unwrap();

        assert_eq!(period.first_day(), NaiveDate::from_ymd_opt(2026, 11, 1).unwrap());
        assert_eq!(period.start(), utc(2026, 10, 31, 17, 0, 0));
    }

    #[test]
    fn test_start_of_day_skips_midnight_gap() {
        // Brazil moved clocks forward at midnight on 2018-11-04.
        let date = NaiveDate::from_ymd_opt(2018, 11, 4).unwrap();
        let start = start_of_day(&Sao_Paulo, date).unwrap();
        assert_eq!(start, utc(2018, 11, 4, 3, 0, 0));
    }

    #[test]
    fn test_days_left() {
        let period = EvaluationPeriod::month_containing(&utc(2026, 10, 19, 8, 0, 0)).unwrap();

        assert_eq!(period.days_left(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()), 12);
        assert_eq!(period.days_left(NaiveDate::from_ymd_opt(2026, 10, 31).unwrap()), 0);
        assert_eq!(period.days_left(NaiveDate::from_ymd_opt(2026, 10, 1).unwrap()), 30);
    }
}
