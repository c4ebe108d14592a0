//! Streak analysis over the daily activity table.

use crate::aggregate::DailyActivity;
use chrono::{Datelike, Days, NaiveDate};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LongestStreak {
    pub length: u32,
    /// Dates of the run, ascending
    pub days: Vec<NaiveDate>,
}

/// Longest run of consecutive active days inside `year`.
///
/// When several runs share the maximum length the earliest one wins.
pub fn longest_streak(daily: &DailyActivity, year: i32) -> LongestStreak {
    // BTreeMap keys are already ascending and distinct
    let dates: Vec<NaiveDate> = daily
        .iter()
        .filter(|(date, count)| date.year() == year && **count > 0)
        .map(|(date, _)| *date)
        .collect();

    if dates.is_empty() {
        return LongestStreak::default();
    }

    let mut max_len = 1usize;
    let mut max_start = 0usize;
    let mut max_end = 0usize;
    let mut run_len = 1usize;
    let mut run_start = 0usize;

    for i in 1..dates.len() {
        if (dates[i] - dates[i - 1]).num_days() == 1 {
            run_len += 1;
            if run_len > max_len {
                max_len = run_len;
                max_start = run_start;
                max_end = i;
            }
        } else {
            run_len = 1;
            run_start = i;
        }
    }

    LongestStreak {
        length: max_len as u32,
        days: dates[max_start..=max_end].to_vec(),
    }
}

/// Run of active days ending today, or ending yesterday when today has no
/// activity yet. Not limited to any year.
pub fn current_streak(daily: &DailyActivity, today: NaiveDate) -> u32 {
    let is_active = |date: NaiveDate| daily.get(&date).is_some_and(|c| *c > 0);

    let anchor = if is_active(today) {
        today
    } else {
        match today.checked_sub_days(Days::new(1)) {
            Some(yesterday) if is_active(yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut streak = 1;
    let mut day = anchor;
    while let Some(prev) = day.checked_sub_days(Days::new(1)) {
        if !is_active(prev) {
            break;
        }
        streak += 1;
        day = prev;
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn table(dates: &[NaiveDate]) -> DailyActivity {
        dates.iter().map(|date| (*date, 1)).collect()
    }

    fn run(start: NaiveDate, len: u64) -> Vec<NaiveDate> {
        (0..len)
            .map(|i| start.checked_add_days(Days::new(i)).unwrap())
            .collect()
    }

    #[test]
    fn test_empty_and_single() {
        assert_eq!(longest_streak(&DailyActivity::new(), 2025), LongestStreak::default());

        let single = longest_streak(&table(&[d(2025, 4, 1)]), 2025);
        assert_eq!(single.length, 1);
        assert_eq!(single.days, vec![d(2025, 4, 1)]);
    }

    #[test]
    fn test_gapless_run() {
        let dates = run(d(2025, 2, 20), 12);
        let streak = longest_streak(&table(&dates), 2025);
        assert_eq!(streak.length, 12);
        assert_eq!(streak.days, dates);
    }

    #[test]
    fn test_interior_gap_splits_run() {
        let mut dates = run(d(2025, 5, 1), 10);
        dates.remove(3);
        let streak = longest_streak(&table(&dates), 2025);
        assert_eq!(streak.length, 6);
        assert_eq!(streak.days.first(), Some(&d(2025, 5, 5)));
    }

    #[test]
    fn test_tie_keeps_earliest_run() {
        let mut dates = run(d(2025, 1, 1), 3);
        dates.extend(run(d(2025, 1, 10), 3));
        let streak = longest_streak(&table(&dates), 2025);
        assert_eq!(streak.length, 3);
        assert_eq!(streak.days, vec![d(2025, 1, 1), d(2025, 1, 2), d(2025, 1, 3)]);
    }

    #[test]
    fn test_longest_is_year_scoped() {
        let dates = run(d(2024, 12, 25), 10);
        let streak = longest_streak(&table(&dates), 2025);
        assert_eq!(streak.length, 3);
        assert_eq!(streak.days.first(), Some(&d(2025, 1, 1)));
    }

    #[test]
    fn test_current_streak_from_today() {
        let today = d(2025, 8, 10);
        // today + 4 preceding days, then a gap, then more history
        let mut dates = run(d(2025, 8, 6), 5);
        dates.extend(run(d(2025, 7, 1), 4));
        assert_eq!(current_streak(&table(&dates), today), 5);
    }

    #[test]
    fn test_current_streak_from_yesterday() {
        let today = d(2025, 8, 10);
        let dates = run(d(2025, 8, 7), 3);
        assert_eq!(current_streak(&table(&dates), today), 3);
    }

    #[test]
    fn test_current_streak_zero_without_recent_activity() {
        let today = d(2025, 8, 10);
        let dates = run(d(2025, 8, 1), 7);
        assert_eq!(current_streak(&table(&dates), today), 0);
    }

    #[test]
    fn test_current_streak_crosses_year_boundary() {
        let today = d(2026, 1, 2);
        let dates = run(d(2025, 12, 28), 6);
        assert_eq!(current_streak(&table(&dates), today), 6);
    }
}
