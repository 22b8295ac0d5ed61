use chrono::NaiveDate;

use crate::models::progress::StreakState;

/// Advances streak state for one new submission.
///
/// The streak is a motivational signal anchored to `today` (the wall-clock
/// date supplied by the caller), not to the submission's own `date`: a
/// backdated submission counts toward totals but does not rebuild a streak.
pub fn compute_streak(previous: &StreakState, today: NaiveDate) -> StreakState {
    let yesterday = today.pred_opt();

    let current = match previous.last_drill_date {
        // First drill ever
        None => 1,
        // Repeat submission on the same calendar day, streak unchanged
        Some(last) if last == today => previous.current,
        // Continuing streak
        Some(last) if Some(last) == yesterday => previous.current + 1,
        // Streak broken (gap of 2+ days, or a clock that moved backwards)
        Some(_) => 1,
    };

    StreakState {
        current,
        longest: previous.longest.max(current),
        last_drill_date: Some(today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn first_drill_starts_streak_at_one() {
        let next = compute_streak(&StreakState::default(), date(2024, 1, 1));
        assert_eq!(next.current, 1);
        assert_eq!(next.longest, 1);
        assert_eq!(next.last_drill_date, Some(date(2024, 1, 1)));
    }

    #[test]
    fn consecutive_days_build_streak() {
        let mut state = StreakState::default();
        for day in 1..=3 {
            state = compute_streak(&state, date(2024, 1, day));
        }
        assert_eq!(state.current, 3);
        assert!(state.longest >= 3);
    }

    #[test]
    fn gap_resets_streak_to_one() {
        let state = compute_streak(&StreakState::default(), date(2024, 1, 1));
        let state = compute_streak(&state, date(2024, 1, 6));
        assert_eq!(state.current, 1);
    }

    #[test]
    fn same_day_submission_leaves_streak_unchanged() {
        let state = compute_streak(&StreakState::default(), date(2024, 1, 1));
        let state = compute_streak(&state, date(2024, 1, 2));
        let again = compute_streak(&state, date(2024, 1, 2));
        assert_eq!(again.current, state.current);
        assert_eq!(again.longest, state.longest);
    }

    #[test]
    fn longest_never_decreases_and_bounds_current() {
        let mut state = StreakState::default();
        let days = [
            date(2024, 1, 1),
            date(2024, 1, 2),
            date(2024, 1, 3),
            date(2024, 1, 10), // gap
            date(2024, 1, 11),
            date(2024, 1, 11), // repeat
            date(2024, 2, 1),  // gap
        ];
        let mut longest_seen = 0;
        for day in days {
            state = compute_streak(&state, day);
            assert!(state.current <= state.longest);
            assert!(state.longest >= longest_seen);
            longest_seen = state.longest;
        }
        assert_eq!(state.longest, 3);
        assert_eq!(state.current, 1);
    }
}
