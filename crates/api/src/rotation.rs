//! Weekly coaching email rotation arithmetic.
//!
//! A subscriber receives at most [`WEEKLY_EMAIL_CAP`] weekly emails. Week `n`
//! features the user's strength at `(n - 1) % 5` and cycles through the team
//! one member per week; a member's featured strength advances after each full
//! pass over the team.

use chrono::NaiveDate;

/// Maximum number of weekly coaching emails per subscription.
pub const WEEKLY_EMAIL_CAP: u32 = 12;

/// Week number of the next email, or `None` once the cap is reached.
pub fn next_week_number(weekly_email_count: u32) -> Option<u32> {
    if weekly_email_count >= WEEKLY_EMAIL_CAP {
        return None;
    }
    Some(weekly_email_count + 1)
}

/// Item featured in `week` (1-based) when rotating through `items`.
pub fn rotation_pick<T>(items: &[T], week: u32) -> Option<&T> {
    if items.is_empty() || week == 0 {
        return None;
    }
    items.get((week as usize - 1) % items.len())
}

/// Strength of the featured team member for `week`, given the team size.
pub fn member_strength_pick<T>(strengths: &[T], week: u32, team_size: usize) -> Option<&T> {
    if strengths.is_empty() || team_size == 0 || week == 0 {
        return None;
    }
    let pass = (week as usize - 1) / team_size;
    strengths.get(pass % strengths.len())
}

/// True when `last_sent_at` (`YYYY-MM-DD HH:MM:SS` or RFC 3339) is on `today`.
pub fn sent_on_day(last_sent_at: Option<&str>, today: NaiveDate) -> bool {
    let Some(raw) = last_sent_at.map(str::trim).filter(|s| s.len() >= 10) else {
        return false;
    };
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .is_some_and(|date| date == today)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn week_numbers_stop_at_cap() {
        assert_eq!(next_week_number(0), Some(1));
        assert_eq!(next_week_number(11), Some(12));
        assert_eq!(next_week_number(12), None);
        assert_eq!(next_week_number(40), None);
    }

    #[test]
    fn strengths_rotate_every_five_weeks() {
        let strengths = ["Achiever", "Learner", "Focus", "Relator", "Input"];
        assert_eq!(rotation_pick(&strengths, 1), Some(&"Achiever"));
        assert_eq!(rotation_pick(&strengths, 5), Some(&"Input"));
        assert_eq!(rotation_pick(&strengths, 6), Some(&"Achiever"));
        assert_eq!(rotation_pick(&strengths, 12), Some(&"Learner"));
        assert_eq!(rotation_pick::<&str>(&[], 3), None);
        assert_eq!(rotation_pick(&strengths, 0), None);
    }

    #[test]
    fn member_strength_advances_per_team_pass() {
        let strengths = ["Woo", "Command", "Focus", "Input", "Belief"];
        // Team of three: weeks 1..=3 use the first strength, 4..=6 the second.
        assert_eq!(member_strength_pick(&strengths, 1, 3), Some(&"Woo"));
        assert_eq!(member_strength_pick(&strengths, 3, 3), Some(&"Woo"));
        assert_eq!(member_strength_pick(&strengths, 4, 3), Some(&"Command"));
        assert_eq!(member_strength_pick(&strengths, 12, 3), Some(&"Input"));
        assert_eq!(member_strength_pick(&strengths, 1, 0), None);
    }

    #[test]
    fn sent_today_compares_utc_dates() {
        let today = day("2026-03-10");
        assert!(sent_on_day(Some("2026-03-10 08:00:00"), today));
        assert!(sent_on_day(Some("2026-03-10T23:59:59Z"), today));
        assert!(!sent_on_day(Some("2026-03-09 23:59:59"), today));
        assert!(!sent_on_day(None, today));
        assert!(!sent_on_day(Some("garbage"), today));
    }
}
