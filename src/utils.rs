use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{NaiveDate, NaiveTime, Timelike};

use crate::errors::AppError;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    Argon2::default()
        .hash_password(password.as_bytes(), &SaltString::generate(&mut OsRng))
        .map(|hash| hash.to_string())
        .map_err(|e| {
            log::error!("Failed to hash password: {}", e);
            AppError::PasswordError(e.to_string())
        })
}

/// Returns `Ok(false)` on a mismatch; errors only when the stored hash is unreadable.
pub fn verify_password(provided: &str, stored_hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| {
        log::error!("Stored password hash is malformed: {}", e);
        AppError::PasswordError(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(provided.as_bytes(), &parsed)
        .is_ok())
}

pub fn validate_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AppError::validation("Invalid email address")),
    }
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 8 {
        return Err(AppError::validation(
            "Password must be at least 8 characters long",
        ));
    }
    if password.len() > 128 {
        return Err(AppError::validation(
            "Password must be at most 128 characters long",
        ));
    }
    Ok(())
}

pub fn require_field(value: &str, name: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{name} is required")));
    }
    Ok(())
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date {raw:?}, expected YYYY-MM-DD")))
}

pub fn parse_time(raw: &str) -> Result<NaiveTime, AppError> {
    let raw_trimmed = raw.trim();
    NaiveTime::parse_from_str(raw_trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw_trimmed, "%H:%M:%S"))
        .map_err(|_| AppError::validation(format!("Invalid time {raw:?}, expected HH:MM")))
}

/// A same-day `[start, end)` interval. Intervals that wrap past midnight are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, AppError> {
        if end <= start {
            return Err(AppError::validation("End time must be after start time"));
        }
        Ok(TimeSlot { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, AppError> {
        TimeSlot::new(parse_time(start)?, parse_time(end)?)
    }

    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        !(self.end <= other.start || self.start >= other.end)
    }

    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn duration_hours(&self) -> f64 {
        self.minutes() as f64 / 60.0
    }

    pub fn start_str(&self) -> String {
        format_time(self.start)
    }

    pub fn end_str(&self) -> String {
        format_time(self.end)
    }
}

fn format_time(t: NaiveTime) -> String {
    format!("{:02}:{:02}", t.hour(), t.minute())
}

/// Scans for the first numeric token in a free-text price, e.g. `"₹50/hour"` gives 50.
/// Thousands separators between digits are skipped.
pub fn parse_unit_price(price: &str) -> Option<f64> {
    let mut token = String::new();
    let mut seen_dot = false;
    let mut chars = price.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_ascii_digit() {
            token.push(c);
        } else if token.is_empty() {
            continue;
        } else if c == ',' && chars.peek().is_some_and(|n| n.is_ascii_digit()) {
            continue;
        } else if c == '.' && !seen_dot && chars.peek().is_some_and(|n| n.is_ascii_digit()) {
            seen_dot = true;
            token.push(c);
        } else {
            break;
        }
    }

    token.parse::<f64>().ok()
}

pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

pub fn total_amount(unit_price: f64, slot: &TimeSlot) -> f64 {
    round_currency(unit_price * slot.duration_hours())
}

pub fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn slot(start: &str, end: &str) -> TimeSlot {
        TimeSlot::parse(start, end).unwrap()
    }

    #[rstest]
    #[case("09:30", "10:30", true)]
    #[case("10:00", "11:00", false)]
    #[case("08:00", "09:00", false)]
    #[case("08:30", "09:01", true)]
    #[case("09:15", "09:45", true)]
    #[case("07:00", "12:00", true)]
    fn overlap_uses_half_open_intervals(
        #[case] start: &str,
        #[case] end: &str,
        #[case] expected: bool,
    ) {
        let existing = slot("09:00", "10:00");
        let candidate = slot(start, end);
        assert_eq!(candidate.overlaps(&existing), expected);
        assert_eq!(existing.overlaps(&candidate), expected);
    }

    #[rstest]
    #[case("10:00", "10:00")]
    #[case("23:00", "01:00")]
    fn end_must_follow_start(#[case] start: &str, #[case] end: &str) {
        assert!(matches!(
            TimeSlot::parse(start, end),
            Err(AppError::Validation(_))
        ));
    }

    #[rstest]
    #[case("₹50/hour", Some(50.0))]
    #[case("Rs. 1,200 per hour", Some(1200.0))]
    #[case("$7.50 / hr", Some(7.5))]
    #[case("40.", Some(40.0))]
    #[case("free", None)]
    #[case("", None)]
    fn unit_price_takes_leading_numeric_token(#[case] raw: &str, #[case] expected: Option<f64>) {
        assert_eq!(parse_unit_price(raw), expected);
    }

    #[test]
    fn total_for_two_and_a_half_hours() {
        let s = slot("09:00", "11:30");
        assert_eq!(s.minutes(), 150);
        assert_eq!(s.duration_hours(), 2.5);
        let price = parse_unit_price("₹50/hour").unwrap();
        assert_eq!(total_amount(price, &s), 125.0);
    }

    #[test]
    fn times_accept_seconds_and_normalise() {
        let s = slot("09:00:00", "9:45");
        assert_eq!(s.start_str(), "09:00");
        assert_eq!(s.end_str(), "09:45");
    }

    #[rstest]
    #[case("2024-06-01", true)]
    #[case("2024-02-30", false)]
    #[case("06/01/2024", false)]
    fn dates_are_iso(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(parse_date(raw).is_ok(), ok);
    }

    #[test]
    fn emails_are_normalised() {
        assert_eq!(validate_email(" Ana@Example.COM ").unwrap(), "ana@example.com");
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn password_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }
}
