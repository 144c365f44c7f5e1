//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::models::punch_card::NewPunchCard;

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate a person name field (first or last name)
pub fn validate_name(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is required"));
    }

    if value.len() > 100 {
        return Err(format!("{field} must be at most 100 characters long"));
    }

    Ok(())
}

/// Validate a new punch card payload
pub fn validate_new_punch_card(payload: &NewPunchCard) -> Result<(), String> {
    if payload.name.trim().is_empty() {
        return Err("Name is required".to_string());
    }

    if payload.total_punches <= 0 {
        return Err("Total punches must be greater than zero".to_string());
    }

    if payload.total_punches > 1000 {
        return Err("Total punches must be at most 1000".to_string());
    }

    if payload.price_per_punch_cents < 0 || payload.total_price_cents < 0 {
        return Err("Prices must not be negative".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_email() {
        assert!(validate_email("member@example.com").is_ok());
    }

    #[test]
    fn rejects_invalid_emails() {
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
    }

    #[test]
    fn rejects_short_password() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("longenough1").is_ok());
    }

    #[test]
    fn rejects_blank_name() {
        assert!(validate_name("First name", "  ").is_err());
        assert!(validate_name("First name", "Ada").is_ok());
    }

    #[test]
    fn punch_card_payload_limits() {
        let mut payload = NewPunchCard {
            name: "10 Visits".to_string(),
            total_punches: 10,
            price_per_punch_cents: 1500,
            total_price_cents: 15000,
        };
        assert!(validate_new_punch_card(&payload).is_ok());

        payload.total_punches = 0;
        assert!(validate_new_punch_card(&payload).is_err());

        payload.total_punches = 10;
        payload.total_price_cents = -1;
        assert!(validate_new_punch_card(&payload).is_err());
    }
}
