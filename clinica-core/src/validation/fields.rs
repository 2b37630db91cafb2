//! Field validators
//!
//! Each validator inspects one primitive value and returns whether it is
//! acceptable. None of them touch state.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

pub const SPECIALITIES: &[&str] = &[
    "Chirurg",
    "Ortoped",
    "Pediatru",
    "Oftalmolog",
    "Cardiolog",
    "Neurolog",
];

pub const APPOINTMENT_STATUSES: &[&str] = &["Onorata", "Neprezentat", "Anulata"];

pub const DIAGNOSTICS: &[&str] = &[
    "Alzheimer",
    "Astigmatism",
    "Cataracta",
    "Cistita",
    "Diabet",
    "Enterocolita",
    "Entorsa",
    "Epilepsie",
    "Fractura",
    "Gripa",
    "Hepatita",
    "Hipermetropie",
    "Indigestie",
    "Luxatie",
    "Miocardita",
    "Miopie",
    "Parkinson",
    "Pericardita",
    "Raceala",
];

/// Characters of which a password must contain at least one
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const MIN_YEAR: i32 = 1903;
pub const MAX_YEAR: i32 = 2024;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w.-]+@[a-zA-Z\d.-]+\.[a-zA-Z]{2,}$").expect("email pattern compiles")
});

pub fn is_valid_name(name: &str) -> bool {
    name.chars().count() >= 3 && name.chars().next().is_some_and(char::is_uppercase)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

pub fn is_valid_phone_number(phone_number: &str) -> bool {
    phone_number.chars().count() == 10 && phone_number.starts_with("07")
}

pub fn is_valid_cnp(cnp: &str) -> bool {
    cnp.chars().count() == 13
}

pub fn is_valid_age(age: i32) -> bool {
    (0..=120).contains(&age)
}

/// ISO calendar date with a year in `MIN_YEAR..=MAX_YEAR`
pub fn is_valid_date(date: &str) -> bool {
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .is_ok_and(|parsed| (MIN_YEAR..=MAX_YEAR).contains(&parsed.year()))
}

pub fn is_valid_speciality(speciality: &str) -> bool {
    SPECIALITIES.contains(&speciality)
}

pub fn is_valid_status(status: &str) -> bool {
    APPOINTMENT_STATUSES.contains(&status)
}

pub fn is_valid_diagnostic(diagnostic: &str) -> bool {
    DIAGNOSTICS.contains(&diagnostic)
}

pub fn is_valid_user_name(user_name: &str) -> bool {
    user_name.chars().count() >= 5
}

pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= 8 && password.chars().any(|c| PASSWORD_SYMBOLS.contains(c))
}

/// Any boolean is acceptable; kept so every patient field has a validator
pub fn is_valid_is_active(_is_active: bool) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name() {
        assert!(is_valid_name("Ana"));
        assert!(is_valid_name("Ștefan"));
        assert!(!is_valid_name("An"));
        assert!(!is_valid_name("ana"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("3rd"));
    }

    #[test]
    fn test_email() {
        assert!(is_valid_email("user@domain.tld"));
        assert!(is_valid_email("ion.popescu-2@spital.example.ro"));
        assert!(!is_valid_email("user.domain.tld"));
        assert!(!is_valid_email("user@domain"));
        assert!(!is_valid_email("user@domain.c"));
        assert!(!is_valid_email("user@@domain.com"));
    }

    #[test]
    fn test_phone_number() {
        assert!(is_valid_phone_number("0712345678"));
        assert!(!is_valid_phone_number("1234567890"));
        assert!(!is_valid_phone_number("0712"));
        assert!(!is_valid_phone_number("07123456789"));
    }

    #[test]
    fn test_cnp() {
        assert!(is_valid_cnp("1960101123456"));
        assert!(!is_valid_cnp("196010112345"));
        assert!(!is_valid_cnp("19601011234567"));
    }

    #[test]
    fn test_age_bounds() {
        assert!(is_valid_age(0));
        assert!(is_valid_age(120));
        assert!(!is_valid_age(-1));
        assert!(!is_valid_age(121));
    }

    #[test]
    fn test_date() {
        assert!(is_valid_date("2024-01-01"));
        assert!(is_valid_date("1903-01-01"));
        assert!(!is_valid_date("1900-01-01"));
        assert!(!is_valid_date("2025-01-01"));
        assert!(!is_valid_date("31-12-2024"));
        assert!(!is_valid_date("2024-02-30"));
        assert!(!is_valid_date("not a date"));
    }

    #[test]
    fn test_enums() {
        assert!(is_valid_speciality("Cardiolog"));
        assert!(!is_valid_speciality("cardiolog"));
        assert!(is_valid_status("Anulata"));
        assert!(!is_valid_status("Pending"));
        assert!(is_valid_diagnostic("Raceala"));
        assert!(!is_valid_diagnostic("Covid"));
        assert_eq!(DIAGNOSTICS.len(), 19);
    }

    #[test]
    fn test_user_name() {
        assert!(is_valid_user_name("ionp1"));
        assert!(!is_valid_user_name("ion"));
    }

    #[test]
    fn test_password() {
        assert!(is_valid_password("secret!42"));
        assert!(!is_valid_password("secret42"));
        assert!(!is_valid_password("s!3"));
        assert!(is_valid_password("abcdefg\""));
    }

    #[test]
    fn test_is_active() {
        assert!(is_valid_is_active(true));
        assert!(is_valid_is_active(false));
    }
}
