//! Client-side field validation

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z\s\-']+$").expect("valid name regex"));

/// Validate an email field. Returns the inline error, if any.
pub fn validate_email(email: &str) -> Option<&'static str> {
    if email.trim().is_empty() {
        return Some("Email is required");
    }
    if !EMAIL_RE.is_match(email) {
        return Some("Invalid email address");
    }
    None
}

/// Shape check only, no messages
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// At least two characters of letters, spaces, hyphens or apostrophes
pub fn is_valid_full_name(name: &str) -> bool {
    name.trim().chars().count() >= 2 && NAME_RE.is_match(name)
}

/// One rule a new password must satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordRequirement {
    MinLength,
    Uppercase,
    Lowercase,
    Digit,
    Special,
}

impl PasswordRequirement {
    /// All rules, in display order
    pub const ALL: [PasswordRequirement; 5] = [
        PasswordRequirement::MinLength,
        PasswordRequirement::Uppercase,
        PasswordRequirement::Lowercase,
        PasswordRequirement::Digit,
        PasswordRequirement::Special,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::MinLength => "At least 8 characters",
            Self::Uppercase => "One uppercase letter (A-Z)",
            Self::Lowercase => "One lowercase letter (a-z)",
            Self::Digit => "One number (0-9)",
            Self::Special => "One special character (!@#$%^&*)",
        }
    }

    pub fn is_met(&self, password: &str) -> bool {
        match self {
            Self::MinLength => password.chars().count() >= 8,
            Self::Uppercase => password.chars().any(|c| c.is_ascii_uppercase()),
            Self::Lowercase => password.chars().any(|c| c.is_ascii_lowercase()),
            Self::Digit => password.chars().any(|c| c.is_ascii_digit()),
            Self::Special => password.chars().any(|c| "!@#$%^&*".contains(c)),
        }
    }
}

/// Rules `password` does not meet yet
pub fn unmet_requirements(password: &str) -> Vec<PasswordRequirement> {
    PasswordRequirement::ALL
        .into_iter()
        .filter(|req| !req.is_met(password))
        .collect()
}

/// Strength meter level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PasswordStrength {
    Empty,
    Weak,
    Fair,
    Good,
    Strong,
}

/// Score from 0 to 5: length ≥ 8, length ≥ 12, uppercase, digit,
/// non-alphanumeric.
pub fn password_score(password: &str) -> u8 {
    let len = password.chars().count();
    [
        len >= 8,
        len >= 12,
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ]
    .into_iter()
    .filter(|hit| *hit)
    .count() as u8
}

pub fn password_strength(password: &str) -> PasswordStrength {
    if password.is_empty() {
        return PasswordStrength::Empty;
    }
    match password_score(password) {
        0 | 1 => PasswordStrength::Weak,
        2 => PasswordStrength::Fair,
        3 => PasswordStrength::Good,
        _ => PasswordStrength::Strong,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(""), Some("Email is required"));
        assert_eq!(validate_email("   "), Some("Email is required"));
        assert_eq!(validate_email("user@example"), Some("Invalid email address"));
        assert_eq!(validate_email("us er@example.com"), Some("Invalid email address"));
        assert_eq!(validate_email("user@example.com"), None);
    }

    #[test]
    fn test_full_name() {
        assert!(is_valid_full_name("Jane O'Neil-Smith"));
        assert!(!is_valid_full_name("J"));
        assert!(!is_valid_full_name(" J "));
        assert!(!is_valid_full_name("Jane99"));
    }

    #[test]
    fn test_password_requirements() {
        assert_eq!(unmet_requirements("Secret#123"), vec![]);
        assert_eq!(
            unmet_requirements("secret"),
            vec![
                PasswordRequirement::MinLength,
                PasswordRequirement::Uppercase,
                PasswordRequirement::Digit,
                PasswordRequirement::Special,
            ]
        );
        // only the listed specials count
        assert!(!PasswordRequirement::Special.is_met("Secret_123"));
    }

    #[test]
    fn test_password_strength() {
        assert_eq!(password_strength(""), PasswordStrength::Empty);
        assert_eq!(password_score("abc"), 0);
        assert_eq!(password_score("Secret#123"), 4);
        assert_eq!(password_score("LongerSecret#123"), 5);
        assert_eq!(password_strength("abcdefgh"), PasswordStrength::Weak);
        assert_eq!(password_strength("LongerSecret#123"), PasswordStrength::Strong);
    }
}
