// Field validation for create/update requests.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is a valid regex")
});

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[0-9 ().-]+$").expect("phone pattern is a valid regex")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email) && email.len() <= 254
}

pub fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    PHONE_PATTERN.is_match(phone) && (7..=20).contains(&digits)
}

/// Collects every field problem of a request so the caller sees them all at once.
#[derive(Debug, Default)]
pub struct Validator {
    issues: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(&mut self, label: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.issues.push(format!("{} is required", label));
        }
        self
    }

    pub fn max_length(&mut self, label: &str, value: &str, max: usize) -> &mut Self {
        if value.chars().count() > max {
            self.issues
                .push(format!("{} cannot be longer than {} characters", label, max));
        }
        self
    }

    pub fn email(&mut self, value: &str) -> &mut Self {
        if !value.trim().is_empty() && !is_valid_email(value) {
            self.issues.push("Invalid email address".to_string());
        }
        self
    }

    pub fn phone(&mut self, value: &str) -> &mut Self {
        if !value.trim().is_empty() && !is_valid_phone(value) {
            self.issues.push("Invalid phone number".to_string());
        }
        self
    }

    pub fn range(&mut self, label: &str, value: i32, min: i32, max: i32) -> &mut Self {
        if value < min || value > max {
            self.issues
                .push(format!("{} must be between {} and {}", label, min, max));
        }
        self
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn finish(&self) -> Result<(), String> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(self.issues.join("; "))
        }
    }
}
