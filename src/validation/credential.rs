//! Login credential schema and live password-requirement indicators.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{FieldErrors, Schema};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$")
        .unwrap()
});
static UPPERCASE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z]").unwrap());
static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]").unwrap());
static SPECIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[!@#$%^&*(),.?":{}|<>]"#).unwrap());

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// One of the password rules shown under the password field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PasswordRequirement {
    Length,
    Uppercase,
    Number,
    Special,
}

impl PasswordRequirement {
    /// Display order under the password field.
    pub const ALL: [PasswordRequirement; 4] =
        [Self::Length, Self::Uppercase, Self::Number, Self::Special];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Length => "length",
            Self::Uppercase => "uppercase",
            Self::Number => "number",
            Self::Special => "special",
        }
    }

    /// Short indicator label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Length => "6자이상",
            Self::Uppercase => "대문자",
            Self::Number => "숫자혼합",
            Self::Special => "기호혼합",
        }
    }

    /// Inline error when the rule fails on submit.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Length => "비밀번호는 6자 이상이어야 합니다.",
            Self::Uppercase => "대문자를 포함해야 합니다.",
            Self::Number => "숫자를 포함해야 합니다.",
            Self::Special => "기호를 포함해야 합니다.",
        }
    }

    pub fn test(&self, password: &str) -> bool {
        match self {
            Self::Length => password.chars().count() >= MIN_PASSWORD_LEN,
            Self::Uppercase => UPPERCASE.is_match(password),
            Self::Number => NUMBER.is_match(password),
            Self::Special => SPECIAL.is_match(password),
        }
    }

    /// Indicator state; `Inactive` until something has been typed.
    pub fn status(&self, password: &str) -> RequirementStatus {
        if password.is_empty() {
            RequirementStatus::Inactive
        } else if self.test(password) {
            RequirementStatus::Success
        } else {
            RequirementStatus::Error
        }
    }
}

/// Visual state of a password requirement indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementStatus {
    Inactive,
    Success,
    Error,
}

/// All four indicators, in display order.
pub fn requirement_statuses(password: &str) -> [(PasswordRequirement, RequirementStatus); 4] {
    PasswordRequirement::ALL.map(|req| (req, req.status(password)))
}

/// Whether `email` is syntactically valid.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// A validated email/password pair. Stored as-is (no hashing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub email: String,
    pub password: String,
}

impl Credential {
    pub fn matches(&self, other: &Credential) -> bool {
        self.email == other.email && self.password == other.password
    }
}

/// Raw login form input.
#[derive(Debug, Clone, Default)]
pub struct CredentialForm {
    pub email: String,
    pub password: String,
}

impl Schema for CredentialForm {
    type Output = Credential;

    fn validate(&self) -> Result<Credential, FieldErrors> {
        let mut errors = FieldErrors::new();

        if !is_valid_email(&self.email) {
            errors.add("email", "이메일 형식이 올바르지 않습니다.");
        }
        if let Some(failed) = PasswordRequirement::ALL
            .iter()
            .find(|req| !req.test(&self.password))
        {
            errors.add("password", failed.message());
        }

        errors.into_result(|| Credential {
            email: self.email.clone(),
            password: self.password.clone(),
        })
    }
}
