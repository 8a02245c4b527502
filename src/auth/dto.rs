use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

pub const USERNAME_MAX: usize = 80;
pub const EMAIL_MAX: usize = 120;
pub const PASSWORD_MIN: usize = 8;

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Registration form body.
#[derive(Debug, Default, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Registration input after trimming and validation.
#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<NewUser, Vec<String>> {
        let mut errors = Vec::new();

        let username = self.username.trim();
        if username.is_empty() {
            errors.push("Username is required".to_string());
        } else if username.chars().count() > USERNAME_MAX {
            errors.push(format!("Username must be at most {USERNAME_MAX} characters"));
        }

        let email = self.email.trim();
        let email = (!email.is_empty()).then_some(email);
        if let Some(email) = email {
            if !is_valid_email(email) {
                errors.push("Invalid email".to_string());
            } else if email.chars().count() > EMAIL_MAX {
                errors.push(format!("Email must be at most {EMAIL_MAX} characters"));
            }
        }

        if self.password.chars().count() < PASSWORD_MIN {
            errors.push(format!("Password must be at least {PASSWORD_MIN} characters"));
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(NewUser {
            username: username.to_string(),
            email: email.map(str::to_string),
            password: self.password.clone(),
        })
    }
}

/// Login form body.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}
