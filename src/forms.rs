//! Submitted form bodies and the checks run before anything is sent.

use reqwest::Url;
use serde::Deserialize;

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 20;
pub const PASSWORD_MIN: usize = 8;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("Username is required".to_string());
        }
        if self.password.is_empty() {
            return Err("Password is required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub full_name: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), String> {
        let username = self.username.as_str();
        let length = username.chars().count();
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&length) {
            return Err(format!(
                "Username must be {USERNAME_MIN} to {USERNAME_MAX} characters"
            ));
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err("Only letters, numbers, and underscores allowed".to_string());
        }
        if self.password.chars().count() < PASSWORD_MIN {
            return Err(format!("Minimum {PASSWORD_MIN} characters"));
        }
        Ok(())
    }

    /// Blank full names go out as `null`.
    pub fn full_name(&self) -> Option<&str> {
        let name = self.full_name.trim();
        (!name.is_empty()).then_some(name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkForm {
    #[serde(default)]
    pub url: String,
}

impl LinkForm {
    pub fn validate(&self) -> Result<(), String> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err("URL is required".to_string());
        }
        Url::parse(url).map_err(|_| "Enter a full URL, e.g. https://example.com".to_string())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str, password: &str) -> RegisterForm {
        RegisterForm {
            username: username.into(),
            password: password.into(),
            full_name: String::new(),
        }
    }

    #[test]
    fn register_accepts_word_characters_within_bounds() {
        assert!(register("abc", "12345678").validate().is_ok());
        assert!(register("user_Name_2024", "correct horse").validate().is_ok());
        assert!(register(&"a".repeat(20), "12345678").validate().is_ok());
    }

    #[test]
    fn register_rejects_bad_usernames() {
        assert!(register("ab", "12345678").validate().is_err());
        assert!(register(&"a".repeat(21), "12345678").validate().is_err());
        assert_eq!(
            register("bad-name", "12345678").validate().unwrap_err(),
            "Only letters, numbers, and underscores allowed"
        );
        assert!(register("spa ce", "12345678").validate().is_err());
        assert!(register("ünïcode", "12345678").validate().is_err());
    }

    #[test]
    fn register_requires_eight_character_password() {
        assert_eq!(
            register("alice", "1234567").validate().unwrap_err(),
            "Minimum 8 characters"
        );
    }

    #[test]
    fn blank_full_name_is_omitted() {
        let mut form = register("alice", "12345678");
        form.full_name = "   ".into();
        assert_eq!(form.full_name(), None);
        form.full_name = " Alice Liddell ".into();
        assert_eq!(form.full_name(), Some("Alice Liddell"));
    }

    #[test]
    fn login_requires_both_fields() {
        let form = LoginForm {
            username: " ".into(),
            password: "secret".into(),
        };
        assert!(form.validate().is_err());
        let form = LoginForm {
            username: "alice".into(),
            password: String::new(),
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn link_must_be_an_absolute_url() {
        assert!(LinkForm { url: "https://example.com/a?b=c".into() }.validate().is_ok());
        assert!(LinkForm { url: "example.com".into() }.validate().is_err());
        assert!(LinkForm { url: "  ".into() }.validate().is_err());
    }
}
