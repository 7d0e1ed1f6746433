//! Configuration-driven field validation.
//!
//! Each field carries a list of regex rules; the field is valid iff every
//! rule matches the raw input.

use regex::Regex;

use sso_core::config::ValidationConfig;

use crate::error::SsoError;

#[derive(Debug, Clone)]
struct Rules(Vec<Regex>);

impl Rules {
    fn compile<'a>(patterns: impl IntoIterator<Item = &'a String>) -> Result<Self, regex::Error> {
        patterns
            .into_iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    fn matches(&self, input: &str) -> bool {
        self.0.iter().all(|re| re.is_match(input))
    }

    fn check(&self, input: &str, err: SsoError) -> Result<(), SsoError> {
        if self.matches(input) { Ok(()) } else { Err(err) }
    }
}

/// Compiled field rules.
#[derive(Debug, Clone)]
pub struct Validator {
    email: Rules,
    password: Rules,
    display_name: Rules,
    phone: Rules,
    telegram: Rules,
}

impl Validator {
    pub fn new(config: &ValidationConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            email: Rules::compile(std::iter::once(&config.email_regexp))?,
            password: Rules::compile(&config.password_regexps)?,
            display_name: Rules::compile(&config.display_name_regexps)?,
            phone: Rules::compile(&config.phone_regexps)?,
            telegram: Rules::compile(&config.telegram_regexps)?,
        })
    }

    pub fn validate_email(&self, email: &str) -> Result<(), SsoError> {
        self.email.check(email, SsoError::InvalidEmail)
    }

    pub fn validate_password(&self, password: &str) -> Result<(), SsoError> {
        self.password.check(password, SsoError::InvalidPassword)
    }

    pub fn validate_display_name(&self, display_name: &str) -> Result<(), SsoError> {
        self.display_name
            .check(display_name, SsoError::InvalidDisplayName)
    }

    pub fn validate_phone(&self, phone: &str) -> Result<(), SsoError> {
        self.phone.check(phone, SsoError::InvalidPhone)
    }

    pub fn validate_telegram(&self, telegram: &str) -> Result<(), SsoError> {
        self.telegram.check(telegram, SsoError::InvalidTelegram)
    }
}
