//! Stream credentials.

use std::fmt;

use crate::error::{ConfigError, Result};

pub const CONSUMER_KEY_ENV: &str = "SP_TWITTER_KEY";
pub const CONSUMER_SECRET_ENV: &str = "SP_TWITTER_SECRET";
pub const ACCESS_TOKEN_ENV: &str = "SP_TWITTER_ACCESSTOKEN";
pub const ACCESS_SECRET_ENV: &str = "SP_TWITTER_ACCESSSECRET";

/// The four OAuth1 credential values. All are required.
#[derive(Clone, PartialEq, Eq)]
pub struct TwitterCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_secret: String,
}

impl TwitterCredentials {
    /// Read credentials from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnv`] naming the first variable that is
    /// unset or empty.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read credentials through an arbitrary lookup function.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnv`] naming the first variable the
    /// lookup cannot supply.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| -> Result<String> {
            match lookup(var) {
                Some(value) if !value.trim().is_empty() => Ok(value),
                _ => Err(ConfigError::MissingEnv { var }.into()),
            }
        };

        Ok(Self {
            consumer_key: required(CONSUMER_KEY_ENV)?,
            consumer_secret: required(CONSUMER_SECRET_ENV)?,
            access_token: required(ACCESS_TOKEN_ENV)?,
            access_secret: required(ACCESS_SECRET_ENV)?,
        })
    }
}

impl fmt::Debug for TwitterCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwitterCredentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &self.access_token)
            .field("access_secret", &"<redacted>")
            .finish()
    }
}
