use std::{fmt, path::PathBuf};

use secrecy::SecretString;

use crate::error::{Error, Result};

pub const EMAIL_VAR: &str = "DIGI1_USER_EMAIL";
pub const PASSWORD_VAR: &str = "DIGI1_USER_PASSWORD";
pub const PATH_SECRET_VAR: &str = "PATH_SECRET";
pub const BASE_URL_VAR: &str = "DIGI1_BASE_URL";
pub const OUTPUT_DIR_VAR: &str = "DIGI1_OUTPUT_DIR";

pub const DEFAULT_BASE_URL: &str = "https://app.digi1.lt";
pub const DEFAULT_OUTPUT_DIR: &str = "docs";

/// Account credentials for the Digi1 login.
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Process-wide settings, read once at startup and passed explicitly from there on.
#[derive(Debug)]
pub struct Config {
    pub credentials: Credentials,
    pub path_secret: String,
    pub base_url: String,
    pub output_dir: PathBuf,
}

impl Config {
    /// Builds the config from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require =
            |key: &str| get(key).ok_or_else(|| Error::Config(format!("{key} must be set")));

        let email = require(EMAIL_VAR)?;
        let password = require(PASSWORD_VAR)?;
        let path_secret = require(PATH_SECRET_VAR)?;

        let base_url = get(BASE_URL_VAR)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let output_dir = get(OUTPUT_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        Ok(Self {
            credentials: Credentials {
                email,
                password: SecretString::new(password),
            },
            path_secret,
            base_url,
            output_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn reads_required_values_and_defaults() {
        let config = Config::from_lookup(lookup(&[
            (EMAIL_VAR, "teacher@example.com"),
            (PASSWORD_VAR, "hunter2"),
            (PATH_SECRET_VAR, "s3cr3t"),
        ]))
        .unwrap();

        assert_eq!(config.credentials.email, "teacher@example.com");
        assert_eq!(config.credentials.password.expose_secret(), "hunter2");
        assert_eq!(config.path_secret, "s3cr3t");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.output_dir, PathBuf::from("docs"));
    }

    #[test]
    fn overrides_strip_trailing_slash() {
        let config = Config::from_lookup(lookup(&[
            (EMAIL_VAR, "a@b.c"),
            (PASSWORD_VAR, "pw"),
            (PATH_SECRET_VAR, "x"),
            (BASE_URL_VAR, "http://127.0.0.1:8080/"),
            (OUTPUT_DIR_VAR, "/tmp/out"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn missing_or_empty_values_are_config_errors() {
        let err = Config::from_lookup(lookup(&[(EMAIL_VAR, "a@b.c"), (PATH_SECRET_VAR, "x")]))
            .unwrap_err();
        assert!(matches!(&err, Error::Config(msg) if msg.contains(PASSWORD_VAR)));

        let err = Config::from_lookup(lookup(&[
            (EMAIL_VAR, "a@b.c"),
            (PASSWORD_VAR, "pw"),
            (PATH_SECRET_VAR, ""),
        ]))
        .unwrap_err();
        assert!(matches!(&err, Error::Config(msg) if msg.contains(PATH_SECRET_VAR)));
    }

    #[test]
    fn debug_output_hides_password() {
        let config = Config::from_lookup(lookup(&[
            (EMAIL_VAR, "a@b.c"),
            (PASSWORD_VAR, "topsecret"),
            (PATH_SECRET_VAR, "x"),
        ]))
        .unwrap();
        assert!(!format!("{config:?}").contains("topsecret"));
    }
}
