//! Access token and instance URL resolution.

use crate::error::SyncError;
use std::fmt;

/// Fallback source of credentials, typically an already authenticated org
/// session owned by someone else.
pub trait SessionSource {
    fn access_token(&self) -> Option<String>;
    fn instance_url(&self) -> Option<String>;
}

/// Explicit values that take precedence over the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialOverrides {
    pub access_token: Option<String>,
    pub instance_url: Option<String>,
}

/// Validated credentials. Both fields are non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_token: String,
    instance_url: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("instance_url", &self.instance_url)
            .finish()
    }
}

impl Credentials {
    /// Builds credentials, rejecting blank values.
    ///
    /// A trailing `/` on the instance URL is dropped.
    pub fn new(
        access_token: impl Into<String>,
        instance_url: impl Into<String>,
    ) -> Result<Self, SyncError> {
        let access_token = access_token.into().trim().to_string();
        let instance_url = instance_url.into().trim().trim_end_matches('/').to_string();

        if access_token.is_empty() {
            return Err(SyncError::Configuration(
                "access token is missing".to_string(),
            ));
        }
        if instance_url.is_empty() {
            return Err(SyncError::Configuration(
                "instance URL is missing".to_string(),
            ));
        }
        Ok(Self {
            access_token,
            instance_url,
        })
    }

    /// Resolves credentials field by field: a non-empty override wins over
    /// the session's value.
    pub fn resolve(
        overrides: &CredentialOverrides,
        session: &dyn SessionSource,
    ) -> Result<Self, SyncError> {
        let access_token = pick(overrides.access_token.as_deref(), session.access_token());
        let instance_url = pick(overrides.instance_url.as_deref(), session.instance_url());
        Self::new(
            access_token.unwrap_or_default(),
            instance_url.unwrap_or_default(),
        )
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }
}

fn pick(explicit: Option<&str>, fallback: Option<String>) -> Option<String> {
    match explicit {
        Some(value) if !value.trim().is_empty() => Some(value.to_string()),
        _ => fallback.filter(|v| !v.trim().is_empty()),
    }
}
