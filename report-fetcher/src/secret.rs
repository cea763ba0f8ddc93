//! Credential resolution for the backend API key.
//!
//! The key is never stored as a compiled-in constant; the fetcher holds a
//! provider and asks it for the key on each request.

use async_trait::async_trait;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SecretError {
    #[error("Secret not found: {0}")]
    NotFound(String),

    #[error("Secret is empty: {0}")]
    Empty(String)
}

#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Retrieve a secret value by its identifier
    async fn get_secret(&self, secret_id: &str) -> Result<String, SecretError>;
}

/// Where the API key comes from.
///
/// Serializing a `Static` reference writes a redacted value, never the key.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "lowercase")]
pub enum SecretRef {
    /// Key value supplied directly.
    Static(String),
    /// Name of an environment variable holding the key.
    Env(String)
}

impl SecretRef {
    /// Identifier passed to the provider returned by [`SecretRef::provider`].
    pub fn id(&self) -> &str {
        match self {
            Self::Static(_) => STATIC_API_KEY_ID,
            Self::Env(var) => var
        }
    }

    pub fn provider(&self) -> Arc<dyn SecretProvider> {
        match self {
            Self::Static(value) => Arc::new(StaticSecretProvider::new(HashMap::from([(
                STATIC_API_KEY_ID.to_string(),
                value.clone()
            )]))),
            Self::Env(_) => Arc::new(EnvSecretProvider)
        }
    }
}

impl fmt::Debug for SecretRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(_) => write!(f, "Static({REDACTED})"),
            Self::Env(var) => f.debug_tuple("Env").field(var).finish()
        }
    }
}

impl Serialize for SecretRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (source, value) = match self {
            Self::Static(_) => ("static", REDACTED),
            Self::Env(var) => ("env", var.as_str())
        };
        let mut state = serializer.serialize_struct("SecretRef", 2)?;
        state.serialize_field("source", source)?;
        state.serialize_field("value", value)?;
        state.end()
    }
}

const REDACTED: &str = "<redacted>";
const STATIC_API_KEY_ID: &str = "api_key";

/// In-memory secrets, for local development and tests.
pub struct StaticSecretProvider {
    secrets: HashMap<String, String>
}

impl StaticSecretProvider {
    pub fn new(secrets: HashMap<String, String>) -> Self {
        Self { secrets }
    }
}

#[async_trait]
impl SecretProvider for StaticSecretProvider {
    async fn get_secret(&self, secret_id: &str) -> Result<String, SecretError> {
        let value = self
            .secrets
            .get(secret_id)
            .cloned()
            .ok_or_else(|| SecretError::NotFound(secret_id.to_string()))?;
        non_empty(secret_id, value)
    }
}

/// Reads the secret from the environment variable named by the identifier.
///
/// Looked up on every call so a rotated key is picked up without a restart.
pub struct EnvSecretProvider;

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    async fn get_secret(&self, secret_id: &str) -> Result<String, SecretError> {
        let value = std::env::var(secret_id)
            .map_err(|_| SecretError::NotFound(secret_id.to_string()))?;
        non_empty(secret_id, value)
    }
}

fn non_empty(secret_id: &str, value: String) -> Result<String, SecretError> {
    if value.trim().is_empty() {
        Err(SecretError::Empty(secret_id.to_string()))
    } else {
        Ok(value)
    }
}
