//! Secret store contract and environment-backed implementation.
//!
//! The platform keychain is an external collaborator; the core only depends
//! on this narrow read/write contract.

use async_trait::async_trait;

use crate::Result;

/// Narrow contract over an external secret store (keychain, vault, env).
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Read a secret, returning `None` when absent.
    async fn read_secret(&self, service: &str, account: &str) -> Result<Option<String>>;

    /// Write (or overwrite) a secret.
    async fn write_secret(&self, service: &str, account: &str, value: &str) -> Result<()>;
}

/// Secret store backed by process environment variables.
///
/// `read_secret("clipnote", "api_key")` resolves `CLIPNOTE_API_KEY`. Writes
/// affect only the current process environment.
#[derive(Debug, Default, Clone)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    pub fn new() -> Self {
        Self
    }

    fn var_name(service: &str, account: &str) -> String {
        format!("{}_{}", service, account)
            .to_uppercase()
            .replace(['-', '.', ' '], "_")
    }
}

#[async_trait]
impl SecretStore for EnvSecretStore {
    async fn read_secret(&self, service: &str, account: &str) -> Result<Option<String>> {
        let name = Self::var_name(service, account);
        Ok(std::env::var(&name).ok().filter(|v| !v.is_empty()))
    }

    async fn write_secret(&self, service: &str, account: &str, value: &str) -> Result<()> {
        let name = Self::var_name(service, account);
        std::env::set_var(name, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_name_is_uppercased_and_sanitized() {
        assert_eq!(EnvSecretStore::var_name("clipnote", "api_key"), "CLIPNOTE_API_KEY");
        assert_eq!(EnvSecretStore::var_name("my-app", "token"), "MY_APP_TOKEN");
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let store = EnvSecretStore::new();
        store
            .write_secret("clipnote-test", "round_trip", "sk-abc")
            .await
            .unwrap();
        let got = store.read_secret("clipnote-test", "round_trip").await.unwrap();
        assert_eq!(got.as_deref(), Some("sk-abc"));
    }

    #[tokio::test]
    async fn missing_secret_reads_none() {
        let store = EnvSecretStore::new();
        let got = store
            .read_secret("clipnote-test", "definitely_absent")
            .await
            .unwrap();
        assert!(got.is_none());
    }
}
