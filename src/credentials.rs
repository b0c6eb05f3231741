//! CredentialsProvider: per-user secret retrieval for the betting gateway.
//! The opaque 4-tuple is never logged — `IpatCredentials` has a custom
//! `Debug` impl that redacts everything but the `inet_id`.

use crate::error::PipelineError;
use async_trait::async_trait;
use std::fmt;

#[derive(Clone)]
pub struct IpatCredentials {
    pub inet_id: String,
    pub subscriber_number: String,
    pub pin: String,
    pub pars_number: String,
}

impl fmt::Debug for IpatCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IpatCredentials")
            .field("inet_id", &self.inet_id)
            .field("subscriber_number", &"[REDACTED]")
            .field("pin", &"[REDACTED]")
            .field("pars_number", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    async fn get_credentials(&self, user_id: &str) -> Result<IpatCredentials, PipelineError>;
}

/// Environment-variable-backed provider: no secrets-manager integration,
/// credentials are read straight from process env at request time.
pub struct EnvCredentialsProvider;

#[async_trait]
impl CredentialsProvider for EnvCredentialsProvider {
    async fn get_credentials(&self, user_id: &str) -> Result<IpatCredentials, PipelineError> {
        let prefix = format!("IPAT_{}", user_id.to_uppercase().replace('-', "_"));
        let var = |suffix: &str| std::env::var(format!("{prefix}_{suffix}"));

        let inet_id = var("INET_ID")
            .map_err(|_| PipelineError::ConfigurationError(format!("{prefix}_INET_ID not set")))?;
        let subscriber_number = var("SUBSCRIBER_NUMBER")
            .map_err(|_| PipelineError::ConfigurationError(format!("{prefix}_SUBSCRIBER_NUMBER not set")))?;
        let pin = var("PIN")
            .map_err(|_| PipelineError::ConfigurationError(format!("{prefix}_PIN not set")))?;
        let pars_number = var("PARS_NUMBER")
            .map_err(|_| PipelineError::ConfigurationError(format!("{prefix}_PARS_NUMBER not set")))?;

        if inet_id.is_empty() || subscriber_number.is_empty() || pin.is_empty() || pars_number.is_empty() {
            return Err(PipelineError::ConfigurationError(format!(
                "incomplete IPAT credentials for user {user_id}"
            )));
        }

        Ok(IpatCredentials {
            inet_id,
            subscriber_number,
            pin,
            pars_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_everything_but_inet_id() {
        let creds = IpatCredentials {
            inet_id: "U123456".to_string(),
            subscriber_number: "9999999999".to_string(),
            pin: "1234".to_string(),
            pars_number: "123456".to_string(),
        };
        let debug = format!("{creds:?}");
        assert!(debug.contains("U123456"));
        assert!(!debug.contains("9999999999"));
        assert!(!debug.contains("1234"));
        assert!(!debug.contains("123456"));
    }

    #[tokio::test]
    async fn missing_env_yields_configuration_error() {
        let provider = EnvCredentialsProvider;
        let result = provider.get_credentials("nonexistent-test-user").await;
        assert!(matches!(result, Err(PipelineError::ConfigurationError(_))));
    }
}
