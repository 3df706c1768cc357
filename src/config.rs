//! Verifier configuration
//!
//! Environment variables:
//! - `VERIFIER_ADMIN_ADDRESS`: administrator address (required)
//! - `VERIFIER_CHAIN_ID`: chain id attestations are bound to (default 80002)
//! - `VERIFIER_CONTRACT_ADDRESS`: verifier address attestations are bound to
//! - `TRUSTED_SIGNERS`: comma-separated oracle addresses
//! - `ATTESTATION_FRESHNESS_SECS`, `MAX_CLOCK_SKEW_SECS`
//! - `DEFAULT_PROOF_EXPIRATION_SECS`, `DEFAULT_STATE_ROOT_EXPIRATION_SECS`

use std::str::FromStr;

use alloy::primitives::Address;

use crate::crypto::AttestationDomain;
use crate::infra::{
    AttestationPolicy, Result, ValidatorConfig, VerifierError, DEFAULT_ATTESTATION_WINDOW_SECS,
};

/// Default chain id (Polygon Amoy).
pub const DEFAULT_CHAIN_ID: u64 = 80002;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    pub admin: Address,
    pub chain_id: u64,
    pub verifying_contract: Address,
    pub trusted_signers: Vec<Address>,
    pub attestation_freshness_secs: u64,
    pub max_clock_skew_secs: u64,
    /// Timeouts given to newly registered validators.
    pub default_validator_config: ValidatorConfig,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            admin: Address::ZERO,
            chain_id: DEFAULT_CHAIN_ID,
            verifying_contract: Address::ZERO,
            trusted_signers: Vec::new(),
            attestation_freshness_secs: DEFAULT_ATTESTATION_WINDOW_SECS,
            max_clock_skew_secs: DEFAULT_ATTESTATION_WINDOW_SECS,
            default_validator_config: ValidatorConfig::default(),
        }
    }
}

impl VerifierConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let admin = lookup("VERIFIER_ADMIN_ADDRESS")
            .ok_or_else(|| VerifierError::Configuration("VERIFIER_ADMIN_ADDRESS is not set".into()))
            .and_then(|value| parse_value("VERIFIER_ADMIN_ADDRESS", &value))?;

        let trusted_signers = match lookup("TRUSTED_SIGNERS") {
            Some(value) => value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| parse_value("TRUSTED_SIGNERS", s))
                .collect::<Result<Vec<Address>>>()?,
            None => defaults.trusted_signers,
        };

        Ok(Self {
            admin,
            chain_id: optional(&lookup, "VERIFIER_CHAIN_ID", defaults.chain_id)?,
            verifying_contract: optional(
                &lookup,
                "VERIFIER_CONTRACT_ADDRESS",
                defaults.verifying_contract,
            )?,
            trusted_signers,
            attestation_freshness_secs: optional(
                &lookup,
                "ATTESTATION_FRESHNESS_SECS",
                defaults.attestation_freshness_secs,
            )?,
            max_clock_skew_secs: optional(&lookup, "MAX_CLOCK_SKEW_SECS", defaults.max_clock_skew_secs)?,
            default_validator_config: ValidatorConfig {
                proof_expiration_timeout: optional(
                    &lookup,
                    "DEFAULT_PROOF_EXPIRATION_SECS",
                    defaults.default_validator_config.proof_expiration_timeout,
                )?,
                state_root_expiration_timeout: optional(
                    &lookup,
                    "DEFAULT_STATE_ROOT_EXPIRATION_SECS",
                    defaults.default_validator_config.state_root_expiration_timeout,
                )?,
            },
        })
    }

    pub fn attestation_domain(&self) -> AttestationDomain {
        AttestationDomain::new(self.chain_id, self.verifying_contract)
    }

    pub fn attestation_policy(&self) -> AttestationPolicy {
        AttestationPolicy::new(self.attestation_domain(), self.trusted_signers.iter().copied())
            .with_freshness_window(self.attestation_freshness_secs)
            .with_max_clock_skew(self.max_clock_skew_secs)
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| VerifierError::Configuration(format!("invalid {key} `{value}`: {e}")))
}

fn optional<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(value) => parse_value(key, &value),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_admin_only() {
        let config = VerifierConfig::from_lookup(lookup(&[(
            "VERIFIER_ADMIN_ADDRESS",
            "0x1111111111111111111111111111111111111111",
        )]))
        .unwrap();
        assert_eq!(config.admin, Address::repeat_byte(0x11));
        assert_eq!(config.chain_id, DEFAULT_CHAIN_ID);
        assert_eq!(config.attestation_freshness_secs, 3600);
        assert_eq!(config.default_validator_config, ValidatorConfig::default());
    }

    #[test]
    fn test_full_configuration() {
        let config = VerifierConfig::from_lookup(lookup(&[
            ("VERIFIER_ADMIN_ADDRESS", "0x1111111111111111111111111111111111111111"),
            ("VERIFIER_CHAIN_ID", "137"),
            ("VERIFIER_CONTRACT_ADDRESS", "0x2222222222222222222222222222222222222222"),
            (
                "TRUSTED_SIGNERS",
                "0x3333333333333333333333333333333333333333, 0x4444444444444444444444444444444444444444",
            ),
            ("ATTESTATION_FRESHNESS_SECS", "600"),
            ("MAX_CLOCK_SKEW_SECS", "30"),
            ("DEFAULT_PROOF_EXPIRATION_SECS", "900"),
            ("DEFAULT_STATE_ROOT_EXPIRATION_SECS", "1800"),
        ]))
        .unwrap();

        assert_eq!(config.chain_id, 137);
        assert_eq!(config.trusted_signers.len(), 2);
        let policy = config.attestation_policy();
        assert!(policy.trusted_signers.contains(&Address::repeat_byte(0x44)));
        assert_eq!(policy.freshness_window, 600);
        assert_eq!(policy.max_clock_skew, 30);
        assert_eq!(policy.domain.verifying_contract, Address::repeat_byte(0x22));
        assert_eq!(config.default_validator_config.proof_expiration_timeout, 900);
        assert_eq!(config.default_validator_config.state_root_expiration_timeout, 1800);
    }

    #[test]
    fn test_missing_admin_rejected() {
        assert!(matches!(
            VerifierConfig::from_lookup(lookup(&[])),
            Err(VerifierError::Configuration(_))
        ));
    }

    #[test]
    fn test_malformed_values_rejected() {
        let err = VerifierConfig::from_lookup(lookup(&[
            ("VERIFIER_ADMIN_ADDRESS", "0x1111111111111111111111111111111111111111"),
            ("VERIFIER_CHAIN_ID", "polygon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("VERIFIER_CHAIN_ID"));

        assert!(VerifierConfig::from_lookup(lookup(&[
            ("VERIFIER_ADMIN_ADDRESS", "0x1111111111111111111111111111111111111111"),
            ("TRUSTED_SIGNERS", "0x12"),
        ]))
        .is_err());
    }
}
