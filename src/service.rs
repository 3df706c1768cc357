//! Administrative and public surface of the universal verifier
//!
//! [`UniversalVerifier`] owns the request registry, the validator whitelist
//! and the verification engine. Mutations that change what is accepted are
//! gated on the administrator; response submission and status queries are
//! open to everyone.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes};
use tracing::{info, instrument, warn};

use crate::auth::AdminGate;
use crate::codec::decode_query_params;
use crate::config::VerifierConfig;
use crate::domain::{ProofStatus, ProofSubmission, RequestId, SubmitOutcome, ZkRequest};
use crate::infra::{
    AttestationVerifier, Clock, InMemoryProofStatusStore, InMemoryRequestRegistry,
    ProofStatusStore, RequestRegistry, Result, SystemClock, Validator, ValidatorConfig,
    ValidatorWhitelist, VerificationEngine, VerificationListener, VerifierError,
};
use crate::metrics::{metric_names, MetricsRegistry};

pub struct UniversalVerifier {
    gate: AdminGate,
    engine: VerificationEngine,
    default_validator_config: ValidatorConfig,
}

impl UniversalVerifier {
    pub fn new(
        admin: Address,
        registry: Arc<dyn RequestRegistry>,
        statuses: Arc<dyn ProofStatusStore>,
        attestations: AttestationVerifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let engine = VerificationEngine::new(
            registry,
            statuses,
            Arc::new(ValidatorWhitelist::new()),
            attestations,
            clock,
        );
        Self {
            gate: AdminGate::new(admin),
            engine,
            default_validator_config: ValidatorConfig::default(),
        }
    }

    /// In-memory verifier on the system clock, configured from `config`.
    pub fn from_config(config: &VerifierConfig) -> Self {
        Self::new(
            config.admin,
            Arc::new(InMemoryRequestRegistry::new()),
            Arc::new(InMemoryProofStatusStore::new()),
            AttestationVerifier::new(config.attestation_policy()),
            Arc::new(SystemClock),
        )
        .with_default_validator_config(config.default_validator_config)
    }

    /// Timeouts applied by [`UniversalVerifier::register_validator`] when the
    /// validator is registered without its own.
    pub fn with_default_validator_config(mut self, config: ValidatorConfig) -> Self {
        self.default_validator_config = config;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.engine = self.engine.with_metrics(metrics);
        self
    }

    pub fn engine(&self) -> &VerificationEngine {
        &self.engine
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        self.engine.metrics()
    }

    pub fn admin(&self) -> Result<Address> {
        self.gate.admin()
    }

    pub fn add_listener(&self, listener: Arc<dyn VerificationListener>) -> Result<()> {
        self.engine.add_listener(listener)
    }

    // ========================================================================
    // Validator whitelist
    // ========================================================================

    /// Whitelist a validator, replacing any validator at the same address.
    pub async fn register_validator(&self, caller: Address, validator: Validator) -> Result<()> {
        self.gate.require_admin(caller)?;
        let validator = if validator.config == ValidatorConfig::default() {
            validator.with_config(self.default_validator_config)
        } else {
            validator
        };
        info!(
            validator = %validator.address,
            circuit = %validator.circuit,
            "Validator whitelisted"
        );
        self.engine.validators().insert(validator)?;
        self.update_validator_gauge().await;
        Ok(())
    }

    /// Remove a validator. Requests bound to it stop accepting responses.
    pub async fn remove_validator(&self, caller: Address, validator: Address) -> Result<()> {
        self.gate.require_admin(caller)?;
        if self.engine.validators().remove(&validator)?.is_none() {
            return Err(VerifierError::ValidatorNotWhitelisted(validator));
        }
        info!(validator = %validator, "Validator removed from whitelist");
        self.update_validator_gauge().await;
        Ok(())
    }

    pub fn is_whitelisted(&self, validator: &Address) -> bool {
        self.engine.validators().is_whitelisted(validator)
    }

    pub fn set_proof_expiration_timeout(
        &self,
        caller: Address,
        validator: Address,
        secs: u64,
    ) -> Result<()> {
        self.gate.require_admin(caller)?;
        self.engine
            .validators()
            .update_config(&validator, |config| config.proof_expiration_timeout = secs)?;
        info!(validator = %validator, secs, "Proof expiration timeout updated");
        Ok(())
    }

    pub fn set_state_root_expiration_timeout(
        &self,
        caller: Address,
        validator: Address,
        secs: u64,
    ) -> Result<()> {
        self.gate.require_admin(caller)?;
        self.engine
            .validators()
            .update_config(&validator, |config| config.state_root_expiration_timeout = secs)?;
        info!(validator = %validator, secs, "State root expiration timeout updated");
        Ok(())
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Register a request, or replace an existing one with the same id.
    #[instrument(skip(self, metadata, params), fields(caller = %caller, validator = %validator))]
    pub async fn register_request(
        &self,
        caller: Address,
        request_id: RequestId,
        validator: Address,
        metadata: impl Into<String>,
        params: Bytes,
    ) -> Result<()> {
        self.gate.require_admin(caller)?;
        if !self.engine.validators().is_whitelisted(&validator) {
            return Err(VerifierError::ValidatorNotWhitelisted(validator));
        }
        decode_query_params(&params)?;

        // Nothing is written until every read has succeeded.
        let overwritten = match self.engine.registry().get(request_id).await? {
            Some(previous) => Some((
                previous,
                self.engine.statuses().verified_count(request_id).await?,
            )),
            None => None,
        };

        let request = ZkRequest {
            request_id,
            validator,
            metadata: metadata.into(),
            params,
        };
        self.engine.registry().put(request).await?;

        let metrics = self.engine.metrics();
        match overwritten {
            Some((previous, verified)) => {
                warn!(
                    request_id,
                    previous_validator = %previous.validator,
                    verified_subjects = verified,
                    "Request overwritten"
                );
                metrics.inc_counter(metric_names::REQUESTS_OVERWRITTEN).await;
            }
            None => {
                info!(request_id, "Request registered");
                metrics.inc_counter(metric_names::REQUESTS_REGISTERED).await;
            }
        }
        Ok(())
    }

    pub async fn get_request(&self, request_id: RequestId) -> Result<ZkRequest> {
        self.engine
            .registry()
            .get(request_id)
            .await?
            .ok_or(VerifierError::RequestNotFound(request_id))
    }

    pub async fn request_ids(&self) -> Result<Vec<RequestId>> {
        self.engine.registry().request_ids().await
    }

    // ========================================================================
    // Responses
    // ========================================================================

    pub async fn submit_response(
        &self,
        subject: Address,
        submission: &ProofSubmission,
        cross_chain_proofs: &[u8],
    ) -> Result<SubmitOutcome> {
        self.engine
            .submit_response(subject, submission, cross_chain_proofs)
            .await
    }

    pub async fn submit_responses(
        &self,
        subject: Address,
        submissions: &[ProofSubmission],
        cross_chain_proofs: &[u8],
    ) -> Result<Vec<SubmitOutcome>> {
        self.engine
            .submit_responses(subject, submissions, cross_chain_proofs)
            .await
    }

    pub async fn get_proof_status(
        &self,
        subject: Address,
        request_id: RequestId,
    ) -> Result<ProofStatus> {
        self.engine.get_proof_status(subject, request_id).await
    }

    pub async fn is_proof_verified(&self, subject: Address, request_id: RequestId) -> Result<bool> {
        Ok(self.get_proof_status(subject, request_id).await?.is_verified)
    }

    // ========================================================================
    // Administration
    // ========================================================================

    pub fn transfer_admin(&self, caller: Address, new_admin: Address) -> Result<()> {
        self.gate.transfer(caller, new_admin)
    }

    async fn update_validator_gauge(&self) {
        self.engine
            .metrics()
            .set_gauge(
                metric_names::VALIDATORS_WHITELISTED,
                self.engine.validators().len() as u64,
            )
            .await;
    }
}
