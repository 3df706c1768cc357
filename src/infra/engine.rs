//! Response verification engine
//!
//! A response moves its `(subject, request_id)` status from unverified to
//! verified exactly once. Every check runs before the status write, so a
//! rejected response leaves no trace beyond logs and metrics.

use std::sync::{Arc, RwLock};

use alloy::primitives::{Address, U256};
use tracing::{debug, info, instrument, warn};

use crate::codec::{decode_query_params, unpack_zk_proof};
use crate::domain::{
    address_to_u256, AttestedState, ProofStatus, ProofSubmission, QueryParams, RequestId,
    StatusKey, SubmitOutcome, ZkProof, ZkRequest,
};
use crate::metrics::{metric_names, timed, MetricsRegistry};

use super::{
    AttestationVerifier, Clock, DecodedSignals, ProofStatusStore, RequestRegistry, Result,
    Validator, ValidatorWhitelist, VerificationListener, VerifierError,
};

/// Request, validator and decoded proof of one submission.
struct LoadedSubmission {
    request: ZkRequest,
    validator: Validator,
    public_signals: Vec<U256>,
    proof: ZkProof,
}

/// A fully checked submission waiting for its status write.
struct PreparedVerification {
    key: StatusKey,
    status: ProofStatus,
}

/// Verifies responses and records proof status.
pub struct VerificationEngine {
    registry: Arc<dyn RequestRegistry>,
    statuses: Arc<dyn ProofStatusStore>,
    validators: Arc<ValidatorWhitelist>,
    attestations: AttestationVerifier,
    clock: Arc<dyn Clock>,
    listeners: RwLock<Vec<Arc<dyn VerificationListener>>>,
    metrics: Arc<MetricsRegistry>,
}

impl VerificationEngine {
    pub fn new(
        registry: Arc<dyn RequestRegistry>,
        statuses: Arc<dyn ProofStatusStore>,
        validators: Arc<ValidatorWhitelist>,
        attestations: AttestationVerifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            statuses,
            validators,
            attestations,
            clock,
            listeners: RwLock::new(Vec::new()),
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn registry(&self) -> &Arc<dyn RequestRegistry> {
        &self.registry
    }

    pub fn statuses(&self) -> &Arc<dyn ProofStatusStore> {
        &self.statuses
    }

    pub fn validators(&self) -> &Arc<ValidatorWhitelist> {
        &self.validators
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Register a listener for new verifications
    pub fn add_listener(&self, listener: Arc<dyn VerificationListener>) -> Result<()> {
        self.listeners
            .write()
            .map_err(|_| VerifierError::lock_poisoned("listeners"))?
            .push(listener);
        Ok(())
    }

    pub async fn get_proof_status(
        &self,
        subject: Address,
        request_id: RequestId,
    ) -> Result<ProofStatus> {
        self.statuses.get(&StatusKey::new(subject, request_id)).await
    }

    /// Verify one response and record its status.
    #[instrument(skip(self, submission, cross_chain_proofs), fields(
        subject = %subject,
        request_id = submission.request_id
    ))]
    pub async fn submit_response(
        &self,
        subject: Address,
        submission: &ProofSubmission,
        cross_chain_proofs: &[u8],
    ) -> Result<SubmitOutcome> {
        self.metrics
            .inc_counter(metric_names::RESPONSES_SUBMITTED)
            .await;

        let result = timed(&self.metrics, metric_names::VERIFY_LATENCY, async {
            let now = self.clock.now();
            let loaded = self.load(submission).await?;
            let attested = self.attestations.verify_blob(cross_chain_proofs, now)?;
            let prepared = self.check(subject, loaded, &attested, now).await?;
            self.commit(prepared).await
        })
        .await;

        self.record(subject, submission.request_id, &result).await;
        result
    }

    /// Verify a batch of responses against one shared attestation list.
    ///
    /// Every response is checked before any status is written; the first
    /// failure aborts the whole batch.
    #[instrument(skip(self, submissions, cross_chain_proofs), fields(
        subject = %subject,
        batch_size = submissions.len()
    ))]
    pub async fn submit_responses(
        &self,
        subject: Address,
        submissions: &[ProofSubmission],
        cross_chain_proofs: &[u8],
    ) -> Result<Vec<SubmitOutcome>> {
        self.metrics
            .add_counter(metric_names::RESPONSES_SUBMITTED, submissions.len() as u64)
            .await;

        let now = self.clock.now();
        let mut loaded = Vec::with_capacity(submissions.len());
        for submission in submissions {
            match self.load(submission).await {
                Ok(entry) => loaded.push(entry),
                Err(err) => return Err(self.reject(subject, submission.request_id, err).await),
            }
        }

        let attested = match self.attestations.verify_blob(cross_chain_proofs, now) {
            Ok(attested) => attested,
            Err(err) => {
                let request_id = submissions.first().map_or(0, |s| s.request_id);
                return Err(self.reject(subject, request_id, err).await);
            }
        };

        let mut prepared = Vec::with_capacity(loaded.len());
        for entry in loaded {
            let request_id = entry.request.request_id;
            match self.check(subject, entry, &attested, now).await {
                Ok(verification) => prepared.push(verification),
                Err(err) => return Err(self.reject(subject, request_id, err).await),
            }
        }

        let mut outcomes = Vec::with_capacity(prepared.len());
        for verification in prepared {
            let request_id = verification.key.request_id;
            let result = self.commit(verification).await;
            self.record(subject, request_id, &result).await;
            outcomes.push(result?);
        }
        Ok(outcomes)
    }

    // ========================================================================
    // Verification steps
    // ========================================================================

    /// Registry lookup, whitelist check and proof decoding.
    async fn load(&self, submission: &ProofSubmission) -> Result<LoadedSubmission> {
        let request = self
            .registry
            .get(submission.request_id)
            .await?
            .ok_or(VerifierError::RequestNotFound(submission.request_id))?;
        let validator = self.validators.get(&request.validator)?;

        let (public_signals, proof) =
            unpack_zk_proof(&submission.zk_proof).map_err(VerifierError::from_proof_codec)?;

        Ok(LoadedSubmission {
            request,
            validator,
            public_signals,
            proof,
        })
    }

    /// Circuit verification, query cross-check and freshness checks.
    async fn check(
        &self,
        subject: Address,
        loaded: LoadedSubmission,
        attested: &AttestedState,
        now: u64,
    ) -> Result<PreparedVerification> {
        let LoadedSubmission {
            request,
            validator,
            public_signals,
            proof,
        } = loaded;

        let signals = validator.circuit.layout().decode(&public_signals)?;
        match validator.verifier.verify(&proof, &public_signals).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(VerifierError::ProofRejected(format!(
                    "{} verifier rejected the proof",
                    validator.circuit
                )))
            }
            Err(err) => return Err(VerifierError::ProofRejected(err.to_string())),
        }

        let params = decode_query_params(&request.params)?;
        check_query(&params, &validator, &signals, request.request_id, subject)?;
        self.check_freshness(&validator, &signals, attested, now)?;

        Ok(PreparedVerification {
            key: StatusKey::new(subject, request.request_id),
            status: ProofStatus::verified(now, validator.address, signals.user_id),
        })
    }

    fn check_freshness(
        &self,
        validator: &Validator,
        signals: &DecodedSignals,
        attested: &AttestedState,
        now: u64,
    ) -> Result<()> {
        let skew = self.attestations.policy().max_clock_skew;

        let timestamp = signals.timestamp;
        if timestamp > now.saturating_add(skew) {
            return Err(VerifierError::FutureTimestamp { timestamp, now });
        }
        let timeout = validator.config.proof_expiration_timeout;
        if now.saturating_sub(timestamp) > timeout {
            return Err(VerifierError::ProofExpired {
                timestamp,
                now,
                timeout,
            });
        }

        let gist = attested
            .find_gist_root(signals.gist_root)
            .ok_or(VerifierError::StateNotAttested {
                signal: "gistRoot",
                value: signals.gist_root,
            })?;
        let reference = if gist.replaced_at_timestamp != 0 {
            gist.replaced_at_timestamp
        } else {
            gist.timestamp
        };
        let timeout = validator.config.state_root_expiration_timeout;
        if now.saturating_sub(reference) > timeout {
            return Err(VerifierError::StateRootExpired {
                root: signals.gist_root,
                reference,
                now,
                timeout,
            });
        }

        if attested
            .find_identity_state(signals.issuer_id, signals.issuer_state)
            .is_none()
        {
            return Err(VerifierError::StateNotAttested {
                signal: "issuerState",
                value: signals.issuer_state,
            });
        }

        if signals.revocation_checked() {
            let non_rev = attested
                .find_identity_state(signals.issuer_id, signals.issuer_claim_non_rev_state)
                .ok_or(VerifierError::StateNotAttested {
                    signal: "issuerClaimNonRevState",
                    value: signals.issuer_claim_non_rev_state,
                })?;
            if non_rev.replaced_at_timestamp != 0 {
                return Err(VerifierError::SupersededState {
                    id: signals.issuer_id,
                    state: signals.issuer_claim_non_rev_state,
                });
            }
        }

        Ok(())
    }

    /// Insert-if-absent, then notify listeners of new verifications.
    async fn commit(&self, prepared: PreparedVerification) -> Result<SubmitOutcome> {
        let PreparedVerification { key, status } = prepared;
        if !self.statuses.insert_if_absent(key, status).await? {
            debug!(
                subject = %key.subject,
                request_id = key.request_id,
                "Proof already verified"
            );
            return Ok(SubmitOutcome::AlreadyVerified);
        }

        info!(
            subject = %key.subject,
            request_id = key.request_id,
            validator = %status.validator,
            user_id = %status.user_id,
            "Proof verified"
        );

        let listeners = self
            .listeners
            .read()
            .map_err(|_| VerifierError::lock_poisoned("listeners"))?
            .clone();
        for listener in listeners {
            listener.on_verified(key.subject, key.request_id, &status).await;
        }

        Ok(SubmitOutcome::Verified)
    }

    async fn record(
        &self,
        subject: Address,
        request_id: RequestId,
        result: &Result<SubmitOutcome>,
    ) {
        match result {
            Ok(SubmitOutcome::Verified) => {
                self.metrics.inc_counter(metric_names::RESPONSES_VERIFIED).await;
            }
            Ok(SubmitOutcome::AlreadyVerified) => {
                self.metrics
                    .inc_counter(metric_names::RESPONSES_ALREADY_VERIFIED)
                    .await;
            }
            Err(err) => self.record_rejection(subject, request_id, err).await,
        }
    }

    async fn record_rejection(&self, subject: Address, request_id: RequestId, err: &VerifierError) {
        self.metrics.inc_counter(metric_names::RESPONSES_REJECTED).await;
        self.metrics
            .inc_counter(&metric_names::rejected_kind(err.kind_label()))
            .await;
        if err.is_audit_worthy() {
            warn!(
                target: "audit",
                subject = %subject,
                request_id,
                kind = err.kind_label(),
                error = %err,
                "Response rejected"
            );
        } else {
            debug!(
                subject = %subject,
                request_id,
                kind = err.kind_label(),
                error = %err,
                "Response rejected"
            );
        }
    }

    async fn reject(
        &self,
        subject: Address,
        request_id: RequestId,
        err: VerifierError,
    ) -> VerifierError {
        self.record_rejection(subject, request_id, &err).await;
        err
    }
}

/// Public signals must agree with the stored query and the submission.
fn check_query(
    params: &QueryParams,
    validator: &Validator,
    signals: &DecodedSignals,
    request_id: RequestId,
    subject: Address,
) -> Result<()> {
    if signals.circuit_query_hash != params.query_hash {
        return Err(VerifierError::QueryMismatch {
            field: "circuitQueryHash",
        });
    }
    if !params.accepts_circuit(validator.circuit.circuit_id()) {
        return Err(VerifierError::QueryMismatch { field: "circuitIds" });
    }
    // A non-zero claim path key selects a merklized credential.
    let expected_merklized = U256::from(u8::from(!params.claim_path_key.is_zero()));
    if signals.merklized != expected_merklized {
        return Err(VerifierError::QueryMismatch { field: "merklized" });
    }
    let expected_revocation_check = U256::from(u8::from(!params.skip_claim_revocation_check));
    if signals.is_revocation_checked != expected_revocation_check {
        return Err(VerifierError::QueryMismatch {
            field: "isRevocationChecked",
        });
    }
    if signals.request_id != U256::from(request_id) {
        return Err(VerifierError::QueryMismatch { field: "requestID" });
    }
    if signals.challenge != address_to_u256(&subject) {
        return Err(VerifierError::QueryMismatch { field: "challenge" });
    }
    Ok(())
}
