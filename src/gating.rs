//! Proof-gated token balances
//!
//! An ERC-20-like balance book whose mint and transfer paths consult proof
//! status. Status is always checked before any balance changes.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use alloy::primitives::{uint, Address, U256};
use thiserror::Error;
use tracing::info;

use crate::domain::{RequestId, StatusKey};
use crate::infra::{ProofStatusStore, VerifierError};

/// Amount minted to each verified subject (5 tokens at 18 decimals).
pub const AIRDROP_AMOUNT: U256 = uint!(5000000000000000000_U256);

/// Errors raised by the token adapter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatingError {
    #[error("subject {0} has no verified proof for a mint request")]
    SubjectNotVerified(Address),

    #[error("recipient {0} has no verified proof for a transfer request")]
    RecipientNotVerified(Address),

    #[error("insufficient balance: {available} < {requested}")]
    InsufficientBalance { available: U256, requested: U256 },

    #[error("balance overflow")]
    Overflow,

    #[error(transparent)]
    Verifier(#[from] VerifierError),
}

/// Outcome of a mint call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintOutcome {
    Minted(U256),
    AlreadyMinted,
}

#[derive(Default)]
struct Ledger {
    balances: HashMap<Address, U256>,
    minted: HashSet<Address>,
    total_supply: U256,
}

pub struct GatedToken {
    statuses: Arc<dyn ProofStatusStore>,
    mint_request_ids: Vec<RequestId>,
    transfer_request_ids: Vec<RequestId>,
    ledger: RwLock<Ledger>,
}

impl GatedToken {
    pub fn new(
        statuses: Arc<dyn ProofStatusStore>,
        mint_request_ids: Vec<RequestId>,
        transfer_request_ids: Vec<RequestId>,
    ) -> Self {
        Self {
            statuses,
            mint_request_ids,
            transfer_request_ids,
            ledger: RwLock::new(Ledger::default()),
        }
    }

    /// Mint the airdrop to `subject`, at most once.
    pub async fn mint(&self, subject: Address) -> Result<MintOutcome, GatingError> {
        if !self.verified_for_any(subject, &self.mint_request_ids).await? {
            return Err(GatingError::SubjectNotVerified(subject));
        }

        let mut ledger = self.write_ledger()?;
        if ledger.minted.contains(&subject) {
            return Ok(MintOutcome::AlreadyMinted);
        }
        let supply = ledger
            .total_supply
            .checked_add(AIRDROP_AMOUNT)
            .ok_or(GatingError::Overflow)?;
        let balance = ledger
            .balances
            .get(&subject)
            .copied()
            .unwrap_or_default()
            .checked_add(AIRDROP_AMOUNT)
            .ok_or(GatingError::Overflow)?;
        ledger.minted.insert(subject);
        ledger.balances.insert(subject, balance);
        ledger.total_supply = supply;

        info!(subject = %subject, amount = %AIRDROP_AMOUNT, "Airdrop minted");
        Ok(MintOutcome::Minted(AIRDROP_AMOUNT))
    }

    /// Move `amount` from `from` to `to`. The recipient must be verified.
    pub async fn transfer(
        &self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), GatingError> {
        if !self.verified_for_any(to, &self.transfer_request_ids).await? {
            return Err(GatingError::RecipientNotVerified(to));
        }

        let mut ledger = self.write_ledger()?;
        let available = ledger.balances.get(&from).copied().unwrap_or_default();
        if available < amount {
            return Err(GatingError::InsufficientBalance {
                available,
                requested: amount,
            });
        }
        if from != to {
            let received = ledger
                .balances
                .get(&to)
                .copied()
                .unwrap_or_default()
                .checked_add(amount)
                .ok_or(GatingError::Overflow)?;
            ledger.balances.insert(from, available - amount);
            ledger.balances.insert(to, received);
        }
        Ok(())
    }

    pub fn balance_of(&self, address: &Address) -> Result<U256, GatingError> {
        Ok(self
            .read_ledger()?
            .balances
            .get(address)
            .copied()
            .unwrap_or_default())
    }

    pub fn total_supply(&self) -> Result<U256, GatingError> {
        Ok(self.read_ledger()?.total_supply)
    }

    async fn verified_for_any(
        &self,
        subject: Address,
        request_ids: &[RequestId],
    ) -> Result<bool, GatingError> {
        for request_id in request_ids {
            if self
                .statuses
                .get(&StatusKey::new(subject, *request_id))
                .await?
                .is_verified
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn read_ledger(&self) -> Result<std::sync::RwLockReadGuard<'_, Ledger>, GatingError> {
        self.ledger
            .read()
            .map_err(|_| VerifierError::lock_poisoned("ledger").into())
    }

    fn write_ledger(&self) -> Result<std::sync::RwLockWriteGuard<'_, Ledger>, GatingError> {
        self.ledger
            .write()
            .map_err(|_| VerifierError::lock_poisoned("ledger").into())
    }
}
