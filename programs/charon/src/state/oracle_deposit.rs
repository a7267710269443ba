//! Oracle bridge: finality of deposits made on partner chains
//!
//! Each `(source chain, deposit id)` pair moves through
//!
//! ```text
//! Unsubmitted → Submitted → Finalized
//! ```
//!
//! `Submitted` is observed from the oracle feed: an undisputed value with a
//! submission count above the last one seen. Finalization re-reads the feed
//! and only accepts a value that has been undisputed for the whole dispute
//! window. Once finalized the record never changes again.
//!
//! Finalizing is split in two so the handler can load the commitment's
//! registry account between the steps, because that account's address
//! depends on the reported value:
//!
//! 1. [`OracleDeposit::prepare_finalize`] checks everything and returns the
//!    commitment
//! 2. [`complete_finalize`] assigns the inbound id, registers the
//!    commitment and inserts it into the tree

use anchor_lang::prelude::*;

use crate::error::CharonError;
use crate::oracle::{query_id, OracleFeed, DISPUTE_WINDOW_SECONDS};

use super::{CommitmentRecord, DepositRecord, MerkleTree, PoolConfig};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OracleDepositStatus {
    #[default]
    Unsubmitted,
    Submitted,
    Finalized,
}

/// PDA Seeds: `[b"oracle_deposit", pool, chain_id.to_le_bytes(), deposit_id.to_le_bytes()]`
#[account]
#[derive(Default)]
pub struct OracleDeposit {
    pub pool: Pubkey,

    pub source_chain_id: u64,

    /// Id in the source chain's outbound namespace
    pub deposit_id: u64,

    pub query_id: [u8; 32],

    pub status: OracleDepositStatus,

    /// Feed submission count when last observed
    pub last_nonce: u64,

    /// Timestamp of the value that moved the record to `Submitted`
    pub submitted_at: i64,

    pub commitment: [u8; 32],

    /// Id assigned in the source chain's inbound namespace
    pub local_deposit_id: u64,

    pub leaf_index: u64,

    pub finalized_at: i64,

    pub bump: u8,
}

/// Outcome of one finalize attempt that did not fail.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FinalizeOutcome {
    Finalized { leaf_index: u64 },
    AlreadyFinalized,
}

impl OracleDeposit {
    pub const SEED_PREFIX: &'static [u8] = b"oracle_deposit";

    pub const LEN: usize = 8 // discriminator
        + 32 // pool
        + 8  // source_chain_id
        + 8  // deposit_id
        + 32 // query_id
        + 1  // status
        + 8  // last_nonce
        + 8  // submitted_at
        + 32 // commitment
        + 8  // local_deposit_id
        + 8  // leaf_index
        + 8  // finalized_at
        + 1; // bump

    /// Set up a fresh record. No-op when the record already exists.
    pub fn ensure_initialized(
        &mut self,
        pool: Pubkey,
        source_chain_id: u64,
        deposit_id: u64,
        bump: u8,
    ) {
        if self.pool != Pubkey::default() {
            return;
        }
        self.pool = pool;
        self.source_chain_id = source_chain_id;
        self.deposit_id = deposit_id;
        self.query_id = query_id(source_chain_id, deposit_id);
        self.status = OracleDepositStatus::Unsubmitted;
        self.bump = bump;
    }

    pub fn is_finalized(&self) -> bool {
        self.status == OracleDepositStatus::Finalized
    }

    /// Pick up a new undisputed submission. Returns true if the record moved.
    pub fn observe<F: OracleFeed>(&mut self, feed: &F) -> bool {
        if self.is_finalized() {
            return false;
        }
        let count = feed.new_value_count(&self.query_id);
        if count <= self.last_nonce {
            return false;
        }
        match feed.current_value(&self.query_id) {
            Some(value) => {
                self.status = OracleDepositStatus::Submitted;
                self.last_nonce = count;
                self.submitted_at = value.timestamp;
                true
            }
            None => false,
        }
    }

    /// Check that the deposit can be finalized at `now`.
    ///
    /// Returns `None` if it already was, else the commitment to register.
    ///
    /// # Errors
    /// * `UnknownPartnerChain` - source chain not in the partner table
    /// * `UntrustedOracleReport` - feed reports for another contract
    /// * `NoSubmission` - nothing undisputed was ever reported
    /// * `WindowNotElapsed` - no undisputed value is old enough yet
    /// * `InvalidOracleValue` - value is not a 32-byte commitment
    pub fn prepare_finalize<F: OracleFeed>(
        &mut self,
        pool: &PoolConfig,
        feed: &F,
        now: i64,
    ) -> Result<Option<[u8; 32]>> {
        pool.partner(self.source_chain_id)?;

        if self.is_finalized() {
            return Ok(None);
        }
        pool.require_trusted_feed(self.source_chain_id, &self.query_id, feed)?;

        self.observe(feed);

        let cutoff = now
            .checked_sub(DISPUTE_WINDOW_SECONDS)
            .ok_or(error!(CharonError::ArithmeticOverflow))?;

        let value = match feed.data_before(&self.query_id, cutoff) {
            Some(value) => value,
            None if feed.current_value(&self.query_id).is_some() => {
                return err!(CharonError::WindowNotElapsed)
            }
            None => return err!(CharonError::NoSubmission),
        };

        let commitment: [u8; 32] = value
            .value
            .as_slice()
            .try_into()
            .map_err(|_| error!(CharonError::InvalidOracleValue))?;
        Ok(Some(commitment))
    }

    fn mark_finalized(&mut self, commitment: [u8; 32], local_deposit_id: u64, leaf_index: u64, now: i64) {
        self.status = OracleDepositStatus::Finalized;
        self.commitment = commitment;
        self.local_deposit_id = local_deposit_id;
        self.leaf_index = leaf_index;
        self.finalized_at = now;
    }

    pub fn find_pda(
        program_id: &Pubkey,
        pool: &Pubkey,
        source_chain_id: u64,
        deposit_id: u64,
    ) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[
                Self::SEED_PREFIX,
                pool.as_ref(),
                &source_chain_id.to_le_bytes(),
                &deposit_id.to_le_bytes(),
            ],
            program_id,
        )
    }
}

/// Accounts the second finalize step writes, with their PDA bumps.
pub struct InboundRecords<'a> {
    pub commitment: &'a mut CommitmentRecord,
    pub commitment_bump: u8,
    pub deposit: &'a mut DepositRecord,
    pub deposit_bump: u8,
}

/// Register `commitment` under the next inbound id and append it to the
/// tree. Nothing is written unless every check passes.
///
/// # Errors
/// * `DuplicateCommitment` - commitment already registered
/// * `CapacityExceeded` - tree is full
pub fn complete_finalize(
    pool_key: Pubkey,
    pool: &mut PoolConfig,
    tree: &mut MerkleTree,
    record: &mut OracleDeposit,
    records: InboundRecords<'_>,
    commitment: [u8; 32],
    now: i64,
) -> Result<u64> {
    require!(
        !records.commitment.was_deposited(),
        CharonError::DuplicateCommitment
    );
    require!(!records.deposit.assigned, CharonError::InvariantViolation);
    require!(!tree.is_full(), CharonError::CapacityExceeded);
    tree.check_leaf(&commitment)?;

    let local_id = pool.claim_inbound_id(record.source_chain_id)?;
    records.commitment.register(
        pool_key,
        commitment,
        record.source_chain_id,
        local_id,
        records.commitment_bump,
    )?;
    records.deposit.assign(
        pool_key,
        record.source_chain_id,
        local_id,
        commitment,
        records.deposit_bump,
    )?;
    let leaf_index = tree.insert_leaf(commitment)?;
    record.mark_finalized(commitment, local_id, leaf_index, now);

    Ok(leaf_index)
}
