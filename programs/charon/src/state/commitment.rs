//! Commitment registry
//!
//! A deposit is a bijection between a commitment and a 1-based id within an
//! origin chain's namespace. Both directions get their own PDA so either can
//! be looked up in O(1):
//!
//! - [`CommitmentRecord`]: commitment → (origin chain, id)
//! - [`DepositRecord`]: (origin chain, id) → commitment
//!
//! A commitment is registered at most once, whether it was deposited here
//! or finalized from a partner chain.

use anchor_lang::prelude::*;

use crate::error::CharonError;

/// PDA Seeds: `[b"commitment", pool.key().as_ref(), commitment.as_ref()]`
#[account]
#[derive(Default)]
pub struct CommitmentRecord {
    pub pool: Pubkey,

    pub commitment: [u8; 32],

    /// Chain whose namespace `deposit_id` belongs to
    pub origin_chain_id: u64,

    pub deposit_id: u64,

    pub deposited: bool,

    pub bump: u8,
}

impl CommitmentRecord {
    pub const SEED_PREFIX: &'static [u8] = b"commitment";

    pub const LEN: usize = 8 + 32 + 32 + 8 + 8 + 1 + 1;

    /// # Errors
    /// * `DuplicateCommitment` if the commitment is already registered
    pub fn register(
        &mut self,
        pool: Pubkey,
        commitment: [u8; 32],
        origin_chain_id: u64,
        deposit_id: u64,
        bump: u8,
    ) -> Result<()> {
        require!(!self.deposited, CharonError::DuplicateCommitment);

        self.pool = pool;
        self.commitment = commitment;
        self.origin_chain_id = origin_chain_id;
        self.deposit_id = deposit_id;
        self.deposited = true;
        self.bump = bump;
        Ok(())
    }

    /// # Errors
    /// * `CommitmentNotFound` if never registered
    pub fn id(&self) -> Result<u64> {
        require!(self.deposited, CharonError::CommitmentNotFound);
        Ok(self.deposit_id)
    }

    pub fn was_deposited(&self) -> bool {
        self.deposited
    }

    pub fn find_pda(program_id: &Pubkey, pool: &Pubkey, commitment: &[u8; 32]) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[Self::SEED_PREFIX, pool.as_ref(), commitment.as_ref()],
            program_id,
        )
    }
}

/// PDA Seeds: `[b"deposit", pool, origin_chain_id.to_le_bytes(), deposit_id.to_le_bytes()]`
#[account]
#[derive(Default)]
pub struct DepositRecord {
    pub pool: Pubkey,

    pub origin_chain_id: u64,

    pub deposit_id: u64,

    pub commitment: [u8; 32],

    pub assigned: bool,

    pub bump: u8,
}

impl DepositRecord {
    pub const SEED_PREFIX: &'static [u8] = b"deposit";

    pub const LEN: usize = 8 + 32 + 8 + 8 + 32 + 1 + 1;

    /// Ids are handed out from a counter, so a second assignment means the
    /// counter and the records disagree.
    pub fn assign(
        &mut self,
        pool: Pubkey,
        origin_chain_id: u64,
        deposit_id: u64,
        commitment: [u8; 32],
        bump: u8,
    ) -> Result<()> {
        require!(!self.assigned, CharonError::InvariantViolation);

        self.pool = pool;
        self.origin_chain_id = origin_chain_id;
        self.deposit_id = deposit_id;
        self.commitment = commitment;
        self.assigned = true;
        self.bump = bump;
        Ok(())
    }

    /// # Errors
    /// * `DepositNotFound` if the id was never assigned
    pub fn commitment(&self) -> Result<[u8; 32]> {
        require!(self.assigned, CharonError::DepositNotFound);
        Ok(self.commitment)
    }

    pub fn find_pda(
        program_id: &Pubkey,
        pool: &Pubkey,
        origin_chain_id: u64,
        deposit_id: u64,
    ) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[
                Self::SEED_PREFIX,
                pool.as_ref(),
                &origin_chain_id.to_le_bytes(),
                &deposit_id.to_le_bytes(),
            ],
            program_id,
        )
    }
}

/// Record both directions of a new deposit.
pub fn register_deposit(
    commitment_record: &mut CommitmentRecord,
    deposit_record: &mut DepositRecord,
    pool: Pubkey,
    origin_chain_id: u64,
    deposit_id: u64,
    commitment: [u8; 32],
    bumps: (u8, u8),
) -> Result<()> {
    commitment_record.register(pool, commitment, origin_chain_id, deposit_id, bumps.0)?;
    deposit_record.assign(pool, origin_chain_id, deposit_id, commitment, bumps.1)
}
