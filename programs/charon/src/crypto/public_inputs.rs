//! Public inputs of the withdrawal circuit
//!
//! # Withdrawal Circuit Public Inputs (6 total)
//! 1. root - accumulator root the membership proof is against
//! 2. nullifier_hash - marks the deposit spent
//! 3. recipient - receives the payout
//! 4. relayer - submits the transaction, receives `fee`
//! 5. fee - relayer fee in synthetic token units
//! 6. chain_id - binds the proof to the withdrawing chain
//!
//! All values are encoded as 32-byte big-endian BN254 scalars.

use anchor_lang::prelude::*;

use crate::error::CharonError;

use super::curve_utils::{is_valid_scalar, pubkey_to_scalar, u64_to_scalar, ScalarField};
use super::hasher::is_zero_hash;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WithdrawalInputs {
    pub root: [u8; 32],
    pub nullifier_hash: [u8; 32],
    pub recipient: Pubkey,
    pub relayer: Pubkey,
    pub fee: u64,
    pub chain_id: u64,
}

impl WithdrawalInputs {
    /// Number of public inputs for verification
    pub const COUNT: usize = 6;

    pub fn new(
        root: [u8; 32],
        nullifier_hash: [u8; 32],
        recipient: Pubkey,
        relayer: Pubkey,
        fee: u64,
        chain_id: u64,
    ) -> Self {
        Self {
            root,
            nullifier_hash,
            recipient,
            relayer,
            fee,
            chain_id,
        }
    }

    /// Root and nullifier hash must already be field elements; they are
    /// hash outputs and are never reduced.
    pub fn validate(&self) -> Result<()> {
        require!(
            !is_zero_hash(&self.nullifier_hash),
            CharonError::InvalidPublicInputs
        );
        require!(
            is_valid_scalar(&self.root) && is_valid_scalar(&self.nullifier_hash),
            CharonError::InvalidPublicInputs
        );
        Ok(())
    }

    /// Field elements in circuit order.
    pub fn to_field_elements(&self) -> [ScalarField; Self::COUNT] {
        [
            self.root,
            self.nullifier_hash,
            pubkey_to_scalar(&self.recipient),
            pubkey_to_scalar(&self.relayer),
            u64_to_scalar(self.fee),
            u64_to_scalar(self.chain_id),
        ]
    }
}
