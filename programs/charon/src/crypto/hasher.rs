//! Two-to-one hash functions for the Merkle accumulator
//!
//! The accumulator only ever sees the [`MerkleHasher`] trait; which concrete
//! function a pool uses is fixed at initialization and stored as a
//! [`HashFunction`] tag on the tree account.

use anchor_lang::prelude::*;
use solana_program::keccak;
use solana_program::poseidon::{self, Endianness, Parameters};

use crate::error::CharonError;

use super::curve_utils::{is_valid_scalar, reduce_to_scalar};

/// Hash capability consumed by the accumulator.
pub trait MerkleHasher {
    fn hash_pair(&self, left: &[u8; 32], right: &[u8; 32]) -> Result<[u8; 32]>;

    /// Reject leaves the hash cannot absorb.
    fn check_leaf(&self, _leaf: &[u8; 32]) -> Result<()> {
        Ok(())
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashFunction {
    /// Keccak-256 over `left || right`, reduced mod the BN254 scalar order
    /// so roots stay valid proof inputs
    Keccak,
    /// Circom-compatible Poseidon over BN254 (x^5, t = 3), big-endian
    Poseidon,
}

impl MerkleHasher for HashFunction {
    fn hash_pair(&self, left: &[u8; 32], right: &[u8; 32]) -> Result<[u8; 32]> {
        match self {
            HashFunction::Keccak => {
                let digest = keccak::hashv(&[left.as_ref(), right.as_ref()]).to_bytes();
                Ok(reduce_to_scalar(&digest))
            }
            HashFunction::Poseidon => {
                poseidon::hashv(
                    Parameters::Bn254X5,
                    Endianness::BigEndian,
                    &[left.as_ref(), right.as_ref()],
                )
                .map(|hash| hash.to_bytes())
                .map_err(|e| {
                    msg!("Poseidon hash failed: {:?}", e);
                    error!(CharonError::InvalidCommitment)
                })
            }
        }
    }

    fn check_leaf(&self, leaf: &[u8; 32]) -> Result<()> {
        if *self == HashFunction::Poseidon {
            require!(is_valid_scalar(leaf), CharonError::InvalidCommitment);
        }
        Ok(())
    }
}

/// Check if a hash is all zeros (the empty leaf).
pub fn is_zero_hash(hash: &[u8; 32]) -> bool {
    hash.iter().all(|&b| b == 0)
}
