//! Host-side helpers for wallets and relayers
//!
//! Derives notes and Merkle paths that match what the program stores, so a
//! prover can be fed without re-implementing the hashing. Never built for
//! the on-chain target.
//!
//! A note is a random `nullifier`. From it:
//!
//! ```text
//! commitment     = Poseidon(nullifier, 0)
//! nullifier_hash = Poseidon(nullifier, 1, leaf_index)
//! ```

use anchor_lang::prelude::*;
use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use light_poseidon::{Poseidon, PoseidonBytesHasher};
use rand::{CryptoRng, RngCore};

use crate::crypto::curve_utils::u64_to_scalar;
use crate::crypto::{HashFunction, MerkleHasher, WithdrawalInputs};
use crate::error::CharonError;
use crate::state::merkle_tree::{compute_zero_values, MAX_TREE_DEPTH, MIN_TREE_DEPTH};

pub use crate::oracle::query_id;

fn poseidon(inputs: &[&[u8]]) -> Result<[u8; 32]> {
    let mut hasher = Poseidon::<Fr>::new_circom(inputs.len())
        .map_err(|_| error!(CharonError::InvalidCommitment))?;
    hasher
        .hash_bytes_be(inputs)
        .map_err(|_| error!(CharonError::InvalidCommitment))
}

fn to_field_bytes(value: Fr) -> [u8; 32] {
    let bytes = value.into_bigint().to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    out
}

/// Deposit secret. Whoever holds it can withdraw the deposit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Note {
    nullifier: [u8; 32],
}

impl Note {
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Self::from_secret(&bytes)
    }

    /// Any 32 bytes, reduced into the scalar field.
    pub fn from_secret(secret: &[u8; 32]) -> Self {
        Self {
            nullifier: to_field_bytes(Fr::from_be_bytes_mod_order(secret)),
        }
    }

    pub fn nullifier(&self) -> &[u8; 32] {
        &self.nullifier
    }

    pub fn commitment(&self) -> Result<[u8; 32]> {
        poseidon(&[&self.nullifier, &u64_to_scalar(0)])
    }

    /// Bound to the leaf the commitment landed at on the withdrawing chain.
    pub fn nullifier_hash(&self, leaf_index: u64) -> Result<[u8; 32]> {
        poseidon(&[&self.nullifier, &u64_to_scalar(1), &u64_to_scalar(leaf_index)])
    }

    /// Public inputs for withdrawing this note against `root`.
    pub fn withdrawal_inputs(
        &self,
        root: [u8; 32],
        leaf_index: u64,
        recipient: Pubkey,
        relayer: Pubkey,
        fee: u64,
        chain_id: u64,
    ) -> Result<WithdrawalInputs> {
        Ok(WithdrawalInputs::new(
            root,
            self.nullifier_hash(leaf_index)?,
            recipient,
            relayer,
            fee,
            chain_id,
        ))
    }
}

/// Sibling path from a leaf to the root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerklePath {
    pub leaf_index: u64,
    /// Bottom-up
    pub siblings: Vec<[u8; 32]>,
}

impl MerklePath {
    /// Bit `i` set means the node at level `i` is a right child.
    pub fn path_indices(&self) -> Vec<bool> {
        (0..self.siblings.len())
            .map(|level| (self.leaf_index >> level) & 1 == 1)
            .collect()
    }

    pub fn compute_root<H: MerkleHasher>(&self, hasher: &H, leaf: [u8; 32]) -> Result<[u8; 32]> {
        let mut node = leaf;
        for (sibling, is_right) in self.siblings.iter().zip(self.path_indices()) {
            node = if is_right {
                hasher.hash_pair(sibling, &node)?
            } else {
                hasher.hash_pair(&node, sibling)?
            };
        }
        Ok(node)
    }
}

/// Full copy of an accumulator, rebuilt from its leaves.
///
/// Leaves come from `CommitmentInserted` events in leaf-index order.
pub struct OffchainTree {
    hash_function: HashFunction,
    depth: u8,
    leaves: Vec<[u8; 32]>,
    zeros: Vec<[u8; 32]>,
}

impl OffchainTree {
    pub fn new(depth: u8, hash_function: HashFunction) -> Result<Self> {
        require!(
            (MIN_TREE_DEPTH..=MAX_TREE_DEPTH).contains(&depth),
            CharonError::InvalidTreeDepth
        );
        Ok(Self {
            hash_function,
            depth,
            leaves: Vec::new(),
            zeros: compute_zero_values(&hash_function, depth)?,
        })
    }

    pub fn insert(&mut self, leaf: [u8; 32]) -> Result<u64> {
        require!(
            (self.leaves.len() as u64) < (1u64 << self.depth),
            CharonError::CapacityExceeded
        );
        self.hash_function.check_leaf(&leaf)?;
        self.leaves.push(leaf);
        Ok(self.leaves.len() as u64 - 1)
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Every non-empty level, bottom-up. Missing right children are the
    /// level's zero value.
    fn levels(&self) -> Result<Vec<Vec<[u8; 32]>>> {
        let mut levels = vec![self.leaves.clone()];
        for level in 0..self.depth as usize {
            let nodes = &levels[level];
            let mut parents = Vec::with_capacity(nodes.len().div_ceil(2));
            for pair in nodes.chunks(2) {
                let right = pair.get(1).unwrap_or(&self.zeros[level]);
                parents.push(self.hash_function.hash_pair(&pair[0], right)?);
            }
            levels.push(parents);
        }
        Ok(levels)
    }

    pub fn root(&self) -> Result<[u8; 32]> {
        let levels = self.levels()?;
        Ok(levels[self.depth as usize]
            .first()
            .copied()
            .unwrap_or(self.zeros[self.depth as usize]))
    }

    pub fn path(&self, leaf_index: u64) -> Result<MerklePath> {
        require!(
            leaf_index < self.leaves.len() as u64,
            CharonError::CommitmentNotFound
        );
        let levels = self.levels()?;
        let mut index = leaf_index as usize;
        let mut siblings = Vec::with_capacity(self.depth as usize);
        for level in 0..self.depth as usize {
            let sibling = levels[level]
                .get(index ^ 1)
                .copied()
                .unwrap_or(self.zeros[level]);
            siblings.push(sibling);
            index >>= 1;
        }
        Ok(MerklePath {
            leaf_index,
            siblings,
        })
    }
}
