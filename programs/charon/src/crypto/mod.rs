//! Cryptographic primitives: accumulator hashers and Groth16 verification

pub mod curve_utils;
pub mod groth16_verifier;
pub mod hasher;
pub mod public_inputs;

pub use groth16_verifier::{Groth16Proof, Groth16Verifier, ProofVerifier, PROOF_DATA_LEN};
pub use hasher::{is_zero_hash, HashFunction, MerkleHasher};
pub use public_inputs::WithdrawalInputs;
