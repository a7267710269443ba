//! Groth16 proof verification
//!
//! ```text
//! e(-A, B) · e(α, β) · e(vk_x, γ) · e(C, δ) = 1
//! vk_x = IC[0] + Σ(public_input[i] · IC[i+1])
//! ```
//!
//! The gateway only depends on [`ProofVerifier`]; [`Groth16Verifier`] is the
//! on-chain implementation over the pool's verification key account.

use anchor_lang::prelude::*;

use crate::error::CharonError;
use crate::state::VerificationKeyAccount;

use super::curve_utils::{
    compute_vk_x, is_g1_identity, is_g2_identity, make_pairing_element, negate_g1,
    validate_g1_point, validate_g2_point, verify_pairing, G1Point, G2Point, PairingElement,
    ScalarField,
};

/// A = 64 bytes (G1), B = 128 bytes (G2), C = 64 bytes (G1)
pub const PROOF_DATA_LEN: usize = 256;

/// Proof verification capability.
///
/// `Ok(false)` is a rejected proof. `Err` means the verifier itself could
/// not run; callers treat both as an invalid proof.
pub trait ProofVerifier {
    fn verify(&self, proof: &[u8], public_inputs: &[ScalarField]) -> Result<bool>;
}

#[derive(Clone, Debug)]
pub struct Groth16Proof {
    pub a: G1Point,
    pub b: G2Point,
    pub c: G1Point,
}

impl Groth16Proof {
    /// ```text
    /// [0..64]    - A
    /// [64..192]  - B
    /// [192..256] - C
    /// ```
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        require!(
            data.len() == PROOF_DATA_LEN,
            CharonError::InvalidProofFormat
        );

        let mut proof = Groth16Proof {
            a: [0u8; 64],
            b: [0u8; 128],
            c: [0u8; 64],
        };
        proof.a.copy_from_slice(&data[0..64]);
        proof.b.copy_from_slice(&data[64..192]);
        proof.c.copy_from_slice(&data[192..256]);
        Ok(proof)
    }

    fn validate(&self) -> Result<()> {
        require!(
            !is_g1_identity(&self.a) && !is_g2_identity(&self.b) && !is_g1_identity(&self.c),
            CharonError::InvalidProof
        );
        validate_g1_point(&self.a)?;
        validate_g2_point(&self.b)?;
        validate_g1_point(&self.c)
    }
}

pub struct Groth16Verifier<'a> {
    vk: &'a VerificationKeyAccount,
}

impl<'a> Groth16Verifier<'a> {
    pub fn new(vk: &'a VerificationKeyAccount) -> Result<Self> {
        require!(vk.is_valid(), CharonError::VerificationKeyNotSet);
        Ok(Self { vk })
    }
}

impl ProofVerifier for Groth16Verifier<'_> {
    fn verify(&self, proof: &[u8], public_inputs: &[ScalarField]) -> Result<bool> {
        let proof = Groth16Proof::from_bytes(proof)?;
        proof.validate()?;

        require!(
            self.vk.vk_ic.len() == public_inputs.len() + 1,
            CharonError::InvalidPublicInputs
        );

        let vk_x = compute_vk_x(&self.vk.vk_ic, public_inputs)?;
        let neg_a = negate_g1(&proof.a)?;

        let pairing_elements: [PairingElement; 4] = [
            make_pairing_element(&neg_a, &proof.b),
            make_pairing_element(&self.vk.vk_alpha_g1, &self.vk.vk_beta_g2),
            make_pairing_element(&vk_x, &self.vk.vk_gamma_g2),
            make_pairing_element(&proof.c, &self.vk.vk_delta_g2),
        ];

        verify_pairing(&pairing_elements)
    }
}
