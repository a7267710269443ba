//! Groth16 verification key for the withdrawal circuit
//!
//! The key comes from the circuit's trusted setup. Whoever controls it can
//! forge withdrawals, so only the pool controller may set it.

use anchor_lang::prelude::*;

use crate::crypto::WithdrawalInputs;
use crate::error::CharonError;

/// PDA Seeds: `[b"verification_key", pool.key().as_ref()]`
///
/// G1 points are 64 bytes (x || y), G2 points 128 bytes, all big-endian.
#[account]
pub struct VerificationKeyAccount {
    pub pool: Pubkey,

    pub vk_alpha_g1: [u8; 64],
    pub vk_beta_g2: [u8; 128],
    pub vk_gamma_g2: [u8; 128],
    pub vk_delta_g2: [u8; 128],

    /// IC[0] + Σ(public_input[i] * IC[i+1])
    pub vk_ic: Vec<[u8; 64]>,

    pub is_initialized: bool,

    pub bump: u8,
}

impl VerificationKeyAccount {
    /// Withdrawal circuit inputs plus the base point
    pub const IC_POINTS: usize = WithdrawalInputs::COUNT + 1;

    pub const LEN: usize = 8 // discriminator
        + 32                 // pool
        + 64                 // vk_alpha_g1
        + 128                // vk_beta_g2
        + 128                // vk_gamma_g2
        + 128                // vk_delta_g2
        + 4 + (64 * Self::IC_POINTS) // vk_ic
        + 1                  // is_initialized
        + 1;                 // bump

    pub fn initialize(&mut self, pool: Pubkey, bump: u8) {
        self.pool = pool;
        self.vk_alpha_g1 = [0u8; 64];
        self.vk_beta_g2 = [0u8; 128];
        self.vk_gamma_g2 = [0u8; 128];
        self.vk_delta_g2 = [0u8; 128];
        self.vk_ic = Vec::new();
        self.is_initialized = false;
        self.bump = bump;
    }

    pub fn set_vk(
        &mut self,
        alpha_g1: [u8; 64],
        beta_g2: [u8; 128],
        gamma_g2: [u8; 128],
        delta_g2: [u8; 128],
        ic: Vec<[u8; 64]>,
    ) -> Result<()> {
        require!(
            ic.len() == Self::IC_POINTS,
            CharonError::InvalidPublicInputs
        );

        self.vk_alpha_g1 = alpha_g1;
        self.vk_beta_g2 = beta_g2;
        self.vk_gamma_g2 = gamma_g2;
        self.vk_delta_g2 = delta_g2;
        self.vk_ic = ic;
        self.is_initialized = true;
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.is_initialized && self.vk_ic.len() == Self::IC_POINTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> VerificationKeyAccount {
        VerificationKeyAccount {
            pool: Pubkey::default(),
            vk_alpha_g1: [0u8; 64],
            vk_beta_g2: [0u8; 128],
            vk_gamma_g2: [0u8; 128],
            vk_delta_g2: [0u8; 128],
            vk_ic: Vec::new(),
            is_initialized: false,
            bump: 0,
        }
    }

    #[test]
    fn test_ic_length_enforced() {
        let mut vk = empty();
        vk.initialize(Pubkey::new_unique(), 1);
        assert!(!vk.is_valid());

        let short = vec![[1u8; 64]; 3];
        assert!(vk
            .set_vk([1u8; 64], [1u8; 128], [1u8; 128], [1u8; 128], short)
            .is_err());
        assert!(!vk.is_valid());

        let ic = vec![[1u8; 64]; VerificationKeyAccount::IC_POINTS];
        vk.set_vk([1u8; 64], [1u8; 128], [1u8; 128], [1u8; 128], ic)
            .unwrap();
        assert!(vk.is_valid());
    }
}
