//! Set Verification Key Instruction
//!
//! Stores the Groth16 key of the withdrawal circuit. Controller only.

use anchor_lang::prelude::*;

use crate::crypto::curve_utils::{is_g1_identity, validate_g1_point, validate_g2_point};
use crate::error::CharonError;
use crate::events::VerificationKeySet;
use crate::state::{PoolConfig, VerificationKeyAccount};

#[derive(Accounts)]
pub struct SetVerificationKey<'info> {
    #[account(
        mut,
        seeds = [b"pool", pool_config.base_mint.as_ref()],
        bump = pool_config.bump,
        has_one = controller @ CharonError::Unauthorized,
    )]
    pub pool_config: Box<Account<'info, PoolConfig>>,

    #[account(
        mut,
        seeds = [b"verification_key", pool_config.key().as_ref()],
        bump = verification_key.bump,
        constraint = verification_key.pool == pool_config.key() @ CharonError::Unauthorized,
    )]
    pub verification_key: Box<Account<'info, VerificationKeyAccount>>,

    pub controller: Signer<'info>,
}

pub fn handler(
    ctx: Context<SetVerificationKey>,
    vk_alpha_g1: [u8; 64],
    vk_beta_g2: [u8; 128],
    vk_gamma_g2: [u8; 128],
    vk_delta_g2: [u8; 128],
    vk_ic: Vec<[u8; 64]>,
) -> Result<()> {
    require!(!is_g1_identity(&vk_alpha_g1), CharonError::InvalidProof);
    validate_g1_point(&vk_alpha_g1)?;
    for point in [&vk_beta_g2, &vk_gamma_g2, &vk_delta_g2] {
        validate_g2_point(point)?;
    }
    for point in &vk_ic {
        validate_g1_point(point)?;
    }

    let ic_length = vk_ic.len() as u8;
    ctx.accounts
        .verification_key
        .set_vk(vk_alpha_g1, vk_beta_g2, vk_gamma_g2, vk_delta_g2, vk_ic)?;
    ctx.accounts.pool_config.set_vk_configured(true);

    emit!(VerificationKeySet {
        pool: ctx.accounts.pool_config.key(),
        controller: ctx.accounts.controller.key(),
        ic_length,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Verification key set, IC points: {}", ic_length);
    Ok(())
}
