//! Finalize Pool Instruction
//!
//! Binds the initial liquidity, sets the weights and the partner-chain
//! table, and opens the pool. The controller supplies the base side and
//! receives the initial pool shares; the synthetic side is minted into the
//! pool's own vault. Runs exactly once.

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::error::CharonError;
use crate::events::PoolFinalized;
use crate::settlement::{Asset, Party, PoolTokens, SplTokens};
use crate::state::{FinalizePoolParams, PoolConfig};

#[derive(Accounts)]
pub struct FinalizePool<'info> {
    #[account(
        mut,
        seeds = [b"pool", pool_config.base_mint.as_ref()],
        bump = pool_config.bump,
        has_one = controller @ CharonError::Unauthorized,
        has_one = base_vault @ CharonError::AccountMismatch,
        has_one = synthetic_vault @ CharonError::AccountMismatch,
        has_one = synthetic_mint @ CharonError::InvalidMint,
        has_one = share_mint @ CharonError::InvalidMint,
    )]
    pub pool_config: Box<Account<'info, PoolConfig>>,

    #[account(mut)]
    pub base_vault: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub synthetic_vault: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub synthetic_mint: Box<Account<'info, Mint>>,

    #[account(mut)]
    pub share_mint: Box<Account<'info, Mint>>,

    #[account(
        mut,
        constraint = controller_base_account.mint == pool_config.base_mint @ CharonError::InvalidMint,
    )]
    pub controller_base_account: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = controller_share_account.mint == pool_config.share_mint @ CharonError::InvalidMint,
    )]
    pub controller_share_account: Box<Account<'info, TokenAccount>>,

    pub controller: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<FinalizePool>, params: FinalizePoolParams) -> Result<()> {
    let settlement = ctx.accounts.pool_config.finalize(&params)?;

    let pool_config = &ctx.accounts.pool_config;
    let base_mint = pool_config.base_mint;
    let bump = [pool_config.bump];
    let pool_seeds: &[&[u8]] = &[PoolConfig::SEED_PREFIX, base_mint.as_ref(), &bump];

    let tokens = SplTokens {
        token_program: &ctx.accounts.token_program,
        caller: ctx.accounts.controller.to_account_info(),
        pool: pool_config.to_account_info(),
        pool_seeds,
        pool_tokens: PoolTokens {
            base_vault: Some(&*ctx.accounts.base_vault),
            synthetic_vault: Some(&*ctx.accounts.synthetic_vault),
            synthetic_mint: Some(&*ctx.accounts.synthetic_mint),
            share_mint: Some(&*ctx.accounts.share_mint),
        },
        holders: vec![
            (Party::Caller, Asset::Base, &*ctx.accounts.controller_base_account),
            (Party::Caller, Asset::Share, &*ctx.accounts.controller_share_account),
        ],
    };
    settlement.execute(&tokens)?;

    emit!(PoolFinalized {
        pool: pool_config.key(),
        initial_base: params.initial_base,
        initial_synthetic: params.initial_synthetic,
        weight_base: params.weight_base,
        weight_synthetic: params.weight_synthetic,
        partner_chains: params.partners.len() as u8,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Pool finalized with {} partner chains", params.partners.len());
    Ok(())
}
