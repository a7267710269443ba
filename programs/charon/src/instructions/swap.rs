//! Swap Instruction
//!
//! Exact-in trade between the base asset and the synthetic token against
//! the pool's weighted curve. Both sides move through the pool's vaults.

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::error::CharonError;
use crate::events::SwapExecuted;
use crate::settlement::{Asset, Party, PoolTokens, SplTokens};
use crate::state::{PoolConfig, SwapQuote};

#[derive(Accounts)]
pub struct Swap<'info> {
    #[account(
        mut,
        seeds = [b"pool", pool_config.base_mint.as_ref()],
        bump = pool_config.bump,
        has_one = base_vault @ CharonError::AccountMismatch,
        has_one = synthetic_vault @ CharonError::AccountMismatch,
    )]
    pub pool_config: Box<Account<'info, PoolConfig>>,

    #[account(mut)]
    pub base_vault: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub synthetic_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = trader_base_account.mint == pool_config.base_mint @ CharonError::InvalidMint,
    )]
    pub trader_base_account: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = trader_synthetic_account.mint == pool_config.synthetic_mint @ CharonError::InvalidMint,
    )]
    pub trader_synthetic_account: Box<Account<'info, TokenAccount>>,

    pub trader: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(
    ctx: Context<Swap>,
    is_synthetic_in: bool,
    amount_in: u64,
    min_amount_out: u64,
    max_price: u128,
) -> Result<SwapQuote> {
    let (quote, settlement) =
        ctx.accounts
            .pool_config
            .swap(is_synthetic_in, amount_in, min_amount_out, max_price)?;

    let pool_config = &ctx.accounts.pool_config;
    let base_mint = pool_config.base_mint;
    let bump = [pool_config.bump];
    let pool_seeds: &[&[u8]] = &[PoolConfig::SEED_PREFIX, base_mint.as_ref(), &bump];

    let tokens = SplTokens {
        token_program: &ctx.accounts.token_program,
        caller: ctx.accounts.trader.to_account_info(),
        pool: pool_config.to_account_info(),
        pool_seeds,
        pool_tokens: PoolTokens {
            base_vault: Some(&*ctx.accounts.base_vault),
            synthetic_vault: Some(&*ctx.accounts.synthetic_vault),
            synthetic_mint: None,
            share_mint: None,
        },
        holders: vec![
            (Party::Caller, Asset::Base, &*ctx.accounts.trader_base_account),
            (Party::Caller, Asset::Synthetic, &*ctx.accounts.trader_synthetic_account),
        ],
    };
    settlement.execute(&tokens)?;

    emit!(SwapExecuted {
        pool: pool_config.key(),
        trader: ctx.accounts.trader.key(),
        is_synthetic_in,
        amount_in,
        amount_out: quote.amount_out,
        spot_price_after: quote.spot_price_after,
    });

    msg!("Swap: {} in, {} out", amount_in, quote.amount_out);
    Ok(quote)
}
