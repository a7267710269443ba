//! Liquidity Instructions
//!
//! Joins and exits of the weighted pool, proportional or single-asset.
//! All four share one account set. Exits take the swap fee in pool shares,
//! minted to the controller's share account.

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::error::CharonError;
use crate::events::{LiquidityAdded, LiquidityRemoved};
use crate::settlement::{Asset, Party, PoolTokens, Settlement, SplTokens};
use crate::state::PoolConfig;

#[derive(Accounts)]
pub struct Liquidity<'info> {
    #[account(
        mut,
        seeds = [b"pool", pool_config.base_mint.as_ref()],
        bump = pool_config.bump,
        has_one = base_vault @ CharonError::AccountMismatch,
        has_one = synthetic_vault @ CharonError::AccountMismatch,
        has_one = share_mint @ CharonError::InvalidMint,
    )]
    pub pool_config: Box<Account<'info, PoolConfig>>,

    #[account(mut)]
    pub base_vault: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub synthetic_vault: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub share_mint: Box<Account<'info, Mint>>,

    #[account(
        mut,
        constraint = provider_base_account.mint == pool_config.base_mint @ CharonError::InvalidMint,
    )]
    pub provider_base_account: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = provider_synthetic_account.mint == pool_config.synthetic_mint @ CharonError::InvalidMint,
    )]
    pub provider_synthetic_account: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = provider_share_account.mint == pool_config.share_mint @ CharonError::InvalidMint,
    )]
    pub provider_share_account: Box<Account<'info, TokenAccount>>,

    /// Receives exit fees
    #[account(
        mut,
        constraint = controller_share_account.mint == pool_config.share_mint @ CharonError::InvalidMint,
        constraint = controller_share_account.owner == pool_config.controller @ CharonError::OwnerMismatch,
    )]
    pub controller_share_account: Box<Account<'info, TokenAccount>>,

    pub provider: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

impl Liquidity<'_> {
    fn settle(&self, settlement: Settlement) -> Result<()> {
        let base_mint = self.pool_config.base_mint;
        let bump = [self.pool_config.bump];
        let pool_seeds: &[&[u8]] = &[PoolConfig::SEED_PREFIX, base_mint.as_ref(), &bump];

        let tokens = SplTokens {
            token_program: &self.token_program,
            caller: self.provider.to_account_info(),
            pool: self.pool_config.to_account_info(),
            pool_seeds,
            pool_tokens: PoolTokens {
                base_vault: Some(&*self.base_vault),
                synthetic_vault: Some(&*self.synthetic_vault),
                synthetic_mint: None,
                share_mint: Some(&*self.share_mint),
            },
            holders: vec![
                (Party::Caller, Asset::Base, &*self.provider_base_account),
                (Party::Caller, Asset::Synthetic, &*self.provider_synthetic_account),
                (Party::Caller, Asset::Share, &*self.provider_share_account),
                (Party::Controller, Asset::Share, &*self.controller_share_account),
            ],
        };
        settlement.execute(&tokens)
    }

    fn emit_added(&self, base_in: u64, synthetic_in: u64, shares_out: u64) {
        emit!(LiquidityAdded {
            pool: self.pool_config.key(),
            provider: self.provider.key(),
            base_in,
            synthetic_in,
            shares_out,
        });
        msg!("Liquidity added: {} shares", shares_out);
    }

    fn emit_removed(&self, base_out: u64, synthetic_out: u64, shares_in: u64) {
        emit!(LiquidityRemoved {
            pool: self.pool_config.key(),
            provider: self.provider.key(),
            base_out,
            synthetic_out,
            shares_in,
        });
        msg!("Liquidity removed: {} shares", shares_in);
    }
}

/// Proportional join minting exactly `pool_amount_out` shares.
pub fn lp_deposit(
    ctx: Context<Liquidity>,
    pool_amount_out: u64,
    max_amounts_in: [u64; 2],
) -> Result<[u64; 2]> {
    let (amounts, settlement) = ctx
        .accounts
        .pool_config
        .lp_deposit(pool_amount_out, max_amounts_in)?;
    ctx.accounts.settle(settlement)?;
    ctx.accounts
        .emit_added(amounts[0], amounts[1], pool_amount_out);
    Ok(amounts)
}

/// Proportional exit burning exactly `pool_amount_in` shares.
pub fn lp_withdraw(
    ctx: Context<Liquidity>,
    pool_amount_in: u64,
    min_amounts_out: [u64; 2],
) -> Result<[u64; 2]> {
    let (amounts, settlement) = ctx
        .accounts
        .pool_config
        .lp_withdraw(pool_amount_in, min_amounts_out)?;
    ctx.accounts.settle(settlement)?;
    ctx.accounts
        .emit_removed(amounts[0], amounts[1], pool_amount_in);
    Ok(amounts)
}

pub fn lp_deposit_single(
    ctx: Context<Liquidity>,
    is_synthetic: bool,
    amount_in: u64,
    min_pool_amount_out: u64,
) -> Result<u64> {
    let (shares, settlement) =
        ctx.accounts
            .pool_config
            .lp_deposit_single(is_synthetic, amount_in, min_pool_amount_out)?;
    ctx.accounts.settle(settlement)?;
    if is_synthetic {
        ctx.accounts.emit_added(0, amount_in, shares);
    } else {
        ctx.accounts.emit_added(amount_in, 0, shares);
    }
    Ok(shares)
}

pub fn lp_withdraw_single(
    ctx: Context<Liquidity>,
    is_synthetic: bool,
    pool_amount_in: u64,
    min_amount_out: u64,
) -> Result<u64> {
    let (amount_out, settlement) =
        ctx.accounts
            .pool_config
            .lp_withdraw_single(is_synthetic, pool_amount_in, min_amount_out)?;
    ctx.accounts.settle(settlement)?;
    if is_synthetic {
        ctx.accounts.emit_removed(0, amount_out, pool_amount_in);
    } else {
        ctx.accounts.emit_removed(amount_out, 0, pool_amount_in);
    }
    Ok(amount_out)
}
