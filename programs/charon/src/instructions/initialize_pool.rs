//! Initialize Pool Instruction
//!
//! Creates the pool, its accumulator, the (empty) verification key, the two
//! pool-owned mints and the two vaults. The pool is not usable until
//! `finalize_pool` binds its liquidity.

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::events::PoolInitialized;
use crate::state::{InitializePoolParams, MerkleTree, PoolConfig, VerificationKeyAccount};

/// Decimals of the synthetic token and pool shares
pub const POOL_TOKEN_DECIMALS: u8 = 9;

#[derive(Accounts)]
#[instruction(params: InitializePoolParams)]
pub struct InitializePool<'info> {
    #[account(
        init,
        payer = controller,
        space = PoolConfig::LEN,
        seeds = [b"pool", base_mint.key().as_ref()],
        bump
    )]
    pub pool_config: Box<Account<'info, PoolConfig>>,

    #[account(
        init,
        payer = controller,
        space = MerkleTree::space(params.tree_depth, 1),
        seeds = [b"merkle_tree", pool_config.key().as_ref()],
        bump
    )]
    pub merkle_tree: Box<Account<'info, MerkleTree>>,

    #[account(
        init,
        payer = controller,
        space = VerificationKeyAccount::LEN,
        seeds = [b"verification_key", pool_config.key().as_ref()],
        bump
    )]
    pub verification_key: Box<Account<'info, VerificationKeyAccount>>,

    #[account(
        init,
        payer = controller,
        token::mint = base_mint,
        token::authority = pool_config,
        seeds = [b"vault", pool_config.key().as_ref()],
        bump
    )]
    pub base_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        init,
        payer = controller,
        mint::decimals = POOL_TOKEN_DECIMALS,
        mint::authority = pool_config,
        seeds = [b"synthetic_mint", pool_config.key().as_ref()],
        bump
    )]
    pub synthetic_mint: Box<Account<'info, Mint>>,

    #[account(
        init,
        payer = controller,
        token::mint = synthetic_mint,
        token::authority = pool_config,
        seeds = [b"synthetic_vault", pool_config.key().as_ref()],
        bump
    )]
    pub synthetic_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        init,
        payer = controller,
        mint::decimals = POOL_TOKEN_DECIMALS,
        mint::authority = pool_config,
        seeds = [b"share_mint", pool_config.key().as_ref()],
        bump
    )]
    pub share_mint: Box<Account<'info, Mint>>,

    pub base_mint: Box<Account<'info, Mint>>,

    #[account(mut)]
    pub controller: Signer<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<InitializePool>, params: InitializePoolParams) -> Result<()> {
    let pool_key = ctx.accounts.pool_config.key();
    let merkle_tree_key = ctx.accounts.merkle_tree.key();
    let verification_key_key = ctx.accounts.verification_key.key();

    let pool_config = &mut ctx.accounts.pool_config;
    pool_config.initialize(ctx.accounts.controller.key(), &params)?;
    pool_config.base_mint = ctx.accounts.base_mint.key();
    pool_config.synthetic_mint = ctx.accounts.synthetic_mint.key();
    pool_config.share_mint = ctx.accounts.share_mint.key();
    pool_config.base_vault = ctx.accounts.base_vault.key();
    pool_config.synthetic_vault = ctx.accounts.synthetic_vault.key();
    pool_config.merkle_tree = merkle_tree_key;
    pool_config.verification_key = verification_key_key;
    pool_config.bump = ctx.bumps.pool_config;
    pool_config.base_vault_bump = ctx.bumps.base_vault;
    pool_config.synthetic_vault_bump = ctx.bumps.synthetic_vault;
    pool_config.synthetic_mint_bump = ctx.bumps.synthetic_mint;
    pool_config.share_mint_bump = ctx.bumps.share_mint;

    ctx.accounts.merkle_tree.initialize(
        pool_key,
        params.tree_depth,
        params.hash_function,
        ctx.bumps.merkle_tree,
    )?;
    ctx.accounts
        .verification_key
        .initialize(pool_key, ctx.bumps.verification_key);

    emit!(PoolInitialized {
        pool: pool_key,
        controller: ctx.accounts.controller.key(),
        base_mint: ctx.accounts.base_mint.key(),
        chain_id: params.chain_id,
        denomination: params.denomination,
        tree_depth: params.tree_depth,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Charon pool initialized");
    msg!("Chain id: {}, tree depth: {}", params.chain_id, params.tree_depth);
    Ok(())
}
