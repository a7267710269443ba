//! Deposit To Other Chain Instruction
//!
//! Registers a commitment under the next outbound deposit id and charges one
//! denomination for it. Partner-chain oracles relay `(chain_id, id) →
//! commitment` from here; the commitment enters the accumulator on the
//! partner chain, not on this one.
//!
//! The commitment is computed off-chain by the depositor, who must keep the
//! note secret to withdraw later.

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::crypto::is_zero_hash;
use crate::error::CharonError;
use crate::events::DepositToOtherChain as DepositToOtherChainEvent;
use crate::settlement::{Asset, Party, PoolTokens, Settlement, SplTokens};
use crate::state::{register_deposit, CommitmentRecord, DepositRecord, PoolConfig};

#[derive(Accounts)]
#[instruction(commitment: [u8; 32])]
pub struct DepositToOtherChain<'info> {
    #[account(
        mut,
        seeds = [b"pool", pool_config.base_mint.as_ref()],
        bump = pool_config.bump,
        has_one = base_vault @ CharonError::AccountMismatch,
        has_one = synthetic_mint @ CharonError::InvalidMint,
    )]
    pub pool_config: Box<Account<'info, PoolConfig>>,

    #[account(
        init_if_needed,
        payer = depositor,
        space = CommitmentRecord::LEN,
        seeds = [b"commitment", pool_config.key().as_ref(), commitment.as_ref()],
        bump
    )]
    pub commitment_record: Box<Account<'info, CommitmentRecord>>,

    #[account(
        init,
        payer = depositor,
        space = DepositRecord::LEN,
        seeds = [
            b"deposit",
            pool_config.key().as_ref(),
            &pool_config.chain_id.to_le_bytes(),
            &pool_config.deposit_count.saturating_add(1).to_le_bytes(),
        ],
        bump
    )]
    pub deposit_record: Box<Account<'info, DepositRecord>>,

    #[account(mut)]
    pub base_vault: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub synthetic_mint: Box<Account<'info, Mint>>,

    /// Base account when paying in base, synthetic account otherwise
    #[account(mut)]
    pub depositor_token_account: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub depositor: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

/// Ledger side of an outbound deposit: id assignment, registry entries and
/// the charge. Returns `(deposit_id, amount_charged, settlement)`.
pub fn process_outbound_deposit(
    pool_key: Pubkey,
    pool: &mut PoolConfig,
    commitment_record: &mut CommitmentRecord,
    deposit_record: &mut DepositRecord,
    commitment: [u8; 32],
    is_synthetic: bool,
    bumps: (u8, u8),
) -> Result<(u64, u64, Settlement)> {
    pool.require_finalized()?;
    require!(!is_zero_hash(&commitment), CharonError::InvalidCommitment);
    require!(
        !commitment_record.was_deposited(),
        CharonError::DuplicateCommitment
    );

    let (amount, settlement) = pool.charge_deposit(is_synthetic)?;
    let deposit_id = pool.claim_outbound_id()?;
    register_deposit(
        commitment_record,
        deposit_record,
        pool_key,
        pool.chain_id,
        deposit_id,
        commitment,
        bumps,
    )?;

    Ok((deposit_id, amount, settlement))
}

pub fn handler(
    ctx: Context<DepositToOtherChain>,
    commitment: [u8; 32],
    is_synthetic: bool,
) -> Result<()> {
    let expected_mint = if is_synthetic {
        ctx.accounts.pool_config.synthetic_mint
    } else {
        ctx.accounts.pool_config.base_mint
    };
    require_keys_eq!(
        ctx.accounts.depositor_token_account.mint,
        expected_mint,
        CharonError::InvalidMint
    );

    let pool_key = ctx.accounts.pool_config.key();
    let (deposit_id, amount, settlement) = process_outbound_deposit(
        pool_key,
        &mut ctx.accounts.pool_config,
        &mut ctx.accounts.commitment_record,
        &mut ctx.accounts.deposit_record,
        commitment,
        is_synthetic,
        (ctx.bumps.commitment_record, ctx.bumps.deposit_record),
    )?;

    let pool_config = &ctx.accounts.pool_config;
    let base_mint = pool_config.base_mint;
    let bump = [pool_config.bump];
    let pool_seeds: &[&[u8]] = &[PoolConfig::SEED_PREFIX, base_mint.as_ref(), &bump];
    let asset = if is_synthetic {
        Asset::Synthetic
    } else {
        Asset::Base
    };

    let tokens = SplTokens {
        token_program: &ctx.accounts.token_program,
        caller: ctx.accounts.depositor.to_account_info(),
        pool: pool_config.to_account_info(),
        pool_seeds,
        pool_tokens: PoolTokens {
            base_vault: Some(&*ctx.accounts.base_vault),
            synthetic_vault: None,
            synthetic_mint: Some(&*ctx.accounts.synthetic_mint),
            share_mint: None,
        },
        holders: vec![(Party::Caller, asset, &*ctx.accounts.depositor_token_account)],
    };
    settlement.execute(&tokens)?;

    emit!(DepositToOtherChainEvent {
        pool: pool_key,
        commitment,
        deposit_id,
        is_synthetic,
        amount,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Outbound deposit {} registered", deposit_id);
    msg!("Commitment: {:?}", &commitment[..8]);
    Ok(())
}
