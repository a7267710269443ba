//! Secret Withdraw Instruction
//!
//! Spends a note: the caller proves, in zero knowledge, that some commitment
//! under a retained root belongs to them and reveals only its nullifier hash.
//! The pool mints one denomination of synthetic, minus the relayer fee, to
//! the recipient.
//!
//! # Relayer Model
//! A relayer may submit the transaction for the recipient so the recipient's
//! address never signs anything. The relayer and its fee are public inputs of
//! the proof, so neither can be swapped out in flight.

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::crypto::{Groth16Verifier, ProofVerifier, WithdrawalInputs};
use crate::error::CharonError;
use crate::events::WithdrawalSettled;
use crate::settlement::{Asset, MovementKind, Party, PoolTokens, Settlement, SplTokens};
use crate::state::{MerkleTree, PoolConfig, SpentNullifier, VerificationKeyAccount};

#[derive(Accounts)]
#[instruction(
    proof_data: Vec<u8>,
    merkle_root: [u8; 32],
    nullifier_hash: [u8; 32],
    recipient: Pubkey,
    relayer: Pubkey,
)]
pub struct SecretWithdraw<'info> {
    #[account(
        mut,
        seeds = [b"pool", pool_config.base_mint.as_ref()],
        bump = pool_config.bump,
        has_one = merkle_tree @ CharonError::AccountMismatch,
        has_one = verification_key @ CharonError::AccountMismatch,
        has_one = synthetic_mint @ CharonError::InvalidMint,
    )]
    pub pool_config: Box<Account<'info, PoolConfig>>,

    #[account(
        seeds = [b"merkle_tree", pool_config.key().as_ref()],
        bump = merkle_tree.bump,
    )]
    pub merkle_tree: Box<Account<'info, MerkleTree>>,

    #[account(
        seeds = [b"verification_key", pool_config.key().as_ref()],
        bump = verification_key.bump,
        constraint = verification_key.is_initialized @ CharonError::VerificationKeyNotSet,
    )]
    pub verification_key: Box<Account<'info, VerificationKeyAccount>>,

    /// Created on first spend; a second spend finds `is_spent` set
    #[account(
        init_if_needed,
        payer = payer,
        space = SpentNullifier::LEN,
        seeds = [b"nullifier", pool_config.key().as_ref(), nullifier_hash.as_ref()],
        bump
    )]
    pub spent_nullifier: Box<Account<'info, SpentNullifier>>,

    #[account(mut)]
    pub synthetic_mint: Box<Account<'info, Mint>>,

    #[account(
        mut,
        constraint = recipient_token_account.mint == pool_config.synthetic_mint @ CharonError::InvalidMint,
        constraint = recipient_token_account.owner == recipient @ CharonError::OwnerMismatch,
    )]
    pub recipient_token_account: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = relayer_token_account.mint == pool_config.synthetic_mint @ CharonError::InvalidMint,
        constraint = relayer_token_account.owner == relayer @ CharonError::OwnerMismatch,
    )]
    pub relayer_token_account: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

/// Ledger side of a withdrawal.
///
/// Checks run in a fixed order so the caller learns the first thing wrong:
///
/// 1. pool finalized
/// 2. root retained (`UnknownRoot`)
/// 3. nullifier unspent (`AlreadySpent`)
/// 4. inputs well formed and bound to this chain
/// 5. proof accepted (`InvalidProof`; verifier errors count as rejection)
///
/// The nullifier is marked spent before the payout is computed.
#[allow(clippy::too_many_arguments)]
pub fn process_withdrawal<V: ProofVerifier>(
    pool_key: Pubkey,
    pool: &mut PoolConfig,
    tree: &MerkleTree,
    nullifier: &mut SpentNullifier,
    verifier: &V,
    proof: &[u8],
    inputs: &WithdrawalInputs,
    now: i64,
    slot: u64,
    bump: u8,
) -> Result<Settlement> {
    pool.require_finalized()?;
    require!(
        tree.is_known_root(&inputs.root),
        CharonError::UnknownRoot
    );
    require!(!nullifier.is_spent(), CharonError::AlreadySpent);

    inputs.validate()?;
    require!(
        inputs.chain_id == pool.chain_id,
        CharonError::InvalidPublicInputs
    );
    require!(
        inputs.fee <= pool.denomination,
        CharonError::RelayerFeeExceedsAmount
    );

    let accepted = verifier
        .verify(proof, &inputs.to_field_elements())
        .unwrap_or(false);
    require!(accepted, CharonError::InvalidProof);

    nullifier.mark_spent(pool_key, inputs.nullifier_hash, now, slot, bump)?;
    pool.withdrawal_payout(inputs.fee)
}

#[allow(clippy::too_many_arguments)]
pub fn handler(
    ctx: Context<SecretWithdraw>,
    proof_data: Vec<u8>,
    merkle_root: [u8; 32],
    nullifier_hash: [u8; 32],
    recipient: Pubkey,
    relayer: Pubkey,
    relayer_fee: u64,
) -> Result<()> {
    ctx.accounts.pool_config.require_vk_configured()?;

    let clock = Clock::get()?;
    let pool_key = ctx.accounts.pool_config.key();
    let inputs = WithdrawalInputs::new(
        merkle_root,
        nullifier_hash,
        recipient,
        relayer,
        relayer_fee,
        ctx.accounts.pool_config.chain_id,
    );
    let verifier = Groth16Verifier::new(&ctx.accounts.verification_key)?;

    let settlement = process_withdrawal(
        pool_key,
        &mut ctx.accounts.pool_config,
        &ctx.accounts.merkle_tree,
        &mut ctx.accounts.spent_nullifier,
        &verifier,
        &proof_data,
        &inputs,
        clock.unix_timestamp,
        clock.slot,
        ctx.bumps.spent_nullifier,
    )?;
    let amount = settlement.total(MovementKind::Mint, Party::Recipient, Asset::Synthetic);

    let pool_config = &ctx.accounts.pool_config;
    let base_mint = pool_config.base_mint;
    let bump = [pool_config.bump];
    let pool_seeds: &[&[u8]] = &[PoolConfig::SEED_PREFIX, base_mint.as_ref(), &bump];

    let tokens = SplTokens {
        token_program: &ctx.accounts.token_program,
        caller: ctx.accounts.payer.to_account_info(),
        pool: pool_config.to_account_info(),
        pool_seeds,
        pool_tokens: PoolTokens {
            base_vault: None,
            synthetic_vault: None,
            synthetic_mint: Some(&*ctx.accounts.synthetic_mint),
            share_mint: None,
        },
        holders: vec![
            (Party::Recipient, Asset::Synthetic, &*ctx.accounts.recipient_token_account),
            (Party::Relayer, Asset::Synthetic, &*ctx.accounts.relayer_token_account),
        ],
    };
    settlement.execute(&tokens)?;

    emit!(WithdrawalSettled {
        pool: pool_key,
        nullifier_hash,
        recipient,
        relayer,
        amount,
        relayer_fee,
        timestamp: clock.unix_timestamp,
    });

    msg!("Withdrawal settled: {} to recipient, {} to relayer", amount, relayer_fee);
    msg!("Nullifier: {:?}", &nullifier_hash[..8]);
    Ok(())
}
