//! Read-only instructions
//!
//! Each returns its answer as instruction return data, so clients can
//! simulate them instead of decoding accounts themselves. Lookups that miss
//! return the registry's not-found error.

use anchor_lang::prelude::*;

use crate::error::CharonError;
use crate::state::{CommitmentRecord, DepositRecord, MerkleTree, PoolConfig, SpentNullifier};
use crate::utils::{expect_pda, load_or_default};

#[derive(Accounts)]
pub struct IsKnownRoot<'info> {
    #[account(
        seeds = [b"pool", pool_config.base_mint.as_ref()],
        bump = pool_config.bump,
        has_one = merkle_tree @ CharonError::AccountMismatch,
    )]
    pub pool_config: Box<Account<'info, PoolConfig>>,

    pub merkle_tree: Box<Account<'info, MerkleTree>>,
}

pub fn is_known_root(ctx: Context<IsKnownRoot>, root: [u8; 32]) -> Result<bool> {
    Ok(ctx.accounts.merkle_tree.is_known_root(&root))
}

/// Pool-only account set for views that read `PoolConfig` alone or walk
/// `remaining_accounts`.
#[derive(Accounts)]
pub struct PoolView<'info> {
    #[account(
        seeds = [b"pool", pool_config.base_mint.as_ref()],
        bump = pool_config.bump,
    )]
    pub pool_config: Box<Account<'info, PoolConfig>>,
}

/// `remaining_accounts[i]` must be the nullifier PDA of `nullifier_hashes[i]`.
/// Missing accounts read as unspent.
pub fn is_spent_batch(ctx: Context<PoolView>, nullifier_hashes: Vec<[u8; 32]>) -> Result<Vec<bool>> {
    require!(
        ctx.remaining_accounts.len() == nullifier_hashes.len(),
        CharonError::MismatchedBatch
    );
    let pool_key = ctx.accounts.pool_config.key();

    nullifier_hashes
        .iter()
        .zip(ctx.remaining_accounts)
        .map(|(hash, info)| -> Result<bool> {
            expect_pda(
                info,
                &[SpentNullifier::SEED_PREFIX, pool_key.as_ref(), hash.as_ref()],
                ctx.program_id,
            )?;
            let record: SpentNullifier = load_or_default(info, ctx.program_id)?;
            Ok(record.is_spent())
        })
        .collect()
}

/// Base per synthetic, WAD scaled.
pub fn get_spot_price(ctx: Context<PoolView>) -> Result<u128> {
    ctx.accounts.pool_config.spot_price()
}

#[derive(Accounts)]
#[instruction(commitment: [u8; 32])]
pub struct CommitmentLookup<'info> {
    #[account(
        seeds = [b"pool", pool_config.base_mint.as_ref()],
        bump = pool_config.bump,
    )]
    pub pool_config: Box<Account<'info, PoolConfig>>,

    /// CHECK: registry PDA, may not exist yet
    #[account(
        seeds = [b"commitment", pool_config.key().as_ref(), commitment.as_ref()],
        bump,
    )]
    pub commitment_record: UncheckedAccount<'info>,
}

/// Id of a registered commitment within its origin chain's namespace.
pub fn get_deposit_id(ctx: Context<CommitmentLookup>, _commitment: [u8; 32]) -> Result<u64> {
    let record: CommitmentRecord = load_or_default(&ctx.accounts.commitment_record, ctx.program_id)?;
    record.id()
}

pub fn was_deposited(ctx: Context<CommitmentLookup>, _commitment: [u8; 32]) -> Result<bool> {
    let record: CommitmentRecord = load_or_default(&ctx.accounts.commitment_record, ctx.program_id)?;
    Ok(record.was_deposited())
}

#[derive(Accounts)]
#[instruction(origin_chain_id: u64, deposit_id: u64)]
pub struct DepositLookup<'info> {
    #[account(
        seeds = [b"pool", pool_config.base_mint.as_ref()],
        bump = pool_config.bump,
    )]
    pub pool_config: Box<Account<'info, PoolConfig>>,

    /// CHECK: registry PDA, may not exist yet
    #[account(
        seeds = [
            b"deposit",
            pool_config.key().as_ref(),
            &origin_chain_id.to_le_bytes(),
            &deposit_id.to_le_bytes(),
        ],
        bump,
    )]
    pub deposit_record: UncheckedAccount<'info>,
}

pub fn get_commitment(
    ctx: Context<DepositLookup>,
    _origin_chain_id: u64,
    _deposit_id: u64,
) -> Result<[u8; 32]> {
    let record: DepositRecord = load_or_default(&ctx.accounts.deposit_record, ctx.program_id)?;
    record.commitment()
}
