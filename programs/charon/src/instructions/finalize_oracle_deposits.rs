//! Finalize Oracle Deposits Instruction (batch)
//!
//! Finalizes many partner-chain deposits in one transaction. Entries are
//! independent: an entry that fails is reported in the returned status list
//! and never undoes the entries that succeeded.
//!
//! `remaining_accounts` layout for `n` entries:
//!
//! ```text
//! [0 .. 3n)   per entry: oracle_report, oracle_deposit, commitment_record
//! [3n .. 4n)  deposit-record candidates, one per entry
//! ```
//!
//! Each finalized entry takes the candidate at its chain's next inbound id,
//! wherever it sits in the candidate list. A `(chain, id)` pair listed twice
//! is finalized once.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::program_error::ProgramError;

use crate::error::CharonError;
use crate::state::{FinalizeOutcome, MerkleTree, PoolConfig};

use super::finalize_oracle_deposit::{stage_finalize, InboundAccounts};

const ACCOUNTS_PER_ENTRY: usize = 3;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FinalizeStatus {
    Finalized { leaf_index: u64 },
    AlreadyFinalized,
    /// Program error code of the failed precondition
    Failed { code: u64 },
}

impl From<Result<FinalizeOutcome>> for FinalizeStatus {
    fn from(result: Result<FinalizeOutcome>) -> Self {
        match result {
            Ok(FinalizeOutcome::Finalized { leaf_index }) => FinalizeStatus::Finalized { leaf_index },
            Ok(FinalizeOutcome::AlreadyFinalized) => FinalizeStatus::AlreadyFinalized,
            Err(err) => FinalizeStatus::Failed {
                code: program_error_code(err),
            },
        }
    }
}

/// Numeric code of an error as clients see it.
pub fn program_error_code(err: anchor_lang::error::Error) -> u64 {
    match ProgramError::from(err) {
        ProgramError::Custom(code) => code as u64,
        other => u64::from(other),
    }
}

#[derive(Accounts)]
#[instruction(source_chain_ids: Vec<u64>)]
pub struct FinalizeOracleDeposits<'info> {
    #[account(
        mut,
        seeds = [b"pool", pool_config.base_mint.as_ref()],
        bump = pool_config.bump,
        has_one = merkle_tree @ CharonError::AccountMismatch,
    )]
    pub pool_config: Box<Account<'info, PoolConfig>>,

    #[account(
        mut,
        seeds = [b"merkle_tree", pool_config.key().as_ref()],
        bump = merkle_tree.bump,
        realloc = merkle_tree.space_after_inserts(source_chain_ids.len()),
        realloc::payer = payer,
        realloc::zero = false,
    )]
    pub merkle_tree: Box<Account<'info, MerkleTree>>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

/// Run every `(chain, id)` entry through `finalize_one` and collect the
/// statuses.
///
/// A failed entry is recorded and the batch moves on. A pair repeated after
/// an earlier copy finalized reports `AlreadyFinalized` without running
/// again. An outer error from `finalize_one` aborts the whole batch.
pub(crate) fn run_batch<F>(entries: &[(u64, u64)], mut finalize_one: F) -> Result<Vec<FinalizeStatus>>
where
    F: FnMut(usize, u64, u64) -> Result<Result<FinalizeOutcome>>,
{
    let mut statuses = Vec::with_capacity(entries.len());
    let mut finalized: Vec<(u64, u64)> = Vec::new();

    for (i, &(chain_id, deposit_id)) in entries.iter().enumerate() {
        if finalized.contains(&(chain_id, deposit_id)) {
            statuses.push(FinalizeStatus::AlreadyFinalized);
            continue;
        }

        let outcome = finalize_one(i, chain_id, deposit_id)?;
        match &outcome {
            Ok(FinalizeOutcome::Finalized { .. }) => finalized.push((chain_id, deposit_id)),
            Ok(FinalizeOutcome::AlreadyFinalized) => {}
            Err(_) => msg!("Entry {} (chain {}, deposit {}) failed", i, chain_id, deposit_id),
        }
        statuses.push(FinalizeStatus::from(outcome));
    }

    Ok(statuses)
}

pub fn handler<'info>(
    ctx: Context<'_, '_, '_, 'info, FinalizeOracleDeposits<'info>>,
    source_chain_ids: Vec<u64>,
    deposit_ids: Vec<u64>,
) -> Result<Vec<FinalizeStatus>> {
    require!(
        source_chain_ids.len() == deposit_ids.len(),
        CharonError::MismatchedBatch
    );
    let entries: Vec<(u64, u64)> = source_chain_ids.into_iter().zip(deposit_ids).collect();
    require!(
        ctx.remaining_accounts.len() == entries.len() * (ACCOUNTS_PER_ENTRY + 1),
        CharonError::AccountMismatch
    );

    let now = Clock::get()?.unix_timestamp;
    let program_id = ctx.program_id;
    let pool_key = ctx.accounts.pool_config.key();
    let payer = ctx.accounts.payer.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();
    let (groups, candidates) = ctx
        .remaining_accounts
        .split_at(entries.len() * ACCOUNTS_PER_ENTRY);
    let pool_config = &mut ctx.accounts.pool_config;
    let merkle_tree = &mut ctx.accounts.merkle_tree;

    let statuses = run_batch(&entries, |i, chain_id, deposit_id| {
        let group = &groups[i * ACCOUNTS_PER_ENTRY..(i + 1) * ACCOUNTS_PER_ENTRY];
        let accounts = InboundAccounts {
            oracle_report: &group[0],
            oracle_deposit: &group[1],
            commitment_record: &group[2],
            deposit_candidates: candidates,
        };

        let staged = stage_finalize(
            program_id,
            pool_key,
            pool_config,
            merkle_tree,
            accounts,
            chain_id,
            deposit_id,
            now,
        );

        Ok(match staged {
            Ok(Some(staged)) => {
                // Pool and tree already moved in memory; a failed write must abort
                staged.persist(program_id, &payer, &system_program)?;
                staged.emit_events(merkle_tree.current_root());
                Ok(FinalizeOutcome::Finalized {
                    leaf_index: staged.leaf_index,
                })
            }
            Ok(None) => Ok(FinalizeOutcome::AlreadyFinalized),
            Err(err) => Err(err),
        })
    })?;

    let finalized = statuses
        .iter()
        .filter(|s| matches!(s, FinalizeStatus::Finalized { .. }))
        .count();
    msg!("Batch finalize: {}/{} entries finalized", finalized, entries.len());

    Ok(statuses)
}
