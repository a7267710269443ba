//! Record Oracle Submission Instruction
//!
//! Moves a partner-chain deposit to `Submitted` as soon as its oracle report
//! shows a new undisputed value. Finalizing observes the feed as well, so
//! this only exists to make pending deposits visible early.

use anchor_lang::prelude::*;

use crate::error::CharonError;
use crate::events::OracleSubmissionRecorded;
use crate::oracle::OracleReport;
use crate::state::{OracleDeposit, OracleDepositStatus, PoolConfig};

#[derive(Accounts)]
#[instruction(source_chain_id: u64, deposit_id: u64)]
pub struct RecordOracleSubmission<'info> {
    #[account(
        seeds = [b"pool", pool_config.base_mint.as_ref()],
        bump = pool_config.bump,
    )]
    pub pool_config: Box<Account<'info, PoolConfig>>,

    #[account(
        init_if_needed,
        payer = payer,
        space = OracleDeposit::LEN,
        seeds = [
            b"oracle_deposit",
            pool_config.key().as_ref(),
            &source_chain_id.to_le_bytes(),
            &deposit_id.to_le_bytes(),
        ],
        bump
    )]
    pub oracle_deposit: Box<Account<'info, OracleDeposit>>,

    /// CHECK: owner and layout checked by `OracleReport::load`
    pub oracle_report: UncheckedAccount<'info>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<RecordOracleSubmission>,
    source_chain_id: u64,
    deposit_id: u64,
) -> Result<OracleDepositStatus> {
    let pool_config = &ctx.accounts.pool_config;
    pool_config.partner(source_chain_id)?;

    let feed = OracleReport::load(&ctx.accounts.oracle_report, &pool_config.oracle_program)?;
    let record = &mut ctx.accounts.oracle_deposit;
    record.ensure_initialized(
        pool_config.key(),
        source_chain_id,
        deposit_id,
        ctx.bumps.oracle_deposit,
    );
    require!(
        record.source_chain_id == source_chain_id && record.deposit_id == deposit_id,
        CharonError::AccountMismatch
    );
    pool_config.require_trusted_feed(source_chain_id, &record.query_id, &feed)?;

    if record.observe(&feed) {
        emit!(OracleSubmissionRecorded {
            pool: pool_config.key(),
            source_chain_id,
            deposit_id,
            nonce: record.last_nonce,
            submitted_at: record.submitted_at,
        });
        msg!(
            "Oracle submission recorded: chain {} deposit {}",
            source_chain_id,
            deposit_id
        );
    }

    Ok(record.status)
}
