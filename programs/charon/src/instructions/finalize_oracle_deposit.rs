//! Finalize Oracle Deposit Instruction
//!
//! Pulls a partner-chain deposit out of the oracle once its report has been
//! undisputed for the full dispute window, registers the commitment under a
//! local inbound id and appends it to the accumulator.
//!
//! The oracle record, the commitment record and the deposit record are all
//! created by hand: the commitment record's address depends on the value the
//! oracle reported, and the batch variant reaches every record through
//! `remaining_accounts`.
//!
//! Replaying a finalized deposit is a no-op.

use anchor_lang::prelude::*;

use crate::error::CharonError;
use crate::events::{CommitmentInserted, OracleDepositFinalized};
use crate::oracle::OracleReport;
use crate::state::{
    complete_finalize, CommitmentRecord, DepositRecord, FinalizeOutcome, InboundRecords,
    MerkleTree, OracleDeposit, PoolConfig,
};
use crate::utils::{expect_pda, load_or_default, save_pda};

#[derive(Accounts)]
#[instruction(source_chain_id: u64, deposit_id: u64)]
pub struct FinalizeOracleDeposit<'info> {
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
        realloc = merkle_tree.space_after_inserts(1),
        realloc::payer = payer,
        realloc::zero = false,
    )]
    pub merkle_tree: Box<Account<'info, MerkleTree>>,

    /// CHECK: oracle report, owner and layout checked by `OracleReport::load`
    pub oracle_report: UncheckedAccount<'info>,

    /// CHECK: PDA `[b"oracle_deposit", pool, chain, id]`, checked and created in the handler
    #[account(mut)]
    pub oracle_deposit: UncheckedAccount<'info>,

    /// CHECK: PDA `[b"commitment", pool, commitment]`, checked and created in the handler
    #[account(mut)]
    pub commitment_record: UncheckedAccount<'info>,

    /// CHECK: PDA `[b"deposit", pool, chain, next inbound id]`, checked and created in the handler
    #[account(mut)]
    pub deposit_record: UncheckedAccount<'info>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

/// Accounts one finalize attempt reads and writes.
pub(crate) struct InboundAccounts<'a, 'info> {
    pub oracle_report: &'a AccountInfo<'info>,
    pub oracle_deposit: &'a AccountInfo<'info>,
    pub commitment_record: &'a AccountInfo<'info>,
    /// Deposit-record candidates; the one at the next inbound id is used
    pub deposit_candidates: &'a [AccountInfo<'info>],
}

/// A successful finalize held in memory until it is written back.
pub(crate) struct StagedInbound<'info> {
    record: OracleDeposit,
    record_info: AccountInfo<'info>,
    commitment_record: CommitmentRecord,
    commitment_info: AccountInfo<'info>,
    deposit_record: DepositRecord,
    pub(crate) deposit_info: AccountInfo<'info>,
    pub leaf_index: u64,
}

/// Run the bridge for one deposit against the in-memory pool and tree.
///
/// Pool and tree are only touched once every check has passed, so an `Err`
/// leaves them as they were.
#[allow(clippy::too_many_arguments)]
pub(crate) fn stage_finalize<'info>(
    program_id: &Pubkey,
    pool_key: Pubkey,
    pool: &mut PoolConfig,
    tree: &mut MerkleTree,
    accounts: InboundAccounts<'_, 'info>,
    source_chain_id: u64,
    deposit_id: u64,
    now: i64,
) -> Result<Option<StagedInbound<'info>>> {
    let record_bump = expect_pda(
        accounts.oracle_deposit,
        &[
            OracleDeposit::SEED_PREFIX,
            pool_key.as_ref(),
            &source_chain_id.to_le_bytes(),
            &deposit_id.to_le_bytes(),
        ],
        program_id,
    )?;
    let mut record: OracleDeposit = load_or_default(accounts.oracle_deposit, program_id)?;
    record.ensure_initialized(pool_key, source_chain_id, deposit_id, record_bump);

    let feed = OracleReport::load(accounts.oracle_report, &pool.oracle_program)?;
    let commitment = match record.prepare_finalize(pool, &feed, now)? {
        Some(commitment) => commitment,
        None => return Ok(None),
    };

    let commitment_bump = expect_pda(
        accounts.commitment_record,
        &[
            CommitmentRecord::SEED_PREFIX,
            pool_key.as_ref(),
            commitment.as_ref(),
        ],
        program_id,
    )?;
    let mut commitment_record: CommitmentRecord =
        load_or_default(accounts.commitment_record, program_id)?;

    let local_id = pool.next_inbound_id(source_chain_id)?;
    let (expected_deposit, deposit_bump) =
        DepositRecord::find_pda(program_id, &pool_key, source_chain_id, local_id);
    let deposit_info = select_deposit_record(accounts.deposit_candidates, &expected_deposit)?;
    let mut deposit_record: DepositRecord = load_or_default(deposit_info, program_id)?;

    let leaf_index = complete_finalize(
        pool_key,
        pool,
        tree,
        &mut record,
        InboundRecords {
            commitment: &mut commitment_record,
            commitment_bump,
            deposit: &mut deposit_record,
            deposit_bump,
        },
        commitment,
        now,
    )?;

    Ok(Some(StagedInbound {
        record,
        record_info: accounts.oracle_deposit.clone(),
        commitment_record,
        commitment_info: accounts.commitment_record.clone(),
        deposit_record,
        deposit_info: deposit_info.clone(),
        leaf_index,
    }))
}

/// The candidate sitting at `expected`.
pub(crate) fn select_deposit_record<'a, 'info>(
    candidates: &'a [AccountInfo<'info>],
    expected: &Pubkey,
) -> Result<&'a AccountInfo<'info>> {
    candidates
        .iter()
        .find(|info| info.key == expected)
        .ok_or(error!(CharonError::AccountMismatch))
}

impl<'info> StagedInbound<'info> {
    /// Create any missing accounts and write the three records.
    pub(crate) fn persist(
        &self,
        program_id: &Pubkey,
        payer: &AccountInfo<'info>,
        system_program: &AccountInfo<'info>,
    ) -> Result<()> {
        let pool = self.record.pool;

        let chain = self.record.source_chain_id.to_le_bytes();
        let id = self.record.deposit_id.to_le_bytes();
        let bump = [self.record.bump];
        save_pda(
            payer,
            &self.record_info,
            system_program,
            program_id,
            &[OracleDeposit::SEED_PREFIX, pool.as_ref(), &chain, &id, &bump],
            OracleDeposit::LEN,
            &self.record,
        )?;

        let bump = [self.commitment_record.bump];
        save_pda(
            payer,
            &self.commitment_info,
            system_program,
            program_id,
            &[
                CommitmentRecord::SEED_PREFIX,
                pool.as_ref(),
                self.commitment_record.commitment.as_ref(),
                &bump,
            ],
            CommitmentRecord::LEN,
            &self.commitment_record,
        )?;

        let local_id = self.deposit_record.deposit_id.to_le_bytes();
        let bump = [self.deposit_record.bump];
        save_pda(
            payer,
            &self.deposit_info,
            system_program,
            program_id,
            &[DepositRecord::SEED_PREFIX, pool.as_ref(), &chain, &local_id, &bump],
            DepositRecord::LEN,
            &self.deposit_record,
        )
    }

    pub(crate) fn emit_events(&self, merkle_root: [u8; 32]) {
        emit!(CommitmentInserted {
            pool: self.record.pool,
            commitment: self.record.commitment,
            leaf_index: self.leaf_index,
            merkle_root,
        });
        emit!(OracleDepositFinalized {
            pool: self.record.pool,
            source_chain_id: self.record.source_chain_id,
            deposit_id: self.record.deposit_id,
            local_deposit_id: self.record.local_deposit_id,
            leaf_index: self.leaf_index,
            timestamp: self.record.finalized_at,
        });
    }
}

pub fn handler(
    ctx: Context<FinalizeOracleDeposit>,
    source_chain_id: u64,
    deposit_id: u64,
) -> Result<FinalizeOutcome> {
    let now = Clock::get()?.unix_timestamp;
    let program_id = ctx.program_id;
    let pool_key = ctx.accounts.pool_config.key();

    let deposit_candidates = [ctx.accounts.deposit_record.to_account_info()];
    let accounts = InboundAccounts {
        oracle_report: &ctx.accounts.oracle_report,
        oracle_deposit: &ctx.accounts.oracle_deposit,
        commitment_record: &ctx.accounts.commitment_record,
        deposit_candidates: &deposit_candidates,
    };

    let staged = stage_finalize(
        program_id,
        pool_key,
        &mut ctx.accounts.pool_config,
        &mut ctx.accounts.merkle_tree,
        accounts,
        source_chain_id,
        deposit_id,
        now,
    )?;

    let staged = match staged {
        Some(staged) => staged,
        None => {
            msg!(
                "Deposit {} from chain {} already finalized",
                deposit_id,
                source_chain_id
            );
            return Ok(FinalizeOutcome::AlreadyFinalized);
        }
    };

    staged.persist(
        program_id,
        &ctx.accounts.payer.to_account_info(),
        &ctx.accounts.system_program.to_account_info(),
    )?;
    staged.emit_events(ctx.accounts.merkle_tree.current_root());

    msg!(
        "Deposit {} from chain {} finalized at leaf {}",
        deposit_id,
        source_chain_id,
        staged.leaf_index
    );
    Ok(FinalizeOutcome::Finalized {
        leaf_index: staged.leaf_index,
    })
}

