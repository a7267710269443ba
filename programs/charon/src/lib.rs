//! Charon - cross-chain shielded pool with an embedded weighted AMM

use anchor_lang::prelude::*;

#[cfg(not(target_os = "solana"))]
pub mod client;
pub mod crypto;
pub mod error;
pub mod events;
pub mod instructions;
pub mod math;
pub mod oracle;
pub mod settlement;
pub mod state;
pub mod utils;


use instructions::*;
use state::{FinalizeOutcome, FinalizePoolParams, InitializePoolParams, OracleDepositStatus, SwapQuote};

declare_id!("Ch4rUYBVTqAt8qJ5fpWDGFqmZUmnJYaH1KK8ZTdh8hWv");

#[program]
pub mod charon {
    use super::*;

    // ---------------------------------------------------------------
    // Setup and control
    // ---------------------------------------------------------------

    pub fn initialize_pool(ctx: Context<InitializePool>, params: InitializePoolParams) -> Result<()> {
        instructions::initialize_pool::handler(ctx, params)
    }

    pub fn set_verification_key(
        ctx: Context<SetVerificationKey>,
        vk_alpha_g1: [u8; 64],
        vk_beta_g2: [u8; 128],
        vk_gamma_g2: [u8; 128],
        vk_delta_g2: [u8; 128],
        vk_ic: Vec<[u8; 64]>,
    ) -> Result<()> {
        instructions::set_verification_key::handler(
            ctx,
            vk_alpha_g1,
            vk_beta_g2,
            vk_gamma_g2,
            vk_delta_g2,
            vk_ic,
        )
    }

    pub fn finalize_pool(ctx: Context<FinalizePool>, params: FinalizePoolParams) -> Result<()> {
        instructions::finalize_pool::handler(ctx, params)
    }

    pub fn change_controller(ctx: Context<ChangeController>, new_controller: Pubkey) -> Result<()> {
        instructions::admin::change_controller::handler(ctx, new_controller)
    }

    // ---------------------------------------------------------------
    // Cross-chain deposits
    // ---------------------------------------------------------------

    pub fn deposit_to_other_chain(
        ctx: Context<DepositToOtherChain>,
        commitment: [u8; 32],
        is_synthetic: bool,
    ) -> Result<()> {
        instructions::deposit_to_other_chain::handler(ctx, commitment, is_synthetic)
    }

    pub fn record_oracle_submission(
        ctx: Context<RecordOracleSubmission>,
        source_chain_id: u64,
        deposit_id: u64,
    ) -> Result<OracleDepositStatus> {
        instructions::record_oracle_submission::handler(ctx, source_chain_id, deposit_id)
    }

    pub fn finalize_oracle_deposit(
        ctx: Context<FinalizeOracleDeposit>,
        source_chain_id: u64,
        deposit_id: u64,
    ) -> Result<FinalizeOutcome> {
        instructions::finalize_oracle_deposit::handler(ctx, source_chain_id, deposit_id)
    }

    pub fn finalize_oracle_deposits<'info>(
        ctx: Context<'_, '_, '_, 'info, FinalizeOracleDeposits<'info>>,
        source_chain_ids: Vec<u64>,
        deposit_ids: Vec<u64>,
    ) -> Result<Vec<FinalizeStatus>> {
        instructions::finalize_oracle_deposits::handler(ctx, source_chain_ids, deposit_ids)
    }

    // ---------------------------------------------------------------
    // Withdrawal
    // ---------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub fn secret_withdraw(
        ctx: Context<SecretWithdraw>,
        proof_data: Vec<u8>,
        merkle_root: [u8; 32],
        nullifier_hash: [u8; 32],
        recipient: Pubkey,
        relayer: Pubkey,
        relayer_fee: u64,
    ) -> Result<()> {
        instructions::secret_withdraw::handler(
            ctx,
            proof_data,
            merkle_root,
            nullifier_hash,
            recipient,
            relayer,
            relayer_fee,
        )
    }

    // ---------------------------------------------------------------
    // Weighted pool
    // ---------------------------------------------------------------

    pub fn swap(
        ctx: Context<Swap>,
        is_synthetic_in: bool,
        amount_in: u64,
        min_amount_out: u64,
        max_price: u128,
    ) -> Result<SwapQuote> {
        instructions::swap::handler(ctx, is_synthetic_in, amount_in, min_amount_out, max_price)
    }

    pub fn lp_deposit(
        ctx: Context<Liquidity>,
        pool_amount_out: u64,
        max_amounts_in: [u64; 2],
    ) -> Result<[u64; 2]> {
        instructions::liquidity::lp_deposit(ctx, pool_amount_out, max_amounts_in)
    }

    pub fn lp_withdraw(
        ctx: Context<Liquidity>,
        pool_amount_in: u64,
        min_amounts_out: [u64; 2],
    ) -> Result<[u64; 2]> {
        instructions::liquidity::lp_withdraw(ctx, pool_amount_in, min_amounts_out)
    }

    pub fn lp_deposit_single(
        ctx: Context<Liquidity>,
        is_synthetic: bool,
        amount_in: u64,
        min_pool_amount_out: u64,
    ) -> Result<u64> {
        instructions::liquidity::lp_deposit_single(ctx, is_synthetic, amount_in, min_pool_amount_out)
    }

    pub fn lp_withdraw_single(
        ctx: Context<Liquidity>,
        is_synthetic: bool,
        pool_amount_in: u64,
        min_amount_out: u64,
    ) -> Result<u64> {
        instructions::liquidity::lp_withdraw_single(ctx, is_synthetic, pool_amount_in, min_amount_out)
    }

    // ---------------------------------------------------------------
    // Views
    // ---------------------------------------------------------------

    pub fn is_known_root(ctx: Context<IsKnownRoot>, root: [u8; 32]) -> Result<bool> {
        instructions::views::is_known_root(ctx, root)
    }

    pub fn is_spent_batch(ctx: Context<PoolView>, nullifier_hashes: Vec<[u8; 32]>) -> Result<Vec<bool>> {
        instructions::views::is_spent_batch(ctx, nullifier_hashes)
    }

    pub fn get_spot_price(ctx: Context<PoolView>) -> Result<u128> {
        instructions::views::get_spot_price(ctx)
    }

    pub fn get_deposit_id(ctx: Context<CommitmentLookup>, commitment: [u8; 32]) -> Result<u64> {
        instructions::views::get_deposit_id(ctx, commitment)
    }

    pub fn was_deposited(ctx: Context<CommitmentLookup>, commitment: [u8; 32]) -> Result<bool> {
        instructions::views::was_deposited(ctx, commitment)
    }

    pub fn get_commitment(
        ctx: Context<DepositLookup>,
        origin_chain_id: u64,
        deposit_id: u64,
    ) -> Result<[u8; 32]> {
        instructions::views::get_commitment(ctx, origin_chain_id, deposit_id)
    }
}
