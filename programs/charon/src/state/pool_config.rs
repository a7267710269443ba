//! Pool configuration and weighted-pool ledger
//!
//! One account per pool holding its configuration, the partner-chain table,
//! the outbound deposit counter and the two-asset weighted pool. Every pool
//! operation here updates the ledger and returns the [`Settlement`] the
//! handler must execute afterwards.

use anchor_lang::prelude::*;

use crate::crypto::HashFunction;
use crate::error::CharonError;
use crate::math::fixed_point::{div_down, div_up, mul_down, mul_up};
use crate::math::weighted::{MAX_FEE, MAX_IN_RATIO, MAX_OUT_RATIO, MAX_TOTAL_WEIGHT, MAX_WEIGHT, MIN_WEIGHT};
use crate::math::{
    calc_in_given_out, calc_out_given_in, calc_pool_out_given_single_in,
    calc_single_out_given_pool_in, calc_spot_price, WAD,
};
use crate::oracle::OracleFeed;
use crate::settlement::{Asset, Party, Settlement};

/// Shares minted to the controller when the pool is finalized
pub const INIT_POOL_SUPPLY: u64 = 100 * 1_000_000_000;

pub const MAX_PARTNER_CHAINS: usize = 16;
pub const MAX_TOKEN_NAME_LEN: usize = 32;
pub const MAX_TOKEN_SYMBOL_LEN: usize = 10;

/// Basis points denominator
pub const BPS: u128 = 10_000;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct InitializePoolParams {
    pub tree_depth: u8,
    pub hash_function: HashFunction,
    /// Fixed withdrawal amount in synthetic units
    pub denomination: u64,
    pub fee_bps: u16,
    /// Id of this chain in the cross-chain namespace
    pub chain_id: u64,
    pub oracle_program: Pubkey,
    pub pool_token_name: String,
    pub pool_token_symbol: String,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartnerChainParams {
    pub chain_id: u64,
    /// Deposit contract on the partner chain
    pub contract: [u8; 32],
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct FinalizePoolParams {
    pub initial_base: u64,
    pub initial_synthetic: u64,
    pub weight_base: u128,
    pub weight_synthetic: u128,
    pub partners: Vec<PartnerChainParams>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartnerChain {
    pub chain_id: u64,
    pub contract: [u8; 32],
    /// Ids already assigned to commitments finalized from this chain
    pub inbound_count: u64,
}

impl PartnerChain {
    pub const LEN: usize = 8 + 32 + 8;
}

/// Record balances mirror vault custody. Weights are WAD scaled.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolState {
    pub record_balance_base: u64,
    pub record_balance_synthetic: u64,
    pub weight_base: u128,
    pub weight_synthetic: u128,
    pub total_pool_shares: u64,
}

impl PoolState {
    pub const LEN: usize = 8 + 8 + 16 + 16 + 8;

    fn side(&self, asset: Asset) -> (u128, u128) {
        match asset {
            Asset::Synthetic => (
                self.record_balance_synthetic as u128,
                self.weight_synthetic,
            ),
            _ => (self.record_balance_base as u128, self.weight_base),
        }
    }

    fn balance_mut(&mut self, asset: Asset) -> &mut u64 {
        match asset {
            Asset::Synthetic => &mut self.record_balance_synthetic,
            _ => &mut self.record_balance_base,
        }
    }

    fn credit(&mut self, asset: Asset, amount: u64) -> Result<()> {
        let balance = self.balance_mut(asset);
        *balance = balance
            .checked_add(amount)
            .ok_or(error!(CharonError::ArithmeticOverflow))?;
        Ok(())
    }

    fn debit(&mut self, asset: Asset, amount: u64) -> Result<()> {
        let balance = self.balance_mut(asset);
        *balance = balance
            .checked_sub(amount)
            .ok_or(error!(CharonError::InvariantViolation))?;
        Ok(())
    }

    fn mint_shares(&mut self, amount: u64) -> Result<()> {
        self.total_pool_shares = self
            .total_pool_shares
            .checked_add(amount)
            .ok_or(error!(CharonError::ArithmeticOverflow))?;
        Ok(())
    }

    fn burn_shares(&mut self, amount: u64) -> Result<()> {
        self.total_pool_shares = self
            .total_pool_shares
            .checked_sub(amount)
            .ok_or(error!(CharonError::InvariantViolation))?;
        Ok(())
    }

    pub fn total_weight(&self) -> Result<u128> {
        self.weight_base
            .checked_add(self.weight_synthetic)
            .ok_or(error!(CharonError::ArithmeticOverflow))
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapQuote {
    pub amount_out: u64,
    pub spot_price_after: u128,
}

/// Main pool account.
///
/// PDA Seeds: `[b"pool", base_mint.key().as_ref()]`
#[account]
pub struct PoolConfig {
    /// Can finalize, set the verification key and hand over control
    pub controller: Pubkey,

    pub base_mint: Pubkey,
    pub synthetic_mint: Pubkey,
    pub share_mint: Pubkey,
    pub base_vault: Pubkey,
    pub synthetic_vault: Pubkey,
    pub merkle_tree: Pubkey,
    pub verification_key: Pubkey,

    /// Program owning the oracle report accounts
    pub oracle_program: Pubkey,

    pub chain_id: u64,
    pub denomination: u64,
    pub fee_bps: u16,
    pub tree_depth: u8,

    pub finalized: bool,
    pub vk_configured: bool,

    /// Outbound deposits made from this chain (local id namespace)
    pub deposit_count: u64,

    pub total_withdrawals: u64,

    pub pool: PoolState,

    pub partners: Vec<PartnerChain>,

    pub pool_token_name: String,
    pub pool_token_symbol: String,

    pub bump: u8,
    pub base_vault_bump: u8,
    pub synthetic_vault_bump: u8,
    pub synthetic_mint_bump: u8,
    pub share_mint_bump: u8,

    pub _reserved: [u8; 32],
}

impl PoolConfig {
    pub const SEED_PREFIX: &'static [u8] = b"pool";

    pub const LEN: usize = 8 // discriminator
        + 32 * 9 // controller, mints, vaults, tree, vk, oracle
        + 8  // chain_id
        + 8  // denomination
        + 2  // fee_bps
        + 1  // tree_depth
        + 1  // finalized
        + 1  // vk_configured
        + 8  // deposit_count
        + 8  // total_withdrawals
        + PoolState::LEN
        + 4 + PartnerChain::LEN * MAX_PARTNER_CHAINS
        + 4 + MAX_TOKEN_NAME_LEN
        + 4 + MAX_TOKEN_SYMBOL_LEN
        + 5  // bumps
        + 32; // reserved

    pub fn initialize(&mut self, controller: Pubkey, params: &InitializePoolParams) -> Result<()> {
        require!(params.denomination > 0, CharonError::InvalidAmount);
        require!(
            (params.fee_bps as u128) * WAD / BPS <= MAX_FEE,
            CharonError::InvalidFee
        );
        require!(
            !params.pool_token_name.is_empty()
                && params.pool_token_name.len() <= MAX_TOKEN_NAME_LEN
                && !params.pool_token_symbol.is_empty()
                && params.pool_token_symbol.len() <= MAX_TOKEN_SYMBOL_LEN,
            CharonError::InvalidPoolTokenMetadata
        );

        self.controller = controller;
        self.oracle_program = params.oracle_program;
        self.chain_id = params.chain_id;
        self.denomination = params.denomination;
        self.fee_bps = params.fee_bps;
        self.tree_depth = params.tree_depth;
        self.finalized = false;
        self.vk_configured = false;
        self.deposit_count = 0;
        self.total_withdrawals = 0;
        self.pool = PoolState::default();
        self.partners = Vec::new();
        self.pool_token_name = params.pool_token_name.clone();
        self.pool_token_symbol = params.pool_token_symbol.clone();
        self._reserved = [0u8; 32];
        Ok(())
    }

    pub fn require_controller(&self, signer: &Pubkey) -> Result<()> {
        require_keys_eq!(*signer, self.controller, CharonError::Unauthorized);
        Ok(())
    }

    pub fn require_finalized(&self) -> Result<()> {
        require!(self.finalized, CharonError::NotFinalized);
        Ok(())
    }

    pub fn require_vk_configured(&self) -> Result<()> {
        require!(self.vk_configured, CharonError::VerificationKeyNotSet);
        Ok(())
    }

    /// Swap fee as a WAD fraction
    pub fn fee(&self) -> u128 {
        (self.fee_bps as u128) * WAD / BPS
    }

    pub fn set_vk_configured(&mut self, configured: bool) {
        self.vk_configured = configured;
    }

    pub fn transfer_control(&mut self, new_controller: Pubkey) {
        self.controller = new_controller;
    }

    // ------------------------------------------------------------------
    // Partner chains and deposit ids
    // ------------------------------------------------------------------

    pub fn partner(&self, chain_id: u64) -> Result<&PartnerChain> {
        self.partners
            .iter()
            .find(|p| p.chain_id == chain_id)
            .ok_or(error!(CharonError::UnknownPartnerChain))
    }

    /// Reject a feed that reports `query_id` for a contract other than
    /// `chain_id`'s registered one. A feed with nothing reported passes.
    pub fn require_trusted_feed<F: OracleFeed>(
        &self,
        chain_id: u64,
        query_id: &[u8; 32],
        feed: &F,
    ) -> Result<()> {
        let partner = self.partner(chain_id)?;
        if feed.new_value_count(query_id) == 0 {
            return Ok(());
        }
        require!(
            feed.reporting_contract() == partner.contract,
            CharonError::UntrustedOracleReport
        );
        Ok(())
    }

    pub fn is_partner(&self, chain_id: u64) -> bool {
        self.partners.iter().any(|p| p.chain_id == chain_id)
    }

    /// Id the next commitment finalized from `chain_id` will get.
    pub fn next_inbound_id(&self, chain_id: u64) -> Result<u64> {
        self.partner(chain_id)?
            .inbound_count
            .checked_add(1)
            .ok_or(error!(CharonError::ArithmeticOverflow))
    }

    pub fn claim_inbound_id(&mut self, chain_id: u64) -> Result<u64> {
        let id = self.next_inbound_id(chain_id)?;
        let partner = self
            .partners
            .iter_mut()
            .find(|p| p.chain_id == chain_id)
            .ok_or(error!(CharonError::UnknownPartnerChain))?;
        partner.inbound_count = id;
        Ok(id)
    }

    pub fn next_outbound_id(&self) -> Result<u64> {
        self.deposit_count
            .checked_add(1)
            .ok_or(error!(CharonError::ArithmeticOverflow))
    }

    pub fn claim_outbound_id(&mut self) -> Result<u64> {
        let id = self.next_outbound_id()?;
        self.deposit_count = id;
        Ok(id)
    }

    pub fn increment_withdrawals(&mut self) -> Result<()> {
        self.total_withdrawals = self
            .total_withdrawals
            .checked_add(1)
            .ok_or(error!(CharonError::ArithmeticOverflow))?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Weighted pool
    // ------------------------------------------------------------------

    /// Bind the initial liquidity and open the pool. Runs once.
    ///
    /// The controller supplies the base side; the synthetic side is minted
    /// straight into the pool's vault.
    pub fn finalize(&mut self, params: &FinalizePoolParams) -> Result<Settlement> {
        require!(!self.finalized, CharonError::AlreadyFinalized);
        require!(
            params.initial_base > 0 && params.initial_synthetic > 0,
            CharonError::InvalidAmount
        );
        for weight in [params.weight_base, params.weight_synthetic] {
            require!(
                (MIN_WEIGHT..=MAX_WEIGHT).contains(&weight),
                CharonError::InvalidWeight
            );
        }
        require!(
            params.weight_base.saturating_add(params.weight_synthetic) <= MAX_TOTAL_WEIGHT,
            CharonError::InvalidWeight
        );
        require!(
            params.partners.len() <= MAX_PARTNER_CHAINS,
            CharonError::TooManyPartnerChains
        );

        let mut partners: Vec<PartnerChain> = Vec::with_capacity(params.partners.len());
        for p in &params.partners {
            require!(
                p.chain_id != self.chain_id && partners.iter().all(|q| q.chain_id != p.chain_id),
                CharonError::DuplicatePartnerChain
            );
            partners.push(PartnerChain {
                chain_id: p.chain_id,
                contract: p.contract,
                inbound_count: 0,
            });
        }

        self.partners = partners;
        self.pool = PoolState {
            record_balance_base: params.initial_base,
            record_balance_synthetic: params.initial_synthetic,
            weight_base: params.weight_base,
            weight_synthetic: params.weight_synthetic,
            total_pool_shares: INIT_POOL_SUPPLY,
        };
        self.finalized = true;

        Ok(Settlement::new()
            .collect(Party::Caller, Asset::Base, params.initial_base)
            .mint(Party::Pool, Asset::Synthetic, params.initial_synthetic)
            .mint(Party::Caller, Asset::Share, INIT_POOL_SUPPLY))
    }

    /// Base per synthetic: `(Bb / Wb) / (Bs / Ws)`.
    pub fn spot_price(&self) -> Result<u128> {
        self.require_finalized()?;
        calc_spot_price(
            self.pool.record_balance_base as u128,
            self.pool.weight_base,
            self.pool.record_balance_synthetic as u128,
            self.pool.weight_synthetic,
            0,
        )
    }

    fn swap_spot_price(&self, asset_in: Asset, asset_out: Asset) -> Result<u128> {
        let (balance_in, weight_in) = self.pool.side(asset_in);
        let (balance_out, weight_out) = self.pool.side(asset_out);
        calc_spot_price(balance_in, weight_in, balance_out, weight_out, self.fee())
    }

    /// Exact-in swap between the two assets.
    ///
    /// `max_price` bounds the price of the output in input units, both
    /// before and after the trade.
    pub fn swap(
        &mut self,
        is_synthetic_in: bool,
        amount_in: u64,
        min_amount_out: u64,
        max_price: u128,
    ) -> Result<(SwapQuote, Settlement)> {
        self.require_finalized()?;
        let (asset_in, asset_out) = if is_synthetic_in {
            (Asset::Synthetic, Asset::Base)
        } else {
            (Asset::Base, Asset::Synthetic)
        };

        let spot_before = self.swap_spot_price(asset_in, asset_out)?;
        require!(spot_before <= max_price, CharonError::ExcessiveSlippage);

        let (balance_in, weight_in) = self.pool.side(asset_in);
        let (balance_out, weight_out) = self.pool.side(asset_out);
        let amount_out = calc_out_given_in(
            balance_in,
            weight_in,
            balance_out,
            weight_out,
            amount_in as u128,
            self.fee(),
        )?;
        let amount_out =
            u64::try_from(amount_out).map_err(|_| error!(CharonError::ArithmeticOverflow))?;
        require!(amount_out > 0, CharonError::InvalidAmount);
        require!(amount_out >= min_amount_out, CharonError::ExcessiveSlippage);

        self.pool.credit(asset_in, amount_in)?;
        self.pool.debit(asset_out, amount_out)?;

        let spot_after = self.swap_spot_price(asset_in, asset_out)?;
        require!(spot_after >= spot_before, CharonError::InvariantViolation);
        require!(spot_after <= max_price, CharonError::ExcessiveSlippage);
        require!(
            spot_before <= div_up(amount_in as u128, amount_out as u128)?,
            CharonError::InvariantViolation
        );

        let settlement = Settlement::new()
            .collect(Party::Caller, asset_in, amount_in)
            .pay(Party::Caller, asset_out, amount_out);

        Ok((
            SwapQuote {
                amount_out,
                spot_price_after: spot_after,
            },
            settlement,
        ))
    }

    /// Proportional join. Returns the amounts charged `[base, synthetic]`.
    pub fn lp_deposit(
        &mut self,
        pool_amount_out: u64,
        max_amounts_in: [u64; 2],
    ) -> Result<([u64; 2], Settlement)> {
        self.require_finalized()?;
        require!(pool_amount_out > 0, CharonError::InvalidAmount);

        let ratio = div_up(pool_amount_out as u128, self.pool.total_pool_shares as u128)?;
        let mut amounts = [0u64; 2];
        for (i, asset) in [Asset::Base, Asset::Synthetic].into_iter().enumerate() {
            let (balance, _) = self.pool.side(asset);
            let amount = u64::try_from(mul_up(ratio, balance)?)
                .map_err(|_| error!(CharonError::ArithmeticOverflow))?;
            require!(amount > 0, CharonError::InvalidAmount);
            require!(amount <= max_amounts_in[i], CharonError::ExcessiveSlippage);
            amounts[i] = amount;
        }

        self.pool.credit(Asset::Base, amounts[0])?;
        self.pool.credit(Asset::Synthetic, amounts[1])?;
        self.pool.mint_shares(pool_amount_out)?;

        let settlement = Settlement::new()
            .collect(Party::Caller, Asset::Base, amounts[0])
            .collect(Party::Caller, Asset::Synthetic, amounts[1])
            .mint(Party::Caller, Asset::Share, pool_amount_out);
        Ok((amounts, settlement))
    }

    /// Proportional exit. The exit fee is taken in shares and goes to the
    /// controller. Returns the amounts paid `[base, synthetic]`.
    pub fn lp_withdraw(
        &mut self,
        pool_amount_in: u64,
        min_amounts_out: [u64; 2],
    ) -> Result<([u64; 2], Settlement)> {
        self.require_finalized()?;
        require!(pool_amount_in > 0, CharonError::InvalidAmount);
        require!(
            pool_amount_in <= self.pool.total_pool_shares,
            CharonError::InsufficientLiquidity
        );

        let (exit_fee, pool_amount_in_after_fee) = self.split_exit_fee(pool_amount_in)?;
        let ratio = div_down(
            pool_amount_in_after_fee as u128,
            self.pool.total_pool_shares as u128,
        )?;

        let mut amounts = [0u64; 2];
        for (i, asset) in [Asset::Base, Asset::Synthetic].into_iter().enumerate() {
            let (balance, _) = self.pool.side(asset);
            let amount = u64::try_from(mul_down(ratio, balance)?)
                .map_err(|_| error!(CharonError::ArithmeticOverflow))?;
            require!(amount >= min_amounts_out[i], CharonError::ExcessiveSlippage);
            amounts[i] = amount;
        }

        self.pool.debit(Asset::Base, amounts[0])?;
        self.pool.debit(Asset::Synthetic, amounts[1])?;
        self.pool.burn_shares(pool_amount_in_after_fee)?;

        let settlement = Settlement::new()
            .burn(Party::Caller, Asset::Share, pool_amount_in)
            .mint(Party::Controller, Asset::Share, exit_fee)
            .pay(Party::Caller, Asset::Base, amounts[0])
            .pay(Party::Caller, Asset::Synthetic, amounts[1]);
        Ok((amounts, settlement))
    }

    /// Join with one asset. Returns shares minted.
    pub fn lp_deposit_single(
        &mut self,
        is_synthetic: bool,
        amount_in: u64,
        min_pool_amount_out: u64,
    ) -> Result<(u64, Settlement)> {
        self.require_finalized()?;
        let asset = asset_for(is_synthetic);
        let (balance, weight) = self.pool.side(asset);
        require!(
            amount_in as u128 <= mul_down(balance, MAX_IN_RATIO)?,
            CharonError::InsufficientLiquidity
        );

        let pool_amount_out = calc_pool_out_given_single_in(
            balance,
            weight,
            self.pool.total_pool_shares as u128,
            self.pool.total_weight()?,
            amount_in as u128,
        )?;
        let pool_amount_out = u64::try_from(pool_amount_out)
            .map_err(|_| error!(CharonError::ArithmeticOverflow))?;
        require!(pool_amount_out > 0, CharonError::InvalidAmount);
        require!(
            pool_amount_out >= min_pool_amount_out,
            CharonError::ExcessiveSlippage
        );

        self.pool.credit(asset, amount_in)?;
        self.pool.mint_shares(pool_amount_out)?;

        let settlement = Settlement::new()
            .collect(Party::Caller, asset, amount_in)
            .mint(Party::Caller, Asset::Share, pool_amount_out);
        Ok((pool_amount_out, settlement))
    }

    /// Exit into one asset. Returns the amount paid.
    pub fn lp_withdraw_single(
        &mut self,
        is_synthetic: bool,
        pool_amount_in: u64,
        min_amount_out: u64,
    ) -> Result<(u64, Settlement)> {
        self.require_finalized()?;
        require!(pool_amount_in > 0, CharonError::InvalidAmount);
        let asset = asset_for(is_synthetic);
        let (balance, weight) = self.pool.side(asset);

        // Only the shares that actually leave the supply are priced
        let (exit_fee, pool_amount_in_after_fee) = self.split_exit_fee(pool_amount_in)?;
        let amount_out = calc_single_out_given_pool_in(
            balance,
            weight,
            self.pool.total_pool_shares as u128,
            self.pool.total_weight()?,
            pool_amount_in_after_fee as u128,
            self.fee(),
        )?;
        let amount_out =
            u64::try_from(amount_out).map_err(|_| error!(CharonError::ArithmeticOverflow))?;
        require!(amount_out >= min_amount_out, CharonError::ExcessiveSlippage);
        require!(
            amount_out as u128 <= mul_down(balance, MAX_OUT_RATIO)?,
            CharonError::InsufficientLiquidity
        );

        self.pool.debit(asset, amount_out)?;
        self.pool.burn_shares(pool_amount_in_after_fee)?;

        let settlement = Settlement::new()
            .burn(Party::Caller, Asset::Share, pool_amount_in)
            .mint(Party::Controller, Asset::Share, exit_fee)
            .pay(Party::Caller, asset, amount_out);
        Ok((amount_out, settlement))
    }

    /// Split burned shares into `(exit_fee, shares leaving the supply)`.
    fn split_exit_fee(&self, pool_amount_in: u64) -> Result<(u64, u64)> {
        let fee = mul_up(pool_amount_in as u128, self.fee())?;
        let fee = u64::try_from(fee).map_err(|_| error!(CharonError::ArithmeticOverflow))?;
        let remaining = pool_amount_in
            .checked_sub(fee)
            .ok_or(error!(CharonError::InvariantViolation))?;
        Ok((fee, remaining))
    }

    // ------------------------------------------------------------------
    // Cross-chain deposit and withdrawal legs
    // ------------------------------------------------------------------

    /// Charge one denomination for an outbound deposit.
    ///
    /// Paying in synthetic burns it. Paying in base buys the equivalent
    /// synthetic at the current curve; the base stays in the pool.
    pub fn charge_deposit(&mut self, is_synthetic: bool) -> Result<(u64, Settlement)> {
        self.require_finalized()?;

        if is_synthetic {
            let settlement =
                Settlement::new().burn(Party::Caller, Asset::Synthetic, self.denomination);
            return Ok((self.denomination, settlement));
        }

        let amount_in = calc_in_given_out(
            self.pool.record_balance_base as u128,
            self.pool.weight_base,
            self.pool.record_balance_synthetic as u128,
            self.pool.weight_synthetic,
            self.denomination as u128,
            0,
        )?;
        let amount_in =
            u64::try_from(amount_in).map_err(|_| error!(CharonError::ArithmeticOverflow))?;
        self.pool.credit(Asset::Base, amount_in)?;

        let settlement = Settlement::new().collect(Party::Caller, Asset::Base, amount_in);
        Ok((amount_in, settlement))
    }

    /// Payout for a proven withdrawal: `denomination - fee` synthetic to the
    /// recipient and `fee` to the relayer.
    pub fn withdrawal_payout(&mut self, relayer_fee: u64) -> Result<Settlement> {
        self.require_finalized()?;
        require!(
            relayer_fee <= self.denomination,
            CharonError::RelayerFeeExceedsAmount
        );
        self.increment_withdrawals()?;

        Ok(Settlement::new()
            .mint(
                Party::Recipient,
                Asset::Synthetic,
                self.denomination - relayer_fee,
            )
            .mint(Party::Relayer, Asset::Synthetic, relayer_fee))
    }
}

fn asset_for(is_synthetic: bool) -> Asset {
    if is_synthetic {
        Asset::Synthetic
    } else {
        Asset::Base
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::settlement::MovementKind;

    pub const TOKEN: u64 = 1_000_000_000;

    pub fn blank_pool() -> PoolConfig {
        PoolConfig {
            controller: Pubkey::default(),
            base_mint: Pubkey::default(),
            synthetic_mint: Pubkey::default(),
            share_mint: Pubkey::default(),
            base_vault: Pubkey::default(),
            synthetic_vault: Pubkey::default(),
            merkle_tree: Pubkey::default(),
            verification_key: Pubkey::default(),
            oracle_program: Pubkey::default(),
            chain_id: 0,
            denomination: 0,
            fee_bps: 0,
            tree_depth: 0,
            finalized: false,
            vk_configured: false,
            deposit_count: 0,
            total_withdrawals: 0,
            pool: PoolState::default(),
            partners: Vec::new(),
            pool_token_name: String::new(),
            pool_token_symbol: String::new(),
            bump: 0,
            base_vault_bump: 0,
            synthetic_vault_bump: 0,
            synthetic_mint_bump: 0,
            share_mint_bump: 0,
            _reserved: [0u8; 32],
        }
    }

    pub fn init_params(chain_id: u64, fee_bps: u16) -> InitializePoolParams {
        InitializePoolParams {
            tree_depth: 5,
            hash_function: HashFunction::Keccak,
            denomination: 100 * TOKEN,
            fee_bps,
            chain_id,
            oracle_program: Pubkey::new_unique(),
            pool_token_name: "Charon Pool Token".to_string(),
            pool_token_symbol: "CPT".to_string(),
        }
    }

    pub fn finalize_params(partner: u64) -> FinalizePoolParams {
        FinalizePoolParams {
            initial_base: 100 * TOKEN,
            initial_synthetic: 1000 * TOKEN,
            weight_base: 5 * WAD,
            weight_synthetic: 5 * WAD,
            partners: vec![PartnerChainParams {
                chain_id: partner,
                contract: [partner as u8; 32],
            }],
        }
    }

    /// Initialized and finalized pool on `chain_id` partnered with `partner`.
    pub fn live_pool(chain_id: u64, partner: u64, fee_bps: u16) -> PoolConfig {
        let mut pool = blank_pool();
        pool.initialize(Pubkey::new_unique(), &init_params(chain_id, fee_bps))
            .unwrap();
        let _ = pool.finalize(&finalize_params(partner)).unwrap();
        pool
    }

    #[test]
    fn test_fee_bounds() {
        let mut pool = blank_pool();
        assert!(pool.initialize(Pubkey::default(), &init_params(1, 1000)).is_ok());
        assert_eq!(pool.fee(), WAD / 10);
        assert_eq!(
            pool.initialize(Pubkey::default(), &init_params(1, 1001)).unwrap_err(),
            error!(CharonError::InvalidFee)
        );
    }

    #[test]
    fn test_token_metadata_bounds() {
        let mut pool = blank_pool();
        let mut params = init_params(1, 0);
        params.pool_token_symbol = "WAY_TOO_LONG_SYMBOL".to_string();
        assert_eq!(
            pool.initialize(Pubkey::default(), &params).unwrap_err(),
            error!(CharonError::InvalidPoolTokenMetadata)
        );
    }

    #[test]
    fn test_operations_require_finalize() {
        let mut pool = blank_pool();
        pool.initialize(Pubkey::default(), &init_params(1, 0)).unwrap();

        let not_finalized = error!(CharonError::NotFinalized);
        assert_eq!(pool.swap(false, TOKEN, 0, u128::MAX).unwrap_err(), not_finalized);
        assert_eq!(pool.lp_deposit(TOKEN, [u64::MAX; 2]).unwrap_err(), not_finalized);
        assert_eq!(pool.lp_withdraw(TOKEN, [0; 2]).unwrap_err(), not_finalized);
        assert_eq!(pool.charge_deposit(true).unwrap_err(), not_finalized);
        assert_eq!(pool.withdrawal_payout(0).unwrap_err(), not_finalized);
        assert_eq!(pool.spot_price().unwrap_err(), not_finalized);
    }

    #[test]
    fn test_finalize_once() {
        let mut pool = blank_pool();
        pool.initialize(Pubkey::default(), &init_params(1, 0)).unwrap();
        let settlement = pool.finalize(&finalize_params(2)).unwrap();

        assert_eq!(pool.pool.total_pool_shares, INIT_POOL_SUPPLY);
        assert_eq!(
            settlement.total(MovementKind::Mint, Party::Caller, Asset::Share),
            INIT_POOL_SUPPLY
        );
        assert_eq!(
            settlement.total(MovementKind::Mint, Party::Pool, Asset::Synthetic),
            1000 * TOKEN
        );
        assert_eq!(
            pool.finalize(&finalize_params(2)).unwrap_err(),
            error!(CharonError::AlreadyFinalized)
        );
    }

    #[test]
    fn test_finalize_rejects_bad_partners() {
        let mut pool = blank_pool();
        pool.initialize(Pubkey::default(), &init_params(1, 0)).unwrap();

        let mut params = finalize_params(2);
        params.partners.push(params.partners[0]);
        assert_eq!(
            pool.finalize(&params).unwrap_err(),
            error!(CharonError::DuplicatePartnerChain)
        );

        let own_chain = finalize_params(1);
        assert_eq!(
            pool.finalize(&own_chain).unwrap_err(),
            error!(CharonError::DuplicatePartnerChain)
        );

        let mut too_many = finalize_params(2);
        too_many.partners = (10..27)
            .map(|chain_id| PartnerChainParams {
                chain_id,
                contract: [0u8; 32],
            })
            .collect();
        assert_eq!(
            pool.finalize(&too_many).unwrap_err(),
            error!(CharonError::TooManyPartnerChains)
        );
        assert!(!pool.finalized);
    }

    #[test]
    fn test_spot_price_base_per_synthetic() {
        let pool = live_pool(1, 2, 0);
        assert_eq!(pool.spot_price().unwrap(), WAD / 10);
    }

    #[test]
    fn test_id_namespaces_independent() {
        let mut pool = live_pool(1, 2, 0);
        assert_eq!(pool.claim_outbound_id().unwrap(), 1);
        assert_eq!(pool.claim_inbound_id(2).unwrap(), 1);
        assert_eq!(pool.claim_inbound_id(2).unwrap(), 2);
        assert_eq!(pool.claim_outbound_id().unwrap(), 2);
        assert_eq!(
            pool.claim_inbound_id(3).unwrap_err(),
            error!(CharonError::UnknownPartnerChain)
        );
    }

    #[test]
    fn test_swap_moves_balances() {
        let mut pool = live_pool(1, 2, 0);
        let (quote, settlement) = pool.swap(false, 10 * TOKEN, 0, u128::MAX).unwrap();

        assert_eq!(pool.pool.record_balance_base, 110 * TOKEN);
        assert_eq!(
            pool.pool.record_balance_synthetic,
            1000 * TOKEN - quote.amount_out
        );
        assert_eq!(
            settlement.total(MovementKind::Pay, Party::Caller, Asset::Synthetic),
            quote.amount_out
        );
        // 1000 * (1 - 100/110) ~= 90.909
        assert!(quote.amount_out > 90 * TOKEN && quote.amount_out < 91 * TOKEN);
    }

    #[test]
    fn test_swap_slippage_guards() {
        let mut pool = live_pool(1, 2, 0);
        assert_eq!(
            pool.swap(false, 10 * TOKEN, 100 * TOKEN, u128::MAX).unwrap_err(),
            error!(CharonError::ExcessiveSlippage)
        );
        assert_eq!(
            pool.swap(false, 10 * TOKEN, 0, WAD / 100).unwrap_err(),
            error!(CharonError::ExcessiveSlippage)
        );
        assert_eq!(pool.pool.record_balance_base, 100 * TOKEN);
    }

    #[test]
    fn test_lp_withdraw_pays_exit_fee_to_controller() {
        let mut pool = live_pool(1, 2, 100);
        let (_, settlement) = pool.lp_withdraw(10 * TOKEN, [0; 2]).unwrap();

        let fee = settlement.total(MovementKind::Mint, Party::Controller, Asset::Share);
        assert_eq!(fee, TOKEN / 10);
        assert_eq!(
            pool.pool.total_pool_shares,
            INIT_POOL_SUPPLY - (10 * TOKEN - fee)
        );
    }

    #[test]
    fn test_charge_deposit_in_base() {
        let mut pool = live_pool(1, 2, 0);
        let (amount_in, settlement) = pool.charge_deposit(false).unwrap();

        // 100 * (1000 / 900 - 1) ~= 11.11 base for 100 synthetic
        assert!(amount_in > 11 * TOKEN && amount_in < 12 * TOKEN);
        assert_eq!(pool.pool.record_balance_base, 100 * TOKEN + amount_in);
        assert_eq!(pool.pool.record_balance_synthetic, 1000 * TOKEN);
        assert_eq!(
            settlement.total(MovementKind::Collect, Party::Caller, Asset::Base),
            amount_in
        );
    }

    #[test]
    fn test_charge_deposit_in_synthetic_burns() {
        let mut pool = live_pool(1, 2, 0);
        let before = pool.pool;
        let (amount, settlement) = pool.charge_deposit(true).unwrap();

        assert_eq!(amount, 100 * TOKEN);
        assert_eq!(pool.pool, before);
        assert_eq!(
            settlement.total(MovementKind::Burn, Party::Caller, Asset::Synthetic),
            100 * TOKEN
        );
    }

    #[test]
    fn test_withdrawal_payout_split() {
        let mut pool = live_pool(1, 2, 0);
        let settlement = pool.withdrawal_payout(5 * TOKEN).unwrap();
        assert_eq!(
            settlement.total(MovementKind::Mint, Party::Recipient, Asset::Synthetic),
            95 * TOKEN
        );
        assert_eq!(
            settlement.total(MovementKind::Mint, Party::Relayer, Asset::Synthetic),
            5 * TOKEN
        );
        assert_eq!(
            pool.withdrawal_payout(101 * TOKEN).unwrap_err(),
            error!(CharonError::RelayerFeeExceedsAmount)
        );
    }
}
