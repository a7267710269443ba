//! Events emitted by the Charon program

use anchor_lang::prelude::*;

#[event]
pub struct PoolInitialized {
    pub pool: Pubkey,
    pub controller: Pubkey,
    pub base_mint: Pubkey,
    pub chain_id: u64,
    pub denomination: u64,
    pub tree_depth: u8,
    pub timestamp: i64,
}

#[event]
pub struct VerificationKeySet {
    pub pool: Pubkey,
    pub controller: Pubkey,
    pub ic_length: u8,
    pub timestamp: i64,
}

#[event]
pub struct PoolFinalized {
    pub pool: Pubkey,
    pub initial_base: u64,
    pub initial_synthetic: u64,
    pub weight_base: u128,
    pub weight_synthetic: u128,
    pub partner_chains: u8,
    pub timestamp: i64,
}

#[event]
pub struct ControllerChanged {
    pub pool: Pubkey,
    pub old_controller: Pubkey,
    pub new_controller: Pubkey,
    pub timestamp: i64,
}

/// Outbound deposit, relayed to partner chains by their oracles
#[event]
pub struct DepositToOtherChain {
    pub pool: Pubkey,
    pub commitment: [u8; 32],
    pub deposit_id: u64,
    pub is_synthetic: bool,
    pub amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct OracleSubmissionRecorded {
    pub pool: Pubkey,
    pub source_chain_id: u64,
    pub deposit_id: u64,
    pub nonce: u64,
    pub submitted_at: i64,
}

#[event]
pub struct CommitmentInserted {
    pub pool: Pubkey,
    pub commitment: [u8; 32],
    pub leaf_index: u64,
    pub merkle_root: [u8; 32],
}

#[event]
pub struct OracleDepositFinalized {
    pub pool: Pubkey,
    pub source_chain_id: u64,
    pub deposit_id: u64,
    pub local_deposit_id: u64,
    pub leaf_index: u64,
    pub timestamp: i64,
}

#[event]
pub struct WithdrawalSettled {
    pub pool: Pubkey,
    pub nullifier_hash: [u8; 32],
    pub recipient: Pubkey,
    pub relayer: Pubkey,
    pub amount: u64,
    pub relayer_fee: u64,
    pub timestamp: i64,
}

#[event]
pub struct SwapExecuted {
    pub pool: Pubkey,
    pub trader: Pubkey,
    pub is_synthetic_in: bool,
    pub amount_in: u64,
    pub amount_out: u64,
    pub spot_price_after: u128,
}

#[event]
pub struct LiquidityAdded {
    pub pool: Pubkey,
    pub provider: Pubkey,
    pub base_in: u64,
    pub synthetic_in: u64,
    pub shares_out: u64,
}

#[event]
pub struct LiquidityRemoved {
    pub pool: Pubkey,
    pub provider: Pubkey,
    pub base_out: u64,
    pub synthetic_out: u64,
    pub shares_in: u64,
}
