//! Query ids for cross-chain deposits
//!
//! `keccak256(abi.encode(string "Charon", bytes abi.encode(uint256 chain, uint256 depositId)))`
//!
//! Partner-chain reporters derive the same id, so the encoding is
//! byte-for-byte Solidity ABI.

use alloy_primitives::{Bytes, U256};
use alloy_sol_types::SolValue;
use solana_program::keccak;

pub const QUERY_TAG: &str = "Charon";

/// `abi.encode(uint256 chain, uint256 depositId)`
pub fn encode_query_data(chain_id: u64, deposit_id: u64) -> Vec<u8> {
    (U256::from(chain_id), U256::from(deposit_id)).abi_encode_params()
}

/// `abi.encode(string "Charon", bytes queryData)`, the preimage of the id.
pub fn encode_query(chain_id: u64, deposit_id: u64) -> Vec<u8> {
    let query_data = Bytes::from(encode_query_data(chain_id, deposit_id));
    (QUERY_TAG.to_string(), query_data).abi_encode_params()
}

pub fn query_id(chain_id: u64, deposit_id: u64) -> [u8; 32] {
    keccak::hash(&encode_query(chain_id, deposit_id)).to_bytes()
}
