//! Account state and ledger transitions

pub mod commitment;
pub mod merkle_tree;
pub mod oracle_deposit;
pub mod pool_config;
pub mod spent_nullifier;
pub mod verification_key;

pub use commitment::{register_deposit, CommitmentRecord, DepositRecord};
pub use merkle_tree::MerkleTree;
pub use oracle_deposit::{
    complete_finalize, FinalizeOutcome, InboundRecords, OracleDeposit, OracleDepositStatus,
};
pub use pool_config::{
    FinalizePoolParams, InitializePoolParams, PartnerChain, PartnerChainParams, PoolConfig,
    PoolState, SwapQuote,
};
pub use spent_nullifier::SpentNullifier;
pub use verification_key::VerificationKeyAccount;
