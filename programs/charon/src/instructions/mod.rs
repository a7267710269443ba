//! Instruction handlers for the Charon pool

pub mod admin;
pub mod deposit_to_other_chain;
pub mod finalize_oracle_deposit;
pub mod finalize_oracle_deposits;
pub mod finalize_pool;
pub mod initialize_pool;
pub mod liquidity;
pub mod record_oracle_submission;
pub mod secret_withdraw;
pub mod set_verification_key;
pub mod swap;
pub mod views;

pub use admin::*;
pub use deposit_to_other_chain::*;
pub use finalize_oracle_deposit::*;
pub use finalize_oracle_deposits::*;
pub use finalize_pool::*;
pub use initialize_pool::*;
pub use liquidity::*;
pub use record_oracle_submission::*;
pub use secret_withdraw::*;
pub use set_verification_key::*;
pub use swap::*;
pub use views::*;
