//! Unified error types for the Charon pool
//!
//! Error codes are stable across versions for client compatibility.
//! Every precondition has its own variant so callers can tell them apart.

use anchor_lang::prelude::*;

#[error_code]
pub enum CharonError {
    // ========== Proof Gateway ==========

    /// Root is not retained in the accumulator history
    #[msg("Merkle root is not a known root of this pool")]
    UnknownRoot, // 6000

    /// Nullifier hash has already been consumed
    #[msg("Nullifier already spent")]
    AlreadySpent, // 6001

    /// Proof rejected (or the verifier failed)
    #[msg("Invalid proof")]
    InvalidProof, // 6002

    #[msg("Invalid proof format: expected 256 bytes (A: 64, B: 128, C: 64)")]
    InvalidProofFormat, // 6003

    #[msg("Invalid public inputs for proof verification")]
    InvalidPublicInputs, // 6004

    #[msg("Verification key not configured for this pool")]
    VerificationKeyNotSet, // 6005

    #[msg("Relayer fee exceeds the pool denomination")]
    RelayerFeeExceedsAmount, // 6006

    // ========== Merkle Accumulator ==========

    /// Accumulator holds 2^height leaves already
    #[msg("Merkle tree is full")]
    CapacityExceeded, // 6007

    #[msg("Tree height must be at least 2 and its root ring must fit in one account")]
    InvalidTreeDepth, // 6008

    #[msg("Root history is corrupt")]
    CorruptRootHistory, // 6009

    // ========== Commitment Registry ==========

    #[msg("Invalid commitment: must be a non-zero field element")]
    InvalidCommitment, // 6010

    /// Commitment was registered before
    #[msg("Commitment already deposited")]
    DuplicateCommitment, // 6011

    #[msg("No deposit registered for this commitment")]
    CommitmentNotFound, // 6012

    #[msg("No deposit registered under this id")]
    DepositNotFound, // 6013

    // ========== Oracle Bridge ==========

    /// Newest undisputed value is younger than the dispute window
    #[msg("Oracle dispute window has not elapsed")]
    WindowNotElapsed, // 6014

    /// Oracle never reported an undisputed value for the query
    #[msg("No oracle submission for this deposit")]
    NoSubmission, // 6015

    #[msg("Oracle value is not a 32-byte commitment")]
    InvalidOracleValue, // 6016

    #[msg("Oracle report account does not belong to the configured oracle")]
    InvalidOracleAccount, // 6017

    #[msg("Source chain is not a registered partner chain")]
    UnknownPartnerChain, // 6018

    #[msg("Batch arrays or accounts do not line up")]
    MismatchedBatch, // 6019

    #[msg("Account does not match its expected address")]
    AccountMismatch, // 6020

    // ========== Weighted Pool Engine ==========

    #[msg("Pool is not finalized")]
    NotFinalized, // 6021

    #[msg("Pool is already finalized")]
    AlreadyFinalized, // 6022

    /// Output below minimum, input above maximum, or price beyond limit
    #[msg("Excessive slippage")]
    ExcessiveSlippage, // 6023

    /// Caller balance or delegated allowance below the amount to collect
    #[msg("Insufficient token balance or approval")]
    InsufficientApproval, // 6024

    #[msg("Trade exceeds available pool liquidity")]
    InsufficientLiquidity, // 6025

    #[msg("Invalid amount: must be greater than zero")]
    InvalidAmount, // 6026

    #[msg("Invalid pool weight")]
    InvalidWeight, // 6027

    #[msg("Swap fee above maximum")]
    InvalidFee, // 6028

    #[msg("Power base out of range")]
    PowBaseOutOfRange, // 6029

    #[msg("Pool invariant violated")]
    InvariantViolation, // 6030

    // ========== Configuration / Authorization ==========

    #[msg("Unauthorized: caller is not the pool controller")]
    Unauthorized, // 6031

    #[msg("Token mint does not match pool configuration")]
    InvalidMint, // 6032

    #[msg("Token account owner does not match")]
    OwnerMismatch, // 6033

    #[msg("Too many partner chains")]
    TooManyPartnerChains, // 6034

    #[msg("Partner chain listed twice or equal to the local chain")]
    DuplicatePartnerChain, // 6035

    #[msg("Pool token name or symbol too long")]
    InvalidPoolTokenMetadata, // 6036

    // ========== Arithmetic ==========

    #[msg("Arithmetic overflow")]
    ArithmeticOverflow, // 6037

    // ========== Oracle Bridge (cont.) ==========

    /// Report attests a contract other than the registered partner
    #[msg("Oracle report is not from the partner chain's deposit contract")]
    UntrustedOracleReport, // 6038
}
