//! Attested-data oracle interface
//!
//! Deposits on a partner chain reach this pool as oracle reports keyed by a
//! query id. The pool only reads reports; submitting and disputing them is
//! the oracle program's business.

pub mod query;
pub mod report;

pub use query::{encode_query_data, query_id, QUERY_TAG};
pub use report::{OracleReport, OracleSubmission};

/// Seconds a report must stay undisputed before it can be finalized.
pub const DISPUTE_WINDOW_SECONDS: i64 = 12 * 60 * 60;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OracleValue {
    pub value: Vec<u8>,
    pub timestamp: i64,
}

/// Read access to an attested key-value feed.
///
/// Disputed submissions are invisible through every method except the
/// counter.
pub trait OracleFeed {
    /// Partner-chain contract whose deposits this feed reports.
    fn reporting_contract(&self) -> [u8; 32];

    /// Monotonic count of submissions ever made for `query_id`.
    fn new_value_count(&self, query_id: &[u8; 32]) -> u64;

    /// Most recent undisputed value.
    fn current_value(&self, query_id: &[u8; 32]) -> Option<OracleValue>;

    /// Most recent undisputed value submitted at or before `timestamp`.
    fn data_before(&self, query_id: &[u8; 32], timestamp: i64) -> Option<OracleValue>;
}
