//! On-chain oracle report accounts
//!
//! Layout owned by the oracle program: an 8-byte discriminator followed by
//! the borsh encoding of [`OracleReport`]. Submissions are kept in the order
//! they were made.

use anchor_lang::prelude::*;

use crate::error::CharonError;

use super::{OracleFeed, OracleValue};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct OracleSubmission {
    pub value: Vec<u8>,
    pub timestamp: i64,
    pub disputed: bool,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct OracleReport {
    pub query_id: [u8; 32],
    /// Deposit contract on the source chain the reporters attest for
    pub reporting_contract: [u8; 32],
    pub submissions: Vec<OracleSubmission>,
}

impl OracleReport {
    const DISCRIMINATOR_LEN: usize = 8;

    /// Read the report stored in `info`.
    ///
    /// An empty account means nothing was reported yet. Anything else must
    /// belong to `oracle_program`.
    pub fn load(info: &AccountInfo, oracle_program: &Pubkey) -> Result<Self> {
        if info.data_is_empty() {
            return Ok(Self::default());
        }
        require_keys_eq!(*info.owner, *oracle_program, CharonError::InvalidOracleAccount);

        let data = info.try_borrow_data()?;
        require!(
            data.len() >= Self::DISCRIMINATOR_LEN,
            CharonError::InvalidOracleAccount
        );
        Self::deserialize(&mut &data[Self::DISCRIMINATOR_LEN..])
            .map_err(|_| error!(CharonError::InvalidOracleAccount))
    }

    pub fn new(query_id: [u8; 32], reporting_contract: [u8; 32]) -> Self {
        Self {
            query_id,
            reporting_contract,
            submissions: Vec::new(),
        }
    }

    pub fn submit(&mut self, value: Vec<u8>, timestamp: i64) {
        self.submissions.push(OracleSubmission {
            value,
            timestamp,
            disputed: false,
        });
    }

    pub fn dispute(&mut self, index: usize) {
        if let Some(submission) = self.submissions.get_mut(index) {
            submission.disputed = true;
        }
    }

    fn undisputed(&self, query_id: &[u8; 32]) -> impl Iterator<Item = &OracleSubmission> {
        let matches = self.query_id == *query_id;
        self.submissions
            .iter()
            .rev()
            .filter(move |s| matches && !s.disputed)
    }
}

impl From<&OracleSubmission> for OracleValue {
    fn from(submission: &OracleSubmission) -> Self {
        OracleValue {
            value: submission.value.clone(),
            timestamp: submission.timestamp,
        }
    }
}

impl OracleFeed for OracleReport {
    fn reporting_contract(&self) -> [u8; 32] {
        self.reporting_contract
    }

    fn new_value_count(&self, query_id: &[u8; 32]) -> u64 {
        if self.query_id != *query_id {
            return 0;
        }
        self.submissions.len() as u64
    }

    fn current_value(&self, query_id: &[u8; 32]) -> Option<OracleValue> {
        self.undisputed(query_id).next().map(OracleValue::from)
    }

    fn data_before(&self, query_id: &[u8; 32], timestamp: i64) -> Option<OracleValue> {
        self.undisputed(query_id)
            .find(|s| s.timestamp <= timestamp)
            .map(OracleValue::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_query_is_invisible() {
        let mut report = OracleReport::new([1u8; 32], [9u8; 32]);
        report.submit(vec![7u8; 32], 100);

        assert_eq!(report.new_value_count(&[2u8; 32]), 0);
        assert!(report.current_value(&[2u8; 32]).is_none());
        assert_eq!(report.new_value_count(&[1u8; 32]), 1);
    }

    #[test]
    fn test_disputed_values_skipped() {
        let q = [1u8; 32];
        let mut report = OracleReport::new(q, [9u8; 32]);
        report.submit(vec![1u8; 32], 100);
        report.submit(vec![2u8; 32], 200);
        report.dispute(1);

        assert_eq!(report.current_value(&q).unwrap().value, vec![1u8; 32]);
        assert_eq!(report.new_value_count(&q), 2);
    }

    #[test]
    fn test_data_before_cutoff() {
        let q = [1u8; 32];
        let mut report = OracleReport::new(q, [9u8; 32]);
        report.submit(vec![1u8; 32], 100);
        report.submit(vec![2u8; 32], 200);

        assert!(report.data_before(&q, 99).is_none());
        assert_eq!(report.data_before(&q, 100).unwrap().timestamp, 100);
        assert_eq!(report.data_before(&q, 199).unwrap().value, vec![1u8; 32]);
        assert_eq!(report.data_before(&q, 500).unwrap().value, vec![2u8; 32]);
    }
}
