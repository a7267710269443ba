//! Nullifier ledger
//!
//! One account per spent nullifier hash. The account existing with
//! `is_spent` set is the whole record; nothing ever clears it.
//!
//! 1. Withdrawal derives the PDA from `nullifier_hash`
//! 2. Spent flag set → reject with `AlreadySpent`
//! 3. Otherwise mark spent, then pay out

use anchor_lang::prelude::*;

use crate::error::CharonError;

/// PDA Seeds: `[b"nullifier", pool.key().as_ref(), nullifier_hash.as_ref()]`
#[account]
#[derive(Default)]
pub struct SpentNullifier {
    pub pool: Pubkey,

    pub nullifier_hash: [u8; 32],

    pub is_spent: bool,

    pub spent_at: i64,

    /// Slot number when spent (for indexing)
    pub spent_slot: u64,

    pub bump: u8,
}

impl SpentNullifier {
    pub const SEED_PREFIX: &'static [u8] = b"nullifier";

    pub const LEN: usize = 8  // discriminator
        + 32                  // pool
        + 32                  // nullifier_hash
        + 1                   // is_spent
        + 8                   // spent_at
        + 8                   // spent_slot
        + 1;                  // bump

    /// Record a spend.
    ///
    /// # Errors
    /// * `AlreadySpent` if this hash was spent before
    pub fn mark_spent(
        &mut self,
        pool: Pubkey,
        nullifier_hash: [u8; 32],
        spent_at: i64,
        spent_slot: u64,
        bump: u8,
    ) -> Result<()> {
        require!(!self.is_spent, CharonError::AlreadySpent);

        self.pool = pool;
        self.nullifier_hash = nullifier_hash;
        self.is_spent = true;
        self.spent_at = spent_at;
        self.spent_slot = spent_slot;
        self.bump = bump;
        Ok(())
    }

    pub fn is_spent(&self) -> bool {
        self.is_spent
    }

    pub fn find_pda(
        program_id: &Pubkey,
        pool: &Pubkey,
        nullifier_hash: &[u8; 32],
    ) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[Self::SEED_PREFIX, pool.as_ref(), nullifier_hash.as_ref()],
            program_id,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_spend_rejected() {
        let mut record = SpentNullifier {
            pool: Pubkey::default(),
            nullifier_hash: [0u8; 32],
            is_spent: false,
            spent_at: 0,
            spent_slot: 0,
            bump: 0,
        };
        let pool = Pubkey::new_unique();

        record.mark_spent(pool, [7u8; 32], 10, 1, 254).unwrap();
        assert!(record.is_spent());

        let err = record.mark_spent(pool, [7u8; 32], 11, 2, 254).unwrap_err();
        assert_eq!(err, error!(CharonError::AlreadySpent));
        assert_eq!(record.spent_at, 10);
    }

    #[test]
    fn test_pda_depends_on_hash() {
        let program = Pubkey::new_unique();
        let pool = Pubkey::new_unique();
        let (a, _) = SpentNullifier::find_pda(&program, &pool, &[1u8; 32]);
        let (b, _) = SpentNullifier::find_pda(&program, &pool, &[2u8; 32]);
        assert_ne!(a, b);
    }
}
