//! Incremental Merkle tree with root history
//!
//! Append-only tree of fixed height using the filled-subtrees pattern for
//! O(height) insertions. Every root the tree has had is kept in a ring of
//! `2^height` slots; index 0 holds the empty-tree root and the k-th
//! insertion writes slot `k mod 2^height`. A root is only forgotten once its
//! slot is overwritten.
//!
//! The ring is stored densely: the account starts with a single slot and is
//! reallocated by one slot per insertion until it reaches capacity.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::system_instruction::MAX_PERMITTED_DATA_LENGTH;

use crate::crypto::{is_zero_hash, HashFunction, MerkleHasher};
use crate::error::CharonError;

pub const MIN_TREE_DEPTH: u8 = 2;
pub const MAX_TREE_DEPTH: u8 = 32;

/// PDA Seeds: `[b"merkle_tree", pool.key().as_ref()]`
#[account]
pub struct MerkleTree {
    pub pool: Pubkey,

    /// Two-to-one hash used for every internal node
    pub hash_function: HashFunction,

    /// Tree height (immutable after init)
    pub depth: u8,

    /// Next leaf index to be filled (also = total leaves inserted)
    pub next_index: u64,

    pub current_root: [u8; 32],

    /// Slot of `current_root` in `root_history`
    pub root_index: u64,

    /// Root ring, `len <= 2^depth`
    pub root_history: Vec<[u8; 32]>,

    /// Rightmost filled node at each level, length = depth
    pub filled_subtrees: Vec<[u8; 32]>,

    /// zeros[0] = empty leaf, zeros[i] = H(zeros[i-1], zeros[i-1]); length = depth + 1
    pub zeros: Vec<[u8; 32]>,

    pub bump: u8,
}

impl MerkleTree {
    /// Account space for a tree of `depth` retaining `history_len` roots.
    pub fn space(depth: u8, history_len: usize) -> usize {
        let depth_usize = depth as usize;

        8                                       // discriminator
            + 32                                // pool
            + 1                                 // hash_function
            + 1                                 // depth
            + 8                                 // next_index
            + 32                                // current_root
            + 8                                 // root_index
            + 4 + (32 * history_len)            // root_history (vec)
            + 4 + (32 * depth_usize)            // filled_subtrees (vec)
            + 4 + (32 * (depth_usize + 1))      // zeros (vec)
            + 1                                 // bump
    }

    /// True if the account holding a full `2^depth` root ring stays within
    /// the runtime's account size limit.
    pub fn ring_fits(depth: u8) -> bool {
        if depth > MAX_TREE_DEPTH {
            return false;
        }
        let full_ring = 1usize << depth;
        Self::space(depth, full_ring) as u64 <= MAX_PERMITTED_DATA_LENGTH
    }

    /// Space once `inserts` more leaves have been appended.
    pub fn space_after_inserts(&self, inserts: usize) -> usize {
        let capacity = usize::try_from(self.capacity()).unwrap_or(usize::MAX);
        let history_len = self
            .root_history
            .len()
            .saturating_add(inserts)
            .min(capacity);
        Self::space(self.depth, history_len)
    }

    pub fn initialize(
        &mut self,
        pool: Pubkey,
        depth: u8,
        hash_function: HashFunction,
        bump: u8,
    ) -> Result<()> {
        require!(
            (MIN_TREE_DEPTH..=MAX_TREE_DEPTH).contains(&depth),
            CharonError::InvalidTreeDepth
        );
        require!(Self::ring_fits(depth), CharonError::InvalidTreeDepth);

        self.pool = pool;
        self.hash_function = hash_function;
        self.depth = depth;
        self.next_index = 0;
        self.zeros = compute_zero_values(&hash_function, depth)?;
        self.filled_subtrees = self.zeros[..depth as usize].to_vec();
        self.current_root = self.zeros[depth as usize];
        self.root_index = 0;
        self.root_history = vec![self.current_root];
        self.bump = bump;

        Ok(())
    }

    /// Append a leaf using the tree's own hash function.
    pub fn insert_leaf(&mut self, leaf: [u8; 32]) -> Result<u64> {
        let hasher = self.hash_function;
        self.insert_leaf_with(&hasher, leaf)
    }

    /// Append a leaf and return its index.
    ///
    /// # Errors
    /// * `CapacityExceeded` if `2^depth` leaves are already stored
    pub fn insert_leaf_with<H: MerkleHasher>(&mut self, hasher: &H, leaf: [u8; 32]) -> Result<u64> {
        require!(!self.is_full(), CharonError::CapacityExceeded);
        hasher.check_leaf(&leaf)?;

        let leaf_index = self.next_index;
        let mut current_hash = leaf;
        let mut current_index = leaf_index;

        for level in 0..self.depth as usize {
            if current_index & 1 == 1 {
                current_hash = hasher.hash_pair(&self.filled_subtrees[level], &current_hash)?;
            } else {
                self.filled_subtrees[level] = current_hash;
                current_hash = hasher.hash_pair(&current_hash, &self.zeros[level])?;
            }
            current_index >>= 1;
        }

        self.push_root(current_hash)?;

        self.next_index = self
            .next_index
            .checked_add(1)
            .ok_or(error!(CharonError::ArithmeticOverflow))?;

        Ok(leaf_index)
    }

    fn push_root(&mut self, root: [u8; 32]) -> Result<()> {
        let slot = self
            .root_index
            .checked_add(1)
            .ok_or(error!(CharonError::ArithmeticOverflow))?
            % self.capacity();
        let slot_usize =
            usize::try_from(slot).map_err(|_| error!(CharonError::CorruptRootHistory))?;

        match slot_usize.cmp(&self.root_history.len()) {
            std::cmp::Ordering::Less => self.root_history[slot_usize] = root,
            std::cmp::Ordering::Equal => self.root_history.push(root),
            std::cmp::Ordering::Greater => return err!(CharonError::CorruptRootHistory),
        }

        self.root_index = slot;
        self.current_root = root;
        Ok(())
    }

    /// Reject a leaf the tree's hash function cannot absorb.
    pub fn check_leaf(&self, leaf: &[u8; 32]) -> Result<()> {
        self.hash_function.check_leaf(leaf)
    }

    /// True if `root` is still retained in the ring. The zero root is never known.
    pub fn is_known_root(&self, root: &[u8; 32]) -> bool {
        if is_zero_hash(root) {
            return false;
        }
        *root == self.current_root || self.root_history.iter().any(|r| r == root)
    }

    /// Retained root at a ring slot.
    pub fn root_at(&self, index: u64) -> Option<[u8; 32]> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.root_history.get(i).copied())
    }

    pub fn current_root(&self) -> [u8; 32] {
        self.current_root
    }

    pub fn capacity(&self) -> u64 {
        1u64 << self.depth
    }

    pub fn is_full(&self) -> bool {
        self.next_index >= self.capacity()
    }
}

/// Empty-subtree hashes for each level. Level 0 is the empty leaf.
pub fn compute_zero_values<H: MerkleHasher>(hasher: &H, depth: u8) -> Result<Vec<[u8; 32]>> {
    let mut zeros = Vec::with_capacity(depth as usize + 1);
    zeros.push([0u8; 32]);
    for level in 0..depth as usize {
        let prev = zeros[level];
        zeros.push(hasher.hash_pair(&prev, &prev)?);
    }
    Ok(zeros)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(depth: u8, hash_function: HashFunction) -> MerkleTree {
        let mut tree = MerkleTree {
            pool: Pubkey::default(),
            hash_function,
            depth: 0,
            next_index: 0,
            current_root: [0u8; 32],
            root_index: 0,
            root_history: Vec::new(),
            filled_subtrees: Vec::new(),
            zeros: Vec::new(),
            bump: 0,
        };
        tree.initialize(Pubkey::new_unique(), depth, hash_function, 255)
            .unwrap();
        tree
    }

    #[test]
    fn test_depth_bounds() {
        let mut t = tree(4, HashFunction::Keccak);
        assert!(t.initialize(Pubkey::default(), 1, HashFunction::Keccak, 0).is_err());
        assert!(t.initialize(Pubkey::default(), 33, HashFunction::Keccak, 0).is_err());
    }

    #[test]
    fn test_depth_capped_by_account_size() {
        // 32 * 2^18 bytes of ring fits in 10 MiB, 32 * 2^19 does not
        assert!(MerkleTree::ring_fits(18));
        assert!(!MerkleTree::ring_fits(19));

        let mut t = tree(2, HashFunction::Keccak);
        assert!(t.initialize(Pubkey::default(), 18, HashFunction::Keccak, 0).is_ok());
        assert_eq!(
            t.initialize(Pubkey::default(), 19, HashFunction::Keccak, 0).unwrap_err(),
            error!(CharonError::InvalidTreeDepth)
        );
        assert_eq!(
            t.initialize(Pubkey::default(), MAX_TREE_DEPTH, HashFunction::Keccak, 0).unwrap_err(),
            error!(CharonError::InvalidTreeDepth)
        );
    }

    #[test]
    fn test_genesis_root_is_index_zero() {
        let t = tree(3, HashFunction::Keccak);
        assert_eq!(t.root_at(0), Some(t.zeros[3]));
        assert_eq!(t.current_root(), t.zeros[3]);
        assert!(t.is_known_root(&t.zeros[3]));
        assert!(!t.is_known_root(&[0u8; 32]));
    }

    #[test]
    fn test_insert_returns_sequential_indices() {
        let mut t = tree(3, HashFunction::Keccak);
        for expected in 0..5u64 {
            assert_eq!(t.insert_leaf([expected as u8 + 1; 32]).unwrap(), expected);
            assert_eq!(t.root_at(expected + 1), Some(t.current_root()));
        }
    }

    #[test]
    fn test_space_tracks_history_growth() {
        let mut t = tree(2, HashFunction::Keccak);
        assert_eq!(t.space_after_inserts(1), MerkleTree::space(2, 2));
        assert_eq!(t.space_after_inserts(10), MerkleTree::space(2, 4));
        t.insert_leaf([1u8; 32]).unwrap();
        assert_eq!(t.root_history.len(), 2);
    }

    #[test]
    fn test_zero_values_deterministic() {
        let a = compute_zero_values(&HashFunction::Poseidon, 5).unwrap();
        let b = compute_zero_values(&HashFunction::Poseidon, 5).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
        assert_eq!(a[0], [0u8; 32]);
    }
}
