//! Membership-gated vesting starts: one join per (user, pool, round),
//! bounded by the round's eligibility cap and proven against its root.

use anchor_lang::prelude::*;
use solana_sha256_hasher::hashv;

use crate::errors::LedgerError;
use crate::state::{JoinRecord, Pool, Round};

pub const LEAF_DOMAIN: &[u8] = b"vesting-ledger:leaf_v1";

/// One Merkle proof element.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProofNode {
    pub sibling: [u8; 32],
    /// Sibling sits on the left of the running hash.
    pub is_left: bool,
}

/// Black-box membership check consumed by the join gate.
pub trait ProofVerifier {
    fn verify_membership(&self, proof: &[ProofNode], root: &[u8; 32], leaf: &[u8; 32]) -> bool;
}

/// SHA-256 binary Merkle tree, sibling order given by each `ProofNode`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MerkleVerifier;

impl ProofVerifier for MerkleVerifier {
    fn verify_membership(&self, proof: &[ProofNode], root: &[u8; 32], leaf: &[u8; 32]) -> bool {
        let mut node = *leaf;
        for p in proof {
            node = if p.is_left {
                hash_pair(&p.sibling, &node)
            } else {
                hash_pair(&node, &p.sibling)
            };
        }
        node == *root
    }
}

pub fn hash_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    hashv(&[left.as_ref(), right.as_ref()]).to_bytes()
}

/// Canonical leaf committed to by a round's membership root.
pub fn membership_leaf(user: &Pubkey, pool_id: u64, round_id: u64, base_amount: u64) -> [u8; 32] {
    hashv(&[
        LEAF_DOMAIN,
        user.as_ref(),
        pool_id.to_le_bytes().as_ref(),
        round_id.to_le_bytes().as_ref(),
        base_amount.to_le_bytes().as_ref(),
    ])
    .to_bytes()
}

/// Validates a join and records it (join flag + round counter).
/// The caller appends the vesting entry afterwards.
pub fn admit<V: ProofVerifier>(
    pool: &Pool,
    round: &mut Round,
    joins: &mut JoinRecord,
    user: &Pubkey,
    base_amount: u64,
    proof: &[ProofNode],
    verifier: &V,
) -> Result<()> {
    require!(!pool.is_staking, LedgerError::WrongPoolKind);
    require!(round.pool_id == pool.pool_id, LedgerError::InvalidRound);
    require!(round.is_valid(), LedgerError::InvalidRound);
    require!(!round.paused, LedgerError::RoundPaused);
    require!(base_amount > 0, LedgerError::InvalidAmount);

    require_keys_eq!(joins.user, *user, LedgerError::LedgerMismatch);
    require!(joins.pool_id == pool.pool_id, LedgerError::LedgerMismatch);

    require!(!joins.has_joined(round.round_id), LedgerError::AlreadyJoined);
    require!(
        round.joined_users < round.total_eligible_users,
        LedgerError::EligibilityCapReached
    );

    let leaf = membership_leaf(user, pool.pool_id, round.round_id, base_amount);
    require!(
        verifier.verify_membership(proof, &round.root, &leaf),
        LedgerError::InvalidProof
    );

    joins.mark_joined(round.round_id);
    round.joined_users = round
        .joined_users
        .checked_add(1)
        .ok_or(LedgerError::MathOverflow)?;

    Ok(())
}
