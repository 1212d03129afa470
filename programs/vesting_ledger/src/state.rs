use anchor_lang::prelude::*;

use crate::constants::MAX_POOL_NAME_LEN;

#[account]
#[derive(InitSpace)]
pub struct Config {
    pub admin: Pubkey,
    pub bump: u8,

    // Settlement asset (single SPL mint) and the PDA vault holding it.
    pub mint: Pubkey,
    pub vault: Pubkey,
    pub vault_bump: u8,

    pub paused: bool,

    /// Held while a mutating operation runs. See `guard::with_guard`.
    pub locked: bool,

    /// Max active entries a single claim may scan (1..=500).
    pub claim_batch_limit: u32,

    pub next_pool_id: u64,

    // Global aggregates (derived; never a source of truth)
    pub total_vested_base: u64,
    pub total_committed: u64,
    pub total_claimed: u64,

    pub version: u16,
}

#[account]
#[derive(InitSpace)]
pub struct Pool {
    pub pool_id: u64,
    pub bump: u8,

    #[max_len(MAX_POOL_NAME_LEN)]
    pub name: String,

    /// Staking pools vest principal+reward via `stake`;
    /// the rest are membership-gated via `join_and_start_vesting`.
    pub is_staking: bool,

    pub current_round_id: u64,

    /// Settlement asset deposited by the admin for this pool.
    pub funding_balance: u64,

    // Snapshot of the latest round parameters (display only)
    pub current_duration: u64,
    pub current_multiplier: u64,

    // Pool aggregates
    pub committed_base: u64,
    pub committed_total: u64,
    pub claimed_total: u64,

    pub created_at: i64,
    pub version: u16,
}

#[account]
#[derive(InitSpace, Debug)]
pub struct Round {
    pub pool_id: u64,
    pub round_id: u64,
    pub bump: u8,

    /// Membership root. All zero for staking rounds.
    pub root: [u8; 32],

    /// Vesting duration in seconds. A round is valid iff this is non-zero.
    pub duration: u64,
    /// Fixed-point multiplier over `MULTIPLIER_DENOMINATOR`.
    pub multiplier: u64,

    pub paused: bool,

    // Eligibility cap (membership rounds only; zero for staking rounds)
    pub total_eligible_users: u64,
    pub joined_users: u64,

    pub created_at: i64,
}

impl Round {
    pub fn is_valid(&self) -> bool {
        self.duration != 0
    }
}

/// Marker PDA per (pool, root). Its existence means the root is spent.
#[account]
#[derive(InitSpace)]
pub struct RootMarker {
    pub pool_id: u64,
    pub round_id: u64,
    pub bump: u8,
}

/// One vesting obligation. Round id and multiplier are snapshotted at creation.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq, InitSpace)]
pub struct VestingEntry {
    pub base_amount: u64,
    pub start_time: i64,
    pub duration: u64,
    pub released_amount: u64,
    pub round_id: u64,
    pub multiplier: u64,
    pub completed: bool,
}

/// Per (user, pool) vesting history header.
///
/// The account body after this header is a run of fixed-size slots, one per
/// entry ever created (see `ledger::LedgerMut`). Slot `i` holds entry `i`
/// followed by position `i` of the active-index set. The active set never
/// outgrows the entry history, so every active position has a slot.
///
/// Only this header is decoded by `Account<UserLedger>`; slots are read and
/// written one at a time, so a claim touches only the slots it visits.
#[account]
#[derive(InitSpace)]
pub struct UserLedger {
    pub user: Pubkey,
    pub pool_id: u64,
    pub bump: u8,

    /// Next position in the active set to visit. May be stale (>= len) after compaction.
    pub cursor: u32,

    pub entry_count: u32,
    pub active_count: u32,

    pub version: u16,
}

/// Serialized `VestingEntry` plus one active-set position (`u32`).
pub const LEDGER_SLOT_LEN: usize = VestingEntry::INIT_SPACE + 4;

impl UserLedger {
    /// Byte offset of slot 0 inside the account data.
    pub const SLOTS_OFFSET: usize = 8 + Self::INIT_SPACE;

    /// Account space (discriminator included) for `entries` slots.
    pub const fn space(entries: usize) -> usize {
        Self::SLOTS_OFFSET + entries * LEDGER_SLOT_LEN
    }

    /// Space needed to append one more entry.
    pub fn space_after_append(&self) -> usize {
        Self::space(self.entry_count as usize + 1)
    }
}

/// Rounds of a membership pool the user has joined, one bit per round id.
/// Kept apart from `UserLedger` so claims never load it.
#[account]
pub struct JoinRecord {
    pub user: Pubkey,
    pub pool_id: u64,
    pub bump: u8,

    /// Bit `r` set iff the user joined round `r` of this pool.
    pub joined_rounds: Vec<u64>,

    pub version: u16,
}

impl JoinRecord {
    const FIXED: usize = 32 + 8 + 1 + 4 + 2;

    /// Account space (discriminator included) for `bitmap_words` words.
    pub const fn space(bitmap_words: usize) -> usize {
        8 + Self::FIXED + bitmap_words * 8
    }

    pub fn init(&mut self, user: Pubkey, pool_id: u64, bump: u8, version: u16) {
        self.user = user;
        self.pool_id = pool_id;
        self.bump = bump;
        self.joined_rounds = Vec::new();
        self.version = version;
    }

    /// Space needed once `round_id` is marked.
    pub fn space_for(&self, round_id: u64) -> usize {
        Self::space(self.joined_rounds.len().max(bitmap_word(round_id) + 1))
    }

    pub fn has_joined(&self, round_id: u64) -> bool {
        self.joined_rounds
            .get(bitmap_word(round_id))
            .map(|w| w & (1u64 << (round_id % 64)) != 0)
            .unwrap_or(false)
    }

    pub fn mark_joined(&mut self, round_id: u64) {
        let word = bitmap_word(round_id);
        if self.joined_rounds.len() <= word {
            self.joined_rounds.resize(word + 1, 0);
        }
        self.joined_rounds[word] |= 1u64 << (round_id % 64);
    }
}

pub fn bitmap_word(round_id: u64) -> usize {
    (round_id / 64) as usize
}
