use anchor_lang::prelude::*;

// -----------------
// State changes
// -----------------

#[event]
pub struct PoolCreated {
    pub pool_id: u64,
    pub name: String,
    pub is_staking: bool,
    pub duration: u64,
    pub multiplier: u64,
}

#[event]
pub struct RoundRegistered {
    pub pool_id: u64,
    pub round_id: u64,
    pub root: [u8; 32],
    pub duration: u64,
    pub multiplier: u64,
    pub eligible_users: u64,
}

#[event]
pub struct StakingRoundUpdated {
    pub pool_id: u64,
    pub round_id: u64,
    pub duration: u64,
    pub multiplier: u64,
}

#[event]
pub struct VestingStarted {
    pub user: Pubkey,
    pub pool_id: u64,
    pub round_id: u64,
    pub entry_index: u32,
    pub base_amount: u64,
    pub total_amount: u64,
    pub start_time: i64,
    pub staked: bool,
}

#[event]
pub struct ClaimSettled {
    pub user: Pubkey,
    pub amount: u64,
    pub entries_scanned: u32,
}

#[event]
pub struct FundingDeposited {
    pub pool_id: u64,
    pub amount: u64,
    pub funding_balance: u64,
}

#[event]
pub struct RoundPauseToggled {
    pub pool_id: u64,
    pub round_id: u64,
    pub paused: bool,
}

#[event]
pub struct PauseToggled {
    pub paused: bool,
}

#[event]
pub struct BatchLimitChanged {
    pub old_limit: u32,
    pub new_limit: u32,
}

#[event]
pub struct AssetRecovered {
    pub mint: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
}

// -----------------
// Views
// -----------------

#[event]
pub struct GlobalStats {
    pub total_vested_base: u64,
    pub total_committed: u64,
    pub total_claimed: u64,
    pub outstanding: u64,
    pub vault_balance: u64,
    pub solvency_gap: u64,
    pub pool_count: u64,
    pub claim_batch_limit: u32,
    pub paused: bool,
}

#[event]
pub struct PoolStats {
    pub pool_id: u64,
    pub name: String,
    pub is_staking: bool,
    pub current_round_id: u64,
    pub funding_balance: u64,
    pub current_duration: u64,
    pub current_multiplier: u64,
    pub committed_base: u64,
    pub committed_total: u64,
    pub claimed_total: u64,
    pub outstanding: u64,
}

#[event]
pub struct ClaimableQuote {
    pub user: Pubkey,
    pub pools: u32,
    pub claimable: u64,
}

#[event]
pub struct EntryCount {
    pub user: Pubkey,
    pub pool_id: u64,
    pub entries: u64,
    pub active: u64,
}

#[event]
pub struct DashboardRow {
    pub user: Pubkey,
    pub position: u64,
    pub pool_id: u64,
    pub pool_name: String,
    pub round_id: u64,
    pub principal: u64,
    pub total_amount: u64,
    pub released: u64,
    pub claimable: u64,
    pub remaining: u64,
    pub start_time: i64,
    pub end_time: i64,
    pub multiplier: u64,
    pub completed: bool,
}

#[event]
pub struct JoinedRounds {
    pub user: Pubkey,
    pub pool_id: u64,
    pub bitmap: Vec<u64>,
}
