// Centralized Ledger Constants

// Vesting math
// ============

/// Fixed-point denominator for round multipliers. 10_000 = 1.0x.
pub const MULTIPLIER_DENOMINATOR: u64 = 10_000;

// Claim scheduling
// ================

/// Batch limit installed by `initialize_config`.
/// Also the budget used when a caller passes 0 to `claim_pool`.
pub const DEFAULT_CLAIM_BATCH_LIMIT: u32 = 50;

/// Lower bound accepted by `set_claim_batch_limit`.
pub const MIN_CLAIM_BATCH_LIMIT: u32 = 1;

/// Upper bound accepted by `set_claim_batch_limit`.
/// Keeps a single claim well inside the compute budget.
pub const MAX_CLAIM_BATCH_LIMIT: u32 = 500;

// Registry
// ========

/// Max bytes for a pool display name.
pub const MAX_POOL_NAME_LEN: usize = 32;

/// First pool id handed out by a fresh config.
pub const INITIAL_POOL_ID: u64 = 0;

/// Round id of a pool that has no round yet. Real rounds start at 1.
pub const NO_ROUND: u64 = 0;

// Views
// =====

/// Max dashboard rows emitted per `emit_dashboard` call.
pub const MAX_DASHBOARD_PAGE: u32 = 20;

/// Initial version for account structures.
pub const INITIAL_VERSION: u16 = 1;
