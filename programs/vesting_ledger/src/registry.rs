//! Pool and round records. Round ids are per pool, start at 1 and only grow.

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::LedgerError;
use crate::state::{Config, Pool, Round};

pub fn init_pool(
    pool: &mut Pool,
    pool_id: u64,
    bump: u8,
    name: String,
    is_staking: bool,
    initial_duration: u64,
    initial_multiplier: u64,
    now: i64,
) -> Result<()> {
    require!(name.len() <= MAX_POOL_NAME_LEN, LedgerError::NameTooLong);
    require!(initial_duration > 0, LedgerError::InvalidDuration);
    require!(initial_multiplier > 0, LedgerError::InvalidMultiplier);

    pool.pool_id = pool_id;
    pool.bump = bump;
    pool.name = name;
    pool.is_staking = is_staking;
    pool.current_round_id = NO_ROUND;
    pool.funding_balance = 0;
    pool.current_duration = initial_duration;
    pool.current_multiplier = initial_multiplier;
    pool.committed_base = 0;
    pool.committed_total = 0;
    pool.claimed_total = 0;
    pool.created_at = now;
    pool.version = INITIAL_VERSION;

    Ok(())
}

/// Hands out the next pool id.
pub fn take_pool_id(config: &mut Config) -> Result<u64> {
    let id = config.next_pool_id;
    config.next_pool_id = id.checked_add(1).ok_or(LedgerError::MathOverflow)?;
    Ok(id)
}

pub fn next_round_id(pool: &Pool) -> Result<u64> {
    Ok(pool
        .current_round_id
        .checked_add(1)
        .ok_or(LedgerError::MathOverflow)?)
}

fn open_round(
    pool: &mut Pool,
    round: &mut Round,
    bump: u8,
    root: [u8; 32],
    duration: u64,
    multiplier: u64,
    total_eligible_users: u64,
    now: i64,
) -> Result<u64> {
    let round_id = next_round_id(pool)?;

    round.pool_id = pool.pool_id;
    round.round_id = round_id;
    round.bump = bump;
    round.root = root;
    round.duration = duration;
    round.multiplier = multiplier;
    round.paused = false;
    round.total_eligible_users = total_eligible_users;
    round.joined_users = 0;
    round.created_at = now;

    pool.current_round_id = round_id;
    pool.current_duration = duration;
    pool.current_multiplier = multiplier;

    Ok(round_id)
}

/// Registers a membership round. Root uniqueness per pool is enforced by the
/// root marker PDA created alongside.
pub fn register_round(
    pool: &mut Pool,
    round: &mut Round,
    bump: u8,
    root: [u8; 32],
    duration: u64,
    multiplier: u64,
    eligible_users: u64,
    now: i64,
) -> Result<u64> {
    require!(!pool.is_staking, LedgerError::WrongPoolKind);
    require!(root != [0u8; 32], LedgerError::InvalidRoot);
    require!(duration > 0, LedgerError::InvalidDuration);
    require!(multiplier > 0, LedgerError::InvalidMultiplier);
    require!(eligible_users > 0, LedgerError::InvalidEligibleUsers);

    open_round(pool, round, bump, root, duration, multiplier, eligible_users, now)
}

/// Rolls a staking pool to a new round with fresh parameters.
/// Entries already issued keep their own snapshot.
pub fn roll_staking_round(
    pool: &mut Pool,
    round: &mut Round,
    bump: u8,
    duration: u64,
    multiplier: u64,
    now: i64,
) -> Result<u64> {
    require!(pool.is_staking, LedgerError::WrongPoolKind);
    require!(duration > 0, LedgerError::InvalidDuration);
    require!(multiplier > 0, LedgerError::InvalidMultiplier);

    open_round(pool, round, bump, [0u8; 32], duration, multiplier, 0, now)
}

/// The round a stake vests against: the pool's current, valid, unpaused round.
pub fn staking_round<'a>(pool: &Pool, round: &'a Round) -> Result<&'a Round> {
    require!(pool.is_staking, LedgerError::WrongPoolKind);
    require!(round.pool_id == pool.pool_id, LedgerError::InvalidRound);
    require!(
        round.round_id == pool.current_round_id && round.is_valid(),
        LedgerError::InvalidRound
    );
    require!(!round.paused, LedgerError::RoundPaused);
    Ok(round)
}

pub fn set_round_paused(round: &mut Round, paused: bool) -> Result<()> {
    require!(round.is_valid(), LedgerError::InvalidRound);
    round.paused = paused;
    Ok(())
}

pub fn set_claim_batch_limit(config: &mut Config, limit: u32) -> Result<()> {
    require!(
        (MIN_CLAIM_BATCH_LIMIT..=MAX_CLAIM_BATCH_LIMIT).contains(&limit),
        LedgerError::InvalidBatchLimit
    );
    config.claim_batch_limit = limit;
    Ok(())
}
