//! Running aggregates kept next to ledger mutations, and the derived
//! solvency view. Informational only: nothing here gates a mutation.

use anchor_lang::prelude::*;

use crate::errors::LedgerError;
use crate::state::{Config, Pool};

/// Records a freshly issued entry in pool and global aggregates.
pub fn record_vesting(config: &mut Config, pool: &mut Pool, base: u64, total: u64) -> Result<()> {
    pool.committed_base = pool
        .committed_base
        .checked_add(base)
        .ok_or(LedgerError::MathOverflow)?;
    pool.committed_total = pool
        .committed_total
        .checked_add(total)
        .ok_or(LedgerError::MathOverflow)?;

    config.total_vested_base = config
        .total_vested_base
        .checked_add(base)
        .ok_or(LedgerError::MathOverflow)?;
    config.total_committed = config
        .total_committed
        .checked_add(total)
        .ok_or(LedgerError::MathOverflow)?;
    Ok(())
}

/// Records a release settled out of `pool`.
pub fn record_claim(config: &mut Config, pool: &mut Pool, amount: u64) -> Result<()> {
    pool.claimed_total = pool
        .claimed_total
        .checked_add(amount)
        .ok_or(LedgerError::MathOverflow)?;
    config.total_claimed = config
        .total_claimed
        .checked_add(amount)
        .ok_or(LedgerError::MathOverflow)?;
    Ok(())
}

pub fn record_funding(pool: &mut Pool, amount: u64) -> Result<()> {
    pool.funding_balance = pool
        .funding_balance
        .checked_add(amount)
        .ok_or(LedgerError::MathOverflow)?;
    Ok(())
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SolvencySnapshot {
    pub committed: u64,
    pub claimed: u64,
    /// `committed - claimed`, floored at zero.
    pub outstanding: u64,
    pub balance: u64,
    /// `outstanding - balance`, floored at zero.
    pub gap: u64,
}

impl SolvencySnapshot {
    pub fn new(committed: u64, claimed: u64, balance: u64) -> Self {
        let outstanding = committed.saturating_sub(claimed);
        Self {
            committed,
            claimed,
            outstanding,
            balance,
            gap: outstanding.saturating_sub(balance),
        }
    }

    pub fn global(config: &Config, balance: u64) -> Self {
        Self::new(config.total_committed, config.total_claimed, balance)
    }

    /// Balance above what is still owed.
    pub fn surplus(&self) -> u64 {
        self.balance.saturating_sub(self.outstanding)
    }
}
