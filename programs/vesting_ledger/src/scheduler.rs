//! Bounded-cost claim scheduler.
//!
//! Each call visits at most `budget` active entries, starting at the ledger's
//! persisted cursor and wrapping round-robin. Entries that complete are
//! swap-removed from the active set. The cursor normally stays put so the
//! element swapped into that slot is visited next within the same call;
//! after the scan has wrapped, an element that was already visited in this
//! revolution is stepped over instead, so no entry is seen twice per call.

use anchor_lang::prelude::*;

use crate::errors::LedgerError;
use crate::state::VestingEntry;

/// Slot-level access to one user ledger. Implementations read and write
/// single entries, never the whole history.
pub trait EntryStore {
    fn active_len(&self) -> usize;
    fn cursor(&self) -> usize;
    fn set_cursor(&mut self, cursor: usize) -> Result<()>;
    /// Entry index stored at position `pos` of the active set.
    fn active_at(&self, pos: usize) -> Result<u32>;
    fn entry(&self, index: u32) -> Result<VestingEntry>;
    fn put_entry(&mut self, index: u32, entry: &VestingEntry) -> Result<()>;
    /// Moves the last active position into `pos` and shrinks the set by one.
    fn swap_remove_active(&mut self, pos: usize) -> Result<()>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Active entries visited in this call.
    pub scanned: u32,
    /// Amount newly released across those entries.
    pub released: u64,
}

/// Resolves the caller's budget against the configured limit.
/// Zero means "use the limit".
pub fn resolve_budget(requested: u32, limit: u32) -> u32 {
    if requested == 0 {
        limit
    } else {
        requested.min(limit)
    }
}

/// Advances the ledger's cursor by up to `budget` entries, releasing what has
/// vested by `now`. Leaves every ledger invariant intact on return.
pub fn scan<S: EntryStore>(store: &mut S, now: i64, budget: u32) -> Result<ScanOutcome> {
    let mut out = ScanOutcome::default();

    let size = store.active_len();
    if size == 0 {
        return Ok(out);
    }
    let effective = (budget as usize).min(size);

    let mut cursor = store.cursor();
    if cursor >= size {
        cursor = 0;
    }
    let start = cursor;
    let mut wrapped = false;

    for _ in 0..effective {
        let len = store.active_len();
        if len == 0 {
            break;
        }
        if cursor >= len {
            cursor = 0;
            wrapped = true;
        }

        let idx = store.active_at(cursor)?;
        let mut entry = store.entry(idx)?;
        out.scanned += 1;

        if now <= entry.start_time {
            cursor += 1;
            continue;
        }

        let releasable = entry.releasable_at(now)?;
        if releasable <= entry.released_amount {
            cursor += 1;
            continue;
        }

        let delta = releasable - entry.released_amount;
        entry.released_amount = releasable;
        entry.completed = releasable == entry.total_vesting_amount()?;
        store.put_entry(idx, &entry)?;
        out.released = out
            .released
            .checked_add(delta)
            .ok_or(LedgerError::MathOverflow)?;

        if entry.completed {
            let last = len - 1;
            store.swap_remove_active(cursor)?;
            // Positions at or past `start` were covered before the wrap.
            if wrapped && last > cursor && last >= start {
                cursor += 1;
            }
        } else {
            cursor += 1;
        }
    }

    store.set_cursor(cursor)?;
    Ok(out)
}
