//! Per-user vesting history: entry arena and active-index set.
//!
//! Entries live in fixed-size slots behind the `UserLedger` header (see
//! `state.rs`). `LedgerMut` and `LedgerRef` read and write single slots in
//! place, so the cost of an operation follows the number of entries it
//! visits and not the length of the history.

use anchor_lang::prelude::*;

use crate::constants::MULTIPLIER_DENOMINATOR;
use crate::errors::LedgerError;
use crate::scheduler::EntryStore;
use crate::state::{UserLedger, VestingEntry, LEDGER_SLOT_LEN};

/// `base * multiplier / MULTIPLIER_DENOMINATOR`, floored.
pub fn total_vesting_amount(base_amount: u64, multiplier: u64) -> Result<u64> {
    let v = (base_amount as u128)
        .checked_mul(multiplier as u128)
        .ok_or(LedgerError::MathOverflow)?
        / MULTIPLIER_DENOMINATOR as u128;
    Ok(u64::try_from(v).map_err(|_| LedgerError::MathOverflow)?)
}

/// Linear release curve. Non-decreasing in `now`; equals `total` once
/// `now - start >= duration`.
pub fn linear_release(total: u64, start_time: i64, duration: u64, now: i64) -> u64 {
    if now <= start_time {
        return 0;
    }
    let elapsed = now.abs_diff(start_time);
    if elapsed >= duration {
        return total;
    }
    // elapsed < duration here, so the quotient stays below `total`.
    ((total as u128) * (elapsed as u128) / (duration as u128)) as u64
}

impl VestingEntry {
    pub fn total_vesting_amount(&self) -> Result<u64> {
        total_vesting_amount(self.base_amount, self.multiplier)
    }

    pub fn releasable_at(&self, now: i64) -> Result<u64> {
        Ok(linear_release(
            self.total_vesting_amount()?,
            self.start_time,
            self.duration,
            now,
        ))
    }

    /// Newly releasable amount, i.e. `releasable_at(now) - released_amount`.
    pub fn claimable_at(&self, now: i64) -> Result<u64> {
        if self.completed {
            return Ok(0);
        }
        Ok(self.releasable_at(now)?.saturating_sub(self.released_amount))
    }

    pub fn end_time(&self) -> i64 {
        self.start_time
            .saturating_add(i64::try_from(self.duration).unwrap_or(i64::MAX))
    }
}

/// Result of appending a vesting entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NewEntry {
    pub index: u32,
    pub total_vesting_amount: u64,
}

impl UserLedger {
    pub fn init(&mut self, user: Pubkey, pool_id: u64, bump: u8, version: u16) {
        self.user = user;
        self.pool_id = pool_id;
        self.bump = bump;
        self.cursor = 0;
        self.entry_count = 0;
        self.active_count = 0;
        self.version = version;
    }
}

const ENTRY_LEN: usize = VestingEntry::INIT_SPACE;

fn slot_offset(slot: usize) -> usize {
    UserLedger::SLOTS_OFFSET + slot * LEDGER_SLOT_LEN
}

fn slot_capacity(data: &[u8]) -> usize {
    data.len().saturating_sub(UserLedger::SLOTS_OFFSET) / LEDGER_SLOT_LEN
}

fn read_entry(data: &[u8], index: usize) -> Result<VestingEntry> {
    let off = slot_offset(index);
    let mut src: &[u8] = data
        .get(off..off + ENTRY_LEN)
        .ok_or(LedgerError::LedgerTooSmall)?;
    VestingEntry::deserialize(&mut src)
        .map_err(|_| error!(anchor_lang::error::ErrorCode::AccountDidNotDeserialize))
}

fn write_entry(data: &mut [u8], index: usize, entry: &VestingEntry) -> Result<()> {
    let off = slot_offset(index);
    let mut dst: &mut [u8] = data
        .get_mut(off..off + ENTRY_LEN)
        .ok_or(LedgerError::LedgerTooSmall)?;
    entry
        .serialize(&mut dst)
        .map_err(|_| error!(anchor_lang::error::ErrorCode::AccountDidNotSerialize))
}

fn read_active(data: &[u8], pos: usize) -> Result<u32> {
    let off = slot_offset(pos) + ENTRY_LEN;
    let raw = data.get(off..off + 4).ok_or(LedgerError::LedgerTooSmall)?;
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(raw);
    Ok(u32::from_le_bytes(bytes))
}

fn write_active(data: &mut [u8], pos: usize, index: u32) -> Result<()> {
    let off = slot_offset(pos) + ENTRY_LEN;
    data.get_mut(off..off + 4)
        .ok_or(LedgerError::LedgerTooSmall)?
        .copy_from_slice(&index.to_le_bytes());
    Ok(())
}

/// Read-only view over a ledger header and its account data.
#[derive(Clone, Copy)]
pub struct LedgerRef<'a> {
    header: &'a UserLedger,
    data: &'a [u8],
}

impl<'a> LedgerRef<'a> {
    pub fn new(header: &'a UserLedger, data: &'a [u8]) -> Result<Self> {
        require!(
            slot_capacity(data) >= header.entry_count as usize,
            LedgerError::LedgerTooSmall
        );
        Ok(Self { header, data })
    }

    pub fn header(&self) -> &UserLedger {
        self.header
    }

    pub fn entry_count(&self) -> usize {
        self.header.entry_count as usize
    }

    pub fn active_count(&self) -> usize {
        self.header.active_count as usize
    }

    pub fn entry(&self, index: u32) -> Result<VestingEntry> {
        require!(index < self.header.entry_count, LedgerError::InvalidEntryIndex);
        read_entry(self.data, index as usize)
    }

    pub fn active_at(&self, pos: usize) -> Result<u32> {
        require!(pos < self.active_count(), LedgerError::InvalidEntryIndex);
        read_active(self.data, pos)
    }

    /// Full (unbounded) sum of what the user could claim at `now`.
    pub fn claimable_total(&self, now: i64) -> Result<u64> {
        let mut sum: u64 = 0;
        for pos in 0..self.active_count() {
            let entry = self.entry(self.active_at(pos)?)?;
            sum = sum
                .checked_add(entry.claimable_at(now)?)
                .ok_or(LedgerError::MathOverflow)?;
        }
        Ok(sum)
    }

    /// Sum of `released_amount` over the whole history (active + completed).
    pub fn released_total(&self) -> Result<u64> {
        let mut sum: u64 = 0;
        for i in 0..self.header.entry_count {
            sum = sum
                .checked_add(self.entry(i)?.released_amount)
                .ok_or(LedgerError::MathOverflow)?;
        }
        Ok(sum)
    }
}

/// Writable view over a ledger header and its account data.
///
/// Slot writes land in `data` immediately. Header fields (counts, cursor)
/// change in `header` and reach `data` through `flush`.
pub struct LedgerMut<'a> {
    header: &'a mut UserLedger,
    data: &'a mut [u8],
}

impl<'a> LedgerMut<'a> {
    pub fn new(header: &'a mut UserLedger, data: &'a mut [u8]) -> Result<Self> {
        require!(
            slot_capacity(data) >= header.entry_count as usize,
            LedgerError::LedgerTooSmall
        );
        require!(
            header.active_count <= header.entry_count,
            LedgerError::InvalidEntryIndex
        );
        Ok(Self { header, data })
    }

    pub fn header(&self) -> &UserLedger {
        &*self.header
    }

    pub fn reader(&self) -> LedgerRef<'_> {
        LedgerRef {
            header: &*self.header,
            data: &*self.data,
        }
    }

    /// Appends a fresh entry starting at `now` and registers it as active.
    /// The account must already have room for one more slot.
    pub fn add_entry(
        &mut self,
        base_amount: u64,
        duration: u64,
        round_id: u64,
        multiplier: u64,
        now: i64,
    ) -> Result<NewEntry> {
        require!(base_amount > 0, LedgerError::InvalidAmount);
        require!(duration > 0, LedgerError::InvalidDuration);
        require!(multiplier > 0, LedgerError::InvalidMultiplier);

        let total = total_vesting_amount(base_amount, multiplier)?;
        // A zero total could never complete and would pin an active slot forever.
        require!(total > 0, LedgerError::InvalidAmount);

        let index = self.header.entry_count;
        require!(
            slot_capacity(self.data) > index as usize,
            LedgerError::LedgerTooSmall
        );
        let next = index.checked_add(1).ok_or(LedgerError::MathOverflow)?;

        write_entry(
            self.data,
            index as usize,
            &VestingEntry {
                base_amount,
                start_time: now,
                duration,
                released_amount: 0,
                round_id,
                multiplier,
                completed: false,
            },
        )?;
        write_active(self.data, self.header.active_count as usize, index)?;
        self.header.entry_count = next;
        self.header.active_count += 1;

        Ok(NewEntry {
            index,
            total_vesting_amount: total,
        })
    }

    /// Writes the header (discriminator included) to the front of `data`.
    pub fn flush(&mut self) -> Result<()> {
        let mut dst: &mut [u8] = &mut self.data[..];
        self.header.try_serialize(&mut dst)
    }
}

impl EntryStore for LedgerMut<'_> {
    fn active_len(&self) -> usize {
        self.header.active_count as usize
    }

    fn cursor(&self) -> usize {
        self.header.cursor as usize
    }

    fn set_cursor(&mut self, cursor: usize) -> Result<()> {
        self.header.cursor = u32::try_from(cursor).map_err(|_| LedgerError::MathOverflow)?;
        Ok(())
    }

    fn active_at(&self, pos: usize) -> Result<u32> {
        self.reader().active_at(pos)
    }

    fn entry(&self, index: u32) -> Result<VestingEntry> {
        self.reader().entry(index)
    }

    fn put_entry(&mut self, index: u32, entry: &VestingEntry) -> Result<()> {
        require!(index < self.header.entry_count, LedgerError::InvalidEntryIndex);
        write_entry(self.data, index as usize, entry)
    }

    fn swap_remove_active(&mut self, pos: usize) -> Result<()> {
        let len = self.header.active_count as usize;
        require!(pos < len, LedgerError::InvalidEntryIndex);
        let last = len - 1;
        if pos != last {
            let moved = read_active(self.data, last)?;
            write_active(self.data, pos, moved)?;
        }
        self.header.active_count -= 1;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A ledger account held in memory: decoded header plus raw data.
    pub struct LedgerBuf {
        pub header: UserLedger,
        pub data: Vec<u8>,
    }

    impl LedgerBuf {
        pub fn new(pool_id: u64) -> Self {
            let mut buf = Self {
                header: UserLedger {
                    user: Pubkey::new_unique(),
                    pool_id,
                    bump: 255,
                    cursor: 0,
                    entry_count: 0,
                    active_count: 0,
                    version: crate::constants::INITIAL_VERSION,
                },
                data: vec![0u8; UserLedger::space(0)],
            };
            buf.view().flush().unwrap();
            buf
        }

        pub fn for_user(pool_id: u64, user: Pubkey) -> Self {
            let mut buf = Self::new(pool_id);
            buf.header.user = user;
            buf
        }

        pub fn user(&self) -> Pubkey {
            self.header.user
        }

        pub fn view(&mut self) -> LedgerMut<'_> {
            LedgerMut::new(&mut self.header, &mut self.data).unwrap()
        }

        /// Grows the buffer by one slot, as the append instructions' `realloc` does.
        pub fn append_view(&mut self) -> LedgerMut<'_> {
            let want = self.header.space_after_append();
            if self.data.len() < want {
                self.data.resize(want, 0);
            }
            self.view()
        }

        pub fn read(&self) -> LedgerRef<'_> {
            LedgerRef::new(&self.header, &self.data).unwrap()
        }

        pub fn add(
            &mut self,
            base_amount: u64,
            duration: u64,
            round_id: u64,
            multiplier: u64,
            now: i64,
        ) -> Result<NewEntry> {
            self.append_view()
                .add_entry(base_amount, duration, round_id, multiplier, now)
        }

        pub fn entry(&self, index: u32) -> VestingEntry {
            self.read().entry(index).unwrap()
        }

        pub fn entries(&self) -> Vec<VestingEntry> {
            (0..self.header.entry_count).map(|i| self.entry(i)).collect()
        }

        pub fn active(&self) -> Vec<u32> {
            let r = self.read();
            (0..r.active_count()).map(|p| r.active_at(p).unwrap()).collect()
        }
    }
}
