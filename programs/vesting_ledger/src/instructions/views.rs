//! Read-only queries. Each one emits its answer as an event and changes nothing.
//! Claimable totals and dashboard rows walk the whole history, unlike claims.

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::LedgerError;
use crate::events::{ClaimableQuote, DashboardRow, EntryCount, GlobalStats, JoinedRounds, PoolStats};
use crate::solvency::SolvencySnapshot;
use crate::ledger::LedgerRef;
use crate::state::Pool;
use crate::utils::{borrow_data, load_pool_ledger_pairs};
use crate::{ViewGlobal, ViewJoinRecord, ViewPool, ViewUser, ViewUserLedger};

fn ensure_ascending(ids: impl Iterator<Item = u64>) -> Result<()> {
    let mut prev: Option<u64> = None;
    for id in ids {
        if let Some(p) = prev {
            require!(id > p, LedgerError::PoolOrderViolation);
        }
        prev = Some(id);
    }
    Ok(())
}

fn page_size(limit: u32) -> usize {
    if limit == 0 {
        MAX_DASHBOARD_PAGE as usize
    } else {
        limit.min(MAX_DASHBOARD_PAGE) as usize
    }
}

/// Sum of what `user` could claim right now across `sources`.
pub fn claimable_quote(sources: &[(&Pool, LedgerRef<'_>)], now: i64) -> Result<u64> {
    sources.iter().try_fold(0u64, |acc, (_, ledger)| {
        acc.checked_add(ledger.claimable_total(now)?)
            .ok_or_else(|| error!(LedgerError::MathOverflow))
    })
}

/// One page of the user's full entry history, pools in the given order and
/// entries in creation order within each pool.
pub fn dashboard_rows(
    sources: &[(&Pool, LedgerRef<'_>)],
    user: &Pubkey,
    offset: u64,
    limit: u32,
    now: i64,
) -> Result<Vec<DashboardRow>> {
    let page = page_size(limit);
    let mut rows = Vec::with_capacity(page);
    let mut position: u64 = 0;

    for (pool, ledger) in sources.iter() {
        let len = ledger.entry_count() as u64;
        if position.saturating_add(len) <= offset {
            position = position.saturating_add(len);
            continue;
        }

        for index in 0..ledger.header().entry_count {
            if rows.len() >= page {
                return Ok(rows);
            }
            if position >= offset {
                let entry = ledger.entry(index)?;
                let total = entry.total_vesting_amount()?;
                rows.push(DashboardRow {
                    user: *user,
                    position,
                    pool_id: pool.pool_id,
                    pool_name: pool.name.clone(),
                    round_id: entry.round_id,
                    principal: entry.base_amount,
                    total_amount: total,
                    released: entry.released_amount,
                    claimable: entry.claimable_at(now)?,
                    remaining: total.saturating_sub(entry.released_amount),
                    start_time: entry.start_time,
                    end_time: entry.end_time(),
                    multiplier: entry.multiplier,
                    completed: entry.completed,
                });
            }
            position += 1;
        }
    }
    Ok(rows)
}

pub fn emit_global_stats(ctx: Context<ViewGlobal>) -> Result<()> {
    let cfg = &ctx.accounts.config;
    let snap = SolvencySnapshot::global(cfg, ctx.accounts.vault.amount);

    emit!(GlobalStats {
        total_vested_base: cfg.total_vested_base,
        total_committed: snap.committed,
        total_claimed: snap.claimed,
        outstanding: snap.outstanding,
        vault_balance: snap.balance,
        solvency_gap: snap.gap,
        pool_count: cfg.next_pool_id.saturating_sub(INITIAL_POOL_ID),
        claim_batch_limit: cfg.claim_batch_limit,
        paused: cfg.paused,
    });
    Ok(())
}

pub fn emit_pool_stats(ctx: Context<ViewPool>, _pool_id: u64) -> Result<()> {
    let pool = &ctx.accounts.pool;
    let snap = SolvencySnapshot::new(pool.committed_total, pool.claimed_total, 0);

    emit!(PoolStats {
        pool_id: pool.pool_id,
        name: pool.name.clone(),
        is_staking: pool.is_staking,
        current_round_id: pool.current_round_id,
        funding_balance: pool.funding_balance,
        current_duration: pool.current_duration,
        current_multiplier: pool.current_multiplier,
        committed_base: pool.committed_base,
        committed_total: pool.committed_total,
        claimed_total: pool.claimed_total,
        outstanding: snap.outstanding,
    });
    Ok(())
}

pub fn emit_entry_count(ctx: Context<ViewUserLedger>, pool_id: u64) -> Result<()> {
    let ledger = &ctx.accounts.user_ledger;
    emit!(EntryCount {
        user: ledger.user,
        pool_id,
        entries: ledger.entry_count as u64,
        active: ledger.active_count as u64,
    });
    Ok(())
}

pub fn emit_joined_rounds(ctx: Context<ViewJoinRecord>, pool_id: u64) -> Result<()> {
    require!(!ctx.accounts.pool.is_staking, LedgerError::WrongPoolKind);

    let joins = &ctx.accounts.join_record;
    emit!(JoinedRounds {
        user: joins.user,
        pool_id,
        bitmap: joins.joined_rounds.clone(),
    });
    Ok(())
}

pub fn emit_claimable<'info>(ctx: Context<'_, '_, 'info, 'info, ViewUser<'info>>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let user = ctx.accounts.user.key();

    let pairs = load_pool_ledger_pairs(ctx.remaining_accounts, &user, ctx.program_id)?;
    ensure_ascending(pairs.iter().map(|p| p.pool.pool_id))?;
    let data = pairs
        .iter()
        .map(|p| borrow_data(p.ledger_ai))
        .collect::<Result<Vec<_>>>()?;
    let mut sources = Vec::with_capacity(pairs.len());
    for (p, d) in pairs.iter().zip(data.iter()) {
        sources.push((&p.pool, LedgerRef::new(&p.ledger, &d[..])?));
    }

    emit!(ClaimableQuote {
        user,
        pools: sources.len() as u32,
        claimable: claimable_quote(&sources, now)?,
    });
    Ok(())
}

pub fn emit_dashboard<'info>(
    ctx: Context<'_, '_, 'info, 'info, ViewUser<'info>>,
    offset: u64,
    limit: u32,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let user = ctx.accounts.user.key();

    let pairs = load_pool_ledger_pairs(ctx.remaining_accounts, &user, ctx.program_id)?;
    ensure_ascending(pairs.iter().map(|p| p.pool.pool_id))?;
    let data = pairs
        .iter()
        .map(|p| borrow_data(p.ledger_ai))
        .collect::<Result<Vec<_>>>()?;
    let mut sources = Vec::with_capacity(pairs.len());
    for (p, d) in pairs.iter().zip(data.iter()) {
        sources.push((&p.pool, LedgerRef::new(&p.ledger, &d[..])?));
    }

    let rows = dashboard_rows(&sources, &user, offset, limit, now)?;
    msg!("dashboard: offset={} rows={}", offset, rows.len());
    for row in rows {
        emit!(row);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ledger_err;
    use crate::ledger::test_support::LedgerBuf;
    use crate::registry::fixtures::{membership_pool, staking_pool};

    fn history(pool_id: u64, user: Pubkey, entries: u64) -> LedgerBuf {
        let mut l = LedgerBuf::for_user(pool_id, user);
        for i in 0..entries {
            l.add(100 * (i + 1), 100, 1, 10_000, 0).unwrap();
        }
        l
    }

    #[test]
    fn dashboard_pages_across_pools_in_order() {
        let user = Pubkey::new_unique();
        let (p0, p1) = (staking_pool(0), membership_pool(1));
        let (l0, l1) = (history(0, user, 3), history(1, user, 2));
        let sources = [(&p0, l0.read()), (&p1, l1.read())];

        let rows = dashboard_rows(&sources, &user, 2, 2, 50).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!((rows[0].pool_id, rows[0].position, rows[0].principal), (0, 2, 300));
        assert_eq!((rows[1].pool_id, rows[1].position, rows[1].principal), (1, 3, 100));
        assert_eq!(rows[1].claimable, 50);
        assert_eq!(rows[1].remaining, 100);
        assert_eq!(rows[1].end_time, 100);

        // Offset inside the second pool skips the first one entirely.
        let rows = dashboard_rows(&sources, &user, 4, 0, 50).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].principal, 200);

        assert!(dashboard_rows(&sources, &user, 9, 5, 50).unwrap().is_empty());
    }

    #[test]
    fn dashboard_includes_completed_entries_and_caps_page() {
        let user = Pubkey::new_unique();
        let pool = staking_pool(0);
        let mut ledger = history(0, user, 30);
        crate::scheduler::scan(&mut ledger.view(), 200, 1).unwrap();
        assert!(ledger.entry(0).completed);

        let sources = [(&pool, ledger.read())];
        let rows = dashboard_rows(&sources, &user, 0, 500, 200).unwrap();
        assert_eq!(rows.len(), MAX_DASHBOARD_PAGE as usize);
        assert!(rows[0].completed);
        assert_eq!(rows[0].remaining, 0);
        assert_eq!(rows[0].claimable, 0);
        assert!(!rows[1].completed);
        assert_eq!(rows[1].claimable, rows[1].total_amount);
    }

    #[test]
    fn claimable_quote_sums_all_pools() {
        let user = Pubkey::new_unique();
        let (p0, p1) = (staking_pool(0), staking_pool(1));
        let (l0, l1) = (history(0, user, 2), history(1, user, 1));
        let sources = [(&p0, l0.read()), (&p1, l1.read())];

        // 300 + 100 principal, half vested.
        assert_eq!(claimable_quote(&sources, 50).unwrap(), 200);
        assert_eq!(claimable_quote(&sources, 0).unwrap(), 0);
        assert_eq!(claimable_quote(&[], 50).unwrap(), 0);
    }

    #[test]
    fn pool_order_must_ascend() {
        assert!(ensure_ascending([0u64, 2, 5].into_iter()).is_ok());
        assert_eq!(
            ensure_ascending([1u64, 1].into_iter()).unwrap_err(),
            ledger_err(LedgerError::PoolOrderViolation)
        );
    }
}
