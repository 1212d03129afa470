//! Mutating operations over explicitly passed ledger state.
//!
//! Operations that move the settlement asset run in two phases. The state
//! phase takes the reentrancy guard, checks the global pause, applies every
//! ledger/cursor/aggregate update and returns a `Pending` movement with the
//! guard still held. The caller persists that state (guard flag included) to
//! account data, then calls `settle`, which performs the transfer and
//! releases the guard.

use anchor_lang::prelude::*;

use crate::errors::LedgerError;
use crate::guard::{ensure_active, hold, release, with_guard};
use crate::join_gate::{self, ProofNode, ProofVerifier};
use crate::ledger::{LedgerMut, NewEntry};
use crate::registry;
use crate::scheduler::{self, resolve_budget, ScanOutcome};
use crate::solvency::{self, SolvencySnapshot};
use crate::state::{Config, JoinRecord, Pool, Round, UserLedger};
use crate::transfer::AssetTransfer;

/// Asset movement owed once the state phase has been persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Movement {
    /// Vault -> counterparty.
    Out(u64),
    /// Counterparty -> vault.
    In(u64),
}

/// Result of a state phase. The guard is still held.
#[must_use]
#[derive(Debug)]
pub struct Pending<R> {
    pub outcome: R,
    pub movement: Movement,
}

/// Performs the pending movement and releases the guard.
pub fn settle<R, T: AssetTransfer>(
    config: &mut Config,
    pending: Pending<R>,
    vault: &mut T,
) -> Result<R> {
    require!(config.locked, LedgerError::GuardNotHeld);
    let moved = match pending.movement {
        Movement::Out(amount) => vault.transfer(amount),
        Movement::In(amount) => vault.transfer_from(amount),
    };
    release(config);
    moved?;
    Ok(pending.outcome)
}

fn ensure_owner(ledger: &UserLedger, user: &Pubkey, pool: &Pool) -> Result<()> {
    require_keys_eq!(ledger.user, *user, LedgerError::LedgerMismatch);
    require!(ledger.pool_id == pool.pool_id, LedgerError::LedgerMismatch);
    Ok(())
}

/// Vests `amount` against the pool's current round. The pull from the user
/// is the pending movement.
pub fn stake(
    config: &mut Config,
    pool: &mut Pool,
    round: &Round,
    ledger: &mut LedgerMut<'_>,
    user: &Pubkey,
    amount: u64,
    now: i64,
) -> Result<Pending<NewEntry>> {
    hold(config, |cfg| {
        ensure_active(cfg)?;
        require!(amount > 0, LedgerError::InvalidAmount);
        let round = registry::staking_round(pool, round)?;
        ensure_owner(ledger.header(), user, pool)?;

        let entry = ledger.add_entry(amount, round.duration, round.round_id, round.multiplier, now)?;
        solvency::record_vesting(cfg, pool, amount, entry.total_vesting_amount)?;
        ledger.flush()?;

        Ok(Pending {
            outcome: entry,
            movement: Movement::In(amount),
        })
    })
}

/// Verified join into a membership round; starts one vesting entry.
/// Moves no asset, so the guard is released on return.
pub fn join_and_start_vesting<V: ProofVerifier>(
    config: &mut Config,
    pool: &mut Pool,
    round: &mut Round,
    joins: &mut JoinRecord,
    ledger: &mut LedgerMut<'_>,
    user: &Pubkey,
    base_amount: u64,
    proof: &[ProofNode],
    now: i64,
    verifier: &V,
) -> Result<NewEntry> {
    with_guard(config, |cfg| {
        ensure_active(cfg)?;
        ensure_owner(ledger.header(), user, pool)?;
        join_gate::admit(pool, round, joins, user, base_amount, proof, verifier)?;

        let entry = ledger.add_entry(
            base_amount,
            round.duration,
            round.round_id,
            round.multiplier,
            now,
        )?;
        solvency::record_vesting(cfg, pool, base_amount, entry.total_vesting_amount)?;
        ledger.flush()?;
        Ok(entry)
    })
}

/// Bounded claim on one pool. Fails with `NothingToClaim` on a zero payout.
pub fn claim_pool(
    config: &mut Config,
    pool: &mut Pool,
    ledger: &mut LedgerMut<'_>,
    user: &Pubkey,
    requested_budget: u32,
    now: i64,
) -> Result<Pending<ScanOutcome>> {
    hold(config, |cfg| {
        ensure_active(cfg)?;
        ensure_owner(ledger.header(), user, pool)?;

        let budget = resolve_budget(requested_budget, cfg.claim_batch_limit);
        let out = scheduler::scan(ledger, now, budget)?;
        require!(out.released > 0, LedgerError::NothingToClaim);

        solvency::record_claim(cfg, pool, out.released)?;
        ledger.flush()?;

        Ok(Pending {
            outcome: out,
            movement: Movement::Out(out.released),
        })
    })
}

/// One pool's share of a cross-pool claim.
pub struct PoolClaim<'a> {
    pub pool: &'a mut Pool,
    pub ledger: LedgerMut<'a>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClaimAllOutcome {
    pub scanned: u32,
    pub released: u64,
    /// (pool id, released) for every pool visited, in visit order.
    pub per_pool: Vec<(u64, u64)>,
}

/// Claims across pools in ascending pool id order under one global budget
/// (`claim_batch_limit`). Pools past the exhausted budget are not visited.
pub fn claim_across_pools(
    config: &mut Config,
    claims: &mut [PoolClaim<'_>],
    user: &Pubkey,
    now: i64,
) -> Result<Pending<ClaimAllOutcome>> {
    hold(config, |cfg| {
        ensure_active(cfg)?;

        let mut prev: Option<u64> = None;
        for c in claims.iter() {
            if let Some(p) = prev {
                require!(c.pool.pool_id > p, LedgerError::PoolOrderViolation);
            }
            prev = Some(c.pool.pool_id);
            ensure_owner(c.ledger.header(), user, &*c.pool)?;
        }

        let budget = cfg.claim_batch_limit;
        let mut out = ClaimAllOutcome::default();

        for c in claims.iter_mut() {
            if out.scanned >= budget {
                break;
            }
            let step = scheduler::scan(&mut c.ledger, now, budget - out.scanned)?;
            out.scanned += step.scanned;
            if step.released > 0 {
                solvency::record_claim(cfg, &mut *c.pool, step.released)?;
                out.released = out
                    .released
                    .checked_add(step.released)
                    .ok_or(LedgerError::MathOverflow)?;
            }
            c.ledger.flush()?;
            out.per_pool.push((c.pool.pool_id, step.released));
        }
        require!(out.released > 0, LedgerError::NothingToClaim);

        let movement = Movement::Out(out.released);
        Ok(Pending {
            outcome: out,
            movement,
        })
    })
}

/// Admin funding for a pool.
pub fn deposit_funding(config: &mut Config, pool: &mut Pool, amount: u64) -> Result<Pending<()>> {
    hold(config, |cfg| {
        ensure_active(cfg)?;
        require!(amount > 0, LedgerError::InvalidAmount);
        solvency::record_funding(pool, amount)?;

        Ok(Pending {
            outcome: (),
            movement: Movement::In(amount),
        })
    })
}

/// Sends `amount` of `mint` held by the config back to the admin.
/// Settlement-mint recoveries are capped at the solvency surplus of
/// `source_balance`.
pub fn recover_asset(
    config: &mut Config,
    mint: &Pubkey,
    amount: u64,
    source_balance: u64,
) -> Result<Pending<()>> {
    hold(config, |cfg| {
        ensure_active(cfg)?;
        require!(*mint != Pubkey::default(), LedgerError::ZeroAddress);
        require!(amount > 0, LedgerError::InvalidAmount);

        if *mint == cfg.mint {
            let snap = SolvencySnapshot::global(cfg, source_balance);
            require!(amount <= snap.surplus(), LedgerError::InsufficientSurplus);
        }

        Ok(Pending {
            outcome: (),
            movement: Movement::Out(amount),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ledger_err;
    use crate::join_gate::membership_leaf;
    use crate::join_gate::test_support::{join_record, tree, StaticVerifier};
    use crate::join_gate::MerkleVerifier;
    use crate::ledger::test_support::LedgerBuf;
    use crate::ledger::LedgerRef;
    use crate::registry::fixtures::*;
    use crate::transfer::test_support::MockVault;
    use crate::utils::{load_account, store_account};

    const YEAR: i64 = 365 * 86_400;

    struct StakingSetup {
        cfg: Config,
        pool: Pool,
        round: Round,
        ledger: LedgerBuf,
        user: Pubkey,
    }

    fn staking_setup(multiplier: u64, duration: u64) -> StakingSetup {
        let cfg = config();
        let mut pool = staking_pool(0);
        let mut round = blank_round();
        registry::roll_staking_round(&mut pool, &mut round, 1, duration, multiplier, 0).unwrap();
        let ledger = LedgerBuf::new(0);
        let user = ledger.user();
        StakingSetup { cfg, pool, round, ledger, user }
    }

    impl StakingSetup {
        fn stake(&mut self, amount: u64, now: i64, vault: &mut MockVault) -> Result<NewEntry> {
            let p = stake(
                &mut self.cfg,
                &mut self.pool,
                &self.round,
                &mut self.ledger.append_view(),
                &self.user,
                amount,
                now,
            )?;
            settle(&mut self.cfg, p, vault)
        }

        fn claim(&mut self, budget: u32, now: i64, vault: &mut MockVault) -> Result<ScanOutcome> {
            let p = claim_pool(
                &mut self.cfg,
                &mut self.pool,
                &mut self.ledger.view(),
                &self.user,
                budget,
                now,
            )?;
            settle(&mut self.cfg, p, vault)
        }
    }

    /// Vault that decodes the config and ledger accounts from their data
    /// buffers on every movement.
    struct InspectingVault<'a, 'info> {
        config: &'a AccountInfo<'info>,
        ledger: &'a AccountInfo<'info>,
        program: Pubkey,
        /// (config, ledger header, released total read from slots)
        seen: Vec<(Config, UserLedger, u64)>,
    }

    impl InspectingVault<'_, '_> {
        fn inspect(&mut self) -> Result<()> {
            let cfg: Config = load_account(self.config, &self.program)?;
            let header: UserLedger = load_account(self.ledger, &self.program)?;
            let data = self.ledger.try_borrow_data()?;
            let released = LedgerRef::new(&header, &data[..])?.released_total()?;
            self.seen.push((cfg, header, released));
            Ok(())
        }
    }

    impl AssetTransfer for InspectingVault<'_, '_> {
        fn transfer(&mut self, _amount: u64) -> Result<()> {
            self.inspect()
        }

        fn transfer_from(&mut self, _amount: u64) -> Result<()> {
            self.inspect()
        }
    }

    #[test]
    fn stake_then_claim_reference_schedule() {
        let mut s = staking_setup(10_980, YEAR as u64);
        let mut vault = MockVault::with_balance(10_000);

        let e = s.stake(1_000, 0, &mut vault).unwrap();
        assert_eq!(e.total_vesting_amount, 1_098);
        assert_eq!(vault.pulled_in, vec![1_000]);
        assert_eq!(s.pool.committed_total, 1_098);
        assert_eq!(s.cfg.total_vested_base, 1_000);

        let out = s.claim(0, YEAR / 2, &mut vault).unwrap();
        assert_eq!(out.released, 549);

        let err = s.claim(0, YEAR / 2, &mut vault);
        assert_eq!(err.unwrap_err(), ledger_err(LedgerError::NothingToClaim));

        let out = s.claim(0, YEAR, &mut vault).unwrap();
        assert_eq!(out.released, 549);
        assert!(s.ledger.entry(0).completed);

        assert_eq!(vault.paid_out, vec![549, 549]);
        assert_eq!(s.pool.claimed_total, 1_098);
        assert_eq!(s.cfg.total_claimed, 1_098);
        assert_eq!(s.ledger.read().released_total().unwrap(), s.pool.claimed_total);
        assert!(!s.cfg.locked);
    }

    #[test]
    fn state_is_persisted_and_locked_before_transfer() {
        let program = crate::ID;
        let mut s = staking_setup(10_000, 100);
        let mut header = s.ledger.header.clone();
        let user = header.user;

        let (config_key, ledger_key) = (Pubkey::new_unique(), Pubkey::new_unique());
        let (mut config_lamports, mut ledger_lamports) = (0u64, 0u64);
        let mut config_data = vec![0u8; 8 + Config::INIT_SPACE];
        let mut ledger_data = vec![0u8; UserLedger::space(1)];
        let config_ai = AccountInfo::new(
            &config_key, false, true, &mut config_lamports, &mut config_data, &program, false, 0,
        );
        let ledger_ai = AccountInfo::new(
            &ledger_key, false, true, &mut ledger_lamports, &mut ledger_data, &program, false, 0,
        );
        let mut vault = InspectingVault {
            config: &config_ai,
            ledger: &ledger_ai,
            program,
            seen: Vec::new(),
        };

        // Same order as the instruction handlers: state, persist, transfer.
        let pending = {
            let mut data = ledger_ai.try_borrow_mut_data().unwrap();
            let mut ledger = LedgerMut::new(&mut header, &mut data[..]).unwrap();
            stake(&mut s.cfg, &mut s.pool, &s.round, &mut ledger, &user, 1_000, 0).unwrap()
        };
        store_account(&config_ai, &s.cfg).unwrap();
        settle(&mut s.cfg, pending, &mut vault).unwrap();

        let pending = {
            let mut data = ledger_ai.try_borrow_mut_data().unwrap();
            let mut ledger = LedgerMut::new(&mut header, &mut data[..]).unwrap();
            claim_pool(&mut s.cfg, &mut s.pool, &mut ledger, &user, 0, 50).unwrap()
        };
        store_account(&config_ai, &s.cfg).unwrap();
        settle(&mut s.cfg, pending, &mut vault).unwrap();

        assert_eq!(vault.seen.len(), 2);
        let (cfg, ledger, released) = &vault.seen[0];
        assert!(cfg.locked);
        assert_eq!(cfg.total_committed, 1_000);
        assert_eq!(ledger.entry_count, 1);
        assert_eq!(ledger.active_count, 1);
        assert_eq!(*released, 0);

        let (cfg, ledger, released) = &vault.seen[1];
        assert!(cfg.locked);
        assert_eq!(cfg.total_claimed, 500);
        assert_eq!(ledger.cursor, 1);
        assert_eq!(*released, 500);

        assert!(!s.cfg.locked);
    }

    #[test]
    fn settle_requires_held_guard() {
        let mut cfg = config();
        let mut vault = MockVault::with_balance(10);
        let pending = Pending {
            outcome: (),
            movement: Movement::Out(5),
        };
        let err = settle(&mut cfg, pending, &mut vault);
        assert_eq!(err.unwrap_err(), ledger_err(LedgerError::GuardNotHeld));
        assert!(vault.paid_out.is_empty());
    }

    #[test]
    fn stake_uses_round_snapshot() {
        let mut s = staking_setup(10_000, 100);
        let mut vault = MockVault::default();
        s.stake(100, 0, &mut vault).unwrap();

        let first_round = s.round.clone();
        let mut next = blank_round();
        registry::roll_staking_round(&mut s.pool, &mut next, 1, 400, 20_000, 0).unwrap();
        s.round = next;
        s.stake(100, 0, &mut vault).unwrap();

        assert_eq!(s.ledger.entry(0).multiplier, 10_000);
        assert_eq!(s.ledger.entry(0).round_id, 1);
        assert_eq!(s.ledger.entry(1).multiplier, 20_000);
        assert_eq!(s.ledger.entry(1).duration, 400);
        assert_eq!(s.pool.committed_total, 300);

        // The rolled-over round is no longer stakeable.
        s.round = first_round;
        let err = s.stake(100, 0, &mut vault);
        assert_eq!(err.unwrap_err(), ledger_err(LedgerError::InvalidRound));
    }

    #[test]
    fn stake_rejects_membership_pool_and_pause() {
        let mut s = staking_setup(10_000, 100);
        let mut vault = MockVault::default();

        let err = s.stake(0, 0, &mut vault);
        assert_eq!(err.unwrap_err(), ledger_err(LedgerError::InvalidAmount));

        s.cfg.paused = true;
        let err = s.stake(5, 0, &mut vault);
        assert_eq!(err.unwrap_err(), ledger_err(LedgerError::Paused));
        s.cfg.paused = false;

        s.pool = membership_pool(0);
        let err = s.stake(5, 0, &mut vault);
        assert_eq!(err.unwrap_err(), ledger_err(LedgerError::WrongPoolKind));

        assert!(vault.pulled_in.is_empty());
        assert_eq!(s.ledger.header.entry_count, 0);
        assert!(!s.cfg.locked);
    }

    #[test]
    fn locked_config_rejects_reentry() {
        let mut s = staking_setup(10_000, 100);
        let mut vault = MockVault::default();
        s.cfg.locked = true;
        let err = s.stake(5, 0, &mut vault);
        assert_eq!(err.unwrap_err(), ledger_err(LedgerError::Reentrancy));
        assert!(vault.pulled_in.is_empty());
        assert!(s.cfg.locked);
    }

    #[test]
    fn join_with_proof_starts_vesting() {
        let mut cfg = config();
        let mut pool = membership_pool(1);
        let mut ledger = LedgerBuf::new(1);
        let user = ledger.user();
        let mut joins = join_record(1, user);

        let leaves = [
            membership_leaf(&user, 1, 1, 2_000),
            membership_leaf(&Pubkey::new_unique(), 1, 1, 3_000),
            membership_leaf(&Pubkey::new_unique(), 1, 1, 4_000),
        ];
        let (root, proof) = tree(&leaves, 0);
        let mut round = blank_round();
        registry::register_round(&mut pool, &mut round, 1, root, 1_000, 15_000, 3, 0).unwrap();

        let e = join_and_start_vesting(
            &mut cfg,
            &mut pool,
            &mut round,
            &mut joins,
            &mut ledger.append_view(),
            &user,
            2_000,
            &proof,
            10,
            &MerkleVerifier,
        )
        .unwrap();
        assert_eq!(e.total_vesting_amount, 3_000);
        assert_eq!(ledger.entry(0).start_time, 10);
        assert_eq!(round.joined_users, 1);
        assert!(joins.has_joined(1));
        assert_eq!(pool.committed_base, 2_000);
        assert_eq!(cfg.total_committed, 3_000);
        assert!(!cfg.locked);

        let err = join_and_start_vesting(
            &mut cfg,
            &mut pool,
            &mut round,
            &mut joins,
            &mut ledger.append_view(),
            &user,
            2_000,
            &proof,
            11,
            &MerkleVerifier,
        );
        assert_eq!(err.unwrap_err(), ledger_err(LedgerError::AlreadyJoined));
        assert_eq!(ledger.header.entry_count, 1);
        assert_eq!(cfg.total_committed, 3_000);
    }

    #[test]
    fn join_rejected_by_verifier_leaves_no_trace() {
        let mut cfg = config();
        let mut pool = membership_pool(0);
        let mut round = membership_round(0, 1, [5u8; 32], 3);
        let mut ledger = LedgerBuf::new(0);
        let user = ledger.user();
        let mut joins = join_record(0, user);

        let err = join_and_start_vesting(
            &mut cfg,
            &mut pool,
            &mut round,
            &mut joins,
            &mut ledger.append_view(),
            &user,
            10,
            &[],
            0,
            &StaticVerifier(false),
        );
        assert_eq!(err.unwrap_err(), ledger_err(LedgerError::InvalidProof));
        assert_eq!(ledger.header.entry_count, 0);
        assert!(!joins.has_joined(1));
        assert_eq!(round.joined_users, 0);
        assert_eq!(cfg.total_committed, 0);
    }

    #[test]
    fn claim_pool_respects_batch_limit() {
        let mut s = staking_setup(10_000, 100);
        let mut vault = MockVault::default();
        for _ in 0..5 {
            s.stake(100, 0, &mut vault).unwrap();
        }
        s.cfg.claim_batch_limit = 2;

        // Requested 10 is clamped to the limit of 2.
        let out = s.claim(10, 100, &mut vault).unwrap();
        assert_eq!(out, ScanOutcome { scanned: 2, released: 200 });
        assert_eq!(s.ledger.header.active_count, 3);

        let out = s.claim(1, 100, &mut vault).unwrap();
        assert_eq!(out, ScanOutcome { scanned: 1, released: 100 });
    }

    #[test]
    fn claim_rejects_foreign_ledger() {
        let mut s = staking_setup(10_000, 100);
        let mut vault = MockVault::default();
        s.user = Pubkey::new_unique();
        let err = s.claim(0, 100, &mut vault);
        assert_eq!(err.unwrap_err(), ledger_err(LedgerError::LedgerMismatch));
        assert!(!s.cfg.locked);
    }

    #[test]
    fn claim_across_pools_in_order_with_shared_budget() {
        let mut cfg = config();
        cfg.claim_batch_limit = 3;
        let user = Pubkey::new_unique();
        let mut vault = MockVault::default();

        let mut pools = Vec::new();
        let mut ledgers = Vec::new();
        for id in 0..3u64 {
            let mut p = staking_pool(id);
            let mut r = blank_round();
            registry::roll_staking_round(&mut p, &mut r, 1, 100, 10_000, 0).unwrap();
            let mut l = LedgerBuf::for_user(id, user);
            for _ in 0..2 {
                let pending = stake(&mut cfg, &mut p, &r, &mut l.append_view(), &user, 10, 0).unwrap();
                settle(&mut cfg, pending, &mut vault).unwrap();
            }
            pools.push(p);
            ledgers.push(l);
        }

        let pending = {
            let mut claims: Vec<PoolClaim> = pools
                .iter_mut()
                .zip(ledgers.iter_mut())
                .map(|(pool, l)| PoolClaim { pool, ledger: l.view() })
                .collect();
            claim_across_pools(&mut cfg, &mut claims, &user, 100).unwrap()
        };
        assert!(cfg.locked);
        let out = settle(&mut cfg, pending, &mut vault).unwrap();

        // Budget 3: both entries of pool 0, one of pool 1, none of pool 2.
        assert_eq!(out.scanned, 3);
        assert_eq!(out.released, 30);
        assert_eq!(out.per_pool, vec![(0, 20), (1, 10)]);
        assert_eq!(pools[0].claimed_total, 20);
        assert_eq!(pools[1].claimed_total, 10);
        assert_eq!(pools[2].claimed_total, 0);
        assert_eq!(vault.paid_out, vec![30]);
        for (p, l) in pools.iter().zip(ledgers.iter()) {
            assert_eq!(l.read().released_total().unwrap(), p.claimed_total);
        }
        assert!(!cfg.locked);
    }

    #[test]
    fn claim_across_pools_requires_ascending_ids() {
        let mut cfg = config();
        let user = Pubkey::new_unique();
        let mut a = staking_pool(2);
        let mut b = staking_pool(1);
        let mut la = LedgerBuf::for_user(2, user);
        let mut lb = LedgerBuf::for_user(1, user);

        let mut claims = vec![
            PoolClaim { pool: &mut a, ledger: la.view() },
            PoolClaim { pool: &mut b, ledger: lb.view() },
        ];
        let err = claim_across_pools(&mut cfg, &mut claims, &user, 0);
        assert_eq!(err.unwrap_err(), ledger_err(LedgerError::PoolOrderViolation));

        claims.truncate(1);
        let err = claim_across_pools(&mut cfg, &mut claims, &user, 0);
        assert_eq!(err.unwrap_err(), ledger_err(LedgerError::NothingToClaim));
        assert!(!cfg.locked);
    }

    #[test]
    fn users_sharing_a_pool_sum_to_its_claimed_total() {
        let mut cfg = config();
        let mut pool = staking_pool(0);
        let mut round = blank_round();
        registry::roll_staking_round(&mut pool, &mut round, 1, 1_000, 12_000, 0).unwrap();
        let mut vault = MockVault::with_balance(10_000);

        let mut alice = LedgerBuf::new(0);
        let mut bob = LedgerBuf::new(0);

        let mut stake_as = |l: &mut LedgerBuf, amount: u64, now: i64| {
            let user = l.user();
            let p = stake(&mut cfg, &mut pool, &round, &mut l.append_view(), &user, amount, now).unwrap();
            settle(&mut cfg, p, &mut vault).unwrap();
        };
        stake_as(&mut alice, 1_000, 0);
        stake_as(&mut bob, 500, 0);
        stake_as(&mut bob, 300, 200);

        let mut claim_as = |l: &mut LedgerBuf, now: i64| {
            let user = l.user();
            let p = claim_pool(&mut cfg, &mut pool, &mut l.view(), &user, 0, now).unwrap();
            settle(&mut cfg, p, &mut vault).unwrap().released
        };
        assert_eq!(claim_as(&mut alice, 250), 300);
        assert_eq!(claim_as(&mut bob, 400), 240 + 72);
        assert_eq!(claim_as(&mut alice, 900), 780);
        assert_eq!(claim_as(&mut bob, 1_500), 360 + 288);

        let a = alice.read().released_total().unwrap();
        let b = bob.read().released_total().unwrap();
        assert_eq!(a, 1_080);
        assert_eq!(b, 960);
        assert_eq!(a + b, pool.claimed_total);
        assert_eq!(pool.claimed_total, cfg.total_claimed);
        assert_eq!(vault.paid_out.iter().sum::<u64>(), pool.claimed_total);
        assert_eq!(pool.committed_total, 1_200 + 600 + 360);
        assert_eq!(bob.read().active_count(), 0);
    }

    #[test]
    fn deposit_and_recover_respect_solvency() {
        let mut s = staking_setup(20_000, 100);
        let mut vault = MockVault::default();

        let p = deposit_funding(&mut s.cfg, &mut s.pool, 500).unwrap();
        settle(&mut s.cfg, p, &mut vault).unwrap();
        assert_eq!(s.pool.funding_balance, 500);
        assert_eq!(vault.pulled_in, vec![500]);

        // 100 staked, 200 committed; vault holds 600 -> surplus 400.
        s.stake(100, 0, &mut vault).unwrap();
        let mint = s.cfg.mint;
        let err = recover_asset(&mut s.cfg, &mint, 401, vault.balance);
        assert_eq!(err.unwrap_err(), ledger_err(LedgerError::InsufficientSurplus));
        assert!(!s.cfg.locked);
        let p = recover_asset(&mut s.cfg, &mint, 400, vault.balance).unwrap();
        settle(&mut s.cfg, p, &mut vault).unwrap();
        assert_eq!(vault.balance, 200);

        // Foreign mints are not capped.
        let mut other = MockVault::with_balance(50);
        let p = recover_asset(&mut s.cfg, &Pubkey::new_unique(), 50, 0).unwrap();
        settle(&mut s.cfg, p, &mut other).unwrap();
        assert_eq!(other.balance, 0);

        let err = recover_asset(&mut s.cfg, &Pubkey::default(), 1, 0);
        assert_eq!(err.unwrap_err(), ledger_err(LedgerError::ZeroAddress));

        s.cfg.paused = true;
        let err = recover_asset(&mut s.cfg, &mint, 1, vault.balance);
        assert_eq!(err.unwrap_err(), ledger_err(LedgerError::Paused));
        let err = deposit_funding(&mut s.cfg, &mut s.pool, 1);
        assert_eq!(err.unwrap_err(), ledger_err(LedgerError::Paused));
        assert!(!s.cfg.locked);
    }

    #[test]
    fn failed_payout_releases_guard() {
        let mut s = staking_setup(10_000, 100);
        let mut vault = MockVault::default();
        s.stake(100, 0, &mut vault).unwrap();
        vault.fail = true;
        let res = s.claim(0, 100, &mut vault);
        assert!(res.is_err());
        assert!(!s.cfg.locked);
    }
}
