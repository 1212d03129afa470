use anchor_lang::prelude::*;

use crate::constants::INITIAL_VERSION;
use crate::events::VestingStarted;
use crate::guard::ensure_active;
use crate::join_gate::{MerkleVerifier, ProofNode};
use crate::ledger::LedgerMut;
use crate::settlement;
use crate::transfer::TokenVault;
use crate::utils::borrow_data_mut;
use crate::{JoinAndStartVesting, OpenUserLedger, Stake};

pub fn open_user_ledger(ctx: Context<OpenUserLedger>, pool_id: u64) -> Result<()> {
    ensure_active(&ctx.accounts.config)?;

    let user = ctx.accounts.user.key();
    let (ledger_bump, join_bump) = (ctx.bumps.user_ledger, ctx.bumps.join_record);
    ctx.accounts
        .user_ledger
        .init(user, pool_id, ledger_bump, INITIAL_VERSION);
    ctx.accounts
        .join_record
        .init(user, pool_id, join_bump, INITIAL_VERSION);

    msg!("ledger opened: pool={} user={}", pool_id, user);
    Ok(())
}

pub fn stake(mut ctx: Context<Stake>, pool_id: u64, amount: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let user = ctx.accounts.user.key();

    let mut vault = TokenVault {
        token_program: ctx.accounts.token_program.to_account_info(),
        vault: ctx.accounts.vault.to_account_info(),
        vault_authority: ctx.accounts.config.to_account_info(),
        vault_authority_bump: ctx.accounts.config.bump,
        counterparty: ctx.accounts.user_token.to_account_info(),
        counterparty_authority: ctx.accounts.user.to_account_info(),
    };

    let accts = &mut ctx.accounts;
    let ledger_ai = accts.user_ledger.to_account_info();
    let pending = {
        let mut data = borrow_data_mut(&ledger_ai)?;
        let mut ledger = LedgerMut::new(&mut accts.user_ledger, &mut data[..])?;
        settlement::stake(
            &mut accts.config,
            &mut accts.pool,
            &accts.round,
            &mut ledger,
            &user,
            amount,
            now,
        )?
    };

    // Persist with the guard held, then pull the stake.
    accts.pool.exit(&crate::ID)?;
    accts.config.exit(&crate::ID)?;
    let entry = settlement::settle(&mut accts.config, pending, &mut vault)?;

    emit!(VestingStarted {
        user,
        pool_id,
        round_id: accts.round.round_id,
        entry_index: entry.index,
        base_amount: amount,
        total_amount: entry.total_vesting_amount,
        start_time: now,
        staked: true,
    });
    Ok(())
}

pub fn join_and_start_vesting(
    mut ctx: Context<JoinAndStartVesting>,
    pool_id: u64,
    round_id: u64,
    base_amount: u64,
    proof: Vec<ProofNode>,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let user = ctx.accounts.user.key();

    let accts = &mut ctx.accounts;
    let ledger_ai = accts.user_ledger.to_account_info();
    let entry = {
        let mut data = borrow_data_mut(&ledger_ai)?;
        let mut ledger = LedgerMut::new(&mut accts.user_ledger, &mut data[..])?;
        settlement::join_and_start_vesting(
            &mut accts.config,
            &mut accts.pool,
            &mut accts.round,
            &mut accts.join_record,
            &mut ledger,
            &user,
            base_amount,
            &proof,
            now,
            &MerkleVerifier,
        )?
    };

    msg!(
        "join: pool={} round={} joined={}/{}",
        pool_id,
        round_id,
        accts.round.joined_users,
        accts.round.total_eligible_users
    );
    emit!(VestingStarted {
        user,
        pool_id,
        round_id,
        entry_index: entry.index,
        base_amount,
        total_amount: entry.total_vesting_amount,
        start_time: now,
        staked: false,
    });
    Ok(())
}
