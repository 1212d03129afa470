use anchor_lang::prelude::*;

use crate::errors::LedgerError;
use crate::events::{FundingDeposited, PoolCreated, RoundPauseToggled, RoundRegistered, StakingRoundUpdated};
use crate::guard::{ensure_active, with_guard};
use crate::registry;
use crate::settlement;
use crate::transfer::TokenVault;
use crate::{CreatePool, DepositFunding, RegisterRound, SetRoundPaused, UpdateStakingRound};

pub fn create_pool(
    ctx: Context<CreatePool>,
    name: String,
    is_staking: bool,
    initial_duration: u64,
    initial_multiplier: u64,
) -> Result<()> {
    require_keys_eq!(
        ctx.accounts.config.admin,
        ctx.accounts.admin.key(),
        LedgerError::Unauthorized
    );

    let now = Clock::get()?.unix_timestamp;
    let bump = ctx.bumps.pool;
    let pool = &mut ctx.accounts.pool;
    let event_name = name.clone();

    let pool_id = with_guard(&mut ctx.accounts.config, |cfg| {
        ensure_active(cfg)?;
        let pool_id = registry::take_pool_id(cfg)?;
        registry::init_pool(
            pool,
            pool_id,
            bump,
            name,
            is_staking,
            initial_duration,
            initial_multiplier,
            now,
        )?;
        Ok(pool_id)
    })?;

    msg!("pool {} created (staking={})", pool_id, is_staking);
    emit!(PoolCreated {
        pool_id,
        name: event_name,
        is_staking,
        duration: initial_duration,
        multiplier: initial_multiplier,
    });
    Ok(())
}

pub fn register_round(
    ctx: Context<RegisterRound>,
    pool_id: u64,
    root: [u8; 32],
    duration: u64,
    multiplier: u64,
    eligible_users: u64,
) -> Result<()> {
    require_keys_eq!(
        ctx.accounts.config.admin,
        ctx.accounts.admin.key(),
        LedgerError::Unauthorized
    );

    let now = Clock::get()?.unix_timestamp;
    let round_bump = ctx.bumps.round;
    let marker_bump = ctx.bumps.root_marker;
    let pool = &mut ctx.accounts.pool;
    let round = &mut ctx.accounts.round;

    let round_id = with_guard(&mut ctx.accounts.config, |cfg| {
        ensure_active(cfg)?;
        registry::register_round(
            pool,
            round,
            round_bump,
            root,
            duration,
            multiplier,
            eligible_users,
            now,
        )
    })?;

    let marker = &mut ctx.accounts.root_marker;
    marker.pool_id = pool_id;
    marker.round_id = round_id;
    marker.bump = marker_bump;

    emit!(RoundRegistered {
        pool_id,
        round_id,
        root,
        duration,
        multiplier,
        eligible_users,
    });
    Ok(())
}

pub fn update_staking_round(
    ctx: Context<UpdateStakingRound>,
    pool_id: u64,
    duration: u64,
    multiplier: u64,
) -> Result<()> {
    require_keys_eq!(
        ctx.accounts.config.admin,
        ctx.accounts.admin.key(),
        LedgerError::Unauthorized
    );

    let now = Clock::get()?.unix_timestamp;
    let bump = ctx.bumps.round;
    let pool = &mut ctx.accounts.pool;
    let round = &mut ctx.accounts.round;

    let round_id = with_guard(&mut ctx.accounts.config, |cfg| {
        ensure_active(cfg)?;
        registry::roll_staking_round(pool, round, bump, duration, multiplier, now)
    })?;

    msg!("pool {} rolled to staking round {}", pool_id, round_id);
    emit!(StakingRoundUpdated {
        pool_id,
        round_id,
        duration,
        multiplier,
    });
    Ok(())
}

pub fn set_round_paused(
    ctx: Context<SetRoundPaused>,
    pool_id: u64,
    round_id: u64,
    paused: bool,
) -> Result<()> {
    require_keys_eq!(
        ctx.accounts.config.admin,
        ctx.accounts.admin.key(),
        LedgerError::Unauthorized
    );

    let round = &mut ctx.accounts.round;
    with_guard(&mut ctx.accounts.config, |cfg| {
        ensure_active(cfg)?;
        registry::set_round_paused(round, paused)
    })?;

    emit!(RoundPauseToggled {
        pool_id,
        round_id,
        paused,
    });
    Ok(())
}

pub fn deposit_funding(mut ctx: Context<DepositFunding>, pool_id: u64, amount: u64) -> Result<()> {
    require_keys_eq!(
        ctx.accounts.config.admin,
        ctx.accounts.admin.key(),
        LedgerError::Unauthorized
    );

    let mut vault = TokenVault {
        token_program: ctx.accounts.token_program.to_account_info(),
        vault: ctx.accounts.vault.to_account_info(),
        vault_authority: ctx.accounts.config.to_account_info(),
        vault_authority_bump: ctx.accounts.config.bump,
        counterparty: ctx.accounts.admin_token.to_account_info(),
        counterparty_authority: ctx.accounts.admin.to_account_info(),
    };

    let accts = &mut ctx.accounts;
    let pending = settlement::deposit_funding(&mut accts.config, &mut accts.pool, amount)?;
    accts.pool.exit(&crate::ID)?;
    accts.config.exit(&crate::ID)?;
    settlement::settle(&mut accts.config, pending, &mut vault)?;

    emit!(FundingDeposited {
        pool_id,
        amount,
        funding_balance: accts.pool.funding_balance,
    });
    Ok(())
}
