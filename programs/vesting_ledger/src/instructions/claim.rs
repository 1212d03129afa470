use anchor_lang::prelude::*;

use crate::errors::LedgerError;
use crate::events::ClaimSettled;
use crate::ledger::LedgerMut;
use crate::settlement::{self, PoolClaim};
use crate::transfer::TokenVault;
use crate::utils::{borrow_data_mut, load_pool_ledger_pairs, store_account};
use crate::{ClaimAll, ClaimPool};

pub fn claim_pool(mut ctx: Context<ClaimPool>, pool_id: u64, budget: u32) -> Result<()> {
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
        settlement::claim_pool(
            &mut accts.config,
            &mut accts.pool,
            &mut ledger,
            &user,
            budget,
            now,
        )?
    };

    // Persist with the guard held, then pay out.
    accts.pool.exit(&crate::ID)?;
    accts.config.exit(&crate::ID)?;
    let out = settlement::settle(&mut accts.config, pending, &mut vault)?;

    msg!(
        "claim: pool={} scanned={} released={} active={}",
        pool_id,
        out.scanned,
        out.released,
        accts.user_ledger.active_count
    );
    emit!(ClaimSettled {
        user,
        amount: out.released,
        entries_scanned: out.scanned,
    });
    Ok(())
}

pub fn claim_all<'info>(ctx: Context<'_, '_, 'info, 'info, ClaimAll<'info>>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let user = ctx.accounts.user.key();

    let mut pairs = load_pool_ledger_pairs(ctx.remaining_accounts, &user, ctx.program_id)?;
    for p in pairs.iter() {
        require!(
            p.pool_ai.is_writable && p.ledger_ai.is_writable,
            LedgerError::LedgerMismatch
        );
    }

    let mut vault = TokenVault {
        token_program: ctx.accounts.token_program.to_account_info(),
        vault: ctx.accounts.vault.to_account_info(),
        vault_authority: ctx.accounts.config.to_account_info(),
        vault_authority_bump: ctx.accounts.config.bump,
        counterparty: ctx.accounts.user_token.to_account_info(),
        counterparty_authority: ctx.accounts.user.to_account_info(),
    };

    // Ledger headers and slots are written in place by the claim itself.
    let ledger_ais: Vec<&AccountInfo<'info>> = pairs.iter().map(|p| p.ledger_ai).collect();
    let pending = {
        let mut data = ledger_ais
            .iter()
            .map(|ai| borrow_data_mut(ai))
            .collect::<Result<Vec<_>>>()?;
        let mut claims = Vec::with_capacity(pairs.len());
        for (p, d) in pairs.iter_mut().zip(data.iter_mut()) {
            claims.push(PoolClaim {
                pool: &mut p.pool,
                ledger: LedgerMut::new(&mut p.ledger, &mut d[..])?,
            });
        }
        settlement::claim_across_pools(&mut ctx.accounts.config, &mut claims, &user, now)?
    };

    for p in pairs.iter() {
        store_account(p.pool_ai, &p.pool)?;
    }
    ctx.accounts.config.exit(&crate::ID)?;
    let out = settlement::settle(&mut ctx.accounts.config, pending, &mut vault)?;

    for (pool_id, released) in out.per_pool.iter() {
        msg!("claim_all: pool={} released={}", pool_id, released);
    }
    emit!(ClaimSettled {
        user,
        amount: out.released,
        entries_scanned: out.scanned,
    });
    Ok(())
}
