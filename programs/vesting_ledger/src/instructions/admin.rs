use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::LedgerError;
use crate::events::{AssetRecovered, BatchLimitChanged, PauseToggled};
use crate::guard::{ensure_active, with_guard};
use crate::registry;
use crate::settlement;
use crate::transfer::TokenVault;
use crate::{InitializeConfig, RecoverAsset, SetClaimBatchLimit, SetPause};

pub fn initialize_config(ctx: Context<InitializeConfig>) -> Result<()> {
    let mint = ctx.accounts.mint.key();
    require!(mint != Pubkey::default(), LedgerError::ZeroAddress);

    let cfg = &mut ctx.accounts.config;

    cfg.admin = ctx.accounts.admin.key();
    cfg.bump = ctx.bumps.config;

    cfg.mint = mint;
    cfg.vault = ctx.accounts.vault.key();
    cfg.vault_bump = ctx.bumps.vault;

    cfg.paused = false;
    cfg.locked = false;
    cfg.claim_batch_limit = DEFAULT_CLAIM_BATCH_LIMIT;
    cfg.next_pool_id = INITIAL_POOL_ID;

    cfg.total_vested_base = 0;
    cfg.total_committed = 0;
    cfg.total_claimed = 0;

    cfg.version = INITIAL_VERSION;

    msg!("ledger initialized: mint={} vault={}", cfg.mint, cfg.vault);
    Ok(())
}

/// Pause and unpause are the only admin actions accepted while paused.
pub fn set_pause(ctx: Context<SetPause>, paused: bool) -> Result<()> {
    let cfg = &mut ctx.accounts.config;
    require_keys_eq!(cfg.admin, ctx.accounts.admin.key(), LedgerError::Unauthorized);

    with_guard(cfg, |cfg| {
        cfg.paused = paused;
        Ok(())
    })?;

    emit!(PauseToggled { paused });
    Ok(())
}

pub fn set_claim_batch_limit(ctx: Context<SetClaimBatchLimit>, limit: u32) -> Result<()> {
    let cfg = &mut ctx.accounts.config;
    require_keys_eq!(cfg.admin, ctx.accounts.admin.key(), LedgerError::Unauthorized);

    let old_limit = cfg.claim_batch_limit;
    with_guard(cfg, |cfg| {
        ensure_active(cfg)?;
        registry::set_claim_batch_limit(cfg, limit)
    })?;

    emit!(BatchLimitChanged {
        old_limit,
        new_limit: limit,
    });
    Ok(())
}

pub fn recover_asset(ctx: Context<RecoverAsset>, amount: u64) -> Result<()> {
    require_keys_eq!(
        ctx.accounts.config.admin,
        ctx.accounts.admin.key(),
        LedgerError::Unauthorized
    );

    let mint = ctx.accounts.source.mint;
    if mint == ctx.accounts.config.mint {
        // Settlement-mint recoveries only come out of the vault.
        require_keys_eq!(
            ctx.accounts.source.key(),
            ctx.accounts.config.vault,
            LedgerError::LedgerMismatch
        );
    }

    let to = ctx.accounts.admin_token.key();
    let mut source = TokenVault {
        token_program: ctx.accounts.token_program.to_account_info(),
        vault: ctx.accounts.source.to_account_info(),
        vault_authority: ctx.accounts.config.to_account_info(),
        vault_authority_bump: ctx.accounts.config.bump,
        counterparty: ctx.accounts.admin_token.to_account_info(),
        counterparty_authority: ctx.accounts.admin.to_account_info(),
    };

    let balance = ctx.accounts.source.amount;
    let pending = settlement::recover_asset(&mut ctx.accounts.config, &mint, amount, balance)?;
    ctx.accounts.config.exit(&crate::ID)?;
    settlement::settle(&mut ctx.accounts.config, pending, &mut source)?;

    emit!(AssetRecovered { mint, to, amount });
    Ok(())
}
