// programs/vesting_ledger/src/contexts.rs

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::state::{Config, JoinRecord, Pool, RootMarker, Round, UserLedger};

// ----------------------------
// Config / admin
// ----------------------------

#[derive(Accounts)]
pub struct InitializeConfig<'info> {
    #[account(
        init,
        payer = admin,
        space = 8 + Config::INIT_SPACE,
        seeds = [crate::CONFIG_SEED],
        bump
    )]
    pub config: Account<'info, Config>,

    /// Settlement asset.
    pub mint: Account<'info, Mint>,

    /// Settlement vault, authority = config PDA
    #[account(
        init,
        payer = admin,
        seeds = [crate::VAULT_SEED],
        bump,
        token::mint = mint,
        token::authority = config
    )]
    pub vault: Account<'info, TokenAccount>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

#[derive(Accounts)]
pub struct SetPause<'info> {
    #[account(
        mut,
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    pub admin: Signer<'info>,
}

#[derive(Accounts)]
pub struct SetClaimBatchLimit<'info> {
    #[account(
        mut,
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    pub admin: Signer<'info>,
}

#[derive(Accounts)]
pub struct RecoverAsset<'info> {
    #[account(
        mut,
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    /// Any token account held by the config PDA (the vault included).
    #[account(
        mut,
        constraint = source.owner == config.key()
    )]
    pub source: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = admin_token.mint == source.mint,
        constraint = admin_token.owner == admin.key()
    )]
    pub admin_token: Account<'info, TokenAccount>,

    pub admin: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

// ----------------------------
// Pools & rounds
// ----------------------------

#[derive(Accounts)]
pub struct CreatePool<'info> {
    #[account(
        mut,
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        init,
        payer = admin,
        space = 8 + Pool::INIT_SPACE,
        seeds = [crate::POOL_SEED, config.next_pool_id.to_le_bytes().as_ref()],
        bump
    )]
    pub pool: Account<'info, Pool>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(pool_id: u64, root: [u8; 32])]
pub struct RegisterRound<'info> {
    #[account(
        mut,
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::POOL_SEED, pool_id.to_le_bytes().as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, Pool>,

    #[account(
        init,
        payer = admin,
        space = 8 + Round::INIT_SPACE,
        seeds = [
            crate::ROUND_SEED,
            pool_id.to_le_bytes().as_ref(),
            pool.current_round_id.saturating_add(1).to_le_bytes().as_ref(),
        ],
        bump
    )]
    pub round: Account<'info, Round>,

    /// Fails on `init` if this root was already used in the pool.
    #[account(
        init,
        payer = admin,
        space = 8 + RootMarker::INIT_SPACE,
        seeds = [crate::ROOT_SEED, pool_id.to_le_bytes().as_ref(), root.as_ref()],
        bump
    )]
    pub root_marker: Account<'info, RootMarker>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(pool_id: u64)]
pub struct UpdateStakingRound<'info> {
    #[account(
        mut,
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::POOL_SEED, pool_id.to_le_bytes().as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, Pool>,

    #[account(
        init,
        payer = admin,
        space = 8 + Round::INIT_SPACE,
        seeds = [
            crate::ROUND_SEED,
            pool_id.to_le_bytes().as_ref(),
            pool.current_round_id.saturating_add(1).to_le_bytes().as_ref(),
        ],
        bump
    )]
    pub round: Account<'info, Round>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(pool_id: u64, round_id: u64)]
pub struct SetRoundPaused<'info> {
    #[account(
        mut,
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [
            crate::ROUND_SEED,
            pool_id.to_le_bytes().as_ref(),
            round_id.to_le_bytes().as_ref(),
        ],
        bump = round.bump
    )]
    pub round: Account<'info, Round>,

    pub admin: Signer<'info>,
}

#[derive(Accounts)]
#[instruction(pool_id: u64)]
pub struct DepositFunding<'info> {
    #[account(
        mut,
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::POOL_SEED, pool_id.to_le_bytes().as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, Pool>,

    #[account(mut, address = config.vault)]
    pub vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = admin_token.mint == config.mint,
        constraint = admin_token.owner == admin.key()
    )]
    pub admin_token: Account<'info, TokenAccount>,

    pub admin: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

// ----------------------------
// User ledgers
// ----------------------------

#[derive(Accounts)]
#[instruction(pool_id: u64)]
pub struct OpenUserLedger<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        seeds = [crate::POOL_SEED, pool_id.to_le_bytes().as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, Pool>,

    #[account(
        init,
        payer = user,
        space = UserLedger::space(0),
        seeds = [crate::LEDGER_SEED, pool_id.to_le_bytes().as_ref(), user.key().as_ref()],
        bump
    )]
    pub user_ledger: Account<'info, UserLedger>,

    #[account(
        init,
        payer = user,
        space = JoinRecord::space(0),
        seeds = [crate::JOIN_SEED, pool_id.to_le_bytes().as_ref(), user.key().as_ref()],
        bump
    )]
    pub join_record: Account<'info, JoinRecord>,

    #[account(mut)]
    pub user: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(pool_id: u64)]
pub struct Stake<'info> {
    #[account(
        mut,
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::POOL_SEED, pool_id.to_le_bytes().as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, Pool>,

    #[account(
        seeds = [
            crate::ROUND_SEED,
            pool_id.to_le_bytes().as_ref(),
            pool.current_round_id.to_le_bytes().as_ref(),
        ],
        bump = round.bump
    )]
    pub round: Account<'info, Round>,

    #[account(
        mut,
        seeds = [crate::LEDGER_SEED, pool_id.to_le_bytes().as_ref(), user.key().as_ref()],
        bump = user_ledger.bump,
        realloc = user_ledger.space_after_append(),
        realloc::payer = user,
        realloc::zero = false
    )]
    pub user_ledger: Account<'info, UserLedger>,

    #[account(mut, address = config.vault)]
    pub vault: Account<'info, TokenAccount>,

    #[account(mut)]
    pub user: Signer<'info>,

    #[account(
        mut,
        constraint = user_token.mint == config.mint,
        constraint = user_token.owner == user.key()
    )]
    pub user_token: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(pool_id: u64, round_id: u64)]
pub struct JoinAndStartVesting<'info> {
    #[account(
        mut,
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::POOL_SEED, pool_id.to_le_bytes().as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, Pool>,

    #[account(
        mut,
        seeds = [
            crate::ROUND_SEED,
            pool_id.to_le_bytes().as_ref(),
            round_id.to_le_bytes().as_ref(),
        ],
        bump = round.bump
    )]
    pub round: Account<'info, Round>,

    #[account(
        mut,
        seeds = [crate::LEDGER_SEED, pool_id.to_le_bytes().as_ref(), user.key().as_ref()],
        bump = user_ledger.bump,
        realloc = user_ledger.space_after_append(),
        realloc::payer = user,
        realloc::zero = false
    )]
    pub user_ledger: Account<'info, UserLedger>,

    #[account(
        mut,
        seeds = [crate::JOIN_SEED, pool_id.to_le_bytes().as_ref(), user.key().as_ref()],
        bump = join_record.bump,
        realloc = join_record.space_for(round_id),
        realloc::payer = user,
        realloc::zero = false
    )]
    pub join_record: Account<'info, JoinRecord>,

    #[account(mut)]
    pub user: Signer<'info>,

    pub system_program: Program<'info, System>,
}

// ----------------------------
// Claims
// ----------------------------

#[derive(Accounts)]
#[instruction(pool_id: u64)]
pub struct ClaimPool<'info> {
    #[account(
        mut,
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::POOL_SEED, pool_id.to_le_bytes().as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, Pool>,

    #[account(
        mut,
        seeds = [crate::LEDGER_SEED, pool_id.to_le_bytes().as_ref(), user.key().as_ref()],
        bump = user_ledger.bump
    )]
    pub user_ledger: Account<'info, UserLedger>,

    #[account(mut, address = config.vault)]
    pub vault: Account<'info, TokenAccount>,

    pub user: Signer<'info>,

    #[account(
        mut,
        constraint = user_token.mint == config.mint,
        constraint = user_token.owner == user.key()
    )]
    pub user_token: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

/// Pools and ledgers arrive as writable `remaining_accounts` pairs
/// `[pool_0, ledger_0, pool_1, ledger_1, ...]`, ascending by pool id.
#[derive(Accounts)]
pub struct ClaimAll<'info> {
    #[account(
        mut,
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(mut, address = config.vault)]
    pub vault: Account<'info, TokenAccount>,

    pub user: Signer<'info>,

    #[account(
        mut,
        constraint = user_token.mint == config.mint,
        constraint = user_token.owner == user.key()
    )]
    pub user_token: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

// ----------------------------
// Views
// ----------------------------

#[derive(Accounts)]
pub struct ViewGlobal<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(address = config.vault)]
    pub vault: Account<'info, TokenAccount>,
}

#[derive(Accounts)]
#[instruction(pool_id: u64)]
pub struct ViewPool<'info> {
    #[account(
        seeds = [crate::POOL_SEED, pool_id.to_le_bytes().as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, Pool>,
}

#[derive(Accounts)]
#[instruction(pool_id: u64)]
pub struct ViewUserLedger<'info> {
    #[account(
        seeds = [crate::POOL_SEED, pool_id.to_le_bytes().as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, Pool>,

    #[account(
        seeds = [crate::LEDGER_SEED, pool_id.to_le_bytes().as_ref(), user.key().as_ref()],
        bump = user_ledger.bump
    )]
    pub user_ledger: Account<'info, UserLedger>,

    /// CHECK: only used as a PDA seed
    pub user: UncheckedAccount<'info>,
}

#[derive(Accounts)]
#[instruction(pool_id: u64)]
pub struct ViewJoinRecord<'info> {
    #[account(
        seeds = [crate::POOL_SEED, pool_id.to_le_bytes().as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, Pool>,

    #[account(
        seeds = [crate::JOIN_SEED, pool_id.to_le_bytes().as_ref(), user.key().as_ref()],
        bump = join_record.bump
    )]
    pub join_record: Account<'info, JoinRecord>,

    /// CHECK: only used as a PDA seed
    pub user: UncheckedAccount<'info>,
}

/// Pools and ledgers arrive as `remaining_accounts` pairs, ascending by pool id.
#[derive(Accounts)]
pub struct ViewUser<'info> {
    /// CHECK: only used as a PDA seed
    pub user: UncheckedAccount<'info>,
}
