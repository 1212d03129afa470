use anchor_lang::prelude::*;

pub mod constants;
pub mod contexts;
pub mod errors;
pub mod events;
pub mod guard;
pub mod instructions;
pub mod join_gate;
pub mod ledger;
pub mod registry;
pub mod scheduler;
pub mod settlement;
pub mod solvency;
pub mod state;
pub mod transfer;
pub mod utils;

pub use constants::*;
pub use contexts::*;
pub use errors::*;
pub use events::*;
pub use join_gate::ProofNode;
pub use state::*;
pub use utils::*;

declare_id!("Db7TerH8aF193CWSUGDXynVazxFC7BWijkm3vgkRxK3C");

#[program]
pub mod vesting_ledger {
    use super::*;
    use crate::instructions::{admin, claim, pool, vesting, views};

    // ----------------------------
    // Config / admin
    // ----------------------------
    pub fn initialize_config(ctx: Context<InitializeConfig>) -> Result<()> {
        admin::initialize_config(ctx)
    }

    pub fn pause(ctx: Context<SetPause>) -> Result<()> {
        admin::set_pause(ctx, true)
    }

    pub fn unpause(ctx: Context<SetPause>) -> Result<()> {
        admin::set_pause(ctx, false)
    }

    pub fn set_claim_batch_limit(ctx: Context<SetClaimBatchLimit>, limit: u32) -> Result<()> {
        admin::set_claim_batch_limit(ctx, limit)
    }

    pub fn recover_asset(ctx: Context<RecoverAsset>, amount: u64) -> Result<()> {
        admin::recover_asset(ctx, amount)
    }

    // ----------------------------
    // Pools & rounds
    // ----------------------------
    pub fn create_pool(
        ctx: Context<CreatePool>,
        name: String,
        is_staking: bool,
        initial_duration: u64,
        initial_multiplier: u64,
    ) -> Result<()> {
        pool::create_pool(ctx, name, is_staking, initial_duration, initial_multiplier)
    }

    pub fn register_round(
        ctx: Context<RegisterRound>,
        pool_id: u64,
        root: [u8; 32],
        duration: u64,
        multiplier: u64,
        eligible_users: u64,
    ) -> Result<()> {
        pool::register_round(ctx, pool_id, root, duration, multiplier, eligible_users)
    }

    pub fn update_staking_round(
        ctx: Context<UpdateStakingRound>,
        pool_id: u64,
        duration: u64,
        multiplier: u64,
    ) -> Result<()> {
        pool::update_staking_round(ctx, pool_id, duration, multiplier)
    }

    pub fn set_round_paused(
        ctx: Context<SetRoundPaused>,
        pool_id: u64,
        round_id: u64,
        paused: bool,
    ) -> Result<()> {
        pool::set_round_paused(ctx, pool_id, round_id, paused)
    }

    pub fn deposit_funding(ctx: Context<DepositFunding>, pool_id: u64, amount: u64) -> Result<()> {
        pool::deposit_funding(ctx, pool_id, amount)
    }

    // ----------------------------
    // Vesting
    // ----------------------------
    pub fn open_user_ledger(ctx: Context<OpenUserLedger>, pool_id: u64) -> Result<()> {
        vesting::open_user_ledger(ctx, pool_id)
    }

    pub fn stake(ctx: Context<Stake>, pool_id: u64, amount: u64) -> Result<()> {
        vesting::stake(ctx, pool_id, amount)
    }

    pub fn join_and_start_vesting(
        ctx: Context<JoinAndStartVesting>,
        pool_id: u64,
        round_id: u64,
        base_amount: u64,
        proof: Vec<ProofNode>,
    ) -> Result<()> {
        vesting::join_and_start_vesting(ctx, pool_id, round_id, base_amount, proof)
    }

    // ----------------------------
    // Claims
    // ----------------------------
    pub fn claim_pool(ctx: Context<ClaimPool>, pool_id: u64, budget: u32) -> Result<()> {
        claim::claim_pool(ctx, pool_id, budget)
    }

    pub fn claim_all<'info>(ctx: Context<'_, '_, 'info, 'info, ClaimAll<'info>>) -> Result<()> {
        claim::claim_all(ctx)
    }

    // ----------------------------
    // Views
    // ----------------------------
    pub fn emit_global_stats(ctx: Context<ViewGlobal>) -> Result<()> {
        views::emit_global_stats(ctx)
    }

    pub fn emit_pool_stats(ctx: Context<ViewPool>, pool_id: u64) -> Result<()> {
        views::emit_pool_stats(ctx, pool_id)
    }

    pub fn emit_entry_count(ctx: Context<ViewUserLedger>, pool_id: u64) -> Result<()> {
        views::emit_entry_count(ctx, pool_id)
    }

    pub fn emit_joined_rounds(ctx: Context<ViewJoinRecord>, pool_id: u64) -> Result<()> {
        views::emit_joined_rounds(ctx, pool_id)
    }

    pub fn emit_claimable<'info>(ctx: Context<'_, '_, 'info, 'info, ViewUser<'info>>) -> Result<()> {
        views::emit_claimable(ctx)
    }

    pub fn emit_dashboard<'info>(
        ctx: Context<'_, '_, 'info, 'info, ViewUser<'info>>,
        offset: u64,
        limit: u32,
    ) -> Result<()> {
        views::emit_dashboard(ctx, offset, limit)
    }
}
