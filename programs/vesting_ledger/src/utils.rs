use std::cell::{Ref, RefMut};

use anchor_lang::prelude::*;

use crate::{
    errors::LedgerError,
    state::{Pool, UserLedger},
};

// -----------------
// Seeds
// -----------------
pub const CONFIG_SEED: &[u8] = b"config_v1";
pub const VAULT_SEED: &[u8] = b"vault_v1";
pub const POOL_SEED: &[u8] = b"pool_v1";
pub const ROUND_SEED: &[u8] = b"round_v1";
pub const ROOT_SEED: &[u8] = b"root_v1";
pub const LEDGER_SEED: &[u8] = b"ledger_v1";
pub const JOIN_SEED: &[u8] = b"joined_v1";

pub fn pool_pda(pool_id: u64, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[POOL_SEED, &pool_id.to_le_bytes()], program_id)
}

pub fn ledger_pda(pool_id: u64, user: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[LEDGER_SEED, &pool_id.to_le_bytes(), user.as_ref()],
        program_id,
    )
}

// -------------------------
// remaining_accounts plumbing
// -------------------------

/// Deserializes a program-owned account passed through `remaining_accounts`.
pub fn load_account<T: AccountDeserialize>(ai: &AccountInfo, program_id: &Pubkey) -> Result<T> {
    require_keys_eq!(*ai.owner, *program_id, LedgerError::AccountNotOwnedByProgram);
    let data = borrow_data(ai)?;
    let mut slice: &[u8] = &data;
    let value = T::try_deserialize(&mut slice)?;
    Ok(value)
}

/// Writes an account loaded with `load_account` back to its data buffer.
pub fn store_account<T: AccountSerialize>(ai: &AccountInfo, value: &T) -> Result<()> {
    let mut data = borrow_data_mut(ai)?;
    let mut cursor = std::io::Cursor::new(&mut data[..]);
    value.try_serialize(&mut cursor)
}

pub fn borrow_data<'a, 'info>(ai: &'a AccountInfo<'info>) -> Result<Ref<'a, &'a mut [u8]>> {
    ai.try_borrow_data()
        .map_err(|_| error!(LedgerError::AccountBorrowFailed))
}

pub fn borrow_data_mut<'a, 'info>(ai: &'a AccountInfo<'info>) -> Result<RefMut<'a, &'info mut [u8]>> {
    ai.try_borrow_mut_data()
        .map_err(|_| error!(LedgerError::AccountBorrowFailed))
}

/// A (pool, user ledger header) pair taken from `remaining_accounts`.
/// Ledger entries stay in `ledger_ai`'s data.
pub struct LoadedPair<'a, 'info> {
    pub pool_ai: &'a AccountInfo<'info>,
    pub ledger_ai: &'a AccountInfo<'info>,
    pub pool: Pool,
    pub ledger: UserLedger,
}

/// Reads `[pool_0, ledger_0, pool_1, ledger_1, ...]`, checking PDAs against
/// `user`. Ordering rules are left to the caller.
pub fn load_pool_ledger_pairs<'a, 'info>(
    accounts: &'a [AccountInfo<'info>],
    user: &Pubkey,
    program_id: &Pubkey,
) -> Result<Vec<LoadedPair<'a, 'info>>> {
    require!(accounts.len() % 2 == 0, LedgerError::LedgerMismatch);

    let mut out = Vec::with_capacity(accounts.len() / 2);
    for pair in accounts.chunks(2) {
        let (pool_ai, ledger_ai) = (&pair[0], &pair[1]);

        let pool: Pool = load_account(pool_ai, program_id)?;
        let (expected_pool, _) = pool_pda(pool.pool_id, program_id);
        require_keys_eq!(expected_pool, *pool_ai.key, LedgerError::InvalidPool);

        let ledger: UserLedger = load_account(ledger_ai, program_id)?;
        let (expected_ledger, _) = ledger_pda(pool.pool_id, user, program_id);
        require_keys_eq!(expected_ledger, *ledger_ai.key, LedgerError::LedgerMismatch);

        out.push(LoadedPair {
            pool_ai,
            ledger_ai,
            pool,
            ledger,
        });
    }
    Ok(out)
}
