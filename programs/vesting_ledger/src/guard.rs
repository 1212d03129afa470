use anchor_lang::prelude::*;

use crate::errors::LedgerError;
use crate::state::Config;

pub fn acquire(config: &mut Config) -> Result<()> {
    require!(!config.locked, LedgerError::Reentrancy);
    config.locked = true;
    Ok(())
}

pub fn release(config: &mut Config) {
    config.locked = false;
}

/// Runs `f` holding the config-wide reentrancy flag.
/// A nested call fails with `Reentrancy`; the flag is cleared on every exit path.
pub fn with_guard<T, F>(config: &mut Config, f: F) -> Result<T>
where
    F: FnOnce(&mut Config) -> Result<T>,
{
    acquire(config)?;
    let out = f(config);
    release(config);
    out
}

/// Like `with_guard`, but a successful `f` leaves the flag set. The caller
/// persists state while locked and then releases through `settlement::settle`.
pub fn hold<T, F>(config: &mut Config, f: F) -> Result<T>
where
    F: FnOnce(&mut Config) -> Result<T>,
{
    acquire(config)?;
    let out = f(config);
    if out.is_err() {
        release(config);
    }
    out
}

/// Global pause check shared by every mutating entry point.
pub fn ensure_active(config: &Config) -> Result<()> {
    require!(!config.paused, LedgerError::Paused);
    Ok(())
}
