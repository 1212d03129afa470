use anchor_lang::prelude::*;

#[error_code]
pub enum LedgerError {
    #[msg("Unauthorized")]
    Unauthorized,
    #[msg("Ledger paused")]
    Paused,
    #[msg("Reentrant call rejected")]
    Reentrancy,
    #[msg("Settlement requires the held guard")]
    GuardNotHeld,

    #[msg("Invalid pool")]
    InvalidPool,
    #[msg("Invalid round")]
    InvalidRound,
    #[msg("Round paused")]
    RoundPaused,
    #[msg("Operation not supported for this pool kind")]
    WrongPoolKind,

    #[msg("Amount must be > 0")]
    InvalidAmount,
    #[msg("Duration must be > 0")]
    InvalidDuration,
    #[msg("Multiplier must be > 0")]
    InvalidMultiplier,
    #[msg("Membership root must be non-zero")]
    InvalidRoot,
    #[msg("Eligible users must be > 0")]
    InvalidEligibleUsers,

    #[msg("Already joined this round")]
    AlreadyJoined,
    #[msg("Round eligibility cap reached")]
    EligibilityCapReached,
    #[msg("Membership proof rejected")]
    InvalidProof,

    #[msg("Nothing to claim")]
    NothingToClaim,
    #[msg("Invalid batch limit (must be 1..=500)")]
    InvalidBatchLimit,

    #[msg("Zero address not allowed")]
    ZeroAddress,
    #[msg("Pool name too long")]
    NameTooLong,

    #[msg("User ledger does not match user/pool")]
    LedgerMismatch,
    #[msg("Pools must be passed in strictly ascending id order")]
    PoolOrderViolation,
    #[msg("Account not owned by program")]
    AccountNotOwnedByProgram,
    #[msg("Failed to borrow account data")]
    AccountBorrowFailed,
    #[msg("Active index points outside the entry history")]
    InvalidEntryIndex,
    #[msg("User ledger account has no room for its entries")]
    LedgerTooSmall,

    #[msg("Recovery would leave the vault insolvent")]
    InsufficientSurplus,

    #[msg("Math overflow")]
    MathOverflow,
}

#[cfg(test)]
pub(crate) fn ledger_err(e: LedgerError) -> anchor_lang::error::Error {
    e.into()
}
