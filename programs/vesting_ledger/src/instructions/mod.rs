pub mod admin;
pub mod claim;
pub mod pool;
pub mod vesting;
pub mod views;
