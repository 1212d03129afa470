use anchor_lang::prelude::*;
use anchor_spl::token::{self, Transfer};

use crate::CONFIG_SEED;

/// Settlement-asset movements between the ledger vault and one counterparty.
/// Each call is all-or-nothing.
pub trait AssetTransfer {
    /// Vault -> counterparty.
    fn transfer(&mut self, amount: u64) -> Result<()>;
    /// Counterparty -> vault.
    fn transfer_from(&mut self, amount: u64) -> Result<()>;
}

/// SPL token vault owned by the config PDA.
pub struct TokenVault<'info> {
    pub token_program: AccountInfo<'info>,
    pub vault: AccountInfo<'info>,
    pub vault_authority: AccountInfo<'info>,
    pub vault_authority_bump: u8,
    pub counterparty: AccountInfo<'info>,
    /// Signs pulls from `counterparty`.
    pub counterparty_authority: AccountInfo<'info>,
}

impl<'info> AssetTransfer for TokenVault<'info> {
    fn transfer(&mut self, amount: u64) -> Result<()> {
        let signer_seeds: &[&[&[u8]]] = &[&[CONFIG_SEED, &[self.vault_authority_bump]]];
        token::transfer(
            CpiContext::new_with_signer(
                self.token_program.clone(),
                Transfer {
                    from: self.vault.clone(),
                    to: self.counterparty.clone(),
                    authority: self.vault_authority.clone(),
                },
                signer_seeds,
            ),
            amount,
        )
    }

    fn transfer_from(&mut self, amount: u64) -> Result<()> {
        token::transfer(
            CpiContext::new(
                self.token_program.clone(),
                Transfer {
                    from: self.counterparty.clone(),
                    to: self.vault.clone(),
                    authority: self.counterparty_authority.clone(),
                },
            ),
            amount,
        )
    }
}
