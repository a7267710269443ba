//! Token movements produced by ledger transitions
//!
//! State transitions never move tokens themselves. They finish every ledger
//! write and hand back a [`Settlement`]; the instruction handler executes it
//! last. Execution checks every collection and burn against what the payer
//! actually made available before the first CPI, so a short allowance fails
//! cleanly with `InsufficientApproval`.

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, Mint, MintTo, Token, TokenAccount, Transfer};

use crate::error::CharonError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Asset {
    Base,
    Synthetic,
    Share,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Party {
    /// Signer of the instruction
    Caller,
    Recipient,
    Relayer,
    Controller,
    /// The pool's own vault for the asset
    Pool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementKind {
    /// Party → pool vault, signed by the caller
    Collect,
    /// Pool vault → party, signed by the pool
    Pay,
    Mint,
    /// Destroy from the party's account, signed by the caller
    Burn,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Movement {
    pub kind: MovementKind,
    pub party: Party,
    pub asset: Asset,
    pub amount: u64,
}

/// Token operations a settlement needs.
pub trait TokenCapability {
    /// Amount the caller may collect or burn from `party`'s `asset` account.
    fn available(&self, party: Party, asset: Asset) -> Result<u64>;
    fn collect(&self, party: Party, asset: Asset, amount: u64) -> Result<()>;
    fn pay(&self, party: Party, asset: Asset, amount: u64) -> Result<()>;
    fn mint(&self, party: Party, asset: Asset, amount: u64) -> Result<()>;
    fn burn(&self, party: Party, asset: Asset, amount: u64) -> Result<()>;
}

#[must_use = "a settlement moves nothing until executed"]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Settlement {
    movements: Vec<Movement>,
}

impl Settlement {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, kind: MovementKind, party: Party, asset: Asset, amount: u64) -> Self {
        if amount > 0 {
            self.movements.push(Movement {
                kind,
                party,
                asset,
                amount,
            });
        }
        self
    }

    pub fn collect(self, party: Party, asset: Asset, amount: u64) -> Self {
        self.push(MovementKind::Collect, party, asset, amount)
    }

    pub fn pay(self, party: Party, asset: Asset, amount: u64) -> Self {
        self.push(MovementKind::Pay, party, asset, amount)
    }

    pub fn mint(self, party: Party, asset: Asset, amount: u64) -> Self {
        self.push(MovementKind::Mint, party, asset, amount)
    }

    pub fn burn(self, party: Party, asset: Asset, amount: u64) -> Self {
        self.push(MovementKind::Burn, party, asset, amount)
    }

    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    pub fn is_empty(&self) -> bool {
        self.movements.is_empty()
    }

    /// Total moved of one kind for a party and asset.
    pub fn total(&self, kind: MovementKind, party: Party, asset: Asset) -> u64 {
        self.movements
            .iter()
            .filter(|m| m.kind == kind && m.party == party && m.asset == asset)
            .fold(0u64, |acc, m| acc.saturating_add(m.amount))
    }

    /// Preflight every debit, then run the movements in order.
    pub fn execute<T: TokenCapability>(self, tokens: &T) -> Result<()> {
        self.preflight(tokens)?;

        for m in &self.movements {
            match m.kind {
                MovementKind::Collect => tokens.collect(m.party, m.asset, m.amount)?,
                MovementKind::Pay => tokens.pay(m.party, m.asset, m.amount)?,
                MovementKind::Mint => tokens.mint(m.party, m.asset, m.amount)?,
                MovementKind::Burn => tokens.burn(m.party, m.asset, m.amount)?,
            }
        }
        Ok(())
    }

    fn preflight<T: TokenCapability>(&self, tokens: &T) -> Result<()> {
        let mut debits: Vec<(Party, Asset, u64)> = Vec::new();
        for m in &self.movements {
            if !matches!(m.kind, MovementKind::Collect | MovementKind::Burn) {
                continue;
            }
            match debits
                .iter_mut()
                .find(|(party, asset, _)| *party == m.party && *asset == m.asset)
            {
                Some((_, _, total)) => {
                    *total = total
                        .checked_add(m.amount)
                        .ok_or(error!(CharonError::ArithmeticOverflow))?
                }
                None => debits.push((m.party, m.asset, m.amount)),
            }
        }

        for (party, asset, total) in debits {
            require!(
                tokens.available(party, asset)? >= total,
                CharonError::InsufficientApproval
            );
        }
        Ok(())
    }
}

/// Vault and mint accounts owned by the pool PDA.
pub struct PoolTokens<'a, 'info> {
    pub base_vault: Option<&'a Account<'info, TokenAccount>>,
    pub synthetic_vault: Option<&'a Account<'info, TokenAccount>>,
    pub synthetic_mint: Option<&'a Account<'info, Mint>>,
    pub share_mint: Option<&'a Account<'info, Mint>>,
}

/// [`TokenCapability`] over SPL token CPIs.
///
/// The caller signs collections and burns; the pool PDA signs payouts and
/// mints.
pub struct SplTokens<'a, 'info> {
    pub token_program: &'a Program<'info, Token>,
    pub caller: AccountInfo<'info>,
    pub pool: AccountInfo<'info>,
    pub pool_seeds: &'a [&'a [u8]],
    pub pool_tokens: PoolTokens<'a, 'info>,
    pub holders: Vec<(Party, Asset, &'a Account<'info, TokenAccount>)>,
}

impl<'a, 'info> SplTokens<'a, 'info> {
    fn holder(&self, party: Party, asset: Asset) -> Result<&'a Account<'info, TokenAccount>> {
        if party == Party::Pool {
            return self.vault(asset);
        }
        self.holders
            .iter()
            .find(|(p, a, _)| *p == party && *a == asset)
            .map(|(_, _, account)| *account)
            .ok_or(error!(CharonError::AccountMismatch))
    }

    fn vault(&self, asset: Asset) -> Result<&'a Account<'info, TokenAccount>> {
        let vault = match asset {
            Asset::Base => self.pool_tokens.base_vault,
            Asset::Synthetic => self.pool_tokens.synthetic_vault,
            Asset::Share => None,
        };
        vault.ok_or(error!(CharonError::AccountMismatch))
    }

    fn mint_account(&self, asset: Asset) -> Result<&'a Account<'info, Mint>> {
        let mint = match asset {
            Asset::Synthetic => self.pool_tokens.synthetic_mint,
            Asset::Share => self.pool_tokens.share_mint,
            Asset::Base => return err!(CharonError::InvalidMint),
        };
        mint.ok_or(error!(CharonError::AccountMismatch))
    }

    fn program(&self) -> AccountInfo<'info> {
        self.token_program.to_account_info()
    }
}

impl TokenCapability for SplTokens<'_, '_> {
    fn available(&self, party: Party, asset: Asset) -> Result<u64> {
        let account = self.holder(party, asset)?;
        if account.owner == self.caller.key() {
            return Ok(account.amount);
        }
        match account.delegate {
            anchor_lang::solana_program::program_option::COption::Some(delegate)
                if delegate == self.caller.key() =>
            {
                Ok(account.delegated_amount.min(account.amount))
            }
            _ => Ok(0),
        }
    }

    fn collect(&self, party: Party, asset: Asset, amount: u64) -> Result<()> {
        let from = self.holder(party, asset)?;
        let to = self.vault(asset)?;
        token::transfer(
            CpiContext::new(
                self.program(),
                Transfer {
                    from: from.to_account_info(),
                    to: to.to_account_info(),
                    authority: self.caller.clone(),
                },
            ),
            amount,
        )
    }

    fn pay(&self, party: Party, asset: Asset, amount: u64) -> Result<()> {
        let from = self.vault(asset)?;
        let to = self.holder(party, asset)?;
        let signer_seeds: &[&[&[u8]]] = &[self.pool_seeds];
        token::transfer(
            CpiContext::new_with_signer(
                self.program(),
                Transfer {
                    from: from.to_account_info(),
                    to: to.to_account_info(),
                    authority: self.pool.clone(),
                },
                signer_seeds,
            ),
            amount,
        )
    }

    fn mint(&self, party: Party, asset: Asset, amount: u64) -> Result<()> {
        let mint = self.mint_account(asset)?;
        let to = self.holder(party, asset)?;
        let signer_seeds: &[&[&[u8]]] = &[self.pool_seeds];
        token::mint_to(
            CpiContext::new_with_signer(
                self.program(),
                MintTo {
                    mint: mint.to_account_info(),
                    to: to.to_account_info(),
                    authority: self.pool.clone(),
                },
                signer_seeds,
            ),
            amount,
        )
    }

    fn burn(&self, party: Party, asset: Asset, amount: u64) -> Result<()> {
        let mint = self.mint_account(asset)?;
        let from = self.holder(party, asset)?;
        token::burn(
            CpiContext::new(
                self.program(),
                Burn {
                    mint: mint.to_account_info(),
                    from: from.to_account_info(),
                    authority: self.caller.clone(),
                },
            ),
            amount,
        )
    }
}
