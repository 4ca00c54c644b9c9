//! On-chain gateway.
//!
//! The vault PDA (`seeds = [b"vault"]`) holds native lamports directly and
//! owns one SPL token account per mint the route touches.
//!
//! `remaining_accounts` layout:
//!
//! * `[..settlement_count]` settlement accounts, resolved by key / owner /
//!   mint: vault token accounts, the caller's source token account, and the
//!   receiver and fee recipient (system account for native payouts, token
//!   account for token payouts).
//! * `[settlement_count..]` router windows, consumed in call order. Each
//!   window is `account_count` accounts: the router program first, then the
//!   accounts of its instruction. Forwarded native value is credited to the
//!   first account after the program before the CPI.
//!
//! Router CPIs are signed with the vault seeds, which is what authorises the
//! router to move the forwarded input out of the vault's token accounts.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::program::invoke_signed;
use anchor_lang::system_program;
use anchor_spl::token::{self, TokenAccount};

use crate::asset::Asset;
use crate::error::RouterError;
use crate::gateway::{AssetGateway, RouterCall};
use crate::guard::ReentrancyLock;
use crate::state::SwapLock;
use crate::{SwapAccounts, VAULT_SEED};

pub struct SolanaGateway<'a, 'info> {
    caller: AccountInfo<'info>,
    vault: AccountInfo<'info>,
    vault_bump: u8,
    swap_lock: &'a AccountLoader<'info, SwapLock>,
    token_program: AccountInfo<'info>,
    system_program: AccountInfo<'info>,
    settlement: &'a [AccountInfo<'info>],
    router_accounts: &'a [AccountInfo<'info>],
}

impl<'a, 'info> SolanaGateway<'a, 'info> {
    pub fn new(
        accounts: &'a SwapAccounts<'info>,
        remaining: &'a [AccountInfo<'info>],
        settlement_count: u8,
    ) -> Result<Self> {
        let settlement_count = settlement_count as usize;
        require!(
            settlement_count <= remaining.len(),
            RouterError::SettlementAccountMissing
        );
        let (settlement, router_accounts) = remaining.split_at(settlement_count);

        Ok(Self {
            caller: accounts.caller.to_account_info(),
            vault: accounts.vault.to_account_info(),
            vault_bump: accounts.config.vault_bump,
            swap_lock: &accounts.swap_lock,
            token_program: accounts.token_program.to_account_info(),
            system_program: accounts.system_program.to_account_info(),
            settlement,
            router_accounts,
        })
    }

    fn token_account_of(&self, owner: &Pubkey, mint: &Pubkey) -> Result<(AccountInfo<'info>, u64)> {
        find_token_account(self.settlement, owner, mint)
    }

    fn system_account(&self, key: &Pubkey) -> Result<AccountInfo<'info>> {
        find_system_account(self.settlement, key)
    }

    fn transfer_native_from_vault(&self, to: AccountInfo<'info>, amount: u64) -> Result<()> {
        let bump = [self.vault_bump];
        let seeds: &[&[u8]] = &[VAULT_SEED, &bump];
        system_program::transfer(
            CpiContext::new_with_signer(
                self.system_program.clone(),
                system_program::Transfer {
                    from: self.vault.clone(),
                    to,
                },
                &[seeds],
            ),
            amount,
        )
    }

    fn next_router_window(&mut self, count: usize) -> Result<&'a [AccountInfo<'info>]> {
        let (window, rest) = split_router_window(self.router_accounts, count)?;
        self.router_accounts = rest;
        Ok(window)
    }
}

impl<'a, 'info> AssetGateway for SolanaGateway<'a, 'info> {
    fn balance_of(&self, asset: Asset) -> Result<u64> {
        match asset {
            Asset::Native => Ok(self.vault.lamports()),
            Asset::Token(mint) => Ok(self.token_account_of(self.vault.key, &mint)?.1),
        }
    }

    fn pull_in(&mut self, asset: Asset, amount: u64) -> Result<()> {
        match asset {
            Asset::Native => system_program::transfer(
                CpiContext::new(
                    self.system_program.clone(),
                    system_program::Transfer {
                        from: self.caller.clone(),
                        to: self.vault.clone(),
                    },
                ),
                amount,
            ),
            Asset::Token(mint) => {
                let (source, _) = self.token_account_of(self.caller.key, &mint)?;
                let (vault_account, _) = self.token_account_of(self.vault.key, &mint)?;
                token::transfer(
                    CpiContext::new(
                        self.token_program.clone(),
                        token::Transfer {
                            from: source,
                            to: vault_account,
                            authority: self.caller.clone(),
                        },
                    ),
                    amount,
                )
            }
        }
    }

    fn pay_out(&mut self, asset: Asset, amount: u64, receiver: &Pubkey) -> Result<()> {
        match asset {
            Asset::Native => {
                let to = self.system_account(receiver)?;
                self.transfer_native_from_vault(to, amount)
            }
            Asset::Token(mint) => {
                let (vault_account, _) = self.token_account_of(self.vault.key, &mint)?;
                let (destination, _) = self.token_account_of(receiver, &mint)?;
                let bump = [self.vault_bump];
                let seeds: &[&[u8]] = &[VAULT_SEED, &bump];
                token::transfer(
                    CpiContext::new_with_signer(
                        self.token_program.clone(),
                        token::Transfer {
                            from: vault_account,
                            to: destination,
                            authority: self.vault.clone(),
                        },
                        &[seeds],
                    ),
                    amount,
                )
            }
        }
    }

    fn call_router(&mut self, call: &RouterCall<'_>) -> Result<()> {
        let window = self.next_router_window(call.account_count as usize)?;
        let accounts = router_accounts(window, &call.router)?;

        if call.native_value > 0 {
            let deposit = native_deposit_account(accounts)?;
            self.transfer_native_from_vault(deposit.clone(), call.native_value)?;
        }

        // Only the vault signs; the caller's signature never reaches a router.
        let metas: Vec<AccountMeta> = accounts
            .iter()
            .map(|ai| AccountMeta {
                pubkey: *ai.key,
                is_signer: ai.key == self.vault.key,
                is_writable: ai.is_writable,
            })
            .collect();
        let ix = Instruction {
            program_id: call.router,
            accounts: metas,
            data: call.data.to_vec(),
        };

        let mut infos = window.to_vec();
        infos.push(self.vault.clone());
        let bump = [self.vault_bump];
        let seeds: &[&[u8]] = &[VAULT_SEED, &bump];
        invoke_signed(&ix, &infos, &[seeds]).map_err(|e| {
            msg!("router {} reverted: {:?}", call.router, e);
            e
        })?;
        Ok(())
    }
}

impl<'a, 'info> ReentrancyLock for SolanaGateway<'a, 'info> {
    fn is_locked(&self) -> Result<bool> {
        Ok(self.swap_lock.load()?.locked != 0)
    }

    fn set_locked(&mut self, locked: bool) -> Result<()> {
        self.swap_lock.load_mut()?.locked = u8::from(locked);
        Ok(())
    }
}

// -------------------- Account resolution --------------------

fn read_token_account(ai: &AccountInfo<'_>) -> Option<TokenAccount> {
    if ai.owner != &token::ID {
        return None;
    }
    let data = ai.try_borrow_data().ok()?;
    TokenAccount::try_deserialize(&mut &data[..]).ok()
}

/// Settlement token account of `mint` owned by `owner`, with its current amount.
pub fn find_token_account<'info>(
    settlement: &[AccountInfo<'info>],
    owner: &Pubkey,
    mint: &Pubkey,
) -> Result<(AccountInfo<'info>, u64)> {
    settlement
        .iter()
        .find_map(|ai| {
            read_token_account(ai)
                .filter(|account| account.owner == *owner && account.mint == *mint)
                .map(|account| (ai.clone(), account.amount))
        })
        .ok_or_else(|| {
            msg!("missing token account: owner {} mint {}", owner, mint);
            error!(RouterError::SettlementAccountMissing)
        })
}

pub fn find_system_account<'info>(
    settlement: &[AccountInfo<'info>],
    key: &Pubkey,
) -> Result<AccountInfo<'info>> {
    settlement
        .iter()
        .find(|ai| ai.key == key)
        .cloned()
        .ok_or_else(|| {
            msg!("missing settlement account: {}", key);
            error!(RouterError::SettlementAccountMissing)
        })
}

/// Splits the next `count` accounts off the router section.
pub fn split_router_window<'a, 'info>(
    accounts: &'a [AccountInfo<'info>],
    count: usize,
) -> Result<(&'a [AccountInfo<'info>], &'a [AccountInfo<'info>])> {
    require!(
        count > 0 && accounts.len() >= count,
        RouterError::RouterAccountsMismatch
    );
    Ok(accounts.split_at(count))
}

/// Checks that `window` starts with the executable `router` program and
/// returns the instruction accounts after it.
pub fn router_accounts<'a, 'info>(
    window: &'a [AccountInfo<'info>],
    router: &Pubkey,
) -> Result<&'a [AccountInfo<'info>]> {
    let (program, accounts) = window
        .split_first()
        .ok_or(RouterError::RouterAccountsMismatch)?;
    if program.key != router || !program.executable {
        msg!(
            "router window starts with {}, expected executable {}",
            program.key,
            router
        );
        return err!(RouterError::ExternalCallReverted);
    }
    Ok(accounts)
}

/// Account credited with forwarded native value: the first one after the program.
pub fn native_deposit_account<'a, 'info>(
    accounts: &'a [AccountInfo<'info>],
) -> Result<&'a AccountInfo<'info>> {
    accounts
        .first()
        .ok_or_else(|| error!(RouterError::RouterAccountsMismatch))
}
