#![allow(deprecated)]
use anchor_lang::prelude::*;
use anchor_lang::system_program::System;
use anchor_spl::token::Token;

pub mod asset;
pub mod error;
pub mod executor;
pub mod fee;
pub mod gateway;
pub mod guard;
pub mod splice;
pub mod state;

#[cfg(test)]
mod mock;

use error::RouterError;
use gateway::solana::SolanaGateway;
use state::{Config, DexEntry, SwapLock};

declare_id!("B7YUFR4Y2ATfzETraj9W8d1j1YjFxe6jhNLHiXVBHP2f");

#[program]
pub mod swap_router {
    use super::*;

    /// Single-hop swap through one registered router.
    ///
    /// * `params` ‑ the route; `params.data` is forwarded to the router verbatim.
    /// * `native_value` ‑ lamports the caller attaches. Must equal
    ///   `params.amount_in` when the input is native and be zero otherwise.
    /// * `settlement_count` ‑ number of leading `remaining_accounts` holding
    ///   settlement accounts (see [`gateway::solana`]).
    ///
    /// The protocol fee is charged once, on the input or on the output
    /// depending on `params.fee_calc_direction`, and the output is measured
    /// from the vault's balance delta rather than trusted from the router.
    pub fn swap<'info>(
        ctx: Context<'_, '_, 'info, 'info, SwapAccounts<'info>>,
        params: SwapParams,
        native_value: u64,
        settlement_count: u8,
    ) -> Result<()> {
        let sender = ctx.accounts.caller.key();
        let cfg = ctx.accounts.config.clone().into_inner();
        let mut gateway =
            SolanaGateway::new(ctx.accounts, ctx.remaining_accounts, settlement_count)?;
        let event = executor::swap(&cfg, &mut gateway, sender, &params, native_value)?;
        emit!(event);
        Ok(())
    }

    /// Multi-hop swap. Each hop's call is rebuilt from its template with the
    /// amount the previous hop actually delivered.
    pub fn cross_dex_swap<'info>(
        ctx: Context<'_, '_, 'info, 'info, SwapAccounts<'info>>,
        params: CrossDexParams,
        native_value: u64,
        settlement_count: u8,
    ) -> Result<()> {
        let sender = ctx.accounts.caller.key();
        let cfg = ctx.accounts.config.clone().into_inner();
        let mut gateway =
            SolanaGateway::new(ctx.accounts, ctx.remaining_accounts, settlement_count)?;
        let event = executor::cross_dex_swap(&cfg, &mut gateway, sender, &params, native_value)?;
        emit!(event);
        Ok(())
    }

    pub fn initialize(
        ctx: Context<Initialize>,
        fee_to: Pubkey,
        default_fee_percentage: u64,
        dexes: Vec<DexEntry>,
    ) -> Result<()> {
        let mut cfg = Config::new(ctx.accounts.admin.key(), fee_to, default_fee_percentage)?;
        for entry in dexes {
            cfg.upsert_dex(entry.flag, entry.router)?;
        }
        cfg.bump = ctx.bumps.config;
        cfg.vault_bump = ctx.bumps.vault;
        ctx.accounts.config.set_inner(cfg);

        let mut lock = ctx.accounts.swap_lock.load_init()?;
        lock.locked = 0;
        lock.bump = ctx.bumps.swap_lock;
        msg!(
            "router initialized: fee_to {}, default fee {}",
            fee_to,
            default_fee_percentage
        );
        Ok(())
    }

    pub fn set_fee_to(ctx: Context<Admin>, fee_to: Pubkey) -> Result<()> {
        let cfg = &mut ctx.accounts.config;
        cfg.require_admin(&ctx.accounts.admin.key())?;
        cfg.fee_to = fee_to;
        Ok(())
    }

    pub fn set_default_fee_percentage(ctx: Context<Admin>, fee_percentage: u64) -> Result<()> {
        let cfg = &mut ctx.accounts.config;
        cfg.require_admin(&ctx.accounts.admin.key())?;
        cfg.set_default_fee_percentage(fee_percentage)
    }

    pub fn set_affiliate_fee_percentage(
        ctx: Context<Admin>,
        affiliate_code: u32,
        fee_percentage: u64,
    ) -> Result<()> {
        let cfg = &mut ctx.accounts.config;
        cfg.require_admin(&ctx.accounts.admin.key())?;
        cfg.set_affiliate_fee_percentage(affiliate_code, fee_percentage)
    }

    pub fn upsert_dexes(ctx: Context<Admin>, dexes: Vec<DexEntry>) -> Result<()> {
        let cfg = &mut ctx.accounts.config;
        cfg.require_admin(&ctx.accounts.admin.key())?;
        for entry in dexes {
            cfg.upsert_dex(entry.flag, entry.router)?;
            msg!("dex flag {} -> {}", entry.flag, entry.router);
        }
        Ok(())
    }

    pub fn pause(ctx: Context<Admin>) -> Result<()> {
        let cfg = &mut ctx.accounts.config;
        cfg.require_admin(&ctx.accounts.admin.key())?;
        cfg.paused = true;
        Ok(())
    }

    pub fn unpause(ctx: Context<Admin>) -> Result<()> {
        let cfg = &mut ctx.accounts.config;
        cfg.require_admin(&ctx.accounts.admin.key())?;
        cfg.paused = false;
        Ok(())
    }

    /// Instruction data matching no instruction. Empty data is a bare
    /// deposit and is accepted; anything else is an unknown function.
    pub fn fallback<'info>(
        _program_id: &Pubkey,
        _accounts: &'info [AccountInfo<'info>],
        data: &[u8],
    ) -> Result<()> {
        check_fallback(data)
    }
}

pub fn check_fallback(data: &[u8]) -> Result<()> {
    require!(data.is_empty(), RouterError::FunctionDoesNotExist);
    Ok(())
}

#[derive(Accounts)]
pub struct SwapAccounts<'info> {
    #[account(mut)]
    pub caller: Signer<'info>,

    /// Global protocol config
    #[account(seeds = [CONFIG_SEED], bump = config.bump)]
    pub config: Account<'info, Config>,

    #[account(mut, seeds = [LOCK_SEED], bump)]
    pub swap_lock: AccountLoader<'info, SwapLock>,

    /// Engine vault; holds lamports and owns the engine's token accounts.
    #[account(mut, seeds = [VAULT_SEED], bump = config.vault_bump)]
    pub vault: SystemAccount<'info>,

    // Programs
    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeeCalcDirection {
    /// Fee withheld from the input before the first router call.
    TokenIn,
    /// Fee taken from the measured output after the last router call.
    TokenOut,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct SwapParams {
    pub from_token: Pubkey, // NATIVE_SENTINEL for lamports
    pub to_token: Pubkey,
    pub receiver: Pubkey,
    pub amount_in: u64,
    pub dex_flag: u32,
    pub data: Vec<u8>, // Prebuilt router instruction data
    pub affiliate_code: u32,
    pub min_amount_out: u64,
    pub fee_calc_direction: FeeCalcDirection,
    pub account_count: u8, // Router window size in remaining_accounts
}

/// Call template for one hop of a cross-dex route.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct CallInfo {
    pub dex_flag: u32,
    pub from_token: Pubkey,
    pub to_token: Pubkey,
    pub selector: Vec<u8>,
    pub index: u32,       // Word index of the amount parameter
    pub params: Vec<u8>,  // Packed 32-byte words
    pub is_replace: bool, // Overwrite params[index] with the running amount
    pub account_count: u8,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct CrossDexParams {
    pub amount_in: u64,
    pub swap_list: Vec<CallInfo>,
    pub affiliate_code: u32,
    pub min_amount_out: u64,
    pub fee_calc_direction: FeeCalcDirection,
    pub receiver: Pubkey,
}

// -------------------- Events & Constants --------------------

/// `amount_in` is the caller's gross input, `amount_out` what the receiver
/// was credited after fees.
#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapSucceeded {
    pub sender: Pubkey,
    pub from_token: Pubkey,
    pub to_token: Pubkey,
    pub receiver: Pubkey,
    pub amount_in: u64,
    pub amount_out: u64,
}

/// Upper bound on route hops to keep compute and tx size predictable.
pub const MAX_HOPS: u8 = 10;

pub const CONFIG_SEED: &[u8] = b"config";
pub const LOCK_SEED: &[u8] = b"lock";
pub const VAULT_SEED: &[u8] = b"vault";

// -------------------- Governance Contexts --------------------

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(mut, signer)]
    pub admin: Signer<'info>,

    #[account(
        init,
        payer = admin,
        seeds = [CONFIG_SEED],
        bump,
        space = 8 + Config::INIT_SPACE,
    )]
    pub config: Account<'info, Config>,

    #[account(
        init,
        payer = admin,
        seeds = [LOCK_SEED],
        bump,
        space = 8 + std::mem::size_of::<SwapLock>(),
    )]
    pub swap_lock: AccountLoader<'info, SwapLock>,

    #[account(seeds = [VAULT_SEED], bump)]
    pub vault: SystemAccount<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct Admin<'info> {
    #[account(mut, seeds = [CONFIG_SEED], bump = config.bump)]
    pub config: Account<'info, Config>,
    #[account(signer)]
    pub admin: Signer<'info>,
}
