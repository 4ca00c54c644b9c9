//! Swap state machines.
//!
//! `Validate -> ChargeFeeIfTokenIn -> Execute -> ChargeFeeIfTokenOut -> Settle`
//!
//! Both entrypoints are generic over the gateway so the same code drives the
//! on-chain CPI gateway and the in-memory ledger used by the tests. Any error
//! aborts the invocation; rolling back what already moved is the runtime's job.

use anchor_lang::prelude::*;

use crate::asset::Asset;
use crate::error::RouterError;
use crate::fee::{compute_fee, split_fee};
use crate::gateway::{invoke_measured, AssetGateway, RouterCall};
use crate::guard::{non_reentrant, ReentrancyLock};
use crate::splice::build_call;
use crate::state::Config;
use crate::{CrossDexParams, FeeCalcDirection, SwapParams, SwapSucceeded, MAX_HOPS};

/// Single-hop swap through the router registered under `params.dex_flag`.
pub fn swap<G>(
    cfg: &Config,
    gateway: &mut G,
    sender: Pubkey,
    params: &SwapParams,
    native_value: u64,
) -> Result<SwapSucceeded>
where
    G: AssetGateway + ReentrancyLock,
{
    non_reentrant(gateway, |gateway| {
        execute_swap(cfg, gateway, sender, params, native_value)
    })
}

/// Multi-hop swap; each hop's measured output feeds the next hop's call.
pub fn cross_dex_swap<G>(
    cfg: &Config,
    gateway: &mut G,
    sender: Pubkey,
    params: &CrossDexParams,
    native_value: u64,
) -> Result<SwapSucceeded>
where
    G: AssetGateway + ReentrancyLock,
{
    non_reentrant(gateway, |gateway| {
        execute_cross_dex_swap(cfg, gateway, sender, params, native_value)
    })
}

fn execute_swap<G>(
    cfg: &Config,
    gateway: &mut G,
    sender: Pubkey,
    params: &SwapParams,
    native_value: u64,
) -> Result<SwapSucceeded>
where
    G: AssetGateway + ?Sized,
{
    require!(!cfg.paused, RouterError::Paused);

    let from = Asset::from_wire(params.from_token);
    let to = Asset::from_wire(params.to_token);
    require!(from != to, RouterError::InvalidTokenPair);
    check_native_value(from, params.amount_in, native_value)?;
    let router = cfg.lookup_dex(params.dex_flag)?;
    let fee_percentage = cfg.resolve_fee_percentage(params.affiliate_code);

    gateway.pull_in(from, params.amount_in)?;
    let amount_to_swap = charge_fee_on_input(
        cfg,
        gateway,
        from,
        params.amount_in,
        fee_percentage,
        params.fee_calc_direction,
    )?;

    let call = RouterCall {
        router,
        data: &params.data,
        native_value: if from.is_native() { amount_to_swap } else { 0 },
        account_count: params.account_count,
    };
    let amount_out = invoke_measured(gateway, &call, to)?;
    require!(amount_out > 0, RouterError::AmountOutZero);

    let net_out = settle(
        cfg,
        gateway,
        to,
        amount_out,
        fee_percentage,
        params.fee_calc_direction,
        params.min_amount_out,
        &params.receiver,
    )?;

    Ok(SwapSucceeded {
        sender,
        from_token: params.from_token,
        to_token: params.to_token,
        receiver: params.receiver,
        amount_in: params.amount_in,
        amount_out: net_out,
    })
}

fn execute_cross_dex_swap<G>(
    cfg: &Config,
    gateway: &mut G,
    sender: Pubkey,
    params: &CrossDexParams,
    native_value: u64,
) -> Result<SwapSucceeded>
where
    G: AssetGateway + ?Sized,
{
    require!(!cfg.paused, RouterError::Paused);

    let (first, last) = match (params.swap_list.first(), params.swap_list.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return err!(RouterError::EmptySwapList),
    };
    require!(
        params.swap_list.len() <= MAX_HOPS as usize,
        RouterError::TooManyHops
    );

    let from = Asset::from_wire(first.from_token);
    let to = Asset::from_wire(last.to_token);
    check_native_value(from, params.amount_in, native_value)?;

    // Resolve every hop before moving funds so a bad route fails without
    // touching the caller's balance.
    let mut routers = Vec::with_capacity(params.swap_list.len());
    let mut prev_out: Option<Pubkey> = None;
    for hop in &params.swap_list {
        if let Some(prev) = prev_out {
            require_keys_eq!(hop.from_token, prev, RouterError::HopTokenMismatch);
        }
        require!(
            hop.from_token != hop.to_token,
            RouterError::InvalidTokenPair
        );
        routers.push(cfg.lookup_dex(hop.dex_flag)?);
        prev_out = Some(hop.to_token);
    }
    let fee_percentage = cfg.resolve_fee_percentage(params.affiliate_code);

    gateway.pull_in(from, params.amount_in)?;
    let mut running = charge_fee_on_input(
        cfg,
        gateway,
        from,
        params.amount_in,
        fee_percentage,
        params.fee_calc_direction,
    )?;

    for (i, (hop, router)) in params.swap_list.iter().zip(routers).enumerate() {
        let data = build_call(hop, running)?;
        let hop_from = Asset::from_wire(hop.from_token);
        let call = RouterCall {
            router,
            data: &data,
            native_value: if hop_from.is_native() { running } else { 0 },
            account_count: hop.account_count,
        };
        msg!("hop {}: dex flag {}, amount in {}", i, hop.dex_flag, running);
        running = invoke_measured(gateway, &call, Asset::from_wire(hop.to_token))?;
    }

    let amount_out = running;
    require!(amount_out > 0, RouterError::AmountOutZero);

    let net_out = settle(
        cfg,
        gateway,
        to,
        amount_out,
        fee_percentage,
        params.fee_calc_direction,
        params.min_amount_out,
        &params.receiver,
    )?;

    Ok(SwapSucceeded {
        sender,
        from_token: first.from_token,
        to_token: last.to_token,
        receiver: params.receiver,
        amount_in: params.amount_in,
        amount_out: net_out,
    })
}

/// Native input must arrive as exactly `amount_in` lamports; token input
/// must arrive with none.
fn check_native_value(from: Asset, amount_in: u64, native_value: u64) -> Result<()> {
    let expected = if from.is_native() { amount_in } else { 0 };
    require!(
        native_value == expected,
        RouterError::IncorrectNativeValueSent
    );
    Ok(())
}

/// Withholds the TokenIn fee and returns what is left for the first router.
fn charge_fee_on_input<G>(
    cfg: &Config,
    gateway: &mut G,
    from: Asset,
    amount_in: u64,
    fee_percentage: u64,
    direction: FeeCalcDirection,
) -> Result<u64>
where
    G: AssetGateway + ?Sized,
{
    if direction != FeeCalcDirection::TokenIn {
        return Ok(amount_in);
    }
    let (fee, amount_to_swap) = split_fee(amount_in, fee_percentage)?;
    if fee > 0 {
        gateway.pay_out(from, fee, &cfg.fee_to)?;
    }
    msg!("fee on input: {}, forwarding {}", fee, amount_to_swap);
    Ok(amount_to_swap)
}

/// Applies the TokenOut fee, enforces the slippage guard and pays the
/// receiver. Returns the net amount credited.
#[allow(clippy::too_many_arguments)]
fn settle<G>(
    cfg: &Config,
    gateway: &mut G,
    to: Asset,
    amount_out: u64,
    fee_percentage: u64,
    direction: FeeCalcDirection,
    min_amount_out: u64,
    receiver: &Pubkey,
) -> Result<u64>
where
    G: AssetGateway + ?Sized,
{
    let (fee, net_out) = match direction {
        FeeCalcDirection::TokenOut => {
            let fee = compute_fee(amount_out, fee_percentage)?;
            let net_out = amount_out
                .checked_sub(fee)
                .ok_or(RouterError::NumericalOverflow)?;
            (fee, net_out)
        }
        FeeCalcDirection::TokenIn => (0, amount_out),
    };
    require!(
        net_out >= min_amount_out,
        RouterError::MinimumAmountNotMet
    );

    if fee > 0 {
        gateway.pay_out(to, fee, &cfg.fee_to)?;
    }
    gateway.pay_out(to, net_out, receiver)?;
    msg!(
        "settled: amount out {}, fee on output {}, paid {}",
        amount_out,
        fee,
        net_out
    );
    Ok(net_out)
}
