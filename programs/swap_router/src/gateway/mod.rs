pub mod solana;

use anchor_lang::prelude::*;

use crate::{asset::Asset, error::RouterError};

/// One external router invocation.
#[derive(Clone, Debug)]
pub struct RouterCall<'d> {
    pub router: Pubkey,
    pub data: &'d [u8],
    /// Lamports handed to the router alongside the call.
    pub native_value: u64,
    /// Accounts the router instruction consumes, router program first.
    pub account_count: u8,
}

/// Moves assets between the caller, the engine vault, routers and receivers.
///
/// All balances are the vault's own holdings. Implementations must propagate
/// router failures unchanged.
pub trait AssetGateway {
    fn balance_of(&self, asset: Asset) -> Result<u64>;

    /// Caller -> vault.
    fn pull_in(&mut self, asset: Asset, amount: u64) -> Result<()>;

    /// Vault -> `receiver`.
    fn pay_out(&mut self, asset: Asset, amount: u64, receiver: &Pubkey) -> Result<()>;

    fn call_router(&mut self, call: &RouterCall<'_>) -> Result<()>;
}

/// Invokes a router and returns what it actually delivered in `receive`,
/// measured as the vault balance delta around the call. Whatever the router
/// reports about itself is ignored.
pub fn invoke_measured<G>(gateway: &mut G, call: &RouterCall<'_>, receive: Asset) -> Result<u64>
where
    G: AssetGateway + ?Sized,
{
    let before = gateway.balance_of(receive)?;
    gateway.call_router(call)?;
    let after = gateway.balance_of(receive)?;
    let received = after
        .checked_sub(before)
        .ok_or(RouterError::NumericalOverflow)?;
    msg!(
        "router {}: sent {} native, received {}",
        call.router,
        call.native_value,
        received
    );
    Ok(received)
}
