//! In-memory ledger standing in for the runtime in unit tests.
//!
//! Balances are keyed by `(owner, asset)`. Routers are scripted: each one
//! reads its input amount either from a parameter word of the call data (so
//! the spliced value is what actually gets swapped) or from the forwarded
//! native value, pulls that input out of the vault and pays a fixed output
//! back into it.

use std::collections::HashMap;

use anchor_lang::prelude::*;

use crate::asset::Asset;
use crate::error::RouterError;
use crate::executor;
use crate::gateway::{AssetGateway, RouterCall};
use crate::guard::ReentrancyLock;
use crate::splice::WORD_SIZE;
use crate::state::Config;
use crate::SwapParams;

#[derive(Clone, Copy, Debug)]
pub enum RouterInput {
    /// Amount sits in this parameter word, after the selector.
    Word(usize),
    /// Amount is whatever native value was forwarded.
    NativeValue,
}

#[derive(Clone, Debug)]
pub enum Behaviour {
    Swap,
    Revert(u32),
    /// Takes this much of an asset out of the vault on top of the swap.
    Drain(Asset, u64),
    /// Calls back into `swap` before doing anything else.
    Reenter(Box<(Config, SwapParams)>),
}

#[derive(Clone, Debug)]
pub struct MockRouter {
    pub from: Asset,
    pub to: Asset,
    pub amount_out: u64,
    pub input: RouterInput,
    pub selector_len: usize,
    pub behaviour: Behaviour,
    pub seen_inputs: Vec<u64>,
}

impl MockRouter {
    pub fn new(from: Asset, to: Asset, amount_out: u64, input: RouterInput) -> Self {
        Self {
            from,
            to,
            amount_out,
            input,
            selector_len: 4,
            behaviour: Behaviour::Swap,
            seen_inputs: Vec::new(),
        }
    }

    pub fn with_behaviour(mut self, behaviour: Behaviour) -> Self {
        self.behaviour = behaviour;
        self
    }

    fn read_input(&self, call: &RouterCall<'_>) -> Result<u64> {
        match self.input {
            RouterInput::NativeValue => Ok(call.native_value),
            RouterInput::Word(index) => {
                let start = self.selector_len + index * WORD_SIZE;
                let word = call
                    .data
                    .get(start..start + WORD_SIZE)
                    .ok_or(ProgramError::InvalidInstructionData)?;
                let mut amount = [0u8; 8];
                amount.copy_from_slice(&word[WORD_SIZE - 8..]);
                Ok(u64::from_be_bytes(amount))
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct MockLedger {
    pub caller: Pubkey,
    pub vault: Pubkey,
    balances: HashMap<(Pubkey, Asset), u64>,
    routers: HashMap<Pubkey, MockRouter>,
    locked: bool,
}

impl MockLedger {
    pub fn new(caller: Pubkey) -> Self {
        Self {
            caller,
            vault: Pubkey::new_unique(),
            balances: HashMap::new(),
            routers: HashMap::new(),
            locked: false,
        }
    }

    pub fn mint(&mut self, owner: Pubkey, asset: Asset, amount: u64) {
        *self.balances.entry((owner, asset)).or_default() += amount;
    }

    pub fn balance(&self, owner: &Pubkey, asset: Asset) -> u64 {
        self.balances.get(&(*owner, asset)).copied().unwrap_or(0)
    }

    pub fn vault_balance(&self, asset: Asset) -> u64 {
        self.balance(&self.vault, asset)
    }

    pub fn add_router(&mut self, key: Pubkey, router: MockRouter) {
        self.routers.insert(key, router);
    }

    pub fn router(&self, key: &Pubkey) -> &MockRouter {
        &self.routers[key]
    }

    pub fn router_mut(&mut self, key: &Pubkey) -> &mut MockRouter {
        self.routers.get_mut(key).unwrap()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Bare native transfer into the vault, no instruction involved.
    pub fn deposit_native(&mut self, from: Pubkey, amount: u64) -> Result<()> {
        let vault = self.vault;
        self.transfer(from, vault, Asset::Native, amount)
    }

    pub fn transfer(&mut self, from: Pubkey, to: Pubkey, asset: Asset, amount: u64) -> Result<()> {
        let available = self.balance(&from, asset);
        if available < amount {
            return Err(ProgramError::InsufficientFunds.into());
        }
        self.balances.insert((from, asset), available - amount);
        *self.balances.entry((to, asset)).or_default() += amount;
        Ok(())
    }

    /// Runs `f` atomically: on error every balance and the lock are restored.
    pub fn transact<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let snapshot = self.clone();
        let outcome = f(self);
        if outcome.is_err() {
            *self = snapshot;
        }
        outcome
    }

    fn run_router(&mut self, key: Pubkey, router: &mut MockRouter, call: &RouterCall<'_>) -> Result<()> {
        let vault = self.vault;
        if call.native_value > 0 {
            self.transfer(vault, key, Asset::Native, call.native_value)?;
        }

        match &router.behaviour {
            Behaviour::Swap => {}
            Behaviour::Revert(code) => return Err(ProgramError::Custom(*code).into()),
            Behaviour::Drain(asset, amount) => self.transfer(vault, key, *asset, *amount)?,
            Behaviour::Reenter(inner) => {
                let (cfg, params) = inner.as_ref();
                let caller = self.caller;
                executor::swap(cfg, self, caller, params, 0)?;
            }
        }

        let amount_in = router.read_input(call)?;
        router.seen_inputs.push(amount_in);
        if !router.from.is_native() {
            self.transfer(vault, key, router.from, amount_in)?;
        }
        self.transfer(key, vault, router.to, router.amount_out)
    }
}

impl AssetGateway for MockLedger {
    fn balance_of(&self, asset: Asset) -> Result<u64> {
        Ok(self.vault_balance(asset))
    }

    fn pull_in(&mut self, asset: Asset, amount: u64) -> Result<()> {
        let (caller, vault) = (self.caller, self.vault);
        self.transfer(caller, vault, asset, amount)
    }

    fn pay_out(&mut self, asset: Asset, amount: u64, receiver: &Pubkey) -> Result<()> {
        let vault = self.vault;
        self.transfer(vault, *receiver, asset, amount)
    }

    fn call_router(&mut self, call: &RouterCall<'_>) -> Result<()> {
        let mut router = self
            .routers
            .remove(&call.router)
            .ok_or(RouterError::ExternalCallReverted)?;
        let outcome = self.run_router(call.router, &mut router, call);
        self.routers.insert(call.router, router);
        outcome
    }
}

impl ReentrancyLock for MockLedger {
    fn is_locked(&self) -> Result<bool> {
        Ok(self.locked)
    }

    fn set_locked(&mut self, locked: bool) -> Result<()> {
        self.locked = locked;
        Ok(())
    }
}
