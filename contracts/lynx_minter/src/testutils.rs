//! In-memory [`AssetLedger`] for exercising the flow without token contracts.

use soroban_sdk::{Address, Env, Map, Vec};

use crate::ledger::{AssetLedger, LedgerResponse};

/// Ledger state is held in host maps, so cloning the ledger is a snapshot.
#[derive(Clone)]
pub struct MockLedger {
    balances: Map<(Address, Address), i128>,
    allowances: Map<(Address, Address, Address), i128>,
    associations: Map<(Address, Address), bool>,
    supply_keys: Map<Address, Address>,
    failing_transfers: Vec<Address>,
    associate_enabled: bool,
    mint_enabled: bool,
    pub mint_calls: u32,
    pub associate_calls: u32,
}

impl MockLedger {
    pub fn new(env: &Env) -> Self {
        MockLedger {
            balances: Map::new(env),
            allowances: Map::new(env),
            associations: Map::new(env),
            supply_keys: Map::new(env),
            failing_transfers: Vec::new(env),
            associate_enabled: true,
            mint_enabled: true,
            mint_calls: 0,
            associate_calls: 0,
        }
    }

    pub fn set_balance(&mut self, asset: &Address, account: &Address, amount: i128) {
        self.balances.set((asset.clone(), account.clone()), amount);
    }

    pub fn approve(&mut self, asset: &Address, owner: &Address, spender: &Address, amount: i128) {
        self.allowances
            .set((asset.clone(), owner.clone(), spender.clone()), amount);
    }

    pub fn set_associated(&mut self, asset: &Address, account: &Address, associated: bool) {
        self.associations
            .set((asset.clone(), account.clone()), associated);
    }

    pub fn associate_all(&mut self, assets: &Vec<Address>, account: &Address) {
        for asset in assets.iter() {
            self.set_associated(&asset, account, true);
        }
    }

    pub fn set_holder(&mut self, asset: &Address, holder: &Address) {
        self.supply_keys.set(asset.clone(), holder.clone());
    }

    /// Every transfer of `asset` is rejected after preflight checks pass.
    pub fn fail_transfers_of(&mut self, asset: &Address) {
        self.failing_transfers.push_back(asset.clone());
    }

    pub fn disable_associate(&mut self) {
        self.associate_enabled = false;
    }

    pub fn disable_mint(&mut self) {
        self.mint_enabled = false;
    }

    fn move_balance(
        &mut self,
        asset: &Address,
        from: &Address,
        to: &Address,
        amount: i128,
    ) -> LedgerResponse {
        if self.failing_transfers.contains(asset) {
            return LedgerResponse::Failed;
        }
        if !self.is_associated(asset, from) || !self.is_associated(asset, to) {
            return LedgerResponse::NotAssociated;
        }
        let from_balance = self.balance(asset, from);
        if from_balance < amount {
            return LedgerResponse::InsufficientBalance;
        }
        let to_balance = self.balance(asset, to);
        self.set_balance(asset, from, from_balance - amount);
        self.set_balance(asset, to, to_balance + amount);
        LedgerResponse::Success
    }

    fn spend_allowance(
        &mut self,
        asset: &Address,
        owner: &Address,
        spender: &Address,
        amount: i128,
    ) -> LedgerResponse {
        let allowance = self.allowance(asset, owner, spender);
        if allowance < amount {
            return LedgerResponse::InsufficientAllowance;
        }
        self.approve(asset, owner, spender, allowance - amount);
        LedgerResponse::Success
    }
}

impl AssetLedger for MockLedger {
    fn balance(&self, asset: &Address, account: &Address) -> i128 {
        self.balances
            .get((asset.clone(), account.clone()))
            .unwrap_or(0)
    }

    fn allowance(&self, asset: &Address, owner: &Address, spender: &Address) -> i128 {
        self.allowances
            .get((asset.clone(), owner.clone(), spender.clone()))
            .unwrap_or(0)
    }

    fn is_associated(&self, asset: &Address, account: &Address) -> bool {
        self.associations
            .get((asset.clone(), account.clone()))
            .unwrap_or(false)
    }

    fn associate(&mut self, asset: &Address, account: &Address) -> LedgerResponse {
        self.associate_calls += 1;
        if !self.associate_enabled {
            return LedgerResponse::Unauthorized;
        }
        self.set_associated(asset, account, true);
        LedgerResponse::Success
    }

    fn transfer(
        &mut self,
        asset: &Address,
        from: &Address,
        to: &Address,
        amount: i128,
    ) -> LedgerResponse {
        self.move_balance(asset, from, to, amount)
    }

    fn transfer_from(
        &mut self,
        asset: &Address,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: i128,
    ) -> LedgerResponse {
        let snapshot = self.clone();
        let spent = self.spend_allowance(asset, from, spender, amount);
        if !spent.is_success() {
            return spent;
        }
        let moved = self.move_balance(asset, from, to, amount);
        if !moved.is_success() {
            *self = snapshot;
        }
        moved
    }

    fn mint(&mut self, asset: &Address, to: &Address, amount: i128) -> LedgerResponse {
        self.mint_calls += 1;
        if !self.mint_enabled {
            return LedgerResponse::Failed;
        }
        if !self.is_associated(asset, to) {
            return LedgerResponse::NotAssociated;
        }
        let balance = self.balance(asset, to);
        self.set_balance(asset, to, balance + amount);
        LedgerResponse::Success
    }

    fn burn_from(
        &mut self,
        asset: &Address,
        spender: &Address,
        from: &Address,
        amount: i128,
    ) -> LedgerResponse {
        let balance = self.balance(asset, from);
        if balance < amount {
            return LedgerResponse::InsufficientBalance;
        }
        let spent = self.spend_allowance(asset, from, spender, amount);
        if !spent.is_success() {
            return spent;
        }
        self.set_balance(asset, from, balance - amount);
        LedgerResponse::Success
    }

    fn supply_key_holder(&self, asset: &Address) -> Option<Address> {
        self.supply_keys.get(asset.clone())
    }

    fn set_supply_key_holder(&mut self, asset: &Address, holder: &Address) -> LedgerResponse {
        self.set_holder(asset, holder);
        LedgerResponse::Success
    }
}

/// Run `op` against `ledger` with transaction semantics: on `Err` every
/// change made by `op` is discarded.
pub fn atomically<T, E>(
    ledger: &mut MockLedger,
    op: impl FnOnce(&mut MockLedger) -> Result<T, E>,
) -> Result<T, E> {
    let snapshot = ledger.clone();
    let result = op(ledger);
    if result.is_err() {
        *ledger = snapshot;
    }
    result
}
