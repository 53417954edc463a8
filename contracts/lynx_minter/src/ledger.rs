//! Token-service capability used by every value-moving step.
//!
//! Mutating calls return a [`LedgerResponse`] instead of panicking so the
//! flow can classify the failure and name the asset it happened on.

use soroban_sdk::{
    token::{StellarAssetClient, TokenClient},
    Address, Env, Error,
};

use crate::error::MinterError;

/// Raw result of a ledger operation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LedgerResponse {
    Success,
    InsufficientBalance,
    InsufficientAllowance,
    NotAssociated,
    Unauthorized,
    Failed,
}

impl LedgerResponse {
    pub fn is_success(&self) -> bool {
        *self == LedgerResponse::Success
    }

    /// Error for a rejected transfer of an underlying or basket asset.
    pub fn transfer_error(&self) -> MinterError {
        match self {
            LedgerResponse::InsufficientAllowance => MinterError::InsufficientAllowance,
            LedgerResponse::NotAssociated => MinterError::TokenNotAssociated,
            _ => MinterError::TransferFailed,
        }
    }
}

pub trait AssetLedger {
    fn balance(&self, asset: &Address, account: &Address) -> i128;

    fn allowance(&self, asset: &Address, owner: &Address, spender: &Address) -> i128;

    /// Whether `account` may currently hold and move `asset`.
    fn is_associated(&self, asset: &Address, account: &Address) -> bool;

    fn associate(&mut self, asset: &Address, account: &Address) -> LedgerResponse;

    fn transfer(&mut self, asset: &Address, from: &Address, to: &Address, amount: i128)
        -> LedgerResponse;

    fn transfer_from(
        &mut self,
        asset: &Address,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: i128,
    ) -> LedgerResponse;

    /// Mint new supply of `asset` into `to`. Requires the supply key.
    fn mint(&mut self, asset: &Address, to: &Address, amount: i128) -> LedgerResponse;

    fn burn_from(
        &mut self,
        asset: &Address,
        spender: &Address,
        from: &Address,
        amount: i128,
    ) -> LedgerResponse;

    /// Current holder of the supply key, if the ledger reports one.
    fn supply_key_holder(&self, asset: &Address) -> Option<Address>;

    fn set_supply_key_holder(&mut self, asset: &Address, holder: &Address) -> LedgerResponse;
}

// Stellar Asset Contract error codes
const SAC_UNAUTHORIZED: u32 = 4;
const SAC_AUTHENTICATION: u32 = 5;
const SAC_ALLOWANCE: u32 = 9;
const SAC_BALANCE: u32 = 10;
const SAC_BALANCE_DEAUTHORIZED: u32 = 11;
const SAC_TRUSTLINE_MISSING: u32 = 13;

fn classify(err: Error) -> LedgerResponse {
    let codes = [
        (SAC_ALLOWANCE, LedgerResponse::InsufficientAllowance),
        (SAC_BALANCE, LedgerResponse::InsufficientBalance),
        (SAC_BALANCE_DEAUTHORIZED, LedgerResponse::NotAssociated),
        (SAC_TRUSTLINE_MISSING, LedgerResponse::NotAssociated),
        (SAC_UNAUTHORIZED, LedgerResponse::Unauthorized),
        (SAC_AUTHENTICATION, LedgerResponse::Unauthorized),
    ];
    for (code, response) in codes.iter() {
        if err == Error::from_contract_error(*code) {
            return *response;
        }
    }
    LedgerResponse::Failed
}

/// Maps a `try_*` client result onto a [`LedgerResponse`].
macro_rules! respond {
    ($call:expr) => {
        match $call {
            Ok(Ok(_)) => LedgerResponse::Success,
            Err(Ok(err)) => classify(err),
            _ => LedgerResponse::Failed,
        }
    };
}

/// [`AssetLedger`] backed by SEP-41 token contracts and the Stellar Asset
/// Contract admin interface.
pub struct SorobanLedger<'a> {
    env: &'a Env,
}

impl<'a> SorobanLedger<'a> {
    pub fn new(env: &'a Env) -> Self {
        SorobanLedger { env }
    }
}

impl AssetLedger for SorobanLedger<'_> {
    fn balance(&self, asset: &Address, account: &Address) -> i128 {
        match TokenClient::new(self.env, asset).try_balance(account) {
            Ok(Ok(balance)) => balance,
            _ => 0,
        }
    }

    fn allowance(&self, asset: &Address, owner: &Address, spender: &Address) -> i128 {
        match TokenClient::new(self.env, asset).try_allowance(owner, spender) {
            Ok(Ok(allowance)) => allowance,
            _ => 0,
        }
    }

    fn is_associated(&self, asset: &Address, account: &Address) -> bool {
        matches!(
            StellarAssetClient::new(self.env, asset).try_authorized(account),
            Ok(Ok(true))
        )
    }

    fn associate(&mut self, asset: &Address, account: &Address) -> LedgerResponse {
        // Only succeeds where this contract is the asset admin
        respond!(StellarAssetClient::new(self.env, asset).try_set_authorized(account, &true))
    }

    fn transfer(
        &mut self,
        asset: &Address,
        from: &Address,
        to: &Address,
        amount: i128,
    ) -> LedgerResponse {
        respond!(TokenClient::new(self.env, asset).try_transfer(from, to, &amount))
    }

    fn transfer_from(
        &mut self,
        asset: &Address,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: i128,
    ) -> LedgerResponse {
        respond!(TokenClient::new(self.env, asset).try_transfer_from(spender, from, to, &amount))
    }

    fn mint(&mut self, asset: &Address, to: &Address, amount: i128) -> LedgerResponse {
        respond!(StellarAssetClient::new(self.env, asset).try_mint(to, &amount))
    }

    fn burn_from(
        &mut self,
        asset: &Address,
        spender: &Address,
        from: &Address,
        amount: i128,
    ) -> LedgerResponse {
        respond!(TokenClient::new(self.env, asset).try_burn_from(spender, from, &amount))
    }

    fn supply_key_holder(&self, asset: &Address) -> Option<Address> {
        match StellarAssetClient::new(self.env, asset).try_admin() {
            Ok(Ok(admin)) => Some(admin),
            _ => None,
        }
    }

    fn set_supply_key_holder(&mut self, asset: &Address, holder: &Address) -> LedgerResponse {
        respond!(StellarAssetClient::new(self.env, asset).try_set_admin(holder))
    }
}
