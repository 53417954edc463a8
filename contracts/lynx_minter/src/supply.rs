//! Basket token supply changes.
//!
//! Only the supply key holder may mint or burn, and the holder must be the
//! minter itself. The holder is read from the ledger on every call: the key
//! is moved by an out-of-band admin operation and can disappear silently.

use soroban_sdk::Address;

use crate::error::MinterError;
use crate::ledger::AssetLedger;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RejectReason {
    NotSupplyKeyHolder,
    LedgerMintFailed,
    LedgerBurnFailed,
}

impl From<RejectReason> for MinterError {
    fn from(reason: RejectReason) -> Self {
        match reason {
            RejectReason::NotSupplyKeyHolder => MinterError::NotSupplyKeyHolder,
            RejectReason::LedgerMintFailed => MinterError::MintFailed,
            RejectReason::LedgerBurnFailed => MinterError::BurnFailed,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MintOutcome {
    Minted,
    Rejected(RejectReason),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BurnOutcome {
    Burned,
    Rejected(RejectReason),
}

pub struct SupplyKeyGateway<'a> {
    basket: &'a Address,
    minter: &'a Address,
}

impl<'a> SupplyKeyGateway<'a> {
    pub fn new(basket: &'a Address, minter: &'a Address) -> Self {
        SupplyKeyGateway { basket, minter }
    }

    pub fn holds_supply_key<L: AssetLedger>(&self, ledger: &L) -> bool {
        ledger.supply_key_holder(self.basket).as_ref() == Some(self.minter)
    }

    pub fn verify_supply_key_holder<L: AssetLedger>(&self, ledger: &L) -> Result<(), MinterError> {
        if !self.holds_supply_key(ledger) {
            return Err(MinterError::NotSupplyKeyHolder);
        }
        Ok(())
    }

    /// Mint `amount` into the minter's own custody.
    pub fn mint<L: AssetLedger>(&self, ledger: &mut L, amount: i128) -> MintOutcome {
        if !self.holds_supply_key(ledger) {
            return MintOutcome::Rejected(RejectReason::NotSupplyKeyHolder);
        }
        let before = ledger.balance(self.basket, self.minter);
        if !ledger.mint(self.basket, self.minter, amount).is_success() {
            return MintOutcome::Rejected(RejectReason::LedgerMintFailed);
        }
        // A mint that reports success must land in custody
        if before.checked_add(amount) != Some(ledger.balance(self.basket, self.minter)) {
            return MintOutcome::Rejected(RejectReason::LedgerMintFailed);
        }
        MintOutcome::Minted
    }

    /// Burn `amount` from `holder` against the holder's allowance to the minter.
    pub fn burn_from<L: AssetLedger>(
        &self,
        ledger: &mut L,
        holder: &Address,
        amount: i128,
    ) -> BurnOutcome {
        if !self.holds_supply_key(ledger) {
            return BurnOutcome::Rejected(RejectReason::NotSupplyKeyHolder);
        }
        if !ledger
            .burn_from(self.basket, self.minter, holder, amount)
            .is_success()
        {
            return BurnOutcome::Rejected(RejectReason::LedgerBurnFailed);
        }
        BurnOutcome::Burned
    }

    /// Move the supply key to `new_holder`. The minter loses mint authority.
    pub fn hand_over<L: AssetLedger>(
        &self,
        ledger: &mut L,
        new_holder: &Address,
    ) -> Result<(), MinterError> {
        self.verify_supply_key_holder(ledger)?;
        if !ledger
            .set_supply_key_holder(self.basket, new_holder)
            .is_success()
        {
            return Err(MinterError::NotSupplyKeyHolder);
        }
        Ok(())
    }
}
