//! Multi-asset deposit pulls and payouts.
//!
//! Assets are always walked in ratio table order. The first rejected
//! transfer stops the walk; earlier transfers of the same call are undone by
//! the ledger when the call returns an error.

use soroban_sdk::{Address, Vec};

use crate::error::MinterError;
use crate::ledger::AssetLedger;
use crate::ratio::RatioTable;

/// First transfer that could not be made.
/// `asset_index` is `None` for the basket token.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransferFailure {
    pub asset_index: Option<u32>,
    pub asset: Address,
    pub amount: i128,
    pub error: MinterError,
}

pub struct AssetTransferEngine<'a> {
    custody: &'a Address,
}

impl<'a> AssetTransferEngine<'a> {
    pub fn new(custody: &'a Address) -> Self {
        AssetTransferEngine { custody }
    }

    /// Balance and allowance checks for every deposit, before anything moves.
    pub fn preflight_pull<L: AssetLedger>(
        &self,
        ledger: &L,
        payer: &Address,
        table: &RatioTable,
        amounts: &Vec<i128>,
    ) -> Result<(), TransferFailure> {
        for (index, (asset, amount)) in table.assets.iter().zip(amounts.iter()).enumerate() {
            if amount == 0 {
                continue;
            }
            let fail = |error| TransferFailure {
                asset_index: Some(index as u32),
                asset: asset.clone(),
                amount,
                error,
            };
            if ledger.allowance(&asset, payer, self.custody) < amount {
                return Err(fail(MinterError::InsufficientAllowance));
            }
            if ledger.balance(&asset, payer) < amount {
                return Err(fail(MinterError::TransferFailed));
            }
        }
        Ok(())
    }

    /// Pull every deposit from `payer` into custody.
    pub fn pull_deposits<L: AssetLedger>(
        &self,
        ledger: &mut L,
        payer: &Address,
        table: &RatioTable,
        amounts: &Vec<i128>,
    ) -> Result<(), TransferFailure> {
        for (index, (asset, amount)) in table.assets.iter().zip(amounts.iter()).enumerate() {
            if amount == 0 {
                continue;
            }
            let response = ledger.transfer_from(&asset, self.custody, payer, self.custody, amount);
            if !response.is_success() {
                return Err(TransferFailure {
                    asset_index: Some(index as u32),
                    asset,
                    amount,
                    error: response.transfer_error(),
                });
            }
        }
        Ok(())
    }

    /// Custody must cover every release before the basket token is burned.
    pub fn preflight_release<L: AssetLedger>(
        &self,
        ledger: &L,
        table: &RatioTable,
        amounts: &Vec<i128>,
    ) -> Result<(), TransferFailure> {
        for (index, (asset, amount)) in table.assets.iter().zip(amounts.iter()).enumerate() {
            if amount > 0 && ledger.balance(&asset, self.custody) < amount {
                return Err(TransferFailure {
                    asset_index: Some(index as u32),
                    asset,
                    amount,
                    error: MinterError::TransferFailed,
                });
            }
        }
        Ok(())
    }

    /// Release underlying assets from custody to `recipient`.
    pub fn release_deposits<L: AssetLedger>(
        &self,
        ledger: &mut L,
        recipient: &Address,
        table: &RatioTable,
        amounts: &Vec<i128>,
    ) -> Result<(), TransferFailure> {
        for (index, (asset, amount)) in table.assets.iter().zip(amounts.iter()).enumerate() {
            if amount == 0 {
                continue;
            }
            let response = ledger.transfer(&asset, self.custody, recipient, amount);
            if !response.is_success() {
                return Err(TransferFailure {
                    asset_index: Some(index as u32),
                    asset,
                    amount,
                    error: response.transfer_error(),
                });
            }
        }
        Ok(())
    }

    /// Send freshly minted basket tokens from custody to `recipient` and
    /// confirm they arrived.
    pub fn push_minted_asset<L: AssetLedger>(
        &self,
        ledger: &mut L,
        basket: &Address,
        recipient: &Address,
        amount: i128,
    ) -> Result<(), TransferFailure> {
        let fail = |error| TransferFailure {
            asset_index: None,
            asset: basket.clone(),
            amount,
            error,
        };
        if recipient == self.custody {
            return Ok(());
        }

        let before = ledger.balance(basket, recipient);
        let response = ledger.transfer(basket, self.custody, recipient, amount);
        if !response.is_success() {
            return Err(fail(response.transfer_error()));
        }
        if before.checked_add(amount) != Some(ledger.balance(basket, recipient)) {
            return Err(fail(MinterError::TransferFailed));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testutils::{atomically, MockLedger};
    use soroban_sdk::{testutils::Address as _, vec, Env};

    struct Fixture {
        env: Env,
        ledger: MockLedger,
        table: RatioTable,
        custody: Address,
        payer: Address,
    }

    fn setup() -> Fixture {
        let env = Env::default();
        let mut ledger = MockLedger::new(&env);
        let native = Address::generate(&env);
        let a = Address::generate(&env);
        let b = Address::generate(&env);
        let table =
            RatioTable::new(&env, native, vec![&env, a, b], vec![&env, 10, 5, 2]).unwrap();
        let custody = Address::generate(&env);
        let payer = Address::generate(&env);

        ledger.associate_all(&table.assets, &custody);
        ledger.associate_all(&table.assets, &payer);
        for asset in table.assets.iter() {
            ledger.set_balance(&asset, &payer, 1_000);
            ledger.approve(&asset, &payer, &custody, 1_000);
        }
        Fixture {
            env,
            ledger,
            table,
            custody,
            payer,
        }
    }

    #[test]
    fn test_pull_moves_every_asset() {
        let mut f = setup();
        let engine = AssetTransferEngine::new(&f.custody);
        let amounts = vec![&f.env, 10, 5, 2];

        engine
            .preflight_pull(&f.ledger, &f.payer, &f.table, &amounts)
            .unwrap();
        engine
            .pull_deposits(&mut f.ledger, &f.payer, &f.table, &amounts)
            .unwrap();

        for (asset, amount) in f.table.assets.iter().zip(amounts.iter()) {
            assert_eq!(f.ledger.balance(&asset, &f.custody), amount);
            assert_eq!(f.ledger.balance(&asset, &f.payer), 1_000 - amount);
        }
    }

    #[test]
    fn test_preflight_names_first_failing_asset() {
        let mut f = setup();
        let b = f.table.asset(2).unwrap();
        f.ledger.approve(&b, &f.payer, &f.custody, 1);
        let engine = AssetTransferEngine::new(&f.custody);

        let failure = engine
            .preflight_pull(&f.ledger, &f.payer, &f.table, &vec![&f.env, 10, 5, 2])
            .unwrap_err();
        assert_eq!(failure.asset_index, Some(2));
        assert_eq!(failure.asset, b);
        assert_eq!(failure.error, MinterError::InsufficientAllowance);

        let a = f.table.asset(1).unwrap();
        f.ledger.set_balance(&a, &f.payer, 4);
        let failure = engine
            .preflight_pull(&f.ledger, &f.payer, &f.table, &vec![&f.env, 10, 5, 2])
            .unwrap_err();
        assert_eq!(failure.asset_index, Some(1));
        assert_eq!(failure.error, MinterError::TransferFailed);
    }

    #[test]
    fn test_mid_sequence_failure_leaves_no_custody_change() {
        let mut f = setup();
        let a = f.table.asset(1).unwrap();
        f.ledger.fail_transfers_of(&a);
        let engine = AssetTransferEngine::new(&f.custody);
        let amounts = vec![&f.env, 10, 5, 2];

        let failure = atomically(&mut f.ledger, |ledger| {
            engine.pull_deposits(ledger, &f.payer, &f.table, &amounts)
        })
        .unwrap_err();

        assert_eq!(failure.asset_index, Some(1));
        for asset in f.table.assets.iter() {
            assert_eq!(f.ledger.balance(&asset, &f.custody), 0);
            assert_eq!(f.ledger.balance(&asset, &f.payer), 1_000);
        }
    }

    #[test]
    fn test_zero_amounts_are_skipped() {
        let mut f = setup();
        let native = f.table.asset(0).unwrap();
        f.ledger.fail_transfers_of(&native);
        let engine = AssetTransferEngine::new(&f.custody);

        engine
            .pull_deposits(&mut f.ledger, &f.payer, &f.table, &vec![&f.env, 0, 5, 2])
            .unwrap();
        assert_eq!(f.ledger.balance(&native, &f.custody), 0);
    }

    #[test]
    fn test_release_requires_custody() {
        let mut f = setup();
        let engine = AssetTransferEngine::new(&f.custody);
        let amounts = vec![&f.env, 10, 5, 2];
        let recipient = Address::generate(&f.env);
        f.ledger.associate_all(&f.table.assets, &recipient);

        let failure = engine
            .preflight_release(&f.ledger, &f.table, &amounts)
            .unwrap_err();
        assert_eq!(failure.asset_index, Some(0));

        engine
            .pull_deposits(&mut f.ledger, &f.payer, &f.table, &amounts)
            .unwrap();
        engine.preflight_release(&f.ledger, &f.table, &amounts).unwrap();
        engine
            .release_deposits(&mut f.ledger, &recipient, &f.table, &amounts)
            .unwrap();
        for (asset, amount) in f.table.assets.iter().zip(amounts.iter()) {
            assert_eq!(f.ledger.balance(&asset, &recipient), amount);
            assert_eq!(f.ledger.balance(&asset, &f.custody), 0);
        }
    }

    #[test]
    fn test_push_minted_asset_to_unassociated_recipient() {
        let mut f = setup();
        let basket = Address::generate(&f.env);
        let recipient = Address::generate(&f.env);
        f.ledger.set_associated(&basket, &f.custody, true);
        f.ledger.set_balance(&basket, &f.custody, 100);
        let engine = AssetTransferEngine::new(&f.custody);

        let failure = engine
            .push_minted_asset(&mut f.ledger, &basket, &recipient, 100)
            .unwrap_err();
        assert_eq!(failure.asset_index, None);
        assert_eq!(failure.error, MinterError::TokenNotAssociated);

        f.ledger.set_associated(&basket, &recipient, true);
        engine
            .push_minted_asset(&mut f.ledger, &basket, &recipient, 100)
            .unwrap();
        assert_eq!(f.ledger.balance(&basket, &recipient), 100);
    }
}
