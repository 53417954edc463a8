//! Mint and burn state machine.
//!
//! Mint: Idle -> Calculating -> AssociationChecking -> PullingDeposits ->
//! Minting -> PayingOut -> Committed.
//! Burn: Idle -> Calculating -> AssociationChecking -> Burning ->
//! Releasing -> Committed.
//! Any step may end in Failed; the failure records the step it happened in.
//! A mint confirms the supply key while Calculating, before any
//! association or transfer is attempted.

use soroban_sdk::{contracttype, log, Address, Env, Vec};

use crate::association::{AssociationGateway, AssociationOutcome};
use crate::calculator;
use crate::error::MinterError;
use crate::ledger::AssetLedger;
use crate::ratio::RatioTable;
use crate::storage::MinterConfig;
use crate::supply::{BurnOutcome, MintOutcome, SupplyKeyGateway};
use crate::transfer::{AssetTransferEngine, TransferFailure};

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum FlowStep {
    Idle = 0,
    Calculating = 1,
    AssociationChecking = 2,
    PullingDeposits = 3,
    Minting = 4,
    PayingOut = 5,
    Burning = 6,
    Releasing = 7,
    Committed = 8,
    Failed = 9,
}

/// Where and why a flow stopped.
/// `asset_index` points into the ratio table; `None` means the basket token
/// or a step that is not tied to one asset.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StepFailure {
    pub step: FlowStep,
    pub asset_index: Option<u32>,
    pub error: MinterError,
}

impl StepFailure {
    /// Write the failure to the diagnostic log and hand back the error code.
    pub fn report(self, env: &Env) -> MinterError {
        log!(
            env,
            "flow failed: step, asset index, error, configuration, transient",
            self.step,
            self.asset_index,
            self.error as u32,
            self.error.is_configuration(),
            self.error.is_transient()
        );
        self.error
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MintReceipt {
    pub payer: Address,
    pub recipient: Address,
    pub minted: i128,
    pub deposits: Vec<i128>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BurnReceipt {
    pub holder: Address,
    pub recipient: Address,
    pub burned: i128,
    pub released: Vec<i128>,
    pub fees: Vec<i128>,
}

/// Result of a dry run. `error_code` is 0 when the call would pass,
/// otherwise the `MinterError` code it would fail with.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Preflight {
    pub ok: bool,
    pub step: FlowStep,
    pub asset_index: Option<u32>,
    pub error_code: u32,
    pub amounts: Vec<i128>,
}

pub struct Orchestrator<'a, L: AssetLedger> {
    env: &'a Env,
    ledger: &'a mut L,
    minter: Address,
    basket: Address,
    table: RatioTable,
    config: MinterConfig,
    step: FlowStep,
}

impl<'a, L: AssetLedger> Orchestrator<'a, L> {
    pub fn new(
        env: &'a Env,
        ledger: &'a mut L,
        minter: Address,
        basket: Address,
        table: RatioTable,
        config: MinterConfig,
    ) -> Self {
        Orchestrator {
            env,
            ledger,
            minter,
            basket,
            table,
            config,
            step: FlowStep::Idle,
        }
    }

    fn enter(&mut self, step: FlowStep) {
        self.step = step;
    }

    fn fail(&mut self, asset_index: Option<u32>, error: MinterError) -> StepFailure {
        let failure = StepFailure {
            step: self.step,
            asset_index,
            error,
        };
        self.step = FlowStep::Failed;
        failure
    }

    fn fail_transfer(&mut self, failure: TransferFailure) -> StepFailure {
        log!(
            self.env,
            "transfer rejected: asset, amount",
            failure.asset,
            failure.amount
        );
        self.fail(failure.asset_index, failure.error)
    }

    fn require_idle(&mut self) -> Result<(), StepFailure> {
        if self.step != FlowStep::Idle {
            // One orchestrator drives exactly one call
            return Err(self.fail(None, MinterError::StorageCorrupted));
        }
        Ok(())
    }

    /// Mint `amount` basket units to `recipient`, paid for by `payer`.
    pub fn mint(
        &mut self,
        payer: &Address,
        recipient: &Address,
        amount: i128,
        supplied: &Vec<i128>,
    ) -> Result<MintReceipt, StepFailure> {
        self.require_idle()?;

        self.enter(FlowStep::Calculating);
        if payer != recipient && !self.config.allow_mint_on_behalf {
            return Err(self.fail(None, MinterError::MintOnBehalfDisabled));
        }
        let required = calculator::required_deposits(
            self.env,
            &self.table,
            self.config.basket_unit,
            amount,
        )
        .map_err(|e| self.fail(None, e))?;
        calculator::require_exact_deposits(&self.table, self.config.basket_unit, amount)
            .map_err(|e| self.fail(None, e))?;
        calculator::check_supplied(&required, supplied).map_err(|e| self.fail(None, e))?;

        let minter = self.minter.clone();
        let basket = self.basket.clone();
        let table = self.table.clone();

        // Nothing may move while mint authority is missing
        let supply = SupplyKeyGateway::new(&basket, &minter);
        supply
            .verify_supply_key_holder(&*self.ledger)
            .map_err(|e| self.fail(None, e))?;

        self.enter(FlowStep::AssociationChecking);
        let mut associations = AssociationGateway::new(self.config.max_auto_associations);
        for (index, (asset, need)) in table.assets.iter().zip(required.iter()).enumerate() {
            if need == 0 {
                continue;
            }
            let outcome = associations.ensure_associated(&mut *self.ledger, &minter, &asset);
            if outcome == AssociationOutcome::AssociationFailed {
                return Err(self.fail(Some(index as u32), MinterError::TokenNotAssociated));
            }
        }
        for account in [&minter, recipient] {
            let outcome = associations.ensure_associated(&mut *self.ledger, account, &basket);
            if outcome == AssociationOutcome::AssociationFailed {
                return Err(self.fail(None, MinterError::TokenNotAssociated));
            }
        }

        self.enter(FlowStep::PullingDeposits);
        let engine = AssetTransferEngine::new(&minter);
        if let Err(failure) = engine.preflight_pull(&*self.ledger, payer, &table, &required) {
            return Err(self.fail_transfer(failure));
        }
        if let Err(failure) = engine.pull_deposits(&mut *self.ledger, payer, &table, &required) {
            return Err(self.fail_transfer(failure));
        }

        self.enter(FlowStep::Minting);
        if let MintOutcome::Rejected(reason) = supply.mint(&mut *self.ledger, amount) {
            return Err(self.fail(None, reason.into()));
        }

        self.enter(FlowStep::PayingOut);
        if let Err(failure) = engine.push_minted_asset(&mut *self.ledger, &basket, recipient, amount)
        {
            return Err(self.fail_transfer(failure));
        }

        self.enter(FlowStep::Committed);
        Ok(MintReceipt {
            payer: payer.clone(),
            recipient: recipient.clone(),
            minted: amount,
            deposits: required,
        })
    }

    /// Burn `amount` basket units held by `holder` and release the
    /// underlying assets to `recipient`.
    pub fn burn(
        &mut self,
        holder: &Address,
        recipient: &Address,
        amount: i128,
    ) -> Result<BurnReceipt, StepFailure> {
        self.require_idle()?;

        self.enter(FlowStep::Calculating);
        let (released, fees) = calculator::burn_release(
            self.env,
            &self.table,
            self.config.basket_unit,
            self.config.burn_fee_bps,
            amount,
        )
        .map_err(|e| self.fail(None, e))?;

        let minter = self.minter.clone();
        let basket = self.basket.clone();
        let table = self.table.clone();

        self.enter(FlowStep::AssociationChecking);
        let mut associations = AssociationGateway::new(self.config.max_auto_associations);
        for (index, (asset, out)) in table.assets.iter().zip(released.iter()).enumerate() {
            if out == 0 {
                continue;
            }
            let outcome = associations.ensure_associated(&mut *self.ledger, recipient, &asset);
            if outcome == AssociationOutcome::AssociationFailed {
                return Err(self.fail(Some(index as u32), MinterError::TokenNotAssociated));
            }
        }

        self.enter(FlowStep::Burning);
        let engine = AssetTransferEngine::new(&minter);
        if let Err(failure) = engine.preflight_release(&*self.ledger, &table, &released) {
            return Err(self.fail_transfer(failure));
        }
        if let Err(error) = self.check_burn_source(holder, amount) {
            return Err(self.fail(None, error));
        }
        let supply = SupplyKeyGateway::new(&basket, &minter);
        if let BurnOutcome::Rejected(reason) = supply.burn_from(&mut *self.ledger, holder, amount) {
            return Err(self.fail(None, reason.into()));
        }

        self.enter(FlowStep::Releasing);
        if let Err(failure) = engine.release_deposits(&mut *self.ledger, recipient, &table, &released)
        {
            return Err(self.fail_transfer(failure));
        }

        self.enter(FlowStep::Committed);
        Ok(BurnReceipt {
            holder: holder.clone(),
            recipient: recipient.clone(),
            burned: amount,
            released,
            fees,
        })
    }

    fn check_burn_source(&self, holder: &Address, amount: i128) -> Result<(), MinterError> {
        if self.ledger.allowance(&self.basket, holder, &self.minter) < amount {
            return Err(MinterError::InsufficientAllowance);
        }
        if self.ledger.balance(&self.basket, holder) < amount {
            return Err(MinterError::BurnFailed);
        }
        Ok(())
    }

    /// Walk the mint flow without touching the ledger.
    pub fn preflight_mint(
        &self,
        payer: &Address,
        recipient: &Address,
        amount: i128,
    ) -> Preflight {
        let empty = Vec::new(self.env);
        let fail = |step, asset_index, error: MinterError, amounts: &Vec<i128>| Preflight {
            ok: false,
            step,
            asset_index,
            error_code: error as u32,
            amounts: amounts.clone(),
        };

        if payer != recipient && !self.config.allow_mint_on_behalf {
            return fail(FlowStep::Calculating, None, MinterError::MintOnBehalfDisabled, &empty);
        }
        let required = match calculator::required_deposits(
            self.env,
            &self.table,
            self.config.basket_unit,
            amount,
        ) {
            Ok(required) => required,
            Err(error) => return fail(FlowStep::Calculating, None, error, &empty),
        };
        if let Err(error) =
            calculator::require_exact_deposits(&self.table, self.config.basket_unit, amount)
        {
            return fail(FlowStep::Calculating, None, error, &required);
        }
        let supply = SupplyKeyGateway::new(&self.basket, &self.minter);
        if let Err(error) = supply.verify_supply_key_holder(&*self.ledger) {
            return fail(FlowStep::Calculating, None, error, &required);
        }

        let mut associations = AssociationGateway::new(self.config.max_auto_associations);
        for (index, (asset, need)) in self.table.assets.iter().zip(required.iter()).enumerate() {
            if need > 0 && !associations.probe(&*self.ledger, &self.minter, &asset) {
                return fail(
                    FlowStep::AssociationChecking,
                    Some(index as u32),
                    MinterError::TokenNotAssociated,
                    &required,
                );
            }
        }
        for account in [&self.minter, recipient] {
            if !associations.probe(&*self.ledger, account, &self.basket) {
                return fail(
                    FlowStep::AssociationChecking,
                    None,
                    MinterError::TokenNotAssociated,
                    &required,
                );
            }
        }

        let engine = AssetTransferEngine::new(&self.minter);
        if let Err(failure) = engine.preflight_pull(&*self.ledger, payer, &self.table, &required) {
            return fail(
                FlowStep::PullingDeposits,
                failure.asset_index,
                failure.error,
                &required,
            );
        }

        Preflight {
            ok: true,
            step: FlowStep::Committed,
            asset_index: None,
            error_code: 0,
            amounts: required,
        }
    }

    /// Walk the burn flow without touching the ledger.
    pub fn preflight_burn(
        &self,
        holder: &Address,
        recipient: &Address,
        amount: i128,
    ) -> Preflight {
        let empty = Vec::new(self.env);
        let fail = |step, asset_index, error: MinterError, amounts: &Vec<i128>| Preflight {
            ok: false,
            step,
            asset_index,
            error_code: error as u32,
            amounts: amounts.clone(),
        };

        let released = match calculator::burn_release(
            self.env,
            &self.table,
            self.config.basket_unit,
            self.config.burn_fee_bps,
            amount,
        ) {
            Ok((released, _)) => released,
            Err(error) => return fail(FlowStep::Calculating, None, error, &empty),
        };

        let mut associations = AssociationGateway::new(self.config.max_auto_associations);
        for (index, (asset, out)) in self.table.assets.iter().zip(released.iter()).enumerate() {
            if out > 0 && !associations.probe(&*self.ledger, recipient, &asset) {
                return fail(
                    FlowStep::AssociationChecking,
                    Some(index as u32),
                    MinterError::TokenNotAssociated,
                    &released,
                );
            }
        }

        let engine = AssetTransferEngine::new(&self.minter);
        if let Err(failure) = engine.preflight_release(&*self.ledger, &self.table, &released) {
            return fail(FlowStep::Burning, failure.asset_index, failure.error, &released);
        }
        if let Err(error) = self.check_burn_source(holder, amount) {
            return fail(FlowStep::Burning, None, error, &released);
        }
        let supply = SupplyKeyGateway::new(&self.basket, &self.minter);
        if let Err(error) = supply.verify_supply_key_holder(&*self.ledger) {
            return fail(FlowStep::Burning, None, error, &released);
        }

        Preflight {
            ok: true,
            step: FlowStep::Committed,
            asset_index: None,
            error_code: 0,
            amounts: released,
        }
    }
}
