#![no_std]

mod association;
mod calculator;
mod error;
mod events;
mod governance;
mod ledger;
mod orchestrator;
mod ratio;
mod storage;
mod supply;
#[cfg(test)]
mod testutils;
mod transfer;

pub use error::MinterError;
pub use orchestrator::{BurnReceipt, FlowStep, MintReceipt, Preflight};
pub use ratio::RatioTable;
pub use storage::MinterConfig;

use events::MinterEvents;
use ledger::{AssetLedger, SorobanLedger};
use orchestrator::Orchestrator;
use soroban_sdk::{contract, contractimpl, Address, Env, Vec};
use supply::SupplyKeyGateway;

/// LYNX Basket Minter Contract
///
/// Mints a basket token against deposits of a fixed set of underlying
/// assets, in ratios set by a governance principal, and releases the
/// underlying assets again when the basket token is burned.
///
/// Key features:
/// - Required deposits are a pure function of the amount and the ratio table
/// - Deposits are pulled through allowances in a fixed asset order
/// - The contract must hold the basket token supply key (SAC admin)
/// - Any failed step fails the whole call; nothing partial is committed
#[contract]
pub struct LynxMinter;

#[contractimpl]
impl LynxMinter {
    /// Constructor: called once at deployment.
    ///
    /// Delegates to initialize() for the actual setup logic.
    pub fn __constructor(
        env: Env,
        admin: Address,
        basket_token: Address,
        native_asset: Address,
        assets: Vec<Address>,
        ratios: Vec<i128>,
        config: MinterConfig,
    ) {
        Self::initialize(env, admin, basket_token, native_asset, assets, ratios, config)
            .expect("initialization failed");
    }

    /// Initialize the minter.
    ///
    /// # Arguments
    /// * `admin` - Initial governance principal
    /// * `basket_token` - LYNX Stellar Asset Contract; its admin must be moved
    ///                    to this contract before the first mint
    /// * `native_asset` - Native coin asset contract, always first in the basket
    /// * `assets` - Remaining basket assets in deposit order
    /// * `ratios` - Smallest units of each asset per whole basket token,
    ///              native first
    /// * `config` - Minter configuration
    pub fn initialize(
        env: Env,
        admin: Address,
        basket_token: Address,
        native_asset: Address,
        assets: Vec<Address>,
        ratios: Vec<i128>,
        config: MinterConfig,
    ) -> Result<(), MinterError> {
        if storage::is_initialized(&env) {
            return Err(MinterError::AlreadyInitialized);
        }

        config.validate()?;
        let table = RatioTable::new(&env, native_asset, assets, ratios)?;
        if table.index_of(&basket_token).is_some() {
            return Err(MinterError::InvalidRatioTable);
        }

        admin.require_auth();

        storage::set_governance(&env, &admin);
        storage::set_basket_token(&env, &basket_token);
        storage::set_ratio_table(&env, &table);
        storage::set_config(&env, &config);
        storage::bump_instance(&env);

        MinterEvents::initialized(&env, &admin, &basket_token, &table.assets, &table.ratios);
        Ok(())
    }

    /// Deposits required to mint `mint_amount` basket units.
    ///
    /// # Returns
    /// One amount per asset, in `get_assets()` order
    pub fn calculate_required_deposits(
        env: Env,
        mint_amount: i128,
    ) -> Result<Vec<i128>, MinterError> {
        storage::require_initialized(&env)?;
        let table = storage::ratio_table(&env)?;
        let config = storage::config(&env)?;
        calculator::required_deposits(&env, &table, config.basket_unit, mint_amount)
    }

    /// Amounts released by burning `burn_amount` basket units, after fees.
    pub fn calculate_burn_release(env: Env, burn_amount: i128) -> Result<Vec<i128>, MinterError> {
        storage::require_initialized(&env)?;
        let table = storage::ratio_table(&env)?;
        let config = storage::config(&env)?;
        let (released, _) = calculator::burn_release(
            &env,
            &table,
            config.basket_unit,
            config.burn_fee_bps,
            burn_amount,
        )?;
        Ok(released)
    }

    /// Mint basket tokens against deposits.
    ///
    /// # Arguments
    /// * `payer` - Account the deposits are pulled from (must authorize and
    ///             have approved this contract for every asset)
    /// * `recipient` - Account receiving the basket tokens
    /// * `mint_amount` - Basket units to mint
    /// * `amounts` - Deposits per asset; must equal
    ///               `calculate_required_deposits(mint_amount)` exactly
    pub fn mint_with_deposits(
        env: Env,
        payer: Address,
        recipient: Address,
        mint_amount: i128,
        amounts: Vec<i128>,
    ) -> Result<MintReceipt, MinterError> {
        storage::require_initialized(&env)?;

        payer.require_auth();

        let (basket, table, config) = flow_state(&env)?;
        let mut ledger = SorobanLedger::new(&env);
        let mut flow = Orchestrator::new(
            &env,
            &mut ledger,
            env.current_contract_address(),
            basket,
            table,
            config,
        );
        let receipt = flow
            .mint(&payer, &recipient, mint_amount, &amounts)
            .map_err(|failure| failure.report(&env))?;

        storage::bump_instance(&env);
        MinterEvents::mint(&env, &receipt);
        Ok(receipt)
    }

    /// Burn basket tokens and release the underlying assets.
    ///
    /// # Arguments
    /// * `holder` - Account whose basket tokens are burned (must authorize
    ///              and have approved this contract for the basket token)
    /// * `recipient` - Account receiving the underlying assets
    /// * `burn_amount` - Basket units to burn
    pub fn burn_for_deposits(
        env: Env,
        holder: Address,
        recipient: Address,
        burn_amount: i128,
    ) -> Result<BurnReceipt, MinterError> {
        storage::require_initialized(&env)?;

        holder.require_auth();

        let (basket, table, config) = flow_state(&env)?;
        let mut ledger = SorobanLedger::new(&env);
        let mut flow = Orchestrator::new(
            &env,
            &mut ledger,
            env.current_contract_address(),
            basket,
            table,
            config,
        );
        let receipt = flow
            .burn(&holder, &recipient, burn_amount)
            .map_err(|failure| failure.report(&env))?;

        storage::bump_instance(&env);
        MinterEvents::burn(&env, &receipt);
        Ok(receipt)
    }

    /// Dry run of `mint_with_deposits`. Reports the step and asset the real
    /// call would fail on, without moving anything.
    pub fn preflight_mint(
        env: Env,
        payer: Address,
        recipient: Address,
        mint_amount: i128,
    ) -> Result<Preflight, MinterError> {
        storage::require_initialized(&env)?;
        let (basket, table, config) = flow_state(&env)?;
        let mut ledger = SorobanLedger::new(&env);
        let flow = Orchestrator::new(
            &env,
            &mut ledger,
            env.current_contract_address(),
            basket,
            table,
            config,
        );
        Ok(flow.preflight_mint(&payer, &recipient, mint_amount))
    }

    /// Dry run of `burn_for_deposits`.
    pub fn preflight_burn(
        env: Env,
        holder: Address,
        recipient: Address,
        burn_amount: i128,
    ) -> Result<Preflight, MinterError> {
        storage::require_initialized(&env)?;
        let (basket, table, config) = flow_state(&env)?;
        let mut ledger = SorobanLedger::new(&env);
        let flow = Orchestrator::new(
            &env,
            &mut ledger,
            env.current_contract_address(),
            basket,
            table,
            config,
        );
        Ok(flow.preflight_burn(&holder, &recipient, burn_amount))
    }

    /// Replace every ratio at once (governance only).
    ///
    /// # Arguments
    /// * `caller` - Must match the governance principal
    /// * `new_ratios` - One ratio per asset, in `get_assets()` order
    pub fn update_ratios(env: Env, caller: Address, new_ratios: Vec<i128>) -> Result<(), MinterError> {
        storage::require_initialized(&env)?;
        governance::update_ratios(&env, &caller, new_ratios)?;
        storage::bump_instance(&env);
        Ok(())
    }

    /// Hand governance to `principal` (governance only).
    pub fn set_governance_address(
        env: Env,
        caller: Address,
        principal: Address,
    ) -> Result<(), MinterError> {
        storage::require_initialized(&env)?;
        governance::set_governance_address(&env, &caller, &principal)?;
        storage::bump_instance(&env);
        Ok(())
    }

    /// Replace the minter configuration (governance only).
    pub fn update_config(env: Env, caller: Address, config: MinterConfig) -> Result<(), MinterError> {
        storage::require_initialized(&env)?;
        governance::update_config(&env, &caller, &config)?;
        storage::bump_instance(&env);
        Ok(())
    }

    /// Move the basket token supply key to `new_holder` (governance only).
    /// Minting and burning stop until the key is given back.
    pub fn set_supply_key_holder(
        env: Env,
        caller: Address,
        new_holder: Address,
    ) -> Result<(), MinterError> {
        storage::require_initialized(&env)?;
        governance::set_supply_key_holder(&env, &caller, &new_holder)?;
        storage::bump_instance(&env);
        Ok(())
    }

    /// Get the current ratio per asset.
    pub fn get_current_ratios(env: Env) -> Result<Vec<i128>, MinterError> {
        storage::require_initialized(&env)?;
        Ok(storage::ratio_table(&env)?.ratios)
    }

    /// Get the basket asset order (native first).
    pub fn get_assets(env: Env) -> Result<Vec<Address>, MinterError> {
        storage::require_initialized(&env)?;
        Ok(storage::ratio_table(&env)?.assets)
    }

    /// Get the basket token address.
    pub fn get_basket_token(env: Env) -> Result<Address, MinterError> {
        storage::require_initialized(&env)?;
        storage::basket_token(&env)
    }

    /// Get the governance principal.
    pub fn get_governance(env: Env) -> Result<Address, MinterError> {
        storage::require_initialized(&env)?;
        storage::governance(&env)
    }

    /// Get the minter configuration.
    pub fn get_config(env: Env) -> Result<MinterConfig, MinterError> {
        storage::require_initialized(&env)?;
        storage::config(&env)
    }

    /// Whether this contract can hold each basket asset, in `get_assets()` order.
    pub fn check_all_associations(env: Env) -> Result<Vec<bool>, MinterError> {
        storage::require_initialized(&env)?;
        let table = storage::ratio_table(&env)?;
        let ledger = SorobanLedger::new(&env);
        let minter = env.current_contract_address();

        let mut associated = Vec::new(&env);
        for asset in table.assets.iter() {
            associated.push_back(ledger.is_associated(&asset, &minter));
        }
        Ok(associated)
    }

    /// Whether this contract currently holds the basket token supply key.
    pub fn verify_supply_key(env: Env) -> Result<bool, MinterError> {
        storage::require_initialized(&env)?;
        let basket = storage::basket_token(&env)?;
        let minter = env.current_contract_address();
        let ledger = SorobanLedger::new(&env);
        Ok(SupplyKeyGateway::new(&basket, &minter).holds_supply_key(&ledger))
    }

    /// Custody balance per asset, in `get_assets()` order.
    pub fn get_reserves(env: Env) -> Result<Vec<i128>, MinterError> {
        storage::require_initialized(&env)?;
        let table = storage::ratio_table(&env)?;
        let ledger = SorobanLedger::new(&env);
        let minter = env.current_contract_address();

        let mut reserves = Vec::new(&env);
        for asset in table.assets.iter() {
            reserves.push_back(ledger.balance(&asset, &minter));
        }
        Ok(reserves)
    }
}

fn flow_state(env: &Env) -> Result<(Address, RatioTable, MinterConfig), MinterError> {
    Ok((
        storage::basket_token(env)?,
        storage::ratio_table(env)?,
        storage::config(env)?,
    ))
}
