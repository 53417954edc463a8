//! Governance-gated mutations.
//!
//! The governance principal starts as the deploying admin and moves with
//! `set_governance_address`. Every entry point checks the caller against
//! the stored principal before asking for its signature.

use soroban_sdk::{Address, Env, Vec};

use crate::error::MinterError;
use crate::events::MinterEvents;
use crate::ledger::SorobanLedger;
use crate::ratio::RatioTable;
use crate::storage::{self, MinterConfig};
use crate::supply::SupplyKeyGateway;

pub fn require_governance(env: &Env, caller: &Address) -> Result<(), MinterError> {
    let governance = storage::governance(env)?;
    if *caller != governance {
        return Err(MinterError::Unauthorized);
    }
    caller.require_auth();
    Ok(())
}

/// Replace the whole ratio column in one write.
pub fn update_ratios(
    env: &Env,
    caller: &Address,
    new_ratios: Vec<i128>,
) -> Result<RatioTable, MinterError> {
    require_governance(env, caller)?;

    let current = storage::ratio_table(env)?;
    let updated = current.with_ratios(new_ratios)?;
    storage::set_ratio_table(env, &updated);

    MinterEvents::ratios_updated(env, caller, &current.ratios, &updated.ratios);
    Ok(updated)
}

/// One-step handoff; the new principal is in force for the next call.
pub fn set_governance_address(
    env: &Env,
    caller: &Address,
    principal: &Address,
) -> Result<(), MinterError> {
    require_governance(env, caller)?;

    storage::set_governance(env, principal);

    MinterEvents::governance_changed(env, caller, principal);
    Ok(())
}

pub fn update_config(
    env: &Env,
    caller: &Address,
    config: &MinterConfig,
) -> Result<(), MinterError> {
    require_governance(env, caller)?;
    config.validate()?;

    storage::set_config(env, config);

    MinterEvents::config_updated(env, caller, config);
    Ok(())
}

/// Move the basket token supply key away from this contract.
pub fn set_supply_key_holder(
    env: &Env,
    caller: &Address,
    new_holder: &Address,
) -> Result<(), MinterError> {
    require_governance(env, caller)?;

    let basket = storage::basket_token(env)?;
    let minter = env.current_contract_address();
    let mut ledger = SorobanLedger::new(env);
    SupplyKeyGateway::new(&basket, &minter).hand_over(&mut ledger, new_holder)?;

    MinterEvents::supply_key_moved(env, caller, new_holder);
    Ok(())
}
