use soroban_sdk::{contracttype, Address, Env};

use crate::error::MinterError;
use crate::ratio::RatioTable;

/// Storage keys for the contract.
/// Every value lives in instance storage so a single call observes one
/// consistent snapshot of governance state.
#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    /// Governance principal (ratio updates, handoffs)
    Governance,
    /// Basket token contract address (LYNX SAC)
    BasketToken,
    /// Asset order and per-asset deposit ratios, replaced as a whole
    Ratios,
    /// Minter configuration
    Config,
}

/// Smallest units per whole basket token.
/// Uses 7 decimal places to match Stellar Asset Contract precision.
pub const DEFAULT_BASKET_UNIT: i128 = 10_000_000; // 10^7

/// Basis points denominator (100% = 10000 bp).
pub const BPS_DENOMINATOR: i128 = 10_000;

pub(crate) const DAY_IN_LEDGERS: u32 = 17280;
pub(crate) const INSTANCE_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub(crate) const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;

/// Tunables fixed at deployment and replaceable by governance.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MinterConfig {
    /// Smallest basket units per whole basket token (ratio denominator)
    pub basket_unit: i128,
    /// Fee withheld from every released asset on burn, in basis points.
    /// Zero makes deposits redeemable 1:1.
    pub burn_fee_bps: u32,
    /// Association calls a single mint or burn may issue for accounts
    /// that cannot hold an asset yet. Zero disables auto-association.
    pub max_auto_associations: u32,
    /// Whether the basket token may be minted to an account other than the payer
    pub allow_mint_on_behalf: bool,
}

impl MinterConfig {
    pub fn default_config() -> Self {
        MinterConfig {
            basket_unit: DEFAULT_BASKET_UNIT,
            burn_fee_bps: 0,
            max_auto_associations: 0,
            allow_mint_on_behalf: true,
        }
    }

    pub fn validate(&self) -> Result<(), MinterError> {
        if self.basket_unit <= 0 {
            return Err(MinterError::InvalidConfig);
        }
        if self.burn_fee_bps as i128 > BPS_DENOMINATOR {
            return Err(MinterError::InvalidConfig);
        }
        Ok(())
    }
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Governance)
}

pub fn require_initialized(env: &Env) -> Result<(), MinterError> {
    if !is_initialized(env) {
        return Err(MinterError::NotInitialized);
    }
    Ok(())
}

pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn governance(env: &Env) -> Result<Address, MinterError> {
    env.storage()
        .instance()
        .get(&DataKey::Governance)
        .ok_or(MinterError::StorageCorrupted)
}

pub fn set_governance(env: &Env, principal: &Address) {
    env.storage().instance().set(&DataKey::Governance, principal);
}

pub fn basket_token(env: &Env) -> Result<Address, MinterError> {
    env.storage()
        .instance()
        .get(&DataKey::BasketToken)
        .ok_or(MinterError::StorageCorrupted)
}

pub fn set_basket_token(env: &Env, token: &Address) {
    env.storage().instance().set(&DataKey::BasketToken, token);
}

pub fn ratio_table(env: &Env) -> Result<RatioTable, MinterError> {
    env.storage()
        .instance()
        .get(&DataKey::Ratios)
        .ok_or(MinterError::StorageCorrupted)
}

pub fn set_ratio_table(env: &Env, table: &RatioTable) {
    env.storage().instance().set(&DataKey::Ratios, table);
}

pub fn config(env: &Env) -> Result<MinterConfig, MinterError> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(MinterError::StorageCorrupted)
}

pub fn set_config(env: &Env, config: &MinterConfig) {
    env.storage().instance().set(&DataKey::Config, config);
}
