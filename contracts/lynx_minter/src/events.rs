use soroban_sdk::{symbol_short, Address, Env, Symbol, Vec};

use crate::orchestrator::{BurnReceipt, MintReceipt};
use crate::storage::MinterConfig;

pub struct MinterEvents {}

impl MinterEvents {
    /// Emitted once at deployment
    ///
    /// - topics - `["initialized", governance: Address]`
    /// - data - `[basket_token: Address, assets: Vec<Address>, ratios: Vec<i128>]`
    pub fn initialized(
        env: &Env,
        governance: &Address,
        basket_token: &Address,
        assets: &Vec<Address>,
        ratios: &Vec<i128>,
    ) {
        let topics = (Symbol::new(env, "initialized"), governance.clone());
        env.events()
            .publish(topics, (basket_token.clone(), assets.clone(), ratios.clone()));
    }

    /// Emitted when basket tokens are minted against deposits
    ///
    /// - topics - `["mint", payer: Address, recipient: Address]`
    /// - data - `[minted: i128, deposits: Vec<i128>]`
    pub fn mint(env: &Env, receipt: &MintReceipt) {
        let topics = (
            symbol_short!("mint"),
            receipt.payer.clone(),
            receipt.recipient.clone(),
        );
        env.events()
            .publish(topics, (receipt.minted, receipt.deposits.clone()));
    }

    /// Emitted when basket tokens are burned and the underlying released
    ///
    /// - topics - `["burn", holder: Address, recipient: Address]`
    /// - data - `[burned: i128, released: Vec<i128>, fees: Vec<i128>]`
    pub fn burn(env: &Env, receipt: &BurnReceipt) {
        let topics = (
            symbol_short!("burn"),
            receipt.holder.clone(),
            receipt.recipient.clone(),
        );
        env.events().publish(
            topics,
            (
                receipt.burned,
                receipt.released.clone(),
                receipt.fees.clone(),
            ),
        );
    }

    /// - topics - `["ratios_updated", governance: Address]`
    /// - data - `[old: Vec<i128>, new: Vec<i128>]`
    pub fn ratios_updated(env: &Env, governance: &Address, old: &Vec<i128>, new: &Vec<i128>) {
        let topics = (Symbol::new(env, "ratios_updated"), governance.clone());
        env.events().publish(topics, (old.clone(), new.clone()));
    }

    /// - topics - `["governance_changed", previous: Address]`
    /// - data - `new: Address`
    pub fn governance_changed(env: &Env, previous: &Address, new: &Address) {
        let topics = (Symbol::new(env, "governance_changed"), previous.clone());
        env.events().publish(topics, new.clone());
    }

    /// - topics - `["supply_key_moved", governance: Address]`
    /// - data - `new_holder: Address`
    pub fn supply_key_moved(env: &Env, governance: &Address, new_holder: &Address) {
        let topics = (Symbol::new(env, "supply_key_moved"), governance.clone());
        env.events().publish(topics, new_holder.clone());
    }

    /// - topics - `["config_updated", governance: Address]`
    /// - data - `config: MinterConfig`
    pub fn config_updated(env: &Env, governance: &Address, config: &MinterConfig) {
        let topics = (Symbol::new(env, "config_updated"), governance.clone());
        env.events().publish(topics, config.clone());
    }
}
