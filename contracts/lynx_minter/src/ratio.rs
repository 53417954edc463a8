//! Deposit ratio registry.
//!
//! The asset set is fixed when the table is created: native coin first,
//! then the fungible assets in deployment order. Governance may only swap
//! the ratio column, and always as one whole-table write.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::error::MinterError;

/// Ordered asset -> ratio mapping.
/// `ratios[i]` is the amount of `assets[i]` (smallest units) required per
/// whole basket token.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RatioTable {
    pub assets: Vec<Address>,
    pub ratios: Vec<i128>,
}

impl RatioTable {
    /// Build the deployment table. `native` always occupies index 0.
    pub fn new(
        env: &Env,
        native: Address,
        assets: Vec<Address>,
        ratios: Vec<i128>,
    ) -> Result<Self, MinterError> {
        let mut ordered = Vec::new(env);
        ordered.push_back(native);
        ordered.append(&assets);

        for (i, asset) in ordered.iter().enumerate() {
            if let Some(first) = ordered.first_index_of(&asset) {
                if first as usize != i {
                    return Err(MinterError::InvalidRatioTable);
                }
            }
        }

        let table = RatioTable {
            assets: ordered,
            ratios: Vec::new(env),
        };
        table.with_ratios(ratios)
    }

    pub fn len(&self) -> u32 {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn asset(&self, index: u32) -> Option<Address> {
        self.assets.get(index)
    }

    pub fn index_of(&self, asset: &Address) -> Option<u32> {
        self.assets.first_index_of(asset)
    }

    /// Replace the whole ratio column. The asset column is kept as is.
    pub fn with_ratios(&self, ratios: Vec<i128>) -> Result<Self, MinterError> {
        validate_ratios(self.len(), &ratios)?;
        Ok(RatioTable {
            assets: self.assets.clone(),
            ratios,
        })
    }
}

fn validate_ratios(expected_len: u32, ratios: &Vec<i128>) -> Result<(), MinterError> {
    if ratios.len() != expected_len {
        return Err(MinterError::InvalidRatioTable);
    }
    if ratios.iter().any(|ratio| ratio < 0) {
        return Err(MinterError::InvalidRatioTable);
    }
    Ok(())
}
