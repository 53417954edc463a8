use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum MinterError {
    /// Contract already initialized
    AlreadyInitialized = 1,
    /// Contract not initialized
    NotInitialized = 2,
    /// Amount must be positive
    InvalidAmount = 3,
    /// Arithmetic overflow
    ArithmeticOverflow = 4,
    /// Contract or recipient cannot hold one of the assets
    TokenNotAssociated = 5,
    /// Supplied deposit amounts differ from the computed amounts
    DepositMismatch = 6,
    /// Payer allowance towards the minter is too low
    InsufficientAllowance = 7,
    /// An asset transfer was rejected by the token contract
    TransferFailed = 8,
    /// Basket token mint was rejected by the ledger
    MintFailed = 9,
    /// Minter is not the admin of the basket token
    NotSupplyKeyHolder = 10,
    /// Only governance can perform this action
    Unauthorized = 11,
    /// Ratio table has the wrong shape or a negative ratio
    InvalidRatioTable = 12,
    /// Configuration values out of range
    InvalidConfig = 13,
    /// Basket token burn was rejected by the ledger
    BurnFailed = 14,
    /// Recipient differs from payer while mint-on-behalf is disabled
    MintOnBehalfDisabled = 15,
    /// Critical storage data missing (contract state corrupted)
    StorageCorrupted = 16,
}

impl MinterError {
    /// Errors caused by deployment or governance state. Retrying the same
    /// call cannot succeed until an operator changes that state.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            MinterError::NotSupplyKeyHolder
                | MinterError::Unauthorized
                | MinterError::NotInitialized
                | MinterError::StorageCorrupted
                | MinterError::InvalidConfig
                | MinterError::MintOnBehalfDisabled
        )
    }

    /// Ledger-side rejections where a later retry may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            MinterError::TransferFailed | MinterError::MintFailed | MinterError::BurnFailed
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_configuration_and_transient_are_disjoint() {
        let all = [
            MinterError::AlreadyInitialized,
            MinterError::NotInitialized,
            MinterError::InvalidAmount,
            MinterError::ArithmeticOverflow,
            MinterError::TokenNotAssociated,
            MinterError::DepositMismatch,
            MinterError::InsufficientAllowance,
            MinterError::TransferFailed,
            MinterError::MintFailed,
            MinterError::NotSupplyKeyHolder,
            MinterError::Unauthorized,
            MinterError::InvalidRatioTable,
            MinterError::InvalidConfig,
            MinterError::BurnFailed,
            MinterError::MintOnBehalfDisabled,
            MinterError::StorageCorrupted,
        ];
        for err in all.iter() {
            assert!(!(err.is_configuration() && err.is_transient()), "{:?}", err);
        }
        assert!(MinterError::NotSupplyKeyHolder.is_configuration());
        assert!(MinterError::Unauthorized.is_configuration());
        assert!(MinterError::MintFailed.is_transient());
        assert!(MinterError::TransferFailed.is_transient());
    }
}
