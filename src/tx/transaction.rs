//! Unsigned transaction model.
//!
//! The four shapes are distinct variants; fee fields exist only on the
//! kinds that carry them.

use ethers_core::types::U256;
use serde::Serialize;

use crate::types::Address;

/// Fields shared by every transaction shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxCommon {
    pub nonce: u64,
    pub to: Address,
    /// Wei
    pub value: U256,
    pub gas_limit: u64,
    #[serde(serialize_with = "serialize_hex")]
    pub data: Vec<u8>,
    /// 0 means no replay protection (legacy only)
    pub chain_id: u64,
}

/// EIP-1559 fee caps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeMarketFees {
    pub max_priority_fee_per_gas: U256,
    pub max_fee_per_gas: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnsignedTransaction {
    LegacyTransfer {
        #[serde(flatten)]
        common: TxCommon,
        gas_price: U256,
    },
    LegacyContractCall {
        #[serde(flatten)]
        common: TxCommon,
        gas_price: U256,
    },
    FeeMarketTransfer {
        #[serde(flatten)]
        common: TxCommon,
        #[serde(flatten)]
        fees: FeeMarketFees,
    },
    FeeMarketContractCall {
        #[serde(flatten)]
        common: TxCommon,
        #[serde(flatten)]
        fees: FeeMarketFees,
    },
}

/// Serialization family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    Legacy,
    FeeMarket,
}

impl TxKind {
    /// EIP-2718 type byte
    pub fn type_byte(&self) -> Option<u8> {
        match self {
            TxKind::Legacy => None,
            TxKind::FeeMarket => Some(0x02),
        }
    }
}

impl UnsignedTransaction {
    pub fn common(&self) -> &TxCommon {
        match self {
            UnsignedTransaction::LegacyTransfer { common, .. }
            | UnsignedTransaction::LegacyContractCall { common, .. }
            | UnsignedTransaction::FeeMarketTransfer { common, .. }
            | UnsignedTransaction::FeeMarketContractCall { common, .. } => common,
        }
    }

    pub fn kind(&self) -> TxKind {
        match self {
            UnsignedTransaction::LegacyTransfer { .. } | UnsignedTransaction::LegacyContractCall { .. } => {
                TxKind::Legacy
            }
            UnsignedTransaction::FeeMarketTransfer { .. } | UnsignedTransaction::FeeMarketContractCall { .. } => {
                TxKind::FeeMarket
            }
        }
    }

    pub fn is_contract_call(&self) -> bool {
        matches!(
            self,
            UnsignedTransaction::LegacyContractCall { .. } | UnsignedTransaction::FeeMarketContractCall { .. }
        )
    }

    pub fn chain_id(&self) -> u64 {
        self.common().chain_id
    }

    pub fn nonce(&self) -> u64 {
        self.common().nonce
    }

    /// Upper bound of what the transaction can spend on gas
    pub fn max_fee_per_gas(&self) -> U256 {
        match self {
            UnsignedTransaction::LegacyTransfer { gas_price, .. }
            | UnsignedTransaction::LegacyContractCall { gas_price, .. } => *gas_price,
            UnsignedTransaction::FeeMarketTransfer { fees, .. }
            | UnsignedTransaction::FeeMarketContractCall { fees, .. } => fees.max_fee_per_gas,
        }
    }
}

fn serialize_hex<S: serde::Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("0x{}", hex::encode(data)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn common() -> TxCommon {
        TxCommon {
            nonce: 5,
            to: Address([0xab; 20]),
            value: U256::from(1u64),
            gas_limit: 21_000,
            data: Vec::new(),
            chain_id: 1,
        }
    }

    #[test]
    fn test_kind_and_accessors() {
        let legacy = UnsignedTransaction::LegacyTransfer {
            common: common(),
            gas_price: U256::from(7u64),
        };
        assert_eq!(legacy.kind(), TxKind::Legacy);
        assert_eq!(legacy.max_fee_per_gas(), U256::from(7u64));
        assert!(!legacy.is_contract_call());

        let call = UnsignedTransaction::FeeMarketContractCall {
            common: common(),
            fees: FeeMarketFees {
                max_priority_fee_per_gas: U256::from(1u64),
                max_fee_per_gas: U256::from(2u64),
            },
        };
        assert_eq!(call.kind(), TxKind::FeeMarket);
        assert_eq!(call.kind().type_byte(), Some(0x02));
        assert!(call.is_contract_call());
        assert_eq!(call.nonce(), 5);
        assert_eq!(call.chain_id(), 1);
    }

    #[test]
    fn test_json_shape() {
        let tx = UnsignedTransaction::FeeMarketTransfer {
            common: common(),
            fees: FeeMarketFees {
                max_priority_fee_per_gas: U256::from(1u64),
                max_fee_per_gas: U256::from(2u64),
            },
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["kind"], "fee_market_transfer");
        assert_eq!(json["nonce"], 5);
        assert_eq!(json["data"], "0x");
        assert_eq!(json["to"], "0xabababababababababababababababababababab");
    }
}
