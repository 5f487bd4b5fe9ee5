//! Read-only ERC-20 queries over `eth_call`

use bigdecimal::BigDecimal;
use ethers_core::types::U256;
use serde::Serialize;
use std::fmt;

use crate::abi::{decode_result, encode_call, format_token_amount, AbiValue, DecodedValue, Erc20Function};
use crate::error::{ToolError, ToolResult};
use crate::log_debug;
use crate::rpc::NodeRpc;
use crate::types::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenQueryKind {
    Symbol,
    Name,
    Decimals,
    BalanceOf(Address),
}

impl TokenQueryKind {
    pub fn function(&self) -> Erc20Function {
        match self {
            TokenQueryKind::Symbol => Erc20Function::Symbol,
            TokenQueryKind::Name => Erc20Function::Name,
            TokenQueryKind::Decimals => Erc20Function::Decimals,
            TokenQueryKind::BalanceOf(_) => Erc20Function::BalanceOf,
        }
    }

    fn inputs(&self) -> Vec<AbiValue> {
        match self {
            TokenQueryKind::BalanceOf(owner) => vec![AbiValue::Address(*owner)],
            _ => Vec::new(),
        }
    }
}

/// One read-only call against a token contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenQuery {
    pub contract: Address,
    pub caller: Address,
    pub kind: TokenQueryKind,
}

/// Token balance with its display precision
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenBalance {
    pub raw: U256,
    pub decimals: u8,
    pub symbol: String,
    /// `raw / 10^decimals`
    pub amount: BigDecimal,
}

impl fmt::Display for TokenBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.symbol)
    }
}

pub struct TokenService<'a> {
    rpc: &'a dyn NodeRpc,
}

impl<'a> TokenService<'a> {
    pub fn new(rpc: &'a dyn NodeRpc) -> Self {
        Self { rpc }
    }

    pub fn query(&self, query: &TokenQuery) -> ToolResult<DecodedValue> {
        let function = query.kind.function();
        let step = format!("token {}", function.name());

        let calldata = encode_call(function, &query.kind.inputs()).map_err(|e| e.context(&step))?;
        let response = self
            .rpc
            .call(query.caller, query.contract, &calldata)
            .map_err(|e| e.context(&step))?;

        log_debug!(
            "token",
            "Contract call answered",
            contract = query.contract,
            function = function.name(),
            response_len = response.len(),
        );

        decode_result(&response, function.output()).map_err(|e| ToolError::from(e).context(&step))
    }

    pub fn symbol(&self, contract: Address, caller: Address) -> ToolResult<String> {
        let value = self.query(&TokenQuery {
            contract,
            caller,
            kind: TokenQueryKind::Symbol,
        })?;
        Ok(value.into_string()?)
    }

    pub fn name(&self, contract: Address, caller: Address) -> ToolResult<String> {
        let value = self.query(&TokenQuery {
            contract,
            caller,
            kind: TokenQueryKind::Name,
        })?;
        Ok(value.into_string()?)
    }

    pub fn decimals(&self, contract: Address, caller: Address) -> ToolResult<u8> {
        let value = self
            .query(&TokenQuery {
                contract,
                caller,
                kind: TokenQueryKind::Decimals,
            })?
            .into_uint()?;
        if value > U256::from(u8::MAX) {
            return Err(ToolError::encoding(format!("decimals() returned {}", value)));
        }
        Ok(value.low_u64() as u8)
    }

    pub fn balance_of(&self, contract: Address, caller: Address, owner: Address) -> ToolResult<U256> {
        let value = self.query(&TokenQuery {
            contract,
            caller,
            kind: TokenQueryKind::BalanceOf(owner),
        })?;
        Ok(value.into_uint()?)
    }

    /// Balance of `owner` scaled by the token's decimals
    pub fn token_balance(&self, contract: Address, owner: Address) -> ToolResult<TokenBalance> {
        let raw = self.balance_of(contract, owner, owner)?;
        let decimals = self.decimals(contract, owner)?;
        let symbol = self.symbol(contract, owner)?;

        Ok(TokenBalance {
            raw,
            decimals,
            symbol,
            amount: format_token_amount(raw, decimals),
        })
    }
}
