use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractType {
    Call,
    Put,
}

impl ContractType {
    pub fn code_char(&self) -> char {
        match self {
            ContractType::Call => 'C',
            ContractType::Put => 'P',
        }
    }

    pub fn from_code(raw: &str) -> Option<Self> {
        match raw {
            "C" => Some(ContractType::Call),
            "P" => Some(ContractType::Put),
            _ => None,
        }
    }
}

/// Decoded form of an options code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionContract {
    pub ticker: String,
    pub contract_type: ContractType,
    // zero padded: "07", "2024"
    pub expiry_day: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub strike: Decimal,
}

impl fmt::Display for OptionContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.contract_type {
            ContractType::Call => "CALL",
            ContractType::Put => "PUT",
        };
        write!(
            f,
            "{} {}/{}/{} ${} {}",
            self.ticker,
            self.expiry_month,
            self.expiry_day,
            self.expiry_year,
            self.strike.normalize(),
            kind
        )
    }
}
