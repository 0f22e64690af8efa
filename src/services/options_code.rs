//! Compact options codes: `TICKER YYMMDD C|P STRIKE*1000`, no separators.
//!
//! The ticker is 1 to 4 characters and the strike is always eight digits of
//! thousandths, so a code is 16 to 19 characters long.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::OptionsCodeError;
use crate::models::{ContractType, OptionContract};

const MIN_LEN: usize = 16;
const MAX_LEN: usize = 19;
const STRIKE_DIGITS: usize = 8;

static TWO_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}$").expect("two digit regex"));
static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").expect("digits regex"));
static TICKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{1,4}$").expect("ticker regex"));
static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^20\d{2}$").expect("year regex"));

/// Splits a code into its contract fields.
///
/// The strike field must be all digits; a decimal point such as `0450.000`
/// is rejected as `InvalidStrike`.
pub fn decode(code: &str) -> Result<OptionContract, OptionsCodeError> {
    let len = code.len();
    if !(MIN_LEN..=MAX_LEN).contains(&len) {
        return Err(OptionsCodeError::InvalidLength {
            code: code.to_string(),
            len,
        });
    }
    if !code.is_ascii() {
        return Err(OptionsCodeError::InvalidField {
            field: "code",
            value: code.to_string(),
        });
    }

    let o = len - MIN_LEN;

    let ticker = &code[..o + 1];
    let yy = &code[o + 1..o + 3];
    let month = &code[o + 3..o + 5];
    let day = &code[o + 5..o + 7];
    let kind = &code[o + 7..o + 8];
    let strike_raw = &code[o + 8..];

    for (field, value) in [("year", yy), ("month", month), ("day", day)] {
        if !TWO_DIGITS.is_match(value) {
            return Err(OptionsCodeError::InvalidField {
                field,
                value: value.to_string(),
            });
        }
    }

    let contract_type =
        ContractType::from_code(kind).ok_or_else(|| OptionsCodeError::InvalidContractType {
            code: code.to_string(),
            raw: kind.to_string(),
        })?;

    let invalid_strike = || OptionsCodeError::InvalidStrike {
        code: code.to_string(),
        raw: strike_raw.to_string(),
    };
    if !DIGITS.is_match(strike_raw) {
        return Err(invalid_strike());
    }
    let thousandths = Decimal::from_str(strike_raw).map_err(|_| invalid_strike())?;

    Ok(OptionContract {
        ticker: ticker.to_string(),
        contract_type,
        expiry_day: day.to_string(),
        expiry_month: month.to_string(),
        expiry_year: format!("20{yy}"),
        strike: (thousandths / Decimal::ONE_THOUSAND).normalize(),
    })
}

pub fn encode(contract: &OptionContract) -> Result<String, OptionsCodeError> {
    let invalid = |field: &'static str, value: &str| OptionsCodeError::InvalidField {
        field,
        value: value.to_string(),
    };

    if !TICKER.is_match(&contract.ticker) {
        return Err(invalid("ticker", &contract.ticker));
    }
    if !YEAR.is_match(&contract.expiry_year) {
        return Err(invalid("year", &contract.expiry_year));
    }
    if !TWO_DIGITS.is_match(&contract.expiry_month) {
        return Err(invalid("month", &contract.expiry_month));
    }
    if !TWO_DIGITS.is_match(&contract.expiry_day) {
        return Err(invalid("day", &contract.expiry_day));
    }

    let strike = contract.strike;
    let thousandths = strike
        .checked_mul(Decimal::ONE_THOUSAND)
        .filter(|t| !t.is_sign_negative() && t.fract().is_zero())
        .and_then(|t| t.to_u64())
        .filter(|t| *t < 10u64.pow(STRIKE_DIGITS as u32))
        .ok_or_else(|| invalid("strike", &strike.to_string()))?;

    Ok(format!(
        "{}{}{}{}{}{:0width$}",
        contract.ticker,
        &contract.expiry_year[2..],
        contract.expiry_month,
        contract.expiry_day,
        contract.contract_type.code_char(),
        thousandths,
        width = STRIKE_DIGITS
    ))
}
