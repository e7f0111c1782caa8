use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trading currencies with their minor-unit precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// UAE Dirham
    AED,
    /// Bahraini Dinar (3 decimal places)
    BHD,
    EUR,
    GBP,
    INR,
    /// Japanese Yen (no decimal places)
    JPY,
    /// Kuwaiti Dinar (3 decimal places)
    KWD,
    /// Omani Rial (3 decimal places)
    OMR,
    QAR,
    SAR,
    #[default]
    USD,
}

impl Currency {
    /// Returns the decimal scale for this currency
    /// - BHD/KWD/OMR: 3
    /// - JPY: 0
    /// - everything else: 2
    pub fn scale(&self) -> u32 {
        match self {
            Currency::BHD | Currency::KWD | Currency::OMR => 3,
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Rounds a decimal value to the appropriate scale for this currency
    pub fn round(&self, amount: Decimal) -> Decimal {
        amount.round_dp(self.scale())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::AED => "AED",
            Currency::BHD => "BHD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::INR => "INR",
            Currency::JPY => "JPY",
            Currency::KWD => "KWD",
            Currency::OMR => "OMR",
            Currency::QAR => "QAR",
            Currency::SAR => "SAR",
            Currency::USD => "USD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AED" => Ok(Currency::AED),
            "BHD" => Ok(Currency::BHD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "INR" => Ok(Currency::INR),
            "JPY" => Ok(Currency::JPY),
            "KWD" => Ok(Currency::KWD),
            "OMR" => Ok(Currency::OMR),
            "QAR" => Ok(Currency::QAR),
            "SAR" => Ok(Currency::SAR),
            "USD" => Ok(Currency::USD),
            _ => Err(format!("Invalid currency: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_currency_scale() {
        assert_eq!(Currency::BHD.scale(), 3);
        assert_eq!(Currency::JPY.scale(), 0);
        assert_eq!(Currency::USD.scale(), 2);
        assert_eq!(Currency::AED.scale(), 2);
    }

    #[test]
    fn test_currency_rounding() {
        // BHD (3 decimal places): 10.12345 -> 10.123
        assert_eq!(
            Currency::BHD.round(Decimal::new(1012345, 5)),
            Decimal::new(10123, 3)
        );
        // USD: 10.0055 rounds to 10.01
        assert_eq!(
            Currency::USD.round(Decimal::new(100055, 4)),
            Decimal::new(1001, 2)
        );
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!(Currency::from_str("bhd").unwrap(), Currency::BHD);
        assert!(Currency::from_str("XYZ").is_err());
        assert_eq!(Currency::default(), Currency::USD);
    }
}
