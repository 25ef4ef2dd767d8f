use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub const BASE_CURRENCY: &str = "USD";

/// Currencies offered when the live rate source is unreachable
pub const FALLBACK_CURRENCIES: [&str; 7] = ["USD", "INR", "EUR", "GBP", "JPY", "CAD", "AUD"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("Could not find exchange rate for {0}")]
    RateUnavailable(String),
}

/// Where a rate table came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    Live,
    Fallback,
}

/// Rates relative to USD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateTable {
    pub base: String,
    pub rates: BTreeMap<String, f64>,
    pub source: RateSource,
    pub fetched_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl ExchangeRateTable {
    /// Table built from a successful fetch; codes are normalised to upper case.
    /// Zero, negative and non-finite rates are dropped and count as unavailable.
    pub fn live(rates: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self {
            base: BASE_CURRENCY.to_string(),
            rates: rates
                .into_iter()
                .filter(|(_, rate)| rate.is_finite() && *rate > 0.0)
                .map(|(code, rate)| (code.to_ascii_uppercase(), rate))
                .collect(),
            source: RateSource::Live,
            fetched_at: Some(chrono::Utc::now()),
        }
    }

    /// Static table with no numeric rates; only USD converts
    pub fn fallback() -> Self {
        Self {
            base: BASE_CURRENCY.to_string(),
            rates: BTreeMap::new(),
            source: RateSource::Fallback,
            fetched_at: None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == RateSource::Fallback
    }

    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(&code.to_ascii_uppercase()).copied()
    }
}

/// Codes to offer in the "convert to" list, USD always first
pub fn currency_options(table: &ExchangeRateTable) -> Vec<String> {
    if table.is_fallback() {
        return FALLBACK_CURRENCIES.iter().map(|c| c.to_string()).collect();
    }

    // BTreeMap keys are already sorted
    std::iter::once(BASE_CURRENCY.to_string())
        .chain(table.rates.keys().filter(|code| *code != BASE_CURRENCY).cloned())
        .collect()
}

/// Convert a USD amount into `target`
pub fn convert(amount_usd: f64, target: &str, rates: &ExchangeRateTable) -> Result<f64, ConversionError> {
    let target = target.trim().to_ascii_uppercase();
    if target == BASE_CURRENCY {
        return Ok(amount_usd);
    }

    rates
        .rate(&target)
        .map(|rate| amount_usd * rate)
        .ok_or(ConversionError::RateUnavailable(target))
}

/// Render an amount with thousands separators and two decimals, e.g. `1,234.50`
pub fn format_amount(amount: f64) -> String {
    let rendered = format!("{:.2}", amount.abs());
    let (whole, fraction) = rendered.split_once('.').unwrap_or((rendered.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ExchangeRateTable {
        ExchangeRateTable::live(vec![
            ("USD".to_string(), 1.0),
            ("EUR".to_string(), 0.92),
            ("INR".to_string(), 83.1),
            ("AED".to_string(), 3.67),
        ])
    }

    #[test]
    fn test_usd_identity() {
        for amount in [0.0, 1.5, 123_456.78, -10.0] {
            assert_eq!(convert(amount, "USD", &sample()), Ok(amount));
            assert_eq!(convert(amount, "USD", &ExchangeRateTable::fallback()), Ok(amount));
        }
    }

    #[test]
    fn test_convert_known_rate() {
        let converted = convert(100_000.0, "INR", &sample()).unwrap();
        assert!((converted - 8_310_000.0).abs() < 1e-6);
        assert!(convert(100.0, "eur", &sample()).is_ok());
    }

    #[test]
    fn test_convert_is_linear() {
        let table = sample();
        for code in ["EUR", "INR", "AED"] {
            let single = convert(50_000.0, code, &table).unwrap();
            let double = convert(100_000.0, code, &table).unwrap();
            assert!((double - 2.0 * single).abs() < 1e-6, "{} not linear", code);
        }
    }

    #[test]
    fn test_rate_unavailable() {
        assert_eq!(
            convert(1.0, "INR", &ExchangeRateTable::fallback()),
            Err(ConversionError::RateUnavailable("INR".to_string()))
        );
        assert!(convert(1.0, "XYZ", &sample()).is_err());
    }

    #[test]
    fn test_unusable_rates_are_unavailable() {
        let table = ExchangeRateTable::live(vec![
            ("EUR".to_string(), 0.92),
            ("XAU".to_string(), 0.0),
            ("XAG".to_string(), -1.5),
            ("XPT".to_string(), f64::NAN),
            ("XPD".to_string(), f64::INFINITY),
        ]);

        for code in ["XAU", "XAG", "XPT", "XPD"] {
            assert_eq!(
                convert(100.0, code, &table),
                Err(ConversionError::RateUnavailable(code.to_string()))
            );
        }
        assert_eq!(currency_options(&table), vec!["USD", "EUR"]);
    }

    #[test]
    fn test_options_live_sorted_usd_first() {
        assert_eq!(currency_options(&sample()), vec!["USD", "AED", "EUR", "INR"]);
    }

    #[test]
    fn test_options_fallback_literal() {
        assert_eq!(
            currency_options(&ExchangeRateTable::fallback()),
            vec!["USD", "INR", "EUR", "GBP", "JPY", "CAD", "AUD"]
        );
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(999.999), "1,000.00");
        assert_eq!(format_amount(123_456.784), "123,456.78");
        assert_eq!(format_amount(1_234_567.0), "1,234,567.00");
        assert_eq!(format_amount(-1234.5), "-1,234.50");
    }
}
