// Price formatting for tour cards

use crate::locale::{Locale, Localizer, DEFAULT_FROM_TEXT};
use std::fmt;
use std::sync::Arc;

pub const CURRENCY_SYMBOL: &str = "€";

const RU_GROUP_SEPARATOR: char = '\u{a0}';

// Output is used as-is, even for missing amounts
pub trait CurrencyFormatter: Send + Sync {
    fn format_price(&self, amount: Option<f64>) -> String;
}

#[derive(Clone)]
pub struct PriceFormatter {
    locale: Locale,
    localizer: Arc<dyn Localizer>,
    currency: Option<Arc<dyn CurrencyFormatter>>,
}

impl fmt::Debug for PriceFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriceFormatter")
            .field("locale", &self.locale)
            .field("external_currency", &self.currency.is_some())
            .finish()
    }
}

impl PriceFormatter {
    pub fn new(locale: Locale, localizer: Arc<dyn Localizer>) -> Self {
        Self {
            locale,
            localizer,
            currency: None,
        }
    }

    pub fn with_currency_formatter(mut self, currency: Arc<dyn CurrencyFormatter>) -> Self {
        self.currency = Some(currency);
        self
    }

    // Zero is treated like a missing price and renders nothing
    pub fn format(&self, amount: Option<f64>) -> String {
        if let Some(currency) = &self.currency {
            return currency.format_price(amount);
        }

        match amount {
            Some(value) if value != 0.0 && !value.is_nan() => {
                let from = self.localizer.text_or("common", "from", DEFAULT_FROM_TEXT);
                format!(
                    "{} {}{}",
                    from,
                    group_number(value, self.locale),
                    CURRENCY_SYMBOL
                )
            }
            _ => String::new(),
        }
    }
}

// Thousands grouping with at most three fraction digits
pub fn group_number(value: f64, locale: Locale) -> String {
    let (group_separator, decimal_separator) = match locale {
        Locale::Ru => (RU_GROUP_SEPARATOR, ','),
        Locale::En => (',', '.'),
    };

    let fixed = format!("{:.3}", value.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let digits: Vec<char> = integer.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    if value < 0.0 && (integer != "0" || !fraction.is_empty()) {
        grouped.push('-');
    }
    for (index, digit) in digits.iter().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(group_separator);
        }
        grouped.push(*digit);
    }

    if !fraction.is_empty() {
        grouped.push(decimal_separator);
        grouped.push_str(fraction);
    }

    grouped
}
