use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use thiserror::Error;

use crate::checkout::format::format_price;
use crate::config::CheckoutConfig;
use crate::container::selectors;
use crate::item::Item;

const MESSAGING_BASE_URL: &str = "https://wa.me";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Nothing available to order")]
    EmptyOrder,

    #[error("No messaging contact configured for checkout")]
    MissingContact,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub name: String,
    pub quantity: u32,
    pub line_total: f64,
}

/// An order ready to hand off, built from the available items of a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub lines: Vec<OrderLine>,
    pub total: f64,
    currency_symbol: String,
    greeting: String,
    phone: Option<String>,
}

impl OrderSummary {
    /// Out-of-stock items are left out; an order with nothing available
    /// is an error.
    pub fn build(items: &[Item], config: &CheckoutConfig) -> Result<Self, CheckoutError> {
        let lines: Vec<OrderLine> = selectors::available_items(items)
            .map(|item| OrderLine {
                name: item.name.clone(),
                quantity: item.quantity,
                line_total: item.line_total(),
            })
            .collect();

        if lines.is_empty() {
            return Err(CheckoutError::EmptyOrder);
        }

        Ok(Self {
            lines,
            total: selectors::subtotal(items),
            currency_symbol: config.currency_symbol.clone(),
            greeting: config.greeting.clone(),
            phone: config.phone.clone(),
        })
    }

    /// Plain-text order message.
    pub fn render(&self) -> String {
        let mut text = String::new();
        text.push_str(&self.greeting);
        text.push('\n');
        for (n, line) in self.lines.iter().enumerate() {
            text.push_str(&format!(
                "{}. {} x{} - {}\n",
                n + 1,
                line.name,
                line.quantity,
                format_price(line.line_total, &self.currency_symbol)
            ));
        }
        text.push_str(&format!(
            "Total: {}",
            format_price(self.total, &self.currency_symbol)
        ));
        text
    }

    /// Messaging link carrying the rendered order as its prefilled text.
    pub fn messaging_link(&self) -> Result<String, CheckoutError> {
        let digits: String = self
            .phone
            .as_deref()
            .unwrap_or_default()
            .chars()
            .filter(char::is_ascii_digit)
            .collect();

        if digits.is_empty() {
            return Err(CheckoutError::MissingContact);
        }

        Ok(format!(
            "{}/{}?text={}",
            MESSAGING_BASE_URL,
            digits,
            utf8_percent_encode(&self.render(), NON_ALPHANUMERIC)
        ))
    }
}
