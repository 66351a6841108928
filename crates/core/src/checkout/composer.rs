//! Order summary text for the chat hand-off.

use core::fmt;
use std::fmt::Write as _;

use crate::types::LineItem;

/// Errors that stop a checkout before any navigation happens.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutError {
    /// There is nothing to order.
    #[error("cart is empty")]
    EmptyCart,
}

/// Fixed text around the item listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    /// First line of the message.
    pub greeting: String,
    /// Lines appended after the total.
    pub closing: Vec<String>,
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self {
            greeting: "Hello! I would like to request the following products:".to_string(),
            closing: [
                "To complete my order, please let me know:",
                "- Price and availability",
                "- Delivery or application options",
                "- Accepted payment methods",
                "",
                "My details:",
                "- Name:",
                "- Address:",
                "- Phone:",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// A composed order summary, ready to be URL-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutMessage(String);

impl CheckoutMessage {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CheckoutMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CheckoutMessage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Renders cart lines into a [`CheckoutMessage`].
///
/// Output depends only on the template and the items, so the same cart
/// always produces byte-identical text.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    template: MessageTemplate,
}

impl Composer {
    #[must_use]
    pub const fn new(template: MessageTemplate) -> Self {
        Self { template }
    }

    #[must_use]
    pub const fn template(&self) -> &MessageTemplate {
        &self.template
    }

    /// Compose the order summary.
    ///
    /// Layout: greeting, one numbered block per line (name, category when
    /// present, quantity), the summed quantity, then the closing lines.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] when `items` is empty.
    pub fn compose(&self, items: &[LineItem]) -> Result<CheckoutMessage, CheckoutError> {
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let mut out = String::new();
        out.push_str(&self.template.greeting);
        out.push_str("\n\n");

        let mut total: u32 = 0;
        for (index, item) in items.iter().enumerate() {
            total = total.saturating_add(item.quantity);
            // Writing to a String cannot fail.
            let _ = writeln!(out, "{}. {}", index + 1, item.name);
            if !item.category.is_empty() {
                let _ = writeln!(out, "   Category: {}", item.category);
            }
            let _ = writeln!(out, "   Quantity: {}", item.quantity);
            out.push('\n');
        }

        let _ = writeln!(out, "Total items: {total}");

        if !self.template.closing.is_empty() {
            out.push('\n');
            out.push_str(&self.template.closing.join("\n"));
        }

        Ok(CheckoutMessage(out.trim_end().to_string()))
    }
}

/// Compose with the built-in template.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] when `items` is empty.
pub fn compose(items: &[LineItem]) -> Result<CheckoutMessage, CheckoutError> {
    Composer::default().compose(items)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::ItemId;

    fn item(id: &str, name: &str, category: &str, quantity: u32) -> LineItem {
        LineItem {
            id: ItemId::parse(id).unwrap(),
            name: name.to_string(),
            category: category.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_empty_cart_is_refused() {
        assert_eq!(compose(&[]), Err(CheckoutError::EmptyCart));
    }

    #[test]
    fn test_golden_output() {
        let items = vec![
            item("A", "Termite Bait", "Baiting", 3),
            item("B", "Roach Gel", "", 1),
        ];

        let expected = "\
Hello! I would like to request the following products:

1. Termite Bait
   Category: Baiting
   Quantity: 3

2. Roach Gel
   Quantity: 1

Total items: 4

To complete my order, please let me know:
- Price and availability
- Delivery or application options
- Accepted payment methods

My details:
- Name:
- Address:
- Phone:";

        assert_eq!(compose(&items).unwrap().as_str(), expected);
    }

    #[test]
    fn test_deterministic() {
        let items = vec![item("A", "Termite Bait", "Baiting", 2)];
        assert_eq!(compose(&items).unwrap(), compose(&items).unwrap());
    }

    #[test]
    fn test_custom_template_without_closing() {
        let composer = Composer::new(MessageTemplate {
            greeting: "Order:".to_string(),
            closing: Vec::new(),
        });
        let message = composer
            .compose(&[item("A", "Mouse Trap", "Traps", 1)])
            .unwrap();

        assert_eq!(
            message.as_str(),
            "Order:\n\n1. Mouse Trap\n   Category: Traps\n   Quantity: 1\n\nTotal items: 1"
        );
    }
}
