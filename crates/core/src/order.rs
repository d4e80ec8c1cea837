//! Order message formatting and the WhatsApp deep link.
//!
//! Orders are never stored. They are rendered into a fixed Spanish text
//! message and handed to WhatsApp through a `https://wa.me/` link that the
//! customer's browser opens.

use std::fmt::Write as _;

use serde::Deserialize;

use crate::cart::Cart;
use crate::catalog::Company;
use crate::types::{OrderType, PaymentMethod};

/// Base of every order link.
pub const WHATSAPP_BASE_URL: &str = "https://wa.me/";

/// Reasons an order cannot be formatted.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("Por favor ingresa tu nombre")]
    MissingCustomerName,
    #[error("Por favor ingresa tu dirección")]
    MissingAddress,
    #[error("No se encontró el número de WhatsApp del restaurante")]
    MissingWhatsApp,
}

/// Customer details as posted by the checkout form, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrderForm {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub order_type: OrderType,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub address: String,
}

impl OrderForm {
    /// Validate and normalize the form.
    ///
    /// The name is checked first. Delivery orders need a non-blank address;
    /// pickup orders drop whatever address was typed.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::MissingCustomerName`] or
    /// [`OrderError::MissingAddress`].
    pub fn validate(self) -> Result<OrderDetails, OrderError> {
        let customer_name = self.customer_name.trim();
        if customer_name.is_empty() {
            return Err(OrderError::MissingCustomerName);
        }

        let address = if self.order_type.requires_address() {
            let address = self.address.trim();
            if address.is_empty() {
                return Err(OrderError::MissingAddress);
            }
            Some(address.to_owned())
        } else {
            None
        };

        Ok(OrderDetails {
            customer_name: customer_name.to_owned(),
            order_type: self.order_type,
            payment_method: self.payment_method,
            address,
        })
    }
}

/// Validated customer details. Only obtainable through [`OrderForm::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDetails {
    customer_name: String,
    order_type: OrderType,
    payment_method: PaymentMethod,
    address: Option<String>,
}

impl OrderDetails {
    #[must_use]
    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    #[must_use]
    pub const fn order_type(&self) -> OrderType {
        self.order_type
    }

    #[must_use]
    pub const fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Present exactly when the order is a delivery.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }
}

/// A formatted order ready to open in WhatsApp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLink {
    pub message: String,
    pub url: String,
}

impl OrderLink {
    /// Format the order and build its link to the restaurant's number.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::MissingWhatsApp`] if the restaurant has no
    /// usable number configured.
    pub fn build(company: &Company, details: &OrderDetails, cart: &Cart) -> Result<Self, OrderError> {
        let number = company
            .whatsapp_number()
            .ok_or(OrderError::MissingWhatsApp)?;
        let message = format_message(&company.name, details, cart);
        let url = format!(
            "{WHATSAPP_BASE_URL}{number}?text={}",
            encode_uri_component(&message)
        );
        Ok(Self { message, url })
    }
}

/// Render the order message.
///
/// Each cart line shows its total in shortest form (`$7.5`); the grand total
/// always has two decimals (`$7.50`).
#[must_use]
pub fn format_message(restaurant: &str, details: &OrderDetails, cart: &Cart) -> String {
    let mut message = String::new();
    let _ = write!(
        message,
        "Hola, quiero hacer un pedido:\n\n\
         🏪 Restaurante: {restaurant}\n\n\
         👤 Cliente: {}\n\
         📦 Tipo de pedido: {}\n",
        details.customer_name,
        details.order_type.label(),
    );
    if let Some(address) = &details.address {
        let _ = writeln!(message, "🏠 Dirección: {address}");
    }
    let _ = write!(
        message,
        "💳 Pago: {}\n\n🛒 Pedido:\n",
        details.payment_method.label()
    );

    let lines: Vec<String> = cart
        .items()
        .iter()
        .map(|item| {
            format!(
                "- {} x{} (${})",
                item.name,
                item.quantity,
                item.line_total().compact()
            )
        })
        .collect();
    message.push_str(&lines.join("\n"));

    let _ = write!(message, "\n\nTotal: ${}\n\nGracias!", cart.total().fixed());
    message
}

/// Percent-encode like JavaScript's `encodeURIComponent`.
///
/// [`urlencoding::encode`] leaves only `A-Z a-z 0-9 - . _ ~` unescaped;
/// `encodeURIComponent` additionally keeps `! ' ( ) *` literal.
#[must_use]
pub fn encode_uri_component(input: &str) -> String {
    urlencoding::encode(input)
        .replace("%21", "!")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
        .replace("%2A", "*")
}
