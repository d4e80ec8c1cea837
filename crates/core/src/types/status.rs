//! Status and choice enums.
//!
//! Wire values are the lowercase strings stored by the backend and posted
//! by the HTML forms; `label()` gives the Spanish text shown to people and
//! written into order messages.

use serde::{Deserialize, Serialize};

/// Whether a product is offered on the public menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
}

impl ProductStatus {
    /// Map the admin form's "active" checkbox onto a status.
    #[must_use]
    pub const fn from_checkbox(checked: bool) -> Self {
        if checked { Self::Active } else { Self::Inactive }
    }

    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Activo",
            Self::Inactive => "Inactivo",
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

/// How the customer receives the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Customer collects at the restaurant.
    #[default]
    Pickup,
    /// Restaurant delivers to an address.
    Delivery,
}

impl OrderType {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pickup => "Recoger en local",
            Self::Delivery => "Servicio a domicilio",
        }
    }

    /// Whether an address must accompany the order.
    #[must_use]
    pub const fn requires_address(self) -> bool {
        matches!(self, Self::Delivery)
    }
}

/// How the customer intends to pay. Payment itself happens outside the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Transfer,
}

impl PaymentMethod {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cash => "Efectivo",
            Self::Transfer => "Transferencia",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values() {
        assert_eq!(serde_json::to_string(&ProductStatus::Inactive).unwrap(), "\"inactive\"");
        assert_eq!(
            serde_json::from_str::<OrderType>("\"delivery\"").unwrap(),
            OrderType::Delivery
        );
        assert_eq!(
            serde_json::from_str::<PaymentMethod>("\"transfer\"").unwrap(),
            PaymentMethod::Transfer
        );
    }

    #[test]
    fn test_defaults_match_the_customer_form() {
        assert_eq!(OrderType::default(), OrderType::Pickup);
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
    }

    #[test]
    fn test_only_delivery_requires_address() {
        assert!(OrderType::Delivery.requires_address());
        assert!(!OrderType::Pickup.requires_address());
    }

    #[test]
    fn test_checkbox_mapping() {
        assert_eq!(ProductStatus::from_checkbox(true), ProductStatus::Active);
        assert_eq!(ProductStatus::from_checkbox(false), ProductStatus::Inactive);
    }
}
