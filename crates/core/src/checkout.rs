//! Two-step checkout state machine.
//!
//! ```text
//!            Begin (cart not empty)
//!   Cart ───────────────────────────▶ CustomerInfo
//!    ▲                                   │
//!    └──── Back / Submit (success) ◀─────┘
//! ```
//!
//! The flow is driven by explicit [`CheckoutCommand`]s so that the web
//! layer only translates requests into commands. Rejected commands never
//! change the step or the cart.

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::catalog::Company;
use crate::order::{OrderError, OrderForm, OrderLink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckoutStep {
    /// Reviewing the cart.
    #[default]
    Cart,
    /// Filling in name, order type, address and payment method.
    CustomerInfo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutCommand {
    Begin,
    Back,
    Submit(OrderForm),
}

/// What a successful command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Moved to the customer details step.
    DetailsRequested,
    /// Moved back to the cart; typed details are discarded.
    ReturnedToCart,
    /// The order was formatted, the cart emptied and the flow reset.
    Submitted(OrderLink),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Tu carrito está vacío")]
    EmptyCart,
    #[error("Completa tus datos para enviar el pedido")]
    NotCollectingDetails,
    #[error(transparent)]
    Order(#[from] OrderError),
}

/// The checkout flow for one cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckoutFlow {
    step: CheckoutStep,
}

impl CheckoutFlow {
    /// A new flow, positioned at the cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            step: CheckoutStep::Cart,
        }
    }

    /// Continue a flow whose step was persisted between requests.
    #[must_use]
    pub const fn resume(step: CheckoutStep) -> Self {
        Self { step }
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Apply a command.
    ///
    /// `Submit` validates the form, checks the cart and the restaurant's
    /// number, builds the [`OrderLink`], clears `cart` and resets to
    /// [`CheckoutStep::Cart`].
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`] when beginning or submitting with an
    ///   empty cart.
    /// - [`CheckoutError::NotCollectingDetails`] when submitting from the
    ///   cart step.
    /// - [`CheckoutError::Order`] when the form is incomplete or the
    ///   restaurant has no WhatsApp number.
    pub fn handle(
        &mut self,
        command: CheckoutCommand,
        cart: &mut Cart,
        company: &Company,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        match command {
            CheckoutCommand::Begin => {
                if cart.is_empty() {
                    return Err(CheckoutError::EmptyCart);
                }
                self.step = CheckoutStep::CustomerInfo;
                Ok(CheckoutOutcome::DetailsRequested)
            }
            CheckoutCommand::Back => {
                self.step = CheckoutStep::Cart;
                Ok(CheckoutOutcome::ReturnedToCart)
            }
            CheckoutCommand::Submit(form) => {
                if self.step != CheckoutStep::CustomerInfo {
                    return Err(CheckoutError::NotCollectingDetails);
                }
                let details = form.validate()?;
                if cart.is_empty() {
                    return Err(CheckoutError::EmptyCart);
                }
                let link = OrderLink::build(company, &details, cart)?;

                cart.clear();
                self.step = CheckoutStep::Cart;
                Ok(CheckoutOutcome::Submitted(link))
            }
        }
    }
}
