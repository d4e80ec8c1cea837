//! MenuDigital Core - Shared domain library.
//!
//! This crate provides the types and pure logic used by every MenuDigital
//! component:
//! - `storefront` - Public menu page with cart and WhatsApp checkout
//! - `admin` - Restaurant owner panel (catalog, profile, settings)
//! - `cli` - Command-line tools for session migrations and demo seeding
//!
//! # Architecture
//!
//! The core crate performs no I/O: no database access, no HTTP clients, no
//! sessions. Persistence of the cart and delivery of the order link are the
//! callers' concern, which keeps every rule here unit-testable.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, slugs, emails and enums
//! - [`catalog`] - Tenant, category and product records plus menu grouping
//! - [`cart`] - The cart aggregate
//! - [`checkout`] - Two-step checkout state machine
//! - [`order`] - WhatsApp order message and deep link formatting

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod order;
pub mod types;

pub use cart::{Cart, CartItem};
pub use catalog::{Category, Company, Menu, MenuSection, Product, next_display_order, resequence};
pub use checkout::{CheckoutCommand, CheckoutError, CheckoutFlow, CheckoutOutcome, CheckoutStep};
pub use order::{OrderDetails, OrderError, OrderForm, OrderLink};
pub use types::*;
