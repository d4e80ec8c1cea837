//! Core types for MenuDigital.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod color;
pub mod email;
pub mod id;
pub mod price;
pub mod slug;
pub mod status;
pub mod whatsapp;

pub use color::{ColorError, ThemeColor};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use slug::{Slug, SlugError};
pub use status::*;
pub use whatsapp::{WhatsAppError, WhatsAppNumber};
