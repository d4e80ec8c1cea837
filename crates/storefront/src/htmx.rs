//! HTMX response headers.
//!
//! Toast notifications and cross-component refreshes ride on `HX-Trigger`.
//! The page script listens for the `toast` event and shows `message`.

use std::convert::Infallible;

use axum::http::{HeaderName, HeaderValue};
use axum::response::{IntoResponseParts, ResponseParts};
use serde::Serialize;
use serde_json::{Map, Value};

/// Event emitted after any cart mutation so badges and panels refresh.
pub const CART_UPDATED: &str = "cart-updated";

const HX_TRIGGER: HeaderName = HeaderName::from_static("hx-trigger");
const HX_REDIRECT: HeaderName = HeaderName::from_static("hx-redirect");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Error,
}

/// A transient notification shown to the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }
}

/// Collects client-side events for a single `HX-Trigger` header.
#[derive(Debug, Default, Clone)]
pub struct HxTrigger {
    events: Map<String, Value>,
}

impl HxTrigger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn event(mut self, name: &str) -> Self {
        self.events.insert(name.to_string(), Value::Null);
        self
    }

    #[must_use]
    pub fn toast(mut self, toast: Toast) -> Self {
        let detail = serde_json::to_value(toast).unwrap_or(Value::Null);
        self.events.insert("toast".to_string(), detail);
        self
    }

    /// The header value. Non-ASCII is escaped so browsers decode it intact.
    fn header_value(&self) -> Option<HeaderValue> {
        let json = serde_json::to_string(&self.events).ok()?;
        HeaderValue::from_str(&escape_non_ascii(&json)).ok()
    }
}

impl From<Toast> for HxTrigger {
    fn from(toast: Toast) -> Self {
        Self::new().toast(toast)
    }
}

impl IntoResponseParts for HxTrigger {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if let Some(value) = self.header_value() {
            res.headers_mut().insert(HX_TRIGGER, value);
        }
        Ok(res)
    }
}

/// Full-page client redirect performed by htmx, used for the WhatsApp link.
#[derive(Debug, Clone)]
pub struct HxRedirect(pub String);

impl IntoResponseParts for HxRedirect {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if let Ok(value) = HeaderValue::from_str(&self.0) {
            res.headers_mut().insert(HX_REDIRECT, value);
        }
        Ok(res)
    }
}

/// Escape every non-ASCII character as a JSON `\uXXXX` sequence.
fn escape_non_ascii(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0_u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_combines_events_and_toast() {
        let trigger = HxTrigger::new()
            .event(CART_UPDATED)
            .toast(Toast::success("Agregado al carrito"));
        let value = trigger.header_value().unwrap();
        let parsed: Value = serde_json::from_str(value.to_str().unwrap()).unwrap();

        assert_eq!(parsed[CART_UPDATED], Value::Null);
        assert_eq!(parsed["toast"]["level"], "success");
        assert_eq!(parsed["toast"]["message"], "Agregado al carrito");
    }

    #[test]
    fn test_non_ascii_is_escaped_but_decodes_back() {
        let trigger: HxTrigger = Toast::error("Tu carrito está vacío").into();
        let value = trigger.header_value().unwrap();
        let raw = value.to_str().unwrap();
        assert!(raw.is_ascii());
        assert!(raw.contains("\\u00e1"));

        let parsed: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed["toast"]["message"], "Tu carrito está vacío");
    }
}
