//! Data stored in the admin session.

pub mod draft;
pub mod flash;
pub mod session;

pub use draft::FormDraft;
pub use flash::{Flash, FlashLevel};
pub use session::{CompanyLink, CurrentAdmin, keys as session_keys};
