//! Data model shared by the view, the backends and the terminal client
//!
//! - `message` - Direct messages and the insert payload
//! - `profile` - Display profiles and the authenticated user

pub mod message;
pub mod profile;

pub use message::{Message, NewMessage};
pub use profile::{Profile, User};
