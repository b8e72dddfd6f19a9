//! Per-user channel registry.
//!
//! A session is the live set of channels currently open for one user
//! identity: one entry per connected client window, in connection order.

mod channel;
mod registry;

pub use channel::{ChannelHandle, SessionError};
pub use registry::SessionRegistry;
