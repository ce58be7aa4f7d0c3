//! Patient-facing notifications.

mod summary;

pub use summary::*;
