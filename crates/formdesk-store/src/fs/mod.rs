//! Filesystem side of the store
//!
//! - `atomic`: temp-then-rename writes
//! - `layout`: where each artifact version lives under the store root

pub mod atomic;
pub mod layout;

pub use atomic::atomic_write;
pub use layout::StoreLayout;
