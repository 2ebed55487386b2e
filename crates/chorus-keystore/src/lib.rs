#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
mod store;
mod types;

pub use error::KeyStoreError;
pub use store::KeyStore;
pub use types::{CustomKey, CustomKeyView, DailyUsage, KeyStatus, OriginalKey, UsageStats};
