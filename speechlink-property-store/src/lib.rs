//! Process-wide key-value property store for the speechlink client
//!
//! Holds JSON-typed configuration and session properties shared by every live
//! connection in the process. Like the telemetry subsystem, the store is
//! reference counted: the first [`initialize`] activates it, the matching
//! last [`shutdown`] clears it. Accessors return [`StoreError::NotInitialized`]
//! while no connection holds the store active, so a forgotten init surfaces as
//! an explicit error rather than silently missing configuration.
//!
//! # Example
//!
//! ```rust,ignore
//! property_store::initialize();
//! property_store::load_json(r#"{"region": "westus", "profanity_filter": true}"#)?;
//!
//! assert_eq!(property_store::get_string("region")?, Some("westus".to_string()));
//! assert_eq!(property_store::get_bool("profanity_filter")?, Some(true));
//!
//! property_store::shutdown();
//! ```

pub mod error;
pub mod store;

pub use error::{Result, StoreError};
pub use store::{
    get, get_bool, get_string, get_u64, initialize, is_active, len, load_json, remove, set,
    set_string, shutdown,
};
