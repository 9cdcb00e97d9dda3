//! Reference-counted global store and typed accessors

use std::collections::BTreeMap;

use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{Result, StoreError};

struct Store {
    /// Reference count of active `initialize` calls.
    active: usize,
    values: BTreeMap<String, Value>,
}

static STORE: Mutex<Store> = Mutex::new(Store {
    active: 0,
    values: BTreeMap::new(),
});

/// Activate the property store (reference counted)
pub fn initialize() {
    let mut store = STORE.lock();
    store.active += 1;
    if store.active == 1 {
        tracing::debug!("property store activated");
    }
}

/// Release one reference to the property store
///
/// When the last reference is released all stored properties are cleared.
/// Calling with no active reference is a logged no-op.
pub fn shutdown() {
    let mut store = STORE.lock();
    if store.active == 0 {
        tracing::warn!("property store shutdown called while inactive");
        return;
    }
    store.active -= 1;
    if store.active == 0 {
        tracing::debug!(properties = store.values.len(), "property store shut down");
        store.values.clear();
    }
}

/// Whether at least one connection currently holds the store active
pub fn is_active() -> bool {
    STORE.lock().active > 0
}

/// Set a property to an arbitrary JSON value
pub fn set(key: &str, value: Value) -> Result<()> {
    let mut store = STORE.lock();
    if store.active == 0 {
        return Err(StoreError::NotInitialized);
    }
    store.values.insert(key.to_string(), value);
    Ok(())
}

/// Set a string-valued property
pub fn set_string(key: &str, value: &str) -> Result<()> {
    set(key, Value::String(value.to_string()))
}

/// Get the raw JSON value of a property
pub fn get(key: &str) -> Result<Option<Value>> {
    let store = STORE.lock();
    if store.active == 0 {
        return Err(StoreError::NotInitialized);
    }
    Ok(store.values.get(key).cloned())
}

/// Get a string property, failing if the value has another type
pub fn get_string(key: &str) -> Result<Option<String>> {
    match get(key)? {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(StoreError::WrongType {
            key: key.to_string(),
            expected: "string",
        }),
    }
}

/// Get a boolean property, failing if the value has another type
pub fn get_bool(key: &str) -> Result<Option<bool>> {
    match get(key)? {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(b)),
        Some(_) => Err(StoreError::WrongType {
            key: key.to_string(),
            expected: "boolean",
        }),
    }
}

/// Get an unsigned integer property, failing if the value has another type
pub fn get_u64(key: &str) -> Result<Option<u64>> {
    match get(key)? {
        None => Ok(None),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(v) => Ok(Some(v)),
            None => Err(StoreError::WrongType {
                key: key.to_string(),
                expected: "unsigned integer",
            }),
        },
        Some(_) => Err(StoreError::WrongType {
            key: key.to_string(),
            expected: "unsigned integer",
        }),
    }
}

/// Remove a property, returning whether it existed
pub fn remove(key: &str) -> Result<bool> {
    let mut store = STORE.lock();
    if store.active == 0 {
        return Err(StoreError::NotInitialized);
    }
    Ok(store.values.remove(key).is_some())
}

/// Number of stored properties
pub fn len() -> usize {
    STORE.lock().values.len()
}

/// Load properties from a JSON object, merging over existing keys
///
/// Returns the number of properties loaded.
pub fn load_json(json: &str) -> Result<usize> {
    let parsed: Value =
        serde_json::from_str(json).map_err(|e| StoreError::Parse(e.to_string()))?;
    let object = match parsed {
        Value::Object(map) => map,
        other => {
            return Err(StoreError::Parse(format!(
                "expected a JSON object, got {other}"
            )))
        }
    };

    let mut store = STORE.lock();
    if store.active == 0 {
        return Err(StoreError::NotInitialized);
    }
    let count = object.len();
    for (key, value) in object {
        store.values.insert(key, value);
    }
    tracing::debug!(count, "loaded properties from JSON");
    Ok(count)
}
