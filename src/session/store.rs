//! Persistence collaborator for the session state machines.
//!
//! The sessions only ever see a key-value store of JSON objects: one record
//! per mode, read once at construction and written back whenever aggregate
//! stats or settings change. How the store keeps the data is its own
//! business.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::warn;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::training_engine::errors::DrillError;

pub const ARITHMETIC_KEY: &str   = "mental-math:arithmetic";
pub const PERCENTAGE_KEY: &str   = "mental-math:percentage";
pub const RATIO_KEY: &str        = "mental-math:ratio";
pub const CHAIN_KEY: &str        = "mental-math:chain";
pub const DIVISIBILITY_KEY: &str = "mental-math:divisibility";

pub trait KeyValueStore {
    /// Record stored under `key`, if any.
    fn load(&self, key: &str) -> Option<Value>;

    /// Store `value` under `key`. When both the stored record and `value`
    /// are JSON objects, `value`'s fields are merged over the stored ones.
    fn save(&mut self, key: &str, value: Value);
}

/// In-process store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: Value) {
        match (self.entries.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(partial)) => {
                existing.extend(partial);
            }
            (_, value) => {
                self.entries.insert(key.to_string(), value);
            }
        }
    }
}

/// Lets several sessions on one thread share a single store.
impl<T: KeyValueStore> KeyValueStore for Rc<RefCell<T>> {
    fn load(&self, key: &str) -> Option<Value> {
        self.borrow().load(key)
    }

    fn save(&mut self, key: &str, value: Value) {
        self.borrow_mut().save(key, value);
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &mut T {
    fn load(&self, key: &str) -> Option<Value> {
        (**self).load(key)
    }

    fn save(&mut self, key: &str, value: Value) {
        (**self).save(key, value);
    }
}

/// Load and decode a record. Missing records and records that no longer
/// decode both yield the default.
pub fn load_record<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    match store.load(key) {
        None => T::default(),
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            warn!("discarding unreadable record {key}: {e}");
            T::default()
        }),
    }
}

pub fn save_record<T, S>(store: &mut S, key: &str, record: &T) -> Result<(), DrillError>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let value = serde_json::to_value(record)?;
    store.save(key, value);
    Ok(())
}
