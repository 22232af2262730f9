//! WebAssembly bindings for lww-dict.
//!
//! Enable with the `wasm` feature:
//!
//! ```toml
//! [dependencies]
//! lww-dict = { version = "0.1", features = ["wasm"] }
//! ```
//!
//! The dictionary is exposed to JavaScript with string keys and values.
//! Default timestamps are `Date.now()` in milliseconds.

use wasm_bindgen::prelude::*;

use crate::clock::FnClock;

type JsClock = FnClock<fn() -> u64>;

fn js_now() -> u64 {
    js_sys::Date::now() as u64
}

/// A last-write-wins dictionary for use from JavaScript.
#[wasm_bindgen(js_name = LwwDictionary)]
pub struct WasmLwwDictionary {
    inner: crate::LwwDictionary<String, String, JsClock>,
}

impl Default for WasmLwwDictionary {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen(js_class = LwwDictionary)]
impl WasmLwwDictionary {
    /// Create an empty dictionary stamped by `Date.now()`.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: crate::LwwDictionary::with_clock(FnClock::new(js_now as fn() -> u64)),
        }
    }

    /// Write `value` under `key` at the current time.
    pub fn add(&self, key: &str, value: &str) -> bool {
        self.inner.add(key.to_owned(), value.to_owned())
    }

    /// Write `value` under `key` at `timestamp`.
    #[wasm_bindgen(js_name = addAt)]
    pub fn add_at(&self, key: &str, value: &str, timestamp: u64) -> bool {
        self.inner.add_with_timestamp(key.to_owned(), value.to_owned(), timestamp)
    }

    /// Remove `key` at the current time.
    pub fn remove(&self, key: &str) -> bool {
        self.inner.remove(&key.to_owned())
    }

    /// Remove `key` at `timestamp`.
    #[wasm_bindgen(js_name = removeAt)]
    pub fn remove_at(&self, key: &str, timestamp: u64) -> bool {
        self.inner.remove_with_timestamp(key.to_owned(), timestamp)
    }

    /// Get the value for `key`, or `undefined` if it is absent.
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.inner.lookup(&key.to_owned())
    }

    /// Check if `key` is present.
    #[wasm_bindgen(js_name = containsKey)]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(&key.to_owned())
    }

    /// Number of present keys.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if no key is present.
    #[wasm_bindgen(js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Present keys, sorted.
    pub fn keys(&self) -> Box<[JsValue]> {
        let mut keys: Vec<String> = self.inner.get_all().into_keys().collect();
        keys.sort_unstable();
        keys.iter()
            .map(|k| JsValue::from_str(k))
            .collect::<Vec<_>>()
            .into_boxed_slice()
    }

    /// Merge another dictionary's state into this one.
    pub fn merge(&self, other: &WasmLwwDictionary) {
        self.inner.merge(&other.inner);
    }
}
