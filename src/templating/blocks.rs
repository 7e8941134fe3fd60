//! Named content blocks.
//!
//! A leaf template captures fragments with `{{#contentFor "name"}}...{{/contentFor}}`
//! and its layout emits them with `{{{block "name"}}}`. Reading a block drains
//! it, so each captured fragment is emitted at most once.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct BlockRegistry {
    blocks: Mutex<HashMap<String, Vec<String>>>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `fragment` to the block `name`, creating the block if needed.
    pub fn content_for(&self, name: &str, fragment: String) {
        self.lock().entry(name.to_string()).or_default().push(fragment);
    }

    /// Join the fragments of `name` with newlines and clear the block.
    ///
    /// Unknown or already drained blocks yield an empty string.
    pub fn block(&self, name: &str) -> String {
        match self.lock().get_mut(name) {
            Some(fragments) => std::mem::take(fragments).join("\n"),
            None => String::new(),
        }
    }

    /// Whether `name` currently holds any fragments.
    pub fn has_content(&self, name: &str) -> bool {
        self.lock().get(name).is_some_and(|fragments| !fragments.is_empty())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<String>>> {
        self.blocks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
