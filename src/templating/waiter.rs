//! Deferred values for asynchronous helpers.
//!
//! Handlebars evaluates templates synchronously, so an asynchronous helper
//! cannot return its value inline. Instead it hands its future to the
//! [`Waiter`], which starts it on the tokio runtime and returns a unique
//! placeholder token for the helper to emit. Once the synchronous pass is
//! finished the pipeline awaits the batch with [`Waiter::done`] and replaces
//! every token with its value using [`substitute`].
//!
//! Each call to `done` only covers the futures registered since the previous
//! call. The pipeline relies on this to resolve the body and the layout in two
//! separate passes.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::future::join_all;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::core::AsyncHelperError;

const TOKEN_PREFIX: &str = "__HBS_DEFERRED_";
const TOKEN_SUFFIX: &str = "__";

struct Pending {
    token: String,
    handle: JoinHandle<Result<String, AsyncHelperError>>,
}

/// Coordinator for the deferred values of a single render.
#[derive(Default)]
pub struct Waiter {
    pending: Mutex<Vec<Pending>>,
}

impl std::fmt::Debug for Waiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Waiter").field("pending", &self.pending_count()).finish()
    }
}

impl Waiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `computation` and return the placeholder token standing in for
    /// its result.
    ///
    /// Must be called from within a tokio runtime.
    pub fn resolve<F>(&self, computation: F) -> String
    where
        F: Future<Output = anyhow::Result<String>> + Send + 'static,
    {
        let token = format!("{TOKEN_PREFIX}{}{TOKEN_SUFFIX}", Uuid::new_v4().simple());
        let handle =
            tokio::spawn(async move { computation.await.map_err(AsyncHelperError::from) });

        tracing::debug!("Registered deferred value {}", token);
        self.lock().push(Pending {
            token: token.clone(),
            handle,
        });
        token
    }

    /// Wait for every computation registered since the last call and return
    /// the token-to-value mapping.
    ///
    /// A computation that fails (or whose task panics) resolves to an empty
    /// string; the failure is logged and never returned.
    pub async fn done(&self) -> HashMap<String, String> {
        let batch = std::mem::take(&mut *self.lock());
        if batch.is_empty() {
            return HashMap::new();
        }

        tracing::debug!("Waiting on {} deferred value(s)", batch.len());
        let (tokens, handles): (Vec<String>, Vec<_>) =
            batch.into_iter().map(|pending| (pending.token, pending.handle)).unzip();
        let results = join_all(handles).await;

        tokens
            .into_iter()
            .zip(results)
            .map(|(token, joined)| {
                let outcome =
                    joined.unwrap_or_else(|e| Err(AsyncHelperError::Aborted(e.to_string())));
                let value = match outcome {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::warn!("Async helper for {} failed, rendering empty: {}", token, e);
                        String::new()
                    }
                };
                (token, value)
            })
            .collect()
    }

    /// Number of computations registered since the last [`done`](Self::done).
    pub fn pending_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Pending>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Waiter {
    fn drop(&mut self) {
        // A render that failed before `done` leaves tasks nobody will read.
        for pending in self.lock().drain(..) {
            pending.handle.abort();
        }
    }
}

/// Replace every token in `text` with its resolved value.
pub fn substitute(text: &str, values: &HashMap<String, String>) -> String {
    let mut result = text.to_string();
    for (token, value) in values {
        result = result.replace(token.as_str(), value);
    }
    result
}

/// Whether `text` still contains any placeholder token.
pub(crate) fn has_placeholders(text: &str) -> bool {
    text.contains(TOKEN_PREFIX)
}
