use std::{collections::HashSet, future::Future};

use tokio::sync::Mutex;

use crate::{error::Result, trace::COMMAND_TRACING_EVENT_TARGET};

/// The names of the indexes known to exist on a collection.
///
/// The cache is optimistic: a cached name means the index existed at some point, an uncached one
/// means nothing. Every check-then-act sequence runs with the lock held for its whole duration,
/// round trip included.
#[derive(Debug, Default)]
pub(crate) struct IndexCache {
    names: Mutex<HashSet<String>>,
}

impl IndexCache {
    /// Runs `create` unless `name` is cached, caching `name` once `create` succeeds. Returns
    /// whether `create` ran.
    pub(crate) async fn get_or_create<F, Fut>(&self, name: &str, create: F) -> Result<bool>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let mut names = self.names.lock().await;
        if names.contains(name) {
            tracing::debug!(
                target: COMMAND_TRACING_EVENT_TARGET,
                index = name,
                "Index found in cache"
            );
            return Ok(false);
        }

        create().await?;
        names.insert(name.to_string());
        Ok(true)
    }

    /// Runs `drop`, then clears the cache whether or not it succeeded.
    pub(crate) async fn clear_after<F, Fut, T>(&self, drop: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut names = self.names.lock().await;
        let result = drop().await;
        Self::clear_locked(&mut names);
        result
    }

    pub(crate) async fn clear(&self) {
        Self::clear_locked(&mut *self.names.lock().await);
    }

    #[cfg(test)]
    pub(crate) async fn contains(&self, name: &str) -> bool {
        self.names.lock().await.contains(name)
    }

    fn clear_locked(names: &mut HashSet<String>) {
        tracing::debug!(
            target: COMMAND_TRACING_EVENT_TARGET,
            cached = names.len(),
            "Index cache cleared"
        );
        names.clear();
    }
}
