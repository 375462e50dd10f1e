use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Items processed concurrently per batch (default: 62)
    pub size: usize,

    /// Pause between consecutive batches in milliseconds (default: 100)
    pub delay_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            size: 62,
            delay_ms: 100,
        }
    }
}

impl BatchConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Runs work items in fixed-size concurrent batches, one batch at a time.
///
/// The batch size bounds the number of in-flight requests against the
/// catalog host.
#[derive(Debug, Clone, Default)]
pub struct BatchScheduler {
    config: BatchConfig,
}

impl BatchScheduler {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    fn size(&self) -> usize {
        self.config.size.max(1)
    }

    pub fn batch_count(&self, items: usize) -> usize {
        items.div_ceil(self.size())
    }

    /// Apply `task` to every item and concatenate the outputs in item order.
    ///
    /// A batch completes only once every task in it has settled; tasks
    /// report their own failures as empty output.
    pub async fn run<I, T, F, Fut>(&self, items: &[I], task: F) -> Vec<T>
    where
        F: Fn(&I) -> Fut,
        Fut: Future<Output = Vec<T>>,
    {
        let total = self.batch_count(items.len());
        let mut results = Vec::new();

        for (index, chunk) in items.chunks(self.size()).enumerate() {
            tracing::info!(
                "Processing batch {}/{} ({} items)",
                index + 1,
                total,
                chunk.len()
            );

            let outputs = join_all(chunk.iter().map(&task)).await;
            results.extend(outputs.into_iter().flatten());

            if index + 1 < total {
                tokio::time::sleep(self.config.delay()).await;
            }
        }

        results
    }
}
