//! Configuration for the transformation pipeline.

use serde::Deserialize;

/// Pipeline configuration.
///
/// Loaded from the `topograph.toml` `[transform]` section or
/// `TOPOGRAPH_TRANSFORM__` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct TransformConfig {
    /// Number of worker tasks sharing the intake queues.
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Capacity of each of the three pipeline channels. A full output
    /// channel backpressures workers and, through them, producers.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_worker_count() -> usize {
    4
}

fn default_channel_capacity() -> usize {
    100
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            channel_capacity: default_channel_capacity(),
        }
    }
}
