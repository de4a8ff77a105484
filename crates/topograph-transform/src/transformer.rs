//! The concurrent transformation pipeline: two intake queues, a pool of
//! supervised workers, one output stream of graph nodes.
//!
//! Workers share the intake receivers and take exactly one resource per
//! iteration, so each resource is transformed by exactly one worker and
//! emitted exactly once. No ordering is guaranteed across workers; a
//! single worker processes items strictly in the order it dequeued
//! them. A panic while transforming an item is scoped to that item: the
//! supervisor logs it and respawns a replacement worker on the same
//! queues.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use topograph_core::Node;

use crate::config::TransformConfig;
use crate::error::{Result, TransformError};
use crate::resources::{Resource, Unstructured};
use crate::transform::{transform_unstructured, Transform};

/// A receiver shared by every worker in the pool.
type SharedReceiver<T> = Arc<Mutex<mpsc::Receiver<T>>>;

/// Producer-side handles to the two intake queues.
///
/// Dropping every clone of both senders drains the pipeline: workers
/// finish the backlog and exit cleanly, closing the output stream.
#[derive(Clone)]
pub struct Intake {
    /// Typed resources of registry kinds.
    pub resources: mpsc::Sender<Resource>,
    /// Dynamic objects with no typed model.
    pub dynamic: mpsc::Sender<Unstructured>,
}

/// The transformation pipeline, prior to starting its workers.
///
/// Create one, call `start()`, and begin pushing objects through the
/// `Intake` handles; graph nodes arrive on the output receiver.
pub struct Transformer {
    typed_rx: SharedReceiver<Resource>,
    dynamic_rx: SharedReceiver<Unstructured>,
    output: mpsc::Sender<Node>,
    shutdown: CancellationToken,
}

impl Transformer {
    /// Create the pipeline's three channels. Returns the transformer,
    /// the intake handles for producers, and the node stream for the
    /// aggregator.
    pub fn new(config: &TransformConfig) -> (Self, Intake, mpsc::Receiver<Node>) {
        let (typed_tx, typed_rx) = mpsc::channel(config.channel_capacity);
        let (dynamic_tx, dynamic_rx) = mpsc::channel(config.channel_capacity);
        let (output_tx, output_rx) = mpsc::channel(config.channel_capacity);

        let transformer = Self {
            typed_rx: Arc::new(Mutex::new(typed_rx)),
            dynamic_rx: Arc::new(Mutex::new(dynamic_rx)),
            output: output_tx,
            shutdown: CancellationToken::new(),
        };
        let intake = Intake {
            resources: typed_tx,
            dynamic: dynamic_tx,
        };
        (transformer, intake, output_rx)
    }

    /// Start `worker_count` supervised workers sharing the queues.
    ///
    /// Never blocks; workers run until shutdown or intake exhaustion.
    pub fn start(self, worker_count: usize) -> Result<TransformerPool> {
        if worker_count < 1 {
            return Err(TransformError::Config(format!(
                "worker_count must be 1 or greater, got {worker_count}"
            )));
        }

        let mut supervisors = Vec::with_capacity(worker_count);
        for worker in 0..worker_count {
            let ctx = WorkerContext {
                typed_rx: self.typed_rx.clone(),
                dynamic_rx: self.dynamic_rx.clone(),
                output: self.output.clone(),
                shutdown: self.shutdown.clone(),
            };
            supervisors.push(tokio::spawn(supervise(worker, move || {
                let ctx = ctx.clone();
                tokio::spawn(worker_loop(worker, ctx))
            })));
        }
        tracing::info!(worker_count, "Transformer started");

        Ok(TransformerPool {
            shutdown: self.shutdown,
            supervisors,
        })
    }
}

/// Handle to a running worker pool.
pub struct TransformerPool {
    shutdown: CancellationToken,
    supervisors: Vec<JoinHandle<()>>,
}

impl TransformerPool {
    /// Signal every worker to stop at its next wait point.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Wait for every worker slot to finish.
    pub async fn join(self) {
        for handle in self.supervisors {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Supervisor task failed");
            }
        }
    }
}

/// Everything one worker needs, cloneable for respawns.
#[derive(Clone)]
struct WorkerContext {
    typed_rx: SharedReceiver<Resource>,
    dynamic_rx: SharedReceiver<Unstructured>,
    output: mpsc::Sender<Node>,
    shutdown: CancellationToken,
}

/// Supervision loop for one worker slot.
///
/// A worker that exits cleanly (shutdown, intake closed, aggregator
/// gone) is not replaced. A worker that panicked took the offending
/// item off its queue with it, so the replacement resumes with the next
/// item: at-most-once delivery, in favor of pipeline liveness.
async fn supervise<F>(worker: usize, mut spawn: F)
where
    F: FnMut() -> JoinHandle<()>,
{
    loop {
        match spawn().await {
            Ok(()) => break,
            Err(e) if e.is_panic() => {
                tracing::error!(worker, error = %e, "Transform worker panicked; respawning");
            }
            Err(_) => break,
        }
    }
}

/// Dispatch loop: wait on whichever intake yields first (no priority
/// between them), transform exactly one resource, emit the node.
async fn worker_loop(worker: usize, ctx: WorkerContext) {
    tracing::debug!(worker, "Transform worker started");
    let mut typed_open = true;
    let mut dynamic_open = true;

    while typed_open || dynamic_open {
        let node = tokio::select! {
            _ = ctx.shutdown.cancelled() => break,
            resource = recv(&ctx.typed_rx), if typed_open => match resource {
                Some(resource) => resource.build_node(),
                None => {
                    typed_open = false;
                    continue;
                }
            },
            object = recv(&ctx.dynamic_rx), if dynamic_open => match object {
                Some(object) => match transform_unstructured(&object) {
                    Ok(node) => node,
                    Err(e) => {
                        tracing::warn!(worker, kind = object.kind(), error = %e, "Dropping malformed dynamic object");
                        continue;
                    }
                },
                None => {
                    dynamic_open = false;
                    continue;
                }
            },
        };

        // Aggregator hung up; nothing left to emit to.
        if ctx.output.send(node).await.is_err() {
            break;
        }
    }
    tracing::debug!(worker, "Transform worker stopped");
}

/// Take one item from a receiver shared across the pool.
async fn recv<T>(rx: &SharedReceiver<T>) -> Option<T> {
    rx.lock().await.recv().await
}
