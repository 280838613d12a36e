//! Single-consumer task queue.
//!
//! Every index-affecting operation (rebuilds, lookups, settings changes) is
//! sent here as a boxed future and run by one worker task, strictly in
//! submission order, one at a time. A task therefore sees every effect of
//! the tasks submitted before it, and no reader can overlap a rebuild.

use std::{
    future::Future,
    panic::AssertUnwindSafe,
    pin::Pin,
    sync::atomic::{AtomicU64, Ordering},
    task::{Context, Poll},
};

use futures::FutureExt;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

struct QueuedTask {
    id: u64,
    exclusive: bool,
    job: Job,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The worker is gone (runtime shut down) before the task ran.
    #[error("task queue is closed")]
    Closed,
    /// The task panicked; the queue itself keeps running.
    #[error("queued task panicked")]
    Panicked,
}

/// Handle to a queued task's result.
///
/// Dropping it does not cancel the task.
#[must_use = "dropping a TaskHandle discards the task's result"]
pub struct TaskHandle<T> {
    reply: oneshot::Receiver<Result<T, TaskError>>,
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T, TaskError>;

    fn poll(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Self::Output> {
        Pin::new(&mut self.reply).poll(cx).map(|reply| reply.unwrap_or(Err(TaskError::Closed)))
    }
}

pub struct TaskQueue {
    sender: mpsc::UnboundedSender<QueuedTask>,
    next_id: AtomicU64,
}

impl TaskQueue {
    /// Spawn the worker. Must be called from within a Tokio runtime.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(receiver));
        Self {
            sender,
            next_id: AtomicU64::new(1),
        }
    }

    /// Queue `task` behind everything submitted so far.
    ///
    /// Never blocks. `exclusive` marks tasks that replace shared state; it
    /// is logged but does not change scheduling, since every task already
    /// runs alone.
    pub fn append<F, T>(
        &self,
        task: F,
        exclusive: bool,
    ) -> TaskHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply) = oneshot::channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let job: Job = Box::pin(async move {
            let outcome = AssertUnwindSafe(task).catch_unwind().await.map_err(|_| TaskError::Panicked);
            if outcome.is_err() {
                warn!("[queue] task #{id} panicked");
            }
            let _ = reply_tx.send(outcome);
        });

        if self
            .sender
            .send(QueuedTask {
                id,
                exclusive,
                job,
            })
            .is_err()
        {
            debug!("[queue] worker gone, dropping task #{id}");
        }

        TaskHandle {
            reply,
        }
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_worker(mut receiver: mpsc::UnboundedReceiver<QueuedTask>) {
    while let Some(task) = receiver.recv().await {
        trace!("[queue] running task #{} (exclusive={})", task.id, task.exclusive);
        task.job.await;
    }
    debug!("[queue] all senders dropped, worker exiting");
}

#[cfg(test)]
#[path = "../../tests/src/queue_tests.rs"]
mod tests;
