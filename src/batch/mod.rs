//! Order-preserving concurrent fan-out.
//!
//! Every input gets exactly one output slot, at the same position, holding
//! either its result or its own error. One item failing never affects the
//! others.

use futures_util::stream::{self, StreamExt};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::{Result, TranslateError};

async fn unless_cancelled<T>(
    cancel: &CancellationToken,
    work: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(TranslateError::Cancelled),
        result = work => result,
    }
}

/// Runs `work` over `items` with at most `max_workers` in flight on the
/// current task, buffering completed results until their predecessors are
/// ready.
pub async fn run_buffered<I, T, F, Fut>(
    items: I,
    max_workers: usize,
    cancel: &CancellationToken,
    work: F,
) -> Vec<Result<T>>
where
    I: IntoIterator,
    F: Fn(I::Item) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let results: Vec<Result<T>> = stream::iter(items)
        .map(|item| unless_cancelled(cancel, work(item)))
        .buffered(max_workers.max(1))
        .collect()
        .await;

    for (index, result) in results.iter().enumerate() {
        if let Err(e) = result {
            tracing::warn!(index, error = %e, "batch item failed");
        }
    }
    results
}

/// Spawns one task per item, bounded by a semaphore of `max_workers`
/// permits, and writes each result into the slot of its input index.
pub async fn run_spawned<I, T, F, Fut>(
    items: I,
    max_workers: usize,
    cancel: CancellationToken,
    work: F,
) -> Vec<Result<T>>
where
    I: IntoIterator,
    T: Send + 'static,
    F: Fn(I::Item) -> Fut,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    let permits = Arc::new(Semaphore::new(max_workers.max(1)));
    let mut tasks = JoinSet::new();
    let mut slots: Vec<Option<Result<T>>> = Vec::new();

    for (index, item) in items.into_iter().enumerate() {
        slots.push(None);
        let permits = Arc::clone(&permits);
        let cancel = cancel.clone();
        let future = work(item);

        tasks.spawn(async move {
            let result = unless_cancelled(&cancel, async {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|_| TranslateError::Cancelled)?;
                future.await
            })
            .await;
            (index, result)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => {
                if let Err(e) = &result {
                    tracing::warn!(index, error = %e, "batch item failed");
                }
                slots[index] = Some(result);
            }
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => tracing::warn!(error = %e, "batch task aborted"),
        }
    }

    slots
        .into_iter()
        .map(|slot| slot.unwrap_or(Err(TranslateError::Cancelled)))
        .collect()
}
