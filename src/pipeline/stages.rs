//! Stage plumbing: bounded channels, one task per in-flight item, unordered
//! forwarding, panic capture at the stage boundary.

use std::sync::Arc;

use tokio::sync::mpsc::{channel, Receiver, Sender};
use tokio::task::JoinSet;
use tracing::error;

/// Bound for every inter-stage channel.
pub const STAGE_BUFFER: usize = 64;

async fn forward<U: Send + 'static>(
    done: Result<Option<U>, tokio::task::JoinError>,
    tx: &Sender<U>,
) {
    match done {
        Ok(Some(item)) => {
            let _ = tx.send(item).await;
        }
        Ok(None) => {}
        Err(join_error) => {
            // A panicked item is dropped; the stage keeps going.
            error!(%join_error, "stage task failed");
        }
    }
}

/// A stage: reads items, runs `work` on each in its own task, and emits the
/// produced items with no ordering guarantee. Items whose task returns
/// `None` or panics are dropped from the output.
pub fn spawn_stage<T, U, F>(mut rx: Receiver<T>, work: Arc<F>) -> Receiver<U>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> Option<U> + Send + Sync + 'static,
{
    let (tx, out) = channel(STAGE_BUFFER);
    tokio::spawn(async move {
        let mut tasks: JoinSet<Option<U>> = JoinSet::new();
        loop {
            tokio::select! {
                item = rx.recv() => match item {
                    Some(item) => {
                        let work = Arc::clone(&work);
                        tasks.spawn(async move { work(item) });
                    }
                    None => break,
                },
                Some(done) = tasks.join_next(), if !tasks.is_empty() => {
                    forward(done, &tx).await;
                }
            }
        }
        // Input closed: drain the in-flight tasks before closing the output.
        while let Some(done) = tasks.join_next().await {
            forward(done, &tx).await;
        }
    });
    out
}

/// Duplicate every item to `n` branch channels.
pub fn fan_out<T>(mut rx: Receiver<T>, n: usize) -> Vec<Receiver<T>>
where
    T: Clone + Send + 'static,
{
    let mut senders: Vec<Sender<T>> = Vec::with_capacity(n);
    let mut receivers = Vec::with_capacity(n);
    for _ in 0..n {
        let (tx, branch_rx) = channel(STAGE_BUFFER);
        senders.push(tx);
        receivers.push(branch_rx);
    }
    tokio::spawn(async move {
        while let Some(item) = rx.recv().await {
            for tx in &senders {
                let _ = tx.send(item.clone()).await;
            }
        }
    });
    receivers
}

/// Source stage: emit the items of one computation as a stream.
pub fn spawn_source<T, F>(produce: F) -> Receiver<T>
where
    T: Send + 'static,
    F: FnOnce() -> Vec<T> + Send + 'static,
{
    let (tx, out) = channel(STAGE_BUFFER);
    tokio::spawn(async move {
        for item in produce() {
            if tx.send(item).await.is_err() {
                break;
            }
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stage_maps_items_and_drops_none() {
        let rx = spawn_source(|| vec![1i32, 2, 3, 4]);
        let mut out = spawn_stage(
            rx,
            Arc::new(|n: i32| if n % 2 == 0 { Some(n * 10) } else { None }),
        );
        let mut collected = Vec::new();
        while let Some(item) = out.recv().await {
            collected.push(item);
        }
        collected.sort();
        assert_eq!(collected, vec![20, 40]);
    }

    #[tokio::test]
    async fn panicked_items_are_dropped_not_fatal() {
        let rx = spawn_source(|| vec![1i32, 2, 3]);
        let mut out = spawn_stage(
            rx,
            Arc::new(|n: i32| {
                if n == 2 {
                    panic!("boom");
                }
                Some(n)
            }),
        );
        let mut collected = Vec::new();
        while let Some(item) = out.recv().await {
            collected.push(item);
        }
        collected.sort();
        assert_eq!(collected, vec![1, 3]);
    }

    #[tokio::test]
    async fn fan_out_duplicates_to_every_branch() {
        let rx = spawn_source(|| vec![1i32, 2, 3]);
        let mut branches = fan_out(rx, 2);
        let mut second = branches.pop().unwrap();
        let mut first = branches.pop().unwrap();

        let mut a = Vec::new();
        while let Some(item) = first.recv().await {
            a.push(item);
        }
        let mut b = Vec::new();
        while let Some(item) = second.recv().await {
            b.push(item);
        }
        a.sort();
        b.sort();
        assert_eq!(a, vec![1, 2, 3]);
        assert_eq!(a, b);
    }
}
