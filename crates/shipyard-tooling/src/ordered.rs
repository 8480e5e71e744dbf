//! Ordered iteration with per-item failure isolation.

use core::future::Future;
use core::pin::pin;

use futures::stream::{self, StreamExt as _};

/// A failed item and its position in the input.
#[derive(Debug)]
pub struct ItemFailure<E> {
    /// Zero-based index of the item in the input sequence.
    pub index: usize,
    /// Why it failed.
    pub error: E,
}

/// Result of [`ordered_isolated`].
#[derive(Debug)]
pub struct OrderedOutcome<T, E> {
    /// Successful outputs, in input order.
    pub successes: Vec<T>,
    /// Failures, in input order.
    pub failures: Vec<ItemFailure<E>>,
}

/// Applies `operation` to every item, keeping successes in input order and
/// collecting failures separately. One item failing never affects another.
///
/// At most `concurrency` operations are in flight; `1` runs them strictly one
/// after another. Output order does not depend on completion order.
pub async fn ordered_isolated<I, T, E, F, Fut>(
    items: I,
    concurrency: usize,
    operation: F,
) -> OrderedOutcome<T, E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut results = pin!(
        stream::iter(items.into_iter().map(operation))
            .buffered(concurrency.max(1))
            .enumerate()
    );

    let mut outcome = OrderedOutcome {
        successes: Vec::new(),
        failures: Vec::new(),
    };
    while let Some((index, result)) = results.next().await {
        match result {
            Ok(value) => outcome.successes.push(value),
            Err(error) => outcome.failures.push(ItemFailure { index, error }),
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test]
    async fn failures_are_isolated_and_ordered() {
        let outcome = ordered_isolated(1..=6, 1, |value: u32| async move {
            if value % 3 == 0 {
                Err(format!("{value} is divisible by three"))
            } else {
                Ok(value * 10)
            }
        })
        .await;

        assert_eq!(outcome.successes, vec![10, 20, 40, 50]);
        let failed: Vec<_> = outcome.failures.iter().map(|failure| failure.index).collect();
        assert_eq!(failed, vec![2, 5]);
        assert_eq!(outcome.failures[0].error, "3 is divisible by three");
    }

    #[tokio::test]
    async fn concurrent_run_keeps_input_order() {
        // Earlier items finish last.
        let outcome = ordered_isolated(0_u64..4, 4, |value| async move {
            sleep(Duration::from_millis(40 - value * 10)).await;
            Ok::<_, ()>(value)
        })
        .await;

        assert_eq!(outcome.successes, vec![0, 1, 2, 3]);
        assert!(outcome.failures.is_empty());
    }

    #[tokio::test]
    async fn sequential_run_never_overlaps() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let outcome = ordered_isolated(0..5, 1, |_| {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, ()>(())
            }
        })
        .await;

        assert_eq!(outcome.successes.len(), 5);
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_input() {
        let outcome =
            ordered_isolated(Vec::<u8>::new(), 1, |value| async move { Ok::<_, ()>(value) }).await;
        assert!(outcome.successes.is_empty());
        assert!(outcome.failures.is_empty());
    }
}
