//! Select-first-success over concurrent operations

use std::future::Future;
use futures_util::stream::{FuturesUnordered, StreamExt};

/// Poll every operation concurrently and return the first `Ok` to complete.
///
/// Completion order decides the winner, not the order operations were given
/// in. Once a winner is found the remaining operations are dropped. If every
/// operation fails, all errors are returned in the order the operations were
/// given, so callers can pick a failure deterministically.
pub async fn first_ok<I, F, T, E>(operations: I) -> Result<T, Vec<E>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
{
    let mut pending: FuturesUnordered<_> = operations
        .into_iter()
        .enumerate()
        .map(|(index, operation)| async move { (index, operation.await) })
        .collect();

    let mut failures = Vec::new();
    while let Some((index, result)) = pending.next().await {
        match result {
            Ok(value) => return Ok(value),
            Err(error) => failures.push((index, error)),
        }
    }

    failures.sort_by_key(|(index, _)| *index);
    Err(failures.into_iter().map(|(_, error)| error).collect())
}
