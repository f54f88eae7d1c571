//! # Batch Entry Points
//!
//! Convenience wrappers that build a [`SequentialSource`] from a collection and
//! hand it to a default-configured [`FilterMapAggregator`].
//!
//! ```rust
//! use batchmap_core::batch::batch_process;
//!
//! # tokio_test::block_on(async {
//! let evens = batch_process(vec![1, 2, 3, 4, 5], |x: u32| async move {
//!     (x % 2 == 0).then_some(x * 10)
//! })
//! .await;
//! assert_eq!(evens, vec![20, 40]);
//! # });
//! ```

use crate::aggregator::FilterMapAggregator;
use crate::error::BatchResult;
use crate::source::SequentialSource;
use crate::transform::{infallible, Transform};
use std::convert::Infallible;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Filter-map `collection` with a transform that cannot fail
pub async fn batch_process<I, F, Fut, R>(collection: I, transform: F) -> Vec<R>
where
    I: IntoIterator,
    I::Item: Send,
    F: Fn(I::Item) -> Fut,
    Fut: Future<Output = Option<R>>,
{
    batch_process_with(collection, infallible(transform)).await
}

/// Filter-map `collection` with any [`Transform`] whose error is `Infallible`
pub async fn batch_process_with<I, Tr>(collection: I, transform: Tr) -> Vec<Tr::Output>
where
    I: IntoIterator,
    I::Item: Send,
    Tr: Transform<I::Item, Error = Infallible>,
{
    FilterMapAggregator::default()
        .run_infallible(SequentialSource::new(collection), transform)
        .await
        .results
}

/// Filter-map `collection` with a fallible transform, failing fast
pub async fn try_batch_process<I, Tr>(
    collection: I,
    transform: Tr,
) -> BatchResult<Vec<Tr::Output>, Tr::Error>
where
    I: IntoIterator,
    I::Item: Send,
    Tr: Transform<I::Item>,
{
    FilterMapAggregator::default()
        .run(SequentialSource::new(collection), transform)
        .await
}

/// Like [`try_batch_process`], stopping early once `cancel` fires
pub async fn batch_process_with_cancellation<I, Tr>(
    collection: I,
    transform: Tr,
    cancel: &CancellationToken,
) -> BatchResult<Vec<Tr::Output>, Tr::Error>
where
    I: IntoIterator,
    I::Item: Send,
    Tr: Transform<I::Item>,
{
    FilterMapAggregator::default()
        .run_with_cancellation(SequentialSource::new(collection), transform, cancel)
        .await
}

/// Sequential async filter-map on any collection
pub trait AsyncFilterMapExt: IntoIterator + Sized {
    fn async_filter_map<Tr>(
        self,
        transform: Tr,
    ) -> impl Future<Output = BatchResult<Vec<Tr::Output>, Tr::Error>>
    where
        Self::Item: Send,
        Tr: Transform<Self::Item>;
}

impl<C: IntoIterator> AsyncFilterMapExt for C {
    fn async_filter_map<Tr>(
        self,
        transform: Tr,
    ) -> impl Future<Output = BatchResult<Vec<Tr::Output>, Tr::Error>>
    where
        Self::Item: Send,
        Tr: Transform<Self::Item>,
    {
        try_batch_process(self, transform)
    }
}
