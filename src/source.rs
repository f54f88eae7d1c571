//! # Lazy Sequential Sources
//!
//! Pull-based producers of a finite ordered sequence. The aggregator asks for
//! one element at a time through [`AsyncSource::produce_next`]; nothing is
//! buffered beyond the collection the source was built from.
//!
//! A [`SequentialSource`] is single-use: each pull consumes the front of its
//! cursor and an exhausted source stays exhausted. To traverse the same data
//! again, build a fresh source, or keep a [`SourceCollection`] around and call
//! [`SourceCollection::make_source`] per traversal.

use async_trait::async_trait;
use futures::stream::{self, Stream};
use std::collections::VecDeque;

/// A suspend-capable producer of an ordered, finite sequence
#[async_trait]
pub trait AsyncSource: Send {
    type Item: Send;

    /// Remove and return the next element, or `None` once the sequence is
    /// exhausted. Pulling again after `None` keeps returning `None`.
    async fn produce_next(&mut self) -> Option<Self::Item>;

    /// Bounds on the number of elements still to be produced
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, None)
    }
}

/// Source over an owned, fixed collection, produced in FIFO order
#[derive(Debug, Clone)]
pub struct SequentialSource<T> {
    cursor: VecDeque<T>,
}

impl<T> SequentialSource<T> {
    /// Capture `collection` by value. Later changes to the caller's data can
    /// not reach the source.
    pub fn new<I>(collection: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self {
            cursor: collection.into_iter().collect(),
        }
    }

    /// Number of elements not yet produced
    pub fn remaining(&self) -> usize {
        self.cursor.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor.is_empty()
    }
}

impl<T> From<Vec<T>> for SequentialSource<T> {
    fn from(elements: Vec<T>) -> Self {
        Self {
            cursor: VecDeque::from(elements),
        }
    }
}

impl<T> FromIterator<T> for SequentialSource<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[async_trait]
impl<T: Send> AsyncSource for SequentialSource<T> {
    type Item = T;

    async fn produce_next(&mut self) -> Option<T> {
        self.cursor.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cursor.len();
        (remaining, Some(remaining))
    }
}

/// Restartable sequence value that hands out fresh single-use sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCollection<T> {
    elements: Vec<T>,
}

impl<T: Clone> SourceCollection<T> {
    pub fn new(elements: Vec<T>) -> Self {
        Self { elements }
    }

    /// Start a new traversal from the first element
    pub fn make_source(&self) -> SequentialSource<T> {
        SequentialSource::new(self.elements.iter().cloned())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl<T: Clone> From<Vec<T>> for SourceCollection<T> {
    fn from(elements: Vec<T>) -> Self {
        Self::new(elements)
    }
}

impl<T: Clone> FromIterator<T> for SourceCollection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Expose any [`AsyncSource`] as a `futures` stream
///
/// The stream ends at the first `None` the source produces.
pub fn into_stream<S>(source: S) -> impl Stream<Item = S::Item>
where
    S: AsyncSource,
{
    stream::unfold(source, |mut source| async move {
        let item = source.produce_next().await?;
        Some((item, source))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_produces_in_construction_order() {
        let mut source = SequentialSource::new(vec!["a", "b", "c"]);

        assert_eq!(source.produce_next().await, Some("a"));
        assert_eq!(source.produce_next().await, Some("b"));
        assert_eq!(source.produce_next().await, Some("c"));
        assert_eq!(source.produce_next().await, None);
    }

    #[tokio::test]
    async fn test_exhaustion_is_idempotent() {
        let mut source = SequentialSource::new(vec![1]);
        assert_eq!(source.produce_next().await, Some(1));

        for _ in 0..5 {
            assert_eq!(source.produce_next().await, None);
        }
        assert!(source.is_exhausted());
    }

    #[tokio::test]
    async fn test_empty_collection() {
        let mut source: SequentialSource<u32> = SequentialSource::new(Vec::new());
        assert!(source.is_exhausted());
        assert_eq!(source.size_hint(), (0, Some(0)));
        assert_eq!(source.produce_next().await, None);
    }

    #[tokio::test]
    async fn test_cursor_shrinks_by_one_per_pull() {
        let mut source: SequentialSource<u32> = (1..=4).collect();
        assert_eq!(source.remaining(), 4);

        source.produce_next().await;
        assert_eq!(source.remaining(), 3);
        assert_eq!(source.size_hint(), (3, Some(3)));

        while source.produce_next().await.is_some() {}
        assert_eq!(source.remaining(), 0);
    }

    #[tokio::test]
    async fn test_captures_collection_by_value() {
        let mut original = vec![1, 2, 3];
        let mut source = SequentialSource::new(original.clone());
        original.push(4);
        original[0] = 100;

        let mut produced = Vec::new();
        while let Some(value) = source.produce_next().await {
            produced.push(value);
        }
        assert_eq!(produced, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_collection_makes_independent_sources() {
        let collection: SourceCollection<u32> = vec![10, 20, 30].into();

        let mut first = collection.make_source();
        assert_eq!(first.produce_next().await, Some(10));

        let mut second = collection.make_source();
        assert_eq!(second.remaining(), 3);
        assert_eq!(second.produce_next().await, Some(10));
        assert_eq!(first.produce_next().await, Some(20));
        assert_eq!(collection.len(), 3);
    }

    #[tokio::test]
    async fn test_into_stream() {
        let source = SequentialSource::new(vec![1, 2, 3]);
        let collected: Vec<i32> = into_stream(source).collect().await;
        assert_eq!(collected, vec![1, 2, 3]);
    }
}
