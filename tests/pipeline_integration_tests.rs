//! End-to-end tests over the public API: sources, entry points, cancellation
//! and the thumbnail binding working together.

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use batchmap_core::{
    into_stream, process_images, AsyncFilterMapExt, AsyncSource, BatchConfig, BatchError,
    CancellationToken, FilterMapAggregator, SequentialSource, SourceCollection, ThumbnailPreparer,
    ThumbnailSize,
};
use futures::StreamExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Source that counts how many times it was pulled
struct CountingSource {
    inner: SequentialSource<u32>,
    pulls: Arc<AtomicUsize>,
}

#[async_trait]
impl AsyncSource for CountingSource {
    type Item = u32;

    async fn produce_next(&mut self) -> Option<u32> {
        self.pulls.fetch_add(1, Ordering::SeqCst);
        self.inner.produce_next().await
    }
}

#[tokio::test]
async fn test_fail_fast_performs_no_further_pulls() {
    let pulls = Arc::new(AtomicUsize::new(0));
    let source = CountingSource {
        inner: SequentialSource::new(vec![1, 2, 3, 4]),
        pulls: Arc::clone(&pulls),
    };

    let result = FilterMapAggregator::default()
        .run(source, |x: u32| async move {
            if x == 2 {
                Err(anyhow!("element {x} is corrupt"))
            } else {
                Ok(Some(x))
            }
        })
        .await;

    let error = result.unwrap_err();
    assert_eq!(error.failed_index(), Some(1));
    assert_eq!(pulls.load(Ordering::SeqCst), 2);
    assert!(error.to_string().contains("element 2 is corrupt"));
}

#[tokio::test]
async fn test_drained_custom_source_pulled_once_past_end() {
    let pulls = Arc::new(AtomicUsize::new(0));
    let source = CountingSource {
        inner: SequentialSource::new(vec![5, 6]),
        pulls: Arc::clone(&pulls),
    };

    let results = FilterMapAggregator::default()
        .run(source, |x: u32| async move { Ok::<_, anyhow::Error>(Some(x + 1)) })
        .await
        .unwrap();

    assert_eq!(results, vec![6, 7]);
    assert_eq!(pulls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_collection_supports_repeated_batches() {
    let collection: SourceCollection<u32> = (1..=6).collect();
    let aggregator = FilterMapAggregator::new(BatchConfig::default().with_label("repeat"));

    let odds = aggregator
        .run(collection.make_source(), |x: u32| async move {
            Ok::<_, anyhow::Error>((x % 2 == 1).then_some(x))
        })
        .await
        .unwrap();
    let evens = aggregator
        .run(collection.make_source(), |x: u32| async move {
            Ok::<_, anyhow::Error>((x % 2 == 0).then_some(x))
        })
        .await
        .unwrap();

    assert_eq!(odds, vec![1, 3, 5]);
    assert_eq!(evens, vec![2, 4, 6]);
}

#[tokio::test]
async fn test_source_as_stream() {
    let lengths: Vec<usize> = into_stream(SequentialSource::new(vec!["one", "three"]))
        .map(str::len)
        .collect()
        .await;
    assert_eq!(lengths, vec![3, 5]);
}

#[tokio::test]
async fn test_errors_keep_context_chain() {
    let result = vec!["1", "2", "x", "4"]
        .async_filter_map(|raw: &'static str| async move {
            let value: u32 = raw
                .parse()
                .with_context(|| format!("parsing {raw:?}"))?;
            Ok::<_, anyhow::Error>(Some(value))
        })
        .await;

    match result {
        Err(BatchError::TransformFailure { index, source }) => {
            assert_eq!(index, 2);
            assert_eq!(source.to_string(), "parsing \"x\"");
        }
        other => panic!("expected transform failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cancellation_from_another_task() {
    let cancel = CancellationToken::new();
    let started = Arc::new(tokio::sync::Notify::new());
    let transformed = Arc::new(AtomicUsize::new(0));

    let run = {
        let cancel = cancel.clone();
        let started = Arc::clone(&started);
        let transformed = Arc::clone(&transformed);
        tokio::spawn(async move {
            FilterMapAggregator::default()
                .run_with_cancellation(
                    SequentialSource::new(0..1_000u32),
                    move |x: u32| {
                        let started = Arc::clone(&started);
                        let transformed = Arc::clone(&transformed);
                        async move {
                            if x == 0 {
                                started.notify_one();
                            }
                            tokio::time::sleep(Duration::from_millis(2)).await;
                            transformed.fetch_add(1, Ordering::SeqCst);
                            Ok::<_, anyhow::Error>(Some(x))
                        }
                    },
                    &cancel,
                )
                .await
        })
    };

    started.notified().await;
    cancel.cancel();

    let result = run.await.expect("batch task panicked");
    match result {
        Err(BatchError::Cancelled { processed }) => {
            assert_eq!(processed, transformed.load(Ordering::SeqCst));
            assert!(processed < 1_000);
        }
        other => panic!("expected cancellation, got {other:?}"),
    }
}

/// Source that fires its token while suspended inside the given pull
struct CancellingSource {
    inner: SequentialSource<u32>,
    cancel: CancellationToken,
    cancel_on_pull: usize,
    pulls: usize,
}

#[async_trait]
impl AsyncSource for CancellingSource {
    type Item = u32;

    async fn produce_next(&mut self) -> Option<u32> {
        self.pulls += 1;
        if self.pulls == self.cancel_on_pull {
            self.cancel.cancel();
            tokio::task::yield_now().await;
        }
        self.inner.produce_next().await
    }
}

#[tokio::test]
async fn test_cancellation_during_pull_drops_element() {
    let cancel = CancellationToken::new();
    let transformed = AtomicUsize::new(0);
    let source = CancellingSource {
        inner: SequentialSource::new(vec![1, 2, 3]),
        cancel: cancel.clone(),
        cancel_on_pull: 2,
        pulls: 0,
    };

    let result = FilterMapAggregator::default()
        .run_with_report(
            source,
            |x: u32| {
                transformed.fetch_add(1, Ordering::SeqCst);
                async move { Ok::<_, anyhow::Error>(Some(x)) }
            },
            Some(&cancel),
        )
        .await;

    assert!(matches!(result, Err(BatchError::Cancelled { processed: 1 })));
    assert_eq!(transformed.load(Ordering::SeqCst), 1);
}

#[derive(Debug, Clone, PartialEq)]
struct Image {
    id: u8,
    side: u32,
}

struct Downscaler;

#[async_trait]
impl ThumbnailPreparer for Downscaler {
    type Image = Image;

    async fn prepare_thumbnail(&self, image: Image, size: ThumbnailSize) -> Option<Image> {
        tokio::task::yield_now().await;
        (image.side > 0).then(|| Image {
            id: image.id,
            side: image.side.min(size.width),
        })
    }
}

#[tokio::test]
async fn test_thumbnail_batch() {
    let images: Vec<Image> = (1..=5)
        .map(|id| Image {
            id,
            side: if id == 3 { 0 } else { u32::from(id) * 100 },
        })
        .collect();

    let thumbnails = process_images(
        images,
        ThumbnailSize::square(120).unwrap(),
        Arc::new(Downscaler),
    )
    .await;

    assert_eq!(
        thumbnails,
        vec![
            Image { id: 1, side: 100 },
            Image { id: 2, side: 120 },
            Image { id: 4, side: 120 },
            Image { id: 5, side: 120 },
        ]
    );
}
