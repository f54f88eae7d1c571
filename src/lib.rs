#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Batchmap Core
//!
//! Sequential async filter-map over ordered collections.
//!
//! ## Overview
//!
//! Given an ordered collection and an asynchronous transform that may fail or
//! decline an element, produce the ordered collection of the transform's
//! non-empty results. Elements are pulled from a lazy source one at a time and
//! each transform is awaited before the next element is pulled.
//!
//! ## Module Organization
//!
//! - [`source`] - Pull-based lazy sources over fixed collections
//! - [`transform`] - The transform capability and closure adapters
//! - [`aggregator`] - The sequential filter-map driver
//! - [`batch`] - Convenience entry points and the collection extension trait
//! - [`thumbnail`] - Size-bound thumbnail transforms over an image preparer
//! - [`config`] - Run configuration loading and validation
//! - [`error`] - Batch error types
//! - [`logging`] - Structured logging setup
//! - [`metrics`] - Per-run counters
//!
//! ## Quick Start
//!
//! ```rust
//! use batchmap_core::{BatchError, FilterMapAggregator, SequentialSource};
//!
//! # tokio_test::block_on(async {
//! let aggregator = FilterMapAggregator::default();
//! let source = SequentialSource::new(vec![1, 2, 3, 4, 5]);
//!
//! let results = aggregator
//!     .run(source, |x: u32| async move {
//!         if x % 2 == 0 {
//!             Ok::<_, String>(Some(x * 10))
//!         } else {
//!             Ok(None)
//!         }
//!     })
//!     .await?;
//!
//! assert_eq!(results, vec![20, 40]);
//! # Ok::<(), BatchError<String>>(())
//! # }).unwrap();
//! ```
//!
//! ## Testing
//!
//! Unit tests live next to each module; integration and property tests are
//! under `tests/`.

pub mod aggregator;
pub mod batch;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod source;
pub mod thumbnail;
pub mod transform;

pub use aggregator::{BatchReport, FilterMapAggregator};
pub use batch::{
    batch_process, batch_process_with, batch_process_with_cancellation, try_batch_process,
    AsyncFilterMapExt,
};
pub use crate::config::{BatchConfig, ConfigurationError};
pub use error::{BatchError, BatchResult};
pub use metrics::BatchMetrics;
pub use source::{into_stream, AsyncSource, SequentialSource, SourceCollection};
pub use thumbnail::{
    prepare_thumbnail, process_images, PrepareThumbnail, ThumbnailPreparer, ThumbnailSize,
};
pub use transform::{infallible, InfallibleTransform, Transform};
pub use tokio_util::sync::CancellationToken;
