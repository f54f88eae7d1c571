//! # Async Filter-Map Aggregator
//!
//! Drives an [`AsyncSource`] to exhaustion, applies a [`Transform`] to every
//! element it produces, and collects the non-empty results in pull order.
//!
//! ## Execution Model
//!
//! Strictly sequential: one element is pulled, its transform is awaited to
//! completion, and only then is the next element pulled. There is never more
//! than one transform in flight, so the output needs no synchronization.
//!
//! ## Failure and Cancellation
//!
//! - A transform error aborts the run at once. Nothing more is pulled and the
//!   results gathered so far are dropped.
//! - With a [`CancellationToken`], the token is checked before every pull and
//!   again once the pull resumes, so an element pulled while cancellation
//!   fired is dropped without being transformed. A transform that is already
//!   running is left to finish on its own.
//! - Dropping the future returned by any `run*` method also stops the run at
//!   its current suspension point.

use crate::config::BatchConfig;
use crate::error::{BatchError, BatchResult};
use crate::logging::log_batch_operation;
use crate::metrics::BatchMetrics;
use crate::source::AsyncSource;
use crate::transform::Transform;
use std::convert::Infallible;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info_span, warn, Instrument};
use uuid::Uuid;

/// Results of a completed run together with its metrics
#[derive(Debug, Clone)]
pub struct BatchReport<R> {
    pub batch_id: Uuid,
    pub results: Vec<R>,
    pub metrics: BatchMetrics,
}

/// Why a run stopped before its source was drained
enum Halt<E, C> {
    Failed { index: usize, source: E },
    Cancelled(C),
}

impl<E> Halt<E, usize> {
    fn into_batch_error(self) -> BatchError<E> {
        match self {
            Halt::Failed { index, source } => BatchError::transform_failure(index, source),
            Halt::Cancelled(processed) => BatchError::cancelled(processed),
        }
    }
}

/// Cancellation check run at each suspension point of a run
trait CancelCheck {
    type Cancelled;

    fn check(&self, processed: usize) -> Result<(), Self::Cancelled>;
}

impl CancelCheck for Option<&CancellationToken> {
    type Cancelled = usize;

    fn check(&self, processed: usize) -> Result<(), usize> {
        if matches!(self, Some(token) if token.is_cancelled()) {
            Err(processed)
        } else {
            Ok(())
        }
    }
}

/// Check for runs that cannot be cancelled
struct Uncancellable;

impl CancelCheck for Uncancellable {
    type Cancelled = Infallible;

    fn check(&self, _processed: usize) -> Result<(), Infallible> {
        Ok(())
    }
}

/// Sequential filter-map driver
#[derive(Debug, Clone, Default)]
pub struct FilterMapAggregator {
    config: BatchConfig,
}

impl FilterMapAggregator {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Run `transform` over every element of `source`
    pub async fn run<S, Tr>(
        &self,
        source: S,
        transform: Tr,
    ) -> BatchResult<Vec<Tr::Output>, Tr::Error>
    where
        S: AsyncSource,
        Tr: Transform<S::Item>,
    {
        self.run_with_report(source, transform, None)
            .await
            .map(|report| report.results)
    }

    /// Run with cooperative cancellation through `cancel`
    pub async fn run_with_cancellation<S, Tr>(
        &self,
        source: S,
        transform: Tr,
        cancel: &CancellationToken,
    ) -> BatchResult<Vec<Tr::Output>, Tr::Error>
    where
        S: AsyncSource,
        Tr: Transform<S::Item>,
    {
        self.run_with_report(source, transform, Some(cancel))
            .await
            .map(|report| report.results)
    }

    /// Run and return the results along with the run's metrics
    pub async fn run_with_report<S, Tr>(
        &self,
        source: S,
        transform: Tr,
        cancel: Option<&CancellationToken>,
    ) -> BatchResult<BatchReport<Tr::Output>, Tr::Error>
    where
        S: AsyncSource,
        Tr: Transform<S::Item>,
    {
        self.execute(source, transform, cancel)
            .await
            .map_err(Halt::into_batch_error)
    }

    /// Run a transform that cannot fail, without cancellation
    ///
    /// Neither a failure nor a cancellation can be expressed for such a run,
    /// so the report is returned directly.
    pub async fn run_infallible<S, Tr>(&self, source: S, transform: Tr) -> BatchReport<Tr::Output>
    where
        S: AsyncSource,
        Tr: Transform<S::Item, Error = Infallible>,
    {
        match self.execute(source, transform, Uncancellable).await {
            Ok(report) => report,
            Err(Halt::Failed { source, .. }) => match source {},
            Err(Halt::Cancelled(never)) => match never {},
        }
    }

    async fn execute<S, Tr, C>(
        &self,
        source: S,
        transform: Tr,
        cancel: C,
    ) -> Result<BatchReport<Tr::Output>, Halt<Tr::Error, C::Cancelled>>
    where
        S: AsyncSource,
        Tr: Transform<S::Item>,
        C: CancelCheck,
    {
        let batch_id = Uuid::new_v4();
        let span = info_span!("batch", batch_id = %batch_id, label = %self.config.label);

        async move {
            let started = Instant::now();
            let mut metrics = BatchMetrics::new();

            debug!(size_hint = ?source.size_hint(), "Starting batch");

            let outcome = self.drive(source, transform, &cancel, &mut metrics).await;
            metrics.elapsed = started.elapsed();

            match outcome {
                Ok(results) => {
                    log_batch_operation(
                        "run",
                        &self.config.label,
                        "completed",
                        Some(metrics.pulled),
                        None,
                    );
                    debug!(metrics = %metrics.to_json(), "Batch metrics");
                    Ok(BatchReport {
                        batch_id,
                        results,
                        metrics,
                    })
                }
                Err(halt) => {
                    let status = match halt {
                        Halt::Failed { .. } => "failed",
                        Halt::Cancelled(_) => "cancelled",
                    };
                    log_batch_operation(
                        "run",
                        &self.config.label,
                        status,
                        Some(metrics.pulled),
                        Some("batch ended before the source was drained"),
                    );
                    Err(halt)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn drive<S, Tr, C>(
        &self,
        mut source: S,
        transform: Tr,
        cancel: &C,
        metrics: &mut BatchMetrics,
    ) -> Result<Vec<Tr::Output>, Halt<Tr::Error, C::Cancelled>>
    where
        S: AsyncSource,
        Tr: Transform<S::Item>,
        C: CancelCheck,
    {
        let (lower_bound, _) = source.size_hint();
        let mut results = Vec::with_capacity(lower_bound);
        let slow_threshold = self.config.slow_transform_threshold();
        let mut processed: usize = 0;

        loop {
            if let Err(cancelled) = cancel.check(processed) {
                metrics.cancelled = true;
                warn!(processed, "Batch cancelled before pull");
                return Err(Halt::Cancelled(cancelled));
            }

            let Some(element) = source.produce_next().await else {
                break;
            };

            if let Err(cancelled) = cancel.check(processed) {
                metrics.cancelled = true;
                warn!(processed, "Batch cancelled during pull, element dropped");
                return Err(Halt::Cancelled(cancelled));
            }

            let index = processed;
            processed += 1;
            metrics.pulled += 1;

            let transform_started = Instant::now();
            let outcome = transform.apply(element).await;
            let duration = transform_started.elapsed();

            if duration > slow_threshold {
                warn!(
                    index,
                    duration_ms = duration.as_millis(),
                    threshold_ms = slow_threshold.as_millis(),
                    "Slow transform"
                );
            }

            match outcome {
                Ok(Some(result)) => {
                    metrics.record_emitted(duration);
                    results.push(result);
                }
                Ok(None) => {
                    metrics.record_filtered(duration);
                    debug!(index, "Transform declined element");
                }
                Err(source_error) => {
                    metrics.record_failed(duration);
                    error!(index, "Transform failed, aborting batch");
                    return Err(Halt::Failed {
                        index,
                        source: source_error,
                    });
                }
            }

            if self.config.progress_due(metrics.pulled) {
                tracing::info!(
                    pulled = metrics.pulled,
                    emitted = metrics.emitted,
                    filtered = metrics.filtered,
                    "Batch progress"
                );
            }
        }

        Ok(results)
    }
}
