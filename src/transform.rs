//! # Transform Capability
//!
//! The unary async operation the aggregator applies to each element. A
//! transform resolves to one of three outcomes:
//!
//! - `Ok(Some(result))` - the result is appended to the output
//! - `Ok(None)` - the transform declined this element, the batch continues
//! - `Err(error)` - the whole batch is aborted
//!
//! Any `Fn(T) -> impl Future<Output = Result<Option<R>, E>>` closure is a
//! transform. Closures that cannot fail are adapted with [`infallible`].

use futures::future::{FutureExt, Map};
use std::convert::Infallible;
use std::future::Future;

/// An async, possibly-failing, possibly-filtering unary function
pub trait Transform<T> {
    type Output;
    type Error;
    type Future: Future<Output = Result<Option<Self::Output>, Self::Error>>;

    /// Start transforming `element`
    fn apply(&self, element: T) -> Self::Future;
}

impl<T, R, E, F, Fut> Transform<T> for F
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<Option<R>, E>>,
{
    type Output = R;
    type Error = E;
    type Future = Fut;

    fn apply(&self, element: T) -> Fut {
        self(element)
    }
}

/// Adapter for transforms that only filter and never fail
#[derive(Debug, Clone, Copy)]
pub struct InfallibleTransform<F> {
    inner: F,
}

/// Wrap `f` so it can be driven as a [`Transform`] with `Error = Infallible`
pub fn infallible<F>(f: F) -> InfallibleTransform<F> {
    InfallibleTransform { inner: f }
}

impl<F> InfallibleTransform<F> {
    pub fn into_inner(self) -> F {
        self.inner
    }
}

type OkFn<R> = fn(Option<R>) -> Result<Option<R>, Infallible>;

impl<T, R, F, Fut> Transform<T> for InfallibleTransform<F>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Option<R>>,
{
    type Output = R;
    type Error = Infallible;
    type Future = Map<Fut, OkFn<R>>;

    fn apply(&self, element: T) -> Self::Future {
        (self.inner)(element).map(Ok as OkFn<R>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_closure_is_transform() {
        let halve = |x: u32| async move {
            if x % 2 == 0 {
                Ok::<_, String>(Some(x / 2))
            } else {
                Ok(None)
            }
        };

        assert_eq!(halve.apply(8).await, Ok(Some(4)));
        assert_eq!(halve.apply(7).await, Ok(None));
    }

    #[tokio::test]
    async fn test_closure_error_passes_through() {
        let reject = |x: u32| async move { Err::<Option<u32>, _>(format!("rejected {x}")) };
        assert_eq!(reject.apply(5).await, Err("rejected 5".to_string()));
    }

    #[tokio::test]
    async fn test_infallible_adapter() {
        let shout = infallible(|s: &'static str| async move {
            if s.is_empty() {
                None
            } else {
                Some(s.to_uppercase())
            }
        });

        assert_eq!(shout.apply("hi").await, Ok(Some("HI".to_string())));
        assert_eq!(shout.apply("").await, Ok(None));
    }
}
