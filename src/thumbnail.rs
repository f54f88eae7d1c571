//! # Thumbnail Preparation
//!
//! Binds a thumbnail size to an image preparer once, producing a reusable
//! [`Transform`] that can be applied to a whole batch of images.
//!
//! Decoding and resizing are not done here. They belong to whatever
//! implements [`ThumbnailPreparer`], which may return `None` when an image
//! cannot be prepared; such images are left out of the batch output.

use crate::batch::batch_process_with;
use crate::config::{ConfigResult, ConfigurationError};
use crate::transform::Transform;
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;

/// Target bounding box for a thumbnail, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThumbnailSize {
    pub width: u32,
    pub height: u32,
}

impl ThumbnailSize {
    pub fn new(width: u32, height: u32) -> ConfigResult<Self> {
        if width == 0 || height == 0 {
            return Err(ConfigurationError::invalid_value(
                "thumbnail_size",
                format!("{width}x{height}"),
                "width and height must be greater than 0",
            ));
        }

        Ok(Self { width, height })
    }

    pub fn square(side: u32) -> ConfigResult<Self> {
        Self::new(side, side)
    }
}

/// Image capability that can produce a thumbnail of an image
#[async_trait]
pub trait ThumbnailPreparer: Send + Sync {
    type Image: Send + 'static;

    /// Prepare a thumbnail of `image` fitting `size`, or `None` if the image
    /// cannot be prepared
    async fn prepare_thumbnail(&self, image: Self::Image, size: ThumbnailSize)
        -> Option<Self::Image>;
}

/// A preparer with its size bound, usable as a batch transform
pub struct PrepareThumbnail<P> {
    preparer: Arc<P>,
    size: ThumbnailSize,
}

impl<P> PrepareThumbnail<P> {
    pub fn size(&self) -> ThumbnailSize {
        self.size
    }
}

impl<P> Clone for PrepareThumbnail<P> {
    fn clone(&self) -> Self {
        Self {
            preparer: Arc::clone(&self.preparer),
            size: self.size,
        }
    }
}

impl<P> Transform<P::Image> for PrepareThumbnail<P>
where
    P: ThumbnailPreparer + 'static,
{
    type Output = P::Image;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Option<P::Image>, Infallible>>;

    fn apply(&self, image: P::Image) -> Self::Future {
        let preparer = Arc::clone(&self.preparer);
        let size = self.size;
        Box::pin(async move { Ok(preparer.prepare_thumbnail(image, size).await) })
    }
}

/// Bind `size` to `preparer`
pub fn prepare_thumbnail<P>(preparer: Arc<P>, size: ThumbnailSize) -> PrepareThumbnail<P>
where
    P: ThumbnailPreparer + 'static,
{
    PrepareThumbnail { preparer, size }
}

/// Prepare thumbnails for `images` one at a time, keeping input order and
/// skipping images the preparer could not handle
pub async fn process_images<P>(
    images: Vec<P::Image>,
    size: ThumbnailSize,
    preparer: Arc<P>,
) -> Vec<P::Image>
where
    P: ThumbnailPreparer + 'static,
{
    batch_process_with(images, prepare_thumbnail(preparer, size)).await
}
