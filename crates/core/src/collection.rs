//! Image collection type
//!
//! An [`ImageCollection`] is an ordered sequence of [`Image`]s sharing a
//! band-name schema, typically repeated observations of the same region
//! over time. The collection order is significant: reductions that break
//! ties do so toward the earliest image.

use crate::error::{Error, Result};
use crate::image::Image;

/// An ordered sequence of images sharing a band-name schema.
#[derive(Debug, Clone)]
pub struct ImageCollection {
    images: Vec<Image>,
}

impl ImageCollection {
    /// Create a collection from a list of images.
    ///
    /// All images must expose the same band names in the same order.
    pub fn from_images(images: Vec<Image>) -> Result<Self> {
        if let Some(first) = images.first() {
            let schema: Vec<String> = first.band_names().iter().map(|s| s.to_string()).collect();
            for image in &images[1..] {
                let names: Vec<String> =
                    image.band_names().iter().map(|s| s.to_string()).collect();
                if names != schema {
                    return Err(Error::SchemaMismatch {
                        expected: schema,
                        actual: names,
                    });
                }
            }
        }
        Ok(Self { images })
    }

    /// An empty collection
    pub fn empty() -> Self {
        Self { images: Vec::new() }
    }

    /// Number of images
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether the collection holds no images
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// The images in order
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Iterate over the images in order
    pub fn iter(&self) -> impl Iterator<Item = &Image> {
        self.images.iter()
    }

    /// Apply a transform to every image, yielding a new collection.
    ///
    /// The transform must produce a uniform schema across the collection;
    /// the result is re-validated.
    pub fn map<F>(&self, f: F) -> Result<ImageCollection>
    where
        F: Fn(&Image) -> Result<Image>,
    {
        let mapped: Result<Vec<Image>> = self.images.iter().map(|img| f(img)).collect();
        ImageCollection::from_images(mapped?)
    }
}
