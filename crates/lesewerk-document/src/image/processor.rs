// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — load, rotate with canvas expansion, and save the raster
// images pulled out of PDFs. Uses the `image` and `imageproc` crates.

use std::path::Path;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage, imageops};
use imageproc::geometric_transformations::{self, Interpolation};
use lesewerk_core::error::LesewerkError;
use tracing::{debug, info, instrument};

/// Fill used for the corners uncovered by a non-right-angle rotation.
const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Wraps a single in-memory image.
///
/// Transformations consume `self` and return a new processor, so calls chain:
///
/// ```ignore
/// ImageProcessor::open("IMG/sample/img_0001.png")?
///     .rotate(90.0)
///     .save("IMG/sample/img_0001.png")?;
/// ```
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LesewerkError> {
        let img = image::open(path.as_ref()).map_err(|err| {
            LesewerkError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        debug!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    // -- Transformations ------------------------------------------------------

    /// Rotate clockwise by `degrees`.
    ///
    /// Multiples of 90 are lossless. Any other angle grows the canvas so no
    /// pixel of the source is cut off, then rotates with bilinear
    /// interpolation over a white background.
    #[instrument(skip(self), fields(degrees))]
    pub fn rotate(self, degrees: f32) -> Self {
        let normalised = degrees.rem_euclid(360.0);
        if normalised < 0.01 || (360.0 - normalised) < 0.01 {
            return self;
        }
        info!(degrees = normalised, "Rotating image");

        for (angle, rotate) in [
            (90.0, DynamicImage::rotate90 as fn(&DynamicImage) -> DynamicImage),
            (180.0, DynamicImage::rotate180),
            (270.0, DynamicImage::rotate270),
        ] {
            if (normalised - angle).abs() < 0.01 {
                return Self {
                    image: rotate(&self.image),
                };
            }
        }

        let radians = normalised.to_radians();
        let canvas = expanded_canvas(&self.image.to_rgba8(), radians);
        let rotated: RgbaImage = geometric_transformations::rotate_about_center(
            &canvas,
            radians,
            Interpolation::Bilinear,
            BACKGROUND,
        );
        debug!(
            width = rotated.width(),
            height = rotated.height(),
            "General rotation applied"
        );

        Self {
            image: DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(rotated).to_rgb8()),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Write the image as PNG, whatever the file extension says.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LesewerkError> {
        let path = path.as_ref();
        self.image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|err| {
                LesewerkError::ImageError(format!(
                    "failed to save image to {}: {}",
                    path.display(),
                    err
                ))
            })
    }
}

/// Centre `source` on a canvas large enough to hold it after rotating by
/// `radians`.
fn expanded_canvas(source: &RgbaImage, radians: f32) -> RgbaImage {
    let (w, h) = (source.width() as f32, source.height() as f32);
    let (sin, cos) = (radians.sin().abs(), radians.cos().abs());
    // The canvas holds both the unrotated source and its rotated bounding
    // box, which can be narrower than the source on one axis.
    let new_w = (w * cos + h * sin).ceil().max(w) as u32;
    let new_h = (w * sin + h * cos).ceil().max(h) as u32;

    let mut canvas = RgbaImage::from_pixel(new_w, new_h, BACKGROUND);
    let x = i64::from((new_w - source.width()) / 2);
    let y = i64::from((new_h - source.height()) / 2);
    imageops::overlay(&mut canvas, source, x, y);
    canvas
}
