// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image extraction — pull every embedded raster image out of a PDF, save it
// as a numbered PNG, and turn it upright using the OCR engine's orientation
// detection.

use std::fs;
use std::path::Path;

use lesewerk_core::error::LesewerkError;
use lesewerk_core::{Outcome, PageImage};
use tracing::{debug, info, instrument, warn};

use crate::image::ImageProcessor;
use crate::pdf::PdfReader;
use crate::scan::OcrEngine;

/// Images written for one PDF.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Saved images, numbered contiguously in page order.
    pub images: Vec<PageImage>,
    /// One note per embedded image left out because its encoding cannot be
    /// decoded (CCITTFax, JBIG2, JPX).
    pub skipped: Vec<String>,
}

/// Saves the images of one PDF into a folder, correcting their orientation.
pub struct ImageExtractor<'a> {
    ocr: &'a dyn OcrEngine,
}

impl<'a> ImageExtractor<'a> {
    pub fn new(ocr: &'a dyn OcrEngine) -> Self {
        Self { ocr }
    }

    /// Extract every image of `pdf_path` into `dest` as `img_0001.png`,
    /// `img_0002.png`, ... in page order.
    ///
    /// `dest` is created when missing and never cleared. Images in an
    /// unsupported encoding are skipped without using up a number. Other
    /// decode failures and every write failure abort the extraction;
    /// orientation detection failures only leave the image unrotated.
    #[instrument(skip_all, fields(pdf = %pdf_path.display(), dest = %dest.display()))]
    pub fn extract(&self, pdf_path: &Path, dest: &Path) -> Result<Extraction, LesewerkError> {
        let reader = PdfReader::open(pdf_path)?;
        fs::create_dir_all(dest)?;

        let refs = reader.image_refs();
        info!(
            pages = reader.page_count(),
            images = refs.len(),
            "Extracting images"
        );

        let mut extraction = Extraction::default();
        let mut index = 0u32;
        for image_ref in refs {
            let decoded = match reader.decode(image_ref) {
                Ok(decoded) => decoded,
                Err(LesewerkError::UnsupportedImage(reason)) => {
                    warn!(page = image_ref.page, %reason, "Image skipped");
                    extraction.skipped.push(reason);
                    continue;
                }
                Err(err) => return Err(err),
            };

            index += 1;
            let path = dest.join(PageImage::file_name(index));
            let processor = ImageProcessor::from_dynamic(decoded);
            processor.save(&path)?;
            debug!(index, page = image_ref.page, path = %path.display(), "Image saved");

            let (rotation, orientation_note) = match self.orient(processor, &path)? {
                Outcome::Success(rotation) => (rotation, None),
                Outcome::Degraded { value, reason } => (value, Some(reason)),
            };

            extraction.images.push(PageImage {
                index,
                page: image_ref.page,
                path,
                rotation,
                orientation_note,
            });
        }

        info!(
            count = extraction.images.len(),
            skipped = extraction.skipped.len(),
            "Extraction complete"
        );
        Ok(extraction)
    }

    /// Detect the orientation of the saved image and rewrite it upright.
    /// Returns the rotation actually applied. Only detection may degrade;
    /// failing to rewrite the image is an error.
    fn orient(&self, processor: ImageProcessor, path: &Path) -> Result<Outcome<u32>, LesewerkError> {
        let rotation = match self.ocr.detect_orientation(path) {
            Ok(rotation) => rotation % 360,
            Err(err) => {
                warn!(path = %path.display(), %err, "Orientation detection failed");
                return Ok(Outcome::degraded(
                    0,
                    format!("orientation detection failed: {err}"),
                ));
            }
        };
        if rotation == 0 {
            return Ok(Outcome::Success(0));
        }

        debug!(rotation, path = %path.display(), "Correcting orientation");
        processor.rotate(rotation as f32).save(path)?;
        Ok(Outcome::Success(rotation))
    }
}
