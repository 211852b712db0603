// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open a PDF with `lopdf` and enumerate the image XObjects each
// page draws from, in page order then resource order.

use std::collections::HashSet;
use std::path::Path;

use image::DynamicImage;
use lesewerk_core::error::LesewerkError;
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, info, instrument, warn};

use super::decode;

/// Maximum depth when following `/Parent` links for inherited resources.
const MAX_PAGE_TREE_DEPTH: usize = 32;

/// Maximum nesting of Form XObjects searched for images.
const MAX_FORM_DEPTH: usize = 8;

/// An image XObject used on a specific page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRef {
    /// 1-based page number.
    pub page: u32,
    /// Object id of the image stream.
    pub object_id: ObjectId,
}

/// Reads embedded images out of existing PDF files.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LesewerkError> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            LesewerkError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self { document })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    // -- Extraction -----------------------------------------------------------

    /// List every image XObject, page by page.
    ///
    /// Within a page, images appear in the order their names are listed in the
    /// page's `/XObject` resources, with images from nested Form XObjects
    /// inserted where the form is listed. An image referenced twice on the same
    /// page is listed once; an image reused on another page is listed again.
    pub fn image_refs(&self) -> Vec<ImageRef> {
        let mut refs = Vec::new();

        for (page, page_id) in self.document.get_pages() {
            let Some(resources) = self.page_resources(page_id) else {
                debug!(page, "Page has no resources");
                continue;
            };

            let mut seen = HashSet::new();
            let mut ids = Vec::new();
            self.collect_images(resources, &mut seen, &mut ids, 0);
            debug!(page, images = ids.len(), "Images found on page");

            refs.extend(ids.into_iter().map(|object_id| ImageRef { page, object_id }));
        }

        refs
    }

    /// Decode one image into pixels.
    pub fn decode(&self, image: ImageRef) -> Result<DynamicImage, LesewerkError> {
        decode::decode_image(&self.document, image.object_id).map_err(|err| match err {
            LesewerkError::UnsupportedImage(msg) => LesewerkError::UnsupportedImage(format!(
                "page {} object {:?}: {}",
                image.page, image.object_id, msg
            )),
            other => other,
        })
    }

    // -- Helpers --------------------------------------------------------------

    /// Resolve a page's `/Resources`, walking up the page tree when the page
    /// inherits them.
    fn page_resources(&self, page_id: ObjectId) -> Option<&Dictionary> {
        let mut current = Some(page_id);
        let mut depth = 0;

        while let Some(id) = current {
            if depth > MAX_PAGE_TREE_DEPTH {
                warn!(?page_id, "Page tree too deep while resolving resources");
                return None;
            }
            let node = self.document.get_dictionary(id).ok()?;
            if let Ok(resources) = node.get(b"Resources") {
                return self.resolve_dictionary(resources);
            }
            current = node.get(b"Parent").and_then(Object::as_reference).ok();
            depth += 1;
        }

        None
    }

    /// Follow a reference (if any) to a dictionary.
    fn resolve_dictionary<'a>(&'a self, object: &'a Object) -> Option<&'a Dictionary> {
        match object {
            Object::Reference(id) => self.document.get_dictionary(*id).ok(),
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    fn collect_images(
        &self,
        resources: &Dictionary,
        seen: &mut HashSet<ObjectId>,
        out: &mut Vec<ObjectId>,
        depth: usize,
    ) {
        let Some(xobjects) = resources
            .get(b"XObject")
            .ok()
            .and_then(|obj| self.resolve_dictionary(obj))
        else {
            return;
        };

        for (name, entry) in xobjects.iter() {
            let Ok(id) = entry.as_reference() else {
                debug!(name = %String::from_utf8_lossy(name), "Skipping direct XObject");
                continue;
            };
            let Ok(Object::Stream(stream)) = self.document.get_object(id) else {
                continue;
            };

            match stream.dict.get(b"Subtype").and_then(Object::as_name) {
                Ok(b"Image") => {
                    if seen.insert(id) {
                        out.push(id);
                    }
                }
                Ok(b"Form") if depth < MAX_FORM_DEPTH => {
                    if let Some(form_resources) = stream
                        .dict
                        .get(b"Resources")
                        .ok()
                        .and_then(|obj| self.resolve_dictionary(obj))
                    {
                        self.collect_images(form_resources, seen, out, depth + 1);
                    }
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestImage, write_pdf};

    /// Write `pages` to a temporary file and open it.
    fn open_pages(pages: &[Vec<TestImage>]) -> (tempfile::TempDir, PdfReader) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("fixture.pdf");
        write_pdf(&path, pages);
        let reader = PdfReader::open(&path).expect("load");
        (dir, reader)
    }

    #[test]
    fn lists_images_in_page_order() {
        let (_dir, reader) = open_pages(&[
            vec![TestImage::gray(4, 3, 10)],
            vec![TestImage::gray(2, 2, 20), TestImage::rgb(3, 3, [1, 2, 3])],
        ]);

        assert_eq!(reader.page_count(), 2);
        let refs = reader.image_refs();
        let pages: Vec<u32> = refs.iter().map(|r| r.page).collect();
        assert_eq!(pages, vec![1, 2, 2]);
    }

    #[test]
    fn decodes_gray_and_rgb_samples() {
        let (_dir, reader) = open_pages(&[vec![TestImage::gray(4, 3, 10), TestImage::rgb(2, 5, [9, 8, 7])]]);
        let refs = reader.image_refs();

        let gray = reader.decode(refs[0]).expect("gray decodes");
        assert_eq!((gray.width(), gray.height()), (4, 3));
        assert_eq!(gray.to_luma8().get_pixel(0, 0).0, [10]);

        let rgb = reader.decode(refs[1]).expect("rgb decodes");
        assert_eq!((rgb.width(), rgb.height()), (2, 5));
        assert_eq!(rgb.to_rgb8().get_pixel(1, 4).0, [9, 8, 7]);
    }

    #[test]
    fn decodes_jpeg_images() {
        let (_dir, reader) = open_pages(&[vec![TestImage::jpeg(16, 8, [200, 200, 200])]]);
        let refs = reader.image_refs();

        let img = reader.decode(refs[0]).expect("jpeg decodes");
        assert_eq!((img.width(), img.height()), (16, 8));
    }

    #[test]
    fn page_without_images_contributes_nothing() {
        let (_dir, reader) = open_pages(&[vec![], vec![TestImage::gray(1, 1, 0)]]);
        let refs = reader.image_refs();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].page, 2);
    }

    #[test]
    fn rejects_garbage_bytes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("garbage.pdf");
        std::fs::write(&path, b"definitely not a pdf").expect("write");
        let result = PdfReader::open(&path);
        assert!(matches!(result, Err(LesewerkError::PdfError(_))));
    }
}
