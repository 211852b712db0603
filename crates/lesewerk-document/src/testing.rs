// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test fixtures — small synthetic PDFs with known embedded images.
//
// Available to this crate's unit tests and, through the `test-support`
// feature, to downstream crates' tests.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};

/// An image to embed on a synthetic page.
#[derive(Debug, Clone)]
pub struct TestImage {
    width: u32,
    height: u32,
    color_space: &'static str,
    filter: Option<&'static str>,
    data: Vec<u8>,
    compress: bool,
}

impl TestImage {
    /// Uniform 8-bit DeviceGray image, stored uncompressed.
    pub fn gray(width: u32, height: u32, value: u8) -> Self {
        Self {
            width,
            height,
            color_space: "DeviceGray",
            filter: None,
            data: vec![value; (width * height) as usize],
            compress: false,
        }
    }

    /// Uniform 8-bit DeviceRGB image, stored Flate-compressed.
    pub fn rgb(width: u32, height: u32, color: [u8; 3]) -> Self {
        let data = color
            .iter()
            .copied()
            .cycle()
            .take((width * height * 3) as usize)
            .collect();
        Self {
            width,
            height,
            color_space: "DeviceRGB",
            filter: None,
            data,
            compress: true,
        }
    }

    /// Uniform RGB image stored as a DCTDecode (JPEG) stream.
    pub fn jpeg(width: u32, height: u32, color: [u8; 3]) -> Self {
        let pixels = RgbImage::from_pixel(width, height, image::Rgb(color));
        let mut data = Vec::new();
        DynamicImage::ImageRgb8(pixels)
            .write_to(&mut Cursor::new(&mut data), ImageFormat::Jpeg)
            .expect("JPEG encoding of a fixture image");
        Self {
            width,
            height,
            color_space: "DeviceRGB",
            filter: Some("DCTDecode"),
            data,
            compress: false,
        }
    }

    /// Gray image whose stream carries `filter` over opaque `data`, for
    /// encodings the decoder does not read.
    pub fn encoded(width: u32, height: u32, filter: &'static str, data: &[u8]) -> Self {
        Self {
            width,
            height,
            color_space: "DeviceGray",
            filter: Some(filter),
            data: data.to_vec(),
            compress: false,
        }
    }

    fn into_stream(self) -> Stream {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(self.width),
            "Height" => i64::from(self.height),
            "ColorSpace" => self.color_space,
            "BitsPerComponent" => 8,
        };
        if let Some(filter) = self.filter {
            dict.set("Filter", filter);
        }
        let mut stream = Stream::new(dict, self.data);
        if self.compress {
            stream.compress().expect("Flate compression of a fixture stream");
        }
        stream
    }
}

/// Build a PDF where page `n` draws the images in `pages[n]`, in order.
pub fn build_pdf(pages: &[Vec<TestImage>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::new();

    for images in pages {
        let mut xobjects = Dictionary::new();
        let mut content = String::new();
        for (i, image) in images.iter().enumerate() {
            let name = format!("Im{}", i + 1);
            content.push_str(&format!(
                "q {} 0 0 {} 0 0 cm /{} Do Q\n",
                image.width, image.height, name
            ));
            let image_id = doc.add_object(image.clone().into_stream());
            xobjects.set(name, image_id);
        }

        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Contents" => content_id,
            "Resources" => dictionary! { "XObject" => xobjects },
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("saving a fixture PDF");
    bytes
}

/// Write [`build_pdf`] output to `path`.
pub fn write_pdf(path: &Path, pages: &[Vec<TestImage>]) {
    std::fs::write(path, build_pdf(pages)).expect("writing a fixture PDF");
}
