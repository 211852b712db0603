// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image XObject decoding: JPEG streams are handed to the `image` crate, raw
// sample streams (unfiltered, Flate, LZW) are unpacked according to their
// colour space and bit depth.

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lesewerk_core::error::LesewerkError;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

type Result<T> = std::result::Result<T, LesewerkError>;

/// Colour interpretation of raw image samples.
#[derive(Debug, Clone, PartialEq)]
enum ColorModel {
    Gray,
    Rgb,
    Cmyk,
    Indexed { base: Box<ColorModel>, palette: Vec<u8> },
}

impl ColorModel {
    fn components(&self) -> usize {
        match self {
            Self::Gray | Self::Indexed { .. } => 1,
            Self::Rgb => 3,
            Self::Cmyk => 4,
        }
    }
}

/// Decode the image XObject `id` into pixels.
pub fn decode_image(document: &Document, id: ObjectId) -> Result<DynamicImage> {
    let stream = document
        .get_object(id)
        .and_then(Object::as_stream)
        .map_err(|err| LesewerkError::PdfError(format!("object {id:?} is not a stream: {err}")))?;

    let dict = &stream.dict;
    let width = positive_dimension(dict, b"Width")?;
    let height = positive_dimension(dict, b"Height")?;
    let filters = filter_names(dict);
    debug!(?id, width, height, ?filters, "Decoding image XObject");

    match filters.last().map(String::as_str) {
        Some("DCTDecode") => {
            if filters.len() > 1 {
                return Err(LesewerkError::UnsupportedImage(format!(
                    "filter chain {filters:?}"
                )));
            }
            image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)
                .map_err(|err| LesewerkError::ImageError(format!("JPEG decode failed: {err}")))
        }
        None => decode_raw(document, dict, width, height, &stream.content),
        Some("FlateDecode") | Some("LZWDecode") => {
            let samples = decompress(stream)?;
            decode_raw(document, dict, width, height, &samples)
        }
        Some(other) => Err(LesewerkError::UnsupportedImage(format!("{other} streams"))),
    }
}

fn decompress(stream: &Stream) -> Result<Vec<u8>> {
    stream
        .decompressed_content()
        .map_err(|err| LesewerkError::PdfError(format!("failed to decompress image stream: {err}")))
}

fn positive_dimension(dict: &Dictionary, key: &[u8]) -> Result<u32> {
    let value = dict.get(key).and_then(Object::as_i64).map_err(|_| {
        LesewerkError::PdfError(format!(
            "image is missing /{}",
            String::from_utf8_lossy(key)
        ))
    })?;
    u32::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| {
            LesewerkError::PdfError(format!(
                "invalid /{} {}",
                String::from_utf8_lossy(key),
                value
            ))
        })
}

fn filter_names(dict: &Dictionary) -> Vec<String> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![String::from_utf8_lossy(name).into_owned()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_name().ok())
            .map(|name| String::from_utf8_lossy(name).into_owned())
            .collect(),
        _ => Vec::new(),
    }
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> Result<&'a Object> {
    match object {
        Object::Reference(id) => document
            .get_object(*id)
            .map_err(|err| LesewerkError::PdfError(format!("dangling reference {id:?}: {err}"))),
        other => Ok(other),
    }
}

fn color_model(document: &Document, object: &Object) -> Result<ColorModel> {
    match resolve(document, object)? {
        Object::Name(name) => named_color_model(name),
        Object::Array(items) => {
            let family = items
                .first()
                .and_then(|first| first.as_name().ok())
                .ok_or_else(|| LesewerkError::PdfError("empty colour space array".to_string()))?;
            match family {
                b"ICCBased" => {
                    let profile = items
                        .get(1)
                        .ok_or_else(|| LesewerkError::PdfError("ICCBased without profile".into()))
                        .and_then(|obj| resolve(document, obj))?;
                    let n = profile
                        .as_stream()
                        .ok()
                        .and_then(|s| s.dict.get(b"N").and_then(Object::as_i64).ok())
                        .unwrap_or(3);
                    match n {
                        1 => Ok(ColorModel::Gray),
                        3 => Ok(ColorModel::Rgb),
                        4 => Ok(ColorModel::Cmyk),
                        other => Err(LesewerkError::UnsupportedImage(format!(
                            "ICC profile with {other} components"
                        ))),
                    }
                }
                b"Indexed" | b"I" => {
                    let base = items
                        .get(1)
                        .ok_or_else(|| LesewerkError::PdfError("Indexed without base".into()))
                        .and_then(|obj| color_model(document, obj))?;
                    if matches!(base, ColorModel::Indexed { .. }) {
                        return Err(LesewerkError::UnsupportedImage(
                            "nested Indexed colour space".to_string(),
                        ));
                    }
                    let lookup = items
                        .get(3)
                        .ok_or_else(|| LesewerkError::PdfError("Indexed without lookup".into()))
                        .and_then(|obj| resolve(document, obj))?;
                    let palette = match lookup {
                        Object::String(bytes, _) => bytes.clone(),
                        Object::Stream(stream) => {
                            if stream.dict.has(b"Filter") {
                                decompress(stream)?
                            } else {
                                stream.content.clone()
                            }
                        }
                        _ => {
                            return Err(LesewerkError::PdfError(
                                "Indexed lookup is neither string nor stream".to_string(),
                            ));
                        }
                    };
                    Ok(ColorModel::Indexed {
                        base: Box::new(base),
                        palette,
                    })
                }
                b"CalGray" => Ok(ColorModel::Gray),
                b"CalRGB" | b"Lab" => Ok(ColorModel::Rgb),
                other => Err(LesewerkError::UnsupportedImage(format!(
                    "{} colour space",
                    String::from_utf8_lossy(other)
                ))),
            }
        }
        _ => Err(LesewerkError::PdfError("malformed /ColorSpace".to_string())),
    }
}

fn named_color_model(name: &[u8]) -> Result<ColorModel> {
    match name {
        b"DeviceGray" | b"G" | b"CalGray" => Ok(ColorModel::Gray),
        b"DeviceRGB" | b"RGB" | b"CalRGB" => Ok(ColorModel::Rgb),
        b"DeviceCMYK" | b"CMYK" => Ok(ColorModel::Cmyk),
        other => Err(LesewerkError::UnsupportedImage(format!(
            "{} colour space",
            String::from_utf8_lossy(other)
        ))),
    }
}

/// `/Decode [1 0]` (or `[1 0 1 0 ...]`) flips every component.
fn decode_inverted(dict: &Dictionary) -> bool {
    let Ok(Object::Array(items)) = dict.get(b"Decode") else {
        return false;
    };
    let number = |obj: &Object| match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    };
    match (items.first().and_then(number), items.get(1).and_then(number)) {
        (Some(lo), Some(hi)) => lo > hi,
        _ => false,
    }
}

fn decode_raw(
    document: &Document,
    dict: &Dictionary,
    width: u32,
    height: u32,
    samples: &[u8],
) -> Result<DynamicImage> {
    let is_mask = matches!(dict.get(b"ImageMask"), Ok(Object::Boolean(true)));
    let model = if is_mask {
        ColorModel::Gray
    } else {
        let space = dict
            .get(b"ColorSpace")
            .map_err(|_| LesewerkError::PdfError("image has no /ColorSpace".to_string()))?;
        color_model(document, space)?
    };
    let bits = if is_mask {
        1
    } else {
        dict.get(b"BitsPerComponent")
            .and_then(Object::as_i64)
            .unwrap_or(8)
    };
    let bits = match bits {
        1 | 2 | 4 | 8 | 16 => bits as u32,
        other => {
            return Err(LesewerkError::UnsupportedImage(format!(
                "{other} bits per component"
            )));
        }
    };

    let values = unpack_samples(samples, width, height, model.components(), bits)?;
    let invert = decode_inverted(dict);
    let max = if bits == 16 { u16::MAX } else { (1u16 << bits) - 1 };
    let scale = |v: u16| -> u8 {
        let v = if invert { max - v } else { v };
        if bits == 16 {
            (v >> 8) as u8
        } else {
            ((u32::from(v) * 255) / u32::from(max)) as u8
        }
    };

    let (w, h) = (width, height);
    match &model {
        ColorModel::Gray => {
            let pixels: Vec<u8> = values.iter().map(|&v| scale(v)).collect();
            gray_image(w, h, pixels)
        }
        ColorModel::Rgb => {
            let pixels: Vec<u8> = values.iter().map(|&v| scale(v)).collect();
            rgb_image(w, h, pixels)
        }
        ColorModel::Cmyk => {
            let scaled: Vec<u8> = values.iter().map(|&v| scale(v)).collect();
            rgb_image(w, h, cmyk_to_rgb(&scaled))
        }
        ColorModel::Indexed { base, palette } => {
            let n = base.components();
            let mut expanded = Vec::with_capacity(values.len() * n);
            for &index in &values {
                let start = usize::from(index) * n;
                match palette.get(start..start + n) {
                    Some(entry) => expanded.extend_from_slice(entry),
                    None => expanded.extend(std::iter::repeat_n(0u8, n)),
                }
            }
            match base.as_ref() {
                ColorModel::Gray => gray_image(w, h, expanded),
                ColorModel::Rgb => rgb_image(w, h, expanded),
                ColorModel::Cmyk => rgb_image(w, h, cmyk_to_rgb(&expanded)),
                ColorModel::Indexed { .. } => Err(LesewerkError::UnsupportedImage(
                    "nested Indexed colour space".to_string(),
                )),
            }
        }
    }
}

/// Split packed rows into one value per component. Rows are padded to a
/// whole byte as PDF requires.
fn unpack_samples(
    data: &[u8],
    width: u32,
    height: u32,
    components: usize,
    bits: u32,
) -> Result<Vec<u16>> {
    let overflow = || {
        LesewerkError::PdfError(format!(
            "image size {width}x{height} with {components} components overflows"
        ))
    };
    let per_row = (width as usize)
        .checked_mul(components)
        .ok_or_else(overflow)?;
    let row_bytes = per_row
        .checked_mul(bits as usize)
        .ok_or_else(overflow)?
        .div_ceil(8);
    let needed = row_bytes
        .checked_mul(height as usize)
        .ok_or_else(overflow)?;
    if data.len() < needed {
        return Err(LesewerkError::PdfError(format!(
            "image data truncated: {} bytes, expected {}",
            data.len(),
            needed
        )));
    }

    let mut values = Vec::with_capacity(per_row * height as usize);
    for row in data.chunks_exact(row_bytes).take(height as usize) {
        match bits {
            8 => values.extend(row[..per_row].iter().map(|&b| u16::from(b))),
            16 => values.extend(
                row.chunks_exact(2)
                    .take(per_row)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]])),
            ),
            _ => {
                let per_byte = (8 / bits) as usize;
                let mask = (1u8 << bits) - 1;
                values.extend((0..per_row).map(|i| {
                    let byte = row[i / per_byte];
                    let shift = 8 - bits as usize * (i % per_byte + 1);
                    u16::from((byte >> shift) & mask)
                }));
            }
        }
    }
    Ok(values)
}

fn cmyk_to_rgb(cmyk: &[u8]) -> Vec<u8> {
    cmyk.chunks_exact(4)
        .flat_map(|px| {
            let k = 255 - u32::from(px[3]);
            let channel = |c: u8| ((255 - u32::from(c)) * k / 255) as u8;
            [channel(px[0]), channel(px[1]), channel(px[2])]
        })
        .collect()
}

fn gray_image(width: u32, height: u32, pixels: Vec<u8>) -> Result<DynamicImage> {
    GrayImage::from_raw(width, height, pixels)
        .map(DynamicImage::ImageLuma8)
        .ok_or_else(|| LesewerkError::ImageError("gray buffer size mismatch".to_string()))
}

fn rgb_image(width: u32, height: u32, pixels: Vec<u8>) -> Result<DynamicImage> {
    RgbImage::from_raw(width, height, pixels)
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| LesewerkError::ImageError("RGB buffer size mismatch".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpacks_one_bit_rows_with_padding() {
        // 3 pixels per row, 2 rows: 101xxxxx / 010xxxxx
        let data = [0b1010_0000, 0b0100_0000];
        let values = unpack_samples(&data, 3, 2, 1, 1).expect("unpack");
        assert_eq!(values, vec![1, 0, 1, 0, 1, 0]);
    }

    #[test]
    fn unpacks_four_bit_samples() {
        let data = [0xF0, 0x3C];
        let values = unpack_samples(&data, 2, 2, 1, 4).expect("unpack");
        assert_eq!(values, vec![15, 0, 3, 12]);
    }

    #[test]
    fn huge_declared_dimensions_are_rejected() {
        let result = unpack_samples(&[0u8; 16], u32::MAX, u32::MAX, 4, 16);
        assert!(matches!(
            result,
            Err(LesewerkError::PdfError(msg)) if msg.contains("overflows")
        ));
    }

    #[test]
    fn truncated_data_is_an_error() {
        let result = unpack_samples(&[0u8; 5], 3, 2, 1, 8);
        assert!(matches!(result, Err(LesewerkError::PdfError(_))));
    }

    #[test]
    fn cmyk_black_and_white() {
        assert_eq!(cmyk_to_rgb(&[0, 0, 0, 0]), vec![255, 255, 255]);
        assert_eq!(cmyk_to_rgb(&[0, 0, 0, 255]), vec![0, 0, 0]);
        assert_eq!(cmyk_to_rgb(&[255, 0, 0, 0]), vec![0, 255, 255]);
    }

    #[test]
    fn named_spaces_map_to_models() {
        assert_eq!(named_color_model(b"DeviceGray").unwrap(), ColorModel::Gray);
        assert_eq!(named_color_model(b"DeviceRGB").unwrap(), ColorModel::Rgb);
        assert_eq!(named_color_model(b"DeviceCMYK").unwrap(), ColorModel::Cmyk);
        assert!(matches!(
            named_color_model(b"Separation"),
            Err(LesewerkError::UnsupportedImage(_))
        ));
    }

    #[test]
    fn one_bit_mask_decodes_to_black_and_white() {
        let mut dict = Dictionary::new();
        dict.set("ImageMask", Object::Boolean(true));
        let doc = Document::with_version("1.5");
        let img = decode_raw(&doc, &dict, 2, 1, &[0b0100_0000]).expect("decode");
        let luma = img.to_luma8();
        assert_eq!(luma.get_pixel(0, 0).0, [0]);
        assert_eq!(luma.get_pixel(1, 0).0, [255]);
    }

    #[test]
    fn inverted_decode_array_flips_gray() {
        let mut dict = Dictionary::new();
        dict.set("ColorSpace", Object::Name(b"DeviceGray".to_vec()));
        dict.set("BitsPerComponent", Object::Integer(8));
        dict.set("Decode", Object::Array(vec![Object::Integer(1), Object::Integer(0)]));
        let doc = Document::with_version("1.5");
        let img = decode_raw(&doc, &dict, 1, 1, &[0]).expect("decode");
        assert_eq!(img.to_luma8().get_pixel(0, 0).0, [255]);
    }

    #[test]
    fn indexed_palette_expands_to_rgb() {
        let mut dict = Dictionary::new();
        dict.set(
            "ColorSpace",
            Object::Array(vec![
                Object::Name(b"Indexed".to_vec()),
                Object::Name(b"DeviceRGB".to_vec()),
                Object::Integer(1),
                Object::String(vec![255, 0, 0, 0, 0, 255], lopdf::StringFormat::Hexadecimal),
            ]),
        );
        dict.set("BitsPerComponent", Object::Integer(8));
        let doc = Document::with_version("1.5");
        let img = decode_raw(&doc, &dict, 2, 1, &[1, 0]).expect("decode");
        let rgb = img.to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [0, 0, 255]);
        assert_eq!(rgb.get_pixel(1, 0).0, [255, 0, 0]);
    }
}
