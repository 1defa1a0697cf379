//! Image validation and base64 encoding.
//!
//! The uploaded bytes are sniffed for a known raster signature and decoded once
//! to prove they really are an image before anything is sent to a provider.
//! The media type attached to the result always comes from the bytes; the
//! type the browser declared is only logged when it disagrees.
//!
//! Decoding runs under [`Limits`] so a small, highly compressed upload cannot
//! claim an arbitrarily large pixel buffer.

use crate::types::{EncodedImage, UploadedImage};
use crate::{Error, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::error::ImageError;
use image::{ImageFormat, ImageReader, Limits};
use std::io::Cursor;
use tracing::debug;

/// Largest width or height accepted, in pixels
pub const MAX_IMAGE_DIMENSION: u32 = 8192;

/// Ceiling on the decoder's allocations while validating an upload
pub const MAX_DECODE_ALLOC: u64 = 64 * 1024 * 1024;

/// Media types the encoder accepts. Also advertised to the page for the
/// file picker's `accept` filter.
pub const SUPPORTED_MEDIA_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "image/bmp",
];

fn media_type_for(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Bmp => Some("image/bmp"),
        _ => None,
    }
}

/// Validate `bytes` as an image and encode them as base64.
///
/// # Errors
///
/// [`Error::Encoding`] when the input is empty, has no recognised image
/// signature, is in an unsupported format, exceeds [`MAX_IMAGE_DIMENSION`] or
/// [`MAX_DECODE_ALLOC`], or fails to decode.
pub fn encode_image(bytes: &[u8]) -> Result<EncodedImage> {
    if bytes.is_empty() {
        return Err(Error::encoding("the uploaded file is empty"));
    }

    let format = image::guess_format(bytes)
        .map_err(|_| Error::encoding("the uploaded file is not a recognised image"))?;

    let media_type = media_type_for(format).ok_or_else(|| {
        Error::encoding(format!(
            "unsupported image format {:?}; accepted types are {}",
            format,
            SUPPORTED_MEDIA_TYPES.join(", ")
        ))
    })?;

    decode_limited(bytes, format)?;

    Ok(EncodedImage {
        data: STANDARD.encode(bytes),
        media_type,
    })
}

fn decode_limits() -> Limits {
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_IMAGE_DIMENSION);
    limits.max_image_height = Some(MAX_IMAGE_DIMENSION);
    limits.max_alloc = Some(MAX_DECODE_ALLOC);
    limits
}

fn decode_limited(bytes: &[u8], format: ImageFormat) -> Result<()> {
    let mut reader = ImageReader::with_format(Cursor::new(bytes), format);
    reader.limits(decode_limits());

    match reader.decode() {
        Ok(_) => Ok(()),
        Err(ImageError::Limits(e)) => Err(Error::encoding(format!(
            "the image is too large to process ({}); at most {}x{} pixels are accepted",
            e, MAX_IMAGE_DIMENSION, MAX_IMAGE_DIMENSION
        ))),
        Err(e) => Err(Error::encoding(format!(
            "the image could not be decoded: {}",
            e
        ))),
    }
}

/// Encode an upload, noting when the declared type differs from the detected one.
pub fn encode_upload(upload: &UploadedImage) -> Result<EncodedImage> {
    let encoded = encode_image(&upload.bytes)?;

    if let Some(declared) = upload.declared_media_type.as_deref() {
        if !declared.eq_ignore_ascii_case(encoded.media_type()) {
            debug!(
                declared,
                detected = encoded.media_type(),
                "declared media type differs from image signature"
            );
        }
    }

    Ok(encoded)
}

impl EncodedImage {
    /// Decode the base64 text back into the original bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(&self.data)
            .map_err(|e| Error::encoding(format!("invalid base64 data: {}", e)))
    }
}
