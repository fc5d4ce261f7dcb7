//! Image attachments for multimodal generation requests.
//!
//! Payloads arrive as base64 from the transport layer and are validated here
//! before any model call: strict decode, a hard size cap, and content-type
//! sniffing from magic bytes (JPEG/PNG/WebP/GIF).

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use thiserror::Error;

/// Largest accepted decoded image payload, in bytes.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Errors from image payload validation.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The payload was not valid base64.
    #[error("invalid base64 image data: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// The decoded payload exceeds [`MAX_IMAGE_BYTES`].
    #[error("image too large: {size} bytes (max {max})")]
    TooLarge {
        /// Decoded payload size.
        size: usize,
        /// Configured maximum.
        max: usize,
    },
}

/// A decoded, size-checked image with a sniffed content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    bytes: Vec<u8>,
    mime: &'static str,
}

impl ImageAttachment {
    /// Decodes and validates a base64 payload.
    ///
    /// Surrounding whitespace is tolerated; anything else that is not strict
    /// base64 is rejected, as are payloads over [`MAX_IMAGE_BYTES`], both
    /// before any model call is made.
    pub fn from_base64(encoded: &str) -> Result<Self, ImageError> {
        let bytes = BASE64.decode(encoded.trim())?;
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageError::TooLarge {
                size: bytes.len(),
                max: MAX_IMAGE_BYTES,
            });
        }
        Ok(Self::from_bytes(bytes))
    }

    /// Wraps already-decoded bytes, sniffing the content type.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let mime = sniff_mime(&bytes);
        Self { bytes, mime }
    }

    /// Returns the sniffed content type, e.g. `image/png`.
    #[must_use]
    pub const fn mime(&self) -> &'static str {
        self.mime
    }

    /// Returns the decoded payload.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Re-encodes the payload as a `data:` URL for providers that inline
    /// images into the request body.
    #[must_use]
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64.encode(&self.bytes))
    }
}

/// Detects the image format from magic bytes, defaulting to JPEG.
fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"\xFF\xD8\xFF") {
        "image/jpeg"
    } else if bytes.starts_with(b"\x89PNG") {
        "image/png"
    } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else if bytes.starts_with(b"GIF") {
        "image/gif"
    } else {
        tracing::warn!("unknown image format, defaulting to image/jpeg");
        "image/jpeg"
    }
}
