//! Profile photo resolution.
//!
//! The pipeline fetches the photo once per run through an [`ImageSource`],
//! bounded by a timeout. A failure only omits the image.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};

use crate::error::CompileError;

/// Where image bytes come from. Implementations may block; the caller
/// enforces the timeout.
pub trait ImageSource: Send + Sync {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, String>;
}

/// Decodes `data:<mime>;base64,<payload>` references. Performs no I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUriSource;

impl ImageSource for DataUriSource {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, String> {
        parse_data_uri(reference)
    }
}

/// Decode a base64 data URI into raw bytes.
pub fn parse_data_uri(src: &str) -> Result<Vec<u8>, String> {
    if !src.starts_with("data:") {
        let preview: String = src.chars().take(80).collect();
        return Err(format!(
            "Image reference must be a base64 data URI \
             (e.g. `data:image/png;base64,...`). Got: {preview:?}"
        ));
    }
    let rest = &src["data:".len()..];
    let comma_pos = rest.find(',').ok_or_else(|| {
        "Invalid data URI: missing `,` separator between header and data".to_string()
    })?;
    let header = &rest[..comma_pos];
    if !header.contains(";base64") {
        return Err("Only base64-encoded data URIs are supported".to_string());
    }
    BASE64_STD
        .decode(rest[comma_pos + 1..].trim())
        .map_err(|e| format!("Base64 decode error: {e}"))
}

/// Fetches `http(s)` references with a blocking client, and decodes data
/// URIs locally.
#[cfg(feature = "remote-images")]
pub struct HttpImageSource {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "remote-images")]
impl HttpImageSource {
    pub fn new(timeout: Duration) -> Result<Self, String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?;
        Ok(Self { client })
    }
}

#[cfg(feature = "remote-images")]
impl ImageSource for HttpImageSource {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, String> {
        if reference.starts_with("data:") {
            return parse_data_uri(reference);
        }
        let response = self
            .client
            .get(reference)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| format!("HTTP fetch failed: {e}"))?;
        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| format!("Failed to read response body: {e}"))
    }
}

/// A decoded, embeddable image.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedImage {
    pub reference: String,
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub width_px: u32,
    pub height_px: u32,
}

impl ResolvedImage {
    /// Validate `bytes` as a PNG or JPEG and read its pixel size.
    pub fn decode(reference: &str, bytes: Vec<u8>) -> Result<Self, String> {
        let mime = match ::image::guess_format(&bytes) {
            Ok(::image::ImageFormat::Png) => "image/png",
            Ok(::image::ImageFormat::Jpeg) => "image/jpeg",
            Ok(other) => return Err(format!("unsupported image format {other:?}")),
            Err(e) => return Err(format!("unrecognised image data: {e}")),
        };
        let decoded = ::image::load_from_memory(&bytes).map_err(|e| format!("decode error: {e}"))?;
        Ok(Self {
            reference: reference.to_string(),
            bytes,
            mime,
            width_px: decoded.width(),
            height_px: decoded.height(),
        })
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64_STD.encode(&self.bytes))
    }

    /// Width over height.
    pub fn aspect(&self) -> f32 {
        if self.height_px == 0 {
            1.0
        } else {
            self.width_px as f32 / self.height_px as f32
        }
    }
}

/// Fetch and decode `reference`, giving up after `timeout`. A fetch that
/// outlives the timeout keeps running on its worker thread; its result is
/// discarded.
pub fn fetch_image(
    source: Arc<dyn ImageSource>,
    reference: &str,
    timeout: Duration,
) -> Result<ResolvedImage, CompileError> {
    let fail = |reason: String| CompileError::ResourceFetch {
        reference: preview(reference),
        reason,
    };

    let (tx, rx) = mpsc::channel();
    let owned = reference.to_string();
    thread::Builder::new()
        .name("image-fetch".into())
        .spawn(move || {
            // The receiver may be gone after a timeout.
            let _ = tx.send(source.fetch(&owned));
        })
        .map_err(|e| fail(format!("could not start fetch: {e}")))?;

    let bytes = match rx.recv_timeout(timeout) {
        Ok(result) => result.map_err(fail)?,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            return Err(fail(format!("timed out after {} ms", timeout.as_millis())))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            return Err(fail("fetch worker exited without a result".to_string()))
        }
    };
    ResolvedImage::decode(reference, bytes).map_err(fail)
}

/// Short form of a reference for messages; data URIs can be huge.
fn preview(reference: &str) -> String {
    if reference.chars().count() > 60 {
        let head: String = reference.chars().take(60).collect();
        format!("{head}...")
    } else {
        reference.to_string()
    }
}
