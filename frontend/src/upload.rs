//! Turning a picked or dropped image file into a base64 data URL.
//!
//! Failures come back as `UploadError` for the form to show inline.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, info};
use thiserror::Error;
use wasm_bindgen_futures::JsFuture;
use web_sys::js_sys::Uint8Array;
use web_sys::File;

use crate::config;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UploadError {
    #[error("the selected file is empty")]
    Empty,

    #[error("unsupported file type '{0}', please choose a JPEG, PNG, WebP or GIF image")]
    UnsupportedType(String),

    #[error("image is {size} bytes, the limit is {max} bytes")]
    TooLarge { size: u64, max: u64 },

    #[error("could not read the file: {0}")]
    Read(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadLimits {
    pub max_bytes: u64,
    pub accepted: Vec<String>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_bytes: config::MAX_UPLOAD_BYTES,
            accepted: config::ACCEPTED_IMAGE_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl UploadLimits {
    fn accepts(&self, mime: &str) -> bool {
        self.accepted.iter().any(|accepted| accepted.eq_ignore_ascii_case(mime))
    }
}

pub fn validate(mime: &str, size: u64, limits: &UploadLimits) -> Result<(), UploadError> {
    if !limits.accepts(mime) {
        return Err(UploadError::UnsupportedType(mime.to_string()));
    }
    if size == 0 {
        return Err(UploadError::Empty);
    }
    if size > limits.max_bytes {
        return Err(UploadError::TooLarge {
            size,
            max: limits.max_bytes,
        });
    }
    Ok(())
}

pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime.to_ascii_lowercase(), STANDARD.encode(bytes))
}

/// Validate `file` and read it into a data URL ready for an `<img src>` preview.
pub async fn read_image(file: &File, limits: &UploadLimits) -> Result<String, UploadError> {
    let mime = file.type_();
    let size = file.size() as u64;
    validate(&mime, size, limits)?;

    debug!("Reading {} ({} bytes)", file.name(), size);
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|err| UploadError::Read(format!("{:?}", err)))?;
    let bytes = Uint8Array::new(&buffer).to_vec();

    info!("Image {} ready for upload", file.name());
    Ok(to_data_url(&mime, &bytes))
}
