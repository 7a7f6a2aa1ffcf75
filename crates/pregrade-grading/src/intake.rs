// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Upload intake: size, extension, MIME, and content checks applied before any
// pixel is analysed, plus the SHA-256 fingerprint recorded in the report.

use std::path::Path;

use image::ImageFormat;
use pregrade_core::error::PregradeError;
use pregrade_core::ImageKind;
use pregrade_vision::RasterImage;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

/// Lowercase hex SHA-256 of `data`.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Identify the encoded format from the leading bytes.
pub fn sniff_kind(data: &[u8]) -> Result<ImageKind, PregradeError> {
    let format = image::guess_format(data)
        .map_err(|err| PregradeError::UnsupportedFormat(format!("unrecognised image data: {err}")))?;
    match format {
        ImageFormat::Jpeg => Ok(ImageKind::Jpeg),
        ImageFormat::Png => Ok(ImageKind::Png),
        ImageFormat::WebP => Ok(ImageKind::Webp),
        other => Err(PregradeError::UnsupportedFormat(format!("{other:?}"))),
    }
}

/// A validated, not yet decoded, card photo.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub kind: ImageKind,
    pub sha256: String,
    bytes: Vec<u8>,
}

impl Upload {
    /// Validate raw upload bytes. `mime` is the type the client declared, if
    /// any. The sniffed content decides the final kind.
    #[instrument(skip(bytes), fields(size = bytes.len()))]
    pub fn from_bytes(
        name: &str,
        bytes: Vec<u8>,
        mime: Option<&str>,
        limit: u64,
    ) -> Result<Self, PregradeError> {
        let size = bytes.len() as u64;
        if size > limit {
            return Err(PregradeError::TooLarge { size, limit });
        }
        if bytes.is_empty() {
            return Err(PregradeError::InvalidImage(format!("{name} is empty")));
        }

        if let Some(ext) = Path::new(name).extension().and_then(|e| e.to_str()) {
            if ImageKind::from_extension(ext).is_none() {
                return Err(PregradeError::UnsupportedFormat(format!(".{ext}")));
            }
        }
        if let Some(mime) = mime {
            if ImageKind::from_mime(mime).is_none() {
                return Err(PregradeError::UnsupportedFormat(mime.to_string()));
            }
        }

        let kind = sniff_kind(&bytes)?;
        debug!(?kind, "upload content sniffed");

        Ok(Self {
            name: name.to_string(),
            kind,
            sha256: hash_bytes(&bytes),
            bytes,
        })
    }

    /// Read and validate a file. The size is checked against the file
    /// metadata before the contents are read.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn from_path(path: &Path, limit: u64) -> Result<Self, PregradeError> {
        let size = std::fs::metadata(path)?.len();
        if size > limit {
            return Err(PregradeError::TooLarge { size, limit });
        }
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let upload = Self::from_bytes(&name, bytes, None, limit)?;
        info!(kind = ?upload.kind, size, "upload accepted");
        Ok(upload)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Decode to pixels. Failure here is fatal for the run.
    pub fn decode(&self) -> Result<RasterImage, PregradeError> {
        RasterImage::from_bytes(&self.bytes)
    }
}

/// The photos submitted for one card. Only the front is required.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub front: Option<Upload>,
    pub back: Option<Upload>,
}

impl Submission {
    pub fn new(front: Upload) -> Self {
        Self {
            front: Some(front),
            back: None,
        }
    }

    pub fn with_back(mut self, back: Upload) -> Self {
        self.back = Some(back);
        self
    }

    pub fn front(&self) -> Result<&Upload, PregradeError> {
        self.front.as_ref().ok_or(PregradeError::MissingImage)
    }
}
