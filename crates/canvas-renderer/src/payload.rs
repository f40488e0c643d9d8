//! Frame payloads as delivered by the capture engine

use frame_geometry::UiOrientation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// How the capture engine hands over image bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum DeliveryMode {
    /// Path of an image file written by the engine
    #[default]
    File,
    /// Base64 encoded image inline in the payload
    Data,
}

impl DeliveryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMode::File => "file",
            DeliveryMode::Data => "data",
        }
    }
}

impl From<&str> for DeliveryMode {
    /// Unrecognized modes fall back to `File`
    fn from(s: &str) -> Self {
        match s {
            "data" => DeliveryMode::Data,
            _ => DeliveryMode::File,
        }
    }
}

impl From<String> for DeliveryMode {
    fn from(s: String) -> Self {
        DeliveryMode::from(s.as_str())
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource reference to decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    File(PathBuf),
    Data(String),
}

/// One image of a capture payload (fullsize or thumbnail)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImagePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// UI orientation at capture time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<UiOrientation>,
    /// Display rotation in degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<i32>,
    /// Capture time (ms since epoch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ImagePayload {
    pub fn from_file(path: impl Into<String>) -> Self {
        Self {
            file: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn from_data(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
            ..Default::default()
        }
    }

    pub fn with_orientation(mut self, orientation: UiOrientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    /// Whether the payload carries a non-empty reference for `mode`
    pub fn has_resource(&self, mode: DeliveryMode) -> bool {
        self.resource(mode).is_some()
    }

    fn resource(&self, mode: DeliveryMode) -> Option<&str> {
        let value = match mode {
            DeliveryMode::File => self.file.as_deref(),
            DeliveryMode::Data => self.data.as_deref(),
        };
        value.filter(|v| !v.is_empty())
    }

    /// Resource to decode for the configured delivery mode
    pub fn source(&self, mode: DeliveryMode) -> Option<ImageSource> {
        let value = self.resource(mode)?;
        Some(match mode {
            DeliveryMode::File => {
                ImageSource::File(PathBuf::from(value.strip_prefix("file://").unwrap_or(value)))
            }
            DeliveryMode::Data => ImageSource::Data(value.to_string()),
        })
    }
}
