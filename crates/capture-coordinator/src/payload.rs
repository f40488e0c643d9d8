//! Capture payload envelope

use canvas_renderer::ImagePayload;
use serde::{Deserialize, Serialize};

/// Images produced for one captured frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureImages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullsize: Option<ImagePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<ImagePayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<CaptureImages>,
}

/// Payload pushed by the capture engine for every frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapturePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<CaptureOutput>,
}

impl CapturePayload {
    pub fn new(fullsize: ImagePayload, thumbnail: Option<ImagePayload>) -> Self {
        Self {
            output: Some(CaptureOutput {
                images: Some(CaptureImages {
                    fullsize: Some(fullsize),
                    thumbnail,
                }),
            }),
        }
    }

    /// Parse an engine payload from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn images(&self) -> Option<&CaptureImages> {
        self.output.as_ref()?.images.as_ref()
    }

    pub fn fullsize(&self) -> Option<&ImagePayload> {
        self.images()?.fullsize.as_ref()
    }

    pub fn thumbnail(&self) -> Option<&ImagePayload> {
        self.images()?.thumbnail.as_ref()
    }
}
