//! Lifecycle event types

use frame_geometry::{FramePlacement, SurfaceSize, UiOrientation};
use serde::{Deserialize, Serialize};

/// Hook points published around rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleEvent {
    BeforeFrameRendering,
    AfterFrameRendering,
    BeforeFrameInitialization,
    AfterFrameInitialization,
    /// Options and sizing are about to be recomputed (session start)
    BeforeRenderingPresets,
    AfterRenderingPresets,
}

impl LifecycleEvent {
    pub const ALL: [LifecycleEvent; 6] = [
        LifecycleEvent::BeforeFrameRendering,
        LifecycleEvent::AfterFrameRendering,
        LifecycleEvent::BeforeFrameInitialization,
        LifecycleEvent::AfterFrameInitialization,
        LifecycleEvent::BeforeRenderingPresets,
        LifecycleEvent::AfterRenderingPresets,
    ];

    /// Stable event name, used in logs
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::BeforeFrameRendering => "beforeFrameRendering",
            LifecycleEvent::AfterFrameRendering => "afterFrameRendering",
            LifecycleEvent::BeforeFrameInitialization => "beforeFrameInitialization",
            LifecycleEvent::AfterFrameInitialization => "afterFrameInitialization",
            LifecycleEvent::BeforeRenderingPresets => "beforeRenderingPresets",
            LifecycleEvent::AfterRenderingPresets => "afterRenderingPresets",
        }
    }
}

/// Which preview surface a renderer draws into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceRole {
    Fullsize,
    Thumbnail,
}

impl SurfaceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceRole::Fullsize => "fullsize",
            SurfaceRole::Thumbnail => "thumbnail",
        }
    }
}

/// Object that triggered an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    Coordinator,
    Renderer(SurfaceRole),
    /// A frame being initialized for the given surface
    Frame(SurfaceRole),
}

/// Sizes in effect after rendering presets were applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetsSnapshot {
    pub fullsize: Option<SurfaceSize>,
    pub thumbnail: Option<SurfaceSize>,
    pub orientation: UiOrientation,
}

/// Event payload
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EventData {
    #[default]
    Empty,
    Frame(FramePlacement),
    Presets(PresetsSnapshot),
}

impl EventData {
    pub fn frame(&self) -> Option<&FramePlacement> {
        match self {
            EventData::Frame(frame) => Some(frame),
            _ => None,
        }
    }
}

/// A published notification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub kind: LifecycleEvent,
    pub source: EventSource,
    pub data: EventData,
}
