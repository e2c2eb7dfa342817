//! Cinestream-Player: client-side adaptive playback engine.
//!
//! The engine is a set of plain state machines that consume pipeline and UI
//! events and return the side effects to perform. [`Player`] wires them to two
//! independent decode pipelines and drives them on a tokio task.
//!
//! # Modules
//!
//! - `manifest` - quality ladder built from a parsed master playlist
//! - `pipeline` - contract between the engine and a decode pipeline
//! - `playback` - confirmed-only playback state machine
//! - `preview` - scrub preview on a second, isolated pipeline
//! - `controls` - inactivity timer hiding on-screen controls
//! - `input` - keyboard mapping onto player actions
//! - `player` - async driver and the handle handed to the UI
//!
//! # Isolation
//!
//! The primary and preview pipelines only share an `Arc<AssetDescriptor>`.
//! Each one reports on its own channel, and preview events never reach the
//! playback state machine.

pub mod controls;
pub mod input;
pub mod manifest;
pub mod pipeline;
pub mod playback;
pub mod player;
pub mod preview;
pub mod settings;

pub use controls::ControlsVisibilityTimer;
pub use input::{FocusTarget, InputDispatcher, Key, KeyPress, PlayerAction};
pub use manifest::{ManifestModel, QualityLevel, QualitySelection};
pub use pipeline::{
    AttachOptions, DecodePipeline, HostEvent, HostPlatform, HostRequest, PipelineEvent,
    PipelineOp, PipelineRole, RequestId,
};
pub use playback::{Effect, PlaybackState, PlaybackStateMachine};
pub use player::{Player, PlayerEvent, PlayerHandle, UiCommand};
pub use preview::{PreviewState, ScrubPreviewEngine};
pub use settings::PlayerSettings;
