//! Contract between the engine and decode pipelines / the host platform.
//!
//! Operations are fire-and-forget: a pipeline acknowledges them later with a
//! [`PipelineEvent`] carrying the same [`RequestId`]. The engine only updates
//! state from those acknowledgements, never from the request itself.

use std::fmt;
use std::sync::Arc;

use cinestream_common::{AssetDescriptor, Result};
use tokio::sync::mpsc;

/// Monotonic id of a state-changing request.
///
/// Ids are allocated from one counter per state machine, so comparing two ids
/// tells which request was issued later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Allocator for [`RequestId`]s.
#[derive(Debug, Default)]
pub(crate) struct RequestCounter(u64);

impl RequestCounter {
    pub(crate) fn next(&mut self) -> RequestId {
        self.0 += 1;
        RequestId(self.0)
    }
}

/// Which of the two pipelines an operation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineRole {
    /// Drives audible, visible playback.
    Primary,
    /// Muted, paused instance producing scrub thumbnails.
    Preview,
}

impl fmt::Display for PipelineRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Preview => write!(f, "preview"),
        }
    }
}

/// How a pipeline should bind to its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachOptions {
    pub role: PipelineRole,
    /// Output audio is silenced.
    pub muted: bool,
    /// Start playing as soon as data is available.
    pub autoplay: bool,
    /// Do not fetch segments until the first seek targets a position.
    pub defer_loading: bool,
}

impl AttachOptions {
    /// Options for the primary pipeline.
    pub fn primary() -> Self {
        Self {
            role: PipelineRole::Primary,
            muted: false,
            autoplay: false,
            defer_loading: false,
        }
    }

    /// Options for the preview pipeline.
    pub fn preview() -> Self {
        Self {
            role: PipelineRole::Preview,
            muted: true,
            autoplay: false,
            defer_loading: true,
        }
    }
}

/// Command sent to a decode pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOp {
    Play { request: RequestId },
    Pause { request: RequestId },
    /// Seek to an absolute position. A newer seek supersedes any in flight.
    Seek { request: RequestId, position_secs: f64 },
    /// Pin the adaptive algorithm to one variant.
    PinLevel { request: RequestId, level: usize },
    /// Hand level selection back to the adaptive algorithm.
    ReleasePin { request: RequestId },
    /// Drop in-flight segment fetches for a variant no longer needed.
    CancelFetches { level: usize },
    SetVolume { volume: f64, muted: bool },
    /// Cancel everything in flight and release the source.
    Detach,
}

/// Notification emitted by a decode pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// The source is bound and its duration (if known) parsed.
    Attached { duration_secs: Option<f64> },
    /// The pipeline could not bind to its source.
    AttachFailed { reason: String },
    PlayConfirmed { request: RequestId },
    PauseConfirmed { request: RequestId },
    SeekCompleted { request: RequestId, position_secs: f64 },
    LevelPinned { request: RequestId, level: usize },
    AutoResumed { request: RequestId },
    /// A request was rejected (decode error, unsupported level, ...).
    RequestFailed { request: RequestId, reason: String },
    /// The adaptive algorithm switched to another variant.
    LevelSwitched { level: usize },
    TimeUpdate { position_secs: f64 },
    DurationChanged { duration_secs: f64 },
    Ended,
}

/// A decode pipeline bound to one asset.
///
/// Implementations must not block: `execute` queues the operation and the
/// outcome arrives later on the event channel handed to `attach`.
pub trait DecodePipeline: Send {
    /// Bind to the asset. Events for this pipeline go to `events` only.
    fn attach(
        &mut self,
        asset: Arc<AssetDescriptor>,
        options: AttachOptions,
        events: mpsc::UnboundedSender<PipelineEvent>,
    ) -> Result<()>;

    /// Queue an operation.
    fn execute(&mut self, op: PipelineOp);
}

/// Platform capability request (fullscreen, picture-in-picture).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostRequest {
    Fullscreen { request: RequestId, enter: bool },
    PictureInPicture { request: RequestId, enter: bool },
}

/// Platform confirmation or spontaneous change.
///
/// `request` is `None` when the platform changed state on its own, for
/// example when the user leaves fullscreen with the Escape key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    FullscreenChanged { request: Option<RequestId>, active: bool },
    PipChanged { request: Option<RequestId>, active: bool },
    /// The platform silently declined the request.
    Refused { request: RequestId },
}

/// The windowing host able to enter fullscreen or picture-in-picture.
pub trait HostPlatform: Send {
    fn request(&mut self, request: HostRequest);
}
