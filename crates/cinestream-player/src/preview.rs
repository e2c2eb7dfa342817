//! Scrub preview on a dedicated, muted decode pipeline.
//!
//! The engine only ever talks to the preview pipeline. It reads the duration
//! that pipeline reports for itself, so it never depends on primary playback.

use serde::Serialize;

use crate::pipeline::{PipelineEvent, PipelineOp, RequestCounter, RequestId};

/// UI-visible preview state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreviewState {
    /// A frame has been decoded at least once.
    pub is_ready: bool,
    /// A seek for the latest pointer position is outstanding.
    pub is_loading: bool,
    /// Timestamp under the pointer.
    pub preview_time_secs: f64,
    /// Pointer position along the seek bar, within `[0, 1]`.
    pub preview_position_ratio: f64,
    /// Timestamp of the frame currently held for display.
    pub frame_time_secs: Option<f64>,
    pub is_hovering: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attachment {
    Pending,
    Attached,
    /// Attach failed. Preview silently never becomes ready.
    Unavailable,
}

/// Drives the preview pipeline from seek-bar pointer movement.
#[derive(Debug)]
pub struct ScrubPreviewEngine {
    state: PreviewState,
    attachment: Attachment,
    duration_secs: f64,
    requests: RequestCounter,
    in_flight: Option<RequestId>,
    /// Latest pointer ratio received before the pipeline attached.
    deferred: Option<f64>,
}

impl Default for ScrubPreviewEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrubPreviewEngine {
    pub fn new() -> Self {
        Self {
            state: PreviewState::default(),
            attachment: Attachment::Pending,
            duration_secs: 0.0,
            requests: RequestCounter::default(),
            in_flight: None,
            deferred: None,
        }
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    /// Whether the preview pipeline failed to attach.
    pub fn is_unavailable(&self) -> bool {
        self.attachment == Attachment::Unavailable
    }

    /// Retarget the preview to the pointer position.
    ///
    /// A newer position supersedes any seek still in flight.
    pub fn update_preview(&mut self, pointer_ratio: f64) -> Vec<PipelineOp> {
        let ratio = if pointer_ratio.is_nan() {
            0.0
        } else {
            pointer_ratio.clamp(0.0, 1.0)
        };
        self.state.preview_position_ratio = ratio;
        self.state.preview_time_secs = ratio * self.duration_secs;
        self.state.is_hovering = true;
        self.state.is_loading = true;

        match self.attachment {
            Attachment::Attached => self.issue_seek(),
            Attachment::Pending => {
                self.deferred = Some(ratio);
                Vec::new()
            }
            Attachment::Unavailable => Vec::new(),
        }
    }

    /// Pointer left the seek bar. The pipeline stays attached and warm.
    pub fn end_hover(&mut self) {
        self.state.is_hovering = false;
    }

    /// Apply an event from the preview pipeline.
    pub fn on_pipeline_event(&mut self, event: PipelineEvent) -> Vec<PipelineOp> {
        match event {
            PipelineEvent::Attached { duration_secs } => {
                self.attachment = Attachment::Attached;
                if let Some(duration) = duration_secs {
                    self.set_duration(duration);
                }
                if let Some(ratio) = self.deferred.take() {
                    self.state.preview_time_secs = ratio * self.duration_secs;
                    return self.issue_seek();
                }
            }
            PipelineEvent::AttachFailed { reason } => self.mark_unavailable(&reason),
            PipelineEvent::DurationChanged { duration_secs } => self.set_duration(duration_secs),
            PipelineEvent::SeekCompleted {
                request,
                position_secs,
            } => {
                if self.in_flight == Some(request) {
                    self.in_flight = None;
                    self.state.is_loading = false;
                    self.state.is_ready = true;
                    self.state.frame_time_secs = Some(position_secs);
                } else {
                    tracing::trace!(%request, "Dropping superseded preview frame");
                }
            }
            PipelineEvent::RequestFailed { request, reason } => {
                if self.in_flight == Some(request) {
                    self.in_flight = None;
                    self.state.is_loading = false;
                    tracing::debug!(%request, reason = %reason, "Preview seek failed");
                }
            }
            // The preview pipeline never plays; anything else is noise.
            _ => {}
        }
        Vec::new()
    }

    /// Record that the pipeline could not attach.
    pub fn mark_unavailable(&mut self, reason: &str) {
        tracing::debug!(reason = %reason, "Preview pipeline unavailable");
        self.attachment = Attachment::Unavailable;
        self.deferred = None;
        self.in_flight = None;
    }

    /// Release the preview pipeline with the player.
    pub fn shutdown(&mut self) -> Vec<PipelineOp> {
        self.in_flight = None;
        self.deferred = None;
        match self.attachment {
            Attachment::Unavailable => Vec::new(),
            _ => vec![PipelineOp::Detach],
        }
    }

    fn issue_seek(&mut self) -> Vec<PipelineOp> {
        let request = self.requests.next();
        self.in_flight = Some(request);
        vec![PipelineOp::Seek {
            request,
            position_secs: self.state.preview_time_secs,
        }]
    }

    fn set_duration(&mut self, duration_secs: f64) {
        if duration_secs.is_finite() && duration_secs > 0.0 {
            self.duration_secs = duration_secs;
            self.state.preview_time_secs = self.state.preview_position_ratio * duration_secs;
        }
    }
}
