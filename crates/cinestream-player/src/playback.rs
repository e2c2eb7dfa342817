//! Playback state machine of the primary pipeline.
//!
//! Every transition returns the [`Effect`]s to perform instead of performing
//! them. Requests that depend on the pipeline or the host (play, pause, seek,
//! quality, fullscreen, picture-in-picture) only change [`PlaybackState`] once
//! the matching confirmation arrives; confirmations for superseded requests
//! are dropped.

use cinestream_common::{Error, Result};
use serde::Serialize;

use crate::manifest::{ManifestModel, QualitySelection};
use crate::pipeline::{
    HostEvent, HostRequest, PipelineEvent, PipelineOp, RequestCounter, RequestId,
};
use crate::player::PlayerEvent;
use crate::settings::PlayerSettings;

/// Volume steps are rounded to this many parts of the full range.
const VOLUME_PRECISION: f64 = 1000.0;

/// UI-visible playback state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackState {
    pub is_playing: bool,
    /// Always within `[0, duration_secs]`.
    pub current_time_secs: f64,
    pub duration_secs: f64,
    /// Within `[0, 1]`.
    pub volume: f64,
    pub is_muted: bool,
    pub is_fullscreen: bool,
    pub is_pip_active: bool,
    /// Quality mode confirmed by the pipeline.
    pub active_quality: QualitySelection,
    /// Variant the pipeline is currently decoding, as it last reported.
    pub current_level: Option<usize>,
    pub controls_visible: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_time_secs: 0.0,
            duration_secs: 0.0,
            volume: 1.0,
            is_muted: false,
            is_fullscreen: false,
            is_pip_active: false,
            active_quality: QualitySelection::Auto,
            current_level: None,
            controls_visible: true,
        }
    }
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Forward to the primary pipeline.
    Pipeline(PipelineOp),
    /// Forward to the host platform.
    Host(HostRequest),
    /// Publish to observers.
    Emit(PlayerEvent),
}

#[derive(Debug, Clone, Copy)]
struct Pending<T> {
    request: RequestId,
    target: T,
}

/// State machine for the primary pipeline.
#[derive(Debug)]
pub struct PlaybackStateMachine {
    state: PlaybackState,
    settings: PlayerSettings,
    manifest: ManifestModel,
    requests: RequestCounter,
    transport: Option<Pending<bool>>,
    transport_applied: RequestId,
    seek: Option<Pending<f64>>,
    quality: Option<Pending<QualitySelection>>,
    fullscreen: Option<Pending<bool>>,
    pip: Option<Pending<bool>>,
    failed_play: bool,
}

impl PlaybackStateMachine {
    pub fn new(manifest: &ManifestModel, settings: PlayerSettings) -> Self {
        Self {
            state: PlaybackState::default(),
            settings,
            manifest: manifest.clone(),
            requests: RequestCounter::default(),
            transport: None,
            transport_applied: RequestId(0),
            seek: None,
            quality: None,
            fullscreen: None,
            pip: None,
            failed_play: false,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Whether playback is playing or about to be.
    fn intends_playing(&self) -> bool {
        self.transport
            .map(|p| p.target)
            .unwrap_or(self.state.is_playing)
    }

    pub fn toggle_play(&mut self) -> Vec<Effect> {
        if self.intends_playing() {
            self.request_transport(false)
        } else {
            self.request_transport(true)
        }
    }

    /// Request playback. A no-op when already playing or about to.
    pub fn play(&mut self) -> Vec<Effect> {
        if self.intends_playing() {
            return Vec::new();
        }
        self.request_transport(true)
    }

    /// Request a pause. A no-op when already paused or about to.
    pub fn pause(&mut self) -> Vec<Effect> {
        if !self.intends_playing() {
            return Vec::new();
        }
        self.request_transport(false)
    }

    /// Re-issue a play request that the pipeline rejected.
    pub fn retry(&mut self) -> Vec<Effect> {
        if !self.failed_play {
            return Vec::new();
        }
        self.failed_play = false;
        self.play()
    }

    fn request_transport(&mut self, play: bool) -> Vec<Effect> {
        let request = self.requests.next();
        self.transport = Some(Pending {
            request,
            target: play,
        });
        let op = if play {
            PipelineOp::Play { request }
        } else {
            PipelineOp::Pause { request }
        };
        vec![Effect::Pipeline(op)]
    }

    pub fn seek_to(&mut self, position_secs: f64) -> Vec<Effect> {
        let position_secs = self.clamp_time(position_secs);
        let request = self.requests.next();
        self.seek = Some(Pending {
            request,
            target: position_secs,
        });
        vec![Effect::Pipeline(PipelineOp::Seek {
            request,
            position_secs,
        })]
    }

    pub fn seek_by(&mut self, delta_secs: f64) -> Vec<Effect> {
        self.seek_to(self.state.current_time_secs + delta_secs)
    }

    /// Set the volume. Zero mutes; a positive value never unmutes.
    pub fn set_volume(&mut self, volume: f64) -> Vec<Effect> {
        let volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
        self.state.volume = volume;
        if volume == 0.0 {
            self.state.is_muted = true;
        }
        vec![self.volume_effect()]
    }

    /// Step the volume. The sum is rounded so repeated steps land exactly on
    /// 0 and 1.
    pub fn adjust_volume(&mut self, delta: f64) -> Vec<Effect> {
        let volume = ((self.state.volume + delta) * VOLUME_PRECISION).round() / VOLUME_PRECISION;
        self.set_volume(volume)
    }

    pub fn toggle_mute(&mut self) -> Vec<Effect> {
        self.state.is_muted = !self.state.is_muted;
        if !self.state.is_muted && self.state.volume == 0.0 {
            self.state.volume = self.settings.unmute_volume.clamp(0.0, 1.0);
        }
        vec![self.volume_effect()]
    }

    fn volume_effect(&self) -> Effect {
        Effect::Pipeline(PipelineOp::SetVolume {
            volume: self.state.volume,
            muted: self.state.is_muted,
        })
    }

    /// Pin a variant or hand control back to the adaptive algorithm.
    pub fn set_quality(&mut self, selection: QualitySelection) -> Result<Vec<Effect>> {
        if !self.manifest.contains(selection) {
            return Err(Error::invalid_input(format!(
                "quality {} out of range ({} variants)",
                selection,
                self.manifest.variant_count()
            )));
        }

        let request = self.requests.next();
        let mut effects = Vec::new();

        match selection {
            QualitySelection::Level(level) => {
                effects.push(Effect::Pipeline(PipelineOp::PinLevel { request, level }));
                if let Some(previous) = self.state.current_level.filter(|&l| l != level) {
                    effects.push(Effect::Pipeline(PipelineOp::CancelFetches { level: previous }));
                }
            }
            QualitySelection::Auto => {
                effects.push(Effect::Pipeline(PipelineOp::ReleasePin { request }));
            }
        }

        self.quality = Some(Pending {
            request,
            target: selection,
        });
        Ok(effects)
    }

    pub fn toggle_fullscreen(&mut self) -> Vec<Effect> {
        let enter = !self
            .fullscreen
            .map(|p| p.target)
            .unwrap_or(self.state.is_fullscreen);
        let request = self.requests.next();
        self.fullscreen = Some(Pending {
            request,
            target: enter,
        });
        vec![Effect::Host(HostRequest::Fullscreen { request, enter })]
    }

    pub fn toggle_pip(&mut self) -> Vec<Effect> {
        let enter = !self.pip.map(|p| p.target).unwrap_or(self.state.is_pip_active);
        let request = self.requests.next();
        self.pip = Some(Pending {
            request,
            target: enter,
        });
        vec![Effect::Host(HostRequest::PictureInPicture { request, enter })]
    }

    pub fn set_controls_visible(&mut self, visible: bool) {
        self.state.controls_visible = visible;
    }

    /// Apply an event from the primary pipeline.
    pub fn on_pipeline_event(&mut self, event: PipelineEvent) -> Vec<Effect> {
        match event {
            PipelineEvent::Attached { duration_secs } => {
                if let Some(duration) = duration_secs {
                    self.set_duration(duration);
                }
            }
            PipelineEvent::AttachFailed { reason } => {
                let error = Error::playback(format!("could not load media: {}", reason));
                return vec![failure(error, false)];
            }
            PipelineEvent::PlayConfirmed { request } => self.confirm_transport(request, true),
            PipelineEvent::PauseConfirmed { request } => self.confirm_transport(request, false),
            PipelineEvent::SeekCompleted {
                request,
                position_secs,
            } => match self.seek {
                Some(pending) if pending.request == request => {
                    self.seek = None;
                    self.state.current_time_secs = self.clamp_time(position_secs);
                }
                _ => tracing::debug!(%request, "Dropping superseded seek confirmation"),
            },
            PipelineEvent::LevelPinned { request, level } => {
                if self.take_quality(request) {
                    self.state.active_quality = QualitySelection::Level(level);
                    self.state.current_level = Some(level);
                }
            }
            PipelineEvent::AutoResumed { request } => {
                if self.take_quality(request) {
                    self.state.active_quality = QualitySelection::Auto;
                }
            }
            PipelineEvent::RequestFailed { request, reason } => {
                return self.on_request_failed(request, reason);
            }
            PipelineEvent::LevelSwitched { level } => self.state.current_level = Some(level),
            PipelineEvent::TimeUpdate { position_secs } => {
                if self.seek.is_none() {
                    self.state.current_time_secs = self.clamp_time(position_secs);
                }
            }
            PipelineEvent::DurationChanged { duration_secs } => self.set_duration(duration_secs),
            PipelineEvent::Ended => {
                self.state.is_playing = false;
                self.transport = None;
                self.state.current_time_secs = self.state.duration_secs;
                return vec![Effect::Emit(PlayerEvent::Completed {
                    duration_secs: self.state.duration_secs,
                })];
            }
        }
        Vec::new()
    }

    /// Apply a confirmation or spontaneous change from the host platform.
    pub fn on_host_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::FullscreenChanged { request, active } => {
                if accept_host(&mut self.fullscreen, request) {
                    self.state.is_fullscreen = active;
                }
            }
            HostEvent::PipChanged { request, active } => {
                if accept_host(&mut self.pip, request) {
                    self.state.is_pip_active = active;
                }
            }
            HostEvent::Refused { request } => {
                if self.fullscreen.is_some_and(|p| p.request == request) {
                    self.fullscreen = None;
                } else if self.pip.is_some_and(|p| p.request == request) {
                    self.pip = None;
                }
                tracing::debug!(%request, "Host refused request");
            }
        }
    }

    fn confirm_transport(&mut self, request: RequestId, playing: bool) {
        if request <= self.transport_applied {
            tracing::debug!(%request, "Dropping stale transport confirmation");
            return;
        }
        self.transport_applied = request;
        self.state.is_playing = playing;
        if self.transport.is_some_and(|p| p.request == request) {
            self.transport = None;
        }
        if playing {
            self.failed_play = false;
        }
    }

    fn take_quality(&mut self, request: RequestId) -> bool {
        match self.quality {
            Some(pending) if pending.request == request => {
                self.quality = None;
                true
            }
            _ => {
                tracing::debug!(%request, "Dropping superseded quality confirmation");
                false
            }
        }
    }

    fn on_request_failed(&mut self, request: RequestId, reason: String) -> Vec<Effect> {
        let mut retryable = false;
        if let Some(pending) = self.transport.filter(|p| p.request == request) {
            self.transport = None;
            self.failed_play = pending.target;
            retryable = pending.target;
        } else if self.seek.is_some_and(|p| p.request == request) {
            self.seek = None;
        } else if self.quality.is_some_and(|p| p.request == request) {
            self.quality = None;
        } else {
            tracing::debug!(%request, "Ignoring failure of superseded request");
            return Vec::new();
        }
        tracing::warn!(%request, reason = %reason, "Playback request failed");
        vec![failure(Error::playback(reason), retryable)]
    }

    fn set_duration(&mut self, duration_secs: f64) {
        self.state.duration_secs = if duration_secs.is_finite() {
            duration_secs.max(0.0)
        } else {
            0.0
        };
        self.state.current_time_secs = self.clamp_time(self.state.current_time_secs);
    }

    fn clamp_time(&self, t: f64) -> f64 {
        if t.is_nan() {
            return 0.0;
        }
        t.clamp(0.0, self.state.duration_secs)
    }
}

fn failure(error: Error, retryable: bool) -> Effect {
    Effect::Emit(PlayerEvent::PlaybackFailed {
        message: error.to_string(),
        retryable,
    })
}

/// Whether a host change applies, clearing the pending request it confirms.
fn accept_host(pending: &mut Option<Pending<bool>>, request: Option<RequestId>) -> bool {
    match (request, *pending) {
        (None, _) => {
            *pending = None;
            true
        }
        (Some(r), Some(p)) if p.request == r => {
            *pending = None;
            true
        }
        (Some(r), _) => {
            tracing::debug!(request = %r, "Dropping superseded host confirmation");
            false
        }
    }
}
