//! Async driver wiring the state machines to two decode pipelines.
//!
//! [`Player`] owns the primary and preview pipelines plus the host platform
//! and runs on its own tokio task. The UI talks to it through a
//! [`PlayerHandle`]: commands go in over an mpsc channel, state comes out over
//! `watch` channels and one-off events over a `broadcast` channel.

use std::future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use cinestream_common::{AssetDescriptor, Error, Result};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::controls::ControlsVisibilityTimer;
use crate::input::{InputDispatcher, KeyPress, PlayerAction};
use crate::manifest::ManifestModel;
use crate::pipeline::{
    AttachOptions, DecodePipeline, HostEvent, HostPlatform, PipelineEvent, PipelineOp,
};
use crate::playback::{Effect, PlaybackState, PlaybackStateMachine};
use crate::preview::{PreviewState, ScrubPreviewEngine};
use crate::settings::PlayerSettings;

const EVENT_CAPACITY: usize = 64;

/// Events published to observers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerEvent {
    /// Periodic position report while playing.
    Progress {
        current_time_secs: f64,
        duration_secs: f64,
        reported_at: DateTime<Utc>,
    },
    /// Playback reached the end of the asset.
    Completed { duration_secs: f64 },
    /// A pipeline request failed. State was left unchanged. `retryable` is set
    /// when [`PlayerAction::Retry`] would re-issue the failed request.
    PlaybackFailed { message: String, retryable: bool },
}

/// Input from the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    Key(KeyPress),
    /// Mouse or touch movement over the player surface.
    PointerMoved,
    Action(PlayerAction),
    /// A settings or quality menu opened or closed.
    SetMenuOpen(bool),
    /// Pointer over the seek bar at the given ratio.
    ScrubHover(f64),
    ScrubLeave,
    /// Confirmation or spontaneous change reported by the host platform.
    Host(HostEvent),
}

/// Cloneable handle to a running [`Player`].
#[derive(Clone)]
pub struct PlayerHandle {
    commands: mpsc::UnboundedSender<UiCommand>,
    state: watch::Receiver<PlaybackState>,
    preview: watch::Receiver<PreviewState>,
    events: broadcast::Sender<PlayerEvent>,
    cancel: CancellationToken,
}

impl PlayerHandle {
    /// Queue a command. Fails once the player has stopped.
    pub fn send(&self, command: UiCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| Error::internal("player has stopped"))
    }

    pub fn key_press(&self, press: KeyPress) -> Result<()> {
        self.send(UiCommand::Key(press))
    }

    pub fn action(&self, action: PlayerAction) -> Result<()> {
        self.send(UiCommand::Action(action))
    }

    /// Snapshot of the playback state.
    pub fn state(&self) -> PlaybackState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every playback state change.
    pub fn watch_state(&self) -> watch::Receiver<PlaybackState> {
        self.state.clone()
    }

    /// Snapshot of the scrub preview state.
    pub fn preview_state(&self) -> PreviewState {
        self.preview.borrow().clone()
    }

    pub fn watch_preview(&self) -> watch::Receiver<PreviewState> {
        self.preview.clone()
    }

    /// Subscribe to progress, completion and failure events.
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    /// Stop the player. Both pipelines are detached on the way out.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

/// Player engine bound to one asset.
pub struct Player {
    asset: Arc<AssetDescriptor>,
    settings: PlayerSettings,
    playback: PlaybackStateMachine,
    preview: ScrubPreviewEngine,
    controls: ControlsVisibilityTimer,
    input: InputDispatcher,
    menu_open: bool,

    primary: Box<dyn DecodePipeline>,
    preview_pipeline: Box<dyn DecodePipeline>,
    host: Box<dyn HostPlatform>,

    commands: mpsc::UnboundedReceiver<UiCommand>,
    primary_events: mpsc::UnboundedReceiver<PipelineEvent>,
    preview_events: mpsc::UnboundedReceiver<PipelineEvent>,
    state_tx: watch::Sender<PlaybackState>,
    preview_tx: watch::Sender<PreviewState>,
    events_tx: broadcast::Sender<PlayerEvent>,
    cancel: CancellationToken,
}

impl Player {
    /// Attach both pipelines to `asset` and build the player.
    ///
    /// The pipelines get separate event channels and share nothing but the
    /// asset descriptor. An attach error is fed back as `AttachFailed` on the
    /// pipeline's own channel, so a failing preview never affects playback.
    pub fn new(
        asset: Arc<AssetDescriptor>,
        manifest: &ManifestModel,
        settings: PlayerSettings,
        mut primary: Box<dyn DecodePipeline>,
        mut preview_pipeline: Box<dyn DecodePipeline>,
        host: Box<dyn HostPlatform>,
    ) -> (Self, PlayerHandle) {
        let (primary_tx, primary_events) = mpsc::unbounded_channel();
        attach(&mut *primary, &asset, AttachOptions::primary(), primary_tx);

        let (preview_pipe_tx, preview_events) = mpsc::unbounded_channel();
        attach(
            &mut *preview_pipeline,
            &asset,
            AttachOptions::preview(),
            preview_pipe_tx,
        );

        let playback = PlaybackStateMachine::new(manifest, settings.clone());
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(playback.state().clone());
        let (preview_tx, preview_rx) = watch::channel(PreviewState::default());
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let cancel = CancellationToken::new();

        let handle = PlayerHandle {
            commands: commands_tx,
            state: state_rx,
            preview: preview_rx,
            events: events_tx.clone(),
            cancel: cancel.clone(),
        };

        let player = Self {
            asset,
            controls: ControlsVisibilityTimer::new(settings.controls_hide_after()),
            input: InputDispatcher::new(&settings),
            settings,
            playback,
            preview: ScrubPreviewEngine::new(),
            menu_open: false,
            primary,
            preview_pipeline,
            host,
            commands,
            primary_events,
            preview_events,
            state_tx,
            preview_tx,
            events_tx,
            cancel,
        };

        (player, handle)
    }

    /// Run the player on a new task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Event loop. Returns when shut down or when every handle is dropped.
    pub async fn run(mut self) {
        tracing::info!(asset = %self.asset.id, "Player started");

        let mut progress = tokio::time::interval(self.settings.progress_interval());
        progress.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        progress.tick().await;

        loop {
            let deadline = self.controls.deadline();

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(event) = self.primary_events.recv() => {
                    let effects = self.playback.on_pipeline_event(event);
                    self.apply(effects);
                }
                Some(event) = self.preview_events.recv() => {
                    let ops = self.preview.on_pipeline_event(event);
                    self.execute_preview(ops);
                }
                _ = sleep_until(deadline) => self.controls.poll(Instant::now()),
                _ = progress.tick() => self.report_progress(),
            }

            self.publish();
        }

        self.teardown();
    }

    fn handle_command(&mut self, command: UiCommand) {
        match command {
            UiCommand::Key(press) => {
                self.controls.on_activity(Instant::now());
                if let Some(action) = self.input.dispatch(press) {
                    self.perform(action);
                }
            }
            UiCommand::PointerMoved => self.controls.on_activity(Instant::now()),
            UiCommand::Action(action) => self.perform(action),
            UiCommand::SetMenuOpen(open) => self.menu_open = open,
            UiCommand::ScrubHover(ratio) => {
                self.controls.on_activity(Instant::now());
                let ops = self.preview.update_preview(ratio);
                self.execute_preview(ops);
            }
            UiCommand::ScrubLeave => self.preview.end_hover(),
            UiCommand::Host(event) => self.playback.on_host_event(event),
        }
    }

    fn perform(&mut self, action: PlayerAction) {
        tracing::debug!(?action, "Player action");
        let effects = match action {
            PlayerAction::TogglePlay => self.playback.toggle_play(),
            PlayerAction::Play => self.playback.play(),
            PlayerAction::Pause => self.playback.pause(),
            PlayerAction::SeekTo(position) => self.playback.seek_to(position),
            PlayerAction::SeekBy(delta) => self.playback.seek_by(delta),
            PlayerAction::SetVolume(volume) => self.playback.set_volume(volume),
            PlayerAction::AdjustVolume(delta) => self.playback.adjust_volume(delta),
            PlayerAction::ToggleMute => self.playback.toggle_mute(),
            PlayerAction::ToggleFullscreen => self.playback.toggle_fullscreen(),
            PlayerAction::TogglePip => self.playback.toggle_pip(),
            PlayerAction::SetQuality(selection) => match self.playback.set_quality(selection) {
                Ok(effects) => effects,
                Err(e) => {
                    tracing::warn!(%selection, error = %e, "Rejected quality selection");
                    Vec::new()
                }
            },
            PlayerAction::Retry => self.playback.retry(),
        };
        self.apply(effects);
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Pipeline(op) => self.primary.execute(op),
                Effect::Host(request) => self.host.request(request),
                Effect::Emit(event) => self.emit(event),
            }
        }
    }

    fn execute_preview(&mut self, ops: Vec<PipelineOp>) {
        for op in ops {
            self.preview_pipeline.execute(op);
        }
    }

    fn emit(&self, event: PlayerEvent) {
        // No subscribers is not an error.
        let _ = self.events_tx.send(event);
    }

    fn report_progress(&self) {
        let state = self.playback.state();
        if !state.is_playing {
            return;
        }
        self.emit(PlayerEvent::Progress {
            current_time_secs: state.current_time_secs,
            duration_secs: state.duration_secs,
            reported_at: Utc::now(),
        });
    }

    /// Re-gate the controls timer and push changed state to observers.
    fn publish(&mut self) {
        let (fullscreen, playing) = {
            let state = self.playback.state();
            (state.is_fullscreen, state.is_playing)
        };
        self.controls
            .set_gates(fullscreen, playing, self.menu_open, Instant::now());
        self.playback
            .set_controls_visible(self.controls.is_visible());

        let state = self.playback.state();
        self.state_tx.send_if_modified(|current| replace_if_changed(current, state));
        let preview = self.preview.state();
        self.preview_tx
            .send_if_modified(|current| replace_if_changed(current, preview));
    }

    fn teardown(&mut self) {
        self.controls.cancel();
        self.primary.execute(PipelineOp::Detach);
        let ops = self.preview.shutdown();
        self.execute_preview(ops);
        tracing::info!(asset = %self.asset.id, "Player stopped");
    }
}

fn attach(
    pipeline: &mut dyn DecodePipeline,
    asset: &Arc<AssetDescriptor>,
    options: AttachOptions,
    events: mpsc::UnboundedSender<PipelineEvent>,
) {
    if let Err(e) = pipeline.attach(Arc::clone(asset), options, events.clone()) {
        tracing::warn!(role = %options.role, error = %e, "Pipeline attach failed");
        let _ = events.send(PipelineEvent::AttachFailed {
            reason: e.to_string(),
        });
    }
}

fn replace_if_changed<T: Clone + PartialEq>(current: &mut T, next: &T) -> bool {
    if current == next {
        return false;
    }
    *current = next.clone();
    true
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => future::pending().await,
    }
}
