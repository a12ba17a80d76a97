//! Keeps the stats and label sources in sync with a draw plugin.

use std::time::{Duration, Instant};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};
use tracing::instrument;

use crate::{
    config::EditorConfig,
    draw::{DrawEvent, DrawPlugin},
    source::MapSources,
    stats::FeatureStats,
    types::Dirty,
    visibility::layer_id,
};

pub struct EventHandler {
    recv: UnboundedReceiver<DrawEvent>,
}

impl EventHandler {
    pub fn new(recv: UnboundedReceiver<DrawEvent>) -> Self {
        Self { recv }
    }

    pub fn drain(&mut self) -> Vec<DrawEvent> {
        let mut events = Vec::with_capacity(self.recv.len());

        loop {
            match self.recv.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::warn!("All senders disconnected from draw event channel");
                    break;
                }
            }
        }

        if !events.is_empty() {
            tracing::trace!("[event] Received {} draw events", events.len());
        }
        events
    }
}

#[derive(Debug)]
struct HoverThrottle {
    interval: Duration,
    last: Option<Instant>,
    pending: bool,
}

impl HoverThrottle {
    fn ready(&self, now: Instant) -> bool {
        self.pending
            && self
                .last
                .is_none_or(|last| now.duration_since(last) >= self.interval)
    }
}

pub struct Editor {
    config: EditorConfig,
    stats: Dirty<FeatureStats>,
    sources: MapSources,
    events: EventHandler,
    sender: UnboundedSender<DrawEvent>,
    hover: HoverThrottle,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_sources(config, MapSources::with_label_sources())
    }

    pub fn with_sources(config: EditorConfig, sources: MapSources) -> Self {
        let (sender, recv) = mpsc::unbounded_channel();

        Self {
            hover: HoverThrottle {
                interval: config.hover_interval(),
                last: None,
                pending: false,
            },
            config,
            stats: Dirty::default(),
            sources,
            events: EventHandler::new(recv),
            sender,
        }
    }

    /// Subscribes to the change events of `plugin`.
    pub fn attach(&self, plugin: &mut impl DrawPlugin) {
        let sender = self.sender.clone();
        plugin.on_change(Box::new(move |event| {
            if sender.send(event.clone()).is_err() {
                tracing::debug!(%event, "Editor is gone, dropping draw event");
            }
        }));
    }

    /// Handles queued draw events. Returns whether the stats were recomputed.
    #[instrument(skip_all)]
    pub fn process(&mut self, plugin: &impl DrawPlugin, now: Instant) -> bool {
        let mut recompute = false;

        for event in self.events.drain() {
            match event {
                DrawEvent::Create(_)
                | DrawEvent::Update(_)
                | DrawEvent::Delete(_)
                | DrawEvent::ModeChange(_) => recompute = true,
                DrawEvent::SketchChanged => self.hover.pending |= self.config.hover_labels,
                DrawEvent::SelectionChange(_) => (),
            }
        }

        if recompute || self.hover.ready(now) {
            self.recompute(plugin, now);
            true
        } else {
            false
        }
    }

    /// Recomputes stats from the current features and replaces both label
    /// sources.
    pub fn recompute(&mut self, plugin: &impl DrawPlugin, now: Instant) {
        let mut stats = FeatureStats::compute(&plugin.features());
        if self.config.hover_labels {
            stats = stats.with_sketch(plugin.sketch().as_ref());
        }

        for (source, labels) in [
            (layer_id::LINE_LABELS, stats.line_labels.clone()),
            (layer_id::POLYGON_LABELS, stats.polygon_labels.clone()),
        ] {
            if let Err(err) = self.sources.set_data(source, labels) {
                tracing::warn!(%err, "Dropping labels");
            }
        }

        *self.stats = stats;
        self.hover.last = Some(now);
        self.hover.pending = false;
    }

    pub fn stats(&self) -> &FeatureStats {
        &self.stats
    }

    /// Latest stats if they changed since the previous call.
    pub fn take_stats_update(&mut self) -> Option<&FeatureStats> {
        self.stats.take_dirty()
    }

    pub fn sources(&self) -> &MapSources {
        &self.sources
    }

    /// A throttled sketch change is waiting to be labelled.
    pub fn has_pending_hover(&self) -> bool {
        self.hover.pending
    }

    pub fn hover_interval(&self) -> Duration {
        self.hover.interval
    }
}
