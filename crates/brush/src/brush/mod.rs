//! The brush: pointer events in, dabs out.
//!
//! A [`Brush`] composes an immutable-during-a-stroke [`BrushConfig`] with
//! the mutable cursor [`BrushState`], the random source and the per-stroke
//! telemetry. The host feeds it pointer samples through
//! [`Brush::stroke_to`] and gets told through the split callback when a
//! stroke should be committed as an undo step.

mod dab;
mod dynamics;
mod stroke;

use tracing::warn;

use crate::config::BrushConfig;
use crate::constants::{STATE_COUNT, STATE_VERSION_TAG};
use crate::rng::RandomSource;
use crate::settings::{Input, Setting, SETTING_COUNT};
use crate::state::BrushState;
use crate::types::Rect;

/// Host callback invoked on every stroke split. The slot holds one
/// callback; installing a new one drops the previous.
pub type SplitCallback = Box<dyn FnMut() -> Result<(), String>>;

/// Errors surfaced by brush operations.
#[derive(Debug, thiserror::Error)]
pub enum BrushError {
    /// The split callback failed during an earlier split. The event that
    /// observed this error was dropped; the condition is cleared once
    /// reported.
    #[error("split callback failed: {0}")]
    SplitCallback(String),
}

/// Per-stroke bookkeeping used to find natural stroke boundaries.
#[derive(Debug, Clone, Default)]
pub(crate) struct StrokeTelemetry {
    pub total_painting_time: f64,
    pub idling_time: f64,
    pub bbox: Rect,
}

/// A configured brush and its transient painting state.
///
/// Single-threaded by design: one instance is driven by exactly one caller,
/// and every operation is a synchronous CPU-bound call.
pub struct Brush {
    pub(crate) config: BrushConfig,
    pub(crate) state: BrushState,
    /// Current value of every setting, refreshed once per sub-event.
    pub(crate) settings_value: [f32; SETTING_COUNT],
    pub(crate) rng: RandomSource,
    pub(crate) stroke: StrokeTelemetry,
    split_callback: Option<SplitCallback>,
    /// Set when the split callback fails; drained by the next `stroke_to`.
    latched_failure: Option<String>,
}

impl Brush {
    /// A brush with default settings, zeroed state and an entropy-seeded
    /// random source.
    pub fn new() -> Self {
        let mut brush = Self {
            config: BrushConfig::new(),
            state: BrushState::default(),
            settings_value: [0.0; SETTING_COUNT],
            rng: RandomSource::new(),
            stroke: StrokeTelemetry::default(),
            split_callback: None,
            latched_failure: None,
        };
        brush.split_stroke();
        brush
    }

    /// The brush configuration.
    pub fn config(&self) -> &BrushConfig {
        &self.config
    }

    /// Write a base value; derived speed coefficients are refreshed.
    pub fn set_base_value(&mut self, setting: Setting, value: f32) {
        self.config.set_base_value(setting, value);
    }

    pub fn base_value(&self, setting: Setting) -> f32 {
        self.config.base_value(setting)
    }

    /// Resize one mapping curve.
    pub fn set_mapping_n(&mut self, setting: Setting, input: Input, n: usize) {
        self.config.set_mapping_n(setting, input, n);
    }

    /// Write one mapping control point.
    pub fn set_mapping_point(&mut self, setting: Setting, input: Input, index: usize, x: f32, y: f32) {
        self.config.set_mapping_point(setting, input, index, x, y);
    }

    /// Current mapped value of a setting, as of the last sub-event.
    pub fn setting_value(&self, setting: Setting) -> f32 {
        self.settings_value[setting as usize]
    }

    /// Reseed the brush's random source.
    pub fn seed(&mut self, seed: u64) {
        self.rng.reseed(seed);
    }

    /// One uniform draw from the brush's random source.
    pub fn random_double(&mut self) -> f64 {
        self.rng.uniform()
    }

    /// The current cursor state.
    pub fn state(&self) -> &BrushState {
        &self.state
    }

    /// Bounding box painted by the running stroke so far.
    pub fn stroke_bbox(&self) -> Rect {
        self.stroke.bbox
    }

    /// Seconds spent painting in the running stroke.
    pub fn stroke_total_painting_time(&self) -> f64 {
        self.stroke.total_painting_time
    }

    /// Seconds spent idle since painting last happened.
    pub fn stroke_idling_time(&self) -> f64 {
        self.stroke.idling_time
    }

    /// Install the split observer, replacing any previous one.
    pub fn set_split_callback(&mut self, callback: SplitCallback) {
        self.split_callback = Some(callback);
    }

    /// Remove the split observer.
    pub fn clear_split_callback(&mut self) {
        self.split_callback = None;
    }

    /// Commit the running stroke: notify the observer, then reset the
    /// stroke telemetry. A failing observer is latched and reported by the
    /// next [`stroke_to`](Brush::stroke_to).
    pub fn split_stroke(&mut self) {
        if let Some(callback) = self.split_callback.as_mut() {
            if let Err(message) = callback() {
                warn!("split callback failed: {message}");
                self.latched_failure = Some(message);
            }
        }
        self.stroke.total_painting_time = 0.0;
        self.stroke.idling_time = 0.0;
        self.stroke.bbox = Rect::default();
    }

    pub(crate) fn take_latched_failure(&mut self) -> Option<String> {
        self.latched_failure.take()
    }

    /// Serialize the state vector: a version tag followed by the state
    /// fields as little-endian f32, in their fixed order.
    pub fn get_state(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(1 + STATE_COUNT * 4);
        data.push(STATE_VERSION_TAG);
        for field in self.state.to_array() {
            data.extend_from_slice(&field.to_le_bytes());
        }
        data
    }

    /// Restore the state vector from [`get_state`](Brush::get_state) data.
    ///
    /// Short payloads zero-fill the remaining fields; an unknown version
    /// tag leaves the state untouched (with a warning).
    pub fn set_state(&mut self, data: &[u8]) {
        match data.first() {
            Some(&STATE_VERSION_TAG) => {}
            Some(tag) => {
                warn!("unknown brush state version tag {tag}, keeping current state");
                return;
            }
            None => {
                warn!("empty brush state payload, keeping current state");
                return;
            }
        }

        let mut fields = [0.0f32; STATE_COUNT];
        for (field, chunk) in fields.iter_mut().zip(data[1..].chunks_exact(4)) {
            *field = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        self.state = BrushState::from_array(fields);
    }
}

impl Default for Brush {
    fn default() -> Self {
        Self::new()
    }
}
