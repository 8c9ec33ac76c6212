//! Brush dynamics engine for pressure-sensitive raster painting.
//!
//! Pointer samples (position, pressure, time delta) go in; circular dabs
//! come out on a [`Surface`]. The engine interpolates motion into
//! sub-events, maps the derived inputs (pressure, speed, randomness, ...)
//! through per-setting curves, advances a small filtered state vector and
//! tells the host when a stroke should be committed as an undo step.
//!
//! The main types:
//! - [`Brush`] - the engine: feed it events via [`Brush::stroke_to`]
//! - [`BrushConfig`] / [`Setting`] / [`Input`] - the configuration surface
//! - [`BrushState`] - the transient state vector, serializable
//! - [`Surface`] - the raster backend contract, with [`CpuSurface`] as a
//!   reference implementation

pub mod brush;
pub mod color;
pub mod config;
pub mod constants;
pub mod mapping;
pub mod rng;
pub mod settings;
pub mod state;
pub mod surface;
pub mod types;

pub use brush::{Brush, BrushError, SplitCallback};
pub use config::{BrushConfig, SpeedCoefficients};
pub use constants::*;
pub use mapping::{ControlPoint, Mapping};
pub use rng::RandomSource;
pub use settings::{Input, Setting, INPUT_COUNT, SETTING_COUNT};
pub use state::BrushState;
pub use surface::{CpuSurface, Surface};
pub use types::Rect;
