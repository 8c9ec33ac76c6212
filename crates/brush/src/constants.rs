/// Smallest radius a dab may be drawn with, in pixels.
pub const ACTUAL_RADIUS_MIN: f32 = 0.2;

/// Largest radius a dab may be drawn with, in pixels.
pub const ACTUAL_RADIUS_MAX: f32 = 150.0;

/// Sampling radius used when picking up canvas color for smudging.
pub const SMUDGE_SAMPLE_RADIUS: f32 = 5.0;

/// Events with a larger time delta (seconds) reset the brush state.
pub const DISCONTINUITY_TIME: f64 = 5.0;

/// Events that would emit more dabs than this reset the brush state.
/// The threshold is arbitrary; it mainly catches the cursor re-entering
/// the window after a large off-canvas move.
pub const DISCONTINUITY_DABS: f32 = 300.0;

/// Number of scalars in the brush state vector.
pub const STATE_COUNT: usize = 18;

/// Version tag leading a serialized brush state vector.
pub const STATE_VERSION_TAG: u8 = b'1';
