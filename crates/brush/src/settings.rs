//! Setting and input-channel identifiers.
//!
//! Ordinals are stable public API: they index the dense mapping table and
//! appear in host interfaces and preset files. Never reorder variants.

use serde::{Deserialize, Serialize};

/// Number of brush settings.
pub const SETTING_COUNT: usize = 34;

/// Number of input channels.
pub const INPUT_COUNT: usize = 7;

/// A configurable brush setting.
///
/// Every setting has a scalar base value and, optionally, one mapping
/// curve per input channel (see [`Mapping`](crate::Mapping)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Setting {
    Opaque = 0,
    OpaqueMultiply = 1,
    /// Compensates dab opacity for overlap, so that many overlapping dabs
    /// sum to the configured opacity.
    OpaqueLinearize = 2,
    /// Natural logarithm of the basic dab radius in pixels.
    RadiusLogarithmic = 3,
    Hardness = 4,
    DabsPerBasicRadius = 5,
    DabsPerActualRadius = 6,
    DabsPerSecond = 7,
    /// Log-space radius jitter per dab.
    RadiusByRandom = 8,
    Speed1Slowness = 9,
    Speed2Slowness = 10,
    /// Shapes the speed response: small is logarithmic, large almost linear.
    Speed1Gamma = 11,
    Speed2Gamma = 12,
    OffsetByRandom = 13,
    OffsetBySpeed = 14,
    OffsetBySpeedSlowness = 15,
    SlowTracking = 16,
    SlowTrackingPerDab = 17,
    TrackingNoise = 18,
    ColorH = 19,
    ColorS = 20,
    ColorV = 21,
    ChangeColorH = 22,
    ChangeColorL = 23,
    ChangeColorHslS = 24,
    ChangeColorV = 25,
    ChangeColorHsvS = 26,
    /// Blend weight between brush color (0) and picked-up canvas color (1).
    Smudge = 27,
    /// How slowly the smudge buffer follows the canvas; at 1 it is frozen.
    SmudgeLength = 28,
    /// Pressure above which the `stroke` input starts accumulating.
    StrokeThreshold = 29,
    StrokeDurationLogarithmic = 30,
    /// How long the `stroke` input holds at 1 before wrapping around.
    StrokeHoldtime = 31,
    CustomInput = 32,
    CustomInputSlowness = 33,
}

impl Setting {
    /// Every setting, in ordinal order.
    pub const ALL: [Setting; SETTING_COUNT] = [
        Setting::Opaque,
        Setting::OpaqueMultiply,
        Setting::OpaqueLinearize,
        Setting::RadiusLogarithmic,
        Setting::Hardness,
        Setting::DabsPerBasicRadius,
        Setting::DabsPerActualRadius,
        Setting::DabsPerSecond,
        Setting::RadiusByRandom,
        Setting::Speed1Slowness,
        Setting::Speed2Slowness,
        Setting::Speed1Gamma,
        Setting::Speed2Gamma,
        Setting::OffsetByRandom,
        Setting::OffsetBySpeed,
        Setting::OffsetBySpeedSlowness,
        Setting::SlowTracking,
        Setting::SlowTrackingPerDab,
        Setting::TrackingNoise,
        Setting::ColorH,
        Setting::ColorS,
        Setting::ColorV,
        Setting::ChangeColorH,
        Setting::ChangeColorL,
        Setting::ChangeColorHslS,
        Setting::ChangeColorV,
        Setting::ChangeColorHsvS,
        Setting::Smudge,
        Setting::SmudgeLength,
        Setting::StrokeThreshold,
        Setting::StrokeDurationLogarithmic,
        Setting::StrokeHoldtime,
        Setting::CustomInput,
        Setting::CustomInputSlowness,
    ];

    /// Look up a setting by its stable ordinal. Host interfaces that
    /// receive raw ordinals must treat `None` as a caller bug.
    pub fn from_ordinal(ordinal: usize) -> Option<Setting> {
        Self::ALL.get(ordinal).copied()
    }
}

/// An input channel feeding the mapping curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Input {
    Pressure = 0,
    Speed1 = 1,
    Speed2 = 2,
    /// Fresh uniform draw per sub-event.
    Random = 3,
    /// Distance-driven accumulator in `[0, 1]`, reset at stroke start.
    Stroke = 4,
    /// Motion direction in `[0, 1)` turns of a half circle.
    Angle = 5,
    /// The low-passed `custom_input` setting fed back as an input.
    Custom = 6,
}

impl Input {
    /// Every input channel, in ordinal order.
    pub const ALL: [Input; INPUT_COUNT] = [
        Input::Pressure,
        Input::Speed1,
        Input::Speed2,
        Input::Random,
        Input::Stroke,
        Input::Angle,
        Input::Custom,
    ];

    /// Look up an input channel by its stable ordinal.
    pub fn from_ordinal(ordinal: usize) -> Option<Input> {
        Self::ALL.get(ordinal).copied()
    }
}
