//! Brush configuration: the mapping table and the caches derived from it.

use crate::mapping::Mapping;
use crate::settings::{Input, Setting, SETTING_COUNT};

/// Precomputed coefficients linearizing one physical speed into its input
/// channel: `input = ln(gamma + speed) * m + q`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpeedCoefficients {
    pub gamma: f32,
    pub m: f32,
    pub q: f32,
}

/// Everything that describes a brush independently of the cursor: base
/// values, input mappings and the speed coefficients derived from them.
///
/// Held constant while a stroke is in flight; the transient cursor state
/// lives in [`BrushState`](crate::BrushState). The speed coefficients are
/// pure cache: they are refreshed on every base-value write and are never
/// settable on their own.
#[derive(Debug, Clone)]
pub struct BrushConfig {
    mappings: [Mapping; SETTING_COUNT],
    speed_coefficients: [SpeedCoefficients; 2],
}

impl BrushConfig {
    /// A configuration with every base value at zero and no mappings.
    pub fn new() -> Self {
        let mut config = Self {
            mappings: std::array::from_fn(|_| Mapping::new()),
            speed_coefficients: [SpeedCoefficients::default(); 2],
        };
        config.base_values_changed();
        config
    }

    pub fn base_value(&self, setting: Setting) -> f32 {
        self.mappings[setting as usize].base_value
    }

    pub fn mapping(&self, setting: Setting) -> &Mapping {
        &self.mappings[setting as usize]
    }

    /// Write a base value and refresh the derived speed coefficients.
    pub fn set_base_value(&mut self, setting: Setting, value: f32) {
        self.mappings[setting as usize].base_value = value;
        self.base_values_changed();
    }

    /// Resize one mapping curve (see [`Mapping::set_n`]).
    pub fn set_mapping_n(&mut self, setting: Setting, input: Input, n: usize) {
        self.mappings[setting as usize].set_n(input, n);
    }

    /// Write one mapping control point (see [`Mapping::set_point`]).
    pub fn set_mapping_point(&mut self, setting: Setting, input: Input, index: usize, x: f32, y: f32) {
        self.mappings[setting as usize].set_point(input, index, x, y);
    }

    /// Coefficients for speed channel 0 or 1.
    pub fn speed_coefficients(&self, channel: usize) -> SpeedCoefficients {
        self.speed_coefficients[channel]
    }

    /// Recompute the speed-input linearization for both speed channels.
    ///
    /// Gamma shapes the curve (small: logarithmic, large: almost linear);
    /// m and q are solved from two fixed calibration constraints so that
    /// the reported input stays in a useful range around speed 45.
    fn base_values_changed(&mut self) {
        for (channel, gamma_setting) in [Setting::Speed1Gamma, Setting::Speed2Gamma]
            .into_iter()
            .enumerate()
        {
            let gamma = self.base_value(gamma_setting).exp();
            let c1 = (45.0 + gamma).ln();
            let m = 0.015 * (45.0 + gamma);
            let q = 0.5 - m * c1;
            self.speed_coefficients[channel] = SpeedCoefficients { gamma, m, q };
        }
    }
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_speed_coefficients() {
        let config = BrushConfig::new();
        for channel in 0..2 {
            let coefficients = config.speed_coefficients(channel);
            assert!((coefficients.gamma - 1.0).abs() < 1e-6);
            assert!((coefficients.m - 0.69).abs() < 1e-6);
            assert!((coefficients.q - (0.5 - 0.69 * 46.0f32.ln())).abs() < 1e-5);
        }
    }

    #[test]
    fn test_base_value_write_refreshes_coefficients() {
        let mut config = BrushConfig::new();
        let before = config.speed_coefficients(0);

        config.set_base_value(Setting::Speed1Gamma, 2.0);
        let after = config.speed_coefficients(0);

        assert!((after.gamma - 2.0f32.exp()).abs() < 1e-4);
        assert!(after.gamma != before.gamma);
        // channel 1 keeps its own gamma
        assert!((config.speed_coefficients(1).gamma - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_mapping_passthrough() {
        let mut config = BrushConfig::new();
        config.set_mapping_n(Setting::Opaque, Input::Pressure, 2);
        config.set_mapping_point(Setting::Opaque, Input::Pressure, 0, 0.0, 0.0);
        config.set_mapping_point(Setting::Opaque, Input::Pressure, 1, 1.0, 1.0);

        assert_eq!(config.mapping(Setting::Opaque).point_count(Input::Pressure), 2);
    }
}
