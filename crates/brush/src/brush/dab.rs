//! Dab preparation: one dab's position, radius, color and opacity.

use tracing::debug;

use crate::color;
use crate::constants::{ACTUAL_RADIUS_MAX, ACTUAL_RADIUS_MIN, SMUDGE_SAMPLE_RADIUS};
use crate::settings::Setting;
use crate::surface::Surface;
use crate::types::Rect;

use super::Brush;

impl Brush {
    /// Compute one dab from the current settings and state, then stamp it.
    ///
    /// Runs directly after the dynamics update. Returns the changed region,
    /// or `None` if the surface drew nothing.
    pub(crate) fn prepare_and_draw_dab(&mut self, surface: &mut dyn Surface) -> Option<Rect> {
        let mut opaque = (self.setting_value(Setting::Opaque)
            * self.setting_value(Setting::OpaqueMultiply))
        .clamp(0.0, 1.0);
        // no early return on zero opacity: the smudge buffer below must
        // still pick up canvas color
        if self.setting_value(Setting::OpaqueLinearize) > 0.0 {
            // rough overlap estimate; ignores radius changes mid-stroke
            let mut dabs_per_pixel = (self.config.base_value(Setting::DabsPerActualRadius)
                + self.config.base_value(Setting::DabsPerBasicRadius))
                * 2.0;
            // the correction only makes sense for overlapping dabs
            if dabs_per_pixel < 1.0 {
                dabs_per_pixel = 1.0;
            }
            dabs_per_pixel =
                1.0 + self.config.base_value(Setting::OpaqueLinearize) * (dabs_per_pixel - 1.0);
            // dabs_per_pixel dabs of alpha a must sum to the configured
            // opacity: 1 - opaque = (1 - a)^dabs_per_pixel
            opaque = 1.0 - (1.0 - opaque).powf(1.0 / dabs_per_pixel);
        }

        let mut x = self.state.actual_x;
        let mut y = self.state.actual_y;

        let base_radius = self.config.base_value(Setting::RadiusLogarithmic).exp();

        let offset_by_speed = self.setting_value(Setting::OffsetBySpeed);
        if offset_by_speed != 0.0 {
            x += self.state.norm_dx_slow * offset_by_speed * 0.1 * base_radius;
            y += self.state.norm_dy_slow * offset_by_speed * 0.1 * base_radius;
        }

        let offset_by_random = self.setting_value(Setting::OffsetByRandom);
        if offset_by_random != 0.0 {
            x += self.rng.gauss() * offset_by_random * base_radius;
            y += self.rng.gauss() * offset_by_random * base_radius;
        }

        let mut radius = self.state.actual_radius;
        let radius_by_random = self.setting_value(Setting::RadiusByRandom);
        if radius_by_random > 0.0 {
            // jitter in log space, then give the grown dab less ink so the
            // stroke keeps its overall density
            let radius_log = self.setting_value(Setting::RadiusLogarithmic)
                + self.rng.gauss() * radius_by_random;
            radius = radius_log.exp().clamp(ACTUAL_RADIUS_MIN, ACTUAL_RADIUS_MAX);
            let alpha_correction = (self.state.actual_radius / radius).powi(2);
            if alpha_correction <= 1.0 {
                opaque *= alpha_correction;
            }
        }

        // pigment color, possibly mixed with picked-up canvas color
        let smudge = self.setting_value(Setting::Smudge);
        let (h, s, v, eraser) = if smudge <= 0.0 {
            (
                self.config.base_value(Setting::ColorH),
                self.config.base_value(Setting::ColorS),
                self.config.base_value(Setting::ColorV),
                1.0,
            )
        } else if smudge >= 1.0 {
            let (h, s, v) = color::rgb_to_hsv(
                self.state.smudge_r,
                self.state.smudge_g,
                self.state.smudge_b,
            );
            (h, s, v, self.state.smudge_a)
        } else {
            let (r, g, b) = color::hsv_to_rgb(
                self.config.base_value(Setting::ColorH),
                self.config.base_value(Setting::ColorS),
                self.config.base_value(Setting::ColorV),
            );
            let r = (1.0 - smudge) * r + smudge * self.state.smudge_r;
            let g = (1.0 - smudge) * g + smudge * self.state.smudge_g;
            let b = (1.0 - smudge) * b + smudge * self.state.smudge_b;
            let (h, s, v) = color::rgb_to_hsv(r, g, b);
            (h, s, v, (1.0 - smudge) + smudge * self.state.smudge_a)
        };
        let (mut h, mut s, mut v) = (h, s, v);

        // refresh the mixing buffer from the canvas under the dab
        let smudge_length = self.setting_value(Setting::SmudgeLength);
        if smudge_length < 1.0 {
            let keep = smudge_length.max(0.0);
            let [r, g, b, a] =
                surface.sample_color(x.round() as i32, y.round() as i32, SMUDGE_SAMPLE_RADIUS);
            self.state.smudge_r = keep * self.state.smudge_r + (1.0 - keep) * r;
            self.state.smudge_g = keep * self.state.smudge_g + (1.0 - keep) * g;
            self.state.smudge_b = keep * self.state.smudge_b + (1.0 - keep) * b;
            self.state.smudge_a = keep * self.state.smudge_a + (1.0 - keep) * a;
        }

        h += self.setting_value(Setting::ChangeColorH);
        s += self.setting_value(Setting::ChangeColorHsvS);
        v += self.setting_value(Setting::ChangeColorV);

        let change_l = self.setting_value(Setting::ChangeColorL);
        let change_hsl_s = self.setting_value(Setting::ChangeColorHslS);
        if change_l != 0.0 || change_hsl_s != 0.0 {
            let (r, g, b) = color::hsv_to_rgb(h, s, v);
            let (hue, sat, lum) = color::rgb_to_hsl(r, g, b);
            let (r, g, b) = color::hsl_to_rgb(hue, sat + change_hsl_s, lum + change_l);
            (h, s, v) = color::rgb_to_hsv(r, g, b);
        }

        let hue_degrees = {
            let degrees = (h * 360.0) as i32 % 360;
            if degrees < 0 {
                degrees + 360
            } else {
                degrees
            }
        };
        let s8 = ((s * 255.0).round() as i32).clamp(0, 255) as u8;
        let v8 = ((v * 255.0).round() as i32).clamp(0, 255) as u8;
        let (red, green, blue) = color::hsv_to_rgb_u8(hue_degrees, s8, v8);

        let hardness = self.setting_value(Setting::Hardness).clamp(0.0, 1.0);

        debug!(
            "dab at ({x:.1}, {y:.1}): radius={radius:.2}, rgb=({red}, {green}, {blue}), opaque={opaque:.3}, hardness={hardness:.2}, eraser={eraser:.2}"
        );

        surface.draw_dab(x, y, radius, [red, green, blue], opaque, hardness)
    }
}
