//! Raster backend contract and a CPU reference implementation.

use crate::types::Rect;

/// Raster backend a brush paints into.
///
/// The surface is borrowed read/write for the duration of one
/// [`stroke_to`](crate::Brush::stroke_to) call and must not be shared with
/// another caller while that call runs.
pub trait Surface {
    /// Stamp one hardness-profiled circular dab.
    ///
    /// `rgb` is the quantized dab color, `opaque` and `hardness` are in
    /// `[0, 1]`. Returns the bounding box of the pixels that actually
    /// changed, or `None` if nothing did (zero opacity, fully off the
    /// surface, ...).
    fn draw_dab(
        &mut self,
        x: f32,
        y: f32,
        radius: f32,
        rgb: [u8; 3],
        opaque: f32,
        hardness: f32,
    ) -> Option<Rect>;

    /// Average color in a disc of `radius` around `(px, py)`, channels in
    /// `[0, 1]`. Off-surface pixels do not contribute.
    fn sample_color(&self, px: i32, py: i32, radius: f32) -> [f32; 4];
}

/// An RGBA f32 surface held in main memory.
///
/// Pixels are stored row-major as `[r, g, b, a]`.
pub struct CpuSurface {
    pub width: u32,
    pub height: u32,
    pixels: Vec<[f32; 4]>,
}

impl CpuSurface {
    /// Create a surface initialized to transparent black.
    pub fn new(width: u32, height: u32) -> Self {
        let pixel_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            pixels: vec![[0.0, 0.0, 0.0, 0.0]; pixel_count],
        }
    }

    /// Fill the whole surface with one color.
    pub fn clear(&mut self, color: [f32; 4]) {
        self.pixels.fill(color);
    }

    /// Read one pixel; `None` when out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y as usize) * (self.width as usize) + (x as usize)])
    }

    /// Write one pixel; out-of-bounds writes are dropped.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [f32; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        self.pixels[(y as usize) * (self.width as usize) + (x as usize)] = color;
    }

    /// Alpha-composite a color onto a pixel.
    #[inline]
    fn blend_pixel(&mut self, x: u32, y: u32, color: [f32; 4], opacity: f32) {
        let index = (y as usize) * (self.width as usize) + (x as usize);
        let dst = self.pixels[index];

        let src_alpha = color[3] * opacity;
        let inv_src_alpha = 1.0 - src_alpha;

        self.pixels[index] = [
            color[0] * src_alpha + dst[0] * inv_src_alpha,
            color[1] * src_alpha + dst[1] * inv_src_alpha,
            color[2] * src_alpha + dst[2] * inv_src_alpha,
            src_alpha + dst[3] * inv_src_alpha,
        ];
    }

    /// Raw pixel bytes, suitable for texture upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

/// Falloff from dab center (`distance` 0) to rim (`distance` 1) for a
/// given hardness: linear at hardness 0, a solid disc at hardness 1.
#[inline]
fn hardness_falloff(distance: f32, hardness: f32) -> f32 {
    if hardness >= 1.0 {
        if distance <= 1.0 {
            1.0
        } else {
            0.0
        }
    } else {
        let t = distance.clamp(0.0, 1.0);
        let soft = 1.0 - t;
        soft * (1.0 - hardness) + hardness
    }
}

impl Surface for CpuSurface {
    fn draw_dab(
        &mut self,
        x: f32,
        y: f32,
        radius: f32,
        rgb: [u8; 3],
        opaque: f32,
        hardness: f32,
    ) -> Option<Rect> {
        if radius <= 0.0 || opaque <= 0.0 {
            return None;
        }

        let x_min = ((x - radius).floor() as i64).max(0) as u32;
        let y_min = ((y - radius).floor() as i64).max(0) as u32;
        let x_max = (((x + radius).ceil() as i64).max(0) as u32).min(self.width);
        let y_max = (((y + radius).ceil() as i64).max(0) as u32).min(self.height);
        if x_min >= x_max || y_min >= y_max {
            return None;
        }

        let color = [
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
            1.0,
        ];

        let mut changed = Rect::default();
        for py in y_min..y_max {
            let dy = (py as f32 + 0.5) - y;
            for px in x_min..x_max {
                let dx = (px as f32 + 0.5) - x;
                let distance = (dx * dx + dy * dy).sqrt() / radius;
                if distance > 1.0 {
                    continue;
                }
                let alpha = opaque * hardness_falloff(distance, hardness);
                if alpha <= 0.0 {
                    continue;
                }
                self.blend_pixel(px, py, color, alpha);
                changed.expand_to_include(px as i32, py as i32);
            }
        }

        if changed.is_empty() {
            None
        } else {
            Some(changed)
        }
    }

    fn sample_color(&self, px: i32, py: i32, radius: f32) -> [f32; 4] {
        let r_ceil = radius.ceil() as i32;
        let radius_sq = radius * radius;

        let mut sum = [0.0f32; 4];
        let mut count = 0u32;
        for y in (py - r_ceil)..=(py + r_ceil) {
            for x in (px - r_ceil)..=(px + r_ceil) {
                let dx = (x - px) as f32;
                let dy = (y - py) as f32;
                if dx * dx + dy * dy > radius_sq {
                    continue;
                }
                if x < 0 || y < 0 {
                    continue;
                }
                if let Some(pixel) = self.get_pixel(x as u32, y as u32) {
                    for (total, channel) in sum.iter_mut().zip(pixel) {
                        *total += channel;
                    }
                    count += 1;
                }
            }
        }

        if count == 0 {
            return [0.0; 4];
        }
        sum.map(|total| total / count as f32)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_surface_is_transparent() {
        let surface = CpuSurface::new(16, 16);
        assert_eq!(surface.get_pixel(0, 0), Some([0.0, 0.0, 0.0, 0.0]));
        assert_eq!(surface.get_pixel(16, 0), None);
    }

    #[test]
    fn test_draw_dab_changes_center() {
        let mut surface = CpuSurface::new(64, 64);
        surface.clear([1.0, 1.0, 1.0, 1.0]);

        let result = surface.draw_dab(32.0, 32.0, 8.0, [255, 0, 0], 1.0, 1.0);
        let changed = result.expect("dab should touch pixels");
        assert!(changed.w > 0 && changed.h > 0);

        let center = surface.get_pixel(32, 32).unwrap();
        assert!((center[0] - 1.0).abs() < 0.01);
        assert!(center[1] < 0.5);
    }

    #[test]
    fn test_draw_dab_zero_opacity_draws_nothing() {
        let mut surface = CpuSurface::new(64, 64);
        assert!(surface.draw_dab(32.0, 32.0, 8.0, [255, 0, 0], 0.0, 1.0).is_none());
    }

    #[test]
    fn test_draw_dab_off_surface_draws_nothing() {
        let mut surface = CpuSurface::new(64, 64);
        assert!(surface.draw_dab(-50.0, -50.0, 8.0, [255, 0, 0], 1.0, 1.0).is_none());
    }

    #[test]
    fn test_draw_dab_clips_to_surface() {
        let mut surface = CpuSurface::new(64, 64);
        let changed = surface.draw_dab(0.0, 0.0, 8.0, [0, 255, 0], 1.0, 0.5).unwrap();
        assert!(changed.x >= 0 && changed.y >= 0);
        assert!(changed.x + changed.w <= 64);
    }

    #[test]
    fn test_hardness_falloff_profile() {
        // hard disc
        assert_eq!(hardness_falloff(0.0, 1.0), 1.0);
        assert_eq!(hardness_falloff(1.0, 1.0), 1.0);

        // fully soft: linear ramp to zero
        assert_eq!(hardness_falloff(0.0, 0.0), 1.0);
        assert_eq!(hardness_falloff(0.5, 0.0), 0.5);
        assert_eq!(hardness_falloff(1.0, 0.0), 0.0);

        // in between
        let mid = hardness_falloff(0.5, 0.5);
        assert!(mid > 0.5 && mid < 1.0);
    }

    #[test]
    fn test_sample_color_averages_disc() {
        let mut surface = CpuSurface::new(32, 32);
        surface.clear([0.5, 0.25, 0.75, 1.0]);

        let sample = surface.sample_color(16, 16, 5.0);
        assert!((sample[0] - 0.5).abs() < 1e-6);
        assert!((sample[1] - 0.25).abs() < 1e-6);
        assert!((sample[2] - 0.75).abs() < 1e-6);
        assert!((sample[3] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_sample_color_outside_surface_is_transparent() {
        let surface = CpuSurface::new(32, 32);
        assert_eq!(surface.sample_color(-100, -100, 5.0), [0.0; 4]);
    }

    #[test]
    fn test_as_bytes_length() {
        let surface = CpuSurface::new(2, 2);
        assert_eq!(surface.as_bytes().len(), 2 * 2 * 4 * 4);
    }
}
