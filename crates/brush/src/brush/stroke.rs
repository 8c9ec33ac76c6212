//! Stroke driver: pointer events in, interpolated dabs out.

use tracing::{debug, warn};

use crate::constants::{
    ACTUAL_RADIUS_MAX, ACTUAL_RADIUS_MIN, DISCONTINUITY_DABS, DISCONTINUITY_TIME,
};
use crate::settings::Setting;
use crate::surface::Surface;
use crate::types::Rect;

use super::dynamics::{exp_decay, SubEvent};
use super::{Brush, BrushError};

/// Whether the current event ended up drawing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Painted {
    /// No dab was due this event.
    Unknown,
    Yes,
    No,
}

impl Brush {
    /// Number of dabs to draw between the current state and the given
    /// target position and elapsed time.
    ///
    /// Also heals a zeroed `actual_radius` (after a state reset) so the
    /// cadence never divides by zero.
    pub(crate) fn count_dabs_to(&mut self, x: f32, y: f32, _pressure: f32, dt: f32) -> f32 {
        if self.state.actual_radius == 0.0 {
            self.state.actual_radius = self.config.base_value(Setting::RadiusLogarithmic).exp();
        }
        self.state.actual_radius = self
            .state
            .actual_radius
            .clamp(ACTUAL_RADIUS_MIN, ACTUAL_RADIUS_MAX);

        let base_radius = self
            .config
            .base_value(Setting::RadiusLogarithmic)
            .exp()
            .clamp(ACTUAL_RADIUS_MIN, ACTUAL_RADIUS_MAX);

        let dist = (x - self.state.x).hypot(y - self.state.y);
        dist / self.state.actual_radius * self.config.base_value(Setting::DabsPerActualRadius)
            + dist / base_radius * self.config.base_value(Setting::DabsPerBasicRadius)
            + dt * self.config.base_value(Setting::DabsPerSecond)
    }

    /// Feed one pointer event to the brush.
    ///
    /// Interpolates the motion since the previous event into zero or more
    /// dabs on `surface`. Returns the bounding box the event painted, or
    /// `Ok(None)` when nothing was drawn (dropped event, no dab due, all
    /// dabs invisible or off-surface).
    ///
    /// Events must be monotonic in user time; `dtime <= 0` drops the
    /// event. If an earlier split callback failed, that failure is
    /// returned here (once) before any painting happens.
    pub fn stroke_to(
        &mut self,
        surface: &mut dyn Surface,
        x: f32,
        y: f32,
        pressure: f32,
        dtime: f64,
    ) -> Result<Option<Rect>, BrushError> {
        if let Some(message) = self.take_latched_failure() {
            return Err(BrushError::SplitCallback(message));
        }

        if dtime <= 0.0 {
            if dtime < 0.0 {
                warn!("time jumped backwards by {dtime}s, dropping event");
            }
            return Ok(None);
        }

        let mut x = x;
        let mut y = y;

        // virtual cursor: noise first, then the slow-tracking low-pass
        let tracking_noise = self.config.base_value(Setting::TrackingNoise);
        if tracking_noise != 0.0 {
            let base_radius = self.config.base_value(Setting::RadiusLogarithmic).exp();
            x += self.rng.gauss() * tracking_noise * base_radius;
            y += self.rng.gauss() * tracking_noise * base_radius;
        }
        let fac = 1.0
            - exp_decay(
                self.config.base_value(Setting::SlowTracking),
                100.0 * dtime as f32,
            );
        x = self.state.x + (x - self.state.x) * fac;
        y = self.state.y + (y - self.state.y) * fac;

        let mut dist_moved = self.state.dist;
        let mut dist_todo = self.count_dabs_to(x, y, pressure, dtime as f32);

        if dtime > DISCONTINUITY_TIME || dist_todo > DISCONTINUITY_DABS {
            // the cursor jumped, eg. when re-entering the window; drop the
            // motion instead of painting a line across the canvas
            debug!("discontinuity (dtime={dtime:.3}s, dist_todo={dist_todo:.1}), resetting state");
            self.state.reset();
            self.state.x = x;
            self.state.y = y;
            self.state.pressure = pressure;
            self.state.actual_x = x;
            self.state.actual_y = y;
            // behave as if a long-finished stroke preceded us
            self.state.stroke = 1.0;
            self.split_stroke();
            return Ok(None);
        }

        let mut painted = Painted::Unknown;
        let mut dtime_left = dtime;
        let mut event_bbox = Rect::default();

        while dist_moved + dist_todo >= 1.0 {
            // move the brush exactly to the next dab (linear interpolation)
            let frac = if dist_moved > 0.0 {
                let frac = (1.0 - dist_moved) / dist_todo;
                dist_moved = 0.0;
                frac
            } else {
                1.0 / dist_todo
            };
            let step = SubEvent {
                dx: frac * (x - self.state.x),
                dy: frac * (y - self.state.y),
                dpressure: frac * (pressure - self.state.pressure),
                dtime: (f64::from(frac) * dtime_left) as f32,
            };

            self.state.x += step.dx;
            self.state.y += step.dy;
            self.state.pressure += step.dpressure;

            self.update_dynamics(step);
            match self.prepare_and_draw_dab(surface) {
                Some(changed) => {
                    event_bbox.expand_to_include(changed.x, changed.y);
                    event_bbox.expand_to_include(changed.x + changed.w - 1, changed.y + changed.h - 1);
                    painted = Painted::Yes;
                }
                None => {
                    if painted == Painted::Unknown {
                        painted = Painted::No;
                    }
                }
            }

            dtime_left -= f64::from(step.dtime);
            dist_todo = self.count_dabs_to(x, y, pressure, dtime_left as f32);
        }

        // land on the event even when no dab is due: the cadence depends
        // on state (radius, speed) that must track every event
        let tail = SubEvent {
            dx: x - self.state.x,
            dy: y - self.state.y,
            dpressure: pressure - self.state.pressure,
            dtime: dtime_left as f32,
        };
        self.state.x = x;
        self.state.y = y;
        self.state.pressure = pressure;
        self.update_dynamics(tail);

        // fraction of the next dab already travelled
        self.state.dist = dist_moved + dist_todo;

        if !event_bbox.is_empty() {
            self.stroke.bbox.expand_to_include(event_bbox.x, event_bbox.y);
            self.stroke.bbox.expand_to_include(
                event_bbox.x + event_bbox.w - 1,
                event_bbox.y + event_bbox.h - 1,
            );
        }

        self.update_stroke_phase(painted, pressure, tail.dpressure, tail.dtime);

        Ok(if event_bbox.is_empty() {
            None
        } else {
            Some(event_bbox)
        })
    }

    /// Track painting vs. idle time and decide when to commit the stroke.
    fn update_stroke_phase(&mut self, painted: Painted, pressure: f32, dpressure: f32, dtime: f32) {
        let painted = match painted {
            // no dab was due: still idling if we already were, otherwise
            // still painting (events arrive faster than dabs)
            Painted::Unknown => {
                if self.stroke.idling_time > 0.0 {
                    Painted::No
                } else {
                    Painted::Yes
                }
            }
            known => known,
        };

        if painted == Painted::Yes {
            self.stroke.total_painting_time += f64::from(dtime);
            self.stroke.idling_time = 0.0;
            // force a split after a while, but not while pressure is being
            // released
            if self.stroke.total_painting_time > 5.0 + 10.0 * f64::from(pressure)
                && dpressure >= 0.0
            {
                debug!("splitting: painting budget exhausted");
                self.split_stroke();
            }
        } else {
            self.stroke.idling_time += f64::from(dtime);
            if self.stroke.total_painting_time == 0.0 {
                // nothing painted yet; discard the motion prelude
                if self.stroke.idling_time > 1.0 {
                    self.split_stroke();
                }
            } else if self.stroke.total_painting_time + self.stroke.idling_time
                > 1.5 + 5.0 * f64::from(pressure)
            {
                // gappy brushes can idle at full pressure; either way this
                // is the moment to split
                self.split_stroke();
            }
        }
    }
}
