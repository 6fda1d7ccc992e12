#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded path generation for the Seedpath simulation.
//!
//! A [`Path`] is a smooth polyline crossing the canvas from the left edge to
//! the right edge. It is a pure function of `(seed, width, height)`: the raw
//! waypoints are drawn from a [`SeededRandom`] stream and then smoothed with a
//! tension-blended Catmull-Rom spline.

use glam::Vec2;
use seedpath_core::SeededRandom;

/// Smallest canvas width the generator accepts.
pub const MIN_CANVAS_WIDTH: f32 = 800.0;

/// Smallest canvas height the generator accepts.
pub const MIN_CANVAS_HEIGHT: f32 = 600.0;

const MIN_SEGMENT_LENGTH: f64 = 150.0;
const MAX_SEGMENT_LENGTH: f64 = 300.0;
const HORIZONTAL_JITTER: f64 = 30.0;
const VERTICAL_MARGIN: f64 = 0.1;
const SPLINE_TENSION: f64 = 0.5;
const SAMPLES_PER_SEGMENT: u32 = 8;
const HEADING_LOOKBACK: f32 = 0.01;

/// Generates raw and smoothed waypoint sequences.
#[derive(Clone, Copy, Debug, Default)]
pub struct PathGenerator;

impl PathGenerator {
    /// Generates the smoothed waypoints for the provided seed and canvas.
    ///
    /// Dimensions below 800x600 (or non-finite ones) are clamped first.
    #[must_use]
    pub fn generate(seed: u32, width: f32, height: f32) -> Vec<Vec2> {
        let (width, height) = clamp_canvas(width, height);
        let raw = Self::raw_waypoints(seed, f64::from(width), f64::from(height));
        smooth(&raw)
            .into_iter()
            .map(|(x, y)| Vec2::new(x as f32, y as f32))
            .collect()
    }

    /// Draws the unsmoothed control points.
    fn raw_waypoints(seed: u32, width: f64, height: f64) -> Vec<(f64, f64)> {
        let mut rng = SeededRandom::new(seed);
        let segments = 6 + rng.range_int(2, 4);
        let start_y = rng.range(VERTICAL_MARGIN, 1.0 - VERTICAL_MARGIN) * height;

        let mut waypoints = Vec::with_capacity(usize::try_from(segments + 1).unwrap_or(0));
        waypoints.push((0.0, start_y));

        let mut current_x = 0.0_f64;
        let mut current_y = start_y;
        let mut last_direction = 0.0_f64;

        for index in 0..segments - 1 {
            let target_x = f64::from(index + 1) / f64::from(segments) * width;

            let direction = if last_direction == 0.0 {
                rng.choice(&[-1.0, 1.0]).copied().unwrap_or(1.0)
            } else {
                let roll = rng.next();
                if roll < 0.3 {
                    -last_direction
                } else if roll < 0.7 {
                    last_direction
                } else {
                    last_direction * 0.5
                }
            };

            let base_distance = rng.range(MIN_SEGMENT_LENGTH, MAX_SEGMENT_LENGTH);
            let magnitude = if direction == 0.0 { 1.0 } else { direction.abs() };
            let vertical_distance = base_distance * magnitude;

            let mut next_x = target_x + rng.range(-HORIZONTAL_JITTER, HORIZONTAL_JITTER);
            let mut next_y = current_y + direction * vertical_distance;

            next_x = next_x.min(width).max(0.0);
            next_y = next_y
                .min(height * (1.0 - VERTICAL_MARGIN))
                .max(height * VERTICAL_MARGIN);

            if next_x <= current_x {
                next_x = current_x + MIN_SEGMENT_LENGTH * 0.5;
            }

            waypoints.push((next_x, next_y));
            current_x = next_x;
            current_y = next_y;
            last_direction = if direction > 0.0 {
                1.0
            } else if direction < 0.0 {
                -1.0
            } else {
                0.0
            };
        }

        let end_y = rng.range(VERTICAL_MARGIN, 1.0 - VERTICAL_MARGIN) * height;
        waypoints.push((width, end_y));
        waypoints
    }
}

/// Clamps canvas dimensions to the supported minimum.
#[must_use]
pub fn clamp_canvas(width: f32, height: f32) -> (f32, f32) {
    let sanitize = |value: f32, minimum: f32| {
        if value.is_finite() {
            value.max(minimum)
        } else {
            minimum
        }
    };
    (
        sanitize(width, MIN_CANVAS_WIDTH),
        sanitize(height, MIN_CANVAS_HEIGHT),
    )
}

fn smooth(waypoints: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let (Some(&first), Some(&last)) = (waypoints.first(), waypoints.last()) else {
        return Vec::new();
    };
    if waypoints.len() < 2 {
        return waypoints.to_vec();
    }

    let samples = usize::try_from(SAMPLES_PER_SEGMENT).unwrap_or(8);
    let mut smoothed = Vec::with_capacity(2 + (waypoints.len() - 1) * (samples - 1));
    smoothed.push(first);

    for index in 0..waypoints.len() - 1 {
        let p0 = waypoints[index.saturating_sub(1)];
        let p1 = waypoints[index];
        let p2 = waypoints[index + 1];
        let p3 = waypoints[(index + 2).min(waypoints.len() - 1)];

        for step in 1..SAMPLES_PER_SEGMENT {
            let t = f64::from(step) / f64::from(SAMPLES_PER_SEGMENT);
            smoothed.push((
                catmull_rom(p0.0, p1.0, p2.0, p3.0, t),
                catmull_rom(p0.1, p1.1, p2.1, p3.1, t),
            ));
        }
    }

    smoothed.push(last);
    smoothed
}

fn catmull_rom(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    let spline = 0.5
        * ((2.0 * p1)
            + (-p0 + p2) * t
            + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
            + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3);
    spline * SPLINE_TENSION + (1.0 - SPLINE_TENSION) * (p1 + (p2 - p1) * t)
}

/// Smoothed enemy path bound to a seed and canvas size.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    seed: u32,
    width: f32,
    height: f32,
    waypoints: Vec<Vec2>,
    segment_lengths: Vec<f32>,
    total_length: f32,
}

impl Path {
    /// Generates the path for the provided seed and canvas.
    #[must_use]
    pub fn new(seed: u32, width: f32, height: f32) -> Self {
        let (width, height) = clamp_canvas(width, height);
        let waypoints = PathGenerator::generate(seed, width, height);
        let segment_lengths: Vec<f32> = waypoints
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .collect();
        let total_length = segment_lengths.iter().sum();
        Self {
            seed,
            width,
            height,
            waypoints,
            segment_lengths,
            total_length,
        }
    }

    /// Regenerates the path from the same seed for new canvas dimensions.
    ///
    /// Returns `true` when the clamped dimensions changed and the path was
    /// rebuilt. Different dimensions can yield a differently shaped path
    /// because segment distances are absolute.
    pub fn set_canvas_size(&mut self, width: f32, height: f32) -> bool {
        let (width, height) = clamp_canvas(width, height);
        if width == self.width && height == self.height {
            return false;
        }
        *self = Self::new(self.seed, width, height);
        true
    }

    /// Seed the path was generated from.
    #[must_use]
    pub const fn seed(&self) -> u32 {
        self.seed
    }

    /// Canvas width after clamping.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Canvas height after clamping.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Smoothed waypoints from the left edge to the right edge.
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Sum of all segment lengths.
    #[must_use]
    pub const fn total_length(&self) -> f32 {
        self.total_length
    }

    /// Point at the provided fraction of the path's arc length.
    ///
    /// `progress <= 0` and `progress >= 1` return the first and last waypoint
    /// exactly. A zero-length segment resolves to its endpoint.
    #[must_use]
    pub fn position_at(&self, progress: f32) -> Vec2 {
        let (Some(&first), Some(&last)) = (self.waypoints.first(), self.waypoints.last()) else {
            return Vec2::ZERO;
        };
        if progress <= 0.0 {
            return first;
        }
        if progress >= 1.0 {
            return last;
        }

        let target = progress * self.total_length;
        let mut travelled = 0.0;
        for (pair, &length) in self.waypoints.windows(2).zip(&self.segment_lengths) {
            if travelled + length >= target {
                if length <= 0.0 {
                    return pair[1];
                }
                let fraction = (target - travelled) / length;
                return pair[0] + (pair[1] - pair[0]) * fraction;
            }
            travelled += length;
        }
        last
    }

    /// Facing angle of a traveller at `progress`, once it has moved far enough
    /// to have a heading.
    #[must_use]
    pub fn heading_at(&self, progress: f32) -> Option<f32> {
        if progress <= HEADING_LOOKBACK {
            return None;
        }
        let delta = self.position_at(progress) - self.position_at(progress - HEADING_LOOKBACK);
        Some(delta.y.atan2(delta.x))
    }

    /// Shortest distance from `point` to any segment of the path.
    #[must_use]
    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.waypoints
            .windows(2)
            .map(|pair| distance_to_segment(point, pair[0], pair[1]))
            .fold(f32::INFINITY, f32::min)
    }

    /// Reports whether `point` lies within `tolerance` of the path.
    #[must_use]
    pub fn is_near_path(&self, point: Vec2, tolerance: f32) -> bool {
        self.distance_to(point) <= tolerance
    }
}

fn distance_to_segment(point: Vec2, start: Vec2, end: Vec2) -> f32 {
    let segment = end - start;
    let length_squared = segment.length_squared();
    if length_squared == 0.0 {
        return point.distance(start);
    }
    let t = ((point - start).dot(segment) / length_squared).clamp(0.0, 1.0);
    point.distance(start + segment * t)
}

#[cfg(test)]
mod tests {
    use super::{catmull_rom, clamp_canvas, distance_to_segment, smooth};
    use glam::Vec2;

    #[test]
    fn catmull_rom_hits_control_points_at_segment_ends() {
        assert!((catmull_rom(0.0, 10.0, 20.0, 30.0, 0.0) - 10.0).abs() < 1e-9);
        assert!((catmull_rom(0.0, 10.0, 20.0, 30.0, 1.0) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn smoothing_inserts_seven_samples_per_segment() {
        let raw = [(0.0, 0.0), (100.0, 50.0), (200.0, 0.0)];
        let smoothed = smooth(&raw);
        assert_eq!(smoothed.len(), 2 + 2 * 7);
        assert_eq!(smoothed.first(), Some(&(0.0, 0.0)));
        assert_eq!(smoothed.last(), Some(&(200.0, 0.0)));
    }

    #[test]
    fn canvas_is_clamped_to_minimum() {
        assert_eq!(clamp_canvas(100.0, 100.0), (800.0, 600.0));
        assert_eq!(clamp_canvas(f32::NAN, 900.0), (800.0, 900.0));
        assert_eq!(clamp_canvas(1600.0, f32::INFINITY), (1600.0, 600.0));
    }

    #[test]
    fn segment_distance_uses_clamped_projection() {
        let start = Vec2::new(0.0, 0.0);
        let end = Vec2::new(10.0, 0.0);
        assert!((distance_to_segment(Vec2::new(5.0, 3.0), start, end) - 3.0).abs() < 1e-6);
        assert!((distance_to_segment(Vec2::new(-4.0, 3.0), start, end) - 5.0).abs() < 1e-6);
        assert!((distance_to_segment(Vec2::new(1.0, 1.0), start, start) - 2f32.sqrt()).abs() < 1e-6);
    }
}
