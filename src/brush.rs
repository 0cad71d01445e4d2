//! Brush compositing: bounded-region falloff blends plus discrete flood
//! fill. All coordinates arriving here are already clamped to the grid.

use std::collections::VecDeque;

use crate::heightmap::HeightMap;
use crate::noise::{NoiseAlgorithm, NoiseField};

pub const RADIUS_RANGE: (u32, u32) = (1, 100);
pub const INTENSITY_RANGE: (u8, u8) = (1, 100);

/// Raise strokes pull toward this elevation.
pub const RAISE_TARGET: u8 = 240;
/// Lower strokes pull toward this elevation.
pub const LOWER_TARGET: u8 = 20;

/// Blend factor when no intensity is configured.
const DEFAULT_INTENSITY_FACTOR: f64 = 0.3;
const SMOOTH_FACTOR: f64 = 0.3;
const FLATTEN_FACTOR: f64 = 0.1;
const NOISE_FACTOR: f64 = 0.15;

/// Sampling scale and fBm shape for the noise-inject brush.
const NOISE_BRUSH_SCALE: f64 = 0.1;
const NOISE_BRUSH_OCTAVES: u32 = 4;
const NOISE_BRUSH_PERSISTENCE: f64 = 0.5;

/// Brush behavior, with its stroke-start payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrushMode {
    /// Pull toward an extreme (240 for raise, 20 for lower).
    RaiseLower { target: u8 },
    /// Pull toward the 3x3 neighborhood mean.
    Smooth,
    /// Pull toward the elevation under the cursor at stroke start.
    Flatten { height: u8 },
    /// Pull toward a fractal Perlin sample.
    NoiseInject,
    /// 4-connected flood fill; applied once per stroke, never on move.
    Fill { value: u8 },
}

/// One pointer-down-to-up interaction. Ephemeral; the session drops it on
/// release.
#[derive(Clone, Copy, Debug)]
pub struct BrushStroke {
    pub mode: BrushMode,
    pub radius: u32,
    /// Percent in [1, 100]; `None` blends at the 0.3 default. Only the
    /// raise/lower mode reads it.
    pub intensity: Option<u8>,
}

/// Applies strokes to a map. Owns the noise field the inject mode samples.
pub struct BrushEngine {
    noise: NoiseField,
}

impl BrushEngine {
    pub fn new(noise: NoiseField) -> Self {
        Self { noise }
    }

    /// The inject mode and the generator share one field; the offset it
    /// carries persists until the field is rebuilt or overridden.
    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    pub fn noise_mut(&mut self) -> &mut NoiseField {
        &mut self.noise
    }

    /// Apply one stamp of the stroke at (cx, cy). Fill floods the whole
    /// connected region; the other modes blend a circular falloff patch.
    pub fn apply(&self, map: &mut HeightMap, stroke: &BrushStroke, cx: usize, cy: usize) {
        match stroke.mode {
            BrushMode::Fill { value } => flood_fill(map, cx, cy, value),
            _ => self.apply_falloff(map, stroke, cx, cy),
        }
    }

    fn apply_falloff(&self, map: &mut HeightMap, stroke: &BrushStroke, cx: usize, cy: usize) {
        let radius = stroke.radius.clamp(RADIUS_RANGE.0, RADIUS_RANGE.1) as i64;
        let radius_sq = (radius * radius) as f64;
        let (w, h) = (map.width(), map.height());

        let min_x = (cx as i64 - radius).max(0) as usize;
        let max_x = ((cx as i64 + radius) as usize).min(w - 1);
        let min_y = (cy as i64 - radius).max(0) as usize;
        let max_y = ((cy as i64 + radius) as usize).min(h - 1);

        // Smooth reads neighborhoods from the pre-stamp state so this
        // stamp's own writes never feed back into its averages.
        let snapshot = match stroke.mode {
            BrushMode::Smooth => Some(map.clone()),
            _ => None,
        };

        let intensity_factor = stroke
            .intensity
            .map(|i| i.clamp(INTENSITY_RANGE.0, INTENSITY_RANGE.1) as f64 / 100.0)
            .unwrap_or(DEFAULT_INTENSITY_FACTOR);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f64 - cx as f64;
                let dy = y as f64 - cy as f64;
                let dist_sq = dx * dx + dy * dy;
                // Hard circular cutoff inside the square scan.
                if dist_sq > radius_sq {
                    continue;
                }
                let weight = 1.0 - dist_sq / radius_sq;

                let (target, factor) = match stroke.mode {
                    BrushMode::RaiseLower { target } => {
                        (target as f64, weight * intensity_factor)
                    }
                    BrushMode::Smooth => {
                        let snap = snapshot.as_ref().unwrap();
                        (neighborhood_mean(snap, x, y) as f64, weight * SMOOTH_FACTOR)
                    }
                    BrushMode::Flatten { height } => (height as f64, weight * FLATTEN_FACTOR),
                    BrushMode::NoiseInject => {
                        let n = self.noise.fractal(
                            NoiseAlgorithm::Perlin,
                            x as f64 * NOISE_BRUSH_SCALE,
                            y as f64 * NOISE_BRUSH_SCALE,
                            NOISE_BRUSH_OCTAVES,
                            NOISE_BRUSH_PERSISTENCE,
                        );
                        ((n + 1.0) * 127.5, weight * NOISE_FACTOR)
                    }
                    BrushMode::Fill { .. } => unreachable!("fill handled above"),
                };

                let current = map.get(x, y) as f64;
                let blended = current + (target - current) * factor;
                map.set(x, y, blended.round().clamp(0.0, 255.0) as u8);
            }
        }
    }
}

/// Integer mean of the 3x3 neighborhood, edge-clamped (fewer samples near
/// borders).
fn neighborhood_mean(map: &HeightMap, x: usize, y: usize) -> u8 {
    let (w, h) = (map.width() as i64, map.height() as i64);
    let mut sum: u32 = 0;
    let mut count: u32 = 0;
    for dy in -1..=1i64 {
        for dx in -1..=1i64 {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if nx >= 0 && nx < w && ny >= 0 && ny < h {
                sum += map.get(nx as usize, ny as usize) as u32;
                count += 1;
            }
        }
    }
    (sum / count) as u8
}

/// Queue-driven 4-connected flood fill with a dense visited grid. No-op
/// when the fill value already matches the origin color.
pub fn flood_fill(map: &mut HeightMap, cx: usize, cy: usize, value: u8) {
    let origin = map.get(cx, cy);
    if origin == value {
        return;
    }

    let (w, h) = (map.width(), map.height());
    let mut visited = vec![false; w * h];
    let mut queue = VecDeque::new();

    visited[cy * w + cx] = true;
    queue.push_back((cx, cy));

    while let Some((x, y)) = queue.pop_front() {
        map.set(x, y, value);

        let offsets: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        for (dx, dy) in offsets {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if nx < 0 || nx >= w as i64 || ny < 0 || ny >= h as i64 {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            let i = ny * w + nx;
            if !visited[i] && map.get(nx, ny) == origin {
                visited[i] = true;
                queue.push_back((nx, ny));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> BrushEngine {
        BrushEngine::new(NoiseField::from_seed(42))
    }

    fn uniform_map(w: usize, h: usize, v: u8) -> HeightMap {
        let mut map = HeightMap::new(w, h);
        for y in 0..h {
            for x in 0..w {
                map.set(x, y, v);
            }
        }
        map
    }

    #[test]
    fn falloff_has_hard_circular_cutoff() {
        let mut map = uniform_map(64, 64, 100);
        let stroke = BrushStroke {
            mode: BrushMode::RaiseLower { target: RAISE_TARGET },
            radius: 5,
            intensity: Some(100),
        };
        engine().apply(&mut map, &stroke, 32, 32);

        for y in 0..64 {
            for x in 0..64 {
                let dist_sq = (x as i64 - 32).pow(2) + (y as i64 - 32).pow(2);
                if dist_sq > 25 {
                    assert_eq!(map.get(x as usize, y as usize), 100, "touched ({x},{y})");
                }
            }
        }
        assert!(map.get(32, 32) > 100);
    }

    #[test]
    fn raise_lower_idempotent_at_target() {
        let mut map = uniform_map(32, 32, RAISE_TARGET);
        let before = map.clone();
        let stroke = BrushStroke {
            mode: BrushMode::RaiseLower { target: RAISE_TARGET },
            radius: 10,
            intensity: Some(100),
        };
        engine().apply(&mut map, &stroke, 16, 16);
        assert_eq!(map, before);
    }

    #[test]
    fn lower_pulls_toward_low_target() {
        let mut map = uniform_map(32, 32, 128);
        let stroke = BrushStroke {
            mode: BrushMode::RaiseLower { target: LOWER_TARGET },
            radius: 8,
            intensity: Some(50),
        };
        engine().apply(&mut map, &stroke, 16, 16);
        assert!(map.get(16, 16) < 128);
    }

    #[test]
    fn default_intensity_when_unspecified() {
        let mut with_default = uniform_map(32, 32, 100);
        let mut with_explicit = uniform_map(32, 32, 100);
        let eng = engine();
        eng.apply(
            &mut with_default,
            &BrushStroke {
                mode: BrushMode::RaiseLower { target: RAISE_TARGET },
                radius: 6,
                intensity: None,
            },
            16,
            16,
        );
        eng.apply(
            &mut with_explicit,
            &BrushStroke {
                mode: BrushMode::RaiseLower { target: RAISE_TARGET },
                radius: 6,
                intensity: Some(30),
            },
            16,
            16,
        );
        assert_eq!(with_default, with_explicit);
    }

    #[test]
    fn smooth_leaves_uniform_grid_alone() {
        let mut map = uniform_map(32, 32, 77);
        let before = map.clone();
        let stroke = BrushStroke {
            mode: BrushMode::Smooth,
            radius: 10,
            intensity: Some(100),
        };
        engine().apply(&mut map, &stroke, 16, 16);
        assert_eq!(map, before);
    }

    #[test]
    fn smooth_reduces_contrast() {
        let mut map = uniform_map(32, 32, 50);
        map.set(16, 16, 250);
        let stroke = BrushStroke {
            mode: BrushMode::Smooth,
            radius: 5,
            intensity: None,
        };
        engine().apply(&mut map, &stroke, 16, 16);
        assert!(map.get(16, 16) < 250);
        assert!(map.get(15, 16) >= 50);
    }

    #[test]
    fn flatten_idempotent_at_captured_height() {
        let mut map = uniform_map(32, 32, 90);
        let before = map.clone();
        let stroke = BrushStroke {
            mode: BrushMode::Flatten { height: 90 },
            radius: 12,
            intensity: Some(100),
        };
        engine().apply(&mut map, &stroke, 16, 16);
        assert_eq!(map, before);
    }

    #[test]
    fn noise_inject_idempotent_at_noise_values() {
        let eng = engine();
        // Pre-paint every cell with its own rounded noise target; one more
        // stamp must not move anything (the residual is under half a unit
        // after the 0.15 falloff factor).
        let mut map = uniform_map(32, 32, 0);
        for y in 0..32 {
            for x in 0..32 {
                let n = eng.noise.fractal(
                    NoiseAlgorithm::Perlin,
                    x as f64 * NOISE_BRUSH_SCALE,
                    y as f64 * NOISE_BRUSH_SCALE,
                    NOISE_BRUSH_OCTAVES,
                    NOISE_BRUSH_PERSISTENCE,
                );
                map.set(x, y, ((n + 1.0) * 127.5).round().clamp(0.0, 255.0) as u8);
            }
        }
        let before = map.clone();
        let stroke = BrushStroke {
            mode: BrushMode::NoiseInject,
            radius: 10,
            intensity: Some(100),
        };
        eng.apply(&mut map, &stroke, 16, 16);
        assert_eq!(map, before);
    }

    #[test]
    fn fill_same_value_is_noop() {
        let mut map = uniform_map(32, 32, 100);
        let before = map.clone();
        engine().apply(
            &mut map,
            &BrushStroke {
                mode: BrushMode::Fill { value: 100 },
                radius: 1,
                intensity: None,
            },
            5,
            5,
        );
        assert_eq!(map, before);
    }

    #[test]
    fn fill_covers_whole_uniform_region() {
        let mut map = uniform_map(50, 50, 100);
        flood_fill(&mut map, 25, 25, 200);
        assert!(map.cells().iter().all(|&v| v == 200));
    }

    #[test]
    fn fill_stops_at_barriers() {
        let mut map = uniform_map(32, 32, 100);
        // Vertical wall splits the map.
        for y in 0..32 {
            map.set(16, y, 0);
        }
        flood_fill(&mut map, 4, 4, 200);
        assert_eq!(map.get(4, 4), 200);
        assert_eq!(map.get(15, 4), 200);
        assert_eq!(map.get(16, 4), 0);
        assert_eq!(map.get(17, 4), 100);
    }

    #[test]
    fn fill_from_corner() {
        let mut map = uniform_map(16, 16, 10);
        flood_fill(&mut map, 0, 0, 90);
        assert!(map.cells().iter().all(|&v| v == 90));
    }
}
