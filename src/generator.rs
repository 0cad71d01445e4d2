//! Whole-grid procedural fill. A full replace: prior cell content is
//! discarded, not blended.

use crate::config::NoiseParams;
use crate::heightmap::HeightMap;
use crate::noise::NoiseField;

/// Fill every cell from the fractal field. The base frequency ties the
/// feature size to the smaller map axis so square-ish maps look alike at
/// any resolution.
pub fn generate(map: &mut HeightMap, field: &NoiseField, params: &NoiseParams) {
    let params = params.clamped();
    let scale = map.width().min(map.height()) as f64;
    let base_frequency = 1.0 / (scale * params.frequency_scale);
    let offset = field.frequency_offset;

    for y in 0..map.height() {
        for x in 0..map.width() {
            let sample_x = x as f64 * base_frequency + offset;
            let sample_y = y as f64 * base_frequency + offset;
            let n = field.fractal(
                params.algorithm,
                sample_x,
                sample_y,
                params.octaves,
                params.persistence,
            );
            map.set(x, y, ((n + 1.0) * 127.5).round().clamp(0.0, 255.0) as u8);
        }
    }
}
