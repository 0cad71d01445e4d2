use rayon::prelude::*;

use crate::heightmap::HeightMap;
use crate::mesh::{HEIGHT_SCALE, band_color};

/// Grayscale rasterization: one elevation byte per pixel.
pub fn render_grayscale(map: &HeightMap) -> Vec<u8> {
    let w = map.width();
    let mut rgba = vec![0u8; w * map.height() * 4];

    rgba.par_chunks_mut(w * 4).enumerate().for_each(|(y, row)| {
        for x in 0..w {
            let v = map.get(x, y);
            row[x * 4..x * 4 + 4].copy_from_slice(&[v, v, v, 255]);
        }
    });

    rgba
}

/// Shaded preview using the same five elevation bands as the mesh.
pub fn render_shaded(map: &HeightMap) -> Vec<u8> {
    let w = map.width();
    let mut rgba = vec![0u8; w * map.height() * 4];

    rgba.par_chunks_mut(w * 4).enumerate().for_each(|(y, row)| {
        for x in 0..w {
            let height = map.get(x, y) as f32 / 255.0 * HEIGHT_SCALE;
            let c = band_color(height);
            let px = [
                (c[0] * 255.0) as u8,
                (c[1] * 255.0) as u8,
                (c[2] * 255.0) as u8,
                255,
            ];
            row[x * 4..x * 4 + 4].copy_from_slice(&px);
        }
    });

    rgba
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grayscale_mirrors_elevation_bytes() {
        let mut map = HeightMap::new(16, 16);
        map.set(3, 4, 200);
        let rgba = render_grayscale(&map);
        assert_eq!(rgba.len(), 16 * 16 * 4);
        let i = (4 * 16 + 3) * 4;
        assert_eq!(&rgba[i..i + 4], &[200, 200, 200, 255]);
    }

    #[test]
    fn shaded_uses_band_palette() {
        let mut map = HeightMap::new(16, 16);
        map.set(0, 0, 0); // water band
        map.set(1, 0, 255); // snow band
        let rgba = render_shaded(&map);
        assert_eq!(&rgba[0..4], &[51, 102, 204, 255]);
        assert_eq!(&rgba[4..8], &[255, 255, 255, 255]);
    }
}
