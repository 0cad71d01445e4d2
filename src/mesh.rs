//! Heightmap <-> mesh projection: grid to vertex/index geometry, ASCII
//! OBJ/STL codecs, and lossy point-cloud import.

use crate::error::EditError;
use crate::heightmap::{HeightMap, MAX_DIM, MIN_DIM};

/// Vertical exaggeration: elevation bytes map onto [0, 100] world units.
pub const HEIGHT_SCALE: f32 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub uv: [f32; 2],
}

#[derive(Clone, Debug, Default)]
pub struct MeshGeometry {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshGeometry {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Fixed elevation-band palette, thresholds on the scaled height.
pub fn band_color(height: f32) -> [f32; 3] {
    if height < 20.0 {
        [0.2, 0.4, 0.8] // water
    } else if height < 40.0 {
        [0.76, 0.7, 0.5] // sand
    } else if height < 60.0 {
        [0.2, 0.6, 0.2] // grass
    } else if height < 80.0 {
        [0.5, 0.5, 0.5] // rock
    } else {
        [1.0, 1.0, 1.0] // snow
    }
}

/// Project the grid into renderable geometry: one vertex per cell, two
/// counter-clockwise triangles per quad of the (W-1)x(H-1) quad grid.
pub fn project(map: &HeightMap) -> MeshGeometry {
    let (w, h) = (map.width(), map.height());
    let mut vertices = Vec::with_capacity(w * h);
    let mut indices = Vec::with_capacity((w - 1) * (h - 1) * 6);

    for y in 0..h {
        for x in 0..w {
            let height = map.get(x, y) as f32 / 255.0 * HEIGHT_SCALE;
            vertices.push(Vertex {
                position: [x as f32, height, y as f32],
                color: band_color(height),
                uv: [x as f32 / w as f32, y as f32 / h as f32],
            });
        }
    }

    for y in 0..h - 1 {
        for x in 0..w - 1 {
            let top_left = (y * w + x) as u32;
            let top_right = top_left + 1;
            let bottom_left = ((y + 1) * w + x) as u32;
            let bottom_right = bottom_left + 1;

            indices.extend_from_slice(&[top_left, bottom_left, top_right]);
            indices.extend_from_slice(&[top_right, bottom_left, bottom_right]);
        }
    }

    MeshGeometry { vertices, indices }
}

const WATER_COLOR: [f32; 3] = [0.2, 0.4, 0.8];

/// Flat water plane at the given level, emitting a quad only where at
/// least one corner of the terrain cell sits below the level.
pub fn water_mesh(map: &HeightMap, level: f32) -> MeshGeometry {
    let (w, h) = (map.width(), map.height());
    let mut mesh = MeshGeometry::default();
    let scaled = |x: usize, y: usize| map.get(x, y) as f32 / 255.0 * HEIGHT_SCALE;

    for y in 0..h - 1 {
        for x in 0..w - 1 {
            let corners = [
                scaled(x, y),
                scaled(x + 1, y),
                scaled(x + 1, y + 1),
                scaled(x, y + 1),
            ];
            if !corners.iter().any(|&c| c < level) {
                continue;
            }

            let base = mesh.vertices.len() as u32;
            for (cx, cy) in [(x, y), (x + 1, y), (x + 1, y + 1), (x, y + 1)] {
                mesh.vertices.push(Vertex {
                    position: [cx as f32, level, cy as f32],
                    color: WATER_COLOR,
                    uv: [cx as f32 / w as f32, cy as f32 / h as f32],
                });
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }

    mesh
}

/// ASCII OBJ: one `v` and one `vt` line per vertex, one `f` line per
/// triangle with identical 1-based vertex/uv index pairs.
pub fn encode_obj(mesh: &MeshGeometry) -> String {
    let mut out = String::new();
    for v in &mesh.vertices {
        let [x, y, z] = v.position;
        out.push_str(&format!("v {x} {y} {z}\n"));
    }
    for v in &mesh.vertices {
        let [u, t] = v.uv;
        out.push_str(&format!("vt {u} {t}\n"));
    }
    for tri in mesh.indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] + 1, tri[1] + 1, tri[2] + 1);
        out.push_str(&format!("f {a}/{a} {b}/{b} {c}/{c}\n"));
    }
    out
}

/// ASCII STL. The facet normal is always (0, 1, 0) regardless of the
/// actual triangle orientation; importers that trust normals will shade
/// this flat.
pub fn encode_stl(mesh: &MeshGeometry) -> String {
    let mut out = String::from("solid heightmap\n");
    for tri in mesh.indices.chunks_exact(3) {
        out.push_str("  facet normal 0 1 0\n");
        out.push_str("    outer loop\n");
        for &i in tri {
            let [x, y, z] = mesh.vertices[i as usize].position;
            out.push_str(&format!("      vertex {x} {y} {z}\n"));
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    }
    out.push_str("endsolid heightmap\n");
    out
}

/// Import OBJ `v` / STL `vertex` lines as an unordered point cloud and
/// scatter it into a fresh grid, keeping the maximum elevation per cell.
/// Faces and topology are ignored; unhit cells stay at 0 (holes are not
/// interpolated).
pub fn import_point_cloud(text: &str) -> Result<HeightMap, EditError> {
    let mut points: Vec<[f64; 3]> = Vec::new();

    for line in text.lines() {
        let mut tokens = line.split_whitespace();
        let keyword = match tokens.next() {
            Some(k) => k,
            None => continue,
        };
        if keyword != "v" && keyword != "vertex" {
            continue;
        }
        let coords: Vec<f64> = tokens.filter_map(|t| t.parse().ok()).collect();
        if coords.len() >= 3 {
            points.push([coords[0], coords[1], coords[2]]);
        }
    }

    if points.is_empty() {
        return Err(EditError::Import("no vertices found".into()));
    }

    let mut min = points[0];
    let mut max = points[0];
    for p in &points {
        for axis in 0..3 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }
    let range_x = max[0] - min[0];
    let range_y = max[1] - min[1];
    let range_z = max[2] - min[2];

    let w = (range_x.ceil() as usize).clamp(MIN_DIM, MAX_DIM);
    let h = (range_z.ceil() as usize).clamp(MIN_DIM, MAX_DIM);

    let mut cells = vec![0u8; w * h];
    for p in &points {
        let gx = if range_x > 0.0 {
            (((p[0] - min[0]) / range_x) * (w - 1) as f64).round() as usize
        } else {
            0
        };
        let gz = if range_z > 0.0 {
            (((p[2] - min[2]) / range_z) * (h - 1) as f64).round() as usize
        } else {
            0
        };
        let elevation = if range_y > 0.0 {
            (((p[1] - min[1]) / range_y) * 255.0).round().clamp(0.0, 255.0) as u8
        } else {
            0
        };
        let i = gz.min(h - 1) * w + gx.min(w - 1);
        cells[i] = cells[i].max(elevation);
    }

    Ok(HeightMap::from_cells(w, h, cells))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker_map(w: usize, h: usize) -> HeightMap {
        let mut map = HeightMap::new(w, h);
        for y in 0..h {
            for x in 0..w {
                map.set(x, y, (((x * 31 + y * 17) % 256) as u8).wrapping_add(3));
            }
        }
        // Pin the full elevation range so import normalization lines up.
        map.set(0, 0, 0);
        map.set(1, 0, 255);
        map
    }

    #[test]
    fn mesh_counts_and_layout() {
        let map = HeightMap::new(16, 20);
        let mesh = project(&map);
        assert_eq!(mesh.vertices.len(), 16 * 20);
        assert_eq!(mesh.indices.len(), 15 * 19 * 6);

        // First quad: CCW (tl, bl, tr) then (tr, bl, br).
        assert_eq!(&mesh.indices[..6], &[0, 16, 1, 1, 16, 17]);

        let v = &mesh.vertices[16 + 2]; // (x=2, y=1)
        assert_eq!(v.position[0], 2.0);
        assert_eq!(v.position[2], 1.0);
        assert_eq!(v.position[1], 128.0 / 255.0 * HEIGHT_SCALE);
        assert_eq!(v.uv, [2.0 / 16.0, 1.0 / 20.0]);
    }

    #[test]
    fn band_palette_thresholds() {
        assert_eq!(band_color(0.0), [0.2, 0.4, 0.8]);
        assert_eq!(band_color(19.9), [0.2, 0.4, 0.8]);
        assert_eq!(band_color(20.0), [0.76, 0.7, 0.5]);
        assert_eq!(band_color(40.0), [0.2, 0.6, 0.2]);
        assert_eq!(band_color(60.0), [0.5, 0.5, 0.5]);
        assert_eq!(band_color(80.0), [1.0, 1.0, 1.0]);
        assert_eq!(band_color(100.0), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn obj_text_shape() {
        let map = HeightMap::new(16, 16);
        let mesh = project(&map);
        let obj = encode_obj(&mesh);

        let v_lines = obj.lines().filter(|l| l.starts_with("v ")).count();
        let vt_lines = obj.lines().filter(|l| l.starts_with("vt ")).count();
        let f_lines = obj.lines().filter(|l| l.starts_with("f ")).count();
        assert_eq!(v_lines, 256);
        assert_eq!(vt_lines, 256);
        assert_eq!(f_lines, 15 * 15 * 2);

        let first_face = obj.lines().find(|l| l.starts_with("f ")).unwrap();
        assert_eq!(first_face, "f 1/1 17/17 2/2");
    }

    #[test]
    fn stl_text_shape() {
        let map = HeightMap::new(16, 16);
        let mesh = project(&map);
        let stl = encode_stl(&mesh);

        assert!(stl.starts_with("solid heightmap\n"));
        assert!(stl.ends_with("endsolid heightmap\n"));
        let facets = stl
            .lines()
            .filter(|l| l.trim_start().starts_with("facet normal"))
            .count();
        assert_eq!(facets, mesh.triangle_count());
        // The normal is the fixed vector, never derived from geometry.
        assert!(
            stl.lines()
                .filter(|l| l.trim_start().starts_with("facet normal"))
                .all(|l| l.trim_start() == "facet normal 0 1 0")
        );
        let vertex_lines = stl
            .lines()
            .filter(|l| l.trim_start().starts_with("vertex "))
            .count();
        assert_eq!(vertex_lines, mesh.triangle_count() * 3);
    }

    #[test]
    fn import_rejects_empty_input() {
        assert!(matches!(
            import_point_cloud("# nothing here\nf 1 2 3\n"),
            Err(EditError::Import(_))
        ));
    }

    #[test]
    fn import_scatter_keeps_maximum() {
        // Two points land in the same cell; the higher one wins no matter
        // the order. Corner points pin a 20x20 extent.
        let text = "v 0 0 0\nv 20 100 20\nv 10 30 10\nv 10.2 80 10.1\n";
        let a = import_point_cloud(text).unwrap();
        let text_rev = "v 10.2 80 10.1\nv 10 30 10\nv 20 100 20\nv 0 0 0\n";
        let b = import_point_cloud(text_rev).unwrap();
        assert_eq!(a, b);

        let gx = ((10.0 / 20.0) * (a.width() - 1) as f64).round() as usize;
        let gz = ((10.0 / 20.0) * (a.height() - 1) as f64).round() as usize;
        assert_eq!(a.get(gx, gz), ((80.0 / 100.0) * 255.0f64).round() as u8);
    }

    #[test]
    fn import_accepts_stl_vertex_lines() {
        let text = "solid x\nvertex 0 0 0\nvertex 30 50 30\nvertex 15 25 15\nendsolid x\n";
        let map = import_point_cloud(text).unwrap();
        assert_eq!(map.width(), 30);
        assert_eq!(map.height(), 30);
        assert_eq!(map.get(0, 0), 0);
        assert_eq!(map.get(29, 29), 255);
    }

    #[test]
    fn import_unhit_cells_are_zero_holes() {
        let text = "v 0 0 0\nv 40 10 40\n";
        let map = import_point_cloud(text).unwrap();
        let hit = map.cells().iter().filter(|&&v| v > 0).count();
        assert_eq!(hit, 1); // only the max corner is nonzero
        assert_eq!(map.get(10, 10), 0);
    }

    #[test]
    fn import_degenerate_extents() {
        // All points on one vertical line: zero horizontal range collapses
        // to cell (0, 0); zero vertical range maps to elevation 0.
        let map = import_point_cloud("v 5 1 5\nv 5 9 5\n").unwrap();
        assert_eq!(map.width(), MIN_DIM);
        assert_eq!(map.height(), MIN_DIM);
        assert_eq!(map.get(0, 0), 255);

        let flat = import_point_cloud("v 0 3 0\nv 30 3 30\n").unwrap();
        assert!(flat.cells().iter().all(|&v| v == 0));
    }

    #[test]
    fn obj_round_trip_within_one_unit() {
        let original = checker_map(32, 32);
        let obj = encode_obj(&project(&original));
        let imported = import_point_cloud(&obj).unwrap();

        let (w2, h2) = (imported.width(), imported.height());
        // Replicate the scatter to know which source cells fed each target
        // cell; imported values must match the max of those within 1.
        let mut expected = vec![0u8; w2 * h2];
        for y in 0..32usize {
            for x in 0..32usize {
                let gx = ((x as f64 / 31.0) * (w2 - 1) as f64).round() as usize;
                let gy = ((y as f64 / 31.0) * (h2 - 1) as f64).round() as usize;
                let i = gy * w2 + gx;
                expected[i] = expected[i].max(original.get(x, y));
            }
        }
        for i in 0..w2 * h2 {
            let got = imported.cells()[i] as i32;
            let want = expected[i] as i32;
            assert!(
                (got - want).abs() <= 1,
                "cell {i}: imported {got}, expected {want}"
            );
        }
    }
}
