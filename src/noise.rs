//! Seeded lattice noise: classic Perlin, 2D simplex, and their fractal
//! (fBm) composition. All sampling is pure table lookup; the only random
//! state is built once in [`NoiseField::from_seed`].

use crate::rng::Rng;

/// Which base noise the fractal composition samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoiseAlgorithm {
    Perlin,
    Simplex,
}

/// 12 edge-midpoint gradients of a cube, projected to 2D during sampling.
const GRAD3: [[f64; 3]; 12] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
];

#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

/// Hash-selected gradient dot product over (x, y, z). The low four bits
/// pick one of 12 directions (4 hash values alias).
#[inline]
fn grad(hash: usize, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

/// Seeded permutation table plus the shared frequency offset. Immutable
/// once built; rebuild from a new seed to rotate the offset.
pub struct NoiseField {
    /// Shuffled 0..255, duplicated to length 512.
    perm: Vec<usize>,
    /// Added to both sample axes by the generator, in [100, 5000].
    pub frequency_offset: f64,
}

impl NoiseField {
    pub fn from_seed(seed: u64) -> Self {
        let mut rng = Rng::new(seed);
        let mut table: Vec<usize> = (0..256).collect();
        rng.shuffle(&mut table);
        let mut perm = table.clone();
        perm.extend_from_slice(&table);
        let frequency_offset = rng.range_f64(100.0, 5000.0);
        Self {
            perm,
            frequency_offset,
        }
    }

    /// Classic 2D Perlin noise in [-1, 1], evaluated as 3D noise at z = 0.
    pub fn perlin(&self, x: f64, y: f64) -> f64 {
        let p = &self.perm;
        let xi = x.floor() as i64;
        let yi = y.floor() as i64;
        let fx = x - x.floor();
        let fy = y - y.floor();
        let z = 0.0;

        let u = fade(fx);
        let v = fade(fy);

        let a = p[(xi & 255) as usize] + (yi & 255) as usize;
        let b = p[((xi + 1) & 255) as usize] + (yi & 255) as usize;

        let aa = p[a & 511];
        let ab = p[b & 511];
        let ba = p[a & 511] + 1;
        let bb = p[b & 511] + 1;

        lerp(
            v,
            lerp(u, grad(p[aa], fx, fy, z), grad(p[ba], fx - 1.0, fy, z)),
            lerp(
                u,
                grad(p[ab], fx, fy - 1.0, z),
                grad(p[bb], fx - 1.0, fy - 1.0, z),
            ),
        )
    }

    /// 2D simplex noise. Skews onto the simplex lattice, then sums three
    /// radial-kernel corner contributions scaled by 70.
    pub fn simplex(&self, xin: f64, yin: f64) -> f64 {
        let p = &self.perm;
        let f2 = 0.5 * (3.0f64.sqrt() - 1.0);
        let g2 = (3.0 - 3.0f64.sqrt()) / 6.0;

        let s = (xin + yin) * f2;
        let i = (xin + s).floor() as i64;
        let j = (yin + s).floor() as i64;

        let t = (i + j) as f64 * g2;
        let x0 = xin - (i as f64 - t);
        let y0 = yin - (j as f64 - t);

        // Lower-right or upper-left second corner depending on which side
        // of the cell diagonal we fell.
        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - i1 as f64 + g2;
        let y1 = y0 - j1 as f64 + g2;
        let x2 = x0 - 1.0 + 2.0 * g2;
        let y2 = y0 - 1.0 + 2.0 * g2;

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;
        let gi0 = p[ii + p[jj]] % 12;
        let gi1 = p[ii + i1 + p[jj + j1]] % 12;
        let gi2 = p[ii + 1 + p[jj + 1]] % 12;

        let mut total = 0.0;
        for (gi, dx, dy) in [(gi0, x0, y0), (gi1, x1, y1), (gi2, x2, y2)] {
            let t = 0.5 - dx * dx - dy * dy;
            if t > 0.0 {
                let t2 = t * t;
                total += t2 * t2 * (GRAD3[gi][0] * dx + GRAD3[gi][1] * dy);
            }
        }

        70.0 * total
    }

    #[inline]
    pub fn sample(&self, algorithm: NoiseAlgorithm, x: f64, y: f64) -> f64 {
        match algorithm {
            NoiseAlgorithm::Perlin => self.perlin(x, y),
            NoiseAlgorithm::Simplex => self.simplex(x, y),
        }
    }

    /// Fractal Brownian motion: octave i samples at frequency 2^i with
    /// amplitude persistence^i. Dividing by the amplitude sum keeps the
    /// output inside the base noise's range for any octave count.
    pub fn fractal(
        &self,
        algorithm: NoiseAlgorithm,
        x: f64,
        y: f64,
        octaves: u32,
        persistence: f64,
    ) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut freq = 1.0;
        let mut norm = 0.0;

        for _ in 0..octaves {
            total += self.sample(algorithm, x * freq, y * freq) * amplitude;
            norm += amplitude;
            amplitude *= persistence;
            freq *= 2.0;
        }

        if norm > 0.0 { total / norm } else { 0.0 }
    }
}
