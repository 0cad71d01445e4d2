use tracing::warn;

pub const MIN_DIM: usize = 16;
pub const MAX_DIM: usize = 4096;
pub const DEFAULT_DIM: usize = 512;

/// Fresh maps start at mid-gray so raise and lower both have headroom.
pub const BASE_ELEVATION: u8 = 128;

/// Validate requested dimensions. Out-of-range requests are corrected to
/// the default size rather than rejected; the caller keeps going.
pub fn correct_dimensions(w: usize, h: usize) -> (usize, usize) {
    if w < MIN_DIM || w > MAX_DIM || h < MIN_DIM || h > MAX_DIM {
        warn!(
            requested_w = w,
            requested_h = h,
            "map size outside [{MIN_DIM}, {MAX_DIM}], using {DEFAULT_DIM}x{DEFAULT_DIM}"
        );
        (DEFAULT_DIM, DEFAULT_DIM)
    } else {
        (w, h)
    }
}

/// Row-major flat grid of 8-bit elevation samples. No per-cell objects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeightMap {
    data: Vec<u8>,
    w: usize,
    h: usize,
}

impl HeightMap {
    /// Build a map at the requested size, correcting invalid dimensions.
    pub fn new(w: usize, h: usize) -> Self {
        let (w, h) = correct_dimensions(w, h);
        Self {
            data: vec![BASE_ELEVATION; w * h],
            w,
            h,
        }
    }

    /// Build from raw cells. Used by import; dimensions must already be valid.
    pub fn from_cells(w: usize, h: usize, data: Vec<u8>) -> Self {
        debug_assert!((MIN_DIM..=MAX_DIM).contains(&w));
        debug_assert!((MIN_DIM..=MAX_DIM).contains(&h));
        debug_assert_eq!(data.len(), w * h);
        Self { data, w, h }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.w
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.h
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.w && y < self.h);
        y * self.w + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: u8) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    #[inline]
    pub fn cells(&self) -> &[u8] {
        &self.data
    }
}
