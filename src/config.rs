use serde::Deserialize;

use crate::error::EditError;
use crate::noise::NoiseAlgorithm;

/// How the frequency offset is chosen for a generation request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OffsetSpec {
    /// Draw a fresh offset from [100, 5000] (rebuilds the noise field).
    Randomize,
    /// Use this exact offset.
    Explicit(f64),
}

impl OffsetSpec {
    /// Parse the offset text field: empty or "random" means randomize,
    /// a number is explicit, anything else is a parse error (the caller
    /// falls back to a randomized offset and reports it).
    pub fn parse(text: &str) -> Result<Self, EditError> {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("random") {
            return Ok(OffsetSpec::Randomize);
        }
        trimmed
            .parse::<f64>()
            .map(OffsetSpec::Explicit)
            .map_err(|_| EditError::ParseOffset(trimmed.to_string()))
    }
}

/// Whole-grid generation parameters. Ranges mirror the editor sliders;
/// out-of-range values are clamped, not rejected.
#[derive(Clone, Copy, Debug)]
pub struct NoiseParams {
    pub algorithm: NoiseAlgorithm,
    pub octaves: u32,
    pub persistence: f64,
    pub frequency_scale: f64,
    pub offset: OffsetSpec,
}

pub const OCTAVES_RANGE: (u32, u32) = (1, 10);
pub const PERSISTENCE_RANGE: (f64, f64) = (0.1, 0.9);
pub const FREQUENCY_SCALE_RANGE: (f64, f64) = (1.0, 50.0);

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            algorithm: NoiseAlgorithm::Perlin,
            octaves: 6,
            persistence: 0.55,
            frequency_scale: 8.0,
            offset: OffsetSpec::Randomize,
        }
    }
}

impl NoiseParams {
    /// Clamp every field into its slider range.
    pub fn clamped(self) -> Self {
        Self {
            algorithm: self.algorithm,
            octaves: self.octaves.clamp(OCTAVES_RANGE.0, OCTAVES_RANGE.1),
            persistence: self
                .persistence
                .clamp(PERSISTENCE_RANGE.0, PERSISTENCE_RANGE.1),
            frequency_scale: self
                .frequency_scale
                .clamp(FREQUENCY_SCALE_RANGE.0, FREQUENCY_SCALE_RANGE.1),
            offset: self.offset,
        }
    }
}

impl<'de> Deserialize<'de> for NoiseAlgorithm {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        match name.to_ascii_lowercase().as_str() {
            "perlin" => Ok(NoiseAlgorithm::Perlin),
            "simplex" => Ok(NoiseAlgorithm::Simplex),
            other => Err(serde::de::Error::custom(format!(
                "unknown noise algorithm: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_text_forms() {
        assert!(matches!(OffsetSpec::parse(""), Ok(OffsetSpec::Randomize)));
        assert!(matches!(OffsetSpec::parse("Random"), Ok(OffsetSpec::Randomize)));
        assert_eq!(
            OffsetSpec::parse(" 1234.5 ").unwrap(),
            OffsetSpec::Explicit(1234.5)
        );
        assert!(matches!(
            OffsetSpec::parse("not-a-number"),
            Err(EditError::ParseOffset(_))
        ));
    }

    #[test]
    fn params_clamp_to_slider_ranges() {
        let p = NoiseParams {
            algorithm: NoiseAlgorithm::Simplex,
            octaves: 99,
            persistence: 0.01,
            frequency_scale: 500.0,
            offset: OffsetSpec::Randomize,
        }
        .clamped();
        assert_eq!(p.octaves, 10);
        assert_eq!(p.persistence, 0.1);
        assert_eq!(p.frequency_scale, 50.0);
    }
}
