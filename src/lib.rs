pub mod brush;
pub mod config;
pub mod error;
pub mod generator;
pub mod heightmap;
pub mod history;
pub mod mesh;
pub mod noise;
pub mod render;
pub mod rng;
pub mod session;

pub use brush::{BrushEngine, BrushMode, BrushStroke};
pub use config::{NoiseParams, OffsetSpec};
pub use error::EditError;
pub use heightmap::HeightMap;
pub use mesh::MeshGeometry;
pub use noise::{NoiseAlgorithm, NoiseField};
pub use session::{BrushKind, BrushSettings, EditorSession, PointerButton};

/// Wall-clock cost of one pipeline stage, for the CLI and server to
/// report.
pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}
