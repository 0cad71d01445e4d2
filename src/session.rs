//! Editing session: owns the live grid, the history stack, and the brush
//! engine, and enforces the stroke contract (one undo snapshot per drag,
//! fill applied on press only).

use tracing::warn;

use crate::brush::{BrushEngine, BrushMode, BrushStroke, LOWER_TARGET, RAISE_TARGET};
use crate::config::{NoiseParams, OffsetSpec};
use crate::error::EditError;
use crate::generator;
use crate::heightmap::HeightMap;
use crate::history::History;
use crate::mesh::{self, MeshGeometry};
use crate::noise::NoiseField;
use crate::rng::Rng;

/// Which button started the stroke; only raise/lower cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Brush selector as configured in the toolbar, before stroke-start
/// payload capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrushKind {
    RaiseLower,
    Smooth,
    Flatten,
    NoiseInject,
    Fill { value: u8 },
}

#[derive(Clone, Copy, Debug)]
pub struct BrushSettings {
    pub kind: BrushKind,
    pub radius: u32,
    pub intensity: Option<u8>,
}

pub struct EditorSession {
    map: Option<HeightMap>,
    history: History,
    brush: BrushEngine,
    rng: Rng,
    active_stroke: Option<BrushStroke>,
}

impl EditorSession {
    /// All randomness (permutation shuffle, offset draws) derives from
    /// this seed, so a session replays identically.
    pub fn new(seed: u64) -> Self {
        let mut rng = Rng::new(seed);
        let field = NoiseField::from_seed(rng.next_u64());
        Self {
            map: None,
            history: History::default(),
            brush: BrushEngine::new(field),
            rng,
            active_stroke: None,
        }
    }

    pub fn map(&self) -> Option<&HeightMap> {
        self.map.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// The offset currently carried by the shared noise field.
    pub fn noise_offset(&self) -> f64 {
        self.brush.noise().frequency_offset
    }

    /// Create a fresh map (invalid sizes corrected to the default) and
    /// drop any history from the previous map.
    pub fn create_map(&mut self, w: usize, h: usize) -> &HeightMap {
        self.history.clear();
        self.active_stroke = None;
        self.map.insert(HeightMap::new(w, h))
    }

    /// Start a drag: snapshot once, capture the mode payload, stamp the
    /// press position. Fill runs its whole flood here and never again
    /// during the drag.
    pub fn begin_stroke(
        &mut self,
        settings: &BrushSettings,
        cx: usize,
        cy: usize,
        button: PointerButton,
    ) -> Result<(), EditError> {
        let map = self.map.as_mut().ok_or(EditError::EmptyState)?;
        self.history.checkpoint(map);

        let mode = match settings.kind {
            BrushKind::RaiseLower => BrushMode::RaiseLower {
                target: match button {
                    PointerButton::Primary => RAISE_TARGET,
                    PointerButton::Secondary => LOWER_TARGET,
                },
            },
            BrushKind::Smooth => BrushMode::Smooth,
            BrushKind::Flatten => BrushMode::Flatten {
                height: map.get(cx, cy),
            },
            BrushKind::NoiseInject => BrushMode::NoiseInject,
            BrushKind::Fill { value } => BrushMode::Fill { value },
        };

        let stroke = BrushStroke {
            mode,
            radius: settings.radius,
            intensity: settings.intensity,
        };
        self.brush.apply(map, &stroke, cx, cy);
        self.active_stroke = Some(stroke);
        Ok(())
    }

    /// Pointer moved mid-drag. No further snapshots; fill is a discrete
    /// edit and does not repeat.
    pub fn continue_stroke(&mut self, cx: usize, cy: usize) -> Result<(), EditError> {
        let Some(stroke) = self.active_stroke else {
            return Ok(());
        };
        if matches!(stroke.mode, BrushMode::Fill { .. }) {
            return Ok(());
        }
        let map = self.map.as_mut().ok_or(EditError::EmptyState)?;
        self.brush.apply(map, &stroke, cx, cy);
        Ok(())
    }

    pub fn end_stroke(&mut self) {
        self.active_stroke = None;
    }

    /// Whole-grid regeneration. Records one history entry, resolves the
    /// offset request, then replaces every cell.
    pub fn generate(&mut self, params: &NoiseParams) -> Result<(), EditError> {
        let map = self.map.as_mut().ok_or(EditError::EmptyState)?;

        match params.offset {
            OffsetSpec::Randomize => {
                let seed = self.rng.next_u64();
                *self.brush.noise_mut() = NoiseField::from_seed(seed);
            }
            OffsetSpec::Explicit(v) => {
                self.brush.noise_mut().frequency_offset = v;
            }
        }

        self.history.checkpoint(map);
        generator::generate(map, self.brush.noise(), params);
        Ok(())
    }

    pub fn undo(&mut self) -> Result<(), EditError> {
        let map = self.map.as_mut().ok_or(EditError::EmptyState)?;
        if self.history.undo(map) {
            Ok(())
        } else {
            Err(EditError::NothingToUndo)
        }
    }

    pub fn redo(&mut self) -> Result<(), EditError> {
        let map = self.map.as_mut().ok_or(EditError::EmptyState)?;
        if self.history.redo(map) {
            Ok(())
        } else {
            Err(EditError::NothingToRedo)
        }
    }

    pub fn mesh(&self) -> Result<MeshGeometry, EditError> {
        let map = self.map.as_ref().ok_or(EditError::EmptyState)?;
        Ok(mesh::project(map))
    }

    pub fn water_mesh(&self, level: f32) -> Result<MeshGeometry, EditError> {
        let map = self.map.as_ref().ok_or(EditError::EmptyState)?;
        Ok(mesh::water_mesh(map, level))
    }

    pub fn export_obj(&self) -> Result<String, EditError> {
        Ok(mesh::encode_obj(&self.mesh()?))
    }

    pub fn export_stl(&self) -> Result<String, EditError> {
        Ok(mesh::encode_stl(&self.mesh()?))
    }

    /// Replace the session's map with one imported from OBJ/STL text.
    /// On failure the current map is untouched. Returns the derived
    /// dimensions.
    pub fn import(&mut self, text: &str) -> Result<(usize, usize), EditError> {
        let map = mesh::import_point_cloud(text)?;
        let dims = (map.width(), map.height());
        self.map = Some(map);
        self.history.clear();
        self.active_stroke = None;
        Ok(dims)
    }
}

/// Parse the offset text field, falling back to a randomized offset on
/// malformed input (reported, non-fatal).
pub fn offset_from_text(text: &str) -> OffsetSpec {
    match OffsetSpec::parse(text) {
        Ok(spec) => spec,
        Err(err) => {
            warn!("{err}");
            OffsetSpec::Randomize
        }
    }
}
