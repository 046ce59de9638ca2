//! Piece catalog - shape/color templates loaded from a definition file
//!
//! The definition file is a JSON array of records:
//!
//! ```json
//! [
//!   { "color": [0, 255, 255], "layout": [[1, 1, 1, 1]] },
//!   { "color": [255, 255, 0], "layout": [[1, 1], [1, 1]] }
//! ]
//! ```
//!
//! A catalog is never empty: loading zero templates is an error, so a session
//! built from a [`Catalog`] can always draw a piece.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::piece::{Piece, Shape};
use crate::rng::SimpleRng;
use crate::types::Rgb;

/// Built-in definitions (the seven classic tetrominoes).
pub const STANDARD_BLOCKS: &str = include_str!("../../../assets/blocks.json");

/// Catalog load failure
#[derive(Debug, Error)]
pub enum DataFormatError {
    #[error("cannot read piece definitions from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed piece definitions: {0}")]
    Json(#[from] serde_json::Error),

    #[error("piece definitions contain no pieces")]
    Empty,

    #[error("piece #{index}: {reason}")]
    InvalidLayout { index: usize, reason: &'static str },

    #[error("catalog was not loaded from a file and cannot be reloaded")]
    NoSource,
}

/// One record of the definition file
#[derive(Debug, Deserialize)]
struct BlockRecord {
    #[serde(alias = "Color")]
    color: Rgb,
    #[serde(alias = "Layout")]
    layout: Vec<Vec<u8>>,
}

/// Immutable shape + color template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceTemplate {
    shape: Shape,
    color: Rgb,
}

impl PieceTemplate {
    pub fn new(shape: Shape, color: Rgb) -> Self {
        Self { shape, color }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    /// New piece at the spawn position with rotation 0
    pub fn spawn(&self) -> Piece {
        Piece::spawned(self.shape.clone(), self.color)
    }

    fn from_record(index: usize, record: BlockRecord) -> Result<Self, DataFormatError> {
        let invalid = |reason| DataFormatError::InvalidLayout { index, reason };

        let rows = record.layout.len();
        let cols = record.layout.first().map_or(0, |r| r.len());
        if rows == 0 || cols == 0 {
            return Err(invalid("layout is empty"));
        }
        if record.layout.iter().any(|r| r.len() != cols) {
            return Err(invalid("layout rows differ in length"));
        }

        let mut cells = Vec::with_capacity(rows * cols);
        for &value in record.layout.iter().flatten() {
            match value {
                0 => cells.push(false),
                1 => cells.push(true),
                _ => return Err(invalid("layout values must be 0 or 1")),
            }
        }
        if !cells.iter().any(|c| *c) {
            return Err(invalid("layout has no occupied cells"));
        }

        Ok(Self::new(Shape::from_cells(rows, cols, cells), record.color))
    }
}

/// Non-empty set of piece templates
#[derive(Debug, Clone)]
pub struct Catalog {
    templates: Vec<PieceTemplate>,
    source: Option<PathBuf>,
}

impl Catalog {
    /// Load definitions from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataFormatError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| DataFormatError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut catalog = Self::from_json_str(&text)?;
        catalog.source = Some(path.to_path_buf());
        info!(path = %path.display(), pieces = catalog.len(), "loaded piece catalog");
        Ok(catalog)
    }

    /// Parse definitions from JSON text
    pub fn from_json_str(text: &str) -> Result<Self, DataFormatError> {
        let records: Vec<BlockRecord> = serde_json::from_str(text)?;
        let templates = records
            .into_iter()
            .enumerate()
            .map(|(i, record)| PieceTemplate::from_record(i, record))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_templates(templates)
    }

    /// Build from templates, rejecting an empty set
    pub fn from_templates(templates: Vec<PieceTemplate>) -> Result<Self, DataFormatError> {
        if templates.is_empty() {
            return Err(DataFormatError::Empty);
        }
        debug!(pieces = templates.len(), "catalog built");
        Ok(Self {
            templates,
            source: None,
        })
    }

    /// The seven classic tetrominoes
    pub fn standard() -> Result<Self, DataFormatError> {
        Self::from_json_str(STANDARD_BLOCKS)
    }

    /// Re-read the file this catalog came from.
    ///
    /// Returns a replacement; `self` is left untouched so a failed reload can
    /// keep using it.
    pub fn reload(&self) -> Result<Self, DataFormatError> {
        match &self.source {
            Some(path) => Self::load(path),
            None => Err(DataFormatError::NoSource),
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn templates(&self) -> &[PieceTemplate] {
        &self.templates
    }

    /// Uniform random template
    pub fn random_template(&self, rng: &mut SimpleRng) -> &PieceTemplate {
        &self.templates[rng.next_index(self.templates.len())]
    }

    /// Uniform random template, spawned
    pub fn spawn_random(&self, rng: &mut SimpleRng) -> Piece {
        self.random_template(rng).spawn()
    }
}
