//! JSON configuration, detector payloads and scan reports.

use std::fs;
use std::path::{Path, PathBuf};

use fen_vision_core::{FilterCounts, Size};
use fen_vision_position::{
    Collision, FilterParams, KingTargets, PieceDetection, SynthesisParams, ValidationResult,
};
use fen_vision_region::{BoardCandidate, BoardRegion, RegionParams};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::scanner::{PositionReport, ScanParams};

#[derive(thiserror::Error, Debug)]
pub enum ConfigIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigIoError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn write_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// Configuration for an offline scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub detections_path: Option<String>,
    #[serde(default)]
    pub output_path: Option<String>,
    /// Start from [`ScanParams::live`] instead of the still-photo defaults.
    #[serde(default)]
    pub live: bool,
    #[serde(default)]
    pub max_long_side: Option<u32>,
    #[serde(default)]
    pub region: Option<RegionParams>,
    #[serde(default)]
    pub filter: Option<FilterParams>,
    #[serde(default)]
    pub synthesis: Option<SynthesisParams>,
}

impl ScanConfig {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        read_json(path)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        write_json(self, path)
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("fen_vision_report.json"))
    }

    /// Pipeline parameters with the config's overrides applied.
    pub fn build_params(&self) -> ScanParams {
        let mut params = if self.live {
            ScanParams::live()
        } else {
            ScanParams::default()
        };
        if let Some(side) = self.max_long_side {
            params.max_long_side = Some(side);
        }
        if let Some(region) = self.region.clone() {
            params.region = region;
        }
        if let Some(filter) = self.filter.clone() {
            params.filter = filter;
        }
        if let Some(synthesis) = self.synthesis.clone() {
            params.synthesis = synthesis;
        }
        params
    }
}

/// Frame size the detector reported its coordinates in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameInfo {
    pub width: f32,
    pub height: f32,
}

/// Boxes that can be rescaled from the detector's frame into ours.
pub trait Rescale {
    fn rescaled(&self, sx: f32, sy: f32) -> Self;
}

impl Rescale for PieceDetection {
    fn rescaled(&self, sx: f32, sy: f32) -> Self {
        Self {
            x: self.x * sx,
            y: self.y * sy,
            width: self.width * sx,
            height: self.height * sy,
            ..self.clone()
        }
    }
}

impl Rescale for BoardCandidate {
    fn rescaled(&self, sx: f32, sy: f32) -> Self {
        Self {
            x: self.x * sx,
            y: self.y * sy,
            width: self.width * sx,
            height: self.height * sy,
            ..*self
        }
    }
}

/// Hosted object-detection response: `{"predictions": [...], "image": {...}}`.
///
/// Unknown fields are ignored, so raw detector payloads deserialize as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionBatch<T> {
    pub predictions: Vec<T>,
    #[serde(default)]
    pub image: Option<FrameInfo>,
}

impl<T: DeserializeOwned> DetectionBatch<T> {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        read_json(path)
    }
}

impl<T: Rescale> DetectionBatch<T> {
    /// Side assumed for the detector frame when the payload omits it.
    pub const FALLBACK_FRAME_SIDE: f32 = 800.0;

    /// Predictions mapped into a frame of size `target`.
    pub fn scaled_to(&self, target: Size) -> Vec<T> {
        let frame = self.image.unwrap_or(FrameInfo {
            width: Self::FALLBACK_FRAME_SIDE,
            height: Self::FALLBACK_FRAME_SIDE,
        });
        let sx = target.width / frame.width.max(1.0);
        let sy = target.height / frame.height.max(1.0);
        self.predictions.iter().map(|p| p.rescaled(sx, sy)).collect()
    }
}

/// Serialized outcome of a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    #[serde(default)]
    pub config_path: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub detections_path: Option<String>,
    pub num_detections: usize,
    #[serde(default)]
    pub region: Option<BoardRegion>,
    #[serde(default)]
    pub fen: Option<String>,
    #[serde(default)]
    pub validation: Option<ValidationResult>,
    #[serde(default)]
    pub filter: Option<FilterCounts>,
    #[serde(default)]
    pub collisions: Vec<Collision>,
    #[serde(default)]
    pub king_targets: Option<KingTargets>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ScanReport {
    pub fn new(cfg: &ScanConfig, config_path: Option<&Path>, num_detections: usize) -> Self {
        Self {
            config_path: config_path.map(|p| p.to_string_lossy().into_owned()),
            image_path: cfg.image_path.clone(),
            detections_path: cfg.detections_path.clone(),
            num_detections,
            region: None,
            fen: None,
            validation: None,
            filter: None,
            collisions: Vec::new(),
            king_targets: None,
            error: None,
        }
    }

    pub fn set_position(&mut self, report: &PositionReport) {
        self.fen = Some(report.fen.clone());
        self.validation = Some(report.validation.clone());
        self.filter = Some(report.filter);
        self.collisions = report.collisions.clone();
        self.king_targets = Some(report.king_targets);
        self.error = None;
    }

    pub fn set_error(&mut self, err: impl std::fmt::Display) {
        self.error = Some(err.to_string());
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        read_json(path)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        write_json(self, path)
    }
}
