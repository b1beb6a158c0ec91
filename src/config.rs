//! JSON configuration for a pipeline run.
//!
//! Every field is optional; missing fields take the defaults of the
//! reference pipeline (average grayscale, cutoff 128, `A = 0`, `B = 1/4`).
//! A `preset` selects one of the named filter variants and explicit `sobel`
//! fields are applied on top of it.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grayscale::GrayscaleWeights;
use crate::sobel_filter::{BorderPolicy, CombineMode, FilterParams, FilterPreset};
use crate::thresholding::DEFAULT_CUTOFF;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub grayscale: GrayscaleWeights,
    pub threshold: i32,
    pub preset: FilterPreset,
    pub sobel: SobelOverrides,
    /// Worker threads for the Sobel stage; `None` uses every available core.
    pub parallelity: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            grayscale: GrayscaleWeights::default(),
            threshold: DEFAULT_CUTOFF,
            preset: FilterPreset::default(),
            sobel: SobelOverrides::default(),
            parallelity: None,
        }
    }
}

/// Individual filter settings that replace the preset's values when present.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SobelOverrides {
    pub gain: Option<f64>,
    pub offset: Option<f64>,
    pub combine: Option<CombineMode>,
    pub border: Option<BorderPolicy>,
}

/// Values given on the command line; each one present wins over the file.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct CommandLineOverrides {
    pub threshold: Option<i32>,
    pub preset: Option<FilterPreset>,
    pub grayscale: Option<GrayscaleWeights>,
    pub gain: Option<f64>,
    pub offset: Option<f64>,
    pub parallelity: Option<usize>,
}

impl PipelineConfig {
    pub fn with_overrides(mut self, overrides: &CommandLineOverrides) -> Self {
        if let Some(threshold) = overrides.threshold {
            self.threshold = threshold;
        }
        if let Some(preset) = overrides.preset {
            self.preset = preset;
        }
        if let Some(grayscale) = overrides.grayscale {
            self.grayscale = grayscale;
        }
        if overrides.gain.is_some() {
            self.sobel.gain = overrides.gain;
        }
        if overrides.offset.is_some() {
            self.sobel.offset = overrides.offset;
        }
        if overrides.parallelity.is_some() {
            self.parallelity = overrides.parallelity;
        }
        return self;
    }

    /// Filter parameters after applying the overrides to the preset.
    pub fn filter_params(&self) -> FilterParams {
        let mut params = self.preset.params();
        if let Some(gain) = self.sobel.gain {
            params.gain = gain;
        }
        if let Some(offset) = self.sobel.offset {
            params.offset = offset;
        }
        if let Some(combine) = self.sobel.combine {
            params.combine = combine;
        }
        if let Some(border) = self.sobel.border {
            params.border = border;
        }
        return params;
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.filter_params().validate()?;
        return Ok(());
    }
}

pub fn load_config(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let data = fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    let config: PipelineConfig = serde_json::from_str(&data)
        .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
    config.validate()?;
    return Ok(config);
}
