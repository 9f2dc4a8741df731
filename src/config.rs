//! Pad configuration file (`signing-pad.toml`).
//!
//! Every section is optional; missing values fall back to the stock pad:
//!
//! ```toml
//! [canvas]
//! width = 640
//! height = 240
//!
//! [stroke]
//! color = "#0d3d78"
//! base_thickness = 10.0
//! thickness_multiplier = 1.35
//! variable_thickness = true
//! smoothing = false
//!
//! [export]
//! directory = "exports"
//! pipeline = [{ kind = "desaturate" }, { kind = "extract", threshold = 200 }]
//! ```

use crate::error::{Error, Result};
use crate::filter::FilterPipeline;
use crate::stroke::{StrokeStyle, ThicknessProfile, ToleranceStep};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct PadConfig {
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub stroke: StrokeStyle,
    /// Replaces the built-in thickness table; entries keep their written order.
    #[serde(default)]
    pub profile: Option<Vec<ToleranceStep>>,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CanvasConfig {
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
}

fn default_width() -> usize {
    640
}

fn default_height() -> usize {
    240
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExportConfig {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    /// Applied to the filtered export; defaults to desaturate + extract.
    #[serde(default = "FilterPipeline::signature")]
    pub pipeline: FilterPipeline,
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            pipeline: FilterPipeline::signature(),
        }
    }
}

impl PadConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn thickness_profile(&self) -> ThicknessProfile {
        match &self.profile {
            Some(steps) => ThicknessProfile::new(steps.clone()),
            None => ThicknessProfile::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;
    use crate::types::Rgb;
    use std::io::Write;

    #[test]
    fn empty_file_gives_stock_pad() {
        let config = PadConfig::from_toml_str("").unwrap();
        assert_eq!(config, PadConfig::default());
        assert_eq!(config.stroke, StrokeStyle::default());
        assert_eq!(config.thickness_profile(), ThicknessProfile::default());
        assert_eq!(config.export.pipeline, FilterPipeline::signature());
    }

    #[test]
    fn parses_every_section() {
        let config = PadConfig::from_toml_str(
            r##"
            profile = [{ tolerance = 0.5, width = 2.0 }]

            [canvas]
            width = 300

            [stroke]
            color = "#ff0000"
            variable_thickness = true

            [export]
            pipeline = [
                { kind = "brightness" },
                { kind = "extract", threshold = 0, fill = "#000000" },
            ]
            "##,
        )
        .unwrap();

        assert_eq!(config.canvas.width, 300);
        assert_eq!(config.canvas.height, 240);
        assert_eq!(config.stroke.color, Rgb::new(255, 0, 0));
        assert!(config.stroke.variable_thickness);
        assert_eq!(config.stroke.base_thickness, 10.0);
        assert_eq!(config.thickness_profile().width_for(0.4), Some(2.0));
        assert_eq!(
            config.export.pipeline.stages(),
            &[
                Filter::Brightness { factor: None },
                Filter::Extract {
                    threshold: Some(0),
                    fill: Some(Rgb::new(0, 0, 0)),
                },
            ]
        );
    }

    #[test]
    fn bad_color_is_a_config_error() {
        let err = PadConfig::from_toml_str("[stroke]\ncolor = \"blue\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[stroke]\nsmoothing = true").unwrap();
        let config = PadConfig::load(file.path()).unwrap();
        assert!(config.stroke.smoothing);

        assert!(matches!(
            PadConfig::load(file.path().with_extension("missing")),
            Err(Error::Config(_))
        ));
    }
}
