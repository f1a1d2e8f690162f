//! Parameter sets for the interactive programs, loadable from JSON.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Load a JSON parameter file. Missing fields take their defaults when the
/// type is `#[serde(default)]`.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load `path` when one was given, otherwise use the default parameters.
pub fn load_or_default<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T, ConfigError> {
    match path {
        Some(path) => load_json(path),
        None => Ok(T::default()),
    }
}

/// Settings of the interactive Canny explorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeParams {
    /// Slider positions run from 0 to this value
    pub slider_count: u32,
    /// Initial position of the low threshold slider
    pub low: u32,
    /// Initial position of the high threshold slider
    pub high: u32,
    /// Slider movement per arrow key press
    pub key_step: u32,
    /// Horizontal gap between the three panels
    pub panel_gap: usize,
    /// Grey level (0 to 1) behind the panels
    pub background: f32,
    pub blur_ksize: usize,
    pub blur_sigma: f32,
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            slider_count: 256,
            low: 64,
            high: 128,
            key_step: 8,
            panel_gap: 10,
            background: 0.5,
            blur_ksize: 3,
            blur_sigma: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::image_proc::CartoonParams;
    use tempfile::TempDir;

    #[test]
    fn test_edge_defaults() {
        let params = EdgeParams::default();
        assert_eq!(params.low, params.slider_count / 4);
        assert_eq!(params.high, params.slider_count / 2);
    }

    #[test]
    fn test_load_partial_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("edges.json");
        std::fs::write(&path, r#"{ "low": 10, "high": 200 }"#).unwrap();
        let params: EdgeParams = load_json(&path).unwrap();
        assert_eq!(params.low, 10);
        assert_eq!(params.high, 200);
        assert_eq!(params.panel_gap, 10);
    }

    #[test]
    fn test_load_cartoon_params() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cartoon.json");
        std::fs::write(&path, r#"{ "bilateral_iterations": 2 }"#).unwrap();
        let params: CartoonParams = load_or_default(Some(&path)).unwrap();
        assert_eq!(params.bilateral_iterations, 2);
        let defaults: CartoonParams = load_or_default(None).unwrap();
        assert_eq!(defaults, CartoonParams::default());
    }

    #[test]
    fn test_load_errors() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            load_json::<EdgeParams>(&missing),
            Err(ConfigError::Read { .. })
        ));
        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(
            load_json::<EdgeParams>(&bad),
            Err(ConfigError::Parse { .. })
        ));
    }
}
