//! JSON configuration of the `sprite-splitter` command-line tool.
//!
//! ```json
//! {
//!   "input": "sheet.png",
//!   "detector": { "expected_count": 5 },
//!   "extraction": { "mode": "surgical" },
//!   "output": { "dir": "out/" }
//! }
//! ```
//! Every section except `input` and `output.dir` may be omitted.
use crate::detector::DetectorParams;
use crate::error::{Result, SpriteError};
use crate::extract::ExtractionOptions;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct SplitterConfig {
    pub input: PathBuf,
    #[serde(default)]
    pub detector: DetectorParams,
    #[serde(default)]
    pub extraction: ExtractionOptions,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Cutout PNGs are written here as `<layer id>.png`.
    pub dir: PathBuf,
    /// Summary JSON path; defaults to `<dir>/summary.json`.
    #[serde(default)]
    pub summary_json: Option<PathBuf>,
    /// Also dump the detector foreground mask as `<dir>/mask.png`.
    #[serde(default)]
    pub save_mask: bool,
}

impl OutputConfig {
    pub fn summary_path(&self) -> PathBuf {
        self.summary_json
            .clone()
            .unwrap_or_else(|| self.dir.join("summary.json"))
    }
}

pub fn parse_config(text: &str) -> Result<SplitterConfig> {
    serde_json::from_str(text).map_err(|e| SpriteError::Config(e.to_string()))
}

pub fn load_config(path: &Path) -> Result<SplitterConfig> {
    let data = fs::read_to_string(path).map_err(|source| SpriteError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&data).map_err(|e| match e {
        SpriteError::Config(msg) => SpriteError::Config(format!("{}: {msg}", path.display())),
        other => other,
    })
}
