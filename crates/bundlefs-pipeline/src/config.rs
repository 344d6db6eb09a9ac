//! Batch configuration.
//!
//! Loaded from TOML by the CLI, or built in code with the `with_*` methods.
//!
//! ```toml
//! base_url = "/work/app"
//! prefix_mode = "path"          # or "substring" for legacy matching
//! optimize_timeout_secs = 120
//!
//! [options]                     # passed through to the optimizer untouched
//! out = "main.js"
//!
//! [[plan]]
//! op = "copy_dir"
//! from = "lib"
//! to = "dist"
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use bundlefs_vfs::{DEFAULT_EXCLUSION, DEFAULT_TEMP_SUFFIX, FsOptions, PathStyle, PrefixMode};

use crate::error::{PipelineError, PipelineResult};
use crate::plan::PlanStep;

/// Configuration for one batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Root directory of the build; artifact paths are relative to it.
    pub base_url: String,

    /// Path convention; defaults to the host's.
    pub path_style: PathStyle,

    /// Directory containment rule for listing and deletion.
    pub prefix_mode: PrefixMode,

    /// Regex hiding paths from listings. `None` hides nothing.
    pub exclusion_pattern: Option<String>,

    /// Staging suffix stripped from written paths.
    pub temp_suffix: String,

    /// Upper bound on the optimize phase. `None` waits forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimize_timeout_secs: Option<u64>,

    /// Optimizer-specific settings, opaque to the adapter.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub options: serde_json::Value,

    /// Steps for the built-in plan optimizer.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plan: Vec<PlanStep>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            base_url: ".".to_string(),
            path_style: PathStyle::native(),
            prefix_mode: PrefixMode::default(),
            exclusion_pattern: Some(DEFAULT_EXCLUSION.to_string()),
            temp_suffix: DEFAULT_TEMP_SUFFIX.to_string(),
            optimize_timeout_secs: None,
            options: serde_json::Value::Null,
            plan: Vec::new(),
        }
    }
}

impl BatchConfig {
    /// Defaults for a batch rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Parse TOML text.
    pub fn from_toml_str(text: &str) -> PipelineResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn with_path_style(mut self, style: PathStyle) -> Self {
        self.path_style = style;
        self
    }

    pub fn with_prefix_mode(mut self, mode: PrefixMode) -> Self {
        self.prefix_mode = mode;
        self
    }

    pub fn with_exclusion_pattern(mut self, pattern: Option<String>) -> Self {
        self.exclusion_pattern = pattern;
        self
    }

    pub fn with_temp_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.temp_suffix = suffix.into();
        self
    }

    pub fn with_optimize_timeout(mut self, timeout: Duration) -> Self {
        self.optimize_timeout_secs = Some(timeout.as_secs().max(1));
        self
    }

    pub fn with_options(mut self, options: serde_json::Value) -> Self {
        self.options = options;
        self
    }

    pub fn with_plan(mut self, plan: Vec<PlanStep>) -> Self {
        self.plan = plan;
        self
    }

    /// Canonical batch root.
    pub fn root(&self) -> String {
        self.path_style.normalize(&self.base_url)
    }

    pub fn optimize_timeout(&self) -> Option<Duration> {
        self.optimize_timeout_secs.map(Duration::from_secs)
    }

    /// Check the fields that can be wrong without touching any files.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(PipelineError::config("base_url must not be empty"));
        }
        if self.optimize_timeout_secs == Some(0) {
            return Err(PipelineError::config("optimize_timeout_secs must be positive"));
        }
        self.exclusion()?;
        Ok(())
    }

    fn exclusion(&self) -> PipelineResult<Option<Regex>> {
        // TOML has no null; an empty pattern turns exclusion off.
        self.exclusion_pattern
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| {
                Regex::new(p)
                    .map_err(|e| PipelineError::config(format!("exclusion_pattern {p:?}: {e}")))
            })
            .transpose()
    }

    /// Filesystem options for this batch's surface.
    pub fn fs_options(&self) -> PipelineResult<FsOptions> {
        Ok(FsOptions::new(self.base_url.clone())
            .with_style(self.path_style)
            .with_prefix_mode(self.prefix_mode)
            .with_exclusion(self.exclusion()?)
            .with_temp_suffix(self.temp_suffix.clone()))
    }
}
