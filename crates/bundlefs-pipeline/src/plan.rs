//! The plan optimizer: a scripted optimizer driven by config.
//!
//! Runs a fixed list of filesystem steps against the batch. Useful as a
//! stand-in bundler, for simple copy/concat builds, and for exercising the
//! adapter end to end. Step paths are relative to the batch root unless
//! absolute.

use anyhow::Context;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use bundlefs_vfs::{BuildFs, Encoding, FileFilter};

use crate::config::BatchConfig;
use crate::optimizer::{BuildResponse, Optimizer};

fn default_separator() -> String {
    "\n".to_string()
}

/// One scripted filesystem operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PlanStep {
    CopyFile {
        from: String,
        to: String,
        #[serde(default)]
        only_if_newer: bool,
    },
    CopyDir {
        from: String,
        to: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        include: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exclude: Option<String>,
        #[serde(default)]
        only_if_newer: bool,
    },
    Rename {
        from: String,
        to: String,
    },
    Delete {
        path: String,
    },
    /// Prune empty directory markers (defaults to the whole root).
    DeleteEmptyDirs {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },
    Write {
        path: String,
        contents: String,
    },
    /// Join text files into one output, written through a staging name.
    Concat {
        inputs: Vec<String>,
        output: String,
        #[serde(default = "default_separator")]
        separator: String,
    },
    /// Create real directories along `path`.
    MkDir {
        path: String,
    },
}

impl PlanStep {
    /// The step's `op` tag.
    pub fn name(&self) -> &'static str {
        match self {
            PlanStep::CopyFile { .. } => "copy_file",
            PlanStep::CopyDir { .. } => "copy_dir",
            PlanStep::Rename { .. } => "rename",
            PlanStep::Delete { .. } => "delete",
            PlanStep::DeleteEmptyDirs { .. } => "delete_empty_dirs",
            PlanStep::Write { .. } => "write",
            PlanStep::Concat { .. } => "concat",
            PlanStep::MkDir { .. } => "mk_dir",
        }
    }
}

/// Optimizer that replays a [`PlanStep`] list.
#[derive(Debug, Clone, Default)]
pub struct PlanOptimizer {
    steps: Vec<PlanStep>,
}

impl PlanOptimizer {
    pub fn new(steps: Vec<PlanStep>) -> Self {
        Self { steps }
    }

    /// Use the `plan` section of a config.
    pub fn from_config(config: &BatchConfig) -> Self {
        Self::new(config.plan.clone())
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    async fn apply(
        &self,
        step: &PlanStep,
        fs: &dyn BuildFs,
        config: &BatchConfig,
    ) -> anyhow::Result<()> {
        let root = config.root();
        let at = |p: &str| config.path_style.resolve(&root, p);

        match step {
            PlanStep::CopyFile {
                from,
                to,
                only_if_newer,
            } => {
                fs.copy_file(&at(from), &at(to), *only_if_newer)?;
            }
            PlanStep::CopyDir {
                from,
                to,
                include,
                exclude,
                only_if_newer,
            } => {
                let filter = match (include, exclude) {
                    (Some(inc), exc) => Some(FileFilter::new(inc, exc.as_deref())?),
                    (None, Some(exc)) => Some(
                        FileFilter::include(Regex::new(r"\w")?).with_exclude(Regex::new(exc)?),
                    ),
                    (None, None) => None,
                };
                let copied = fs.copy_dir(&at(from), &at(to), filter.as_ref(), *only_if_newer)?;
                debug!(copied = copied.len(), "copy_dir");
            }
            PlanStep::Rename { from, to } => {
                fs.rename_file(&at(from), &at(to))?;
            }
            PlanStep::Delete { path } => {
                fs.delete_file(&at(path))?;
            }
            PlanStep::DeleteEmptyDirs { path } => {
                fs.delete_empty_dirs(&at(path.as_deref().unwrap_or(".")))?;
            }
            PlanStep::Write { path, contents } => {
                fs.save_utf8_file(&at(path), contents)?;
            }
            PlanStep::Concat {
                inputs,
                output,
                separator,
            } => {
                let mut parts = Vec::with_capacity(inputs.len());
                for input in inputs {
                    let text = fs
                        .read_file_async(&at(input), Encoding::Utf8)
                        .await
                        .with_context(|| format!("reading {input}"))?;
                    parts.push(text);
                }
                let staging = format!("{}{}", at(output), config.temp_suffix);
                fs.save_utf8_file(&staging, &parts.join(separator))?;
            }
            PlanStep::MkDir { path } => {
                fs.mk_full_dir(&at(path))?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Optimizer for PlanOptimizer {
    fn name(&self) -> &str {
        "plan"
    }

    #[tracing::instrument(skip_all, name = "optimizer.plan", fields(steps = self.steps.len()))]
    async fn optimize(
        &self,
        config: &BatchConfig,
        fs: Arc<dyn BuildFs>,
    ) -> anyhow::Result<BuildResponse> {
        for (i, step) in self.steps.iter().enumerate() {
            debug!(step = i + 1, op = step.name(), "running plan step");
            self.apply(step, fs.as_ref(), config)
                .await
                .with_context(|| format!("plan step {} ({})", i + 1, step.name()))?;
        }
        Ok(BuildResponse::new(format!(
            "ran {} plan step(s)",
            self.steps.len()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundlefs_vfs::{MemoryFs, PathStyle, VirtualFile, VirtualFileStore};

    fn config() -> BatchConfig {
        BatchConfig::new("/proj").with_path_style(PathStyle::Posix)
    }

    fn surface(config: &BatchConfig, files: &[(&str, &str)]) -> Arc<MemoryFs> {
        let mut store = VirtualFileStore::new();
        for (path, contents) in files {
            store.insert(VirtualFile::new(*path, *contents));
        }
        Arc::new(MemoryFs::new(store, config.fs_options().unwrap()))
    }

    async fn run(
        plan: Vec<PlanStep>,
        fs: &Arc<MemoryFs>,
        config: &BatchConfig,
    ) -> anyhow::Result<BuildResponse> {
        PlanOptimizer::new(plan).optimize(config, fs.clone()).await
    }

    #[tokio::test]
    async fn test_concat_writes_through_staging() {
        let config = config();
        let fs = surface(&config, &[("/proj/a.js", "var a;"), ("/proj/lib/b.js", "var b;")]);
        let plan = vec![PlanStep::Concat {
            inputs: vec!["a.js".into(), "lib/b.js".into()],
            output: "dist/main.js".into(),
            separator: default_separator(),
        }];
        let response = run(plan, &fs, &config).await.unwrap();
        assert_eq!(response.summary, "ran 1 plan step(s)");
        assert_eq!(
            fs.read_file("/proj/dist/main.js", Encoding::Utf8).unwrap(),
            "var a;\nvar b;"
        );
        assert!(!fs.exists("/proj/dist/main.js-temp"));
    }

    #[tokio::test]
    async fn test_copy_rename_delete() {
        let config = config();
        let fs = surface(&config, &[("/proj/a.js", "A"), ("/proj/lib/b.js", "B")]);
        let plan = vec![
            PlanStep::CopyDir {
                from: "lib".into(),
                to: "dist".into(),
                include: None,
                exclude: None,
                only_if_newer: false,
            },
            PlanStep::Rename {
                from: "a.js".into(),
                to: "dist/a.js".into(),
            },
            PlanStep::Delete { path: "lib".into() },
            PlanStep::Write {
                path: "dist/VERSION".into(),
                contents: "1".into(),
            },
        ];
        run(plan, &fs, &config).await.unwrap();
        assert!(fs.exists("/proj/dist/b.js"));
        assert!(fs.exists("/proj/dist/a.js"));
        assert!(!fs.exists("/proj/a.js"));
        assert!(!fs.exists("/proj/lib/b.js"));
        assert_eq!(fs.read_file("/proj/dist/VERSION", Encoding::Utf8).unwrap(), "1");
    }

    #[tokio::test]
    async fn test_copy_dir_exclude_only() {
        let config = config();
        let fs = surface(&config, &[("/proj/lib/b.js", "B"), ("/proj/lib/b.min.js", "M")]);
        let plan = vec![PlanStep::CopyDir {
            from: "lib".into(),
            to: "dist".into(),
            include: None,
            exclude: Some(r"\.min\.js$".into()),
            only_if_newer: false,
        }];
        run(plan, &fs, &config).await.unwrap();
        assert!(fs.exists("/proj/dist/b.js"));
        assert!(!fs.exists("/proj/dist/b.min.js"));
    }

    #[tokio::test]
    async fn test_failing_step_names_itself() {
        let config = config();
        let fs = surface(&config, &[]);
        let plan = vec![PlanStep::Rename {
            from: "missing.js".into(),
            to: "x.js".into(),
        }];
        let err = run(plan, &fs, &config).await.unwrap_err();
        assert!(format!("{err:#}").contains("plan step 1 (rename)"));
        assert!(format!("{err:#}").contains("not found: /proj/missing.js"));
    }

    #[test]
    fn test_step_names_match_tags() {
        let step: PlanStep = toml::from_str("op = \"delete_empty_dirs\"").unwrap();
        assert_eq!(step.name(), "delete_empty_dirs");
        assert_eq!(step, PlanStep::DeleteEmptyDirs { path: None });

        let step: PlanStep =
            toml::from_str("op = \"concat\"\ninputs = [\"a.js\"]\noutput = \"out.js\"").unwrap();
        assert_eq!(step.name(), "concat");
        assert!(matches!(step, PlanStep::Concat { ref separator, .. } if separator == "\n"));
    }
}
