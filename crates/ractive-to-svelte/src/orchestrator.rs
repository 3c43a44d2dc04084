//! Main orchestration logic.

use crate::cli::Args;
use crate::config::{ConfigError, ConvertConfig};
use crate::output::{ConvertedUnit, Formatter, RunReport, Stage, UnitFailure};
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ractive_transformer::{
    output_file_name, store_module, transform, RuleError, RuleSet, TransformOptions,
    TransformResult, UnitKind,
};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Orchestration errors. Each of these aborts the run.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Rule tables could not be loaded.
    #[error("failed to load rules: {0}")]
    Rules(#[from] RuleError),

    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// The source directory does not exist.
    #[error("source directory not found: {0}")]
    MissingSource(Utf8PathBuf),

    /// The source tree could not be enumerated.
    #[error("failed to enumerate {path}: {message}")]
    Enumerate {
        /// The directory being walked.
        path: Utf8PathBuf,
        /// What happened.
        message: String,
    },

    /// A background task panicked or was cancelled.
    #[error("task failed: {0}")]
    Task(String),
}

/// A unit found under the source directory.
#[derive(Debug, Clone)]
struct SourceUnit {
    /// Absolute path.
    path: Utf8PathBuf,
    /// Path relative to the source directory.
    relative: Utf8PathBuf,
    /// Base name without the matched extension.
    stem: String,
    kind: UnitKind,
}

impl SourceUnit {
    /// Where the converted unit is written.
    fn output_path(&self, output_root: &Utf8Path) -> Utf8PathBuf {
        let dir = self.relative.parent().unwrap_or(Utf8Path::new(""));
        output_root
            .join(dir)
            .join(output_file_name(&self.stem, self.kind))
    }
}

/// Runs a conversion and prints its report.
pub async fn run(args: Args) -> Result<RunReport, ConvertError> {
    let workspace = if args.workspace.is_relative() {
        std::env::current_dir()
            .map(|p| Utf8PathBuf::try_from(p).unwrap_or_default())
            .unwrap_or_default()
            .join(&args.workspace)
    } else {
        args.workspace.clone()
    };

    let config = ConvertConfig::load(&workspace, args.config.as_deref())?;
    let rules = match args.rules.as_ref().or(config.rules.as_ref()) {
        Some(path) => RuleSet::load(workspace.join(path).as_std_path())?,
        None => RuleSet::builtin()?,
    };
    let rules = Arc::new(rules);

    let skip_set = build_skip_set(config.skip.iter().chain(&args.skip))?;
    let source_root = workspace.join(&config.source_dir);
    let output_root = workspace.join(&config.output_dir);

    let units = discover(&workspace, &source_root, &output_root, &config, &skip_set)?;
    let templates = units
        .iter()
        .filter(|unit| unit.kind == UnitKind::Template)
        .count();
    info!("Processing {} template files", templates);
    info!("Processing {} script files", units.len() - templates);

    let mut report = RunReport {
        dry_run: args.dry_run,
        ..RunReport::default()
    };
    let display = |path: &Utf8Path| -> String {
        path.strip_prefix(&workspace).unwrap_or(path).to_string()
    };

    // Read
    let mut reads = JoinSet::new();
    for unit in units {
        reads.spawn(async move {
            let source = tokio::fs::read_to_string(&unit.path).await;
            (unit, source)
        });
    }
    let mut loaded = Vec::new();
    while let Some(joined) = reads.join_next().await {
        let (unit, source) = joined.map_err(|e| ConvertError::Task(e.to_string()))?;
        match source {
            Ok(source) => loaded.push((unit, source)),
            Err(e) => {
                warn!(path = %unit.path, error = %e, "failed to read");
                report.failures.push(UnitFailure {
                    path: display(&unit.path),
                    stage: Stage::Read,
                    message: e.to_string(),
                });
            }
        }
    }

    // Transform
    let transform_rules = Arc::clone(&rules);
    let transformed: Vec<(SourceUnit, TransformResult)> = tokio::task::spawn_blocking(move || {
        loaded
            .into_par_iter()
            .map(|(unit, source)| {
                let options = TransformOptions {
                    kind: unit.kind,
                    filename: Some(unit.relative.to_string()),
                };
                let result = transform(&source, &transform_rules, options);
                (unit, result)
            })
            .collect()
    })
    .await
    .map_err(|e| ConvertError::Task(e.to_string()))?;

    // Write
    let mut shared_keys = BTreeSet::new();
    let mut writes = JoinSet::new();
    for (unit, result) in transformed {
        shared_keys.extend(result.shared_keys.iter().map(|key| key.to_string()));
        for warning in &result.warnings {
            warn!(path = %unit.relative, "{}", warning);
        }

        let output = unit.output_path(&output_root);
        let converted = ConvertedUnit {
            source: display(&unit.path),
            output: display(&output),
            kind: unit.kind,
            warnings: result.warnings,
            follow_ups: result.follow_ups,
        };
        let dry_run = args.dry_run;
        let code = result.code;
        writes.spawn(async move {
            let written = if dry_run {
                Ok(())
            } else {
                write_file(&output, &code).await
            };
            (converted, written)
        });
    }
    while let Some(joined) = writes.join_next().await {
        let (converted, written) = joined.map_err(|e| ConvertError::Task(e.to_string()))?;
        match written {
            Ok(()) => report.converted.push(converted),
            Err(e) => {
                warn!(path = %converted.output, error = %e, "failed to write");
                report.failures.push(UnitFailure {
                    path: converted.output,
                    stage: Stage::Write,
                    message: e.to_string(),
                });
            }
        }
    }
    report.converted.sort_by(|a, b| a.source.cmp(&b.source));
    report.failures.sort_by(|a, b| a.path.cmp(&b.path));

    // Stores
    if !shared_keys.is_empty() {
        info!(
            "Creating stores: {}",
            shared_keys.iter().cloned().collect::<Vec<_>>().join(", ")
        );
    }
    for key in &shared_keys {
        let module = store_module(key, &rules);
        let path = output_root.join(&module.path);
        if !args.dry_run {
            if let Err(e) = write_file(&path, &module.source).await {
                warn!(path = %path, error = %e, "failed to write store");
                report.failures.push(UnitFailure {
                    path: display(&path),
                    stage: Stage::Write,
                    message: e.to_string(),
                });
                continue;
            }
        }
        report.stores.push(display(&path));
    }

    println!("{}", Formatter::new(args.output).format(&report));
    info!("Complete");
    Ok(report)
}

/// Builds the skip set from configured and command-line patterns.
fn build_skip_set<'a>(patterns: impl Iterator<Item = &'a String>) -> Result<GlobSet, ConvertError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| ConvertError::InvalidGlob(e.to_string()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| ConvertError::InvalidGlob(e.to_string()))
}

/// Finds the units under `source_root`, in path order.
fn discover(
    workspace: &Utf8Path,
    source_root: &Utf8Path,
    output_root: &Utf8Path,
    config: &ConvertConfig,
    skip_set: &GlobSet,
) -> Result<Vec<SourceUnit>, ConvertError> {
    if !source_root.is_dir() {
        return Err(ConvertError::MissingSource(source_root.to_owned()));
    }

    let mut units = Vec::new();
    for entry in WalkDir::new(source_root).sort_by_file_name() {
        let entry = entry.map_err(|e| ConvertError::Enumerate {
            path: source_root.to_owned(),
            message: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(path) = Utf8PathBuf::try_from(entry.into_path()) else {
            continue;
        };
        if path.starts_with(output_root) {
            continue;
        }
        let Some((kind, stem)) = config.classify(path.file_name().unwrap_or("")) else {
            continue;
        };

        let relative_to_workspace = path.strip_prefix(workspace).unwrap_or(&path);
        if skip_set.is_match(relative_to_workspace.as_str()) {
            debug!(path = %relative_to_workspace, "skipped");
            continue;
        }

        let relative = path
            .strip_prefix(source_root)
            .map(Utf8Path::to_owned)
            .unwrap_or_else(|_| path.clone());
        units.push(SourceUnit {
            stem: stem.to_string(),
            path,
            relative,
            kind,
        });
    }
    Ok(units)
}

/// Writes `contents` to `path`, creating parent directories first.
async fn write_file(path: &Utf8Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_output_path() {
        let unit = SourceUnit {
            path: Utf8PathBuf::from("/w/client/js/fields/input-text.html"),
            relative: Utf8PathBuf::from("fields/input-text.html"),
            stem: "input-text".to_string(),
            kind: UnitKind::Template,
        };
        assert_eq!(
            unit.output_path(Utf8Path::new("/w/out")),
            Utf8PathBuf::from("/w/out/fields/InputText.svelte")
        );
    }

    #[test]
    fn test_skip_set() {
        let patterns = vec!["client/js/legacy/**".to_string()];
        let set = build_skip_set(patterns.iter()).unwrap();
        assert!(set.is_match("client/js/legacy/old.html"));
        assert!(!set.is_match("client/js/app.html"));
    }

    #[test]
    fn test_invalid_glob() {
        let patterns = vec!["client/[js".to_string()];
        assert!(matches!(
            build_skip_set(patterns.iter()),
            Err(ConvertError::InvalidGlob(_))
        ));
    }

    #[test]
    fn test_discover_classifies_and_skips() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Utf8Path::from_path(dir.path()).unwrap();
        let source_root = workspace.join("client/js");
        std::fs::create_dir_all(source_root.join("legacy")).unwrap();
        std::fs::write(source_root.join("card.html"), "<p/>").unwrap();
        std::fs::write(source_root.join("api.js"), "").unwrap();
        std::fs::write(source_root.join("notes.md"), "").unwrap();
        std::fs::write(source_root.join("legacy/old.html"), "").unwrap();

        let patterns = vec!["**/legacy/**".to_string()];
        let skip = build_skip_set(patterns.iter()).unwrap();
        let units = discover(
            workspace,
            &source_root,
            &workspace.join("client/js-svelte"),
            &ConvertConfig::default(),
            &skip,
        )
        .unwrap();

        let found: Vec<(&str, UnitKind)> = units
            .iter()
            .map(|unit| (unit.relative.as_str(), unit.kind))
            .collect();
        assert_eq!(
            found,
            vec![("api.js", UnitKind::Script), ("card.html", UnitKind::Template)]
        );
    }

    #[test]
    fn test_missing_source_dir() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Utf8Path::from_path(dir.path()).unwrap();
        let result = discover(
            workspace,
            &workspace.join("nope"),
            &workspace.join("out"),
            &ConvertConfig::default(),
            &GlobSet::empty(),
        );
        assert!(matches!(result, Err(ConvertError::MissingSource(_))));
    }
}
