//! Output formatting.

use crate::cli::OutputFormat;
use ractive_transformer::{TransformWarning, UnitKind, TODO_MARKER};
use serde::Serialize;

/// A unit that was converted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertedUnit {
    /// The source path, relative to the workspace.
    pub source: String,
    /// The output path, relative to the workspace.
    pub output: String,
    /// What the unit holds.
    pub kind: UnitKind,
    /// Non-fatal warnings raised while transforming.
    pub warnings: Vec<TransformWarning>,
    /// Follow-up markers left in the output.
    pub follow_ups: usize,
}

/// The stage a unit failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Reading the source.
    Read,
    /// Writing the output.
    Write,
}

/// A unit that could not be converted.
#[derive(Debug, Clone, Serialize)]
pub struct UnitFailure {
    /// The path involved, relative to the workspace.
    pub path: String,
    /// Where it failed.
    pub stage: Stage,
    /// What happened.
    pub message: String,
}

/// Report of a conversion run.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Converted units, in source path order.
    pub converted: Vec<ConvertedUnit>,
    /// Units that failed.
    pub failures: Vec<UnitFailure>,
    /// Store modules generated for shared state.
    pub stores: Vec<String>,
    /// Whether files were left unwritten.
    pub dry_run: bool,
}

impl RunReport {
    /// Number of failed units.
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Number of warnings across all units.
    pub fn warning_count(&self) -> usize {
        self.converted.iter().map(|unit| unit.warnings.len()).sum()
    }

    /// Number of follow-up markers across all units.
    pub fn follow_up_count(&self) -> usize {
        self.converted.iter().map(|unit| unit.follow_ups).sum()
    }

    /// Formats the summary line.
    pub fn summary(&self) -> String {
        let plural = |count: usize, one: &'static str, many: &'static str| {
            if count == 1 {
                one
            } else {
                many
            }
        };
        let files = self.converted.len();
        let warnings = self.warning_count();
        let follow_ups = self.follow_up_count();
        let failures = self.failure_count();

        format!(
            "====================================\nractive-to-svelte converted {} {} with {} {}, {} {} and {} {}{}",
            files,
            plural(files, "file", "files"),
            warnings,
            plural(warnings, "warning", "warnings"),
            follow_ups,
            plural(follow_ups, "follow-up", "follow-ups"),
            failures,
            plural(failures, "failure", "failures"),
            if self.dry_run { " (dry run)" } else { "" }
        )
    }
}

/// Formats run reports for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a run report.
    pub fn format(&self, report: &RunReport) -> String {
        match self.format {
            OutputFormat::Human => self.format_human(report),
            OutputFormat::Json => self.format_json(report),
        }
    }

    /// Formats as human-readable output.
    fn format_human(&self, report: &RunReport) -> String {
        let mut output = String::new();

        for unit in &report.converted {
            output.push_str(&format!("{} -> {}\n", unit.source, unit.output));
            for warning in &unit.warnings {
                output.push_str(&format!("  Warning: {}\n", warning));
            }
            if unit.follow_ups > 0 {
                output.push_str(&format!(
                    "  {} marked `{}`\n",
                    unit.follow_ups, TODO_MARKER
                ));
            }
        }

        for failure in &report.failures {
            let stage = match failure.stage {
                Stage::Read => "read",
                Stage::Write => "write",
            };
            output.push_str(&format!(
                "Error: failed to {} {}: {}\n",
                stage, failure.path, failure.message
            ));
        }

        for store in &report.stores {
            output.push_str(&format!("Store: {}\n", store));
        }

        output.push_str(&report.summary());
        output
    }

    /// Formats as JSON.
    fn format_json(&self, report: &RunReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }
}
