//! Batch runner: convert every scan in a directory.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::fs;
use tracing::{error, info, warn};

use crate::error::PipelineError;
use crate::job::{Job, JobOutcome};
use crate::processor::PipelineProcessor;

/// Outcome of one batch run.
#[derive(Debug, Default, Serialize)]
pub struct BatchSummary {
    /// Items that produced their final artifact.
    pub completed: Vec<CompletedItem>,
    /// Items that failed, with the rendered error.
    pub failed: Vec<FailedItem>,
}

impl BatchSummary {
    /// Whether every item converted.
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    /// Total items attempted.
    pub fn total(&self) -> usize {
        self.completed.len() + self.failed.len()
    }
}

/// A batch item that completed.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedItem {
    /// The input entry.
    pub input: PathBuf,
    /// The job outcome.
    pub outcome: JobOutcome,
}

/// A batch item that failed.
#[derive(Debug, Clone, Serialize)]
pub struct FailedItem {
    /// The input entry.
    pub input: PathBuf,
    /// The rendered error.
    pub error: String,
}

/// Convert every regular file in `input_dir`, one at a time.
///
/// Each entry gets its own `output_dir/<stem>/` directory (created if
/// absent) and a `<stem>.obj` output. One item's failure is recorded
/// and the batch moves on; the summary carries both lists. Entries are
/// processed in directory-listing order.
pub async fn run_batch(
    processor: &PipelineProcessor,
    input_dir: &Path,
    output_dir: &Path,
) -> Result<BatchSummary, PipelineError> {
    info!(
        input_dir = %input_dir.display(),
        output_dir = %output_dir.display(),
        "Starting batch run"
    );

    let mut entries = fs::read_dir(input_dir).await?;
    let mut summary = BatchSummary::default();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !entry.file_type().await?.is_file() {
            warn!(entry = %path.display(), "Skipping non-file entry");
            continue;
        }
        let Some(stem) = path.file_stem().map(|s| s.to_os_string()) else {
            warn!(entry = %path.display(), "Skipping entry without a filename stem");
            continue;
        };

        let item_dir = output_dir.join(&stem);
        let mut output_name = stem.clone();
        output_name.push(".obj");
        let output = item_dir.join(output_name);

        let item_result: Result<JobOutcome, PipelineError> = async {
            fs::create_dir_all(&item_dir).await?;
            let job = Job::new(&path, &output)?;
            processor.process(&job).await
        }
        .await;

        match item_result {
            Ok(outcome) => {
                summary.completed.push(CompletedItem {
                    input: path,
                    outcome,
                });
            }
            Err(e) => {
                error!(input = %path.display(), error = %e, "Batch item failed");
                summary.failed.push(FailedItem {
                    input: path,
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        completed = summary.completed.len(),
        failed = summary.failed.len(),
        "Batch finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scantex_core::config::{PipelineSettings, ToolsConfig};
    use scantex_core::profile::ToolProfile;

    fn make_processor(temp_root: PathBuf) -> PipelineProcessor {
        let profile = ToolProfile::resolve_for("linux", &ToolsConfig::default()).expect("profile");
        let settings = PipelineSettings {
            temp_root: Some(temp_root),
            ..Default::default()
        };
        PipelineProcessor::new(profile, settings).expect("processor")
    }

    #[test]
    fn test_summary_tally() {
        let mut summary = BatchSummary::default();
        assert!(summary.all_succeeded());
        assert_eq!(summary.total(), 0);

        summary.failed.push(FailedItem {
            input: PathBuf::from("/in/broken.ply"),
            error: "boom".to_string(),
        });
        assert!(!summary.all_succeeded());
        assert_eq!(summary.total(), 1);
    }

    #[tokio::test]
    async fn test_missing_input_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        let processor = make_processor(temp.path().join("root"));

        let result = run_batch(
            &processor,
            &temp.path().join("absent"),
            &temp.path().join("out"),
        )
        .await;
        assert!(matches!(result, Err(PipelineError::Io(_))));
    }

    #[tokio::test]
    async fn test_skips_non_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        let processor = make_processor(temp.path().join("root"));

        let input_dir = temp.path().join("in");
        let output_dir = temp.path().join("out");
        std::fs::create_dir_all(input_dir.join("subdir")).expect("subdir");
        std::fs::create_dir_all(&output_dir).expect("outdir");

        let summary = run_batch(&processor, &input_dir, &output_dir)
            .await
            .expect("batch");
        assert_eq!(summary.total(), 0);
        assert!(!output_dir.join("subdir").exists());
    }
}
