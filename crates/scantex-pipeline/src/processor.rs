//! Pipeline processor: staged orchestration with guaranteed scratch
//! cleanup, output validation, and metrics collection.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::fs;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use scantex_core::config::PipelineSettings;
use scantex_core::exec::run_tool;
use scantex_core::profile::{RepairVariant, ToolProfile};

use crate::commands;
use crate::error::PipelineError;
use crate::job::{Job, JobOutcome, JobPaths};
use crate::metrics::{MetricsSnapshot, PipelineMetrics};

/// The main pipeline processor.
///
/// Holds the resolved tool profile and settings; one instance serves
/// any number of jobs, each with its own scratch directory.
#[derive(Debug, Clone)]
pub struct PipelineProcessor {
    /// Resolved tool profile.
    profile: ToolProfile,
    /// Root directory for per-job scratch directories.
    temp_root: PathBuf,
    /// Pipeline settings.
    settings: PipelineSettings,
    /// Job metrics collector.
    metrics: Arc<PipelineMetrics>,
}

impl PipelineProcessor {
    /// Create a new processor rooted at the configured scratch dir.
    pub fn new(profile: ToolProfile, settings: PipelineSettings) -> Result<Self, PipelineError> {
        // Scratch paths reach children that run under their own working
        // directories, so the root must be absolute.
        let temp_root = std::path::absolute(settings.effective_temp_root())?;
        std::fs::create_dir_all(&temp_root)?;

        Ok(Self {
            profile,
            temp_root,
            settings,
            metrics: Arc::new(PipelineMetrics::new()),
        })
    }

    /// Convert one scanned mesh into a textured mesh.
    ///
    /// Runs the stages in order, then removes the job's intermediate
    /// artifacts whatever the outcome.
    #[instrument(
        skip(self, job),
        fields(input = %job.input.display(), output = %job.output.display())
    )]
    pub async fn process(&self, job: &Job) -> Result<JobOutcome, PipelineError> {
        self.metrics.record_started();
        let start = Instant::now();

        match self.process_inner(job).await {
            Ok(converted) => {
                let duration = start.elapsed();
                self.metrics.record_success(duration);
                info!(
                    output = %job.output.display(),
                    duration_ms = duration.as_millis() as u64,
                    converted = converted,
                    "Job completed"
                );
                Ok(JobOutcome {
                    output: job.output.clone(),
                    duration,
                    converted,
                })
            }
            Err(e) => {
                self.metrics.record_failure();
                Err(e)
            }
        }
    }

    /// Set up the scratch directory, run the stages, clean up.
    async fn process_inner(&self, job: &Job) -> Result<bool, PipelineError> {
        let scratch_dir = self
            .temp_root
            .join(format!("job-{}", Uuid::now_v7().simple()));
        let paths = JobPaths::derive(job, scratch_dir)?;
        fs::create_dir_all(&paths.scratch_dir).await?;

        // Run the stages; clean up intermediates regardless of outcome
        let result = self.run_stages(job, &paths).await;

        self.cleanup(job, &paths).await;

        result
    }

    /// The stages, strictly in order.
    async fn run_stages(&self, job: &Job, paths: &JobPaths) -> Result<bool, PipelineError> {
        self.decimate_and_repair(job, paths).await?;
        self.unwrap_uv(paths).await?;
        self.bake_texture(job, paths).await?;
        self.convert_output(job, paths).await
    }

    /// Decimate the scan and repair its surface.
    async fn decimate_and_repair(&self, job: &Job, paths: &JobPaths) -> Result<(), PipelineError> {
        match self.profile.repair {
            RepairVariant::ServerDecimate => {
                let decimate = commands::decimate(&self.profile, &job.input, &paths.repair_input);
                run_tool(&decimate).await?;

                // No native repair tool on this platform; the decimated
                // mesh passes through unchanged.
                info!("Repair tool not available; copying decimated mesh through");
                fs::copy(&paths.repair_input, &paths.repair_output).await?;
            }
            RepairVariant::NativeMacro => {
                fs::copy(&job.input, &paths.repair_input).await?;

                let repair = commands::repair_macro(&self.profile, &paths.scratch_dir);
                run_tool(&repair).await?;
            }
        }
        self.validate_stage_output("decimate-and-repair", &paths.repair_output)
    }

    /// Compute the UV parameterization of the repaired mesh.
    async fn unwrap_uv(&self, paths: &JobPaths) -> Result<(), PipelineError> {
        let unwrap = commands::unwrap_uv(&self.profile, &paths.repair_output, &paths.uv_obj);
        run_tool(&unwrap).await?;
        self.validate_stage_output("uv-unwrap", &paths.uv_obj)
    }

    /// Bake the scan's color onto a texture for the UV-mapped mesh.
    async fn bake_texture(&self, job: &Job, paths: &JobPaths) -> Result<(), PipelineError> {
        let bake =
            commands::bake_texture(&self.profile, &paths.uv_obj, &job.input, &paths.textured_ply);
        run_tool(&bake).await?;
        self.validate_stage_output("texture-bake", &paths.textured_ply)
    }

    /// Convert the baked mesh when the requested format differs from
    /// it. Returns whether a conversion ran.
    async fn convert_output(&self, job: &Job, paths: &JobPaths) -> Result<bool, PipelineError> {
        if !job.needs_conversion() {
            return Ok(false);
        }

        let convert = commands::convert(&self.profile, &paths.textured_ply, &job.output)?;
        run_tool(&convert).await?;
        self.validate_stage_output("format-convert", &job.output)?;
        Ok(true)
    }

    /// Delete the job's intermediate artifacts.
    ///
    /// Best-effort: failures are logged and never mask the job result.
    /// The baked mesh survives when it is itself the final output.
    async fn cleanup(&self, job: &Job, paths: &JobPaths) {
        if self.settings.keep_intermediates {
            info!(
                scratch_dir = %paths.scratch_dir.display(),
                "Keeping intermediate artifacts"
            );
            return;
        }

        if let Err(e) = fs::remove_dir_all(&paths.scratch_dir).await {
            warn!(
                scratch_dir = %paths.scratch_dir.display(),
                error = %e,
                "Failed to clean up scratch directory"
            );
        }

        remove_artifact(&paths.uv_obj).await;
        if job.needs_conversion() {
            remove_artifact(&paths.textured_ply).await;
        }
    }

    /// Postcondition: the stage output exists and meets the minimum
    /// size.
    fn validate_stage_output(&self, stage: &'static str, path: &Path) -> Result<(), PipelineError> {
        if !path.exists() {
            return Err(PipelineError::StageOutputMissing {
                stage,
                path: path.to_path_buf(),
            });
        }

        // Synchronous metadata check (file was just created)
        let metadata = std::fs::metadata(path)?;
        if metadata.len() < self.settings.min_output_bytes {
            return Err(PipelineError::StageOutputTruncated {
                stage,
                path: path.to_path_buf(),
                size: metadata.len(),
            });
        }

        Ok(())
    }

    /// Get the resolved tool profile.
    pub fn profile(&self) -> &ToolProfile {
        &self.profile
    }

    /// Get a metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// Remove one leftover artifact if present, warning on failure.
async fn remove_artifact(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            path = %path.display(),
            error = %e,
            "Failed to remove intermediate artifact"
        ),
    }
}
