//! Job model: what to convert, and the artifact names a job derives.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Fixed intermediate filename read by the repair-tool macro.
///
/// The macro opens and saves these names relative to its working
/// directory; renaming either requires updating the macro in lockstep.
pub const REPAIR_INPUT_NAME: &str = "geomagic-tmp-input.ply";
/// Fixed intermediate filename written by the repair-tool macro.
pub const REPAIR_OUTPUT_NAME: &str = "geomagic-tmp-output.ply";

/// Mesh formats recognized by their file extension.
///
/// Formats are never parsed; the extension only decides whether the
/// final conversion stage runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshFormat {
    /// Stanford polygon format; what the bake stage produces.
    Ply,
    /// Wavefront OBJ.
    Obj,
    /// Stereolithography.
    Stl,
    /// Object File Format.
    Off,
}

impl MeshFormat {
    /// Map a file extension (case-insensitive) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "ply" => Some(Self::Ply),
            "obj" => Some(Self::Obj),
            "stl" => Some(Self::Stl),
            "off" => Some(Self::Off),
            _ => None,
        }
    }

    /// Map a path's extension to a format.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// One input-mesh-to-output-mesh conversion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// The scanned mesh to convert. Canonicalized.
    pub input: PathBuf,
    /// Where the final mesh must land. Absolute.
    pub output: PathBuf,
}

impl Job {
    /// Build a validated job.
    ///
    /// The input must be an existing regular file; the output's parent
    /// directory must already exist, and the output filename must have
    /// a stem, since intermediate artifact names derive from it.
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Result<Self, PipelineError> {
        let input = input.into();
        let output = output.into();

        if !input.is_file() {
            return Err(PipelineError::InputMissing { path: input });
        }
        let input = input.canonicalize()?;
        let output = std::path::absolute(&output)?;

        match output.parent() {
            Some(parent) if parent.is_dir() => {}
            Some(parent) => {
                return Err(PipelineError::OutputDirMissing {
                    path: parent.to_path_buf(),
                });
            }
            None => {
                return Err(PipelineError::OutputDirMissing {
                    path: output.clone(),
                });
            }
        }

        if output.file_stem().is_none() {
            return Err(PipelineError::NoOutputStem { path: output });
        }

        Ok(Self { input, output })
    }

    /// The output's format as implied by its extension.
    pub fn output_format(&self) -> Option<MeshFormat> {
        MeshFormat::from_path(&self.output)
    }

    /// Whether the job needs the final format-conversion stage.
    ///
    /// The bake stage produces PLY; anything else (including an
    /// unrecognized extension) goes through conversion.
    pub fn needs_conversion(&self) -> bool {
        self.output_format() != Some(MeshFormat::Ply)
    }
}

/// The temporary artifact set a job creates.
///
/// Each artifact is written by one stage and read by the next. All of
/// them are deleted at job end, except the baked mesh when it is
/// itself the final output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPaths {
    /// Per-job scratch directory holding the repair intermediates.
    pub scratch_dir: PathBuf,
    /// Decimated mesh handed to the repair step.
    pub repair_input: PathBuf,
    /// Repaired mesh produced by the repair step.
    pub repair_output: PathBuf,
    /// UV-unwrapped mesh.
    pub uv_obj: PathBuf,
    /// Baked mesh with its texture; equal to the job output when no
    /// conversion is needed.
    pub textured_ply: PathBuf,
}

impl JobPaths {
    /// Derive the artifact set for a job.
    ///
    /// The repair intermediates live in `scratch_dir`; the UV and
    /// baked artifacts land next to the final output, named after its
    /// stem.
    pub fn derive(job: &Job, scratch_dir: PathBuf) -> Result<Self, PipelineError> {
        let stem = job
            .output
            .file_stem()
            .ok_or_else(|| PipelineError::NoOutputStem {
                path: job.output.clone(),
            })?;
        let root = match job.output.parent() {
            Some(parent) => parent.join(stem),
            None => PathBuf::from(stem),
        };

        let mut uv_obj = root.clone().into_os_string();
        uv_obj.push("-uv.obj");

        let textured_ply = if job.needs_conversion() {
            let mut name = root.into_os_string();
            name.push(".ply");
            PathBuf::from(name)
        } else {
            job.output.clone()
        };

        Ok(Self {
            repair_input: scratch_dir.join(REPAIR_INPUT_NAME),
            repair_output: scratch_dir.join(REPAIR_OUTPUT_NAME),
            scratch_dir,
            uv_obj: PathBuf::from(uv_obj),
            textured_ply,
        })
    }
}

/// The result of one completed job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOutcome {
    /// The final artifact.
    pub output: PathBuf,
    /// Wall-clock duration of the whole job.
    pub duration: Duration,
    /// Whether a final format conversion ran.
    pub converted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_job(dir: &Path, output_name: &str) -> Job {
        let input = dir.join("scan.ply");
        std::fs::write(&input, b"ply\n").expect("write input");
        Job::new(input, dir.join(output_name)).expect("job")
    }

    #[test]
    fn test_format_case_insensitive() {
        assert_eq!(MeshFormat::from_extension("PLY"), Some(MeshFormat::Ply));
        assert_eq!(MeshFormat::from_extension("obj"), Some(MeshFormat::Obj));
        assert_eq!(
            MeshFormat::from_path(Path::new("/data/scan.STL")),
            Some(MeshFormat::Stl)
        );
        assert_eq!(MeshFormat::from_extension("glb"), None);
        assert_eq!(MeshFormat::from_path(Path::new("/data/noext")), None);
    }

    #[test]
    fn test_ply_skips_conversion() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert!(!make_job(temp.path(), "mesh.ply").needs_conversion());
        assert!(!make_job(temp.path(), "mesh.PLY").needs_conversion());
        assert!(make_job(temp.path(), "mesh.obj").needs_conversion());
        assert!(make_job(temp.path(), "mesh.xyz").needs_conversion());
    }

    #[test]
    fn test_missing_input() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = Job::new(temp.path().join("absent.ply"), temp.path().join("out.obj"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::InputMissing { .. }));
    }

    #[test]
    fn test_directory_input() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = Job::new(temp.path(), temp.path().join("out.obj")).unwrap_err();
        assert!(matches!(err, PipelineError::InputMissing { .. }));
    }

    #[test]
    fn test_missing_output_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        let input = temp.path().join("scan.ply");
        std::fs::write(&input, b"ply\n").expect("write input");

        let err = Job::new(&input, temp.path().join("absent/out.obj")).unwrap_err();
        assert!(matches!(err, PipelineError::OutputDirMissing { .. }));
    }

    #[test]
    fn test_artifact_names() {
        let temp = tempfile::tempdir().expect("tempdir");
        let job = make_job(temp.path(), "statue.obj");
        let scratch = temp.path().join("scratch");
        let paths = JobPaths::derive(&job, scratch.clone()).expect("derive");

        assert_eq!(paths.repair_input, scratch.join("geomagic-tmp-input.ply"));
        assert_eq!(paths.repair_output, scratch.join("geomagic-tmp-output.ply"));
        assert_eq!(paths.uv_obj, temp.path().join("statue-uv.obj"));
        assert_eq!(paths.textured_ply, temp.path().join("statue.ply"));
    }

    #[test]
    fn test_baked_artifact_no_conversion() {
        let temp = tempfile::tempdir().expect("tempdir");
        let job = make_job(temp.path(), "statue.ply");
        let paths = JobPaths::derive(&job, temp.path().join("scratch")).expect("derive");
        assert_eq!(paths.textured_ply, job.output);
    }
}
