//! Command builders for the external tools.
//!
//! One constructor per wire interface. Pure functions: profile plus
//! paths in, [`ToolCommand`] out, nothing runs here, so every argument
//! vector is checkable in tests.

use std::path::Path;

use scantex_core::exec::ToolCommand;
use scantex_core::profile::{ConvertVariant, ToolProfile, UvLaunchVariant};

use crate::error::PipelineError;

/// Filter script driving the decimation pass.
pub const DECIMATE_SCRIPT: &str = "decimate.mlx";
/// Filter script projecting vertex color onto the baked texture.
pub const BAKE_SCRIPT: &str = "transfer-color-to-texture.mlx";
/// Macro driving the repair tool's decimate-and-doctor run.
pub const REPAIR_MACRO: &str = "geomagic-decimate-doctor.py";

/// Decimate `input` into `output` via the mesh server.
pub fn decimate(profile: &ToolProfile, input: &Path, output: &Path) -> ToolCommand {
    ToolCommand::new(&profile.mesh_tool)
        .arg("-i")
        .arg_path(input)
        .arg("-o")
        .arg_path(output)
        .arg("-s")
        .arg_path(profile.scripts_dir.join(DECIMATE_SCRIPT))
}

/// Run the repair tool's macro inside `scratch_dir`.
///
/// The macro reads and writes the fixed `geomagic-tmp-*.ply` names
/// relative to the child's working directory. The tool's exit status
/// is unreliable, so the invocation is lenient.
pub fn repair_macro(profile: &ToolProfile, scratch_dir: &Path) -> ToolCommand {
    ToolCommand::new(&profile.repair_tool)
        .arg_path(profile.scripts_dir.join(REPAIR_MACRO))
        .arg("-ExitOnMacroEnd")
        .working_dir(scratch_dir)
        .lenient()
}

/// Unwrap `input` into the UV-mapped `output`.
pub fn unwrap_uv(profile: &ToolProfile, input: &Path, output: &Path) -> ToolCommand {
    let cmd = ToolCommand::new(&profile.uv_tool)
        .arg_path(input)
        .arg_path(output);

    match profile.uv_launch {
        UvLaunchVariant::Direct => cmd,
        // The tool locates its data files relative to its install
        // directory; input and output are absolute, so they survive
        // the working-directory switch.
        UvLaunchVariant::InstallDir => match profile.uv_tool.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => cmd.working_dir(dir),
            _ => cmd,
        },
    }
}

/// Bake `color_source`'s color onto a texture for the UV-mapped
/// `uv_input`, writing `output` plus a texture image beside it.
pub fn bake_texture(
    profile: &ToolProfile,
    uv_input: &Path,
    color_source: &Path,
    output: &Path,
) -> ToolCommand {
    ToolCommand::new(&profile.mesh_tool)
        .arg("-i")
        .arg_path(uv_input)
        .arg("-i")
        .arg_path(color_source)
        .arg("-o")
        .arg_path(output)
        .arg("-om")
        .arg("wt")
        .arg("-s")
        .arg_path(profile.scripts_dir.join(BAKE_SCRIPT))
}

/// Convert `input` into `output`'s format via the mesh server.
///
/// Under [`ConvertVariant::SameDirRelative`] both files must live in
/// the same directory; the check happens here, before any tool runs.
pub fn convert(
    profile: &ToolProfile,
    input: &Path,
    output: &Path,
) -> Result<ToolCommand, PipelineError> {
    match profile.convert {
        ConvertVariant::Direct => Ok(ToolCommand::new(&profile.mesh_tool)
            .arg("-i")
            .arg_path(input)
            .arg("-o")
            .arg_path(output)
            .arg("-om")
            .arg("wt")),
        ConvertVariant::SameDirRelative => {
            let input_dir = input.parent().unwrap_or(Path::new(""));
            let output_dir = output.parent().unwrap_or(Path::new(""));
            if input_dir != output_dir {
                return Err(PipelineError::ConversionDirMismatch {
                    input_dir: input_dir.to_path_buf(),
                    output_dir: output_dir.to_path_buf(),
                });
            }

            let input_name = input.file_name().unwrap_or(input.as_os_str());
            let output_name = output.file_name().unwrap_or(output.as_os_str());
            Ok(ToolCommand::new(&profile.mesh_tool)
                .arg("-i")
                .arg_path(Path::new(input_name))
                .arg("-o")
                .arg_path(Path::new(output_name))
                .arg("-om")
                .arg("wt")
                .working_dir(input_dir))
        }
    }
}
