//! Shared helpers for the end-to-end tests.
//!
//! The external tools are stood in for by small shell scripts: the mesh
//! server copies its first `-i` input to the `-o` target, the repair
//! tool turns `geomagic-tmp-input.ply` into `geomagic-tmp-output.ply`
//! in its working directory (exiting non-zero like the real tool), and
//! the UV tool copies its input to its output.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use scantex_core::config::{PipelineSettings, ToolsConfig};

/// Mesh-server stub: copies the first `-i` input to the `-o` target,
/// swallowing `-om` masks and `-s` filter scripts.
pub const MESH_SERVER_BODY: &str = r#"
first=""
out=""
while [ $# -gt 0 ]; do
    case "$1" in
        -i) shift; [ -n "$first" ] || first="$1" ;;
        -o) shift; out="$1" ;;
        -om|-s) shift ;;
    esac
    shift
done
cp "$first" "$out"
"#;

/// Repair-tool stub: consumes and produces the fixed scratch names in
/// its working directory, then exits non-zero like the real tool.
pub const REPAIR_TOOL_BODY: &str = r#"
cp geomagic-tmp-input.ply geomagic-tmp-output.ply
exit 7
"#;

/// UV stub: records its working directory, then copies input to output.
pub const UV_TOOL_BODY: &str = r#"
pwd -P > "$(dirname "$0")/make-uv-cwd.txt"
cp "$1" "$2"
"#;

/// Archiver stub: logs the invocation and creates an empty archive at
/// the fifth argument (the archive path after the four fixed flags).
pub const ARCHIVER_BODY: &str = r#"
log="$(dirname "$0")/7z-log.txt"
{
    printf 'cwd=%s\n' "$(pwd -P)"
    printf 'arg=%s\n' "$@"
    echo ---
} >> "$log"
touch "$5"
"#;

/// Write an executable stub script into `dir`.
pub fn write_stub(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh{}", body)).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

/// Stub out all four tools in `stub_dir` and point a config at them.
pub fn stub_toolset(stub_dir: &Path) -> ToolsConfig {
    let scripts_dir = stub_dir.join("scripts");
    fs::create_dir_all(&scripts_dir).unwrap();

    ToolsConfig {
        repair_tool: Some(write_stub(stub_dir, "repair-tool", REPAIR_TOOL_BODY)),
        mesh_server: Some(write_stub(stub_dir, "meshlabserver", MESH_SERVER_BODY)),
        uv_tool: Some(write_stub(stub_dir, "make-uv", UV_TOOL_BODY)),
        archive_tool: Some(write_stub(stub_dir, "7z", ARCHIVER_BODY)),
        scripts_dir,
    }
}

/// Pipeline settings with the scratch root inside the test sandbox.
pub fn sandbox_settings(temp_root: &Path) -> PipelineSettings {
    PipelineSettings {
        temp_root: Some(temp_root.to_path_buf()),
        ..Default::default()
    }
}

/// A small but plausible ASCII PLY scan.
pub fn write_scan(path: &Path) {
    fs::write(
        path,
        "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nend_header\n0.0\n",
    )
    .unwrap();
}

/// Entries still present under the scratch root.
pub fn scratch_dirs(temp_root: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(temp_root) else {
        return Vec::new();
    };
    entries
        .filter_map(|e| Some(e.ok()?.file_name().to_string_lossy().into_owned()))
        .collect()
}
