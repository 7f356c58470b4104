//! Groups the files of a directory by shared name prefix and packs each
//! group into a `.7z` archive via an external archiver.
//!
//! The prefix is everything before the first `_` in the file name, or
//! before the first `.` when there is no underscore. `12_color.png` and
//! `12_mesh.ply` both land in `12.7z`; `7.png` lands in `7.7z`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use scantex_core::exec::{ToolCommand, run_tool};

pub mod error;

pub use error::ArchiveError;

/// One archive to produce: the shared prefix and the member file names.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupPlan {
    /// Shared name prefix; also the archive stem.
    pub prefix: String,
    /// Member file names relative to the source directory.
    pub members: Vec<String>,
}

/// What a completed run produced.
#[derive(Debug, Default, Serialize)]
pub struct ArchiveReport {
    /// Archives written, in the order they were created.
    pub archives: Vec<PathBuf>,
    /// Total number of files packed across all archives.
    pub files_archived: usize,
}

/// Extracts the grouping prefix from a file name.
///
/// Splits on the first `_`, falling back to the first `.`, falling back
/// to the whole name.
pub fn group_prefix(name: &str) -> &str {
    if let Some((prefix, _)) = name.split_once('_') {
        return prefix;
    }
    if let Some((prefix, _)) = name.split_once('.') {
        return prefix;
    }
    name
}

/// Scans `source_dir` and buckets its files into archive groups.
///
/// Only plain files participate. Entries whose names are not valid UTF-8
/// or whose prefix would be empty (names starting with `_` or `.`) are
/// skipped with a warning.
pub fn plan_groups(source_dir: &Path) -> Result<Vec<GroupPlan>, ArchiveError> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for entry in std::fs::read_dir(source_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            warn!(path = %path.display(), "Skipping non-file entry");
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            warn!(path = %path.display(), "Skipping file with non-UTF-8 name");
            continue;
        };
        let prefix = group_prefix(&name);
        if prefix.is_empty() {
            warn!(name = %name, "Skipping file with empty grouping prefix");
            continue;
        }
        groups.entry(prefix.to_owned()).or_default().push(name);
    }

    // Directory iteration order is platform-dependent; sort members so
    // archive contents are deterministic.
    let mut plans = Vec::with_capacity(groups.len());
    for (prefix, mut members) in groups {
        members.sort();
        plans.push(GroupPlan { prefix, members });
    }
    Ok(plans)
}

/// Builds the archiver invocation for one group.
///
/// The child runs with the source directory as its working directory and
/// bare member names on the command line, so archives contain the files
/// without any directory components. The archive path itself is absolute
/// and therefore unaffected by the working directory.
pub fn archive_command(
    archive_tool: &Path,
    source_dir: &Path,
    archive_path: &Path,
    group: &GroupPlan,
) -> ToolCommand {
    let mut command = ToolCommand::new(archive_tool)
        .arg("a")
        .arg("-t7z")
        .arg("-m0=lzma2")
        .arg("-mx=9")
        .arg_path(archive_path)
        .working_dir(source_dir);
    for member in &group.members {
        command = command.arg(member);
    }
    command
}

/// Archives every group found in `source_dir` into `output_dir`.
///
/// The output directory is created if needed. A failing archiver aborts
/// the run; archives written before the failure are left in place.
pub async fn archive_groups(
    archive_tool: &Path,
    source_dir: &Path,
    output_dir: &Path,
) -> Result<ArchiveReport, ArchiveError> {
    if !source_dir.is_dir() {
        return Err(ArchiveError::SourceDirMissing {
            path: source_dir.to_path_buf(),
        });
    }

    tokio::fs::create_dir_all(output_dir).await?;
    // The archiver runs with its working directory inside the source
    // tree, so the archive path must not be relative.
    let output_dir = std::path::absolute(output_dir)?;

    let groups = plan_groups(source_dir)?;
    info!(
        source_dir = %source_dir.display(),
        groups = groups.len(),
        "Planned archive groups"
    );

    let mut report = ArchiveReport::default();
    for group in &groups {
        let archive_path = output_dir.join(format!("{}.7z", group.prefix));
        info!(
            prefix = %group.prefix,
            members = group.members.len(),
            archive = %archive_path.display(),
            "Archiving group"
        );
        let command = archive_command(archive_tool, source_dir, &archive_path, group);
        run_tool(&command).await?;
        report.files_archived += group.members.len();
        report.archives.push(archive_path);
    }

    Ok(report)
}
