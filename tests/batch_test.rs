//! End-to-end tests for directory batch processing.

#![cfg(unix)]

mod helpers;

use std::fs;
use std::path::Path;

use scantex_core::profile::ToolProfile;
use scantex_pipeline::{PipelineProcessor, run_batch};

fn batch_processor(stub_dir: &Path, temp_root: &Path) -> PipelineProcessor {
    let tools = helpers::stub_toolset(stub_dir);
    let profile = ToolProfile::resolve_for("linux", &tools).unwrap();
    PipelineProcessor::new(profile, helpers::sandbox_settings(temp_root)).unwrap()
}

#[tokio::test]
async fn test_batch_layout() {
    let sandbox = tempfile::tempdir().unwrap();
    let root = sandbox.path();
    let input_dir = root.join("scans");
    let out_dir = root.join("out");
    fs::create_dir_all(&input_dir).unwrap();
    fs::create_dir_all(&out_dir).unwrap();

    helpers::write_scan(&input_dir.join("alpha.ply"));
    helpers::write_scan(&input_dir.join("beta.ply"));

    let processor = batch_processor(&root.join("stubs"), &root.join("tmp"));
    let summary = run_batch(&processor, &input_dir, &out_dir).await.unwrap();

    assert!(summary.all_succeeded());
    assert_eq!(summary.total(), 2);
    assert!(out_dir.join("alpha/alpha.obj").is_file());
    assert!(out_dir.join("beta/beta.obj").is_file());

    // Each item directory holds the final artifact and nothing else:
    // the UV mesh and the baked ply were cleaned up.
    for stem in ["alpha", "beta"] {
        let entries: Vec<String> = fs::read_dir(out_dir.join(stem))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec![format!("{stem}.obj")]);
    }
    assert!(helpers::scratch_dirs(&root.join("tmp")).is_empty());
}

#[tokio::test]
async fn test_batch_mixed_extensions() {
    let sandbox = tempfile::tempdir().unwrap();
    let root = sandbox.path();
    let input_dir = root.join("scans");
    let out_dir = root.join("out");
    fs::create_dir_all(&input_dir).unwrap();
    fs::create_dir_all(&out_dir).unwrap();

    // Output naming comes from the stem, not the input extension.
    helpers::write_scan(&input_dir.join("gamma.stl"));
    helpers::write_scan(&input_dir.join("delta.xyz"));

    let processor = batch_processor(&root.join("stubs"), &root.join("tmp"));
    let summary = run_batch(&processor, &input_dir, &out_dir).await.unwrap();

    assert!(summary.all_succeeded());
    assert_eq!(summary.total(), 2);
    assert!(out_dir.join("gamma/gamma.obj").is_file());
    assert!(out_dir.join("delta/delta.obj").is_file());
}

#[tokio::test]
async fn test_batch_continues_after_failure() {
    let sandbox = tempfile::tempdir().unwrap();
    let root = sandbox.path();
    let stub_dir = root.join("stubs");
    let input_dir = root.join("scans");
    let out_dir = root.join("out");
    fs::create_dir_all(&input_dir).unwrap();
    fs::create_dir_all(&out_dir).unwrap();

    let processor = batch_processor(&stub_dir, &root.join("tmp"));

    // Fail the mesh server for the scan named 'broken'.
    helpers::write_stub(
        &stub_dir,
        "meshlabserver",
        &format!(
            "\ncase \"$*\" in *broken*) exit 3 ;; esac\n{}",
            helpers::MESH_SERVER_BODY
        ),
    );

    helpers::write_scan(&input_dir.join("broken.ply"));
    helpers::write_scan(&input_dir.join("fine.ply"));

    let summary = run_batch(&processor, &input_dir, &out_dir).await.unwrap();

    assert!(!summary.all_succeeded());
    assert_eq!(summary.completed.len(), 1);
    assert_eq!(summary.failed.len(), 1);
    assert!(summary.failed[0].input.ends_with("broken.ply"));
    assert!(out_dir.join("fine/fine.obj").is_file());
    assert!(!out_dir.join("broken/broken.obj").exists());
}

#[tokio::test]
async fn test_batch_rerun() {
    let sandbox = tempfile::tempdir().unwrap();
    let root = sandbox.path();
    let input_dir = root.join("scans");
    let out_dir = root.join("out");
    fs::create_dir_all(&input_dir).unwrap();
    fs::create_dir_all(&out_dir).unwrap();

    helpers::write_scan(&input_dir.join("alpha.ply"));

    let processor = batch_processor(&root.join("stubs"), &root.join("tmp"));

    // Per-item directories from the first run are reused on the second.
    let first = run_batch(&processor, &input_dir, &out_dir).await.unwrap();
    let second = run_batch(&processor, &input_dir, &out_dir).await.unwrap();

    assert!(first.all_succeeded());
    assert!(second.all_succeeded());
    assert!(out_dir.join("alpha/alpha.obj").is_file());
}
