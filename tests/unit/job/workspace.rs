use super::*;
use crate::story::model::{SegmentInput, segments_from_inputs};

fn two_segments() -> Vec<Segment> {
    segments_from_inputs(&[
        SegmentInput::new("sky", "Once upon a time."),
        SegmentInput::new("moon", "The moon smiled."),
    ])
    .unwrap()
}

#[test]
fn create_job_builds_tree() {
    let tmp = tempfile::tempdir().unwrap();
    let mgr = JobManager::new(tmp.path().join("gen"));
    let job = mgr.create_job(two_segments()).unwrap();

    let ws = job.workspace();
    assert!(ws.frames_dir().is_dir());
    assert!(ws.audio_dir().is_dir());
    assert!(ws.output_dir().is_dir());
    assert_eq!(ws.root(), tmp.path().join("gen").join(job.id().as_str()));
    assert_eq!(job.segments().len(), 2);
}

#[test]
fn ids_do_not_collide() {
    let tmp = tempfile::tempdir().unwrap();
    let mgr = JobManager::new(tmp.path());
    let a = mgr.create_job(two_segments()).unwrap();
    let b = mgr.create_job(two_segments()).unwrap();
    assert_ne!(a.id(), b.id());
    assert_ne!(a.workspace().root(), b.workspace().root());
}

#[test]
fn artifact_paths_follow_layout() {
    let ws = Workspace {
        root: PathBuf::from("/w/job"),
    };
    assert_eq!(ws.frame_path(3), PathBuf::from("/w/job/frames/3.png"));
    assert_eq!(ws.audio_path(3), PathBuf::from("/w/job/audio/3.mp3"));
    assert_eq!(ws.clip_path(3), PathBuf::from("/w/job/output/segment_3.mp4"));
    assert_eq!(ws.manifest_path(), PathBuf::from("/w/job/output/input.txt"));
    assert_eq!(ws.output_path(), PathBuf::from("/w/job/output/output.mp4"));
}

#[test]
fn existing_directory_is_accepted() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("frames");
    std::fs::create_dir(&dir).unwrap();
    create_dir_idempotent(&dir).unwrap();
}

#[test]
fn file_in_the_way_is_a_workspace_error() {
    let tmp = tempfile::tempdir().unwrap();
    let blocker = tmp.path().join("blocked");
    std::fs::write(&blocker, b"not a dir").unwrap();
    let err = create_dir_idempotent(&blocker).unwrap_err();
    assert_eq!(err.kind(), "workspace");
}

#[test]
fn unwritable_base_is_a_workspace_error() {
    let tmp = tempfile::tempdir().unwrap();
    let file_base = tmp.path().join("base-is-a-file");
    std::fs::write(&file_base, b"x").unwrap();
    let mgr = JobManager::new(&file_base);
    let err = mgr.create_job(two_segments()).unwrap_err();
    assert_eq!(err.kind(), "workspace");
}

#[test]
fn open_workspace_finds_existing_job() {
    let tmp = tempfile::tempdir().unwrap();
    let mgr = JobManager::new(tmp.path());
    let job = mgr.create_job(two_segments()).unwrap();

    let parsed = JobId::parse(job.id().as_str()).unwrap();
    let ws = mgr.open_workspace(&parsed).unwrap();
    assert_eq!(ws.root(), job.workspace().root());
}

#[test]
fn open_workspace_missing_job_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let mgr = JobManager::new(tmp.path());
    let id = JobId::parse("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
    assert_eq!(mgr.open_workspace(&id).unwrap_err().kind(), "workspace");
}

#[test]
fn job_id_rejects_paths() {
    assert!(JobId::parse("../etc").is_err());
    assert!(JobId::parse("").is_err());
}
