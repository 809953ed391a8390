use std::fs;

use pretty_assertions::assert_eq;
use termbook_ops::{OperationError, Operations, PrerenderOptions};
use termbook_test_support::Project;

#[test]
fn stages_documents_with_terms_and_dashes_resolved() {
    let project = Project::with_sample_glossary();
    project.write_chapter("intro.md", "Hello <TERM:api>> world -- end.");

    let ops = Operations::new(project.config());
    let outcome = ops.prerender(PrerenderOptions::default()).expect("prerender");

    assert_eq!(
        project.read_staged("intro.md").as_deref(),
        Some("Hello Application Programming Interface world — end.")
    );
    assert_eq!(outcome.files_processed(), 1);
    assert_eq!(outcome.terms_replaced(), 1);
    assert_eq!(outcome.dashes_replaced(), 1);

    let source = fs::read_to_string(project.source_dir().join("intro.md")).expect("source");
    assert_eq!(source, "Hello <TERM:api>> world -- end.");
}

#[test]
fn excluded_documents_are_never_staged() {
    let project = Project::with_sample_glossary();
    project.write_chapter("notes_backup.md", "<TERM:api>>");
    project.write_chapter("test_scratch.md", "scratch");
    project.write_chapter("combined-book.md", "everything");
    project.write_chapter("chapter.md", "kept");

    let ops = Operations::new(project.config());
    let outcome = ops.prerender(PrerenderOptions::default()).expect("prerender");

    assert_eq!(project.read_staged("notes_backup.md"), None);
    assert_eq!(project.read_staged("test_scratch.md"), None);
    assert_eq!(project.read_staged("combined-book.md"), None);
    assert_eq!(project.read_staged("chapter.md").as_deref(), Some("kept"));

    let patterns: Vec<_> = outcome
        .skipped
        .iter()
        .map(|skipped| skipped.pattern.as_str())
        .collect();
    assert_eq!(patterns, vec!["combined-book", "_backup", "test_"]);
}

#[test]
fn missing_glossary_aborts_before_staging() {
    let project = Project::empty();
    project.write_chapter("intro.md", "text");

    let ops = Operations::new(project.config());
    let err = ops
        .prerender(PrerenderOptions::default())
        .expect_err("missing glossary");

    match err {
        OperationError::MissingGlossary { path } => assert_eq!(path, project.glossary_path()),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!project.staging_dir().exists());
}

#[test]
fn second_run_produces_identical_output() {
    let project = Project::with_sample_glossary();
    project.write_chapter(
        "guide.md",
        "<TERM:devrel>> -- <TERM:unknown>>\n```sh\ngit log --oneline\n```\n",
    );

    let ops = Operations::new(project.config());
    ops.prerender(PrerenderOptions::default()).expect("first run");
    let first = project.read_staged("guide.md");
    let outcome = ops.prerender(PrerenderOptions::default()).expect("second run");
    let second = project.read_staged("guide.md");

    assert_eq!(first, second);
    assert_eq!(
        second.as_deref(),
        Some("Developer Relations — <TERM:unknown>>\n```sh\ngit log --oneline\n```\n")
    );
    assert_eq!(outcome.files[0].unresolved, vec!["unknown".to_string()]);
}

#[test]
fn stale_staged_files_are_reported_but_kept() {
    let project = Project::with_sample_glossary();
    project.write_chapter("current.md", "now");
    fs::create_dir_all(project.staging_dir()).expect("staging dir");
    fs::write(project.staging_dir().join("removed.md"), "old").expect("stale file");

    let ops = Operations::new(project.config());
    let outcome = ops.prerender(PrerenderOptions::default()).expect("prerender");

    assert_eq!(outcome.orphans, vec![project.staging_dir().join("removed.md")]);
    assert_eq!(project.read_staged("removed.md").as_deref(), Some("old"));
}

#[test]
fn dry_run_writes_nothing() {
    let project = Project::with_sample_glossary();
    project.write_chapter("intro.md", "a -- b");

    let ops = Operations::new(project.config());
    let outcome = ops
        .prerender(PrerenderOptions { dry_run: true })
        .expect("dry run");

    assert!(outcome.dry_run);
    assert_eq!(outcome.dashes_replaced(), 1);
    assert!(!project.staging_dir().exists());
}

#[test]
fn unterminated_fence_is_flagged_per_file() {
    let project = Project::with_sample_glossary();
    project.write_chapter("broken.md", "before -- x\n```\nafter -- y\n");

    let ops = Operations::new(project.config());
    let outcome = ops.prerender(PrerenderOptions::default()).expect("prerender");

    assert!(outcome.files[0].unterminated_fence);
    assert_eq!(
        project.read_staged("broken.md").as_deref(),
        Some("before — x\n```\nafter -- y\n")
    );
}

#[test]
fn missing_source_directory_stages_nothing() {
    let project = Project::empty();
    project.write_glossary("terms: []\n");

    let ops = Operations::new(project.config());
    let outcome = ops
        .prerender(PrerenderOptions::default())
        .expect("prerender without chapters");

    assert_eq!(outcome.files_processed(), 0);
    assert!(outcome.skipped.is_empty());
    assert!(project.staging_dir().is_dir());
}

#[cfg(unix)]
#[test]
fn staged_copy_keeps_raw_file_name_bytes() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let project = Project::with_sample_glossary();
    let raw_name = OsStr::from_bytes(b"ch\xff.md");
    let other_name = OsStr::from_bytes(b"ch\xfe.md");
    fs::write(project.source_dir().join(raw_name), "one -- <TERM:api>>").expect("write raw");
    fs::write(project.source_dir().join(other_name), "two").expect("write other");

    let ops = Operations::new(project.config());
    let outcome = ops.prerender(PrerenderOptions::default()).expect("prerender");

    assert_eq!(outcome.files_processed(), 2);
    let staged = fs::read_to_string(project.staging_dir().join(raw_name)).expect("staged raw");
    assert_eq!(staged, "one — Application Programming Interface");
    let other = fs::read_to_string(project.staging_dir().join(other_name)).expect("staged other");
    assert_eq!(other, "two");
    assert!(outcome.orphans.is_empty());
}
