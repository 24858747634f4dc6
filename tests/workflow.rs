//! End-to-end runs of the generate/insert cycle and span metadata against
//! files on disk.

#![allow(missing_docs)]

use std::fs;

use codestamp::{
    domain::{generator::ScriptedRandom, metadata, MetadataRecord, Target},
    stamp::Error,
    Code, Selection, Stamper, TextFile, Workspace,
};
use tempfile::TempDir;

fn workspace_with(document: &str, text: &str) -> (TempDir, Workspace) {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(document), text).unwrap();
    let workspace = Workspace::init(tmp.path().to_path_buf()).unwrap();
    (tmp, workspace)
}

#[test]
fn generate_then_insert_across_runs() {
    let (tmp, workspace) = workspace_with(
        "manual.md",
        "# Parts\n\nValve 100-100\nPump ____\n",
    );
    let document = std::path::Path::new("manual.md");

    // First run: generate and persist the pending code
    {
        let file = TextFile::open(workspace.document_path(document)).unwrap();
        let mut session = workspace.load_session(document).unwrap();
        let mut stamper = Stamper::with_source(
            workspace.config(),
            ScriptedRandom::new(&[(100, 100), (100, 101)]),
        );

        let code = stamper.request_unique_code(&file, &mut session).unwrap();
        assert_eq!(code, "100-101".parse::<Code>().unwrap());
        workspace.save_session(document, &session).unwrap();
    }

    // Second run: insert the pending code at the placeholder
    {
        let mut file = TextFile::open(workspace.document_path(document)).unwrap();
        let mut session = workspace.load_session(document).unwrap();
        assert_eq!(session.generated(), 1);

        let start = file.text().find("____").unwrap();
        let stamper = Stamper::new(workspace.config());
        stamper
            .insert_pending_code(&mut file, &mut session, Selection::new(start, start + 4))
            .unwrap();
        file.save().unwrap();
        workspace.save_session(document, &session).unwrap();
    }

    assert_eq!(
        fs::read_to_string(tmp.path().join("manual.md")).unwrap(),
        "# Parts\n\nValve 100-100\nPump 100-101\n"
    );
    let session = workspace.load_session(document).unwrap();
    assert!(session.pending().is_none());
    assert_eq!(
        codestamp::count_existing_codes(
            &TextFile::open(workspace.document_path(document)).unwrap()
        )
        .unwrap(),
        2
    );
}

#[test]
fn insert_without_generate_leaves_file_alone() {
    let (tmp, workspace) = workspace_with("notes.txt", "nothing yet");
    let document = std::path::Path::new("notes.txt");

    let mut file = TextFile::open(workspace.document_path(document)).unwrap();
    let mut session = workspace.load_session(document).unwrap();
    let err = Stamper::new(workspace.config())
        .insert_pending_code(&mut file, &mut session, Selection::caret(0))
        .unwrap_err();

    assert!(matches!(err, Error::NoCodeAvailable(_)));
    assert!(!file.is_dirty());
    assert_eq!(
        fs::read_to_string(tmp.path().join("notes.txt")).unwrap(),
        "nothing yet"
    );
}

#[test]
fn missing_document_cannot_be_opened() {
    let (_tmp, workspace) = workspace_with("present.md", "");
    let err = TextFile::open(workspace.document_path(std::path::Path::new("absent.md")))
        .unwrap_err();
    assert!(codestamp::storage::text_file::is_not_found(&err));
}

#[test]
fn metadata_survives_reload_and_clears_cleanly() {
    let original = "| Pump | see diagram |\n";
    let (tmp, workspace) = workspace_with("table.md", original);
    let document = std::path::Path::new("table.md");

    let mut file = TextFile::open(workspace.document_path(document)).unwrap();
    let mut settings = workspace.load_settings(document).unwrap();
    let start = original.find("see diagram").unwrap();
    let record = MetadataRecord {
        link: Some("https://example.com/pump".to_string()),
        alt_tags: vec!["pump".to_string(), "diagram".to_string()],
        ..MetadataRecord::new(Target::TableCell)
    };
    let id = metadata::attach(
        &mut file,
        &mut settings,
        Selection::new(start, start + "see diagram".len()),
        record,
    )
    .unwrap();
    file.save().unwrap();
    workspace.save_settings(document, &settings).unwrap();

    // Reload from disk and look the record up from inside the span
    let mut file = TextFile::open(workspace.document_path(document)).unwrap();
    let mut settings = workspace.load_settings(document).unwrap();
    let offset = file.text().find("diagram").unwrap();
    let attached = metadata::load(&file, &settings, offset).unwrap().unwrap();
    assert_eq!(attached.control.id, id);
    let record = attached.record.unwrap();
    assert_eq!(record.target, Target::TableCell);
    assert_eq!(record.alt_tags, vec!["pump", "diagram"]);

    metadata::clear(&mut file, &mut settings, id).unwrap();
    file.save().unwrap();
    workspace.save_settings(document, &settings).unwrap();

    assert_eq!(
        fs::read_to_string(tmp.path().join("table.md")).unwrap(),
        original
    );
    assert!(workspace.load_settings(document).unwrap().is_empty());
}
