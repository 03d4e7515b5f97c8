//! End-to-end emitter runs against in-memory stores.

use crate::common::{library, read_tree, SCOPE};
use snip_babel::format::{empty, no_companions, BodySource, RenderedSnippet};
use snip_babel::formats::{editors, jupyter, xml};
use snip_babel::placeholder::RewriteOp;
use snip_babel::wrap::WrapOp;
use snip_babel::{
    emit, export_all, ExportError, ExportJob, FormatDescriptor, FormatRegistry, InvocationStyle,
    Layout, MemoryStore, QuoteResolution, SnippetRecord, TargetContext, YesNo,
};
use std::fs;
use tempfile::tempdir;

fn framed(s: &RenderedSnippet<'_>) -> String {
    format!("# begin {}\n{}\n# end\n", s.trigger(), s.body)
}

fn flattening() -> FormatDescriptor {
    FormatDescriptor {
        name: "flat",
        description: "Flattened clippings",
        file_extension: "py",
        layout: Layout::PerSnippet,
        path_template: "{trigger}.{ext}",
        body_source: BodySource::Body,
        placeholder_pipeline: &[RewriteOp::StripNumberedStops],
        wrap_pipeline: &[WrapOp::Invoke],
        final_marker: None,
        separator: "",
        preamble: empty,
        postamble: empty,
        record_template: framed,
        category_open: None,
        category_close: None,
        companions: no_companions,
    }
}

#[test]
fn test_minimal_emitter_writes_trigger_named_file() {
    let dir = tempdir().unwrap();
    let store = MemoryStore::new(vec![SnippetRecord::new(
        "hello",
        "X",
        "Demo",
        "print(${1:'hi'})${0}",
    )]);
    let target = TargetContext::new("X", "py", dir.path());

    let report = emit(&store, &flattening(), &target).unwrap();

    assert_eq!(report.emitted(), 1);
    assert_eq!(report.files, vec![dir.path().join("hello.py")]);
    let contents = fs::read_to_string(dir.path().join("hello.py")).unwrap();
    assert_eq!(contents, "# begin hello\nprint('hi')\n# end\n");
}

#[test]
fn test_malformed_body_skips_only_that_record() {
    let dir = tempdir().unwrap();
    let store = MemoryStore::new(vec![
        SnippetRecord::new("broken", "X", "Demo", "${1:unterminated"),
        SnippetRecord::new("fine", "X", "Demo", "print(${1:'ok'})"),
    ]);
    let target = TargetContext::new("X", "py", dir.path());

    let report = emit(&store, &flattening(), &target).unwrap();

    assert_eq!(report.records, 2);
    assert_eq!(report.emitted(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].trigger, "broken");
    assert!(report.skipped[0].reason.contains("unterminated"));
    assert!(dir.path().join("fine.py").exists());
    assert!(!dir.path().join("broken.py").exists());
}

#[test]
fn test_missing_native_flag_only_matters_when_invoking() {
    let dir = tempdir().unwrap();
    let mut record = SnippetRecord::new("hide", "X", "Demo", "hide ${1:everything}");
    record.is_target_language_native = None;
    let store = MemoryStore::new(vec![record]);
    let target = TargetContext::new("X", "pml", dir.path());

    let report = emit(&store, &flattening(), &target).unwrap();
    assert_eq!(report.emitted(), 0);
    assert!(report.skipped[0].reason.contains("hide"));

    // BBEdit bodies come from the plain column and are never wrapped.
    let report = emit(&store, &editors::BBEDIT, &target).unwrap();
    assert_eq!(report.skipped.len(), 0);
}

#[test]
fn test_unsafe_triggers_are_skipped() {
    let dir = tempdir().unwrap();
    let store = MemoryStore::new(vec![
        SnippetRecord::new("../escape", "X", "Demo", "x"),
        SnippetRecord::new("..", "X", "Demo", "x"),
        SnippetRecord::new("ok", "X", "Demo", "x"),
    ]);
    let target = TargetContext::new("X", "py", dir.path());

    let report = emit(&store, &flattening(), &target).unwrap();
    assert_eq!(report.emitted(), 1);
    assert_eq!(read_tree(dir.path()).len(), 1);
}

#[test]
fn test_duplicate_triggers_abort_the_whole_run() {
    let dir = tempdir().unwrap();
    let store = MemoryStore::new(vec![
        SnippetRecord::new("dup", "X", "A", "one"),
        SnippetRecord::new("dup", "X", "B", "two"),
    ]);
    let jobs = vec![
        ExportJob {
            descriptor: flattening(),
            target: TargetContext::new("X", "py", dir.path().join("flat")),
        },
        ExportJob {
            descriptor: editors::ATOM,
            target: TargetContext::new("X", "py", dir.path().join("atom")),
        },
    ];

    let err = export_all(&store, &jobs).unwrap_err();
    assert!(matches!(err, ExportError::DuplicateTrigger { .. }));
    assert!(!dir.path().join("flat").exists());
}

#[test]
fn test_export_is_idempotent() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    let store = MemoryStore::new(library());
    let registry = FormatRegistry::default();

    for root in [first.path(), second.path()] {
        for name in registry.list_formats() {
            let target = TargetContext::new(SCOPE, "pml", root.join(&name));
            registry.export(&store, &name, &target).unwrap();
        }
    }
    // Re-running into an existing tree overwrites in place.
    for name in registry.list_formats() {
        let target = TargetContext::new(SCOPE, "pml", first.path().join(&name));
        registry.export(&store, &name, &target).unwrap();
    }

    let a = read_tree(first.path());
    let b = read_tree(second.path());
    assert!(!a.is_empty());
    assert_eq!(a, b);
}

#[test]
fn test_aggregate_keeps_fetch_order() {
    let dir = tempdir().unwrap();
    let store = MemoryStore::new(library());
    let target = TargetContext::new(SCOPE, "pml", dir.path());

    emit(&store, &xml::GEDIT, &target).unwrap();

    let text = fs::read_to_string(dir.path().join("pml.xml")).unwrap();
    let cartoon = text.find("<tag>cartoon</tag>").unwrap();
    let label = text.find("<tag>label</tag>").unwrap();
    let fetch = text.find("<tag>fetchpy</tag>").unwrap();
    assert!(cartoon < label && label < fetch);
    assert!(text.ends_with("</snippets>\n"));
}

#[test]
fn test_quotes_survive_wrapping() {
    let dir = tempdir().unwrap();
    let store = MemoryStore::new(library());
    let target = TargetContext::new(SCOPE, "pml", dir.path());

    emit(&store, &jupyter::JUPYTERLAB, &target).unwrap();
    let label = fs::read_to_string(dir.path().join("Labels/label.py")).unwrap();
    assert_eq!(
        label,
        "cmd.do('label name CA, \"%s-%s\" % (resn, resi)')\ncmd.do('set label_size, 14')\n"
    );

    let swap = InvocationStyle::new("cmd.do(\"{line}\")", QuoteResolution::Swap).unwrap();
    let legacy = tempdir().unwrap();
    let target = TargetContext::new(SCOPE, "pml", legacy.path()).with_invocation(swap);
    emit(&store, &jupyter::JUPYTERLAB, &target).unwrap();
    let label = fs::read_to_string(legacy.path().join("Labels/label.py")).unwrap();
    assert_eq!(
        label,
        "cmd.do(\"label name CA, '%s-%s' % (resn, resi)\")\ncmd.do(\"set label_size, 14\")\n"
    );
    // Native code is never wrapped, so its quotes are left alone.
    let fetched = fs::read_to_string(legacy.path().join("Display/fetchpy.py")).unwrap();
    assert_eq!(fetched, "from pymol import cmd\ncmd.fetch('1lw9')\n\n");
}

#[test]
fn test_escape_mode_escapes_delimiter_quotes() {
    let dir = tempdir().unwrap();
    let store = MemoryStore::new(vec![SnippetRecord::new(
        "say",
        "X",
        "Demo",
        "print 'it''s'",
    )
    .with_native(YesNo::No)]);
    let target = TargetContext::new("X", "pml", dir.path());

    emit(&store, &jupyter::JUPYTERLAB, &target).unwrap();
    let out = fs::read_to_string(dir.path().join("Demo/say.py")).unwrap();
    assert_eq!(out, "cmd.do('print \\'it\\'\\'s\\'')\n");
}

#[test]
fn test_textmate_bundle_layout() {
    let dir = tempdir().unwrap();
    let store = MemoryStore::new(library());
    let target = TargetContext::new(SCOPE, "pml", dir.path());

    let report = emit(&store, &xml::TEXTMATE, &target).unwrap();

    let tree = read_tree(dir.path());
    let paths: Vec<String> = tree.keys().map(|p| p.display().to_string()).collect();
    assert_eq!(
        paths,
        vec![
            "Pml.tmbundle/Snippets/cartoon.tmSnippet",
            "Pml.tmbundle/Snippets/fetchpy.tmSnippet",
            "Pml.tmbundle/Snippets/label.tmSnippet",
            "Pml.tmbundle/dependencies.json",
            "Pml.tmbundle/info.plist",
        ]
    );
    assert_eq!(report.files.len(), 5);
}

#[test]
fn test_lighttable_index_lists_emitted_snippets() {
    let dir = tempdir().unwrap();
    let mut records = library();
    records.push(SnippetRecord::new("bad", SCOPE, "Display", "${1:oops"));
    let store = MemoryStore::new(records);
    let target = TargetContext::new(SCOPE, "pml", dir.path());

    emit(&store, &editors::LIGHTTABLE, &target).unwrap();

    let index = fs::read_to_string(dir.path().join("pml.edn")).unwrap();
    assert!(index.contains(":snippet-file \"cartoon.snip\""));
    assert!(!index.contains("bad.snip"));
}
