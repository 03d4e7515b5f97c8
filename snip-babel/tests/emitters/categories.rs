//! Category grouping as seen through the category-tree and grouped-menu targets.

use crate::common::read_tree;
use snip_babel::formats::jupyter;
use snip_babel::group::{group_by_category, to_pascal_case};
use snip_babel::{emit, MemoryStore, SnippetRecord, SnippetStore, TargetContext};
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_case_sensitive_categories_get_separate_directories() {
    let dir = tempdir().unwrap();
    let store = MemoryStore::new(vec![
        SnippetRecord::new("det", "X", "Linear Algebra", "det(${1:A})"),
        SnippetRecord::new("inv", "X", "linear algebra", "inv(${1:A})"),
    ]);
    let target = TargetContext::new("X", "py", dir.path());

    emit(&store, &jupyter::JUPYTERLAB, &target).unwrap();

    let paths: Vec<PathBuf> = read_tree(dir.path()).into_keys().collect();
    assert_eq!(
        paths,
        vec![
            PathBuf::from("LinearAlgebra/det.py"),
            PathBuf::from("LinearAlgebra-2/inv.py"),
        ]
    );
}

#[test]
fn test_blank_categories_land_in_uncategorized() {
    let dir = tempdir().unwrap();
    let store = MemoryStore::new(vec![
        SnippetRecord::new("a", "X", "", "a"),
        SnippetRecord::new("b", "X", "   ", "b"),
    ]);
    let target = TargetContext::new("X", "py", dir.path());

    let report = emit(&store, &jupyter::JUPYTERLAB_LATEX, &target).unwrap();

    assert_eq!(report.emitted(), 2);
    assert!(dir.path().join("Uncategorized/a.tex").exists());
    assert!(dir.path().join("Uncategorized/b.tex").exists());
}

#[test]
fn test_grouping_orders_categories_then_triggers() {
    let records = vec![
        SnippetRecord::new("z", "X", "a", ""),
        SnippetRecord::new("y", "X", "b", ""),
        SnippetRecord::new("x", "X", "b", ""),
    ];
    let grouped = group_by_category(records);
    let order: Vec<(String, Vec<String>)> = grouped
        .into_iter()
        .map(|(category, group)| (category, group.into_iter().map(|r| r.trigger).collect()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("a".to_string(), vec!["z".to_string()]),
            ("b".to_string(), vec!["x".to_string(), "y".to_string()]),
        ]
    );
}

#[test]
fn test_category_names_with_punctuation() {
    assert_eq!(to_pascal_case(""), "");
    assert_eq!(to_pascal_case("a b c"), "ABC");
    assert_eq!(to_pascal_case("multi  space"), "MultiSpace");
    assert_eq!(to_pascal_case("x-ray (data)!"), "X-ray(data)!");
}

#[test]
fn test_distinct_categories() {
    let store = MemoryStore::new(vec![
        SnippetRecord::new("a", "X", "Display", ""),
        SnippetRecord::new("b", "X", "Display", ""),
        SnippetRecord::new("c", "X", "Labels", ""),
        SnippetRecord::new("d", "Y", "Other", ""),
    ]);
    let categories: Vec<String> = store.distinct_categories("X").unwrap().into_iter().collect();
    assert_eq!(categories, vec!["Display", "Labels"]);
}

#[test]
fn test_elyra_tree_uses_pascal_cased_directories() {
    let dir = tempdir().unwrap();
    let store = MemoryStore::new(vec![SnippetRecord::new(
        "fft",
        "X",
        "signal processing",
        "np.fft.fft(${1:x})",
    )
    .with_index_tags("fourier!numpy")]);
    let target = TargetContext::new("X", "python", dir.path());

    emit(&store, &jupyter::ELYRA, &target).unwrap();

    let text = std::fs::read_to_string(dir.path().join("SignalProcessing/fft.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(doc["metadata"]["code"][0], "np.fft.fft(x)");
    assert_eq!(doc["metadata"]["tags"][3], "numpy");
}
