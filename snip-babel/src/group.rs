//! Category grouping
//!
//! Hierarchical targets (category directories, submenus) need records grouped by category and
//! ordered by `(category, trigger)`. Category text is free-form, so directory names are derived
//! with [`to_pascal_case`] and de-duplicated by [`category_directories`].

use crate::record::SnippetRecord;
use log::warn;
use std::collections::{BTreeMap, HashSet};

/// Bucket for records whose category is empty.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Group records by category, each group sorted by trigger.
///
/// Ordering is byte-wise and case-sensitive, so `"Linear Algebra"` and `"linear algebra"` are
/// separate groups. The sort is stable: records with equal triggers keep fetch order.
pub fn group_by_category(records: Vec<SnippetRecord>) -> BTreeMap<String, Vec<SnippetRecord>> {
    let mut groups: BTreeMap<String, Vec<SnippetRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(category_key(&record.category).to_string())
            .or_default()
            .push(record);
    }
    for group in groups.values_mut() {
        group.sort_by(|a, b| a.trigger.cmp(&b.trigger));
    }
    groups
}

/// Grouping key of a category, mapping blank text to [`UNCATEGORIZED`].
pub fn category_key(category: &str) -> &str {
    if category.trim().is_empty() {
        UNCATEGORIZED
    } else {
        category
    }
}

/// Capitalise the first character and every character after a run of spaces, dropping spaces.
///
/// All other characters pass through unchanged, trailing punctuation included.
pub fn to_pascal_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut capitalise = true;
    for c in s.chars() {
        if c == ' ' {
            capitalise = true;
            continue;
        }
        if capitalise {
            out.extend(c.to_uppercase());
            capitalise = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Map each category to the directory name it is written under.
///
/// Names are the PascalCase form with path separators replaced by `-`. Categories that collide
/// after conversion are never merged: later ones (in sort order) get `-2`, `-3`, ... appended.
/// Collisions are detected ignoring case, so the tree survives case-insensitive filesystems.
pub fn category_directories<'a>(
    categories: impl IntoIterator<Item = &'a str>,
) -> BTreeMap<String, String> {
    let mut sorted: Vec<&str> = categories.into_iter().collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut taken: HashSet<String> = HashSet::new();
    let mut dirs = BTreeMap::new();
    for category in sorted {
        let base = directory_stem(category);
        let mut name = base.clone();
        let mut n = 2;
        while !taken.insert(name.to_lowercase()) {
            name = format!("{base}-{n}");
            n += 1;
        }
        if name != base {
            warn!("Category '{category}' collides with another category as '{base}', using '{name}'");
        }
        dirs.insert(category.to_string(), name);
    }
    dirs
}

fn directory_stem(category: &str) -> String {
    let pascal: String = to_pascal_case(category)
        .chars()
        .map(|c| if c == '/' || c == '\\' { '-' } else { c })
        .collect();
    match pascal.as_str() {
        "" | "." | ".." => to_pascal_case(UNCATEGORIZED),
        _ => pascal,
    }
}
