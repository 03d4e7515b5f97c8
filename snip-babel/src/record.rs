//! The canonical snippet record
//!
//! One row of the snippet store. Records are read-only inside this crate: they are created and
//! edited in the external store and only projected into editor formats here.

/// Character separating the keywords of [`SnippetRecord::index_tags`].
pub const TAG_DELIMITER: char = '!';

/// A `Y`/`N` column of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    /// Parse a raw column value. Anything other than `Y`/`N` (case-insensitive) is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Y" | "y" => Some(YesNo::Yes),
            "N" | "n" => Some(YesNo::No),
            _ => None,
        }
    }
}

/// One snippet as stored in the snippet table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SnippetRecord {
    /// Shorthand that invokes insertion; also used in file names.
    pub trigger: String,
    /// Descriptive language label.
    pub language: String,
    /// Selection key of the record.
    pub scope: String,
    /// Free-text grouping key.
    pub category: String,
    /// One-line description.
    pub caption: String,
    /// Body text in the canonical placeholder grammar.
    pub body: String,
    /// Body pre-escaped for embedding as a JSON value.
    pub body_alt_json: String,
    /// Body using percent-style placeholders.
    pub body_alt_plain: String,
    /// `Y` when the body is already host-language code, `N` when it must be wrapped.
    pub is_target_language_native: Option<YesNo>,
    pub has_alternate_version: Option<YesNo>,
    /// Keywords separated by [`TAG_DELIMITER`].
    pub index_tags: String,
    pub citation_key: String,
    pub page_number: String,
}

impl SnippetRecord {
    /// Minimal record, mostly useful for tests and in-memory stores.
    pub fn new(
        trigger: impl Into<String>,
        scope: impl Into<String>,
        category: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            trigger: trigger.into(),
            scope: scope.into(),
            category: category.into(),
            body: body.into(),
            is_target_language_native: Some(YesNo::Yes),
            ..Self::default()
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    pub fn with_native(mut self, native: YesNo) -> Self {
        self.is_target_language_native = Some(native);
        self
    }

    pub fn with_index_tags(mut self, tags: impl Into<String>) -> Self {
        self.index_tags = tags.into();
        self
    }

    /// Split [`Self::index_tags`] into its keywords, dropping empty entries.
    pub fn tags(&self) -> Vec<&str> {
        self.index_tags
            .split(TAG_DELIMITER)
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}
