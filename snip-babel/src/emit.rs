//! Snippet emission pipeline.
//!
//! Turns the records of one scope into a target's files, driven entirely by a
//! [`FormatDescriptor`]:
//!
//! 1. fetch the records through the [`SnippetStore`]
//! 2. group them by category when the layout is hierarchical
//! 3. run the placeholder pipeline, strip leftover final markers, run the wrap pipeline and
//!    append the target's own final marker
//! 4. render stanzas and write either one file per snippet or one aggregate file
//!
//! Record-level failures (malformed placeholders, quote sentinel collisions, missing flags, bad
//! triggers) skip the record with a warning. Anything else stops the emitter. Files are written
//! to a temporary file in the destination directory and persisted atomically.

use crate::error::ExportError;
use crate::format::{FormatDescriptor, RenderedSnippet, TargetContext};
use crate::group::{category_directories, group_by_category};
use crate::placeholder::{PlaceholderBody, RewriteOp};
use crate::record::SnippetRecord;
use crate::store::SnippetStore;
use crate::wrap::{apply_wrap_ops, WrapContext, WrapError};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::Builder;

/// A record left out of an emitter's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub trigger: String,
    pub reason: String,
}

/// Summary of one emitter run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmitReport {
    pub format: String,
    /// Records fetched for the target's scope.
    pub records: usize,
    /// Files written, companions included, in write order.
    pub files: Vec<PathBuf>,
    pub skipped: Vec<SkippedRecord>,
}

impl EmitReport {
    fn new(format: &str) -> Self {
        Self {
            format: format.to_string(),
            ..Self::default()
        }
    }

    /// Records that made it into the output.
    pub fn emitted(&self) -> usize {
        self.records - self.skipped.len()
    }

    fn skip(&mut self, trigger: &str, reason: String) {
        self.skipped.push(SkippedRecord {
            trigger: trigger.to_string(),
            reason,
        });
    }
}

/// One emitter to run in [`export_all`].
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub descriptor: FormatDescriptor,
    pub target: TargetContext,
}

/// Outcome of one job in [`export_all`].
pub type JobOutcome = (String, Result<EmitReport, ExportError>);

/// Reject triggers that cannot be used as a file name.
pub fn validate_trigger(trigger: &str) -> Result<(), ExportError> {
    let bad = trigger.trim().is_empty()
        || trigger.contains(|c: char| c == '/' || c == '\\')
        || trigger == "."
        || trigger == "..";
    if bad {
        Err(ExportError::InvalidTrigger {
            trigger: trigger.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Run the descriptor's pipelines over one record's body.
pub fn render_body(
    descriptor: &FormatDescriptor,
    record: &SnippetRecord,
    target: &TargetContext,
) -> Result<String, ExportError> {
    let source = descriptor.body_source.select(record);
    let parsed =
        PlaceholderBody::parse(&source).map_err(|e| ExportError::MalformedPlaceholder {
            trigger: record.trigger.clone(),
            reason: e.to_string(),
        })?;

    let rewritten = parsed
        .clone()
        .apply_all(descriptor.placeholder_pipeline)
        .apply(RewriteOp::StripFinalMarker)
        .render();
    let reference = parsed.apply(RewriteOp::StripFinalMarker).render();

    let ctx = WrapContext {
        invocation: &target.invocation,
        native: record.is_target_language_native,
        reference: &reference,
    };
    let wrapped = apply_wrap_ops(rewritten, descriptor.wrap_pipeline, &ctx)
        .map_err(|e| lift_wrap_error(&record.trigger, e))?;

    Ok(match descriptor.final_marker {
        Some(marker) => {
            let pad = " ".repeat(descriptor.body_indent());
            format!("{wrapped}\n\n{pad}{marker}")
        }
        None => wrapped,
    })
}

fn lift_wrap_error(trigger: &str, err: WrapError) -> ExportError {
    let trigger = trigger.to_string();
    match err {
        WrapError::EscapeCollision => ExportError::EscapeCollision { trigger },
        WrapError::MissingNativeFlag => ExportError::MissingNativeFlag { trigger },
        WrapError::MissingLinePlaceholder(_) => ExportError::InvalidInvocation(err.to_string()),
    }
}

/// Render one record's stanza as the target would contain it. Nothing is written.
pub fn render_record(
    descriptor: &FormatDescriptor,
    record: &SnippetRecord,
    target: &TargetContext,
) -> Result<String, ExportError> {
    validate_trigger(&record.trigger)?;
    let body = render_body(descriptor, record, target)?;
    Ok((descriptor.record_template)(&RenderedSnippet {
        record,
        body: &body,
        target,
    }))
}

/// Records of one category (or of the whole scope) with their rendered bodies.
struct Section {
    category: Option<String>,
    items: Vec<(SnippetRecord, String)>,
}

/// Export one target.
pub fn emit(
    store: &dyn SnippetStore,
    descriptor: &FormatDescriptor,
    target: &TargetContext,
) -> Result<EmitReport, ExportError> {
    let records = store.fetch(&target.scope)?;
    debug!(
        "{}: fetched {} records for scope '{}'",
        descriptor.name,
        records.len(),
        target.scope
    );

    let mut report = EmitReport::new(descriptor.name);
    report.records = records.len();

    let groups: Vec<(Option<String>, Vec<SnippetRecord>)> = if descriptor.layout.is_grouped() {
        group_by_category(records)
            .into_iter()
            .map(|(category, group)| (Some(category), group))
            .collect()
    } else {
        vec![(None, records)]
    };

    let mut sections = Vec::with_capacity(groups.len());
    for (category, group) in groups {
        let mut items = Vec::with_capacity(group.len());
        for record in group {
            let rendered = validate_trigger(&record.trigger)
                .and_then(|_| render_body(descriptor, &record, target));
            match rendered {
                Ok(body) => items.push((record, body)),
                Err(err) if err.is_record_level() => {
                    warn!("{}: skipping '{}': {err}", descriptor.name, record.trigger);
                    report.skip(&record.trigger, err.to_string());
                }
                Err(err) => return Err(err),
            }
        }
        sections.push(Section { category, items });
    }

    if descriptor.layout.one_file_per_snippet() {
        write_per_snippet(descriptor, target, &sections, &mut report)?;
    } else {
        write_aggregate(descriptor, target, &sections, &mut report)?;
    }

    let snippets: Vec<RenderedSnippet<'_>> = sections
        .iter()
        .flat_map(|section| section.items.iter())
        .map(|(record, body)| RenderedSnippet {
            record,
            body,
            target,
        })
        .collect();
    for companion in (descriptor.companions)(target, &snippets) {
        let path = target.output_dir.join(&companion.path);
        write_atomic(&path, &companion.contents)?;
        report.files.push(path);
    }

    info!(
        "{}: {} of {} records exported to {} files ({} skipped)",
        descriptor.name,
        report.emitted(),
        report.records,
        report.files.len(),
        report.skipped.len()
    );
    Ok(report)
}

fn write_aggregate(
    descriptor: &FormatDescriptor,
    target: &TargetContext,
    sections: &[Section],
    report: &mut EmitReport,
) -> Result<(), ExportError> {
    let mut contents = (descriptor.preamble)(target);
    for section in sections {
        let category = section.category.as_deref();
        if let (Some(open), Some(category)) = (descriptor.category_open, category) {
            contents.push_str(&open(category, target));
        }
        let stanzas: Vec<String> = section
            .items
            .iter()
            .map(|(record, body)| {
                (descriptor.record_template)(&RenderedSnippet {
                    record,
                    body,
                    target,
                })
            })
            .collect();
        contents.push_str(&stanzas.join(descriptor.separator));
        if let (Some(close), Some(category)) = (descriptor.category_close, category) {
            contents.push_str(&close(category, target));
        }
    }
    contents.push_str(&(descriptor.postamble)(target));

    let path = target.output_dir.join(descriptor.expand_path(target, None));
    write_atomic(&path, &contents)?;
    report.files.push(path);
    Ok(())
}

fn write_per_snippet(
    descriptor: &FormatDescriptor,
    target: &TargetContext,
    sections: &[Section],
    report: &mut EmitReport,
) -> Result<(), ExportError> {
    let directories = if descriptor.layout.needs_category_subdirs() {
        category_directories(sections.iter().filter_map(|s| s.category.as_deref()))
    } else {
        Default::default()
    };

    let mut written: HashSet<PathBuf> = HashSet::new();
    for section in sections {
        let base = match section.category.as_ref().and_then(|c| directories.get(c)) {
            Some(dir) => target.output_dir.join(dir),
            None => target.output_dir.clone(),
        };
        create_dir(&base)?;

        for (record, body) in &section.items {
            let path = base.join(descriptor.expand_path(target, Some(record)));
            if !written.insert(path.clone()) {
                warn!(
                    "{}: '{}' resolves to already written {}, skipping",
                    descriptor.name,
                    record.trigger,
                    path.display()
                );
                report.skip(
                    &record.trigger,
                    format!("output path {} already written", path.display()),
                );
                continue;
            }
            let contents = (descriptor.record_template)(&RenderedSnippet {
                record,
                body,
                target,
            });
            write_atomic(&path, &contents)?;
            report.files.push(path);
        }
    }
    Ok(())
}

fn create_dir(path: &Path) -> Result<(), ExportError> {
    fs::create_dir_all(path).map_err(|source| ExportError::DirectoryCreation {
        path: path.to_path_buf(),
        source,
    })
}

/// Write through a temporary file in the destination directory, then rename into place.
fn write_atomic(path: &Path, contents: &str) -> Result<(), ExportError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    create_dir(dir)?;

    let write_err = |source: std::io::Error| ExportError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut tmp = temp_builder().tempfile_in(dir).map_err(write_err)?;
    if let Ok(existing) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .map_err(write_err)?;
    }
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    debug!("Wrote {}", path.display());
    Ok(())
}

/// Temporary files are created `0o644` minus the umask, like any other exported file.
#[cfg(unix)]
fn temp_builder() -> Builder<'static, 'static> {
    use std::os::unix::fs::PermissionsExt;
    let mut builder = Builder::new();
    builder.permissions(fs::Permissions::from_mode(0o644));
    builder
}

#[cfg(not(unix))]
fn temp_builder() -> Builder<'static, 'static> {
    Builder::new()
}

/// Run several emitters in order.
///
/// A failing emitter does not stop the others, except for store-level errors which abort the
/// whole run.
pub fn export_all(
    store: &dyn SnippetStore,
    jobs: &[ExportJob],
) -> Result<Vec<JobOutcome>, ExportError> {
    let mut outcomes = Vec::with_capacity(jobs.len());
    for job in jobs {
        match emit(store, &job.descriptor, &job.target) {
            Err(err) if err.is_store_level() => return Err(err),
            Err(err) => {
                warn!("{}: export failed: {err}", job.descriptor.name);
                outcomes.push((job.descriptor.name.to_string(), Err(err)));
            }
            Ok(report) => outcomes.push((job.descriptor.name.to_string(), Ok(report))),
        }
    }
    Ok(outcomes)
}
