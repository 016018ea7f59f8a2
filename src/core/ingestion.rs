/*
 * Entry point for raw file batches coming from the markdown picker, the
 * template picker, the dropzone or an OS-level drag and drop. Files are sorted
 * by extension into markdown sections and template candidates; anything else
 * is dropped without comment.
 *
 * A passive batch (dropzone, OS drop) only fills an empty template slot. Only
 * an explicit template-picker action replaces a template that is already set.
 * Capacity overflow is reported in the returned `IngestionReport`; turning it
 * into user feedback is the caller's job.
 */
use crate::core::file_descriptor::{FileDescriptor, file_extension};
use crate::core::section_collection::{AddOutcome, SectionCollection};
use crate::core::template_slot::TemplateSlot;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const MARKDOWN_EXTENSIONS: [&str; 3] = ["md", "markdown", "mdx"];
pub const TEMPLATE_EXTENSION: &str = "docx";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Markdown,
    Template,
    Unrecognized,
}

pub fn file_kind(name: &str) -> FileKind {
    match file_extension(name) {
        Some(ext) if MARKDOWN_EXTENSIONS.contains(&ext.as_str()) => FileKind::Markdown,
        Some(ext) if ext == TEMPLATE_EXTENSION => FileKind::Template,
        _ => FileKind::Unrecognized,
    }
}

pub fn is_markdown(file: &FileDescriptor) -> bool {
    file_kind(&file.name) == FileKind::Markdown
}

#[derive(Debug, Default)]
pub struct ClassifiedBatch {
    pub markdown: Vec<FileDescriptor>,
    pub templates: Vec<FileDescriptor>,
    pub unrecognized: Vec<FileDescriptor>,
}

// Partitions a batch by kind, keeping the input order inside each partition.
pub fn classify(files: Vec<FileDescriptor>) -> ClassifiedBatch {
    let mut batch = ClassifiedBatch::default();
    for file in files {
        match file_kind(&file.name) {
            FileKind::Markdown => batch.markdown.push(file),
            FileKind::Template => batch.templates.push(file),
            FileKind::Unrecognized => {
                log::debug!("Ingestion: Ignoring unrecognized file '{}'", file.name);
                batch.unrecognized.push(file);
            }
        }
    }
    batch
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestionReport {
    pub outcome: AddOutcome,
    // Free slots before the batch was applied; used for the overflow message.
    pub free_slots_before: usize,
    pub template_assigned: bool,
    pub unrecognized_count: usize,
}

impl IngestionReport {
    /*
     * The user-facing capacity message, present only when some files were
     * rejected purely for lack of room.
     */
    pub fn overflow_warning(&self) -> Option<String> {
        if self.outcome.overflow_count == 0 {
            return None;
        }
        let free = self.free_slots_before;
        Some(format!(
            "Only {free} more file{} allowed; extra files were ignored.",
            if free == 1 { "" } else { "s" }
        ))
    }
}

/*
 * Handles a passive batch from the dropzone or an OS drop. Markdown files go
 * to the collection; the first template candidate is assigned only when the
 * slot is empty.
 */
pub fn ingest_batch(
    files: Vec<FileDescriptor>,
    collection: &mut SectionCollection,
    slot: &mut TemplateSlot,
) -> IngestionReport {
    let batch = classify(files);
    let mut report = IngestionReport {
        free_slots_before: collection.remaining_capacity(),
        unrecognized_count: batch.unrecognized.len(),
        ..IngestionReport::default()
    };
    if !batch.markdown.is_empty() {
        report.outcome = collection.add(batch.markdown, is_markdown);
    }
    if let Some(first_template) = batch.templates.into_iter().next() {
        if slot.is_set() {
            log::debug!(
                "Ingestion: Template already set; not replacing it with dropped '{}'",
                first_template.name
            );
        } else {
            log::debug!("Ingestion: Auto-assigning template '{}'", first_template.name);
            slot.set(first_template);
            report.template_assigned = true;
        }
    }
    log::debug!("Ingestion: Batch report {report:?}");
    report
}

// Markdown picker: only markdown files are considered.
pub fn ingest_markdown_pick(
    files: Vec<FileDescriptor>,
    collection: &mut SectionCollection,
) -> IngestionReport {
    let free_slots_before = collection.remaining_capacity();
    let total = files.len();
    let outcome = collection.add(files, is_markdown);
    let consumed = outcome.accepted_count + outcome.overflow_count + outcome.duplicate_count;
    IngestionReport {
        outcome,
        free_slots_before,
        template_assigned: false,
        unrecognized_count: total - consumed,
    }
}

/*
 * Template picker: an explicit user choice, so it replaces whatever is in the
 * slot. `None` (picker cancelled or emptied) clears the slot.
 */
pub fn ingest_template_pick(file: Option<FileDescriptor>, slot: &mut TemplateSlot) -> bool {
    match file {
        Some(file) => {
            slot.set(file);
            true
        }
        None => {
            slot.clear();
            false
        }
    }
}

/*
 * Turns paths given on the command line or dropped from the OS into
 * descriptors. A directory contributes its immediate files in name order.
 * Unreadable entries are logged and skipped; classification happens later.
 */
pub fn expand_paths(paths: &[PathBuf]) -> Vec<FileDescriptor> {
    let mut descriptors = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
            {
                match entry {
                    Ok(entry) if entry.file_type().is_file() => {
                        push_descriptor(entry.path(), &mut descriptors)
                    }
                    Ok(_) => {}
                    Err(e) => log::warn!("Ingestion: Failed to read entry under {path:?}: {e}"),
                }
            }
        } else {
            push_descriptor(path, &mut descriptors);
        }
    }
    descriptors
}

fn push_descriptor(path: &Path, descriptors: &mut Vec<FileDescriptor>) {
    match FileDescriptor::from_path(path) {
        Ok(descriptor) => descriptors.push(descriptor),
        Err(e) => log::warn!("Ingestion: Skipping {path:?}: {e}"),
    }
}
