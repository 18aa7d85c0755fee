//! Expansion of source descriptors into concrete files.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::config::SourceOptions;

use super::{SourceWarning, SourceWarningKind};

/// One result of expanding a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEntry {
    File(PathBuf),
    Warning(SourceWarning),
}

/// Expands descriptors lazily: the next descriptor is only touched once every
/// entry of the previous one has been pulled.
pub fn expand_sources(
    descriptors: &[String],
    options: SourceOptions,
) -> impl Iterator<Item = SourceEntry> + '_ {
    descriptors.iter().flat_map(move |descriptor| {
        log::debug!("expanding source {descriptor}");
        expand_descriptor(descriptor, &options)
    })
}

/// Expands a single descriptor.
///
/// - a directory is walked recursively for files with an accepted extension
/// - an existing file is taken as-is
/// - a descriptor containing `*`, `?` or `[` is a glob pattern
/// - anything else is reported as not found
pub fn expand_descriptor(descriptor: &str, options: &SourceOptions) -> Vec<SourceEntry> {
    let path = Path::new(descriptor);
    if path.is_dir() {
        return walk_directory(path, options);
    }
    // An existing file wins over pattern syntax (`data[1].json`).
    if path.is_file() {
        return vec![SourceEntry::File(path.to_path_buf())];
    }
    if is_glob_pattern(descriptor) {
        return expand_glob(descriptor);
    }
    vec![SourceEntry::Warning(SourceWarning::new(
        descriptor,
        SourceWarningKind::NotFound,
    ))]
}

fn is_glob_pattern(descriptor: &str) -> bool {
    descriptor.contains(['*', '?', '['])
}

fn walk_directory(root: &Path, options: &SourceOptions) -> Vec<SourceEntry> {
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(options.respect_ignore_files)
        .hidden(!options.include_hidden)
        .follow_links(options.follow_links)
        .max_depth(options.max_depth)
        .sort_by_file_path(|a, b| a.cmp(b));

    let mut entries = Vec::new();
    for result in builder.build() {
        match result {
            Ok(entry) => {
                let is_file = entry.file_type().is_some_and(|kind| kind.is_file());
                if is_file && options.accepts_extension(entry.path()) {
                    entries.push(SourceEntry::File(entry.into_path()));
                }
            }
            Err(error) => entries.push(SourceEntry::Warning(SourceWarning::for_path(
                root,
                SourceWarningKind::Unreadable(error.to_string()),
            ))),
        }
    }

    log::debug!(
        "directory {} expanded to {} entries",
        root.display(),
        entries.len()
    );
    entries
}

fn expand_glob(pattern: &str) -> Vec<SourceEntry> {
    let paths = match glob::glob(pattern) {
        Ok(paths) => paths,
        Err(error) => {
            return vec![SourceEntry::Warning(SourceWarning::new(
                pattern,
                SourceWarningKind::InvalidPattern(error.to_string()),
            ))]
        }
    };

    let mut entries = Vec::new();
    let mut matched_files = 0usize;
    for result in paths {
        match result {
            Ok(path) if path.is_file() => {
                matched_files += 1;
                entries.push(SourceEntry::File(path));
            }
            Ok(path) => log::debug!("glob {pattern} skipping non-file {}", path.display()),
            Err(error) => entries.push(SourceEntry::Warning(SourceWarning::for_path(
                error.path(),
                SourceWarningKind::Unreadable(error.error().to_string()),
            ))),
        }
    }

    if matched_files == 0 {
        entries.push(SourceEntry::Warning(SourceWarning::new(
            pattern,
            SourceWarningKind::NotFound,
        )));
    }
    entries
}
