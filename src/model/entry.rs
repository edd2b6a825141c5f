//! Model entries: one coupled component and its processor allocation.

use std::fmt;
use std::path::{Path, PathBuf};

use super::attribute::{AttributeValue, Attributes, attribute_block, with_default_verbosity};
use super::kind::EntryType;

/// Column at which values start in `<CODE>_model:` style lines.
const KEY_WIDTH: usize = 32;

/// Name given to a mediator created without one.
pub const DEFAULT_MEDIATOR_NAME: &str = "implicit";

/// One component of the coupled system.
///
/// Processor bounds are inclusive. An entry built with [`ModelEntry::new`]
/// is placed by its sequence: its start follows the previous entry's
/// allocation. An entry built with [`ModelEntry::with_bounds`] keeps the
/// start it was given.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelEntry {
    pub entry_type: EntryType,
    pub name: String,
    processors: usize,
    start_processor: usize,
    pinned_start: Option<usize>,
    threads: Option<usize>,
    pub attributes: Attributes,
    forcing: Option<PathBuf>,
    previous: Option<usize>,
    next: Option<usize>,
}

impl ModelEntry {
    /// A component using `processors` processors, positioned by its sequence.
    pub fn new(entry_type: EntryType, name: impl Into<String>, processors: usize) -> Self {
        Self {
            entry_type,
            name: name.into(),
            processors,
            start_processor: 0,
            pinned_start: None,
            threads: None,
            attributes: with_default_verbosity(Attributes::new()),
            forcing: None,
            previous: None,
            next: None,
        }
    }

    /// A component occupying the inclusive processor range `start..=end`.
    ///
    /// Reversed bounds are swapped.
    pub fn with_bounds(
        entry_type: EntryType,
        name: impl Into<String>,
        start: usize,
        end: usize,
    ) -> Self {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        let mut entry = Self::new(entry_type, name, end - start + 1);
        entry.start_processor = start;
        entry.pinned_start = Some(start);
        entry
    }

    /// A mediator with an optional name (defaults to `implicit`) and
    /// processor count (defaults to 1).
    pub fn mediator(name: Option<&str>, processors: Option<usize>) -> Self {
        Self::new(
            EntryType::Mediator,
            name.unwrap_or(DEFAULT_MEDIATOR_NAME),
            processors.unwrap_or(1),
        )
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes.extend(attributes);
        self
    }

    /// Attach a forcing file, listed in `config.rc`.
    pub fn with_forcing(mut self, path: impl Into<PathBuf>) -> Self {
        self.forcing = Some(path.into());
        self
    }

    /// Header used in `# <title> #` comments and `<title>_...` keys.
    pub fn entry_title(&self) -> &'static str {
        self.entry_type.code()
    }

    pub fn processors(&self) -> usize {
        self.processors
    }

    /// Change the processor allocation; a pinned start stays where it is.
    pub fn set_processors(&mut self, processors: usize) {
        self.processors = processors;
    }

    pub fn start_processor(&self) -> usize {
        self.start_processor
    }

    /// Last processor assigned to this entry (inclusive).
    pub fn end_processor(&self) -> usize {
        (self.start_processor + self.processors).saturating_sub(1)
    }

    pub fn threads(&self) -> Option<usize> {
        self.threads
    }

    pub fn forcing(&self) -> Option<&Path> {
        self.forcing.as_deref()
    }

    /// Positional index of the entry placed before this one.
    pub fn previous(&self) -> Option<usize> {
        self.previous
    }

    /// Positional index of the entry placed after this one.
    pub fn next(&self) -> Option<usize> {
        self.next
    }

    /// Drop neighbour links and return to the root offset.
    pub(crate) fn unlink(&mut self) {
        self.previous = None;
        self.next = None;
        self.start_processor = self.pinned_start.unwrap_or(0);
    }

    /// Place this entry after `previous`, which sits at positional index
    /// `previous_index`.
    pub(crate) fn link_after(&mut self, previous_index: usize, previous: &ModelEntry) {
        self.previous = Some(previous_index);
        self.start_processor = self
            .pinned_start
            .unwrap_or(previous.start_processor + previous.processors);
    }

    pub(crate) fn link_before(&mut self, next_index: usize) {
        self.next = Some(next_index);
    }

    /// `config.rc` lines for this entry's forcing file, if it has one.
    pub fn forcing_lines(&self) -> Option<String> {
        let path = self.forcing.as_deref()?;
        let prefix = self.entry_type.code().to_lowercase();
        let directory = path.parent().map(Path::display);
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        Some(format!(
            "{prefix}_dir: {}\n{prefix}_nam: {}",
            directory.map(|d| d.to_string()).unwrap_or_default(),
            name.unwrap_or_default(),
        ))
    }
}

impl fmt::Display for ModelEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = self.entry_title();
        writeln!(f, "{:<KEY_WIDTH$}{}", format!("{title}_model:"), self.name)?;
        writeln!(
            f,
            "{:<KEY_WIDTH$}{} {}",
            format!("{title}_petlist_bounds:"),
            self.start_processor,
            self.end_processor()
        )?;
        if let Some(threads) = self.threads {
            writeln!(f, "{:<KEY_WIDTH$}{threads}", format!("{title}_omp_num_threads:"))?;
        }
        f.write_str(&attribute_block(title, &self.attributes))
    }
}
