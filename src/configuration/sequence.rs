//! Run sequence: the ordered set of components and transfers.
//!
//! Model entries are stored in the positional list, where their order
//! decides processor offsets. The mediator is a member of the sequence
//! but has no position: it is kept in its own slot and never stepped.

use std::collections::BTreeMap;
use std::fmt;

use jiff::SignedDuration;

use crate::error::{Error, Result};
use crate::model::{
    Attributes, ConnectionEntry, DEFAULT_MEDIATOR_NAME, EntryType, INDENTATION, MediationEntry,
    ModelEntry, RemapMethod, SequenceEntry, indent, with_default_verbosity,
};
use crate::utilities::whole_seconds;

use super::earth::Earth;

/// Name given to a mediator created by [`RunSequence::mediate`].
const MEDIATION_MEDIATOR_NAME: &str = "mediator";

/// How to build a mediator when a sequence has to create one.
#[derive(Debug, Clone, Default)]
pub struct MediatorOptions {
    pub name: Option<String>,

    /// Processor count. On an existing mediator this can only raise the
    /// allocation.
    pub processors: Option<usize>,

    pub attributes: Attributes,
}

impl MediatorOptions {
    fn into_entry(self, default_name: &str) -> ModelEntry {
        ModelEntry::mediator(
            Some(self.name.as_deref().unwrap_or(default_name)),
            self.processors,
        )
        .with_attributes(self.attributes)
    }
}

/// Multi-model container: components, connections and mediations in order.
#[derive(Debug, Clone)]
pub struct RunSequence {
    interval: SignedDuration,
    entries: Vec<SequenceEntry>,
    /// Positional index of each non-mediator model.
    index: BTreeMap<EntryType, usize>,
    mediator: Option<ModelEntry>,
    pub attributes: Attributes,
}

impl RunSequence {
    /// An empty sequence stepping every `interval`.
    pub fn new(interval: SignedDuration) -> Self {
        Self::with_attributes(interval, Attributes::new())
    }

    /// An empty sequence with global attributes (`Verbosity = off` unless given).
    pub fn with_attributes(interval: SignedDuration, attributes: Attributes) -> Self {
        Self {
            interval,
            entries: Vec::new(),
            index: BTreeMap::new(),
            mediator: None,
            attributes: with_default_verbosity(attributes),
        }
    }

    pub fn interval(&self) -> SignedDuration {
        self.interval
    }

    /// The interval in whole seconds, ties to even.
    pub fn interval_seconds(&self) -> i64 {
        whole_seconds(self.interval)
    }

    // ── Membership ──

    /// Add an entry.
    ///
    /// A model replaces any model of the same type; the replaced entry
    /// leaves the positional list and the new one goes to its end. A
    /// mediator goes to the mediator slot. Connections and mediations
    /// must refer to members.
    pub fn append(&mut self, entry: impl Into<SequenceEntry>) -> Result<()> {
        match entry.into() {
            SequenceEntry::Model(model) => self.insert(model),
            SequenceEntry::Connection(connection) => {
                self.require(connection.source)?;
                self.require(connection.target)?;
                self.entries.push(SequenceEntry::Connection(connection));
            }
            SequenceEntry::Mediation(mediation) => {
                self.require(EntryType::Mediator)?;
                for endpoint in mediation.endpoints() {
                    self.require(endpoint)?;
                }
                self.entries.push(SequenceEntry::Mediation(mediation));
            }
        }
        Ok(())
    }

    /// Add several entries in order, stopping at the first failure.
    pub fn extend(&mut self, entries: impl IntoIterator<Item = SequenceEntry>) -> Result<()> {
        for entry in entries {
            self.append(entry)?;
        }
        Ok(())
    }

    /// Add or replace a model entry.
    pub fn insert(&mut self, model: ModelEntry) {
        let model_type = model.entry_type;
        if model_type == EntryType::Mediator {
            if let Some(existing) = &self.mediator {
                tracing::warn!(
                    "overwriting {model_type} model \"{}\" with \"{}\"",
                    existing.name,
                    model.name
                );
            }
            self.mediator = Some(model);
        } else {
            if let Some(&position) = self.index.get(&model_type) {
                if let Some(existing) = self.entries[position].as_model() {
                    tracing::warn!(
                        "overwriting {model_type} model \"{}\" with \"{}\"",
                        existing.name,
                        model.name
                    );
                }
                self.entries.remove(position);
            }
            self.entries.push(SequenceEntry::Model(model));
        }
        self.rebuild_index();
        self.relink();
    }

    /// Declare a direct transfer between two members.
    ///
    /// If either end is the mediator and the sequence has none, one is
    /// created from `mediator`.
    pub fn connect(
        &mut self,
        source: EntryType,
        target: EntryType,
        method: Option<RemapMethod>,
        mediator: MediatorOptions,
    ) -> Result<()> {
        for endpoint in [source, target] {
            if endpoint != EntryType::Mediator {
                self.require(endpoint)?;
            }
        }
        let involves_mediator = source == EntryType::Mediator || target == EntryType::Mediator;
        if involves_mediator && self.mediator.is_none() {
            tracing::debug!("creating mediator for {source} -> {target}");
            self.mediator = Some(mediator.into_entry(DEFAULT_MEDIATOR_NAME));
            self.relink();
        }
        self.entries.push(SequenceEntry::Connection(ConnectionEntry::new(
            source,
            target,
            method.unwrap_or_default(),
        )));
        Ok(())
    }

    /// Declare a mediator-brokered exchange.
    ///
    /// Creates the mediator (named `mediator` unless `options` says
    /// otherwise) if the sequence has none. Otherwise merges the given
    /// attributes into it and raises its processor count to
    /// `options.processors` when that is larger.
    pub fn mediate(
        &mut self,
        sources: Vec<EntryType>,
        functions: Vec<String>,
        targets: Vec<EntryType>,
        method: Option<RemapMethod>,
        options: MediatorOptions,
    ) -> Result<()> {
        for &endpoint in sources.iter().chain(&targets) {
            if endpoint != EntryType::Mediator {
                self.require(endpoint)?;
            }
        }

        match &mut self.mediator {
            None => {
                self.mediator = Some(options.into_entry(MEDIATION_MEDIATOR_NAME));
                self.relink();
            }
            Some(mediator) => {
                mediator.attributes.extend(options.attributes);
                if let Some(processors) = options.processors
                    && mediator.processors() < processors
                {
                    mediator.set_processors(processors);
                }
            }
        }

        self.entries.push(SequenceEntry::Mediation(MediationEntry {
            sources,
            functions,
            targets,
            method: method.unwrap_or_default(),
        }));
        Ok(())
    }

    /// Positional entries in order: model steps, connections and mediations.
    pub fn sequence(&self) -> &[SequenceEntry] {
        &self.entries
    }

    /// Replace the positional list.
    ///
    /// The type map is rebuilt from the new list and the current mediator
    /// is kept (a mediator entry in the list replaces it). Fails without
    /// changing anything if two models share a type or a transfer refers to
    /// a type that is not a member.
    pub fn set_sequence(&mut self, entries: Vec<SequenceEntry>) -> Result<()> {
        let mut mediator = self.mediator.clone();
        let mut positional = Vec::with_capacity(entries.len());
        let mut members = BTreeMap::new();
        let mut replaced_mediator = false;

        for entry in entries {
            match entry {
                SequenceEntry::Model(model) if model.entry_type == EntryType::Mediator => {
                    if replaced_mediator {
                        return Err(Error::DuplicateComponent(EntryType::Mediator));
                    }
                    replaced_mediator = true;
                    mediator = Some(model);
                }
                SequenceEntry::Model(model) => {
                    if members.insert(model.entry_type, positional.len()).is_some() {
                        return Err(Error::DuplicateComponent(model.entry_type));
                    }
                    positional.push(SequenceEntry::Model(model));
                }
                other => positional.push(other),
            }
        }

        let is_member = |entry_type: EntryType| {
            if entry_type == EntryType::Mediator {
                mediator.is_some()
            } else {
                members.contains_key(&entry_type)
            }
        };
        for entry in &positional {
            let missing = match entry {
                SequenceEntry::Model(_) => None,
                SequenceEntry::Connection(connection) => [connection.source, connection.target]
                    .into_iter()
                    .find(|&t| !is_member(t)),
                SequenceEntry::Mediation(mediation) => std::iter::once(EntryType::Mediator)
                    .chain(mediation.endpoints())
                    .find(|&t| !is_member(t)),
            };
            if let Some(entry_type) = missing {
                return Err(Error::MissingComponent(entry_type));
            }
        }

        self.entries = positional;
        self.mediator = mediator;
        self.index = members;
        self.relink();
        Ok(())
    }

    // ── Lookups ──

    /// The member of the given type.
    pub fn get(&self, entry_type: EntryType) -> Result<&ModelEntry> {
        let found = if entry_type == EntryType::Mediator {
            self.mediator.as_ref()
        } else {
            self.index
                .get(&entry_type)
                .and_then(|&position| self.entries[position].as_model())
        };
        found.ok_or(Error::MissingComponent(entry_type))
    }

    pub fn contains(&self, entry_type: EntryType) -> bool {
        if entry_type == EntryType::Mediator {
            self.mediator.is_some()
        } else {
            self.index.contains_key(&entry_type)
        }
    }

    pub fn mediator(&self) -> Option<&ModelEntry> {
        self.mediator.as_ref()
    }

    /// Models in the sequence: the mediator first, then components in
    /// positional order.
    pub fn models(&self) -> Vec<&ModelEntry> {
        self.mediator.iter().chain(self.components()).collect()
    }

    /// Non-mediator models in positional order.
    pub fn components(&self) -> impl Iterator<Item = &ModelEntry> {
        self.entries.iter().filter_map(SequenceEntry::as_model)
    }

    /// Connections and mediations, in order.
    pub fn connections(&self) -> impl Iterator<Item = &SequenceEntry> {
        self.entries
            .iter()
            .filter(|entry| !matches!(entry, SequenceEntry::Model(_)))
    }

    pub fn mediations(&self) -> impl Iterator<Item = &MediationEntry> {
        self.entries.iter().filter_map(|entry| match entry {
            SequenceEntry::Mediation(mediation) => Some(mediation),
            _ => None,
        })
    }

    /// Total processors over every member, mediator included.
    pub fn processors(&self) -> usize {
        self.models().iter().map(|model| model.processors()).sum()
    }

    /// Number of positional entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The Earth system view of this sequence.
    pub fn earth(&self) -> Earth<'_> {
        let mut earth = Earth::new(&self.attributes);
        for model in self.models() {
            earth.insert(model);
        }
        earth
    }

    // ── Linking ──

    fn require(&self, entry_type: EntryType) -> Result<()> {
        if self.contains(entry_type) {
            Ok(())
        } else {
            Err(Error::MissingComponent(entry_type))
        }
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(position, entry)| Some((entry.as_model()?.entry_type, position)))
            .collect();
    }

    /// Reset every model's links, then chain the positional models so each
    /// starts where the previous one ends. The mediator is not chained.
    fn relink(&mut self) {
        if let Some(mediator) = &mut self.mediator {
            mediator.unlink();
        }
        for entry in &mut self.entries {
            if let Some(model) = entry.as_model_mut() {
                model.unlink();
            }
        }

        let mut positions: Vec<usize> = self.index.values().copied().collect();
        positions.sort_unstable();
        for pair in positions.windows(2) {
            let (previous_position, position) = (pair[0], pair[1]);
            let (head, tail) = self.entries.split_at_mut(position);
            if let (Some(previous), Some(model)) = (
                head[previous_position].as_model_mut(),
                tail[0].as_model_mut(),
            ) {
                model.link_after(previous_position, previous);
                previous.link_before(position);
            }
        }
    }
}

impl fmt::Display for RunSequence {
    /// The NEMS `runSeq` block built from the declared entries.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self
            .entries
            .iter()
            .flat_map(SequenceEntry::sequence_lines)
            .collect::<Vec<_>>()
            .join("\n");
        let block = format!(
            "@{}\n{}\n@",
            self.interval_seconds(),
            indent(&lines, INDENTATION)
        );
        write!(f, "runSeq::\n{}\n::", indent(&block, INDENTATION))
    }
}
