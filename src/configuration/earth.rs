//! The Earth system: one slot per component type.

use std::collections::BTreeMap;
use std::fmt;

use crate::model::{Attributes, EntryType, ModelEntry, attribute_block};

/// Fixed-slot view of a coupled system, borrowed from a sequence.
#[derive(Debug, Clone)]
pub struct Earth<'a> {
    models: BTreeMap<EntryType, Option<&'a ModelEntry>>,
    pub attributes: &'a Attributes,
}

impl<'a> Earth<'a> {
    pub const ENTRY_TITLE: &'static str = "EARTH";

    /// An Earth system with every slot empty.
    pub fn new(attributes: &'a Attributes) -> Self {
        Self {
            models: EntryType::ALL.into_iter().map(|t| (t, None)).collect(),
            attributes,
        }
    }

    /// Fill the slot for `model`'s type, warning if it was occupied.
    pub fn insert(&mut self, model: &'a ModelEntry) {
        let slot = self.models.entry(model.entry_type).or_default();
        if let Some(existing) = slot {
            tracing::warn!(
                "overwriting existing \"{}\" model: {}",
                model.entry_type,
                existing.name
            );
        }
        *slot = Some(model);
    }

    pub fn get(&self, entry_type: EntryType) -> Option<&'a ModelEntry> {
        self.models.get(&entry_type).copied().flatten()
    }

    pub fn contains(&self, entry_type: EntryType) -> bool {
        self.get(entry_type).is_some()
    }

    /// Types with a model, in declaration order.
    pub fn components(&self) -> impl Iterator<Item = EntryType> + '_ {
        self.models
            .iter()
            .filter(|(_, model)| model.is_some())
            .map(|(&entry_type, _)| entry_type)
    }

    /// Every slot, occupied or not.
    pub fn slots(&self) -> impl Iterator<Item = (EntryType, Option<&'a ModelEntry>)> + '_ {
        self.models.iter().map(|(&entry_type, &model)| (entry_type, model))
    }
}

impl fmt::Display for Earth<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes = self
            .components()
            .map(EntryType::code)
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(f, "{}_component_list: {codes}", Self::ENTRY_TITLE)?;
        f.write_str(&attribute_block(Self::ENTRY_TITLE, self.attributes))
    }
}
