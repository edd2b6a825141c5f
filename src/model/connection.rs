//! Data transfers declared in a run sequence.

use super::entry::ModelEntry;
use super::kind::{EntryType, RemapMethod};

/// A one-way transfer from `source` to `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEntry {
    pub source: EntryType,
    pub target: EntryType,
    pub method: RemapMethod,
}

impl ConnectionEntry {
    pub fn new(source: EntryType, target: EntryType, method: RemapMethod) -> Self {
        Self {
            source,
            target,
            method,
        }
    }

    /// `SRC -> TGT   :remapMethod=<code>`
    pub fn sequence_line(&self) -> String {
        format!(
            "{} -> {}   :remapMethod={}",
            self.source.code(),
            self.target.code(),
            self.method.code()
        )
    }
}

/// A mediator-brokered exchange: sources feed the mediator, the mediator
/// runs its functions, then feeds the targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediationEntry {
    pub sources: Vec<EntryType>,
    pub functions: Vec<String>,
    pub targets: Vec<EntryType>,
    pub method: RemapMethod,
}

impl MediationEntry {
    /// Every entry type this mediation reads from or writes to.
    pub fn endpoints(&self) -> impl Iterator<Item = EntryType> + '_ {
        self.sources.iter().chain(&self.targets).copied()
    }

    pub fn sequence_lines(&self) -> Vec<String> {
        let mediator = EntryType::Mediator;
        let inbound = self
            .sources
            .iter()
            .map(|&source| ConnectionEntry::new(source, mediator, self.method).sequence_line());
        let functions = self
            .functions
            .iter()
            .map(|function| format!("{} {function}", mediator.code()));
        let outbound = self
            .targets
            .iter()
            .map(|&target| ConnectionEntry::new(mediator, target, self.method).sequence_line());
        inbound.chain(functions).chain(outbound).collect()
    }
}

/// One positional item of a run sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceEntry {
    /// A component step.
    Model(ModelEntry),

    Connection(ConnectionEntry),

    Mediation(MediationEntry),
}

impl SequenceEntry {
    pub fn as_model(&self) -> Option<&ModelEntry> {
        match self {
            Self::Model(model) => Some(model),
            _ => None,
        }
    }

    pub(crate) fn as_model_mut(&mut self) -> Option<&mut ModelEntry> {
        match self {
            Self::Model(model) => Some(model),
            _ => None,
        }
    }

    /// Lines this entry contributes to a NEMS `runSeq` block.
    pub fn sequence_lines(&self) -> Vec<String> {
        match self {
            Self::Model(model) => vec![model.entry_type.code().to_string()],
            Self::Connection(connection) => vec![connection.sequence_line()],
            Self::Mediation(mediation) => mediation.sequence_lines(),
        }
    }
}

impl From<ModelEntry> for SequenceEntry {
    fn from(model: ModelEntry) -> Self {
        Self::Model(model)
    }
}

impl From<ConnectionEntry> for SequenceEntry {
    fn from(connection: ConnectionEntry) -> Self {
        Self::Connection(connection)
    }
}

impl From<MediationEntry> for SequenceEntry {
    fn from(mediation: MediationEntry) -> Self {
        Self::Mediation(mediation)
    }
}
