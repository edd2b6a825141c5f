//! System descriptions.
//!
//! A coupled run is described in a TOML file: the time window, the models
//! and their processors, and the transfers between them. The description
//! is deserialized as-is, then checked and turned into a
//! [`ModelingSystem`] by [`SystemDescription::build`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexmap::IndexMap;
use jiff::SignedDuration;
use serde::Deserialize;
use serde::de::IgnoredAny;

use crate::configuration::{MediatorOptions, UfsModelSettings, UfsOptions};
use crate::error::{Error, Result};
use crate::model::{
    AttributeValue, Attributes, DEFAULT_MEDIATOR_NAME, EntryType, ModelEntry, RemapMethod,
    Verbosity,
};
use crate::system::ModelingSystem;
use crate::utilities::{expand_user, parse_datetime, parse_duration};

/// A scalar attribute as written in TOML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<ConfigValue> for AttributeValue {
    fn from(value: ConfigValue) -> Self {
        match value {
            ConfigValue::Boolean(value) => Self::Boolean(value),
            ConfigValue::Integer(value) => Self::Integer(value),
            ConfigValue::Float(value) => Self::Float(value),
            ConfigValue::Text(value) => Self::Text(value),
        }
    }
}

fn attributes(values: &IndexMap<String, ConfigValue>) -> Attributes {
    values
        .iter()
        .map(|(key, value)| (key.clone(), value.clone().into()))
        .collect()
}

/// A full coupled run, as read from a description file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SystemDescription {
    /// Start of the run, e.g. `2012-10-27 00:00`.
    pub start_time: String,

    /// End of the run. Exactly one of `end_time` and `duration` is required.
    pub end_time: Option<String>,

    /// Run length, e.g. `56h`.
    pub duration: Option<String>,

    /// Coupling interval, in seconds.
    pub interval: i64,

    /// Verbosity of the Earth system and every model without its own.
    #[serde(default)]
    pub verbosity: Verbosity,

    /// Earth system attributes.
    #[serde(default)]
    pub attributes: IndexMap<String, ConfigValue>,

    #[serde(default)]
    pub models: Vec<ModelDescription>,

    pub mediator: Option<MediatorDescription>,

    #[serde(default)]
    pub connections: Vec<ConnectionDescription>,

    #[serde(default)]
    pub mediations: Vec<MediationDescription>,

    #[serde(default)]
    pub ufs: UfsDescription,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDescription {
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub name: String,
    pub processors: Option<usize>,

    /// Inclusive `[start, end]` processor range; pins the start.
    pub bounds: Option<[usize; 2]>,
    pub threads: Option<usize>,

    /// File-based forcing, listed in `config.rc`.
    pub forcing: Option<PathBuf>,

    #[serde(default)]
    pub attributes: IndexMap<String, ConfigValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MediatorDescription {
    pub name: Option<String>,
    pub processors: Option<usize>,
    pub bounds: Option<[usize; 2]>,
    pub threads: Option<usize>,

    #[serde(default)]
    pub attributes: IndexMap<String, ConfigValue>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionDescription {
    pub source: EntryType,
    pub target: EntryType,
    pub method: Option<RemapMethod>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediationDescription {
    pub sources: Vec<EntryType>,
    pub functions: Vec<String>,
    pub targets: Vec<EntryType>,
    pub method: Option<RemapMethod>,
}

/// The `[ufs]` table: run options plus `[ufs.model_configure]`.
///
/// Flattened options cannot deny unknown fields, so leftover keys are
/// collected here and rejected by [`SystemDescription::build`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UfsDescription {
    #[serde(flatten)]
    pub options: UfsOptions,
    pub model_configure: UfsModelSettings,
    #[serde(flatten)]
    unknown: BTreeMap<String, IgnoredAny>,
}

impl SystemDescription {
    /// Read a description file.
    pub fn load(path: &Path) -> Result<Self> {
        let path = expand_user(path);
        tracing::debug!("reading system description \"{}\"", path.display());
        let contents = fs::read_to_string(&path)?;
        contents.parse()
    }

    /// Check the description and assemble the system it describes.
    pub fn build(&self) -> Result<ModelingSystem> {
        if !self.ufs.unknown.is_empty() {
            let keys = self.ufs.unknown.keys().cloned().collect::<Vec<_>>();
            return Err(Error::InvalidDescription(format!(
                "unknown key(s) in [ufs]: {}",
                keys.join(", ")
            )));
        }
        let start_time = parse_datetime(&self.start_time)?;
        if self.interval <= 0 {
            return Err(Error::InvalidDescription(format!(
                "interval must be a positive number of seconds, got {}",
                self.interval
            )));
        }
        let interval = SignedDuration::from_secs(self.interval);

        let mut system = match (&self.end_time, &self.duration) {
            (Some(end_time), None) => {
                ModelingSystem::new(start_time, parse_datetime(end_time)?, interval)
            }
            (None, Some(duration)) => {
                ModelingSystem::with_duration(start_time, parse_duration(duration)?, interval)?
            }
            (Some(_), Some(_)) => {
                return Err(Error::InvalidDescription(
                    "give either end_time or duration, not both".to_string(),
                ));
            }
            (None, None) => {
                return Err(Error::InvalidDescription(
                    "one of end_time or duration is required".to_string(),
                ));
            }
        };
        if system.end_time < system.start_time {
            return Err(Error::InvalidDescription(format!(
                "end time {} is before start time {}",
                system.end_time, system.start_time
            )));
        }

        system
            .sequence
            .attributes
            .insert("Verbosity".to_string(), self.verbosity.into());
        system.sequence.attributes.extend(attributes(&self.attributes));

        for model in &self.models {
            if system.sequence.contains(model.entry_type) {
                return Err(Error::DuplicateComponent(model.entry_type));
            }
            system.insert(self.model_entry(model)?);
        }

        if let Some(mediator) = &self.mediator {
            if system.sequence.contains(EntryType::Mediator) {
                return Err(Error::InvalidDescription(
                    "mediator given both as a model and in [mediator]".to_string(),
                ));
            }
            system.insert(self.mediator_entry(mediator)?);
        }

        for connection in &self.connections {
            system.connect(connection.source, connection.target, connection.method)?;
        }
        for mediation in &self.mediations {
            system.mediate(
                mediation.sources.clone(),
                mediation.functions.clone(),
                mediation.targets.clone(),
                mediation.method,
                MediatorOptions::default(),
            )?;
        }

        tracing::debug!(
            "built system with {} models on {} processors",
            system.sequence.models().len(),
            system.processors()
        );
        Ok(system)
    }

    fn model_entry(&self, model: &ModelDescription) -> Result<ModelEntry> {
        let entry = match (model.processors, model.bounds) {
            (Some(processors), None) => ModelEntry::new(model.entry_type, &model.name, processors),
            (None, Some([start, end])) => {
                ModelEntry::with_bounds(model.entry_type, &model.name, start, end)
            }
            _ => {
                return Err(Error::InvalidDescription(format!(
                    "{} model \"{}\" needs exactly one of processors or bounds",
                    model.entry_type, model.name
                )));
            }
        };
        Ok(self.finish_entry(
            entry,
            model.threads,
            model.forcing.as_deref(),
            &model.attributes,
        ))
    }

    fn mediator_entry(&self, mediator: &MediatorDescription) -> Result<ModelEntry> {
        let entry = match (mediator.processors, mediator.bounds) {
            (_, None) => ModelEntry::mediator(mediator.name.as_deref(), mediator.processors),
            (None, Some([start, end])) => ModelEntry::with_bounds(
                EntryType::Mediator,
                mediator.name.as_deref().unwrap_or(DEFAULT_MEDIATOR_NAME),
                start,
                end,
            ),
            (Some(_), Some(_)) => {
                return Err(Error::InvalidDescription(
                    "mediator takes processors or bounds, not both".to_string(),
                ));
            }
        };
        Ok(self.finish_entry(entry, mediator.threads, None, &mediator.attributes))
    }

    fn finish_entry(
        &self,
        mut entry: ModelEntry,
        threads: Option<usize>,
        forcing: Option<&Path>,
        values: &IndexMap<String, ConfigValue>,
    ) -> ModelEntry {
        entry
            .attributes
            .insert("Verbosity".to_string(), self.verbosity.into());
        entry = entry.with_attributes(attributes(values));
        if let Some(threads) = threads {
            entry = entry.with_threads(threads);
        }
        if let Some(forcing) = forcing {
            entry = entry.with_forcing(forcing);
        }
        entry
    }
}

impl FromStr for SystemDescription {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}
