//! The modeling system: a run sequence bound to a time window.

use std::path::{Path, PathBuf};

use jiff::SignedDuration;
use jiff::civil::DateTime;

use crate::configuration::{
    ConfigurationFile, FileForcingsFile, MediatorOptions, ModelConfigurationFile,
    NemsConfigurationFile, RunSequence, UfsConfigurationFile, UfsModelConfigurationFile,
    UfsModelSettings, UfsOptions,
};
use crate::error::{Error, Result};
use crate::model::{EntryType, ModelEntry, RemapMethod};

/// A coupled run: what runs, from when, for how long.
#[derive(Debug, Clone)]
pub struct ModelingSystem {
    pub start_time: DateTime,
    pub end_time: DateTime,
    pub sequence: RunSequence,
}

impl ModelingSystem {
    pub fn new(start_time: DateTime, end_time: DateTime, interval: SignedDuration) -> Self {
        Self {
            start_time,
            end_time,
            sequence: RunSequence::new(interval),
        }
    }

    /// A system running `duration` from `start_time`.
    pub fn with_duration(
        start_time: DateTime,
        duration: SignedDuration,
        interval: SignedDuration,
    ) -> Result<Self> {
        let end_time = start_time.checked_add(duration).map_err(|e| {
            Error::InvalidDuration(format!("{duration} from {start_time}: {e}"))
        })?;
        Ok(Self::new(start_time, end_time, interval))
    }

    pub fn duration(&self) -> SignedDuration {
        self.end_time.duration_since(self.start_time)
    }

    pub fn interval(&self) -> SignedDuration {
        self.sequence.interval()
    }

    // ── Sequence ──

    pub fn insert(&mut self, model: ModelEntry) {
        self.sequence.insert(model);
    }

    pub fn get(&self, entry_type: EntryType) -> Result<&ModelEntry> {
        self.sequence.get(entry_type)
    }

    pub fn connect(
        &mut self,
        source: EntryType,
        target: EntryType,
        method: Option<RemapMethod>,
    ) -> Result<()> {
        self.sequence
            .connect(source, target, method, MediatorOptions::default())
    }

    pub fn mediate(
        &mut self,
        sources: Vec<EntryType>,
        functions: Vec<String>,
        targets: Vec<EntryType>,
        method: Option<RemapMethod>,
        options: MediatorOptions,
    ) -> Result<()> {
        self.sequence
            .mediate(sources, functions, targets, method, options)
    }

    pub fn processors(&self) -> usize {
        self.sequence.processors()
    }

    // ── Files ──

    pub fn nems_configure(&self) -> NemsConfigurationFile<'_> {
        NemsConfigurationFile::new(&self.sequence)
    }

    pub fn model_configure(&self, create_atm_namelist_rc: bool) -> ModelConfigurationFile<'_> {
        ModelConfigurationFile {
            sequence: &self.sequence,
            start_time: self.start_time,
            duration: self.duration(),
            create_atm_namelist_rc,
        }
    }

    pub fn config_rc(&self) -> FileForcingsFile<'_> {
        FileForcingsFile {
            sequence: &self.sequence,
        }
    }

    pub fn ufs_configure(&self, options: UfsOptions) -> UfsConfigurationFile<'_> {
        UfsConfigurationFile::new(&self.sequence, options)
    }

    pub fn ufs_model_configure(&self, settings: UfsModelSettings) -> UfsModelConfigurationFile {
        UfsModelConfigurationFile {
            start_time: self.start_time,
            duration: self.duration(),
            settings,
        }
    }

    /// Write `nems.configure`, `model_configure` and `config.rc` into
    /// `directory`. Returns the written paths.
    pub fn write(
        &self,
        directory: &Path,
        overwrite: bool,
        include_version: bool,
        create_atm_namelist_rc: bool,
    ) -> Result<Vec<PathBuf>> {
        let nems_configure = self.nems_configure();
        let model_configure = self.model_configure(create_atm_namelist_rc);
        let config_rc = self.config_rc();
        write_all(
            &[&nems_configure, &model_configure, &config_rc],
            directory,
            overwrite,
            include_version,
        )
    }

    /// Write `ufs.configure` and the UFS `model_configure` into `directory`.
    pub fn write_ufs(
        &self,
        directory: &Path,
        options: &UfsOptions,
        settings: &UfsModelSettings,
        overwrite: bool,
        include_version: bool,
    ) -> Result<Vec<PathBuf>> {
        let ufs_configure = self.ufs_configure(options.clone());
        let model_configure = self.ufs_model_configure(settings.clone());
        write_all(
            &[&ufs_configure, &model_configure],
            directory,
            overwrite,
            include_version,
        )
    }
}

fn write_all(
    files: &[&dyn ConfigurationFile],
    directory: &Path,
    overwrite: bool,
    include_version: bool,
) -> Result<Vec<PathBuf>> {
    files
        .iter()
        .map(|file| {
            let path = file.write(&directory.join(file.name()), overwrite, include_version)?;
            tracing::info!("wrote {}", path.display());
            Ok(path)
        })
        .collect()
}
