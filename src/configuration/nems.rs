//! NEMS configuration files: `nems.configure`, `model_configure`, `config.rc`.

use std::path::{Path, PathBuf};

use jiff::SignedDuration;
use jiff::civil::DateTime;

use crate::error::Result;
use crate::model::fortran_bool;
use crate::utilities::{LinkOutcome, create_symlink, whole_hours};

use super::file::{ConfigurationFile, aligned, write_rendered};
use super::sequence::RunSequence;

/// Legacy name the NEMS atmosphere cap reads its namelist from.
pub const ATM_NAMELIST_RC: &str = "atm_namelist.rc";

/// `nems.configure`: NEMS members, coupling connections and run sequence.
#[derive(Debug, Clone, Copy)]
pub struct NemsConfigurationFile<'a> {
    pub sequence: &'a RunSequence,
}

impl<'a> NemsConfigurationFile<'a> {
    pub fn new(sequence: &'a RunSequence) -> Self {
        Self { sequence }
    }
}

impl ConfigurationFile for NemsConfigurationFile<'_> {
    fn name(&self) -> &'static str {
        "nems.configure"
    }

    fn render(&self) -> String {
        let earth = self.sequence.earth();
        let mut sections = vec![section("EARTH", &earth.to_string())];
        sections.extend(
            self.sequence
                .models()
                .iter()
                .map(|model| section(model.entry_title(), &model.to_string())),
        );
        sections.push(section("Run Sequence", &self.sequence.to_string()));
        sections.join("\n").trim().to_string()
    }
}

/// `# <title> #`, the body, then a blank line.
fn section(title: &str, body: &str) -> String {
    format!("# {title} #\n{body}\n")
}

/// NEMS `model_configure`: start time, forecast length and ensemble settings.
#[derive(Debug, Clone, Copy)]
pub struct ModelConfigurationFile<'a> {
    pub sequence: &'a RunSequence,
    pub start_time: DateTime,
    pub duration: SignedDuration,

    /// Also link `atm_namelist.rc` to the written file.
    pub create_atm_namelist_rc: bool,
}

impl ConfigurationFile for ModelConfigurationFile<'_> {
    fn name(&self) -> &'static str {
        "model_configure"
    }

    fn render(&self) -> String {
        let namelist = if self.create_atm_namelist_rc {
            ATM_NAMELIST_RC
        } else {
            self.name()
        };
        let start = self.start_time;
        [
            aligned("total_member", 1),
            aligned("print_esmf", fortran_bool(true)),
            aligned("namelist", namelist),
            aligned("PE_MEMBER01", self.sequence.processors()),
            aligned("start_year", start.year()),
            aligned("start_month", start.month()),
            aligned("start_day", start.day()),
            aligned("start_hour", start.hour()),
            aligned("start_minute", start.minute()),
            aligned("start_second", start.second()),
            aligned("nhours_fcst", whole_hours(self.duration)),
            aligned("RUN_CONTINUE", fortran_bool(false)),
            aligned("ENS_SPS", fortran_bool(false)),
        ]
        .join("\n")
    }

    fn write(&self, path: &Path, overwrite: bool, include_version: bool) -> Result<PathBuf> {
        let path = write_rendered(self, path, overwrite, include_version)?;
        if self.create_atm_namelist_rc {
            let link = path.with_file_name(ATM_NAMELIST_RC);
            if let LinkOutcome::Copied { reason } = create_symlink(&path, &link, true)? {
                tracing::warn!("copied {} to {} ({reason})", path.display(), link.display());
            }
        }
        Ok(path)
    }
}

/// `config.rc`: locations of file-based forcings.
#[derive(Debug, Clone, Copy)]
pub struct FileForcingsFile<'a> {
    pub sequence: &'a RunSequence,
}

impl ConfigurationFile for FileForcingsFile<'_> {
    fn name(&self) -> &'static str {
        "config.rc"
    }

    fn render(&self) -> String {
        self.sequence
            .models()
            .iter()
            .filter_map(|model| model.forcing_lines())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use jiff::civil::date;
    use tempfile::TempDir;

    use crate::configuration::MediatorOptions;
    use crate::model::{EntryType, ModelEntry};

    fn hurricane_sequence() -> RunSequence {
        let mut sequence = RunSequence::new(SignedDuration::from_hours(1));
        sequence.insert(
            ModelEntry::new(EntryType::Atmospheric, "atmesh", 1)
                .with_forcing("/data/wind_atm_fin_ch_time_vec.nc"),
        );
        sequence.insert(
            ModelEntry::new(EntryType::Wave, "ww3data", 1).with_forcing("/data/ww3.Constant.nc"),
        );
        sequence.insert(ModelEntry::new(EntryType::Ocean, "adcirc", 600));
        for source in [EntryType::Atmospheric, EntryType::Wave] {
            sequence
                .connect(source, EntryType::Ocean, None, MediatorOptions::default())
                .unwrap();
        }
        sequence
    }

    #[test]
    fn renders_nems_configure() {
        let sequence = hurricane_sequence();
        let expected = "\
# EARTH #
EARTH_component_list: ATM OCN WAV
EARTH_attributes::
  Verbosity = off
::

# ATM #
ATM_model:                      atmesh
ATM_petlist_bounds:             0 0
ATM_attributes::
  Verbosity = off
::

# WAV #
WAV_model:                      ww3data
WAV_petlist_bounds:             1 1
WAV_attributes::
  Verbosity = off
::

# OCN #
OCN_model:                      adcirc
OCN_petlist_bounds:             2 601
OCN_attributes::
  Verbosity = off
::

# Run Sequence #
runSeq::
  @3600
    ATM
    WAV
    OCN
    ATM -> OCN   :remapMethod=redist
    WAV -> OCN   :remapMethod=redist
  @
::";
        assert_eq!(NemsConfigurationFile::new(&sequence).render(), expected);
    }

    #[test]
    fn mediator_block_comes_first() {
        let mut sequence = RunSequence::new(SignedDuration::from_secs(1800));
        sequence.insert(ModelEntry::new(EntryType::Ocean, "adcirc", 4));
        sequence
            .mediate(
                vec![EntryType::Ocean],
                vec!["MedPhase_slow".into()],
                vec![],
                None,
                MediatorOptions::default(),
            )
            .unwrap();

        let rendered = NemsConfigurationFile::new(&sequence).render();
        let med = rendered.find("# MED #").unwrap();
        let ocn = rendered.find("# OCN #").unwrap();
        assert!(med < ocn);
        assert!(rendered.contains("MED_model:                      mediator"));
        assert!(rendered.contains("    OCN -> MED   :remapMethod=redist\n    MED MedPhase_slow\n"));
    }

    #[test]
    fn renders_model_configure() {
        let sequence = hurricane_sequence();
        let file = ModelConfigurationFile {
            sequence: &sequence,
            start_time: date(2012, 10, 27).at(6, 0, 0, 0),
            duration: SignedDuration::from_hours(56),
            create_atm_namelist_rc: true,
        };

        let expected = "\
total_member:            1
print_esmf:              .true.
namelist:                atm_namelist.rc
PE_MEMBER01:             602
start_year:              2012
start_month:             10
start_day:               27
start_hour:              6
start_minute:            0
start_second:            0
nhours_fcst:             56
RUN_CONTINUE:            .false.
ENS_SPS:                 .false.";
        assert_eq!(file.render(), expected);
    }

    #[test]
    fn model_configure_names_itself_without_namelist_link() {
        let sequence = hurricane_sequence();
        let file = ModelConfigurationFile {
            sequence: &sequence,
            start_time: date(2020, 6, 1).at(0, 0, 0, 0),
            duration: SignedDuration::from_hours(24),
            create_atm_namelist_rc: false,
        };

        assert!(file.render().contains("namelist:                model_configure\n"));
    }

    #[test]
    fn model_configure_write_links_atm_namelist() {
        let dir = TempDir::new().unwrap();
        let sequence = hurricane_sequence();
        let file = ModelConfigurationFile {
            sequence: &sequence,
            start_time: date(2020, 6, 1).at(0, 0, 0, 0),
            duration: SignedDuration::from_hours(24),
            create_atm_namelist_rc: true,
        };

        let path = file.write(dir.path(), false, false).unwrap();
        let link = dir.path().join(ATM_NAMELIST_RC);

        assert_eq!(path, dir.path().join("model_configure"));
        assert_eq!(
            fs::read_to_string(&link).unwrap(),
            fs::read_to_string(&path).unwrap()
        );
    }

    #[test]
    fn renders_forcing_references() {
        let sequence = hurricane_sequence();
        assert_eq!(
            FileForcingsFile { sequence: &sequence }.render(),
            "atm_dir: /data\natm_nam: wind_atm_fin_ch_time_vec.nc\n\
             wav_dir: /data\nwav_nam: ww3.Constant.nc"
        );
    }
}
