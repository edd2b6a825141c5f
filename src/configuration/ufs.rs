//! UFS configuration files: `ufs.configure` and the UFS `model_configure`.

use jiff::SignedDuration;
use jiff::civil::DateTime;
use serde::Deserialize;

use crate::model::{EntryType, RemapMethod, attribute_block, fortran_bool};
use crate::utilities::whole_hours;

use super::earth::Earth;
use super::file::{ConfigurationFile, aligned};
use super::run_sequence::UfsRunSequence;
use super::sequence::RunSequence;

const BANNER: [&str; 3] = [
    "#############################################",
    "####  NEMS Run-Time Configuration File  #####",
    "#############################################",
];

/// Run-time parameters of a UFS coupled configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UfsOptions {
    /// Free-form label, written as a comment.
    pub coupling_mode: String,

    /// Mediator history interval, in hours.
    pub history_n: u32,

    /// Restart interval, in hours.
    pub restart_n: u32,

    /// Run length, in hours.
    pub stop_n: u32,

    /// Remap method on every mediator exchange.
    pub remap_method: RemapMethod,
}

impl Default for UfsOptions {
    fn default() -> Self {
        Self {
            coupling_mode: "uncoupled".to_string(),
            history_n: 1,
            restart_n: 12,
            stop_n: 120,
            remap_method: RemapMethod::default(),
        }
    }
}

/// `ufs.configure`: components, run sequence and `ALLCOMP` attributes.
#[derive(Debug, Clone)]
pub struct UfsConfigurationFile<'a> {
    pub sequence: &'a RunSequence,
    pub options: UfsOptions,
}

impl<'a> UfsConfigurationFile<'a> {
    pub fn new(sequence: &'a RunSequence, options: UfsOptions) -> Self {
        Self { sequence, options }
    }

    pub fn run_sequence(&self) -> UfsRunSequence {
        UfsRunSequence::from_sequence(self.sequence, self.options.remap_method)
    }

    /// The `EARTH` block, with component codes in alphabetical order.
    fn earth_block(&self) -> String {
        let earth = self.sequence.earth();
        let mut codes: Vec<&str> = earth.components().map(EntryType::code).collect();
        codes.sort_unstable();
        format!(
            "{title}_component_list: {}\n{}",
            codes.join(" "),
            attribute_block(Earth::ENTRY_TITLE, earth.attributes),
            title = Earth::ENTRY_TITLE,
        )
    }

    fn allcomp_attributes(&self) -> String {
        let UfsOptions {
            history_n,
            restart_n,
            stop_n,
            ..
        } = self.options;
        let lines = [
            "ScalarFieldCount = 3".to_string(),
            "ScalarFieldIdxGridNX = 1".to_string(),
            "ScalarFieldIdxGridNY = 2".to_string(),
            "ScalarFieldIdxNextSwCday = 3".to_string(),
            "ScalarFieldName = cpl_scalars".to_string(),
            "start_type = startup".to_string(),
            "restart_dir = RESTART/".to_string(),
            "case_name = ufs.cpld".to_string(),
            format!("history_n = {history_n}"),
            "history_option = nhours".to_string(),
            format!("restart_n = {restart_n}"),
            "restart_option = nhours".to_string(),
            "restart_ymd = -999".to_string(),
            "orb_eccen = 1.e36".to_string(),
            "orb_iyear = 2000".to_string(),
            "orb_iyear_align = 2000".to_string(),
            "orb_mode = fixed_year".to_string(),
            "orb_mvelp = 1.e36".to_string(),
            "orb_obliq = 1.e36".to_string(),
            format!("stop_n = {stop_n}"),
            "stop_option = nhours".to_string(),
            "stop_ymd = -999".to_string(),
        ];
        let body = lines.map(|line| format!("  {line}")).join("\n");
        format!("ALLCOMP_attributes::\n{body}\n::")
    }
}

impl ConfigurationFile for UfsConfigurationFile<'_> {
    fn name(&self) -> &'static str {
        "ufs.configure"
    }

    fn render(&self) -> String {
        let mut config: Vec<String> = BANNER.iter().map(ToString::to_string).collect();
        config.push(format!("# coupling_mode: {}", self.options.coupling_mode));
        config.push(String::new());

        config.push("# ESMF #".to_string());
        config.push("logKindFlag:            ESMF_LOGKIND_MULTI".to_string());
        config.push("globalResourceControl:  true".to_string());
        config.push(String::new());

        config.push("# EARTH #".to_string());
        config.push(self.earth_block());
        config.push(String::new());

        for model in self.sequence.models() {
            config.push(format!("# {} #", model.entry_type.code()));
            config.push(model.to_string());
            config.push(String::new());
        }

        config.push("# Run Sequence #".to_string());
        config.push(self.run_sequence().to_string());
        config.push(String::new());

        config.push(self.allcomp_attributes());
        config.join("\n")
    }
}

/// Forecast and write-component settings of a UFS `model_configure`.
///
/// String values are written verbatim, so quoted Fortran strings keep
/// their quotes (`'gaussian_grid'`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UfsModelSettings {
    pub fhrot: u32,
    pub dt_atmos: u32,
    pub calendar: String,
    pub restart_interval: String,
    pub output_1st_tstep_rst: bool,
    pub quilting: bool,
    pub quilting_restart: bool,
    pub write_groups: u32,
    pub write_tasks_per_group: u32,
    pub itasks: u32,
    pub output_history: bool,
    pub history_file_on_native_grid: bool,
    pub write_dopost: bool,
    pub write_nsflip: bool,
    pub num_files: u32,
    pub filename_base: String,
    pub output_grid: String,
    pub output_file: String,
    pub zstandard_level: u32,
    pub ideflate: u32,
    pub quantize_mode: String,
    pub quantize_nsd: u32,
    pub ichunk2d: i32,
    pub jchunk2d: i32,
    pub ichunk3d: i32,
    pub jchunk3d: i32,
    pub kchunk3d: i32,
    pub imo: u32,
    pub jmo: u32,
    pub output_fh: String,
    pub iau_offset: u32,
}

impl Default for UfsModelSettings {
    fn default() -> Self {
        Self {
            fhrot: 0,
            dt_atmos: 720,
            calendar: "'gregorian'".to_string(),
            restart_interval: "0".to_string(),
            output_1st_tstep_rst: false,
            quilting: true,
            quilting_restart: false,
            write_groups: 1,
            write_tasks_per_group: 6,
            itasks: 1,
            output_history: true,
            history_file_on_native_grid: false,
            write_dopost: false,
            write_nsflip: false,
            num_files: 2,
            filename_base: "'atm' 'sfc'".to_string(),
            output_grid: "'gaussian_grid'".to_string(),
            output_file: "'netcdf' 'netcdf'".to_string(),
            zstandard_level: 0,
            ideflate: 0,
            quantize_mode: "'quantize_bitround'".to_string(),
            quantize_nsd: 0,
            ichunk2d: -1,
            jchunk2d: -1,
            ichunk3d: -1,
            jchunk3d: -1,
            kchunk3d: -1,
            imo: 384,
            jmo: 190,
            output_fh: "12 -1".to_string(),
            iau_offset: 0,
        }
    }
}

/// UFS `model_configure`: every key, always, in a fixed order.
#[derive(Debug, Clone)]
pub struct UfsModelConfigurationFile {
    pub start_time: DateTime,
    pub duration: SignedDuration,
    pub settings: UfsModelSettings,
}

impl ConfigurationFile for UfsModelConfigurationFile {
    fn name(&self) -> &'static str {
        "model_configure"
    }

    fn render(&self) -> String {
        let start = self.start_time;
        let s = &self.settings;
        [
            aligned("start_year", start.year()),
            aligned("start_month", start.month()),
            aligned("start_day", start.day()),
            aligned("start_hour", start.hour()),
            aligned("start_minute", start.minute()),
            aligned("start_second", start.second()),
            aligned("nhours_fcst", whole_hours(self.duration)),
            aligned("fhrot", s.fhrot),
            aligned("dt_atmos", s.dt_atmos),
            aligned("calendar", &s.calendar),
            aligned("restart_interval", &s.restart_interval),
            aligned("output_1st_tstep_rst", fortran_bool(s.output_1st_tstep_rst)),
            aligned("quilting", fortran_bool(s.quilting)),
            aligned("quilting_restart", fortran_bool(s.quilting_restart)),
            aligned("write_groups", s.write_groups),
            aligned("write_tasks_per_group", s.write_tasks_per_group),
            aligned("itasks", s.itasks),
            aligned("output_history", fortran_bool(s.output_history)),
            aligned(
                "history_file_on_native_grid",
                fortran_bool(s.history_file_on_native_grid),
            ),
            aligned("write_dopost", fortran_bool(s.write_dopost)),
            aligned("write_nsflip", fortran_bool(s.write_nsflip)),
            aligned("num_files", s.num_files),
            aligned("filename_base", &s.filename_base),
            aligned("output_grid", &s.output_grid),
            aligned("output_file", &s.output_file),
            aligned("zstandard_level", s.zstandard_level),
            aligned("ideflate", s.ideflate),
            aligned("quantize_mode", &s.quantize_mode),
            aligned("quantize_nsd", s.quantize_nsd),
            aligned("ichunk2d", s.ichunk2d),
            aligned("jchunk2d", s.jchunk2d),
            aligned("ichunk3d", s.ichunk3d),
            aligned("jchunk3d", s.jchunk3d),
            aligned("kchunk3d", s.kchunk3d),
            aligned("imo", s.imo),
            aligned("jmo", s.jmo),
            aligned("output_fh", &s.output_fh),
            aligned("iau_offset", s.iau_offset),
        ]
        .join("\n")
    }
}
