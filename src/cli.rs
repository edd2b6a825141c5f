//! CLI interface for nemsconf.
//!
//! Reads a TOML system description and writes the configuration files a
//! NEMS or UFS coupled run needs. Non-interactive: arguments in, files out.
//!
//! - `nemsconf write <system.toml>` writes every file of one format.
//! - `nemsconf render <system.toml> <file>` prints a single file.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

use nemsconf::config::SystemDescription;
use nemsconf::configuration::ConfigurationFile;

/// nemsconf: coupled-model configuration files from a system description.
#[derive(Debug, Parser)]
#[command(name = "nemsconf", version, after_long_help = EXAMPLE_HELP)]
pub struct Cli {
    /// More logging: `-v` for info, `-vv` for debug.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

const EXAMPLE_HELP: &str = r#"Example system description:
  start_time = "2012-10-27 00:00"
  duration = "56h"
  interval = 3600

  [[models]]
  type = "ATM"
  name = "atmesh"
  processors = 1

  [[models]]
  type = "OCN"
  name = "adcirc"
  processors = 600

  [[connections]]
  source = "ATM"
  target = "OCN""#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write every configuration file of a format into a directory.
    ///
    /// Existing files are kept unless `--overwrite` is given.
    Write {
        /// System description (TOML).
        description: PathBuf,

        /// Output directory.
        #[arg(long, short, default_value = ".")]
        directory: PathBuf,

        #[arg(long, value_enum, default_value_t = Format::Nems)]
        format: Format,

        /// Replace existing files.
        #[arg(long)]
        overwrite: bool,

        /// Start every file with a comment naming the generator version.
        #[arg(long)]
        include_version: bool,

        /// Do not link `atm_namelist.rc` to `model_configure` (NEMS only).
        #[arg(long)]
        no_atm_namelist: bool,
    },

    /// Print one configuration file to stdout.
    Render {
        /// System description (TOML).
        description: PathBuf,

        #[arg(value_enum)]
        file: FileArg,
    },
}

/// Which runtime the files are for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// `nems.configure`, `model_configure`, `config.rc`.
    Nems,
    /// `ufs.configure`, `model_configure`.
    Ufs,
}

/// A single renderable file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FileArg {
    #[value(name = "nems.configure")]
    NemsConfigure,
    #[value(name = "model_configure")]
    ModelConfigure,
    #[value(name = "config.rc")]
    ConfigRc,
    #[value(name = "ufs.configure")]
    UfsConfigure,
    /// The UFS flavour of `model_configure`.
    #[value(name = "ufs-model-configure")]
    UfsModelConfigure,
}

/// Run the CLI, returning an error message on failure.
pub fn run() -> Result<(), String> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Command::Write {
            description,
            directory,
            format,
            overwrite,
            include_version,
            no_atm_namelist,
        } => cmd_write(
            &description,
            &directory,
            format,
            overwrite,
            include_version,
            !no_atm_namelist,
        ),
        Command::Render { description, file } => cmd_render(&description, file),
    }
}

fn setup_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::new(match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn load(path: &Path) -> Result<SystemDescription, String> {
    SystemDescription::load(path).map_err(|e| format!("failed to read {}: {e}", path.display()))
}

fn cmd_write(
    description_path: &Path,
    directory: &Path,
    format: Format,
    overwrite: bool,
    include_version: bool,
    create_atm_namelist_rc: bool,
) -> Result<(), String> {
    let description = load(description_path)?;
    let system = description.build().map_err(|e| e.to_string())?;

    let written = match format {
        Format::Nems => system.write(directory, overwrite, include_version, create_atm_namelist_rc),
        Format::Ufs => system.write_ufs(
            directory,
            &description.ufs.options,
            &description.ufs.model_configure,
            overwrite,
            include_version,
        ),
    }
    .map_err(|e| format!("failed to write configuration: {e}"))?;

    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

fn cmd_render(description_path: &Path, file: FileArg) -> Result<(), String> {
    let description = load(description_path)?;
    let system = description.build().map_err(|e| e.to_string())?;

    let rendered = match file {
        FileArg::NemsConfigure => system.nems_configure().render(),
        FileArg::ModelConfigure => system.model_configure(true).render(),
        FileArg::ConfigRc => system.config_rc().render(),
        FileArg::UfsConfigure => system.ufs_configure(description.ufs.options).render(),
        FileArg::UfsModelConfigure => system
            .ufs_model_configure(description.ufs.model_configure)
            .render(),
    };
    println!("{rendered}");
    Ok(())
}
