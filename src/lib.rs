//! Generate configuration files for NEMS and UFS coupled model runs.
//!
//! A [`ModelingSystem`] holds the models of a run, their processor
//! allocations and the transfers between them. It renders `nems.configure`,
//! `model_configure` and `config.rc` for NEMS, or `ufs.configure` and the
//! UFS `model_configure`, and writes them into a run directory.
//!
//! ```
//! use jiff::SignedDuration;
//! use jiff::civil::date;
//! use nemsconf::configuration::ConfigurationFile;
//! use nemsconf::model::{EntryType, ModelEntry};
//! use nemsconf::ModelingSystem;
//!
//! let mut system = ModelingSystem::with_duration(
//!     date(2012, 10, 27).at(0, 0, 0, 0),
//!     SignedDuration::from_hours(56),
//!     SignedDuration::from_hours(1),
//! )?;
//! system.insert(ModelEntry::new(EntryType::Atmospheric, "atmesh", 1));
//! system.insert(ModelEntry::new(EntryType::Ocean, "adcirc", 600));
//! system.connect(EntryType::Atmospheric, EntryType::Ocean, None)?;
//!
//! assert!(system.nems_configure().render().contains("ATM -> OCN   :remapMethod=redist"));
//! # Ok::<(), nemsconf::Error>(())
//! ```

pub mod config;
pub mod configuration;
mod error;
pub mod model;
pub mod system;
pub mod utilities;

pub use config::SystemDescription;
pub use error::{Error, Result};
pub use system::ModelingSystem;
