//! Run sequences and the configuration files rendered from them.

mod earth;
mod file;
mod nems;
mod run_sequence;
mod sequence;
mod ufs;

pub use earth::Earth;
pub use file::{ConfigurationFile, version, write_rendered};
pub use nems::{ATM_NAMELIST_RC, FileForcingsFile, ModelConfigurationFile, NemsConfigurationFile};
pub use run_sequence::UfsRunSequence;
pub use sequence::{MediatorOptions, RunSequence};
pub use ufs::{UfsConfigurationFile, UfsModelConfigurationFile, UfsModelSettings, UfsOptions};
