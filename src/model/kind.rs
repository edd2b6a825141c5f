//! Closed enumerations that appear in rendered configuration text.
//!
//! Each variant carries the short code the coupling runtime expects
//! (`ATM`, `redist`, `off`, ...). `Display` writes that code, and
//! `FromStr` accepts it back so the enums can be named from TOML and
//! the command line.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::Error;

/// The role a model component plays in the coupled system.
///
/// Declaration order is the order components are listed in the
/// `EARTH_component_list` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum EntryType {
    /// Coupling mediator (CMEPS or the NEMS implicit mediator).
    Mediator,
    Atmospheric,
    Ocean,
    Ice,
    Wave,
    Hydrological,
}

impl EntryType {
    /// Every entry type, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Mediator,
        Self::Atmospheric,
        Self::Ocean,
        Self::Ice,
        Self::Wave,
        Self::Hydrological,
    ];

    /// The component code used in file text.
    pub fn code(self) -> &'static str {
        match self {
            Self::Mediator => "MED",
            Self::Atmospheric => "ATM",
            Self::Ocean => "OCN",
            Self::Ice => "ICE",
            Self::Wave => "WAV",
            Self::Hydrological => "HYD",
        }
    }

    /// Lowercase variant name, also accepted when parsing.
    fn long_name(self) -> &'static str {
        match self {
            Self::Mediator => "mediator",
            Self::Atmospheric => "atmospheric",
            Self::Ocean => "ocean",
            Self::Ice => "ice",
            Self::Wave => "wave",
            Self::Hydrological => "hydrological",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for EntryType {
    type Err = Error;

    /// Accepts a component code (`ocn`, `OCN`) or a variant name (`ocean`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.code().eq_ignore_ascii_case(s) || t.long_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownEntryType(s.to_string()))
    }
}

impl TryFrom<String> for EntryType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Regridding strategy attached to a data transfer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum RemapMethod {
    #[default]
    Redistribute,
    Bilinear,
    Patch,
    NearestStod,
    NearestDtos,
    Conserve,
}

impl RemapMethod {
    const ALL: [Self; 6] = [
        Self::Redistribute,
        Self::Bilinear,
        Self::Patch,
        Self::NearestStod,
        Self::NearestDtos,
        Self::Conserve,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::Redistribute => "redist",
            Self::Bilinear => "bilinear",
            Self::Patch => "patch",
            Self::NearestStod => "nearest_stod",
            Self::NearestDtos => "nearest_dtos",
            Self::Conserve => "conserve",
        }
    }
}

impl fmt::Display for RemapMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for RemapMethod {
    type Err = Error;

    /// Accepts the short code, plus `redistribute` as a spelled-out alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("redistribute") {
            return Ok(Self::Redistribute);
        }
        Self::ALL
            .into_iter()
            .find(|m| m.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownRemapMethod(s.to_string()))
    }
}

impl TryFrom<String> for RemapMethod {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// ESMF component verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Verbosity {
    #[default]
    Off,
    Low,
    High,
    Max,
}

impl Verbosity {
    pub fn code(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Low => "low",
            Self::High => "high",
            Self::Max => "max",
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Verbosity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Off, Self::Low, Self::High, Self::Max]
            .into_iter()
            .find(|v| v.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownVerbosity(s.to_string()))
    }
}

impl TryFrom<String> for Verbosity {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
