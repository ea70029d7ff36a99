use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub enum NoiseLevel {
    Polite,
    LoudAndProud,
    FranklyQuitePedantic,
}

impl Default for NoiseLevel {
    fn default() -> Self {
        Self::Polite
    }
}

impl NoiseLevel {
    pub fn from_occurrences(occurrences: u64) -> Self {
        match occurrences {
            0 => Self::Polite,
            1 => Self::LoudAndProud,
            _ => Self::FranklyQuitePedantic,
        }
    }

    pub fn polite(self) -> bool {
        matches!(self, Self::Polite)
    }

    pub fn loud(self) -> bool {
        matches!(self, Self::LoudAndProud)
    }

    pub fn pedantic(self) -> bool {
        matches!(self, Self::FranklyQuitePedantic)
    }

    /// Anything above polite asks the vendor tools for their full output.
    pub fn verbose(self) -> bool {
        !self.polite()
    }
}

/// What to do when an external tool exits unsuccessfully.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum OnFailure {
    Propagate,
    Ignore,
}

impl Default for OnFailure {
    fn default() -> Self {
        Self::Propagate
    }
}

impl OnFailure {
    pub fn from_flag(ignore: bool) -> Self {
        if ignore {
            Self::Ignore
        } else {
            Self::Propagate
        }
    }

    pub fn ignore(self) -> bool {
        matches!(self, Self::Ignore)
    }
}

/// Whether the address sanitizer runtime is bundled into the build.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Sanitizer {
    Off,
    Address,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::Off
    }
}

impl Sanitizer {
    /// Alchemy's convention: unset, empty or `0` all mean disabled.
    pub fn from_var(value: Option<&str>) -> Self {
        match value {
            None | Some("") | Some("0") => Self::Off,
            Some(_) => Self::Address,
        }
    }

    pub fn address(self) -> bool {
        matches!(self, Self::Address)
    }
}
