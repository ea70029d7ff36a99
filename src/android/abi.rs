use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display},
    str::FromStr,
};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Abi {
    #[serde(rename = "armeabi")]
    Armeabi,
    #[serde(rename = "armeabi-v7a")]
    ArmeabiV7a,
    #[serde(rename = "arm64-v8a")]
    Arm64V8a,
    #[serde(rename = "mips")]
    Mips,
    #[serde(rename = "mips64")]
    Mips64,
    #[serde(rename = "x86")]
    X86,
    #[serde(rename = "x86_64")]
    X86_64,
}

#[derive(Debug, Error)]
#[error("{name:?} isn't a known Android ABI; expected one of {}", Abi::name_list().join(", "))]
pub struct AbiInvalid {
    name: String,
}

impl Display for Abi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Abi {
    type Err = AbiInvalid;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|abi| abi.as_str() == name)
            .ok_or_else(|| AbiInvalid {
                name: name.to_owned(),
            })
    }
}

impl Abi {
    pub const ALL: &'static [Self] = &[
        Self::Armeabi,
        Self::ArmeabiV7a,
        Self::Arm64V8a,
        Self::Mips,
        Self::Mips64,
        Self::X86,
        Self::X86_64,
    ];

    pub fn name_list() -> Vec<&'static str> {
        Self::ALL.iter().map(|abi| abi.as_str()).collect()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Armeabi => "armeabi",
            Self::ArmeabiV7a => "armeabi-v7a",
            Self::Arm64V8a => "arm64-v8a",
            Self::Mips => "mips",
            Self::Mips64 => "mips64",
            Self::X86 => "x86",
            Self::X86_64 => "x86_64",
        }
    }

    /// Arch suffix of the clang runtime libs (`libclang_rt.asan-<arch>-android.so`).
    pub fn clang_rt_arch(self) -> &'static str {
        match self {
            Self::Arm64V8a => "aarch64",
            Self::Armeabi | Self::ArmeabiV7a => "arm",
            Self::X86 => "i686",
            other => other.as_str(),
        }
    }
}
