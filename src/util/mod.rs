pub mod archive;
pub mod cli;
pub mod ln;
mod path;

pub use self::path::*;

use once_cell_regex::exports::regex::Captures;
use serde::{ser::Serializer, Serialize};
use std::{
    fmt::{self, Display},
    str::FromStr,
};
use thiserror::Error;

pub fn list_display(list: &[impl Display]) -> String {
    if list.is_empty() {
        "none".to_owned()
    } else if list.len() == 1 {
        list[0].to_string()
    } else if list.len() == 2 {
        format!("{} and {}", list[0], list[1])
    } else {
        let mut display = String::new();
        for (idx, item) in list.iter().enumerate() {
            let formatted = if idx + 1 == list.len() {
                // this is the last item
                format!("and {}", item)
            } else {
                format!("{}, ", item)
            };
            display.push_str(&formatted);
        }
        display
    }
}

#[derive(Debug, Error)]
pub enum VersionTripleError {
    #[error("Failed to parse major version from {version:?}: {source}")]
    MajorInvalid {
        version: String,
        source: std::num::ParseIntError,
    },
    #[error("Failed to parse minor version from {version:?}: {source}")]
    MinorInvalid {
        version: String,
        source: std::num::ParseIntError,
    },
    #[error("Failed to parse patch version from {version:?}: {source}")]
    PatchInvalid {
        version: String,
        source: std::num::ParseIntError,
    },
    #[error(
        "Failed to parse version string {version:?}: string must be in format <major>.<minor>.<patch>"
    )]
    VersionStringInvalid { version: String },
}

macro_rules! parse {
    ($key:expr, $err:ident, $variant:ident, $field:ident) => {
        |caps: &Captures<'_>, context: &str| {
            caps[$key].parse::<u32>().map_err(|source| $err::$variant {
                $field: context.to_owned(),
                source,
            })
        }
    };
}

// Generic version triple
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Default)]
pub struct VersionTriple {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Display for VersionTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl Serialize for VersionTriple {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl FromStr for VersionTriple {
    type Err = VersionTripleError;

    fn from_str(v: &str) -> Result<Self, Self::Err> {
        let mut s = v.split('.');
        match (s.next(), s.next(), s.next(), s.next()) {
            (Some(major), Some(minor), Some(patch), None) => Ok(Self {
                major: major
                    .parse()
                    .map_err(|source| VersionTripleError::MajorInvalid {
                        version: v.to_owned(),
                        source,
                    })?,
                minor: minor
                    .parse()
                    .map_err(|source| VersionTripleError::MinorInvalid {
                        version: v.to_owned(),
                        source,
                    })?,
                patch: patch
                    .parse()
                    .map_err(|source| VersionTripleError::PatchInvalid {
                        version: v.to_owned(),
                        source,
                    })?,
            }),
            _ => Err(VersionTripleError::VersionStringInvalid {
                version: v.to_owned(),
            }),
        }
    }
}

impl VersionTriple {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub fn from_caps<'a>(caps: &'a Captures<'a>) -> Result<(Self, &'a str), VersionTripleError> {
        let version_str = &caps["version"];
        let parse_major = parse!("major", VersionTripleError, MajorInvalid, version);
        let parse_minor = parse!("minor", VersionTripleError, MinorInvalid, version);
        let parse_patch = parse!("patch", VersionTripleError, PatchInvalid, version);
        Ok((
            Self {
                major: parse_major(caps, version_str)?,
                minor: parse_minor(caps, version_str)?,
                patch: parse_patch(caps, version_str)?,
            },
            version_str,
        ))
    }
}

#[derive(Debug, Error)]
pub enum VersionDoubleError {
    #[error("Failed to parse major version from {version:?}: {source}")]
    MajorInvalid {
        version: String,
        source: std::num::ParseIntError,
    },
    #[error("Failed to parse minor version from {version:?}: {source}")]
    MinorInvalid {
        version: String,
        source: std::num::ParseIntError,
    },
    #[error(
        "Failed to parse version string {version:?}: string must start with <major>.<minor>"
    )]
    VersionStringInvalid { version: String },
}

// Generic version double
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Default)]
pub struct VersionDouble {
    pub major: u32,
    pub minor: u32,
}

impl Display for VersionDouble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl Serialize for VersionDouble {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl FromStr for VersionDouble {
    type Err = VersionDoubleError;

    /// Reads the first two components of a dotted version; anything after
    /// the minor component is ignored (`21.4.7075529` is `21.4`).
    fn from_str(v: &str) -> Result<Self, Self::Err> {
        let mut s = v.split('.');
        match (s.next(), s.next()) {
            (Some(major), Some(minor)) => Ok(Self {
                major: major
                    .parse()
                    .map_err(|source| VersionDoubleError::MajorInvalid {
                        version: v.to_owned(),
                        source,
                    })?,
                minor: minor
                    .parse()
                    .map_err(|source| VersionDoubleError::MinorInvalid {
                        version: v.to_owned(),
                        source,
                    })?,
            }),
            _ => Err(VersionDoubleError::VersionStringInvalid {
                version: v.to_owned(),
            }),
        }
    }
}

impl VersionDouble {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest(
        input,
        expected,
        case("16.1", VersionDouble::new(16, 1)),
        case("21.4.7075529", VersionDouble::new(21, 4)),
        case("25.0.8775105-beta2", VersionDouble::new(25, 0))
    )]
    fn test_version_double_ignores_trailing_components(input: &str, expected: VersionDouble) {
        assert_eq!(input.parse::<VersionDouble>().unwrap(), expected);
    }

    #[rstest(input, case("16"), case("r14b"), case("a.b"), case(""))]
    fn test_version_double_rejects(input: &str) {
        assert!(input.parse::<VersionDouble>().is_err());
    }

    #[rstest(
        input,
        expected,
        case("1.2.3", VersionTriple::new(1, 2, 3)),
        case("10.0.99", VersionTriple::new(10, 0, 99))
    )]
    fn test_version_triple(input: &str, expected: VersionTriple) {
        assert_eq!(input.parse::<VersionTriple>().unwrap(), expected);
    }

    #[rstest(input, case("1.2"), case("1.2.3.4"), case("1.x.3"))]
    fn test_version_triple_rejects(input: &str) {
        assert!(input.parse::<VersionTriple>().is_err());
    }

    #[test]
    fn test_list_display() {
        let empty: [&str; 0] = [];
        assert_eq!(list_display(&empty), "none");
        assert_eq!(list_display(&["x86"]), "x86");
        assert_eq!(list_display(&["x86", "x86_64"]), "x86 and x86_64");
        assert_eq!(
            list_display(&["armeabi-v7a", "arm64-v8a", "x86"]),
            "armeabi-v7a, arm64-v8a, and x86"
        );
    }
}
