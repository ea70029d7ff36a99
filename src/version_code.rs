//! Version names (`1.2.3-beta2`) and the build codes derived from them.
//!
//! App stores want a build number that only ever goes up, so a version name
//! is packed into fixed-width decimal fields: two digits each for major,
//! minor and patch, one digit for the pre-release rank and two for the
//! pre-release number. `1.2.3-beta2` becomes `0102030102`, and the released
//! `1.2.3` becomes `0102030300`, which sorts after every pre-release of it.

use crate::util::{
    cli::{Report, Reportable},
    VersionTriple, VersionTripleError,
};
use once_cell_regex::regex;
use std::{
    fmt::{self, Display},
    str::FromStr,
};
use thiserror::Error;

static UNVERSIONED: &str = "0.0.0";

#[derive(Debug, Error)]
pub enum Error {
    #[error("Bad version name : {version:?} (expected `<major>.<minor>.<patch>[-<alpha|beta|rc><n>]` with at most two digits per number)")]
    InvalidVersionString { version: String },
    #[error(transparent)]
    TripleInvalid(#[from] VersionTripleError),
}

impl Reportable for Error {
    fn report(&self) -> Report {
        Report::error("Failed to compute version code", self)
    }
}

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Variant {
    Alpha,
    Beta,
    Rc,
    Release,
}

impl Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Variant {
    // Looked up exactly as written; the version pattern itself is
    // case-insensitive, so `BETA2` is accepted but ranks like an unknown name.
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "alpha" => Some(Self::Alpha),
            "beta" => Some(Self::Beta),
            "rc" => Some(Self::Rc),
            "release" => Some(Self::Release),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alpha => "alpha",
            Self::Beta => "beta",
            Self::Rc => "rc",
            Self::Release => "release",
        }
    }

    pub fn rank(self) -> u32 {
        match self {
            Self::Alpha => 0,
            Self::Beta => 1,
            Self::Rc => 2,
            Self::Release => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Release {
    triple: VersionTriple,
    variant: Option<Variant>,
    variant_num: u32,
}

impl Release {
    fn rank(&self) -> u32 {
        self.variant.map(Variant::rank).unwrap_or(0)
    }
}

/// A product version as declared in the build configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VersionName {
    raw: String,
    // `None` for the unversioned `0.0.0` sentinel.
    release: Option<Release>,
}

impl Display for VersionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl Default for VersionName {
    fn default() -> Self {
        Self {
            raw: UNVERSIONED.to_owned(),
            release: None,
        }
    }
}

impl FromStr for VersionName {
    type Err = Error;

    fn from_str(version: &str) -> Result<Self, Self::Err> {
        if version == UNVERSIONED || version.starts_with("0.0.0-") {
            return Ok(Self {
                raw: version.to_owned(),
                release: None,
            });
        }
        let caps = regex!(
            r"(?i)^(?P<version>(?P<major>[0-9]{1,2})\.(?P<minor>[0-9]{1,2})\.(?P<patch>[0-9]{1,2}))(-(?P<name>(alpha|beta|rc)+)(?P<num>[0-9]{0,2}))?$"
        )
        .captures(version)
        .ok_or_else(|| Error::InvalidVersionString {
            version: version.to_owned(),
        })?;
        let (triple, _) = VersionTriple::from_caps(&caps)?;
        let (variant, variant_num) = match caps.name("name") {
            Some(name) => {
                let variant = Variant::from_name(name.as_str());
                if variant.is_none() {
                    log::warn!(
                        "pre-release name {:?} in version {:?} isn't one of alpha, beta or rc (case matters); it will rank like alpha",
                        name.as_str(),
                        version
                    );
                }
                let variant_num = caps
                    .name("num")
                    .and_then(|num| num.as_str().parse().ok())
                    .unwrap_or(0);
                (variant, variant_num)
            }
            None => (Some(Variant::Release), 0),
        };
        Ok(Self {
            raw: version.to_owned(),
            release: Some(Release {
                triple,
                variant,
                variant_num,
            }),
        })
    }
}

impl VersionName {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_unversioned(&self) -> bool {
        self.release.is_none()
    }

    /// Everything before the first `-`.
    pub fn short(&self) -> &str {
        self.raw
            .split_once('-')
            .map(|(short, _)| short)
            .unwrap_or(&self.raw)
    }

    /// Everything after the first `-`, if there is one.
    pub fn suffix(&self) -> Option<&str> {
        self.raw
            .split_once('-')
            .map(|(_, suffix)| suffix)
            .filter(|suffix| !suffix.is_empty())
    }

    /// `None` for pre-release names that don't map to a known variant.
    pub fn variant(&self) -> Option<Variant> {
        self.release.and_then(|release| release.variant)
    }

    pub fn code(&self) -> VersionCode {
        match self.release {
            None => VersionCode::Unversioned,
            Some(release) => VersionCode::Versioned {
                triple: release.triple,
                rank: release.rank(),
                variant_num: release.variant_num,
            },
        }
    }
}

/// Monotonic build code; compare codes directly, or compare their rendered
/// forms as integers.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum VersionCode {
    Unversioned,
    Versioned {
        triple: VersionTriple,
        rank: u32,
        variant_num: u32,
    },
}

/// Android `versionCode` form: `MMmmpprnn`, or `0` when unversioned.
impl Display for VersionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unversioned => write!(f, "0"),
            Self::Versioned {
                triple,
                rank,
                variant_num,
            } => write!(
                f,
                "{:02}{:02}{:02}{:01}{:02}",
                triple.major, triple.minor, triple.patch, rank, variant_num
            ),
        }
    }
}

impl VersionCode {
    /// `CFBundleVersion` form: `MMmmpp.r.nn`, or `0` when unversioned.
    pub fn apple_build_number(&self) -> String {
        match self {
            Self::Unversioned => "0".to_owned(),
            Self::Versioned {
                triple,
                rank,
                variant_num,
            } => format!(
                "{:02}{:02}{:02}.{:01}.{:02}",
                triple.major, triple.minor, triple.patch, rank, variant_num
            ),
        }
    }

    pub fn value(&self) -> u64 {
        match self {
            Self::Unversioned => 0,
            Self::Versioned {
                triple,
                rank,
                variant_num,
            } => {
                let mut value = 0;
                for (field, width) in [
                    (triple.major, 100),
                    (triple.minor, 100),
                    (triple.patch, 100),
                    (*rank, 10),
                    (*variant_num, 100),
                ] {
                    value = value * width + u64::from(field);
                }
                value
            }
        }
    }
}

/// Parses `version_name` and packs it into its build code.
pub fn encode(version_name: &str) -> Result<VersionCode, Error> {
    let code = VersionName::from_str(version_name)?.code();
    log::info!("version {:?} has code {}", version_name, code);
    Ok(code)
}
