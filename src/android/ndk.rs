use super::source_props::{self, SourceProps};
use crate::util::{
    cli::{Report, Reportable},
    VersionDouble,
};
use once_cell::sync::OnceCell;
use once_cell_regex::regex;
use std::{
    fmt::{self, Display},
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;

static ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// An NDK release, ordered the way Google ships them: `r14` < `r14b` < `r15`.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Default)]
pub struct NdkVersion(VersionDouble);

impl Display for NdkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match ALPHABET.get(self.0.minor as usize) {
            // Three-digit majors and minors past `z` have no release name, but
            // the dotted form parses back to the same version.
            _ if self.0.major > 99 => write!(f, "{}", self.0),
            Some(_) if self.0.minor == 0 => write!(f, "r{}", self.0.major),
            Some(letter) => write!(f, "r{}{}", self.0.major, char::from(*letter)),
            None => write!(f, "{}", self.0),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unreadable NDK version {version:?}; expected `r<major>[<letter>]` (like `r14b`) or `<major>.<minor>`")]
pub struct VersionUnreadable {
    version: String,
}

impl FromStr for NdkVersion {
    type Err = VersionUnreadable;

    fn from_str(version: &str) -> Result<Self, Self::Err> {
        let unreadable = || VersionUnreadable {
            version: version.to_owned(),
        };
        if let Some(caps) = regex!(r"^r(?P<major>[0-9]{1,2})(?P<minor>[a-z])?$").captures(version)
        {
            let major = caps["major"].parse().map_err(|_| unreadable())?;
            let minor = caps
                .name("minor")
                .map(|minor| u32::from(minor.as_str().as_bytes()[0] - b'a'))
                .unwrap_or(0);
            Ok(Self::new(major, minor))
        } else {
            version
                .parse::<VersionDouble>()
                .map(Self)
                .map_err(|_| unreadable())
        }
    }
}

impl From<source_props::Revision> for NdkVersion {
    fn from(revision: source_props::Revision) -> Self {
        Self(revision.double)
    }
}

impl NdkVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self(VersionDouble::new(major, minor))
    }

    pub fn major(self) -> u32 {
        self.0.major
    }

    pub fn minor(self) -> u32 {
        self.0.minor
    }
}

#[derive(Debug, Error)]
pub enum BoundsError {
    #[error("NDK toolchain too old for {context}: at least NDK {you_need} is required (you currently have NDK {you_have})")]
    TooOld {
        context: String,
        you_have: NdkVersion,
        you_need: NdkVersion,
    },
    #[error("NDK toolchain too recent for {context}: NDK {first_bad} and later aren't supported (you currently have NDK {you_have})")]
    TooRecent {
        context: String,
        you_have: NdkVersion,
        first_bad: NdkVersion,
    },
}

/// Fails if `version` is below `min` or at/above `max`. `max` names the first
/// known-bad release, so it's exclusive while `min` is inclusive.
pub fn check_bounds(
    version: NdkVersion,
    min: Option<NdkVersion>,
    max: Option<NdkVersion>,
    context: &str,
) -> Result<NdkVersion, BoundsError> {
    if let Some(min) = min {
        if version < min {
            return Err(BoundsError::TooOld {
                context: context.to_owned(),
                you_have: version,
                you_need: min,
            });
        }
    }
    if let Some(max) = max {
        if version >= max {
            return Err(BoundsError::TooRecent {
                context: context.to_owned(),
                you_have: version,
                first_bad: max,
            });
        }
    }
    Ok(version)
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Bounds {
    pub min: Option<NdkVersion>,
    pub max: Option<NdkVersion>,
}

impl Bounds {
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn check(&self, version: NdkVersion, context: &str) -> Result<NdkVersion, BoundsError> {
        check_bounds(version, self.min, self.max, context)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Have you installed the NDK? Neither `ANDROID_NDK_PATH` nor `NDK_HOME` is set: {0}")]
    NdkHomeNotSet(#[source] std::env::VarError),
    #[error("Have you installed the NDK? {path:?} doesn't point to an existing directory.")]
    NdkHomeNotADir { path: PathBuf },
    #[error("Failed to lookup version of installed NDK: {0}")]
    VersionLookupFailed(#[from] source_props::Error),
    #[error(transparent)]
    OutOfBounds(#[from] BoundsError),
}

impl Reportable for Error {
    fn report(&self) -> Report {
        match self {
            Self::NdkHomeNotSet(_) | Self::NdkHomeNotADir { .. } => {
                Report::action_request("Point `ANDROID_NDK_PATH` at your NDK install", self)
            }
            Self::VersionLookupFailed(_) => Report::error("Failed to read NDK version", self),
            Self::OutOfBounds(_) => Report::error("Installed NDK is unsupported", self),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Env {
    ndk_home: PathBuf,
    version: OnceCell<NdkVersion>,
}

impl Env {
    pub fn new() -> Result<Self, Error> {
        let ndk_home = std::env::var("ANDROID_NDK_PATH")
            .or_else(|err| {
                std::env::var("NDK_HOME")
                    .map(|ndk_home| {
                        log::info!("`ANDROID_NDK_PATH` isn't set; falling back to `NDK_HOME`");
                        ndk_home
                    })
                    .map_err(|_| err)
            })
            .map_err(Error::NdkHomeNotSet)?;
        Self::from_home(ndk_home)
    }

    pub fn from_home(ndk_home: impl Into<PathBuf>) -> Result<Self, Error> {
        let ndk_home = ndk_home.into();
        if ndk_home.is_dir() {
            Ok(Self {
                ndk_home,
                version: OnceCell::new(),
            })
        } else {
            Err(Error::NdkHomeNotADir { path: ndk_home })
        }
    }

    pub fn home(&self) -> &Path {
        &self.ndk_home
    }

    pub fn ndk_build_path(&self) -> PathBuf {
        self.ndk_home.join("ndk-build")
    }

    /// Reads `source.properties` the first time it's asked for; later calls
    /// (from any thread) get the same answer.
    pub fn version(&self) -> Result<NdkVersion, source_props::Error> {
        self.version
            .get_or_try_init(|| {
                let version = SourceProps::from_path(self.ndk_home.join("source.properties"))
                    .map(|props| NdkVersion::from(props.pkg.revision))?;
                log::info!("detected NDK {} at {:?}", version, self.ndk_home);
                Ok(version)
            })
            .map(|version| *version)
    }

    pub fn check(&self, bounds: Bounds, context: &str) -> Result<NdkVersion, Error> {
        let version = self.version()?;
        bounds.check(version, context).map_err(Into::into)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest(
        input,
        expected,
        case("r14b", NdkVersion::new(14, 1)),
        case("r14", NdkVersion::new(14, 0)),
        case("r9d", NdkVersion::new(9, 3)),
        case("r10e", NdkVersion::new(10, 4)),
        case("16.1", NdkVersion::new(16, 1)),
        case("21.4.7075529", NdkVersion::new(21, 4))
    )]
    fn test_parse(input: &str, expected: NdkVersion) {
        assert_eq!(input.parse::<NdkVersion>().unwrap(), expected);
    }

    #[rstest(
        input,
        case("r"),
        case("14b"),
        case("r14B"),
        case("r14bb"),
        case("r123"),
        case("16"),
        case("sixteen.one"),
        case("")
    )]
    fn test_parse_rejects(input: &str) {
        assert!(input.parse::<NdkVersion>().is_err());
    }

    #[rstest(
        input,
        case("r14b"),
        case("r14"),
        case("r19c"),
        case("16.1"),
        case("25.0.8775105"),
        case("123.1")
    )]
    fn test_display_round_trips(input: &str) {
        let version = input.parse::<NdkVersion>().unwrap();
        assert_eq!(version.to_string().parse::<NdkVersion>().unwrap(), version);
    }

    #[test]
    fn test_display() {
        assert_eq!(NdkVersion::new(14, 1).to_string(), "r14b");
        assert_eq!(NdkVersion::new(14, 0).to_string(), "r14");
        assert_eq!(NdkVersion::new(21, 30).to_string(), "21.30");
        assert_eq!(
            NdkVersion::new(21, 30).to_string().parse::<NdkVersion>().unwrap(),
            NdkVersion::new(21, 30)
        );
        assert_eq!(NdkVersion::new(123, 1).to_string(), "123.1");
    }

    #[test]
    fn test_ordering() {
        assert!(NdkVersion::new(14, 1) < NdkVersion::new(14, 2));
        assert!(NdkVersion::new(14, 2) < NdkVersion::new(15, 0));
        assert!("r14".parse::<NdkVersion>().unwrap() < "r14b".parse().unwrap());
        assert_eq!(NdkVersion::new(14, 1), "r14b".parse().unwrap());
    }

    #[test]
    fn too_old() {
        let err = check_bounds(
            NdkVersion::new(13, 0),
            Some(NdkVersion::new(14, 1)),
            None,
            "native libs",
        )
        .unwrap_err();
        assert!(matches!(err, BoundsError::TooOld { .. }));
        let msg = err.to_string();
        assert!(msg.contains("too old for native libs"), "{}", msg);
        assert!(msg.contains("r14b") && msg.contains("r13"), "{}", msg);
    }

    #[test]
    fn max_is_exclusive() {
        let err = check_bounds(
            NdkVersion::new(19, 0),
            None,
            Some(NdkVersion::new(19, 0)),
            "native libs",
        )
        .unwrap_err();
        assert!(matches!(err, BoundsError::TooRecent { .. }));
        assert!(err.to_string().contains("too recent for native libs"));
    }

    #[test]
    fn min_is_inclusive() {
        assert_eq!(
            check_bounds(
                NdkVersion::new(14, 1),
                Some(NdkVersion::new(14, 1)),
                None,
                "native libs"
            )
            .unwrap(),
            NdkVersion::new(14, 1)
        );
    }

    #[test]
    fn within_bounds() {
        let bounds = Bounds {
            min: Some(NdkVersion::new(14, 1)),
            max: Some(NdkVersion::new(19, 0)),
        };
        assert_eq!(
            bounds.check(NdkVersion::new(16, 0), "native libs").unwrap(),
            NdkVersion::new(16, 0)
        );
        assert!(Bounds::default().is_unbounded());
        assert!(Bounds::default()
            .check(NdkVersion::new(1, 0), "anything")
            .is_ok());
    }

    #[test]
    fn env_reads_version_once() {
        let dir = tempfile::tempdir().unwrap();
        let props = dir.path().join("source.properties");
        std::fs::write(&props, "Pkg.Revision = 16.1.4479499\n").unwrap();
        let env = Env::from_home(dir.path()).unwrap();
        assert_eq!(env.version().unwrap(), NdkVersion::new(16, 1));
        // cached: the file is no longer consulted
        std::fs::write(&props, "Pkg.Revision = 25.0.0\n").unwrap();
        assert_eq!(env.version().unwrap(), NdkVersion::new(16, 1));
        assert_eq!(env.ndk_build_path(), dir.path().join("ndk-build"));
    }

    #[test]
    fn env_check_reports_bounds() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("source.properties"),
            "Pkg.Revision = 13.1.4479499\n",
        )
        .unwrap();
        let env = Env::from_home(dir.path()).unwrap();
        let bounds = Bounds {
            min: Some(NdkVersion::new(14, 1)),
            max: None,
        };
        assert!(matches!(
            env.check(bounds, "ndk-build"),
            Err(Error::OutOfBounds(BoundsError::TooOld { .. }))
        ));
    }

    #[test]
    fn env_without_properties_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let env = Env::from_home(dir.path()).unwrap();
        assert!(matches!(
            env.check(Bounds::default(), "ndk-build"),
            Err(Error::VersionLookupFailed(_))
        ));
    }

    #[test]
    fn env_requires_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Env::from_home(dir.path().join("nope")),
            Err(Error::NdkHomeNotADir { .. })
        ));
    }
}
