use crate::util::{VersionDouble, VersionDoubleError};
use std::{
    collections::HashMap,
    fmt::{self, Display},
    path::{Path, PathBuf},
};
use thiserror::Error;

type Props = HashMap<String, String>;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Revision {
    pub raw: String,
    pub double: VersionDouble,
}

impl Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl Revision {
    // `Pkg.Revision` is `<major>.<minor>.<build>[-beta<n>]`; only the first
    // two components say anything about compatibility.
    fn from_str(revision: &str) -> Result<Self, VersionDoubleError> {
        let revision = revision.trim();
        Ok(Self {
            raw: revision.to_owned(),
            double: revision.parse()?,
        })
    }
}

#[derive(Debug, Error)]
pub enum PkgError {
    #[error("`Pkg.Revision` missing.")]
    RevisionMissing,
    #[error("Failed to parse `Pkg.Revision`: {0}")]
    RevisionInvalid(#[from] VersionDoubleError),
}

#[derive(Debug)]
pub struct Pkg {
    pub revision: Revision,
}

impl Pkg {
    fn from_props(props: &Props) -> Result<Self, PkgError> {
        let revision = props
            .get("Pkg.Revision")
            .ok_or(PkgError::RevisionMissing)
            .and_then(|s| Revision::from_str(s).map_err(Into::into))?;
        Ok(Self { revision })
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to open {path:?}: {source}")]
    OpenFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {path:?}: {source}")]
    ParseFailed {
        path: PathBuf,
        source: java_properties::PropertiesError,
    },
    #[error("Failed to parse `Pkg` in {path:?}: {source}")]
    PkgInvalid { path: PathBuf, source: PkgError },
}

#[derive(Debug)]
pub struct SourceProps {
    pub pkg: Pkg,
}

impl SourceProps {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| Error::OpenFailed {
            path: path.to_owned(),
            source,
        })?;
        let props = java_properties::read(file).map_err(|source| Error::ParseFailed {
            path: path.to_owned(),
            source,
        })?;
        let pkg = Pkg::from_props(&props).map_err(|source| Error::PkgInvalid {
            path: path.to_owned(),
            source,
        })?;
        log::info!("read `Pkg.Revision` {} from {:?}", pkg.revision, path);
        Ok(Self { pkg })
    }
}
