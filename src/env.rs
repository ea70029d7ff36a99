use crate::{
    opts::Sanitizer,
    util::cli::{Report, Reportable},
};
use std::{
    ffi::OsStr,
    fmt::{self, Debug, Display},
};

pub trait ExplicitEnv: Debug {
    fn explicit_env(&self) -> Vec<(&str, &OsStr)>;
}

#[derive(Debug)]
pub enum Error {
    HomeNotSet(std::env::VarError),
    PathNotSet(std::env::VarError),
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HomeNotSet(err) => write!(
                f,
                "The `HOME` environment variable isn't set, which is pretty weird: {}",
                err
            ),
            Self::PathNotSet(err) => write!(
                f,
                "The `PATH` environment variable isn't set, which is super weird: {}",
                err
            ),
        }
    }
}

impl std::error::Error for Error {}

impl Reportable for Error {
    fn report(&self) -> Report {
        Report::error("Failed to initialize base environment", self)
    }
}

/// The slice of the process environment the build glue cares about.
#[derive(Debug, Clone)]
pub struct Env {
    home: String,
    path: String,
    term: Option<String>,
    move_appsdata: bool,
    sanitizer: Sanitizer,
}

impl Env {
    pub fn new() -> Result<Self, Error> {
        let home = std::env::var("HOME").map_err(Error::HomeNotSet)?;
        let path = std::env::var("PATH").map_err(Error::PathNotSet)?;
        let term = std::env::var("TERM").ok();
        let move_appsdata = std::env::var("MOVE_APPSDATA_IN_OUTDIR")
            .map(|value| !value.is_empty())
            .unwrap_or_default();
        if move_appsdata {
            log::info!("`MOVE_APPSDATA_IN_OUTDIR` is set; tool caches will live in the out dir");
        }
        let sanitizer = Sanitizer::from_var(std::env::var("USE_ADDRESS_SANITIZER").ok().as_deref());
        if sanitizer.address() {
            log::info!("address sanitizer enabled by `USE_ADDRESS_SANITIZER`");
        }
        Ok(Self {
            home,
            path,
            term,
            move_appsdata,
            sanitizer,
        })
    }

    /// An environment with no process state, for computing command lines.
    pub fn bare() -> Self {
        Self {
            home: String::new(),
            path: String::new(),
            term: None,
            move_appsdata: false,
            sanitizer: Sanitizer::Off,
        }
    }

    pub fn with_move_appsdata(mut self, move_appsdata: bool) -> Self {
        self.move_appsdata = move_appsdata;
        self
    }

    pub fn with_sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Tool caches (`.gradle`, Xcode derived data) go under the out dir.
    pub fn move_appsdata(&self) -> bool {
        self.move_appsdata
    }

    pub fn sanitizer(&self) -> Sanitizer {
        self.sanitizer
    }
}

impl ExplicitEnv for Env {
    fn explicit_env(&self) -> Vec<(&str, &OsStr)> {
        let mut env: Vec<(&str, &OsStr)> = Vec::new();
        if !self.home.is_empty() {
            env.push(("HOME", self.home.as_ref()));
        }
        if !self.path.is_empty() {
            env.push(("PATH", self.path.as_ref()));
        }
        if let Some(term) = self.term.as_ref() {
            env.push(("TERM", term.as_ref()));
        }
        env
    }
}
