mod raw;

pub use self::raw::{LoadError, Raw};

use crate::{
    android, apple,
    util::{
        self,
        cli::{Report, Reportable},
    },
    version_code::{self, VersionName},
};
use std::{
    fmt::{self, Display},
    path::{Path, PathBuf},
};

/// Overrides the `version` key; dragon exports it from the product's build
/// properties.
pub static VERSION_VAR: &str = "PARROT_BUILD_PROP_VERSION";

#[derive(Debug)]
pub enum FromRawError {
    ProductEmpty,
    VariantEmpty,
    VersionInvalid(version_code::Error),
    AndroidConfigInvalid(android::config::Error),
    AppleConfigInvalid(apple::config::Error),
}

impl Display for FromRawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProductEmpty => write!(f, "`product` is empty"),
            Self::VariantEmpty => write!(f, "`variant` is empty"),
            Self::VersionInvalid(err) => write!(f, "`version` invalid: {}", err),
            Self::AndroidConfigInvalid(err) => write!(f, "{}", err),
            Self::AppleConfigInvalid(err) => write!(f, "{}", err),
        }
    }
}

impl FromRawError {
    pub fn report(&self, msg: &str) -> Report {
        match self {
            Self::AndroidConfigInvalid(err) => err.report(msg),
            Self::AppleConfigInvalid(err) => err.report(msg),
            _ => Report::error(msg, self),
        }
    }
}

#[derive(Debug)]
pub enum LoadErrorKind {
    LoadFailed(LoadError),
    NotFound { cwd: PathBuf },
    FromRawFailed { path: PathBuf, cause: FromRawError },
}

impl Reportable for LoadErrorKind {
    fn report(&self) -> Report {
        match self {
            Self::LoadFailed(err) => Report::error("Failed to load config", err),
            Self::NotFound { cwd } => Report::action_request(
                format!("Please create a `{}` file and try again!", Raw::file_name()),
                format!(
                    "No `{}` was found in {:?} or any of its parents.",
                    Raw::file_name(),
                    cwd
                ),
            ),
            Self::FromRawFailed { path, cause } => {
                let msg = format!("Config file at {:?} invalid", path);
                cause.report(&msg)
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    root_dir: PathBuf,
    product: String,
    variant: String,
    version: VersionName,
    workspace_dir: PathBuf,
    out_root_dir: PathBuf,
    alchemy_home: PathBuf,
    android: android::config::Config,
    apple: Option<apple::config::Config>,
}

impl Config {
    pub fn from_raw(
        root_dir: PathBuf,
        raw: Raw,
        version_override: Option<String>,
    ) -> Result<Self, FromRawError> {
        if raw.product.is_empty() {
            return Err(FromRawError::ProductEmpty);
        }
        if raw.variant.is_empty() {
            return Err(FromRawError::VariantEmpty);
        }

        let version = match version_override.or(raw.version) {
            Some(version) => version.parse().map_err(FromRawError::VersionInvalid)?,
            None => {
                log::info!("`version` not set; building unversioned");
                VersionName::default()
            }
        };

        let workspace_dir = raw
            .workspace_dir
            .map(|dir| util::prefix_path(&root_dir, dir))
            .unwrap_or_else(|| root_dir.clone());
        let out_root_dir = raw
            .out_root_dir
            .map(|dir| util::prefix_path(&root_dir, dir))
            .unwrap_or_else(|| {
                let dir = workspace_dir.join("out");
                log::info!("`out-root-dir` not set; defaulting to {:?}", dir);
                dir
            });
        let alchemy_home = raw
            .alchemy_home
            .map(|dir| util::prefix_path(&root_dir, dir))
            .unwrap_or_else(|| {
                let dir = workspace_dir.join("build").join("alchemy");
                log::info!("`alchemy-home` not set; defaulting to {:?}", dir);
                dir
            });

        let android = android::config::Config::from_raw(&workspace_dir, raw.android)
            .map_err(FromRawError::AndroidConfigInvalid)?;
        let apple = raw
            .apple
            .map(|raw| apple::config::Config::from_raw(&workspace_dir, raw))
            .transpose()
            .map_err(FromRawError::AppleConfigInvalid)?;

        Ok(Self {
            root_dir,
            product: raw.product,
            variant: raw.variant,
            version,
            workspace_dir,
            out_root_dir,
            alchemy_home,
            android,
            apple,
        })
    }

    pub fn load(cwd: impl AsRef<Path>) -> Result<Self, LoadErrorKind> {
        let cwd = cwd.as_ref();
        let (root_dir, raw) = Raw::load(cwd)
            .map_err(LoadErrorKind::LoadFailed)?
            .ok_or_else(|| LoadErrorKind::NotFound {
                cwd: cwd.to_owned(),
            })?;
        let version_override = std::env::var(VERSION_VAR).ok().filter(|v| !v.is_empty());
        if let Some(version) = &version_override {
            log::info!("using version {:?} from `{}`", version, VERSION_VAR);
        }
        let path = root_dir.join(Raw::file_name());
        Self::from_raw(root_dir, raw, version_override)
            .map_err(|cause| LoadErrorKind::FromRawFailed { path, cause })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// `<product>-<variant>`, the name alchemy gives to a build.
    pub fn build_name(&self) -> String {
        format!("{}-{}", self.product, self.variant)
    }

    pub fn version(&self) -> &VersionName {
        &self.version
    }

    pub fn workspace_dir(&self) -> &Path {
        &self.workspace_dir
    }

    pub fn out_root_dir(&self) -> &Path {
        &self.out_root_dir
    }

    pub fn out_dir(&self) -> PathBuf {
        self.out_root_dir.join(self.build_name())
    }

    pub fn alchemy_home(&self) -> &Path {
        &self.alchemy_home
    }

    /// `<workspace>/products/<product>/<variant>`
    pub fn product_dir(&self) -> PathBuf {
        self.workspace_dir
            .join("products")
            .join(&self.product)
            .join(&self.variant)
    }

    pub fn android(&self) -> &android::config::Config {
        &self.android
    }

    /// `None` when there's no `[apple]` section.
    pub fn apple(&self) -> Option<&apple::config::Config> {
        self.apple.as_ref()
    }
}
