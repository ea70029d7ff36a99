use super::{
    abi::Abi,
    ndk::{Bounds, NdkVersion, VersionUnreadable},
};
use crate::util::{self, cli::Report};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display},
    path::{Path, PathBuf},
};

static DEFAULT_ABIS: &[Abi] = &[Abi::ArmeabiV7a];

#[derive(Debug)]
pub enum Error {
    AbisEmpty,
    NdkVersionInvalid {
        key: &'static str,
        cause: VersionUnreadable,
    },
    NdkBoundsEmpty {
        min: NdkVersion,
        max: NdkVersion,
    },
    TaskNameDuplicated {
        name: String,
    },
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AbisEmpty => write!(f, "`{}.abis` is empty", super::NAME),
            Self::NdkVersionInvalid { key, cause } => {
                write!(f, "`{}.{}` invalid: {}", super::NAME, key, cause)
            }
            Self::NdkBoundsEmpty { min, max } => write!(
                f,
                "no NDK satisfies `{}.min-ndk-version` {} and `{}.max-ndk-version` {}",
                super::NAME,
                min,
                super::NAME,
                max
            ),
            Self::TaskNameDuplicated { name } => {
                write!(f, "more than one `{}` task is named {:?}", super::NAME, name)
            }
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn report(&self, msg: &str) -> Report {
        Report::error(msg, self)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawGradleTask {
    pub name: String,
    pub desc: Option<String>,
    pub calldir: Option<String>,
    pub target: Option<String>,
    pub extra_args: Option<Vec<String>>,
    pub subtasks: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawNdkBuildTask {
    pub name: String,
    pub desc: Option<String>,
    pub calldir: Option<String>,
    pub module: String,
    pub abis: Option<Vec<Abi>>,
    pub extra_args: Option<Vec<String>>,
    pub subtasks: Option<Vec<String>>,
    pub ignore_failure: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawRelease {
    pub symbols_dir: Option<String>,
    pub apks: Option<Vec<String>>,
    pub build_task: Option<String>,
    pub extra_tasks: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Raw {
    pub abis: Option<Vec<Abi>>,
    pub default_abi: Option<Abi>,
    pub project_dir: Option<String>,
    pub min_ndk_version: Option<String>,
    pub max_ndk_version: Option<String>,
    pub gradle: Option<Vec<RawGradleTask>>,
    pub ndk_build: Option<Vec<RawNdkBuildTask>>,
    pub release: Option<RawRelease>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GradleTask {
    pub name: String,
    pub desc: String,
    pub calldir: PathBuf,
    pub target: Option<String>,
    pub extra_args: Vec<String>,
    pub subtasks: Vec<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NdkBuildTask {
    pub name: String,
    pub desc: String,
    pub calldir: PathBuf,
    pub module: String,
    pub abis: Option<Vec<Abi>>,
    pub extra_args: Vec<String>,
    pub subtasks: Vec<String>,
    pub ignore_failure: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Release {
    pub symbols_dir: Option<PathBuf>,
    pub apks: Vec<PathBuf>,
    pub build_task: String,
    pub extra_tasks: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct Config {
    abis: Vec<Abi>,
    default_abi: Option<Abi>,
    project_dir: PathBuf,
    ndk_bounds: Bounds,
    gradle_tasks: Vec<GradleTask>,
    ndk_build_tasks: Vec<NdkBuildTask>,
    release: Release,
}

fn parse_ndk_version(
    key: &'static str,
    version: Option<String>,
) -> Result<Option<NdkVersion>, Error> {
    version
        .map(|version| {
            version
                .parse()
                .map_err(|cause| Error::NdkVersionInvalid { key, cause })
        })
        .transpose()
}

impl Config {
    pub fn from_raw(workspace_dir: &Path, raw: Option<Raw>) -> Result<Self, Error> {
        let raw = raw.unwrap_or_default();

        let abis = raw.abis.unwrap_or_else(|| {
            log::info!(
                "`{}.abis` not set; defaulting to {}",
                super::NAME,
                util::list_display(DEFAULT_ABIS)
            );
            DEFAULT_ABIS.to_vec()
        });
        if abis.is_empty() {
            return Err(Error::AbisEmpty);
        }

        let project_dir = raw
            .project_dir
            .map(|project_dir| util::prefix_path(workspace_dir, project_dir))
            .unwrap_or_else(|| {
                log::info!(
                    "`{}.project-dir` not set; defaulting to {:?}",
                    super::NAME,
                    workspace_dir
                );
                workspace_dir.to_owned()
            });

        let ndk_bounds = Bounds {
            min: parse_ndk_version("min-ndk-version", raw.min_ndk_version)?,
            max: parse_ndk_version("max-ndk-version", raw.max_ndk_version)?,
        };
        if let Bounds {
            min: Some(min),
            max: Some(max),
        } = ndk_bounds
        {
            if min >= max {
                return Err(Error::NdkBoundsEmpty { min, max });
            }
        }

        let gradle_tasks = raw
            .gradle
            .unwrap_or_default()
            .into_iter()
            .map(|task| {
                let desc = match task.desc {
                    Some(desc) => desc,
                    None => format!("Run gradle for {}", task.name),
                };
                GradleTask {
                    desc,
                    calldir: task
                        .calldir
                        .map(|calldir| util::prefix_path(workspace_dir, calldir))
                        .unwrap_or_else(|| project_dir.clone()),
                    name: task.name,
                    target: task.target,
                    extra_args: task.extra_args.unwrap_or_default(),
                    subtasks: task.subtasks.unwrap_or_default(),
                }
            })
            .collect::<Vec<_>>();

        let ndk_build_tasks = raw
            .ndk_build
            .unwrap_or_default()
            .into_iter()
            .map(|task| {
                let desc = match task.desc {
                    Some(desc) => desc,
                    None => format!("Run ndk-build for {}", task.module),
                };
                NdkBuildTask {
                    desc,
                    calldir: task
                        .calldir
                        .map(|calldir| util::prefix_path(workspace_dir, calldir))
                        .unwrap_or_else(|| workspace_dir.to_owned()),
                    name: task.name,
                    module: task.module,
                    abis: task.abis,
                    extra_args: task.extra_args.unwrap_or_default(),
                    subtasks: task.subtasks.unwrap_or_default(),
                    ignore_failure: task.ignore_failure.unwrap_or_default(),
                }
            })
            .collect::<Vec<_>>();

        {
            let mut names = gradle_tasks
                .iter()
                .map(|task| task.name.as_str())
                .chain(ndk_build_tasks.iter().map(|task| task.name.as_str()))
                .collect::<Vec<_>>();
            names.sort_unstable();
            if let Some(pair) = names.windows(2).find(|pair| pair[0] == pair[1]) {
                return Err(Error::TaskNameDuplicated {
                    name: pair[0].to_owned(),
                });
            }
        }

        let raw_release = raw.release.unwrap_or_default();
        let release = Release {
            symbols_dir: raw_release
                .symbols_dir
                .map(|symbols_dir| util::prefix_path(workspace_dir, symbols_dir)),
            apks: raw_release
                .apks
                .unwrap_or_default()
                .into_iter()
                .map(|apk| util::prefix_path(&project_dir, apk))
                .collect(),
            build_task: raw_release
                .build_task
                .unwrap_or_else(|| "build".to_owned()),
            extra_tasks: raw_release.extra_tasks.unwrap_or_default(),
        };

        Ok(Self {
            abis,
            default_abi: raw.default_abi,
            project_dir,
            ndk_bounds,
            gradle_tasks,
            ndk_build_tasks,
            release,
        })
    }

    pub fn abis(&self) -> &[Abi] {
        &self.abis
    }

    /// The configured default, which may not be among `abis`; callers decide
    /// what to do about that.
    pub fn default_abi(&self) -> Abi {
        self.default_abi.unwrap_or(self.abis[0])
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn ndk_bounds(&self) -> Bounds {
        self.ndk_bounds
    }

    pub fn gradle_tasks(&self) -> &[GradleTask] {
        &self.gradle_tasks
    }

    pub fn ndk_build_tasks(&self) -> &[NdkBuildTask] {
        &self.ndk_build_tasks
    }

    pub fn gradle_task(&self, name: &str) -> Option<&GradleTask> {
        self.gradle_tasks.iter().find(|task| task.name == name)
    }

    pub fn ndk_build_task(&self, name: &str) -> Option<&NdkBuildTask> {
        self.ndk_build_tasks.iter().find(|task| task.name == name)
    }

    pub fn release(&self) -> &Release {
        &self.release
    }
}
