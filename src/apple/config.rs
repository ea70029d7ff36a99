use super::app::{App, RawApp};
use crate::util::{self, cli::Report};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display},
    path::{Path, PathBuf},
};

static DEFAULT_BUILD_COMMON_TASK: &str = "build-common";

#[derive(Debug)]
pub enum Error {
    WorkspaceMissing,
    TaskNameDuplicated { name: String },
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WorkspaceMissing => write!(
                f,
                "`{}.workspace` must name the Xcode workspace or project to build",
                super::NAME
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
        match self {
            Self::WorkspaceMissing => Report::action_request(msg, self),
            Self::TaskNameDuplicated { .. } => Report::error(msg, self),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawXcodebuildTask {
    pub name: String,
    pub desc: Option<String>,
    pub calldir: Option<String>,
    pub workspace: Option<String>,
    pub configuration: String,
    pub scheme: String,
    pub action: String,
    pub bundle_id: Option<String>,
    pub team_id: Option<String>,
    pub extra_args: Option<Vec<String>>,
    pub subtasks: Option<Vec<String>>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawXctoolTask {
    pub name: String,
    pub desc: Option<String>,
    pub calldir: Option<String>,
    pub workspace: Option<String>,
    pub configuration: String,
    pub scheme: String,
    pub action: String,
    pub reporter: Option<String>,
    pub extra_args: Option<Vec<String>>,
    pub subtasks: Option<Vec<String>>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawJazzyTask {
    pub name: String,
    pub desc: Option<String>,
    pub calldir: Option<String>,
    pub scheme: String,
    pub extra_args: Option<Vec<String>>,
    pub subtasks: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawRelease {
    pub extra_tasks: Option<Vec<String>>,
    pub build_common_task: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Raw {
    pub project_dir: Option<String>,
    pub workspace: Option<String>,
    pub apps: Option<Vec<RawApp>>,
    pub xcodebuild: Option<Vec<RawXcodebuildTask>>,
    pub xctool: Option<Vec<RawXctoolTask>>,
    pub jazzy: Option<Vec<RawJazzyTask>>,
    pub release: Option<RawRelease>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct XcodebuildTask {
    pub name: String,
    pub desc: String,
    pub calldir: PathBuf,
    pub workspace: PathBuf,
    pub configuration: String,
    pub scheme: String,
    pub action: String,
    pub bundle_id: Option<String>,
    pub team_id: Option<String>,
    pub extra_args: Vec<String>,
    pub subtasks: Vec<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct XctoolTask {
    pub name: String,
    pub desc: String,
    pub calldir: PathBuf,
    pub workspace: PathBuf,
    pub configuration: String,
    pub scheme: String,
    pub action: String,
    pub reporter: Option<String>,
    pub extra_args: Vec<String>,
    pub subtasks: Vec<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JazzyTask {
    pub name: String,
    pub desc: String,
    pub calldir: PathBuf,
    pub scheme: String,
    pub extra_args: Vec<String>,
    pub subtasks: Vec<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Release {
    pub extra_tasks: Vec<String>,
    pub build_common_task: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    project_dir: PathBuf,
    workspace: PathBuf,
    apps: Vec<App>,
    xcodebuild_tasks: Vec<XcodebuildTask>,
    xctool_tasks: Vec<XctoolTask>,
    jazzy_tasks: Vec<JazzyTask>,
    release: Release,
}

impl Config {
    pub fn from_raw(workspace_dir: &Path, raw: Raw) -> Result<Self, Error> {
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
        let workspace = raw
            .workspace
            .map(|workspace| util::prefix_path(&project_dir, workspace))
            .ok_or(Error::WorkspaceMissing)?;

        let apps = App::list_from_raw(raw.apps.unwrap_or_default());

        // Task calldirs are relative to the workspace dir, and task
        // workspaces to their calldir.
        let calldir = |calldir: Option<String>| {
            calldir
                .map(|calldir| util::prefix_path(workspace_dir, calldir))
                .unwrap_or_else(|| project_dir.clone())
        };
        let task_workspace = |calldir: &Path, task_workspace: Option<String>| {
            task_workspace
                .map(|task_workspace| util::prefix_path(calldir, task_workspace))
                .unwrap_or_else(|| workspace.clone())
        };

        let xcodebuild_tasks = raw
            .xcodebuild
            .unwrap_or_default()
            .into_iter()
            .map(|task| {
                let desc = match task.desc {
                    Some(desc) => desc,
                    None => format!("xcodebuild {} {}", task.action, task.scheme),
                };
                let calldir = calldir(task.calldir);
                XcodebuildTask {
                    desc,
                    workspace: task_workspace(&calldir, task.workspace),
                    calldir,
                    name: task.name,
                    configuration: task.configuration,
                    scheme: task.scheme,
                    action: task.action,
                    bundle_id: task.bundle_id,
                    team_id: task.team_id,
                    extra_args: task.extra_args.unwrap_or_default(),
                    subtasks: task.subtasks.unwrap_or_default(),
                }
            })
            .collect::<Vec<_>>();

        let xctool_tasks = raw
            .xctool
            .unwrap_or_default()
            .into_iter()
            .map(|task| {
                let desc = match task.desc {
                    Some(desc) => desc,
                    None => format!("xctool {} {}", task.action, task.scheme),
                };
                let calldir = calldir(task.calldir);
                XctoolTask {
                    desc,
                    workspace: task_workspace(&calldir, task.workspace),
                    calldir,
                    name: task.name,
                    configuration: task.configuration,
                    scheme: task.scheme,
                    action: task.action,
                    reporter: task.reporter,
                    extra_args: task.extra_args.unwrap_or_default(),
                    subtasks: task.subtasks.unwrap_or_default(),
                }
            })
            .collect::<Vec<_>>();

        let jazzy_tasks = raw
            .jazzy
            .unwrap_or_default()
            .into_iter()
            .map(|task| {
                let desc = match task.desc {
                    Some(desc) => desc,
                    None => format!("Generate docs for {}", task.scheme),
                };
                JazzyTask {
                    desc,
                    calldir: calldir(task.calldir),
                    name: task.name,
                    scheme: task.scheme,
                    extra_args: task.extra_args.unwrap_or_default(),
                    subtasks: task.subtasks.unwrap_or_default(),
                }
            })
            .collect::<Vec<_>>();

        {
            let mut names = xcodebuild_tasks
                .iter()
                .map(|task| task.name.clone())
                .chain(xctool_tasks.iter().map(|task| task.name.clone()))
                .chain(jazzy_tasks.iter().map(|task| task.name.clone()))
                .chain(apps.iter().map(App::task_name))
                .collect::<Vec<_>>();
            names.sort_unstable();
            if let Some(pair) = names.windows(2).find(|pair| pair[0] == pair[1]) {
                return Err(Error::TaskNameDuplicated {
                    name: pair[0].clone(),
                });
            }
        }

        let raw_release = raw.release.unwrap_or_default();
        let release = Release {
            extra_tasks: raw_release.extra_tasks.unwrap_or_default(),
            build_common_task: raw_release
                .build_common_task
                .unwrap_or_else(|| DEFAULT_BUILD_COMMON_TASK.to_owned()),
        };

        Ok(Self {
            project_dir,
            workspace,
            apps,
            xcodebuild_tasks,
            xctool_tasks,
            jazzy_tasks,
            release,
        })
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn apps(&self) -> &[App] {
        &self.apps
    }

    pub fn app(&self, name: &str) -> Option<&App> {
        self.apps.iter().find(|app| app.name() == name)
    }

    pub fn xcodebuild_tasks(&self) -> &[XcodebuildTask] {
        &self.xcodebuild_tasks
    }

    pub fn xctool_tasks(&self) -> &[XctoolTask] {
        &self.xctool_tasks
    }

    pub fn jazzy_tasks(&self) -> &[JazzyTask] {
        &self.jazzy_tasks
    }

    pub fn release(&self) -> &Release {
        &self.release
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(toml: &str) -> Result<Config, Error> {
        let raw: Raw = toml::from_str(toml).unwrap();
        Config::from_raw(Path::new("/work"), raw)
    }

    #[test]
    fn full() {
        let config = parse(
            r#"
            project-dir = "apps/ios"
            workspace = "FreeFlight.xcworkspace"

            [[apps]]
            scheme = "FreeFlight"
            configuration = "Release"
            bundle-id = "com.parrot.freeflight"
            inhouse = { team-id = "ABCDE12345", profile = "FreeFlight InHouse" }

            [[apps]]
            scheme = "FreeFlight"
            configuration = "Debug"
            bundle-id = "com.parrot.freeflight.debug"

            [[xctool]]
            name = "test"
            configuration = "Debug"
            scheme = "FreeFlightTests"
            action = "test"
            reporter = "junit:out.xml"
            "#,
        )
        .unwrap();
        assert_eq!(config.project_dir(), Path::new("/work/apps/ios"));
        assert_eq!(
            config.workspace(),
            Path::new("/work/apps/ios/FreeFlight.xcworkspace")
        );
        let names = config.apps().iter().map(App::name).collect::<Vec<_>>();
        assert_eq!(names, vec!["FreeFlight-Release", "FreeFlight-Debug-1"]);
        assert_eq!(
            config.app("FreeFlight-Release").and_then(App::inhouse).map(|inhouse| inhouse.team_id.as_str()),
            Some("ABCDE12345")
        );
        assert_eq!(config.xctool_tasks()[0].desc, "xctool test FreeFlightTests");
        assert_eq!(config.release().build_common_task, "build-common");
    }

    #[test]
    fn tasks_default_their_desc_calldir_and_workspace() {
        let config = parse(
            r#"
            project-dir = "apps/ios"
            workspace = "FreeFlight.xcworkspace"

            [[xcodebuild]]
            name = "sdk"
            configuration = "Release"
            scheme = "GroundSdk"
            action = "build"
            calldir = "packages/sdk"
            workspace = "GroundSdk.xcodeproj"

            [[xcodebuild]]
            name = "app"
            configuration = "Release"
            scheme = "FreeFlight"
            action = "build"

            [[xctool]]
            name = "test"
            configuration = "Debug"
            scheme = "FreeFlightTests"
            action = "test"

            [[jazzy]]
            name = "docs"
            scheme = "GroundSdk"
            calldir = "packages/sdk"
            "#,
        )
        .unwrap();
        let sdk = &config.xcodebuild_tasks()[0];
        assert_eq!(sdk.desc, "xcodebuild build GroundSdk");
        assert_eq!(sdk.calldir, Path::new("/work/packages/sdk"));
        assert_eq!(
            sdk.workspace,
            Path::new("/work/packages/sdk/GroundSdk.xcodeproj")
        );
        let app = &config.xcodebuild_tasks()[1];
        assert_eq!(app.calldir, Path::new("/work/apps/ios"));
        assert_eq!(
            app.workspace,
            Path::new("/work/apps/ios/FreeFlight.xcworkspace")
        );
        let test = &config.xctool_tasks()[0];
        assert_eq!(test.desc, "xctool test FreeFlightTests");
        assert_eq!(test.calldir, Path::new("/work/apps/ios"));
        assert_eq!(test.workspace, config.workspace());
        let docs = &config.jazzy_tasks()[0];
        assert_eq!(docs.desc, "Generate docs for GroundSdk");
        assert_eq!(docs.calldir, Path::new("/work/packages/sdk"));
    }

    #[test]
    fn workspace_is_required() {
        assert!(matches!(
            parse(r#"project-dir = "apps/ios""#),
            Err(Error::WorkspaceMissing)
        ));
    }

    #[test]
    fn task_names_must_be_unique() {
        let err = parse(
            r#"
            workspace = "FreeFlight.xcodeproj"

            [[xcodebuild]]
            name = "docs"
            configuration = "Debug"
            scheme = "FreeFlight"
            action = "build"

            [[jazzy]]
            name = "docs"
            scheme = "FreeFlight"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::TaskNameDuplicated { name } if name == "docs"));
    }
}
