use crate::{
    apple::{
        config::Config as AppleConfig, jazzy, product, release, tasks, xcodebuild, xctool, NAME,
    },
    config::{Config, LoadErrorKind},
    env::{self, Env},
    util::cli::{self, Exec, GlobalFlags, Report, Reportable, TextWrapper},
    version_code::{self, VersionName},
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(bin_name = cli::bin_name(NAME), settings = cli::SETTINGS)]
pub struct Input {
    #[structopt(flatten)]
    flags: GlobalFlags,
    #[structopt(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, StructOpt)]
pub enum Command {
    #[structopt(
        name = "version-code",
        about = "Prints the CFBundleVersion for a version name (the configured one by default)"
    )]
    VersionCode { version: Option<String> },
    #[structopt(name = "product", about = "Writes product.xcconfig for the current product")]
    Product,
    #[structopt(name = "run", about = "Runs a configured xcodebuild, xctool or jazzy task")]
    Run { name: String },
    #[structopt(name = "archive", about = "Archives apps for release (all by default)")]
    Archive { apps: Vec<String> },
    #[structopt(name = "images", about = "Assembles release images in the out dir")]
    Images {
        #[structopt(long = "archive", help = "Archive every app first")]
        archive: bool,
    },
    #[structopt(name = "tasks", about = "Lists the tasks to register with dragon")]
    Tasks,
}

#[derive(Debug)]
pub enum Error {
    EnvInitFailed(env::Error),
    ConfigFailed(LoadErrorKind),
    Unconfigured,
    VersionInvalid(version_code::Error),
    XcconfigWriteFailed(std::io::Error),
    TaskNotFound { name: String },
    AppNotFound { name: String },
    XcodebuildFailed(xcodebuild::Error),
    XctoolFailed(xctool::Error),
    JazzyFailed(jazzy::Error),
    ReleaseFailed(release::Error),
}

impl Reportable for Error {
    fn report(&self) -> Report {
        match self {
            Self::EnvInitFailed(err) => err.report(),
            Self::ConfigFailed(err) => err.report(),
            Self::Unconfigured => Report::action_request(
                "Add an `[apple]` section to your config and try again!",
                "Nothing is known about the Xcode project to build.",
            ),
            Self::VersionInvalid(err) => err.report(),
            Self::XcconfigWriteFailed(err) => Report::error("Failed to write product.xcconfig", err),
            Self::TaskNotFound { name } => Report::error(
                format!("No xcodebuild, xctool or jazzy task named {:?}", name),
                "Run `tasks` to see what's configured.",
            ),
            Self::AppNotFound { name } => Report::error(
                format!("No app named {:?}", name),
                "Apps are named `<scheme>-<configuration>[-<index>]` unless they have a display name.",
            ),
            Self::XcodebuildFailed(err) => err.report(),
            Self::XctoolFailed(err) => err.report(),
            Self::JazzyFailed(err) => err.report(),
            Self::ReleaseFailed(err) => err.report(),
        }
    }
}

fn apple(config: &Config) -> Result<&AppleConfig, Error> {
    config.apple().ok_or(Error::Unconfigured)
}

impl Exec for Input {
    type Report = Error;

    fn global_flags(&self) -> GlobalFlags {
        self.flags
    }

    fn exec(self, wrapper: &TextWrapper) -> Result<(), Self::Report> {
        let noise_level = self.flags.noise_level;
        if let Command::VersionCode {
            version: Some(version),
        } = &self.command
        {
            let version = version.parse::<VersionName>().map_err(Error::VersionInvalid)?;
            println!("{}", version.code().apple_build_number());
            return Ok(());
        }

        let config = Config::load(".").map_err(Error::ConfigFailed)?;
        match self.command {
            Command::VersionCode { .. } => {
                println!("{}", config.version().code().apple_build_number());
                Ok(())
            }
            Command::Product => product::write_xcconfig(&config)
                .map(|_| ())
                .map_err(Error::XcconfigWriteFailed),
            Command::Run { name } => {
                let apple = apple(&config)?;
                let env = Env::new().map_err(Error::EnvInitFailed)?;
                if let Some(task) = apple.xcodebuild_tasks().iter().find(|task| task.name == name) {
                    xcodebuild::run(
                        &config,
                        &task.calldir,
                        &task.workspace,
                        &env,
                        noise_level,
                        &task.into(),
                    )
                    .map_err(Error::XcodebuildFailed)
                } else if let Some(task) = apple.xctool_tasks().iter().find(|task| task.name == name) {
                    xctool::run(config.variant(), &env, task).map_err(Error::XctoolFailed)
                } else if let Some(task) = apple.jazzy_tasks().iter().find(|task| task.name == name) {
                    jazzy::run(&config, &env, task).map_err(Error::JazzyFailed)
                } else {
                    Err(Error::TaskNotFound { name })
                }
            }
            Command::Archive { apps } => {
                let apple = apple(&config)?;
                let env = Env::new().map_err(Error::EnvInitFailed)?;
                let selected = if apps.is_empty() {
                    apple.apps().iter().collect::<Vec<_>>()
                } else {
                    apps.into_iter()
                        .map(|name| apple.app(&name).ok_or(Error::AppNotFound { name }))
                        .collect::<Result<Vec<_>, _>>()?
                };
                for app in selected {
                    release::archive(&config, apple, &env, noise_level, app)
                        .map_err(Error::ReleaseFailed)?;
                }
                Ok(())
            }
            Command::Images { archive } => {
                let apple = apple(&config)?;
                let env = Env::new().map_err(Error::EnvInitFailed)?;
                release::clean(&config).map_err(Error::ReleaseFailed)?;
                if archive {
                    for app in apple.apps() {
                        release::archive(&config, apple, &env, noise_level, app)
                            .map_err(Error::ReleaseFailed)?;
                    }
                }
                release::images(&config, apple, &env).map_err(Error::ReleaseFailed)?;
                Report::victory(
                    "Release images assembled",
                    format!("in {:?}", release::images_dir(&config)),
                )
                .print(wrapper);
                Ok(())
            }
            Command::Tasks => {
                for task in tasks::tasks(apple(&config)?) {
                    println!("{}", task);
                }
                Ok(())
            }
        }
    }
}
