use crate::{
    android::{
        self,
        abi::Abi,
        asan, genproject, gradle, ndk, ndk_build, release, tasks, NAME,
    },
    config::{Config, LoadErrorKind},
    env::{self, Env},
    opts::OnFailure,
    util::cli::{self, Exec, GlobalFlags, Jobs, Report, Reportable, TextWrapper},
    version_code::{self, VersionName},
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    bin_name = cli::bin_name(NAME),
    settings = cli::SETTINGS,
)]
pub struct Input {
    #[structopt(flatten)]
    flags: GlobalFlags,
    #[structopt(
        long = "abis",
        help = "Comma-separated ABIs to build instead of the configured ones",
        global = true,
        require_delimiter = true,
        possible_values = &Abi::name_list(),
    )]
    abis: Vec<Abi>,
    #[structopt(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, StructOpt)]
pub enum Command {
    #[structopt(
        name = "version-code",
        about = "Prints the versionCode for a version name (the configured one by default)"
    )]
    VersionCode { version: Option<String> },
    #[structopt(name = "ndk-check", about = "Checks the installed NDK against the configured bounds")]
    NdkCheck,
    #[structopt(name = "run", about = "Runs a configured gradle or ndk-build task")]
    Run {
        name: String,
        #[structopt(flatten)]
        jobs: Jobs,
        #[structopt(long = "ignore-failure", help = "Don't fail when ndk-build does")]
        ignore_failure: bool,
    },
    #[structopt(name = "tasks", about = "Lists the tasks to register with dragon")]
    Tasks,
    #[structopt(name = "images", about = "Assembles release images in the out dir")]
    Images,
    #[structopt(name = "asan", about = "Sets up or cleans the address sanitizer runtime")]
    Asan {
        #[structopt(long = "clean", help = "Remove the runtime instead")]
        clean: bool,
    },
    #[structopt(name = "genproject", about = "Generates an IDE project through alchemy")]
    GenProject {
        #[structopt(possible_values = &["geneclipse", "genqtcreator", "genvscode"])]
        kind: genproject::Kind,
        #[structopt(name = "args", last = true)]
        args: Vec<String>,
    },
}

#[derive(Debug)]
pub enum Error {
    EnvInitFailed(env::Error),
    ConfigFailed(LoadErrorKind),
    VersionInvalid(version_code::Error),
    NdkFailed(ndk::Error),
    TaskNotFound { name: String, available: Vec<String> },
    GradleFailed(gradle::Error),
    NdkBuildFailed(ndk_build::Error),
    DefaultAbiNotBuilt,
    GenProjectFailed(genproject::Error),
    AsanFailed(asan::Error),
    ImagesFailed(release::Error),
}

impl Reportable for Error {
    fn report(&self) -> Report {
        match self {
            Self::EnvInitFailed(err) => err.report(),
            Self::ConfigFailed(err) => err.report(),
            Self::VersionInvalid(err) => err.report(),
            Self::NdkFailed(err) => err.report(),
            Self::TaskNotFound { name, available } => Report::error(
                format!("No gradle or ndk-build task named {:?}", name),
                if available.is_empty() {
                    "No tasks are configured.".to_owned()
                } else {
                    format!("Configured tasks: {}", available.join(", "))
                },
            ),
            Self::GradleFailed(err) => err.report(),
            Self::NdkBuildFailed(err) => err.report(),
            Self::DefaultAbiNotBuilt => Report::action_request(
                "Add `android.default-abi` to `android.abis` (or pass it in `--abis`)",
                "Projects are generated for the default ABI, which isn't being built.",
            ),
            Self::GenProjectFailed(err) => err.report(),
            Self::AsanFailed(err) => err.report(),
            Self::ImagesFailed(err) => err.report(),
        }
    }
}

fn load() -> Result<(Config, Env), Error> {
    let config = Config::load(".").map_err(Error::ConfigFailed)?;
    let env = Env::new().map_err(Error::EnvInitFailed)?;
    Ok((config, env))
}

impl Exec for Input {
    type Report = Error;

    fn global_flags(&self) -> GlobalFlags {
        self.flags
    }

    fn exec(self, wrapper: &TextWrapper) -> Result<(), Self::Report> {
        let Self {
            flags,
            abis: overridden,
            command,
        } = self;
        match command {
            Command::VersionCode {
                version: Some(version),
            } => {
                let version = version.parse::<VersionName>().map_err(Error::VersionInvalid)?;
                println!("{}", version.code());
                Ok(())
            }
            Command::VersionCode { version: None } => {
                let config = Config::load(".").map_err(Error::ConfigFailed)?;
                println!("{}", config.version().code());
                Ok(())
            }
            Command::NdkCheck => {
                let config = Config::load(".").map_err(Error::ConfigFailed)?;
                let ndk = ndk::Env::new().map_err(Error::NdkFailed)?;
                let version = ndk
                    .check(config.android().ndk_bounds(), NAME)
                    .map_err(Error::NdkFailed)?;
                Report::victory(
                    format!("NDK {} is supported", version),
                    format!("Found at {:?}", ndk.home()),
                )
                .print(wrapper);
                Ok(())
            }
            Command::Run {
                name,
                jobs,
                ignore_failure,
            } => {
                let (config, env) = load()?;
                if let Some(task) = config.android().gradle_task(&name) {
                    gradle::run(&config, &env, task).map_err(Error::GradleFailed)
                } else if let Some(task) = config.android().ndk_build_task(&name) {
                    let ndk = ndk::Env::new().map_err(Error::NdkFailed)?;
                    let options = ndk_build::Options {
                        abis: ndk_build::resolve_abis(task, config.android().abis(), &overridden),
                        noise_level: flags.noise_level,
                        jobs: jobs.resolve(),
                        on_failure: OnFailure::from_flag(ignore_failure || task.ignore_failure),
                    };
                    ndk_build::run(&config, &env, &ndk, task, options)
                        .map_err(Error::NdkBuildFailed)
                } else {
                    let available = config
                        .android()
                        .gradle_tasks()
                        .iter()
                        .map(|task| task.name.clone())
                        .chain(
                            config
                                .android()
                                .ndk_build_tasks()
                                .iter()
                                .map(|task| task.name.clone()),
                        )
                        .collect();
                    Err(Error::TaskNotFound { name, available })
                }
            }
            Command::Tasks => {
                let (config, env) = load()?;
                let abis = android::abis(config.android(), &overridden);
                for task in tasks::tasks(&config, abis, env.sanitizer()) {
                    println!("{}", task);
                }
                Ok(())
            }
            Command::Images => {
                let config = Config::load(".").map_err(Error::ConfigFailed)?;
                let abi = android::release_abi(config.android(), &overridden);
                release::images(&config, abi).map_err(Error::ImagesFailed)?;
                Report::victory(
                    "Release images assembled",
                    format!("in {:?}", release::images_dir(&config)),
                )
                .print(wrapper);
                Ok(())
            }
            Command::Asan { clean } => {
                let config = Config::load(".").map_err(Error::ConfigFailed)?;
                let out_dir = config.out_dir();
                for &abi in android::abis(config.android(), &overridden) {
                    if clean {
                        asan::clean(&out_dir, abi).map_err(Error::AsanFailed)?;
                    } else {
                        asan::setup(&out_dir, abi).map_err(Error::AsanFailed)?;
                    }
                }
                Ok(())
            }
            Command::GenProject { kind, args } => {
                let (config, env) = load()?;
                let abis = android::abis(config.android(), &overridden);
                let abi = tasks::default_abi(&config, abis).ok_or(Error::DefaultAbiNotBuilt)?;
                genproject::run(&config, &env, kind, abi, &args).map_err(Error::GenProjectFailed)
            }
        }
    }
}
