use super::abi::Abi;
use crate::{
    config::Config,
    env::{Env, ExplicitEnv as _},
    util::cli::{Report, Reportable},
    DuctExpressionExt as _,
};
use std::{
    fmt::{self, Display},
    io,
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    Eclipse,
    QtCreator,
    VsCode,
}

impl Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.task_name())
    }
}

#[derive(Debug, Error)]
#[error("{name:?} isn't a project generator; expected one of geneclipse, genqtcreator, genvscode")]
pub struct KindInvalid {
    name: String,
}

impl FromStr for Kind {
    type Err = KindInvalid;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.task_name() == name || kind.script_arg() == name)
            .ok_or_else(|| KindInvalid {
                name: name.to_owned(),
            })
    }
}

impl Kind {
    pub const ALL: &'static [Self] = &[Self::Eclipse, Self::QtCreator, Self::VsCode];

    pub fn task_name(self) -> &'static str {
        match self {
            Self::Eclipse => "geneclipse",
            Self::QtCreator => "genqtcreator",
            Self::VsCode => "genvscode",
        }
    }

    /// The `genproject.py` subcommand: the task name minus `gen`.
    pub fn script_arg(self) -> &'static str {
        &self.task_name()["gen".len()..]
    }

    pub fn desc(self) -> &'static str {
        match self {
            Self::Eclipse => "Generate Eclipse CDT project",
            Self::QtCreator => "Generate QtCreator project",
            Self::VsCode => "Generate VisualStudio Code project",
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to dump the alchemy database for {abi}: {cause}")]
    DumpFailed {
        abi: Abi,
        #[source]
        cause: io::Error,
    },
    #[error("`genproject.py {kind}` failed: {cause}")]
    GenFailed {
        kind: &'static str,
        #[source]
        cause: io::Error,
    },
}

impl Reportable for Error {
    fn report(&self) -> Report {
        Report::error("Failed to generate IDE project", self)
    }
}

pub fn script_path(config: &Config) -> PathBuf {
    config
        .alchemy_home()
        .join("scripts")
        .join("genproject")
        .join("genproject.py")
}

pub fn dump_xml_path(config: &Config, abi: Abi) -> PathBuf {
    config.out_dir().join(abi.as_str()).join("alchemy-database.xml")
}

fn build_target(config: &Config, abi: Abi) -> String {
    format!("-p {} --abis {} -A", config.build_name(), abi)
}

pub fn dump_xml_args(config: &Config, abi: Abi) -> Vec<String> {
    let mut args = build_target(config, abi)
        .split(' ')
        .map(ToOwned::to_owned)
        .collect::<Vec<_>>();
    args.push("dump-xml".to_owned());
    args
}

pub fn genproject_args(config: &Config, kind: Kind, abi: Abi, extra_args: &[String]) -> Vec<String> {
    let mut args = vec![
        kind.script_arg().to_owned(),
        "-b".to_owned(),
        build_target(config, abi),
        dump_xml_path(config, abi).display().to_string(),
    ];
    args.extend(extra_args.iter().cloned());
    args
}

fn wants_help(extra_args: &[String]) -> bool {
    extra_args.iter().any(|arg| arg == "-h" || arg == "--help")
}

fn run_in(
    program: impl AsRef<Path>,
    args: &[String],
    dir: &Path,
    env: &Env,
) -> io::Result<()> {
    log::debug!(
        "running `{} {}` in {:?}",
        program.as_ref().display(),
        args.join(" "),
        dir
    );
    duct::cmd(program.as_ref(), args)
        .dir(dir)
        .vars(env.explicit_env())
        .run()
        .map(|_| ())
}

pub fn run(
    config: &Config,
    env: &Env,
    kind: Kind,
    abi: Abi,
    extra_args: &[String],
) -> Result<(), Error> {
    let script = script_path(config);
    let workspace_dir = config.workspace_dir();
    let gen_failed = |cause| Error::GenFailed {
        kind: kind.script_arg(),
        cause,
    };
    if wants_help(extra_args) {
        run_in(
            &script,
            &[kind.script_arg().to_owned(), "-h".to_owned()],
            workspace_dir,
            env,
        )
        .map_err(gen_failed)?;
        log::warn!("`-b` and the dump-xml file are passed automatically");
        return Ok(());
    }
    run_in(
        "./build.sh",
        &dump_xml_args(config, abi),
        workspace_dir,
        env,
    )
    .map_err(|cause| Error::DumpFailed { abi, cause })?;
    run_in(
        &script,
        &genproject_args(config, kind, abi, extra_args),
        workspace_dir,
        env,
    )
    .map_err(gen_failed)
}
