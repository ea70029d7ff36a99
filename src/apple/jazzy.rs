use super::config::JazzyTask;
use crate::{
    config::Config,
    env::{Env, ExplicitEnv as _},
    util::cli::{Report, Reportable},
    DuctExpressionExt as _,
};
use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("`jazzy` failed for scheme {scheme:?}: {cause}")]
pub struct Error {
    scheme: String,
    #[source]
    cause: io::Error,
}

impl Reportable for Error {
    fn report(&self) -> Report {
        Report::error("Failed to generate documentation", self)
    }
}

pub fn docs_dir(config: &Config) -> PathBuf {
    config.out_dir().join("docs")
}

pub fn args(config: &Config, task: &JazzyTask) -> Vec<String> {
    let mut args = vec![
        "-x".to_owned(),
        format!("-scheme,{}", task.scheme),
        "-o".to_owned(),
        docs_dir(config).display().to_string(),
    ];
    args.extend(task.extra_args.iter().cloned());
    args
}

pub fn run(config: &Config, env: &Env, task: &JazzyTask) -> Result<(), Error> {
    let args = args(config, task);
    log::debug!("running `jazzy {}` in {:?}", args.join(" "), task.calldir);
    duct::cmd("jazzy", &args)
        .dir(&task.calldir)
        .vars(env.explicit_env())
        .run()
        .map(|_| ())
        .map_err(|cause| Error {
            scheme: task.scheme.clone(),
            cause,
        })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::test::config;

    #[test]
    fn docs_go_to_the_out_dir() {
        let config = config("product = \"anafi\"\nvariant = \"ios\"\n");
        let task = JazzyTask {
            name: "docs".to_owned(),
            desc: String::new(),
            calldir: PathBuf::from("/work"),
            scheme: "GroundSdk".to_owned(),
            extra_args: vec!["--min-acl".to_owned(), "public".to_owned()],
            subtasks: Vec::new(),
        };
        assert_eq!(
            args(&config, &task),
            vec![
                "-x",
                "-scheme,GroundSdk",
                "-o",
                "/work/out/anafi-ios/docs",
                "--min-acl",
                "public",
            ]
        );
    }
}
