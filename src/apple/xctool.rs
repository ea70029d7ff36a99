use super::{config::XctoolTask, Sdk};
use crate::{
    env::{Env, ExplicitEnv as _},
    util::cli::{Report, Reportable},
    DuctExpressionExt as _,
};
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("`xctool {action}` of scheme {scheme:?} failed: {cause}")]
pub struct Error {
    action: String,
    scheme: String,
    #[source]
    cause: io::Error,
}

impl Reportable for Error {
    fn report(&self) -> Report {
        Report::error("xctool failed", self)
    }
}

pub fn args(variant: &str, task: &XctoolTask) -> Vec<String> {
    let mut args = Sdk::for_variant(variant).args("--");
    args.push("--workspace".to_owned());
    args.push(task.workspace.display().to_string());
    args.push("--configuration".to_owned());
    args.push(task.configuration.clone());
    args.push("--scheme".to_owned());
    args.push(task.scheme.clone());
    args.push("--reporter".to_owned());
    args.push("pretty".to_owned());
    if let Some(reporter) = &task.reporter {
        args.push("--reporter".to_owned());
        args.push(reporter.clone());
    }
    args.push(task.action.clone());
    args.extend(task.extra_args.iter().cloned());
    args
}

pub fn run(variant: &str, env: &Env, task: &XctoolTask) -> Result<(), Error> {
    let args = args(variant, task);
    log::debug!("running `xctool {}` in {:?}", args.join(" "), task.calldir);
    duct::cmd("xctool", &args)
        .dir(&task.calldir)
        .vars(env.explicit_env())
        .run()
        .map(|_| ())
        .map_err(|cause| Error {
            action: task.action.clone(),
            scheme: task.scheme.clone(),
            cause,
        })
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn extra_reporter_follows_pretty() {
        let task = XctoolTask {
            name: "test".to_owned(),
            desc: String::new(),
            calldir: PathBuf::from("/work"),
            workspace: PathBuf::from("FreeFlight.xcworkspace"),
            configuration: "Debug".to_owned(),
            scheme: "FreeFlightTests".to_owned(),
            action: "test".to_owned(),
            reporter: Some("junit:out/tests.xml".to_owned()),
            extra_args: vec!["-freshSimulator".to_owned()],
            subtasks: Vec::new(),
        };
        assert_eq!(
            args("ios_sim", &task),
            vec![
                "--sdk",
                "iphonesimulator",
                "--arch",
                "x86_64",
                "--workspace",
                "FreeFlight.xcworkspace",
                "--configuration",
                "Debug",
                "--scheme",
                "FreeFlightTests",
                "--reporter",
                "pretty",
                "--reporter",
                "junit:out/tests.xml",
                "test",
                "-freshSimulator",
            ]
        );
    }
}
