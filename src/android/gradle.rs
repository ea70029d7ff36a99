use super::config::GradleTask;
use crate::{
    config::Config,
    env::{Env, ExplicitEnv as _},
    util::cli::{Report, Reportable},
    DuctExpressionExt as _,
};
use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("`gradlew` wasn't found in {dir:?}")]
    GradlewMissing { dir: PathBuf },
    #[error("`gradlew` failed in {dir:?}: {cause}")]
    RunFailed {
        dir: PathBuf,
        #[source]
        cause: io::Error,
    },
}

impl Reportable for Error {
    fn report(&self) -> Report {
        match self {
            Self::GradlewMissing { .. } => Report::action_request(
                "Make sure the task's `calldir` (or `android.project-dir`) points at your Gradle project",
                self,
            ),
            Self::RunFailed { .. } => Report::error("Gradle build failed", self),
        }
    }
}

pub fn args(config: &Config, env: &Env, task: &GradleTask) -> Vec<String> {
    let version = config.version();
    let mut args = Vec::new();
    if env.move_appsdata() {
        args.push("--project-cache-dir".to_owned());
        args.push(config.out_dir().join(".gradle").display().to_string());
    }
    args.push(format!(
        "-PalchemyOutRoot={}",
        config.out_root_dir().display()
    ));
    args.push(format!("-PalchemyOut={}", config.out_dir().display()));
    args.push(format!("-PalchemyProduct={}", config.product()));
    args.push(format!("-PappVersionName={}", version.short()));
    if let Some(suffix) = version.suffix() {
        args.push(format!("-PappVersionNameSuffix=-{}", suffix));
    }
    args.push(format!("-PappVersionCode={}", version.code()));
    args.extend(
        task.target
            .iter()
            .filter(|target| !target.is_empty())
            .cloned(),
    );
    args.extend(task.extra_args.iter().cloned());
    args
}

pub fn run(config: &Config, env: &Env, task: &GradleTask) -> Result<(), Error> {
    let dir = &task.calldir;
    let gradlew = dir.join("gradlew");
    if !gradlew.is_file() {
        return Err(Error::GradlewMissing {
            dir: dir.to_owned(),
        });
    }
    let args = args(config, env, task);
    log::debug!("running `./gradlew {}` in {:?}", args.join(" "), dir);
    duct::cmd(&gradlew, &args)
        .dir(dir)
        .vars(env.explicit_env())
        .run()
        .map(|_| ())
        .map_err(|cause| Error::RunFailed {
            dir: dir.to_owned(),
            cause,
        })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::test::config;

    fn task(target: Option<&str>) -> GradleTask {
        GradleTask {
            name: "app".to_owned(),
            desc: String::new(),
            calldir: PathBuf::from("/work"),
            target: target.map(ToOwned::to_owned),
            extra_args: vec!["--offline".to_owned()],
            subtasks: Vec::new(),
        }
    }

    #[test]
    fn release_args() {
        let config = config(
            "product = \"anafi\"\nvariant = \"android\"\nversion = \"1.2.3\"\n",
        );
        assert_eq!(
            args(&config, &Env::bare(), &task(Some("assembleRelease"))),
            vec![
                "-PalchemyOutRoot=/work/out",
                "-PalchemyOut=/work/out/anafi-android",
                "-PalchemyProduct=anafi",
                "-PappVersionName=1.2.3",
                "-PappVersionCode=0102030300",
                "assembleRelease",
                "--offline",
            ]
        );
    }

    #[test]
    fn pre_release_args_carry_suffix_and_cache_dir() {
        let config = config(
            "product = \"anafi\"\nvariant = \"android\"\nversion = \"1.2.3-beta2\"\n",
        );
        let env = Env::bare().with_move_appsdata(true);
        let args = args(&config, &env, &task(None));
        assert_eq!(
            &args[..2],
            &["--project-cache-dir", "/work/out/anafi-android/.gradle"]
        );
        assert!(args.contains(&"-PappVersionName=1.2.3".to_owned()));
        assert!(args.contains(&"-PappVersionNameSuffix=-beta2".to_owned()));
        assert!(args.contains(&"-PappVersionCode=0102030102".to_owned()));
        assert_eq!(args.last().map(String::as_str), Some("--offline"));
    }

    #[test]
    fn unversioned_code_is_zero() {
        let config = config("product = \"anafi\"\nvariant = \"android\"\n");
        let args = args(&config, &Env::bare(), &task(Some("")));
        assert!(args.contains(&"-PappVersionCode=0".to_owned()));
        assert!(!args.contains(&String::new()));
    }

    #[cfg(unix)]
    #[test]
    fn runs_in_task_calldir() {
        use std::os::unix::fs::PermissionsExt as _;

        let calldir = tempfile::tempdir().unwrap();
        let gradlew = calldir.path().join("gradlew");
        std::fs::write(&gradlew, "#!/bin/sh\npwd > ran-in\n").unwrap();
        std::fs::set_permissions(&gradlew, std::fs::Permissions::from_mode(0o755)).unwrap();

        let config = config("product = \"anafi\"\nvariant = \"android\"\n");
        let mut task = task(None);
        task.calldir = calldir.path().to_owned();
        run(&config, &Env::bare(), &task).unwrap();
        let ran_in = std::fs::read_to_string(calldir.path().join("ran-in")).unwrap();
        assert_eq!(
            std::fs::canonicalize(ran_in.trim()).unwrap(),
            std::fs::canonicalize(calldir.path()).unwrap()
        );

        task.calldir = calldir.path().join("missing");
        assert!(matches!(
            run(&config, &Env::bare(), &task),
            Err(Error::GradlewMissing { .. })
        ));
    }
}
