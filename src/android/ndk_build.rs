use super::{abi::Abi, config::NdkBuildTask, ndk};
use crate::{
    config::Config,
    env::{Env, ExplicitEnv as _},
    opts::{NoiseLevel, OnFailure},
    util::cli::{Report, Reportable},
    DuctExpressionExt as _,
};
use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    NdkUnsupported(#[from] ndk::Error),
    #[error("`ndk-build` for module {module:?} failed in {dir:?}: {cause}")]
    RunFailed {
        module: String,
        dir: PathBuf,
        #[source]
        cause: io::Error,
    },
}

impl Reportable for Error {
    fn report(&self) -> Report {
        match self {
            Self::NdkUnsupported(err) => err.report(),
            Self::RunFailed { .. } => Report::error("NDK build failed", self),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Options<'a> {
    pub abis: &'a [Abi],
    pub noise_level: NoiseLevel,
    pub jobs: usize,
    pub on_failure: OnFailure,
}

pub fn out_dir(config: &Config, module: &str) -> PathBuf {
    config.out_dir().join("jni").join(module)
}

pub fn args(config: &Config, env: &Env, task: &NdkBuildTask, options: Options<'_>) -> Vec<String> {
    let out_dir = out_dir(config, &task.module);
    let mut args = vec![
        format!("NDK_OUT={}", out_dir.join("obj").display()),
        format!("NDK_LIBS_OUT={}", out_dir.join("libs").display()),
        format!("PRODUCT_DIR={}", config.product_dir().display()),
        format!("PRODUCT_OUT_DIR={}", config.out_dir().display()),
        // a single argv entry; `ndk-build` splits it on spaces
        format!(
            "APP_ABI={}",
            options
                .abis
                .iter()
                .map(|abi| abi.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        ),
    ];
    if env.sanitizer().address() {
        args.push("LOCAL_ALLOW_UNDEFINED_SYMBOLS=true".to_owned());
    }
    if options.noise_level.verbose() {
        args.push("V=1".to_owned());
    }
    args.push(format!("-j{}", options.jobs));
    args.extend(task.extra_args.iter().cloned());
    args
}

/// ABIs named on the command line win over the task's, which win over the
/// configured ones.
pub fn resolve_abis<'a>(
    task: &'a NdkBuildTask,
    configured: &'a [Abi],
    overridden: &'a [Abi],
) -> &'a [Abi] {
    if !overridden.is_empty() {
        overridden
    } else {
        task.abis.as_deref().unwrap_or(configured)
    }
}

pub fn run(
    config: &Config,
    env: &Env,
    ndk: &ndk::Env,
    task: &NdkBuildTask,
    options: Options<'_>,
) -> Result<(), Error> {
    let bounds = config.android().ndk_bounds();
    if !bounds.is_unbounded() {
        ndk.check(bounds, &format!("`ndk-build` of {}", task.module))?;
    }
    let args = args(config, env, task, options);
    log::debug!(
        "running `{:?} {}` in {:?}",
        ndk.ndk_build_path(),
        args.join(" "),
        task.calldir
    );
    let result = duct::cmd(ndk.ndk_build_path(), &args)
        .dir(&task.calldir)
        .vars(env.explicit_env())
        .run();
    match result {
        Ok(_) => Ok(()),
        Err(cause) if options.on_failure.ignore() => {
            log::warn!(
                "ignoring failed `ndk-build` of {:?}: {}",
                task.module,
                cause
            );
            Ok(())
        }
        Err(cause) => Err(Error::RunFailed {
            module: task.module.clone(),
            dir: task.calldir.clone(),
            cause,
        }),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{config::test::config, opts::Sanitizer};

    fn task(abis: Option<Vec<Abi>>) -> NdkBuildTask {
        NdkBuildTask {
            name: "libfoo".to_owned(),
            desc: String::new(),
            calldir: PathBuf::from("/work/libs/foo"),
            module: "foo".to_owned(),
            abis,
            extra_args: vec!["NDK_DEBUG=1".to_owned()],
            subtasks: Vec::new(),
            ignore_failure: false,
        }
    }

    fn options(abis: &[Abi], noise_level: NoiseLevel) -> Options<'_> {
        Options {
            abis,
            noise_level,
            jobs: 8,
            on_failure: OnFailure::Propagate,
        }
    }

    #[test]
    fn args_in_order() {
        let config = config("product = \"anafi\"\nvariant = \"android\"\n");
        let abis = [Abi::ArmeabiV7a, Abi::Arm64V8a];
        assert_eq!(
            args(
                &config,
                &Env::bare(),
                &task(None),
                options(&abis, NoiseLevel::Polite)
            ),
            vec![
                "NDK_OUT=/work/out/anafi-android/jni/foo/obj",
                "NDK_LIBS_OUT=/work/out/anafi-android/jni/foo/libs",
                "PRODUCT_DIR=/work/products/anafi/android",
                "PRODUCT_OUT_DIR=/work/out/anafi-android",
                "APP_ABI=armeabi-v7a arm64-v8a",
                "-j8",
                "NDK_DEBUG=1",
            ]
        );
    }

    #[test]
    fn asan_and_verbose_flags() {
        let config = config("product = \"anafi\"\nvariant = \"android\"\n");
        let env = Env::bare().with_sanitizer(Sanitizer::Address);
        let args = args(
            &config,
            &env,
            &task(None),
            options(&[Abi::X86], NoiseLevel::FranklyQuitePedantic),
        );
        let asan = args
            .iter()
            .position(|arg| arg == "LOCAL_ALLOW_UNDEFINED_SYMBOLS=true")
            .unwrap();
        let verbose = args.iter().position(|arg| arg == "V=1").unwrap();
        let jobs = args.iter().position(|arg| arg == "-j8").unwrap();
        assert!(asan < verbose && verbose < jobs);
    }

    #[test]
    fn abi_resolution() {
        let configured = [Abi::ArmeabiV7a];
        let own = task(Some(vec![Abi::X86_64]));
        assert_eq!(resolve_abis(&own, &configured, &[]), &[Abi::X86_64]);
        assert_eq!(
            resolve_abis(&own, &configured, &[Abi::Arm64V8a]),
            &[Abi::Arm64V8a]
        );
        assert_eq!(
            resolve_abis(&task(None), &configured, &[]),
            &[Abi::ArmeabiV7a]
        );
    }

    #[cfg(unix)]
    #[test]
    fn failures_can_be_ignored() {
        use std::os::unix::fs::PermissionsExt as _;

        let ndk_home = tempfile::tempdir().unwrap();
        std::fs::write(
            ndk_home.path().join("source.properties"),
            "Pkg.Revision = 16.1.4479499\n",
        )
        .unwrap();
        let ndk_build = ndk_home.path().join("ndk-build");
        std::fs::write(&ndk_build, "#!/bin/sh\nexit 2\n").unwrap();
        std::fs::set_permissions(&ndk_build, std::fs::Permissions::from_mode(0o755)).unwrap();
        let ndk = ndk::Env::from_home(ndk_home.path()).unwrap();

        let config = config("product = \"anafi\"\nvariant = \"android\"\n");
        let mut task = task(None);
        task.calldir = ndk_home.path().to_owned();
        let abis = [Abi::ArmeabiV7a];
        let mut options = options(&abis, NoiseLevel::Polite);

        assert!(matches!(
            run(&config, &Env::bare(), &ndk, &task, options),
            Err(Error::RunFailed { .. })
        ));
        options.on_failure = OnFailure::Ignore;
        assert!(run(&config, &Env::bare(), &ndk, &task, options).is_ok());
    }
}
