use super::{config::XcodebuildTask, Sdk};
use crate::{
    config::Config,
    env::{Env, ExplicitEnv as _},
    opts::NoiseLevel,
    util::cli::{Report, Reportable},
    DuctExpressionExt as _,
};
use std::{io, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("`xcodebuild {action}` of scheme {scheme:?} failed: {cause}")]
    RunFailed {
        action: String,
        scheme: String,
        #[source]
        cause: io::Error,
    },
}

impl Reportable for Error {
    fn report(&self) -> Report {
        Report::error("Xcode build failed", self)
    }
}

/// One xcodebuild run: a configured task, or an app being archived.
#[derive(Clone, Debug)]
pub struct Invocation<'a> {
    pub configuration: &'a str,
    pub scheme: &'a str,
    pub action: &'a str,
    pub bundle_id: Option<&'a str>,
    pub team_id: Option<&'a str>,
    pub extra_args: Vec<String>,
}

impl<'a> From<&'a XcodebuildTask> for Invocation<'a> {
    fn from(task: &'a XcodebuildTask) -> Self {
        Self {
            configuration: &task.configuration,
            scheme: &task.scheme,
            action: &task.action,
            bundle_id: task.bundle_id.as_deref(),
            team_id: task.team_id.as_deref(),
            extra_args: task.extra_args.clone(),
        }
    }
}

fn is_workspace(workspace: &Path) -> bool {
    workspace.to_string_lossy().ends_with("xcworkspace")
}

pub fn args(
    config: &Config,
    workspace: &Path,
    env: &Env,
    invocation: &Invocation<'_>,
) -> Vec<String> {
    let version = config.version();
    let mut args = Sdk::for_variant(config.variant()).args("-");
    args.push(
        if is_workspace(workspace) {
            "-workspace"
        } else {
            "-project"
        }
        .to_owned(),
    );
    args.push(workspace.display().to_string());
    args.extend(
        vec![
            "-configuration",
            invocation.configuration,
            "-scheme",
            invocation.scheme,
            "-allowProvisioningUpdates",
        ]
        .into_iter()
        .map(ToOwned::to_owned),
    );
    if env.move_appsdata() {
        args.push("-derivedDataPath".to_owned());
        args.push(config.out_dir().join("xcodeDerivedData").display().to_string());
    }
    if env.sanitizer().address() {
        args.push("-enableAddressSanitizer".to_owned());
        args.push("YES".to_owned());
    }
    args.push(invocation.action.to_owned());
    args.push(format!("ALCHEMY_OUT={}", config.out_dir().display()));
    args.push(format!("ALCHEMY_OUT_ROOT={}", config.out_root_dir().display()));
    args.push(format!("ALCHEMY_PRODUCT={}", config.product()));
    if let Some(bundle_id) = invocation.bundle_id {
        args.push(format!("APP_BUNDLE_IDENTIFIER={}", bundle_id));
    }
    if let Some(team_id) = invocation.team_id {
        args.push(format!("DEVELOPMENT_TEAM={}", team_id));
    }
    args.push(format!("APP_VERSION_SHORT={}", version.short()));
    args.push(format!("APP_VERSION={}", version));
    args.push(format!("APP_BUILD={}", version.code().apple_build_number()));
    args.extend(invocation.extra_args.iter().cloned());
    args
}

/// Only `build`'s exit status counts.
fn prettify(build: duct::Expression, formatter: duct::Expression) -> duct::Expression {
    build.pipe(formatter.unchecked())
}

/// Runs xcodebuild in `dir`. Unless we're being verbose, output goes through
/// `xcpretty` when it's installed; xcodebuild's own status still decides
/// success.
pub fn run(
    config: &Config,
    dir: &Path,
    workspace: &Path,
    env: &Env,
    noise_level: NoiseLevel,
    invocation: &Invocation<'_>,
) -> Result<(), Error> {
    let args = args(config, workspace, env, invocation);
    log::debug!("running `xcodebuild {}` in {:?}", args.join(" "), dir);
    let xcodebuild = duct::cmd("xcodebuild", &args)
        .dir(dir)
        .vars(env.explicit_env());
    let pretty = !noise_level.verbose() && which::which("xcpretty").is_ok();
    let output = if pretty {
        prettify(xcodebuild, duct::cmd!("xcpretty")).run()
    } else {
        xcodebuild.run()
    };
    output.map(|_| ()).map_err(|cause| Error::RunFailed {
        action: invocation.action.to_owned(),
        scheme: invocation.scheme.to_owned(),
        cause,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{config::test::config, opts::Sanitizer};

    fn invocation() -> Invocation<'static> {
        Invocation {
            configuration: "Release",
            scheme: "FreeFlight",
            action: "archive",
            bundle_id: Some("com.parrot.freeflight"),
            team_id: None,
            extra_args: vec!["-archivePath".to_owned(), "/tmp/ff".to_owned()],
        }
    }

    #[test]
    fn device_build_with_workspace() {
        let config = config(
            "product = \"anafi\"\nvariant = \"ios\"\nversion = \"1.2.3-rc1\"\n",
        );
        assert_eq!(
            args(
                &config,
                Path::new("FreeFlight.xcworkspace"),
                &Env::bare(),
                &invocation()
            ),
            vec![
                "-sdk",
                "iphoneos",
                "-workspace",
                "FreeFlight.xcworkspace",
                "-configuration",
                "Release",
                "-scheme",
                "FreeFlight",
                "-allowProvisioningUpdates",
                "archive",
                "ALCHEMY_OUT=/work/out/anafi-ios",
                "ALCHEMY_OUT_ROOT=/work/out",
                "ALCHEMY_PRODUCT=anafi",
                "APP_BUNDLE_IDENTIFIER=com.parrot.freeflight",
                "APP_VERSION_SHORT=1.2.3",
                "APP_VERSION=1.2.3-rc1",
                "APP_BUILD=010203.2.01",
                "-archivePath",
                "/tmp/ff",
            ]
        );
    }

    #[test]
    fn simulator_build_with_project_and_options() {
        let config = config("product = \"anafi\"\nvariant = \"ios_sim\"\n");
        let env = Env::bare()
            .with_move_appsdata(true)
            .with_sanitizer(Sanitizer::Address);
        let mut invocation = invocation();
        invocation.team_id = Some("ABCDE12345");
        let args = args(&config, Path::new("FreeFlight.xcodeproj"), &env, &invocation);
        assert_eq!(&args[..6], &["-sdk", "iphonesimulator", "-arch", "x86_64", "-project", "FreeFlight.xcodeproj"]);
        let derived = args.iter().position(|arg| arg == "-derivedDataPath").unwrap();
        assert_eq!(args[derived + 1], "/work/out/anafi-ios_sim/xcodeDerivedData");
        let asan = args.iter().position(|arg| arg == "-enableAddressSanitizer").unwrap();
        assert_eq!(args[asan + 1], "YES");
        assert!(args.contains(&"DEVELOPMENT_TEAM=ABCDE12345".to_owned()));
        assert!(args.contains(&"APP_BUILD=0".to_owned()));
    }

    #[cfg(unix)]
    #[test]
    fn formatter_status_is_ignored() {
        let failing_formatter = || duct::cmd!("sh", "-c", "cat > /dev/null; exit 1");
        assert!(prettify(duct::cmd!("sh", "-c", "echo built"), failing_formatter())
            .stdout_null()
            .run()
            .is_ok());
        assert!(prettify(duct::cmd!("sh", "-c", "exit 65"), failing_formatter())
            .stdout_null()
            .run()
            .is_err());
    }
}
