use super::{app::App, config::Config as AppleConfig, export, xcodebuild};
use crate::{
    config::Config,
    env::Env,
    opts::NoiseLevel,
    util::{
        self, archive,
        cli::{Report, Reportable},
        ln,
    },
};
use std::{fs, io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to remove {path:?}: {cause}")]
    CleanFailed { path: PathBuf, cause: io::Error },
    #[error(transparent)]
    ArchiveFailed(#[from] xcodebuild::Error),
    #[error("Failed to create images dir {path:?}: {cause}")]
    ImagesDirCreationFailed { path: PathBuf, cause: io::Error },
    #[error("Archive {path:?} doesn't exist; run `build-archive` first")]
    ArchiveMissing { path: PathBuf },
    #[error("Failed to compress archive: {0}")]
    CompressFailed(#[from] archive::Error),
    #[error(transparent)]
    ExportFailed(#[from] export::Error),
    #[error(transparent)]
    IpaLinkFailed(#[from] ln::Error),
    #[error("Failed to copy {src:?} into the out dir: {cause}")]
    BuildPropCopyFailed { src: PathBuf, cause: io::Error },
}

impl Reportable for Error {
    fn report(&self) -> Report {
        match self {
            Self::ArchiveFailed(err) => err.report(),
            Self::ExportFailed(err) => err.report(),
            _ => Report::error("Failed to assemble release images", self),
        }
    }
}

pub fn images_dir(config: &Config) -> PathBuf {
    config.out_dir().join("images")
}

fn remove(path: PathBuf) -> Result<(), Error> {
    util::remove_dir_if_exists(&path).map_err(|cause| Error::CleanFailed { path, cause })
}

/// Archives `app` from scratch, replacing any previous archive.
pub fn archive(
    config: &Config,
    apple: &AppleConfig,
    env: &Env,
    noise_level: NoiseLevel,
    app: &App,
) -> Result<(), Error> {
    let out_dir = config.out_dir();
    remove(app.archive_path(&out_dir))?;
    let mut extra_args = vec![
        "-archivePath".to_owned(),
        app.archive_path_stem(&out_dir).display().to_string(),
    ];
    extra_args.extend(app.args().iter().cloned());
    let invocation = xcodebuild::Invocation {
        configuration: app.configuration(),
        scheme: app.scheme(),
        action: "archive",
        bundle_id: Some(app.bundle_id()),
        team_id: app.build_team_id(),
        extra_args,
    };
    xcodebuild::run(
        config,
        apple.project_dir(),
        apple.workspace(),
        env,
        noise_level,
        &invocation,
    )
    .map_err(Into::into)
}

/// Clears previous images and exports.
pub fn clean(config: &Config) -> Result<(), Error> {
    remove(images_dir(config))?;
    remove(config.out_dir().join("xcodeApps"))
}

/// Compresses each app's archive into `images`, exports and links in-house
/// ipas, and copies `build.prop` next to them.
pub fn images(config: &Config, apple: &AppleConfig, env: &Env) -> Result<(), Error> {
    let out_dir = config.out_dir();
    let images_dir = images_dir(config);
    fs::create_dir_all(&images_dir).map_err(|cause| Error::ImagesDirCreationFailed {
        path: images_dir.clone(),
        cause,
    })?;

    for app in apple.apps() {
        let archive_path = app.archive_path(&out_dir);
        if !archive_path.is_dir() {
            return Err(Error::ArchiveMissing { path: archive_path });
        }
        let file_name = format!("{}.xcarchive.tar.gz", app.name());
        archive::tar_gz_dir(&archive_path, images_dir.join(file_name))?;

        if let Some(ipa) = export::export(config, apple.project_dir(), env, app)? {
            ln::force_symlink(&ipa, images_dir.join(app.ipa_name()))?;
        }
    }

    let build_prop = out_dir.join("staging").join("etc").join("build.prop");
    fs::copy(&build_prop, out_dir.join("build.prop")).map_err(|cause| {
        Error::BuildPropCopyFailed {
            src: build_prop.clone(),
            cause,
        }
    })?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Raw;
    use std::path::Path;

    fn config_in(root: &Path) -> Config {
        let raw: Raw = toml::from_str(
            r#"
            product = "anafi"
            variant = "ios"

            [apple]
            workspace = "FreeFlight.xcworkspace"

            [[apple.apps]]
            scheme = "FreeFlight"
            configuration = "Release"
            bundle-id = "com.parrot.freeflight"
            "#,
        )
        .unwrap();
        Config::from_raw(root.to_owned(), raw, None).unwrap()
    }

    #[test]
    fn compresses_archives_and_copies_build_prop() {
        let root = tempfile::tempdir().unwrap();
        let config = config_in(root.path());
        let apple = config.apple().unwrap();
        let out_dir = config.out_dir();
        let archive = apple.apps()[0].archive_path(&out_dir);
        fs::create_dir_all(archive.join("Products")).unwrap();
        fs::write(archive.join("Info.plist"), b"<plist/>").unwrap();
        fs::create_dir_all(out_dir.join("staging/etc")).unwrap();
        fs::write(out_dir.join("staging/etc/build.prop"), b"ro.version=1").unwrap();
        fs::create_dir_all(out_dir.join("xcodeApps/temp")).unwrap();

        clean(&config).unwrap();
        assert!(!out_dir.join("xcodeApps").exists());
        images(&config, apple, &Env::bare()).unwrap();

        assert!(images_dir(&config)
            .join("FreeFlight-Release.xcarchive.tar.gz")
            .is_file());
        assert_eq!(fs::read(out_dir.join("build.prop")).unwrap(), b"ro.version=1");
    }

    #[test]
    fn missing_archive_fails() {
        let root = tempfile::tempdir().unwrap();
        let config = config_in(root.path());
        assert!(matches!(
            images(&config, config.apple().unwrap(), &Env::bare()),
            Err(Error::ArchiveMissing { .. })
        ));
    }
}
