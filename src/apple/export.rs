use super::app::{App, Inhouse};
use crate::{
    config::Config,
    env::{Env, ExplicitEnv as _},
    util::cli::{Report, Reportable},
    DuctExpressionExt as _,
};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to write export options to {path:?}: {cause}")]
    PlistWriteFailed { path: PathBuf, cause: io::Error },
    #[error("`xcodebuild -exportArchive` failed for {archive:?}: {cause}")]
    ExportFailed { archive: PathBuf, cause: io::Error },
    #[error("Failed to create {path:?}: {cause}")]
    DirCreationFailed { path: PathBuf, cause: io::Error },
    #[error("Failed to move exported ipa {src:?} to {dest:?}: {cause}")]
    MoveFailed {
        src: PathBuf,
        dest: PathBuf,
        cause: io::Error,
    },
}

impl Reportable for Error {
    fn report(&self) -> Report {
        Report::error("Failed to export in-house ipa", self)
    }
}

pub fn plist_path(config: &Config) -> PathBuf {
    config.out_dir().join("export.plist")
}

pub fn temp_dir(config: &Config) -> PathBuf {
    config.out_dir().join("xcodeApps").join("temp")
}

pub fn inhouse_dir(config: &Config) -> PathBuf {
    config.out_dir().join("xcodeApps").join("inhouse")
}

pub fn plist(inhouse: &Inhouse, bundle_id: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>method</key>
    <string>enterprise</string>
    <key>teamID</key>
    <string>{}</string>
    <key>provisioningProfiles</key>
    <dict>
        <key>{}</key>
        <string>{}</string>
    </dict>
    <key>compileBitcode</key>
    <true/>
</dict>
</plist>
"#,
        inhouse.team_id, bundle_id, inhouse.profile
    )
}

pub fn export_args(archive_path: &Path, plist_path: &Path, export_path: &Path) -> Vec<String> {
    vec![
        "-exportArchive".to_owned(),
        "-archivePath".to_owned(),
        archive_path.display().to_string(),
        "-exportOptionsPlist".to_owned(),
        plist_path.display().to_string(),
        "-allowProvisioningUpdates".to_owned(),
        "-exportPath".to_owned(),
        export_path.display().to_string(),
    ]
}

/// Exports `app`'s archive as an in-house ipa, returning where it ended up.
/// Apps without in-house signing export nothing.
pub fn export(config: &Config, dir: &Path, env: &Env, app: &App) -> Result<Option<PathBuf>, Error> {
    let inhouse = match app.inhouse() {
        Some(inhouse) => inhouse,
        None => {
            log::info!("{} has no in-house signing; not exporting an ipa", app.name());
            return Ok(None);
        }
    };

    let plist_path = plist_path(config);
    fs::write(&plist_path, plist(inhouse, app.bundle_id())).map_err(|cause| {
        Error::PlistWriteFailed {
            path: plist_path.clone(),
            cause,
        }
    })?;

    let archive = app.archive_path(&config.out_dir());
    let temp_dir = temp_dir(config);
    let args = export_args(&archive, &plist_path, &temp_dir);
    log::debug!("running `xcodebuild {}` in {:?}", args.join(" "), dir);
    duct::cmd("xcodebuild", &args)
        .dir(dir)
        .vars(env.explicit_env())
        .run()
        .map_err(|cause| Error::ExportFailed {
            archive: archive.clone(),
            cause,
        })?;

    let inhouse_dir = inhouse_dir(config);
    fs::create_dir_all(&inhouse_dir).map_err(|cause| Error::DirCreationFailed {
        path: inhouse_dir.clone(),
        cause,
    })?;
    let src = temp_dir.join(format!("{}.ipa", app.scheme()));
    let dest = inhouse_dir.join(app.ipa_name());
    fs::rename(&src, &dest).map_err(|cause| Error::MoveFailed {
        src: src.clone(),
        dest: dest.clone(),
        cause,
    })?;
    log::info!("exported {:?}", dest);
    Ok(Some(dest))
}
