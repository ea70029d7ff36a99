use super::abi::Abi;
use crate::{
    config::Config,
    util::{
        self, archive,
        cli::{Report, Reportable},
        ln,
    },
};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to clear {path:?}: {cause}")]
    CleanFailed { path: PathBuf, cause: io::Error },
    #[error("Failed to archive symbols: {0}")]
    SymbolsArchiveFailed(#[from] archive::Error),
    #[error("Failed to create images dir {path:?}: {cause}")]
    ImagesDirCreationFailed { path: PathBuf, cause: io::Error },
    #[error("APK {path:?} doesn't exist; did the build task run?")]
    ApkMissing { path: PathBuf },
    #[error(transparent)]
    ApkLinkFailed(#[from] ln::Error),
    #[error("Failed to copy {src:?} into the out dir: {cause}")]
    CopyFailed { src: PathBuf, cause: io::Error },
}

impl Reportable for Error {
    fn report(&self) -> Report {
        Report::error("Failed to assemble release images", self)
    }
}

pub fn images_dir(config: &Config) -> PathBuf {
    config.out_dir().join("images")
}

pub fn symbols_archive_path(config: &Config) -> PathBuf {
    config
        .out_dir()
        .join(format!("symbols-{}-{}.tar", config.product(), config.variant()))
}

/// Where the unstripped libs are; alchemy puts them under the ABI's out subdir
/// unless the release config says otherwise.
pub fn symbols_dir(config: &Config, default_abi: Abi) -> PathBuf {
    config
        .android()
        .release()
        .symbols_dir
        .clone()
        .unwrap_or_else(|| config.out_dir().join(default_abi.as_str()).join("symbols"))
}

fn is_shared_lib(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "so")
}

fn copy_into(src: PathBuf, dir: &Path) -> Result<(), Error> {
    let dest = match src.file_name().map(|file_name| dir.join(file_name)) {
        Some(dest) => dest,
        None => {
            return Err(Error::CopyFailed {
                src,
                cause: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
            })
        }
    };
    log::info!("copying {:?} to {:?}", src, dest);
    fs::copy(&src, &dest)
        .map(|_| ())
        .map_err(|cause| Error::CopyFailed { src, cause })
}

/// Removes the previous images so nothing stale ends up in a release.
pub fn clean(config: &Config) -> Result<(), Error> {
    let images_dir = images_dir(config);
    util::remove_dir_if_exists(&images_dir).map_err(|cause| Error::CleanFailed {
        path: images_dir,
        cause,
    })
}

pub fn images(config: &Config, default_abi: Abi) -> Result<(), Error> {
    clean(config)?;
    let out_dir = config.out_dir();

    archive::tar_matching(
        symbols_dir(config, default_abi),
        symbols_archive_path(config),
        is_shared_lib,
    )?;

    let images_dir = images_dir(config);
    fs::create_dir_all(&images_dir).map_err(|cause| Error::ImagesDirCreationFailed {
        path: images_dir.clone(),
        cause,
    })?;
    for apk in &config.android().release().apks {
        if !apk.is_file() {
            return Err(Error::ApkMissing { path: apk.clone() });
        }
        ln::force_symlink_into(apk, &images_dir)?;
    }

    let abi_out_dir = out_dir.join(default_abi.as_str());
    copy_into(
        abi_out_dir.join("staging").join("etc").join("build.prop"),
        &out_dir,
    )?;
    copy_into(abi_out_dir.join("global.config"), &out_dir)?;
    Ok(())
}
