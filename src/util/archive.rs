use flate2::{write::GzEncoder, Compression};
use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to walk {path:?}: {cause}")]
    WalkFailed { path: PathBuf, cause: walkdir::Error },
    #[error("Failed to create archive {path:?}: {cause}")]
    CreateFailed { path: PathBuf, cause: io::Error },
    #[error("Failed to add {path:?} to archive: {cause}")]
    AppendFailed { path: PathBuf, cause: io::Error },
    #[error("Failed to finish archive {path:?}: {cause}")]
    FinishFailed { path: PathBuf, cause: io::Error },
}

/// Every file under `root` accepted by `filter`, relative to `root`, in a
/// stable order.
pub fn files_matching(
    root: impl AsRef<Path>,
    filter: impl Fn(&Path) -> bool,
) -> Result<Vec<PathBuf>, Error> {
    let root = root.as_ref();
    let mut found = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|cause| Error::WalkFailed {
            path: root.to_owned(),
            cause,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            if filter(relative) {
                found.push(relative.to_owned());
            }
        }
    }
    Ok(found)
}

/// Writes an uncompressed tar of the files under `root` accepted by
/// `filter`, returning how many went in.
pub fn tar_matching(
    root: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    filter: impl Fn(&Path) -> bool,
) -> Result<usize, Error> {
    let (root, dest) = (root.as_ref(), dest.as_ref());
    let files = files_matching(root, filter)?;
    let file = File::create(dest).map_err(|cause| Error::CreateFailed {
        path: dest.to_owned(),
        cause,
    })?;
    let mut builder = tar::Builder::new(file);
    for relative in &files {
        log::debug!("archiving {:?}", relative);
        builder
            .append_path_with_name(root.join(relative), relative)
            .map_err(|cause| Error::AppendFailed {
                path: root.join(relative),
                cause,
            })?;
    }
    builder.finish().map_err(|cause| Error::FinishFailed {
        path: dest.to_owned(),
        cause,
    })?;
    log::info!("archived {} files from {:?} into {:?}", files.len(), root, dest);
    Ok(files.len())
}

/// Gzipped tar of `dir`, stored under its own name (`<name>/...`).
pub fn tar_gz_dir(dir: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<(), Error> {
    let (dir, dest) = (dir.as_ref(), dest.as_ref());
    let name = dir.file_name().ok_or_else(|| Error::AppendFailed {
        path: dir.to_owned(),
        cause: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
    })?;
    let file = File::create(dest).map_err(|cause| Error::CreateFailed {
        path: dest.to_owned(),
        cause,
    })?;
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    builder
        .append_dir_all(name, dir)
        .map_err(|cause| Error::AppendFailed {
            path: dir.to_owned(),
            cause,
        })?;
    builder
        .into_inner()
        .and_then(GzEncoder::finish)
        .map_err(|cause| Error::FinishFailed {
            path: dest.to_owned(),
            cause,
        })?;
    log::info!("compressed {:?} into {:?}", dir, dest);
    Ok(())
}
