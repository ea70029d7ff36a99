use std::{
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{original:?} has no file name to link by")]
    MissingFileName { original: PathBuf },
    #[error("Failed to symlink {link:?} to {original:?}: `ln` command failed: {cause}")]
    CommandFailed {
        original: PathBuf,
        link: PathBuf,
        #[source]
        cause: io::Error,
    },
}

/// `ln -s -n -f`: replaces whatever is at `target`, including an existing
/// link to a directory.
pub fn force_symlink(source: impl AsRef<Path>, target: impl AsRef<Path>) -> Result<(), Error> {
    let (source, target) = (source.as_ref(), target.as_ref());
    log::info!("symlinking {:?} to {:?}", target, source);
    duct::cmd!("ln", "-s", "-n", "-f", source, target)
        .stdout_null()
        .run()
        .map(|_| ())
        .map_err(|cause| Error::CommandFailed {
            original: source.to_owned(),
            link: target.to_owned(),
            cause,
        })
}

/// Links `source` into `dir` under its own file name, returning the link path.
pub fn force_symlink_into(
    source: impl AsRef<Path>,
    dir: impl AsRef<Path>,
) -> Result<PathBuf, Error> {
    let source = source.as_ref();
    let file_name = source.file_name().ok_or_else(|| Error::MissingFileName {
        original: source.to_owned(),
    })?;
    let target = dir.as_ref().join(file_name);
    force_symlink(source, &target)?;
    Ok(target)
}

#[cfg(all(test, unix))]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn links_into_dir_and_replaces_stale_links() {
        let dir = tempfile::tempdir().unwrap();
        let apk = dir.path().join("app-release.apk");
        let other = dir.path().join("other.apk");
        fs::write(&apk, b"apk").unwrap();
        fs::write(&other, b"other").unwrap();
        let images = dir.path().join("images");
        fs::create_dir(&images).unwrap();

        let link = images.join("app-release.apk");
        force_symlink(&other, &link).unwrap();
        assert_eq!(force_symlink_into(&apk, &images).unwrap(), link);
        assert_eq!(fs::read_link(&link).unwrap(), apk);
        assert_eq!(fs::read(&link).unwrap(), b"apk");
    }

    #[test]
    fn refuses_paths_without_file_names() {
        assert!(matches!(
            force_symlink_into("/", "/tmp"),
            Err(Error::MissingFileName { .. })
        ));
    }
}
