//! Bundles the address sanitizer runtime next to the app's native libs, plus
//! the `wrap.sh` that preloads it.

use super::abi::Abi;
use crate::util::{
    self,
    cli::{Report, Reportable},
};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to create directory {path:?}: {cause}")]
    DirCreationFailed { path: PathBuf, cause: io::Error },
    #[error("Failed to list clang versions in {path:?}: {cause}")]
    ClangDirUnreadable { path: PathBuf, cause: io::Error },
    #[error("Failed to copy {src:?} to {dest:?}: {cause}")]
    CopyFailed {
        src: PathBuf,
        dest: PathBuf,
        cause: io::Error,
    },
    #[error("Failed to write {path:?}: {cause}")]
    WriteFailed { path: PathBuf, cause: io::Error },
    #[error("Failed to remove {path:?}: {cause}")]
    RemoveFailed { path: PathBuf, cause: io::Error },
}

impl Reportable for Error {
    fn report(&self) -> Report {
        Report::error("Failed to set up address sanitizer runtime", self)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Setup {
    Installed,
    /// The ABI's toolchain isn't in the out dir yet.
    Skipped,
}

pub fn lib_dir(out_dir: &Path, abi: Abi) -> PathBuf {
    out_dir.join("asan").join("libs").join(abi.as_str())
}

pub fn script_dir(out_dir: &Path, abi: Abi) -> PathBuf {
    out_dir
        .join("asan")
        .join("scripts")
        .join("lib")
        .join(abi.as_str())
}

pub fn runtime_file_name(abi: Abi) -> String {
    format!("libclang_rt.asan-{}-android.so", abi.clang_rt_arch())
}

pub fn wrapper_script(abi: Abi) -> String {
    format!(
        r#"#!/system/bin/sh
HERE="$(cd "$(dirname "$0")" && pwd)"
export ASAN_OPTIONS=log_to_syslog=false,allow_user_segv_handler=1
export LD_PRELOAD=$HERE/{}
$@"#,
        runtime_file_name(abi)
    )
}

fn create_dir(path: &Path) -> Result<(), Error> {
    fs::create_dir_all(path).map_err(|cause| Error::DirCreationFailed {
        path: path.to_owned(),
        cause,
    })
}

/// The first clang version dir found, in name order.
fn clang_version_dir(clang_dir: &Path) -> Result<Option<PathBuf>, Error> {
    let unreadable = |cause| Error::ClangDirUnreadable {
        path: clang_dir.to_owned(),
        cause,
    };
    let mut versions = fs::read_dir(clang_dir)
        .map_err(unreadable)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(unreadable)?;
    versions.sort();
    Ok(versions.into_iter().next())
}

pub fn setup(out_dir: &Path, abi: Abi) -> Result<Setup, Error> {
    let lib_dir = lib_dir(out_dir, abi);
    let script_dir = script_dir(out_dir, abi);
    create_dir(&lib_dir)?;
    create_dir(&script_dir)?;

    let clang_dir = out_dir
        .join(abi.as_str())
        .join("toolchain")
        .join("lib64")
        .join("clang");
    if !clang_dir.is_dir() {
        log::info!(
            "no clang dir at {:?}; skipping address sanitizer wrapper for {}",
            clang_dir,
            abi
        );
        return Ok(Setup::Skipped);
    }
    let version_dir = match clang_version_dir(&clang_dir)? {
        Some(version_dir) => version_dir,
        None => {
            log::info!(
                "no clang version in {:?}; skipping address sanitizer wrapper for {}",
                clang_dir,
                abi
            );
            return Ok(Setup::Skipped);
        }
    };

    let file_name = runtime_file_name(abi);
    let src = version_dir.join("lib").join("linux").join(&file_name);
    let dest = lib_dir.join(&file_name);
    fs::copy(&src, &dest).map_err(|cause| Error::CopyFailed {
        src: src.clone(),
        dest: dest.clone(),
        cause,
    })?;

    let wrapper = script_dir.join("wrap.sh");
    fs::write(&wrapper, wrapper_script(abi)).map_err(|cause| Error::WriteFailed {
        path: wrapper.clone(),
        cause,
    })?;
    log::info!("installed address sanitizer runtime {:?} and {:?}", dest, wrapper);
    Ok(Setup::Installed)
}

pub fn clean(out_dir: &Path, abi: Abi) -> Result<(), Error> {
    for dir in [lib_dir(out_dir, abi), script_dir(out_dir, abi)] {
        util::remove_dir_if_exists(&dir)
            .map_err(|cause| Error::RemoveFailed { path: dir, cause })?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn fake_toolchain(out_dir: &Path, abi: Abi, versions: &[&str]) {
        let clang_dir = out_dir
            .join(abi.as_str())
            .join("toolchain/lib64/clang");
        fs::create_dir_all(&clang_dir).unwrap();
        for version in versions {
            let lib_dir = clang_dir.join(version).join("lib/linux");
            fs::create_dir_all(&lib_dir).unwrap();
            fs::write(lib_dir.join(runtime_file_name(abi)), *version).unwrap();
        }
    }

    #[test]
    fn installs_runtime_and_wrapper() {
        let out = tempfile::tempdir().unwrap();
        fake_toolchain(out.path(), Abi::Arm64V8a, &["9.0.8", "8.0.2"]);

        assert_eq!(setup(out.path(), Abi::Arm64V8a).unwrap(), Setup::Installed);

        let runtime = lib_dir(out.path(), Abi::Arm64V8a).join("libclang_rt.asan-aarch64-android.so");
        assert_eq!(fs::read_to_string(runtime).unwrap(), "8.0.2");
        let wrapper =
            fs::read_to_string(script_dir(out.path(), Abi::Arm64V8a).join("wrap.sh")).unwrap();
        assert!(wrapper.starts_with("#!/system/bin/sh\n"));
        assert!(wrapper.contains("export LD_PRELOAD=$HERE/libclang_rt.asan-aarch64-android.so\n"));
        assert!(wrapper.ends_with("$@"));
    }

    #[test]
    fn skips_without_toolchain() {
        let out = tempfile::tempdir().unwrap();
        assert_eq!(setup(out.path(), Abi::X86).unwrap(), Setup::Skipped);
        fake_toolchain(out.path(), Abi::X86, &[]);
        assert_eq!(setup(out.path(), Abi::X86).unwrap(), Setup::Skipped);
        assert!(!script_dir(out.path(), Abi::X86).join("wrap.sh").exists());
    }

    #[test]
    fn clean_removes_both_dirs() {
        let out = tempfile::tempdir().unwrap();
        fake_toolchain(out.path(), Abi::ArmeabiV7a, &["9.0.8"]);
        setup(out.path(), Abi::ArmeabiV7a).unwrap();
        clean(out.path(), Abi::ArmeabiV7a).unwrap();
        assert!(!lib_dir(out.path(), Abi::ArmeabiV7a).exists());
        assert!(!script_dir(out.path(), Abi::ArmeabiV7a).exists());
        clean(out.path(), Abi::ArmeabiV7a).unwrap();
    }
}
