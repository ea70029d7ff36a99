use std::{
    io,
    path::{Component, Path, PathBuf},
};

/// Joins `path` onto `root`, resolving `.` and `..` by hand when `root` is a
/// verbatim (`\\?\`) path, since those aren't normalized by the OS.
pub fn prefix_path(root: impl AsRef<Path>, path: impl AsRef<Path>) -> PathBuf {
    let root = root.as_ref();
    let path = path.as_ref();
    let is_verbatim = if let Some(Component::Prefix(prefix)) = root.components().next() {
        prefix.kind().is_verbatim()
    } else {
        false
    };
    if !is_verbatim {
        return root.join(path);
    }
    let mut buf = root.components().collect::<Vec<_>>();
    for component in path.components() {
        match component {
            Component::RootDir => {
                buf.truncate(1);
                buf.push(component);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if buf.last().is_some() {
                    buf.pop();
                }
            }
            _ => buf.push(component),
        };
    }
    buf.into_iter().collect()
}

/// `rm -rf` that doesn't complain about a missing directory.
pub fn remove_dir_if_exists(path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    if path.exists() {
        log::info!("removing {:?}", path);
        std::fs::remove_dir_all(path)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest(root, path, result,
        // UNIX
        #[cfg(any(target_os = "linux", target_os = "macos"))]
        case(
            "/home/user/drone-app/out/anafi-android",
            "arm64-v8a/staging/etc/build.prop",
            "/home/user/drone-app/out/anafi-android/arm64-v8a/staging/etc/build.prop"
        ),
        // UNIX but the second path contains root
        #[cfg(any(target_os = "linux", target_os = "macos"))]
        case(
            "/home/user/drone-app/out/anafi-android",
            "/opt/android/ndk/ndk-build",
            "/opt/android/ndk/ndk-build"
        ),
        // Windows UNC
        #[cfg(windows)]
        case(
            "\\\\?\\C:\\Users\\user\\drone-app\\out\\anafi-android",
            "arm64-v8a\\..\\arm64-v8a\\staging\\.\\etc\\build.prop",
            "\\\\?\\C:\\Users\\user\\drone-app\\out\\anafi-android\\arm64-v8a\\staging\\etc\\build.prop"
        )
    )]
    fn test_prefix_path(root: impl AsRef<Path>, path: impl AsRef<Path>, result: &str) {
        assert_eq!(prefix_path(root, path), PathBuf::from(result));
    }

    #[test]
    fn removing_a_missing_dir_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("images");
        remove_dir_if_exists(&images).unwrap();
        std::fs::create_dir_all(images.join("nested")).unwrap();
        remove_dir_if_exists(&images).unwrap();
        assert!(!images.exists());
    }
}
