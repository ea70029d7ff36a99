use crate::config::Config;
use std::{fs, io, path::PathBuf};

pub fn xcconfig_path(config: &Config) -> PathBuf {
    config.out_root_dir().join("product.xcconfig")
}

/// Lets the Xcode project find alchemy's output for the current product.
pub fn write_xcconfig(config: &Config) -> io::Result<PathBuf> {
    let path = xcconfig_path(config);
    fs::create_dir_all(config.out_root_dir())?;
    fs::write(&path, format!("ALCHEMY_PRODUCT = {}\n", config.product()))?;
    log::info!("wrote {:?}", path);
    Ok(path)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Raw;

    #[test]
    fn writes_product_name() {
        let root = tempfile::tempdir().unwrap();
        let raw: Raw = toml::from_str("product = \"anafi\"\nvariant = \"ios\"\n").unwrap();
        let config = Config::from_raw(root.path().to_owned(), raw, None).unwrap();
        let path = write_xcconfig(&config).unwrap();
        assert_eq!(path, root.path().join("out/product.xcconfig"));
        assert_eq!(fs::read_to_string(path).unwrap(), "ALCHEMY_PRODUCT = anafi\n");
    }
}
