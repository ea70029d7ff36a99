pub mod abi;
pub mod asan;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod genproject;
pub mod gradle;
pub mod ndk;
pub mod ndk_build;
pub mod release;
pub mod source_props;
pub mod tasks;

use self::abi::Abi;

pub static NAME: &str = "android";

/// ABIs from `--abis` replace the configured list entirely.
pub fn abis<'a>(config: &'a config::Config, overridden: &'a [Abi]) -> &'a [Abi] {
    if overridden.is_empty() {
        config.abis()
    } else {
        log::info!(
            "building {} instead of the configured ABIs",
            crate::util::list_display(overridden)
        );
        overridden
    }
}

/// With `--abis`, the first one named stands in for the default.
pub fn release_abi(config: &config::Config, overridden: &[Abi]) -> Abi {
    overridden
        .first()
        .copied()
        .unwrap_or_else(|| config.default_abi())
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::Path;

    #[test]
    fn overrides_replace_configured_abis() {
        let raw: config::Raw = toml::from_str(r#"abis = ["x86", "x86_64"]"#).unwrap();
        let config = config::Config::from_raw(Path::new("/work"), Some(raw)).unwrap();
        assert_eq!(abis(&config, &[]), &[Abi::X86, Abi::X86_64]);
        assert_eq!(abis(&config, &[Abi::Arm64V8a]), &[Abi::Arm64V8a]);
        assert_eq!(release_abi(&config, &[]), Abi::X86);
        assert_eq!(release_abi(&config, &[Abi::Arm64V8a, Abi::X86]), Abi::Arm64V8a);
    }
}
