pub mod app;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod export;
pub mod jazzy;
pub mod product;
pub mod release;
pub mod tasks;
pub mod xcodebuild;
pub mod xctool;

pub static NAME: &str = "apple";

static SIMULATOR_VARIANT: &str = "ios_sim";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Sdk {
    Simulator,
    Device,
}

impl Sdk {
    pub fn for_variant(variant: &str) -> Self {
        if variant == SIMULATOR_VARIANT {
            Self::Simulator
        } else {
            Self::Device
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Simulator => "iphonesimulator",
            Self::Device => "iphoneos",
        }
    }

    pub fn arch(self) -> Option<&'static str> {
        match self {
            Self::Simulator => Some("x86_64"),
            Self::Device => None,
        }
    }

    /// `prefix` is `-` for xcodebuild and `--` for xctool.
    pub fn args(self, prefix: &str) -> Vec<String> {
        let mut args = vec![format!("{}sdk", prefix), self.as_str().to_owned()];
        if let Some(arch) = self.arch() {
            args.push(format!("{}arch", prefix));
            args.push(arch.to_owned());
        }
        args
    }
}
