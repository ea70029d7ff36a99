use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Enterprise signing for an in-house ipa.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Inhouse {
    pub team_id: String,
    pub profile: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawApp {
    pub scheme: String,
    pub configuration: String,
    pub bundle_id: String,
    pub args: Option<Vec<String>>,
    pub inhouse: Option<Inhouse>,
    pub display_name: Option<String>,
    pub build_team_id: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct App {
    scheme: String,
    configuration: String,
    bundle_id: String,
    args: Vec<String>,
    inhouse: Option<Inhouse>,
    build_team_id: Option<String>,
    name: String,
    ipa_name: String,
}

impl App {
    /// `id` counts the apps without a display name configured before this
    /// one; past the first, it's appended so archives don't collide.
    pub fn from_raw(raw: RawApp, id: usize) -> Self {
        let (name, ipa_name) = match raw.display_name {
            Some(display_name) => {
                let ipa_name = format!("{}.ipa", display_name);
                (display_name, ipa_name)
            }
            None if id > 0 => (
                format!("{}-{}-{}", raw.scheme, raw.configuration, id),
                format!("{}-{}-inhouse.ipa", raw.scheme, id),
            ),
            None => (
                format!("{}-{}", raw.scheme, raw.configuration),
                format!("{}-inhouse.ipa", raw.scheme),
            ),
        };
        Self {
            scheme: raw.scheme,
            configuration: raw.configuration,
            bundle_id: raw.bundle_id,
            args: raw.args.unwrap_or_default(),
            inhouse: raw.inhouse,
            build_team_id: raw.build_team_id,
            name,
            ipa_name,
        }
    }

    /// Builds apps in config order. Only apps named after their scheme take
    /// an id.
    pub fn list_from_raw(raw: Vec<RawApp>) -> Vec<Self> {
        let mut next_id = 0;
        raw.into_iter()
            .map(|raw| {
                let id = next_id;
                if raw.display_name.is_none() {
                    next_id += 1;
                }
                Self::from_raw(raw, id)
            })
            .collect()
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn configuration(&self) -> &str {
        &self.configuration
    }

    pub fn bundle_id(&self) -> &str {
        &self.bundle_id
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn inhouse(&self) -> Option<&Inhouse> {
        self.inhouse.as_ref()
    }

    pub fn build_team_id(&self) -> Option<&str> {
        self.build_team_id.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ipa_name(&self) -> &str {
        &self.ipa_name
    }

    /// xcodebuild adds the `.xcarchive` extension itself.
    pub fn archive_path_stem(&self, out_dir: &Path) -> PathBuf {
        out_dir.join("xcodeArchives").join(&self.name)
    }

    pub fn archive_path(&self, out_dir: &Path) -> PathBuf {
        out_dir
            .join("xcodeArchives")
            .join(format!("{}.xcarchive", self.name))
    }

    pub fn task_name(&self) -> String {
        format!("build-archive-{}", self.name)
    }

    pub fn task_desc(&self) -> String {
        format!("build archive {} for release", self.name)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    fn raw(display_name: Option<&str>) -> RawApp {
        RawApp {
            scheme: "FreeFlight".to_owned(),
            configuration: "Release".to_owned(),
            bundle_id: "com.parrot.freeflight".to_owned(),
            args: None,
            inhouse: None,
            display_name: display_name.map(ToOwned::to_owned),
            build_team_id: None,
        }
    }

    #[rstest(
        display_name,
        id,
        name,
        ipa_name,
        case(None, 0, "FreeFlight-Release", "FreeFlight-inhouse.ipa"),
        case(None, 1, "FreeFlight-Release-1", "FreeFlight-1-inhouse.ipa"),
        case(Some("FreeFlight Beta"), 1, "FreeFlight Beta", "FreeFlight Beta.ipa")
    )]
    fn test_naming(display_name: Option<&str>, id: usize, name: &str, ipa_name: &str) {
        let app = App::from_raw(raw(display_name), id);
        assert_eq!(app.name(), name);
        assert_eq!(app.ipa_name(), ipa_name);
    }

    #[test]
    fn display_named_apps_take_no_id() {
        let mut raws = vec![raw(Some("Disp")), raw(None), raw(None)];
        raws[1].scheme = "B".to_owned();
        raws[2].scheme = "C".to_owned();
        let apps = App::list_from_raw(raws);
        assert_eq!(
            apps.iter().map(App::name).collect::<Vec<_>>(),
            vec!["Disp", "B-Release", "C-Release-1"]
        );
        assert_eq!(
            apps.iter().map(App::ipa_name).collect::<Vec<_>>(),
            vec!["Disp.ipa", "B-inhouse.ipa", "C-1-inhouse.ipa"]
        );
    }

    #[test]
    fn archive_paths_and_task() {
        let app = App::from_raw(raw(None), 0);
        let out = Path::new("/work/out/anafi-ios");
        assert_eq!(
            app.archive_path(out),
            Path::new("/work/out/anafi-ios/xcodeArchives/FreeFlight-Release.xcarchive")
        );
        assert_eq!(
            app.archive_path_stem(out),
            Path::new("/work/out/anafi-ios/xcodeArchives/FreeFlight-Release")
        );
        assert_eq!(app.task_name(), "build-archive-FreeFlight-Release");
    }
}
