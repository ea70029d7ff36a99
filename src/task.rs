//! The tasks each platform asks dragon to register.
//!
//! Nothing here runs anything: these are descriptions that `tasks` prints so a
//! product's build scripts can be checked against what the glue expects.

use std::fmt::{self, Display};

pub static IMAGES_TASK: &str = "images-all";
pub static RELEASE_ARCHIVE_TASK: &str = "gen-release-archive";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Kind {
    /// Runs alchemy for the product, optionally in an out subdir.
    Alchemy {
        default_args: Vec<&'static str>,
        out_subdir: Option<String>,
    },
    /// Only orders its subtasks, plus whatever hook the glue attaches.
    Meta,
    /// Replaces a task dragon already knows about.
    Override,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Task {
    pub name: String,
    pub desc: String,
    pub kind: Kind,
    pub subtasks: Vec<String>,
    /// Weak tasks are skipped when a stronger task with the same name exists.
    pub weak: bool,
}

impl Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.weak {
            write!(f, " (weak)")?;
        }
        if !self.desc.is_empty() {
            write!(f, ": {}", self.desc)?;
        }
        if !self.subtasks.is_empty() {
            write!(f, " [{}]", self.subtasks.join(", "))?;
        }
        Ok(())
    }
}

impl Task {
    pub fn meta(name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            desc: desc.into(),
            kind: Kind::Meta,
            subtasks: Vec::new(),
            weak: false,
        }
    }

    pub fn alchemy(
        name: impl Into<String>,
        desc: impl Into<String>,
        default_args: &[&'static str],
        out_subdir: Option<String>,
    ) -> Self {
        Self {
            kind: Kind::Alchemy {
                default_args: default_args.to_vec(),
                out_subdir,
            },
            ..Self::meta(name, desc)
        }
    }

    pub fn overriding(name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            kind: Kind::Override,
            ..Self::meta(name, desc)
        }
    }

    pub fn with_subtasks(mut self, subtasks: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.subtasks = subtasks.into_iter().map(Into::into).collect();
        self
    }

    pub fn weak(mut self) -> Self {
        self.weak = true;
        self
    }
}

/// `[leading..., images-all, extra..., gen-release-archive]`
pub fn release_subtasks(
    leading: impl IntoIterator<Item = String>,
    extra: &[String],
) -> Vec<String> {
    leading
        .into_iter()
        .chain(std::iter::once(IMAGES_TASK.to_owned()))
        .chain(extra.iter().cloned())
        .chain(std::iter::once(RELEASE_ARCHIVE_TASK.to_owned()))
        .collect()
}

pub fn release(subtasks: Vec<String>) -> Task {
    Task::overriding("release", "").with_subtasks(subtasks)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn release_order() {
        assert_eq!(
            release_subtasks(vec!["build".to_owned()], &["docs".to_owned()]),
            vec!["build", "images-all", "docs", "gen-release-archive"]
        );
        assert_eq!(
            release_subtasks(Vec::new(), &[]),
            vec!["images-all", "gen-release-archive"]
        );
    }

    #[test]
    fn display() {
        let task = Task::meta("build-common", "Build common code")
            .with_subtasks(vec!["build-common-x86"])
            .weak();
        assert_eq!(
            task.to_string(),
            "build-common (weak): Build common code [build-common-x86]"
        );
    }
}
