#![deny(unsafe_code)]

pub mod android;
pub mod apple;
pub mod config;
pub mod env;
pub mod opts;
pub mod task;
pub mod util;
pub mod version_code;

use std::ffi::OsStr;

pub static NAME: &str = "dragon-mobile";

trait DuctExpressionExt {
    fn vars(self, vars: impl IntoIterator<Item = (impl AsRef<OsStr>, impl AsRef<OsStr>)>) -> Self;
}

impl DuctExpressionExt for duct::Expression {
    fn vars(
        mut self,
        vars: impl IntoIterator<Item = (impl AsRef<OsStr>, impl AsRef<OsStr>)>,
    ) -> Self {
        for (k, v) in vars {
            self = self.env(&k, &v);
        }
        self
    }
}
