#![cfg(feature = "cli")]
#![forbid(unsafe_code)]

use dragon_mobile::{
    apple::{cli::Input, NAME},
    util::cli::exec,
};

fn main() {
    exec::<Input>(NAME)
}
