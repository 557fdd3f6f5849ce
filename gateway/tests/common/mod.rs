// Not every utils is used in every test, so we allow dead code
#![allow(unused_imports, dead_code)]

mod stub_provider;
pub use stub_provider::*;
mod test_setup;
pub use test_setup::*;
