#![deny(rust_2018_idioms, unused_imports)]

pub mod builtin;
pub mod config;
pub mod console;
pub mod permissions;
