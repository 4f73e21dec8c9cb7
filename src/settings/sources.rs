//! Settings sources layered over the defaults.

pub mod settings_file;
