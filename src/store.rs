//! Configuration store: sections of key/value pairs loaded from the Odoo config file.
//!
//! The mutation rules only need a small surface (list sections, get/set a key,
//! find which section holds a key, persist), captured by [`ConfigStore`].
//! [`IniDocument`] is the file-backed implementation.

mod ini;

pub use ini::IniDocument;

use crate::error::EntrypointError;
use std::path::Path;

/// Section Odoo reads its server options from; home of keys with no other section.
pub const DEFAULT_SECTION: &str = "options";

/// Implicit section holding keys that appear before any section header.
pub const ROOT_SECTION: &str = "DEFAULT";

/// Sectioned key/value store.
pub trait ConfigStore {
    /// Section names in file order. The root section comes first.
    fn section_names(&self) -> Vec<&str>;

    /// Value of `key` in `section`.
    fn get(&self, section: &str, key: &str) -> Option<&str>;

    /// Set `key` in `section`, creating the section and the key as needed.
    fn set(&mut self, section: &str, key: &str, value: &str);

    /// Whether `section` holds `key`.
    fn has_key(&self, section: &str, key: &str) -> bool {
        self.get(section, key).is_some()
    }

    /// First section, in file order, that holds `key`.
    fn find_key(&self, key: &str) -> Option<String> {
        self.section_names()
            .into_iter()
            .find(|section| self.has_key(section, key))
            .map(str::to_string)
    }

    /// Write the whole store to `path`.
    fn persist(&self, path: &Path) -> Result<(), EntrypointError>;
}
