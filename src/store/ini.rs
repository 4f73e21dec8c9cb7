//! Minimal INI document that round-trips the Odoo configuration format.
//!
//! Sections and keys are kept in file order, comments stay where they were, and
//! values are stored verbatim. Keys are written back as `key = value`.

use super::{ConfigStore, ROOT_SECTION};
use crate::error::EntrypointError;
use crate::files::{read_text, write_config_file};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Entry { key: String, value: String },
    Comment(String),
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    name: String,
    lines: Vec<Line>,
}

impl Section {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            lines: Vec::new(),
        }
    }

    fn value_mut(&mut self, key: &str) -> Option<&mut String> {
        self.lines.iter_mut().find_map(|line| match line {
            Line::Entry { key: k, value } if k == key => Some(value),
            _ => None,
        })
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Some(existing) = self.value_mut(key) {
            *existing = value.to_string();
            return;
        }
        // Keep trailing blank lines after the new key so sections stay separated.
        let insert_at = self
            .lines
            .iter()
            .rposition(|line| *line != Line::Blank)
            .map_or(0, |i| i + 1);
        self.lines.insert(
            insert_at,
            Line::Entry {
                key: key.to_string(),
                value: value.to_string(),
            },
        );
    }
}

/// Parsed INI file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniDocument {
    sections: Vec<Section>,
}

impl Default for IniDocument {
    fn default() -> Self {
        Self {
            sections: vec![Section::new(ROOT_SECTION)],
        }
    }
}

impl IniDocument {
    /// Load and parse the file at `path`.
    pub fn load(path: &Path) -> Result<Self, EntrypointError> {
        let text = read_text(path)?;
        Self::parse_with_origin(&text, path)
    }

    fn parse_with_origin(text: &str, origin: &Path) -> Result<Self, EntrypointError> {
        let mut doc = IniDocument::default();
        let mut current = 0;

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                doc.sections[current].lines.push(Line::Blank);
                continue;
            }
            if line.starts_with('#') || line.starts_with(';') {
                doc.sections[current]
                    .lines
                    .push(Line::Comment(line.to_string()));
                continue;
            }
            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                current = doc.section_index_or_insert(name.trim());
                continue;
            }
            let Some(split) = line.find(['=', ':']) else {
                return Err(EntrypointError::Parse {
                    path: origin.to_path_buf(),
                    line: index + 1,
                    content: raw.to_string(),
                });
            };
            let key = line[..split].trim();
            if key.is_empty() {
                return Err(EntrypointError::Parse {
                    path: origin.to_path_buf(),
                    line: index + 1,
                    content: raw.to_string(),
                });
            }
            let value = line[split + 1..].trim();
            doc.sections[current].set(key, value);
        }

        Ok(doc)
    }

    fn section_index(&self, name: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.name == name)
    }

    fn section_index_or_insert(&mut self, name: &str) -> usize {
        if let Some(index) = self.section_index(name) {
            return index;
        }
        self.sections.push(Section::new(name));
        self.sections.len() - 1
    }

    /// Like `section_index_or_insert`, but separates a new section from the
    /// previous one with a blank line.
    fn section_index_or_append(&mut self, name: &str) -> usize {
        if let Some(index) = self.section_index(name) {
            return index;
        }
        if let Some(last) = self.sections.last_mut() {
            if last.lines.last().is_some_and(|line| *line != Line::Blank) {
                last.lines.push(Line::Blank);
            }
        }
        self.section_index_or_insert(name)
    }

    /// Keys of `section` in file order.
    pub fn keys(&self, section: &str) -> Vec<&str> {
        self.section_index(section)
            .map(|i| {
                self.sections[i]
                    .lines
                    .iter()
                    .filter_map(|line| match line {
                        Line::Entry { key, .. } => Some(key.as_str()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl FromStr for IniDocument {
    type Err = EntrypointError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse_with_origin(text, &PathBuf::new())
    }
}

impl fmt::Display for IniDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            if section.name != ROOT_SECTION {
                writeln!(f, "[{}]", section.name)?;
            }
            for line in &section.lines {
                match line {
                    Line::Entry { key, value } => writeln!(f, "{} = {}", key, value)?,
                    Line::Comment(text) => writeln!(f, "{}", text)?,
                    Line::Blank => writeln!(f)?,
                }
            }
        }
        Ok(())
    }
}

impl ConfigStore for IniDocument {
    fn section_names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }

    fn get(&self, section: &str, key: &str) -> Option<&str> {
        let index = self.section_index(section)?;
        self.sections[index].lines.iter().find_map(|line| match line {
            Line::Entry { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    fn set(&mut self, section: &str, key: &str, value: &str) {
        let index = self.section_index_or_append(section);
        self.sections[index].set(key, value);
    }

    fn persist(&self, path: &Path) -> Result<(), EntrypointError> {
        write_config_file(path, &self.to_string())
    }
}
