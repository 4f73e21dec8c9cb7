//! Integration tests for fragment merging followed by INI parsing

use super::test_utils::Layout;
use odoo_entrypoint::environment::EnvSnapshot;
use odoo_entrypoint::files::{fragment_files, merge_fragments, MergeOutcome, RESERVED_FRAGMENT};
use odoo_entrypoint::store::{ConfigStore, IniDocument};
use std::fs;

fn copy_template(layout: &Layout) -> std::path::PathBuf {
    let settings = layout.resolve(&EnvSnapshot::default());
    fs::create_dir_all(settings.config_file.parent().unwrap()).unwrap();
    fs::copy(&settings.template, &settings.config_file).unwrap();
    settings.config_file
}

#[test]
fn test_fragments_are_appended_in_name_order() {
    let layout = Layout::new("[options]\ndb_host = localhost\n");
    layout.add_fragment("20-late.cfg", "[late]\nkey = 2\n");
    layout.add_fragment("10-early.cfg", "\n\n[early]\n   key = 1   \n");
    let config = copy_template(&layout);

    let outcome = merge_fragments(&config, &layout.settings.paths.fragments_dir).unwrap();
    assert_eq!(outcome, MergeOutcome::Merged { fragments: 2 });

    let contents = fs::read_to_string(&config).unwrap();
    assert_eq!(
        contents,
        "[options]\ndb_host = localhost\n\n[early]\nkey = 1\n\n[late]\nkey = 2"
    );

    let store = IniDocument::load(&config).unwrap();
    assert_eq!(store.section_names(), vec!["DEFAULT", "options", "early", "late"]);
    assert_eq!(store.get("early", "key"), Some("1"));
}

#[test]
fn test_reserved_fragment_and_subdirectories_ignored() {
    let layout = Layout::new("[options]\n");
    layout.add_fragment(RESERVED_FRAGMENT, "[options]\nduplicate = yes\n");
    layout.add_fragment("blank.cfg", "\n   \n");
    fs::create_dir(layout.settings.paths.fragments_dir.join("nested")).unwrap();
    layout.add_fragment("extra.cfg", "[extra]\nvalue = 1\n");

    let files = fragment_files(&layout.settings.paths.fragments_dir).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["blank.cfg", "extra.cfg"]);

    let config = copy_template(&layout);
    let outcome = merge_fragments(&config, &layout.settings.paths.fragments_dir).unwrap();
    assert_eq!(outcome, MergeOutcome::Merged { fragments: 1 });

    let store = IniDocument::load(&config).unwrap();
    assert!(!store.has_key("options", "duplicate"));
    assert_eq!(store.get("extra", "value"), Some("1"));
}

#[test]
fn test_repeated_section_in_fragment_merges() {
    let layout = Layout::new("[options]\ndb_host = localhost\n");
    layout.add_fragment("db.cfg", "[options]\ndb_port = 6432\n");
    let config = copy_template(&layout);

    merge_fragments(&config, &layout.settings.paths.fragments_dir).unwrap();
    let store = IniDocument::load(&config).unwrap();
    assert_eq!(store.get("options", "db_host"), Some("localhost"));
    assert_eq!(store.get("options", "db_port"), Some("6432"));
    assert_eq!(store.section_names(), vec!["DEFAULT", "options"]);
}

#[test]
fn test_missing_base_file_fails() {
    let layout = Layout::new("[options]\n");
    let settings = layout.resolve(&EnvSnapshot::default());
    assert!(merge_fragments(&settings.config_file, &settings.fragments_dir).is_err());
}
