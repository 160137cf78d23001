//! Tests for the option store: validation, coupling, snapshots and config files.

use std::io::Write as _;
use std::sync::{Arc, Mutex};

use kempt_config::{
    AutoBool, ConfigError, Encoding, OptionId, OptionStore, OptionType, OptionValue,
};
use pretty_assertions::assert_eq;
use quickcheck_macros::quickcheck;
use strum::IntoEnumIterator;

fn recording_store() -> (OptionStore, Arc<Mutex<Vec<(OptionId, OptionValue)>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut store = OptionStore::new();
    store.on_change(Box::new(move |id, value| {
        sink.lock().unwrap().push((id, value.clone()));
    }));
    (store, seen)
}

// ========== defaults and typed access ==========

#[test]
fn test_defaults() {
    let store = OptionStore::new();
    assert_eq!(store.get_int(OptionId::Wrap), 68);
    assert_eq!(store.get_int(OptionId::IndentSpaces), 2);
    assert!(store.get_bool(OptionId::DropEmptyParas));
    assert!(!store.get_bool(OptionId::OutputXhtml));
    assert_eq!(store.get_choice::<AutoBool>(OptionId::Indent), AutoBool::No);
    assert_eq!(store.get_choice::<Encoding>(OptionId::CharEncoding), Encoding::Utf8);
    assert!(store.get_list(OptionId::NewBlocklevelTags).is_empty());
    assert!(store.diff_from_default().is_empty());
}

#[test]
fn test_every_public_option_accepts_its_default_text() {
    let mut store = OptionStore::new();
    for id in OptionId::iter() {
        let def = id.def();
        if def.read_only || id.is_internal() {
            continue;
        }
        let text = def.default.to_string();
        store.set_from_str(id, &text).unwrap();
        assert_eq!(store.get(id), &def.default, "{id}");
    }
}

#[test]
fn test_set_by_name_is_case_insensitive() {
    let mut store = OptionStore::new();
    store.set_by_name("Indent-Spaces", "4").unwrap();
    store.set_by_name("indent", "AUTO").unwrap();
    store.set_by_name("quote-marks", "y").unwrap();
    assert_eq!(store.get_int(OptionId::IndentSpaces), 4);
    assert_eq!(store.get(OptionId::Indent), &OptionValue::Choice("auto"));
    assert!(store.get_bool(OptionId::QuoteMarks));
}

// ========== validation ==========

#[test]
fn test_negative_integer_text_is_out_of_range() {
    let mut store = OptionStore::new();
    let err = store.set_from_str(OptionId::Wrap, "-1").unwrap_err();
    assert!(matches!(
        err,
        ConfigError::OutOfRange {
            option: OptionId::Wrap,
            value: -1,
            ..
        }
    ));
    assert_eq!(store.get_int(OptionId::Wrap), 68);

    let err = store.set_from_str(OptionId::Wrap, "wide").unwrap_err();
    assert!(matches!(err, ConfigError::TypeMismatch { option: OptionId::Wrap, .. }));
}

#[test]
fn test_out_of_range_integer_is_rejected() {
    let mut store = OptionStore::new();
    let err = store.set(OptionId::TabSize, 0u64).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::OutOfRange {
            option: OptionId::TabSize,
            value: 0,
            min: 1,
            max: 16
        }
    ));
    assert_eq!(store.get_int(OptionId::TabSize), 8);
}

#[test]
fn test_type_mismatch_is_rejected() {
    let mut store = OptionStore::new();
    let err = store.set(OptionId::Wrap, true).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::TypeMismatch {
            option: OptionId::Wrap,
            expected: OptionType::Integer
        }
    ));
    assert!(store.set_from_str(OptionId::Wrap, "wide").is_err());
    assert!(store.set_from_str(OptionId::HideComments, "perhaps").is_err());
}

#[test]
fn test_picklist_rejects_unknown_labels() {
    let mut store = OptionStore::new();
    let err = store.set_from_str(OptionId::Newline, "lfcr").unwrap_err();
    match err {
        ConfigError::NotInPicklist { allowed, .. } => assert_eq!(allowed, "lf, crlf, cr"),
        other => panic!("unexpected error: {other}"),
    }
    store.set_from_str(OptionId::Newline, "CRLF").unwrap();
    assert_eq!(store.get_str(OptionId::Newline), "crlf");
}

#[test]
fn test_read_only_and_internal_options() {
    let mut store = OptionStore::new();
    assert!(matches!(
        store.set_from_str(OptionId::DoctypeMode, "html5"),
        Err(ConfigError::ReadOnly(OptionId::DoctypeMode))
    ));
    assert!(matches!(
        store.set_by_name("emacs-file", "x.html"),
        Err(ConfigError::UnknownOption(_))
    ));
    assert!(matches!(
        store.set_by_name("no-such-option", "1"),
        Err(ConfigError::UnknownOption(name)) if name == "no-such-option"
    ));

    // The library itself may write both.
    store.force(OptionId::DoctypeMode, "html5").unwrap();
    store.force(OptionId::EmacsFile, "x.html").unwrap();
    assert_eq!(store.get_str(OptionId::DoctypeMode), "html5");
    assert_eq!(store.get_str(OptionId::EmacsFile), "x.html");
}

#[test]
fn test_lists_are_canonicalized() {
    let mut store = OptionStore::new();
    store
        .set_from_str(OptionId::NewBlocklevelTags, "one two,three one")
        .unwrap();
    assert_eq!(store.get_str(OptionId::NewBlocklevelTags), "one, two, three");
    assert_eq!(
        store.get_list(OptionId::NewBlocklevelTags),
        vec!["one", "two", "three"]
    );
}

// ========== coupling and notification ==========

#[test]
fn test_indent_with_tabs_sets_one_indent_unit() {
    let (mut store, seen) = recording_store();
    store.set(OptionId::IndentWithTabs, true).unwrap();
    assert_eq!(store.get_int(OptionId::IndentSpaces), 1);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            (OptionId::IndentWithTabs, OptionValue::Bool(true)),
            (OptionId::IndentSpaces, OptionValue::Int(1)),
        ]
    );
}

#[test]
fn test_couplings_apply_when_the_trigger_is_set_again() {
    let (mut store, seen) = recording_store();
    store.set(OptionId::IndentWithTabs, true).unwrap();
    store.set(OptionId::IndentSpaces, 4u64).unwrap();
    seen.lock().unwrap().clear();

    store.set_by_name("indent-with-tabs", "yes").unwrap();
    assert_eq!(store.get_int(OptionId::IndentSpaces), 1);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![(OptionId::IndentSpaces, OptionValue::Int(1))]
    );
}

#[test]
fn test_char_encoding_sets_input_and_output() {
    let mut store = OptionStore::new();
    store.set_from_str(OptionId::CharEncoding, "latin1").unwrap();
    assert_eq!(store.get_choice::<Encoding>(OptionId::InputEncoding), Encoding::Latin1);
    assert_eq!(store.get_choice::<Encoding>(OptionId::OutputEncoding), Encoding::Latin1);

    // The directions can still be set apart afterwards.
    store.set_from_str(OptionId::OutputEncoding, "ascii").unwrap();
    assert_eq!(store.get_choice::<Encoding>(OptionId::InputEncoding), Encoding::Latin1);
    assert_eq!(store.get_choice::<Encoding>(OptionId::OutputEncoding), Encoding::Ascii);
}

#[test]
fn test_output_xhtml_and_html_exclude_each_other() {
    let mut store = OptionStore::new();
    store.set(OptionId::OutputHtml, true).unwrap();
    store.set(OptionId::OutputXhtml, true).unwrap();
    assert!(store.get_bool(OptionId::OutputXhtml));
    assert!(!store.get_bool(OptionId::OutputHtml));

    store.set(OptionId::OutputHtml, true).unwrap();
    assert!(!store.get_bool(OptionId::OutputXhtml));
}

#[test]
fn test_setting_the_same_value_does_not_notify() {
    let (mut store, seen) = recording_store();
    store.set(OptionId::Wrap, 68u64).unwrap();
    assert!(seen.lock().unwrap().is_empty());
    store.set(OptionId::Wrap, 72u64).unwrap();
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn test_cleared_callback_is_not_called() {
    let (mut store, seen) = recording_store();
    store.clear_on_change();
    store.set(OptionId::Wrap, 72u64).unwrap();
    assert!(seen.lock().unwrap().is_empty());
}

// ========== snapshots, resets and diffs ==========

#[test]
fn test_snapshot_and_restore() {
    let mut store = OptionStore::new();
    store.set(OptionId::Wrap, 100u64).unwrap();
    store.snapshot();
    store.set(OptionId::Wrap, 20u64).unwrap();
    store.set(OptionId::QuoteMarks, true).unwrap();

    assert_eq!(
        store.diff_from_snapshot(),
        vec![OptionId::Wrap, OptionId::QuoteMarks]
    );
    store.reset_to_snapshot();
    assert_eq!(store.get_int(OptionId::Wrap), 100);
    assert!(!store.get_bool(OptionId::QuoteMarks));
    assert!(!store.differs_from_snapshot());
    assert_eq!(store.diff_from_default(), vec![OptionId::Wrap]);
}

#[test]
fn test_restore_without_snapshot_gives_defaults() {
    let mut store = OptionStore::new();
    store.set(OptionId::Wrap, 0u64).unwrap();
    assert!(!store.has_snapshot());
    store.reset_to_snapshot();
    assert_eq!(store.get_int(OptionId::Wrap), 68);
}

#[test]
fn test_reset_all_to_default_clears_every_change() {
    let mut store = OptionStore::new();
    store.set(OptionId::IndentWithTabs, true).unwrap();
    store.set_from_str(OptionId::Mute, "UNKNOWN_ELEMENT").unwrap();
    store.reset_all_to_default();
    assert!(!store.differs_from_default());
    store.reset_to_default(OptionId::Wrap);
    assert_eq!(store.get_int(OptionId::Wrap), 68);
}

#[test]
fn test_diff_ignores_read_only_options() {
    let mut store = OptionStore::new();
    store.force(OptionId::DoctypeMode, "xhtml1").unwrap();
    assert!(store.diff_from_default().is_empty());
}

#[test]
fn test_copy_from_snapshots_first() {
    let mut source = OptionStore::new();
    source.set(OptionId::Wrap, 0u64).unwrap();
    source.force(OptionId::EmacsFile, "a.html").unwrap();

    let mut target = OptionStore::new();
    target.set(OptionId::QuoteMarks, true).unwrap();
    target.copy_from(&source);

    assert_eq!(target.get_int(OptionId::Wrap), 0);
    assert!(!target.get_bool(OptionId::QuoteMarks));
    assert_eq!(target.get_str(OptionId::EmacsFile), "");

    target.reset_to_snapshot();
    assert_eq!(target.get_int(OptionId::Wrap), 68);
    assert!(target.get_bool(OptionId::QuoteMarks));
}

#[test]
fn test_iter_lists_public_options_only() {
    let store = OptionStore::new();
    let names: Vec<&str> = store.iter().map(|(def, _)| def.id.name()).collect();
    assert!(names.contains(&"wrap"));
    assert!(names.contains(&"doctype-mode"));
    assert!(!names.contains(&"emacs-file"));
}

// ========== config files ==========

#[test]
fn test_load_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "# house style\nindent: auto\nwrap: 100\nbogus: 1\ntab-size: 99\nnew-inline-tags: x-a,\n  x-b"
    )
    .unwrap();

    let mut store = OptionStore::new();
    let problems = store.load_config_file(file.path()).unwrap();

    assert_eq!(store.get_choice::<AutoBool>(OptionId::Indent), AutoBool::Auto);
    assert_eq!(store.get_int(OptionId::Wrap), 100);
    assert_eq!(store.get_int(OptionId::TabSize), 8);
    assert_eq!(store.get_list(OptionId::NewInlineTags), vec!["x-a", "x-b"]);

    let lines: Vec<usize> = problems.iter().map(|(line, _)| *line).collect();
    assert_eq!(lines, vec![4, 5]);
    assert!(matches!(problems[0].1, ConfigError::UnknownOption(_)));
}

#[test]
fn test_missing_config_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = OptionStore::new();
    let err = store
        .load_config_file(&dir.path().join("absent.conf"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

// ========== properties ==========

#[quickcheck]
fn prop_in_range_wrap_reads_back(n: u64) -> bool {
    let mut store = OptionStore::new();
    let n = n % 10_001;
    store.set(OptionId::Wrap, n).is_ok() && store.get_int(OptionId::Wrap) == n
}

#[quickcheck]
fn prop_rejected_values_leave_store_unchanged(n: u64) -> bool {
    let mut store = OptionStore::new();
    let before = store.get(OptionId::IndentSpaces).clone();
    let result = store.set(OptionId::IndentSpaces, n);
    if n <= 20 {
        result.is_ok()
    } else {
        result.is_err() && *store.get(OptionId::IndentSpaces) == before
    }
}
