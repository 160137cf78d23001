//! End-to-end tests for the document session.

use std::sync::{Arc, Mutex};

use kempt_common::MessageCode;
use kempt_config::{ConfigError, DetectedDoctype, Encoding, OptionId};
use kempt_document::{Document, DocumentError, Status};
use pretty_assertions::assert_eq;

fn processed(html: &str, settings: &[(&str, &str)]) -> Document {
    let mut doc = Document::new();
    for (name, value) in settings {
        doc.set_option(name, value).unwrap();
    }
    let _ = doc.parse_str(html).unwrap();
    let _ = doc.clean_and_repair().unwrap();
    let _ = doc.run_diagnostics().unwrap();
    doc
}

fn reported(doc: &Document) -> String {
    let mut out = Vec::new();
    doc.report_messages(&mut out, false).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_mismatched_heading_is_repaired_with_warnings() {
    let mut doc = processed("<h1>Hello, world!</h2>", &[]);
    assert_eq!(doc.status(), Status::Warnings);
    assert_eq!(doc.status().code(), 1);
    assert_eq!(doc.error_count(), 0);

    let text = doc.save_to_string().unwrap().unwrap();
    assert!(text.starts_with("<!DOCTYPE html>\n<html>\n"));
    assert!(text.contains("<h1>Hello, world!</h1>"));
    assert!(!text.contains("</h2>"));
}

#[test]
fn test_clean_document_has_clean_status() {
    let html = "<!DOCTYPE html>\n<html>\n<head>\n<title>t</title>\n</head>\n<body>\n<p>x</p>\n</body>\n</html>\n";
    let mut doc = Document::new();
    assert_eq!(doc.parse_str(html).unwrap(), Status::Clean);
    assert_eq!(doc.detected_doctype(), DetectedDoctype::Html5);
    assert_eq!(doc.options().get_str(OptionId::DoctypeMode), "html5");
    let _ = doc.clean_and_repair().unwrap();
    assert_eq!(doc.save_to_string().unwrap().as_deref(), Some(html));
    assert_eq!(doc.error_summary(), "No warnings or errors were found.");
}

#[test]
fn test_table_without_sections_round_trips() {
    let mut first = processed("<p>x<table><tr><td>1</td></tr></table>", &[]);
    let text = first.save_to_string().unwrap().unwrap();
    assert!(text.contains(
        "<p>x</p>\n<table>\n<tbody>\n<tr>\n<td>1</td>\n</tr>\n</tbody>\n</table>\n"
    ));

    let mut second = processed(&text, &[]);
    assert_eq!(second.save_to_string().unwrap().unwrap(), text);
}

#[test]
fn test_errors_suppress_output_unless_forced() {
    let mut doc = processed("<p><blink>x</blink></p>", &[]);
    assert_eq!(doc.status(), Status::Errors);
    assert!(doc.messages().iter().any(|m| m.code == MessageCode::UnknownElement));
    assert!(doc.output_suppressed());
    assert_eq!(doc.save_to_string().unwrap(), None);
    let mut sink = Vec::new();
    assert!(!doc.save_to_writer(&mut sink).unwrap());
    assert!(sink.is_empty());
    assert!(doc.error_summary().contains("must be fixed"));

    let mut forced = processed("<p><blink>x</blink></p>", &[("force-output", "yes")]);
    assert!(forced.save_to_string().unwrap().is_some());
}

#[test]
fn test_error_limit_halts_parsing() {
    let mut doc = Document::new();
    doc.options_mut().set(OptionId::ErrorLimit, 1u64).unwrap();
    let _ = doc.parse_str("<p><blink>a</blink><marquee>b</marquee><p>c").unwrap();
    assert!(doc.is_halted());
    assert_eq!(doc.error_count(), 1);
    assert!(doc.messages().iter().any(|m| m.code == MessageCode::ErrorLimitReached));
    assert!(doc.error_summary().contains("Parsing stopped at the error limit."));
}

#[test]
fn test_markup_off_writes_nothing() {
    let mut doc = processed("<p>x</p>", &[("markup", "no")]);
    assert_eq!(doc.save_to_bytes().unwrap(), None);
}

#[test]
fn test_muted_messages_are_recorded_but_not_shown() {
    let doc = processed("<p>x</p>", &[("mute", "MISSING_DOCTYPE")]);
    let missing = doc
        .messages()
        .iter()
        .find(|m| m.code == MessageCode::MissingDoctype)
        .unwrap();
    assert!(missing.muted);
    assert!(!reported(&doc).contains("DOCTYPE"));
}

#[test]
fn test_message_filter_mutes_selectively() {
    let mut doc = Document::new();
    doc.set_message_filter(|m| m.code != MessageCode::MissingTitleElement);
    let _ = doc.parse_str("<p>x</p>").unwrap();
    let report = reported(&doc);
    assert!(report.contains("DOCTYPE"));
    assert!(!report.contains("title"));
}

#[test]
fn test_info_and_keys_follow_their_options() {
    let doc = processed("<p>x</p>", &[("show-info", "no")]);
    assert!(!reported(&doc).contains("Info:"));
    assert!(doc.info_count() > 0);

    let doc = processed("<p>x</p>", &[("mute-id", "yes")]);
    let report = reported(&doc);
    assert!(report.contains("Info: Document content looks like HTML5"));
    assert!(report.contains("(MISSING_DOCTYPE)"));
}

#[test]
fn test_bad_settings_become_config_messages() {
    let mut doc = Document::new();
    assert!(matches!(
        doc.set_option("no-such-option", "1"),
        Err(ConfigError::UnknownOption(_))
    ));
    assert!(matches!(
        doc.set_option("doctype-mode", "html5"),
        Err(ConfigError::ReadOnly(_))
    ));
    assert!(doc.set_option("wrap", "lots").is_err());
    assert_eq!(doc.config_error_count(), 3);
    assert_eq!(doc.status(), Status::Clean);

    let keys: Vec<_> = doc.messages().iter().map(|m| m.key()).collect();
    assert_eq!(
        keys,
        vec!["UNKNOWN_OPTION", "READ_ONLY_OPTION", "BAD_OPTION_VALUE"]
    );
}

#[test]
fn test_unknown_option_hook_claims_names() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut doc = Document::new();
    let hook_seen = Arc::clone(&seen);
    doc.set_unknown_option_hook(move |name, value| {
        hook_seen
            .lock()
            .unwrap()
            .push(format!("{name}={value}"));
        name.starts_with("x-")
    });

    assert!(doc.set_option("x-editor", "vim").is_ok());
    assert!(doc.set_option("other", "1").is_err());
    assert_eq!(*seen.lock().unwrap(), vec!["x-editor=vim", "other=1"]);
    assert_eq!(doc.config_error_count(), 1);
}

#[test]
fn test_option_changes_are_announced() {
    let changes = Arc::new(Mutex::new(Vec::new()));
    let mut doc = Document::new();
    let sink = Arc::clone(&changes);
    doc.on_option_change(move |id, _| sink.lock().unwrap().push(id));
    doc.set_option("wrap", "40").unwrap();
    assert!(changes.lock().unwrap().contains(&OptionId::Wrap));
}

#[test]
fn test_config_file_settings_apply() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kempt.conf");
    std::fs::write(&path, "# house style\nindent: yes\nwrap: 40\nbogus-option: 1\n").unwrap();

    let mut doc = Document::new();
    assert_eq!(doc.load_config_file(&path).unwrap(), 1);
    assert_eq!(doc.options().get_int(OptionId::Wrap), 40);
    let bogus = &doc.messages()[0];
    assert_eq!(bogus.code, MessageCode::UnknownOption);
    assert_eq!(bogus.pos.map(|p| p.line), Some(4));
}

#[test]
fn test_missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Document::new()
        .load_config_file(&dir.path().join("absent.conf"))
        .unwrap_err();
    assert!(matches!(err, DocumentError::Config(ConfigError::Io { .. })));
}

#[test]
fn test_copied_config_matches() {
    let mut source = Document::new();
    source.set_option("indent", "auto").unwrap();
    source.set_option("wrap", "20").unwrap();
    let mut copy = Document::new();
    copy.copy_config_from(&source);
    assert_eq!(copy.options().get_int(OptionId::Wrap), 20);
    assert_eq!(copy.options().get_str(OptionId::Indent), "auto");
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("page.html");
    let output = dir.path().join("page.out.html");
    std::fs::write(&input, "<title>t</title><p>x").unwrap();

    let mut doc = Document::new();
    let _ = doc.parse_file(&input).unwrap();
    let _ = doc.clean_and_repair().unwrap();
    assert!(doc.save_file(&output).unwrap());

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains("<p>x</p>"));

    let mut again = Document::new();
    let _ = again.parse_file(&output).unwrap();
    let _ = again.clean_and_repair().unwrap();
    assert_eq!(again.save_to_string().unwrap().as_deref(), Some(written.as_str()));
}

#[test]
fn test_missing_input_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.html");
    let err = Document::new().parse_file(&path).unwrap_err();
    assert!(matches!(err, DocumentError::NotFound(p) if p == path));
}

#[test]
fn test_gnu_emacs_messages_name_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("page.html");
    std::fs::write(&input, "<p>x</p>").unwrap();

    let mut doc = Document::new();
    doc.set_option("gnu-emacs", "yes").unwrap();
    let _ = doc.parse_file(&input).unwrap();
    let report = reported(&doc);
    assert!(report.starts_with(&format!("{}:", input.display())));
}

#[test]
fn test_reader_input_and_charset_override() {
    let mut doc = Document::new();
    doc.set_input_charset("latin1").unwrap();
    let _ = doc.parse_reader(&b"<p>caf\xE9</p>"[..]).unwrap();
    let p = doc.children(doc.body().unwrap()).unwrap()[0];
    assert_eq!(doc.text_content(p).as_deref(), Some("caf\u{E9}"));
    assert_eq!(doc.detected_encoding(), Some(Encoding::Latin1));

    assert!(matches!(
        doc.set_input_charset("klingon"),
        Err(DocumentError::UnsupportedEncoding(label)) if label == "klingon"
    ));
}

#[test]
fn test_body_only_output() {
    let mut doc = processed("<p>a</p><p>b</p>", &[("show-body-only", "yes")]);
    assert!(doc.body_only());
    assert_eq!(doc.save_to_string().unwrap().as_deref(), Some("<p>a</p>\n<p>b</p>\n"));

    let implicit = processed("<p>a</p>", &[("show-body-only", "auto")]);
    assert!(implicit.body_only());
    let explicit = processed("<body><p>a</p></body>", &[("show-body-only", "auto")]);
    assert!(!explicit.body_only());
}

#[test]
fn test_cleanup_options() {
    let mut doc = processed(
        "<!-- note --><p>x</p><div></div>",
        &[("hide-comments", "yes"), ("drop-empty-elements", "yes"), ("doctype", "omit")],
    );
    assert!(doc.messages().iter().any(|m| m.code == MessageCode::TrimEmptyElement));
    let text = doc.save_to_string().unwrap().unwrap();
    assert!(!text.contains("note"));
    assert!(!text.contains("<div>"));
    assert!(!text.contains("<!DOCTYPE"));
}

#[test]
fn test_xhtml_output_gets_a_namespace() {
    let mut doc = processed("<p>a<br>b</p>", &[("output-xhtml", "yes")]);
    let text = doc.save_to_string().unwrap().unwrap();
    assert!(text.contains("<html xmlns=\"http://www.w3.org/1999/xhtml\">"));
    assert!(text.contains("<br />"));
}

#[test]
fn test_diagnostics_report_the_doctype() {
    let doc = processed(
        "<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 4.01//EN\"><title>t</title><p>x</p>",
        &[],
    );
    let given = doc
        .messages()
        .iter()
        .find(|m| m.code == MessageCode::DoctypeGiven)
        .unwrap();
    assert_eq!(given.args, vec!["-//W3C//DTD HTML 4.01//EN"]);
    let looks = doc
        .messages()
        .iter()
        .find(|m| m.code == MessageCode::ContentLooksLike)
        .unwrap();
    assert_eq!(looks.args, vec!["HTML 4.01 Strict"]);
}

#[test]
fn test_print_progress_matches_records() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut doc = processed("<p>a</p>\n\n\n<p>b</p>", &[]);
    let sink = Arc::clone(&seen);
    doc.on_print_progress(move |record| sink.lock().unwrap().push(*record));
    let _ = doc.save_to_string().unwrap();
    assert!(!doc.pretty_print_records().is_empty());
    assert_eq!(*seen.lock().unwrap(), doc.pretty_print_records());
}

#[test]
fn test_operations_before_parsing_fail() {
    let mut doc = Document::new();
    assert!(matches!(doc.clean_and_repair(), Err(DocumentError::NotParsed)));
    assert!(matches!(doc.save_to_string(), Err(DocumentError::NotParsed)));
}

#[test]
fn test_app_data_is_typed() {
    let mut doc = Document::new();
    doc.set_app_data(42_u32);
    assert_eq!(doc.app_data::<u32>(), Some(&42));
    assert_eq!(doc.app_data::<String>(), None);
    assert_eq!(doc.take_app_data::<String>(), None);
    assert_eq!(doc.take_app_data::<u32>(), Some(42));
    assert_eq!(doc.app_data::<u32>(), None);
}
