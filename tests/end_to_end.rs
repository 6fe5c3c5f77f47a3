//! Whole-document scenarios, run against the public API rather than any
//! single internal layer.

use pretty_assertions::assert_eq;

use yamele::{Emitter, Event, EventData, Parser, ScalarStyle, SequenceStyle};

fn full_events(input: &str) -> Vec<Event> {
    let mut parser = Parser::new();
    parser.set_input_string(input.as_bytes());
    let mut out = Vec::new();
    loop {
        let event = parser.parse().expect("well-formed input should parse");
        let done = matches!(event.data, EventData::StreamEnd);
        out.push(event);
        if done {
            return out;
        }
    }
}

fn events(input: &str) -> Vec<EventData> {
    full_events(input).into_iter().map(|e| e.data).collect()
}

fn scalars(events: &[EventData]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| match e {
            EventData::Scalar { value, .. } => Some(value.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn plain_mapping() {
    let ev = events("a: 1\n");
    assert!(matches!(ev[0], EventData::StreamStart { .. }));
    assert!(matches!(ev[1], EventData::DocumentStart { implicit: true, .. }));
    assert!(matches!(ev[2], EventData::MappingStart { implicit: true, .. }));
    match &ev[2] {
        EventData::MappingStart { style, .. } => assert_eq!(*style, yamele::MappingStyle::Block),
        other => panic!("expected mapping start, got {other:?}"),
    }
    assert_eq!(scalars(&ev), vec!["a", "1"]);
    match &ev[3] {
        EventData::Scalar { plain_implicit, style, .. } => {
            assert!(*plain_implicit);
            assert_eq!(*style, ScalarStyle::Plain);
        }
        other => panic!("expected scalar, got {other:?}"),
    }
    assert!(matches!(ev[5], EventData::MappingEnd));
    assert!(matches!(ev[6], EventData::DocumentEnd { implicit: true }));
    assert!(matches!(ev[7], EventData::StreamEnd));
}

#[test]
fn block_sequence() {
    let ev = events("- 1\n- 2\n");
    match &ev[2] {
        EventData::SequenceStart { style, .. } => assert_eq!(*style, SequenceStyle::Block),
        other => panic!("expected sequence start, got {other:?}"),
    }
    assert_eq!(scalars(&ev), vec!["1", "2"]);
}

#[test]
fn flow_sequence() {
    let ev = events("[1, 2, 3]\n");
    match &ev[2] {
        EventData::SequenceStart { style, .. } => assert_eq!(*style, SequenceStyle::Flow),
        other => panic!("expected sequence start, got {other:?}"),
    }
    assert_eq!(scalars(&ev), vec!["1", "2", "3"]);
}

#[test]
fn anchor_and_alias_in_flow_sequence_does_not_error() {
    let ev = events("&a [*a]\n");
    match &ev[2] {
        EventData::SequenceStart { anchor, style, .. } => {
            assert_eq!(anchor.as_deref(), Some("a"));
            assert_eq!(*style, SequenceStyle::Flow);
        }
        other => panic!("expected sequence start, got {other:?}"),
    }
    assert!(matches!(&ev[3], EventData::Alias { anchor } if anchor == "a"));
    assert!(matches!(ev[4], EventData::SequenceEnd));
}

#[test]
fn tag_directive_resolves_custom_handle() {
    let ev = events("%YAML 1.1\n%TAG !e! tag:example.com,2020:\n---\n!e!x v\n");
    match &ev[1] {
        EventData::DocumentStart {
            implicit,
            tag_directives,
            ..
        } => {
            assert!(!*implicit);
            assert!(tag_directives.iter().any(|d| d.handle == "!e!"));
        }
        other => panic!("expected document start, got {other:?}"),
    }
    match &ev[2] {
        EventData::Scalar { tag, value, .. } => {
            assert_eq!(tag.as_deref(), Some("tag:example.com,2020:x"));
            assert_eq!(value, "v");
        }
        other => panic!("expected scalar, got {other:?}"),
    }
}

#[test]
fn indentless_sequence_under_mapping_key() {
    let ev = events("key:\n- a\n- b\n");
    assert!(matches!(ev[2], EventData::MappingStart { .. }));
    assert!(matches!(&ev[3], EventData::Scalar { value, .. } if value == "key"));
    match &ev[4] {
        EventData::SequenceStart { style, .. } => assert_eq!(*style, SequenceStyle::Block),
        other => panic!("expected sequence start, got {other:?}"),
    }
    assert_eq!(scalars(&ev[4..]), vec!["a", "b"]);
    assert!(matches!(ev[7], EventData::SequenceEnd));
    assert!(matches!(ev[8], EventData::MappingEnd));
}

#[test]
fn stream_and_document_markers_are_balanced() {
    let ev = events("---\na: 1\n...\n---\nb: 2\n");
    let stream_starts = ev.iter().filter(|e| matches!(e, EventData::StreamStart { .. })).count();
    let stream_ends = ev.iter().filter(|e| matches!(e, EventData::StreamEnd)).count();
    let doc_starts = ev.iter().filter(|e| matches!(e, EventData::DocumentStart { .. })).count();
    let doc_ends = ev.iter().filter(|e| matches!(e, EventData::DocumentEnd { .. })).count();
    assert_eq!(stream_starts, 1);
    assert_eq!(stream_ends, 1);
    assert_eq!(doc_starts, 2);
    assert_eq!(doc_ends, 2);
}

#[test]
fn deeply_nested_block_collections_dedent_cleanly_at_eof() {
    let ev = events("a:\n  b:\n    c:\n      - 1\n      - 2\n");
    let mapping_starts = ev.iter().filter(|e| matches!(e, EventData::MappingStart { .. })).count();
    let mapping_ends = ev.iter().filter(|e| matches!(e, EventData::MappingEnd)).count();
    assert_eq!(mapping_starts, mapping_ends);
    assert!(matches!(ev.last(), Some(EventData::StreamEnd)));
}

#[test]
fn version_directive_other_than_1_1_is_rejected() {
    let mut parser = Parser::new();
    parser.set_input_string(b"%YAML 1.2\n---\na: 1\n");
    let err = loop {
        match parser.parse() {
            Ok(event) if matches!(event.data, EventData::StreamEnd) => panic!("expected an error"),
            Ok(_) => continue,
            Err(err) => break err,
        }
    };
    assert!(err.diagnostic().contains("incompatible"));
}

#[test]
fn round_trip_through_the_minimal_emitter_preserves_events() {
    let input = "top:\n  nested: [1, 2, 3]\n  note: plain text\n  quoted: \"has: a colon\"\n";
    let original = full_events(input);

    let mut text = String::new();
    let mut emitter = Emitter::new();
    emitter.set_output_string(&mut text);
    for event in &original {
        emitter
            .emit(event)
            .expect("emitting a well-formed event stream should succeed");
    }

    let roundtripped = events(&text);
    let original: Vec<EventData> = original.into_iter().map(|e| e.data).collect();
    assert_eq!(original, roundtripped);
}

#[test]
fn round_trip_preserves_literal_and_folded_scalar_styles() {
    let input = "top:\n  log: |\n    line one\n    line two\n  summary: >\n    folded one\n    folded two\n";
    let original = full_events(input);

    let mut text = String::new();
    let mut emitter = Emitter::new();
    emitter.set_output_string(&mut text);
    for event in &original {
        emitter
            .emit(event)
            .expect("emitting a well-formed event stream should succeed");
    }

    let roundtripped = events(&text);
    let original: Vec<EventData> = original.into_iter().map(|e| e.data).collect();
    assert_eq!(original, roundtripped);
}
