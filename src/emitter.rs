//! Turns an [`Event`] stream back into YAML text.
//!
//! This is deliberately not a faithful reimplementation of libyaml's
//! emitter: there is no re-analysis of collection styles (block vs. flow
//! is read straight off the incoming event), no canonical mode, and no
//! line-wrapping at a target width. What it guarantees is the Testable
//! Property from the scanner/parser contract: `parse(emit(parse(s)))`
//! produces the same event sequence as `parse(s)`.

use crate::{EmitterError, Encoding, Event, EventData, ScalarStyle, Writer};

const DEFAULT_TAG_HANDLES: [(&str, &str); 2] = [("!", "!"), ("!!", "tag:yaml.org,2002:")];

enum Frame {
    BlockSeq { indent: usize, first: bool },
    FlowSeq { first: bool },
    BlockMap { indent: usize, first: bool, awaiting_value: bool },
    FlowMap { first: bool, awaiting_value: bool },
}

impl Frame {
    fn indent(&self) -> usize {
        match self {
            Frame::BlockSeq { indent, .. } | Frame::BlockMap { indent, .. } => *indent,
            Frame::FlowSeq { .. } | Frame::FlowMap { .. } => 0,
        }
    }

    fn in_flow(&self) -> bool {
        matches!(self, Frame::FlowSeq { .. } | Frame::FlowMap { .. })
    }
}

/// Writes an event stream to a [`Writer`] as YAML text.
#[non_exhaustive]
pub struct Emitter<'w> {
    writer: Writer<'w>,
    encoding: Encoding,
    stack: Vec<Frame>,
    at_line_start: bool,
    /// Set right after writing a `---` marker, cleared by the first node
    /// written afterwards. Lets a bare scalar document root (no
    /// enclosing collection frame to trigger `start_line`) get a
    /// separating space instead of running into the marker.
    after_document_marker: bool,
    documents_emitted: usize,
}

impl<'w> Default for Emitter<'w> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'w> Emitter<'w> {
    /// Create an emitter with no output sink yet attached.
    pub fn new() -> Self {
        Emitter {
            writer: Writer::new(),
            encoding: Encoding::Any,
            stack: Vec::new(),
            at_line_start: true,
            after_document_marker: false,
            documents_emitted: 0,
        }
    }

    /// Accumulate output into a caller-owned `String`.
    pub fn set_output_string(&mut self, output: &'w mut String) {
        self.writer.set_output_string(output);
    }

    /// Attach a generic writer as the output sink.
    pub fn set_output(&mut self, output: &'w mut dyn std::io::Write) {
        self.writer.set_output(output);
    }

    /// The encoding carried by the last STREAM-START event, if any has
    /// been emitted yet. Output is always written as UTF-8 regardless;
    /// this is purely informational (the emitter does not transcode to
    /// UTF-16, unlike libyaml's).
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Feed the emitter the next event of the stream.
    ///
    /// Events must arrive in the same well-formed order the parser
    /// produces them; this is not re-validated beyond what naturally
    /// falls out of the stack discipline below.
    pub fn emit(&mut self, event: &Event) -> Result<(), EmitterError> {
        match &event.data {
            EventData::StreamStart { encoding } => {
                self.encoding = *encoding;
                Ok(())
            }
            EventData::StreamEnd => {
                self.writer.flush().map_err(EmitterError::from)
            }
            EventData::DocumentStart {
                version_directive,
                tag_directives,
                implicit,
            } => self.emit_document_start(*version_directive, tag_directives, *implicit),
            EventData::DocumentEnd { implicit } => self.emit_document_end(*implicit),
            EventData::Alias { anchor } => {
                self.node_prefix(false);
                self.write_raw("*");
                self.write_raw(anchor);
                Ok(())
            }
            EventData::Scalar {
                anchor,
                tag,
                value,
                plain_implicit,
                quoted_implicit,
                style,
            } => {
                let in_flow = self.in_flow();
                let omit_tag = *plain_implicit && *style == ScalarStyle::Plain
                    || *quoted_implicit && *style != ScalarStyle::Plain;
                let tag = if omit_tag { None } else { tag.as_deref() };
                self.node_prefix(false);
                self.write_properties(anchor.as_deref(), tag);
                self.write_scalar(value, *style, in_flow);
                Ok(())
            }
            EventData::SequenceStart {
                anchor,
                tag,
                implicit,
                style,
            } => {
                let block = *style != crate::SequenceStyle::Flow;
                let tag = if *implicit { None } else { tag.as_deref() };
                self.node_prefix(block);
                self.write_properties(anchor.as_deref(), tag);
                if block {
                    let indent = if self.stack.is_empty() {
                        0
                    } else {
                        self.current_indent() + 2
                    };
                    self.stack.push(Frame::BlockSeq { indent, first: true });
                } else {
                    self.write_raw("[");
                    self.stack.push(Frame::FlowSeq { first: true });
                }
                Ok(())
            }
            EventData::SequenceEnd => {
                match self.stack.pop() {
                    Some(Frame::FlowSeq { .. }) => self.write_raw("]"),
                    Some(Frame::BlockSeq { .. }) | None => {}
                    Some(other) => self.stack.push(other),
                }
                Ok(())
            }
            EventData::MappingStart {
                anchor,
                tag,
                implicit,
                style,
            } => {
                let block = *style != crate::MappingStyle::Flow;
                let tag = if *implicit { None } else { tag.as_deref() };
                self.node_prefix(block);
                self.write_properties(anchor.as_deref(), tag);
                if block {
                    let indent = if self.stack.is_empty() {
                        0
                    } else {
                        self.current_indent() + 2
                    };
                    self.stack.push(Frame::BlockMap {
                        indent,
                        first: true,
                        awaiting_value: false,
                    });
                } else {
                    self.write_raw("{");
                    self.stack.push(Frame::FlowMap {
                        first: true,
                        awaiting_value: false,
                    });
                }
                Ok(())
            }
            EventData::MappingEnd => {
                match self.stack.pop() {
                    Some(Frame::FlowMap { .. }) => self.write_raw("}"),
                    Some(Frame::BlockMap { .. }) | None => {}
                    Some(other) => self.stack.push(other),
                }
                Ok(())
            }
        }
    }

    fn in_flow(&self) -> bool {
        self.stack.last().is_some_and(Frame::in_flow)
    }

    fn current_indent(&self) -> usize {
        self.stack.last().map_or(0, Frame::indent)
    }

    /// Write the separator/indent that precedes a node, given the
    /// enclosing collection (the frame on top of the stack *before* this
    /// node's own frame, if any, is pushed). `starts_own_line` is true
    /// when the node about to be written is itself a block collection,
    /// which will supply its own leading newline/indent; this suppresses
    /// the usual trailing space after a mapping value's `:`.
    fn node_prefix(&mut self, starts_own_line: bool) {
        if self.stack.is_empty() && std::mem::take(&mut self.after_document_marker) && !starts_own_line {
            self.write_raw(" ");
        }
        match self.stack.last_mut() {
            None => {}
            Some(Frame::BlockSeq { indent, first }) => {
                let indent = *indent;
                *first = false;
                self.start_line(indent);
                self.write_raw("- ");
            }
            Some(Frame::FlowSeq { first }) => {
                if !*first {
                    self.write_raw(", ");
                }
                *first = false;
            }
            Some(Frame::BlockMap {
                indent,
                first,
                awaiting_value,
            }) => {
                if *awaiting_value {
                    *awaiting_value = false;
                    self.write_raw(if starts_own_line { ":" } else { ": " });
                } else {
                    let indent = *indent;
                    *first = false;
                    *awaiting_value = true;
                    self.start_line(indent);
                }
            }
            Some(Frame::FlowMap {
                first,
                awaiting_value,
            }) => {
                if *awaiting_value {
                    *awaiting_value = false;
                    self.write_raw(": ");
                } else {
                    if !*first {
                        self.write_raw(", ");
                    }
                    *first = false;
                    *awaiting_value = true;
                }
            }
        }
    }

    fn write_properties(&mut self, anchor: Option<&str>, tag: Option<&str>) {
        if let Some(anchor) = anchor {
            self.write_raw("&");
            self.write_raw(anchor);
            self.write_raw(" ");
        }
        if let Some(tag) = tag {
            if !tag.is_empty() {
                self.write_raw("!<");
                self.write_raw(tag);
                self.write_raw("> ");
            }
        }
    }

    fn write_scalar(&mut self, value: &str, style: ScalarStyle, in_flow: bool) {
        match style {
            ScalarStyle::Plain | ScalarStyle::Any if is_safe_plain(value, in_flow) => {
                self.write_raw(value);
            }
            ScalarStyle::SingleQuoted if is_safe_single_quoted(value) => {
                self.write_raw("'");
                self.write_raw(&value.replace('\'', "''"));
                self.write_raw("'");
            }
            ScalarStyle::Literal if !in_flow => self.write_block_scalar(value, false),
            ScalarStyle::Folded if !in_flow => self.write_block_scalar(value, true),
            _ => self.write_double_quoted(value),
        }
    }

    /// Writes a literal (`|`) or folded (`>`) block scalar whose decoded
    /// value, once re-scanned, is exactly `value` again.
    ///
    /// Folded scanning turns a single line break between two non-blank
    /// lines into a space and collapses a run of `k` consecutive raw
    /// line breaks into `k - 1` literal ones (see `scan_block_scalar` in
    /// the scanner); to get `m` literal breaks back out of a fold we
    /// therefore have to write `m + 1` raw breaks in. Since every
    /// surviving content run here is written as a single unwrapped
    /// physical line, no *unintended* single-break fold is ever
    /// introduced. Literal scanning never folds, so its runs are
    /// written back 1:1.
    fn write_block_scalar(&mut self, value: &str, folded: bool) {
        let indent = self.current_indent() + 2;
        self.write_raw(if folded { ">" } else { "|" });

        if matches!(value.chars().next(), Some(' ' | '\n')) {
            self.write_raw("2");
        }

        let trailing_breaks = value.chars().rev().take_while(|&c| c == '\n').count();
        let chomp = if trailing_breaks == 0 {
            "-"
        } else if trailing_breaks >= 2 {
            "+"
        } else {
            ""
        };
        self.write_raw(chomp);
        self.write_raw("\n");

        let body = &value[..value.len() - trailing_breaks];
        if body.is_empty() {
            if trailing_breaks > 0 {
                self.write_raw(&"\n".repeat(trailing_breaks));
            }
            return;
        }

        let mut at_line_start_local = true;
        let mut chars = body.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch == '\n' {
                let mut run = 1usize;
                while chars.peek() == Some(&'\n') {
                    chars.next();
                    run += 1;
                }
                let raw_breaks = if folded { run + 1 } else { run };
                self.write_raw(&"\n".repeat(raw_breaks));
                at_line_start_local = true;
            } else {
                if at_line_start_local {
                    self.write_raw(&" ".repeat(indent));
                    at_line_start_local = false;
                }
                let mut buf = [0u8; 4];
                self.write_raw(ch.encode_utf8(&mut buf));
            }
        }

        self.write_raw("\n");
        if trailing_breaks >= 2 {
            self.write_raw(&"\n".repeat(trailing_breaks - 1));
        }
    }

    fn write_double_quoted(&mut self, value: &str) {
        self.write_raw("\"");
        let mut escaped = String::with_capacity(value.len());
        for ch in value.chars() {
            match ch {
                '\\' => escaped.push_str("\\\\"),
                '"' => escaped.push_str("\\\""),
                '\n' => escaped.push_str("\\n"),
                '\t' => escaped.push_str("\\t"),
                '\r' => escaped.push_str("\\r"),
                '\0' => escaped.push_str("\\0"),
                c if (c as u32) < 0x20 => escaped.push_str(&format!("\\x{:02x}", c as u32)),
                c => escaped.push(c),
            }
        }
        self.write_raw(&escaped);
        self.write_raw("\"");
    }

    fn start_line(&mut self, indent: usize) {
        if !self.at_line_start {
            self.write_raw("\n");
        }
        if indent > 0 {
            self.write_raw(&" ".repeat(indent));
        }
    }

    fn write_raw(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.writer.buffer.push_str(s);
        self.at_line_start = s.ends_with('\n');
    }

    fn emit_document_start(
        &mut self,
        version_directive: Option<crate::VersionDirective>,
        tag_directives: &[crate::TagDirective],
        implicit: bool,
    ) -> Result<(), EmitterError> {
        self.stack.clear();
        let custom_tags: Vec<_> = tag_directives
            .iter()
            .filter(|d| {
                !DEFAULT_TAG_HANDLES
                    .iter()
                    .any(|(h, p)| *h == d.handle && *p == d.prefix)
            })
            .collect();

        if let Some(version) = version_directive {
            self.write_raw(&format!("%YAML {}.{}\n", version.major, version.minor));
        }
        for directive in &custom_tags {
            self.write_raw(&format!("%TAG {} {}\n", directive.handle, directive.prefix));
        }

        let need_marker = !implicit
            || self.documents_emitted > 0
            || version_directive.is_some()
            || !custom_tags.is_empty();
        if need_marker {
            self.start_line(0);
            self.write_raw("---");
            self.after_document_marker = true;
        }
        self.documents_emitted += 1;
        Ok(())
    }

    fn emit_document_end(&mut self, implicit: bool) -> Result<(), EmitterError> {
        if !self.at_line_start {
            self.write_raw("\n");
        }
        if !implicit {
            self.write_raw("...\n");
        }
        Ok(())
    }
}

fn is_safe_plain(value: &str, in_flow: bool) -> bool {
    if value.is_empty() || value.contains('\n') {
        return false;
    }
    let first = value.chars().next().unwrap();
    if matches!(
        first,
        '-' | '?' | ':' | ',' | '[' | ']' | '{' | '}' | '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%' | '@' | '`'
    ) {
        return false;
    }
    if first.is_whitespace() {
        return false;
    }
    if value.starts_with(' ') || value.ends_with(' ') {
        return false;
    }
    if value == "---" || value == "..." {
        return false;
    }
    if value.contains(": ") || value.ends_with(':') || value.contains(" #") {
        return false;
    }
    if in_flow && value.contains([',', '[', ']', '{', '}']) {
        return false;
    }
    true
}

fn is_safe_single_quoted(value: &str) -> bool {
    !value.is_empty() && !value.contains('\n') && value.chars().all(|c| !c.is_control())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MappingStyle, Parser, SequenceStyle};
    use pretty_assertions::assert_eq;

    fn parse_all(input: &str) -> Vec<Event> {
        let mut parser = Parser::new();
        parser.set_input_string(input.as_bytes());
        let mut events = Vec::new();
        loop {
            let event = parser.parse().unwrap();
            let done = matches!(event.data, EventData::StreamEnd);
            events.push(event);
            if done {
                break;
            }
        }
        events
    }

    fn emit_all(events: &[Event]) -> String {
        let mut out = String::new();
        let mut emitter = Emitter::new();
        emitter.set_output_string(&mut out);
        for event in events {
            emitter.emit(event).unwrap();
        }
        out
    }

    fn strip_marks(mut events: Vec<Event>) -> Vec<EventData> {
        events.drain(..).map(|e| e.data).collect()
    }

    #[test]
    fn roundtrip_simple_mapping() {
        let events = parse_all("a: 1\n");
        let text = emit_all(&events);
        let reparsed = parse_all(&text);
        assert_eq!(strip_marks(events), strip_marks(reparsed));
    }

    #[test]
    fn roundtrip_flow_sequence() {
        let events = parse_all("[1, 2, 3]\n");
        let text = emit_all(&events);
        let reparsed = parse_all(&text);
        assert_eq!(strip_marks(events), strip_marks(reparsed));
    }

    #[test]
    fn roundtrip_nested_block() {
        let events = parse_all("a:\n  - 1\n  - 2\nb: c\n");
        let text = emit_all(&events);
        let reparsed = parse_all(&text);
        assert_eq!(strip_marks(events), strip_marks(reparsed));
    }

    #[test]
    fn roundtrip_anchors_and_aliases() {
        let events = parse_all("&a [*a]\n");
        let text = emit_all(&events);
        let reparsed = parse_all(&text);
        assert_eq!(strip_marks(events), strip_marks(reparsed));
    }

    #[test]
    fn roundtrip_quoted_values_needing_escapes() {
        let events = parse_all("k: \"line1\\nline2\"\n");
        let text = emit_all(&events);
        let reparsed = parse_all(&text);
        assert_eq!(strip_marks(events), strip_marks(reparsed));
    }

    #[test]
    fn roundtrip_literal_scalar() {
        let events = parse_all("note: |\n  line one\n  line two\n");
        let text = emit_all(&events);
        let reparsed = parse_all(&text);
        assert_eq!(strip_marks(events), strip_marks(reparsed));
    }

    #[test]
    fn roundtrip_folded_scalar_with_blank_line() {
        let events = parse_all("note: >\n  para one\n  still one\n\n  para two\n");
        let text = emit_all(&events);
        let reparsed = parse_all(&text);
        assert_eq!(strip_marks(events), strip_marks(reparsed));
    }

    #[test]
    fn roundtrip_literal_scalar_keep_chomping() {
        let events = parse_all("note: |+\n  kept\n\n\n");
        let text = emit_all(&events);
        let reparsed = parse_all(&text);
        assert_eq!(strip_marks(events), strip_marks(reparsed));
    }

    #[test]
    fn roundtrip_folded_scalar_strip_chomping() {
        let events = parse_all("note: >-\n  no trailing break\n");
        let text = emit_all(&events);
        let reparsed = parse_all(&text);
        assert_eq!(strip_marks(events), strip_marks(reparsed));
    }

    #[test]
    fn scalar_with_colon_space_is_quoted() {
        assert!(!is_safe_plain("a: b", false));
        assert!(is_safe_plain("a:b", false));
    }

    #[test]
    fn flow_indicator_forces_quoting_in_flow_only() {
        assert!(!is_safe_plain("a,b", true));
        assert!(is_safe_plain("a,b", false));
    }

    #[test]
    fn empty_mapping_roundtrips() {
        let events = vec![
            Event::stream_start(Encoding::Utf8),
            Event::document_start(None, &[], true),
            Event::mapping_start(None, Some(crate::MAP_TAG), true, MappingStyle::Flow),
            Event::mapping_end(),
            Event::document_end(true),
            Event::stream_end(),
        ];
        let text = emit_all(&events);
        let reparsed = parse_all(&text);
        let reparsed_data = strip_marks(reparsed);
        assert!(matches!(reparsed_data[2], EventData::MappingStart { .. }));
        assert!(matches!(reparsed_data[3], EventData::MappingEnd));
    }

    #[test]
    fn second_document_always_gets_explicit_marker() {
        let events = vec![
            Event::stream_start(Encoding::Utf8),
            Event::document_start(None, &[], true),
            Event::scalar(None, None, "a", true, false, ScalarStyle::Plain),
            Event::document_end(true),
            Event::document_start(None, &[], true),
            Event::scalar(None, None, "b", true, false, ScalarStyle::Plain),
            Event::document_end(true),
            Event::stream_end(),
        ];
        let text = emit_all(&events);
        assert_eq!(text, "a\n--- b\n");
    }

    #[test]
    fn sequence_style_not_flow_renders_block() {
        let events = vec![
            Event::stream_start(Encoding::Utf8),
            Event::document_start(None, &[], true),
            Event::sequence_start(None, Some(crate::SEQ_TAG), true, SequenceStyle::Block),
            Event::scalar(None, None, "a", true, false, ScalarStyle::Plain),
            Event::scalar(None, None, "b", true, false, ScalarStyle::Plain),
            Event::sequence_end(),
            Event::document_end(true),
            Event::stream_end(),
        ];
        let text = emit_all(&events);
        assert_eq!(text, "- a\n- b\n");
    }
}
