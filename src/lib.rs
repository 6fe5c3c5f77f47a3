//! `yamele` is a YAML 1.1 scanner and parser: it turns a byte stream into
//! a flat sequence of structural [events](crate::event::Event), by way of
//! an intermediate [token](crate::token::Token) stream.
//!
//! The pipeline is pull-driven and one-way:
//!
//! ```text
//! bytes -> Reader -> code points -> Scanner -> Tokens -> Parser -> Events
//! ```
//!
//! Composing a node graph out of the event stream (a "loader" or
//! "composer" in libyaml's terminology) and writing events back out as
//! YAML text (an emitter) are downstream concerns; this crate ships a
//! deliberately minimal [`emitter`] sufficient to round-trip an event
//! stream, but no composer.
//!
//! ```
//! use yamele::{Parser, EventData};
//!
//! let mut parser = Parser::new();
//! parser.set_input_string(b"a: 1\n");
//!
//! let mut values = Vec::new();
//! loop {
//!     let event = parser.parse().unwrap();
//!     if let EventData::Scalar { value, .. } = &event.data {
//!         values.push(value.clone());
//!     }
//!     if matches!(event.data, EventData::StreamEnd) {
//!         break;
//!     }
//! }
//! assert_eq!(values, vec!["a".to_string(), "1".to_string()]);
//! ```
#![warn(clippy::pedantic)]
#![allow(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::fn_params_excessive_bools,
    clippy::manual_range_contains,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::struct_excessive_bools,
    clippy::too_many_arguments,
    clippy::too_many_lines,
    clippy::unnecessary_wraps,
    clippy::match_wildcard_for_single_variants
)]
#![deny(unsafe_code)]

mod macros;

pub mod emitter;
mod error;
mod event;
mod parser;
mod reader;
mod scanner;
mod token;
mod writer;

pub use crate::emitter::Emitter;
pub use crate::error::*;
pub use crate::event::*;
pub use crate::parser::Parser;
pub use crate::reader::Reader;
pub use crate::scanner::Scanner;
pub use crate::token::*;
pub use crate::writer::Writer;

pub(crate) const INPUT_RAW_BUFFER_SIZE: usize = 16384;
pub(crate) const OUTPUT_BUFFER_SIZE: usize = 16384;

/// The simple-key lookahead window: no candidate key may span more
/// characters than this before it is considered stale.
pub(crate) const MAX_SIMPLE_KEY_LENGTH: usize = 1024;

/// The tag `!!null` with the only possible value: `null`.
pub const NULL_TAG: &str = "tag:yaml.org,2002:null";
/// The tag `!!bool` with the values: `true` and `false`.
pub const BOOL_TAG: &str = "tag:yaml.org,2002:bool";
/// The tag `!!str` for string values.
pub const STR_TAG: &str = "tag:yaml.org,2002:str";
/// The tag `!!int` for integer values.
pub const INT_TAG: &str = "tag:yaml.org,2002:int";
/// The tag `!!float` for float values.
pub const FLOAT_TAG: &str = "tag:yaml.org,2002:float";
/// The tag `!!timestamp` for date and time values.
pub const TIMESTAMP_TAG: &str = "tag:yaml.org,2002:timestamp";

/// The tag `!!seq` is used to denote sequences.
pub const SEQ_TAG: &str = "tag:yaml.org,2002:seq";
/// The tag `!!map` is used to denote mappings.
pub const MAP_TAG: &str = "tag:yaml.org,2002:map";

/// The default scalar tag is `!!str`.
pub const DEFAULT_SCALAR_TAG: &str = STR_TAG;
/// The default sequence tag is `!!seq`.
pub const DEFAULT_SEQUENCE_TAG: &str = SEQ_TAG;
/// The default mapping tag is `!!map`.
pub const DEFAULT_MAPPING_TAG: &str = MAP_TAG;

/// The `%YAML` directive data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct VersionDirective {
    /// The major version number.
    pub major: i32,
    /// The minor version number.
    pub minor: i32,
}

/// A single `%TAG` directive: a handle and the prefix it expands to.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct TagDirective {
    /// The tag handle, e.g. `!`, `!!`, or `!e!`.
    pub handle: String,
    /// The tag prefix the handle expands to.
    pub prefix: String,
}

/// The stream encoding, detected from a byte-order mark or set
/// explicitly before the first byte is read.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[non_exhaustive]
pub enum Encoding {
    /// Detect the encoding from the input's byte-order mark, defaulting
    /// to UTF-8 if none is present.
    #[default]
    Any = 0,
    /// UTF-8.
    Utf8 = 1,
    /// UTF-16, little-endian.
    Utf16Le = 2,
    /// UTF-16, big-endian.
    Utf16Be = 3,
}

/// Line break style, as observed or to be emitted.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[non_exhaustive]
pub enum Break {
    /// Let the implementation choose.
    #[default]
    Any = 0,
    /// `\r` (Mac style).
    Cr = 1,
    /// `\n` (Unix style).
    Ln = 2,
    /// `\r\n` (DOS style).
    CrLn = 3,
}

/// How a scalar was (or should be) written.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[non_exhaustive]
pub enum ScalarStyle {
    /// Let the emitter choose the style.
    #[default]
    Any = 0,
    /// Unquoted.
    Plain = 1,
    /// `'...'`, with `''` as the only escape.
    SingleQuoted = 2,
    /// `"..."`, with the full YAML 1.1 escape set.
    DoubleQuoted = 3,
    /// `|`-introduced literal block scalar.
    Literal = 4,
    /// `>`-introduced folded block scalar.
    Folded = 5,
}

/// Block or flow, for sequences.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[non_exhaustive]
pub enum SequenceStyle {
    /// Let the emitter choose the style.
    #[default]
    Any = 0,
    /// `- a\n- b\n`.
    Block = 1,
    /// `[a, b]`.
    Flow = 2,
}

/// Block or flow, for mappings.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[non_exhaustive]
pub enum MappingStyle {
    /// Let the emitter choose the style.
    #[default]
    Any = 0,
    /// `a: b\n`.
    Block = 1,
    /// `{a: b}`.
    Flow = 2,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn collect(input: &str) -> Vec<EventData> {
        let mut parser = Parser::new();
        parser.set_input_string(input.as_bytes());
        let mut events = Vec::new();
        loop {
            let event = parser.parse().unwrap();
            let done = matches!(event.data, EventData::StreamEnd);
            events.push(event.data);
            if done {
                break;
            }
        }
        events
    }

    #[test]
    fn simple_mapping() {
        let events = collect("a: 1\n");
        assert!(matches!(events[0], EventData::StreamStart { .. }));
        assert!(matches!(events[1], EventData::DocumentStart { .. }));
        assert!(matches!(events[2], EventData::MappingStart { .. }));
        assert!(matches!(
            &events[3],
            EventData::Scalar { value, .. } if value == "a"
        ));
        assert!(matches!(
            &events[4],
            EventData::Scalar { value, .. } if value == "1"
        ));
        assert!(matches!(events[5], EventData::MappingEnd));
    }

    #[test]
    fn flow_sequence() {
        let events = collect("[1, 2, 3]\n");
        let EventData::SequenceStart { style, .. } = &events[2] else {
            panic!("expected sequence start, got {:?}", events[2]);
        };
        assert_eq!(*style, SequenceStyle::Flow);
    }
}
