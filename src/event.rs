//! The event model produced by the [parser](crate::parser).

use crate::{
    Encoding, MappingStyle, Mark, ScalarStyle, SequenceStyle, TagDirective, VersionDirective,
};

/// A single structural event, with the source span it was derived from.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Event {
    /// The event payload.
    pub data: EventData,
    /// The start of the event.
    pub start_mark: Mark,
    /// The end of the event.
    pub end_mark: Mark,
}

/// The payload of an [`Event`].
#[derive(Debug, Clone, PartialEq)]
pub enum EventData {
    /// The start of the stream. Always the first event.
    StreamStart {
        /// The encoding the reader settled on.
        encoding: Encoding,
    },
    /// The end of the stream. Always the last event.
    StreamEnd,
    /// The start of a document.
    DocumentStart {
        /// The `%YAML` directive, if any.
        version_directive: Option<VersionDirective>,
        /// The `%TAG` directives in effect for this document (including the
        /// two defaults, `!` and `!!`).
        tag_directives: Vec<TagDirective>,
        /// Whether `---` was actually present.
        implicit: bool,
    },
    /// The end of a document.
    DocumentEnd {
        /// Whether `...` was actually present.
        implicit: bool,
    },
    /// An alias reference, `*name`.
    Alias {
        /// The referenced anchor.
        anchor: String,
    },
    /// A scalar value.
    Scalar {
        /// The `&name` attached to this node, if any.
        anchor: Option<String>,
        /// The resolved tag, if any.
        tag: Option<String>,
        /// The decoded scalar content.
        value: String,
        /// True if the tag may be omitted because the plain-scalar
        /// resolution rules would recover it.
        plain_implicit: bool,
        /// True if the tag may be omitted for any non-plain style.
        quoted_implicit: bool,
        /// How the scalar was written.
        style: ScalarStyle,
    },
    /// The start of a sequence.
    SequenceStart {
        /// The `&name` attached to this node, if any.
        anchor: Option<String>,
        /// The resolved tag, if any.
        tag: Option<String>,
        /// True if the tag may be omitted.
        implicit: bool,
        /// Block or flow.
        style: SequenceStyle,
    },
    /// The end of a sequence.
    SequenceEnd,
    /// The start of a mapping.
    MappingStart {
        /// The `&name` attached to this node, if any.
        anchor: Option<String>,
        /// The resolved tag, if any.
        tag: Option<String>,
        /// True if the tag may be omitted.
        implicit: bool,
        /// Block or flow.
        style: MappingStyle,
    },
    /// The end of a mapping.
    MappingEnd,
}

impl Event {
    pub(crate) fn new(data: EventData) -> Self {
        Self {
            data,
            start_mark: Mark::default(),
            end_mark: Mark::default(),
        }
    }

    /// Build a STREAM-START event with zeroed marks.
    pub fn stream_start(encoding: Encoding) -> Self {
        Self::new(EventData::StreamStart { encoding })
    }

    /// Build a STREAM-END event with zeroed marks.
    pub fn stream_end() -> Self {
        Self::new(EventData::StreamEnd)
    }

    /// Build a DOCUMENT-START event with zeroed marks.
    ///
    /// `implicit` is a stylistic hint; the emitter may ignore it.
    pub fn document_start(
        version_directive: Option<VersionDirective>,
        tag_directives: &[TagDirective],
        implicit: bool,
    ) -> Self {
        Self::new(EventData::DocumentStart {
            version_directive,
            tag_directives: tag_directives.to_vec(),
            implicit,
        })
    }

    /// Build a DOCUMENT-END event with zeroed marks.
    pub fn document_end(implicit: bool) -> Self {
        Self::new(EventData::DocumentEnd { implicit })
    }

    /// Build an ALIAS event with zeroed marks.
    pub fn alias(anchor: &str) -> Self {
        Self::new(EventData::Alias {
            anchor: anchor.to_string(),
        })
    }

    /// Build a SCALAR event with zeroed marks.
    ///
    /// Either `tag` or one of `plain_implicit`/`quoted_implicit` must be set
    /// for a round-trip emitter to be able to recover the node's type.
    pub fn scalar(
        anchor: Option<&str>,
        tag: Option<&str>,
        value: &str,
        plain_implicit: bool,
        quoted_implicit: bool,
        style: ScalarStyle,
    ) -> Self {
        Self::new(EventData::Scalar {
            anchor: anchor.map(str::to_string),
            tag: tag.map(str::to_string),
            value: value.to_string(),
            plain_implicit,
            quoted_implicit,
            style,
        })
    }

    /// Build a SEQUENCE-START event with zeroed marks.
    pub fn sequence_start(
        anchor: Option<&str>,
        tag: Option<&str>,
        implicit: bool,
        style: SequenceStyle,
    ) -> Self {
        Self::new(EventData::SequenceStart {
            anchor: anchor.map(str::to_string),
            tag: tag.map(str::to_string),
            implicit,
            style,
        })
    }

    /// Build a SEQUENCE-END event with zeroed marks.
    pub fn sequence_end() -> Self {
        Self::new(EventData::SequenceEnd)
    }

    /// Build a MAPPING-START event with zeroed marks.
    pub fn mapping_start(
        anchor: Option<&str>,
        tag: Option<&str>,
        implicit: bool,
        style: MappingStyle,
    ) -> Self {
        Self::new(EventData::MappingStart {
            anchor: anchor.map(str::to_string),
            tag: tag.map(str::to_string),
            implicit,
            style,
        })
    }

    /// Build a MAPPING-END event with zeroed marks.
    pub fn mapping_end() -> Self {
        Self::new(EventData::MappingEnd)
    }
}
