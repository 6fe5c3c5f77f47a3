//! The token model produced by the [scanner](crate::scanner).

use crate::{Encoding, Mark, ScalarStyle};

/// A single lexical token, with the source span it was scanned from.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Token {
    /// The token payload.
    pub data: TokenData,
    /// The start of the token.
    pub start_mark: Mark,
    /// The end of the token.
    pub end_mark: Mark,
}

/// The payload of a [`Token`].
#[derive(Debug, Clone, PartialEq)]
pub enum TokenData {
    /// STREAM-START.
    StreamStart {
        /// The encoding the reader settled on.
        encoding: Encoding,
    },
    /// STREAM-END.
    StreamEnd,
    /// A `%YAML` directive.
    VersionDirective {
        /// The major version component.
        major: i32,
        /// The minor version component.
        minor: i32,
    },
    /// A `%TAG` directive.
    TagDirective {
        /// The tag handle, e.g. `!`, `!!`, or `!e!`.
        handle: String,
        /// The tag prefix the handle expands to.
        prefix: String,
    },
    /// `---`.
    DocumentStart,
    /// `...`.
    DocumentEnd,
    /// A synthesized block-sequence opener.
    BlockSequenceStart,
    /// A synthesized block-mapping opener.
    BlockMappingStart,
    /// A synthesized block collection closer.
    BlockEnd,
    /// `[`.
    FlowSequenceStart,
    /// `]`.
    FlowSequenceEnd,
    /// `{`.
    FlowMappingStart,
    /// `}`.
    FlowMappingEnd,
    /// `-` (block sequence entry).
    BlockEntry,
    /// `,` (flow collection entry separator).
    FlowEntry,
    /// A synthesized or explicit (`?`) mapping key marker.
    Key,
    /// `:`.
    Value,
    /// `*name`.
    Alias {
        /// The referenced anchor.
        value: String,
    },
    /// `&name`.
    Anchor {
        /// The anchor name.
        value: String,
    },
    /// A tag property, e.g. `!!str`, `!local`, `!<verbatim>`.
    Tag {
        /// The tag handle (may be empty for a verbatim `!<...>` tag).
        handle: String,
        /// The tag suffix.
        suffix: String,
    },
    /// Any scalar, in any style.
    Scalar {
        /// The decoded scalar content.
        value: String,
        /// How the scalar was written.
        style: ScalarStyle,
    },
}
