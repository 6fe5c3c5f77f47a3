//! Flushes the emitter's accumulated output to a caller-supplied sink.

use std::io::Write;

use crate::WriterError;

enum Output<'w> {
    None,
    String(&'w mut String),
    Handler(&'w mut dyn Write),
}

/// The emitter's output sink: either an owned string or a generic
/// [`std::io::Write`].
///
/// Mirrors [`Reader`](crate::Reader) on the other end of the pipeline: the
/// emitter writes characters into [`Writer::buffer`] and calls [`flush`]
/// periodically so the buffer never grows unbounded on long documents.
///
/// [`flush`]: Writer::flush
#[non_exhaustive]
pub struct Writer<'w> {
    output: Output<'w>,
    /// Accumulated UTF-8 text not yet flushed to the sink.
    pub(crate) buffer: String,
}

impl<'w> Default for Writer<'w> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'w> Writer<'w> {
    /// Create a writer with no output sink yet attached.
    pub fn new() -> Self {
        Writer {
            output: Output::None,
            buffer: String::new(),
        }
    }

    /// Accumulate output into a caller-owned `String`.
    pub fn set_output_string(&mut self, output: &'w mut String) {
        assert!(matches!(self.output, Output::None), "output already set");
        self.output = Output::String(output);
    }

    /// Attach a generic writer as the output sink.
    pub fn set_output(&mut self, output: &'w mut dyn Write) {
        assert!(matches!(self.output, Output::None), "output already set");
        self.output = Output::Handler(output);
    }

    /// Write the accumulated buffer to the sink and clear it.
    pub(crate) fn flush(&mut self) -> Result<(), WriterError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        match &mut self.output {
            Output::None => return Err(WriterError::NoOutput),
            Output::String(out) => out.push_str(&self.buffer),
            Output::Handler(out) => out.write_all(self.buffer.as_bytes())?,
        }
        self.buffer.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flush_appends_to_string_sink() {
        let mut out = String::new();
        let mut writer = Writer::new();
        writer.set_output_string(&mut out);
        writer.buffer.push_str("a: 1\n");
        writer.flush().unwrap();
        assert_eq!(out, "a: 1\n");
        assert!(writer.buffer.is_empty());
    }

    #[test]
    fn flush_without_sink_errors() {
        let mut writer = Writer::new();
        writer.buffer.push_str("x");
        assert!(matches!(writer.flush(), Err(WriterError::NoOutput)));
    }
}
