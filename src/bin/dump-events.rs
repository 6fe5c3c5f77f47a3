//! Parses a YAML file and prints one line per event, in the compact
//! `+STR` / `-STR` / `+DOC` / `=VAL` notation used by the upstream YAML
//! test suite.
//!
//! Usage: `dump-events <file.yaml>` (reads stdin if no argument given).

use std::env;
use std::fs::File;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use yamele::{EventData, Parser, ScalarStyle};

fn print_escaped(stdout: &mut dyn Write, s: &str) {
    for byte in s.bytes() {
        let repr: &[u8] = match byte {
            b'\\' => b"\\\\",
            b'\0' => b"\\0",
            0x08 => b"\\b",
            b'\n' => b"\\n",
            b'\r' => b"\\r",
            b'\t' => b"\\t",
            other => {
                let _ = stdout.write_all(std::slice::from_ref(&other));
                continue;
            }
        };
        let _ = stdout.write_all(repr);
    }
}

fn run(input: &[u8], stdout: &mut dyn Write) -> Result<(), String> {
    let mut parser = Parser::new();
    parser.set_input_string(input);
    loop {
        let event = parser.parse().map_err(|err| err.diagnostic())?;
        let is_end = matches!(event.data, EventData::StreamEnd);
        match &event.data {
            EventData::StreamStart { .. } => {
                let _ = writeln!(stdout, "+STR");
            }
            EventData::StreamEnd => {
                let _ = writeln!(stdout, "-STR");
            }
            EventData::DocumentStart { implicit, .. } => {
                let _ = write!(stdout, "+DOC");
                if !*implicit {
                    let _ = write!(stdout, " ---");
                }
                let _ = writeln!(stdout);
            }
            EventData::DocumentEnd { implicit } => {
                let _ = write!(stdout, "-DOC");
                if !*implicit {
                    let _ = write!(stdout, " ...");
                }
                let _ = writeln!(stdout);
            }
            EventData::Alias { anchor } => {
                let _ = writeln!(stdout, "=ALI *{anchor}");
            }
            EventData::Scalar {
                anchor,
                tag,
                value,
                style,
                ..
            } => {
                let _ = write!(stdout, "=VAL");
                if let Some(anchor) = anchor {
                    let _ = write!(stdout, " &{anchor}");
                }
                if let Some(tag) = tag {
                    let _ = write!(stdout, " <{tag}>");
                }
                let marker = match style {
                    ScalarStyle::Plain | ScalarStyle::Any => ":",
                    ScalarStyle::SingleQuoted => "'",
                    ScalarStyle::DoubleQuoted => "\"",
                    ScalarStyle::Literal => "|",
                    ScalarStyle::Folded => ">",
                };
                let _ = write!(stdout, " {marker}");
                print_escaped(stdout, value);
                let _ = writeln!(stdout);
            }
            EventData::SequenceStart { anchor, tag, .. } => {
                let _ = write!(stdout, "+SEQ");
                if let Some(anchor) = anchor {
                    let _ = write!(stdout, " &{anchor}");
                }
                if let Some(tag) = tag {
                    let _ = write!(stdout, " <{tag}>");
                }
                let _ = writeln!(stdout);
            }
            EventData::SequenceEnd => {
                let _ = writeln!(stdout, "-SEQ");
            }
            EventData::MappingStart { anchor, tag, .. } => {
                let _ = write!(stdout, "+MAP");
                if let Some(anchor) = anchor {
                    let _ = write!(stdout, " &{anchor}");
                }
                if let Some(tag) = tag {
                    let _ = write!(stdout, " <{tag}>");
                }
                let _ = writeln!(stdout);
            }
            EventData::MappingEnd => {
                let _ = writeln!(stdout, "-MAP");
            }
        }
        if is_end {
            return Ok(());
        }
    }
}

fn main() -> ExitCode {
    let mut args = env::args_os().skip(1);
    let mut buffer = Vec::new();
    let read_result = match args.next() {
        Some(path) => File::open(path).and_then(|mut f| f.read_to_end(&mut buffer)),
        None => io::stdin().read_to_end(&mut buffer),
    };
    if let Err(err) = read_result {
        let _ = writeln!(io::stderr(), "reader: {err}");
        return ExitCode::FAILURE;
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match run(&buffer, &mut handle) {
        Ok(()) => ExitCode::SUCCESS,
        Err(diagnostic) => {
            let _ = writeln!(io::stderr(), "{diagnostic}");
            ExitCode::FAILURE
        }
    }
}
