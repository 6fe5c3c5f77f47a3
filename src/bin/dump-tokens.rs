//! Scans a YAML file and prints one line per token.
//!
//! Usage: `dump-tokens <file.yaml>` (reads stdin if no argument given).

use std::env;
use std::fs::File;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use yamele::{Scanner, TokenData};

fn format_token(data: &TokenData) -> String {
    match data {
        TokenData::StreamStart { encoding } => format!("STREAM-START {encoding:?}"),
        TokenData::StreamEnd => "STREAM-END".to_string(),
        TokenData::VersionDirective { major, minor } => {
            format!("VERSION-DIRECTIVE {major}.{minor}")
        }
        TokenData::TagDirective { handle, prefix } => format!("TAG-DIRECTIVE {handle} {prefix}"),
        TokenData::DocumentStart => "DOCUMENT-START".to_string(),
        TokenData::DocumentEnd => "DOCUMENT-END".to_string(),
        TokenData::BlockSequenceStart => "BLOCK-SEQUENCE-START".to_string(),
        TokenData::BlockMappingStart => "BLOCK-MAPPING-START".to_string(),
        TokenData::BlockEnd => "BLOCK-END".to_string(),
        TokenData::FlowSequenceStart => "FLOW-SEQUENCE-START".to_string(),
        TokenData::FlowSequenceEnd => "FLOW-SEQUENCE-END".to_string(),
        TokenData::FlowMappingStart => "FLOW-MAPPING-START".to_string(),
        TokenData::FlowMappingEnd => "FLOW-MAPPING-END".to_string(),
        TokenData::BlockEntry => "BLOCK-ENTRY".to_string(),
        TokenData::FlowEntry => "FLOW-ENTRY".to_string(),
        TokenData::Key => "KEY".to_string(),
        TokenData::Value => "VALUE".to_string(),
        TokenData::Alias { value } => format!("ALIAS *{value}"),
        TokenData::Anchor { value } => format!("ANCHOR &{value}"),
        TokenData::Tag { handle, suffix } => format!("TAG {handle}{suffix}"),
        TokenData::Scalar { value, style } => format!("SCALAR {style:?} {value:?}"),
    }
}

fn run(input: &[u8], stdout: &mut dyn Write) -> Result<(), String> {
    let mut scanner = Scanner::new();
    scanner.set_input_string(input);
    loop {
        let token = scanner.scan().map_err(|err| err.diagnostic())?;
        let is_end = matches!(token.data, TokenData::StreamEnd);
        let _ = writeln!(
            stdout,
            "{}:{} {}",
            token.start_mark.line + 1,
            token.start_mark.column + 1,
            format_token(&token.data)
        );
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
