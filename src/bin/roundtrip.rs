//! Parses a YAML file, emits it back out, re-parses the result, and
//! confirms the two event streams agree (ignoring source marks).
//!
//! Usage: `roundtrip <file.yaml>` (reads stdin if no argument given).

use std::env;
use std::fs::File;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use yamele::{Emitter, Event, EventData, Parser};

fn parse_all(input: &[u8]) -> Result<Vec<Event>, String> {
    let mut parser = Parser::new();
    parser.set_input_string(input);
    let mut events = Vec::new();
    loop {
        let event = parser.parse().map_err(|err| err.diagnostic())?;
        let done = matches!(event.data, EventData::StreamEnd);
        events.push(event);
        if done {
            return Ok(events);
        }
    }
}

fn run(input: &[u8]) -> Result<(), String> {
    let events = parse_all(input)?;

    let mut text = String::new();
    let mut emitter = Emitter::new();
    emitter.set_output_string(&mut text);
    for event in &events {
        emitter.emit(event).map_err(|err| format!("emitter: {err}"))?;
    }

    let reparsed = parse_all(text.as_bytes())?;

    let original: Vec<&EventData> = events.iter().map(|e| &e.data).collect();
    let roundtripped: Vec<&EventData> = reparsed.iter().map(|e| &e.data).collect();

    if original == roundtripped {
        Ok(())
    } else {
        Err(format!(
            "event streams diverge after round-trip\n--- re-emitted text ---\n{text}--- original events ---\n{original:#?}\n--- round-tripped events ---\n{roundtripped:#?}"
        ))
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

    match run(&buffer) {
        Ok(()) => ExitCode::SUCCESS,
        Err(diagnostic) => {
            let _ = writeln!(io::stderr(), "{diagnostic}");
            ExitCode::FAILURE
        }
    }
}
