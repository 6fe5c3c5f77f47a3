use criterion::{criterion_group, criterion_main, Criterion};
use yamele::{Emitter, EventData, Parser};

/// A representative document: deep nesting, flow and block collections,
/// anchors/aliases, and all five scalar styles, repeated to give the
/// scanner's simple-key and indentation machinery real work to do.
fn sample_document() -> String {
    let mut doc = String::new();
    doc.push_str("%YAML 1.1\n---\n");
    for i in 0..200 {
        doc.push_str(&format!(
            "item_{i}:\n  id: {i}\n  tags: [a, b, c{i}]\n  ref: &a{i} anchor-{i}\n  alias: *a{i}\n  note: |\n    line one {i}\n    line two\n  quoted: \"escaped \\\"value\\\" {i}\"\n",
        ));
    }
    doc.push_str("...\n");
    doc
}

pub fn parse(c: &mut Criterion) {
    let input = sample_document();

    c.bench_function("parse events", |b| {
        b.iter(|| {
            let mut parser = Parser::new();
            parser.set_input_string(input.as_bytes());
            let mut count = 0usize;
            loop {
                let event = parser.parse().unwrap();
                count += 1;
                if matches!(event.data, EventData::StreamEnd) {
                    break;
                }
            }
            count
        })
    });

    c.bench_function("parse then emit", |b| {
        b.iter(|| {
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
            let mut out = String::new();
            let mut emitter = Emitter::new();
            emitter.set_output_string(&mut out);
            for event in &events {
                emitter.emit(event).unwrap();
            }
            out
        })
    });
}

criterion_group!(benches, parse);
criterion_main!(benches);
