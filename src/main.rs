use anyhow::{Context, Result};
use clap::Parser;
use spinfeed::frame::decode;
use spinfeed::model::{Event, Frame, FrameBody, Info};
use spinfeed::object::Node;
use spinfeed::record::{FileHeader, RecordFrame, write_record};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Parser)]
#[command(version, about = "Decode a captured spin telemetry stream")]
struct Args {
    /// Raw capture file (wire bytes as received)
    #[arg(long, short = 'i', env = "CAPTURE_FILE")]
    input: PathBuf,

    /// Optional output file for decoded records (.bin)
    #[arg(long, env = "OUT_FILE")]
    out: Option<PathBuf>,

    /// Table/game label stored in the output header
    #[arg(long, default_value = "unknown")]
    table: String,

    /// Suppress the pretty-printed frame dump
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn now_unix_ns() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos()
}

fn print_event(id: u32, ev: &Event) {
    println!("event {{");
    println!("  ID={id}");
    if let Some(t) = &ev.event_type {
        println!("  Type={t}");
    }
    if let Some(t) = &ev.time {
        println!("  Time={t}");
    }
    if let Some(n) = ev.number {
        println!("  Number={n}");
    }
    if let Some(d) = ev.duration {
        println!("  Duration={d}");
    }
    if let Some(h) = ev.has_levels {
        println!("  HasLevels={h}");
    }
    println!("  Market {{");
    for m in &ev.markets {
        let fields: Vec<String> = m
            .data
            .iter()
            .map(|(k, n)| match n {
                Node::Value(v) => format!("{k}={v}"),
                Node::Object(_) => format!("{k}={{..}}"),
            })
            .collect();
        println!("    {} {{ {} }}", m.name, fields.join(" "));
    }
    println!("  }}");
    println!("}}\n");
}

fn print_info(info: &Info) {
    println!("info {{");
    let valid_from = info.valid_from.as_ref().map(|v| v.to_string()).unwrap_or_default();
    println!("  ID={} ValidFrom={}", info.id, valid_from);
    println!("  LastGames {{");
    for g in &info.last_games {
        println!("    {} {{ Number={} Draw={} }}", g.name, g.number, g.draw);
    }
    println!("  }}");
    for (label, list) in [("Hot", &info.hot), ("Cold", &info.cold)] {
        println!("  {label} {{");
        for item in &list.items {
            println!(
                "    {} {{ Draw={} {}={} }}",
                item.key, item.draw, list.hits_field, item.hits
            );
        }
        println!("  }}");
    }
    println!("  Hits {{");
    for item in &info.hits {
        println!("    {} {{ Hits={} }}", item.key, item.hits);
    }
    println!("  }}");
    println!("  PreviousResults {{ }}");
    println!("}}\n");
}

fn print_frame(frame: &Frame) {
    match &frame.body {
        FrameBody::Event(ev) => print_event(frame.id, ev),
        FrameBody::Info(info) => print_info(info),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let bytes = fs::read(&args.input).with_context(|| format!("read {:?}", args.input))?;
    let frames = decode(&bytes);

    if !args.quiet {
        for frame in &frames {
            print_frame(frame);
        }
    }

    if let Some(out) = &args.out {
        let file = File::create(out).with_context(|| format!("create {out:?}"))?;
        let mut w = BufWriter::new(file);
        write_record(
            &mut w,
            &RecordFrame::Header(FileHeader {
                version: 1,
                created_unix_ns: now_unix_ns(),
                table: args.table.clone(),
                provider: args.input.display().to_string(),
            }),
        )?;
        for frame in &frames {
            write_record(&mut w, &RecordFrame::Frame(frame.clone()))?;
        }
        w.flush()?;
    }

    let events = frames.iter().filter(|f| matches!(f.body, FrameBody::Event(_))).count();
    let infos = frames.len() - events;
    eprintln!(
        "Decoded {} frames from {} bytes ({} events, {} infos).",
        frames.len(),
        bytes.len(),
        events,
        infos
    );
    Ok(())
}
