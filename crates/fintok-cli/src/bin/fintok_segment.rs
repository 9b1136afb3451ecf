// fintok-segment: segment stdin against a compiled model.
//
// Reads text from stdin, encodes it at the model's code unit width and
// prints one `id [start..end]: piece` line per token. Spans are in code
// units of the model's width.
//
// Usage:
//   fintok_segment [-m MODEL] [OPTIONS]
//
// Options:
//   -m, --model PATH   Model file (default: $FINTOK_MODEL, then ./tok.mfst)
//   --unk-id ID        Token id to report for unknown spans (default: 100)
//   --ids              Print bare token ids, space separated
//   -h, --help         Print help

use std::io::{self, Read, Write};

use fintok_core::{CodeUnit, Segment, SegmenterConf};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (model_path, args) = fintok_cli::parse_model_path(&args);
    let (unk_id, args) = fintok_cli::take_option(&args, "--unk-id", None);

    if fintok_cli::wants_help(&args) {
        println!("fintok-segment: segment text against a compiled model.");
        println!();
        println!("Usage: fintok_segment [-m MODEL] [OPTIONS]");
        println!();
        println!("Reads text from stdin, prints one token per line:");
        println!("  <id> [<start>..<end>]: <piece>");
        println!();
        println!("Options:");
        println!("  -m, --model PATH   Model file (default: $FINTOK_MODEL, then ./tok.mfst)");
        println!("  --unk-id ID        Token id for unknown spans (default: 100)");
        println!("  --ids              Print bare token ids, space separated");
        println!("  -h, --help         Print this help");
        return;
    }

    let ids_only = args.iter().any(|a| a == "--ids");

    let unk_id: i32 = match unk_id.as_deref() {
        None => 100,
        Some(v) => v
            .parse()
            .unwrap_or_else(|_| fintok_cli::fatal(&format!("invalid unk id {v:?}"))),
    };

    let model =
        fintok_cli::load_model(model_path.as_deref()).unwrap_or_else(|e| fintok_cli::fatal(&e));
    let conf = SegmenterConf::from_model(&model)
        .unwrap_or_else(|e| fintok_cli::fatal(&format!("bad model configuration: {e}")));

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .unwrap_or_else(|e| fintok_cli::fatal(&format!("failed to read stdin: {e}")));

    match model.code_unit_width() {
        1 => {
            let units: Vec<u8> = input.bytes().collect();
            run(&conf, &units, unk_id, ids_only, |s, e| {
                String::from_utf8_lossy(&units[s..=e]).into_owned()
            });
        }
        2 => {
            let units: Vec<u16> = input.encode_utf16().collect();
            run(&conf, &units, unk_id, ids_only, |s, e| {
                String::from_utf16_lossy(&units[s..=e])
            });
        }
        4 => {
            let units: Vec<u32> = input.chars().map(|c| c as u32).collect();
            run(&conf, &units, unk_id, ids_only, |s, e| {
                units[s..=e]
                    .iter()
                    .map(|&u| char::from_u32(u).unwrap_or(char::REPLACEMENT_CHARACTER))
                    .collect()
            });
        }
        other => fintok_cli::fatal(&format!("unsupported code unit width {other}")),
    }
}

fn run<T: CodeUnit>(
    conf: &SegmenterConf<'_>,
    units: &[T],
    unk_id: i32,
    ids_only: bool,
    decode: impl Fn(usize, usize) -> String,
) {
    let seg = conf
        .segmenter::<T>()
        .unwrap_or_else(|e| fintok_cli::fatal(&format!("bad model configuration: {e}")));
    let segments: Vec<Segment> = seg
        .segment(units, unk_id)
        .unwrap_or_else(|e| fintok_cli::fatal(&format!("segmentation failed: {e}")));

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    if ids_only {
        let ids: Vec<String> = segments.iter().map(|s| s.id.to_string()).collect();
        let _ = writeln!(out, "{}", ids.join(" "));
        return;
    }

    for s in &segments {
        let piece = decode(s.start, s.end)
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t");
        let _ = writeln!(out, "{:>6} [{:>4}..{:>4}]: {piece}", s.id, s.start, s.end);
    }
}
