// fintok-compile: build a segmentation model from a vocabulary file.
//
// Usage:
//   fintok_compile VOCAB -o MODEL [OPTIONS]
//
// Options:
//   -o, --output PATH   Model file to write (default: tok.mfst)
//   --width N           Code unit width in bytes: 1, 2 or 4 (default: 1)
//   --json              Force the JSON vocabulary format
//   --tsv               Force the TSV vocabulary format
//   -h, --help          Print help
//
// The vocabulary format is guessed from the file extension unless forced:
// `.json` means `{"token": id, ...}`, anything else is TSV lines of
// `token<TAB>id[<TAB>score]`.

use fintok_compile::{Vocab, compile_vocab};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if fintok_cli::wants_help(&args) || args.is_empty() {
        println!("fintok-compile: build a segmentation model from a vocabulary.");
        println!();
        println!("Usage: fintok_compile VOCAB -o MODEL [OPTIONS]");
        println!();
        println!("Options:");
        println!("  -o, --output PATH   Model file to write (default: tok.mfst)");
        println!("  --width N           Code unit width in bytes: 1, 2 or 4 (default: 1)");
        println!("  --json              Force the JSON vocabulary format");
        println!("  --tsv               Force the TSV vocabulary format");
        println!("  -h, --help          Print this help");
        return;
    }

    let (output, args) = fintok_cli::take_option(&args, "--output", Some("-o"));
    let (width, args) = fintok_cli::take_option(&args, "--width", None);
    let force_json = args.iter().any(|a| a == "--json");
    let force_tsv = args.iter().any(|a| a == "--tsv");
    let positional: Vec<&String> = args
        .iter()
        .filter(|a| !a.starts_with('-'))
        .collect();

    if positional.len() != 1 {
        fintok_cli::fatal("expected exactly one vocabulary file argument");
    }
    let vocab_path = positional[0];
    if force_json && force_tsv {
        fintok_cli::fatal("--json and --tsv are mutually exclusive");
    }

    let width: u8 = match width.as_deref() {
        None => 1,
        Some(w) => w
            .parse()
            .unwrap_or_else(|_| fintok_cli::fatal(&format!("invalid width {w:?}"))),
    };

    let text = std::fs::read_to_string(vocab_path)
        .unwrap_or_else(|e| fintok_cli::fatal(&format!("failed to read {vocab_path}: {e}")));

    let json = force_json || (!force_tsv && vocab_path.ends_with(".json"));
    let vocab = if json {
        Vocab::parse_json(&text)
    } else {
        Vocab::parse_tsv(&text)
    }
    .unwrap_or_else(|e| fintok_cli::fatal(&format!("failed to parse {vocab_path}: {e}")));

    let data = compile_vocab(&vocab, width)
        .unwrap_or_else(|e| fintok_cli::fatal(&format!("failed to compile: {e}")));

    let output = output.as_deref().unwrap_or("tok.mfst");
    std::fs::write(output, &data)
        .unwrap_or_else(|e| fintok_cli::fatal(&format!("failed to write {output}: {e}")));

    println!(
        "wrote {output}: {} tokens, {} bytes",
        vocab.len(),
        data.len()
    );
}
