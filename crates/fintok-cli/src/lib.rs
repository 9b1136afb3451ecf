// fintok-cli: shared utilities for the command line tools.

use std::path::PathBuf;
use std::process;

use fintok_fst::Model;

/// Default model file name looked up in the working directory.
const MODEL_FILE: &str = "tok.mfst";

/// Locate and load a segmentation model.
///
/// Search order:
/// 1. `model_path` argument (if provided)
/// 2. `FINTOK_MODEL` environment variable
/// 3. `tok.mfst` in the current working directory
pub fn load_model(model_path: Option<&str>) -> Result<Model, String> {
    let search_paths = build_search_paths(model_path);

    for path in &search_paths {
        if path.is_file() {
            let data = std::fs::read(path)
                .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
            return Model::from_bytes(&data)
                .map_err(|e| format!("failed to load {}: {e}", path.display()));
        }
    }

    Err(format!(
        "could not find a model in any of the search paths:\n{}",
        search_paths
            .iter()
            .map(|p| format!("  - {}", p.display()))
            .collect::<Vec<_>>()
            .join("\n")
    ))
}

/// Build the list of model file candidates.
fn build_search_paths(model_path: Option<&str>) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(p) = model_path {
        paths.push(PathBuf::from(p));
    }

    if let Ok(env_path) = std::env::var("FINTOK_MODEL") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(MODEL_FILE));
    }

    paths
}

/// Extract a `--model PATH` / `--model=PATH` / `-m PATH` argument.
///
/// Returns `(model_path, remaining_args)`.
pub fn parse_model_path(args: &[String]) -> (Option<String>, Vec<String>) {
    take_option(args, "--model", Some("-m"))
}

/// Extract one `--name VALUE` / `--name=VALUE` (and optional short form)
/// option from `args`. Returns the value and the remaining arguments.
pub fn take_option(
    args: &[String],
    long: &str,
    short: Option<&str>,
) -> (Option<String>, Vec<String>) {
    let prefix = format!("{long}=");
    let mut value = None;
    let mut remaining = Vec::new();
    let mut skip_next = false;

    for (i, arg) in args.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if let Some(v) = arg.strip_prefix(&prefix) {
            value = Some(v.to_string());
        } else if arg == long || short.is_some_and(|s| arg == s) {
            if i + 1 < args.len() {
                value = Some(args[i + 1].clone());
                skip_next = true;
            } else {
                eprintln!("error: {arg} requires a value");
                process::exit(1);
            }
        } else {
            remaining.push(arg.clone());
        }
    }

    (value, remaining)
}

/// Print an error message and exit with code 1.
pub fn fatal(msg: &str) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}

/// Check if `--help` or `-h` is in the args.
pub fn wants_help(args: &[String]) -> bool {
    args.iter().any(|a| a == "--help" || a == "-h")
}
