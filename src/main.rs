//! forge – command-line profile document compiler.
//!
//! Usage:
//!   forge <request.json> [--format pdf,docx|all] [--out DIR] [--landscape] [--title "CV"]
//!   forge --sample sidebar [--format all] [--out DIR]
//!
//! One file is written per format, named `<stem>.<extension>` where the stem
//! is the request file's stem (or `sample-<layout>`).

use std::{env, fs, path::PathBuf, process};

use profile_forge::emit::OutputFormat;
use profile_forge::layout_config::{LayoutType, PageOrientation};
use profile_forge::pipeline::{compile_all, CompileOptions, CompileRequest};
use profile_forge::templates::sample_request;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut input_path: Option<PathBuf> = None;
    let mut sample: Option<LayoutType> = None;
    let mut out_dir: Option<PathBuf> = None;
    let mut formats: Vec<OutputFormat> = vec![OutputFormat::Pdf];
    let mut landscape = false;
    let mut title: Option<String> = None;
    let mut options = CompileOptions::default();

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--format" | "-f" => {
                let value = flag_value(&mut iter, arg, &args[0]);
                formats = match parse_formats(&value) {
                    Ok(f) => f,
                    Err(e) => fail(&e, &args[0]),
                };
            }
            "--out" | "-o" => out_dir = Some(PathBuf::from(flag_value(&mut iter, arg, &args[0]))),
            "--sample" | "-s" => {
                let value = flag_value(&mut iter, arg, &args[0]);
                sample = Some(match value.as_str() {
                    "single-column" | "single" | "classic" => LayoutType::SingleColumn,
                    "two-column" | "two" => LayoutType::TwoColumn,
                    "sidebar" => LayoutType::Sidebar,
                    other => fail(&format!("unknown sample layout '{other}'"), &args[0]),
                });
            }
            "--max-pages" => {
                let value = flag_value(&mut iter, arg, &args[0]);
                options.max_pages = match value.parse() {
                    Ok(n) => n,
                    Err(_) => fail(&format!("--max-pages expects a number, got '{value}'"), &args[0]),
                };
            }
            "--landscape" | "-l" => landscape = true,
            "--title" | "-t" => title = Some(flag_value(&mut iter, arg, &args[0])),
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => fail(&format!("Unknown flag: {other}"), &args[0]),
            path => {
                if input_path.is_some() {
                    fail(&format!("Unexpected argument: {path}"), &args[0]);
                }
                input_path = Some(PathBuf::from(path));
            }
        }
    }

    let (mut request, stem, default_dir) = match (&input_path, sample) {
        (Some(input), None) => {
            let json = match fs::read_to_string(input) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error reading '{}': {e}", input.display());
                    process::exit(1);
                }
            };
            let request = match CompileRequest::from_json(&json) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
            let stem = input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("profile")
                .to_string();
            let dir = input.parent().map(PathBuf::from).unwrap_or_default();
            (request, stem, dir)
        }
        (None, Some(layout)) => (
            sample_request(layout),
            format!("sample-{}", layout.as_str()),
            PathBuf::from("."),
        ),
        (Some(_), Some(_)) => fail("give either a request file or --sample, not both", &args[0]),
        (None, None) => fail("no input file specified", &args[0]),
    };

    if landscape {
        request.layout.orientation = PageOrientation::Landscape;
    }
    if title.is_some() {
        request.title = title;
    }

    let out_dir = out_dir.unwrap_or(default_dir);
    if !out_dir.as_os_str().is_empty() {
        if let Err(e) = fs::create_dir_all(&out_dir) {
            eprintln!("Error creating output directory: {e}");
            process::exit(1);
        }
    }

    let mut failed = false;
    for result in compile_all(&request, &formats, &options) {
        for warning in &result.warnings {
            eprintln!("warning [{}]: {}", result.format, warning.message);
        }
        match (&result.bytes, result.success) {
            (Some(bytes), true) => {
                let output = out_dir.join(format!("{stem}.{}", result.extension));
                if let Err(e) = fs::write(&output, bytes) {
                    eprintln!("Error writing '{}': {e}", output.display());
                    failed = true;
                    continue;
                }
                eprintln!("Wrote '{}' ({} bytes)", output.display(), bytes.len());
            }
            _ => {
                eprintln!(
                    "Error generating {}: {}",
                    result.format,
                    result.error_message.as_deref().unwrap_or("unknown error")
                );
                failed = true;
            }
        }
    }
    if failed {
        process::exit(1);
    }
}

fn flag_value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str, prog: &str) -> String {
    match iter.next() {
        Some(v) => v.clone(),
        None => fail(&format!("{flag} expects a value"), prog),
    }
}

fn parse_formats(value: &str) -> Result<Vec<OutputFormat>, String> {
    if value.eq_ignore_ascii_case("all") {
        return Ok(OutputFormat::ALL.to_vec());
    }
    value
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(str::parse)
        .collect()
}

fn fail(message: &str, prog: &str) -> ! {
    eprintln!("Error: {message}");
    print_usage(prog);
    process::exit(1);
}

fn print_usage(prog: &str) {
    eprintln!("forge – profile document compiler (profile-forge)");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <request.json> [--format pdf,docx|all] [--out DIR] [--landscape] [--title \"CV\"]");
    eprintln!("  {prog} --sample <single-column|two-column|sidebar> [--format all] [--out DIR]");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --format, -f   Comma-separated formats: pdf, docx, pptx, html, markdown, xlsx, json, text, or all (default: pdf)");
    eprintln!("  --out, -o      Output directory (default: next to the request file)");
    eprintln!("  --sample, -s   Compile the built-in sample profile with a stock template");
    eprintln!("  --title, -t    Document title (default: the profile's full name)");
    eprintln!("  --landscape    Use landscape page orientation");
    eprintln!("  --max-pages    Page ceiling before content is truncated (default: 20)");
    eprintln!("  --help         Print this message");
}
