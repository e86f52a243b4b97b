//! Sybil CLI
//!
//! Runs the script code blocks and skip directives of reStructuredText
//! documents.

use sybil::commands::{list_examples, run_tests};
use sybil::test::TestRunnerConfig;
use sybil::Sybil;

const DEFAULT_PATTERN: &str = "*.rst";

fn main() {
    sybil::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    match args[1].as_str() {
        "test" | "list" => {
            let mut path: Option<String> = None;
            let mut pattern = DEFAULT_PATTERN.to_string();
            let mut filenames = Vec::new();
            let mut config = TestRunnerConfig::default();

            for arg in args.iter().skip(2) {
                if let Some(glob) = arg.strip_prefix("--pattern=") {
                    pattern = glob.to_string();
                } else if let Some(name) = arg.strip_prefix("--filename=") {
                    filenames.push(name.to_string());
                } else if let Some(filter) = arg.strip_prefix("--filter=") {
                    config.filter = Some(filter.to_string());
                } else if arg == "--verbose" || arg == "-v" {
                    config.verbose = true;
                } else if arg == "--no-parallel" {
                    config.parallel = false;
                } else if !arg.starts_with('-') && path.is_none() {
                    path = Some(arg.clone());
                } else {
                    eprintln!("warning: ignoring unknown option '{arg}'");
                }
            }

            let sybils = match Sybil::with_default_parsers().pattern(&pattern) {
                Ok(sybil) => vec![sybil.filenames(filenames)],
                Err(e) => {
                    eprintln!("error: invalid --pattern '{pattern}': {e}");
                    std::process::exit(1);
                }
            };

            let path = path.unwrap_or_else(|| ".".to_string());
            if args[1] == "list" {
                list_examples(&path, &sybils);
            } else {
                run_tests(&path, sybils, &config);
            }
        }
        "help" | "--help" | "-h" => print_usage(),
        "version" | "--version" => {
            println!("sybil {}", env!("CARGO_PKG_VERSION"));
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Sybil: run the examples in your documentation");
    println!();
    println!("Usage: sybil <command> [path] [options]");
    println!();
    println!("Commands:");
    println!("  test [path]          Run examples (default: current directory)");
    println!("  list [path]          List examples without running them");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Options:");
    println!("  --pattern=<glob>     Parse files whose name matches (default: {DEFAULT_PATTERN})");
    println!("  --filename=<name>    Also parse files with exactly this name");
    println!("  --filter=<text>      Only run examples whose id contains text");
    println!("  --verbose, -v        Show passed and skipped examples");
    println!("  --no-parallel        Run documents one at a time");
    println!();
    println!("Environment:");
    println!("  RUST_LOG=sybil=debug Log parsing and skip decisions to stderr");
    println!();
    println!("Examples:");
    println!("  sybil test docs/");
    println!("  sybil test README.txt --filename=README.txt");
    println!("  sybil test --filter=guide.rst::line:12");
    println!("  sybil list docs/ --pattern='*.txt'");
}
