//! hledger Language Server.
//!
//! Usage:
//!   hledger-lsp              # Start LSP server (stdio)
//!   hledger-lsp --version    # Print version
//!   hledger-lsp --help       # Print help

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("hledger-lsp {}", hledger_lsp::VERSION);
        return ExitCode::SUCCESS;
    }

    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("hledger Language Server");
        println!();
        println!("Usage: hledger-lsp [OPTIONS]");
        println!();
        println!("Options:");
        println!("  -h, --help     Print help");
        println!("  -V, --version  Print version");
        println!();
        println!("The server communicates via stdio using the Language Server Protocol.");
        println!();
        println!("Initialization options:");
        println!("  filesystemRoot   Directory journal paths are resolved against (default \"/\")");
        println!("  maxIncludeDepth  Maximum nesting of include directives (default 64)");
        println!();
        println!("Environment variables:");
        println!("  RUST_LOG       Set log level (e.g., RUST_LOG=hledger_lsp=debug)");
        return ExitCode::SUCCESS;
    }

    // Logs go to stderr, stdout carries the protocol
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "hledger_lsp=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match hledger_lsp::start_stdio() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
