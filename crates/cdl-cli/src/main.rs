use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process;

use cdl_core::AstNode;

/// CDL — Contract Declaration Language CLI
///
/// Parse and inspect CDL contract files.
#[derive(Parser)]
#[command(name = "cdl", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a contract file and print its syntax tree
    Parse {
        /// Path to .cdl file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Echo each recognized construct while parsing
        #[arg(long)]
        debug: bool,
    },

    /// Parse a contract file and report only success or failure
    Check {
        /// Path to .cdl file
        file: PathBuf,
        /// Echo each recognized construct while parsing
        #[arg(long)]
        debug: bool,
    },

    /// Dump the token stream (position, kind, lexeme) of a contract file
    Tokens {
        /// Path to .cdl file
        file: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Parse { file, json, debug } => cmd_parse(&file, json, debug),
        Commands::Check { file, debug } => cmd_check(&file, debug),
        Commands::Tokens { file } => cmd_tokens(&file),
        Commands::Version => {
            println!("cdl {} (cdl-core {})", env!("CARGO_PKG_VERSION"), env!("CARGO_PKG_VERSION"));
            0
        }
    };

    process::exit(exit_code);
}

// ── Commands ──────────────────────────────────────────────

fn cmd_parse(file: &Path, json: bool, debug: bool) -> i32 {
    let contracts = match parse_file(file, debug) {
        Ok(contracts) => contracts,
        Err(code) => return code,
    };

    if json {
        match serde_json::to_string_pretty(&contracts) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("{} {}", "error:".red().bold(), e);
                return 2;
            }
        }
    } else {
        for node in &contracts {
            print_contract(node);
        }
    }
    0
}

fn cmd_check(file: &Path, debug: bool) -> i32 {
    let contracts = match parse_file(file, debug) {
        Ok(contracts) => contracts,
        Err(code) => return code,
    };
    println!(
        "{} {} ({} contract{})",
        "ok:".green().bold(),
        file.display(),
        contracts.len(),
        if contracts.len() == 1 { "" } else { "s" }
    );
    0
}

fn cmd_tokens(file: &Path) -> i32 {
    let text = match read_file(file) {
        Ok(text) => text,
        Err(code) => return code,
    };
    let tokens = cdl_core::tokenize(&text);
    print!("{}", cdl_core::dump_tokens(&tokens));
    0
}

// ── Helpers ───────────────────────────────────────────────

fn read_file(file: &Path) -> Result<String, i32> {
    std::fs::read_to_string(file).map_err(|e| {
        eprintln!("{} {}: {}", "error:".red().bold(), file.display(), e);
        2
    })
}

fn parse_file(file: &Path, debug: bool) -> Result<Vec<AstNode>, i32> {
    let text = read_file(file)?;
    let tokens = cdl_core::tokenize(&text);
    let parser = cdl_core::Parser::new(&tokens).with_debug(debug);
    match parser.parse_top(0) {
        Ok((_pos, contracts)) => Ok(contracts),
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            Err(1)
        }
    }
}

fn print_contract(node: &AstNode) {
    let contract = match node {
        AstNode::Contract(c) => c,
        other => {
            println!("{:?}", other);
            return;
        }
    };

    println!(
        "{} {} : {}",
        "contract".cyan().bold(),
        contract.name.bold(),
        contract.base_name
    );
    for member in &contract.members {
        match member {
            AstNode::AssociatedType(t) => {
                println!("  using {} = {}", t.type_name, t.default_code);
            }
            AstNode::DataMember(v) => {
                if v.default_code.is_empty() {
                    println!("  var {} {}", v.var_type, v.var_name);
                } else {
                    println!("  var {} {} {}", v.var_type, v.var_name, v.default_code);
                }
            }
            AstNode::MethodDecl(f) => {
                let mode = if f.is_required {
                    "required".to_string()
                } else if f.is_default {
                    "default".to_string()
                } else {
                    format!("{{ {} }}", f.default_code)
                };
                let attrs = f.attribute_string();
                if attrs.is_empty() {
                    println!(
                        "  method {} {}({}) = {}",
                        f.return_type, f.method_name, f.argument_text, mode
                    );
                } else {
                    println!(
                        "  method {} {}({}) {} = {}",
                        f.return_type, f.method_name, f.argument_text, attrs, mode
                    );
                }
            }
            other => println!("  {:?}", other),
        }
    }
}
