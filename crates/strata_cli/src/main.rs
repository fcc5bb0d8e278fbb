//! stc: The strata description-tree evaluator CLI.
//!
//! Usage:
//!   stc [options] [root-dir]
//!
//! Walks the given source tree for `Strata.build` files, evaluates the
//! variable scopes parent-before-children, and reports every violation of
//! the binding discipline with its location.

use bumpalo::Bump;
use clap::Parser as ClapParser;
use std::path::PathBuf;
use std::process;
use std::time::Instant;
use strata_compiler::{FileSet, Program};
use strata_diagnostics::Diagnostic;
use strata_module::{ModuleInstance, ModuleRegistry};

#[derive(ClapParser, Debug)]
#[command(
    name = "stc",
    about = "strata - a declarative, directory-hierarchical build-description evaluator",
    disable_version_flag = true
)]
struct Cli {
    /// Root directory of the description tree.
    #[arg(value_name = "ROOT", default_value = ".")]
    root: PathBuf,

    /// List every description file that was discovered.
    #[arg(long = "list-files")]
    list_files: bool,

    /// Emit the evaluated module graph as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Print each evaluated directory's variables.
    #[arg(long = "show-variables")]
    show_variables: bool,

    /// Disable colored output.
    #[arg(long = "no-color")]
    no_color: bool,

    /// Print the evaluator version.
    #[arg(short = 'v', long)]
    version: bool,
}

// ANSI color codes
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const GRAY: &str = "\x1b[90m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn main() {
    let cli = Cli::parse();

    if cli.version {
        println!("stc Version 0.1.0");
        return;
    }

    let exit_code = run_evaluate(&cli);
    process::exit(exit_code);
}

/// The module types the reference build tool understands.
fn default_registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry.register("library", "a compiled library");
    registry.register("binary", "an executable");
    registry.register("test", "a test executable");
    registry.register("filegroup", "a named collection of files");
    registry.register("prebuilt", "a prebuilt artifact");
    registry
}

fn run_evaluate(cli: &Cli) -> i32 {
    let start = Instant::now();
    let color = !cli.no_color;

    let files = match FileSet::from_disk(&cli.root) {
        Ok(files) => files,
        Err(error) => {
            print_error(&error.to_string(), color);
            return 1;
        }
    };
    if files.is_empty() {
        print_error("No description files found.", color);
        return 1;
    }

    if cli.list_files {
        for (path, _) in files.iter() {
            println!("{}", path);
        }
    }

    let directory_count = files.len();
    let arena = Bump::new();
    let program = Program::new(&arena, files, default_registry());
    let result = match program.evaluate() {
        Ok(result) => result,
        Err(error) => {
            print_error(&error.to_string(), color);
            return 1;
        }
    };

    for diagnostic in result.diagnostics.diagnostics() {
        print_diagnostic(diagnostic, color);
    }

    if cli.show_variables {
        for dir in result.outcomes.keys() {
            if let Some(variables) = result.variables_of(dir) {
                let label = if dir.is_empty() { "." } else { dir.as_str() };
                println!("{}{}{}", BOLD, label, RESET);
                for (name, value) in variables {
                    println!("  {} = {}", name, value);
                }
            }
        }
    }

    let error_count = result.diagnostics.error_count();
    if cli.json {
        if error_count == 0 {
            let modules: Vec<ModuleInstance> = result.modules().cloned().collect();
            match strata_module::to_json(&modules) {
                Ok(json) => println!("{}", json),
                Err(error) => {
                    print_error(&error.to_string(), color);
                    return 1;
                }
            }
        }
    } else {
        let elapsed = start.elapsed();
        let module_count = result.modules().count();
        if color {
            println!(
                "{}Evaluated {} directories ({} modules) in {:.1?}{}",
                GRAY, directory_count, module_count, elapsed, RESET
            );
        } else {
            println!(
                "Evaluated {} directories ({} modules) in {:.1?}",
                directory_count, module_count, elapsed
            );
        }
    }

    if error_count > 0 {
        if color {
            eprintln!(
                "{}Found {} error{}.{}",
                RED,
                error_count,
                if error_count == 1 { "" } else { "s" },
                RESET
            );
        } else {
            eprintln!(
                "Found {} error{}.",
                error_count,
                if error_count == 1 { "" } else { "s" }
            );
        }
        1
    } else {
        0
    }
}

fn print_diagnostic(diagnostic: &Diagnostic, color: bool) {
    if !color {
        eprintln!("{}", diagnostic);
        for related in &diagnostic.related_information {
            eprintln!("    {}", related);
        }
        return;
    }

    let severity = if diagnostic.is_error() {
        format!("{}error{}", RED, RESET)
    } else {
        format!("{}warning{}", YELLOW, RESET)
    };
    match &diagnostic.location {
        Some(location) => eprintln!(
            "{}{}{}: {} {}ST{}{}: {}",
            BOLD, location, RESET, severity, CYAN, diagnostic.code, RESET, diagnostic.message_text
        ),
        None => eprintln!(
            "{} {}ST{}{}: {}",
            severity, CYAN, diagnostic.code, RESET, diagnostic.message_text
        ),
    }
    for related in &diagnostic.related_information {
        if let Some(location) = &related.location {
            eprintln!("    {}{}: {}{}", GRAY, location, related.message_text, RESET);
        }
    }
}

fn print_error(message: &str, color: bool) {
    if color {
        eprintln!("{}error{}: {}", RED, RESET, message);
    } else {
        eprintln!("error: {}", message);
    }
}
