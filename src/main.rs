use std::io::Read;
use std::process::ExitCode;

use clap::Parser as _;

use tinycc_mid::cli::Cli;
use tinycc_mid::compiler::{Compiler, Verbosity};
use tinycc_mid::error::CompileError;
use tinycc_mid::{frontend, layout, optimizer, printer};

fn read_source(cli: &Cli) -> Result<(String, String), CompileError> {
    match &cli.input {
        Some(path) => {
            let source = std::fs::read_to_string(path).map_err(|source| CompileError::InputUnreadable {
                path: path.clone(),
                source,
            })?;
            Ok((path.display().to_string(), source))
        }
        None => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .map_err(|source| CompileError::InputUnreadable {
                    path: "<stdin>".into(),
                    source,
                })?;
            Ok(("<stdin>".to_owned(), source))
        }
    }
}

fn run(cli: Cli) -> Result<(), CompileError> {
    let verbosity = Verbosity(cli.verbose);
    let mut compiler = Compiler::new(verbosity, cli.opt_level);

    let (path, source) = read_source(&cli)?;
    frontend::parse_program(&mut compiler, &path, &source)?;

    if verbosity.banners() {
        printer::print_parse_tree(&compiler);
    }

    optimizer::optimize_tree(&mut compiler);

    if verbosity.banners() {
        printer::print_after_optimization(&compiler);
    }

    layout::compute_layout(&mut compiler);
    if verbosity.banners() {
        printer::print_symbol_table(&compiler);
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new().filter_level(filter_level).init();

    match run(cli) {
        Ok(()) => {
            printer::print_compilation_result(true);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}", err);
            printer::print_compilation_result(false);
            ExitCode::FAILURE
        }
    }
}
