//! # Custodia - Auditor de Estándares de Código
//!
//! Compila documentos de estándares en markdown a reglas verificables y
//! audita proyectos TypeScript/React/Convex contra ellas, con scoring de
//! cumplimiento y correcciones automáticas con backup y verificación.

use clap::Parser;
use commands::{Cli, Commands};

// Módulos
pub mod analyzer;
pub mod commands;
pub mod config;
pub mod fixer;
pub mod matcher;
pub mod scanner;
pub mod standards;
pub mod typecheck;
pub mod ui;
pub mod validator;

fn main() {
    let cli = Cli::parse();

    let code = match cli.command {
        Some(Commands::Run {
            target,
            standards,
            min_severity,
            max_violations,
            max_files,
            json,
            output,
        }) => commands::run::handle_run_command(commands::run::RunArgs {
            target,
            standards,
            min_severity,
            max_violations,
            max_files,
            json,
            output,
        }),
        Some(Commands::Fix {
            target,
            standards,
            min_severity,
            dry_run,
            no_verify,
        }) => commands::fix::handle_fix_command(commands::fix::FixArgs {
            target,
            standards,
            min_severity,
            dry_run,
            no_verify,
        }),
        Some(Commands::Report { input, format, output }) => {
            commands::report::handle_report_command(commands::report::ReportArgs {
                input,
                format,
                output,
            })
        }
        None => {
            // Comportamiento por defecto: auditoría con la config del proyecto.
            commands::run::handle_run_command(commands::run::RunArgs {
                target: None,
                standards: None,
                min_severity: None,
                max_violations: None,
                max_files: None,
                json: false,
                output: None,
            })
        }
    };

    std::process::exit(code);
}
