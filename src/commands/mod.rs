pub mod fix;
pub mod report;
pub mod run;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "custodia")]
#[command(about = "Auditor de estándares de código para TypeScript/React/Convex", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Audita el proyecto contra los estándares y reporta violaciones
    Run {
        /// Raíz del proyecto a auditar (por defecto, la detectada)
        target: Option<PathBuf>,
        /// Estándares a aplicar, separados por comas (ej: typescript,react)
        #[arg(long)]
        standards: Option<String>,
        /// Severidad mínima: error, warning o info
        #[arg(long)]
        min_severity: Option<String>,
        /// Tope de violaciones reportadas
        #[arg(long)]
        max_violations: Option<usize>,
        /// Tope de archivos a auditar
        #[arg(long)]
        max_files: Option<usize>,
        /// Emite el resultado como JSON por stdout
        #[arg(long)]
        json: bool,
        /// Guarda el resultado completo como JSON en la ruta dada
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Aplica correcciones automáticas con backup y verificación
    Fix {
        /// Raíz del proyecto a corregir
        target: Option<PathBuf>,
        /// Estándares a aplicar, separados por comas
        #[arg(long)]
        standards: Option<String>,
        /// Severidad mínima
        #[arg(long)]
        min_severity: Option<String>,
        /// Reporta qué se corregiría sin escribir nada
        #[arg(long)]
        dry_run: bool,
        /// Saltea la verificación con tsc tras aplicar los fixes
        #[arg(long)]
        no_verify: bool,
    },
    /// Renderiza un resultado de auditoría guardado como reporte
    Report {
        /// Archivo JSON producido por `custodia run --output`
        input: PathBuf,
        /// Formato: markdown o json
        #[arg(long, default_value = "markdown")]
        format: String,
        /// Ruta de salida (por defecto, stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}
