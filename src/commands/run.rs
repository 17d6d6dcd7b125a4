//! Comando `run`: auditoría completa del proyecto.

use crate::config::{self, AuditConfig};
use crate::scanner::{self, ScanConfig};
use crate::standards::RuleRegistry;
use crate::ui;
use crate::validator::{self, ValidateOptions};
use colored::Colorize;
use std::path::{Path, PathBuf};

pub struct RunArgs {
    pub target: Option<PathBuf>,
    pub standards: Option<String>,
    pub min_severity: Option<String>,
    pub max_violations: Option<usize>,
    pub max_files: Option<usize>,
    pub json: bool,
    pub output: Option<PathBuf>,
}

/// Ejecuta la auditoría y devuelve el código de salida del proceso:
/// 0 sin errores, 1 con violaciones de severidad error, 2 uso inválido.
pub fn handle_run_command(args: RunArgs) -> i32 {
    let Some(root) = resolver_raiz(args.target.as_deref()) else {
        return 2;
    };

    let config = AuditConfig::load(&root).unwrap_or_else(|| {
        AuditConfig::default(nombre_de(&root))
    });

    // Flags de CLI por encima de la config persistida.
    let min_severity = match &args.min_severity {
        Some(s) => match config::parse_severity(s) {
            Some(sev) => Some(sev),
            None => {
                eprintln!("{}", format!("❌ Severidad desconocida: {}", s).red().bold());
                return 2;
            }
        },
        None => Some(config.severidad_minima()),
    };
    let standards = match &args.standards {
        Some(s) => match config::parse_standards(s) {
            Ok(list) => Some(list),
            Err(e) => {
                eprintln!("{}", format!("❌ {}", e).red().bold());
                return 2;
            }
        },
        None => None,
    };

    if !args.json {
        ui::mostrar_banner();
        println!("📂 Proyecto: {}", root.display().to_string().bright_white());
    }

    let standards_dir = root.join(&config.standards_dir);
    let registry = match RuleRegistry::build(&standards_dir) {
        Ok(r) => r,
        Err(e) => {
            eprintln!(
                "{}",
                format!("❌ No se pudieron compilar los estándares: {:#}", e).red().bold()
            );
            return 2;
        }
    };
    if !args.json {
        println!("📏 Reglas compiladas: {}", registry.len());
    }

    let mut scan_config = ScanConfig::new(&root);
    scan_config.include_dirs = config.include_dirs.clone();
    scan_config.exclude_dirs = config.exclude_dirs.clone();
    scan_config.extensions = config.file_extensions.clone();

    let scan = match scanner::scan(&scan_config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", format!("❌ Error al escanear: {:#}", e).red().bold());
            return 2;
        }
    };

    let mut files = scan.files;
    if let Some(max) = args.max_files {
        files.truncate(max);
    }

    let options = ValidateOptions {
        min_severity,
        standards,
        max_violations: args.max_violations.or(config.max_violations),
    };

    let pb = if args.json {
        None
    } else {
        Some(ui::crear_progreso(&format!("Auditando {} archivos...", files.len())))
    };
    let result = validator::validate_files(&files, &registry, &options);
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    if let Some(ref output) = args.output {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => {
                if let Err(e) = std::fs::write(output, json) {
                    eprintln!("{}", format!("❌ No se pudo escribir {}: {}", output.display(), e).red());
                    return 2;
                }
                if !args.json {
                    println!("💾 Resultado guardado en {}", output.display());
                }
            }
            Err(e) => {
                eprintln!("{}", format!("❌ Error serializando el resultado: {}", e).red());
                return 2;
            }
        }
    }

    if args.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("❌ Error serializando el resultado: {}", e);
                return 2;
            }
        }
    } else {
        ui::mostrar_auditoria(&result);
    }

    // Para CI: cualquier violación de severidad error falla la corrida.
    let hay_errores = result
        .violations_by_severity
        .get("error")
        .map(|n| *n > 0)
        .unwrap_or(false);
    if hay_errores {
        1
    } else {
        0
    }
}

pub(crate) fn resolver_raiz(target: Option<&Path>) -> Option<PathBuf> {
    match target {
        Some(path) => {
            if path.is_dir() {
                Some(path.to_path_buf())
            } else {
                eprintln!(
                    "{}",
                    format!("❌ El directorio {} no existe", path.display()).red().bold()
                );
                None
            }
        }
        None => AuditConfig::find_project_root()
            .or_else(|| std::env::current_dir().ok()),
    }
}

fn nombre_de(root: &Path) -> String {
    root.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}
