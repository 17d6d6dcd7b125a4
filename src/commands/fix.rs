//! Comando `fix`: correcciones automáticas con backup y verificación.

use crate::config::{self, AuditConfig};
use crate::fixer::backup::BackupManager;
use crate::fixer::{AutoFixEngine, FixOptions};
use crate::scanner::{self, ScanConfig};
use crate::standards::RuleRegistry;
use crate::ui;
use crate::validator::{self, ValidateOptions};
use colored::Colorize;
use std::path::PathBuf;

pub struct FixArgs {
    pub target: Option<PathBuf>,
    pub standards: Option<String>,
    pub min_severity: Option<String>,
    pub dry_run: bool,
    pub no_verify: bool,
}

pub fn handle_fix_command(args: FixArgs) -> i32 {
    let Some(root) = super::run::resolver_raiz(args.target.as_deref()) else {
        return 2;
    };

    let config = AuditConfig::load(&root)
        .unwrap_or_else(|| AuditConfig::default(nombre_de(&root)));

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

    ui::mostrar_banner();
    println!("📂 Proyecto: {}", root.display().to_string().bright_white());
    if args.dry_run {
        println!("{}", "🔍 Modo dry-run: no se escribirá ningún archivo".yellow());
    }

    let registry = match RuleRegistry::build(&root.join(&config.standards_dir)) {
        Ok(r) => r,
        Err(e) => {
            eprintln!(
                "{}",
                format!("❌ No se pudieron compilar los estándares: {:#}", e).red().bold()
            );
            return 2;
        }
    };

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

    let options = ValidateOptions {
        min_severity,
        standards,
        max_violations: None,
    };
    let pb = ui::crear_progreso(&format!("Auditando {} archivos...", scan.files.len()));
    let result = validator::validate_files(&scan.files, &registry, &options);
    pb.finish_and_clear();

    if result.total_violations == 0 {
        println!("{}", "✅ Sin violaciones: nada que corregir".green().bold());
        return 0;
    }
    println!(
        "🔧 {} violaciones detectadas, aplicando correcciones...",
        result.total_violations
    );

    // Las rutas del resultado son relativas a la raíz; el motor las resuelve
    // contra project_root.
    let session_id = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
    let backup_root = root.join(&config.backup_dir);
    let backup = BackupManager::new(&backup_root, &session_id);

    let mut fix_options = FixOptions::new(&root);
    fix_options.dry_run = args.dry_run;
    fix_options.skip_verify = args.no_verify || config.skip_verify;

    let mut engine = AutoFixEngine::new(&registry, backup, fix_options);
    let report = match engine.fix_all(&result.violations) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}", format!("❌ Error en la sesión de fixes: {:#}", e).red().bold());
            return 1;
        }
    };

    println!();
    println!(
        "{}",
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".bright_cyan()
    );
    println!("{}", "🔧 RESUMEN DE CORRECCIONES".bright_cyan().bold());
    println!(
        "{}",
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".bright_cyan()
    );
    println!("   Violaciones:        {}", report.total_violations);
    println!("   Corregidas:         {}", format!("{}", report.fixed_count).green());
    println!("   Fallidas:           {}", format!("{}", report.failed_count).red());
    println!("   Sin fixer/saltadas: {}", report.skipped_count);
    println!("   Tasa de éxito:      {:.0}%", report.success_rate * 100.0);
    if !report.files_modified.is_empty() {
        println!();
        println!("{}", "   Archivos modificados:".dimmed());
        for f in &report.files_modified {
            println!("      ✏️  {}", f);
        }
    }
    if !report.backups.is_empty() {
        println!();
        println!(
            "   💾 Backups en {}",
            backup_root.join(&session_id).display()
        );
    }
    for error in &report.errors {
        println!("   {} {}", "⚠️ ".yellow(), error);
    }
    println!(
        "{}",
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".bright_cyan()
    );

    if report.failed_count > 0 {
        1
    } else {
        0
    }
}

fn nombre_de(root: &std::path::Path) -> String {
    root.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}
