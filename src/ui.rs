//! Módulo de interfaz de usuario
//!
//! Funciones relacionadas con la presentación de resultados en la terminal.

use crate::standards::Severity;
use crate::validator::AuditResult;
use colored::*;

/// Muestra el banner de Custodia al inicio de cada comando
pub fn mostrar_banner() {
    println!();
    println!(
        "{}",
        "╔═══════════════════════════════════════════════════════╗".bright_cyan()
    );
    println!(
        "{}",
        r"
   ██████╗██╗   ██╗███████╗████████╗ ██████╗ ██████╗ ██╗ █████╗
  ██╔════╝██║   ██║██╔════╝╚══██╔══╝██╔═══██╗██╔══██╗██║██╔══██╗
  ██║     ██║   ██║███████╗   ██║   ██║   ██║██║  ██║██║███████║
  ██║     ██║   ██║╚════██║   ██║   ██║   ██║██║  ██║██║██╔══██║
  ╚██████╗╚██████╔╝███████║   ██║   ╚██████╔╝██████╔╝██║██║  ██║
   ╚═════╝ ╚═════╝ ╚══════╝   ╚═╝    ╚═════╝ ╚═════╝ ╚═╝╚═╝  ╚═╝
"
        .bright_cyan()
        .bold()
    );
    println!(
        "{}",
        "╚═══════════════════════════════════════════════════════╝".bright_cyan()
    );
    println!(
        "{}",
        "        🛡️  Custodia: Auditor de Estándares de Código  🛡️"
            .bright_white()
            .bold()
    );
    println!();
}

/// Spinner indeterminado para tareas de duración desconocida.
pub fn crear_progreso(mensaje: &str) -> indicatif::ProgressBar {
    let pb = indicatif::ProgressBar::new_spinner();
    pb.set_style(
        indicatif::ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(mensaje.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

pub fn icono_severidad(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "❌",
        Severity::Warning => "⚠️ ",
        Severity::Info => "ℹ️ ",
    }
}

fn pintar_score(score: f64) -> ColoredString {
    let texto = format!("{:.0}/100", score);
    if score >= 90.0 {
        texto.green().bold()
    } else if score >= 70.0 {
        texto.yellow().bold()
    } else {
        texto.red().bold()
    }
}

/// Reporte de consola completo de una auditoría: violaciones agrupadas por
/// archivo, scores por archivo y resumen global.
pub fn mostrar_auditoria(result: &AuditResult) {
    println!();
    for fr in &result.file_results {
        if fr.violations.is_empty() {
            continue;
        }
        println!(
            "{} {}",
            "📄".bold(),
            fr.file_path.bright_white().bold()
        );
        let mut ordenadas = fr.violations.clone();
        crate::validator::sort_violations(&mut ordenadas);
        for v in &ordenadas {
            println!(
                "   {} {} {} {}",
                icono_severidad(v.severity),
                format!("[{}]", v.rule_id).dimmed(),
                format!("L{}:{}", v.line, v.column).cyan(),
                v.message
            );
            if let Some(ref sugerencia) = v.fix_suggestion {
                println!("      {} {}", "💡".dimmed(), sugerencia.dimmed());
            }
        }
        println!("   {} {}", "Score:".dimmed(), pintar_score(fr.compliance_score));
        println!();
    }

    mostrar_resumen(result);
}

pub fn mostrar_resumen(result: &AuditResult) {
    println!(
        "{}",
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".bright_cyan()
    );
    println!("{}", "📊 RESUMEN DE AUDITORÍA".bright_cyan().bold());
    println!(
        "{}",
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".bright_cyan()
    );
    println!("   Archivos auditados:  {}", result.total_files);
    println!("   Violaciones:         {}", result.total_violations);
    println!("   Compliance score:    {}", pintar_score(result.compliance_score));
    println!("   Tiempo:              {} ms", result.execution_time_ms);

    if !result.violations_by_severity.is_empty() {
        println!();
        println!("{}", "   Por severidad:".dimmed());
        for (severidad, cuenta) in &result.violations_by_severity {
            println!("      {:10} {}", severidad, cuenta);
        }
    }
    if !result.violations_by_standard.is_empty() {
        println!();
        println!("{}", "   Por estándar:".dimmed());
        for (estandar, cuenta) in &result.violations_by_standard {
            println!("      {:12} {}", estandar, cuenta);
        }
    }
    println!(
        "{}",
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".bright_cyan()
    );
}
