//! Comando `report`: renderiza un resultado de auditoría guardado.

use crate::validator::AuditResult;
use colored::Colorize;
use std::fmt::Write as _;
use std::path::PathBuf;

pub struct ReportArgs {
    pub input: PathBuf,
    pub format: String,
    pub output: Option<PathBuf>,
}

pub fn handle_report_command(args: ReportArgs) -> i32 {
    let contenido = match std::fs::read_to_string(&args.input) {
        Ok(c) => c,
        Err(e) => {
            eprintln!(
                "{}",
                format!("❌ No se pudo leer {}: {}", args.input.display(), e).red().bold()
            );
            return 2;
        }
    };
    let result: AuditResult = match serde_json::from_str(&contenido) {
        Ok(r) => r,
        Err(e) => {
            eprintln!(
                "{}",
                format!("❌ {} no es un resultado de auditoría válido: {}", args.input.display(), e)
                    .red()
                    .bold()
            );
            return 2;
        }
    };

    let rendered = match args.format.as_str() {
        "markdown" | "md" => render_markdown(&result),
        "json" => match serde_json::to_string_pretty(&result) {
            Ok(j) => j,
            Err(e) => {
                eprintln!("❌ Error serializando el resultado: {}", e);
                return 2;
            }
        },
        otro => {
            eprintln!("{}", format!("❌ Formato desconocido: {}", otro).red().bold());
            return 2;
        }
    };

    match &args.output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, rendered) {
                eprintln!("{}", format!("❌ No se pudo escribir {}: {}", path.display(), e).red());
                return 2;
            }
            println!("💾 Reporte guardado en {}", path.display());
        }
        None => println!("{}", rendered),
    }
    0
}

/// Reporte markdown: resumen, tallies y violaciones agrupadas por archivo.
pub fn render_markdown(result: &AuditResult) -> String {
    let mut md = String::new();
    let _ = writeln!(md, "# Reporte de auditoría de estándares\n");
    let _ = writeln!(
        md,
        "Generado: {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(md, "## Resumen\n");
    let _ = writeln!(md, "| Métrica | Valor |");
    let _ = writeln!(md, "|---|---|");
    let _ = writeln!(md, "| Archivos auditados | {} |", result.total_files);
    let _ = writeln!(md, "| Violaciones | {} |", result.total_violations);
    let _ = writeln!(md, "| Compliance score | {:.0}/100 |", result.compliance_score);
    let _ = writeln!(md, "| Tiempo | {} ms |", result.execution_time_ms);
    let _ = writeln!(md);

    if !result.violations_by_severity.is_empty() {
        let _ = writeln!(md, "## Violaciones por severidad\n");
        let _ = writeln!(md, "| Severidad | Cantidad |");
        let _ = writeln!(md, "|---|---|");
        for (severidad, cuenta) in &result.violations_by_severity {
            let _ = writeln!(md, "| {} | {} |", severidad, cuenta);
        }
        let _ = writeln!(md);
    }
    if !result.violations_by_standard.is_empty() {
        let _ = writeln!(md, "## Violaciones por estándar\n");
        let _ = writeln!(md, "| Estándar | Cantidad |");
        let _ = writeln!(md, "|---|---|");
        for (estandar, cuenta) in &result.violations_by_standard {
            let _ = writeln!(md, "| {} | {} |", estandar, cuenta);
        }
        let _ = writeln!(md);
    }

    let _ = writeln!(md, "## Detalle por archivo\n");
    for fr in &result.file_results {
        if fr.violations.is_empty() {
            continue;
        }
        let _ = writeln!(
            md,
            "### {} — score {:.0}/100\n",
            fr.file_path, fr.compliance_score
        );
        let mut ordenadas = fr.violations.clone();
        crate::validator::sort_violations(&mut ordenadas);
        for v in &ordenadas {
            let _ = writeln!(
                md,
                "- **{}** `{}` L{}:{} — {}",
                v.severity.as_str(),
                v.rule_id,
                v.line,
                v.column,
                v.message
            );
            if let Some(ref sugerencia) = v.fix_suggestion {
                let _ = writeln!(md, "  - 💡 {}", sugerencia);
            }
        }
        let _ = writeln!(md);
    }
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::Violation;
    use crate::standards::Severity;
    use crate::validator::FileAuditResult;
    use std::collections::BTreeMap;

    fn resultado_de_prueba() -> AuditResult {
        let violation = Violation {
            rule_id: "typ-001".to_string(),
            file_path: "src/a.ts".to_string(),
            line: 3,
            column: 8,
            severity: Severity::Error,
            message: "Uso de any".to_string(),
            code_snippet: "const x: any = 1;".to_string(),
            fix_suggestion: Some("Usa un tipo concreto".to_string()),
        };
        let mut by_sev = BTreeMap::new();
        by_sev.insert("error".to_string(), 1usize);
        let mut by_std = BTreeMap::new();
        by_std.insert("typescript".to_string(), 1usize);
        AuditResult {
            total_files: 1,
            total_violations: 1,
            compliance_score: 97.0,
            violations_by_standard: by_std,
            violations_by_severity: by_sev,
            violations: vec![violation.clone()],
            file_results: vec![FileAuditResult {
                file_path: "src/a.ts".to_string(),
                violations: vec![violation],
                line_count: 100,
                compliance_score: 97.0,
            }],
            execution_time_ms: 12,
        }
    }

    #[test]
    fn test_markdown_contiene_resumen_y_detalle() {
        let md = render_markdown(&resultado_de_prueba());
        assert!(md.contains("# Reporte de auditoría"));
        assert!(md.contains("| Violaciones | 1 |"));
        assert!(md.contains("### src/a.ts — score 97/100"));
        assert!(md.contains("`typ-001` L3:8 — Uso de any"));
        assert!(md.contains("💡 Usa un tipo concreto"));
    }

    #[test]
    fn test_resultado_guardado_es_recargable() {
        let result = resultado_de_prueba();
        let json = serde_json::to_string_pretty(&result).unwrap();
        let recargado: AuditResult = serde_json::from_str(&json).unwrap();
        assert_eq!(recargado.total_violations, result.total_violations);
        assert_eq!(recargado.compliance_score, result.compliance_score);
        assert_eq!(recargado.violations[0].rule_id, "typ-001");
    }
}
