//! Orquestador de validación.
//!
//! Corre el matcher para cada par (archivo × regla) sobre el inventario del
//! scanner, agrega las violaciones en resultados por archivo y de corrida
//! completa, y calcula los compliance scores. Un archivo que no se puede leer
//! o parsear se salta (log, no fatal) y queda fuera de los resultados.

use crate::analyzer::SyntaxAnalyzer;
use crate::matcher::{self, Violation};
use crate::scanner::ScannedFile;
use crate::standards::{RuleRegistry, Severity, Standard};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// Severidad mínima: las reglas por debajo no corren.
    pub min_severity: Option<Severity>,
    /// Lista blanca de estándares; None = todos.
    pub standards: Option<Vec<Standard>>,
    /// Tope de violaciones en la lista aplanada del resultado.
    pub max_violations: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAuditResult {
    pub file_path: String,
    pub violations: Vec<Violation>,
    pub line_count: usize,
    pub compliance_score: f64,
}

/// Agregado de toda la corrida. Inmutable una vez construido: es el único
/// objeto de intercambio con los renderers de reporte y el motor de fixes.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuditResult {
    pub total_files: usize,
    pub total_violations: usize,
    pub compliance_score: f64,
    pub violations_by_standard: BTreeMap<String, usize>,
    pub violations_by_severity: BTreeMap<String, usize>,
    pub violations: Vec<Violation>,
    pub file_results: Vec<FileAuditResult>,
    pub execution_time_ms: u128,
}

/// Score de un archivo: densidad de violaciones ponderada por severidad.
/// 100 para archivos vacíos.
pub fn file_compliance_score(violations: &[Violation], line_count: usize) -> f64 {
    if line_count == 0 {
        return 100.0;
    }
    let weighted: u32 = violations.iter().map(|v| v.severity.weight()).sum();
    let score = 100.0 - 100.0 * f64::from(weighted) / line_count as f64;
    score.max(0.0).round()
}

/// Orden canónico de presentación: severidad descendente, luego ruta
/// ascendente, luego línea ascendente. Es el orden que usan el reporte y el
/// motor de fixes.
pub fn sort_violations(violations: &mut [Violation]) {
    violations.sort_by(|a, b| {
        b.severity
            .rank()
            .cmp(&a.severity.rank())
            .then_with(|| a.file_path.cmp(&b.file_path))
            .then_with(|| a.line.cmp(&b.line))
    });
}

pub fn validate_files(
    files: &[ScannedFile],
    registry: &RuleRegistry,
    options: &ValidateOptions,
) -> AuditResult {
    let start = Instant::now();
    let analyzer = SyntaxAnalyzer::new();

    // Filtro del set de reglas activas, una sola vez para toda la corrida.
    let active: Vec<_> = registry
        .rules()
        .iter()
        .filter(|rule| {
            if let Some(min) = options.min_severity {
                if rule.severity.rank() < min.rank() {
                    return false;
                }
            }
            if let Some(ref allowed) = options.standards {
                if !allowed.contains(&rule.standard) {
                    return false;
                }
            }
            true
        })
        .collect();

    let mut file_results: Vec<FileAuditResult> = Vec::new();

    for file in files {
        let source = match std::fs::read_to_string(&file.absolute_path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!(
                    "   ⚠️  Saltando {} (lectura fallida: {})",
                    file.relative_path.display(),
                    e
                );
                continue;
            }
        };
        let parsed = match analyzer.parse_source(&source, &file.extension) {
            Ok(p) => p,
            Err(e) => {
                eprintln!(
                    "   ⚠️  Saltando {} (parseo fallido: {})",
                    file.relative_path.display(),
                    e
                );
                continue;
            }
        };

        let mut violations: Vec<Violation> = Vec::new();
        for rule in &active {
            violations.extend(matcher::match_rule(rule, &parsed, &source, &file.relative_path));
        }

        let line_count = source.lines().count();
        let compliance_score = file_compliance_score(&violations, line_count);
        file_results.push(FileAuditResult {
            file_path: file.relative_path.display().to_string(),
            violations,
            line_count,
            compliance_score,
        });
    }

    let mut violations: Vec<Violation> = file_results
        .iter()
        .flat_map(|f| f.violations.iter().cloned())
        .collect();
    sort_violations(&mut violations);
    let total_violations = violations.len();
    if let Some(max) = options.max_violations {
        violations.truncate(max);
    }

    let mut violations_by_standard: BTreeMap<String, usize> = BTreeMap::new();
    let mut violations_by_severity: BTreeMap<String, usize> = BTreeMap::new();
    for fr in &file_results {
        for v in &fr.violations {
            let standard = registry
                .get(&v.rule_id)
                .map(|r| r.standard.as_str().to_string())
                .unwrap_or_else(|| "desconocido".to_string());
            *violations_by_standard.entry(standard).or_insert(0) += 1;
            *violations_by_severity
                .entry(v.severity.as_str().to_string())
                .or_insert(0) += 1;
        }
    }

    // Score global: media simple de los scores por archivo, no reagregado
    // ponderado desde los conteos crudos. 100 con cero archivos.
    let compliance_score = if file_results.is_empty() {
        100.0
    } else {
        let suma: f64 = file_results.iter().map(|f| f.compliance_score).sum();
        (suma / file_results.len() as f64).round()
    };

    AuditResult {
        total_files: file_results.len(),
        total_violations,
        compliance_score,
        violations_by_standard,
        violations_by_severity,
        violations,
        file_results,
        execution_time_ms: start.elapsed().as_millis(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standards::patterns;
    use std::fs;
    use tempfile::TempDir;

    fn registro() -> RuleRegistry {
        let mut rules = Vec::new();
        for standard in Standard::all() {
            let mut counter = 1;
            rules.extend(patterns::pattern_rules(standard, &mut counter));
        }
        RuleRegistry::from_rules(rules).unwrap()
    }

    fn archivo(dir: &TempDir, nombre: &str, contenido: &str) -> ScannedFile {
        let path = dir.path().join(nombre);
        fs::write(&path, contenido).unwrap();
        ScannedFile {
            absolute_path: path,
            relative_path: std::path::PathBuf::from(nombre),
            extension: nombre.rsplit('.').next().unwrap().to_string(),
            size: contenido.len() as u64,
            last_modified: None,
        }
    }

    fn violacion(severity: Severity, path: &str, line: usize) -> Violation {
        Violation {
            rule_id: "typ-001".to_string(),
            file_path: path.to_string(),
            line,
            column: 0,
            severity,
            message: "m".to_string(),
            code_snippet: String::new(),
            fix_suggestion: None,
        }
    }

    #[test]
    fn test_cero_archivos_score_100() {
        let reg = registro();
        let result = validate_files(&[], &reg, &ValidateOptions::default());
        assert_eq!(result.total_files, 0);
        assert_eq!(result.compliance_score, 100.0);
        assert_eq!(result.total_violations, 0);
    }

    #[test]
    fn test_cero_lineas_score_100() {
        assert_eq!(file_compliance_score(&[], 0), 100.0);
        // Incluso con violaciones fantasma, cero líneas define 100.
        assert_eq!(file_compliance_score(&[violacion(Severity::Error, "a", 1)], 0), 100.0);
    }

    #[test]
    fn test_score_acotado_entre_0_y_100() {
        let muchas: Vec<_> = (0..200).map(|i| violacion(Severity::Error, "a", i)).collect();
        let score = file_compliance_score(&muchas, 10);
        assert_eq!(score, 0.0);
        assert_eq!(file_compliance_score(&[], 50), 100.0);
    }

    #[test]
    fn test_archivo_limpio_score_100() {
        let dir = TempDir::new().unwrap();
        let files = vec![archivo(&dir, "limpio.ts", "const a: number = 1;\nexport { a };\n")];
        let reg = registro();
        let result = validate_files(&files, &reg, &ValidateOptions::default());
        assert_eq!(result.total_files, 1);
        assert_eq!(result.file_results[0].compliance_score, 100.0);
        assert!(result.file_results[0].violations.is_empty());
    }

    #[test]
    fn test_archivo_ilegible_se_salta() {
        let dir = TempDir::new().unwrap();
        let mut files = vec![archivo(&dir, "ok.ts", "const a = 1;\n")];
        files.push(ScannedFile {
            absolute_path: dir.path().join("no-existe.ts"),
            relative_path: std::path::PathBuf::from("no-existe.ts"),
            extension: "ts".to_string(),
            size: 0,
            last_modified: None,
        });
        let reg = registro();
        let result = validate_files(&files, &reg, &ValidateOptions::default());
        // El archivo faltante no cuenta en total_files ni en file_results.
        assert_eq!(result.total_files, 1);
    }

    #[test]
    fn test_orden_canonico() {
        let mut vs = vec![
            violacion(Severity::Info, "b.ts", 1),
            violacion(Severity::Error, "z.ts", 9),
            violacion(Severity::Error, "a.ts", 5),
            violacion(Severity::Error, "a.ts", 2),
            violacion(Severity::Warning, "a.ts", 1),
        ];
        sort_violations(&mut vs);
        let claves: Vec<_> = vs
            .iter()
            .map(|v| (v.severity.rank(), v.file_path.clone(), v.line))
            .collect();
        // Severidad descendente, luego ruta, luego línea.
        assert_eq!(claves[0], (3, "a.ts".to_string(), 2));
        assert_eq!(claves[1], (3, "a.ts".to_string(), 5));
        assert_eq!(claves[2], (3, "z.ts".to_string(), 9));
        assert_eq!(claves[3], (2, "a.ts".to_string(), 1));
        assert_eq!(claves[4], (1, "b.ts".to_string(), 1));
        for ventana in vs.windows(2) {
            assert!(ventana[0].severity.rank() >= ventana[1].severity.rank());
        }
    }

    #[test]
    fn test_filtro_por_severidad_minima() {
        let dir = TempDir::new().unwrap();
        // console.log es warning; con min=Error no debe aparecer.
        let files = vec![archivo(&dir, "debug.ts", "console.log('x');\n")];
        let reg = registro();
        let opciones = ValidateOptions { min_severity: Some(Severity::Error), ..Default::default() };
        let result = validate_files(&files, &reg, &opciones);
        assert!(result.violations.iter().all(|v| v.severity == Severity::Error));
        assert!(!result.violations.iter().any(|v| v.message.contains("console")));
    }

    #[test]
    fn test_truncado_de_violaciones() {
        let dir = TempDir::new().unwrap();
        let contenido = "var a = 1;\nvar b = 2;\nvar c = 3;\n";
        let files = vec![archivo(&dir, "vars.ts", contenido)];
        let reg = registro();
        let opciones = ValidateOptions { max_violations: Some(1), ..Default::default() };
        let result = validate_files(&files, &reg, &opciones);
        assert_eq!(result.violations.len(), 1);
        // El total refleja lo detectado, no lo truncado.
        assert!(result.total_violations >= 3);
    }

    #[test]
    fn test_tallies_por_estandar_y_severidad() {
        let dir = TempDir::new().unwrap();
        let files = vec![archivo(&dir, "malo.ts", "const x: any = eval('1');\n")];
        let reg = registro();
        let result = validate_files(&files, &reg, &ValidateOptions::default());
        assert!(result.violations_by_standard.get("typescript").copied().unwrap_or(0) >= 1);
        assert!(result.violations_by_standard.get("security").copied().unwrap_or(0) >= 1);
        let total: usize = result.violations_by_severity.values().sum();
        assert_eq!(total, result.total_violations);
    }

    #[test]
    fn test_score_100_implica_cero_violaciones() {
        let dir = TempDir::new().unwrap();
        let files = vec![archivo(&dir, "sucio.ts", "var x = eval('1');\n")];
        let reg = registro();
        let result = validate_files(&files, &reg, &ValidateOptions::default());
        for fr in &result.file_results {
            if fr.violations.is_empty() {
                assert_eq!(fr.compliance_score, 100.0);
            } else {
                assert!(fr.compliance_score < 100.0);
            }
            assert!(fr.compliance_score >= 0.0 && fr.compliance_score <= 100.0);
        }
    }
}
