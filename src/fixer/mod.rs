//! Motor de auto-fix.
//!
//! Por cada archivo con violaciones: backup → mutación → verificación →
//! commit o rollback. La mutación es estrictamente secuencial dentro del
//! archivo porque cada fixer trabaja sobre el texto acumulado por el
//! anterior; la verificación delega en el type-checker externo.

pub mod backup;

use crate::fixer::backup::{BackupInfo, BackupManager};
use crate::matcher::Violation;
use crate::standards::RuleRegistry;
use crate::validator;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Resultado de un intento de fix sobre el texto de trabajo.
#[derive(Debug)]
pub struct FixOutcome {
    pub applied: bool,
    pub text: Option<String>,
    pub error: Option<String>,
}

impl FixOutcome {
    pub fn applied(text: String) -> Self {
        Self { applied: true, text: Some(text), error: None }
    }
    /// El fixer reclamó la violación pero decidió no tocarla.
    pub fn declined() -> Self {
        Self { applied: false, text: None, error: None }
    }
    pub fn failed(error: impl Into<String>) -> Self {
        Self { applied: false, text: None, error: Some(error.into()) }
    }
}

/// Una transformación autocontenida que sabe reclamar y reescribir el texto
/// detrás de ciertas violaciones. Cada fixer es intercambiable de forma
/// independiente.
pub trait Fixer {
    fn name(&self) -> &'static str;
    /// Nombre de la regla de catálogo que este fixer sabe corregir.
    fn rule_name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn can_fix(&self, violation: &Violation, text: &str) -> bool;
    fn fix(&self, violation: &Violation, text: &str) -> FixOutcome;
}

/// Reporte acumulado de una sesión de fixes. Se muta durante la sesión y se
/// finaliza una sola vez al cierre.
#[derive(Debug, Default, Serialize)]
pub struct AutoFixReport {
    pub total_violations: usize,
    pub fixed_count: usize,
    pub failed_count: usize,
    pub skipped_count: usize,
    pub success_rate: f64,
    pub files_modified: Vec<String>,
    pub backups: Vec<BackupInfo>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FixOptions {
    pub project_root: PathBuf,
    /// Reporta qué se aplicaría sin escribir nada.
    pub dry_run: bool,
    /// Confía en los fixers y saltea la verificación con tsc.
    pub skip_verify: bool,
    /// No crear backups (el rollback usa el texto original en memoria).
    pub skip_backup: bool,
}

impl FixOptions {
    pub fn new(project_root: &Path) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            dry_run: false,
            skip_verify: false,
            skip_backup: false,
        }
    }
}

type Verifier = Box<dyn Fn(&Path) -> anyhow::Result<bool>>;

pub struct AutoFixEngine<'a> {
    registry: &'a RuleRegistry,
    backup: BackupManager,
    fixers: Vec<Box<dyn Fixer>>,
    options: FixOptions,
    verifier: Verifier,
}

impl<'a> AutoFixEngine<'a> {
    pub fn new(registry: &'a RuleRegistry, backup: BackupManager, options: FixOptions) -> Self {
        let root = options.project_root.clone();
        Self {
            registry,
            backup,
            fixers: default_fixers(),
            options,
            verifier: Box::new(move |path| {
                crate::typecheck::check_file(path, &root).map(|o| o.success)
            }),
        }
    }

    /// Reemplaza el verificador externo. Seam para tests: permite simular
    /// fallas de verificación sin un tsc instalado.
    pub fn with_verifier(mut self, verifier: impl Fn(&Path) -> anyhow::Result<bool> + 'static) -> Self {
        self.verifier = Box::new(verifier);
        self
    }

    /// Corrige un archivo. Devuelve true si el archivo quedó commiteado con
    /// al menos un fix aplicado.
    pub fn fix_file(
        &mut self,
        path: &Path,
        violations: &[Violation],
        report: &mut AutoFixReport,
    ) -> anyhow::Result<bool> {
        let original = std::fs::read_to_string(path)?;

        // Backed-up: el snapshot va antes de cualquier escritura, incluso si
        // al final ningún fixer aplica.
        let backup_info = if self.options.dry_run || self.options.skip_backup {
            None
        } else {
            Some(self.backup.backup_file(path)?)
        };

        // Mutating: orden canónico, primer fixer que reclama es exclusivo.
        let mut ordered: Vec<Violation> = violations.to_vec();
        validator::sort_violations(&mut ordered);

        let mut working = original.clone();
        let mut applied_here = 0usize;

        for violation in &ordered {
            let Some(rule) = self.registry.get(&violation.rule_id) else {
                continue;
            };
            let claimant = self
                .fixers
                .iter()
                .find(|f| f.rule_name() == rule.name && f.can_fix(violation, &working));
            let Some(fixer) = claimant else {
                continue;
            };

            let outcome = fixer.fix(violation, &working);
            if outcome.applied {
                if let Some(text) = outcome.text {
                    working = text;
                    applied_here += 1;
                    report.fixed_count += 1;
                }
            } else if let Some(error) = outcome.error {
                report.failed_count += 1;
                report
                    .errors
                    .push(format!("{} [{}]: {}", path.display(), fixer.name(), error));
            } else {
                report.skipped_count += 1;
            }
        }

        if applied_here == 0 {
            // Nada mutado: se abandona sin escribir, no hay rollback que hacer.
            return Ok(false);
        }

        if self.options.dry_run {
            return Ok(false);
        }

        std::fs::write(path, &working)?;

        // Verifying.
        if !self.options.skip_verify {
            let verified = (self.verifier)(path).unwrap_or(false);
            if !verified {
                match &backup_info {
                    Some(info) => self.backup.restore_file(info)?,
                    None => std::fs::write(path, &original)?,
                }
                report.fixed_count -= applied_here;
                report.failed_count += applied_here;
                report.errors.push(format!(
                    "{}: verificación de tipos falló, rollback aplicado (archivo intacto)",
                    path.display()
                ));
                return Ok(false);
            }
        }

        report.files_modified.push(path.display().to_string());
        Ok(true)
    }

    /// Sesión completa: archivos independientes entre sí, un reporte
    /// compartido, manifiesto persistido al cierre.
    pub fn fix_all(&mut self, violations: &[Violation]) -> anyhow::Result<AutoFixReport> {
        let mut report = AutoFixReport {
            total_violations: violations.len(),
            ..Default::default()
        };

        let mut by_file: BTreeMap<String, Vec<Violation>> = BTreeMap::new();
        for v in violations {
            by_file.entry(v.file_path.clone()).or_default().push(v.clone());
        }

        for (file_path, file_violations) in by_file {
            let path = self.options.project_root.join(&file_path);
            let path = if path.exists() { path } else { PathBuf::from(&file_path) };
            if let Err(e) = self.fix_file(&path, &file_violations, &mut report) {
                report.errors.push(format!("{}: {}", file_path, e));
            }
        }

        report.success_rate = if report.total_violations == 0 {
            0.0
        } else {
            report.fixed_count as f64 / report.total_violations as f64
        };
        report.backups = self.backup.manifest().to_vec();
        if !self.options.dry_run && !self.options.skip_backup && !report.backups.is_empty() {
            self.backup.save_manifest()?;
        }
        Ok(report)
    }
}

/// Catálogo de fixers en orden fijo de prioridad.
pub fn default_fixers() -> Vec<Box<dyn Fixer>> {
    vec![
        Box::new(UseClientFixer),
        Box::new(ExportStyleFixer),
        Box::new(DebugStatementFixer),
        Box::new(ReturnTypeFixer),
    ]
}

// ---------------------------------------------------------------------------
// Fixers
// ---------------------------------------------------------------------------

/// Inserta la directiva 'use client' como primera línea no-comentario cuando
/// hay hooks y no existe directiva todavía.
pub struct UseClientFixer;

impl Fixer for UseClientFixer {
    fn name(&self) -> &'static str {
        "use-client-directive"
    }
    fn rule_name(&self) -> &'static str {
        "hooks-require-use-client"
    }
    fn description(&self) -> &'static str {
        "Inserta 'use client'; al tope del archivo"
    }

    fn can_fix(&self, _violation: &Violation, text: &str) -> bool {
        !text.contains("use client") && !text.contains("use server")
    }

    fn fix(&self, _violation: &Violation, text: &str) -> FixOutcome {
        let lines: Vec<&str> = text.lines().collect();
        let mut insert_at = 0;
        let mut in_block_comment = false;
        for (idx, line) in lines.iter().enumerate() {
            let trimmed = line.trim();
            if in_block_comment {
                if trimmed.contains("*/") {
                    in_block_comment = false;
                }
                insert_at = idx + 1;
                continue;
            }
            if trimmed.is_empty() || trimmed.starts_with("//") {
                insert_at = idx + 1;
                continue;
            }
            if trimmed.starts_with("/*") {
                if !trimmed.contains("*/") {
                    in_block_comment = true;
                }
                insert_at = idx + 1;
                continue;
            }
            insert_at = idx;
            break;
        }

        let mut nuevas: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        nuevas.insert(insert_at.min(nuevas.len()), "'use client';".to_string());
        if insert_at == 0 {
            nuevas.insert(1, String::new());
        }
        FixOutcome::applied(nuevas.join("\n") + "\n")
    }
}

static DEFAULT_FN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(\s*)export\s+default\s+((?:async\s+)?(?:function|class)\s+[A-Za-z_$][\w$]*)").unwrap()
});
static DEFAULT_IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*export\s+default\s+([A-Za-z_$][\w$]*)\s*;\s*$").unwrap());

/// Reescribe export default con nombre a named export.
pub struct ExportStyleFixer;

impl Fixer for ExportStyleFixer {
    fn name(&self) -> &'static str {
        "export-style"
    }
    fn rule_name(&self) -> &'static str {
        "no-default-export-component"
    }
    fn description(&self) -> &'static str {
        "Convierte export default en named export"
    }

    fn can_fix(&self, _violation: &Violation, text: &str) -> bool {
        if DEFAULT_FN_RE.is_match(text) {
            return true;
        }
        if let Some(caps) = DEFAULT_IDENT_RE.captures(text) {
            let ident = &caps[1];
            return declaration_re(ident).is_match(text);
        }
        false
    }

    fn fix(&self, _violation: &Violation, text: &str) -> FixOutcome {
        if DEFAULT_FN_RE.is_match(text) {
            let nuevo = DEFAULT_FN_RE.replace(text, "${1}export ${2}").to_string();
            return FixOutcome::applied(nuevo);
        }
        if let Some(caps) = DEFAULT_IDENT_RE.captures(text) {
            let ident = caps[1].to_string();
            let decl_re = declaration_re(&ident);
            if decl_re.is_match(text) {
                let sin_trailing = DEFAULT_IDENT_RE.replace(text, "").to_string();
                let nuevo = decl_re
                    .replace(&sin_trailing, format!("${{1}}export const {} =", ident))
                    .to_string();
                return FixOutcome::applied(nuevo);
            }
        }
        // Export default anónimo: no hay nombre al que atar el named export.
        FixOutcome::declined()
    }
}

fn declaration_re(ident: &str) -> Regex {
    Regex::new(&format!(r"(?m)^(\s*)const\s+{}\s*=", regex::escape(ident))).unwrap()
}

static DEBUG_CALL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"console\.(log|debug|info)\s*\(").unwrap());

/// Comenta (nunca borra) las llamadas de debug, tanto líneas enteras como
/// ocurrencias inline.
pub struct DebugStatementFixer;

impl Fixer for DebugStatementFixer {
    fn name(&self) -> &'static str {
        "debug-statement"
    }
    fn rule_name(&self) -> &'static str {
        "no-debug-statements"
    }
    fn description(&self) -> &'static str {
        "Comenta llamadas console.log/debug/info"
    }

    fn can_fix(&self, violation: &Violation, text: &str) -> bool {
        locate_line(text, violation.line, |l| {
            DEBUG_CALL_RE.is_match(l) && !l.trim_start().starts_with("//")
        })
        .is_some()
    }

    fn fix(&self, violation: &Violation, text: &str) -> FixOutcome {
        let mut lines: Vec<String> = text.lines().map(|l| l.to_string()).collect();
        let Some(idx) = locate_line(text, violation.line, |l| {
            DEBUG_CALL_RE.is_match(l) && !l.trim_start().starts_with("//")
        }) else {
            return FixOutcome::failed("no quedó ninguna llamada de debug sin comentar");
        };
        let line = lines[idx].clone();
        let trimmed = line.trim_start();

        if trimmed.starts_with("console.") {
            // Sentencia de línea entera: prefijo de comentario preservando indentación.
            let indent_len = line.len() - trimmed.len();
            lines[idx] = format!("{}// {}", &line[..indent_len], trimmed);
        } else if let Some(m) = DEBUG_CALL_RE.find(&line) {
            // Ocurrencia inline: envolver la llamada completa en comentario de bloque.
            let Some(end) = find_call_end(&line, m.start()) else {
                return FixOutcome::failed("no se encontró el cierre de la llamada");
            };
            let mut nueva = String::with_capacity(line.len() + 6);
            nueva.push_str(&line[..m.start()]);
            nueva.push_str("/* ");
            nueva.push_str(&line[m.start()..end]);
            nueva.push_str(" */");
            nueva.push_str(&line[end..]);
            lines[idx] = nueva;
        } else {
            return FixOutcome::declined();
        }

        FixOutcome::applied(lines.join("\n") + "\n")
    }
}

/// Ubica la línea objetivo de un fixer. Los fixers previos del mismo archivo
/// pueden haber desplazado el texto (la directiva se inserta al tope), así
/// que la línea reportada es una pista, no una garantía: si ya no coincide,
/// se busca la primera línea que sí lo haga.
fn locate_line(text: &str, hint: usize, predicate: impl Fn(&str) -> bool) -> Option<usize> {
    let lines: Vec<&str> = text.lines().collect();
    let hint_idx = hint.saturating_sub(1);
    if lines.get(hint_idx).map(|l| predicate(l)).unwrap_or(false) {
        return Some(hint_idx);
    }
    lines.iter().position(|l| predicate(l))
}

/// Balance de paréntesis desde el inicio de la llamada; incluye el `;` si
/// sigue inmediatamente.
fn find_call_end(line: &str, start: usize) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut depth = 0i32;
    let mut seen_open = false;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        match b {
            b'(' => {
                depth += 1;
                seen_open = true;
            }
            b')' => {
                depth -= 1;
                if seen_open && depth == 0 {
                    let mut end = start + offset + 1;
                    if bytes.get(end) == Some(&b';') {
                        end += 1;
                    }
                    return Some(end);
                }
            }
            _ => {}
        }
    }
    None
}

static FN_SIGNATURE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bfunction\s+\w+\s*\(([^)]*)\)\s*\{").unwrap());
static FETCH_RETURN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"return\s+(await\s+)?fetch\s*\(").unwrap());

/// Agrega ': void' a funciones sin return en el cuerpo. Declina explícitamente
/// cuando el cuerpo devuelve el resultado de un fetch: inferir el genérico
/// correcto requiere información de tipos que este fixer no tiene.
pub struct ReturnTypeFixer;

impl Fixer for ReturnTypeFixer {
    fn name(&self) -> &'static str {
        "return-type"
    }
    fn rule_name(&self) -> &'static str {
        "explicit-return-types"
    }
    fn description(&self) -> &'static str {
        "Agrega ': void' a funciones sin return"
    }

    fn can_fix(&self, violation: &Violation, text: &str) -> bool {
        locate_line(text, violation.line, |l| FN_SIGNATURE_RE.is_match(l)).is_some()
    }

    fn fix(&self, violation: &Violation, text: &str) -> FixOutcome {
        let lines: Vec<&str> = text.lines().collect();
        let Some(idx) = locate_line(text, violation.line, |l| FN_SIGNATURE_RE.is_match(l)) else {
            return FixOutcome::declined();
        };
        let line = lines[idx];
        let Some(m) = FN_SIGNATURE_RE.find(line) else {
            return FixOutcome::declined();
        };

        let body = function_body(&lines, idx, line);
        if FETCH_RETURN_RE.is_match(&body) {
            return FixOutcome::failed(
                "la función devuelve un fetch: el tipo de retorno requiere revisión manual",
            );
        }
        if body.contains("return ") || body.contains("return;") {
            // Tiene return con valor posible: no se puede asumir void.
            return FixOutcome::declined();
        }

        // Insertar ': void' entre el ')' de cierre y el '{'.
        let abs_brace = m.end() - 1;
        let close_paren = line[..abs_brace].rfind(')').unwrap_or(abs_brace);
        let mut nueva = String::with_capacity(line.len() + 7);
        nueva.push_str(&line[..close_paren + 1]);
        nueva.push_str(": void");
        nueva.push_str(&line[close_paren + 1..]);

        let mut nuevas: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        nuevas[idx] = nueva;
        FixOutcome::applied(nuevas.join("\n") + "\n")
    }
}

/// Cuerpo de la función por balance de llaves desde la línea de la firma.
fn function_body(lines: &[&str], start_idx: usize, first_line: &str) -> String {
    let mut depth = 0i32;
    let mut seen_open = false;
    let mut body = String::new();
    let brace_offset = first_line.find('{').unwrap_or(0);

    for (i, line) in lines.iter().enumerate().skip(start_idx) {
        let desde = if i == start_idx { brace_offset } else { 0 };
        for c in line[desde..].chars() {
            match c {
                '{' => {
                    depth += 1;
                    seen_open = true;
                }
                '}' => {
                    depth -= 1;
                    if seen_open && depth == 0 {
                        return body;
                    }
                }
                _ => {}
            }
            body.push(c);
        }
        body.push('\n');
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::SyntaxAnalyzer;
    use crate::matcher::match_rule;
    use crate::standards::{patterns, Standard};
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

    fn violaciones_de(registry: &RuleRegistry, src: &str, path: &str) -> Vec<Violation> {
        let ext = path.rsplit('.').next().unwrap();
        let parsed = SyntaxAnalyzer::new().parse_source(src, ext).unwrap();
        let mut todas = Vec::new();
        for rule in registry.rules() {
            todas.extend(match_rule(rule, &parsed, src, std::path::Path::new(path)));
        }
        todas
    }

    fn engine_sin_verificar<'a>(registry: &'a RuleRegistry, dir: &TempDir) -> AutoFixEngine<'a> {
        let backup = BackupManager::new(&dir.path().join(".backups"), "test");
        let mut options = FixOptions::new(dir.path());
        options.skip_verify = true;
        AutoFixEngine::new(registry, backup, options)
    }

    #[test]
    fn test_escenario_directiva_mas_debug_fixed_2() {
        let dir = TempDir::new().unwrap();
        let archivo = dir.path().join("Componente.tsx");
        let src = "function Panel() {\n  const [a] = useState(0);\n  console.log(a);\n  return <div>{a}</div>;\n}\n";
        fs::write(&archivo, src).unwrap();

        let reg = registro();
        let violations = violaciones_de(&reg, src, archivo.to_str().unwrap());
        let mut engine = engine_sin_verificar(&reg, &dir);
        let report = engine.fix_all(&violations).unwrap();

        assert_eq!(report.fixed_count, 2, "directiva + debug: {:?}", report.errors);
        assert_eq!(report.files_modified.len(), 1);

        let resultado = fs::read_to_string(&archivo).unwrap();
        assert_eq!(resultado.lines().next().unwrap(), "'use client';");
        assert!(resultado.contains("// console.log(a);"));
        assert!(!resultado.contains("\n  console.log(a);"), "no debe quedar sin comentar");
    }

    #[test]
    fn test_idempotencia_de_directiva_y_export_style() {
        let dir = TempDir::new().unwrap();
        let archivo = dir.path().join("Pagina.tsx");
        let src = "export default function Pagina() {\n  const [a] = useState(0);\n  return <div>{a}</div>;\n}\n";
        fs::write(&archivo, src).unwrap();

        let reg = registro();
        let violations = violaciones_de(&reg, src, archivo.to_str().unwrap());
        let mut engine = engine_sin_verificar(&reg, &dir);
        let primera = engine.fix_all(&violations).unwrap();
        assert!(primera.fixed_count >= 2);

        // Segunda pasada sobre el archivo ya corregido: nada que reclamar
        // para los fixers de directiva y export-style.
        let corregido = fs::read_to_string(&archivo).unwrap();
        let segundas = violaciones_de(&reg, &corregido, archivo.to_str().unwrap());
        let backup2 = BackupManager::new(&dir.path().join(".backups"), "test2");
        let mut options2 = FixOptions::new(dir.path());
        options2.skip_verify = true;
        let mut engine2 = AutoFixEngine::new(&reg, backup2, options2);
        let segunda = engine2.fix_all(&segundas).unwrap();

        let re_fixeados: Vec<_> = segunda
            .files_modified
            .iter()
            .filter(|f| {
                let texto = fs::read_to_string(f).unwrap_or_default();
                texto.matches("use client").count() > 1 || texto.contains("export default function")
            })
            .collect();
        assert!(re_fixeados.is_empty());
        let final_texto = fs::read_to_string(&archivo).unwrap();
        assert_eq!(final_texto.matches("'use client';").count(), 1);
        assert!(final_texto.contains("export function Pagina"));
    }

    #[test]
    fn test_rollback_restaura_byte_a_byte() {
        let dir = TempDir::new().unwrap();
        let archivo = dir.path().join("roto.ts");
        let src = "function f() {\n  console.log('x');\n}\n";
        fs::write(&archivo, src).unwrap();
        let hash_original = backup::hash_bytes(src.as_bytes());

        let reg = registro();
        let violations = violaciones_de(&reg, src, archivo.to_str().unwrap());
        let backup_mgr = BackupManager::new(&dir.path().join(".backups"), "test");
        let options = FixOptions::new(dir.path());
        let mut engine =
            AutoFixEngine::new(&reg, backup_mgr, options).with_verifier(|_| Ok(false));

        let report = engine.fix_all(&violations).unwrap();

        assert!(report.errors.iter().any(|e| e.contains("rollback")));
        assert_eq!(report.fixed_count, 0);
        assert!(report.files_modified.is_empty());
        let actual = fs::read(&archivo).unwrap();
        assert_eq!(backup::hash_bytes(&actual), hash_original);
    }

    #[test]
    fn test_dry_run_no_escribe() {
        let dir = TempDir::new().unwrap();
        let archivo = dir.path().join("seco.ts");
        let src = "function f() {\n  console.log('x');\n}\n";
        fs::write(&archivo, src).unwrap();

        let reg = registro();
        let violations = violaciones_de(&reg, src, archivo.to_str().unwrap());
        let backup_mgr = BackupManager::new(&dir.path().join(".backups"), "test");
        let mut options = FixOptions::new(dir.path());
        options.dry_run = true;
        let mut engine = AutoFixEngine::new(&reg, backup_mgr, options);
        let report = engine.fix_all(&violations).unwrap();

        assert!(report.fixed_count >= 1, "dry-run cuenta lo que aplicaría");
        assert!(report.files_modified.is_empty());
        assert_eq!(fs::read_to_string(&archivo).unwrap(), src);
    }

    #[test]
    fn test_export_default_function_a_named() {
        let fixer = ExportStyleFixer;
        let v = Violation {
            rule_id: "rea-000".into(),
            file_path: "x.tsx".into(),
            line: 1,
            column: 0,
            severity: crate::standards::Severity::Warning,
            message: String::new(),
            code_snippet: String::new(),
            fix_suggestion: None,
        };
        let src = "export default function Tarjeta() {\n  return <div/>;\n}\n";
        assert!(fixer.can_fix(&v, src));
        let out = fixer.fix(&v, src);
        assert!(out.applied);
        assert!(out.text.unwrap().starts_with("export function Tarjeta()"));
    }

    #[test]
    fn test_export_default_identificador_trailing() {
        let fixer = ExportStyleFixer;
        let v = Violation {
            rule_id: "rea-000".into(),
            file_path: "x.tsx".into(),
            line: 3,
            column: 0,
            severity: crate::standards::Severity::Warning,
            message: String::new(),
            code_snippet: String::new(),
            fix_suggestion: None,
        };
        let src = "const Tarjeta = () => <div/>;\n\nexport default Tarjeta;\n";
        assert!(fixer.can_fix(&v, src));
        let out = fixer.fix(&v, src);
        assert!(out.applied);
        let texto = out.text.unwrap();
        assert!(texto.contains("export const Tarjeta ="));
        assert!(!texto.contains("export default"));
    }

    #[test]
    fn test_export_default_anonimo_declina() {
        let fixer = ExportStyleFixer;
        let v = Violation {
            rule_id: "rea-000".into(),
            file_path: "x.tsx".into(),
            line: 1,
            column: 0,
            severity: crate::standards::Severity::Warning,
            message: String::new(),
            code_snippet: String::new(),
            fix_suggestion: None,
        };
        assert!(!fixer.can_fix(&v, "export default () => <div/>;\n"));
    }

    #[test]
    fn test_debug_inline_se_envuelve_en_bloque() {
        let fixer = DebugStatementFixer;
        let v = Violation {
            rule_id: "tes-000".into(),
            file_path: "x.ts".into(),
            line: 1,
            column: 10,
            severity: crate::standards::Severity::Warning,
            message: String::new(),
            code_snippet: String::new(),
            fix_suggestion: None,
        };
        let src = "calcular(); console.log('traza'); seguir();\n";
        let out = fixer.fix(&v, src);
        assert!(out.applied);
        let texto = out.text.unwrap();
        assert!(texto.contains("/* console.log('traza'); */"));
        assert!(texto.contains("calcular();"));
        assert!(texto.contains("seguir();"));
    }

    #[test]
    fn test_return_type_void_y_declina_fetch() {
        let fixer = ReturnTypeFixer;
        let v = |line| Violation {
            rule_id: "typ-000".into(),
            file_path: "x.ts".into(),
            line,
            column: 0,
            severity: crate::standards::Severity::Info,
            message: String::new(),
            code_snippet: String::new(),
            fix_suggestion: None,
        };

        let sin_return = "function registrar(nombre: string) {\n  lista.push(nombre);\n}\n";
        let out = fixer.fix(&v(1), sin_return);
        assert!(out.applied);
        assert!(out.text.unwrap().contains("function registrar(nombre: string): void {"));

        let con_fetch = "function cargar() {\n  return fetch('/api/datos');\n}\n";
        let out = fixer.fix(&v(1), con_fetch);
        assert!(!out.applied);
        assert!(out.error.unwrap().contains("revisión manual"));
    }

    #[test]
    fn test_success_rate_cero_sin_violaciones() {
        let dir = TempDir::new().unwrap();
        let reg = registro();
        let mut engine = engine_sin_verificar(&reg, &dir);
        let report = engine.fix_all(&[]).unwrap();
        assert_eq!(report.success_rate, 0.0);
        assert_eq!(report.total_violations, 0);
    }

    #[test]
    fn test_directiva_se_inserta_despues_de_comentarios() {
        let fixer = UseClientFixer;
        let v = Violation {
            rule_id: "rea-000".into(),
            file_path: "x.tsx".into(),
            line: 3,
            column: 0,
            severity: crate::standards::Severity::Error,
            message: String::new(),
            code_snippet: String::new(),
            fix_suggestion: None,
        };
        let src = "// Licencia\n/* cabecera\n   larga */\nimport { useState } from 'react';\n";
        let out = fixer.fix(&v, src);
        assert!(out.applied);
        let texto = out.text.unwrap();
        let lineas: Vec<&str> = texto.lines().collect();
        assert_eq!(lineas[3], "'use client';");
        assert_eq!(lineas[4], "import { useState } from 'react';");
    }
}
