//! Parser de documentos de estándares.
//!
//! Convierte los markdown semi-estructurados (uno por estándar) en reglas
//! normalizadas. El formato es una convención humana, no una gramática: el
//! parser es una máquina de estados por líneas que tolera documentos
//! malformados — en el peor caso un estándar aporta cero reglas y la
//! ejecución continúa.

use crate::standards::{
    patterns, ParsedStandard, Rule, RuleExamples, Severity, Standard,
};
use anyhow::Context;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Parsea todos los documentos del directorio de estándares. Es el único
/// punto fatal del motor: sin directorio no hay registro posible.
pub fn parse_all_standards(dir: &Path) -> anyhow::Result<Vec<ParsedStandard>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("No existe el directorio de estándares: {}", dir.display()))?;

    let mut parsed = Vec::new();
    let mut paths: Vec<_> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("md"))
        .collect();
    paths.sort();

    for path in paths {
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        // Archivos que no mapean (README, índice) se saltan sin error.
        let Some(standard) = Standard::from_filename(file_name) else {
            continue;
        };
        match parse_standard_file(&path, standard) {
            Ok(doc) => parsed.push(doc),
            Err(e) => {
                // Documento ilegible: el estándar aporta cero reglas.
                eprintln!("   ⚠️  No se pudo parsear {}: {}", path.display(), e);
            }
        }
    }

    Ok(parsed)
}

/// Parsea un documento. Las reglas derivadas de ejemplos van primero, luego
/// el catálogo fijo de patrones del estándar, compartiendo un contador que
/// arranca en 1 por documento.
pub fn parse_standard_file(path: &Path, standard: Standard) -> anyhow::Result<ParsedStandard> {
    let raw_content = fs::read_to_string(path)
        .with_context(|| format!("Error al leer {}", path.display()))?;

    let mut counter: u32 = 1;
    let mut rules = Vec::new();

    for section in split_sections(&raw_content) {
        rules.extend(scan_section(&section, standard, &mut counter));
    }
    rules.extend(patterns::pattern_rules(standard, &mut counter));

    Ok(ParsedStandard {
        standard,
        file_path: path.to_path_buf(),
        rules,
        raw_content,
    })
}

struct Section {
    heading: String,
    body: Vec<String>,
}

/// Divide el documento en secciones por headings de segundo nivel. El
/// contenido antes del primer `## ` forma una sección con heading vacío.
fn split_sections(content: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current = Section { heading: String::new(), body: Vec::new() };

    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("## ") {
            if !current.heading.is_empty() || !current.body.is_empty() {
                sections.push(current);
            }
            current = Section { heading: rest.trim().to_string(), body: Vec::new() };
        } else {
            current.body.push(line.to_string());
        }
    }
    if !current.heading.is_empty() || !current.body.is_empty() {
        sections.push(current);
    }
    sections
}

#[derive(PartialEq)]
enum BlockKind {
    Incorrect,
    Correct,
    Unmarked,
}

/// Clasifica la línea inmediatamente anterior a un bloque de código.
/// Los glifos mandan; las palabras clave son el fallback. "incorrect" se
/// chequea antes que "correct" porque lo contiene como substring.
fn classify_marker(line: &str) -> BlockKind {
    if line.contains('❌') {
        return BlockKind::Incorrect;
    }
    if line.contains('✅') {
        return BlockKind::Correct;
    }
    let lower = line.to_lowercase();
    for palabra in ["incorrect", "avoid", "wrong", "bad"] {
        if lower.contains(palabra) {
            return BlockKind::Incorrect;
        }
    }
    for palabra in ["correct", "good", "prefer"] {
        if lower.contains(palabra) {
            return BlockKind::Correct;
        }
    }
    BlockKind::Unmarked
}

fn is_plain_text(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && !trimmed.starts_with('#')
        && !trimmed.starts_with("<!--")
        && !trimmed.starts_with("```")
}

/// Escanea una sección: pares consecutivos incorrecto+correcto se capturan
/// como una regla. Un bloque incorrecto sin su par correcto (o al revés) no
/// produce regla.
fn scan_section(section: &Section, standard: Standard, counter: &mut u32) -> Vec<Rule> {
    let mut rules = Vec::new();

    let mut description: Option<String> = None;
    let mut pending_incorrect: Option<String> = None;
    let mut last_marker = BlockKind::Unmarked;
    let mut code_lines: Option<Vec<String>> = None;

    for line in &section.body {
        if line.trim_start().starts_with("```") {
            match code_lines.take() {
                None => {
                    // Abre un bloque; la línea anterior ya quedó clasificada.
                    code_lines = Some(Vec::new());
                }
                Some(block) => {
                    let code = block.join("\n");
                    match last_marker {
                        BlockKind::Incorrect => pending_incorrect = Some(code),
                        BlockKind::Correct => {
                            if let Some(incorrect) = pending_incorrect.take() {
                                rules.push(build_example_rule(
                                    section,
                                    standard,
                                    counter,
                                    description.take(),
                                    incorrect,
                                    code,
                                ));
                            }
                            // Bloque correcto huérfano: se descarta.
                        }
                        BlockKind::Unmarked => {
                            // Bloque sin marcador: no participa de ningún par.
                        }
                    }
                    last_marker = BlockKind::Unmarked;
                }
            }
            continue;
        }

        match code_lines {
            Some(ref mut block) => block.push(line.clone()),
            None => {
                let kind = classify_marker(line);
                if kind != BlockKind::Unmarked {
                    last_marker = kind;
                } else if is_plain_text(line) {
                    // Una línea de texto entre el marcador y el fence anula
                    // el marcador: solo cuenta la línea inmediatamente previa
                    // (las líneas en blanco se toleran).
                    last_marker = BlockKind::Unmarked;
                    if description.is_none() {
                        description = Some(line.trim().to_string());
                    }
                }
            }
        }
    }

    rules
}

fn build_example_rule(
    section: &Section,
    standard: Standard,
    counter: &mut u32,
    description: Option<String>,
    incorrect: String,
    correct: String,
) -> Rule {
    let id = format!("{}-{:03}", standard.prefix(), *counter);
    *counter += 1;

    let name = slugify(&section.heading);
    let message = description.unwrap_or_else(|| {
        if section.heading.is_empty() {
            format!("Regla de {}", standard.as_str())
        } else {
            section.heading.clone()
        }
    });
    let severity = infer_severity(&section.heading, &message);
    let pattern = derive_pattern(&incorrect);
    let fix_template = correct
        .lines()
        .find(|l| !l.trim().is_empty())
        .map(|l| format!("Prefiere: {}", l.trim()));

    Rule {
        id,
        name,
        standard,
        severity,
        message,
        examples: RuleExamples { incorrect, correct },
        pattern,
        ast_matcher: None,
        fix_template,
    }
}

fn slugify(heading: &str) -> String {
    let mut slug = String::with_capacity(heading.len());
    let mut prev_dash = true;
    for c in heading.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            prev_dash = false;
        } else if !prev_dash {
            slug.push('-');
            prev_dash = true;
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() { "regla".to_string() } else { slug }
}

/// Heurística de severidad por palabras clave en heading y descripción.
fn infer_severity(heading: &str, description: &str) -> Severity {
    let text = format!("{} {}", heading, description).to_lowercase();
    for palabra in ["security", "vulnerability", "must", "never", "critical"] {
        if text.contains(palabra) {
            return Severity::Error;
        }
    }
    for palabra in ["should", "recommend"] {
        if text.contains(palabra) {
            return Severity::Warning;
        }
    }
    for palabra in ["consider", "optional"] {
        if text.contains(palabra) {
            return Severity::Info;
        }
    }
    Severity::Warning
}

/// Deriva un regex de fragmentos reconocibles del ejemplo incorrecto. Si no
/// reconoce nada, la regla queda sin patrón y depende del canal AST o de
/// revisión manual — no toda regla documentada necesita detector automático.
fn derive_pattern(incorrect: &str) -> Option<Regex> {
    let fragmentos: [(&str, &str); 10] = [
        (": any", r":\s*any\b"),
        ("<any>", r"<any>"),
        ("@ts-", r"@ts-(ignore|nocheck)"),
        ("eval(", r"\beval\s*\("),
        ("console.log", r"\bconsole\.(log|debug|info)\s*\("),
        ("export default", r"^\s*export\s+default\b"),
        ("dangerouslySetInnerHTML", r"dangerouslySetInnerHTML"),
        ("document.cookie", r"document\.cookie"),
        ("var ", r"\bvar\s+[A-Za-z_$]"),
        ("!important", r"!important"),
    ];
    for (fragmento, pattern) in fragmentos {
        if incorrect.contains(fragmento) {
            return Regex::new(pattern).ok();
        }
    }
    None
}
