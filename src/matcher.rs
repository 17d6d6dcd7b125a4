//! Matcher de reglas.
//!
//! Evalúa una regla contra un archivo combinando dos canales independientes:
//! el textual (regex línea por línea) y el semántico (hechos del analizador
//! más matchers sintácticos). Los dos canales se unen como conjunto; el orden
//! canónico lo impone después el orquestador, no este módulo.

use crate::analyzer::{ComponentKind, ParsedFile};
use crate::standards::{AstMatcher, Rule, Severity, Standard};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use tree_sitter::Node;

/// Una detección concreta: la regla `rule_id` rota en `file_path`, línea
/// `line`. Una regla que dispara dos veces en un archivo produce dos
/// violaciones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub rule_id: String,
    pub file_path: String,
    pub line: usize,
    pub column: usize,
    pub severity: Severity,
    pub message: String,
    pub code_snippet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_suggestion: Option<String>,
}

/// Evalúa una regla contra un archivo. Ambos canales corren siempre; los
/// duplicados exactos (misma línea y columna) se colapsan.
pub fn match_rule(
    rule: &Rule,
    parsed: &ParsedFile,
    source: &str,
    file_path: &Path,
) -> Vec<Violation> {
    let lines: Vec<&str> = source.lines().collect();
    let mut violations = Vec::new();

    if let Some(ref pattern) = rule.pattern {
        for (idx, line) in lines.iter().enumerate() {
            if let Some(m) = pattern.find(line) {
                violations.push(build_violation(
                    rule,
                    file_path,
                    idx + 1,
                    m.start(),
                    &lines,
                    None,
                ));
            }
        }
    }

    violations.extend(semantic_channel(rule, parsed, source, file_path, &lines));

    if let Some(matcher) = rule.ast_matcher {
        violations.extend(evaluate_ast_matcher(
            matcher, rule, parsed, source, file_path, &lines,
        ));
    }

    // Unión de conjuntos: un hit del regex y otro del canal AST sobre la
    // misma posición cuentan una sola vez.
    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    violations.retain(|v| seen.insert((v.line, v.column)));
    violations
}

fn build_violation(
    rule: &Rule,
    file_path: &Path,
    line: usize,
    column: usize,
    lines: &[&str],
    message_override: Option<String>,
) -> Violation {
    Violation {
        rule_id: rule.id.clone(),
        file_path: file_path.display().to_string(),
        line,
        column,
        severity: rule.severity,
        message: message_override.unwrap_or_else(|| rule.message.clone()),
        code_snippet: snippet(lines, line),
        fix_suggestion: rule.fix_template.clone(),
    }
}

/// Contexto de 3 líneas: una antes, la violada, una después.
fn snippet(lines: &[&str], line: usize) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let idx = line.saturating_sub(1).min(lines.len() - 1);
    let start = idx.saturating_sub(1);
    let end = (idx + 2).min(lines.len());
    lines[start..end].join("\n")
}

/// Canal semántico: despacho por el enum `Standard` de la regla hacia el
/// chequeo específico de ese estándar sobre los hechos del archivo.
fn semantic_channel(
    rule: &Rule,
    parsed: &ParsedFile,
    _source: &str,
    file_path: &Path,
    lines: &[&str],
) -> Vec<Violation> {
    match rule.standard {
        Standard::React => check_react(rule, parsed, file_path, lines),
        Standard::Typescript => check_typescript(rule, parsed, file_path, lines),
        // Los demás estándares se cubren con regex y ast_matcher.
        Standard::NextJs
        | Standard::Convex
        | Standard::Security
        | Standard::Testing
        | Standard::Forms
        | Standard::Styling => Vec::new(),
    }
}

fn check_react(
    rule: &Rule,
    parsed: &ParsedFile,
    file_path: &Path,
    lines: &[&str],
) -> Vec<Violation> {
    let mut violations = Vec::new();
    match rule.name.as_str() {
        "hooks-require-use-client" => {
            if !parsed.hooks.is_empty()
                && !parsed.directives.use_client
                && !parsed.directives.use_server
            {
                let primero = &parsed.hooks[0];
                violations.push(build_violation(
                    rule,
                    file_path,
                    primero.line,
                    0,
                    lines,
                    Some(format!(
                        "Hook '{}' usado sin directiva 'use client' en el archivo.",
                        primero.name
                    )),
                ));
            }
        }
        "no-class-components" => {
            for comp in parsed.components.iter().filter(|c| c.kind == ComponentKind::Class) {
                violations.push(build_violation(rule, file_path, comp.line, 0, lines, None));
            }
        }
        "no-default-export-component" => {
            for export in parsed.exports.iter().filter(|e| e.is_default) {
                violations.push(build_violation(rule, file_path, export.line, 0, lines, None));
            }
        }
        _ => {}
    }
    violations
}

fn check_typescript(
    rule: &Rule,
    parsed: &ParsedFile,
    file_path: &Path,
    lines: &[&str],
) -> Vec<Violation> {
    let mut violations = Vec::new();
    match rule.name.as_str() {
        "no-any-type" => {
            for f in parsed.functions.iter().filter(|f| f.any_params > 0) {
                violations.push(build_violation(
                    rule,
                    file_path,
                    f.line,
                    0,
                    lines,
                    Some(format!(
                        "La función '{}' declara {} parámetro(s) tipados como 'any'.",
                        f.name, f.any_params
                    )),
                ));
            }
        }
        "no-type-errors" => {
            for diag in &parsed.diagnostics {
                violations.push(build_violation(
                    rule,
                    file_path,
                    diag.line,
                    diag.column.saturating_sub(1),
                    lines,
                    Some(format!("{}: {}", diag.code, diag.message)),
                ));
            }
        }
        _ => {}
    }
    violations
}

/// Evalúa un matcher sintáctico. Las variantes cerradas usan los hechos ya
/// extraídos cuando alcanzan, o una pasada sobre el árbol crudo cuando no.
/// El predicado Custom se evalúa nodo a nodo atrapando pánicos: un predicado
/// roto no aborta el análisis del resto.
fn evaluate_ast_matcher(
    matcher: AstMatcher,
    rule: &Rule,
    parsed: &ParsedFile,
    source: &str,
    file_path: &Path,
    lines: &[&str],
) -> Vec<Violation> {
    let mut violations = Vec::new();
    match matcher {
        AstMatcher::AnyType => {
            for f in parsed.functions.iter().filter(|f| f.any_params > 0) {
                violations.push(build_violation(rule, file_path, f.line, 0, lines, None));
            }
        }
        AstMatcher::DefaultExport => {
            for export in parsed.exports.iter().filter(|e| e.is_default) {
                violations.push(build_violation(rule, file_path, export.line, 0, lines, None));
            }
        }
        AstMatcher::ClassComponent => {
            for comp in parsed.components.iter().filter(|c| c.kind == ComponentKind::Class) {
                violations.push(build_violation(rule, file_path, comp.line, 0, lines, None));
            }
        }
        AstMatcher::VarDeclaration => {
            for_each_node(source, file_path, |node| {
                if node.kind() == "variable_declaration" {
                    violations.push(build_violation(
                        rule,
                        file_path,
                        node.start_position().row + 1,
                        node.start_position().column,
                        lines,
                        None,
                    ));
                }
            });
        }
        AstMatcher::DebugCall => {
            for_each_node(source, file_path, |node| {
                if is_debug_call(node, source) {
                    violations.push(build_violation(
                        rule,
                        file_path,
                        node.start_position().row + 1,
                        node.start_position().column,
                        lines,
                        None,
                    ));
                }
            });
        }
        AstMatcher::Custom(predicate) => {
            for_each_node(source, file_path, |node| {
                let hit = catch_unwind(AssertUnwindSafe(|| predicate(&node, source)))
                    .unwrap_or(false);
                if hit {
                    violations.push(build_violation(
                        rule,
                        file_path,
                        node.start_position().row + 1,
                        node.start_position().column,
                        lines,
                        None,
                    ));
                }
            });
        }
    }
    violations
}

/// Pasada plana sobre el árbol crudo del archivo. Si el archivo no parsea,
/// el matcher simplemente no aporta violaciones (el canal regex ya corrió).
fn for_each_node(source: &str, file_path: &Path, mut f: impl FnMut(Node)) {
    let ext = file_path.extension().and_then(|e| e.to_str()).unwrap_or("ts");
    let Some(language) = crate::analyzer::language_for(ext) else {
        return;
    };
    let mut parser = tree_sitter::Parser::new();
    if parser.set_language(&language).is_err() {
        return;
    }
    let Some(tree) = parser.parse(source, None) else {
        return;
    };
    walk(tree.root_node(), &mut f);
}

fn walk(node: Node, f: &mut impl FnMut(Node)) {
    f(node);
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(child, f);
    }
}

fn is_debug_call(node: Node, source: &str) -> bool {
    if node.kind() != "call_expression" {
        return false;
    }
    let Some(callee) = node.child_by_field_name("function") else {
        return false;
    };
    if callee.kind() != "member_expression" {
        return false;
    }
    let object = callee
        .child_by_field_name("object")
        .map(|o| o.utf8_text(source.as_bytes()).unwrap_or(""))
        .unwrap_or("");
    let property = callee
        .child_by_field_name("property")
        .map(|p| p.utf8_text(source.as_bytes()).unwrap_or(""))
        .unwrap_or("");
    object == "console" && matches!(property, "log" | "debug" | "info")
}
