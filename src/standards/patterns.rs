//! Catálogo fijo de reglas de patrón por estándar.
//!
//! Estas reglas no salen de ejemplos en los documentos: son tripletas
//! regex/severidad/mensaje escritas a mano, específicas de cada estándar, y
//! se agregan después de las reglas derivadas de ejemplos continuando el
//! mismo contador por estándar.

use crate::standards::{AstMatcher, Rule, RuleExamples, Severity, Standard};
use regex::Regex;

struct PatternSpec {
    name: &'static str,
    severity: Severity,
    message: &'static str,
    pattern: &'static str,
    ast_matcher: Option<AstMatcher>,
    fix_template: Option<&'static str>,
}

fn catalogue(standard: Standard) -> Vec<PatternSpec> {
    match standard {
        Standard::Typescript => vec![
            PatternSpec {
                name: "no-any-type",
                severity: Severity::Error,
                message: "Uso de 'any' elimina el chequeo de tipos. Usa un tipo concreto o 'unknown'.",
                pattern: r":\s*any\b",
                ast_matcher: Some(AstMatcher::AnyType),
                fix_template: Some("Reemplaza ': any' por el tipo real o 'unknown' con narrowing."),
            },
            PatternSpec {
                name: "no-ts-ignore",
                severity: Severity::Error,
                message: "'@ts-ignore' y '@ts-nocheck' silencian errores del compilador.",
                pattern: r"@ts-(ignore|nocheck)",
                ast_matcher: None,
                fix_template: Some("Corrige el error de tipos en lugar de suprimirlo."),
            },
            PatternSpec {
                name: "no-var-declaration",
                severity: Severity::Warning,
                message: "'var' tiene scope de función; usa 'const' o 'let'.",
                pattern: r"\bvar\s+[A-Za-z_$]",
                ast_matcher: Some(AstMatcher::VarDeclaration),
                fix_template: Some("Cambia 'var' por 'const' (o 'let' si reasignas)."),
            },
            PatternSpec {
                name: "no-type-errors",
                severity: Severity::Error,
                message: "El type-checker reporta errores en este archivo.",
                pattern: r"",
                ast_matcher: None,
                fix_template: Some("Corre 'npx tsc --noEmit' y corrige los errores reportados."),
            },
            PatternSpec {
                name: "no-non-null-assertion",
                severity: Severity::Warning,
                message: "La aserción non-null '!' oculta posibles undefined en runtime.",
                pattern: r"\w!\.",
                ast_matcher: None,
                fix_template: Some("Usa optional chaining '?.' o valida explícitamente."),
            },
            PatternSpec {
                name: "explicit-return-types",
                severity: Severity::Info,
                message: "Las funciones exportadas declaran su tipo de retorno explícito.",
                pattern: r"\bfunction\s+\w+\s*\([^)]*\)\s*\{",
                ast_matcher: None,
                fix_template: Some("Agrega ': void' o el tipo de retorno real a la firma."),
            },
        ],
        Standard::React => vec![
            PatternSpec {
                name: "no-default-export-component",
                severity: Severity::Warning,
                message: "Componentes con named export; 'export default' rompe el autocompletado y el renombrado.",
                pattern: r"^export\s+default\s+(function|class|\()",
                ast_matcher: Some(AstMatcher::DefaultExport),
                fix_template: Some("Usa 'export function MiComponente() { ... }'."),
            },
            PatternSpec {
                name: "no-class-components",
                severity: Severity::Warning,
                message: "Componentes de clase son legacy; escribe componentes funcionales con hooks.",
                pattern: r"class\s+\w+\s+extends\s+(React\.)?(Pure)?Component",
                ast_matcher: Some(AstMatcher::ClassComponent),
                fix_template: Some("Convierte la clase en un componente funcional."),
            },
            PatternSpec {
                name: "hooks-require-use-client",
                severity: Severity::Error,
                message: "Hooks de React en un archivo sin directiva 'use client'.",
                pattern: r"",
                ast_matcher: None,
                fix_template: Some("Agrega 'use client'; como primera línea del archivo."),
            },
        ],
        Standard::NextJs => vec![
            PatternSpec {
                name: "no-img-element",
                severity: Severity::Warning,
                message: "Usa next/image en lugar de <img> para optimización automática.",
                pattern: r"<img\s",
                ast_matcher: None,
                fix_template: Some("Importa Image desde 'next/image'."),
            },
            PatternSpec {
                name: "no-a-for-internal-links",
                severity: Severity::Warning,
                message: "Links internos con next/link, no con <a href=\"/...\">.",
                pattern: r#"<a\s+href="/"#,
                ast_matcher: None,
                fix_template: Some("Importa Link desde 'next/link'."),
            },
        ],
        Standard::Convex => vec![
            PatternSpec {
                name: "no-fetch-in-convex-function",
                severity: Severity::Error,
                message: "fetch() dentro de query/mutation no es determinista; muévelo a una action.",
                pattern: r"\bfetch\s*\(",
                ast_matcher: None,
                fix_template: Some("Extrae la llamada HTTP a una action de Convex."),
            },
        ],
        Standard::Security => vec![
            PatternSpec {
                name: "no-eval",
                severity: Severity::Error,
                message: "eval() y new Function() permiten ejecución de código arbitrario.",
                pattern: r"\beval\s*\(|new\s+Function\s*\(",
                ast_matcher: None,
                fix_template: None,
            },
            PatternSpec {
                name: "no-hardcoded-secrets",
                severity: Severity::Error,
                message: "Posible secreto hardcodeado; muévelo a variables de entorno.",
                pattern: r#"(?i)(api[_-]?key|secret|password|token)\s*[:=]\s*["'][A-Za-z0-9_\-]{8,}["']"#,
                ast_matcher: None,
                fix_template: Some("Usa process.env y un archivo .env fuera del repositorio."),
            },
            PatternSpec {
                name: "no-dangerously-set-inner-html",
                severity: Severity::Error,
                message: "dangerouslySetInnerHTML sin sanitizar es un vector de XSS.",
                pattern: r"dangerouslySetInnerHTML",
                ast_matcher: None,
                fix_template: None,
            },
            PatternSpec {
                name: "no-document-cookie",
                severity: Severity::Warning,
                message: "Acceso directo a document.cookie; usa cookies httpOnly desde el servidor.",
                pattern: r"document\.cookie",
                ast_matcher: None,
                fix_template: None,
            },
        ],
        Standard::Testing => vec![
            PatternSpec {
                name: "no-skipped-tests",
                severity: Severity::Warning,
                message: "Tests saltados con .skip/.only quedan olvidados en CI.",
                pattern: r"\b(describe|it|test)\.(skip|only)\s*\(",
                ast_matcher: None,
                fix_template: Some("Elimina el .skip/.only o documenta por qué se excluye."),
            },
            PatternSpec {
                name: "no-debug-statements",
                severity: Severity::Warning,
                message: "console.log/debug/info no deben llegar a producción.",
                pattern: r"\bconsole\.(log|debug|info)\s*\(",
                ast_matcher: Some(AstMatcher::DebugCall),
                fix_template: Some("Elimina la llamada o usa un logger con niveles."),
            },
        ],
        Standard::Forms => vec![
            PatternSpec {
                name: "no-uncontrolled-value",
                severity: Severity::Warning,
                message: "Input con value fijo sin onChange produce un campo congelado.",
                pattern: r#"value=\{[^}]+\}(?:[^>]*)>"#,
                ast_matcher: None,
                fix_template: Some("Agrega onChange o usa defaultValue para inputs no controlados."),
            },
        ],
        Standard::Styling => vec![
            PatternSpec {
                name: "no-inline-style-object",
                severity: Severity::Info,
                message: "Objetos style inline crean una instancia por render; prefiere clases.",
                pattern: r"style=\{\{",
                ast_matcher: None,
                fix_template: Some("Mueve los estilos a una clase de Tailwind o CSS module."),
            },
            PatternSpec {
                name: "no-important",
                severity: Severity::Info,
                message: "!important indica una guerra de especificidad; reordena las clases.",
                pattern: r"!important",
                ast_matcher: None,
                fix_template: None,
            },
        ],
    }
}

/// Reglas de patrón del estándar, numeradas a partir de `counter` (que queda
/// avanzado para el llamador).
pub fn pattern_rules(standard: Standard, counter: &mut u32) -> Vec<Rule> {
    let mut rules = Vec::new();
    for spec in catalogue(standard) {
        let id = format!("{}-{:03}", standard.prefix(), *counter);
        *counter += 1;
        // Un patrón vacío significa regla puramente semántica (canal AST).
        let pattern = if spec.pattern.is_empty() {
            None
        } else {
            Regex::new(spec.pattern).ok()
        };
        rules.push(Rule {
            id,
            name: spec.name.to_string(),
            standard,
            severity: spec.severity,
            message: spec.message.to_string(),
            examples: RuleExamples::default(),
            pattern,
            ast_matcher: spec.ast_matcher,
            fix_template: spec.fix_template.map(|s| s.to_string()),
        });
    }
    rules
}
