//! Analizador sintáctico.
//!
//! Parsea un archivo fuente con tree-sitter y extrae un conjunto plano de
//! hechos semánticos (directivas, imports, exports, hooks, componentes,
//! funciones de Convex, firmas de funciones). Una sola pasada recursiva del
//! árbol, sin cortocircuito: todo nodo que matchea una categoría se registra.

use crate::typecheck::TypeDiagnostic;
use anyhow::Context;
use std::path::Path;
use tree_sitter::{Language, Node, Parser};

/// Hooks de React reconocidos como built-in.
const REACT_HOOKS: &[&str] = &[
    "useState",
    "useEffect",
    "useContext",
    "useReducer",
    "useCallback",
    "useMemo",
    "useRef",
    "useImperativeHandle",
    "useLayoutEffect",
    "useDebugValue",
    "useDeferredValue",
    "useTransition",
    "useId",
    "useSyncExternalStore",
    "useInsertionEffect",
];

/// Hooks de Convex reconocidos como built-in.
const CONVEX_HOOKS: &[&str] = &[
    "useQuery",
    "useMutation",
    "useAction",
    "usePaginatedQuery",
    "useConvexAuth",
    "useQueries",
];

/// Factorías de funciones de Convex detectadas en declaraciones de variable.
const CONVEX_FACTORIES: &[&str] = &[
    "query",
    "mutation",
    "action",
    "internalQuery",
    "internalMutation",
    "internalAction",
];

#[derive(Debug, Default, Clone)]
pub struct Directives {
    pub use_client: bool,
    pub use_server: bool,
}

#[derive(Debug, Clone)]
pub struct ImportFact {
    pub source: String,
    pub default_import: Option<String>,
    pub named: Vec<String>,
    pub namespace: Option<String>,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub struct ExportFact {
    pub name: String,
    pub is_default: bool,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub struct HookFact {
    pub name: String,
    pub line: usize,
    pub builtin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Functional,
    Class,
}

#[derive(Debug, Clone)]
pub struct ComponentFact {
    pub name: String,
    pub kind: ComponentKind,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub struct ConvexFunctionFact {
    pub name: String,
    pub factory: String,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub struct FunctionFact {
    pub name: String,
    pub is_async: bool,
    pub exported: bool,
    pub param_count: usize,
    /// Parámetros anotados explícitamente como `any`.
    pub any_params: usize,
    pub line: usize,
}

/// Hechos extraídos de un archivo. Se crea por archivo en tiempo de
/// validación y no se persiste.
#[derive(Debug, Default)]
pub struct ParsedFile {
    pub directives: Directives,
    pub imports: Vec<ImportFact>,
    pub exports: Vec<ExportFact>,
    pub hooks: Vec<HookFact>,
    pub components: Vec<ComponentFact>,
    pub convex_functions: Vec<ConvexFunctionFact>,
    pub functions: Vec<FunctionFact>,
    pub diagnostics: Vec<TypeDiagnostic>,
}

impl ParsedFile {
    pub fn with_diagnostics(mut self, diagnostics: Vec<TypeDiagnostic>) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

/// Devuelve la gramática tree-sitter para la extensión, o None si no hay
/// soporte para ese tipo de archivo.
pub fn language_for(ext: &str) -> Option<Language> {
    match ext {
        "ts" => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        "tsx" => Some(tree_sitter_typescript::LANGUAGE_TSX.into()),
        "js" | "jsx" => Some(tree_sitter_javascript::LANGUAGE.into()),
        _ => None,
    }
}

pub struct SyntaxAnalyzer;

impl SyntaxAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_file(&self, path: &Path) -> anyhow::Result<ParsedFile> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Error al leer {}", path.display()))?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        self.parse_source(&source, ext)
    }

    pub fn parse_source(&self, source: &str, ext: &str) -> anyhow::Result<ParsedFile> {
        let language = language_for(ext)
            .ok_or_else(|| anyhow::anyhow!("Extensión sin gramática soportada: .{}", ext))?;

        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .context("Error al cargar la gramática")?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("tree-sitter no produjo árbol"))?;

        let root = tree.root_node();
        let mut parsed = ParsedFile::default();
        detect_directive(root, source, &mut parsed.directives);
        visit(root, source, &mut parsed);
        Ok(parsed)
    }
}

impl Default for SyntaxAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Directiva de primera sentencia: un string literal suelto al tope del
/// archivo ('use client' / 'use server'), clasificado por substring.
fn detect_directive(root: Node, source: &str, directives: &mut Directives) {
    let Some(first) = root.named_child(0) else {
        return;
    };
    if first.kind() != "expression_statement" {
        return;
    }
    let Some(inner) = first.named_child(0) else {
        return;
    };
    if inner.kind() != "string" {
        return;
    }
    let text = node_text(inner, source);
    if text.contains("use client") {
        directives.use_client = true;
    } else if text.contains("use server") {
        directives.use_server = true;
    }
}

fn visit(node: Node, source: &str, out: &mut ParsedFile) {
    match node.kind() {
        "import_statement" => record_import(node, source, out),
        "export_statement" => record_export(node, source, out),
        "function_declaration" | "generator_function_declaration" => {
            record_function(node, source, out)
        }
        "lexical_declaration" | "variable_declaration" => {
            record_variable_bindings(node, source, out)
        }
        "call_expression" => record_hook_call(node, source, out),
        "class_declaration" => record_class(node, source, out),
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit(child, source, out);
    }
}

fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

fn line_of(node: Node) -> usize {
    node.start_position().row + 1
}

fn starts_uppercase(name: &str) -> bool {
    name.chars().next().map(|c| c.is_ascii_uppercase()).unwrap_or(false)
}

fn record_import(node: Node, source: &str, out: &mut ParsedFile) {
    let import_source = node
        .child_by_field_name("source")
        .map(|s| node_text(s, source).trim_matches(|c| c == '"' || c == '\'').to_string())
        .unwrap_or_default();

    let mut fact = ImportFact {
        source: import_source,
        default_import: None,
        named: Vec::new(),
        namespace: None,
        line: line_of(node),
    };

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() != "import_clause" {
            continue;
        }
        let mut clause_cursor = child.walk();
        for binding in child.children(&mut clause_cursor) {
            match binding.kind() {
                "identifier" => fact.default_import = Some(node_text(binding, source).to_string()),
                "named_imports" => {
                    let mut spec_cursor = binding.walk();
                    for spec in binding.named_children(&mut spec_cursor) {
                        if spec.kind() == "import_specifier" {
                            if let Some(name) = spec.child_by_field_name("name") {
                                fact.named.push(node_text(name, source).to_string());
                            }
                        }
                    }
                }
                "namespace_import" => {
                    let mut ns_cursor = binding.walk();
                    for ns in binding.named_children(&mut ns_cursor) {
                        if ns.kind() == "identifier" {
                            fact.namespace = Some(node_text(ns, source).to_string());
                        }
                    }
                }
                _ => {}
            }
        }
    }

    out.imports.push(fact);
}

fn has_default_keyword(node: Node) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|c| c.kind() == "default")
}

fn record_export(node: Node, source: &str, out: &mut ParsedFile) {
    let is_default = has_default_keyword(node);
    let line = line_of(node);

    if let Some(declaration) = node.child_by_field_name("declaration") {
        match declaration.kind() {
            "function_declaration"
            | "generator_function_declaration"
            | "class_declaration" => {
                let name = declaration
                    .child_by_field_name("name")
                    .map(|n| node_text(n, source).to_string())
                    .unwrap_or_else(|| "default".to_string());
                out.exports.push(ExportFact { name, is_default, line });
            }
            "lexical_declaration" | "variable_declaration" => {
                // Varios declaradores en una sentencia exportada se registran
                // individualmente.
                let mut cursor = declaration.walk();
                for declarator in declaration.named_children(&mut cursor) {
                    if declarator.kind() != "variable_declarator" {
                        continue;
                    }
                    if let Some(name) = declarator.child_by_field_name("name") {
                        out.exports.push(ExportFact {
                            name: node_text(name, source).to_string(),
                            is_default,
                            line,
                        });
                    }
                }
            }
            _ => {
                out.exports.push(ExportFact {
                    name: "default".to_string(),
                    is_default,
                    line,
                });
            }
        }
        return;
    }

    // Cláusula `export { a, b, c }`: se captura solo el primer especificador.
    // Comportamiento fijado a propósito; las reglas actuales solo necesitan
    // saber que el archivo re-exporta algo, no el inventario completo.
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "export_clause" {
            let mut clause_cursor = child.walk();
            if let Some(spec) = child
                .named_children(&mut clause_cursor)
                .find(|c| c.kind() == "export_specifier")
            {
                if let Some(name) = spec.child_by_field_name("name") {
                    out.exports.push(ExportFact {
                        name: node_text(name, source).to_string(),
                        is_default,
                        line,
                    });
                }
            }
            return;
        }
    }

    // `export default expresion;` — identificador o expresión anónima.
    if is_default {
        let value = node.child_by_field_name("value").or_else(|| {
            let mut value_cursor = node.walk();
            node.children(&mut value_cursor)
                .find(|c| c.is_named() && c.kind() != "comment")
        });
        let name = value
            .map(|c| {
                if c.kind() == "identifier" {
                    node_text(c, source).to_string()
                } else {
                    "default".to_string()
                }
            })
            .unwrap_or_else(|| "default".to_string());
        out.exports.push(ExportFact { name, is_default: true, line });
    }
}

fn is_exported(node: Node) -> bool {
    node.parent().map(|p| p.kind() == "export_statement").unwrap_or(false)
}

fn count_params(params: Option<Node>, source: &str) -> (usize, usize) {
    let Some(params) = params else { return (0, 0) };
    let mut cursor = params.walk();
    let mut count = 0;
    let mut any_count = 0;
    for param in params.named_children(&mut cursor) {
        if param.kind() == "comment" {
            continue;
        }
        count += 1;
        if subtree_has_any_annotation(param, source) {
            any_count += 1;
        }
    }
    (count, any_count)
}

fn subtree_has_any_annotation(node: Node, source: &str) -> bool {
    if node.kind() == "predefined_type" && node_text(node, source) == "any" {
        return true;
    }
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .any(|c| subtree_has_any_annotation(c, source))
}

fn is_async_fn(node: Node) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|c| c.kind() == "async")
}

fn contains_jsx(node: Node) -> bool {
    matches!(
        node.kind(),
        "jsx_element" | "jsx_self_closing_element" | "jsx_fragment"
    ) || {
        let mut cursor = node.walk();
        node.children(&mut cursor).any(contains_jsx)
    }
}

fn record_function(node: Node, source: &str, out: &mut ParsedFile) {
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(n, source).to_string())
        .unwrap_or_default();
    if name.is_empty() {
        return;
    }
    let (param_count, any_params) = count_params(node.child_by_field_name("parameters"), source);

    out.functions.push(FunctionFact {
        name: name.clone(),
        is_async: is_async_fn(node),
        exported: is_exported(node),
        param_count,
        any_params,
        line: line_of(node),
    });

    // Componente funcional: nombre con mayúscula inicial Y al menos un nodo
    // JSX en el cuerpo, buscado con una sub-pasada acotada a esta función.
    if starts_uppercase(&name) {
        if let Some(body) = node.child_by_field_name("body") {
            if contains_jsx(body) {
                out.components.push(ComponentFact {
                    name,
                    kind: ComponentKind::Functional,
                    line: line_of(node),
                });
            }
        }
    }
}

fn record_variable_bindings(node: Node, source: &str, out: &mut ParsedFile) {
    let mut cursor = node.walk();
    for declarator in node.named_children(&mut cursor) {
        if declarator.kind() != "variable_declarator" {
            continue;
        }
        let Some(name_node) = declarator.child_by_field_name("name") else {
            continue;
        };
        let name = node_text(name_node, source).to_string();
        let Some(value) = declarator.child_by_field_name("value") else {
            continue;
        };

        match value.kind() {
            "arrow_function" | "function_expression" => {
                let (param_count, any_params) =
                    count_params(value.child_by_field_name("parameters"), source);
                out.functions.push(FunctionFact {
                    name: name.clone(),
                    is_async: is_async_fn(value),
                    exported: is_exported(node),
                    param_count,
                    any_params,
                    line: line_of(declarator),
                });
                // Los componentes flecha suelen ser una sola expresión JSX:
                // acá alcanza con la mayúscula inicial, sin chequear el cuerpo.
                if starts_uppercase(&name) {
                    out.components.push(ComponentFact {
                        name,
                        kind: ComponentKind::Functional,
                        line: line_of(declarator),
                    });
                }
            }
            "call_expression" => {
                if let Some(callee) = value.child_by_field_name("function") {
                    if callee.kind() == "identifier" {
                        let factory = node_text(callee, source);
                        if CONVEX_FACTORIES.contains(&factory) {
                            out.convex_functions.push(ConvexFunctionFact {
                                name,
                                factory: factory.to_string(),
                                line: line_of(declarator),
                            });
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

fn record_hook_call(node: Node, source: &str, out: &mut ParsedFile) {
    let Some(callee) = node.child_by_field_name("function") else {
        return;
    };
    if callee.kind() != "identifier" {
        return;
    }
    let name = node_text(callee, source);
    if !name.starts_with("use") || name.len() <= 3 {
        return;
    }
    let builtin = REACT_HOOKS.contains(&name) || CONVEX_HOOKS.contains(&name);
    out.hooks.push(HookFact {
        name: name.to_string(),
        line: line_of(node),
        builtin,
    });
}

fn record_class(node: Node, source: &str, out: &mut ParsedFile) {
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let mut cursor = node.walk();
    let heritage = node
        .children(&mut cursor)
        .find(|c| c.kind() == "class_heritage");
    let Some(heritage) = heritage else {
        return;
    };
    let heritage_text = node_text(heritage, source);
    if heritage_text.contains("PureComponent") || heritage_text.contains("Component") {
        out.components.push(ComponentFact {
            name: node_text(name_node, source).to_string(),
            kind: ComponentKind::Class,
            line: line_of(node),
        });
    }
}
