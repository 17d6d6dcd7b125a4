//! # Modelo de estándares y reglas
//!
//! Tipos centrales del motor de auditoría: estándares soportados, severidades,
//! reglas compiladas desde los documentos markdown y el registro inmutable que
//! se construye una sola vez por ejecución.

pub mod parser;
pub mod patterns;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Severidad de una regla, ordenada por precedencia: error > warning > info.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Peso para el cálculo del compliance score.
    pub fn weight(&self) -> u32 {
        match self {
            Severity::Error => 3,
            Severity::Warning => 2,
            Severity::Info => 1,
        }
    }

    /// Rango numérico para ordenamiento (mayor = más severo).
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Error => 3,
            Severity::Warning => 2,
            Severity::Info => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

/// Estándar de codificación soportado. Conjunto cerrado: extenderlo implica
/// agregar un documento markdown nuevo y una variante aquí.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Standard {
    Typescript,
    React,
    NextJs,
    Convex,
    Security,
    Testing,
    Forms,
    Styling,
}

impl Standard {
    /// Prefijo de 3 letras que desambigua los IDs de regla entre estándares.
    pub fn prefix(&self) -> &'static str {
        match self {
            Standard::Typescript => "typ",
            Standard::React => "rea",
            Standard::NextJs => "nex",
            Standard::Convex => "cvx",
            Standard::Security => "sec",
            Standard::Testing => "tes",
            Standard::Forms => "frm",
            Standard::Styling => "sty",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Standard::Typescript => "typescript",
            Standard::React => "react",
            Standard::NextJs => "nextjs",
            Standard::Convex => "convex",
            Standard::Security => "security",
            Standard::Testing => "testing",
            Standard::Forms => "forms",
            Standard::Styling => "styling",
        }
    }

    /// Mapeo exacto nombre-de-archivo → estándar. Archivos que no mapean se
    /// saltan sin error (README, índices, notas sueltas).
    pub fn from_filename(name: &str) -> Option<Standard> {
        match name {
            "typescript.md" => Some(Standard::Typescript),
            "react.md" => Some(Standard::React),
            "nextjs.md" => Some(Standard::NextJs),
            "convex.md" => Some(Standard::Convex),
            "security.md" => Some(Standard::Security),
            "testing.md" => Some(Standard::Testing),
            "forms.md" => Some(Standard::Forms),
            "styling.md" => Some(Standard::Styling),
            _ => None,
        }
    }

    pub fn all() -> [Standard; 8] {
        [
            Standard::Typescript,
            Standard::React,
            Standard::NextJs,
            Standard::Convex,
            Standard::Security,
            Standard::Testing,
            Standard::Forms,
            Standard::Styling,
        ]
    }

    pub fn from_str_loose(s: &str) -> Option<Standard> {
        Standard::all().into_iter().find(|std| std.as_str() == s)
    }
}

/// Ejemplo canónico antes/después extraído del documento markdown.
#[derive(Debug, Clone, Default)]
pub struct RuleExamples {
    pub incorrect: String,
    pub correct: String,
}

/// Matcher sintáctico de variantes cerradas, más una variante de escape para
/// predicados propios. El predicado recibe el nodo y el fuente completo; si
/// entra en pánico sobre un nodo concreto, ese nodo se descarta sin abortar
/// el resto del análisis.
#[derive(Clone, Copy)]
pub enum AstMatcher {
    AnyType,
    VarDeclaration,
    DefaultExport,
    ClassComponent,
    DebugCall,
    Custom(fn(&tree_sitter::Node, &str) -> bool),
}

impl std::fmt::Debug for AstMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AstMatcher::AnyType => "AnyType",
            AstMatcher::VarDeclaration => "VarDeclaration",
            AstMatcher::DefaultExport => "DefaultExport",
            AstMatcher::ClassComponent => "ClassComponent",
            AstMatcher::DebugCall => "DebugCall",
            AstMatcher::Custom(_) => "Custom(..)",
        };
        write!(f, "AstMatcher::{}", name)
    }
}

/// Una política verificable. Inmutable una vez creada por el parser.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Formato `^[a-z]{3}-\d{3}$`, único dentro de su estándar.
    pub id: String,
    /// Slug derivado del heading de origen.
    pub name: String,
    pub standard: Standard,
    pub severity: Severity,
    pub message: String,
    pub examples: RuleExamples,
    /// Regex de línea única para el canal textual rápido.
    pub pattern: Option<Regex>,
    /// Predicado sintáctico para cuando el texto no alcanza.
    pub ast_matcher: Option<AstMatcher>,
    /// Sugerencia legible para humanos; nunca código ejecutable.
    pub fix_template: Option<String>,
}

/// Resultado de extracción de un documento markdown completo.
#[derive(Debug)]
pub struct ParsedStandard {
    pub standard: Standard,
    pub file_path: std::path::PathBuf,
    pub rules: Vec<Rule>,
    pub raw_content: String,
}

/// Registro inmutable de reglas para una ejecución. Se construye una vez y se
/// pasa por referencia al orquestador y al motor de fixes; no hay estado
/// global escondido.
pub struct RuleRegistry {
    rules: Vec<Rule>,
    by_id: HashMap<String, usize>,
}

impl RuleRegistry {
    /// Construye el registro parseando todos los estándares del directorio.
    /// Es el único error fatal del motor: sin directorio de estándares no hay
    /// resultado parcial con sentido.
    pub fn build(standards_dir: &Path) -> anyhow::Result<RuleRegistry> {
        let parsed = parser::parse_all_standards(standards_dir)?;
        let rules: Vec<Rule> = parsed.into_iter().flat_map(|p| p.rules).collect();
        Self::from_rules(rules)
    }

    pub fn from_rules(rules: Vec<Rule>) -> anyhow::Result<RuleRegistry> {
        let mut by_id = HashMap::with_capacity(rules.len());
        for (idx, rule) in rules.iter().enumerate() {
            if by_id.insert(rule.id.clone(), idx).is_some() {
                anyhow::bail!("ID de regla duplicado en el registro: {}", rule.id);
            }
        }
        Ok(RuleRegistry { rules, by_id })
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.by_id.get(id).map(|&idx| &self.rules[idx])
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regla(id: &str, standard: Standard) -> Rule {
        Rule {
            id: id.to_string(),
            name: "regla-de-prueba".to_string(),
            standard,
            severity: Severity::Warning,
            message: "mensaje".to_string(),
            examples: RuleExamples::default(),
            pattern: None,
            ast_matcher: None,
            fix_template: None,
        }
    }

    #[test]
    fn test_severity_weights_y_rangos() {
        assert_eq!(Severity::Error.weight(), 3);
        assert_eq!(Severity::Warning.weight(), 2);
        assert_eq!(Severity::Info.weight(), 1);
        assert!(Severity::Error.rank() > Severity::Warning.rank());
        assert!(Severity::Warning.rank() > Severity::Info.rank());
    }

    #[test]
    fn test_prefijos_disjuntos_entre_estandares() {
        let mut vistos = std::collections::HashSet::new();
        for std in Standard::all() {
            assert_eq!(std.prefix().len(), 3);
            assert!(vistos.insert(std.prefix()), "prefijo repetido: {}", std.prefix());
        }
    }

    #[test]
    fn test_mapeo_de_archivo_exacto() {
        assert_eq!(Standard::from_filename("react.md"), Some(Standard::React));
        assert_eq!(Standard::from_filename("README.md"), None);
        assert_eq!(Standard::from_filename("react.markdown"), None);
    }

    #[test]
    fn test_registro_rechaza_ids_duplicados() {
        let rules = vec![regla("rea-001", Standard::React), regla("rea-001", Standard::React)];
        assert!(RuleRegistry::from_rules(rules).is_err());
    }

    #[test]
    fn test_registro_busca_por_id() {
        let rules = vec![regla("typ-001", Standard::Typescript), regla("sec-001", Standard::Security)];
        let reg = RuleRegistry::from_rules(rules).unwrap();
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get("sec-001").unwrap().standard, Standard::Security);
        assert!(reg.get("sec-999").is_none());
    }
}
