use crate::standards::{Severity, Standard};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Versión actual de Custodia (leída desde Cargo.toml en tiempo de compilación)
pub const CUSTODIA_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuración persistente del proyecto auditado (.custodiarc.toml).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuditConfig {
    pub version: String,
    pub project_name: String,
    /// Directorio con los documentos de estándares en markdown.
    pub standards_dir: String,
    /// Directorios del proyecto a auditar.
    pub include_dirs: Vec<String>,
    pub exclude_dirs: Vec<String>,
    pub file_extensions: Vec<String>,
    /// Severidad mínima por defecto ("error", "warning", "info").
    pub min_severity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_violations: Option<usize>,
    /// Raíz donde se guardan los backups de las sesiones de fix.
    pub backup_dir: String,
    /// Saltear la verificación con tsc tras aplicar fixes.
    pub skip_verify: bool,
}

impl AuditConfig {
    pub fn default(name: String) -> Self {
        Self {
            version: CUSTODIA_VERSION.to_string(),
            project_name: name,
            standards_dir: "standards".to_string(),
            include_dirs: vec!["src".to_string(), "app".to_string(), "convex".to_string()],
            exclude_dirs: vec![
                "node_modules".to_string(),
                "dist".to_string(),
                ".git".to_string(),
                "build".to_string(),
                ".next".to_string(),
                "coverage".to_string(),
            ],
            file_extensions: vec![
                "ts".to_string(),
                "tsx".to_string(),
                "js".to_string(),
                "jsx".to_string(),
            ],
            min_severity: "info".to_string(),
            max_violations: None,
            backup_dir: ".custodia/backups".to_string(),
            skip_verify: false,
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml = toml::to_string_pretty(self)?;
        fs::write(path.join(".custodiarc.toml"), toml)?;
        Ok(())
    }

    /// Carga la configuración desde .custodiarc.toml.
    ///
    /// Tolerante con campos faltantes: una config parcial o de una versión
    /// anterior se completa con los defaults y se reescribe migrada.
    pub fn load(path: &Path) -> Option<Self> {
        let config_path = path.join(".custodiarc.toml");
        let content = fs::read_to_string(&config_path).ok()?;

        if let Ok(mut config) = toml::from_str::<AuditConfig>(&content) {
            if config.version != CUSTODIA_VERSION {
                println!(
                    "{}",
                    format!(
                        "   🔄 Migrando configuración de versión {} a {}...",
                        config.version, CUSTODIA_VERSION
                    )
                    .yellow()
                );
                config = Self::migrar_config(config);
                let _ = config.save(path);
                println!("{}", "   ✅ Configuración migrada exitosamente".green());
            }
            return Some(config);
        }

        // Config parcial: todos los campos opcionales, defaults para el resto.
        #[derive(Debug, Deserialize)]
        struct AuditConfigParcial {
            project_name: Option<String>,
            standards_dir: Option<String>,
            include_dirs: Option<Vec<String>>,
            exclude_dirs: Option<Vec<String>>,
            file_extensions: Option<Vec<String>>,
            min_severity: Option<String>,
            max_violations: Option<usize>,
            backup_dir: Option<String>,
            skip_verify: Option<bool>,
        }

        if let Ok(parcial) = toml::from_str::<AuditConfigParcial>(&content) {
            println!("{}", "   🔄 Detectada configuración parcial, completando...".yellow());

            let nombre = parcial.project_name.unwrap_or_else(|| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("unknown")
                    .to_string()
            });
            let mut config = Self::default(nombre);
            if let Some(dir) = parcial.standards_dir {
                config.standards_dir = dir;
            }
            if let Some(dirs) = parcial.include_dirs {
                config.include_dirs = dirs;
            }
            if let Some(dirs) = parcial.exclude_dirs {
                config.exclude_dirs = dirs;
            }
            if let Some(exts) = parcial.file_extensions {
                config.file_extensions = exts;
            }
            if let Some(sev) = parcial.min_severity {
                config.min_severity = sev;
            }
            config.max_violations = parcial.max_violations;
            if let Some(dir) = parcial.backup_dir {
                config.backup_dir = dir;
            }
            if let Some(skip) = parcial.skip_verify {
                config.skip_verify = skip;
            }

            let _ = config.save(path);
            return Some(config);
        }

        println!(
            "{}",
            "   ⚠️  No se pudo cargar la configuración. Se usarán los defaults.".yellow()
        );
        None
    }

    fn migrar_config(mut config: AuditConfig) -> AuditConfig {
        config.version = CUSTODIA_VERSION.to_string();

        if config.include_dirs.is_empty() {
            config.include_dirs = vec!["src".to_string(), "app".to_string(), "convex".to_string()];
        }
        if config.file_extensions.is_empty() {
            config.file_extensions = vec![
                "ts".to_string(),
                "tsx".to_string(),
                "js".to_string(),
                "jsx".to_string(),
            ];
        }
        if config.standards_dir.is_empty() {
            config.standards_dir = "standards".to_string();
        }
        if config.backup_dir.is_empty() {
            config.backup_dir = ".custodia/backups".to_string();
        }
        config
    }

    /// Severidad mínima parseada; desconocida o vacía cae a Info.
    pub fn severidad_minima(&self) -> Severity {
        parse_severity(&self.min_severity).unwrap_or(Severity::Info)
    }

    /// Busca la raíz del proyecto subiendo desde el directorio actual hasta
    /// encontrar un .custodiarc.toml o un package.json.
    pub fn find_project_root() -> Option<PathBuf> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            if dir.join(".custodiarc.toml").exists() || dir.join("package.json").exists() {
                return Some(dir);
            }
            if !dir.pop() {
                return None;
            }
        }
    }
}

pub fn parse_severity(s: &str) -> Option<Severity> {
    match s.to_lowercase().as_str() {
        "error" => Some(Severity::Error),
        "warning" | "warn" => Some(Severity::Warning),
        "info" => Some(Severity::Info),
        _ => None,
    }
}

/// Parsea una lista separada por comas de nombres de estándares.
pub fn parse_standards(s: &str) -> anyhow::Result<Vec<Standard>> {
    s.split(',')
        .map(|item| {
            let item = item.trim().to_lowercase();
            Standard::from_str_loose(&item)
                .ok_or_else(|| anyhow::anyhow!("estándar desconocido: {}", item))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_guardar_y_cargar_roundtrip() {
        let dir = TempDir::new().unwrap();
        let config = AuditConfig::default("mi-app".to_string());
        config.save(dir.path()).unwrap();

        let cargada = AuditConfig::load(dir.path()).unwrap();
        assert_eq!(cargada.project_name, "mi-app");
        assert_eq!(cargada.standards_dir, "standards");
        assert_eq!(cargada.file_extensions, vec!["ts", "tsx", "js", "jsx"]);
    }

    #[test]
    fn test_config_parcial_completa_con_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(".custodiarc.toml"),
            "project_name = \"solo-nombre\"\nmin_severity = \"warning\"\n",
        )
        .unwrap();

        let cargada = AuditConfig::load(dir.path()).unwrap();
        assert_eq!(cargada.project_name, "solo-nombre");
        assert_eq!(cargada.severidad_minima(), Severity::Warning);
        assert_eq!(cargada.include_dirs, vec!["src", "app", "convex"]);
    }

    #[test]
    fn test_sin_archivo_devuelve_none() {
        let dir = TempDir::new().unwrap();
        assert!(AuditConfig::load(dir.path()).is_none());
    }

    #[test]
    fn test_parse_severity() {
        assert_eq!(parse_severity("error"), Some(Severity::Error));
        assert_eq!(parse_severity("WARN"), Some(Severity::Warning));
        assert_eq!(parse_severity("cualquiera"), None);
    }

    #[test]
    fn test_parse_standards_lista() {
        let parsed = parse_standards("typescript, react").unwrap();
        assert_eq!(parsed, vec![Standard::Typescript, Standard::React]);
        assert!(parse_standards("klingon").is_err());
    }
}
