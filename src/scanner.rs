//! Scanner de archivos.
//!
//! Recorrido recursivo de los directorios incluidos produciendo el inventario
//! filtrado que consume el orquestador. El inventario se reconstruye completo
//! en cada ejecución; no hay caché entre corridas.

use anyhow::Context;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Configuración del recorrido: raíz, directorios top-level a incluir,
/// nombres de directorio a podar y extensiones permitidas.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub root: PathBuf,
    pub include_dirs: Vec<String>,
    pub exclude_dirs: Vec<String>,
    pub extensions: Vec<String>,
}

impl ScanConfig {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            include_dirs: vec!["src".to_string(), "app".to_string(), "convex".to_string()],
            exclude_dirs: vec![
                "node_modules".to_string(),
                "dist".to_string(),
                ".git".to_string(),
                "build".to_string(),
                ".next".to_string(),
                "coverage".to_string(),
            ],
            extensions: vec![
                "ts".to_string(),
                "tsx".to_string(),
                "js".to_string(),
                "jsx".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScannedFile {
    pub absolute_path: PathBuf,
    pub relative_path: PathBuf,
    pub extension: String,
    pub size: u64,
    #[serde(skip)]
    pub last_modified: Option<std::time::SystemTime>,
}

#[derive(Debug, Serialize)]
pub struct ScanResult {
    pub files: Vec<ScannedFile>,
    pub total_files: usize,
    pub total_size: u64,
    pub scan_time_ms: u128,
}

/// Recorre los directorios incluidos en profundidad. Los directorios cuyo
/// nombre está en la lista de exclusión se podan enteros (sin descender).
/// Los symlinks no se siguen nunca, así que no hace falta detección de
/// ciclos. El orden es el del recorrido, determinista dentro de una corrida.
pub fn scan(config: &ScanConfig) -> anyhow::Result<ScanResult> {
    let start = Instant::now();
    let mut files = Vec::new();
    let mut total_size: u64 = 0;

    for dir_name in &config.include_dirs {
        let dir = config.root.join(dir_name);
        if !dir.is_dir() {
            continue;
        }

        let exclude = config.exclude_dirs.clone();
        let walker = ignore::WalkBuilder::new(&dir)
            .hidden(false)
            .git_ignore(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let name = entry.file_name().to_string_lossy();
                !exclude.iter().any(|ex| ex.as_str() == name)
            })
            .build();

        for result in walker {
            let entry = match result {
                Ok(e) => e,
                Err(_) => continue,
            };
            let path = entry.path();
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !config.extensions.iter().any(|allowed| allowed == ext) {
                continue;
            }

            let metadata = path
                .metadata()
                .with_context(|| format!("Sin metadata para {}", path.display()))?;
            total_size += metadata.len();
            files.push(ScannedFile {
                absolute_path: path.to_path_buf(),
                relative_path: path
                    .strip_prefix(&config.root)
                    .unwrap_or(path)
                    .to_path_buf(),
                extension: ext.to_string(),
                size: metadata.len(),
                last_modified: metadata.modified().ok(),
            });
        }
    }

    Ok(ScanResult {
        total_files: files.len(),
        total_size,
        scan_time_ms: start.elapsed().as_millis(),
        files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn armar_proyecto() -> TempDir {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("components")).unwrap();
        fs::create_dir_all(src.join("node_modules").join("react")).unwrap();
        fs::write(src.join("index.ts"), "const a = 1;\n").unwrap();
        fs::write(src.join("components").join("Boton.tsx"), "export const B = 1;\n").unwrap();
        fs::write(src.join("estilos.css"), "body {}\n").unwrap();
        fs::write(
            src.join("node_modules").join("react").join("index.js"),
            "module.exports = {};\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_scan_filtra_extensiones_y_poda_excluidos() {
        let dir = armar_proyecto();
        let config = ScanConfig::new(dir.path());
        let result = scan(&config).unwrap();

        assert_eq!(result.total_files, 2);
        let nombres: Vec<_> = result
            .files
            .iter()
            .map(|f| f.absolute_path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert!(nombres.contains(&"index.ts".to_string()));
        assert!(nombres.contains(&"Boton.tsx".to_string()));
        // node_modules podado entero, css fuera por extensión.
        assert!(!nombres.iter().any(|n| n == "index.js"));
        assert!(!nombres.iter().any(|n| n.ends_with(".css")));
    }

    #[test]
    fn test_scan_rutas_relativas_a_la_raiz() {
        let dir = armar_proyecto();
        let config = ScanConfig::new(dir.path());
        let result = scan(&config).unwrap();
        for f in &result.files {
            assert!(f.relative_path.starts_with("src"));
            assert!(f.absolute_path.is_absolute() || f.absolute_path.starts_with(dir.path()));
        }
    }

    #[test]
    fn test_scan_directorio_incluido_inexistente() {
        let dir = TempDir::new().unwrap();
        let config = ScanConfig::new(dir.path());
        let result = scan(&config).unwrap();
        assert_eq!(result.total_files, 0);
        assert_eq!(result.total_size, 0);
    }

    #[test]
    fn test_scan_determinista_dentro_de_la_corrida() {
        let dir = armar_proyecto();
        let config = ScanConfig::new(dir.path());
        let a = scan(&config).unwrap();
        let b = scan(&config).unwrap();
        let rutas_a: Vec<_> = a.files.iter().map(|f| f.relative_path.clone()).collect();
        let rutas_b: Vec<_> = b.files.iter().map(|f| f.relative_path.clone()).collect();
        assert_eq!(rutas_a, rutas_b);
    }
}
