//! Gestor de backups del motor de fixes.
//!
//! Snapshot direccionado por contenido de cada archivo antes de mutarlo, con
//! restauración verificada por hash. El ID de sesión lo inyecta el llamador:
//! nada acá consulta el reloj, lo que hace las sesiones deterministas y
//! testeables.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupInfo {
    pub timestamp: String,
    pub original_path: String,
    pub backup_path: String,
    /// Digest SHA-256 del contenido original, en hex.
    pub hash: String,
}

pub struct BackupManager {
    session_dir: PathBuf,
    manifest: Vec<BackupInfo>,
}

pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

impl BackupManager {
    pub fn new(backup_root: &Path, session_id: &str) -> Self {
        Self {
            session_dir: backup_root.join(session_id),
            manifest: Vec::new(),
        }
    }

    /// Copia los bytes actuales del archivo al directorio de sesión y agrega
    /// la entrada al manifiesto. Debe llamarse antes de cualquier escritura
    /// sobre el archivo en esta sesión.
    pub fn backup_file(&mut self, path: &Path) -> anyhow::Result<BackupInfo> {
        let bytes = fs::read(path)
            .with_context(|| format!("No se pudo leer {} para backup", path.display()))?;
        let hash = hash_bytes(&bytes);

        fs::create_dir_all(&self.session_dir)
            .with_context(|| format!("No se pudo crear {}", self.session_dir.display()))?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("archivo");
        // Índice secuencial para evitar colisiones de nombre dentro de la sesión.
        let backup_path = self
            .session_dir
            .join(format!("{:03}-{}.bak", self.manifest.len(), file_name));
        fs::write(&backup_path, &bytes)
            .with_context(|| format!("No se pudo escribir {}", backup_path.display()))?;

        let info = BackupInfo {
            timestamp: chrono::Local::now().to_rfc3339(),
            original_path: path.display().to_string(),
            backup_path: backup_path.display().to_string(),
            hash,
        };
        self.manifest.push(info.clone());
        Ok(info)
    }

    /// Restaura el contenido pre-fix byte a byte. Verifica primero que la
    /// copia guardada siga matcheando el hash registrado; si no, la
    /// restauración se aborta sin tocar el archivo.
    pub fn restore_file(&self, info: &BackupInfo) -> anyhow::Result<()> {
        let bytes = fs::read(&info.backup_path)
            .with_context(|| format!("Backup ausente: {}", info.backup_path))?;
        let actual = hash_bytes(&bytes);
        if actual != info.hash {
            anyhow::bail!(
                "Backup corrupto para {}: hash {} esperado {}",
                info.original_path,
                actual,
                info.hash
            );
        }
        fs::write(&info.original_path, &bytes)
            .with_context(|| format!("No se pudo restaurar {}", info.original_path))?;
        Ok(())
    }

    /// Persiste el manifiesto completo de la sesión como JSON, suficiente
    /// para restaurar a mano cualquier archivo tocado.
    pub fn save_manifest(&self) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(&self.session_dir)?;
        let manifest_path = self.session_dir.join("manifest.json");
        let json = serde_json::to_string_pretty(&self.manifest)?;
        fs::write(&manifest_path, json)?;
        Ok(manifest_path)
    }

    pub fn manifest(&self) -> &[BackupInfo] {
        &self.manifest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_backup_y_restore_byte_a_byte() {
        let dir = TempDir::new().unwrap();
        let objetivo = dir.path().join("app.ts");
        fs::write(&objetivo, "const original = 1;\n").unwrap();

        let mut manager = BackupManager::new(&dir.path().join(".backups"), "sesion-test");
        let info = manager.backup_file(&objetivo).unwrap();

        // Mutar y restaurar.
        fs::write(&objetivo, "const roto = 2;\n").unwrap();
        manager.restore_file(&info).unwrap();

        let restaurado = fs::read(&objetivo).unwrap();
        assert_eq!(restaurado, b"const original = 1;\n");
        assert_eq!(hash_bytes(&restaurado), info.hash);
    }

    #[test]
    fn test_restore_rechaza_backup_corrupto() {
        let dir = TempDir::new().unwrap();
        let objetivo = dir.path().join("app.ts");
        fs::write(&objetivo, "const a = 1;\n").unwrap();

        let mut manager = BackupManager::new(&dir.path().join(".backups"), "sesion-test");
        let info = manager.backup_file(&objetivo).unwrap();

        // Corromper la copia de respaldo.
        fs::write(&info.backup_path, "otra cosa\n").unwrap();
        fs::write(&objetivo, "mutado\n").unwrap();

        assert!(manager.restore_file(&info).is_err());
        // El archivo objetivo no se tocó.
        assert_eq!(fs::read_to_string(&objetivo).unwrap(), "mutado\n");
    }

    #[test]
    fn test_manifest_persistido_como_json() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.ts");
        let b = dir.path().join("b.ts");
        fs::write(&a, "a\n").unwrap();
        fs::write(&b, "b\n").unwrap();

        let mut manager = BackupManager::new(&dir.path().join(".backups"), "s1");
        manager.backup_file(&a).unwrap();
        manager.backup_file(&b).unwrap();
        let manifest_path = manager.save_manifest().unwrap();

        let contenido = fs::read_to_string(manifest_path).unwrap();
        let entradas: Vec<BackupInfo> = serde_json::from_str(&contenido).unwrap();
        assert_eq!(entradas.len(), 2);
        assert!(entradas[0].backup_path.ends_with("000-a.ts.bak"));
        assert!(entradas[1].backup_path.ends_with("001-b.ts.bak"));
    }

    #[test]
    fn test_sesiones_separadas_no_colisionan() {
        let dir = TempDir::new().unwrap();
        let objetivo = dir.path().join("x.ts");
        fs::write(&objetivo, "x\n").unwrap();
        let root = dir.path().join(".backups");

        let mut s1 = BackupManager::new(&root, "s1");
        let mut s2 = BackupManager::new(&root, "s2");
        let i1 = s1.backup_file(&objetivo).unwrap();
        let i2 = s2.backup_file(&objetivo).unwrap();
        assert_ne!(i1.backup_path, i2.backup_path);
    }
}
