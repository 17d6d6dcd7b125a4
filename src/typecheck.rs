//! Puente con el type-checker externo.
//!
//! El motor no chequea tipos por sí mismo: invoca `tsc --noEmit` como proceso
//! externo, igual para el diagnóstico opcional de todo el proyecto que para la
//! verificación por archivo después de un fix.

use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use std::process::Command;

/// Diagnóstico pre-computado del type-checker, formato
/// `archivo(línea,columna): error TSxxxx: mensaje`.
#[derive(Debug, Clone)]
pub struct TypeDiagnostic {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub code: String,
    pub message: String,
}

#[derive(Debug)]
pub struct TypecheckOutcome {
    pub success: bool,
    pub output: String,
}

static DIAGNOSTIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<file>[^(]+)\((?P<line>\d+),(?P<col>\d+)\):\s+error\s+(?P<code>TS\d+):\s+(?P<msg>.+)$")
        .unwrap()
});

/// Verifica un solo archivo en modo noEmit. Usado por el motor de fixes para
/// decidir commit o rollback.
pub fn check_file(path: &Path, project_root: &Path) -> anyhow::Result<TypecheckOutcome> {
    run_tsc(project_root, Some(path))
}

/// Corre el type-checker sobre el proyecto completo y parsea sus diagnósticos.
/// Enriquecimiento opcional del analizador; si tsc no está disponible, el
/// llamador decide si es fatal.
pub fn collect_diagnostics(project_root: &Path) -> anyhow::Result<Vec<TypeDiagnostic>> {
    let outcome = run_tsc(project_root, None)?;
    Ok(parse_diagnostics(&outcome.output))
}

fn run_tsc(project_root: &Path, file: Option<&Path>) -> anyhow::Result<TypecheckOutcome> {
    let mut cmd = Command::new("npx");
    cmd.args(["tsc", "--noEmit", "--skipLibCheck", "--pretty", "false"]);
    if let Some(file) = file {
        cmd.arg(file);
    }
    let output = cmd
        .current_dir(project_root)
        .output()
        .context("No se pudo ejecutar npx tsc (¿está instalado TypeScript?)")?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let combined = if stderr.is_empty() {
        stdout
    } else {
        format!("{}\n{}", stdout, stderr)
    };

    Ok(TypecheckOutcome {
        success: output.status.success(),
        output: combined,
    })
}

/// Parsea las líneas de error de tsc. Las líneas que no matchean el formato
/// se ignoran (banners, resúmenes, warnings de npx).
pub fn parse_diagnostics(output: &str) -> Vec<TypeDiagnostic> {
    output
        .lines()
        .filter_map(|line| {
            let caps = DIAGNOSTIC_RE.captures(line.trim_end())?;
            Some(TypeDiagnostic {
                file: caps["file"].trim().to_string(),
                line: caps["line"].parse().ok()?,
                column: caps["col"].parse().ok()?,
                code: caps["code"].to_string(),
                message: caps["msg"].to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsea_lineas_de_tsc() {
        let salida = "\
src/app/page.tsx(12,5): error TS2322: Type 'string' is not assignable to type 'number'.\n\
src/lib/utils.ts(3,10): error TS7006: Parameter 'x' implicitly has an 'any' type.\n\
Found 2 errors in 2 files.\n";
        let diags = parse_diagnostics(salida);
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].file, "src/app/page.tsx");
        assert_eq!(diags[0].line, 12);
        assert_eq!(diags[0].column, 5);
        assert_eq!(diags[0].code, "TS2322");
        assert_eq!(diags[1].code, "TS7006");
    }

    #[test]
    fn test_salida_sin_errores() {
        assert!(parse_diagnostics("").is_empty());
        assert!(parse_diagnostics("npm warn exec tsc\n").is_empty());
    }
}
