use crate::error::ApiError;
use crate::excel::analitico::TipoPlantilla;
use std::fs;
use std::path::{Path, PathBuf};

pub const MSG_PLANTILLA_INVALIDA: &str = "Nombre de plantilla inválido";
pub const MSG_PLANTILLA_NO_ENCONTRADA: &str = "Plantilla no encontrada";

/// Nombre de archivo simple terminado en `.xlsx`: sin separadores, sin `..`
/// y sin ocultos.
pub fn es_nombre_plantilla_valido(nombre: &str) -> bool {
    !nombre.is_empty()
        && !nombre.starts_with('.')
        && !nombre.contains(['/', '\\', '\0'])
        && !nombre.contains("..")
        && nombre.to_lowercase().ends_with(".xlsx")
}

/// Ruta de la plantilla a usar. Sin `archivo` se elige por carrera.
pub fn resolver_plantilla(dir: &Path, archivo: Option<&str>, carrera: &str) -> Result<PathBuf, ApiError> {
    let nombre = match archivo.map(str::trim).filter(|s| !s.is_empty()) {
        Some(n) => n,
        None => TipoPlantilla::para_carrera(carrera).archivo(),
    };
    if !es_nombre_plantilla_valido(nombre) {
        return Err(ApiError::validacion(MSG_PLANTILLA_INVALIDA));
    }
    let ruta = dir.join(nombre);
    if !ruta.is_file() {
        return Err(ApiError::no_encontrado(MSG_PLANTILLA_NO_ENCONTRADA));
    }
    Ok(ruta)
}

/// Plantillas `.xlsx` disponibles, ordenadas. Si el directorio no existe la
/// lista es vacía.
pub fn listar_plantillas(dir: &Path) -> Result<Vec<String>, ApiError> {
    let read = match fs::read_dir(dir) {
        Ok(r) => r,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ApiError::Interno(format!("no se pudo leer {}: {}", dir.display(), e))),
    };
    let mut plantillas = Vec::new();
    for entry in read.flatten() {
        let p = entry.path();
        if !p.is_file() {
            continue;
        }
        if let Some(nombre) = p.file_name().and_then(|s| s.to_str()) {
            // temporales de Excel (~$...) y ocultos afuera
            if nombre.starts_with('~') || nombre.ends_with('~') {
                continue;
            }
            if es_nombre_plantilla_valido(nombre) {
                plantillas.push(nombre.to_string());
            }
        }
    }
    plantillas.sort();
    Ok(plantillas)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rechaza_rutas() {
        for mal in ["../secreto.xlsx", "sub/a.xlsx", "a\\b.xlsx", ".oculta.xlsx", "datos.csv", ""] {
            assert!(!es_nombre_plantilla_valido(mal), "{mal}");
        }
        assert!(es_nombre_plantilla_valido("Analitico_Profesorado.XLSX"));
    }

    #[test]
    fn resuelve_por_carrera_y_lista() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Analitico_Tecnicatura.xlsx"), b"x").unwrap();
        fs::write(dir.path().join("~$Analitico_Tecnicatura.xlsx"), b"x").unwrap();
        fs::write(dir.path().join("index.html"), b"x").unwrap();

        let ruta = resolver_plantilla(dir.path(), None, "Tec. en Informática").unwrap();
        assert!(ruta.ends_with("Analitico_Tecnicatura.xlsx"));
        assert!(matches!(resolver_plantilla(dir.path(), Some(" "), "Prof. de Historia"), Err(ApiError::NoEncontrado(_))));
        assert!(matches!(resolver_plantilla(dir.path(), Some("../x.xlsx"), "x"), Err(ApiError::Validacion(_))));

        assert_eq!(listar_plantillas(dir.path()).unwrap(), vec!["Analitico_Tecnicatura.xlsx".to_string()]);
        assert!(listar_plantillas(&dir.path().join("no-existe")).unwrap().is_empty());
    }
}
