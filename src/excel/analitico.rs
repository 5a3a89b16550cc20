//! Llenado del analítico parcial sobre una plantilla xlsx.
//!
//! La plantilla trae el formato; acá sólo se escriben celdas fijas: datos
//! del estudiante arriba, una fila por materia desde la 12 y la fecha de
//! emisión al pie (distinta celda según sea profesorado o tecnicatura).

use crate::models::RegistroAnalitico;
use crate::texto::{mes_en_espanol, nombre_archivo_seguro, solo_digitos};
use chrono::{Datelike, NaiveDate};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use umya_spreadsheet::Worksheet;

/// Orden en que las materias aparecen en el analítico.
pub const MATERIAS_ANALITICO: [&str; 10] = [
    "Algebra",
    "Análisis Matemático I",
    "Ingles Técnico I",
    "Administración de las Organizaciones",
    "Metodología de la Investigación",
    "Programación I",
    "Introducción a los Sistemas de Información",
    "Arquitectura de Computadores",
    "Edi",
    "Practica Profesional I",
];

pub const FILA_INICIAL: u32 = 12;
pub const FILA_MAXIMA: u32 = 25;
pub const SIN_MATERIAS: &str = "No se encontró materia";
pub const CONTENT_TYPE_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Error)]
pub enum AnaliticoError {
    #[error("no se pudo leer la plantilla {ruta}: {detalle}")]
    Plantilla { ruta: PathBuf, detalle: String },
    #[error("la plantilla {0} no tiene hojas")]
    SinHojas(PathBuf),
    #[error("no se pudo escribir el analítico: {0}")]
    Escritura(String),
}

/// Datos del encabezado.
#[derive(Debug, Clone)]
pub struct DatosAnalitico {
    pub dni: String,
    pub ap_nombre: String,
    pub carrera: String,
    pub resolucion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipoPlantilla {
    Profesorado,
    Tecnicatura,
}

impl TipoPlantilla {
    /// Profesorado si el nombre de la carrera contiene "prof".
    pub fn para_carrera(carrera: &str) -> TipoPlantilla {
        if carrera.to_lowercase().contains("prof") {
            TipoPlantilla::Profesorado
        } else {
            TipoPlantilla::Tecnicatura
        }
    }

    pub fn archivo(self) -> &'static str {
        match self {
            TipoPlantilla::Profesorado => "Analitico_Profesorado.xlsx",
            TipoPlantilla::Tecnicatura => "Analitico_Tecnicatura.xlsx",
        }
    }

    /// Celdas (día, mes, año) del pie.
    fn celdas_fecha(self) -> (&'static str, &'static str, &'static str) {
        match self {
            TipoPlantilla::Profesorado => ("C76", "F76", "B78"),
            TipoPlantilla::Tecnicatura => ("C49", "F49", "B51"),
        }
    }
}

/// `Analitico Parcial_<nombre>_<año>_<carrera>.xlsx`, espacios como `_`.
pub fn nombre_archivo(datos: &DatosAnalitico, anio: i32) -> String {
    format!(
        "Analitico Parcial_{}_{}_{}.xlsx",
        nombre_archivo_seguro(&datos.ap_nombre),
        anio,
        nombre_archivo_seguro(&datos.carrera)
    )
}

/// Valor de `registro` si L/F o letras coincide con `frase` (sin mayúsculas ni
/// espacios de borde). Se prefiere L/F.
fn frase_especial(registro: &RegistroAnalitico, frase: &str) -> Option<String> {
    let coincide = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().to_lowercase() == frase);
    if coincide(&registro.l_f) {
        registro.l_f.clone()
    } else if coincide(&registro.letras) {
        registro.letras.clone()
    } else {
        None
    }
}

fn escribir_texto(hoja: &mut Worksheet, celda: &str, valor: &str) {
    hoja.get_cell_mut(celda).set_value_string(valor);
}

/// Número si es todo dígitos, texto en otro caso. Devuelve si quedó número.
fn escribir_numero_o_texto(hoja: &mut Worksheet, celda: &str, valor: &str) -> bool {
    let limpio = valor.trim();
    if solo_digitos(limpio) {
        if let Ok(n) = limpio.parse::<f64>() {
            hoja.get_cell_mut(celda).set_value_number(n);
            return true;
        }
    }
    hoja.get_cell_mut(celda).set_value_string(limpio);
    false
}

fn escribir_materia(hoja: &mut Worksheet, fila: u32, registro: &RegistroAnalitico) {
    let celda = |col: char| format!("{}{}", col, fila);
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();

    escribir_texto(hoja, &celda('B'), &registro.materia);

    if let Some(frase) = frase_especial(registro, "cursada aprobada") {
        hoja.add_merge_cells(format!("C{0}:E{0}", fila));
        escribir_texto(hoja, &celda('C'), &frase);
        escribir_texto(hoja, &celda('F'), &opt(&registro.fecha_aprobacion));
    } else if let Some(frase) = frase_especial(registro, "debe cursar") {
        hoja.add_merge_cells(format!("C{0}:F{0}", fila));
        escribir_texto(hoja, &celda('C'), &frase);
    } else {
        escribir_texto(hoja, &celda('C'), &opt(&registro.numeros));
        escribir_texto(hoja, &celda('D'), &opt(&registro.letras));
        escribir_texto(hoja, &celda('E'), &opt(&registro.l_f));
        escribir_texto(hoja, &celda('F'), &opt(&registro.fecha_aprobacion));
    }
}

/// Escribe encabezado, materias y pie sobre `hoja`.
pub fn llenar_hoja(hoja: &mut Worksheet, datos: &DatosAnalitico, registros: &[RegistroAnalitico], fecha: NaiveDate) {
    escribir_texto(hoja, "B7", &datos.ap_nombre);
    if escribir_numero_o_texto(hoja, "D7", &datos.dni) {
        hoja.get_style_mut("D7").get_number_format_mut().set_format_code("#,##0");
    }
    escribir_texto(hoja, "A9", &datos.carrera);
    escribir_numero_o_texto(hoja, "E9", &datos.resolucion);
    hoja.get_style_mut("E9").get_number_format_mut().set_format_code("0");

    if registros.is_empty() {
        escribir_texto(hoja, "B12", SIN_MATERIAS);
        for celda in ["C12", "D12", "E12", "F12"] {
            escribir_texto(hoja, celda, "");
        }
    } else {
        let mut fila = FILA_INICIAL;
        for materia in MATERIAS_ANALITICO {
            // si hay repetidas vale la primera
            let Some(registro) = registros.iter().find(|r| r.materia == materia) else {
                continue;
            };
            escribir_materia(hoja, fila, registro);
            fila += 1;
            if fila > FILA_MAXIMA {
                break;
            }
        }
    }

    let (dia, mes, anio) = TipoPlantilla::para_carrera(&datos.carrera).celdas_fecha();
    hoja.get_cell_mut(dia).set_value_number(fecha.day());
    escribir_texto(hoja, mes, mes_en_espanol(fecha.month()));
    hoja.get_cell_mut(anio).set_value_number(fecha.year());
}

/// Abre la plantilla, la llena y devuelve el libro serializado.
pub fn generar_analitico(
    plantilla: &Path,
    datos: &DatosAnalitico,
    registros: &[RegistroAnalitico],
    fecha: NaiveDate,
) -> Result<Vec<u8>, AnaliticoError> {
    let mut libro = umya_spreadsheet::reader::xlsx::read(plantilla)
        .map_err(|e| AnaliticoError::Plantilla { ruta: plantilla.to_path_buf(), detalle: e.to_string() })?;

    let hoja = libro
        .get_sheet_mut(&0)
        .ok_or_else(|| AnaliticoError::SinHojas(plantilla.to_path_buf()))?;
    llenar_hoja(hoja, datos, registros, fecha);

    let mut salida = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(&libro, &mut salida).map_err(|e| AnaliticoError::Escritura(e.to_string()))?;
    tracing::debug!(dni = %datos.dni, materias = registros.len(), bytes = salida.get_ref().len(), "analítico generado");
    Ok(salida.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datos(carrera: &str) -> DatosAnalitico {
        DatosAnalitico {
            dni: "12345678".into(),
            ap_nombre: "Pérez Juan".into(),
            carrera: carrera.into(),
            resolucion: "123/20".into(),
        }
    }

    fn registro(materia: &str, l_f: &str) -> RegistroAnalitico {
        RegistroAnalitico {
            materia: materia.into(),
            l_f: Some(l_f.into()),
            fecha_aprobacion: Some("2024-12-01".into()),
            numeros: Some("8".into()),
            letras: Some("Ocho".into()),
        }
    }

    fn valor(hoja: &Worksheet, celda: &str) -> String {
        hoja.get_value(celda)
    }

    #[test]
    fn plantilla_por_carrera() {
        assert_eq!(TipoPlantilla::para_carrera("Prof. de Historia"), TipoPlantilla::Profesorado);
        assert_eq!(TipoPlantilla::para_carrera("PROFESORADO de Inglés"), TipoPlantilla::Profesorado);
        assert_eq!(TipoPlantilla::para_carrera("Tec. en Informática").archivo(), "Analitico_Tecnicatura.xlsx");
    }

    #[test]
    fn nombre_de_archivo_sin_espacios() {
        assert_eq!(
            nombre_archivo(&datos("Tec. en Informática"), 2025),
            "Analitico Parcial_Pérez_Juan_2025_Tec._en_Informática.xlsx"
        );
    }

    #[test]
    fn materias_en_orden_fijo_y_primera_gana() {
        let mut libro = umya_spreadsheet::new_file();
        let hoja = libro.get_sheet_mut(&0).unwrap();
        let registros = vec![
            registro("Edi", "3/4"),
            registro("Algebra", "1/2"),
            registro("Algebra", "9/9"),
            registro("Materia fuera de la lista", "5/5"),
        ];
        let fecha = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        llenar_hoja(hoja, &datos("Tec. en Informática"), &registros, fecha);

        assert_eq!(valor(hoja, "B12"), "Algebra");
        assert_eq!(valor(hoja, "E12"), "1/2");
        assert_eq!(valor(hoja, "B13"), "Edi");
        assert_eq!(valor(hoja, "B14"), "");
        assert_eq!(valor(hoja, "C49"), "14");
        assert_eq!(valor(hoja, "F49"), "Marzo");
        assert_eq!(valor(hoja, "B51"), "2025");
        assert_eq!(valor(hoja, "C76"), "");
    }

    #[test]
    fn frases_especiales_combinan_celdas() {
        let mut libro = umya_spreadsheet::new_file();
        let hoja = libro.get_sheet_mut(&0).unwrap();
        let mut debe = registro("Programación I", "");
        debe.l_f = None;
        debe.letras = Some(" DEBE CURSAR ".into());
        let registros = vec![registro("Algebra", "Cursada Aprobada"), debe];
        llenar_hoja(hoja, &datos("Prof. de Matemática"), &registros, NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());

        let rangos: Vec<String> = hoja.get_merge_cells().iter().map(|r| r.get_range()).collect();
        assert!(rangos.contains(&"C12:E12".to_string()));
        assert!(rangos.contains(&"C13:F13".to_string()));
        assert_eq!(valor(hoja, "C12"), "Cursada Aprobada");
        assert_eq!(valor(hoja, "F12"), "2024-12-01");
        assert_eq!(valor(hoja, "C13"), " DEBE CURSAR ");
        assert_eq!(valor(hoja, "F76"), "Enero");
    }

    #[test]
    fn sin_registros_deja_aviso() {
        let mut libro = umya_spreadsheet::new_file();
        let hoja = libro.get_sheet_mut(&0).unwrap();
        llenar_hoja(hoja, &datos("Tec. en Informática"), &[], NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(valor(hoja, "B12"), SIN_MATERIAS);
        assert_eq!(valor(hoja, "C12"), "");
    }
}
