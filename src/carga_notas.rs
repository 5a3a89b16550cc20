//! Máquina de estados del formulario de carga de notas.
//!
//! El campo L/F (libro/folio) admite tres regímenes: vacío, un libro/folio
//! numérico, o una de dos frases especiales que bloquean las notas. Las
//! transiciones no dependen de ningún framework de interfaz: cada método
//! recibe el valor completo del campo después de la tecla.

use crate::error::ApiError;
use crate::models::CalificacionInput;
use regex::Regex;
use std::sync::OnceLock;

pub const CURSADA_APROBADA: &str = "Cursada Aprobada";
pub const DEBE_CURSAR: &str = "Debe Cursar";
/// Relleno de los campos bloqueados.
pub const MARCADOR: &str = "---";
pub const ANIO_MINIMO_APROBACION: i32 = 2010;
pub const MSG_CAMPOS_OBLIGATORIOS: &str = "Todos los campos son obligatorios";

const NOTAS_EN_LETRAS: [&str; 10] = ["Uno", "Dos", "Tres", "Cuatro", "Cinco", "Seis", "Siete", "Ocho", "Nueve", "Diez"];

/// Nota en palabras para "1".."10"; cualquier otra cosa devuelve `None`.
pub fn numero_a_letras(numero: &str) -> Option<&'static str> {
    let n: usize = numero.trim().parse().ok()?;
    match n {
        1..=10 => Some(NOTAS_EN_LETRAS[n - 1]),
        _ => None,
    }
}

/// `true` si `v` tiene forma de libro/folio: "12", "12/", "12/345".
pub fn es_libro_folio(v: &str) -> bool {
    static PATRON: OnceLock<Regex> = OnceLock::new();
    PATRON
        .get_or_init(|| Regex::new(r"^[1-9]\d{0,2}(?:/(?:[1-9]\d{0,2})?)?$").expect("patrón L/F válido"))
        .is_match(v)
}

/// `true` si `nuevo` sale de borrar caracteres de `frase`: más corto y con
/// sus caracteres en el mismo orden.
fn es_borrado_de(frase: &str, nuevo: &str) -> bool {
    if nuevo.chars().count() >= frase.chars().count() {
        return false;
    }
    let mut resto = frase.chars();
    nuevo.chars().all(|c| resto.any(|f| f == c))
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EstadoLf {
    #[default]
    Vacio,
    Numerico(String),
    CursadaAprobada,
    DebeCursar,
}

impl EstadoLf {
    /// Texto que muestra el campo.
    pub fn texto(&self) -> &str {
        match self {
            EstadoLf::Vacio => "",
            EstadoLf::Numerico(s) => s,
            EstadoLf::CursadaAprobada => CURSADA_APROBADA,
            EstadoLf::DebeCursar => DEBE_CURSAR,
        }
    }

    /// Las dos frases especiales bloquean la nota numérica y en letras.
    pub fn bloquea_notas(&self) -> bool {
        matches!(self, EstadoLf::CursadaAprobada | EstadoLf::DebeCursar)
    }
}

/// Datos del estudiante elegido en la búsqueda por DNI.
#[derive(Debug, Clone, Default)]
pub struct ContextoEstudiante {
    pub dni: String,
    pub ap_nombre: String,
    pub carrera: String,
    pub resolucion: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormularioNota {
    pub curso: String,
    pub materia: String,
    pub lf: EstadoLf,
    pub numeros: String,
    pub letras: String,
    pub fecha: String,
}

impl FormularioNota {
    pub fn new() -> FormularioNota {
        FormularioNota::default()
    }

    fn limpiar_derivados(&mut self) {
        self.lf = EstadoLf::Vacio;
        self.numeros.clear();
        self.letras.clear();
        self.fecha.clear();
    }

    pub fn escribir_lf(&mut self, nuevo: &str) {
        if nuevo.is_empty() {
            self.limpiar_derivados();
            return;
        }

        // "c"/"d" como valor completo: campo vacío o frase anterior reemplazada
        if nuevo.eq_ignore_ascii_case("c") {
            self.lf = EstadoLf::CursadaAprobada;
            self.numeros = MARCADOR.to_string();
            self.letras = MARCADOR.to_string();
            self.fecha.clear();
            return;
        }

        if nuevo.eq_ignore_ascii_case("d") {
            self.lf = EstadoLf::DebeCursar;
            self.numeros = MARCADOR.to_string();
            self.letras = MARCADOR.to_string();
            self.fecha = MARCADOR.to_string();
            return;
        }

        if self.lf.bloquea_notas() {
            if es_borrado_de(self.lf.texto(), nuevo) {
                self.limpiar_derivados();
            } else if es_libro_folio(nuevo) {
                self.limpiar_derivados();
                self.lf = EstadoLf::Numerico(nuevo.to_string());
            }
            return;
        }

        if nuevo.chars().count() < self.lf.texto().chars().count() {
            // borrar dentro del libro/folio invalida la nota cargada
            self.lf = EstadoLf::Numerico(nuevo.to_string());
            self.numeros.clear();
            self.letras.clear();
        } else if es_libro_folio(nuevo) {
            self.lf = EstadoLf::Numerico(nuevo.to_string());
        }
    }

    pub fn escribir_numeros(&mut self, v: &str) {
        if self.lf.bloquea_notas() {
            return;
        }
        if v.is_empty() {
            self.numeros.clear();
            self.letras.clear();
            return;
        }
        // "07" o " 7" no pasan: sólo 1..9 y 10 tal cual
        let valido = matches!(v, "10") || (v.len() == 1 && matches!(v.as_bytes()[0], b'1'..=b'9'));
        if let (true, Some(letras)) = (valido, numero_a_letras(v)) {
            self.numeros = v.to_string();
            self.letras = letras.to_string();
        }
    }

    /// Fecha `AAAA-MM-DD` del selector; el año se corta a 4 dígitos.
    pub fn escribir_fecha(&mut self, v: &str) {
        if self.lf == EstadoLf::DebeCursar {
            return;
        }
        let mut partes: Vec<String> = v.split('-').map(str::to_string).collect();
        if let Some(anio) = partes.first_mut() {
            if anio.chars().count() > 4 {
                *anio = anio.chars().take(4).collect();
            }
        }
        self.fecha = partes.join("-");
    }

    /// Al salir del campo: una fecha completa anterior a 2010 se descarta.
    pub fn confirmar_fecha(&mut self) {
        let partes: Vec<&str> = self.fecha.split('-').collect();
        if partes.len() == 3 {
            if let Ok(anio) = partes[0].parse::<i32>() {
                if anio < ANIO_MINIMO_APROBACION {
                    self.fecha.clear();
                }
            }
        }
    }

    /// Botón Reset: vacía todo, curso incluido.
    pub fn reiniciar(&mut self) {
        *self = FormularioNota::default();
    }

    /// Después de guardar se conserva el curso elegido.
    pub fn limpiar_tras_guardar(&mut self) {
        let curso = std::mem::take(&mut self.curso);
        self.reiniciar();
        self.curso = curso;
    }

    /// Arma el cuerpo para `PUT /calificaciones`. Curso, materia, L/F, fecha y
    /// nota numérica son obligatorios.
    pub fn validar(&self, estudiante: &ContextoEstudiante) -> Result<CalificacionInput, ApiError> {
        let lf = self.lf.texto();
        let faltan = [self.curso.as_str(), self.materia.as_str(), lf, self.fecha.as_str(), self.numeros.as_str()]
            .iter()
            .any(|v| v.trim().is_empty());
        if faltan {
            return Err(ApiError::validacion(MSG_CAMPOS_OBLIGATORIOS));
        }

        Ok(CalificacionInput {
            dni: Some(estudiante.dni.clone()),
            ap_nombre: Some(estudiante.ap_nombre.clone()),
            carrera: Some(estudiante.carrera.clone()),
            resolucion: Some(estudiante.resolucion.clone()),
            materia: Some(self.materia.clone()),
            curso: Some(self.curso.clone()),
            l_f: Some(lf.to_string()),
            fecha_aprobacion: Some(self.fecha.clone()),
            numeros: Some(self.numeros.clone()),
            letras: Some(self.letras.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letras_de_uno_a_diez() {
        assert_eq!(numero_a_letras("1"), Some("Uno"));
        assert_eq!(numero_a_letras(" 10 "), Some("Diez"));
        assert_eq!(numero_a_letras("0"), None);
        assert_eq!(numero_a_letras("11"), None);
        assert_eq!(numero_a_letras("siete"), None);
    }

    #[test]
    fn patron_libro_folio() {
        for ok in ["1", "12", "123", "12/", "12/3", "999/999"] {
            assert!(es_libro_folio(ok), "{ok}");
        }
        for mal in ["0", "01", "1234", "12/0", "12/1234", "/3", "1//2", "a"] {
            assert!(!es_libro_folio(mal), "{mal}");
        }
    }

    #[test]
    fn d_bloquea_tambien_la_fecha() {
        let mut f = FormularioNota::new();
        f.escribir_lf("d");
        assert_eq!(f.lf, EstadoLf::DebeCursar);
        f.escribir_fecha("2024-01-01");
        f.escribir_numeros("8");
        assert_eq!(f.fecha, MARCADOR);
        assert_eq!(f.numeros, MARCADOR);
    }

    #[test]
    fn numeros_solo_uno_a_diez() {
        let mut f = FormularioNota::new();
        f.escribir_numeros("7");
        assert_eq!((f.numeros.as_str(), f.letras.as_str()), ("7", "Siete"));
        f.escribir_numeros("11");
        f.escribir_numeros("07");
        f.escribir_numeros("x");
        assert_eq!(f.numeros, "7");
        f.escribir_numeros("");
        assert!(f.numeros.is_empty() && f.letras.is_empty());
    }

    #[test]
    fn fecha_corta_anio_y_descarta_antes_de_2010() {
        let mut f = FormularioNota::new();
        f.escribir_fecha("202455-03-01");
        assert_eq!(f.fecha, "2024-03-01");
        f.confirmar_fecha();
        assert_eq!(f.fecha, "2024-03-01");
        f.escribir_fecha("2009-12-31");
        f.confirmar_fecha();
        assert!(f.fecha.is_empty());
    }

    #[test]
    fn limpiar_tras_guardar_conserva_curso() {
        let mut f = FormularioNota { curso: "2".into(), materia: "Edi".into(), ..Default::default() };
        f.escribir_lf("12/3");
        f.limpiar_tras_guardar();
        assert_eq!(f.curso, "2");
        assert_eq!(f.lf, EstadoLf::Vacio);
        f.reiniciar();
        assert!(f.curso.is_empty());
    }
    fn con_nota(lf: &str) -> FormularioNota {
        let mut f = FormularioNota::new();
        f.escribir_lf(lf);
        f.escribir_numeros("8");
        f.escribir_fecha("2024-03-01");
        f
    }

    #[test]
    fn vaciar_lf_limpia_nota_y_fecha() {
        let mut f = con_nota("12/3");
        assert_eq!(f.letras, "Ocho");
        f.escribir_lf("");
        assert_eq!(f.lf, EstadoLf::Vacio);
        assert!(f.numeros.is_empty() && f.letras.is_empty() && f.fecha.is_empty());
    }

    #[test]
    fn acortar_lf_numerico_borra_la_nota_y_deja_la_fecha() {
        let mut f = con_nota("12/3");
        f.escribir_lf("12/");
        assert_eq!(f.lf, EstadoLf::Numerico("12/".into()));
        assert!(f.numeros.is_empty() && f.letras.is_empty());
        assert_eq!(f.fecha, "2024-03-01");
    }

    #[test]
    fn c_y_d_pisan_un_lf_numerico() {
        let mut f = con_nota("12/3");
        f.escribir_lf("C");
        assert_eq!(f.lf, EstadoLf::CursadaAprobada);
        assert_eq!((f.numeros.as_str(), f.letras.as_str()), (MARCADOR, MARCADOR));
        assert!(f.fecha.is_empty());

        let mut f = con_nota("12/3");
        f.escribir_lf("D");
        assert_eq!(f.lf, EstadoLf::DebeCursar);
        assert_eq!(f.fecha, MARCADOR);
    }

    #[test]
    fn una_frase_se_reemplaza_por_la_otra() {
        let mut f = FormularioNota::new();
        f.escribir_lf("c");
        f.escribir_lf("D");
        assert_eq!(f.lf, EstadoLf::DebeCursar);
        assert_eq!((f.numeros.as_str(), f.letras.as_str(), f.fecha.as_str()), (MARCADOR, MARCADOR, MARCADOR));

        f.escribir_lf("c");
        assert_eq!(f.lf, EstadoLf::CursadaAprobada);
        assert_eq!((f.numeros.as_str(), f.letras.as_str()), (MARCADOR, MARCADOR));
        assert!(f.fecha.is_empty());
    }

    #[test]
    fn numero_sobre_una_frase_arranca_de_cero() {
        let mut f = FormularioNota::new();
        f.escribir_lf("d");
        f.escribir_lf("5");
        assert_eq!(f.lf, EstadoLf::Numerico("5".into()));
        assert!(f.numeros.is_empty() && f.letras.is_empty() && f.fecha.is_empty());

        // texto que no es libro/folio ni borrado de la frase se ignora
        f.escribir_lf("c");
        f.escribir_lf("xyz");
        assert_eq!(f.lf, EstadoLf::CursadaAprobada);
    }

    #[test]
    fn borrar_sobre_la_frase_vacia_el_campo() {
        let mut f = FormularioNota::new();
        f.escribir_lf("d");
        f.escribir_lf("Debe Cursa");
        assert_eq!(f.lf, EstadoLf::Vacio);
        assert!(f.fecha.is_empty());

        f.escribir_lf("c");
        f.escribir_lf("Cursada probada");
        assert_eq!(f.lf, EstadoLf::Vacio);

        assert!(es_borrado_de("Debe Cursar", "Debe ursar"));
        assert!(!es_borrado_de("Debe Cursar", "5"));
        assert!(!es_borrado_de("Debe Cursar", "Debe Cursar!"));
    }
}
