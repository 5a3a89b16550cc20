//! Normalización de textos: nombres de materias, carreras y personas, y
//! nombres de archivo para descargas.

/// Conectores para nombres de materias ("Análisis y Diseño").
pub const CONECTORES_BASICOS: &[&str] = &["y", "o"];

/// Conectores para nombres de carreras ("Tec. en Informática").
pub const CONECTORES_EXTENDIDOS: &[&str] = &["y", "o", "en", "de", "a", "con", "para"];

/// Nombres de personas: todas las palabras se capitalizan.
pub const SIN_CONECTORES: &[&str] = &[];

pub const MESES: [&str; 12] = [
    "Enero", "Febrero", "Marzo", "Abril", "Mayo", "Junio",
    "Julio", "Agosto", "Septiembre", "Octubre", "Noviembre", "Diciembre",
];

/// Pasa cada palabra a minúsculas y capitaliza su primera letra, salvo que
/// sea uno de los `conectores`. Separa por espacios simples y los conserva,
/// así que aplicarla dos veces da el mismo resultado que una.
pub fn capitalizar_palabras(texto: &str, conectores: &[&str]) -> String {
    texto
        .split(' ')
        .map(|palabra| {
            let minus = palabra.to_lowercase();
            if conectores.contains(&minus.as_str()) {
                minus
            } else {
                capitalizar_primera(&minus)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Primera letra en mayúscula, el resto en minúscula ("jUAN pérez" -> "Juan pérez").
pub fn nombre_propio(texto: &str) -> String {
    capitalizar_primera(&texto.to_lowercase())
}

// Asume `s` ya en minúsculas. Si la mayúscula ocupa más de un carácter (ß)
// se deja la letra original.
fn capitalizar_primera(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => {
            let mut upper = c.to_uppercase();
            let primera = match (upper.next(), upper.next()) {
                (Some(u), None) => u,
                _ => c,
            };
            let mut out = String::with_capacity(s.len());
            out.push(primera);
            out.push_str(chars.as_str());
            out
        }
    }
}

/// Reemplaza cada tramo de espacios en blanco por `_`.
pub fn nombre_archivo_seguro(texto: &str) -> String {
    let mut out = String::with_capacity(texto.len());
    let mut en_blanco = false;
    for c in texto.chars() {
        if c.is_whitespace() {
            if !en_blanco {
                out.push('_');
            }
            en_blanco = true;
        } else {
            out.push(c);
            en_blanco = false;
        }
    }
    out
}

/// Nombre del mes (1 = Enero). Fuera de rango devuelve cadena vacía.
pub fn mes_en_espanol(mes: u32) -> &'static str {
    match mes {
        1..=12 => MESES[(mes - 1) as usize],
        _ => "",
    }
}

/// `true` si la cadena no está vacía y sólo contiene dígitos ASCII.
pub fn solo_digitos(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Versión ASCII para el `filename` plano de Content-Disposition: vocales
/// acentuadas y eñe pierden el signo, el resto de lo no ASCII pasa a `_`.
pub fn a_ascii(texto: &str) -> String {
    texto
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'Á' | 'À' | 'Ä' | 'Â' => 'A',
            'É' | 'È' | 'Ë' | 'Ê' => 'E',
            'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
            'Ó' | 'Ò' | 'Ö' | 'Ô' => 'O',
            'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
            'ñ' => 'n',
            'Ñ' => 'N',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect()
}

/// Lleva `dd/mm/aaaa` a `aaaa-mm-dd`. Lo que ya trae guiones (incluido el
/// marcador `---`) queda igual; cualquier otra forma da cadena vacía.
pub fn normalizar_fecha(fecha: &str) -> String {
    let fecha = fecha.trim();
    if fecha.is_empty() || fecha.contains('-') {
        return fecha.to_string();
    }
    let partes: Vec<&str> = fecha.split('/').collect();
    match partes.as_slice() {
        [dia, mes, anio] => format!("{}-{:0>2}-{:0>2}", anio, mes, dia),
        _ => String::new(),
    }
}
