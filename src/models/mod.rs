// Estructuras de datos principales: filas de la base y cuerpos de las peticiones.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone)]
pub struct Usuario {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Hash bcrypt.
    pub password: String,
    pub rol_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Carrera {
    pub id: i64,
    pub categoria: String,
    pub subcategoria: String,
    pub resolucion: String,
    pub cohorte: i64,
    pub duracion: i64,
    pub carga_horaria: i64,
}

/// Entrada del desplegable de carreras.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CarreraOpcion {
    pub id: i64,
    pub subcategoria: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Materia {
    pub id: i64,
    pub nombre_materia: String,
    pub carrera: String,
    pub anio: String,
}

/// Estudiante tal como lo devuelve la búsqueda.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Estudiante {
    pub id: i64,
    pub nombre: String,
    pub dni: String,
    pub fecha_nacimiento: String,
    pub telefono: Option<String>,
    pub email: String,
    pub carrera: String,
}

/// Resultado de buscar un DNI en `estudiantes` y `dni_duplicados`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EstudiantePorDni {
    pub nombre: String,
    pub carrera: String,
    /// Tabla de origen: "estudiantes" o "dni_duplicados".
    pub tabla: String,
    pub resolucion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Calificacion {
    pub id: i64,
    pub dni: String,
    pub ap_nombre: String,
    pub carrera: String,
    pub resolucion: Option<String>,
    pub materia: String,
    pub curso: String,
    pub l_f: Option<String>,
    pub fecha_aprobacion: Option<String>,
    pub numeros: Option<String>,
    pub letras: Option<String>,
}

/// Fila de calificación usada para llenar el analítico.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistroAnalitico {
    pub materia: String,
    pub l_f: Option<String>,
    pub fecha_aprobacion: Option<String>,
    pub numeros: Option<String>,
    pub letras: Option<String>,
}

// --- Cuerpos de peticiones ---
//
// Todos los campos son opcionales a nivel de deserialización: la validación
// de obligatorios la hacen los handlers para responder 400 con el mensaje
// adecuado en vez del error genérico de serde.

#[derive(Debug, Default, Deserialize)]
pub struct RegistroInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CarreraInput {
    pub categoria: Option<String>,
    pub subcategoria: Option<String>,
    pub resolucion: Option<String>,
    #[serde(default, deserialize_with = "entero_flexible")]
    pub cohorte: Option<i64>,
    #[serde(default, deserialize_with = "entero_flexible")]
    pub duracion: Option<i64>,
    #[serde(default, alias = "horas", deserialize_with = "entero_flexible")]
    pub carga_horaria: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MateriaInput {
    pub carrera: Option<String>,
    pub nombre_materia: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    pub anio: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EstudianteInput {
    pub carrera: Option<String>,
    pub apellido_y_nombre: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    pub dni: Option<String>,
    pub fecha_de_nacimiento: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    pub telefono: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CalificacionInput {
    #[serde(default, deserialize_with = "texto_flexible")]
    pub dni: Option<String>,
    pub ap_nombre: Option<String>,
    pub carrera: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    pub resolucion: Option<String>,
    pub materia: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    pub curso: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    pub l_f: Option<String>,
    pub fecha_aprobacion: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    pub numeros: Option<String>,
    pub letras: Option<String>,
}

/// Devuelve el valor recortado si no está vacío.
pub fn requerido(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Acepta `"2024"` o `2024`; cadena vacía o `null` cuentan como ausentes.
fn entero_flexible<'de, D>(de: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    match Option::<serde_json::Value>::deserialize(de)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("se esperaba un entero, llegó {}", n))),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("se esperaba un entero, llegó {:?}", s))),
        Some(otro) => Err(D::Error::custom(format!("se esperaba un entero, llegó {}", otro))),
    }
}

/// Acepta texto o números (los formularios mandan DNI y año a veces como número).
fn texto_flexible<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    match Option::<serde_json::Value>::deserialize(de)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(otro) => Err(D::Error::custom(format!("se esperaba texto, llegó {}", otro))),
    }
}
