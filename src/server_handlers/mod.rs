pub mod analitico;
pub mod auth;
pub mod calificaciones;
pub mod carreras;
pub mod estaticos;
pub mod estudiantes;
pub mod materias;

pub use analitico::*;
pub use auth::*;
pub use calificaciones::*;
pub use carreras::*;
pub use estaticos::*;
pub use estudiantes::*;
pub use materias::*;

use actix_web::HttpResponse;
use serde_json::json;
use std::collections::HashMap;

pub(crate) const MSG_CAMPOS_OBLIGATORIOS: &str = "Todos los campos son obligatorios";

/// 200 con `{"message": msg}`.
pub(crate) fn ok_mensaje(msg: &str) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": msg }))
}

/// 201 con `{"message": msg}`.
pub(crate) fn creado_mensaje(msg: &str) -> HttpResponse {
    HttpResponse::Created().json(json!({ "message": msg }))
}

/// Parámetro de query recortado; vacío cuenta como ausente.
pub(crate) fn param<'a>(query: &'a HashMap<String, String>, clave: &str) -> Option<&'a str> {
    query.get(clave).map(|s| s.trim()).filter(|s| !s.is_empty())
}
