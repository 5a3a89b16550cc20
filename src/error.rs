//! Errores de la API y su traducción a respuestas HTTP.
//!
//! Cada handler devuelve `Result<_, ApiError>`; actix convierte el error en
//! una respuesta JSON `{"message": "..."}` con el código que corresponde.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use rusqlite::ErrorCode;
use serde_json::json;
use thiserror::Error;

/// Mensaje genérico para fallos internos; el detalle sólo va al log.
pub const MENSAJE_ERROR_SERVIDOR: &str = "Error en el servidor";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Faltan campos obligatorios o tienen un formato inválido.
    #[error("{0}")]
    Validacion(String),

    /// Violación de unicidad (email, DNI, resolución+cohorte, dni+materia).
    #[error("{0}")]
    Duplicado(String),

    #[error("{0}")]
    NoEncontrado(String),

    /// Token inválido/expirado o contraseña incorrecta.
    #[error("{0}")]
    NoAutorizado(String),

    /// Falta el token.
    #[error("{0}")]
    Prohibido(String),

    #[error("error interno: {0}")]
    Interno(String),
}

impl ApiError {
    pub fn validacion(msg: impl Into<String>) -> Self {
        ApiError::Validacion(msg.into())
    }

    pub fn no_encontrado(msg: impl Into<String>) -> Self {
        ApiError::NoEncontrado(msg.into())
    }

    pub fn duplicado(msg: impl Into<String>) -> Self {
        ApiError::Duplicado(msg.into())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validacion(_) | ApiError::Duplicado(_) => StatusCode::BAD_REQUEST,
            ApiError::NoEncontrado(_) => StatusCode::NOT_FOUND,
            ApiError::NoAutorizado(_) => StatusCode::UNAUTHORIZED,
            ApiError::Prohibido(_) => StatusCode::FORBIDDEN,
            ApiError::Interno(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ApiError::Interno(detalle) => {
                tracing::error!(error = %detalle, "fallo interno atendiendo la petición");
                MENSAJE_ERROR_SERVIDOR.to_string()
            }
            otro => otro.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(e: rusqlite::Error) -> Self {
        ApiError::Interno(format!("sqlite: {}", e))
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError::Interno(format!("tarea bloqueante: {}", e))
    }
}

impl From<bcrypt::BcryptError> for ApiError {
    fn from(e: bcrypt::BcryptError) -> Self {
        ApiError::Interno(format!("bcrypt: {}", e))
    }
}

/// Devuelve `true` si el error de SQLite es una violación de UNIQUE/PRIMARY KEY.
pub fn es_violacion_unica(e: &rusqlite::Error) -> bool {
    match e {
        rusqlite::Error::SqliteFailure(err, _) => {
            err.code == ErrorCode::ConstraintViolation
                && (err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
        }
        _ => false,
    }
}

/// Traduce una violación de unicidad a `Duplicado(msg)`; el resto queda como `Interno`.
pub fn mapear_unicidad(e: rusqlite::Error, msg: &str) -> ApiError {
    if es_violacion_unica(&e) {
        ApiError::duplicado(msg)
    } else {
        ApiError::from(e)
    }
}
