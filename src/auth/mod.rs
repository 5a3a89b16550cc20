//! Autenticación: hash de contraseñas con bcrypt y tokens JWT (HS256).
//!
//! Los handlers protegidos reciben un `Identidad` como argumento; el
//! extractor lee `Authorization: Bearer <token>` y lo valida con el secreto
//! de la configuración.

use crate::config::Config;
use crate::error::ApiError;
use crate::server::AppState;
use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use futures_util::future::{ready, Ready};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub const MSG_TOKEN_REQUERIDO: &str = "Token requerido";
pub const MSG_TOKEN_INVALIDO: &str = "Token inválido";
pub const MSG_USUARIO_REGISTRADO: &str = "El usuario ya está registrado";
pub const MSG_USUARIO_NO_ENCONTRADO: &str = "Usuario no encontrado";
pub const MSG_CONTRASENA_INCORRECTA: &str = "Contraseña incorrecta";

/// Rango de costo que acepta bcrypt (sus propias constantes no son públicas).
pub const BCRYPT_COSTO_MINIMO: u32 = 4;
pub const BCRYPT_COSTO_MAXIMO: u32 = 31;

/// Contenido del token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub id: i64,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, ApiError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Compara contra el hash guardado. Un hash ilegible cuenta como error interno.
pub fn verificar_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    Ok(bcrypt::verify(password, hash)?)
}

pub fn emitir_token(id: i64, email: &str, config: &Config) -> Result<String, ApiError> {
    let ahora = Utc::now();
    let claims = Claims {
        id,
        email: email.to_string(),
        iat: ahora.timestamp(),
        exp: (ahora + Duration::hours(config.token_ttl_horas)).timestamp(),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(config.jwt_secret.as_bytes()))
        .map_err(|e| ApiError::Interno(format!("no se pudo firmar el token: {}", e)))
}

pub fn verificar_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    let mut validation = Validation::default();
    validation.leeway = 0;
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "token rechazado");
            ApiError::NoAutorizado(MSG_TOKEN_INVALIDO.into())
        })
}

/// Identidad del usuario autenticado, extraída del token.
#[derive(Debug, Clone)]
pub struct Identidad {
    pub id: i64,
    pub email: String,
}

impl Identidad {
    fn desde_request(req: &HttpRequest) -> Result<Identidad, ApiError> {
        let header = req
            .headers()
            .get(actix_web::http::header::AUTHORIZATION)
            .ok_or_else(|| ApiError::Prohibido(MSG_TOKEN_REQUERIDO.into()))?;
        let valor = header.to_str().map_err(|_| ApiError::NoAutorizado(MSG_TOKEN_INVALIDO.into()))?;

        let token = match valor.split_once(' ') {
            Some((esquema, token)) if esquema.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => token.trim(),
            _ => return Err(ApiError::NoAutorizado(MSG_TOKEN_INVALIDO.into())),
        };

        let estado = req
            .app_data::<web::Data<AppState>>()
            .ok_or_else(|| ApiError::Interno("AppState no registrado en la aplicación".into()))?;
        let claims = verificar_token(token, &estado.config.jwt_secret)?;
        Ok(Identidad { id: claims.id, email: claims.email })
    }
}

impl FromRequest for Identidad {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Identidad::desde_request(req))
    }
}
