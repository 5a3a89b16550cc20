use crate::auth::{self, Identidad, MSG_CONTRASENA_INCORRECTA, MSG_USUARIO_NO_ENCONTRADO, MSG_USUARIO_REGISTRADO};
use crate::db::usuarios;
use crate::error::ApiError;
use crate::models::{requerido, LoginInput, RegistroInput};
use crate::server::AppState;
use crate::server_handlers::{creado_mensaje, MSG_CAMPOS_OBLIGATORIOS};
use crate::texto::nombre_propio;
use actix_web::{web, HttpResponse};
use serde_json::json;

/// POST /register
pub async fn register_handler(estado: web::Data<AppState>, body: web::Json<RegistroInput>) -> Result<HttpResponse, ApiError> {
    let input = body.into_inner();
    let (Some(name), Some(email), Some(password)) = (requerido(&input.name), requerido(&input.email), input.password.as_deref().filter(|p| !p.is_empty())) else {
        return Err(ApiError::validacion(MSG_CAMPOS_OBLIGATORIOS));
    };
    let name = nombre_propio(name);
    let email = email.to_string();
    let password = password.to_string();

    let existente = {
        let email = email.clone();
        estado.db.run(move |c| usuarios::buscar_por_email(c, &email)).await?
    };
    if existente.is_some() {
        return Err(ApiError::duplicado(MSG_USUARIO_REGISTRADO));
    }

    // bcrypt es caro: fuera del mutex de la base
    let cost = estado.config.bcrypt_cost;
    let hash = tokio::task::spawn_blocking(move || auth::hash_password(&password, cost)).await??;

    let id = {
        let email = email.clone();
        estado.db.run(move |c| usuarios::insertar(c, &name, &email, &hash)).await?
    };
    tracing::info!(usuario_id = id, %email, "usuario registrado");
    Ok(creado_mensaje("Usuario registrado con éxito"))
}

/// POST /login
pub async fn login_handler(estado: web::Data<AppState>, body: web::Json<LoginInput>) -> Result<HttpResponse, ApiError> {
    let input = body.into_inner();
    let (Some(email), Some(password)) = (requerido(&input.email), input.password.as_deref().filter(|p| !p.is_empty())) else {
        return Err(ApiError::validacion(MSG_CAMPOS_OBLIGATORIOS));
    };
    let email = email.to_string();
    let password = password.to_string();

    let usuario = {
        let email = email.clone();
        estado.db.run(move |c| usuarios::buscar_por_email(c, &email)).await?
    }
    .ok_or_else(|| ApiError::no_encontrado(MSG_USUARIO_NO_ENCONTRADO))?;

    let hash = usuario.password.clone();
    let valida = tokio::task::spawn_blocking(move || auth::verificar_password(&password, &hash)).await??;
    if !valida {
        tracing::info!(%email, "contraseña incorrecta");
        return Err(ApiError::NoAutorizado(MSG_CONTRASENA_INCORRECTA.into()));
    }

    let token = auth::emitir_token(usuario.id, &usuario.email, &estado.config)?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Inicio de sesión exitoso",
        "token": token,
        "name": usuario.name,
    })))
}

/// POST /getUserName
pub async fn user_name_handler(estado: web::Data<AppState>, identidad: Identidad) -> Result<HttpResponse, ApiError> {
    let email = identidad.email;
    let usuario = estado
        .db
        .run(move |c| usuarios::buscar_por_email(c, &email))
        .await?
        .ok_or_else(|| ApiError::no_encontrado(MSG_USUARIO_NO_ENCONTRADO))?;
    Ok(HttpResponse::Ok().json(json!({ "name": usuario.name })))
}

/// POST /getUserInfo
pub async fn user_info_handler(estado: web::Data<AppState>, identidad: Identidad) -> Result<HttpResponse, ApiError> {
    let email = identidad.email;
    let usuario = estado
        .db
        .run(move |c| usuarios::buscar_por_email(c, &email))
        .await?
        .ok_or_else(|| ApiError::no_encontrado(MSG_USUARIO_NO_ENCONTRADO))?;
    Ok(HttpResponse::Ok().json(json!({ "name": usuario.name, "rol_id": usuario.rol_id })))
}
