use crate::auth::Identidad;
use crate::db::materias;
use crate::error::ApiError;
use crate::models::{requerido, MateriaInput};
use crate::server::AppState;
use crate::server_handlers::{creado_mensaje, ok_mensaje, param, MSG_CAMPOS_OBLIGATORIOS};
use crate::texto::{capitalizar_palabras, CONECTORES_BASICOS, CONECTORES_EXTENDIDOS};
use actix_web::{web, HttpResponse};
use std::collections::HashMap;

const MSG_MATERIA_NO_ENCONTRADA: &str = "No se encontró la materia";

/// Último año de cursada según el tipo de carrera.
pub fn anio_maximo(carrera: &str) -> u32 {
    let c = carrera.to_lowercase();
    if c.contains("tec.") {
        3
    } else if c.contains("prof.") {
        4
    } else {
        6
    }
}

fn validar_anio(carrera: &str, anio: &str) -> Result<(), ApiError> {
    let max = anio_maximo(carrera);
    match anio.parse::<u32>() {
        Ok(n) if (1..=max).contains(&n) => Ok(()),
        _ => Err(ApiError::validacion(format!("El año debe estar entre 1 y {}", max))),
    }
}

/// GET /materias?busqueda=  o  GET /materias?carrera=&anio=
pub async fn materias_list_handler(
    estado: web::Data<AppState>,
    _identidad: Identidad,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, ApiError> {
    let lista = match param(&query, "carrera") {
        Some(carrera) => {
            let carrera = carrera.to_string();
            let anio = param(&query, "anio").map(str::to_string);
            estado.db.run(move |c| materias::por_carrera(c, &carrera, anio.as_deref())).await?
        }
        None => {
            let busqueda = param(&query, "busqueda").unwrap_or("").to_string();
            estado.db.run(move |c| materias::buscar(c, &busqueda)).await?
        }
    };
    Ok(HttpResponse::Ok().json(lista))
}

/// POST /materias
pub async fn materias_create_handler(
    estado: web::Data<AppState>,
    _identidad: Identidad,
    body: web::Json<MateriaInput>,
) -> Result<HttpResponse, ApiError> {
    let (Some(carrera), Some(nombre), Some(anio)) = (requerido(&body.carrera), requerido(&body.nombre_materia), requerido(&body.anio)) else {
        return Err(ApiError::validacion(MSG_CAMPOS_OBLIGATORIOS));
    };
    validar_anio(carrera, anio)?;

    let carrera = carrera.to_string();
    let nombre = capitalizar_palabras(nombre, CONECTORES_BASICOS);
    let anio = anio.to_string();
    let id = estado.db.run(move |c| materias::insertar(c, &carrera, &nombre, &anio)).await?;
    tracing::info!(materia_id = id, "materia creada");
    Ok(creado_mensaje("Materia guardada correctamente"))
}

/// PUT /materias/{id}. El año es opcional.
pub async fn materias_update_handler(
    estado: web::Data<AppState>,
    _identidad: Identidad,
    path: web::Path<i64>,
    body: web::Json<MateriaInput>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let (Some(carrera), Some(nombre)) = (requerido(&body.carrera), requerido(&body.nombre_materia)) else {
        return Err(ApiError::validacion(format!("{}.", MSG_CAMPOS_OBLIGATORIOS)));
    };
    let anio = requerido(&body.anio).map(str::to_string);
    if let Some(anio) = &anio {
        validar_anio(carrera, anio)?;
    }

    let carrera = capitalizar_palabras(carrera, CONECTORES_EXTENDIDOS);
    let nombre = capitalizar_palabras(nombre, CONECTORES_BASICOS);
    let filas = estado
        .db
        .run(move |c| materias::actualizar(c, id, &carrera, &nombre, anio.as_deref()))
        .await?;
    if filas == 0 {
        return Err(ApiError::no_encontrado(MSG_MATERIA_NO_ENCONTRADA));
    }
    Ok(ok_mensaje("Materia actualizada correctamente"))
}

/// DELETE /materias/{id}
pub async fn materias_delete_handler(
    estado: web::Data<AppState>,
    _identidad: Identidad,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let borradas = estado.db.run(move |c| materias::eliminar(c, id)).await?;
    if borradas == 0 {
        return Err(ApiError::no_encontrado(MSG_MATERIA_NO_ENCONTRADA));
    }
    Ok(ok_mensaje("Materia eliminada correctamente"))
}
