use crate::auth::Identidad;
use crate::carga_notas::numero_a_letras;
use crate::db::calificaciones::{self, NuevaCalificacion};
use crate::error::ApiError;
use crate::models::{requerido, CalificacionInput};
use crate::server::AppState;
use crate::server_handlers::{ok_mensaje, param};
use crate::texto::normalizar_fecha;
use actix_web::{web, HttpResponse};
use serde_json::json;
use std::collections::HashMap;

const MSG_FALTAN_DATOS: &str = "Faltan datos requeridos";
const MSG_CONSULTA_INCOMPLETA: &str = "Se requieren 'dni' y 'materia' para la consulta";
const MSG_CREADO: &str = "Registro creado exitosamente";
const MSG_ACTUALIZADO: &str = "Registro actualizado exitosamente";

/// Arma la fila a escribir. Si llega la nota numérica (1 a 10) sin letras,
/// las letras se completan.
pub fn nueva_calificacion(input: &CalificacionInput) -> Result<NuevaCalificacion, ApiError> {
    let campos = (
        requerido(&input.dni),
        requerido(&input.ap_nombre),
        requerido(&input.carrera),
        requerido(&input.materia),
        requerido(&input.curso),
    );
    let (Some(dni), Some(ap_nombre), Some(carrera), Some(materia), Some(curso)) = campos else {
        return Err(ApiError::validacion(MSG_FALTAN_DATOS));
    };

    let opcional = |v: &Option<String>| requerido(v).map(str::to_string);
    let numeros = opcional(&input.numeros);
    let letras = opcional(&input.letras).or_else(|| numeros.as_deref().and_then(numero_a_letras).map(str::to_string));
    let fecha_aprobacion = opcional(&input.fecha_aprobacion).map(|f| normalizar_fecha(&f)).filter(|f| !f.is_empty());

    Ok(NuevaCalificacion {
        dni: dni.to_string(),
        ap_nombre: ap_nombre.to_string(),
        carrera: carrera.to_string(),
        resolucion: opcional(&input.resolucion),
        materia: materia.to_string(),
        curso: curso.to_string(),
        l_f: opcional(&input.l_f),
        fecha_aprobacion,
        numeros,
        letras,
    })
}

/// GET /calificaciones?dni=&materia=
pub async fn calificaciones_list_handler(
    estado: web::Data<AppState>,
    _identidad: Identidad,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, ApiError> {
    let (Some(dni), Some(materia)) = (param(&query, "dni"), param(&query, "materia")) else {
        return Err(ApiError::validacion(MSG_CONSULTA_INCOMPLETA));
    };
    let (dni, materia) = (dni.to_string(), materia.to_string());
    let filas = estado.db.run(move |c| calificaciones::por_dni_y_materia(c, &dni, &materia)).await?;
    Ok(HttpResponse::Ok().json(filas))
}

/// POST /calificaciones
pub async fn calificaciones_create_handler(
    estado: web::Data<AppState>,
    _identidad: Identidad,
    body: web::Json<CalificacionInput>,
) -> Result<HttpResponse, ApiError> {
    let nueva = nueva_calificacion(&body)?;
    let id = estado.db.run(move |c| calificaciones::insertar(c, &nueva)).await?;
    Ok(HttpResponse::Created().json(json!({ "message": MSG_CREADO, "id": id })))
}

/// PUT /calificaciones: alta o reemplazo de la nota de (dni, materia) en una
/// sola escritura.
pub async fn calificaciones_upsert_handler(
    estado: web::Data<AppState>,
    _identidad: Identidad,
    body: web::Json<CalificacionInput>,
) -> Result<HttpResponse, ApiError> {
    let nueva = nueva_calificacion(&body)?;
    let (dni, materia) = (nueva.dni.clone(), nueva.materia.clone());
    let (id, creada) = estado.db.run(move |c| calificaciones::guardar(c, &nueva)).await?;
    tracing::info!(calificacion_id = id, %dni, %materia, creada, "calificación guardada");

    let cuerpo = |msg: &str| json!({ "message": msg, "id": id, "creado": creada });
    Ok(if creada {
        HttpResponse::Created().json(cuerpo(MSG_CREADO))
    } else {
        HttpResponse::Ok().json(cuerpo(MSG_ACTUALIZADO))
    })
}

/// PUT /calificaciones/{id}
pub async fn calificaciones_update_handler(
    estado: web::Data<AppState>,
    _identidad: Identidad,
    path: web::Path<i64>,
    body: web::Json<CalificacionInput>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let cambios = nueva_calificacion(&body)?;
    let filas = estado.db.run(move |c| calificaciones::actualizar(c, id, &cambios)).await?;
    if filas == 0 {
        return Err(ApiError::no_encontrado("No se encontró registro para actualizar"));
    }
    Ok(ok_mensaje(MSG_ACTUALIZADO))
}

/// DELETE /calificaciones/{id}
pub async fn calificaciones_delete_handler(
    estado: web::Data<AppState>,
    _identidad: Identidad,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let borradas = estado.db.run(move |c| calificaciones::eliminar(c, id)).await?;
    if borradas == 0 {
        return Err(ApiError::no_encontrado("No se encontró la calificación"));
    }
    Ok(ok_mensaje("Calificación eliminada correctamente"))
}
