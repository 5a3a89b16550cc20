use crate::auth::Identidad;
use crate::db::carreras::{self, NuevaCarrera};
use crate::error::ApiError;
use crate::models::{requerido, CarreraInput};
use crate::server::AppState;
use crate::server_handlers::{creado_mensaje, ok_mensaje, param, MSG_CAMPOS_OBLIGATORIOS};
use crate::texto::{capitalizar_palabras, CONECTORES_EXTENDIDOS};
use actix_web::{web, HttpResponse};
use std::collections::HashMap;

const MSG_CARRERA_NO_ENCONTRADA: &str = "No se encontró la carrera";

fn positivo(v: Option<i64>) -> Option<i64> {
    v.filter(|n| *n > 0)
}

/// Valida el cuerpo. En el alta la categoría es obligatoria; en la edición
/// no se usa.
fn nueva_carrera(input: &CarreraInput, exigir_categoria: bool) -> Result<NuevaCarrera, ApiError> {
    let categoria = requerido(&input.categoria);
    let campos = (
        requerido(&input.subcategoria),
        requerido(&input.resolucion),
        positivo(input.cohorte),
        positivo(input.duracion),
        positivo(input.carga_horaria),
    );
    let (Some(subcategoria), Some(resolucion), Some(cohorte), Some(duracion), Some(carga_horaria)) = campos else {
        return Err(ApiError::validacion(MSG_CAMPOS_OBLIGATORIOS));
    };
    if exigir_categoria && categoria.is_none() {
        return Err(ApiError::validacion(MSG_CAMPOS_OBLIGATORIOS));
    }
    Ok(NuevaCarrera {
        categoria: categoria.unwrap_or_default().to_string(),
        subcategoria: capitalizar_palabras(subcategoria, CONECTORES_EXTENDIDOS),
        resolucion: resolucion.to_string(),
        cohorte,
        duracion,
        carga_horaria,
    })
}

/// GET /carreras?busqueda=
pub async fn carreras_list_handler(
    estado: web::Data<AppState>,
    _identidad: Identidad,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, ApiError> {
    let busqueda = param(&query, "busqueda").unwrap_or("").to_string();
    let carreras = estado.db.run(move |c| carreras::buscar(c, &busqueda)).await?;
    Ok(HttpResponse::Ok().json(carreras))
}

/// GET /carreras/opciones
pub async fn carreras_opciones_handler(estado: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let opciones = estado.db.run(|c| carreras::opciones(c)).await?;
    Ok(HttpResponse::Ok().json(opciones))
}

/// POST /carreras
pub async fn carreras_create_handler(
    estado: web::Data<AppState>,
    _identidad: Identidad,
    body: web::Json<CarreraInput>,
) -> Result<HttpResponse, ApiError> {
    let nueva = nueva_carrera(&body, true)?;
    let id = estado.db.run(move |c| carreras::insertar(c, &nueva)).await?;
    tracing::info!(carrera_id = id, "carrera creada");
    Ok(creado_mensaje("Carrera guardada correctamente"))
}

/// PUT /carreras/{id}
pub async fn carreras_update_handler(
    estado: web::Data<AppState>,
    _identidad: Identidad,
    path: web::Path<i64>,
    body: web::Json<CarreraInput>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let cambios = nueva_carrera(&body, false)?;
    let existia = estado.db.run(move |c| carreras::actualizar(c, id, &cambios)).await?;
    if !existia {
        return Err(ApiError::no_encontrado(MSG_CARRERA_NO_ENCONTRADA));
    }
    Ok(ok_mensaje("Carrera actualizada correctamente"))
}

/// DELETE /carreras/{id}
pub async fn carreras_delete_handler(
    estado: web::Data<AppState>,
    _identidad: Identidad,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let borradas = estado.db.run(move |c| carreras::eliminar(c, id)).await?;
    if borradas == 0 {
        return Err(ApiError::no_encontrado(MSG_CARRERA_NO_ENCONTRADA));
    }
    Ok(ok_mensaje("Carrera eliminada correctamente"))
}
