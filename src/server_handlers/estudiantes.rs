use crate::auth::Identidad;
use crate::db::estudiantes::{self, NuevoEstudiante};
use crate::error::ApiError;
use crate::models::{requerido, EstudianteInput};
use crate::server::AppState;
use crate::server_handlers::{creado_mensaje, ok_mensaje, param};
use crate::texto::{capitalizar_palabras, solo_digitos, SIN_CONECTORES};
use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use regex::Regex;
use serde_json::json;
use std::collections::HashMap;
use std::sync::OnceLock;

const MSG_ALTA_INCOMPLETA: &str = "Todos los campos obligatorios deben completarse.";
const MSG_EDICION_INCOMPLETA: &str = "Todos los campos son obligatorios.";
const MSG_DNI_INVALIDO: &str = "El DNI debe tener 8 dígitos";
const MSG_FECHA_INVALIDA: &str = "La fecha de nacimiento debe tener formato AAAA-MM-DD";
const MSG_EMAIL_INVALIDO: &str = "El email no es válido";
const MSG_NO_ENCONTRADO: &str = "No se encontró el registro";
const MSG_DNI_SIN_REGISTROS: &str = "Estudiante no encontrado en ninguna tabla";

pub fn es_dni_valido(dni: &str) -> bool {
    dni.len() == 8 && solo_digitos(dni)
}

/// Misma regla que el formulario: dominio de nivel superior de 3 letras o más.
pub fn es_email_valido(email: &str) -> bool {
    static PATRON: OnceLock<Regex> = OnceLock::new();
    PATRON
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{3,}$").expect("patrón de email válido"))
        .is_match(email)
}

/// Chequeos de formato comunes a alta y edición.
fn validar_formato(dni: &str, fecha: &str, email: &str) -> Result<(), ApiError> {
    if !es_dni_valido(dni) {
        return Err(ApiError::validacion(MSG_DNI_INVALIDO));
    }
    if NaiveDate::parse_from_str(fecha, "%Y-%m-%d").is_err() {
        return Err(ApiError::validacion(MSG_FECHA_INVALIDA));
    }
    if !es_email_valido(email) {
        return Err(ApiError::validacion(MSG_EMAIL_INVALIDO));
    }
    Ok(())
}

/// GET /estudiantes?busqueda=
pub async fn estudiantes_list_handler(
    estado: web::Data<AppState>,
    _identidad: Identidad,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, ApiError> {
    let busqueda = param(&query, "busqueda").unwrap_or("").to_string();
    let lista = estado.db.run(move |c| estudiantes::buscar(c, &busqueda)).await?;
    Ok(HttpResponse::Ok().json(lista))
}

/// POST /estudiantes
pub async fn estudiantes_create_handler(
    estado: web::Data<AppState>,
    _identidad: Identidad,
    body: web::Json<EstudianteInput>,
) -> Result<HttpResponse, ApiError> {
    let campos = (
        requerido(&body.carrera),
        requerido(&body.apellido_y_nombre),
        requerido(&body.dni),
        requerido(&body.fecha_de_nacimiento),
        requerido(&body.email),
    );
    let (Some(carrera), Some(nombre), Some(dni), Some(fecha), Some(email)) = campos else {
        return Err(ApiError::validacion(MSG_ALTA_INCOMPLETA));
    };
    validar_formato(dni, fecha, email)?;

    let nuevo = NuevoEstudiante {
        carrera: carrera.to_string(),
        apellido_y_nombre: capitalizar_palabras(nombre, SIN_CONECTORES),
        dni: dni.to_string(),
        fecha_de_nacimiento: fecha.to_string(),
        telefono: requerido(&body.telefono).map(str::to_string),
        email: email.to_string(),
    };
    let id = estado.db.run(move |c| estudiantes::insertar(c, &nuevo)).await?;
    tracing::info!(estudiante_id = id, "estudiante creado");
    Ok(creado_mensaje("Estudiante guardado exitosamente."))
}

/// PUT /estudiantes/{id}. La carrera no se cambia desde acá.
pub async fn estudiantes_update_handler(
    estado: web::Data<AppState>,
    _identidad: Identidad,
    path: web::Path<i64>,
    body: web::Json<EstudianteInput>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let campos = (
        requerido(&body.apellido_y_nombre),
        requerido(&body.dni),
        requerido(&body.fecha_de_nacimiento),
        requerido(&body.telefono),
        requerido(&body.email),
    );
    let (Some(nombre), Some(dni), Some(fecha), Some(telefono), Some(email)) = campos else {
        return Err(ApiError::validacion(MSG_EDICION_INCOMPLETA));
    };
    validar_formato(dni, fecha, email)?;

    let cambios = NuevoEstudiante {
        carrera: String::new(),
        apellido_y_nombre: capitalizar_palabras(nombre, SIN_CONECTORES),
        dni: dni.to_string(),
        fecha_de_nacimiento: fecha.to_string(),
        telefono: Some(telefono.to_string()),
        email: email.to_string(),
    };
    let filas = estado.db.run(move |c| estudiantes::actualizar(c, id, &cambios)).await?;
    if filas == 0 {
        return Err(ApiError::no_encontrado(MSG_NO_ENCONTRADO));
    }
    Ok(ok_mensaje("Estudiante actualizado correctamente."))
}

/// DELETE /estudiantes/{id}
pub async fn estudiantes_delete_handler(
    estado: web::Data<AppState>,
    _identidad: Identidad,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let borradas = estado.db.run(move |c| estudiantes::eliminar(c, id)).await?;
    if borradas == 0 {
        return Err(ApiError::no_encontrado("No se encontró el registro a eliminar."));
    }
    Ok(ok_mensaje("Estudiante eliminado correctamente."))
}

/// GET /estudiantes/validar-dni?dni=&id=
///
/// Público, lo usa el formulario de edición mientras se tipea.
pub async fn validar_dni_handler(
    estado: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, ApiError> {
    let dni = query.get("dni").map(String::as_str).unwrap_or("");
    if dni.chars().count() != 8 {
        return Ok(HttpResponse::BadRequest().json(json!({ "duplicado": false })));
    }
    // id ausente o no numérico se toma como 0
    let excluir_id = query.get("id").and_then(|s| s.trim().parse::<i64>().ok()).unwrap_or(0);
    let dni = dni.to_string();
    let duplicado = estado.db.run(move |c| estudiantes::dni_en_uso(c, &dni, excluir_id)).await?;
    Ok(HttpResponse::Ok().json(json!({ "duplicado": duplicado })))
}

/// GET /estudiantes/{dni}
pub async fn estudiante_por_dni_handler(
    estado: web::Data<AppState>,
    _identidad: Identidad,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let dni = path.into_inner();
    let registros = estado.db.run(move |c| estudiantes::por_dni(c, dni.trim())).await?;
    if registros.is_empty() {
        return Err(ApiError::no_encontrado(MSG_DNI_SIN_REGISTROS));
    }
    Ok(HttpResponse::Ok().json(registros))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formato_de_dni_fecha_y_email() {
        assert!(validar_formato("12345678", "2000-05-10", "juan@correo.com").is_ok());
        assert!(validar_formato("1234567", "2000-05-10", "juan@correo.com").is_err());
        assert!(validar_formato("1234567a", "2000-05-10", "juan@correo.com").is_err());
        assert!(validar_formato("12345678", "10/05/2000", "juan@correo.com").is_err());
        assert!(validar_formato("12345678", "2000-02-30", "juan@correo.com").is_err());
        assert!(!es_email_valido("juan@correo.ar"));
        assert!(!es_email_valido("juan correo.com"));
        assert!(es_email_valido("j.p+x@mail.correo.com"));
    }
}
