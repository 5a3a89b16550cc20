use crate::db::calificaciones;
use crate::error::ApiError;
use crate::excel::{self, analitico::CONTENT_TYPE_XLSX, DatosAnalitico};
use crate::server::AppState;
use crate::server_handlers::param;
use crate::texto::a_ascii;
use actix_web::http::header::{Charset, ContentDisposition, DispositionParam, DispositionType, ExtendedValue};
use actix_web::{web, HttpResponse};
use chrono::Datelike;
use serde_json::json;
use std::collections::HashMap;

pub const MSG_PARAMETROS_ANALITICO: &str = "Se requieren los parámetros 'dni', 'apNombre', 'resolucion' y 'carrera'.";
const MSG_ERROR_ANALITICO: &str = "Error al generar el analítico parcial";

fn texto_plano(resp: &mut actix_web::HttpResponseBuilder, msg: &str) -> HttpResponse {
    resp.content_type("text/plain; charset=utf-8").body(msg.to_string())
}

fn adjunto(nombre: &str) -> ContentDisposition {
    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![
            DispositionParam::Filename(a_ascii(nombre)),
            DispositionParam::FilenameExt(ExtendedValue {
                charset: Charset::Ext("UTF-8".to_string()),
                language_tag: None,
                value: nombre.as_bytes().to_vec(),
            }),
        ],
    }
}

/// GET /generar-analitico?dni=&apNombre=&archivo=&resolucion=&carrera=
///
/// Llena la plantilla con las notas del estudiante y la devuelve como adjunto.
/// La generación corre en el pool bloqueante, limitada por el semáforo del
/// estado.
pub async fn generar_analitico_handler(
    estado: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, ApiError> {
    let campos = (param(&query, "dni"), param(&query, "apNombre"), param(&query, "resolucion"), param(&query, "carrera"));
    let (Some(dni), Some(ap_nombre), Some(resolucion), Some(carrera)) = campos else {
        return Ok(texto_plano(&mut HttpResponse::BadRequest(), MSG_PARAMETROS_ANALITICO));
    };
    let datos = DatosAnalitico {
        dni: dni.to_string(),
        ap_nombre: ap_nombre.to_string(),
        carrera: carrera.to_string(),
        resolucion: resolucion.to_string(),
    };

    let plantilla = excel::resolver_plantilla(&estado.config.public_dir, param(&query, "archivo"), &datos.carrera)?;

    let registros = {
        let (dni, resolucion, carrera) = (datos.dni.clone(), datos.resolucion.clone(), datos.carrera.clone());
        estado
            .db
            .run(move |c| calificaciones::para_analitico(c, &dni, &resolucion, &carrera))
            .await?
    };

    let permit = estado
        .limite_analiticos
        .clone()
        .acquire_owned()
        .await
        .map_err(|e| ApiError::Interno(format!("semáforo de analíticos cerrado: {}", e)))?;

    let hoy = chrono::Local::now().date_naive();
    let nombre = excel::nombre_archivo(&datos, hoy.year());
    let inicio = std::time::Instant::now();

    let resultado = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        excel::generar_analitico(&plantilla, &datos, &registros, hoy)
    })
    .await?;

    match resultado {
        Ok(bytes) => {
            tracing::info!(archivo = %nombre, bytes = bytes.len(), ms = inicio.elapsed().as_millis() as u64, "analítico enviado");
            Ok(HttpResponse::Ok().content_type(CONTENT_TYPE_XLSX).insert_header(adjunto(&nombre)).body(bytes))
        }
        Err(e) => {
            tracing::error!(error = %e, "no se pudo generar el analítico");
            Ok(texto_plano(&mut HttpResponse::InternalServerError(), MSG_ERROR_ANALITICO))
        }
    }
}

/// GET /plantillas
pub async fn plantillas_handler(estado: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let dir = estado.config.public_dir.clone();
    let plantillas = tokio::task::spawn_blocking(move || excel::listar_plantillas(&dir)).await??;
    Ok(HttpResponse::Ok().json(json!({ "plantillas": plantillas })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_disposition_con_nombre_ascii_y_utf8() {
        let valor = adjunto("Analitico Parcial_Pérez_2025_Tec._en_Informática.xlsx").to_string();
        assert!(valor.starts_with("attachment"));
        assert!(valor.contains("filename=\"Analitico Parcial_Perez_2025_Tec._en_Informatica.xlsx\""));
        assert!(valor.contains("filename*=UTF-8''"));
    }
}
