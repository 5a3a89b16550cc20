use crate::error::ApiError;
use crate::server::AppState;
use actix_web::http::Method;
use actix_web::{web, HttpRequest, HttpResponse};
use std::path::{Component, Path, PathBuf};

const MSG_RECURSO_NO_ENCONTRADO: &str = "Recurso no encontrado";

fn tipo_contenido(ruta: &Path) -> &'static str {
    let ext = ruta.extension().and_then(|e| e.to_str()).map(str::to_lowercase).unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "json" | "map" => "application/json",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "txt" => "text/plain; charset=utf-8",
        "xlsx" => crate::excel::analitico::CONTENT_TYPE_XLSX,
        _ => "application/octet-stream",
    }
}

/// Ruta relativa segura dentro de `public_dir`; `None` si intenta salir o
/// no es UTF-8 válido. `ruta_url` llega tal cual de la URL (con `%XX`).
pub fn ruta_publica(public_dir: &Path, ruta_url: &str) -> Option<PathBuf> {
    let decodificada = urlencoding::decode(ruta_url).ok()?;
    let relativa = Path::new(decodificada.trim_start_matches('/'));
    let mut out = public_dir.to_path_buf();
    for comp in relativa.components() {
        match comp {
            Component::Normal(parte) => out.push(parte),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(out)
}

async fn leer(ruta: &Path) -> Option<HttpResponse> {
    let bytes = tokio::fs::read(ruta).await.ok()?;
    Some(HttpResponse::Ok().content_type(tipo_contenido(ruta)).body(bytes))
}

/// Servicio por defecto: archivos de `public_dir` y, para el resto de los
/// GET, el `index.html` de la SPA.
pub async fn estaticos_handler(req: HttpRequest, estado: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    if req.method() != Method::GET && req.method() != Method::HEAD {
        return Err(ApiError::no_encontrado(MSG_RECURSO_NO_ENCONTRADO));
    }
    let public_dir = &estado.config.public_dir;

    if let Some(ruta) = ruta_publica(public_dir, req.path()) {
        if ruta.is_file() {
            if let Some(resp) = leer(&ruta).await {
                return Ok(resp);
            }
        }
    }

    match leer(&public_dir.join("index.html")).await {
        Some(resp) => Ok(resp),
        None => Err(ApiError::no_encontrado(MSG_RECURSO_NO_ENCONTRADO)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_sale_del_directorio_publico() {
        let base = Path::new("/srv/public");
        assert_eq!(ruta_publica(base, "/assets/app.js"), Some(PathBuf::from("/srv/public/assets/app.js")));
        assert_eq!(ruta_publica(base, "/"), Some(PathBuf::from("/srv/public")));
        assert_eq!(ruta_publica(base, "/../etc/passwd"), None);
        assert_eq!(ruta_publica(base, "/a/../../b"), None);
    }

    #[test]
    fn decodifica_la_ruta_antes_de_resolverla() {
        let base = Path::new("/srv/public");
        assert_eq!(
            ruta_publica(base, "/docs/Plan%20de%20estudios.pdf"),
            Some(PathBuf::from("/srv/public/docs/Plan de estudios.pdf"))
        );
        assert_eq!(ruta_publica(base, "/img/escudo%C3%B1.png"), Some(PathBuf::from("/srv/public/img/escudoñ.png")));
        assert_eq!(ruta_publica(base, "/%2e%2e/etc/passwd"), None);
        assert_eq!(ruta_publica(base, "/a%2F..%2F..%2Fb"), None);
        assert_eq!(ruta_publica(base, "/%FF"), None);
    }

    #[test]
    fn tipos_conocidos() {
        assert_eq!(tipo_contenido(Path::new("index.HTML")), "text/html; charset=utf-8");
        assert_eq!(tipo_contenido(Path::new("x.bin")), "application/octet-stream");
    }
}
