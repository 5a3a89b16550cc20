#[macro_use]
mod common;

use actix_web::http::{header, StatusCode};
use actix_web::test;
use serde_json::Value;
use std::fs;

#[actix_web::test]
async fn test_archivos_publicos_y_fallback_de_spa() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("index.html"), "<html>spa</html>").expect("write");
    fs::create_dir(dir.path().join("assets")).expect("mkdir");
    fs::write(dir.path().join("assets").join("app.js"), "console.log(1)").expect("write");
    let estado = common::estado(dir.path());
    let app = app_de_prueba!(estado);

    let req = test::TestRequest::get().uri("/assets/app.js").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("text/javascript; charset=utf-8")
    );
    assert_eq!(test::read_body(resp).await, "console.log(1)");

    // nombres con espacios y tildes llegan codificados en la URL
    fs::write(dir.path().join("assets").join("Plan de Informática.txt"), "plan").expect("write");
    let req = test::TestRequest::get().uri("/assets/Plan%20de%20Inform%C3%A1tica.txt").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, "plan");

    // rutas del cliente caen en index.html
    for uri in ["/", "/panel/estudiantes", "/assets/no-existe.js"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{}", uri);
        assert_eq!(test::read_body(resp).await, "<html>spa</html>");
    }

    // las rutas de la API no pasan por el fallback
    let req = test::TestRequest::get().uri("/carreras").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post().uri("/panel").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_sin_directorio_publico_da_404_json() {
    let estado = common::estado_sin_publico();
    let app = app_de_prueba!(estado);

    let req = test::TestRequest::get().uri("/cualquier/cosa").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Recurso no encontrado");
}
