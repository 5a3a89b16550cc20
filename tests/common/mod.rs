#![allow(dead_code)]

use actix_web::http::header;
use actix_web::web;
use registros::db::{usuarios, Database};
use registros::{auth, AppState, Config};
use std::path::Path;

pub const SECRETO: &str = "secreto-de-prueba";

/// Arma la app de prueba con la tabla de rutas real y el servicio de
/// estáticos.
macro_rules! app_de_prueba {
    ($estado:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($estado.clone())
                .configure(registros::rutas)
                .default_service(actix_web::web::to(registros::server_handlers::estaticos_handler)),
        )
        .await
    };
}

pub fn config(public_dir: &Path) -> Config {
    let dir = public_dir.to_string_lossy().to_string();
    Config::from_lookup(move |k| match k {
        "JWT_SECRET" => Some(SECRETO.to_string()),
        "BCRYPT_COST" => Some(auth::BCRYPT_COSTO_MINIMO.to_string()),
        "PUBLIC_DIR" => Some(dir.clone()),
        _ => None,
    })
    .expect("Debe construir la config de prueba")
}

/// Estado con base en memoria y esquema creado.
pub fn estado(public_dir: &Path) -> web::Data<AppState> {
    let db = Database::open_in_memory().expect("Debe abrir la base en memoria");
    db.init_schema().expect("Debe crear el esquema");
    web::Data::new(AppState::new(db, config(public_dir)))
}

pub fn estado_sin_publico() -> web::Data<AppState> {
    estado(Path::new("publico-inexistente"))
}

/// Crea un usuario directo en la base y devuelve un token válido.
pub fn token_para(estado: &AppState, email: &str) -> String {
    let hash = auth::hash_password("clave", auth::BCRYPT_COSTO_MINIMO).expect("Debe hashear");
    let email_db = email.to_string();
    let id = estado
        .db
        .with_conn(move |c| usuarios::insertar(c, "Tester", &email_db, &hash))
        .expect("Debe insertar el usuario");
    auth::emitir_token(id, email, &estado.config).expect("Debe emitir el token")
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}
