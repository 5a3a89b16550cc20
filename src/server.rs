use crate::config::Config;
use crate::db::Database;
use crate::error::ApiError;
use crate::server_handlers::*;
use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Estado compartido por todos los workers.
pub struct AppState {
    pub db: Database,
    pub config: Config,
    /// Generaciones de analítico simultáneas.
    pub limite_analiticos: Arc<Semaphore>,
}

impl AppState {
    pub fn new(db: Database, config: Config) -> AppState {
        let procs = std::cmp::max(1, num_cpus::get());
        AppState { db, config, limite_analiticos: Arc::new(Semaphore::new(procs)) }
    }
}

/// Tabla de rutas. Las rutas fijas (`/carreras/opciones`,
/// `/estudiantes/validar-dni`) van antes que las de parámetro.
pub fn rutas(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| ApiError::validacion(format!("JSON inválido: {}", err)).into()))
        .route("/register", web::post().to(register_handler))
        .route("/login", web::post().to(login_handler))
        .route("/getUserName", web::post().to(user_name_handler))
        .route("/getUserInfo", web::post().to(user_info_handler))
        .route("/carreras/opciones", web::get().to(carreras_opciones_handler))
        .route("/carreras", web::get().to(carreras_list_handler))
        .route("/carreras", web::post().to(carreras_create_handler))
        .route("/carreras/{id}", web::put().to(carreras_update_handler))
        .route("/carreras/{id}", web::delete().to(carreras_delete_handler))
        .route("/materias", web::get().to(materias_list_handler))
        .route("/materias", web::post().to(materias_create_handler))
        .route("/materias/{id}", web::put().to(materias_update_handler))
        .route("/materias/{id}", web::delete().to(materias_delete_handler))
        .route("/estudiantes/validar-dni", web::get().to(validar_dni_handler))
        .route("/estudiantes", web::get().to(estudiantes_list_handler))
        .route("/estudiantes", web::post().to(estudiantes_create_handler))
        .route("/estudiantes/{dni}", web::get().to(estudiante_por_dni_handler))
        .route("/estudiantes/{id}", web::put().to(estudiantes_update_handler))
        .route("/estudiantes/{id}", web::delete().to(estudiantes_delete_handler))
        .route("/calificaciones", web::get().to(calificaciones_list_handler))
        .route("/calificaciones", web::post().to(calificaciones_create_handler))
        .route("/calificaciones", web::put().to(calificaciones_upsert_handler))
        .route("/calificaciones/{id}", web::put().to(calificaciones_update_handler))
        .route("/calificaciones/{id}", web::delete().to(calificaciones_delete_handler))
        .route("/generar-analitico", web::get().to(generar_analitico_handler))
        .route("/plantillas", web::get().to(plantillas_handler));
}

/// Abre la base, sirve hasta recibir la señal de apagado y cierra la base.
pub async fn run_server(config: Config) -> std::io::Result<()> {
    let db = Database::open(&config.db_path).map_err(|e| std::io::Error::other(e.to_string()))?;
    db.init_schema().map_err(|e| std::io::Error::other(e.to_string()))?;
    tracing::info!(db = %config.db_path.display(), public = %config.public_dir.display(), "base de datos lista");

    let bind_addr = config.bind_addr.clone();
    let estado = web::Data::new(AppState::new(db.clone(), config));

    tracing::info!("escuchando en http://{}", bind_addr);
    let resultado = HttpServer::new(move || {
        App::new()
            .app_data(estado.clone())
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .configure(rutas)
            .default_service(web::to(estaticos_handler))
    })
    .bind(&bind_addr)?
    .run()
    .await;

    if let Err(e) = db.close() {
        tracing::warn!(error = %e, "no se pudo cerrar la base");
    }
    resultado
}
