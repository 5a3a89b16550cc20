//! Acceso a la base SQLite.
//!
//! `Database` es el único dueño de la conexión: se abre en el arranque, se
//! comparte por `web::Data` y se cierra al apagar el servidor. Las consultas
//! corren en el pool bloqueante de tokio para no frenar a los workers de
//! actix. Cada submódulo agrupa las sentencias de una tabla.

pub mod calificaciones;
pub mod carreras;
pub mod estudiantes;
pub mod materias;
pub mod usuarios;

use crate::error::ApiError;
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Database(..)")
    }
}

impl Database {
    /// Abre (o crea) la base en `path`, creando el directorio si hace falta.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Database, ApiError> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| ApiError::Interno(format!("no se pudo crear {}: {}", dir.display(), e)))?;
            }
        }
        let conn = Connection::open(path)?;
        Ok(Database::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Database, ApiError> {
        Ok(Database::from_connection(Connection::open_in_memory()?))
    }

    fn from_connection(conn: Connection) -> Database {
        Database { conn: Arc::new(Mutex::new(Some(conn))) }
    }

    /// Crea tablas e índices si no existen.
    pub fn init_schema(&self) -> Result<(), ApiError> {
        self.with_conn(crear_esquema)
    }

    /// Ejecuta `f` con la conexión en el hilo actual. Para uso en el arranque
    /// y en tests; los handlers usan `run`.
    pub fn with_conn<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut Connection) -> Result<T, ApiError>,
    {
        let mut guard = self.conn.lock().map_err(|_| ApiError::Interno("mutex de la base envenenado".into()))?;
        match guard.as_mut() {
            Some(conn) => f(conn),
            None => Err(ApiError::Interno("la conexión a la base está cerrada".into())),
        }
    }

    /// Ejecuta `f` en el pool bloqueante y espera el resultado.
    pub async fn run<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, ApiError> + Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.with_conn(f)).await?
    }

    /// Cierra la conexión. Las llamadas posteriores fallan con `Interno`.
    pub fn close(&self) -> Result<(), ApiError> {
        let mut guard = self.conn.lock().map_err(|_| ApiError::Interno("mutex de la base envenenado".into()))?;
        if let Some(conn) = guard.take() {
            conn.close().map_err(|(_, e)| ApiError::from(e))?;
            tracing::info!("conexión a la base cerrada");
        }
        Ok(())
    }
}

fn crear_esquema(conn: &mut Connection) -> Result<(), ApiError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            rol_id INTEGER
        );

        CREATE TABLE IF NOT EXISTS carreras (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            categoria TEXT NOT NULL,
            subcategoria TEXT NOT NULL,
            resolucion TEXT NOT NULL,
            cohorte INTEGER NOT NULL,
            duracion INTEGER NOT NULL,
            carga_horaria INTEGER NOT NULL,
            UNIQUE (resolucion, cohorte)
        );

        CREATE TABLE IF NOT EXISTS materias (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            carrera TEXT NOT NULL,
            nombre_materia TEXT NOT NULL,
            anio TEXT
        );

        CREATE TABLE IF NOT EXISTS estudiantes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            carrera TEXT NOT NULL,
            apellido_y_nombre TEXT NOT NULL,
            dni TEXT NOT NULL UNIQUE,
            fecha_de_nacimiento TEXT NOT NULL,
            telefono TEXT,
            email TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS dni_duplicados (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            dni TEXT NOT NULL,
            apellido_y_nombre TEXT NOT NULL,
            carrera TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS calificaciones (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            dni TEXT NOT NULL,
            ap_nombre TEXT NOT NULL,
            carrera TEXT NOT NULL,
            resolucion TEXT,
            materia TEXT NOT NULL,
            curso TEXT NOT NULL,
            l_f TEXT,
            fecha_aprobacion TEXT,
            numeros TEXT,
            letras TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_materias_carrera ON materias(carrera);
        CREATE INDEX IF NOT EXISTS idx_dni_duplicados_dni ON dni_duplicados(dni);
        CREATE INDEX IF NOT EXISTS idx_calificaciones_analitico ON calificaciones(dni, resolucion, carrera);",
    )?;

    // Bases heredadas pueden tener más de una fila por (dni, materia). El
    // upsert necesita el índice único, así que se informa en vez de borrar.
    let duplicados: i64 = conn.query_row(
        "SELECT COUNT(*) FROM (SELECT 1 FROM calificaciones GROUP BY dni, materia HAVING COUNT(*) > 1)",
        [],
        |r| r.get(0),
    )?;
    if duplicados > 0 {
        return Err(ApiError::Interno(format!(
            "calificaciones tiene {} pares (dni, materia) repetidos; depúrelos antes de iniciar",
            duplicados
        )));
    }
    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS ux_calificaciones_dni_materia ON calificaciones(dni, materia)",
        [],
    )?;
    Ok(())
}

/// Búsqueda por subcadena sin distinguir mayúsculas. `LIKE` de SQLite sólo
/// pliega ASCII ("INFORMÁTICA" no encuentra "Informática"), así que las
/// búsquedas traen las filas y filtran con esto.
pub(crate) struct Busqueda {
    minusculas: String,
}

impl Busqueda {
    pub(crate) fn new(texto: &str) -> Busqueda {
        Busqueda { minusculas: texto.trim().to_lowercase() }
    }

    /// `true` si algún campo contiene el texto buscado. Búsqueda vacía
    /// coincide con todo.
    pub(crate) fn coincide(&self, campos: &[&str]) -> bool {
        self.minusculas.is_empty() || campos.iter().any(|c| c.to_lowercase().contains(&self.minusculas))
    }
}
