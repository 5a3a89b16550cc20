use crate::db::Busqueda;
use crate::error::{mapear_unicidad, ApiError};
use crate::models::{Carrera, CarreraOpcion};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

pub const MSG_CARRERA_CARGADA: &str = "La carrera ya está cargada";

/// Campos editables de una carrera ya validados.
#[derive(Debug, Clone)]
pub struct NuevaCarrera {
    pub categoria: String,
    pub subcategoria: String,
    pub resolucion: String,
    pub cohorte: i64,
    pub duracion: i64,
    pub carga_horaria: i64,
}

fn fila_carrera(row: &Row<'_>) -> rusqlite::Result<Carrera> {
    Ok(Carrera {
        id: row.get(0)?,
        categoria: row.get(1)?,
        subcategoria: row.get(2)?,
        resolucion: row.get(3)?,
        cohorte: row.get(4)?,
        duracion: row.get(5)?,
        carga_horaria: row.get(6)?,
    })
}

/// Búsqueda por subcadena en subcategoría o resolución.
pub fn buscar(conn: &Connection, busqueda: &str) -> Result<Vec<Carrera>, ApiError> {
    let filtro = Busqueda::new(busqueda);
    let mut stmt = conn.prepare(
        "SELECT id, categoria, subcategoria, resolucion, cohorte, duracion, carga_horaria
         FROM carreras
         ORDER BY subcategoria, cohorte",
    )?;
    let rows = stmt.query_map([], fila_carrera)?;
    let mut out = Vec::new();
    for r in rows {
        let carrera = r?;
        if filtro.coincide(&[carrera.subcategoria.as_str(), carrera.resolucion.as_str()]) {
            out.push(carrera);
        }
    }
    Ok(out)
}

/// Todas las carreras para el desplegable: tecnicaturas primero, por su
/// número; el resto alfabéticamente.
pub fn opciones(conn: &Connection) -> Result<Vec<CarreraOpcion>, ApiError> {
    let mut stmt = conn.prepare("SELECT id, subcategoria FROM carreras")?;
    let rows = stmt.query_map([], |row| Ok(CarreraOpcion { id: row.get(0)?, subcategoria: row.get(1)? }))?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    ordenar_opciones(&mut out);
    Ok(out)
}

pub(crate) fn ordenar_opciones(opciones: &mut [CarreraOpcion]) {
    fn primer_numero(s: &str) -> Option<u64> {
        let digitos: String = s.chars().skip_while(|c| !c.is_ascii_digit()).take_while(|c| c.is_ascii_digit()).collect();
        digitos.parse().ok()
    }
    opciones.sort_by(|a, b| {
        let tec_a = a.subcategoria.contains("Tec.");
        let tec_b = b.subcategoria.contains("Tec.");
        match (tec_a, tec_b) {
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            (true, true) => primer_numero(&a.subcategoria)
                .cmp(&primer_numero(&b.subcategoria))
                .then_with(|| a.subcategoria.to_lowercase().cmp(&b.subcategoria.to_lowercase())),
            (false, false) => a.subcategoria.to_lowercase().cmp(&b.subcategoria.to_lowercase()),
        }
    });
}

/// ¿Existe otra carrera con la misma resolución y cohorte?
pub fn existe_resolucion_cohorte(conn: &Connection, resolucion: &str, cohorte: i64, excluir_id: Option<i64>) -> Result<bool, ApiError> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM carreras WHERE resolucion = ?1 AND cohorte = ?2 AND id != ?3",
        params![resolucion, cohorte, excluir_id.unwrap_or(0)],
        |r| r.get(0),
    )?;
    Ok(n > 0)
}

pub fn insertar(conn: &Connection, c: &NuevaCarrera) -> Result<i64, ApiError> {
    if existe_resolucion_cohorte(conn, &c.resolucion, c.cohorte, None)? {
        return Err(ApiError::duplicado(MSG_CARRERA_CARGADA));
    }
    conn.execute(
        "INSERT INTO carreras (categoria, subcategoria, resolucion, cohorte, duracion, carga_horaria)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![c.categoria, c.subcategoria, c.resolucion, c.cohorte, c.duracion, c.carga_horaria],
    )
    .map_err(|e| mapear_unicidad(e, MSG_CARRERA_CARGADA))?;
    Ok(conn.last_insert_rowid())
}

/// Actualiza la carrera `id`. Si cambia el nombre (subcategoría), las
/// materias y estudiantes que la referenciaban por nombre pasan al nuevo,
/// dentro de la misma transacción. Devuelve `false` si el id no existe.
///
/// La categoría no se edita: `c.categoria` se ignora.
pub fn actualizar(conn: &mut Connection, id: i64, c: &NuevaCarrera) -> Result<bool, ApiError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let anterior: Option<String> = tx
        .query_row("SELECT subcategoria FROM carreras WHERE id = ?1", params![id], |r| r.get(0))
        .optional()?;
    let Some(anterior) = anterior else {
        return Ok(false);
    };

    if existe_resolucion_cohorte(&tx, &c.resolucion, c.cohorte, Some(id))? {
        return Err(ApiError::duplicado(MSG_CARRERA_CARGADA));
    }

    tx.execute(
        "UPDATE carreras SET subcategoria = ?1, resolucion = ?2, cohorte = ?3, duracion = ?4, carga_horaria = ?5
         WHERE id = ?6",
        params![c.subcategoria, c.resolucion, c.cohorte, c.duracion, c.carga_horaria, id],
    )
    .map_err(|e| mapear_unicidad(e, MSG_CARRERA_CARGADA))?;

    if anterior != c.subcategoria {
        let materias = tx.execute("UPDATE materias SET carrera = ?1 WHERE carrera = ?2", params![c.subcategoria, anterior])?;
        let estudiantes = tx.execute("UPDATE estudiantes SET carrera = ?1 WHERE carrera = ?2", params![c.subcategoria, anterior])?;
        tracing::info!(carrera_id = id, %anterior, nuevo = %c.subcategoria, materias, estudiantes, "carrera renombrada");
    }

    tx.commit()?;
    Ok(true)
}

/// Devuelve la cantidad de filas borradas (0 si el id no existe).
pub fn eliminar(conn: &Connection, id: i64) -> Result<usize, ApiError> {
    Ok(conn.execute("DELETE FROM carreras WHERE id = ?1", params![id])?)
}

/// Resolución de la primera carrera con ese nombre.
pub fn resolucion_por_subcategoria(conn: &Connection, subcategoria: &str) -> Result<Option<String>, ApiError> {
    let r = conn
        .query_row(
            "SELECT resolucion FROM carreras WHERE subcategoria = ?1 ORDER BY id LIMIT 1",
            params![subcategoria],
            |r| r.get(0),
        )
        .optional()?;
    Ok(r)
}
