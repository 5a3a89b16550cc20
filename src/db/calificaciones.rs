use crate::error::{mapear_unicidad, ApiError};
use crate::models::{Calificacion, RegistroAnalitico};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

pub const MSG_MATERIA_CARGADA: &str = "La materia ya se encuentra cargada";

/// Calificación validada, lista para escribir.
#[derive(Debug, Clone, Default)]
pub struct NuevaCalificacion {
    pub dni: String,
    pub ap_nombre: String,
    pub carrera: String,
    pub resolucion: Option<String>,
    pub materia: String,
    pub curso: String,
    pub l_f: Option<String>,
    pub fecha_aprobacion: Option<String>,
    pub numeros: Option<String>,
    pub letras: Option<String>,
}

fn fila_calificacion(row: &Row<'_>) -> rusqlite::Result<Calificacion> {
    Ok(Calificacion {
        id: row.get(0)?,
        dni: row.get(1)?,
        ap_nombre: row.get(2)?,
        carrera: row.get(3)?,
        resolucion: row.get(4)?,
        materia: row.get(5)?,
        curso: row.get(6)?,
        l_f: row.get(7)?,
        fecha_aprobacion: row.get(8)?,
        numeros: row.get(9)?,
        letras: row.get(10)?,
    })
}

pub fn por_dni_y_materia(conn: &Connection, dni: &str, materia: &str) -> Result<Vec<Calificacion>, ApiError> {
    let mut stmt = conn.prepare(
        "SELECT id, dni, ap_nombre, carrera, resolucion, materia, curso, l_f, fecha_aprobacion, numeros, letras
         FROM calificaciones WHERE dni = ?1 AND materia = ?2 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![dni, materia], fila_calificacion)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn insertar(conn: &Connection, c: &NuevaCalificacion) -> Result<i64, ApiError> {
    conn.execute(
        "INSERT INTO calificaciones
         (dni, ap_nombre, carrera, resolucion, materia, curso, l_f, fecha_aprobacion, numeros, letras)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![c.dni, c.ap_nombre, c.carrera, c.resolucion, c.materia, c.curso, c.l_f, c.fecha_aprobacion, c.numeros, c.letras],
    )
    .map_err(|e| mapear_unicidad(e, MSG_MATERIA_CARGADA))?;
    Ok(conn.last_insert_rowid())
}

pub fn actualizar(conn: &Connection, id: i64, c: &NuevaCalificacion) -> Result<usize, ApiError> {
    conn.execute(
        "UPDATE calificaciones
         SET dni = ?1, ap_nombre = ?2, carrera = ?3, resolucion = ?4, materia = ?5, curso = ?6,
             l_f = ?7, fecha_aprobacion = ?8, numeros = ?9, letras = ?10
         WHERE id = ?11",
        params![c.dni, c.ap_nombre, c.carrera, c.resolucion, c.materia, c.curso, c.l_f, c.fecha_aprobacion, c.numeros, c.letras, id],
    )
    .map_err(|e| mapear_unicidad(e, MSG_MATERIA_CARGADA))
}

/// Inserta o reemplaza la calificación de (dni, materia) en una sola
/// escritura condicional. Devuelve `(id, creada)`.
pub fn guardar(conn: &mut Connection, c: &NuevaCalificacion) -> Result<(i64, bool), ApiError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let existente: Option<i64> = tx
        .query_row(
            "SELECT id FROM calificaciones WHERE dni = ?1 AND materia = ?2",
            params![c.dni, c.materia],
            |r| r.get(0),
        )
        .optional()?;
    let id: i64 = tx.query_row(
        "INSERT INTO calificaciones
         (dni, ap_nombre, carrera, resolucion, materia, curso, l_f, fecha_aprobacion, numeros, letras)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
         ON CONFLICT(dni, materia) DO UPDATE SET
             ap_nombre = excluded.ap_nombre,
             carrera = excluded.carrera,
             resolucion = excluded.resolucion,
             curso = excluded.curso,
             l_f = excluded.l_f,
             fecha_aprobacion = excluded.fecha_aprobacion,
             numeros = excluded.numeros,
             letras = excluded.letras
         RETURNING id",
        params![c.dni, c.ap_nombre, c.carrera, c.resolucion, c.materia, c.curso, c.l_f, c.fecha_aprobacion, c.numeros, c.letras],
        |r| r.get(0),
    )?;
    tx.commit()?;
    Ok((id, existente.is_none()))
}

pub fn eliminar(conn: &Connection, id: i64) -> Result<usize, ApiError> {
    Ok(conn.execute("DELETE FROM calificaciones WHERE id = ?1", params![id])?)
}

/// Calificaciones de un estudiante en una carrera/resolución, para el analítico.
pub fn para_analitico(conn: &Connection, dni: &str, resolucion: &str, carrera: &str) -> Result<Vec<RegistroAnalitico>, ApiError> {
    let mut stmt = conn.prepare(
        "SELECT materia, l_f, fecha_aprobacion, numeros, letras
         FROM calificaciones
         WHERE dni = ?1 AND resolucion = ?2 AND carrera = ?3
         ORDER BY id",
    )?;
    let rows = stmt.query_map(params![dni, resolucion, carrera], |row| {
        Ok(RegistroAnalitico {
            materia: row.get(0)?,
            l_f: row.get(1)?,
            fecha_aprobacion: row.get(2)?,
            numeros: row.get(3)?,
            letras: row.get(4)?,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn nota(materia: &str, numeros: &str) -> NuevaCalificacion {
        NuevaCalificacion {
            dni: "12345678".into(),
            ap_nombre: "Pérez Juan".into(),
            carrera: "Tec. en Informática".into(),
            resolucion: Some("123/20".into()),
            materia: materia.into(),
            curso: "1".into(),
            l_f: Some("12/3".into()),
            fecha_aprobacion: Some("2024-12-01".into()),
            numeros: Some(numeros.into()),
            letras: None,
        }
    }

    #[test]
    fn guardar_inserta_y_luego_actualiza_la_misma_fila() {
        let db = Database::open_in_memory().unwrap();
        db.init_schema().unwrap();
        db.with_conn(|c| {
            let (id, creada) = guardar(c, &nota("Algebra", "7"))?;
            assert!(creada);
            let (id2, creada2) = guardar(c, &nota("Algebra", "9"))?;
            assert!(!creada2);
            assert_eq!(id, id2);
            let filas = por_dni_y_materia(c, "12345678", "Algebra")?;
            assert_eq!(filas.len(), 1);
            assert_eq!(filas[0].numeros.as_deref(), Some("9"));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn insertar_repetido_es_duplicado() {
        let db = Database::open_in_memory().unwrap();
        db.init_schema().unwrap();
        db.with_conn(|c| {
            insertar(c, &nota("Algebra", "7"))?;
            let err = insertar(c, &nota("Algebra", "8")).unwrap_err();
            assert!(matches!(err, ApiError::Duplicado(ref m) if m == MSG_MATERIA_CARGADA));
            let otro = insertar(c, &nota("Edi", "8"))?;
            // mover "Edi" sobre "Algebra" choca con la unicidad
            assert!(matches!(actualizar(c, otro, &nota("Algebra", "8")), Err(ApiError::Duplicado(_))));
            assert_eq!(actualizar(c, 4242, &nota("Practica Profesional I", "8"))?, 0);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn para_analitico_filtra_por_resolucion_y_carrera() {
        let db = Database::open_in_memory().unwrap();
        db.init_schema().unwrap();
        db.with_conn(|c| {
            insertar(c, &nota("Algebra", "7"))?;
            let mut otra = nota("Edi", "6");
            otra.resolucion = Some("999/99".into());
            insertar(c, &otra)?;
            let v = para_analitico(c, "12345678", "123/20", "Tec. en Informática")?;
            assert_eq!(v.len(), 1);
            assert_eq!(v[0].materia, "Algebra");
            Ok(())
        })
        .unwrap();
    }
}
