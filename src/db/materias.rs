use crate::db::Busqueda;
use crate::error::ApiError;
use crate::models::Materia;
use rusqlite::{params, Connection, Row};

fn fila_materia(row: &Row<'_>) -> rusqlite::Result<Materia> {
    Ok(Materia {
        id: row.get(0)?,
        nombre_materia: row.get(1)?,
        carrera: row.get(2)?,
        anio: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
    })
}

fn recolectar(stmt: &mut rusqlite::Statement<'_>, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Materia>, ApiError> {
    let rows = stmt.query_map(params, fila_materia)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Búsqueda por subcadena en nombre, carrera o año.
pub fn buscar(conn: &Connection, busqueda: &str) -> Result<Vec<Materia>, ApiError> {
    let filtro = Busqueda::new(busqueda);
    let mut stmt = conn.prepare(
        "SELECT id, nombre_materia, carrera, anio
         FROM materias
         ORDER BY nombre_materia ASC, carrera ASC, anio ASC",
    )?;
    let mut materias = recolectar(&mut stmt, &[])?;
    materias.retain(|m| filtro.coincide(&[m.nombre_materia.as_str(), m.carrera.as_str(), m.anio.as_str()]));
    Ok(materias)
}

/// Materias de una carrera (comparación sin mayúsculas ni espacios de
/// borde), opcionalmente de un solo año. `LOWER` de SQLite sólo pliega
/// ASCII, así que la comparación del nombre se hace acá.
pub fn por_carrera(conn: &Connection, carrera: &str, anio: Option<&str>) -> Result<Vec<Materia>, ApiError> {
    let carrera = carrera.trim().to_lowercase();
    let mut materias = match anio {
        Some(anio) => {
            let mut stmt = conn.prepare(
                "SELECT id, nombre_materia, carrera, anio FROM materias WHERE anio = ?1 ORDER BY nombre_materia",
            )?;
            recolectar(&mut stmt, &[&anio.trim()])?
        }
        None => {
            let mut stmt = conn.prepare("SELECT id, nombre_materia, carrera, anio FROM materias ORDER BY anio, nombre_materia")?;
            recolectar(&mut stmt, &[])?
        }
    };
    materias.retain(|m| m.carrera.trim().to_lowercase() == carrera);
    Ok(materias)
}

pub fn insertar(conn: &Connection, carrera: &str, nombre_materia: &str, anio: &str) -> Result<i64, ApiError> {
    conn.execute(
        "INSERT INTO materias (carrera, nombre_materia, anio) VALUES (?1, ?2, ?3)",
        params![carrera, nombre_materia, anio],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Devuelve la cantidad de filas modificadas.
pub fn actualizar(conn: &Connection, id: i64, carrera: &str, nombre_materia: &str, anio: Option<&str>) -> Result<usize, ApiError> {
    Ok(conn.execute(
        "UPDATE materias SET carrera = ?1, nombre_materia = ?2, anio = ?3 WHERE id = ?4",
        params![carrera, nombre_materia, anio, id],
    )?)
}

pub fn eliminar(conn: &Connection, id: i64) -> Result<usize, ApiError> {
    Ok(conn.execute("DELETE FROM materias WHERE id = ?1", params![id])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[test]
    fn filtra_por_carrera_y_anio() {
        let db = Database::open_in_memory().unwrap();
        db.init_schema().unwrap();
        db.with_conn(|c| {
            insertar(c, "Tec. en Informática", "Algebra", "1")?;
            insertar(c, "Tec. en Informática", "Programación II", "2")?;
            insertar(c, "Prof. de Historia", "Historia Antigua", "1")?;

            let primero = por_carrera(c, "  TEC. EN INFORMÁTICA ", Some("1"))?;
            assert_eq!(primero.len(), 1);
            assert_eq!(primero[0].nombre_materia, "Algebra");

            let todas = por_carrera(c, "tec. en informática", None)?;
            assert_eq!(todas.len(), 2);

            let busqueda = buscar(c, "historia")?;
            assert_eq!(busqueda.len(), 1);
            assert_eq!(buscar(c, "PROGRAMACIÓN")?.len(), 1);
            assert_eq!(buscar(c, "tec. en INFORMÁTICA")?.len(), 2);
            assert_eq!(buscar(c, "")?.first().map(|m| m.nombre_materia.as_str()), Some("Algebra"));
            Ok(())
        })
        .unwrap();
    }
}
