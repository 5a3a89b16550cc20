use crate::db::{carreras, Busqueda};
use crate::error::{mapear_unicidad, ApiError};
use crate::models::{Estudiante, EstudiantePorDni};
use rusqlite::{params, Connection};

pub const MSG_DNI_DUPLICADO: &str = "Error: DNI duplicado en la base de datos";

/// Resolución informada cuando la carrera del estudiante no figura en `carreras`.
pub const RESOLUCION_NO_DISPONIBLE: &str = "No disponible";

#[derive(Debug, Clone)]
pub struct NuevoEstudiante {
    pub carrera: String,
    pub apellido_y_nombre: String,
    pub dni: String,
    pub fecha_de_nacimiento: String,
    pub telefono: Option<String>,
    pub email: String,
}

pub fn buscar(conn: &Connection, busqueda: &str) -> Result<Vec<Estudiante>, ApiError> {
    let filtro = Busqueda::new(busqueda);
    let mut stmt = conn.prepare(
        "SELECT id, apellido_y_nombre, dni, fecha_de_nacimiento, telefono, email, carrera
         FROM estudiantes
         ORDER BY apellido_y_nombre",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Estudiante {
            id: row.get(0)?,
            nombre: row.get(1)?,
            dni: row.get(2)?,
            fecha_nacimiento: row.get(3)?,
            telefono: row.get(4)?,
            email: row.get(5)?,
            carrera: row.get(6)?,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        let estudiante = r?;
        if filtro.coincide(&[estudiante.nombre.as_str(), estudiante.dni.as_str()]) {
            out.push(estudiante);
        }
    }
    Ok(out)
}

pub fn insertar(conn: &Connection, e: &NuevoEstudiante) -> Result<i64, ApiError> {
    conn.execute(
        "INSERT INTO estudiantes (carrera, apellido_y_nombre, dni, fecha_de_nacimiento, telefono, email)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![e.carrera, e.apellido_y_nombre, e.dni, e.fecha_de_nacimiento, e.telefono, e.email],
    )
    .map_err(|err| mapear_unicidad(err, MSG_DNI_DUPLICADO))?;
    Ok(conn.last_insert_rowid())
}

/// Actualiza datos personales; la carrera no se edita acá. Devuelve filas afectadas.
pub fn actualizar(conn: &Connection, id: i64, e: &NuevoEstudiante) -> Result<usize, ApiError> {
    conn.execute(
        "UPDATE estudiantes
         SET apellido_y_nombre = ?1, dni = ?2, fecha_de_nacimiento = ?3, telefono = ?4, email = ?5
         WHERE id = ?6",
        params![e.apellido_y_nombre, e.dni, e.fecha_de_nacimiento, e.telefono, e.email, id],
    )
    .map_err(|err| mapear_unicidad(err, MSG_DNI_DUPLICADO))
}

pub fn eliminar(conn: &Connection, id: i64) -> Result<usize, ApiError> {
    Ok(conn.execute("DELETE FROM estudiantes WHERE id = ?1", params![id])?)
}

/// ¿Hay otro estudiante (id distinto de `excluir_id`) con ese DNI?
pub fn dni_en_uso(conn: &Connection, dni: &str, excluir_id: i64) -> Result<bool, ApiError> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM estudiantes WHERE dni = ?1 AND id != ?2",
        params![dni, excluir_id],
        |r| r.get(0),
    )?;
    Ok(n > 0)
}

/// Busca el DNI en `estudiantes` y en `dni_duplicados` (legajos heredados)
/// y completa la resolución de cada carrera.
pub fn por_dni(conn: &Connection, dni: &str) -> Result<Vec<EstudiantePorDni>, ApiError> {
    let mut registros: Vec<(String, String, &'static str)> = Vec::new();
    for (tabla, sql) in [
        ("estudiantes", "SELECT apellido_y_nombre, carrera FROM estudiantes WHERE dni = ?1 ORDER BY id"),
        ("dni_duplicados", "SELECT apellido_y_nombre, carrera FROM dni_duplicados WHERE dni = ?1 ORDER BY id"),
    ] {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params![dni], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
        for r in rows {
            let (nombre, carrera) = r?;
            registros.push((nombre, carrera, tabla));
        }
    }

    let mut out = Vec::with_capacity(registros.len());
    for (nombre, carrera, tabla) in registros {
        let resolucion = carreras::resolucion_por_subcategoria(conn, &carrera)?
            .unwrap_or_else(|| RESOLUCION_NO_DISPONIBLE.to_string());
        out.push(EstudiantePorDni { nombre, carrera, tabla: tabla.to_string(), resolucion });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn estudiante(dni: &str) -> NuevoEstudiante {
        NuevoEstudiante {
            carrera: "Tec. en Informática".into(),
            apellido_y_nombre: "Pérez Juan".into(),
            dni: dni.into(),
            fecha_de_nacimiento: "2000-05-10".into(),
            telefono: None,
            email: "juan@correo.com".into(),
        }
    }

    #[test]
    fn dni_repetido_es_duplicado() {
        let db = Database::open_in_memory().unwrap();
        db.init_schema().unwrap();
        db.with_conn(|c| {
            let id = insertar(c, &estudiante("12345678"))?;
            let err = insertar(c, &estudiante("12345678")).unwrap_err();
            assert!(matches!(err, ApiError::Duplicado(ref m) if m == MSG_DNI_DUPLICADO));
            assert!(!dni_en_uso(c, "12345678", id)?);
            assert!(dni_en_uso(c, "12345678", 0)?);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn buscar_por_nombre_con_acentos_o_dni() {
        let db = Database::open_in_memory().unwrap();
        db.init_schema().unwrap();
        db.with_conn(|c| {
            insertar(c, &estudiante("12345678"))?;
            assert_eq!(buscar(c, "PÉREZ")?.len(), 1);
            assert_eq!(buscar(c, "pérez juan")?.len(), 1);
            assert_eq!(buscar(c, "3456")?[0].dni, "12345678");
            assert!(buscar(c, "PEREZ")?.is_empty());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn por_dni_une_tablas_y_resoluciones() {
        let db = Database::open_in_memory().unwrap();
        db.init_schema().unwrap();
        db.with_conn(|c| {
            insertar(c, &estudiante("87654321"))?;
            c.execute(
                "INSERT INTO dni_duplicados (dni, apellido_y_nombre, carrera) VALUES ('87654321', 'Pérez Juan', 'Prof. de Inglés')",
                [],
            )?;
            c.execute(
                "INSERT INTO carreras (categoria, subcategoria, resolucion, cohorte, duracion, carga_horaria)
                 VALUES ('Tec.', 'Tec. en Informática', '123/20', 2024, 3, 1200)",
                [],
            )?;
            let v = por_dni(c, "87654321")?;
            assert_eq!(v.len(), 2);
            assert_eq!(v[0].tabla, "estudiantes");
            assert_eq!(v[0].resolucion, "123/20");
            assert_eq!(v[1].tabla, "dni_duplicados");
            assert_eq!(v[1].resolucion, RESOLUCION_NO_DISPONIBLE);
            assert!(por_dni(c, "00000000")?.is_empty());
            Ok(())
        })
        .unwrap();
    }
}
