use crate::error::ApiError;
use crate::models::Usuario;
use rusqlite::{params, Connection, OptionalExtension, Row};

fn fila_usuario(row: &Row<'_>) -> rusqlite::Result<Usuario> {
    Ok(Usuario {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        rol_id: row.get(4)?,
    })
}

pub fn buscar_por_email(conn: &Connection, email: &str) -> Result<Option<Usuario>, ApiError> {
    let usuario = conn
        .query_row(
            "SELECT id, name, email, password, rol_id FROM users WHERE email = ?1",
            params![email],
            fila_usuario,
        )
        .optional()?;
    Ok(usuario)
}

/// Inserta el usuario y devuelve su id. Un email repetido es `Duplicado`.
pub fn insertar(conn: &Connection, name: &str, email: &str, password_hash: &str) -> Result<i64, ApiError> {
    conn.execute(
        "INSERT INTO users (name, email, password) VALUES (?1, ?2, ?3)",
        params![name, email, password_hash],
    )
    .map_err(|e| crate::error::mapear_unicidad(e, crate::auth::MSG_USUARIO_REGISTRADO))?;
    Ok(conn.last_insert_rowid())
}
