use crate::auth;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("falta la variable de entorno {0}")]
    Falta(&'static str),
    #[error("valor inválido para {variable}: {valor:?}")]
    Invalido { variable: &'static str, valor: String },
    #[error("REGISTROS_DB_URL usa un esquema no soportado: {0}")]
    EsquemaNoSoportado(String),
}

/// Configuración del servicio. Se construye una vez en el arranque y se
/// comparte por `web::Data`; no hay estado global.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_horas: i64,
    pub bcrypt_cost: u32,
    /// Plantillas de analítico y front-end compilado.
    pub public_dir: PathBuf,
}

impl Config {
    /// Lee `.env` (si existe) y luego las variables de entorno del proceso.
    pub fn from_env() -> Result<Config, ConfigError> {
        let _ = dotenv::dotenv();
        Config::from_lookup(|k| env::var(k).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables inyectable.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let no_vacio = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());

        let bind_addr = match (no_vacio("BIND_ADDR"), no_vacio("PORT")) {
            (Some(addr), _) => addr,
            (None, Some(port)) => {
                let p: u16 = port.trim().parse().map_err(|_| ConfigError::Invalido { variable: "PORT", valor: port.clone() })?;
                format!("0.0.0.0:{}", p)
            }
            (None, None) => "127.0.0.1:5000".to_string(),
        };

        let db_path = if let Some(p) = no_vacio("REGISTROS_DB_PATH") {
            PathBuf::from(p)
        } else if let Some(url) = no_vacio("REGISTROS_DB_URL") {
            if let Some(rest) = url.strip_prefix("sqlite://") {
                PathBuf::from(rest)
            } else if let Some(rest) = url.strip_prefix("file://") {
                PathBuf::from(rest)
            } else {
                return Err(ConfigError::EsquemaNoSoportado(url));
            }
        } else {
            PathBuf::from("data/registros.db")
        };

        let jwt_secret = no_vacio("JWT_SECRET").ok_or(ConfigError::Falta("JWT_SECRET"))?;

        let token_ttl_horas = match no_vacio("TOKEN_TTL_HORAS") {
            Some(v) => match v.trim().parse::<i64>() {
                Ok(h) if h > 0 => h,
                _ => return Err(ConfigError::Invalido { variable: "TOKEN_TTL_HORAS", valor: v }),
            },
            None => 1,
        };

        let bcrypt_cost = match no_vacio("BCRYPT_COST") {
            Some(v) => match v.trim().parse::<u32>() {
                Ok(c) if (auth::BCRYPT_COSTO_MINIMO..=auth::BCRYPT_COSTO_MAXIMO).contains(&c) => c,
                _ => return Err(ConfigError::Invalido { variable: "BCRYPT_COST", valor: v }),
            },
            None => 10,
        };

        let public_dir = no_vacio("PUBLIC_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("public"));

        Ok(Config { bind_addr, db_path, jwt_secret, token_ttl_horas, bcrypt_cost, public_dir })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cargar(pares: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let m: HashMap<String, String> = pares.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|k| m.get(k).cloned())
    }

    #[test]
    fn valores_por_defecto() {
        let c = cargar(&[("JWT_SECRET", "s3cr3t")]).unwrap();
        assert_eq!(c.bind_addr, "127.0.0.1:5000");
        assert_eq!(c.db_path, PathBuf::from("data/registros.db"));
        assert_eq!(c.token_ttl_horas, 1);
        assert_eq!(c.bcrypt_cost, 10);
        assert_eq!(c.public_dir, PathBuf::from("public"));
    }

    #[test]
    fn sin_secreto_falla() {
        assert!(matches!(cargar(&[]), Err(ConfigError::Falta("JWT_SECRET"))));
        assert!(matches!(cargar(&[("JWT_SECRET", "  ")]), Err(ConfigError::Falta("JWT_SECRET"))));
    }

    #[test]
    fn port_y_url_sqlite() {
        let c = cargar(&[("JWT_SECRET", "x"), ("PORT", "8080"), ("REGISTROS_DB_URL", "sqlite:///var/lib/registros.db")]).unwrap();
        assert_eq!(c.bind_addr, "0.0.0.0:8080");
        assert_eq!(c.db_path, PathBuf::from("/var/lib/registros.db"));
    }

    #[test]
    fn rechaza_valores_invalidos() {
        assert!(matches!(
            cargar(&[("JWT_SECRET", "x"), ("TOKEN_TTL_HORAS", "cero")]),
            Err(ConfigError::Invalido { variable: "TOKEN_TTL_HORAS", .. })
        ));
        assert!(matches!(
            cargar(&[("JWT_SECRET", "x"), ("BCRYPT_COST", "99")]),
            Err(ConfigError::Invalido { variable: "BCRYPT_COST", .. })
        ));
        assert!(matches!(
            cargar(&[("JWT_SECRET", "x"), ("REGISTROS_DB_URL", "postgres://h/db")]),
            Err(ConfigError::EsquemaNoSoportado(_))
        ));
    }

    #[test]
    fn costo_bcrypt_entre_4_y_31() {
        for ok in ["4", "31"] {
            assert_eq!(cargar(&[("JWT_SECRET", "x"), ("BCRYPT_COST", ok)]).unwrap().bcrypt_cost.to_string(), ok);
        }
        for mal in ["3", "32"] {
            assert!(matches!(
                cargar(&[("JWT_SECRET", "x"), ("BCRYPT_COST", mal)]),
                Err(ConfigError::Invalido { variable: "BCRYPT_COST", .. })
            ));
        }
    }
}
