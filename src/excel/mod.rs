pub mod analitico;
pub mod io;

pub use analitico::{generar_analitico, nombre_archivo, AnaliticoError, DatosAnalitico, TipoPlantilla, MATERIAS_ANALITICO};
pub use io::{listar_plantillas, resolver_plantilla};
