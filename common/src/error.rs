use thiserror::Error;

/// Errores al construir una consulta desde el formulario.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("la lista de marcas está vacía (se esperaba texto separado por comas)")]
    NoModels,

    #[error("marca vacía o con espacios sobrantes: {0:?}")]
    BlankModel(String),
}

/// Valor de un selector (año / marca) que no se pudo interpretar.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("valor de selección inválido: {0:?}")]
pub struct SelectionError(pub String);

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("error de E/S exportando CSV: {0}")]
    Io(#[from] std::io::Error),

    #[error("error escribiendo CSV: {0}")]
    Csv(#[from] csv::Error),
}
