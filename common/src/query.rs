use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Parámetros de la consulta tal como los espera `POST /create_task`.
///
/// No se valida `start_year <= end_year`: el backend decide si lo rechaza.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParameters {
    pub start_year: i32,
    pub end_year: i32,
    /// Marcas, en el orden en que se escribieron.
    pub models: Vec<String>,
    pub region: String,
    pub size: String,
}

impl QueryParameters {
    /// Construye la consulta desde los campos del formulario.
    /// `models_text` es texto separado por comas, ej: "NISSAN, MITSUBISHI".
    pub fn from_form(
        start_year: i32,
        end_year: i32,
        models_text: &str,
        region: impl Into<String>,
        size: impl Into<String>,
    ) -> Result<Self, QueryError> {
        let models = split_models(models_text);
        if models.is_empty() {
            return Err(QueryError::NoModels);
        }

        Ok(Self {
            start_year,
            end_year,
            models,
            region: region.into(),
            size: size.into(),
        })
    }

    /// Única validación antes de enviar: al menos una marca, todas recortadas.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.models.is_empty() {
            return Err(QueryError::NoModels);
        }
        match self.models.iter().find(|m| m.is_empty() || m.trim() != m.as_str()) {
            Some(bad) => Err(QueryError::BlankModel(bad.clone())),
            None => Ok(()),
        }
    }
}

/// Separa por comas, recorta espacios y descarta elementos vacíos.
pub fn split_models(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}
