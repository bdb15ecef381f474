use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fila del dataset devuelta por el backend.
///
/// Sólo `year` y `make` tienen significado para el cliente; el resto de
/// campos (model, size, kw, rating, ...) se conservan tal cual en `extra`.
/// El orden de llegada de TODAS las claves (year y make incluidas) se
/// recuerda para que la exportación repita el del backend.
#[derive(Debug, Clone)]
pub struct Record {
    pub year: i32,
    pub make: String,
    pub extra: Map<String, Value>,
    key_order: Vec<String>,
}

/// Colección en memoria de registros.
pub type Records = Vec<Record>;

impl Record {
    pub fn new(year: i32, make: impl Into<String>) -> Self {
        Self {
            year,
            make: make.into(),
            extra: Map::new(),
            key_order: vec!["year".to_string(), "make".to_string()],
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        if !self.key_order.contains(&key) {
            self.key_order.push(key.clone());
        }
        self.extra.insert(key, value);
        self
    }

    /// Nombres de campo en el orden en que llegaron.
    ///
    /// Las claves de `extra` agregadas a mano después aparecen al final.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .key_order
            .iter()
            .filter(|k| matches!(k.as_str(), "year" | "make") || self.extra.contains_key(*k))
            .cloned()
            .collect();
        for key in self.extra.keys() {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
        keys
    }

    /// Valor de un campo como texto plano (`None` si el campo no existe).
    pub fn field_text(&self, key: &str) -> Option<String> {
        match key {
            "year" => Some(self.year.to_string()),
            "make" => Some(self.make.clone()),
            other => self.extra.get(other).map(|v| match v {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                v => v.to_string(),
            }),
        }
    }
}

/// El orden de las claves no cuenta para la igualdad.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.year == other.year && self.make == other.make && self.extra == other.extra
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let keys = self.keys();
        let mut map = serializer.serialize_map(Some(keys.len()))?;
        for key in &keys {
            match key.as_str() {
                "year" => map.serialize_entry(key, &self.year)?,
                "make" => map.serialize_entry(key, &self.make)?,
                other => {
                    if let Some(value) = self.extra.get(other) {
                        map.serialize_entry(key, value)?;
                    }
                }
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Map::<String, Value>::deserialize(deserializer)?;

        let mut year = None;
        let mut make = None;
        let mut extra = Map::new();
        let mut key_order = Vec::with_capacity(fields.len());
        for (key, value) in fields {
            match key.as_str() {
                "year" => year = Some(i32::deserialize(value).map_err(de::Error::custom)?),
                "make" => make = Some(String::deserialize(value).map_err(de::Error::custom)?),
                _ => {
                    extra.insert(key.clone(), value);
                }
            }
            key_order.push(key);
        }

        Ok(Self {
            year: year.ok_or_else(|| de::Error::missing_field("year"))?,
            make: make.ok_or_else(|| de::Error::missing_field("make"))?,
            extra,
            key_order,
        })
    }
}
