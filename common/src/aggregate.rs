use indexmap::IndexMap;
use std::hash::Hash;

use crate::filter::op_distinct;
use crate::record::Record;

/// Conteo agrupado `(clave, ocurrencias)`.
///
/// El orden es el de primera aparición de cada clave, no un orden
/// ordenado: de él dependen los dominios categóricos (barras, torta).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedCount<K> {
    entries: Vec<(K, usize)>,
}

impl<K> GroupedCount<K> {
    pub fn from_entries(entries: Vec<(K, usize)>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[(K, usize)] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &(K, usize)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Suma de todos los conteos (== cantidad de registros agrupados).
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    /// `None` para un grupo vacío, nunca 0 inventado.
    pub fn max_count(&self) -> Option<usize> {
        self.entries.iter().map(|(_, c)| *c).max()
    }
}

/// reduce_by_key con conteo: agrupa por `key_fn` y cuenta ocurrencias.
pub fn group_count<K, F>(records: &[Record], key_fn: F) -> GroupedCount<K>
where
    K: Eq + Hash,
    F: Fn(&Record) -> K,
{
    let mut acc: IndexMap<K, usize> = IndexMap::new();
    for rec in records {
        *acc.entry(key_fn(rec)).or_insert(0) += 1;
    }
    GroupedCount {
        entries: acc.into_iter().collect(),
    }
}

pub fn count_by_year(records: &[Record]) -> GroupedCount<i32> {
    group_count(records, |r| r.year)
}

pub fn count_by_make(records: &[Record]) -> GroupedCount<String> {
    group_count(records, |r| r.make.clone())
}

/// Tarjetas de resumen del dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total_records: usize,
    pub unique_makes: usize,
    pub unique_years: usize,
}

pub fn summarize(records: &[Record]) -> Summary {
    Summary {
        total_records: records.len(),
        unique_makes: op_distinct(records, |r| r.make.as_str()).len(),
        unique_years: op_distinct(records, |r| r.year).len(),
    }
}
