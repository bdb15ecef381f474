use std::str::FromStr;

use crate::error::SelectionError;
use crate::record::Record;

/// Valor de un selector: "All" o un valor concreto.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Choice<T> {
    All,
    Only(T),
}

impl<T> Default for Choice<T> {
    fn default() -> Self {
        Choice::All
    }
}

impl<T: PartialEq> Choice<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(v) => v == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Choice::All)
    }
}

/// Los selectores entregan texto: "All" o el valor (ej: "2015").
impl<T: FromStr> FromStr for Choice<T> {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "All" {
            return Ok(Choice::All);
        }
        s.parse::<T>()
            .map(Choice::Only)
            .map_err(|_| SelectionError(s.to_string()))
    }
}

/// Selección actual de los filtros (estado efímero de UI).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub year: Choice<i32>,
    pub make: Choice<String>,
}

impl Selection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_year(mut self, year: Choice<i32>) -> Self {
        self.year = year;
        self
    }

    pub fn with_make(mut self, make: Choice<String>) -> Self {
        self.make = make;
        self
    }

    /// Conjunción: pasa si cumple año Y marca.
    pub fn matches(&self, rec: &Record) -> bool {
        self.year.matches(&rec.year) && self.make.matches(&rec.make)
    }

    /// Selección equivalente a aplicar `self` y luego `other`.
    /// `None` si restringen el mismo campo a valores distintos (nada pasa).
    pub fn intersect(&self, other: &Selection) -> Option<Selection> {
        Some(Selection {
            year: intersect_choice(&self.year, &other.year)?,
            make: intersect_choice(&self.make, &other.make)?,
        })
    }
}

fn intersect_choice<T: Clone + PartialEq>(a: &Choice<T>, b: &Choice<T>) -> Option<Choice<T>> {
    match (a, b) {
        (Choice::All, x) | (x, Choice::All) => Some(x.clone()),
        (Choice::Only(x), Choice::Only(y)) if x == y => Some(Choice::Only(x.clone())),
        _ => None,
    }
}
