use indexmap::IndexSet;

use crate::record::Record;
use crate::selection::Selection;

/* =========================
   Operadores genéricos
   ========================= */

/// filter: deja pasar sólo los registros que cumplan el predicado.
pub fn op_filter<F>(input: &[Record], f: F) -> Vec<Record>
where
    F: Fn(&Record) -> bool,
{
    input.iter().filter(|rec| f(rec)).cloned().collect()
}

/// distinct: valores únicos en orden de primera aparición.
pub fn op_distinct<'a, T, F>(input: &'a [Record], f: F) -> Vec<T>
where
    T: std::hash::Hash + Eq,
    F: Fn(&'a Record) -> T,
{
    input.iter().map(f).collect::<IndexSet<T>>().into_iter().collect()
}

/* =========================
   FilterEngine
   ========================= */

/// Aplica la selección al dataset realizado. Puro y determinista.
pub fn apply(dataset: &[Record], selection: &Selection) -> Vec<Record> {
    op_filter(dataset, |rec| selection.matches(rec))
}

/// Opciones de los selectores.
///
/// Se derivan siempre del dataset SIN filtrar, para que elegir un año no
/// achique la lista de marcas (y viceversa).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionOptions {
    pub years: Vec<i32>,
    pub makes: Vec<String>,
}

pub fn options(dataset: &[Record]) -> SelectionOptions {
    SelectionOptions {
        years: op_distinct(dataset, |r| r.year),
        makes: op_distinct(dataset, |r| r.make.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::Choice;

    fn dataset() -> Vec<Record> {
        vec![
            Record::new(2015, "NISSAN"),
            Record::new(2015, "NISSAN"),
            Record::new(2018, "MITSUBISHI"),
            Record::new(2016, "NISSAN"),
        ]
    }

    #[test]
    fn seleccion_all_devuelve_todo() {
        let d = dataset();
        assert_eq!(apply(&d, &Selection::all()), d);
    }

    #[test]
    fn filtra_por_anio() {
        let out = apply(&dataset(), &Selection::all().with_year(Choice::Only(2015)));
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.make == "NISSAN"));
    }

    #[test]
    fn resultado_es_subconjunto() {
        let d = dataset();
        let sel = Selection::all().with_make(Choice::Only("NISSAN".into()));
        let out = apply(&d, &sel);
        assert!(out.iter().all(|r| d.contains(r)));
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn filtrar_dos_veces_equivale_a_intersectar() {
        let d = dataset();
        let s1 = Selection::all().with_year(Choice::Only(2015));
        let s2 = Selection::all().with_make(Choice::Only("NISSAN".into()));

        let twice = apply(&apply(&d, &s1), &s2);
        let once = apply(&d, &s1.intersect(&s2).unwrap());
        assert_eq!(twice, once);

        // y es idempotente
        assert_eq!(apply(&once, &s1.intersect(&s2).unwrap()), once);
    }

    #[test]
    fn sin_coincidencias_da_vacio() {
        let out = apply(&dataset(), &Selection::all().with_year(Choice::Only(1990)));
        assert!(out.is_empty());
    }

    #[test]
    fn opciones_en_orden_de_aparicion() {
        let opts = options(&dataset());
        assert_eq!(opts.years, vec![2015, 2018, 2016]);
        assert_eq!(opts.makes, vec!["NISSAN", "MITSUBISHI"]);
    }

    #[test]
    fn opciones_de_dataset_vacio() {
        assert_eq!(options(&[]), SelectionOptions::default());
    }
}
