use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};
use tracing::debug;

use crate::error::ExportError;
use crate::record::Record;

pub const DEFAULT_EXPORT_FILE: &str = "filtered_data.csv";

/// Exporta la vista filtrada como CSV.
///
/// - Encabezado: las claves del PRIMER registro.
/// - Una fila por registro, todos los campos entre comillas.
/// - Las formas heterogéneas no se normalizan: claves que faltan salen
///   vacías y las que sobran se ignoran.
/// - Dataset vacío: no se escribe nada.
pub fn write_csv<W: Write>(records: &[Record], out: W) -> Result<(), ExportError> {
    let Some(first) = records.first() else {
        return Ok(());
    };
    let headers = first.keys();

    let mut header_writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(out);
    header_writer.write_record(&headers)?;
    let out = header_writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))?;

    let mut row_writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(out);
    for rec in records {
        let row: Vec<String> = headers
            .iter()
            .map(|h| rec.field_text(h).unwrap_or_default())
            .collect();
        row_writer.write_record(&row)?;
    }
    row_writer.flush()?;
    Ok(())
}

pub fn export_csv_file(records: &[Record], output_path: &Path) -> Result<(), ExportError> {
    // Crear carpeta de salida si hace falta
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = BufWriter::new(File::create(output_path)?);
    write_csv(records, &mut writer)?;
    writer.flush()?;

    debug!("exportados {} registros a {}", records.len(), output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn to_string(records: &[Record]) -> String {
        let mut buf = Vec::new();
        write_csv(records, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn temp_dir(sub: &str) -> PathBuf {
        let base = std::env::temp_dir().join("export_tests").join(sub);
        let _ = fs::remove_dir_all(&base);
        fs::create_dir_all(&base).unwrap();
        base
    }

    #[test]
    fn encabezado_y_filas_entre_comillas() {
        let recs = vec![
            Record::new(2015, "NISSAN").with_field("model", json!("LEAF")),
            Record::new(2018, "MITSUBISHI").with_field("model", json!("i-MiEV")),
        ];
        assert_eq!(
            to_string(&recs),
            "year,make,model\n\"2015\",\"NISSAN\",\"LEAF\"\n\"2018\",\"MITSUBISHI\",\"i-MiEV\"\n"
        );
    }

    #[test]
    fn formas_heterogeneas_no_se_normalizan() {
        let recs = vec![
            Record::new(2015, "NISSAN").with_field("model", json!("LEAF")),
            Record::new(2016, "BMW").with_field("kw", json!(125)),
        ];
        let out = to_string(&recs);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "year,make,model");
        // "kw" no está en el encabezado y "model" falta: campo vacío
        assert_eq!(lines[2], "\"2016\",\"BMW\",\"\"");
    }

    #[test]
    fn encabezado_sigue_el_orden_del_backend() {
        let recs: Vec<Record> = serde_json::from_value(json!([
            { "model": "LEAF", "year": 2015, "make": "NISSAN" },
        ]))
        .unwrap();
        assert_eq!(
            to_string(&recs),
            "model,year,make\n\"LEAF\",\"2015\",\"NISSAN\"\n"
        );
    }

    #[test]
    fn dataset_vacio_no_escribe_nada() {
        assert_eq!(to_string(&[]), "");
    }

    #[test]
    fn export_csv_file_crea_directorios() {
        let tmp = temp_dir("nested");
        let path = tmp.join("a").join("b").join(DEFAULT_EXPORT_FILE);

        export_csv_file(&[Record::new(2015, "NISSAN")], &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "year,make\n\"2015\",\"NISSAN\"\n");
    }
}
