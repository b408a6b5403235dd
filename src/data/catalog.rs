//! Label catalog built from the ball-by-ball dataset
//!
//! Supplies the valid choices for each field. The predictor never reads it.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::features::CategoricalEncoders;
use crate::{Field, IplError, Result};

/// Sorted distinct choices per field
#[derive(Debug, Clone, Default)]
pub struct LabelCatalog {
    choices: BTreeMap<Field, Vec<String>>,
    rows: usize,
}

impl LabelCatalog {
    /// Read the dataset CSV at `path`
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            IplError::Config(format!("Failed to read catalog {}: {}", path.display(), e))
        })?;
        let catalog = Self::from_csv_str(&content)?;
        log::info!(
            "Loaded catalog from {} ({} rows)",
            path.display(),
            catalog.rows
        );
        Ok(catalog)
    }

    /// Parse dataset CSV text; the first record is the header
    pub fn from_csv_str(csv: &str) -> Result<Self> {
        let mut records = split_csv_records(csv)?.into_iter();
        let header = records
            .next()
            .ok_or_else(|| IplError::Parse("Catalog CSV is empty".to_string()))?;
        let columns = header.fields;

        let mut positions = Vec::with_capacity(Field::ALL.len());
        for field in Field::ALL {
            let pos = columns
                .iter()
                .position(|c| c == field.dataset_column())
                .ok_or_else(|| {
                    IplError::Parse(format!(
                        "Catalog CSV has no '{}' column",
                        field.dataset_column()
                    ))
                })?;
            positions.push((field, pos));
        }

        let mut sets: BTreeMap<Field, BTreeSet<String>> = BTreeMap::new();
        let mut rows = 0;
        for record in records {
            if record.fields.len() != columns.len() {
                log::warn!(
                    "Skipping catalog line {}: expected {} columns, got {}",
                    record.line,
                    columns.len(),
                    record.fields.len()
                );
                continue;
            }
            rows += 1;
            for &(field, pos) in &positions {
                // Labels are kept verbatim; encoders match them exactly
                let value = &record.fields[pos];
                if !value.is_empty() {
                    sets.entry(field).or_default().insert(value.clone());
                }
            }
        }

        let choices = Field::ALL
            .into_iter()
            .map(|f| {
                let values = sets.remove(&f).unwrap_or_default();
                (f, values.into_iter().collect())
            })
            .collect();

        Ok(LabelCatalog { choices, rows })
    }

    /// Build a catalog directly from per-field choices
    pub fn from_choices<I, S>(field_choices: impl IntoIterator<Item = (Field, I)>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut catalog = LabelCatalog::default();
        for (field, values) in field_choices {
            let set: BTreeSet<String> = values.into_iter().map(Into::into).collect();
            catalog.choices.insert(field, set.into_iter().collect());
        }
        catalog
    }

    /// Sorted distinct choices for a field
    pub fn choices(&self, field: Field) -> &[String] {
        self.choices.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of data rows read
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Catalog labels an encoder would reject, per field
    pub fn unknown_labels<'a>(&'a self, encoders: &CategoricalEncoders) -> Vec<(Field, &'a str)> {
        Field::ALL
            .into_iter()
            .flat_map(|field| {
                let encoder = encoders.encoder(field);
                self.choices(field)
                    .iter()
                    .filter(move |label| !encoder.contains(label))
                    .map(move |label| (field, label.as_str()))
            })
            .collect()
    }

    /// Fail if any catalog label would be rejected by its encoder
    pub fn verify(&self, encoders: &CategoricalEncoders) -> Result<()> {
        let unknown = self.unknown_labels(encoders);
        if unknown.is_empty() {
            return Ok(());
        }
        Err(IplError::Config(format!(
            "{} catalog label(s) unknown to the encoders, first: {} {:?}",
            unknown.len(),
            unknown[0].0,
            unknown[0].1
        )))
    }
}

/// One CSV record and the file line it starts on
#[derive(Debug, PartialEq)]
struct CsvRecord {
    line: usize,
    fields: Vec<String>,
}

/// Split CSV text into records
///
/// Double-quoted fields may contain commas, doubled quotes and line breaks.
/// Blank lines are skipped. Cell text is otherwise kept as written.
fn split_csv_records(csv: &str) -> Result<Vec<CsvRecord>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut blank = true;
    let mut line = 1;
    let mut start = 1;
    let mut chars = csv.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.is_empty() => {
                in_quotes = true;
                blank = false;
            }
            '\n' => {
                line += 1;
                if in_quotes {
                    current.push('\n');
                    continue;
                }
                if blank {
                    current.clear();
                } else {
                    fields.push(std::mem::take(&mut current));
                    records.push(CsvRecord {
                        line: start,
                        fields: std::mem::take(&mut fields),
                    });
                }
                blank = true;
                start = line;
            }
            '\r' if !in_quotes => {}
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
                blank = false;
            }
            _ => {
                current.push(c);
                blank = false;
            }
        }
    }

    if in_quotes {
        return Err(IplError::Parse(format!(
            "Unterminated quoted field starting on line {}",
            start
        )));
    }
    if !blank {
        fields.push(current);
        records.push(CsvRecord {
            line: start,
            fields,
        });
    }
    Ok(records)
}
