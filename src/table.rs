//! Endpoint table loading.
//!
//! The table is a CSV file with a header row. The city column is `mesto`
//! (or `city`), the feed column is `url`, and an optional `uri` column is
//! used when `url` is empty or the `null` sentinel:
//!
//! ```text
//! mesto,url,uri
//! Benešov,https://www.benesov-city.cz/opendata-uredni-deska,
//! Beroun,null,https://www.mesto-beroun.cz/uredni-deska.json
//! Blansko,null,
//! ```

use crate::error::TableError;
use crate::models::{EndpointRow, is_missing_endpoint};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "mesto", alias = "city")]
    city: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    uri: Option<String>,
}

impl RawRow {
    fn into_endpoint_row(self) -> EndpointRow {
        let endpoint = [self.url.as_deref(), self.uri.as_deref()]
            .into_iter()
            .flatten()
            .find(|e| !is_missing_endpoint(e));
        EndpointRow::new(self.city.trim(), endpoint)
    }
}

/// The city → endpoint table driving one run. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointTable {
    rows: Vec<EndpointRow>,
}

impl EndpointTable {
    pub fn new(rows: Vec<EndpointRow>) -> Self {
        Self { rows }
    }

    /// Load the table from a CSV file.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        let file = std::fs::File::open(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(file)?;
        info!(
            rows = table.len(),
            with_endpoint = table.with_endpoint().count(),
            "Loaded endpoint table"
        );
        Ok(table)
    }

    /// Parse the table from any CSV source. Rows without a city name are skipped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for raw in rdr.deserialize::<RawRow>() {
            let row = raw?.into_endpoint_row();
            if row.city.is_empty() {
                warn!("Skipping endpoint table row without a city name");
                continue;
            }
            if row.endpoint.is_none() {
                debug!(city = %row.city, "No endpoint for city");
            }
            rows.push(row);
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[EndpointRow] {
        &self.rows
    }

    /// `(city, endpoint)` pairs for every row that has a usable endpoint.
    pub fn with_endpoint(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rows
            .iter()
            .filter_map(|row| row.endpoint.as_deref().map(|e| (row.city.as_str(), e)))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "mesto,url,uri
Benešov,https://www.benesov-city.cz/opendata-uredni-deska,
Beroun,null,https://www.mesto-beroun.cz/uredni-deska.json
Blansko,null,
Brno,,
";

    #[test]
    fn test_url_preferred_uri_fallback() {
        let table = EndpointTable::from_reader(TABLE.as_bytes()).unwrap();
        assert_eq!(table.len(), 4);
        let pairs: Vec<_> = table.with_endpoint().collect();
        assert_eq!(
            pairs,
            vec![
                ("Benešov", "https://www.benesov-city.cz/opendata-uredni-deska"),
                ("Beroun", "https://www.mesto-beroun.cz/uredni-deska.json"),
            ]
        );
    }

    #[test]
    fn test_sentinel_rows_kept_without_endpoint() {
        let table = EndpointTable::from_reader(TABLE.as_bytes()).unwrap();
        let blansko = table.rows().iter().find(|r| r.city == "Blansko").unwrap();
        assert_eq!(blansko.endpoint, None);
        let brno = table.rows().iter().find(|r| r.city == "Brno").unwrap();
        assert_eq!(brno.endpoint, None);
    }

    #[test]
    fn test_city_alias_and_missing_uri_column() {
        let csv = "city,url\nTábor,https://www.taborcz.eu/deska.json\nCheb,null\n";
        let table = EndpointTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.with_endpoint().count(), 1);
    }

    #[test]
    fn test_fields_are_trimmed() {
        let csv = "mesto,url\n  Písek , https://www.mesto-pisek.cz/deska.json \n";
        let table = EndpointTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(
            table.with_endpoint().next(),
            Some(("Písek", "https://www.mesto-pisek.cz/deska.json"))
        );
    }

    #[test]
    fn test_missing_city_column_is_error() {
        let csv = "town,url\nZlín,https://www.zlin.eu/deska.json\n";
        assert!(EndpointTable::from_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = EndpointTable::from_path(Path::new("/nonexistent/mesta.csv")).unwrap_err();
        assert!(matches!(err, TableError::Io { .. }));
    }
}
