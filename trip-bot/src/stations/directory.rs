//! Station lookup.

use crate::domain::{Station, StationCode};

use super::catalog::CATALOG;

/// Maximum number of results returned by `search`.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Returned by `resolve` when the input names no station.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("station not found: {0}")]
pub struct UnknownStation(pub String);

/// Read-only station catalog, in popularity order.
#[derive(Debug, Clone)]
pub struct StationDirectory {
    stations: Vec<Station>,
}

impl StationDirectory {
    /// The built-in catalog.
    pub fn builtin() -> Self {
        Self::new(build_list(CATALOG))
    }

    /// A directory over an explicit list (first entry is most popular).
    pub fn new(stations: Vec<Station>) -> Self {
        Self { stations }
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// The `n` most popular stations.
    pub fn popular(&self, n: usize) -> &[Station] {
        &self.stations[..n.min(self.stations.len())]
    }

    /// Station at a position in popularity order.
    pub fn by_index(&self, index: usize) -> Option<&Station> {
        self.stations.get(index)
    }

    pub fn by_code(&self, code: &StationCode) -> Option<&Station> {
        self.stations.iter().find(|s| &s.code == code)
    }

    /// Display label for a code, falling back to the code itself.
    pub fn label(&self, code: &StationCode) -> String {
        self.by_code(code)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| code.to_string())
    }

    /// Case-insensitive substring search on display names.
    ///
    /// An empty query returns the most popular stations.
    pub fn search(&self, query: &str, limit: usize) -> Vec<Station> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.popular(limit).to_vec();
        }

        self.stations
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&query))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Turn free text into a station.
    ///
    /// Accepts, in order: a station code (with or without the `s` prefix),
    /// an exact case-insensitive name, or a name fragment matching exactly
    /// one station. A well-formed code missing from the catalog is still
    /// accepted with the code as its label, since the provider knows far
    /// more stations than the catalog does.
    pub fn resolve(&self, input: &str) -> Result<Station, UnknownStation> {
        let input = input.trim();

        if let Ok(code) = StationCode::parse(input) {
            return Ok(self
                .by_code(&code)
                .cloned()
                .unwrap_or_else(|| Station::new(code.clone(), code.as_str())));
        }

        let needle = input.to_lowercase();
        if needle.is_empty() {
            return Err(UnknownStation(input.to_string()));
        }

        if let Some(exact) = self
            .stations
            .iter()
            .find(|s| s.name.to_lowercase() == needle)
        {
            return Ok(exact.clone());
        }

        let mut matches = self
            .stations
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&needle));
        match (matches.next(), matches.next()) {
            (Some(only), None) => Ok(only.clone()),
            _ => Err(UnknownStation(input.to_string())),
        }
    }
}

impl Default for StationDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Build the station list from raw catalog rows, skipping bad codes and
/// repeated codes.
fn build_list(rows: &[(&str, &str)]) -> Vec<Station> {
    let mut stations: Vec<Station> = Vec::with_capacity(rows.len());
    for (code, name) in rows {
        let Ok(code) = StationCode::parse(code) else {
            continue;
        };
        if stations.iter().any(|s| s.code == code) {
            continue;
        }
        stations.push(Station::new(code, *name));
    }
    stations
}
