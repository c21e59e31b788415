//! Guess the operating country of an export from its destination cities.

use std::collections::HashSet;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Country {
    Colombia,
    Ecuador,
    Guatemala,
}

const COLOMBIA_CITIES: &[&str] = &[
    "BOGOTA", "BOGOTÁ", "MEDELLIN", "MEDELLÍN", "CALI", "BARRANQUILLA",
    "CARTAGENA", "BUCARAMANGA", "PEREIRA", "CUCUTA", "CÚCUTA", "MANIZALES",
    "IBAGUE", "IBAGUÉ", "PASTO", "SANTA MARTA", "VILLAVICENCIO", "NEIVA",
    "MONTERIA", "MONTERÍA", "VALLEDUPAR", "SINCELEJO", "POPAYAN", "POPAYÁN",
    "TUNJA", "ARMENIA", "RIOHACHA", "QUIBDO", "QUIBDÓ", "FLORENCIA",
];

const ECUADOR_CITIES: &[&str] = &[
    "QUITO", "GUAYAQUIL", "CUENCA", "AMBATO", "PORTOVIEJO",
    "MACHALA", "DURÁN", "DURAN", "LOJA", "MANTA", "SANTO DOMINGO",
    "RIOBAMBA", "ESMERALDAS", "IBARRA", "LATACUNGA", "MILAGRO",
];

const GUATEMALA_CITIES: &[&str] = &[
    "GUATEMALA", "MIXCO", "VILLA NUEVA", "QUETZALTENANGO",
    "ESCUINTLA", "CHINAUTLA", "HUEHUETENANGO", "COBAN", "COBÁN",
    "ANTIGUA", "CHIMALTENANGO", "MAZATENANGO", "RETALHULEU",
    "AMATITLAN", "PETAPA", "SANTA CATARINA PINULA", "VILLANUEVA",
    "JUTIAPA", "JALAPA", "CHIQUIMULA", "ZACAPA",
];

pub trait CountryDetector: Send + Sync {
    /// `None` when nothing matches; callers fall back to asking the user.
    fn detect(&self, cities: &[String]) -> Option<Country>;
}

/// Scores each country by how many distinct cities appear in its table.
pub struct CityTableDetector {
    tables: Vec<(Country, HashSet<&'static str>)>,
}

impl Default for CityTableDetector {
    fn default() -> Self {
        Self {
            tables: vec![
                (Country::Colombia, COLOMBIA_CITIES.iter().copied().collect()),
                (Country::Ecuador, ECUADOR_CITIES.iter().copied().collect()),
                (Country::Guatemala, GUATEMALA_CITIES.iter().copied().collect()),
            ],
        }
    }
}

impl CountryDetector for CityTableDetector {
    fn detect(&self, cities: &[String]) -> Option<Country> {
        let normalized: HashSet<String> = cities
            .iter()
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .collect();

        let mut best: Option<(Country, usize)> = None;
        for (country, table) in &self.tables {
            let score = normalized.iter().filter(|c| table.contains(c.as_str())).count();
            // strict comparison: ties keep the earlier table
            if score > 0 && best.map_or(true, |(_, top)| score > top) {
                best = Some((*country, score));
            }
        }
        best.map(|(country, _)| country)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cities(names: &[&str]) -> Vec<String> { names.iter().map(|s| s.to_string()).collect() }

    #[test]
    fn test_detects_by_majority() {
        let d = CityTableDetector::default();
        assert_eq!(d.detect(&cities(&["Quito", "guayaquil ", "Cali"])), Some(Country::Ecuador));
        assert_eq!(d.detect(&cities(&["Mixco", "Coban"])), Some(Country::Guatemala));
    }

    #[test]
    fn test_duplicates_count_once() {
        let d = CityTableDetector::default();
        assert_eq!(d.detect(&cities(&["Cali", "Bogotá", "Quito", "QUITO", "quito"])), Some(Country::Colombia));
    }

    #[test]
    fn test_tie_prefers_first_table() {
        let d = CityTableDetector::default();
        assert_eq!(d.detect(&cities(&["Cali", "Quito"])), Some(Country::Colombia));
    }

    #[test]
    fn test_unknown() {
        let d = CityTableDetector::default();
        assert_eq!(d.detect(&cities(&["Madrid", ""])), None);
        assert_eq!(d.detect(&[]), None);
    }
}
