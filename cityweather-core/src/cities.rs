use anyhow::{Context, Result, anyhow};
use rand::{Rng, seq::IndexedRandom};
use std::{collections::HashSet, fs, path::Path};

use crate::model::City;

/// The list of cities the backend rotates through.
#[derive(Debug, Clone)]
pub struct CityCatalog {
    cities: Vec<City>,
}

impl CityCatalog {
    pub fn new(cities: Vec<City>) -> Result<Self> {
        if cities.is_empty() {
            return Err(anyhow!("City catalog is empty"));
        }
        Ok(Self { cities })
    }

    /// Read a JSON array of cities.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read cities file: {}", path.display()))?;

        let cities: Vec<City> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cities file: {}", path.display()))?;

        Self::new(cities)
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Lowercased, de-duplicated country codes.
    pub fn country_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self
            .cities
            .iter()
            .map(|c| c.country_code.to_lowercase())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        codes.sort();
        codes
    }
}

/// Random city selection without repeats until every city has been shown.
///
/// Cities are told apart by name.
#[derive(Debug)]
pub struct CityRotation {
    catalog: CityCatalog,
    used: HashSet<String>,
}

impl CityRotation {
    pub fn new(catalog: CityCatalog) -> Self {
        Self {
            catalog,
            used: HashSet::new(),
        }
    }

    pub fn catalog(&self) -> &CityCatalog {
        &self.catalog
    }

    pub fn next_city<R: Rng + ?Sized>(&mut self, rng: &mut R) -> City {
        let mut available: Vec<&City> = self
            .catalog
            .cities
            .iter()
            .filter(|c| !self.used.contains(&c.name))
            .collect();

        if available.is_empty() {
            self.used.clear();
            available = self.catalog.cities.iter().collect();
        }

        // catalog is never empty
        let city = available
            .choose(rng)
            .map(|c| (*c).clone())
            .unwrap_or_else(|| self.catalog.cities[0].clone());
        self.used.insert(city.name.clone());
        city
    }
}
