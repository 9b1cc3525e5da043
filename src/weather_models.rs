//! Country/region → forecast model selection
//!
//! National weather services publish their own high-resolution models on
//! Open-Meteo. Countries without one fall back to the ECMWF global model.

use crate::models::CountryProfile;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::Arc;

pub const FALLBACK_MODEL: &str = "ecmwf_ifs025";

/// Keys are ISO alpha-2 codes or lower-cased common names
const COUNTRY_MODELS: &[(&str, &str)] = &[
    ("GB", "ukmo_seamless"),
    ("united kingdom", "ukmo_seamless"),
    ("CN", "cma_grapes_global"),
    ("china", "cma_grapes_global"),
    ("US", "gfs_seamless"),
    ("united states", "gfs_seamless"),
    ("CA", "gem_seamless"),
    ("canada", "gem_seamless"),
    ("DE", "icon_seamless"),
    ("germany", "icon_seamless"),
    ("FR", "meteofrance_seamless"),
    ("france", "meteofrance_seamless"),
    ("JP", "jma_seamless"),
    ("japan", "jma_seamless"),
    ("KR", "kma_seamless"),
    ("south korea", "kma_seamless"),
    ("NO", "metno_seamless"),
    ("SE", "metno_seamless"),
    ("FI", "metno_seamless"),
    ("DK", "dmi_seamless"),
    ("NL", "knmi_seamless"),
    ("CH", "meteoswiss_icon_seamless"),
    ("IT", "italia_meteo_arpae_icon_2i"),
    ("AU", "bom_access_global"),
];

/// Keys are lower-cased region or subregion names
const REGION_MODELS: &[(&str, &str)] = &[
    ("europe", "icon_seamless"),
    ("north america", "gfs_seamless"),
];

lazy_static! {
    static ref BUILTIN: Arc<WeatherModelTable> = Arc::new(WeatherModelTable::builtin());
}

#[derive(Debug, Clone)]
pub struct WeatherModelTable {
    countries: HashMap<String, String>,
    regions: HashMap<String, String>,
    fallback: String,
}

impl WeatherModelTable {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            countries: HashMap::new(),
            regions: HashMap::new(),
            fallback: fallback.into(),
        }
    }

    fn builtin() -> Self {
        let mut table = Self::new(FALLBACK_MODEL);
        for (key, model) in COUNTRY_MODELS {
            table.insert_country(key, model);
        }
        for (key, model) in REGION_MODELS {
            table.insert_region(key, model);
        }
        table
    }

    /// Process-wide default table
    pub fn shared() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    /// Built-in rows with configured overrides layered on top
    pub fn with_overrides(overrides: &[(String, String)]) -> Arc<Self> {
        if overrides.is_empty() {
            return Self::shared();
        }
        let mut table = Self::builtin();
        for (key, model) in overrides {
            table.insert_country(key, model);
        }
        Arc::new(table)
    }

    pub fn insert_country(&mut self, key: &str, model: &str) {
        self.countries.insert(normalize_key(key), model.to_string());
    }

    pub fn insert_region(&mut self, key: &str, model: &str) {
        self.regions.insert(normalize_key(key), model.to_string());
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Country code, then common name, then subregion, then region, then fallback
    pub fn model_for(&self, profile: &CountryProfile) -> &str {
        let country_keys = profile
            .country_code
            .iter()
            .chain(std::iter::once(&profile.name));

        for key in country_keys {
            if let Some(model) = self.countries.get(&normalize_key(key)) {
                return model;
            }
        }

        let region_keys = profile.subregion.iter().chain(profile.region.iter());
        for key in region_keys {
            if let Some(model) = self.regions.get(&normalize_key(key)) {
                return model;
            }
        }

        &self.fallback
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}
