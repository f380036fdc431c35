use serde::{Deserialize, Serialize};

/// Category filter offered by the search form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Biolaeden,
    Marktstaende,
    Lieferservice,
}

impl Category {
    /// Label text the search form shows next to the toggle.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Biolaeden => "Bioläden",
            Category::Marktstaende => "Marktstände",
            Category::Lieferservice => "Lieferservice",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryFilters {
    pub biolaeden: bool,
    pub marktstaende: bool,
    pub lieferservice: bool,
}

impl Default for CategoryFilters {
    fn default() -> Self {
        Self {
            biolaeden: true,
            marktstaende: true,
            lieferservice: true,
        }
    }
}

impl CategoryFilters {
    /// Requested categories in the order the form lists them.
    #[must_use]
    pub fn enabled(&self) -> Vec<Category> {
        [
            (Category::Biolaeden, self.biolaeden),
            (Category::Marktstaende, self.marktstaende),
            (Category::Lieferservice, self.lieferservice),
        ]
        .into_iter()
        .filter_map(|(category, on)| on.then_some(category))
        .collect()
    }
}

/// One postal-code search. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTask {
    postal_code: String,
    radius_km: f64,
    filters: CategoryFilters,
}

impl SearchTask {
    #[must_use]
    pub fn new(postal_code: impl Into<String>, radius_km: f64, filters: CategoryFilters) -> Self {
        Self {
            postal_code: postal_code.into(),
            radius_km,
            filters,
        }
    }

    #[must_use]
    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    #[must_use]
    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    #[must_use]
    pub fn filters(&self) -> CategoryFilters {
        self.filters
    }
}
