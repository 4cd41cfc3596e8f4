//! Overpass QL query generation

use std::collections::BTreeSet;
use std::fmt::Write;

use itertools::Itertools;

use crate::model::{FeatureCategory, Location, TagFilter};

const DEFAULT_SERVER_TIMEOUT_SECS: u32 = 25;

/// Builds one batched query for a set of feature categories around a point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBuilder {
    radius_m: u32,
    timeout_secs: u32,
    categories: BTreeSet<FeatureCategory>,
}

impl QueryBuilder {
    pub fn new(radius_m: u32) -> Self {
        Self {
            radius_m,
            timeout_secs: DEFAULT_SERVER_TIMEOUT_SECS,
            categories: BTreeSet::new(),
        }
    }

    /// Server-side evaluation limit written into the query header
    #[must_use]
    pub fn timeout_secs(mut self, secs: u32) -> Self {
        self.timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn feature(mut self, category: FeatureCategory) -> Self {
        self.categories.insert(category);
        self
    }

    #[must_use]
    pub fn features<I>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = FeatureCategory>,
    {
        self.categories.extend(categories);
        self
    }

    pub fn radius_m(&self) -> u32 {
        self.radius_m
    }

    pub fn categories(&self) -> impl Iterator<Item = FeatureCategory> + '_ {
        self.categories.iter().copied()
    }

    /// Renders the query.
    ///
    /// Nodes and ways come back with full geometry; relations of area-like
    /// categories come back with a center point only.
    pub fn build(&self, location: &Location) -> String {
        let around = format!(
            "(around:{},{:.7},{:.7})",
            self.radius_m,
            location.lat(),
            location.lon()
        );

        let selectors: Vec<String> = self
            .categories
            .iter()
            .flat_map(|category| category.filters())
            .map(render_filter)
            .unique()
            .collect();

        let relation_selectors: Vec<String> = self
            .categories
            .iter()
            .filter(|category| category.includes_relations())
            .flat_map(|category| category.filters())
            .map(render_filter)
            .unique()
            .collect();

        let mut query = format!("[out:json][timeout:{}];\n(\n", self.timeout_secs);
        for selector in &selectors {
            let _ = writeln!(query, "  node{selector}{around};");
            let _ = writeln!(query, "  way{selector}{around};");
        }
        query.push_str(");\nout body geom;\n");

        if !relation_selectors.is_empty() {
            query.push_str("(\n");
            for selector in &relation_selectors {
                let _ = writeln!(query, "  relation{selector}{around};");
            }
            query.push_str(");\nout center;\n");
        }

        query
    }
}

fn render_filter(filter: &TagFilter) -> String {
    let key = escape(filter.key);
    match filter.values {
        [] => format!("[\"{key}\"]"),
        [value] => format!("[\"{key}\"=\"{}\"]", escape(value)),
        values => format!(
            "[\"{key}\"~\"^({})$\"]",
            values.iter().map(|value| escape(value)).join("|")
        ),
    }
}

fn escape(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> Location {
        Location::new(40.0, -75.0).unwrap()
    }

    #[test]
    fn renders_equality_and_alternation_filters() {
        let query = QueryBuilder::new(800)
            .feature(FeatureCategory::Grocery)
            .feature(FeatureCategory::StreetLamp)
            .build(&location());

        assert!(query.starts_with("[out:json][timeout:25];"));
        assert!(query.contains(
            "node[\"shop\"~\"^(supermarket|grocery|convenience|greengrocer)$\"](around:800,40.0000000,-75.0000000);"
        ));
        assert!(query.contains("way[\"highway\"=\"street_lamp\"](around:800,40.0000000,-75.0000000);"));
        assert!(query.contains("out body geom;"));
        assert!(!query.contains("relation"));
    }

    #[test]
    fn key_only_filter_and_relations() {
        let query = QueryBuilder::new(500)
            .feature(FeatureCategory::Healthcare)
            .build(&location());

        assert!(query.contains("node[\"healthcare\"](around:500"));
        assert!(query.contains("relation[\"healthcare\"](around:500"));
        assert!(query.trim_end().ends_with("out center;"));
    }

    #[test]
    fn shared_filters_are_emitted_once() {
        let query = QueryBuilder::new(500)
            .feature(FeatureCategory::Dining)
            .feature(FeatureCategory::Dining)
            .build(&location());
        assert_eq!(query.matches("node[").count(), 1);
    }

    #[test]
    fn build_is_deterministic_regardless_of_insertion_order() {
        let a = QueryBuilder::new(1000)
            .features([FeatureCategory::Transit, FeatureCategory::Grocery])
            .build(&location());
        let b = QueryBuilder::new(1000)
            .features([FeatureCategory::Grocery, FeatureCategory::Transit])
            .build(&location());
        assert_eq!(a, b);
    }

    #[test]
    fn escapes_quotes() {
        assert_eq!(escape("a\"b"), "a\\\"b");
    }
}
