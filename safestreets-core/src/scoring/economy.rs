//! Local economy: business mix, independents versus chains

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{DomainOutcome, DomainScorer, clamp_score, percent};
use crate::model::{DataStatus, FeatureCategory, Location, ParsedMapData, RawMapElement};

const FEATURES: &[FeatureCategory] = &[FeatureCategory::Commerce];

const FOOD_AND_DRINK: &[&str] = &["restaurant", "cafe", "fast_food", "bar", "pub"];
const SERVICES: &[&str] = &["bank", "post_office", "pharmacy"];
const HOSPITALITY: &[&str] = &["hotel", "guest_house", "hostel"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BusinessCategory {
    Retail,
    FoodAndDrink,
    Services,
    Professional,
    Craft,
    Hospitality,
}

impl BusinessCategory {
    pub fn classify(element: &RawMapElement) -> Option<Self> {
        let amenity = element.tag("amenity");
        if amenity.is_some_and(|v| FOOD_AND_DRINK.contains(&v)) {
            Some(Self::FoodAndDrink)
        } else if amenity.is_some_and(|v| SERVICES.contains(&v)) {
            Some(Self::Services)
        } else if element.tag("tourism").is_some_and(|v| HOSPITALITY.contains(&v)) {
            Some(Self::Hospitality)
        } else if element.has_tag("shop") {
            Some(Self::Retail)
        } else if element.has_tag("office") {
            Some(Self::Professional)
        } else if element.has_tag("craft") {
            Some(Self::Craft)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EconomicVitality {
    Thriving,
    Active,
    Developing,
    Limited,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyParams {
    pub points_per_business: f64,
    pub max_business_points: f64,
    pub points_per_category: f64,
    pub max_category_points: f64,
    /// Points for an all-independent business base
    pub independent_points: f64,
}

impl Default for EconomyParams {
    fn default() -> Self {
        Self {
            points_per_business: 2.0,
            max_business_points: 40.0,
            points_per_category: 5.0,
            max_category_points: 30.0,
            independent_points: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalEconomyProfile {
    pub business_count: usize,
    pub categories: BTreeMap<BusinessCategory, usize>,
    pub independent_count: usize,
    pub chain_count: usize,
    pub independent_percent: f64,
    /// Number of business categories present
    pub diversity: usize,
    pub score: f64,
    pub vitality: EconomicVitality,
    pub status: DataStatus,
    pub findings: Vec<String>,
    pub recommendations: Vec<String>,
}

impl DomainOutcome for LocalEconomyProfile {
    fn score(&self) -> f64 {
        self.score
    }

    fn status(&self) -> &DataStatus {
        &self.status
    }
}

/// A `brand` or `brand:wikidata` tag marks a chain outlet
pub fn is_chain(element: &RawMapElement) -> bool {
    element.has_tag("brand") || element.has_tag("brand:wikidata")
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EconomyScorer {
    params: EconomyParams,
}

impl EconomyScorer {
    pub fn new(params: EconomyParams) -> Self {
        Self { params }
    }
}

impl DomainScorer for EconomyScorer {
    type Output = LocalEconomyProfile;

    const NAME: &'static str = "local economy";

    fn features(&self) -> &'static [FeatureCategory] {
        FEATURES
    }

    #[allow(clippy::cast_precision_loss)]
    fn score(&self, _location: &Location, data: &ParsedMapData) -> LocalEconomyProfile {
        let params = &self.params;

        let mut categories: BTreeMap<BusinessCategory, usize> = BTreeMap::new();
        let mut chain_count = 0;
        for element in &data.pois {
            let Some(category) = BusinessCategory::classify(element) else {
                continue;
            };
            *categories.entry(category).or_default() += 1;
            if is_chain(element) {
                chain_count += 1;
            }
        }

        let business_count: usize = categories.values().sum();
        let independent_count = business_count - chain_count;
        let independent_percent = percent(independent_count, business_count);
        let diversity = categories.len();

        let score = clamp_score(
            (business_count as f64 * params.points_per_business).min(params.max_business_points)
                + (diversity as f64 * params.points_per_category).min(params.max_category_points)
                + independent_percent / 100.0 * params.independent_points,
        );
        let vitality = if business_count == 0 {
            EconomicVitality::None
        } else if score >= 75.0 {
            EconomicVitality::Thriving
        } else if score >= 50.0 {
            EconomicVitality::Active
        } else if score >= 25.0 {
            EconomicVitality::Developing
        } else {
            EconomicVitality::Limited
        };

        let mut findings = Vec::new();
        let mut recommendations = Vec::new();
        if business_count == 0 {
            findings.push("No businesses found within the analysis area".to_string());
            recommendations
                .push("Zone for neighborhood retail to bring daily errands within reach".to_string());
        } else {
            findings.push(format!(
                "{business_count} businesses across {diversity} categories"
            ));
            findings.push(format!(
                "{independent_count} independent and {chain_count} chain outlets ({independent_percent:.0}% independent)"
            ));
            if diversity < 3 {
                recommendations.push("Attract a broader mix of businesses".to_string());
            }
            if independent_percent < 50.0 {
                recommendations.push("Support independent local businesses".to_string());
            }
        }

        LocalEconomyProfile {
            business_count,
            categories,
            independent_count,
            chain_count,
            independent_percent,
            diversity,
            score,
            vitality,
            status: DataStatus::Measured,
            findings,
            recommendations,
        }
    }

    fn degraded(&self, reason: &str) -> LocalEconomyProfile {
        LocalEconomyProfile {
            business_count: 0,
            categories: BTreeMap::new(),
            independent_count: 0,
            chain_count: 0,
            independent_percent: 0.0,
            diversity: 0,
            score: 0.0,
            vitality: EconomicVitality::None,
            status: DataStatus::degraded(reason),
            findings: vec![format!("Business data unavailable: {reason}")],
            recommendations: Vec::new(),
        }
    }
}
