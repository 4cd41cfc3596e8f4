//! Closed set of recognized feature categories and their tag predicates.
//!
//! The same filters drive query generation and element matching.

use serde::{Deserialize, Serialize};

use super::elements::{RawMapElement, Tags};

/// Highway classes that make up the street network
pub const STREET_CLASSES: &[&str] = &[
    "primary",
    "secondary",
    "tertiary",
    "residential",
    "living_street",
    "pedestrian",
    "unclassified",
    "service",
];

/// Street classes whose unlit stretches are reported as dark spots
pub const MAIN_STREET_CLASSES: &[&str] = &["primary", "secondary", "tertiary"];

/// One tag predicate: key present (no values), or key equal to any value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagFilter {
    pub key: &'static str,
    pub values: &'static [&'static str],
}

impl TagFilter {
    const fn any(key: &'static str) -> Self {
        Self { key, values: &[] }
    }

    const fn one_of(key: &'static str, values: &'static [&'static str]) -> Self {
        Self { key, values }
    }

    pub fn matches(&self, tags: &Tags) -> bool {
        match tags.get(self.key) {
            Some(value) => self.values.is_empty() || self.values.contains(&value.as_str()),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureCategory {
    Grocery,
    Healthcare,
    Education,
    Recreation,
    Transit,
    Dining,
    Street,
    Crossing,
    Sidewalk,
    StreetLamp,
    Building,
    Accessibility,
    Steps,
    Commerce,
}

impl FeatureCategory {
    /// Tag predicates; an element belongs to the category if any matches
    pub fn filters(self) -> &'static [TagFilter] {
        const GROCERY: &[TagFilter] = &[TagFilter::one_of(
            "shop",
            &["supermarket", "grocery", "convenience", "greengrocer"],
        )];
        const HEALTHCARE: &[TagFilter] = &[
            TagFilter::one_of(
                "amenity",
                &["pharmacy", "clinic", "doctors", "hospital", "dentist"],
            ),
            TagFilter::any("healthcare"),
        ];
        const EDUCATION: &[TagFilter] = &[TagFilter::one_of(
            "amenity",
            &["school", "kindergarten", "college", "university", "library"],
        )];
        const RECREATION: &[TagFilter] = &[TagFilter::one_of(
            "leisure",
            &[
                "park",
                "playground",
                "sports_centre",
                "fitness_centre",
                "garden",
                "pitch",
            ],
        )];
        const TRANSIT: &[TagFilter] = &[
            TagFilter::one_of("highway", &["bus_stop"]),
            TagFilter::one_of("public_transport", &["platform", "stop_position", "station"]),
            TagFilter::one_of(
                "railway",
                &["station", "halt", "tram_stop", "subway_entrance"],
            ),
            TagFilter::one_of("amenity", &["ferry_terminal"]),
        ];
        const DINING: &[TagFilter] = &[TagFilter::one_of(
            "amenity",
            &["restaurant", "cafe", "fast_food", "bar", "pub"],
        )];
        const STREET: &[TagFilter] = &[TagFilter::one_of("highway", STREET_CLASSES)];
        const CROSSING: &[TagFilter] = &[
            TagFilter::one_of("highway", &["crossing"]),
            TagFilter::one_of("footway", &["crossing"]),
            TagFilter::any("crossing"),
        ];
        const SIDEWALK: &[TagFilter] = &[
            TagFilter::one_of("footway", &["sidewalk"]),
            TagFilter::any("sidewalk"),
            TagFilter::one_of("highway", &["footway"]),
        ];
        const STREET_LAMP: &[TagFilter] = &[TagFilter::one_of("highway", &["street_lamp"])];
        const BUILDING: &[TagFilter] = &[TagFilter::any("building")];
        const ACCESSIBILITY: &[TagFilter] = &[
            TagFilter::any("wheelchair"),
            TagFilter::one_of("kerb", &["lowered", "flush"]),
            TagFilter::one_of("tactile_paving", &["yes"]),
            TagFilter::one_of("highway", &["elevator"]),
        ];
        const STEPS: &[TagFilter] = &[TagFilter::one_of("highway", &["steps"])];
        const COMMERCE: &[TagFilter] = &[
            TagFilter::any("shop"),
            TagFilter::any("office"),
            TagFilter::any("craft"),
            TagFilter::one_of(
                "amenity",
                &[
                    "restaurant",
                    "cafe",
                    "fast_food",
                    "bar",
                    "pub",
                    "bank",
                    "post_office",
                    "pharmacy",
                ],
            ),
            TagFilter::one_of("tourism", &["hotel", "guest_house", "hostel"]),
        ];

        match self {
            Self::Grocery => GROCERY,
            Self::Healthcare => HEALTHCARE,
            Self::Education => EDUCATION,
            Self::Recreation => RECREATION,
            Self::Transit => TRANSIT,
            Self::Dining => DINING,
            Self::Street => STREET,
            Self::Crossing => CROSSING,
            Self::Sidewalk => SIDEWALK,
            Self::StreetLamp => STREET_LAMP,
            Self::Building => BUILDING,
            Self::Accessibility => ACCESSIBILITY,
            Self::Steps => STEPS,
            Self::Commerce => COMMERCE,
        }
    }

    /// Categories commonly mapped as multipolygon relations
    pub fn includes_relations(self) -> bool {
        matches!(self, Self::Recreation | Self::Education | Self::Healthcare)
    }

    pub fn matches_tags(self, tags: &Tags) -> bool {
        self.filters().iter().any(|filter| filter.matches(tags))
    }

    pub fn matches(self, element: &RawMapElement) -> bool {
        self.matches_tags(element.tags())
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Grocery => "grocery",
            Self::Healthcare => "healthcare",
            Self::Education => "education",
            Self::Recreation => "recreation",
            Self::Transit => "transit",
            Self::Dining => "dining",
            Self::Street => "street",
            Self::Crossing => "crossing",
            Self::Sidewalk => "sidewalk",
            Self::StreetLamp => "street lamp",
            Self::Building => "building",
            Self::Accessibility => "accessibility",
            Self::Steps => "steps",
            Self::Commerce => "commerce",
        }
    }
}

/// `true` if the `highway` value belongs to the street network
pub fn is_street_class(highway: &str) -> bool {
    STREET_CLASSES.contains(&highway)
}
