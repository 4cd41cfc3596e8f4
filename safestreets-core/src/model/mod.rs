//! Data model for walkability analysis
//!
//! Contains locations, raw map elements, the parsed snapshot and the
//! derived street network.

pub mod elements;
pub mod features;
pub mod location;
pub mod network;
pub mod parsed;
pub mod status;

pub use elements::{CoordinateIndex, MapNode, MapWay, RawMapElement, Tags};
pub use features::{FeatureCategory, MAIN_STREET_CLASSES, STREET_CLASSES, TagFilter, is_street_class};
pub use location::Location;
pub use network::{GraphNode, NetworkGraph};
pub use parsed::ParsedMapData;
pub use status::DataStatus;
