use serde::Serialize;

/// Whether a result reflects fetched data or is a stand-in for a failure.
///
/// A `Measured` zero means nothing was found nearby; a `Degraded` zero means
/// the data could not be retrieved.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum DataStatus {
    #[default]
    Measured,
    Degraded {
        reason: String,
    },
}

impl DataStatus {
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self::Degraded {
            reason: reason.into(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}
