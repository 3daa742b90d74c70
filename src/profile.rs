use serde_derive::{Deserialize, Serialize};

/// The user's self-reported health profile, sent along with every chat
/// message so the answer can be personalised (age-appropriate guidance,
/// contraindication checks, provider lookups in the user's city).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthProfile {
    pub age: Option<u32>,
    #[serde(default)]
    pub pregnancy: bool,
    #[serde(default)]
    pub diabetes: bool,
    #[serde(default)]
    pub hypertension: bool,
    pub city: Option<String>,
}
