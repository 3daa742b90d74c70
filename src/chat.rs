//! The chat exchange payloads.
//!
//! The backend answers every message with markdown text plus structured
//! "facts" (red-flag warnings, contraindications, safe self-care actions,
//! provider suggestions, mental-health and pregnancy alerts) and a safety
//! classification. The client passes all of it through unmodified; which
//! panels get rendered is the UI's call.

use serde_derive::{Deserialize, Serialize};
use serde_json::Value;

/// A complete answer from the chat endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ChatReply {
    /// Markdown-formatted assistant reply.
    pub answer: String,
    /// Which retrieval path produced the answer.
    pub route: Route,
    pub facts: Vec<Fact>,
    pub citations: Vec<Citation>,
    pub safety: SafetyReport,
}

/// The retrieval path the backend chose for a message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    /// Knowledge-graph lookup (counts, contraindications, providers).
    Graph,
    /// Vector retrieval over the document corpus.
    Vector,
}

/// One structured fact group attached to an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Fact {
    /// Matched red-flag conditions. The entry shape belongs to the
    /// backend's graph layer, so it is left as raw JSON.
    RedFlags(Vec<Value>),
    Contraindications(Vec<Contraindication>),
    SafeActions(Vec<SafeActionSet>),
    /// Healthcare providers near the user. Shape owned by the graph layer.
    Providers(Vec<Value>),
    MentalHealthCrisis(CrisisGuidance),
    PregnancyAlert(PregnancyGuidance),
    /// Profile-driven notes the answer was personalised with.
    Personalization(Vec<String>),
    /// A fact type this client doesn't know yet. Kept so a newer backend
    /// doesn't break older clients.
    #[serde(other)]
    Unknown,
}

/// Things the user should avoid because of one of their conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contraindication {
    pub condition: String,
    pub avoid: Vec<String>,
}

/// Self-care actions known to be safe for one of the user's conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeActionSet {
    pub condition: String,
    pub actions: Vec<String>,
}

/// Escalation guidance for a detected mental-health crisis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrisisGuidance {
    pub matched: Vec<String>,
    pub actions: Vec<String>,
}

/// Urgent-review messaging for pregnancy-specific emergencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PregnancyGuidance {
    pub matched: Vec<String>,
    pub guidance: Vec<String>,
}

/// Where a piece of the answer came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub source: String,
    pub id: String,
    pub topic: Option<String>,
}

/// The backend's safety classification of the user's message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct SafetyReport {
    /// Symptoms warranting urgent or emergency care were detected.
    pub red_flag: bool,
    /// The phrases that triggered the classification.
    pub matched: Vec<String>,
    pub mental_health: MentalHealthReport,
    pub pregnancy: PregnancyReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentalHealthReport {
    pub crisis: bool,
    pub matched: Vec<String>,
    pub first_aid: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PregnancyReport {
    pub concern: bool,
    pub matched: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_red_flag_reply() {
        let src = include_str!("chat_reply_red_flag.json");

        let got: ChatReply = serde_json::from_str(src).unwrap();

        assert_eq!(got.route, Route::Graph);
        assert!(got.safety.red_flag);
        assert_eq!(
            got.safety.matched,
            vec!["chest pain".to_string(), "cold sweats".to_string()]
        );
        assert_eq!(
            got.facts[0],
            Fact::RedFlags(vec![json!({
                "symptom": "chest pain",
                "advice": "Call 108 or go to the nearest emergency department."
            })])
        );
        assert_eq!(
            got.facts[1],
            Fact::Contraindications(vec![Contraindication {
                condition: String::from("Diabetes"),
                avoid: vec![String::from("sugary drinks")],
            }])
        );
        assert_eq!(
            got.citations,
            vec![Citation {
                source: String::from("cardiac_symptoms.md"),
                id: String::from("chunk-042"),
                topic: Some(String::from("cardiac")),
            }]
        );
    }

    #[test]
    fn parse_plain_reply() {
        let src = include_str!("chat_reply_plain.json");

        let got: ChatReply = serde_json::from_str(src).unwrap();

        assert_eq!(got.route, Route::Vector);
        assert!(!got.safety.red_flag);
        assert_eq!(
            got.facts,
            vec![Fact::Personalization(vec![String::from(
                "User is an older adult (65+). Emphasise monitoring chronic \
                 conditions and the risks of medication interactions."
            )])]
        );
    }

    #[test]
    fn unknown_fact_types_still_parse() {
        let src = json!({
            "answer": "ok",
            "route": "vector",
            "facts": [{"type": "weather_advisory", "data": {"heat": true}}],
            "citations": [],
            "safety": {
                "red_flag": false,
                "matched": [],
                "mental_health": {"crisis": false, "matched": [], "first_aid": []},
                "pregnancy": {"concern": false, "matched": []}
            }
        });

        let got: ChatReply = serde_json::from_value(src).unwrap();

        assert_eq!(got.facts, vec![Fact::Unknown]);
    }
}
