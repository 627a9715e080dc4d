//! Data model for briefing extraction and storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decode::MaybeEncoded;

/// Deadline section of a briefing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prazos {
    /// Final delivery date or period.
    #[serde(default)]
    pub prazo_final: Option<String>,
    /// Intermediate milestones with their deadlines.
    #[serde(default)]
    pub etapas_intermediarias: Vec<String>,
}

/// Budget section of a briefing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Orcamento {
    #[serde(default)]
    pub valor_total: Option<String>,
    #[serde(default)]
    pub descontos: Option<String>,
    #[serde(default)]
    pub valor_final: Option<String>,
}

/// Structured briefing extracted from one conversation.
///
/// Field names are part of the extraction contract: the completion service
/// is instructed to emit exactly this shape, so they must not be renamed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BriefingRecord {
    /// Main goal of the project. Doubles as the preferred title.
    #[serde(default)]
    pub objetivo: String,
    /// Target audience description.
    #[serde(default)]
    pub publico_alvo: String,
    /// References mentioned in the conversation.
    #[serde(default)]
    pub referencias: Vec<String>,
    /// Deadline information. May arrive string-encoded in stored rows.
    #[serde(default)]
    pub prazos: MaybeEncoded<Prazos>,
    /// Budget information. Same tolerance as `prazos`.
    #[serde(default)]
    pub orcamento: MaybeEncoded<Orcamento>,
    /// Notable remarks from the conversation.
    #[serde(default)]
    pub observacoes: Vec<String>,
    /// The conversation the briefing was extracted from. Provenance only;
    /// appended after normalization, never requested from the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texto_original: Option<String>,
    /// Store row id. Present only once the record has been persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl BriefingRecord {
    /// Forces `prazos` and `orcamento` into decoded form.
    ///
    /// Applied at every ingestion point so presentation code never sees a
    /// string-encoded section.
    pub fn resolve_sections(mut self) -> Self {
        self.prazos = MaybeEncoded::Decoded(self.prazos.resolve("prazos"));
        self.orcamento = MaybeEncoded::Decoded(self.orcamento.resolve("orcamento"));
        self
    }
}

/// The `conteudo` column: raw input plus the structured extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeContent {
    #[serde(default)]
    pub input_text: String,
    #[serde(default)]
    pub briefing_result: MaybeEncoded<BriefingRecord>,
}

/// One persisted briefing, fully decoded for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredBriefing {
    pub id: i64,
    pub user_id: Uuid,
    /// Display title, recomputed on every read.
    pub titulo: String,
    pub input_text: String,
    pub briefing_result: BriefingRecord,
    pub created_at: DateTime<Utc>,
}

/// Identity of the caller, established per request by the server and passed
/// by value into every store operation. There is no ambient identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: Uuid,
    pub email: Option<String>,
}

impl UserContext {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_deserializes_from_full_extraction() {
        let record: BriefingRecord = serde_json::from_value(json!({
            "objetivo": "Redesign the company site",
            "publico_alvo": "B2B clients in logistics",
            "referencias": ["competitor.com"],
            "prazos": { "prazo_final": "2025-03-01", "etapas_intermediarias": ["wireframes"] },
            "orcamento": { "valor_total": "R$ 10.000", "descontos": null, "valor_final": "R$ 10.000" },
            "observacoes": ["prefers dark palette"]
        }))
        .unwrap();

        assert_eq!(record.objetivo, "Redesign the company site");
        assert_eq!(record.referencias, vec!["competitor.com".to_string()]);
        let prazos = record.prazos.resolve("prazos");
        assert_eq!(prazos.prazo_final.as_deref(), Some("2025-03-01"));
    }

    #[test]
    fn test_record_tolerates_missing_sections() {
        let record: BriefingRecord = serde_json::from_value(json!({
            "objetivo": "Logo refresh"
        }))
        .unwrap();

        let record = record.resolve_sections();
        assert_eq!(record.prazos, MaybeEncoded::Decoded(Prazos::default()));
        assert_eq!(record.orcamento, MaybeEncoded::Decoded(Orcamento::default()));
    }

    #[test]
    fn test_resolve_sections_decodes_string_encoded_prazos() {
        let record: BriefingRecord = serde_json::from_value(json!({
            "objetivo": "Campaign launch",
            "prazos": "{\"prazo_final\":\"next Friday\",\"etapas_intermediarias\":[]}"
        }))
        .unwrap();

        let record = record.resolve_sections();
        let prazos = match record.prazos {
            MaybeEncoded::Decoded(p) => p,
            other => panic!("expected decoded prazos, got {:?}", other),
        };
        assert_eq!(prazos.prazo_final.as_deref(), Some("next Friday"));
    }

    #[test]
    fn test_unsaved_record_omits_id_and_provenance() {
        let value = serde_json::to_value(BriefingRecord::default()).unwrap();
        let map = value.as_object().unwrap();

        assert!(!map.contains_key("id"));
        assert!(!map.contains_key("texto_original"));
        assert_eq!(map["prazos"], json!({ "prazo_final": null, "etapas_intermediarias": [] }));
    }
}
