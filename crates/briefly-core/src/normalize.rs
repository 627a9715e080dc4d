//! Turns raw completion output into a structured briefing record.

use crate::error::{BriefingError, Result};
use crate::types::BriefingRecord;

/// Parses the completion output strictly as JSON and shapes it into a
/// [`BriefingRecord`], appending the source conversation as provenance.
///
/// The prompt contract demands pure JSON, so no fence stripping or
/// substring extraction is attempted: prose-wrapped or fenced output fails
/// with [`BriefingError::MalformedCompletion`] carrying the raw text. The
/// top-level value must be a JSON object; arrays and scalars fail the same
/// way. Whether to re-prompt is the caller's decision.
pub fn normalize_completion(raw: &str, conversation: &str) -> Result<BriefingRecord> {
    let malformed = || BriefingError::MalformedCompletion {
        raw: raw.to_string(),
    };

    let value: serde_json::Value = serde_json::from_str(raw).map_err(|_| malformed())?;
    if !value.is_object() {
        return Err(malformed());
    }
    let record: BriefingRecord = serde_json::from_value(value).map_err(|_| malformed())?;

    let mut record = record.resolve_sections();
    record.texto_original = Some(conversation.to_string());
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::MaybeEncoded;
    use crate::types::Prazos;

    const CONVERSATION: &str = "Cliente: preciso de um logo até sexta, orçamento de 500";

    #[test]
    fn test_pure_json_is_accepted() {
        let raw = r#"{"objetivo":"Criar um logo","publico_alvo":"pequenas empresas","referencias":[],"prazos":{"prazo_final":"sexta-feira","etapas_intermediarias":[]},"orcamento":{"valor_total":"500","descontos":null,"valor_final":"500"},"observacoes":[]}"#;

        let record = normalize_completion(raw, CONVERSATION).unwrap();

        assert_eq!(record.objetivo, "Criar um logo");
        assert_eq!(record.publico_alvo, "pequenas empresas");
        assert_eq!(record.texto_original.as_deref(), Some(CONVERSATION));
    }

    #[test]
    fn test_missing_optional_sections_are_tolerated() {
        let raw = r#"{"objetivo":"Criar um logo","publico_alvo":"pequenas empresas"}"#;

        let record = normalize_completion(raw, CONVERSATION).unwrap();

        assert_eq!(record.prazos, MaybeEncoded::Decoded(Prazos::default()));
        assert!(record.observacoes.is_empty());
    }

    #[test]
    fn test_fenced_output_is_rejected_with_raw_preserved() {
        let raw = "```json\n{\"objetivo\":\"Criar um logo\"}\n```";

        match normalize_completion(raw, CONVERSATION) {
            Err(BriefingError::MalformedCompletion { raw: kept }) => assert_eq!(kept, raw),
            other => panic!("expected MalformedCompletion, got {:?}", other),
        }
    }

    #[test]
    fn test_prose_wrapped_output_is_rejected() {
        let raw = "Aqui está o briefing solicitado: {\"objetivo\":\"Criar um logo\"}";

        assert!(matches!(
            normalize_completion(raw, CONVERSATION),
            Err(BriefingError::MalformedCompletion { .. })
        ));
    }

    #[test]
    fn test_non_object_json_is_rejected() {
        assert!(matches!(
            normalize_completion("[1, 2, 3]", CONVERSATION),
            Err(BriefingError::MalformedCompletion { .. })
        ));
        assert!(matches!(
            normalize_completion("\"apenas texto\"", CONVERSATION),
            Err(BriefingError::MalformedCompletion { .. })
        ));
    }

    #[test]
    fn test_empty_array_is_rejected() {
        // Every record field has a default, so a bare `[]` would otherwise
        // shape into an all-empty record instead of an error.
        assert!(matches!(
            normalize_completion("[]", CONVERSATION),
            Err(BriefingError::MalformedCompletion { .. })
        ));
    }

    #[test]
    fn test_string_array_is_not_read_as_positional_fields() {
        let raw = r#"["Criar um logo", "pequenas empresas"]"#;

        assert!(matches!(
            normalize_completion(raw, CONVERSATION),
            Err(BriefingError::MalformedCompletion { .. })
        ));
    }

    #[test]
    fn test_wrong_typed_field_is_rejected() {
        let raw = r#"{"objetivo":"Criar um logo","referencias":"não é uma lista"}"#;

        assert!(matches!(
            normalize_completion(raw, CONVERSATION),
            Err(BriefingError::MalformedCompletion { .. })
        ));
    }

    #[test]
    fn test_string_encoded_section_is_resolved() {
        let raw = r#"{"objetivo":"Criar um logo","prazos":"{\"prazo_final\":\"sexta\",\"etapas_intermediarias\":[]}"}"#;

        let record = normalize_completion(raw, CONVERSATION).unwrap();

        let prazos = record.prazos.resolve("prazos");
        assert_eq!(prazos.prazo_final.as_deref(), Some("sexta"));
    }

    #[test]
    fn test_provenance_never_reaches_the_model_contract() {
        // texto_original is appended after parsing, so a model that echoes
        // it back must not confuse the normalizer.
        let raw = r#"{"objetivo":"Criar um logo","texto_original":"eco do modelo"}"#;

        let record = normalize_completion(raw, CONVERSATION).unwrap();

        assert_eq!(record.texto_original.as_deref(), Some(CONVERSATION));
    }
}
