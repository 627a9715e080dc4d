//! Prompt contract for the extraction call.

/// System instruction sent with every extraction request.
///
/// Fixed wording. It names the exact field structure of
/// [`BriefingRecord`](crate::types::BriefingRecord) and forbids markdown
/// fences, which is what lets the normalizer parse strictly.
pub const EXTRACTION_SYSTEM_PROMPT: &str = r#"Você é um assistente especializado em criar briefings estruturados a partir de conversas.

Analise cuidadosamente a conversa e extraia as informações relevantes para preencher o briefing.
Preencha TODOS os campos do briefing com informações específicas e detalhadas.
NUNCA deixe campos vazios ou com valores genéricos.

Estrutura do briefing:
- objetivo: O objetivo principal do projeto (obrigatório)
- publico_alvo: Descrição detalhada do público-alvo (obrigatório)
- referencias: Lista de referências mencionadas na conversa
- prazos: Informações sobre prazos
  - prazo_final: Data ou período para entrega final
  - etapas_intermediarias: Lista de etapas intermediárias com prazos
- orcamento: Informações financeiras
  - valor_total: Valor total do projeto
  - descontos: Valor dos descontos aplicados
  - valor_final: Valor final após descontos
- observacoes: Lista de observações importantes mencionadas na conversa

Retorne apenas o JSON puro, sem marcadores de código markdown.
Se alguma informação não estiver disponível na conversa, use valores realistas baseados no contexto."#;

/// Two-message instruction set for one completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Builds the extraction prompt for one conversation transcript.
///
/// Pure construction: the system message is fixed, the user message is the
/// transcript verbatim. No truncation or sanitization happens here.
pub fn build_prompt(conversation: &str) -> Prompt {
    Prompt {
        system: EXTRACTION_SYSTEM_PROMPT.to_string(),
        user: conversation.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_is_transcript_verbatim() {
        let conversation = "Cliente: preciso de um logo\nAgência: qual o prazo?";
        let prompt = build_prompt(conversation);

        assert_eq!(prompt.user, conversation);
        assert_eq!(prompt.system, EXTRACTION_SYSTEM_PROMPT);
    }

    #[test]
    fn test_system_message_names_every_record_field() {
        for field in [
            "objetivo",
            "publico_alvo",
            "referencias",
            "prazos",
            "prazo_final",
            "etapas_intermediarias",
            "orcamento",
            "valor_total",
            "descontos",
            "valor_final",
            "observacoes",
        ] {
            assert!(
                EXTRACTION_SYSTEM_PROMPT.contains(field),
                "system prompt does not mention {}",
                field
            );
        }
    }

    #[test]
    fn test_system_message_forbids_markdown_fences() {
        assert!(EXTRACTION_SYSTEM_PROMPT.contains("JSON puro"));
        assert!(EXTRACTION_SYSTEM_PROMPT.contains("sem marcadores de código markdown"));
    }
}
