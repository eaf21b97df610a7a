use crate::model::RequirementText;

/// System turn sent with every request.
pub const SYSTEM_INSTRUCTION: &str =
    "Você é um Engenheiro de QA Sênior focado em precisão técnica e JSON estruturado.";

const REQUIREMENTS_PLACEHOLDER: &str = "{requisitos_texto}";

const QA_PROMPT_TEMPLATE: &str = r#"
Aja como um Lead QA Engineer. Analise os requisitos abaixo e gere um Plano de Testes em formato JSON.

### REGRAS DE OUTPUT:
1. Retorne EXCLUSIVAMENTE o objeto JSON.
2. Não utilize blocos de código markdown (```json ... ```).
3. Use a técnica de 'Análise de Valor Limite' e 'Transição de Estados'.
4. IDs: TC-FUNC-NNN, TC-NEG-NNN, TC-SEC-NNN.

### ESTRUTURA DO JSON:
{
  "analise_requisitos": { "riscos": [], "entidades": [] },
  "cenarios_funcionais": [
    {
      "id": "TC-FUNC-001",
      "titulo": "Título Curto",
      "prioridade": "Alta",
      "descricao": "O que o teste faz",
      "passos": ["1...", "2..."],
      "resultado_esperado": "Resultado verificável"
    }
  ],
  "cenarios_negativos": [],
  "cenarios_borda": [],
  "metricas_qualidade": { "total_casos": 0 }
}

### REQUISITOS PARA ANÁLISE:
{requisitos_texto}
"#;

/// Embed the requirement lines into the fixed QA instruction template.
pub fn build_prompt(requirements: &RequirementText) -> String {
    QA_PROMPT_TEMPLATE.replace(REQUIREMENTS_PLACEHOLDER, &requirements.joined())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_requirements_at_the_end() {
        let text = RequirementText::new([
            "O sistema deve permitir login com usuário e senha.",
            "A senha deve ter 8 caracteres.",
        ]);
        let prompt = build_prompt(&text);

        assert!(!prompt.contains(REQUIREMENTS_PLACEHOLDER));
        assert!(prompt.trim_end().ends_with(
            "O sistema deve permitir login com usuário e senha.\nA senha deve ter 8 caracteres."
        ));
    }

    #[test]
    fn prompt_keeps_json_skeleton() {
        let prompt = build_prompt(&RequirementText::new(["x"]));
        assert!(prompt.contains("\"cenarios_funcionais\""));
        assert!(prompt.contains("\"cenarios_negativos\""));
        assert!(prompt.contains("\"cenarios_borda\""));
        assert!(prompt.contains("TC-FUNC-NNN, TC-NEG-NNN, TC-SEC-NNN"));
    }

    #[test]
    fn braces_in_requirements_are_preserved() {
        let prompt = build_prompt(&RequirementText::new(["Campo {nome} obrigatório"]));
        assert!(prompt.contains("Campo {nome} obrigatório"));
    }
}
