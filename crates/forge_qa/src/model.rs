use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Requirement text
// ---------------------------------------------------------------------------

/// Ordered, non-empty, trimmed lines extracted from one source document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequirementText {
    lines: Vec<String>,
}

impl RequirementText {
    /// Trims every line and drops the empty ones.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            lines: lines
                .into_iter()
                .map(|l| l.as_ref().trim().to_string())
                .filter(|l| !l.is_empty())
                .collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Lines joined with `\n`, the form embedded in the prompt.
    pub fn joined(&self) -> String {
        self.lines.join("\n")
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

/// One test case as returned by the model.
///
/// Every field is optional; missing values render as empty cells. Scalars
/// given as numbers or booleans are kept as their text form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioRecord {
    /// Expected shape `TC-<CATEGORY>-<NNN>`; not validated.
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "titulo", deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Free text such as Alta / Média / Baixa, passed through as-is.
    #[serde(rename = "prioridade", deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(rename = "descricao", deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "passos", deserialize_with = "lenient_steps")]
    pub steps: Vec<String>,
    #[serde(rename = "resultado_esperado", deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub expected_result: Option<String>,
}

impl ScenarioRecord {
    /// Steps as a single cell value, one step per line.
    pub fn steps_text(&self) -> String {
        self.steps.join("\n")
    }
}

/// Parsed test plan for one document.
///
/// Only the three scenario lists feed the workbook; the analysis and metrics
/// blocks are kept verbatim.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentPlan {
    #[serde(rename = "cenarios_funcionais", deserialize_with = "lenient_list")]
    pub functional: Vec<ScenarioRecord>,
    #[serde(rename = "cenarios_negativos", deserialize_with = "lenient_list")]
    pub negative: Vec<ScenarioRecord>,
    #[serde(rename = "cenarios_borda", deserialize_with = "lenient_list")]
    pub boundary: Vec<ScenarioRecord>,
    #[serde(rename = "analise_requisitos", skip_serializing_if = "Option::is_none")]
    pub requirements_analysis: Option<Value>,
    #[serde(rename = "metricas_qualidade", skip_serializing_if = "Option::is_none")]
    pub quality_metrics: Option<Value>,
}

impl DocumentPlan {
    pub fn scenario_count(&self) -> usize {
        self.functional.len() + self.negative.len() + self.boundary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenario_count() == 0
    }
}

// ---------------------------------------------------------------------------
// Lenient field decoding
// ---------------------------------------------------------------------------

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// Accepts a list, a single newline-separated string, or null.
fn lenient_steps<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::String(s) => s
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect(),
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Null => None,
                Value::String(s) => Some(s),
                other => Some(other.to_string()),
            })
            .collect(),
        other => vec![other.to_string()],
    })
}

/// A null scenario list is treated as empty.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<ScenarioRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<ScenarioRecord>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requirement_text_drops_blank_lines() {
        let text = RequirementText::new(["  Primeiro  ", "", "   ", "Segundo"]);
        assert_eq!(text.lines(), ["Primeiro", "Segundo"]);
        assert_eq!(text.joined(), "Primeiro\nSegundo");
        assert_eq!(text.len(), 2);
        assert!(RequirementText::new(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn scenario_with_all_fields() {
        let json = r#"{
            "id": "TC-FUNC-001",
            "titulo": "Login válido",
            "prioridade": "Alta",
            "descricao": "Login com credenciais válidas",
            "passos": ["Abrir tela", "Inserir dados", "Confirmar"],
            "resultado_esperado": "Acesso concedido"
        }"#;
        let s: ScenarioRecord = serde_json::from_str(json).unwrap();
        assert_eq!(s.id.as_deref(), Some("TC-FUNC-001"));
        assert_eq!(s.title.as_deref(), Some("Login válido"));
        assert_eq!(s.priority.as_deref(), Some("Alta"));
        assert_eq!(s.steps_text(), "Abrir tela\nInserir dados\nConfirmar");
        assert_eq!(s.expected_result.as_deref(), Some("Acesso concedido"));
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let s: ScenarioRecord = serde_json::from_str(r#"{"id":"TC-NEG-001"}"#).unwrap();
        assert_eq!(s.id.as_deref(), Some("TC-NEG-001"));
        assert!(s.title.is_none());
        assert!(s.steps.is_empty());
        assert_eq!(s.steps_text(), "");
    }

    #[test]
    fn steps_accept_string_and_null() {
        let s: ScenarioRecord =
            serde_json::from_str(r#"{"passos":"1. Abrir\n2. Fechar\n"}"#).unwrap();
        assert_eq!(s.steps, ["1. Abrir", "2. Fechar"]);

        let s: ScenarioRecord = serde_json::from_str(r#"{"passos":null}"#).unwrap();
        assert!(s.steps.is_empty());

        let s: ScenarioRecord = serde_json::from_str(r#"{"passos":["a", 2, null]}"#).unwrap();
        assert_eq!(s.steps, ["a", "2"]);
    }

    #[test]
    fn scalar_fields_accept_numbers() {
        let s: ScenarioRecord =
            serde_json::from_str(r#"{"id": 7, "prioridade": null, "titulo": true}"#).unwrap();
        assert_eq!(s.id.as_deref(), Some("7"));
        assert!(s.priority.is_none());
        assert_eq!(s.title.as_deref(), Some("true"));
    }

    #[test]
    fn plan_tolerates_missing_and_null_lists() {
        let plan: DocumentPlan = serde_json::from_str(
            r#"{"cenarios_funcionais":[{"id":"TC-FUNC-001"}],"cenarios_negativos":null}"#,
        )
        .unwrap();
        assert_eq!(plan.functional.len(), 1);
        assert!(plan.negative.is_empty());
        assert!(plan.boundary.is_empty());
        assert_eq!(plan.scenario_count(), 1);
    }

    #[test]
    fn plan_keeps_metadata_blocks() {
        let plan: DocumentPlan = serde_json::from_str(
            r#"{"analise_requisitos":{"riscos":["x"],"entidades":[]},"metricas_qualidade":{"total_casos":0},"extra":1}"#,
        )
        .unwrap();
        assert!(plan.is_empty());
        assert_eq!(
            plan.requirements_analysis.unwrap()["riscos"][0],
            serde_json::json!("x")
        );
        assert_eq!(plan.quality_metrics.unwrap()["total_casos"], 0);
    }
}
