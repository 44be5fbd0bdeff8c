use crate::domain::entities::knowledge_row::KnowledgeRow;
use std::fmt::Write;

/// Who the assistant speaks for. Used in prompts and canned replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Institution {
    pub name: String,
    pub contact: String,
    pub website: String,
}

impl Default for Institution {
    fn default() -> Self {
        Self {
            name: "Siliguri Institute of Technology".into(),
            contact: "+91-9876543210 | info@sittech.edu.in".into(),
            website: "sittech.ac.in".into(),
        }
    }
}

impl Institution {
    pub fn cannot_answer(&self) -> String {
        format!("Please contact: {}", self.contact)
    }

    pub fn ask_for_question(&self) -> String {
        format!("Please ask a question about {}!", self.name)
    }
}

/// Fallback prompt: the question plus whatever retrieved rows we have, so the
/// model can ground its reply even when no row was close enough to trust.
pub fn fallback_prompt(institution: &Institution, query: &str, context: &[KnowledgeRow]) -> String {
    let mut prompt = format!(
        "You are the assistant for {}. Answer the question briefly and accurately.\n",
        institution.name
    );

    if !context.is_empty() {
        prompt.push_str(
            "Use the reference information below when it is relevant; do not invent facts that contradict it.\n\nReference information:\n",
        );
        for (i, row) in context.iter().enumerate() {
            let _ = match row.topic() {
                Some(topic) => writeln!(prompt, "{}. [{}] {}", i + 1, topic, row.text),
                None => writeln!(prompt, "{}. {}", i + 1, row.text),
            };
        }
    }

    let _ = write!(
        prompt,
        "\nIf you are unsure, suggest contacting {} or visiting {}.\n\nQuestion: {}\nAnswer:",
        institution.contact,
        institution.website,
        query.trim()
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_prompt_without_context() {
        let p = fallback_prompt(&Institution::default(), " What is the capital of France? ", &[]);
        assert!(p.contains("Siliguri Institute of Technology"));
        assert!(p.contains("Question: What is the capital of France?\nAnswer:"));
        assert!(!p.contains("Reference information"));
    }

    #[test]
    fn test_prompt_lists_context_rows_with_topic() {
        let mut metadata = BTreeMap::new();
        metadata.insert("department".to_string(), "Hostel".to_string());
        let rows = vec![
            KnowledgeRow { id: 4, text: "AC rooms with WiFi".into(), metadata },
            KnowledgeRow { id: 1, text: "Mess open 24/7".into(), metadata: BTreeMap::new() },
        ];
        let p = fallback_prompt(&Institution::default(), "hostel?", &rows);
        assert!(p.contains("1. [Hostel] AC rooms with WiFi\n"));
        assert!(p.contains("2. Mess open 24/7\n"));
    }
}
