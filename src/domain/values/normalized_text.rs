use std::fmt;

/// Words folded onto one canonical term before embedding, so that
/// "courses", "programs" and "degree" all land near the same rows.
const SYNONYMS: &[(&[&str], &str)] = &[
    (&["course", "courses", "program", "programs", "degree", "degrees"], "programs"),
    (&["admission", "admissions", "apply", "application"], "admission"),
    (&["hostel", "dorm", "accommodation", "stay"], "hostel"),
    (&["placement", "placements", "job", "jobs", "recruitment"], "placement"),
    (&["contact", "phone", "email", "address"], "contact"),
];

const GREETINGS: &[&str] = &["hi", "hello", "hey", "hlw", "hii", "greeting", "greetings"];

/// Text in the canonical form fed to the embedding model.
///
/// Lowercased, punctuation removed, whitespace collapsed and synonyms folded.
/// Index build and query time go through the same function, so identical
/// input always yields an identical embedding input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn new(raw: &str) -> Self {
        let lowered = raw.to_lowercase();
        let stripped: String = lowered
            .chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_')
            .collect();

        let words: Vec<&str> = stripped
            .split_whitespace()
            .map(|w| canonical(w).unwrap_or(w))
            .collect();

        NormalizedText(words.join(" "))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when any word is a greeting ("hi", "hello", ...).
    pub fn is_greeting(&self) -> bool {
        self.0.split(' ').any(|w| GREETINGS.contains(&w))
    }
}

fn canonical(word: &str) -> Option<&'static str> {
    SYNONYMS
        .iter()
        .find(|(variants, _)| variants.contains(&word))
        .map(|(_, canonical)| *canonical)
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
