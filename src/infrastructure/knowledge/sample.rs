use crate::application::prompt::Institution;
use crate::domain::error::DomainError;
use std::path::Path;
use tracing::info;

/// Starter knowledge base: `(question, answer, department, keywords)`.
const SAMPLE_ROWS: &[(&str, &str, &str, &str)] = &[
    (
        "What are the admission requirements?",
        "Admission requires 75% in 12th with PCM. Entrance exam may apply.",
        "Admissions",
        "admission,requirements",
    ),
    (
        "Where is the campus located?",
        "Our campus is at Salbari, Sukna, Siliguri, West Bengal",
        "General",
        "location,address",
    ),
    (
        "What engineering programs do you offer?",
        "We offer B.Tech in CSE, ECE, ME, CE, and EE",
        "Academics",
        "courses,programs",
    ),
    (
        "How do I apply for scholarships?",
        "Submit scholarship form by Aug 31 with income certificate",
        "Financial Aid",
        "scholarship,financial",
    ),
    (
        "What hostel facilities are available?",
        "AC/non-AC rooms, WiFi, mess, laundry, 24/7 security",
        "Hostel",
        "accommodation,stay",
    ),
    (
        "Do you offer MCA?",
        "We focus on engineering programs: B.Tech & M.Tech",
        "Academics",
        "mca,programs",
    ),
    (
        "Placement statistics?",
        "80-85% placement rate, avg package ₹4.5L, highest ₹18L",
        "Placements",
        "stats,numbers",
    ),
];

/// Write the starter knowledge base to `path`. Refuses to overwrite an existing file.
pub fn write_sample(path: &Path, institution: &Institution) -> Result<usize, DomainError> {
    if path.exists() {
        return Err(DomainError::InvalidInput(format!(
            "{} already exists; not overwriting",
            path.display()
        )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let to_err = |e: csv::Error| DomainError::KnowledgeStore(format!("cannot write {}: {e}", path.display()));
    let mut writer = csv::Writer::from_path(path).map_err(to_err)?;
    writer
        .write_record(["question", "answer", "department", "keywords"])
        .map_err(to_err)?;
    for (question, answer, department, keywords) in SAMPLE_ROWS {
        writer
            .write_record([*question, *answer, *department, *keywords])
            .map_err(to_err)?;
    }

    let contact = format!("Contact: {} | Website: {}", institution.contact, institution.website);
    writer
        .write_record(["Contact information?", contact.as_str(), "General", "contact,info"])
        .map_err(to_err)?;
    writer.flush()?;

    let written = SAMPLE_ROWS.len() + 1;
    info!(path = %path.display(), rows = written, "Wrote sample knowledge base");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::knowledge::csv_store::CsvKnowledgeStore;
    use crate::domain::ports::knowledge_source::KnowledgeSource;

    #[test]
    fn test_sample_round_trips_through_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("college_knowledge.csv");
        let written = write_sample(&path, &Institution::default()).unwrap();

        let records = CsvKnowledgeStore::new(&path).load_records().unwrap();
        assert_eq!(records.len(), written);
        assert_eq!(records[6].metadata["department"], "Placements");
        assert!(records[7].text.contains("sittech.ac.in"));

        assert!(write_sample(&path, &Institution::default()).is_err());
    }
}
