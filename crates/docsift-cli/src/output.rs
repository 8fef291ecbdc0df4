use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use docsift_core::{CollectionAnalysis, RankedSection, SubsectionAnalysis};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Input JSON for one collection run.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionInput {
    pub persona: Persona,
    pub job_to_be_done: JobToBeDone,
    pub documents: Vec<DocumentRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Persona {
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobToBeDone {
    pub task: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentRef {
    pub filename: String,
}

/// Output JSON persisted next to the collection input.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub metadata: ReportMetadata,
    pub extracted_sections: Vec<RankedSection>,
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub input_documents: Vec<String>,
    pub persona: String,
    pub job_to_be_done: String,
    pub processing_timestamp: String,
}

/// Read and parse the collection input file.
pub fn load_input(path: &Path) -> anyhow::Result<CollectionInput> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {}", path.display(), e))
}

/// Assemble the output report for one finished run.
pub fn build_report(input: &CollectionInput, analysis: CollectionAnalysis) -> AnalysisReport {
    AnalysisReport {
        metadata: ReportMetadata {
            input_documents: input.documents.iter().map(|d| d.filename.clone()).collect(),
            persona: input.persona.role.clone(),
            job_to_be_done: input.job_to_be_done.task.clone(),
            processing_timestamp: chrono::Local::now().to_rfc3339(),
        },
        extracted_sections: analysis.extracted_sections,
        subsection_analysis: analysis.subsection_analysis,
    }
}

/// Write the report as pretty-printed JSON.
pub fn write_report(path: &Path, report: &AnalysisReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {}", path.display(), e))?;
    Ok(())
}

/// Print the post-run summary.
pub fn print_summary(
    w: &mut dyn Write,
    report: &AnalysisReport,
    documents: usize,
    elapsed_secs: f64,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w)?;
    if color.enabled() {
        writeln!(
            w,
            "{} {} documents in {:.2}s",
            "Processed".green(),
            documents,
            elapsed_secs
        )?;
    } else {
        writeln!(w, "Processed {} documents in {:.2}s", documents, elapsed_secs)?;
    }
    writeln!(
        w,
        "  Ranked sections: {}",
        report.extracted_sections.len()
    )?;
    writeln!(
        w,
        "  Refined subsections: {}",
        report.subsection_analysis.len()
    )?;

    for section in &report.extracted_sections {
        let line = format!(
            "  #{} {} (p.{}, {})",
            section.importance_rank, section.section_title, section.page_number, section.document
        );
        if color.enabled() {
            writeln!(w, "{}", line.dimmed())?;
        } else {
            writeln!(w, "{}", line)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_collection_input() {
        let json = r#"{
            "persona": { "role": "Travel Planner" },
            "job_to_be_done": { "task": "Plan a 4-day trip" },
            "documents": [ { "filename": "south-of-france.pdf" } ]
        }"#;
        let input: CollectionInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.persona.role, "Travel Planner");
        assert_eq!(input.job_to_be_done.task, "Plan a 4-day trip");
        assert_eq!(input.documents.len(), 1);
        assert_eq!(input.documents[0].filename, "south-of-france.pdf");
    }

    #[test]
    fn report_serializes_with_expected_field_names() {
        let input: CollectionInput = serde_json::from_str(
            r#"{
                "persona": { "role": "Analyst" },
                "job_to_be_done": { "task": "Summarize revenue drivers" },
                "documents": [ { "filename": "q3.pdf" } ]
            }"#,
        )
        .unwrap();
        let analysis = CollectionAnalysis {
            extracted_sections: vec![RankedSection {
                document: "q3.pdf".to_string(),
                section_title: "Revenue".to_string(),
                importance_rank: 1,
                page_number: 2,
            }],
            subsection_analysis: vec![SubsectionAnalysis {
                document: "q3.pdf".to_string(),
                refined_text: "line one\nline two".to_string(),
                page_number: 2,
            }],
        };

        let report = build_report(&input, analysis);
        let value: serde_json::Value = serde_json::from_str(
            &serde_json::to_string(&report).unwrap(),
        )
        .unwrap();

        assert_eq!(value["metadata"]["persona"], "Analyst");
        assert_eq!(value["metadata"]["input_documents"][0], "q3.pdf");
        assert!(value["metadata"]["processing_timestamp"].is_string());
        assert_eq!(value["extracted_sections"][0]["section_title"], "Revenue");
        assert_eq!(value["extracted_sections"][0]["importance_rank"], 1);
        assert_eq!(value["extracted_sections"][0]["page_number"], 2);
        assert_eq!(
            value["subsection_analysis"][0]["refined_text"],
            "line one\nline two"
        );
    }

    #[test]
    fn write_report_round_trips_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.json");
        let input: CollectionInput = serde_json::from_str(
            r#"{
                "persona": { "role": "Analyst" },
                "job_to_be_done": { "task": "t" },
                "documents": []
            }"#,
        )
        .unwrap();
        let report = build_report(&input, CollectionAnalysis::default());
        write_report(&path, &report).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(value["extracted_sections"].as_array().unwrap().is_empty());
    }
}
