//! Directory loader for knowledge-base files.
//!
//! Layout under the base directory:
//! - `knowledge_base/*.md`: static documents, keyed by file stem
//! - `templates/golden_dataset.json`
//! - `templates/validation_checklist.json`

use crate::knowledge_base::KnowledgeBase;
use crate::model::{Template, ValidationChecklist};
use campaign_core::error::{CampaignError, CampaignResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

impl KnowledgeBase {
    /// Load from a directory. Missing files leave that source empty;
    /// files that exist but do not parse are errors. Individual golden-dataset
    /// records that do not fit the template shape are skipped.
    pub fn load_dir(base: impl AsRef<Path>) -> CampaignResult<Self> {
        let base = base.as_ref();

        let static_knowledge = load_documents(&base.join("knowledge_base"))?;
        let dataset_path = base.join("templates").join("golden_dataset.json");
        let golden_dataset = match load_json::<Vec<Value>>(&dataset_path)? {
            Some(records) => templates_from_records(records, &dataset_path.display().to_string()),
            None => Vec::new(),
        };
        let validation_checklist: ValidationChecklist =
            load_json(&base.join("templates").join("validation_checklist.json"))?
                .unwrap_or_default();

        info!(
            base = %base.display(),
            documents = static_knowledge.len(),
            templates = golden_dataset.len(),
            checklist_items = validation_checklist.item_count(),
            "Knowledge base loaded"
        );
        Ok(Self::new(static_knowledge, golden_dataset, validation_checklist))
    }
}

/// Convert golden-dataset records one at a time. A record with an unknown
/// funnel stage, pacing or other shape error is logged and dropped; the
/// remaining templates still load.
pub(crate) fn templates_from_records(records: Vec<Value>, source: &str) -> Vec<Template> {
    let total = records.len();
    let templates: Vec<Template> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let template_id = record
                .get("template_id")
                .and_then(Value::as_str)
                .unwrap_or("<unnamed>")
                .to_string();
            match serde_json::from_value::<Template>(record) {
                Ok(template) => Some(template),
                Err(e) => {
                    warn!(source, index, %template_id, error = %e, "Skipping malformed template");
                    None
                }
            }
        })
        .collect();

    if templates.len() < total {
        metrics::counter!("knowledge.templates_skipped").increment((total - templates.len()) as u64);
    }
    templates
}

fn load_documents(dir: &Path) -> CampaignResult<BTreeMap<String, String>> {
    let mut documents = BTreeMap::new();
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "Static knowledge directory missing");
        return Ok(documents);
    }

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        let Some(topic) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let content = fs::read_to_string(&path)?;
        info!(topic, "Loaded static knowledge");
        documents.insert(topic.to_string(), content);
    }
    Ok(documents)
}

fn load_json<T: DeserializeOwned>(path: &Path) -> CampaignResult<Option<T>> {
    if !path.is_file() {
        warn!(path = %path.display(), "Knowledge file missing");
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| CampaignError::KnowledgeBase(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge_base::BIDDING_GUIDE_TOPIC;

    #[test]
    fn test_load_bundled_data_dir() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
        let kb = KnowledgeBase::load_dir(&dir).unwrap();
        let builtin = KnowledgeBase::builtin().unwrap();

        assert_eq!(kb.templates(), builtin.templates());
        assert_eq!(kb.checklist(), builtin.checklist());
        assert!(kb.document(BIDDING_GUIDE_TOPIC).is_some());
    }

    #[test]
    fn test_missing_files_yield_empty_sources() {
        let dir = tempfile::tempdir().unwrap();
        let kb = KnowledgeBase::load_dir(dir.path()).unwrap();
        assert!(kb.templates().is_empty());
        assert_eq!(kb.checklist().item_count(), 0);
        assert_eq!(kb.topics().count(), 0);
    }

    #[test]
    fn test_only_markdown_documents_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("knowledge_base");
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("guide.md"), "# Guide").unwrap();
        fs::write(docs.join("notes.txt"), "ignored").unwrap();

        let kb = KnowledgeBase::load_dir(dir.path()).unwrap();
        assert_eq!(kb.topics().collect::<Vec<_>>(), vec!["guide"]);
        assert_eq!(kb.document("guide"), Some("# Guide"));
    }

    #[test]
    fn test_bad_template_does_not_drop_good_ones() {
        let dir = tempfile::tempdir().unwrap();
        let templates = dir.path().join("templates");
        fs::create_dir_all(&templates).unwrap();
        let dataset = serde_json::json!([
            {"template_id": "GOOD", "industry": "교육", "funnel_stage": "Conversion"},
            {"template_id": "BAD_STAGE", "industry": "교육", "funnel_stage": "전환"},
            {
                "template_id": "BAD_PACING",
                "industry": "교육",
                "funnel_stage": "Conversion",
                "campaign_structure": {"insertion_orders": [{"pacing": "Front-loaded"}]}
            }
        ]);
        fs::write(templates.join("golden_dataset.json"), dataset.to_string()).unwrap();

        let kb = KnowledgeBase::load_dir(dir.path()).unwrap();
        let ids: Vec<&str> = kb.templates().iter().map(|t| t.template_id.as_str()).collect();
        assert_eq!(ids, vec!["GOOD"]);
    }

    #[test]
    fn test_dataset_that_is_not_a_list_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let templates = dir.path().join("templates");
        fs::create_dir_all(&templates).unwrap();
        fs::write(templates.join("golden_dataset.json"), r#"{"template_id": "X"}"#).unwrap();

        let err = KnowledgeBase::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, CampaignError::KnowledgeBase(_)));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let templates = dir.path().join("templates");
        fs::create_dir_all(&templates).unwrap();
        fs::write(templates.join("golden_dataset.json"), "{ not json").unwrap();

        let err = KnowledgeBase::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, CampaignError::KnowledgeBase(_)));
    }
}
