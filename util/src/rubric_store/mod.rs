use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::warn;

/// The full rubric/exemplar document for a deployment, loaded once at startup
/// and read-only for the rest of the session. Pipeline stages receive the
/// pieces they need explicitly; nothing reads this through a global.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RubricStore {
    pub app: AppInfo,
    pub rubrics: BTreeMap<String, Rubric>,
    #[serde(default)]
    pub exemplars: BTreeMap<String, ExemplarSet>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppInfo {
    pub title: String,
    #[serde(default)]
    pub disclaimer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rubric {
    pub label: String,
    pub criteria: Vec<Criterion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Criterion {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: String,
    /// Default weight; callers may override per request.
    pub weight: u32,
}

/// Teacher-provided calibration exemplars for a task. Any band may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExemplarSet {
    #[serde(default)]
    pub high: Option<String>,
    #[serde(default)]
    pub mid: Option<String>,
    #[serde(default)]
    pub low: Option<String>,
}

impl RubricStore {
    /// Checks the invariants the rest of the pipeline relies on: at least one
    /// rubric, every rubric has criteria, and criterion ids are unique within
    /// their rubric.
    pub fn validate(&self) -> Result<(), String> {
        if self.rubrics.is_empty() {
            return Err("Rubric store defines no rubrics".to_string());
        }
        for (task_id, rubric) in &self.rubrics {
            if rubric.criteria.is_empty() {
                return Err(format!("Rubric '{task_id}' has no criteria"));
            }
            let mut seen: HashSet<&str> = HashSet::with_capacity(rubric.criteria.len());
            for criterion in &rubric.criteria {
                if criterion.id.trim().is_empty() {
                    return Err(format!("Rubric '{task_id}' has a criterion with an empty id"));
                }
                if !seen.insert(criterion.id.as_str()) {
                    return Err(format!(
                        "Rubric '{task_id}' has duplicate criterion id '{}'",
                        criterion.id
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn rubric(&self, task_id: &str) -> Option<&Rubric> {
        self.rubrics.get(task_id)
    }

    pub fn exemplars(&self, task_id: &str) -> Option<&ExemplarSet> {
        self.exemplars.get(task_id)
    }

    /// Task ids in stable (sorted) order, for host task pickers.
    pub fn task_ids(&self) -> impl Iterator<Item = &str> {
        self.rubrics.keys().map(String::as_str)
    }
}

impl Rubric {
    pub fn criterion(&self, id: &str) -> Option<&Criterion> {
        self.criteria.iter().find(|c| c.id == id)
    }

    pub fn has_criterion(&self, id: &str) -> bool {
        self.criterion(id).is_some()
    }

    /// Display name for a criterion id, falling back to the id itself when the
    /// configured name is blank. Used by presenters rendering a report.
    pub fn criterion_name(&self, id: &str) -> Option<&str> {
        self.criterion(id).map(|c| {
            if c.name.trim().is_empty() {
                c.id.as_str()
            } else {
                c.name.as_str()
            }
        })
    }
}

impl ExemplarSet {
    /// True when no band carries usable text.
    pub fn is_empty(&self) -> bool {
        [&self.high, &self.mid, &self.low]
            .iter()
            .all(|band| band.as_deref().map_or(true, |s| s.trim().is_empty()))
    }
}

/// Read and validate a rubric store document.
pub fn load_rubric_store(path: &Path) -> Result<RubricStore, String> {
    use std::io::ErrorKind;

    let s = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            let msg = match e.kind() {
                ErrorKind::NotFound => "Rubric store file not found".to_string(),
                ErrorKind::PermissionDenied => {
                    "Permission denied reading rubric store".to_string()
                }
                ErrorKind::InvalidData => "Rubric store file is not valid UTF-8".to_string(),
                _ => format!("Failed to read rubric store ({})", e.kind()),
            };
            return Err(msg);
        }
    };

    let store: RubricStore =
        serde_json::from_str(&s).map_err(|e| format!("Invalid rubric store JSON: {e}"))?;

    store.validate()?;

    // Orphan exemplars are tolerated; they just never render.
    for task_id in store.exemplars.keys() {
        if !store.rubrics.contains_key(task_id) {
            warn!(%task_id, "exemplars defined for a task with no rubric");
        }
    }

    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_document() -> &'static str {
        r#"{
            "app": {
                "title": "Rubric Feedback",
                "disclaimer": "AI-generated feedback; review before release."
            },
            "rubrics": {
                "design_journal": {
                    "label": "Design Journal",
                    "criteria": [
                        {"id": "planning", "name": "Planning", "desc": "Clear plan with steps", "weight": 5},
                        {"id": "execution", "name": "Execution", "desc": "Work carried out", "weight": 10},
                        {"id": "reflection", "name": "Reflection", "desc": "What would change", "weight": 5}
                    ]
                }
            },
            "exemplars": {
                "design_journal": {
                    "high": "A thorough journal with dated entries.",
                    "low": "One line, no detail."
                }
            }
        }"#
    }

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(contents.as_bytes()).expect("write temp file");
        file
    }

    #[test]
    fn test_load_valid_store() {
        let file = write_temp(sample_document());
        let store = load_rubric_store(file.path()).expect("should load valid store");

        assert_eq!(store.app.title, "Rubric Feedback");
        let rubric = store.rubric("design_journal").expect("rubric present");
        assert_eq!(rubric.label, "Design Journal");
        assert_eq!(rubric.criteria.len(), 3);
        assert_eq!(rubric.criteria[1].id, "execution");
        assert_eq!(rubric.criteria[1].weight, 10);

        let exemplars = store.exemplars("design_journal").expect("exemplars present");
        assert!(exemplars.high.is_some());
        assert!(exemplars.mid.is_none());
        assert!(!exemplars.is_empty());
    }

    #[test]
    fn test_missing_file_is_short_error() {
        let err = load_rubric_store(Path::new("/nonexistent/rubrics.json")).unwrap_err();
        assert_eq!(err, "Rubric store file not found");
    }

    #[test]
    fn test_invalid_json_rejected() {
        let file = write_temp("not json at all");
        let err = load_rubric_store(file.path()).unwrap_err();
        assert!(err.contains("Invalid rubric store JSON"), "got: {err}");
    }

    #[test]
    fn test_missing_rubrics_key_rejected() {
        let file = write_temp(r#"{"app": {"title": "T"}}"#);
        let err = load_rubric_store(file.path()).unwrap_err();
        assert!(err.contains("Invalid rubric store JSON"), "got: {err}");
    }

    #[test]
    fn test_empty_rubrics_map_rejected() {
        let file = write_temp(r#"{"app": {"title": "T"}, "rubrics": {}}"#);
        let err = load_rubric_store(file.path()).unwrap_err();
        assert!(err.contains("no rubrics"), "got: {err}");
    }

    #[test]
    fn test_empty_criteria_rejected() {
        let file = write_temp(
            r#"{"app": {"title": "T"}, "rubrics": {"t1": {"label": "Task 1", "criteria": []}}}"#,
        );
        let err = load_rubric_store(file.path()).unwrap_err();
        assert!(err.contains("'t1' has no criteria"), "got: {err}");
    }

    #[test]
    fn test_duplicate_criterion_ids_rejected() {
        let file = write_temp(
            r#"{
                "app": {"title": "T"},
                "rubrics": {
                    "t1": {
                        "label": "Task 1",
                        "criteria": [
                            {"id": "planning", "weight": 5},
                            {"id": "planning", "weight": 10}
                        ]
                    }
                }
            }"#,
        );
        let err = load_rubric_store(file.path()).unwrap_err();
        assert!(err.contains("duplicate criterion id 'planning'"), "got: {err}");
    }

    #[test]
    fn test_criterion_missing_weight_rejected() {
        let file = write_temp(
            r#"{
                "app": {"title": "T"},
                "rubrics": {
                    "t1": {"label": "Task 1", "criteria": [{"id": "planning"}]}
                }
            }"#,
        );
        let err = load_rubric_store(file.path()).unwrap_err();
        assert!(err.contains("Invalid rubric store JSON"), "got: {err}");
    }

    #[test]
    fn test_orphan_exemplars_are_tolerated() {
        let file = write_temp(
            r#"{
                "app": {"title": "T"},
                "rubrics": {
                    "t1": {"label": "Task 1", "criteria": [{"id": "planning", "weight": 5}]}
                },
                "exemplars": {
                    "t2": {"high": "Not attached to any rubric."}
                }
            }"#,
        );
        let store = load_rubric_store(file.path()).expect("orphan exemplars should not fail load");
        assert!(store.exemplars("t2").is_some());
        assert!(store.rubric("t2").is_none());
    }

    #[test]
    fn test_criterion_name_falls_back_to_id() {
        let rubric = Rubric {
            label: "Task".to_string(),
            criteria: vec![Criterion {
                id: "planning".to_string(),
                name: String::new(),
                desc: String::new(),
                weight: 5,
            }],
        };
        assert_eq!(rubric.criterion_name("planning"), Some("planning"));
        assert_eq!(rubric.criterion_name("unknown"), None);
    }

    #[test]
    fn test_exemplar_set_blank_bands_are_empty() {
        let set = ExemplarSet {
            high: Some("   ".to_string()),
            mid: None,
            low: None,
        };
        assert!(set.is_empty());
    }
}
