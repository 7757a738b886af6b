//! Integration tests for guideline loading and evaluation
//!
//! These tests drive the public API end to end using the bundled sample
//! guidelines and small inline documents.

use guideline_rs::engine::{DecisionEngine, EngineOptions, PatientInputs};
use guideline_rs::guideline::{validate, GuidelineLoader, Issue, NiceNodeType};
use guideline_rs::{
    evaluate, summarize_inputs, EngineError, Guideline, GuidelineDocument, GuidelineFormat,
};
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::path::PathBuf;

// ============================================================================
// Fixtures
// ============================================================================

static SAMPLES_DIR: Lazy<PathBuf> =
    Lazy::new(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("guidelines"));

static TRIAGE: Lazy<Value> = Lazy::new(|| {
    json!({
        "guideline_id": "bp-triage",
        "name": "Blood pressure triage",
        "version": "1.0",
        "inputs": [
            {"id": "bp", "label": "Blood Pressure", "type": "number", "unit": "mmHg"},
            {"id": "age", "label": "Age", "type": "number"}
        ],
        "nodes": [
            {
                "id": "root",
                "if": "bp >= 180",
                "then_action": {"level": "urgent", "text": "Treat now"},
                "else": "n2",
                "notes": [{"if": "age >= 65", "text": "Consider age-related dosing"}]
            },
            {"id": "n2", "then_action": {"level": "advice", "text": "Routine follow-up"}}
        ]
    })
});

fn triage() -> Guideline {
    serde_json::from_value(TRIAGE.clone()).unwrap()
}

fn inputs(value: Value) -> PatientInputs {
    serde_json::from_value(value).unwrap()
}

// ============================================================================
// Evaluation
// ============================================================================

#[test]
fn test_urgent_branch_stops_at_root() {
    let result = evaluate(&triage(), &inputs(json!({"bp": 190}))).unwrap();
    assert_eq!(result.action.text, "Treat now");
    assert_eq!(result.path, vec!["root"]);
    assert!(result.notes.is_empty());
}

#[test]
fn test_else_branch_reaches_unconditional_node() {
    let result = evaluate(&triage(), &inputs(json!({"bp": 120}))).unwrap();
    assert_eq!(result.action.text, "Routine follow-up");
    assert_eq!(result.path, vec!["root", "n2"]);
    assert_eq!(result.path_display(), "root → n2");
}

#[test]
fn test_notes_follow_inputs() {
    let older = evaluate(&triage(), &inputs(json!({"bp": 190, "age": 70}))).unwrap();
    assert_eq!(older.notes, vec!["Consider age-related dosing"]);

    let younger = evaluate(&triage(), &inputs(json!({"bp": 190, "age": 40}))).unwrap();
    assert!(younger.notes.is_empty());
}

#[test]
fn test_missing_input_takes_else_branch() {
    let result = evaluate(&triage(), &PatientInputs::new()).unwrap();
    assert_eq!(result.path, vec!["root", "n2"]);
}

#[test]
fn test_blank_condition_without_action_is_malformed() {
    let mut doc = TRIAGE.clone();
    doc["nodes"][1] = json!({"id": "n2", "if": ""});
    let guideline: Guideline = serde_json::from_value(doc).unwrap();

    let err = evaluate(&guideline, &inputs(json!({"bp": 120}))).unwrap_err();
    assert!(matches!(err, EngineError::MalformedNode { ref id, .. } if id == "n2"));
}

#[test]
fn test_cycle_and_step_limit() {
    let guideline: Guideline = serde_json::from_value(json!({
        "guideline_id": "loop",
        "name": "Loop",
        "inputs": [],
        "nodes": [
            {"id": "root", "if": "true", "then": "a"},
            {"id": "a", "if": "true", "then": "root"}
        ]
    }))
    .unwrap();

    let err = evaluate(&guideline, &PatientInputs::new()).unwrap_err();
    assert!(matches!(err, EngineError::CycleDetected { .. }));

    let engine = DecisionEngine::with_options(&guideline, EngineOptions { max_steps: 1 });
    let err = engine.evaluate(&PatientInputs::new()).unwrap_err();
    assert!(matches!(err, EngineError::TraversalLimit { limit: 1 }));
}

#[test]
fn test_summary() {
    let guideline = triage();
    assert_eq!(
        summarize_inputs(&guideline, &inputs(json!({"bp": 150}))),
        "Blood Pressure: 150 mmHg"
    );
    assert_eq!(
        summarize_inputs(&guideline, &inputs(json!({"bp": 150, "age": 70}))),
        "Blood Pressure: 150 mmHg, Age: 70"
    );
    assert_eq!(summarize_inputs(&guideline, &PatientInputs::new()), "");
}

// ============================================================================
// Documents and loading
// ============================================================================

#[test]
fn test_document_format_is_decided_at_parse() {
    let legacy = GuidelineDocument::from_value(TRIAGE.clone()).unwrap();
    assert_eq!(legacy.format(), GuidelineFormat::Legacy);

    let nice = GuidelineDocument::from_value(json!({
        "guideline_id": "g",
        "name": "Graph",
        "rules": ["IF a THEN b"],
        "nodes": [],
        "edges": []
    }))
    .unwrap();
    assert_eq!(nice.format(), GuidelineFormat::Nice);

    assert!(GuidelineDocument::from_value(json!({"guideline_id": "x", "name": "y"})).is_err());
}

#[test]
fn test_bundled_samples_load_and_validate() {
    let docs = GuidelineLoader::new().load_dir(&*SAMPLES_DIR).unwrap();
    assert!(docs.len() >= 2);

    for (path, doc) in &docs {
        if let Some(guideline) = doc.as_legacy() {
            let report = validate(guideline);
            assert!(report.is_valid(), "{}: {:?}", path.display(), report.issues);
        }
        if let Some(nice) = doc.as_nice() {
            assert!(nice.dangling_edges().is_empty(), "{}", path.display());
        }
    }
}

#[test]
fn test_bundled_hypertension_evaluates() {
    let doc = GuidelineLoader::new()
        .find_in_dir(&*SAMPLES_DIR, "hypertension-adults")
        .unwrap();
    let guideline = doc.as_legacy().unwrap();

    let result = evaluate(
        guideline,
        &inputs(json!({"clinic_sbp": 185, "clinic_dbp": 100, "age": 50})),
    )
    .unwrap();
    assert_eq!(result.path.first().map(String::as_str), Some("root"));
    assert!(!result.action.text.is_empty());
}

#[test]
fn test_bundled_nice_explains_path() {
    let doc = GuidelineLoader::new()
        .find_in_dir(&*SAMPLES_DIR, "ng136")
        .unwrap();
    let nice = doc.as_nice().unwrap();

    let steps = nice.explain_path(&["c1", "c2", "a2"]);
    assert_eq!(steps.len(), 3);
    assert_eq!(steps[0].node_type, NiceNodeType::Condition);
    assert_eq!(steps[0].edge_label.as_deref(), Some("no"));
    assert_eq!(steps[2].node_type, NiceNodeType::Action);
    assert!(nice.rules_text().contains("\n\n"));
}

#[test]
fn test_validation_reports_structural_errors() {
    let mut doc = TRIAGE.clone();
    doc["nodes"][0]["else"] = json!("nowhere");
    let guideline: Guideline = serde_json::from_value(doc).unwrap();

    let report = validate(&guideline);
    assert!(!report.is_valid());
    assert!(report
        .issues
        .iter()
        .any(|i| matches!(i, Issue::UnknownTarget { target, .. } if target == "nowhere")));
}
