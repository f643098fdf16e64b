//! End-to-end pipeline tests against the shipped model artifacts
//!
//! Tests cover:
//! - Comma-decimal normalization of a human-readable header row
//! - Aggregated missing-column reporting with no partial predictions
//! - Registry caching per model identifier
//! - Result assembly preserving row count and ids

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use vinos_common::assembler::ResultRow;
use vinos_common::model::{ArtifactLoader, JsonArtifactLoader};
use vinos_common::pipeline::{predict_table, Report};
use vinos_common::quality::GroundTruth;
use vinos_common::schema::normalize;
use vinos_common::validator::validate;
use vinos_common::{
    Classifier, DecimalStyle, Error, Feature, ModelId, ModelRegistry, QualityLabel, RawTable,
    RawValue,
};

fn models_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../models")
}

fn sample_csv() -> String {
    std::fs::read_to_string(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../data/vinos.csv"))
        .expect("Sample CSV should exist")
}

/// Loader wrapper counting how often artifacts are deserialized
struct Counting {
    inner: JsonArtifactLoader,
    loads: Arc<AtomicUsize>,
}

impl ArtifactLoader for Counting {
    fn load(&self, id: ModelId) -> vinos_common::Result<Arc<dyn Classifier>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load(id)
    }
}

const SCENARIO: &str = "fixed acidity;volatile acidity;citric acid;residual sugar;chlorides;\
free sulfur dioxide;total sulfur dioxide;density;pH;sulphates;alcohol\n\
7,4;0,7;0;1,9;0,076;11;34;0,9978;3,51;0,56;9,4\n";

#[test]
fn test_scenario_row_normalizes_to_floats() {
    let table = RawTable::from_csv_str(SCENARIO, b';').unwrap();
    let normalized = normalize(&table, DecimalStyle::Comma).unwrap();
    let samples = validate(&normalized).unwrap();

    assert_eq!(samples.len(), 1);
    assert_eq!(
        samples[0].features.values(),
        &[7.4, 0.7, 0.0, 1.9, 0.076, 11.0, 34.0, 0.9978, 3.51, 0.56, 9.4]
    );
}

#[test]
fn test_missing_alcohol_reports_once_and_predicts_nothing() {
    let csv = "id;fixed acidity;volatile acidity;citric acid;residual sugar;chlorides;\
free sulfur dioxide;total sulfur dioxide;density;pH;sulphates\n\
1;7,4;0,7;0;1,9;0,076;11;34;0,9978;3,51;0,56\n\
2;7,8;0,88;0;2,6;0,098;25;67;0,9968;3,2;0,68\n";
    let table = RawTable::from_csv_str(csv, b';').unwrap();
    let registry = ModelRegistry::from_dir(models_dir());
    let classifier = registry.resolve(ModelId::DecisionTree).unwrap();

    match predict_table(&table, DecimalStyle::Comma, classifier.as_ref()) {
        Err(Error::MissingColumns(columns)) => {
            assert_eq!(columns, vec!["alcohol".to_string()]);
        }
        other => panic!("expected MissingColumns, got {other:?}"),
    }
}

#[test]
fn test_missing_columns_listed_exactly() {
    let table = RawTable::new(
        vec!["id".into(), "pH".into(), "Alcohol".into()],
        vec![vec![
            RawValue::Text("1".into()),
            RawValue::Text("3,2".into()),
            RawValue::Text("9".into()),
        ]],
    );
    let normalized = normalize(&table, DecimalStyle::Comma).unwrap();
    match validate(&normalized) {
        Err(Error::MissingColumns(columns)) => {
            let expected: Vec<String> = Feature::ALL
                .iter()
                .filter(|f| !matches!(f, Feature::Ph | Feature::Alcohol))
                .map(|f| f.name().to_string())
                .collect();
            assert_eq!(columns, expected);
        }
        other => panic!("expected MissingColumns, got {other:?}"),
    }
}

#[test]
fn test_decision_tree_loaded_once() {
    let loads = Arc::new(AtomicUsize::new(0));
    let registry = ModelRegistry::new(Box::new(Counting {
        inner: JsonArtifactLoader::new(models_dir()),
        loads: Arc::clone(&loads),
    }));

    let first = registry.resolve_str("decision-tree").unwrap();
    let second = registry.resolve_str("decision-tree").unwrap();
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_shipped_models_agree_on_scenario_row() {
    let table = RawTable::from_csv_str(SCENARIO, b';').unwrap();
    let registry = ModelRegistry::from_dir(models_dir());

    for id in ModelId::ALL {
        let classifier = registry.resolve(id).unwrap();
        let rows = predict_table(&table, DecimalStyle::Comma, classifier.as_ref()).unwrap();
        assert_eq!(rows[0].predicted, QualityLabel::Regular, "model {}", id);
    }
}

#[test]
fn test_report_over_sample_file() {
    let table = RawTable::from_csv_str(&sample_csv(), b';').unwrap();
    let registry = ModelRegistry::from_dir(models_dir());

    for id in ModelId::ALL {
        let report = Report::build(&registry, id, &table, DecimalStyle::Comma).unwrap();
        assert_eq!(report.total_rows, table.len());
        assert_eq!(report.rows.len(), table.len());
        assert_eq!(
            report.distribution.iter().map(|c| c.count).sum::<usize>(),
            table.len()
        );
        assert!(report.accuracy.is_some());
        assert!(report.agreement.is_some());
        assert!(report
            .rows
            .iter()
            .all(|r: &ResultRow| matches!(r.actual, Some(GroundTruth::Known(_)))));
    }
}

#[test]
fn test_report_json_shape() {
    let table = RawTable::from_csv_str(SCENARIO, b';').unwrap();
    let registry = ModelRegistry::from_dir(models_dir());
    let report = Report::build(&registry, ModelId::GradientBoostedTree, &table, DecimalStyle::Comma)
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["model"], "gradient-boosted-tree");
    assert_eq!(json["rows"][0]["predicted"], "Regular");
    assert_eq!(json["rows"][0]["features"]["ph"], 3.51);
    assert!(json["rows"][0].get("id").is_none());
    assert_eq!(json["distribution"][0]["label"], "Regular");
    assert_eq!(json["distribution"][0]["count"], 1);
}
