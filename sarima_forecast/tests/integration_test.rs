mod common;

use approx::assert_relative_eq;
use common::{candidate, month, table_rows, write_table};
use pretty_assertions::assert_eq;
use sarima_forecast::config::ForecastConfig;
use sarima_forecast::data::MonthlySeries;
use sarima_forecast::export::export_forecast;
use sarima_forecast::pipeline::{
    evaluate_persisted, fit_fixed, load_prepared, predict, retrain, retrain_series,
};
use sarima_forecast::registry::{FileModelRegistry, ModelRegistry};
use sarima_forecast::ForecastError;
use std::path::Path;
use tempfile::{tempdir, NamedTempFile};

fn dataset() -> NamedTempFile {
    let mut rows = table_rows("Alkoholunfälle", "insgesamt", 2015..=2020, 51);
    rows.extend(table_rows("Alkoholunfälle", "Verletzte und Getötete", 2015..=2020, 52));
    rows.extend(table_rows("Fluchtunfälle", "insgesamt", 2015..=2020, 53));
    write_table(&rows)
}

fn config(dataset: &Path, model_dir: &Path) -> ForecastConfig {
    ForecastConfig {
        dataset_path: dataset.to_path_buf(),
        model_path: model_dir.join("sarima_model.json"),
        max_order: 1,
        max_seasonal_order: 1,
        ..ForecastConfig::default()
    }
}

#[test]
fn test_retrain_evaluate_predict() {
    let data = dataset();
    let dir = tempdir().unwrap();
    let config = config(data.path(), dir.path());
    let registry = FileModelRegistry::new(&config.model_path);

    let report = retrain(&config, &registry).unwrap();
    assert_eq!(report.evaluated, 64);
    assert_eq!(report.observations, 60);
    assert!(report.failed < report.evaluated);
    assert!(!report.constrained);

    let stored = registry.load().unwrap();
    assert_eq!(stored.candidate(), report.order);
    assert_relative_eq!(stored.aic(), report.aic, max_relative = 1e-12);

    let (prepared, result) = evaluate_persisted(&config, &registry).unwrap();
    assert_eq!(result.len(), 12);
    assert_eq!(result.dates(), prepared.test.dates());
    assert!(result.mean_absolute_error().is_finite());

    let january = predict(&registry, 2020, 1).unwrap();
    assert_eq!(january, result.values()[0]);
    assert!(matches!(
        predict(&registry, 2021, 13),
        Err(ForecastError::InvalidDate(_))
    ));
}

#[test]
fn test_retrain_with_constraints_enforced() {
    let data = dataset();
    let dir = tempdir().unwrap();
    let config = ForecastConfig {
        enforce_final_constraints: true,
        ..config(data.path(), dir.path())
    };
    let registry = FileModelRegistry::new(&config.model_path);

    let report = retrain(&config, &registry).unwrap();
    let stored = registry.load().unwrap();

    assert!(stored.satisfies_constraints());
    assert_eq!(stored.candidate(), report.order);
}

#[test]
fn test_failed_search_leaves_registry_untouched() {
    let dir = tempdir().unwrap();
    let config = config(Path::new("unused.csv"), dir.path());
    let registry = FileModelRegistry::new(&config.model_path);
    let zeros = MonthlySeries::from_start(month(2015, 1), vec![0.0; 60]).unwrap();

    let result = retrain_series(&config, &zeros, &registry);

    assert!(matches!(result, Err(ForecastError::NoFeasibleModel { .. })));
    assert!(!config.model_path.exists());
    assert!(matches!(
        registry.load(),
        Err(ForecastError::ModelUnavailable(_))
    ));
}

#[test]
fn test_fit_fixed_order() {
    let data = dataset();
    let dir = tempdir().unwrap();
    let config = config(data.path(), dir.path());
    let registry = FileModelRegistry::new(&config.model_path);
    let order = candidate((2, 1, 2), (0, 2, 2));

    let model = fit_fixed(&config, order, &registry).unwrap();

    assert_eq!(model.candidate(), order);
    assert_eq!(registry.load().unwrap().candidate(), order);
}

#[test]
fn test_evaluate_without_model() {
    let data = dataset();
    let dir = tempdir().unwrap();
    let config = config(data.path(), dir.path());
    let registry = FileModelRegistry::new(&config.model_path);

    assert!(matches!(
        evaluate_persisted(&config, &registry),
        Err(ForecastError::ModelUnavailable(_))
    ));
}

#[test]
fn test_export_forecast() {
    let data = dataset();
    let dir = tempdir().unwrap();
    let config = config(data.path(), dir.path());
    let registry = FileModelRegistry::new(&config.model_path);
    fit_fixed(&config, candidate((0, 1, 0), (0, 1, 0)), &registry).unwrap();

    let (prepared, result) = evaluate_persisted(&config, &registry).unwrap();
    let path = dir.path().join("out").join("forecast.csv");
    let rows = export_forecast(&path, &prepared.full, &result).unwrap();
    assert_eq!(rows, 72);

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["date", "actual", "forecast"]);

    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 72);
    assert_eq!(&records[0][0], "2015-01-01");
    assert_eq!(&records[0][2], "");
    assert_eq!(&records[60][0], "2020-01-01");
    assert!(!records[60][2].is_empty());
}

#[test]
fn test_load_prepared_missing_dataset() {
    let dir = tempdir().unwrap();
    let config = config(&dir.path().join("missing.csv"), dir.path());

    assert!(matches!(
        load_prepared(&config),
        Err(ForecastError::IoError(_))
    ));
}
