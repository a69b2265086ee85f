use sarima_forecast::models::CandidateFitFailure;
use sarima_forecast::ForecastError;
use series_math::MathError;
use std::io;

#[test]
fn test_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    match ForecastError::from(io_error) {
        ForecastError::IoError(_) => {}
        other => panic!("Expected IoError variant, got {:?}", other),
    }

    let math_error = MathError::InvalidInput("lag step must be positive".to_string());
    match ForecastError::from(math_error) {
        ForecastError::Math(MathError::InvalidInput(_)) => {}
        other => panic!("Expected Math variant, got {:?}", other),
    }

    let json_error = serde_json::from_str::<f64>("not json").unwrap_err();
    match ForecastError::from(json_error) {
        ForecastError::Serialization(_) => {}
        other => panic!("Expected Serialization variant, got {:?}", other),
    }
}

#[test]
fn test_error_display() {
    let error = ForecastError::NoFeasibleModel { evaluated: 729 };
    assert_eq!(
        error.to_string(),
        "No feasible model: all 729 candidate orders failed to fit"
    );

    let error = ForecastError::LengthMismatch {
        forecast: 11,
        actual: 12,
    };
    assert!(error.to_string().contains("11"));
    assert!(error.to_string().contains("12"));

    let error = ForecastError::InvalidDate("2021-13 is not a valid calendar month".to_string());
    assert_eq!(
        error.to_string(),
        "Invalid date: 2021-13 is not a valid calendar month"
    );
}

#[test]
fn test_candidate_failure_display() {
    let failure = CandidateFitFailure::InsufficientData { needed: 34, got: 12 };
    assert_eq!(
        failure.to_string(),
        "insufficient data: need more than 34 observations, got 12"
    );
    assert!(CandidateFitFailure::NonFinite.to_string().contains("not finite"));
}
