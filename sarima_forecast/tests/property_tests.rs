mod common;

use common::month;
use proptest::prelude::*;
use sarima_forecast::data::{prepare, FilterCriteria, RawRecord};
use sarima_forecast::utils::add_months;
use sarima_forecast::ForecastError;

fn records_from(start_offset: usize, values: &[f64]) -> Vec<RawRecord> {
    let start = add_months(month(2000, 1), start_offset).unwrap();
    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let date = add_months(start, i).unwrap();
            let code = date.format("%Y%m").to_string();
            RawRecord::monthly("Alkoholunfälle", "insgesamt", &code, Some(*value))
        })
        .collect()
}

proptest! {
    #[test]
    fn prepared_months_are_contiguous(
        start_offset in 0usize..240,
        values in prop::collection::vec(0.0f64..500.0, 1..120),
        cutoff_offset in 0usize..400,
    ) {
        let mut records = records_from(start_offset, &values);
        records.reverse();
        let cutoff = add_months(month(2000, 1), cutoff_offset).unwrap();

        let prepared = prepare(&records, &FilterCriteria::default(), cutoff).unwrap();

        prop_assert_eq!(prepared.full.len(), values.len());
        prop_assert_eq!(prepared.train.len() + prepared.test.len(), values.len());
        for pair in prepared.full.dates().windows(2) {
            prop_assert_eq!(add_months(pair[0], 1), Some(pair[1]));
        }
        prop_assert!(prepared.train.dates().iter().all(|d| *d < cutoff));
        prop_assert!(prepared.test.dates().iter().all(|d| *d >= cutoff));
    }

    #[test]
    fn interior_gap_is_rejected(
        values in prop::collection::vec(0.0f64..500.0, 3..60),
        hole in any::<prop::sample::Index>(),
    ) {
        let mut records = records_from(0, &values);
        let removed = 1 + hole.index(values.len() - 2);
        records.remove(removed);

        let result = prepare(&records, &FilterCriteria::default(), month(2010, 1));
        prop_assert!(matches!(result, Err(ForecastError::IrregularSeries(_))));
    }
}
