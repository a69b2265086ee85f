use chrono::NaiveDate;
use sarima_forecast::data::MonthlySeries;
use sarima_forecast::metrics::evaluate_with_intervals;
use sarima_forecast::models::SearchGrid;
use sarima_forecast::search::OrderSearch;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("SARIMA Forecast: Basic Example");
    println!("==============================\n");

    // Six years of monthly counts with a summer peak
    let start = NaiveDate::from_ymd_opt(2015, 1, 1).ok_or("invalid start month")?;
    let values: Vec<f64> = (0..72)
        .map(|t| {
            let season = (2.0 * std::f64::consts::PI * (t % 12) as f64 / 12.0).sin();
            let wobble = ((t * 37) % 11) as f64 - 5.0;
            45.0 + 12.0 * season + wobble - 0.1 * t as f64
        })
        .collect();
    let series = MonthlySeries::from_start(start, values)?;

    let cutoff = NaiveDate::from_ymd_opt(2020, 1, 1).ok_or("invalid cutoff")?;
    let (train, test) = series.split_at_date(cutoff);
    println!("{} training months, {} test months\n", train.len(), test.len());

    // Small grid so the example finishes quickly
    let grid = SearchGrid::up_to(1, 1, 12)?;
    println!("Searching {} candidate orders...", grid.len());
    let outcome = OrderSearch::new(grid).run(&train)?;
    println!(
        "Best order {} with AIC {:.2} ({} skipped)\n",
        outcome.best.candidate,
        outcome.best.aic,
        outcome.failures.len()
    );

    let result = evaluate_with_intervals(&outcome.best.model, &test, 0.95)?;
    println!("Forecast with 95% intervals:");
    let intervals = result.intervals().unwrap_or_default();
    for ((date, value), (lower, upper)) in result.dates().iter().zip(result.values()).zip(intervals) {
        println!("  {}: {:>7.2}  ({:.2}, {:.2})", date.format("%Y-%m"), value, lower, upper);
    }
    println!("\nMean absolute error: {:.3}", result.mean_absolute_error());

    Ok(())
}
