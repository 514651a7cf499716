use chrono::{Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use seasonal_lr::{Forecast, ForecastOptions, Solver, TimeDataset};
use std::f64::consts::TAU;

fn main() {
    let mut rng = StdRng::seed_from_u64(42);
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let t: Vec<_> = (0..24 * 14).map(|i| start + Duration::hours(i)).collect();
    let y: Vec<f64> = (0..24 * 14)
        .map(|i| 40.0 + 6.0 * (TAU * (i % 24) as f64 / 24.0).sin() + rng.gen_range(-1.0..1.0))
        .collect();
    let data = TimeDataset::new(t, y).unwrap();

    for lambda in [0.0, 10.0, 50.0, 200.0] {
        let opts = ForecastOptions {
            solver: Solver::lasso(lambda),
            ..Default::default()
        };
        let mut forecast = Forecast::new(&opts).unwrap();
        forecast.fit(&data).unwrap();

        let active = forecast
            .coefficients()
            .unwrap()
            .values()
            .filter(|c| **c != 0.0)
            .count();
        let scores = forecast.scores();
        println!(
            "lambda={lambda:>6.1}  active={active:>2}/{}  RMSE={:.4}  R2={:.4}",
            forecast.feature_labels().len(),
            scores.rmse,
            scores.r2
        );
    }
}
