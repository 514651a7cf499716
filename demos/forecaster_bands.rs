use chrono::{Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use seasonal_lr::{Forecaster, ForecasterOptions, TimeDataset};
use std::f64::consts::TAU;

fn main() {
    let mut rng = StdRng::seed_from_u64(7);
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let n = 24 * 28;
    let t: Vec<_> = (0..n).map(|i| start + Duration::hours(i)).collect();
    let mut y: Vec<f64> = (0..n)
        .map(|i| {
            let day = (i % 24) as f64 / 24.0;
            // noisier during the day than at night
            let noise = 0.5 + 2.0 * (TAU * day).sin().max(0.0);
            80.0 + 10.0 * (TAU * day).sin() + noise * rng.gen_range(-1.0..1.0)
        })
        .collect();
    y[150] += 50.0;
    y[400] -= 45.0;
    let data = TimeDataset::new(t, y).unwrap();

    let mut forecaster = Forecaster::new(ForecasterOptions::default()).unwrap();
    forecaster.fit(&data).unwrap();

    let series = forecaster.series_forecast();
    println!("Outliers removed: {}", forecaster.outliers_removed());
    println!("Series model: {}", series.model_eq().unwrap());
    let scores = series.scores();
    println!("RMSE={:.4}  R2={:.4}", scores.rmse, scores.r2);

    let next_day: Vec<_> = (0..24).map(|i| start + Duration::hours(n + i)).collect();
    let results = forecaster.predict(&next_day).unwrap();
    for i in (0..24).step_by(3) {
        println!(
            "{}  {:.2}  [{:.2}, {:.2}]",
            results.t[i], results.forecast[i], results.lower[i], results.upper[i]
        );
    }
}
