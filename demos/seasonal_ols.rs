use chrono::{Duration, TimeZone, Utc};
use seasonal_lr::{Forecast, ForecastOptions, TimeDataset};
use std::f64::consts::TAU;

fn main() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let t: Vec<_> = (0..24 * 21).map(|i| start + Duration::hours(i)).collect();
    let y: Vec<f64> = (0..24 * 21)
        .map(|i| {
            let hour = (i % 24) as f64;
            let weekend = if (i / 24) % 7 >= 5 { -8.0 } else { 0.0 };
            120.0 + 15.0 * (TAU * hour / 24.0).sin() + 4.0 * (2.0 * TAU * hour / 24.0).cos()
                + weekend
        })
        .collect();
    let data = TimeDataset::new(t, y).unwrap();

    let mut forecast = Forecast::new(&ForecastOptions::default()).unwrap();
    forecast.fit(&data).unwrap();

    println!("Features kept: {}", forecast.feature_labels().len());
    println!("Model: {}", forecast.model_eq().unwrap());
    let scores = forecast.scores();
    println!("RMSE={:.4}  MAPE={:.4}  R2={:.4}", scores.rmse, scores.mape, scores.r2);

    let tomorrow: Vec<_> = (0..24)
        .map(|i| start + Duration::hours(24 * 21 + i))
        .collect();
    let predicted = forecast.predict(&tomorrow).unwrap();
    for (ts, p) in tomorrow.iter().zip(predicted.iter()).step_by(6) {
        println!("{ts}  {p:.2}");
    }
}
