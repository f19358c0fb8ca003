use std::io::Write;
use MarginLedger::config::SimulationConfig;
use MarginLedger::config::dataset::DatasetConfig;
use MarginLedger::config::loader::AppConfig;
use MarginLedger::market_data::Dataset;
use MarginLedger::simulation::{Action, Episode};
use MarginLedger::{Error, Portfolio};

fn write_series(closes: &[f64]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "timestamp,open,high,low,close,volume").unwrap();
    for (i, close) in closes.iter().enumerate() {
        writeln!(
            file,
            "{},{c},{c},{c},{c},10",
            1_682_899_200_000i64 + i as i64 * 60_000,
            c = close
        )
        .unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn scenario_load_from_config_path() {
    let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
    let file = write_series(&closes);

    let config = DatasetConfig {
        csv_file: file.path().to_path_buf(),
        ema_lengths: vec![2, 4],
    };
    let mut dataset = Dataset::from_config(&config).unwrap();

    // 4 * 5 warm-up rows dropped
    assert_eq!(dataset.len(), 10);
    let row = dataset.step().unwrap();
    assert_eq!(row.close, 120.0);
    // rising series: faster EMA sits closer to the price
    assert!(row.ema(2).unwrap() > row.ema(4).unwrap());
    assert!(row.ema(4).unwrap() < 120.0);
}

#[test]
fn scenario_shipped_default_config_loads_dataset() {
    let config = AppConfig::load("default").unwrap();
    assert_eq!(config.dataset.csv_file, DatasetConfig::default().csv_file);

    let dataset = Dataset::from_config(&config.dataset).unwrap();
    assert!(!dataset.is_empty());
    assert_eq!(dataset.ema_lengths(), config.dataset.ema_lengths.as_slice());
}

#[test]
fn scenario_missing_file_is_io_error() {
    let err = Dataset::from_path("/nonexistent/prices.csv", &[5]).unwrap_err();
    assert!(matches!(err, Error::IoError(_)));
}

#[test]
fn scenario_episode_over_file_series() {
    let file = write_series(&[100.0, 102.0, 104.0, 103.0, 101.0]);
    let dataset = Dataset::from_path(file.path(), &[]).unwrap();
    let portfolio = Portfolio::new(1000.0, 2.0).unwrap();
    let mut episode = Episode::new(dataset, portfolio, SimulationConfig::default());

    episode.reset().unwrap();
    let mut total_reward = 0.0;
    let actions = [
        Action::OpenLong(0.5),
        Action::Hold,
        Action::CloseLong(1.0),
        Action::Hold,
    ];
    for action in actions {
        let outcome = episode.step(action).unwrap();
        total_reward += outcome.reward;
    }

    assert!(episode.is_done());
    // 10 units bought at 100, closed at the 104 mark reached after two steps
    let realized = episode.portfolio().realized_pnl();
    assert!((realized - 40.0).abs() < 1e-9);
    // rewards telescope to the balance change: 2 * 40 over a 2000 base
    assert!((total_reward - 80.0 / 2000.0).abs() < 1e-12);
}
