use anyhow::Context;
use MarginLedger::config::loader::AppConfig;
use MarginLedger::ledger::Portfolio;
use MarginLedger::market_data::{Dataset, Row};
use MarginLedger::observability::metrics::register_metrics;
use MarginLedger::observability::tracing::{init_tracing, trace_episode};
use MarginLedger::simulation::{Action, Episode};

/// Long when the fastest EMA is above the slowest, short when below.
fn crossover_policy(row: Option<&Row>, lengths: &[usize], in_long: bool, in_short: bool) -> Action {
    let (Some(row), Some(fast), Some(slow)) = (row, lengths.iter().min(), lengths.iter().max()) else {
        return Action::Hold;
    };
    let (Some(fast), Some(slow)) = (row.ema(*fast), row.ema(*slow)) else {
        return Action::Hold;
    };

    match (fast > slow, fast < slow) {
        (true, _) if in_short => Action::CloseShort(1.0),
        (true, _) if !in_long => Action::OpenLong(0.5),
        (_, true) if in_long => Action::CloseLong(1.0),
        (_, true) if !in_short => Action::OpenShort(0.5),
        _ => Action::Hold,
    }
}

fn main() -> anyhow::Result<()> {
    let env = std::env::var("MARGINLEDGER_ENV").unwrap_or_else(|_| "default".to_string());
    let config = AppConfig::load(&env).context("load configuration")?;

    init_tracing(&config.logging)?;
    register_metrics()?;

    let dataset = Dataset::from_config(&config.dataset)
        .with_context(|| format!("load dataset {}", config.dataset.csv_file.display()))?;
    let portfolio = Portfolio::from_config(&config.ledger)?;
    let mut episode = Episode::new(dataset, portfolio, config.simulation.clone());

    episode.reset()?;
    let span = trace_episode(&episode.id());
    let _guard = span.enter();

    let mut total_reward = 0.0;
    let mut liquidations = 0usize;
    while !episode.is_done() {
        let action = crossover_policy(
            episode.dataset().current(),
            episode.dataset().ema_lengths(),
            !episode.portfolio().long().is_flat(),
            !episode.portfolio().short().is_flat(),
        );
        let outcome = episode.step(action)?;
        total_reward += outcome.reward;
        if outcome.liquidated {
            liquidations += 1;
        }
    }

    let mark = episode.mark().unwrap_or_default();
    let snapshot = episode.portfolio().snapshot(mark);
    tracing::info!(
        "Run complete: steps={}, total_reward={}, liquidations={}, snapshot={}",
        episode.steps(),
        total_reward,
        liquidations,
        serde_json::to_string(&snapshot)?
    );

    Ok(())
}
