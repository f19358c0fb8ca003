use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::config::SimulationConfig;
use crate::error::{Error, Result};
use crate::invariants::checks::InvariantChecks;
use crate::ledger::portfolio::Portfolio;
use crate::market_data::dataset::Dataset;
use crate::observability::metrics::EPISODES_COMPLETED;
use crate::observability::tracing::trace_step;
use crate::simulation::action::{Action, Observation};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub observation: Observation,
    /// Balance change over the step relative to the leveraged initial balance.
    pub reward: f64,
    pub done: bool,
    pub liquidated: bool,
    pub mark: f64,
}

/// One portfolio driven over one price series.
///
/// Each `Episode` owns its `Portfolio`; run parallel episodes with separate
/// instances.
pub struct Episode {
    id: Uuid,
    dataset: Dataset,
    portfolio: Portfolio,
    config: SimulationConfig,
    mark: Option<f64>,
    steps: usize,
    done: bool,
}

impl Episode {
    pub fn new(dataset: Dataset, portfolio: Portfolio, config: SimulationConfig) -> Self {
        Episode {
            id: Uuid::new_v4(),
            dataset,
            portfolio,
            config,
            mark: None,
            steps: 0,
            done: true,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn mark(&self) -> Option<f64> {
        self.mark
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Rewind the series and the ledger and read the first mark.
    pub fn reset(&mut self) -> Result<Observation> {
        self.dataset.reset();
        self.portfolio.reset();
        self.id = Uuid::new_v4();
        self.steps = 0;

        let mark = self
            .dataset
            .step()
            .map(|row| row.close)
            .ok_or_else(|| Error::DatasetError("dataset has no rows".to_string()))?;
        self.mark = Some(mark);
        self.done = self.dataset.position() >= self.dataset.len();

        Ok(Observation::from_portfolio(&self.portfolio, mark))
    }

    /// Apply `action` at the current mark, move to the next row and check
    /// for liquidation there.
    pub fn step(&mut self, action: Action) -> Result<StepOutcome> {
        let mark = match self.mark {
            Some(mark) if !self.done => mark,
            _ => return Err(Error::EpisodeFinished),
        };
        let _span = trace_step(self.steps, mark).entered();

        let balance_before = self.portfolio.balance(mark);
        action.apply(&mut self.portfolio, mark)?;

        let next_mark = match self.dataset.step() {
            Some(row) => row.close,
            None => mark,
        };
        self.mark = Some(next_mark);
        self.steps += 1;

        let liquidated = self.portfolio.liquidate(next_mark);
        if let Err(e) = InvariantChecks::check_all(&self.portfolio, self.config.invariant_tolerance) {
            // Ledger state can no longer be trusted; only reset() recovers
            self.done = true;
            tracing::error!("Episode {} stopped at step {}: {}", self.id, self.steps, e);
            return Err(e);
        }

        let scale = self.portfolio.initial_balance() * self.portfolio.leverage();
        let reward = (self.portfolio.balance(next_mark) - balance_before) / scale;

        self.done = self.dataset.position() >= self.dataset.len()
            || (liquidated && self.config.end_on_liquidation);
        if self.done {
            EPISODES_COMPLETED.inc();
            tracing::info!(
                "Episode {} finished after {} steps: balance={}, liquidated={}",
                self.id,
                self.steps,
                self.portfolio.balance(next_mark),
                liquidated
            );
        }

        Ok(StepOutcome {
            observation: Observation::from_portfolio(&self.portfolio, next_mark),
            reward,
            done: self.done,
            liquidated,
            mark: next_mark,
        })
    }
}
