//! Two-timescale outer/inner loop

use super::dual::{dual_step, DualRates};
use super::primal::{primal_step, StepLocation, StepOutcome};
use super::ClassRunContext;
use crate::checkpoint::{Checkpoint, CheckpointStore, ScheduleProgress};
use crate::error::{Error, Result};
use crate::tracking::MetricLogger;

/// Scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Inner,
    Dual,
    Done,
}

/// Loop lengths and loss weighting of a class run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Schedule {
    pub n_outer: usize,
    pub n_inner: usize,
    /// Weight of the Lagrangian term
    pub beta: f32,
    pub dual_rates: DualRates,
}

/// Means over one outer iteration's inner steps, plus state after its dual step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OuterSummary {
    pub outer: usize,
    pub mean_loss: f32,
    pub mean_t1: f32,
    pub mean_t2: f32,
    pub mu: f32,
    pub eps: f32,
    pub w: f32,
}

#[derive(Debug, Clone, Copy, Default)]
struct RunningLoss {
    loss: f64,
    t1: f64,
    t2: f64,
    count: usize,
}

impl RunningLoss {
    fn add(&mut self, outcome: &StepOutcome) {
        self.loss += f64::from(outcome.loss);
        self.t1 += f64::from(outcome.t1);
        self.t2 += f64::from(outcome.t2);
        self.count += 1;
    }

    fn from_progress(progress: &ScheduleProgress) -> Self {
        Self {
            loss: progress.loss_sum,
            t1: progress.t1_sum,
            t2: progress.t2_sum,
            count: progress.pending_steps,
        }
    }

    fn means(&self) -> (f64, f64, f64) {
        let n = self.count.max(1) as f64;
        (self.loss / n, self.t1 / n, self.t2 / n)
    }
}

/// Drives one class run through `Inner -> Dual` cycles
///
/// The global step counter is never reset. Every `N` steps (the training
/// split size) the average `loss`, `t1loss` and `t2loss` since the previous
/// emission are logged and the sample index restarts at 0. The boundary is
/// the literal `(step + 1) % N == 0`, so it does not line up with outer
/// iterations unless `n_inner` is a multiple of `N`.
///
/// Counters start from the context's [`ScheduleProgress`], so a resumed run
/// keeps numbering epochs where the checkpointed run stopped.
pub struct Scheduler<'a> {
    ctx: ClassRunContext,
    schedule: Schedule,
    logger: &'a mut dyn MetricLogger,
    checkpoints: &'a mut dyn CheckpointStore,
    phase: Phase,
    start_outer: usize,
    global_step: usize,
    epoch: u64,
    epoch_loss: RunningLoss,
}

impl<'a> Scheduler<'a> {
    pub fn new(
        ctx: ClassRunContext,
        start_outer: usize,
        schedule: Schedule,
        logger: &'a mut dyn MetricLogger,
        checkpoints: &'a mut dyn CheckpointStore,
    ) -> Self {
        let progress = ctx.progress;
        Self {
            ctx,
            schedule,
            logger,
            checkpoints,
            phase: Phase::Initializing,
            start_outer,
            global_step: progress.global_step,
            epoch: progress.epoch,
            epoch_loss: RunningLoss::from_progress(&progress),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Primal steps taken so far in this process
    pub fn global_step(&self) -> usize {
        self.global_step
    }

    /// Completed passes over the training split
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Counters as they would be checkpointed now
    pub fn progress(&self) -> ScheduleProgress {
        ScheduleProgress {
            epoch: self.epoch,
            global_step: self.global_step,
            loss_sum: self.epoch_loss.loss,
            t1_sum: self.epoch_loss.t1,
            t2_sum: self.epoch_loss.t2,
            pending_steps: self.epoch_loss.count,
        }
    }

    pub fn context(&self) -> &ClassRunContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut ClassRunContext {
        &mut self.ctx
    }

    pub fn into_context(mut self) -> ClassRunContext {
        self.ctx.progress = self.progress();
        self.ctx
    }

    /// Run outer iterations `start_outer..n_outer`
    pub fn run(&mut self) -> Result<Vec<OuterSummary>> {
        let mut summaries = Vec::new();
        for outer in self.start_outer..self.schedule.n_outer {
            let outcomes = self.inner_phase(outer)?;
            self.dual_phase(outer)?;
            let summary = self.summarize(outer, &outcomes);
            tracing::debug!(
                class = self.ctx.class,
                outer,
                loss = summary.mean_loss,
                mu = summary.mu,
                eps = summary.eps,
                w = summary.w,
                "outer iteration done"
            );
            summaries.push(summary);
        }
        self.phase = Phase::Done;
        Ok(summaries)
    }

    /// `n_inner` primal steps; multipliers are untouched
    pub fn inner_phase(&mut self, outer: usize) -> Result<Vec<StepOutcome>> {
        self.phase = Phase::Inner;
        let n = self.ctx.train.len();
        let mut outcomes = Vec::with_capacity(self.schedule.n_inner);

        for _ in 0..self.schedule.n_inner {
            let index = self
                .ctx
                .sampler
                .next()
                .ok_or(Error::EmptyDataset(self.ctx.class))?;
            let sample = self
                .ctx
                .train
                .get(index)
                .ok_or(Error::EmptyDataset(self.ctx.class))?;

            let outcome = primal_step(
                self.ctx.model.as_mut(),
                &mut self.ctx.primal,
                &self.ctx.dual,
                &mut self.ctx.optimizer,
                sample,
                index,
                self.ctx.n_positives,
                self.schedule.beta,
                StepLocation {
                    outer,
                    step: self.global_step,
                },
            )?;
            self.epoch_loss.add(&outcome);
            outcomes.push(outcome);

            if (self.global_step + 1) % n == 0 {
                self.epoch += 1;
                let (loss, t1, t2) = self.epoch_loss.means();
                self.logger.log(self.epoch, "loss", loss)?;
                self.logger.log(self.epoch, "t1loss", t1)?;
                self.logger.log(self.epoch, "t2loss", t2)?;
                self.epoch_loss = RunningLoss::default();
                self.ctx.sampler.restart();
            }
            self.global_step += 1;
        }
        Ok(outcomes)
    }

    /// One dual update, then checkpoint and flush the logger
    pub fn dual_phase(&mut self, outer: usize) -> Result<()> {
        self.phase = Phase::Dual;
        dual_step(
            self.ctx.model.as_ref(),
            &self.ctx.train,
            &self.ctx.primal,
            &mut self.ctx.dual,
            &self.schedule.dual_rates,
            outer,
            self.global_step,
        )?;

        let checkpoint = Checkpoint::capture(
            self.ctx.class,
            outer,
            self.ctx.model.as_ref(),
            Some(self.ctx.primal.to_state()),
            Some(self.ctx.dual.to_state()),
        )
        .with_progress(self.progress());
        self.checkpoints.save(&checkpoint)?;
        self.logger.flush()?;
        Ok(())
    }

    fn summarize(&self, outer: usize, outcomes: &[StepOutcome]) -> OuterSummary {
        let mut running = RunningLoss::default();
        outcomes.iter().for_each(|o| running.add(o));
        let (loss, t1, t2) = running.means();
        OuterSummary {
            outer,
            mean_loss: loss as f32,
            mean_t1: t1 as f32,
            mean_t2: t2 as f32,
            mu: self.ctx.dual.mu,
            eps: self.ctx.primal.eps_value(),
            w: self.ctx.primal.w_value(),
        }
    }
}
