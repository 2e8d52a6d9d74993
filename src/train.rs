use crate::config::TrainingConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::model::Mlp;
use crate::optim::{one_hot, squared_error, Sgd};

use log::{debug, info, warn};
use ndarray::ArrayView1;
use rayon::prelude::*;
use std::collections::HashMap;

/// Snapshot handed to observers after every training example.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExampleProgress {
    pub epoch: usize,
    pub nb_epochs: usize,
    /// Index of the example within the epoch
    pub index: usize,
    pub epoch_len: usize,
    /// Latest published running cost
    pub cost: f32,
}

/// Hook points of the training loop. Both default to no-ops.
pub trait TrainingObserver {
    fn on_example(&mut self, _progress: &ExampleProgress) {}
    fn on_epoch_end(&mut self, _epoch: usize, _costs: &[f32]) {}
}

impl TrainingObserver for () {}

impl<A: TrainingObserver, B: TrainingObserver> TrainingObserver for (A, B) {
    fn on_example(&mut self, progress: &ExampleProgress) {
        self.0.on_example(progress);
        self.1.on_example(progress);
    }

    fn on_epoch_end(&mut self, epoch: usize, costs: &[f32]) {
        self.0.on_epoch_end(epoch, costs);
        self.1.on_epoch_end(epoch, costs);
    }
}

/// Accumulates the squared error and publishes `sum / divisor` on every
/// example whose in-epoch index is a multiple of `window`.
#[derive(Debug, Clone, PartialEq)]
pub struct CostTracker {
    window: usize,
    divisor: f32,
    sum: f32,
    current: f32,
}

impl CostTracker {
    pub fn new(window: usize, divisor: f32) -> CostTracker {
        CostTracker {
            window,
            divisor,
            sum: 0.0,
            current: 0.0,
        }
    }

    /// Returns the newly published cost, if any.
    pub fn record(&mut self, index: usize, squared_error: f32) -> Option<f32> {
        self.sum += squared_error;
        if index % self.window == 0 {
            self.current = self.sum / self.divisor;
            self.sum = 0.0;
            return Some(self.current);
        }
        None
    }

    pub fn current(&self) -> f32 {
        self.current
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingReport {
    /// Running cost samples, one sequence per epoch
    pub epoch_costs: Vec<Vec<f32>>,
    pub examples_seen: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub correct: usize,
    pub total: usize,
    pub accuracy: f32,
    /// How many times each label was predicted
    pub predictions: HashMap<usize, u64>,
}

/// Drives forward, backward and update over a training split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trainer {
    pub sgd: Sgd,
    pub loss_scale: f32,
    pub cost_window: usize,
    pub cost_divisor: f32,
}

impl Trainer {
    pub fn new(config: &TrainingConfig) -> Result<Trainer> {
        config.validate()?;
        Ok(Trainer {
            sgd: Sgd::new(config.learning_rate, config.bias_update),
            loss_scale: config.loss_scale,
            cost_window: config.cost_window,
            cost_divisor: config.cost_divisor,
        })
    }

    /// One forward, backward and update cycle. Returns the example's squared
    /// error as measured before the update.
    pub fn train_example(&self, nn: &mut Mlp, input: ArrayView1<f32>, label: u8) -> Result<f32> {
        let pass = nn.forward(input)?;
        let target = one_hot(label as usize, nn.output_size())?;
        let error = squared_error(pass.output(), &target);
        let deltas = nn.backward(&pass, label as usize, self.loss_scale)?;
        self.sgd.step(nn, &pass, &deltas)?;
        Ok(error)
    }

    /// Trains `nn` for `nb_epochs` passes over `data`, in order.
    /// Zero epochs is a no-op.
    pub fn fit<O: TrainingObserver>(
        &self,
        nn: &mut Mlp,
        data: &Dataset,
        nb_epochs: usize,
        observer: &mut O,
    ) -> Result<TrainingReport> {
        let mut report = TrainingReport::default();
        if nb_epochs == 0 {
            warn!("training for 0 epochs, parameters are left untouched");
            return Ok(report);
        }

        // the running cost carries across epoch boundaries
        let mut tracker = CostTracker::new(self.cost_window, self.cost_divisor);
        for epoch in 0..nb_epochs {
            info!("Epoch {}/{}", epoch + 1, nb_epochs);
            let mut costs = Vec::with_capacity(data.len() / self.cost_window + 1);

            for (index, (input, label)) in data.iter().enumerate() {
                let error = self.train_example(nn, input, label)?;
                if let Some(cost) = tracker.record(index, error) {
                    costs.push(cost);
                }
                observer.on_example(&ExampleProgress {
                    epoch,
                    nb_epochs,
                    index,
                    epoch_len: data.len(),
                    cost: tracker.current(),
                });
            }

            debug!(
                "epoch {} done, last cost {:.4}, {} cost samples",
                epoch + 1,
                tracker.current(),
                costs.len()
            );
            report.examples_seen += data.len();
            observer.on_epoch_end(epoch, &costs);
            report.epoch_costs.push(costs);
        }
        Ok(report)
    }
}

/// Top-1 accuracy of `nn` on `data`, using `Mlp::predict` so the output is
/// never normalized.
/// Examples are independent, so they are spread over the rayon pool.
pub fn evaluate(nn: &Mlp, data: &Dataset) -> Result<Evaluation> {
    let (correct, total, predictions) = (0..data.len())
        .into_par_iter()
        .try_fold(
            || (0usize, 0usize, HashMap::<usize, u64>::new()),
            |(mut correct, mut total, mut stats), idx| {
                let (input, label) = data.get(idx);
                let predicted_label = nn.predict(input)?;

                *stats.entry(predicted_label).or_insert(0) += 1;
                if predicted_label == label as usize {
                    correct += 1;
                }
                total += 1;
                Ok::<_, crate::error::Error>((correct, total, stats))
            },
        )
        .try_reduce(
            || (0, 0, HashMap::new()),
            |mut a, b| {
                // Merge the maps from different threads
                for (label, count) in b.2 {
                    *a.2.entry(label).or_insert(0) += count;
                }
                Ok((a.0 + b.0, a.1 + b.1, a.2))
            },
        )?;

    let accuracy = if total == 0 {
        0.0
    } else {
        correct as f32 / total as f32
    };
    info!("[TEST ACC] {:.4} ({}/{})", accuracy, correct, total);
    debug!("[TEST STATS] {:?}", predictions);

    Ok(Evaluation {
        correct,
        total,
        accuracy,
        predictions,
    })
}
