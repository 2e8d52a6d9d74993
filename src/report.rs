//! Console and file observers for the training loop.

use crate::error::Result;
use crate::train::{ExampleProgress, TrainingObserver};

use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Progress bar over every example of every epoch, with the running cost.
pub struct ProgressObserver {
    pb: ProgressBar,
}

impl ProgressObserver {
    pub fn new(nb_epochs: usize, epoch_len: usize) -> ProgressObserver {
        let pb = ProgressBar::new(nb_epochs as u64 * epoch_len as u64);
        // the template is a constant, it only fails if edited into something invalid
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        {
            pb.set_style(style);
        }
        ProgressObserver { pb }
    }
}

impl TrainingObserver for ProgressObserver {
    fn on_example(&mut self, progress: &ExampleProgress) {
        self.pb.inc(1);
        if progress.index % 100 == 0 {
            self.pb.set_message(format!("cost: {:.4}", progress.cost));
        }
    }

    fn on_epoch_end(&mut self, epoch: usize, costs: &[f32]) {
        let last = costs.last().copied().unwrap_or(0.0);
        self.pb
            .println(format!("[EPOCH {}] last cost: {:.4}", epoch + 1, last));
    }
}

impl Drop for ProgressObserver {
    fn drop(&mut self) {
        self.pb.finish_and_clear();
    }
}

/// Writes every published cost sample as `step,epoch,cost`, one row each.
pub struct CostCsv {
    writer: BufWriter<File>,
    step: usize,
}

impl CostCsv {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<CostCsv> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "step,epoch,cost")?;
        Ok(CostCsv { writer, step: 0 })
    }

    fn write_epoch(&mut self, epoch: usize, costs: &[f32]) -> Result<()> {
        for cost in costs {
            writeln!(self.writer, "{},{},{:.6}", self.step, epoch + 1, cost)?;
            self.step += 1;
        }
        self.writer.flush()?;
        Ok(())
    }
}

impl TrainingObserver for CostCsv {
    fn on_epoch_end(&mut self, epoch: usize, costs: &[f32]) {
        // observers cannot fail the training loop
        if let Err(e) = self.write_epoch(epoch, costs) {
            warn!("could not write cost samples: {e}");
        }
    }
}
