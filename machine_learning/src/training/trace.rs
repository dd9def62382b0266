/// The loss of every processed batch, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LossTrace {
    losses: Vec<f64>,
    batches_per_epoch: usize,
}

impl LossTrace {
    pub fn new(batches_per_epoch: usize) -> Self {
        Self {
            losses: Vec::new(),
            batches_per_epoch,
        }
    }

    pub fn push(&mut self, loss: f64) {
        self.losses.push(loss);
    }

    pub fn losses(&self) -> &[f64] {
        &self.losses
    }

    pub fn len(&self) -> usize {
        self.losses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.losses.is_empty()
    }

    /// The average batch loss of every epoch. A trailing partial epoch is averaged on its own.
    pub fn epoch_means(&self) -> Vec<f64> {
        if self.batches_per_epoch == 0 {
            return Vec::new();
        }

        self.losses
            .chunks(self.batches_per_epoch)
            .map(|epoch| epoch.iter().sum::<f64>() / epoch.len() as f64)
            .collect()
    }
}
