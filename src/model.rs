#[derive(Debug, Clone)]
pub struct PoolMetrics {
    pub pending_tasks: usize,
    pub submitted_tasks: usize,
    pub completed_tasks: usize,
    pub live_workers: usize,
    pub panicked_workers: usize,
}

impl PoolMetrics {
    pub fn in_flight(&self) -> usize {
        self.submitted_tasks
            .saturating_sub(self.completed_tasks)
            .saturating_sub(self.pending_tasks)
    }

    pub fn utilization(&self) -> f64 {
        if self.live_workers == 0 {
            return 0.0;
        }
        self.in_flight() as f64 / self.live_workers as f64
    }

    pub fn loss_rate(&self) -> f64 {
        if self.live_workers + self.panicked_workers == 0 {
            return 0.0;
        }
        self.panicked_workers as f64 / (self.live_workers + self.panicked_workers) as f64
    }
}
