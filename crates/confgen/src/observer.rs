use crate::RenderPair;

/// Notified as outputs are generated.
pub trait RenderObserver {
    /// Called after `pair.output` has been written.
    fn generated(&mut self, pair: &RenderPair);

    /// Called once every pair has been generated.
    fn finish(&mut self);
}

pub struct NoOpObserver;

impl RenderObserver for NoOpObserver {
    fn generated(&mut self, _pair: &RenderPair) {}
    fn finish(&mut self) {}
}

/// Logs one line per generated file.
#[derive(Default)]
pub struct LogObserver {
    generated: usize,
}

impl LogObserver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderObserver for LogObserver {
    fn generated(&mut self, pair: &RenderPair) {
        self.generated += 1;
        tracing::info!(
            path = %pair.output.display(),
            template = %pair.template.display(),
            "generated file"
        );
    }

    fn finish(&mut self) {
        tracing::debug!(files = self.generated, "configuration complete");
    }
}
