use glam::Vec4Swizzles;

use crate::simulation::Simulation;

#[derive(Debug, Clone)]
pub struct FieldMetrics {
    pub total_dye: f32,
    pub max_dye: f32,
    pub max_velocity: f32,
    pub avg_velocity: f32,
    /// Mean absolute divergence of the last projected velocity.
    pub velocity_divergence: f32,
    /// Mean absolute curl.
    pub vorticity: f32,
    pub frame: u64,
}

impl FieldMetrics {
    pub fn analyze(simulation: &Simulation, frame: u64) -> Self {
        let dye = simulation.dye().texels();
        let velocity = simulation.velocity().texels();

        let mut total_dye = 0.0;
        let mut max_dye: f32 = 0.0;
        for texel in dye {
            let sum = texel.x + texel.y + texel.z;
            total_dye += sum;
            max_dye = max_dye.max(texel.xyz().max_element());
        }

        let mut max_velocity: f32 = 0.0;
        let mut velocity_sum = 0.0;
        for texel in velocity {
            let magnitude = texel.xy().length();
            max_velocity = max_velocity.max(magnitude);
            velocity_sum += magnitude;
        }

        let mean_abs = |texels: &[glam::Vec4]| {
            texels.iter().map(|t| t.x.abs()).sum::<f32>() / texels.len().max(1) as f32
        };

        Self {
            total_dye,
            max_dye,
            max_velocity,
            avg_velocity: velocity_sum / velocity.len().max(1) as f32,
            velocity_divergence: mean_abs(simulation.divergence().texels()),
            vorticity: mean_abs(simulation.curl().texels()),
            frame,
        }
    }

    pub fn log_summary(&self) {
        log::info!(
            "frame {}: dye total {:.4} max {:.4} | velocity max {:.4} avg {:.4} | divergence {:.6} | vorticity {:.6}",
            self.frame,
            self.total_dye,
            self.max_dye,
            self.max_velocity,
            self.avg_velocity,
            self.velocity_divergence,
            self.vorticity
        );
    }
}

#[derive(Debug, Default)]
pub struct AnalysisRecorder {
    pub metrics_history: Vec<FieldMetrics>,
}

impl AnalysisRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, metrics: FieldMetrics) {
        self.metrics_history.push(metrics);
    }

    pub fn log_trends(&self) {
        let (Some(first), Some(last)) = (self.metrics_history.first(), self.metrics_history.last())
        else {
            return;
        };
        if self.metrics_history.len() < 2 {
            return;
        }

        log::info!(
            "dye total {:.4} -> {:.4}, max velocity {:.4} -> {:.4} over {} frames",
            first.total_dye,
            last.total_dye,
            first.max_velocity,
            last.max_velocity,
            last.frame.saturating_sub(first.frame)
        );
    }
}
