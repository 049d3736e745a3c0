//! # Performance Metrics
//!
//! Frame timing for the FPS overlay.
//!
//! Frames are only rendered when the map changed, so the numbers describe
//! the cost of a frame rather than a steady refresh rate.
//!
//! ```rust
//! use warehouse3d::performance::PerformanceMonitor;
//!
//! let mut monitor = PerformanceMonitor::new();
//! monitor.begin_frame();
//! // ... render frame ...
//! monitor.end_frame();
//! assert_eq!(monitor.get_frame_time_history().len(), 1);
//! ```

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Performance metrics shown in the overlay
#[derive(Debug, Clone)]
pub struct PerformanceMetrics {
    /// Frames per second derived from the average frame time
    pub fps: f32,
    /// Average frame time in milliseconds
    pub frame_time_ms: f32,
    /// Minimum frame time in the current window
    pub min_frame_time_ms: f32,
    /// Maximum frame time in the current window
    pub max_frame_time_ms: f32,
    /// Meshes drawn in the last frame
    pub draw_calls: u32,
    /// Vertices submitted in the last frame
    pub vertex_count: u32,
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self {
            fps: 0.0,
            frame_time_ms: 0.0,
            min_frame_time_ms: f32::MAX,
            max_frame_time_ms: 0.0,
            draw_calls: 0,
            vertex_count: 0,
        }
    }
}

/// Performance monitoring system
pub struct PerformanceMonitor {
    /// Ring buffer of recent frame times for averaging
    frame_times: VecDeque<Duration>,
    max_samples: usize,
    frame_start: Option<Instant>,
    current_metrics: PerformanceMetrics,
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self::with_samples(120)
    }

    /// Averages over the last `max_samples` frames.
    pub fn with_samples(max_samples: usize) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(max_samples),
            max_samples: max_samples.max(1),
            frame_start: None,
            current_metrics: PerformanceMetrics::default(),
        }
    }

    /// Mark the beginning of a frame
    pub fn begin_frame(&mut self) {
        self.frame_start = Some(Instant::now());
    }

    /// Mark the end of a frame and update metrics
    pub fn end_frame(&mut self) {
        if let Some(start) = self.frame_start.take() {
            self.add_frame_time(start.elapsed());
        }
    }

    /// Add a frame time sample
    pub fn add_frame_time(&mut self, frame_time: Duration) {
        if self.frame_times.len() >= self.max_samples {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(frame_time);
        self.update_metrics();
    }

    fn update_metrics(&mut self) {
        if self.frame_times.is_empty() {
            return;
        }

        let total_time: Duration = self.frame_times.iter().sum();
        let avg_frame_time_ms = total_time.as_secs_f32() * 1000.0 / self.frame_times.len() as f32;

        self.current_metrics.frame_time_ms = avg_frame_time_ms;
        self.current_metrics.fps = if avg_frame_time_ms > 0.0 {
            1000.0 / avg_frame_time_ms
        } else {
            0.0
        };

        if let (Some(min_time), Some(max_time)) =
            (self.frame_times.iter().min(), self.frame_times.iter().max())
        {
            self.current_metrics.min_frame_time_ms = min_time.as_secs_f32() * 1000.0;
            self.current_metrics.max_frame_time_ms = max_time.as_secs_f32() * 1000.0;
        }
    }

    /// Update render statistics
    pub fn update_render_stats(&mut self, draw_calls: u32, vertex_count: u32) {
        self.current_metrics.draw_calls = draw_calls;
        self.current_metrics.vertex_count = vertex_count;
    }

    pub fn get_metrics(&self) -> &PerformanceMetrics {
        &self.current_metrics
    }

    /// Frame times in milliseconds, oldest first
    pub fn get_frame_time_history(&self) -> Vec<f32> {
        self.frame_times
            .iter()
            .map(|duration| duration.as_secs_f32() * 1000.0)
            .collect()
    }

    /// Reset all metrics and history
    pub fn reset(&mut self) {
        self.frame_times.clear();
        self.current_metrics = PerformanceMetrics::default();
        self.frame_start = None;
    }

    /// Render performance metrics UI panel
    pub fn render_ui(&self, ui: &imgui::Ui) {
        let display_size = ui.io().display_size;
        ui.window("Performance")
            .size([280.0, 190.0], imgui::Condition::FirstUseEver)
            .position([display_size[0] - 300.0, 80.0], imgui::Condition::FirstUseEver)
            .build(|| {
                let metrics = &self.current_metrics;

                ui.text(format!("FPS: {:.1}", metrics.fps));
                ui.same_line();
                ui.text(format!("Frame: {:.2}ms", metrics.frame_time_ms));
                ui.text(format!(
                    "Min {:.2}ms / Max {:.2}ms",
                    metrics.min_frame_time_ms, metrics.max_frame_time_ms
                ));

                ui.separator();
                ui.text(format!("Draw Calls: {}", metrics.draw_calls));
                ui.text(format!("Vertices: {}", metrics.vertex_count));

                if !self.frame_times.is_empty() {
                    ui.separator();
                    let frame_time_history = self.get_frame_time_history();
                    ui.plot_lines("##frame_times", &frame_time_history)
                        .graph_size([250.0, 50.0])
                        .scale_min(0.0)
                        .scale_max(50.0)
                        .build();
                }
            });
    }

    /// Compact FPS overlay in the top right corner
    pub fn render_overlay(&self, ui: &imgui::Ui) {
        let display_size = ui.io().display_size;
        let metrics = &self.current_metrics;

        ui.window("FPS")
            .size([120.0, 60.0], imgui::Condition::Always)
            .position([display_size[0] - 130.0, 10.0], imgui::Condition::Always)
            .no_decoration()
            .no_inputs()
            .bg_alpha(0.3)
            .build(|| {
                ui.text(format!("FPS: {:.0}", metrics.fps));
                ui.text(format!("{:.1}ms", metrics.frame_time_ms));
            });
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_recent_frames() {
        let mut monitor = PerformanceMonitor::with_samples(2);
        monitor.add_frame_time(Duration::from_millis(40));
        monitor.add_frame_time(Duration::from_millis(10));
        monitor.add_frame_time(Duration::from_millis(30));

        let metrics = monitor.get_metrics();
        assert!((metrics.frame_time_ms - 20.0).abs() < 1e-3);
        assert!((metrics.fps - 50.0).abs() < 1e-2);
        assert!((metrics.min_frame_time_ms - 10.0).abs() < 1e-3);
        assert!((metrics.max_frame_time_ms - 30.0).abs() < 1e-3);
        assert_eq!(monitor.get_frame_time_history().len(), 2);

        monitor.reset();
        assert!(monitor.get_frame_time_history().is_empty());
        assert_eq!(monitor.get_metrics().fps, 0.0);
    }
}
