use crate::app::{Arteria, Message};
use crate::metrics::PsdEstimator;
use crate::visualization::{decimate_min_max, padded_value_range};
use plotters::chart::ChartBuilder;
use plotters::series::LineSeries;
use plotters::style::{RGBColor, BLUE, RED};
use plotters_iced::{Chart, DrawingBackend};

const CHART_BACKGROUND: RGBColor = RGBColor(245, 245, 240);
const AXIS_COLOR: RGBColor = RGBColor(60, 60, 60);

// Chart types
pub struct SignalChartType<'a> {
    pub state: &'a Arteria,
}

pub struct SpectrumChartType<'a> {
    pub state: &'a Arteria,
}

pub struct OverviewChartType<'a> {
    pub state: &'a Arteria,
}

fn empty_chart<DB: DrawingBackend>(mut builder: ChartBuilder<DB>, caption: &str) {
    let chart = builder
        .margin(15)
        .caption(caption, ("sans-serif", 20))
        .x_label_area_size(0)
        .y_label_area_size(0)
        .build_cartesian_2d(0.0..1.0, 0.0..1.0)
        .expect("Failed to build chart");
    chart
        .plotting_area()
        .fill(&CHART_BACKGROUND)
        .expect("Failed to fill background");
}

// Animated chunk chart
impl<'a> Chart<Message> for SignalChartType<'a> {
    type State = ();

    fn build_chart<DB: DrawingBackend>(&self, _state: &Self::State, mut builder: ChartBuilder<DB>) {
        let chunk = match &self.state.current_chunk {
            Some(chunk) if !chunk.samples.is_empty() => chunk,
            _ => {
                empty_chart(builder, "Waiting for signal...");
                return;
            }
        };

        let sample_rate = self.state.active_sample_rate.max(1.0);
        let x0 = chunk.start_time_s;
        let x1 = x0 + self.state.playback.chunk_seconds() as f64;
        // The y-axis follows the loaded chunk, not the revealed prefix,
        // so the scale stays put while the trace sweeps across
        let (y0, y1) = padded_value_range(&chunk.samples);
        let visible = self.state.playback.visible_points(chunk.samples.len());

        let caption = format!(
            "Signal over time, {} ({:.1}s - {:.1}s)",
            self.state.playback.progress_label(),
            x0,
            x1
        );
        let mut chart = builder
            .margin(15)
            .caption(caption, ("sans-serif", 20))
            .x_label_area_size(25)
            .y_label_area_size(40)
            .build_cartesian_2d(x0..x1, y0..y1)
            .expect("Failed to build chart");

        chart
            .plotting_area()
            .fill(&CHART_BACKGROUND)
            .expect("Failed to fill background");
        chart
            .configure_mesh()
            .axis_style(AXIS_COLOR)
            .draw()
            .expect("Failed to draw mesh");

        chart
            .draw_series(LineSeries::new(
                chunk.samples[..visible]
                    .iter()
                    .enumerate()
                    .filter(|(_, value)| !value.is_nan())
                    .map(|(i, &value)| (x0 + i as f64 / sample_rate, value)),
                &RED,
            ))
            .expect("Failed to draw series");
    }
}

// PSD of the current chunk
impl<'a> Chart<Message> for SpectrumChartType<'a> {
    type State = ();

    fn build_chart<DB: DrawingBackend>(&self, _state: &Self::State, mut builder: ChartBuilder<DB>) {
        let chunk = match &self.state.current_chunk {
            Some(chunk) if chunk.samples.len() >= 64 => chunk,
            _ => {
                empty_chart(builder, "Spectrum");
                return;
            }
        };

        let sample_rate = self.state.active_sample_rate.max(1.0);
        let mut estimator = PsdEstimator::new(256);
        let psd = estimator.compute_psd(&chunk.samples);

        let max_freq = 15.0;
        let points: Vec<(f64, f64)> = psd
            .iter()
            .enumerate()
            .map(|(k, &power)| (estimator.bin_frequency(k, sample_rate), power))
            .take_while(|(freq, _)| *freq <= max_freq)
            .collect();

        let y_max = points
            .iter()
            .map(|(_, power)| *power)
            .fold(0.0, f64::max)
            .max(1e-12)
            * 1.1;

        let mut chart = builder
            .margin(15)
            .caption("Spectrum (PSD)", ("sans-serif", 20))
            .x_label_area_size(25)
            .y_label_area_size(40)
            .build_cartesian_2d(0.0..max_freq, 0.0..y_max)
            .expect("Failed to build chart");

        chart
            .plotting_area()
            .fill(&CHART_BACKGROUND)
            .expect("Failed to fill background");
        chart
            .configure_mesh()
            .axis_style(AXIS_COLOR)
            .draw()
            .expect("Failed to draw mesh");

        chart
            .draw_series(LineSeries::new(points, &BLUE))
            .expect("Failed to draw series");
    }
}

// Decimated full view of the generated signal, anomalies marked in red
impl<'a> Chart<Message> for OverviewChartType<'a> {
    type State = ();

    fn build_chart<DB: DrawingBackend>(&self, _state: &Self::State, mut builder: ChartBuilder<DB>) {
        let generated = match &self.state.generated {
            Some(generated) if !generated.samples.is_empty() => generated,
            _ => {
                empty_chart(builder, "Generated overview");
                return;
            }
        };

        let duration = generated.duration_seconds();
        let (y0, y1) = padded_value_range(&generated.samples);
        let points = decimate_min_max(&generated.samples, generated.sample_rate, 600);

        let mut chart = builder
            .margin(15)
            .caption("Generated overview", ("sans-serif", 20))
            .x_label_area_size(25)
            .y_label_area_size(40)
            .build_cartesian_2d(0.0..duration, y0..y1)
            .expect("Failed to build chart");

        chart
            .plotting_area()
            .fill(&CHART_BACKGROUND)
            .expect("Failed to fill background");
        chart
            .configure_mesh()
            .axis_style(AXIS_COLOR)
            .draw()
            .expect("Failed to draw mesh");

        chart
            .draw_series(LineSeries::new(points, &BLUE))
            .expect("Failed to draw series");

        // Injected anomaly intervals as markers along the bottom edge
        let marker_y = y0 + (y1 - y0) * 0.03;
        for (start, end) in &generated.anomalies {
            let rel_start = start.saturating_sub(generated.start_time) as f64 / 1e6;
            let rel_end = end.saturating_sub(generated.start_time) as f64 / 1e6;
            chart
                .draw_series(LineSeries::new(
                    [(rel_start, marker_y), (rel_end, marker_y)],
                    &RED,
                ))
                .expect("Failed to draw anomaly marker");
        }
    }
}
