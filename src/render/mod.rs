//! gnuplot charts of the torque curve and of the p-V loop.

use crate::base::error::{EngineError, Result};
use crate::engine::cycle_log::CycleSample;
use crate::sweep::TorqueCurve;
use crate::units::m3_to_cc;
use gnuplot::{AxesCommon, Caption, Figure};
use std::path::Path;

const SPEED_LABEL: &str = "Engine Speed [RPM]";
const SVG_SIZE: (u32, u32) = (800, 800);

/// Torque and power against engine speed, stacked with a shared speed axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    speed: Vec<f64>,
    torque: Vec<f64>,
    power: Vec<f64>,
    title: Option<String>,
}

impl Chart {
    pub fn from_curve(curve: &TorqueCurve) -> Result<Chart> {
        if curve.is_empty() {
            return Err(EngineError::Render("the torque curve has no samples".to_string()));
        }
        Ok(Chart {
            speed: curve.speed_log(),
            torque: curve.torque_log(),
            power: curve.power_log(),
            title: None,
        })
    }

    pub fn with_title(mut self, title: &str) -> Chart {
        self.title = Some(title.to_string());
        self
    }

    pub fn speed(&self) -> &[f64] {
        &self.speed
    }

    pub fn torque(&self) -> &[f64] {
        &self.torque
    }

    pub fn power(&self) -> &[f64] {
        &self.power
    }

    fn figure(&self) -> Figure {
        let mut fg = Figure::new();
        if let Some(title) = &self.title {
            fg.set_title(title);
        }
        fg.set_multiplot_layout(2, 1);
        fg.axes2d()
            .lines(self.speed.iter().copied(), self.torque.iter().copied(), &[Caption("Torque")])
            .set_x_label(SPEED_LABEL, &[])
            .set_y_label("Torque [Nm]", &[])
            .set_x_grid(true)
            .set_y_grid(true);
        fg.axes2d()
            .lines(self.speed.iter().copied(), self.power.iter().copied(), &[Caption("Power")])
            .set_x_label(SPEED_LABEL, &[])
            .set_y_label("Power [kW]", &[])
            .set_x_grid(true)
            .set_y_grid(true);
        fg
    }

    /// Opens an interactive gnuplot window
    pub fn show(&self) -> Result<()> {
        show(self.figure())
    }

    pub fn save_svg<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_svg(self.figure(), path.as_ref())
    }
}

/// Pressure against volume over one engine cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct PvChart {
    volume: Vec<f64>,   // [cm³]
    pressure: Vec<f64>, // [bar]
    title: String,
}

impl PvChart {
    pub fn from_cycle(cycle: &[CycleSample], title: &str) -> Result<PvChart> {
        if cycle.is_empty() {
            return Err(EngineError::Render("no complete engine cycle to plot".to_string()));
        }
        Ok(PvChart {
            volume: cycle.iter().map(|s| m3_to_cc(s.volume)).collect(),
            pressure: cycle.iter().map(|s| s.pressure / 1e5).collect(),
            title: title.to_string(),
        })
    }

    pub fn volume(&self) -> &[f64] {
        &self.volume
    }

    pub fn pressure(&self) -> &[f64] {
        &self.pressure
    }

    fn figure(&self) -> Figure {
        let mut fg = Figure::new();
        fg.set_title(&self.title);
        fg.axes2d()
            .lines(self.volume.iter().copied(), self.pressure.iter().copied(), &[Caption("p-V")])
            .set_x_label("Volume [cm³]", &[])
            .set_y_label("Pressure [bar]", &[])
            .set_x_grid(true)
            .set_y_grid(true);
        fg
    }

    pub fn show(&self) -> Result<()> {
        show(self.figure())
    }

    pub fn save_svg<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_svg(self.figure(), path.as_ref())
    }
}

fn show(mut fg: Figure) -> Result<()> {
    fg.show().map_err(|err| EngineError::Render(err.to_string()))?;
    Ok(())
}

fn save_svg(mut fg: Figure, path: &Path) -> Result<()> {
    fg.save_to_svg(path, SVG_SIZE.0, SVG_SIZE.1)
        .map_err(|err| EngineError::Render(format!("{}: {}", path.display(), err)))?;
    log::info!("chart written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::Sample;
    use approx::assert_relative_eq;

    #[test]
    fn chart_series_share_length() {
        let curve: TorqueCurve = (1..=5)
            .map(|i| Sample {
                speed_rpm: 1000.0 * i as f64,
                torque: 10.0 - i as f64,
            })
            .collect();
        let chart = Chart::from_curve(&curve).unwrap().with_title("test");
        assert_eq!(chart.speed().len(), 5);
        assert_eq!(chart.torque(), &[9.0, 8.0, 7.0, 6.0, 5.0]);
        assert_relative_eq!(chart.power()[0], curve.samples()[0].power_kw());
    }

    #[test]
    fn empty_curve_cannot_be_plotted() {
        assert!(matches!(Chart::from_curve(&TorqueCurve::new()), Err(EngineError::Render(_))));
        assert!(PvChart::from_cycle(&[], "empty").is_err());
    }

    #[test]
    fn pv_chart_units() {
        let cycle = [CycleSample {
            crank_angle: 10.0,
            volume: 2e-5,
            pressure: 3e5,
            temperature: 400.0,
            torque: 1.0,
        }];
        let chart = PvChart::from_cycle(&cycle, "pv").unwrap();
        assert_relative_eq!(chart.volume()[0], 20.0, max_relative = 1e-12);
        assert_relative_eq!(chart.pressure()[0], 3.0, max_relative = 1e-12);
    }
}
