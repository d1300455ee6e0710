//! Step Response Example
//!
//! Runs a P-only and a PI session side by side on a loaded flywheel and plots
//! both responses. The P loop settles short of the setpoint because the load
//! torque needs a standing command; the integral term removes that error.

use loopsim_app::{Command, EngineConfig, Scheduler};
use plotters::prelude::*;
use simcore::{SimulationParameters, Snapshot};

const DT: f64 = 0.01;
const STEPS: usize = 1500;
const SETPOINT: f64 = 3.0;
const DRAG: f64 = 0.1;
const INERTIA: f64 = 1.0;
const LOAD_TORQUE: f64 = 0.2;

fn simulate(ki: f64) -> Snapshot {
    let mut scheduler = Scheduler::new(&EngineConfig::default());
    let params = SimulationParameters::flywheel(DT, 2.0, SETPOINT, DRAG, INERTIA, LOAD_TORQUE)
        .with_gains(ki, 0.0);
    scheduler.handle(Command::Start { params, running: true });
    scheduler.run_steps(STEPS);
    scheduler.flush()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filename = "step_response.png";
    let p_only = simulate(0.0);
    let pi = simulate(1.0);

    let root = BitMapBackend::new(filename, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let t_max = STEPS as f64 * DT;
    let y_max = p_only
        .y
        .iter()
        .chain(pi.y.iter())
        .cloned()
        .fold(SETPOINT, f64::max)
        * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption("Flywheel speed under load: P vs PI", ("Arial", 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..t_max, -0.1..y_max)?;

    chart.configure_mesh().x_desc("t (s)").y_desc("ω (rad/s)").draw()?;

    chart
        .draw_series(LineSeries::new(
            p_only.t.iter().cloned().zip(p_only.sp.iter().cloned()),
            &BLACK,
        ))?
        .label("setpoint")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK.filled()));

    chart
        .draw_series(LineSeries::new(
            p_only.t.iter().cloned().zip(p_only.y.iter().cloned()),
            &RED,
        ))?
        .label("P")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.filled()));

    chart
        .draw_series(LineSeries::new(
            pi.t.iter().cloned().zip(pi.y.iter().cloned()),
            &BLUE,
        ))?
        .label("PI")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.filled()));

    chart.configure_series_labels().border_style(&BLACK).draw()?;

    root.present()?;
    if let (Some(p), Some(pi)) = (p_only.last(), pi.last()) {
        println!("final speed: P = {:.3}, PI = {:.3} (setpoint {SETPOINT})", p.1, pi.1);
    }
    println!("wrote {filename}");
    Ok(())
}
