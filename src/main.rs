use ansi_term::Style;
use clap::{Arg, ArgAction, ArgMatches, Command};
use torque_curve as tc;
use tc::{run_sweep, units, Chart, Engine, PvChart, RunConfig, Source, SweepPlan, SweepVariant, TorqueCurve};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("{} {}", Style::new().bold().paint("Error:"), err);
        std::process::exit(1);
    }
}

fn cli() -> Command {
    Command::new("torque_curve")
        .about("Sweeps a single-cylinder engine across speed and plots its torque and power curves.")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("config")
                .long("config")
                .help("JSON run file")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("variant")
                .long("variant")
                .help("Sweep with the reference settings of one of the two variants")
                .value_parser(["reconfigure", "batch"]),
        )
        .arg(
            Arg::new("native")
                .long("native")
                .help("Query the prebuilt shared library instead of the simulated engine")
                .value_name("PATH"),
        )
        .arg(
            Arg::new("svg")
                .long("svg")
                .help("Also write the chart to an SVG file")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("no-show")
                .long("no-show")
                .help("Do not open a gnuplot window")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("pv")
                .long("pv")
                .help("Plot the p-V loop of the simulated engine at this speed")
                .value_name("RPM")
                .value_parser(clap::value_parser!(f64)),
        )
}

/// Run file first, then command line overrides
fn load_config(matches: &ArgMatches) -> tc::Result<RunConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => RunConfig::from_file(path)?,
        None => RunConfig::default(),
    };
    if let Some(variant) = matches.get_one::<String>("variant") {
        config.sweep = if variant == "batch" {
            SweepPlan::for_variant(SweepVariant::Preconfigured)
        } else {
            SweepPlan::for_variant(SweepVariant::Reconfigure)
        };
    }
    if let Some(path) = matches.get_one::<String>("native") {
        config.source = Source::Native { path: path.clone() };
    }
    if let Some(path) = matches.get_one::<String>("svg") {
        config.output = Some(path.clone());
    }
    if matches.get_flag("no-show") {
        config.show = false;
    }
    Ok(config)
}

/// Speed of the p-V loop, only the simulated engine exposes its cycle
fn pv_speed(matches: &ArgMatches, config: &RunConfig) -> Option<f64> {
    let rpm = matches.get_one::<f64>("pv").copied()?;
    match config.source {
        Source::Simulated => Some(rpm),
        Source::Native { .. } => {
            log::warn!("--pv needs the simulated engine, ignored for a native source");
            None
        }
    }
}

fn run() -> tc::Result<()> {
    let matches = cli().get_matches();
    let config = load_config(&matches)?;
    let pv = pv_speed(&matches, &config);

    let (curve, title) = match &config.source {
        Source::Simulated => {
            let mut engine = Engine::new(config.engine.clone())?;
            println!("{}", engine);
            let curve = run_sweep(&mut engine, &config.sweep, &config.engine)?;
            if let Some(rpm) = pv {
                plot_pv(&mut engine, rpm, &config)?;
            }
            (curve, "Simulated engine".to_string())
        }
        Source::Native { path } => (native_curve(path, &config)?, path.clone()),
    };

    print_table(&curve);
    let chart = Chart::from_curve(&curve)?.with_title(&title);
    if let Some(path) = &config.output {
        chart.save_svg(path)?;
    }
    if config.show {
        chart.show()?;
    }
    Ok(())
}

#[cfg(feature = "native")]
fn native_curve(path: &str, config: &RunConfig) -> tc::Result<TorqueCurve> {
    let mut engine = tc::NativeEngine::open(path)?;
    match config.sweep.variant {
        SweepVariant::Preconfigured => engine.run_batch(),
        SweepVariant::Reconfigure => run_sweep(&mut engine, &config.sweep, &config.engine),
    }
}

#[cfg(not(feature = "native"))]
fn native_curve(path: &str, _: &RunConfig) -> tc::Result<TorqueCurve> {
    Err(tc::EngineError::Config(format!(
        "cannot load {}: built without the `native` feature",
        path
    )))
}

fn plot_pv(engine: &mut Engine, rpm: f64, config: &RunConfig) -> tc::Result<()> {
    let torque = engine.mean_cycle_torque(units::rpm_to_rads(rpm), 1)?;
    log::info!("p-V loop at {:.0} rpm, mean torque {:.2} Nm", rpm, torque);
    let chart = PvChart::from_cycle(engine.last_cycle(), &format!("p-V loop at {:.0} rpm", rpm))?;
    if let Some(path) = &config.output {
        let pv_path = std::path::Path::new(path).with_extension("pv.svg");
        chart.save_svg(pv_path)?;
    }
    if config.show {
        chart.show()?;
    }
    Ok(())
}

fn print_table(curve: &TorqueCurve) {
    println!(
        "{}",
        Style::new().bold().paint(format!("{:>8} {:>12} {:>12}", "rpm", "torque [Nm]", "power [kW]"))
    );
    for sample in curve.samples() {
        println!(
            "{:>8.0} {:>12.2} {:>12.3}",
            sample.speed_rpm,
            sample.torque,
            sample.power_kw()
        );
    }
    if let Some(peak) = curve.peak_power() {
        println!(
            "{} {:.3} kW @ {:.0} rpm",
            Style::new().underline().paint("peak power:"),
            peak.power_kw(),
            peak.speed_rpm
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn command_line_overrides() {
        let matches = cli()
            .try_get_matches_from(["torque_curve", "--variant", "batch", "--no-show", "--svg", "out.svg"])
            .unwrap();
        let config = load_config(&matches).unwrap();
        assert_eq!(config.sweep.variant, SweepVariant::Preconfigured);
        assert_eq!(config.sweep, SweepPlan::for_variant(SweepVariant::Preconfigured));
        assert!(!config.show);
        assert_eq!(config.output.as_deref(), Some("out.svg"));
        assert_eq!(config.source, Source::Simulated);
    }

    #[test]
    fn unknown_variant_is_rejected() {
        assert!(cli().try_get_matches_from(["torque_curve", "--variant", "fast"]).is_err());
    }

    #[test]
    fn pv_loop_only_for_the_simulated_engine() {
        let matches = cli()
            .try_get_matches_from(["torque_curve", "--pv", "3000", "--native", "build/libtorqueCurve.so"])
            .unwrap();
        let config = load_config(&matches).unwrap();
        assert_eq!(pv_speed(&matches, &config), None);

        let matches = cli().try_get_matches_from(["torque_curve", "--pv", "3000"]).unwrap();
        let config = load_config(&matches).unwrap();
        assert_eq!(pv_speed(&matches, &config), Some(3000.0));
    }

    #[test]
    fn run_file_variant_selects_the_batch_entry_point() {
        let path = std::env::temp_dir().join("torque_curve_batch_run.json");
        std::fs::write(
            &path,
            r#"{ "source": { "type": "native", "path": "build/libtorqueCurve.so" },
                 "sweep": { "variant": "preconfigured" } }"#,
        )
        .unwrap();
        let matches = cli()
            .try_get_matches_from(["torque_curve", "--config", path.to_str().unwrap()])
            .unwrap();
        let config = load_config(&matches).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.sweep.variant, SweepVariant::Preconfigured);
        assert_eq!(
            config.source,
            Source::Native { path: "build/libtorqueCurve.so".to_string() }
        );
    }
}
