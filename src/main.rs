use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use rcs_panel::commands::HELP;
use rcs_panel::{ControlPanel, OperatorCommand, PanelConfig, SimulatedPlant, TickSummary};
use rcs_panel_core::{AlarmObserver, AlarmRecord, Clock, SystemClock};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

/// rcs-panel - Reactor coolant system control panel simulator
#[derive(Parser, Debug, Clone)]
#[command(name = "rcs-panel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Debug verbosity level (0=quiet, 1=info, 2=debug, 3=trace)
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "0")]
    debug: u8,

    /// Config file to load instead of the per-user one
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Stop after this many ticks (0 runs until 'q')
    #[arg(short = 'n', long = "ticks", value_name = "COUNT")]
    ticks: Option<u64>,

    /// Seed for the simulated plant's noise
    #[arg(long = "seed", default_value = "1")]
    seed: u64,

    /// Write the default configuration to FILE and exit
    #[arg(long = "write-default-config", value_name = "FILE")]
    write_default_config: Option<PathBuf>,

    /// Never start the audible cue
    #[arg(long = "no-audio")]
    no_audio: bool,
}

/// Mirrors raised alarms into the log
struct LogObserver;

impl AlarmObserver for LogObserver {
    fn on_alarm_raised(&mut self, record: &AlarmRecord) {
        warn!("ALARM {}", record.display_line());
    }

    fn on_alarm_active_changed(&mut self, active: bool) {
        info!("Unacknowledged alarms: {}", if active { "yes" } else { "none" });
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Allow RUST_LOG to override CLI setting
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Some(path) = &cli.write_default_config {
        PanelConfig::default().save_to_path(path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    info!("Starting rcs-panel v{}", env!("CARGO_PKG_VERSION"));

    let config = PanelConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    let mut panel = ControlPanel::from_config(&config)?;
    panel.engine_mut().subscribe(Box::new(LogObserver));
    attach_audio(&mut panel, cli.no_audio);

    let clock = SystemClock::new();
    let mut plant = SimulatedPlant::nominal(cli.seed);
    let failed = panel.initialize(&plant, clock.now());
    if failed > 0 {
        warn!("{} component(s) failed to initialize", failed);
    }

    println!("{}", HELP);
    let mut interval = tokio::time::interval(config.tick_interval());
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticks = 0u64;
    let mut redraw = true;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = clock.now();
                plant.update(now);
                let summary = panel.tick(&plant, now);
                ticks += 1;
                if redraw || needs_redraw(&summary) {
                    draw(&panel);
                    redraw = false;
                }
                if cli.ticks.is_some_and(|limit| limit > 0 && ticks >= limit) {
                    break;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("stdin closed, shutting down");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<OperatorCommand>() {
                    Ok(OperatorCommand::Quit) => break,
                    Ok(command) => {
                        apply(command, &mut panel, &mut plant);
                        redraw = true;
                    }
                    Err(e) => println!("{} (h for help)", e),
                }
            }
        }
    }

    info!("Stopped after {} tick(s)", ticks);
    Ok(())
}

#[cfg(feature = "audio")]
fn attach_audio(panel: &mut ControlPanel, disabled: bool) {
    if disabled {
        return;
    }
    match rcs_panel_audio::AudioThreadCue::spawn() {
        Ok(cue) => panel.engine_mut().set_audible_cue(Box::new(cue)),
        Err(e) => log::error!("Audible cue unavailable: {:#}", e),
    }
}

#[cfg(not(feature = "audio"))]
fn attach_audio(_panel: &mut ControlPanel, disabled: bool) {
    if !disabled {
        info!("Built without the audio feature, alarms are silent");
    }
}

fn apply(command: OperatorCommand, panel: &mut ControlPanel, plant: &mut SimulatedPlant) {
    match command {
        OperatorCommand::Activate(trigger) => {
            if !panel.activate(&trigger) {
                println!("No screen for {:?}", trigger);
            }
        }
        OperatorCommand::Acknowledge => {
            let count = panel.acknowledge();
            println!("Acknowledged {} alarm(s)", count);
        }
        OperatorCommand::AcknowledgeOne(id) => {
            if !panel.acknowledge_condition(&id) {
                println!("Nothing to acknowledge for '{}'", id);
            }
        }
        OperatorCommand::Silence => panel.silence(),
        OperatorCommand::ToggleTrip => {
            let tripped = plant.toggle_trip();
            println!("Reactor trip {}", if tripped { "SET" } else { "reset" });
        }
        OperatorCommand::SetPumps(count) => plant.set_running_pumps(Some(count)),
        OperatorCommand::SetValue(kind, value) => plant.set_manual(kind, value),
        OperatorCommand::ClearLog => panel.clear_log(),
        OperatorCommand::Help => println!("{}", HELP),
        OperatorCommand::Quit => {}
    }
}

fn needs_redraw(summary: &TickSummary) -> bool {
    !summary.report.is_quiet()
}

fn draw(panel: &ControlPanel) {
    println!();
    println!("{}", chrono::Local::now().format("%H:%M:%S"));
    for line in panel.render_active() {
        println!("{}", line);
    }
}
