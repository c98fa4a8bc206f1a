// Replays a recorded landmark stream through the gesture engine and prints the slide events

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use slidemotion_lib::core::config::{DetectorMode, Settings};
use slidemotion_lib::core::emitter::GestureSink;
use slidemotion_lib::core::gesture_engine::GestureEngine;
use slidemotion_lib::core::session_driver::SessionDriver;
use slidemotion_lib::core::slide_navigator::SlideNavigator;
use slidemotion_lib::models::pose::GestureEvent;
use slidemotion_lib::platform::pose::{JsonLinesSource, LandmarkSource, SourceConfig};

#[derive(Parser, Debug)]
#[command(
    name = "slidemotion",
    version,
    about = "Replay recorded pose landmarks and print the slide gestures they produce"
)]
struct ReplayArgs {
    /// JSON-lines landmark recording, one frame per line
    recording: PathBuf,

    /// Settings file; command line options override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Detection sensitivity (0.0-1.0, higher detects more easily)
    #[arg(long)]
    sensitivity: Option<f64>,

    /// presentation or calibration
    #[arg(long, value_parser = DetectorMode::from_string)]
    mode: Option<DetectorMode>,

    /// Number of slides in the deck to step through
    #[arg(long)]
    slides: Option<u32>,
}

impl ReplayArgs {
    /// Settings file first, then command line overrides
    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load_from(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => Settings::default(),
        };

        if let Some(sensitivity) = self.sensitivity {
            settings.sensitivity = sensitivity;
        }
        if let Some(mode) = self.mode {
            settings.mode = mode;
        }
        if self.slides.is_some() {
            settings.total_slides = self.slides;
        }

        settings.validate()?;
        Ok(settings)
    }
}

/// Prints each event and moves through the deck when one is loaded
struct ReplayConsole {
    navigator: Option<SlideNavigator>,
}

impl GestureSink for ReplayConsole {
    fn emit(&mut self, event: &GestureEvent) {
        match self.navigator.as_mut() {
            Some(navigator) => {
                let position = navigator.apply(event.kind);
                println!(
                    "{:>8} ms  {:<7}  slide {}/{}",
                    event.timestamp,
                    event.kind.to_string(),
                    position.slide_number,
                    position.total_slides
                );
            }
            None => println!("{:>8} ms  {}", event.timestamp, event.kind.to_string()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("slidemotion=info,slidemotion_lib=info")),
        )
        .init();

    let args = ReplayArgs::parse();
    let settings = args.settings()?;

    info!(
        "Sensitivity {:.2}, {} mode",
        settings.sensitivity,
        settings.mode.to_string()
    );

    let navigator = settings.total_slides.map(SlideNavigator::new).transpose()?;
    let engine = GestureEngine::with_sensitivity(
        ReplayConsole { navigator },
        settings.mode,
        settings.sensitivity,
    )?;

    let config = engine.config();
    info!(
        "Detector thresholds: arm_raised={:.3}, confidence={:.2}, cooldown={}ms",
        config.arm_raised_threshold, config.confidence_threshold, config.gesture_cooldown_ms
    );

    let mut source = JsonLinesSource::open(&args.recording, SourceConfig::from_detector(config))
        .await
        .with_context(|| format!("Cannot replay {}", args.recording.display()))?;

    let mut driver = SessionDriver::new(engine)
        .with_stall_timeout(Duration::from_millis(settings.source_stall_timeout_ms));

    let stop = driver.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.stop();
        }
    });

    let summary = driver.run(&mut source).await?;

    if source.skipped_lines() > 0 {
        warn!(
            "{} unreadable lines skipped in {}",
            source.skipped_lines(),
            source.get_source_info()
        );
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);

    let console = driver.into_engine().into_sink();
    if let Some(navigator) = console.navigator {
        println!("{}", serde_json::to_string_pretty(&navigator.position())?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<ReplayArgs, clap::Error> {
        ReplayArgs::try_parse_from(std::iter::once("slidemotion").chain(args.iter().copied()))
    }

    #[test]
    fn test_parse_overrides() {
        let args = parse(&["talk.jsonl", "--sensitivity", "0.8", "--mode", "calibration", "--slides", "12"])
            .unwrap();
        assert_eq!(args.recording, PathBuf::from("talk.jsonl"));

        let settings = args.settings().unwrap();
        assert_eq!(settings.sensitivity, 0.8);
        assert_eq!(settings.mode, DetectorMode::Calibration);
        assert_eq!(settings.total_slides, Some(12));
    }

    #[test]
    fn test_parse_equals_form() {
        let args = parse(&["talk.jsonl", "--sensitivity=0.25", "--mode=Presentation"]).unwrap();
        assert_eq!(args.sensitivity, Some(0.25));
        assert_eq!(args.mode, Some(DetectorMode::Presentation));
    }

    #[test]
    fn test_defaults_without_options() {
        let settings = parse(&["talk.jsonl"]).unwrap().settings().unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_parse_requires_recording() {
        assert!(parse(&["--sensitivity", "0.5"]).is_err());
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert!(parse(&["talk.jsonl", "--sensitivity"]).is_err());
        assert!(parse(&["talk.jsonl", "--slides", "many"]).is_err());
        assert!(parse(&["talk.jsonl", "--mode", "kiosk"]).is_err());
        assert!(parse(&["talk.jsonl", "--verbose"]).is_err());
        assert!(parse(&["a.jsonl", "b.jsonl"]).is_err());
    }

    #[test]
    fn test_out_of_range_sensitivity_rejected() {
        let args = parse(&["talk.jsonl", "--sensitivity", "1.5"]).unwrap();
        assert!(args.settings().is_err());
    }

    #[test]
    fn test_missing_settings_file_reported() {
        let args = parse(&["talk.jsonl", "--config", "/nonexistent/slidemotion.json"]).unwrap();
        assert!(args.settings().is_err());
    }
}
