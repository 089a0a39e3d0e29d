// settings.rs - Command-line overrides for the window and the tick loop

use std::time::Duration;

use anyhow::{Context, bail};
use life_engine::SchedulerConfig;

/// Screen pixels per grid cell.
pub const CELL_SCALE: f32 = 15.0;

pub const USAGE: &str = "usage: life_touch [--scale PIXELS] [--tick-ms MS] [--pause-poll-ms MS]";

#[derive(Debug, Clone)]
pub struct Settings {
    pub cell_scale: f32,
    pub scheduler: SchedulerConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cell_scale: CELL_SCALE,
            scheduler: SchedulerConfig::default(),
        }
    }
}

impl Settings {
    pub fn from_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<Self> {
        let mut settings = Settings::default();
        let mut args = args.into_iter();

        while let Some(flag) = args.next() {
            let mut value = || args.next().with_context(|| format!("{flag} requires a value\n{USAGE}"));
            match flag.as_str() {
                "--scale" => {
                    let scale: f32 = value()?.parse().context("--scale requires a number")?;
                    if !scale.is_finite() || scale < 1.0 {
                        bail!("--scale must be at least 1 pixel, got {scale}");
                    }
                    settings.cell_scale = scale;
                }
                "--tick-ms" => {
                    let ms: u64 = value()?.parse().context("--tick-ms requires a positive integer")?;
                    settings.scheduler = settings.scheduler.min_tick(Duration::from_millis(ms));
                }
                "--pause-poll-ms" => {
                    let ms: u64 = value()?.parse().context("--pause-poll-ms requires a positive integer")?;
                    if ms == 0 {
                        bail!("--pause-poll-ms must be greater than zero");
                    }
                    settings.scheduler = settings.scheduler.pause_poll(Duration::from_millis(ms));
                }
                other => bail!("unknown argument: {other}\n{USAGE}"),
            }
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<Settings> {
        Settings::from_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults_match_the_original_pacing() {
        let settings = parse(&[]).unwrap();
        assert_eq!(settings.cell_scale, 15.0);
        assert_eq!(settings.scheduler.min_tick, Duration::from_millis(200));
        assert_eq!(settings.scheduler.pause_poll, Duration::from_millis(100));
    }

    #[test]
    fn overrides_are_applied() {
        let settings = parse(&["--scale", "8", "--tick-ms", "50", "--pause-poll-ms", "25"]).unwrap();
        assert_eq!(settings.cell_scale, 8.0);
        assert_eq!(settings.scheduler.min_tick, Duration::from_millis(50));
        assert_eq!(settings.scheduler.pause_poll, Duration::from_millis(25));
    }

    #[test]
    fn bad_input_is_an_error() {
        assert!(parse(&["--scale"]).is_err());
        assert!(parse(&["--scale", "0.5"]).is_err());
        assert!(parse(&["--tick-ms", "fast"]).is_err());
        assert!(parse(&["--pause-poll-ms", "0"]).is_err());
        assert!(parse(&["--fullscreen"]).is_err());
    }
}
