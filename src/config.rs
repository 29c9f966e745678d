use std::{path::PathBuf, time::Duration};

use anyhow::{anyhow, Context};
use itertools::Itertools;

pub const FLAGS: [&str; 4] = ["--clips <dir>", "--registry <file.json>", "--mute", "--help"];

/// Startup settings, layered as defaults < environment < command line
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory the instruments' clip names are resolved against
    pub clips: PathBuf,
    pub store_pause: Duration,
    /// JSON file to read instruments from instead of the built-in ones
    pub registry: Option<PathBuf>,
    pub mute: bool,
    pub help: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            clips: PathBuf::from("audio"),
            store_pause: Duration::from_secs(1),
            registry: None,
            mute: false,
            help: false,
        }
    }
}

impl Config {
    pub fn from_env_and_args() -> anyhow::Result<Self> {
        let mut config = Config::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        config.apply_args(std::env::args().skip(1))?;
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, var: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(clips) = var("ENCORE_CLIPS") {
            self.clips = PathBuf::from(clips);
        }
        if let Some(pause) = var("ENCORE_STORE_PAUSE") {
            self.store_pause = duration_str::parse(&pause)
                .map_err(|err| anyhow!("error parsing duration: {err}"))
                .context(format!("invalid ENCORE_STORE_PAUSE `{pause}`"))?;
        }
        if let Some(registry) = var("ENCORE_REGISTRY") {
            self.registry = Some(PathBuf::from(registry));
        }
        if let Some(mute) = var("ENCORE_MUTE") {
            self.mute = parse_switch(&mute).context("invalid ENCORE_MUTE")?;
        }
        Ok(())
    }

    pub fn apply_args<I>(&mut self, args: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--clips" => {
                    self.clips = args
                        .next()
                        .map(PathBuf::from)
                        .ok_or_else(|| anyhow!("`--clips` needs a directory"))?;
                }
                "--registry" => {
                    self.registry = Some(
                        args.next()
                            .map(PathBuf::from)
                            .ok_or_else(|| anyhow!("`--registry` needs a file"))?,
                    );
                }
                "--mute" => self.mute = true,
                "-h" | "--help" => self.help = true,
                _ => {
                    return Err(anyhow!(
                        "unknown argument `{arg}`. available: {}",
                        FLAGS.iter().map(|flag| format!("`{flag}`")).join(", ")
                    ))
                }
            }
        }
        Ok(())
    }

    pub fn usage() -> String {
        format!(
            "usage: encore [{}]\n\n\
            environment: ENCORE_CLIPS, ENCORE_STORE_PAUSE, ENCORE_REGISTRY, ENCORE_MUTE, RUST_LOG",
            FLAGS.iter().join("] [")
        )
    }
}

fn parse_switch(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("`{other}` is neither on nor off")),
    }
}
