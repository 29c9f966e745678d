use std::io;

use log::{info, warn};

use encore::{Config, Menu, Registry};
use libencore::prelude::instrument::Player;
use sampler::{DevicePlayer, MutePlayer};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Config::from_env_and_args()?;
    if config.help {
        println!("{}", Config::usage());
        return Ok(());
    }
    info!("{config:?}");

    let mut registry = match &config.registry {
        Some(path) => Registry::load(path)?,
        None => Registry::default(),
    };

    if !config.mute && !config.clips.is_dir() {
        warn!(
            "clip directory `{}` does not exist, playing will fail",
            config.clips.display()
        );
    }
    let player: Box<dyn Player> = if config.mute {
        Box::new(MutePlayer::new(&config.clips))
    } else {
        Box::new(DevicePlayer::new(&config.clips))
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    Menu::new(&mut registry, stdin.lock(), stdout.lock(), player)
        .with_store_pause(config.store_pause)
        .run()?;
    Ok(())
}
