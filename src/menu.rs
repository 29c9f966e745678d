use std::{
    fmt,
    io::{self, BufRead, Write},
    thread,
    time::Duration,
};

use itertools::Itertools;
use log::{debug, error, info, warn};

use libencore::prelude::instrument::*;

use crate::registry::Registry;

const FAREWELL: &str = "Thank you po for your time!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuError {
    NotANumber(String),
    OutOfRange { choice: usize, max: usize },
    UnknownAction(String),
}

impl fmt::Display for MenuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuError::NotANumber(input) => write!(f, "`{input}` is not a number"),
            MenuError::OutOfRange { choice, max } => {
                write!(f, "{choice} is not between 1 and {max}")
            }
            MenuError::UnknownAction(input) => write!(f, "`{input}` is not an action"),
        }
    }
}

impl std::error::Error for MenuError {}

impl From<UnknownAction> for MenuError {
    fn from(UnknownAction(input): UnknownAction) -> Self {
        MenuError::UnknownAction(input)
    }
}

/// A valid answer at the instrument list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Exit,
    /// 0-based index into the registry
    Instrument(usize),
}

impl Selection {
    /// Only a bare `0` exits. Anything other than a plain run of digits is not a number, and
    /// `00` is out of range.
    pub fn parse(choice: &str, available: usize) -> Result<Self, MenuError> {
        let choice = choice.trim();
        if choice == "0" {
            return Ok(Selection::Exit);
        }
        if choice.is_empty() || !choice.chars().all(|c| c.is_ascii_digit()) {
            return Err(MenuError::NotANumber(choice.to_string()));
        }
        let number = choice
            .parse::<usize>()
            .map_err(|_| MenuError::NotANumber(choice.to_string()))?;
        match number {
            n if (1..=available).contains(&n) => Ok(Selection::Instrument(n - 1)),
            n => Err(MenuError::OutOfRange {
                choice: n,
                max: available,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    TopLevel,
    /// Showing the actions of the instrument at this registry index
    Detail(usize),
    Exited,
}

/// The console loop: pick an instrument, then act on it until it is stored
#[derive(Debug)]
pub struct Menu<'r, R, W, P> {
    registry: &'r mut Registry,
    input: R,
    output: W,
    player: P,
    store_pause: Duration,
    state: MenuState,
}

impl<'r, R, W, P> Menu<'r, R, W, P>
where
    R: BufRead,
    W: Write,
    P: Player,
{
    pub fn new(registry: &'r mut Registry, input: R, output: W, player: P) -> Self {
        Menu {
            registry,
            input,
            output,
            player,
            store_pause: Duration::from_secs(1),
            state: MenuState::TopLevel,
        }
    }

    pub fn with_store_pause(mut self, store_pause: Duration) -> Self {
        self.store_pause = store_pause;
        self
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    /// Runs until the user exits or input runs out
    pub fn run(&mut self) -> io::Result<()> {
        while self.state != MenuState::Exited {
            self.step()?;
        }
        Ok(())
    }

    /// Shows the current menu and handles one line of input
    pub fn step(&mut self) -> io::Result<()> {
        match self.state {
            MenuState::TopLevel => {
                self.show_instruments()?;
                match self.prompt("Choose an instrument: ")? {
                    Some(choice) => self.select(&choice),
                    None => self.exit(),
                }
            }
            MenuState::Detail(index) => {
                let Some(instrument) = self.registry.get(index) else {
                    warn!("instrument {index} disappeared from the registry");
                    self.state = MenuState::TopLevel;
                    return Ok(());
                };
                let header = format!("{} - {}", instrument.kind(), instrument.brand());
                writeln!(self.output, "\n{header}")?;
                for action in Action::ALL {
                    writeln!(self.output, "{action}")?;
                }
                match self.prompt("Choose an action: ")? {
                    Some(choice) => self.act(index, &choice),
                    None => self.exit(),
                }
            }
            MenuState::Exited => Ok(()),
        }
    }

    fn show_instruments(&mut self) -> io::Result<()> {
        let listing = self
            .registry
            .iter()
            .enumerate()
            .map(|(i, instrument)| format!("{}. {} ({})", i + 1, instrument.kind(), instrument.brand()))
            .join("\n");
        writeln!(self.output, "\nInstrument Menu:\n{listing}\n0. Exit")
    }

    /// `None` once input is exhausted
    fn prompt(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            debug!("input closed");
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn select(&mut self, choice: &str) -> io::Result<()> {
        match Selection::parse(choice, self.registry.len()) {
            Ok(Selection::Exit) => self.exit(),
            Ok(Selection::Instrument(index)) => self.enter(index),
            Err(err) => {
                debug!("rejected instrument choice: {err}");
                writeln!(self.output, "Invalid choice.")
            }
        }
    }

    fn enter(&mut self, index: usize) -> io::Result<()> {
        let Some(instrument) = self.registry.get(index) else {
            return writeln!(self.output, "Invalid choice.");
        };
        info!("selected {} ({})", instrument.kind(), instrument.brand());

        writeln!(self.output, "\n--- {} Properties ---", instrument.kind())?;
        for attribute in instrument.attributes() {
            writeln!(self.output, "{attribute}")?;
        }
        self.state = MenuState::Detail(index);
        Ok(())
    }

    fn act(&mut self, index: usize, choice: &str) -> io::Result<()> {
        let action = match Action::from_choice(choice).map_err(MenuError::from) {
            Ok(action) => action,
            Err(err) => {
                debug!("rejected action: {err}");
                return writeln!(self.output, "Invalid option.");
            }
        };
        let Some(instrument) = self.registry.get_mut(index) else {
            self.state = MenuState::TopLevel;
            return Ok(());
        };

        let clip = instrument.clip();
        match instrument.perform(action, &mut self.player) {
            Ok(Outcome::Played(played)) => {
                debug!("finished playing {played}");
                Ok(())
            }
            Ok(Outcome::Tuned) => Ok(()),
            Ok(Outcome::Advice(advice)) => writeln!(self.output, "{advice}"),
            Ok(Outcome::ReturnToMenu(advice)) => {
                writeln!(self.output, "{advice}")?;
                writeln!(self.output, "Returning to main menu...\n")?;
                self.output.flush()?;
                if !self.store_pause.is_zero() {
                    thread::sleep(self.store_pause);
                }
                self.state = MenuState::TopLevel;
                Ok(())
            }
            Err(err) => {
                error!("{err:?}");
                writeln!(self.output, "Could not play {clip}: {err:#}")
            }
        }
    }

    fn exit(&mut self) -> io::Result<()> {
        writeln!(self.output, "{FAREWELL}")?;
        self.output.flush()?;
        self.state = MenuState::Exited;
        Ok(())
    }
}
