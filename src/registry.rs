use std::{fs, path::Path};

use anyhow::{anyhow, Context};
use log::info;

use libencore::prelude::instrument::*;

/// The instruments available for selection, in display order
#[derive(Debug)]
pub struct Registry {
    instruments: Vec<Box<dyn Instrument>>,
}

impl Registry {
    pub fn new<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Record>,
    {
        Registry {
            instruments: records.into_iter().map(Box::<dyn Instrument>::from).collect(),
        }
    }

    /// Reads a JSON array of [Record]s
    pub fn load<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("while reading registry `{}`", path.display()))?;
        let records: Vec<Record> = serde_json::from_str(&json)
            .with_context(|| format!("while parsing registry `{}`", path.display()))?;
        if records.is_empty() {
            return Err(anyhow!("registry `{}` has no instruments", path.display()));
        }
        info!("loaded {} instruments from `{}`", records.len(), path.display());
        Ok(Registry::new(records))
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&dyn Instrument> {
        self.instruments.get(index).map(|instrument| &**instrument)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut (dyn Instrument + 'static)> {
        self.instruments
            .get_mut(index)
            .map(|instrument| &mut **instrument)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Instrument> {
        self.instruments.iter().map(|instrument| &**instrument)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new([
            Record::Guitar(Guitar::new(
                "Mahogany", "Ibanez", 12000, 6, "Acoustic", "Rosewood", "Humbucker",
            )),
            Record::Piano(Piano::new(
                "Spruce", "Kawai", 350000, 88, true, "Maple", "Stable",
            )),
            Record::Drums(Drums::new(
                "Birch", "Pearl", 85000, "Full Size", "Mylar", "Birch",
            )),
            Record::Violin(Violin::new(
                "Maple",
                "Stradivarius",
                200000,
                "Baroque",
                "4/4",
                "Nylon",
                "Ebony",
            )),
        ])
    }
}
