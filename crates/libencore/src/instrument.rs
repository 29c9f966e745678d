use std::fmt;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{Attribute, Clips};

/// Plays a named clip and returns once playback has finished.
///
/// How the clip is found, decoded and sent to a device is entirely up to the implementor.
pub trait Player {
    fn play(&mut self, clip: &str) -> anyhow::Result<()>;
}

impl<P> Player for Box<P>
where
    P: Player + ?Sized,
{
    fn play(&mut self, clip: &str) -> anyhow::Result<()> {
        (**self).play(clip)
    }
}

/// Fields shared by every instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub material: String,
    pub brand: String,
    pub price: u64,
    // Records always start untuned, even when loaded from a file
    #[serde(skip)]
    tuned: bool,
}

impl Profile {
    pub fn new<M, B>(material: M, brand: B, price: u64) -> Self
    where
        M: Into<String>,
        B: Into<String>,
    {
        Profile {
            material: material.into(),
            brand: brand.into(),
            price,
            tuned: false,
        }
    }

    pub fn is_tuned(&self) -> bool {
        self.tuned
    }

    /// Once tuned, a profile stays tuned
    pub fn tune(&mut self) {
        self.tuned = true;
    }
}

/// The four things that can be done to a selected instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    PlaySound,
    Tune,
    MaintenanceInfo,
    Store,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::PlaySound,
        Action::Tune,
        Action::MaintenanceInfo,
        Action::Store,
    ];

    /// Parses a 1-based menu choice
    pub fn from_choice(choice: &str) -> Result<Self, UnknownAction> {
        match choice.trim() {
            "1" => Ok(Action::PlaySound),
            "2" => Ok(Action::Tune),
            "3" => Ok(Action::MaintenanceInfo),
            "4" => Ok(Action::Store),
            other => Err(UnknownAction(other.to_string())),
        }
    }

    pub fn choice(&self) -> usize {
        match self {
            Action::PlaySound => 1,
            Action::Tune => 2,
            Action::MaintenanceInfo => 3,
            Action::Store => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Action::PlaySound => "Play Sound",
            Action::Tune => "Tune",
            Action::MaintenanceInfo => "Maintenance Info",
            Action::Store => "Store (Back to Menu)",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.choice(), self.label())
    }
}

/// A menu choice that names none of the four [Action]s
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction(pub String);

impl fmt::Display for UnknownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` is not an action", self.0)
    }
}

impl std::error::Error for UnknownAction {}

/// What happened after an [Action] was performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Carries the clip that was played
    Played(&'static str),
    Tuned,
    Advice(&'static str),
    /// Storage advice, after which the caller goes back to the instrument list
    ReturnToMenu(&'static str),
}

/// An Instrument is a [Profile] plus the fixed behavior of its variant.
///
/// Variants only describe themselves; playing, tuning, storing and listing attributes are
/// provided on top of that description.
pub trait Instrument: fmt::Debug {
    fn kind(&self) -> &'static str;
    fn classification(&self) -> &'static str;
    fn profile(&self) -> &Profile;
    fn profile_mut(&mut self) -> &mut Profile;
    fn clips(&self) -> Clips;
    fn maintenance_info(&self) -> &'static str;
    fn storage_info(&self) -> &'static str;
    /// Variant-specific attributes, in display order
    fn extra_attributes(&self) -> Vec<Attribute>;

    fn brand(&self) -> &str {
        &self.profile().brand
    }

    fn is_tuned(&self) -> bool {
        self.profile().is_tuned()
    }

    /// Name of the clip [play_sound](Instrument::play_sound) would play right now
    fn clip(&self) -> &'static str {
        self.clips().select(self.is_tuned())
    }

    fn play_sound(&self, player: &mut dyn Player) -> anyhow::Result<()> {
        let clip = self.clip();
        debug!("{} playing `{clip}` (tuned: {})", self.kind(), self.is_tuned());
        player.play(clip)
    }

    fn tune(&mut self) {
        self.profile_mut().tune();
        info!("{} ({}) tuned", self.kind(), self.brand());
    }

    fn store(&self) -> Outcome {
        Outcome::ReturnToMenu(self.storage_info())
    }

    fn attributes(&self) -> Vec<Attribute> {
        let profile = self.profile();
        let mut attributes = vec![
            Attribute::new("instrument_type", self.kind()),
            Attribute::new("instrument_classification", self.classification()),
            Attribute::new("material", &profile.material),
            Attribute::new("brand", &profile.brand),
            Attribute::new("price", profile.price),
            Attribute::new("is_tuned", profile.is_tuned()),
        ];
        attributes.extend(self.extra_attributes());
        attributes
    }

    fn perform(&mut self, action: Action, player: &mut dyn Player) -> anyhow::Result<Outcome> {
        match action {
            Action::PlaySound => {
                self.play_sound(player)?;
                Ok(Outcome::Played(self.clip()))
            }
            Action::Tune => {
                self.tune();
                Ok(Outcome::Tuned)
            }
            Action::MaintenanceInfo => Ok(Outcome::Advice(self.maintenance_info())),
            Action::Store => Ok(self.store()),
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;
    use crate::variants::{Drums, Guitar};

    #[derive(Debug, Default)]
    struct Recorder(Vec<String>);

    impl Player for Recorder {
        fn play(&mut self, clip: &str) -> anyhow::Result<()> {
            self.0.push(clip.to_string());
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Broken;

    impl Player for Broken {
        fn play(&mut self, clip: &str) -> anyhow::Result<()> {
            Err(anyhow!("`{clip}` is missing"))
        }
    }

    fn guitar() -> Guitar {
        Guitar::new("Mahogany", "Ibanez", 12000, 6, "Acoustic", "Rosewood", "Humbucker")
    }

    #[test]
    fn test_tune_is_idempotent() {
        let mut guitar = guitar();
        assert!(!guitar.is_tuned());
        guitar.tune();
        assert!(guitar.is_tuned());
        guitar.tune();
        assert!(guitar.is_tuned());
    }

    #[test]
    fn test_play_follows_tuned_state() {
        let mut recorder = Recorder::default();
        let mut drums = Drums::new("Birch", "Pearl", 85000, "Full Size", "Mylar", "Birch");

        drums.play_sound(&mut recorder).unwrap();
        drums.tune();
        drums.play_sound(&mut recorder).unwrap();

        assert_eq!(recorder.0, vec!["drums_untuned.wav", "drums_tuned.wav"]);
    }

    #[test]
    fn test_perform() {
        let mut recorder = Recorder::default();
        let mut guitar = guitar();

        assert_eq!(
            guitar.perform(Action::PlaySound, &mut recorder).unwrap(),
            Outcome::Played("guitar_untuned.mp4")
        );
        assert_eq!(
            guitar.perform(Action::Tune, &mut recorder).unwrap(),
            Outcome::Tuned
        );
        assert_eq!(
            guitar.perform(Action::MaintenanceInfo, &mut recorder).unwrap(),
            Outcome::Advice("Change strings regularly and clean fretboard.")
        );
        assert_eq!(
            guitar.perform(Action::Store, &mut recorder).unwrap(),
            Outcome::ReturnToMenu("Store in a hard case to avoid warping.")
        );
        assert!(guitar.is_tuned());
        assert_eq!(recorder.0, vec!["guitar_untuned.mp4"]);
    }

    #[test]
    fn test_player_errors_pass_through() {
        let mut guitar = guitar();
        let err = guitar.perform(Action::PlaySound, &mut Broken).unwrap_err();
        assert_eq!(err.to_string(), "`guitar_untuned.mp4` is missing");
        assert!(!guitar.is_tuned());
    }

    #[test]
    fn test_attributes_start_with_profile() {
        let labels = guitar()
            .attributes()
            .into_iter()
            .map(|attribute| attribute.to_string())
            .collect::<Vec<_>>();

        assert_eq!(
            labels,
            vec![
                "Instrument type: Guitar",
                "Instrument classification: String",
                "Material: Mahogany",
                "Brand: Ibanez",
                "Price: 12000",
                "Is tuned: false",
                "Strings: 6",
                "Type: Acoustic",
                "Fretboard material: Rosewood",
                "Pickup type: Humbucker",
            ]
        );
    }

    #[test]
    fn test_action_choices() {
        for action in Action::ALL {
            assert_eq!(
                Action::from_choice(&action.choice().to_string()),
                Ok(action)
            );
        }
        assert_eq!(Action::from_choice(" 2\n"), Ok(Action::Tune));
        for choice in ["0", "5", "tune", "+1", "01", ""] {
            assert_eq!(
                Action::from_choice(choice),
                Err(UnknownAction(choice.to_string()))
            );
        }
        assert_eq!(
            Action::from_choice(" 9 ").unwrap_err().to_string(),
            "`9` is not an action"
        );
        assert_eq!(Action::Store.to_string(), "4. Store (Back to Menu)");
    }
}
