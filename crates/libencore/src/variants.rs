use serde::{Deserialize, Serialize};

use crate::{
    instrument::{Instrument, Profile},
    Attribute, Clips,
};

/// Implements the profile accessors and the fixed description of a variant
macro_rules! describe {
    (
        $variant:ident,
        kind: $kind:literal,
        classification: $classification:literal,
        clips: ($tuned:literal, $untuned:literal),
        maintenance: $maintenance:literal,
        storage: $storage:literal $(,)?
    ) => {
        impl Instrument for $variant {
            fn kind(&self) -> &'static str {
                $kind
            }
            fn classification(&self) -> &'static str {
                $classification
            }
            fn profile(&self) -> &Profile {
                &self.profile
            }
            fn profile_mut(&mut self) -> &mut Profile {
                &mut self.profile
            }
            fn clips(&self) -> Clips {
                Clips {
                    tuned: $tuned,
                    untuned: $untuned,
                }
            }
            fn maintenance_info(&self) -> &'static str {
                $maintenance
            }
            fn storage_info(&self) -> &'static str {
                $storage
            }
            fn extra_attributes(&self) -> Vec<Attribute> {
                self.extras()
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guitar {
    #[serde(flatten)]
    pub profile: Profile,
    pub strings: u32,
    #[serde(rename = "type")]
    pub body: String,
    pub fretboard_material: String,
    pub pickup_type: String,
}

impl Guitar {
    pub fn new(
        material: impl Into<String>,
        brand: impl Into<String>,
        price: u64,
        strings: u32,
        body: impl Into<String>,
        fretboard_material: impl Into<String>,
        pickup_type: impl Into<String>,
    ) -> Self {
        Guitar {
            profile: Profile::new(material, brand, price),
            strings,
            body: body.into(),
            fretboard_material: fretboard_material.into(),
            pickup_type: pickup_type.into(),
        }
    }

    fn extras(&self) -> Vec<Attribute> {
        vec![
            Attribute::new("strings", self.strings),
            Attribute::new("type", &self.body),
            Attribute::new("fretboard_material", &self.fretboard_material),
            Attribute::new("pickup_type", &self.pickup_type),
        ]
    }
}

describe!(
    Guitar,
    kind: "Guitar",
    classification: "String",
    clips: ("guitar_tuned.wav", "guitar_untuned.mp4"),
    maintenance: "Change strings regularly and clean fretboard.",
    storage: "Store in a hard case to avoid warping.",
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piano {
    #[serde(flatten)]
    pub profile: Profile,
    pub keys: u32,
    pub pedals: bool,
    pub soundboard_material: String,
    pub tuning_stability: String,
}

impl Piano {
    pub fn new(
        material: impl Into<String>,
        brand: impl Into<String>,
        price: u64,
        keys: u32,
        pedals: bool,
        soundboard_material: impl Into<String>,
        tuning_stability: impl Into<String>,
    ) -> Self {
        Piano {
            profile: Profile::new(material, brand, price),
            keys,
            pedals,
            soundboard_material: soundboard_material.into(),
            tuning_stability: tuning_stability.into(),
        }
    }

    fn extras(&self) -> Vec<Attribute> {
        vec![
            Attribute::new("keys", self.keys),
            Attribute::new("pedals", self.pedals),
            Attribute::new("soundboard_material", &self.soundboard_material),
            Attribute::new("tuning_stability", &self.tuning_stability),
        ]
    }
}

describe!(
    Piano,
    kind: "Piano",
    classification: "Keyboard",
    clips: ("piano_tuned.wav", "piano_untuned.wav"),
    maintenance: "Regular key action checks and tuning.",
    storage: "Keep in temperature-controlled room.",
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drums {
    #[serde(flatten)]
    pub profile: Profile,
    pub size: String,
    pub drumhead_material: String,
    pub shell_material: String,
}

impl Drums {
    pub fn new(
        material: impl Into<String>,
        brand: impl Into<String>,
        price: u64,
        size: impl Into<String>,
        drumhead_material: impl Into<String>,
        shell_material: impl Into<String>,
    ) -> Self {
        Drums {
            profile: Profile::new(material, brand, price),
            size: size.into(),
            drumhead_material: drumhead_material.into(),
            shell_material: shell_material.into(),
        }
    }

    fn extras(&self) -> Vec<Attribute> {
        vec![
            Attribute::new("size", &self.size),
            Attribute::new("drumhead_material", &self.drumhead_material),
            Attribute::new("shell_material", &self.shell_material),
        ]
    }
}

describe!(
    Drums,
    kind: "Drums",
    classification: "Percussion",
    clips: ("drums_tuned.wav", "drums_untuned.wav"),
    maintenance: "Check and replace drumheads.",
    storage: "Cover and keep in dry room.",
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violin {
    #[serde(flatten)]
    pub profile: Profile,
    pub bow_type: String,
    pub size: String,
    pub string_material: String,
    pub chin_rest_type: String,
}

impl Violin {
    pub fn new(
        material: impl Into<String>,
        brand: impl Into<String>,
        price: u64,
        bow_type: impl Into<String>,
        size: impl Into<String>,
        string_material: impl Into<String>,
        chin_rest_type: impl Into<String>,
    ) -> Self {
        Violin {
            profile: Profile::new(material, brand, price),
            bow_type: bow_type.into(),
            size: size.into(),
            string_material: string_material.into(),
            chin_rest_type: chin_rest_type.into(),
        }
    }

    fn extras(&self) -> Vec<Attribute> {
        vec![
            Attribute::new("bow_type", &self.bow_type),
            Attribute::new("size", &self.size),
            Attribute::new("string_material", &self.string_material),
            Attribute::new("chin_rest_type", &self.chin_rest_type),
        ]
    }
}

describe!(
    Violin,
    kind: "Violin",
    classification: "String",
    clips: ("violin_tuned.mp3", "violin_untuned.wav"),
    maintenance: "Clean and re-hair bow, maintain strings.",
    storage: "Store in a violin case with dehumidifier.",
);

/// Any variant, tagged by name. This is the shape of an entry in a registry file:
///
/// ```json
/// { "variant": "Drums", "material": "Birch", "brand": "Pearl", "price": 85000,
///   "size": "Full Size", "drumhead_material": "Mylar", "shell_material": "Birch" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant")]
pub enum Record {
    Guitar(Guitar),
    Piano(Piano),
    Drums(Drums),
    Violin(Violin),
}

impl From<Record> for Box<dyn Instrument> {
    fn from(record: Record) -> Self {
        match record {
            Record::Guitar(guitar) => Box::new(guitar),
            Record::Piano(piano) => Box::new(piano),
            Record::Drums(drums) => Box::new(drums),
            Record::Violin(violin) => Box::new(violin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<Record> {
        vec![
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
        ]
    }

    #[test]
    fn test_variants_describe_themselves() {
        let instruments = records()
            .into_iter()
            .map(Box::<dyn Instrument>::from)
            .collect::<Vec<_>>();

        let kinds = instruments.iter().map(|i| i.kind()).collect::<Vec<_>>();
        assert_eq!(kinds, vec!["Guitar", "Piano", "Drums", "Violin"]);

        let classifications = instruments
            .iter()
            .map(|i| i.classification())
            .collect::<Vec<_>>();
        assert_eq!(
            classifications,
            vec!["String", "Keyboard", "Percussion", "String"]
        );

        for instrument in &instruments {
            assert!(!instrument.is_tuned());
            assert!(instrument.clip().contains("untuned"));
        }
    }

    #[test]
    fn test_violin_clips() {
        let mut violin = Violin::new("Maple", "Stradivarius", 200000, "Baroque", "4/4", "Nylon", "Ebony");
        assert_eq!(violin.clip(), "violin_untuned.wav");
        violin.tune();
        assert_eq!(violin.clip(), "violin_tuned.mp3");
    }

    #[test]
    fn test_extra_attribute_counts() {
        let counts = records()
            .into_iter()
            .map(|record| Box::<dyn Instrument>::from(record).attributes().len())
            .collect::<Vec<_>>();
        assert_eq!(counts, vec![10, 10, 9, 10]);
    }

    #[test]
    fn test_record_json() {
        let json = r#"[
            { "variant": "Guitar", "material": "Mahogany", "brand": "Ibanez", "price": 12000,
              "strings": 6, "type": "Acoustic", "fretboard_material": "Rosewood",
              "pickup_type": "Humbucker" },
            { "variant": "Piano", "material": "Spruce", "brand": "Kawai", "price": 350000,
              "keys": 88, "pedals": true, "soundboard_material": "Maple",
              "tuning_stability": "Stable" }
        ]"#;
        let parsed: Vec<Record> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.as_slice(), &records()[..2]);

        let written = serde_json::to_string(&records()).unwrap();
        let reparsed: Vec<Record> = serde_json::from_str(&written).unwrap();
        assert_eq!(reparsed, records());
    }

    #[test]
    fn test_tuned_state_is_not_loaded() {
        let mut guitar = Guitar::new("Mahogany", "Ibanez", 12000, 6, "Acoustic", "Rosewood", "Humbucker");
        guitar.tune();
        let written = serde_json::to_string(&Record::Guitar(guitar)).unwrap();
        assert!(!written.contains("tuned"));

        let reparsed: Record = serde_json::from_str(&written).unwrap();
        assert!(!Box::<dyn Instrument>::from(reparsed).is_tuned());
    }
}
