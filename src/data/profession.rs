//! Profession codes as encoded in build templates.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profession {
    Guardian,
    Warrior,
    Engineer,
    Ranger,
    Thief,
    Elementalist,
    Mesmer,
    Necromancer,
    Revenant,
}

impl Profession {
    pub const REVENANT_CODE: u8 = 9;

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Guardian),
            2 => Some(Self::Warrior),
            3 => Some(Self::Engineer),
            4 => Some(Self::Ranger),
            5 => Some(Self::Thief),
            6 => Some(Self::Elementalist),
            7 => Some(Self::Mesmer),
            8 => Some(Self::Necromancer),
            9 => Some(Self::Revenant),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guardian => "Guardian",
            Self::Warrior => "Warrior",
            Self::Engineer => "Engineer",
            Self::Ranger => "Ranger",
            Self::Thief => "Thief",
            Self::Elementalist => "Elementalist",
            Self::Mesmer => "Mesmer",
            Self::Necromancer => "Necromancer",
            Self::Revenant => "Revenant",
        }
    }
}

impl fmt::Display for Profession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Display name for a raw profession code; unmapped codes render as "Unknown".
pub fn profession_name(code: u8) -> &'static str {
    Profession::from_code(code).map_or("Unknown", |p| p.as_str())
}
