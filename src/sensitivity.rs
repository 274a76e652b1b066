use clap::ValueEnum;

/// Games with known sensitivity scales. The multiplier expresses how many
/// degrees of rotation one sensitivity unit produces relative to CS2.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum GameProfile {
    Cs2,
    Valorant,
    Apex,
    Fortnite,
    Overwatch,
    Rainbow6,
    Battlefield,
    Cod,
}

impl GameProfile {
    pub fn multiplier(&self) -> f64 {
        match self {
            GameProfile::Cs2 => 1.0,
            GameProfile::Valorant => 3.18,
            GameProfile::Apex => 1.0,
            GameProfile::Fortnite => 0.5,
            GameProfile::Overwatch => 3.33,
            GameProfile::Rainbow6 => 3.83,
            GameProfile::Battlefield => 1.2,
            GameProfile::Cod => 1.0,
        }
    }
}

/// Converts a sensitivity value between two games' scales.
pub fn convert(sens: f64, from: GameProfile, to: GameProfile) -> f64 {
    sens * from.multiplier() / to.multiplier()
}

/// Conversion with a DPI change on top: a lower target DPI needs a
/// proportionally higher in-game sensitivity to keep the same feel.
pub fn convert_with_dpi(
    sens: f64,
    from: GameProfile,
    to: GameProfile,
    source_dpi: u32,
    target_dpi: u32,
) -> f64 {
    let mut converted = convert(sens, from, to);
    if source_dpi != target_dpi && target_dpi > 0 {
        converted *= f64::from(source_dpi) / f64::from(target_dpi);
    }
    converted
}

/// Physical mouse travel, in centimeters, for a full 360 degree turn.
pub fn cm_per_360(sens: f64, dpi: u32, multiplier: f64) -> f64 {
    (360.0 / (sens * f64::from(dpi) * multiplier)) * 2.54
}
