//! Static lookup tables for the form's select inputs.

pub const DRIVER_CODES: &[&str] = &[
    "VER", "PER", "LEC", "SAI", "HAM", "RUS", "NOR", "PIA", "ALO", "STR", "GAS", "OCO",
    "ALB", "SAR", "COL", "MAG", "HUL", "BEA", "TSU", "RIC", "LAW", "BOT", "ZHO",
];

pub const RACE_NAMES: &[&str] = &[
    "Bahrain Grand Prix",
    "Saudi Arabian Grand Prix",
    "Australian Grand Prix",
    "Japanese Grand Prix",
    "Chinese Grand Prix",
    "Miami Grand Prix",
    "Emilia Romagna Grand Prix",
    "Monaco Grand Prix",
    "Canadian Grand Prix",
    "Spanish Grand Prix",
    "Austrian Grand Prix",
    "British Grand Prix",
    "Hungarian Grand Prix",
    "Belgian Grand Prix",
    "Dutch Grand Prix",
    "Italian Grand Prix",
    "Azerbaijan Grand Prix",
    "Singapore Grand Prix",
    "United States Grand Prix",
    "Mexico City Grand Prix",
    "São Paulo Grand Prix",
    "Las Vegas Grand Prix",
    "Qatar Grand Prix",
    "Abu Dhabi Grand Prix",
];

pub const COMPOUNDS: &[&str] = &["SOFT", "MEDIUM", "HARD", "INTERMEDIATE", "WET"];
