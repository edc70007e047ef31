use serde::Serialize;

/// Calculation methods understood by the timings API; the index is the
/// method id sent with each request.
pub const CALCULATION_METHODS: [&str; 14] = [
    "Shia Ithna-Ashari",
    "University of Islamic Sciences, Karachi",
    "Islamic Society of North America",
    "Muslim World League",
    "Umm Al-Qura University, Makkah",
    "Egyptian General Authority of Survey",
    "Institute of Geophysics, University of Tehran",
    "Gulf Region",
    "Kuwait",
    "Qatar",
    "Majlis Ugama Islam Singapura, Singapore",
    "Union Organization islamic de France",
    "Diyanet İşleri Başkanlığı, Turkey",
    "Spiritual Administration of Muslims of Russia",
];

/// Muslim World League.
pub const DEFAULT_METHOD: u8 = 3;

#[derive(Debug, Clone, Serialize)]
pub struct CalculationMethod {
    pub id: u8,
    pub name: &'static str,
}

pub fn method_name(id: u8) -> Option<&'static str> {
    CALCULATION_METHODS.get(id as usize).copied()
}

pub fn all_methods() -> Vec<CalculationMethod> {
    CALCULATION_METHODS
        .iter()
        .enumerate()
        .map(|(i, name)| CalculationMethod { id: i as u8, name })
        .collect()
}
