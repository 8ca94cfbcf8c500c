//! Closed-world certification (age rating) tables.
//!
//! Unlike genres, certifications never grow at runtime: a scraped string that
//! does not match the table of the configured country is dropped.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Countries with a certification table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Country {
    #[default]
    US,
    DE,
    GB,
    FR,
    NL,
    AU,
}

impl Country {
    pub const ALL: [Country; 6] = [
        Country::US,
        Country::DE,
        Country::GB,
        Country::FR,
        Country::NL,
        Country::AU,
    ];

    /// ISO 3166-1 alpha-2 code.
    pub fn code(&self) -> &'static str {
        match self {
            Country::US => "US",
            Country::DE => "DE",
            Country::GB => "GB",
            Country::FR => "FR",
            Country::NL => "NL",
            Country::AU => "AU",
        }
    }

    /// Parse an alpha-2 code, case-insensitive. `UK` is accepted for GB.
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "US" => Some(Country::US),
            "DE" => Some(Country::DE),
            "GB" | "UK" => Some(Country::GB),
            "FR" => Some(Country::FR),
            "NL" => Some(Country::NL),
            "AU" => Some(Country::AU),
            _ => None,
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One certification of one country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Certification {
    pub country: Country,
    /// Name as written to sidecars, e.g. `PG-13` or `FSK 12`
    pub name: &'static str,
    /// Other notations seen in the wild
    pub alternates: &'static [&'static str],
    /// Minimum age (0 for unrestricted or unrated)
    pub age: u8,
}

impl fmt::Display for Certification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

const fn cert(
    country: Country,
    name: &'static str,
    alternates: &'static [&'static str],
    age: u8,
) -> Certification {
    Certification {
        country,
        name,
        alternates,
        age,
    }
}

const US: &[Certification] = &[
    cert(Country::US, "G", &["Rated G"], 0),
    cert(Country::US, "PG", &["Rated PG"], 0),
    cert(Country::US, "PG-13", &["PG13", "Rated PG-13"], 13),
    cert(Country::US, "R", &["Rated R"], 17),
    cert(Country::US, "NC-17", &["NC17", "Rated NC-17"], 17),
    cert(Country::US, "NR", &["Not Rated", "Unrated"], 0),
    cert(Country::US, "TV-Y", &["TVY"], 0),
    cert(Country::US, "TV-Y7", &["TVY7"], 7),
    cert(Country::US, "TV-G", &["TVG"], 0),
    cert(Country::US, "TV-PG", &["TVPG"], 0),
    cert(Country::US, "TV-14", &["TV14"], 14),
    cert(Country::US, "TV-MA", &["TVMA"], 17),
];

const DE: &[Certification] = &[
    cert(Country::DE, "FSK 0", &["FSK0", "FSK-0", "0", "ab 0", "o.Al."], 0),
    cert(Country::DE, "FSK 6", &["FSK6", "FSK-6", "6", "ab 6"], 6),
    cert(Country::DE, "FSK 12", &["FSK12", "FSK-12", "12", "ab 12"], 12),
    cert(Country::DE, "FSK 16", &["FSK16", "FSK-16", "16", "ab 16"], 16),
    cert(Country::DE, "FSK 18", &["FSK18", "FSK-18", "18", "ab 18", "SPIO/JK"], 18),
];

const GB: &[Certification] = &[
    cert(Country::GB, "U", &["Universal"], 0),
    cert(Country::GB, "PG", &[], 0),
    cert(Country::GB, "12", &[], 12),
    cert(Country::GB, "12A", &[], 12),
    cert(Country::GB, "15", &[], 15),
    cert(Country::GB, "18", &[], 18),
    cert(Country::GB, "R18", &["R 18"], 18),
];

const FR: &[Certification] = &[
    cert(Country::FR, "U", &["Tous publics", "TP"], 0),
    cert(Country::FR, "10", &["-10"], 10),
    cert(Country::FR, "12", &["-12"], 12),
    cert(Country::FR, "16", &["-16"], 16),
    cert(Country::FR, "18", &["-18"], 18),
];

const NL: &[Certification] = &[
    cert(Country::NL, "AL", &["Alle leeftijden"], 0),
    cert(Country::NL, "6", &[], 6),
    cert(Country::NL, "9", &[], 9),
    cert(Country::NL, "12", &[], 12),
    cert(Country::NL, "14", &[], 14),
    cert(Country::NL, "16", &[], 16),
    cert(Country::NL, "18", &[], 18),
];

const AU: &[Certification] = &[
    cert(Country::AU, "G", &[], 0),
    cert(Country::AU, "PG", &[], 0),
    cert(Country::AU, "M", &[], 15),
    cert(Country::AU, "MA15+", &["MA 15+", "MA15"], 15),
    cert(Country::AU, "R18+", &["R 18+", "R18"], 18),
    cert(Country::AU, "X18+", &["X 18+", "X18"], 18),
];

/// Read-only lookup over the built-in certification tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct CertificationTable;

impl CertificationTable {
    pub fn new() -> Self {
        Self
    }

    /// All certifications of a country, in ascending strictness.
    pub fn values(&self, country: Country) -> &'static [Certification] {
        match country {
            Country::US => US,
            Country::DE => DE,
            Country::GB => GB,
            Country::FR => FR,
            Country::NL => NL,
            Country::AU => AU,
        }
    }

    /// Match scraped text against the table of `country`.
    ///
    /// Exact name first, then any alternate notation, then both again
    /// case-insensitively. A leading `"<CC>:"` prefix for the same country and
    /// a leading `"Rated "` are ignored. Returns `None` when nothing matches.
    pub fn resolve(&self, country: Country, text: &str) -> Option<Certification> {
        let mut text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Some((prefix, rest)) = text.split_once(':') {
            match Country::parse(prefix) {
                Some(c) if c == country => text = rest.trim(),
                // Rating of a different country
                Some(_) => return None,
                None => {}
            }
        }

        let table = self.values(country);
        let direct = table
            .iter()
            .find(|c| c.name == text)
            .or_else(|| table.iter().find(|c| c.alternates.contains(&text)))
            .or_else(|| {
                table.iter().find(|c| {
                    c.name.eq_ignore_ascii_case(text)
                        || c.alternates.iter().any(|a| a.eq_ignore_ascii_case(text))
                })
            });
        if let Some(found) = direct {
            return Some(*found);
        }

        let lower = text.to_lowercase();
        let stripped = lower.strip_prefix("rated ")?;
        table
            .iter()
            .find(|c| {
                c.name.eq_ignore_ascii_case(stripped)
                    || c.alternates.iter().any(|a| a.eq_ignore_ascii_case(stripped))
            })
            .copied()
    }
}
