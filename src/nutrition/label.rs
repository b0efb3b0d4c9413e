use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tracing::warn;

/// Nutrition facts encoded in a class label such as
/// `Rendang (1 porsi) = 468 kkal (51% lemak, 9% karb, 40% prot)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelFacts {
    pub food_name: String,
    pub reference_unit: Option<String>,
    pub calories: u32,
    pub fat_pct: u32,
    pub carb_pct: u32,
    pub protein_pct: u32,
}

/// Outcome of parsing a label. The parser never fails: a label that does not
/// match the expected pattern degrades to a name-only record with zeroed numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLabel {
    Clean(LabelFacts),
    Fallback(LabelFacts),
}

impl ParsedLabel {
    pub fn facts(&self) -> &LabelFacts {
        match self {
            ParsedLabel::Clean(f) | ParsedLabel::Fallback(f) => f,
        }
    }

    pub fn into_facts(self) -> LabelFacts {
        match self {
            ParsedLabel::Clean(f) | ParsedLabel::Fallback(f) => f,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ParsedLabel::Fallback(_))
    }
}

lazy_static! {
    static ref NAME_RE: Regex = Regex::new(r"^(.*?)\s*\(").unwrap();
    static ref UNIT_RE: Regex = Regex::new(r"\(([^)]*)\)").unwrap();
    static ref KCAL_RE: Regex = Regex::new(r"=\s*(\d+)\s*kkal").unwrap();
    static ref FAT_RE: Regex = Regex::new(r"(\d+)\s*%?\s*lemak").unwrap();
    static ref CARB_RE: Regex = Regex::new(r"(\d+)\s*%?\s*karb").unwrap();
    static ref PROT_RE: Regex = Regex::new(r"(\d+)\s*%?\s*prot").unwrap();
}

fn capture_u32(re: &Regex, text: &str) -> Option<u32> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

fn parse_strict(text: &str) -> Option<LabelFacts> {
    let food_name = NAME_RE.captures(text)?.get(1)?.as_str().trim().to_string();
    let reference_unit = UNIT_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|u| !u.is_empty());

    Some(LabelFacts {
        food_name,
        reference_unit,
        calories: capture_u32(&KCAL_RE, text)?,
        fat_pct: capture_u32(&FAT_RE, text)?,
        carb_pct: capture_u32(&CARB_RE, text)?,
        protein_pct: capture_u32(&PROT_RE, text)?,
    })
}

pub fn parse(text: &str) -> ParsedLabel {
    if let Some(facts) = parse_strict(text) {
        return ParsedLabel::Clean(facts);
    }

    warn!(label = %text, "failed to parse nutrition data from label; using zeroed facts");
    let food_name = match text.split_once(" (") {
        Some((name, _)) => name.to_string(),
        None => text.to_string(),
    };
    ParsedLabel::Fallback(LabelFacts {
        food_name,
        reference_unit: None,
        calories: 0,
        fat_pct: 0,
        carb_pct: 0,
        protein_pct: 0,
    })
}
