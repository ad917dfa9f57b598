//! Ingredient parsing module.
//!
//! Splits a free-text ingredient line (e.g. "2 cups flour") into a quantity,
//! a unit and a name for display. This is a heuristic: anything it can't make
//! sense of degrades to "the whole line is the name" instead of failing.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Characters that may appear in a quantity token besides ASCII digits.
/// Includes the Unicode vulgar fractions commonly pasted from recipe sites.
const FRACTION_GLYPHS: &str = "½⅓⅔¼¾⅕⅖⅗⅘⅙⅚⅐⅛⅜⅝⅞⅑⅒";

/// `quantity` may contain inner whitespace ("1 1/2") but starts and ends on a
/// quantity character; `unit` is one run of non-space, non-digit characters.
static INGREDIENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    let qty_char = format!(r"[\d.,/{}]", FRACTION_GLYPHS);
    let qty_inner = format!(r"[\d.,/{}\s]", FRACTION_GLYPHS);
    let pattern =
        format!(r"(?s)^\s*({qty_char}(?:{qty_inner}*{qty_char})?)?\s*([^\s\d]+)?\s*(.*)$");
    Regex::new(&pattern).expect("ingredient pattern is valid")
});

/// Parsed ingredient structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParsedIngredient {
    pub quantity: Option<String>,
    pub unit: Option<String>,
    pub name: String,
    pub raw: String,
}

impl ParsedIngredient {
    fn whole_line(raw: &str) -> Self {
        Self {
            quantity: None,
            unit: None,
            name: raw.to_string(),
            raw: raw.to_string(),
        }
    }

    /// Whether the name is the whole input line rather than what follows
    /// the quantity and unit.
    pub fn name_is_whole_line(&self) -> bool {
        self.name == self.raw
    }

    /// Render as "quantity unit name", skipping the parts that are unset.
    pub fn display(&self) -> String {
        if self.name_is_whole_line() {
            return self.raw.clone();
        }
        [self.quantity.as_deref(), self.unit.as_deref(), Some(self.name.as_str())]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Parse a single ingredient line into structured data.
pub fn parse_ingredient(text: &str) -> ParsedIngredient {
    let raw = text.trim();
    if raw.is_empty() {
        return ParsedIngredient::whole_line("");
    }

    let Some(caps) = INGREDIENT_RE.captures(raw) else {
        return ParsedIngredient::whole_line(raw);
    };

    // A unit is only meaningful after a quantity; "salt to taste" has neither.
    let Some(quantity) = caps
        .get(1)
        .map(|m| m.as_str().trim())
        .filter(|q| has_numeric(q))
    else {
        return ParsedIngredient::whole_line(raw);
    };

    let unit = caps
        .get(2)
        .map(|m| m.as_str().trim().to_string())
        .filter(|u| !u.is_empty());
    let rest = caps.get(3).map(|m| m.as_str().trim()).unwrap_or_default();

    // Nothing left after quantity and unit ("3 eggs", "42"): the whole line
    // stays the name.
    let name = if rest.is_empty() {
        raw.to_string()
    } else {
        rest.to_string()
    };

    ParsedIngredient {
        quantity: Some(quantity.to_string()),
        unit,
        name,
        raw: raw.to_string(),
    }
}

/// Parse a list of ingredient lines, skipping blank ones.
pub fn parse_ingredients<S: AsRef<str>>(lines: &[S]) -> Vec<ParsedIngredient> {
    lines
        .iter()
        .map(|line| line.as_ref())
        .filter(|line| !line.trim().is_empty())
        .map(parse_ingredient)
        .collect()
}

fn has_numeric(s: &str) -> bool {
    s.chars()
        .any(|c| c.is_ascii_digit() || FRACTION_GLYPHS.contains(c))
}
