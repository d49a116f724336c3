use std::fmt;

use anyhow::Result;
use regex::Regex;

use crate::ir::ProductType;

/// How many cassettes a 100ft bulk roll yields.
pub const BULK_ROLL_UNITS: u32 = 16;

/// An ordered list of (label, patterns) pairs. Labels are tried in list
/// order and patterns in list order within a label; the first pattern that
/// matches wins. There is no best-match scoring, so callers must put more
/// specific labels (e.g. the bulk-roll form of a stock) before more general
/// ones or titles will silently classify as the general label.
#[derive(Debug)]
pub struct RuleSet<L> {
    rules: Vec<(L, Vec<Regex>)>,
}

impl<L: Copy> RuleSet<L> {
    pub fn new(rules: impl IntoIterator<Item = (L, Vec<&'static str>)>) -> Result<Self> {
        let rules = rules
            .into_iter()
            .map(|(label, patterns)| {
                let patterns = patterns
                    .into_iter()
                    .map(Regex::new)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((label, patterns))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RuleSet { rules })
    }

    pub fn classify(&self, title: &str) -> Option<L> {
        for (label, patterns) in &self.rules {
            if patterns.iter().any(|pattern| pattern.is_match(title)) {
                return Some(*label);
            }
        }
        None
    }
}

/// What the product rule table resolves a title to. Bulk rolls keep their own
/// labels so that a `XX100`-style listing can outrank the plain `XX` rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductClass {
    Single(ProductType),
    BulkRoll(ProductType),
}

/// A fully classified title: which stock it is and how many cassettes the
/// listing represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub product_type: ProductType,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    UnknownProductType { title: String },
    UnknownQuantity { title: String },
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifyError::UnknownProductType { title } => {
                write!(f, "no product type rule matches title {:?}", title)
            }
            ClassifyError::UnknownQuantity { title } => {
                write!(f, "no quantity rule matches title {:?}", title)
            }
        }
    }
}

impl std::error::Error for ClassifyError {}

#[derive(Debug)]
pub struct Rules {
    pub product_types: RuleSet<ProductClass>,
    pub quantities: RuleSet<u32>,
}

impl Rules {
    /// Classify both axes of a title and apply the bulk-roll normalization:
    /// a bulk listing collapses into its base stock with the quantity forced
    /// to [`BULK_ROLL_UNITS`], whatever the quantity table said.
    pub fn resolve(&self, title: &str) -> Result<Resolved, ClassifyError> {
        let product_class =
            self.product_types
                .classify(title)
                .ok_or_else(|| ClassifyError::UnknownProductType {
                    title: title.to_string(),
                })?;
        match product_class {
            ProductClass::BulkRoll(product_type) => Ok(Resolved {
                product_type,
                quantity: BULK_ROLL_UNITS,
            }),
            ProductClass::Single(product_type) => {
                let quantity =
                    self.quantities
                        .classify(title)
                        .ok_or_else(|| ClassifyError::UnknownQuantity {
                            title: title.to_string(),
                        })?;
                Ok(Resolved {
                    product_type,
                    quantity,
                })
            }
        }
    }
}

/// The rule tables matching our current listing titles. Bulk-roll labels come
/// before the base stocks, see the ordering contract on [`RuleSet`].
pub fn default_rules() -> Result<Rules> {
    let product_types = RuleSet::new([
        (
            ProductClass::BulkRoll(ProductType::Xx),
            vec![
                r"(?i)\bxx\s*-?100\b",
                r"(?i)double\s*-?x.*\b100\s*(?:'|ft\b|feet\b|foot\b)",
            ],
        ),
        (
            ProductClass::BulkRoll(ProductType::FiveHundredT),
            vec![
                r"(?i)\b500t\s*-?100\b",
                r"(?i)\b500t\b.*\b100\s*(?:'|ft\b|feet\b|foot\b)",
            ],
        ),
        (
            ProductClass::BulkRoll(ProductType::TwoFiftyD),
            vec![
                r"(?i)\b250d\s*-?100\b",
                r"(?i)\b250d\b.*\b100\s*(?:'|ft\b|feet\b|foot\b)",
            ],
        ),
        (
            ProductClass::Single(ProductType::FiveHundredT),
            vec![r"(?i)\b500t\b"],
        ),
        (
            ProductClass::Single(ProductType::TwoFiftyD),
            vec![r"(?i)\b250d\b"],
        ),
        (
            ProductClass::Single(ProductType::Xx),
            vec![r"(?i)\bxx\b", r"(?i)double\s*-?x", r"(?i)\b5222\b"],
        ),
    ])?;

    // Largest counts first so e.g. "15 rolls" is never shadowed by a
    // smaller count's pattern.
    let quantities = RuleSet::new(
        [16u32, 15, 10, 6, 5, 4, 3, 2]
            .into_iter()
            .map(quantity_rule)
            .collect::<Vec<_>>(),
    )?;

    Ok(Rules {
        product_types,
        quantities,
    })
}

fn quantity_rule(count: u32) -> (u32, Vec<&'static str>) {
    // Patterns are built per supported count instead of capturing an
    // arbitrary number, so a stock name like "250D" can never be misread
    // as a quantity.
    let patterns: Vec<&'static str> = match count {
        2 => vec![r"(?i)\b2\s*x\b", r"(?i)\bx\s*2\b", r"(?i)\b2\s+(?:\d+\s*exp\w*\s+)?rolls?\b", r"(?i)\b2\s*(?:pack|pk)\b"],
        3 => vec![r"(?i)\b3\s*x\b", r"(?i)\bx\s*3\b", r"(?i)\b3\s+(?:\d+\s*exp\w*\s+)?rolls?\b", r"(?i)\b3\s*(?:pack|pk)\b"],
        4 => vec![r"(?i)\b4\s*x\b", r"(?i)\bx\s*4\b", r"(?i)\b4\s+(?:\d+\s*exp\w*\s+)?rolls?\b", r"(?i)\b4\s*(?:pack|pk)\b"],
        5 => vec![r"(?i)\b5\s*x\b", r"(?i)\bx\s*5\b", r"(?i)\b5\s+(?:\d+\s*exp\w*\s+)?rolls?\b", r"(?i)\b5\s*(?:pack|pk)\b"],
        6 => vec![r"(?i)\b6\s*x\b", r"(?i)\bx\s*6\b", r"(?i)\b6\s+(?:\d+\s*exp\w*\s+)?rolls?\b", r"(?i)\b6\s*(?:pack|pk)\b"],
        10 => vec![r"(?i)\b10\s*x\b", r"(?i)\bx\s*10\b", r"(?i)\b10\s+(?:\d+\s*exp\w*\s+)?rolls?\b", r"(?i)\b10\s*(?:pack|pk)\b"],
        15 => vec![r"(?i)\b15\s*x\b", r"(?i)\bx\s*15\b", r"(?i)\b15\s+(?:\d+\s*exp\w*\s+)?rolls?\b", r"(?i)\b15\s*(?:pack|pk)\b"],
        16 => vec![r"(?i)\b16\s*x\b", r"(?i)\bx\s*16\b", r"(?i)\b16\s+(?:\d+\s*exp\w*\s+)?rolls?\b"],
        _ => vec![],
    };
    (count, patterns)
}
