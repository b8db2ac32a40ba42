//! Dice-expression parsing and rolling.
//!
//! Specs are strings like `"2d6+3"` or `"1d20+4[finesse]"`; bracket tags
//! name a term for log output and are ignored by the math. All rolls route
//! through [`crate::rng`], so seeded and forced rolls apply here too.

use serde::{Deserialize, Serialize};

use crate::rng;

/// Outcome of rolling a dice spec: the individual die values plus the total
/// (modifiers included).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollResult {
    pub formula: String,
    pub values: Vec<u32>,
    pub sum: f64,
}

impl RollResult {
    pub fn flat(formula: impl Into<String>, sum: f64) -> Self {
        Self { formula: formula.into(), values: Vec::new(), sum }
    }
}

/// Roll a dice spec and return only the total.
pub fn roll(spec: &str) -> f64 {
    roll_detailed(spec).sum
}

/// Roll a dice spec keeping per-die values for event payloads.
pub fn roll_detailed(spec: &str) -> RollResult {
    let cleaned = spec.replace(' ', "");
    let mut sum = 0.0;
    let mut values = Vec::new();
    let mut term = String::new();
    let mut sign = 1.0;

    for c in cleaned.chars() {
        if c == '+' || c == '-' {
            if !term.is_empty() {
                let (v, rolls) = roll_term(&term, sign);
                sum += v;
                values.extend(rolls);
                term.clear();
            }
            sign = if c == '+' { 1.0 } else { -1.0 };
        } else {
            term.push(c);
        }
    }
    if !term.is_empty() {
        let (v, rolls) = roll_term(&term, sign);
        sum += v;
        values.extend(rolls);
    }

    RollResult { formula: spec.to_string(), values, sum }
}

/// Expected value of a dice spec without rolling.
pub fn average(spec: &str) -> f64 {
    let cleaned = spec.replace(' ', "");
    let mut sum = 0.0;
    let mut term = String::new();
    let mut sign = 1.0;

    for c in cleaned.chars() {
        if c == '+' || c == '-' {
            if !term.is_empty() {
                sum += sign * term_average(&term);
                term.clear();
            }
            sign = if c == '+' { 1.0 } else { -1.0 };
        } else {
            term.push(c);
        }
    }
    if !term.is_empty() {
        sum += sign * term_average(&term);
    }
    sum
}

/// Strip a `[tag]` annotation: `"1d4[guard]"` -> `"1d4"`.
fn strip_tag(term: &str) -> &str {
    match term.find('[') {
        Some(pos) => &term[..pos],
        None => term,
    }
}

fn parse_dice_term(term: &str) -> Option<(u32, u32)> {
    let parts: Vec<&str> = term.split('d').collect();
    if parts.len() != 2 {
        return None;
    }
    let count = if parts[0].is_empty() { 1 } else { parts[0].parse::<u32>().ok()? };
    let sides = parts[1].parse::<u32>().ok()?;
    Some((count, sides))
}

fn roll_term(term: &str, sign: f64) -> (f64, Vec<u32>) {
    let bare = strip_tag(term);
    if bare.contains('d') {
        if let Some((count, sides)) = parse_dice_term(bare) {
            let mut total = 0.0;
            let mut values = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let v = rng::roll_die(sides);
                total += v as f64;
                values.push(v);
            }
            return (sign * total, values);
        }
    }
    (sign * bare.parse::<f64>().unwrap_or(0.0), Vec::new())
}

fn term_average(term: &str) -> f64 {
    let bare = strip_tag(term);
    if bare.contains('d') {
        if let Some((count, sides)) = parse_dice_term(bare) {
            return count as f64 * (sides as f64 + 1.0) / 2.0;
        }
    }
    bare.parse::<f64>().unwrap_or(0.0)
}
