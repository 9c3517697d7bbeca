//! Module to calculate the atomic composition of a chemical formula
//!
//! A formula is scanned left to right with a stack of accumulation scopes: `(` opens a new
//! scope, `)` with an optional multiplier closes it and merges the scaled counts into the
//! enclosing one. Nesting depth is unbounded.
use crate::Stoichiometry::errors::ParseError;
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Atom tally of one species: element symbol -> number of atoms.
/// Keys are ordered alphabetically, so iteration order is stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ElementCount(BTreeMap<String, u64>);

impl ElementCount {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }
    /// number of atoms of `element`, 0 if the element is absent
    pub fn get(&self, element: &str) -> u64 {
        self.0.get(element).copied().unwrap_or(0)
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(element, count)| (element.as_str(), *count))
    }
    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|element| element.as_str())
    }
    /// total number of atoms in the formula unit
    pub fn total_atoms(&self) -> u64 {
        self.0
            .values()
            .fold(0u64, |total, count| total.saturating_add(*count))
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    // None on overflow
    fn add(&mut self, element: &str, count: u64) -> Option<()> {
        let entry = self.0.entry(element.to_string()).or_insert(0);
        *entry = entry.checked_add(count)?;
        Some(())
    }
    // merges the counts of a closed group multiplied by the group multiplier
    fn merge_scaled(&mut self, group: ElementCount, factor: u64) -> Option<()> {
        for (element, count) in group.0 {
            self.add(&element, count.checked_mul(factor)?)?;
        }
        Some(())
    }
}

/// Repeated elements are summed. Sums saturate at `u64::MAX`; use [`parse_formula`] when
/// overflow must be reported.
impl FromIterator<(String, u64)> for ElementCount {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        let mut counts = BTreeMap::new();
        for (element, count) in iter {
            let entry = counts.entry(element).or_insert(0u64);
            *entry = entry.saturating_add(count);
        }
        Self(counts)
    }
}

impl<'a> IntoIterator for &'a ElementCount {
    type Item = (&'a String, &'a u64);
    type IntoIter = btree_map::Iter<'a, String, u64>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// reads the digits starting at `*i` (if any) and moves `*i` past them
fn read_multiplier(chars: &[char], i: &mut usize, formula: &str) -> Result<Option<u64>, ParseError> {
    let start = *i;
    let mut value: u64 = 0;
    while *i < chars.len() {
        let Some(digit) = chars[*i].to_digit(10) else {
            break;
        };
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(u64::from(digit)))
            .ok_or_else(|| ParseError::CountOverflow {
                formula: formula.to_string(),
            })?;
        *i += 1;
    }
    if *i == start {
        return Ok(None);
    }
    if value == 0 {
        return Err(ParseError::ZeroMultiplier {
            formula: formula.to_string(),
            position: start,
        });
    }
    Ok(Some(value))
}

/// Parses a molecular formula like `Fe2(SO4)3` into its element composition.
///
/// An element symbol is one uppercase letter optionally followed by one lowercase letter,
/// digits right after a symbol or a closing parenthesis are its multiplier (default 1).
/// Positions reported in errors are character indices into `formula`.
pub fn parse_formula(formula: &str) -> Result<ElementCount, ParseError> {
    if formula.trim().is_empty() {
        return Err(ParseError::Empty {
            formula: formula.to_string(),
        });
    }
    let overflow = || ParseError::CountOverflow {
        formula: formula.to_string(),
    };
    let chars: Vec<char> = formula.chars().collect();
    let mut root = ElementCount::new();
    // (position of the opening parenthesis, counts accumulated inside the group)
    let mut open_groups: Vec<(usize, ElementCount)> = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            'A'..='Z' => {
                let start = i;
                i += 1;
                if i < chars.len() && chars[i].is_ascii_lowercase() {
                    i += 1;
                }
                let symbol: String = chars[start..i].iter().collect();
                let count = read_multiplier(&chars, &mut i, formula)?.unwrap_or(1);
                let scope = match open_groups.last_mut() {
                    Some((_, group)) => group,
                    None => &mut root,
                };
                scope.add(&symbol, count).ok_or_else(overflow)?;
            }
            '(' => {
                open_groups.push((i, ElementCount::new()));
                i += 1;
            }
            ')' => {
                let Some((opened_at, group)) = open_groups.pop() else {
                    return Err(ParseError::UnbalancedParentheses {
                        formula: formula.to_string(),
                    });
                };
                i += 1;
                let factor = read_multiplier(&chars, &mut i, formula)?.unwrap_or(1);
                if group.is_empty() {
                    return Err(ParseError::EmptyGroup {
                        formula: formula.to_string(),
                        position: opened_at,
                    });
                }
                let scope = match open_groups.last_mut() {
                    Some((_, outer)) => outer,
                    None => &mut root,
                };
                scope.merge_scaled(group, factor).ok_or_else(overflow)?;
            }
            '0'..='9' => {
                return Err(ParseError::DanglingMultiplier {
                    formula: formula.to_string(),
                    position: i,
                });
            }
            character => {
                return Err(ParseError::UnexpectedCharacter {
                    formula: formula.to_string(),
                    character,
                    position: i,
                });
            }
        }
    }
    if !open_groups.is_empty() {
        return Err(ParseError::UnbalancedParentheses {
            formula: formula.to_string(),
        });
    }
    let counts = root;
    if counts.total_atoms() == 0 {
        return Err(ParseError::Empty {
            formula: formula.to_string(),
        });
    }
    debug!("parsed formula {} into {:?}", formula, counts);
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, u64)]) -> ElementCount {
        pairs.iter().map(|(e, c)| (e.to_string(), *c)).collect()
    }

    #[test]
    fn test_parse_formula() {
        assert_eq!(
            parse_formula("C6H8O6").unwrap(),
            counts(&[("C", 6), ("H", 8), ("O", 6)])
        );
        assert_eq!(
            parse_formula("Na(NO3)2").unwrap(),
            counts(&[("Na", 1), ("N", 2), ("O", 6)])
        );
        assert_eq!(parse_formula("H2O").unwrap(), counts(&[("H", 2), ("O", 1)]));
        // the same element recurring in one formula is summed
        assert_eq!(
            parse_formula("C5H6OOH").unwrap(),
            counts(&[("C", 5), ("H", 7), ("O", 2)])
        );
    }

    #[test]
    fn test_parenthesised_groups() {
        let iron_sulfate = parse_formula("Fe2(SO4)3").unwrap();
        assert_eq!(iron_sulfate, counts(&[("Fe", 2), ("S", 3), ("O", 12)]));
        assert_eq!(iron_sulfate.total_atoms(), 17);

        assert_eq!(
            parse_formula("Ca3(PO4)2").unwrap(),
            counts(&[("Ca", 3), ("P", 2), ("O", 8)])
        );
        assert_eq!(
            parse_formula("Mg(OH)2").unwrap(),
            counts(&[("Mg", 1), ("O", 2), ("H", 2)])
        );
        // group without multiplier counts once
        assert_eq!(
            parse_formula("C6H5(CH3)").unwrap(),
            counts(&[("C", 7), ("H", 8)])
        );
    }

    #[test]
    fn test_nested_groups() {
        // di-tert-butyl ether
        assert_eq!(
            parse_formula("((CH3)3C)2O").unwrap(),
            counts(&[("C", 8), ("H", 18), ("O", 1)])
        );
        assert_eq!(
            parse_formula("K4Fe(CN)6").unwrap(),
            counts(&[("K", 4), ("Fe", 1), ("C", 6), ("N", 6)])
        );
        assert_eq!(parse_formula("(((H)2)2)2").unwrap(), counts(&[("H", 8)]));
    }

    #[test]
    fn test_multi_digit_counts() {
        let sucrose = parse_formula("C12H22O11").unwrap();
        assert_eq!(sucrose.get("C"), 12);
        assert_eq!(sucrose.get("H"), 22);
        assert_eq!(sucrose.get("O"), 11);
        assert_eq!(sucrose.get("N"), 0);
        assert_eq!(sucrose.total_atoms(), 45);
        assert_eq!(sucrose.elements().collect::<Vec<_>>(), vec!["C", "H", "O"]);
    }

    #[test]
    fn test_empty_formula() {
        assert!(matches!(parse_formula(""), Err(ParseError::Empty { .. })));
        assert!(matches!(parse_formula("   "), Err(ParseError::Empty { .. })));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        assert_eq!(
            parse_formula("H2(O"),
            Err(ParseError::UnbalancedParentheses {
                formula: "H2(O".to_string()
            })
        );
        assert!(matches!(
            parse_formula("H2O)"),
            Err(ParseError::UnbalancedParentheses { .. })
        ));
        // scope-stack underflow is never recovered from
        assert!(matches!(
            parse_formula("Mg(O)H)2"),
            Err(ParseError::UnbalancedParentheses { .. })
        ));
        assert!(matches!(
            parse_formula("((CH3)2"),
            Err(ParseError::UnbalancedParentheses { .. })
        ));
    }

    #[test]
    fn test_invalid_tokens() {
        assert_eq!(
            parse_formula("h2o"),
            Err(ParseError::UnexpectedCharacter {
                formula: "h2o".to_string(),
                character: 'h',
                position: 0
            })
        );
        assert_eq!(
            parse_formula("CuSO4·5H2O"),
            Err(ParseError::UnexpectedCharacter {
                formula: "CuSO4·5H2O".to_string(),
                character: '·',
                position: 5
            })
        );
        assert!(matches!(
            parse_formula("H2 O"),
            Err(ParseError::UnexpectedCharacter { character: ' ', .. })
        ));
        assert!(matches!(
            parse_formula("H2+O2"),
            Err(ParseError::UnexpectedCharacter { character: '+', .. })
        ));
        // a symbol takes at most one lowercase letter
        assert!(matches!(
            parse_formula("Uuo"),
            Err(ParseError::UnexpectedCharacter { character: 'o', position: 2, .. })
        ));
    }

    #[test]
    fn test_bad_multipliers() {
        assert_eq!(
            parse_formula("2H2O"),
            Err(ParseError::DanglingMultiplier {
                formula: "2H2O".to_string(),
                position: 0
            })
        );
        assert!(matches!(
            parse_formula("(2H)2"),
            Err(ParseError::DanglingMultiplier { position: 1, .. })
        ));
        assert!(matches!(
            parse_formula("H0"),
            Err(ParseError::ZeroMultiplier { position: 1, .. })
        ));
        assert!(matches!(
            parse_formula("(OH)0"),
            Err(ParseError::ZeroMultiplier { .. })
        ));
        assert!(matches!(
            parse_formula("H2()3"),
            Err(ParseError::EmptyGroup { position: 2, .. })
        ));
    }

    #[test]
    fn test_count_overflow() {
        assert!(matches!(
            parse_formula("H99999999999999999999999"),
            Err(ParseError::CountOverflow { .. })
        ));
        assert!(matches!(
            parse_formula("(H9999999999)9999999999"),
            Err(ParseError::CountOverflow { .. })
        ));
    }

    #[test]
    fn test_collect_sums_and_saturates() {
        let summed = counts(&[("H", 2), ("O", 1), ("H", 3)]);
        assert_eq!(summed.get("H"), 5);
        assert_eq!(summed.len(), 2);
        let saturated = counts(&[("H", u64::MAX), ("H", 1)]);
        assert_eq!(saturated.get("H"), u64::MAX);
    }
}
