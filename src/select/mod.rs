// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Implementation of the selection language for selecting atoms.
//!
//! Supported keywords:
//! - `resname`: residue names,
//! - `name` or `atomname`: atom names,
//! - `resid`, `resnum` or `resSeq`: residue numbers,
//! - `serial`: 1-based positions of atoms in the structure,
//! - `atomid` or `atomnum`: atom numbers as written in the structure file,
//! - `index`: 0-based positions of atoms in the structure,
//! - `chain`: chain identifiers,
//! - `all` and `none`.
//!
//! Names can be regular expressions (`r'^HZ'`). Numbers can be ranges (`1 to 5`, `1-5`)
//! or open ranges (`< 5`, `>= 10`). Selections can be combined using `and` (`&&`),
//! `or` (`||`), `not` (`!`) and parentheses.

use serde::{Deserialize, Serialize};

use crate::errors::SelectError;
use crate::structures::atom::Atom;

use self::name::Name;

mod name;
mod numbers;

/// Parsed selection query.
#[derive(Debug, PartialEq, Clone)]
pub enum Select {
    ResidueName(Vec<Name>),
    AtomName(Vec<Name>),
    ResidueNumber(Vec<(usize, usize)>),
    GmxAtomNumber(Vec<(usize, usize)>),
    AtomNumber(Vec<(usize, usize)>),
    AtomIndex(Vec<(usize, usize)>),
    Chain(Vec<char>),
    All,
    None,
    And(Box<Select>, Box<Select>),
    Or(Box<Select>, Box<Select>),
    Not(Box<Select>),
}

#[derive(Debug, PartialEq)]
enum Operator {
    And,
    Or,
}

/// What to do when a selection expected to match a single atom matches more atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbiguityPolicy {
    /// Return `SelectError::Ambiguous`.
    #[default]
    Error,
    /// Use the first matching atom and print a warning.
    First,
}

impl Select {
    /// Construct a selection tree (`Select` structure) from the given query.
    pub fn parse_query(query: &str) -> Result<Box<Select>, SelectError> {
        if query.trim().is_empty() {
            return Err(SelectError::EmptyQuery);
        }

        if !par_balanced(query) {
            return Err(SelectError::InvalidParentheses(query.to_string()));
        }

        if !quotes_balanced(query) {
            return Err(SelectError::InvalidQuotes(query.to_string()));
        }

        let expression: Vec<char> = replace_keywords(query).chars().collect();

        // errors raised deeper in the parser do not know the query
        parse_subquery(&expression, 0, expression.len()).map_err(|e| match e {
            SelectError::InvalidOperator(_) => SelectError::InvalidOperator(query.to_string()),
            SelectError::MissingArgument(_) => SelectError::MissingArgument(query.to_string()),
            SelectError::EmptyArgument(_) => SelectError::EmptyArgument(query.to_string()),
            SelectError::InvalidParentheses(_) => {
                SelectError::InvalidParentheses(query.to_string())
            }
            SelectError::InvalidNumber(_) => SelectError::InvalidNumber(query.to_string()),
            SelectError::InvalidChainId(_) => SelectError::InvalidChainId(query.to_string()),
            SelectError::InvalidTokenParentheses(_) => {
                SelectError::InvalidTokenParentheses(query.to_string())
            }
            SelectError::InvalidRegex(x) => SelectError::InvalidRegex(x),
            SelectError::UnknownKeyword(x) => SelectError::UnknownKeyword(x),
            _ => SelectError::UnknownError(query.to_string()),
        })
    }

    /// Check whether the atom with the given index matches the selection.
    pub fn matches(&self, atom: &Atom, index: usize) -> bool {
        match self {
            Select::ResidueName(names) => names.iter().any(|n| n == atom.get_residue_name()),
            Select::AtomName(names) => names.iter().any(|n| n == atom.get_atom_name()),
            Select::ResidueNumber(ranges) => in_ranges(ranges, atom.get_residue_number()),
            Select::GmxAtomNumber(ranges) => in_ranges(ranges, index + 1),
            Select::AtomNumber(ranges) => in_ranges(ranges, atom.get_atom_number()),
            Select::AtomIndex(ranges) => in_ranges(ranges, index),
            Select::Chain(chains) => match atom.get_chain() {
                Some(chain) => chains.contains(&chain),
                None => false,
            },
            Select::All => true,
            Select::None => false,
            Select::And(left, right) => left.matches(atom, index) && right.matches(atom, index),
            Select::Or(left, right) => left.matches(atom, index) || right.matches(atom, index),
            Select::Not(operand) => !operand.matches(atom, index),
        }
    }
}

#[inline]
fn in_ranges(ranges: &[(usize, usize)], number: usize) -> bool {
    ranges
        .iter()
        .any(|&(start, end)| number >= start && number <= end)
}

fn parse_subquery(expression: &[char], start: usize, end: usize) -> Result<Box<Select>, SelectError> {
    let mut tree: Option<Box<Select>> = None;

    let mut i = start;

    let mut token = String::new();
    let mut negations = 0usize;
    let mut binary_operator: Option<Operator> = None;

    let mut inside_regex = false;

    while i < end {
        let c = expression[i];

        // operators are ignored inside regular expressions
        if inside_regex {
            if c == '\'' {
                inside_regex = false;
            }

            token.push(c);
            i += 1;
            continue;
        }

        match c {
            '(' => {
                if !token.trim().is_empty() {
                    return Err(SelectError::InvalidTokenParentheses(String::new()));
                }

                let new_end = find_parenthesis(expression, i, end)
                    .ok_or(SelectError::InvalidParentheses(String::new()))?;

                let parsed = parse_subquery(expression, i + 1, new_end)?;
                tree = process_operation(tree, parsed, &mut negations, &binary_operator)?;

                binary_operator = None;
                i = new_end + 1;
            }

            ')' => return Err(SelectError::InvalidParentheses(String::new())),

            '&' | '|' => {
                let operator = find_operator(expression, c, i)
                    .ok_or(SelectError::InvalidOperator(String::new()))?;

                if !token.trim().is_empty() {
                    let parsed = Box::from(parse_token(&token)?);
                    tree = process_operation(tree, parsed, &mut negations, &binary_operator)?;
                    token.clear();
                } else if binary_operator.is_some() {
                    return Err(SelectError::MissingArgument(String::new()));
                }

                binary_operator = Some(operator);
                i += 2;
            }

            '!' => {
                if !token.trim().is_empty() {
                    return Err(SelectError::InvalidOperator(String::new()));
                }

                negations += 1;
                i += 1;
            }

            'r' if expression.get(i + 1) == Some(&'\'') => {
                token.push_str("r'");
                i += 2;
                inside_regex = true;
            }

            _ => {
                token.push(c);
                i += 1;
            }
        }
    }

    if !token.trim().is_empty() {
        let parsed = Box::from(parse_token(&token)?);
        tree = process_operation(tree, parsed, &mut negations, &binary_operator)?;
    } else if binary_operator.is_some() || negations > 0 {
        return Err(SelectError::MissingArgument(String::new()));
    }

    tree.ok_or(SelectError::UnknownError(String::new()))
}

fn process_operation(
    tree: Option<Box<Select>>,
    mut parsed: Box<Select>,
    negations: &mut usize,
    binary: &Option<Operator>,
) -> Result<Option<Box<Select>>, SelectError> {
    for _ in 0..*negations {
        parsed = Box::from(Select::Not(parsed));
    }
    *negations = 0;

    match (tree, binary) {
        (Some(t), Some(Operator::And)) => Ok(Some(Box::from(Select::And(t, parsed)))),
        (Some(t), Some(Operator::Or)) => Ok(Some(Box::from(Select::Or(t, parsed)))),
        (None, Some(_)) => Err(SelectError::MissingArgument(String::new())),
        // two operands without an operator between them
        (Some(_), None) => Err(SelectError::InvalidTokenParentheses(String::new())),
        (None, None) => Ok(Some(parsed)),
    }
}

fn find_operator(expression: &[char], op_symbol: char, start: usize) -> Option<Operator> {
    if expression.get(start + 1) != Some(&op_symbol) {
        return None;
    }

    match op_symbol {
        '&' => Some(Operator::And),
        '|' => Some(Operator::Or),
        _ => None,
    }
}

/// Check whether the parentheses are balanced and never closed before being opened.
fn par_balanced(string: &str) -> bool {
    let mut depth = 0i32;
    for c in string.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => (),
        }

        if depth < 0 {
            return false;
        }
    }

    depth == 0
}

/// Check whether the number of ' and " is even.
fn quotes_balanced(string: &str) -> bool {
    let single = string.chars().filter(|&c| c == '\'').count();
    let double = string.chars().filter(|&c| c == '"').count();

    single % 2 == 0 && double % 2 == 0
}

/// Find the parenthesis closing the parenthesis at `start`.
fn find_parenthesis(expression: &[char], start: usize, end: usize) -> Option<usize> {
    let mut depth = 0;

    for (index, &c) in expression.iter().enumerate().take(end).skip(start) {
        if c == '(' {
            depth += 1;
        } else if c == ')' {
            depth -= 1;
            if depth == 0 {
                return Some(index);
            }
        }
    }

    None
}

/// Replace alphabetical operators with their symbolic representations.
/// Ignores quote blocks.
fn replace_keywords(input: &str) -> String {
    let mut result = String::new();
    let mut input_chars = input.chars().peekable();
    let mut inside_quotes = false;

    while let Some(c) = input_chars.next() {
        if c == '\'' || c == '"' {
            inside_quotes = !inside_quotes;
            result.push(c);
            continue;
        }

        if inside_quotes || !c.is_alphabetic() {
            result.push(c);
            continue;
        }

        let mut keyword = String::from(c);
        while let Some(&next) = input_chars.peek() {
            if !next.is_alphanumeric() {
                break;
            }
            keyword.push(next);
            input_chars.next();
        }

        match keyword.as_str() {
            "and" => result.push_str("&&"),
            "or" => result.push_str("||"),
            "not" => result.push('!'),
            "to" => result.push('-'),
            _ => result.push_str(&keyword),
        }
    }

    result
}

/// Split a string by whitespace while keeping the items enclosed in ' or " together.
/// Regular expressions keep their `r'...'` markers.
fn split_with_quotes(string: &str) -> Vec<String> {
    let mut result = vec![String::new()];
    let mut inside = false;
    let mut regex = false;

    let mut iterator = string.chars().peekable();

    while let Some(c) = iterator.next() {
        let block = result.len() - 1;

        if c == 'r' && !inside && result[block].is_empty() && iterator.peek() == Some(&'\'') {
            regex = true;
            inside = true;
            result[block].push_str("r'");
            iterator.next();
            continue;
        }

        if c == '\'' || c == '"' {
            inside = !inside;
            if regex {
                result[block].push(c);
                regex = false;
            }
            continue;
        }

        if c.is_whitespace() && !inside {
            result.push(String::new());
            continue;
        }

        result[block].push(c);
    }

    result
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .collect()
}

/// Collect words from the query and convert them to the `Name` enum.
fn collect_words(token: &[String]) -> Result<Vec<Name>, SelectError> {
    token.iter().map(|s| Name::new(s)).collect()
}

fn parse_token(string: &str) -> Result<Select, SelectError> {
    let token = split_with_quotes(string);
    let (keyword, arguments) = match token.split_first() {
        Some(x) => x,
        None => return Err(SelectError::MissingArgument(String::new())),
    };

    match keyword.as_str() {
        "all" if arguments.is_empty() => return Ok(Select::All),
        "none" if arguments.is_empty() => return Ok(Select::None),
        "all" | "none" => return Err(SelectError::InvalidOperator(String::new())),
        _ => (),
    }

    if arguments.is_empty() {
        return match keyword.as_str() {
            "resname" | "name" | "atomname" | "resid" | "resnum" | "resSeq" | "serial"
            | "atomid" | "atomnum" | "index" | "chain" => {
                Err(SelectError::EmptyArgument(String::new()))
            }
            _ => Err(SelectError::UnknownKeyword(keyword.to_owned())),
        };
    }

    match keyword.as_str() {
        "resname" => Ok(Select::ResidueName(collect_words(arguments)?)),
        "name" | "atomname" => Ok(Select::AtomName(collect_words(arguments)?)),
        "resid" | "resnum" | "resSeq" => Ok(Select::ResidueNumber(fix_ranges(
            numbers::parse_numbers(arguments, 1)?,
        ))),
        "serial" => Ok(Select::GmxAtomNumber(fix_ranges(numbers::parse_numbers(
            arguments, 1,
        )?))),
        "atomid" | "atomnum" => Ok(Select::AtomNumber(fix_ranges(numbers::parse_numbers(
            arguments, 1,
        )?))),
        "index" => Ok(Select::AtomIndex(fix_ranges(numbers::parse_numbers(
            arguments, 0,
        )?))),
        "chain" => arguments
            .iter()
            .map(|t| {
                let mut chars = t.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(SelectError::InvalidChainId(String::new())),
                }
            })
            .collect::<Result<Vec<char>, SelectError>>()
            .map(Select::Chain),
        _ => Err(SelectError::UnknownKeyword(keyword.to_owned())),
    }
}

/// Sort the ranges and merge overlapping or adjacent ranges.
fn fix_ranges(mut ranges: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    ranges.sort_unstable();

    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(ranges.len());
    for (start, end) in ranges {
        match merged.last_mut() {
            Some(last) if start <= last.1.saturating_add(1) => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }

    merged
}

/******************************/
/*         UNIT TESTS         */
/******************************/


#[cfg(test)]
mod fail_tests {
    use super::*;

    macro_rules! parsing_fails {
        ($name:ident, $expression:expr, $variant:path) => {
            #[test]
            fn $name() {
                match Select::parse_query($expression) {
                    Err($variant(_)) => (),
                    other => panic!("Parsing should have failed, returning {:?}", other),
                }
            }
        };
    }

    #[test]
    fn empty_query() {
        assert_eq!(Select::parse_query("  "), Err(SelectError::EmptyQuery));
    }

    parsing_fails!(
        unbalanced_parentheses,
        "(resid 15 and name NZ",
        SelectError::InvalidParentheses
    );
    parsing_fails!(
        reversed_parentheses,
        ")resid 15(",
        SelectError::InvalidParentheses
    );
    parsing_fails!(unbalanced_quotes, "name 'NZ", SelectError::InvalidQuotes);
    parsing_fails!(single_ampersand, "resid 15 & name NZ", SelectError::InvalidOperator);
    parsing_fails!(missing_right, "resid 15 and", SelectError::MissingArgument);
    parsing_fails!(missing_left, "or resid 15", SelectError::MissingArgument);
    parsing_fails!(dangling_not, "resid 15 and not", SelectError::MissingArgument);
    parsing_fails!(empty_argument, "resid 15 and name", SelectError::EmptyArgument);
    parsing_fails!(invalid_number, "resid 1.5", SelectError::InvalidNumber);
    parsing_fails!(invalid_range, "resid 15 to", SelectError::InvalidNumber);
    parsing_fails!(invalid_chain, "chain AB", SelectError::InvalidChainId);
    parsing_fails!(invalid_regex, "name r'[NZ'", SelectError::InvalidRegex);
    parsing_fails!(unknown_keyword, "resSeq 15 and element N", SelectError::UnknownKeyword);
    parsing_fails!(
        token_parentheses,
        "resid (15 and name NZ)",
        SelectError::InvalidTokenParentheses
    );

    #[test]
    fn error_carries_query() {
        match Select::parse_query("resid 15 and name") {
            Err(SelectError::EmptyArgument(query)) => assert_eq!(query, "resid 15 and name"),
            other => panic!("Unexpected result {:?}", other),
        }

        match Select::parse_query("moleculetype LYS") {
            Err(SelectError::UnknownKeyword(keyword)) => assert_eq!(keyword, "moleculetype"),
            other => panic!("Unexpected result {:?}", other),
        }
    }
}
