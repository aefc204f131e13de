// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Implementation of parser for atom and residue numbers.

use crate::errors::SelectError;

#[derive(Debug, Clone, Copy, PartialEq)]
enum NumberToken {
    Number(usize),
    Range,
    Lower,
    LowerOrEqual,
    Greater,
    GreaterOrEqual,
}

impl NumberToken {
    fn from_fragment(string: &str) -> Result<Self, SelectError> {
        match string {
            ">" => Ok(NumberToken::Greater),
            "<" => Ok(NumberToken::Lower),
            ">=" => Ok(NumberToken::GreaterOrEqual),
            "<=" => Ok(NumberToken::LowerOrEqual),
            number => number
                .parse::<usize>()
                .map(NumberToken::Number)
                .map_err(|_| SelectError::InvalidNumber(String::new())),
        }
    }

    fn number(self) -> Result<usize, SelectError> {
        match self {
            NumberToken::Number(n) => Ok(n),
            _ => Err(SelectError::InvalidNumber(String::new())),
        }
    }
}

fn tokenize_numbers(token: &[String]) -> Result<Vec<NumberToken>, SelectError> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for c in token.join(" ").chars() {
        match c {
            // '-' is always a range
            '-' => {
                if !current.is_empty() {
                    tokens.push(NumberToken::from_fragment(&current)?);
                    current.clear();
                }
                tokens.push(NumberToken::Range);
            }
            '<' | '>' => {
                if !current.is_empty() {
                    tokens.push(NumberToken::from_fragment(&current)?);
                    current.clear();
                }
                current.push(c);
            }
            // '=' must follow '<' or '>'
            '=' => {
                if current != "<" && current != ">" {
                    return Err(SelectError::InvalidNumber(String::new()));
                }
                current.push(c);
                tokens.push(NumberToken::from_fragment(&current)?);
                current.clear();
            }
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(NumberToken::from_fragment(&current)?);
                    current.clear();
                }
            }
            c if c.is_ascii_digit() => {
                if current == "<" || current == ">" {
                    tokens.push(NumberToken::from_fragment(&current)?);
                    current.clear();
                }
                current.push(c);
            }
            _ => return Err(SelectError::InvalidNumber(String::new())),
        }
    }

    if !current.is_empty() {
        tokens.push(NumberToken::from_fragment(&current)?);
    }

    Ok(tokens)
}

/// Parse numbers and ranges of numbers into a vector of inclusive `(start, end)` ranges.
/// `lowest` is the smallest valid number, used as the start of `<` and `<=` ranges.
pub(super) fn parse_numbers(
    token: &[String],
    lowest: usize,
) -> Result<Vec<(usize, usize)>, SelectError> {
    let tokens = tokenize_numbers(token)?;

    let mut numbers = Vec::new();
    let mut t = 0;
    while t < tokens.len() {
        match tokens[t] {
            NumberToken::Number(n) => {
                // number is the start of a range
                if tokens.get(t + 1) == Some(&NumberToken::Range) {
                    t += 1;
                    continue;
                }

                numbers.push((n, n));
                t += 1;
            }

            NumberToken::Range => {
                if t == 0 || t + 1 == tokens.len() {
                    return Err(SelectError::InvalidNumber(String::new()));
                }

                let previous = tokens[t - 1].number()?;
                let next = tokens[t + 1].number()?;

                if previous > next {
                    return Err(SelectError::InvalidNumber(String::new()));
                }

                numbers.push((previous, next));
                t += 2;
            }

            operator => {
                let next = match tokens.get(t + 1) {
                    Some(token) => token.number()?,
                    None => return Err(SelectError::InvalidNumber(String::new())),
                };

                match operator {
                    NumberToken::Greater => numbers.push((next.saturating_add(1), usize::MAX)),
                    NumberToken::GreaterOrEqual => numbers.push((next, usize::MAX)),
                    NumberToken::Lower if next > lowest => numbers.push((lowest, next - 1)),
                    NumberToken::Lower => (),
                    NumberToken::LowerOrEqual if next >= lowest => numbers.push((lowest, next)),
                    NumberToken::LowerOrEqual => (),
                    NumberToken::Number(_) | NumberToken::Range => panic!(
                        "FATAL HBOND ERROR | numbers::parse_numbers | Impossible match condition reached."
                    ),
                }

                t += 2;
            }
        }
    }

    Ok(numbers)
}
