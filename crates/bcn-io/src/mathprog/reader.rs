//! Reader for the MathProg data subset emitted by [`super::write_model`].
//!
//! Supported statements: `data;`, `end;`, `/* comments */`, `set NAME := ..;`
//! (including indexed names such as `A_OUT[n]`), scalar params, `key value`
//! list params and `[row, *]` slice params.

use std::collections::BTreeMap;

use bcn_core::{BcnError, BcnResult};

/// Sets and parameters read from a MathProg data section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MathProgData {
    /// Set members in file order, keyed by the full set name (`A_OUT[1]`).
    pub sets: BTreeMap<String, Vec<String>>,
    /// Raw parameter values keyed by their subscript; scalars use an empty key.
    pub params: BTreeMap<String, BTreeMap<Vec<String>, String>>,
}

impl MathProgData {
    pub fn set(&self, name: &str) -> Option<&[String]> {
        self.sets.get(name).map(Vec::as_slice)
    }

    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.number(name, &[])
    }

    pub fn value(&self, name: &str, key: &[&str]) -> Option<&str> {
        let key: Vec<String> = key.iter().map(|s| s.to_string()).collect();
        self.params.get(name)?.get(&key).map(String::as_str)
    }

    pub fn number(&self, name: &str, key: &[&str]) -> Option<f64> {
        self.value(name, key)?.parse().ok()
    }
}

/// Parse MathProg data text.
pub fn parse_mathprog(text: &str) -> BcnResult<MathProgData> {
    let stripped = strip_comments(text)?;
    let mut data = MathProgData::default();

    for statement in stripped.split(';') {
        let tokens = tokenize(statement);
        let Some(first) = tokens.first() else {
            continue;
        };
        match first.as_str() {
            "data" => continue,
            "end" => break,
            "set" => {
                let (name, rest) = split_definition(&tokens[1..], statement)?;
                if data.sets.insert(name.clone(), rest.to_vec()).is_some() {
                    return Err(BcnError::Parse(format!("set {} defined twice", name)));
                }
            }
            "param" => {
                let (name, rest) = split_definition(&tokens[1..], statement)?;
                let values = parse_param_body(&name, rest)?;
                if data.params.insert(name.clone(), values).is_some() {
                    return Err(BcnError::Parse(format!("param {} defined twice", name)));
                }
            }
            other => {
                return Err(BcnError::Parse(format!(
                    "unexpected statement starting with '{}'",
                    other
                )))
            }
        }
    }
    Ok(data)
}

fn strip_comments(text: &str) -> BcnResult<String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        let end = rest[start + 2..]
            .find("*/")
            .ok_or_else(|| BcnError::Parse("unterminated comment".into()))?;
        out.push(' ');
        rest = &rest[start + 2 + end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Split on whitespace, keeping `[`, `]`, `,` and `:=` as separate tokens.
fn tokenize(statement: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = statement.chars().peekable();

    let flush = |current: &mut String, tokens: &mut Vec<String>| {
        if !current.is_empty() {
            tokens.push(std::mem::take(current));
        }
    };

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => flush(&mut current, &mut tokens),
            '[' | ']' | ',' => {
                flush(&mut current, &mut tokens);
                tokens.push(c.to_string());
            }
            ':' if chars.peek() == Some(&'=') => {
                chars.next();
                flush(&mut current, &mut tokens);
                tokens.push(":=".to_string());
            }
            c => current.push(c),
        }
    }
    flush(&mut current, &mut tokens);
    tokens
}

/// `NAME [ k , .. ] := rest` into (`NAME[k,..]`, rest).
fn split_definition<'a>(
    tokens: &'a [String],
    statement: &str,
) -> BcnResult<(String, &'a [String])> {
    let assign = tokens
        .iter()
        .position(|t| t == ":=")
        .ok_or_else(|| BcnError::Parse(format!("missing ':=' in '{}'", statement.trim())))?;
    let head = &tokens[..assign];
    let Some(base) = head.first() else {
        return Err(BcnError::Parse(format!(
            "missing name in '{}'",
            statement.trim()
        )));
    };
    let mut name = base.clone();
    if head.len() > 1 {
        // re-join the subscript without spaces: A_OUT[1]
        name.extend(head[1..].iter().map(String::as_str));
    }
    Ok((name, &tokens[assign + 1..]))
}

fn parse_param_body(name: &str, body: &[String]) -> BcnResult<BTreeMap<Vec<String>, String>> {
    let mut values = BTreeMap::new();

    if body.len() == 1 && body[0] != "[" {
        values.insert(Vec::new(), body[0].clone());
        return Ok(values);
    }

    // Slice template: None marks a `*` position filled from the entries.
    let mut template: Vec<Option<String>> = vec![None];
    let mut i = 0;
    while i < body.len() {
        if body[i] == "[" {
            let close = body[i..]
                .iter()
                .position(|t| t == "]")
                .map(|p| p + i)
                .ok_or_else(|| BcnError::Parse(format!("param {}: unclosed slice", name)))?;
            template = body[i + 1..close]
                .iter()
                .filter(|t| t.as_str() != ",")
                .map(|t| (t != "*").then(|| t.clone()))
                .collect();
            i = close + 1;
            continue;
        }

        let free = template.iter().filter(|t| t.is_none()).count();
        if i + free >= body.len() {
            return Err(BcnError::Parse(format!(
                "param {}: incomplete entry starting at '{}'",
                name, body[i]
            )));
        }
        let mut fill = body[i..i + free].iter();
        let key: Vec<String> = template
            .iter()
            .map(|t| match t {
                Some(fixed) => fixed.clone(),
                None => fill.next().cloned().unwrap_or_default(),
            })
            .collect();
        values.insert(key, body[i + free].clone());
        i += free + 1;
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("param C:=[arc_1_2,*] 0 4"),
            vec!["param", "C", ":=", "[", "arc_1_2", ",", "*", "]", "0", "4"]
        );
    }

    #[test]
    fn test_parse_statements() {
        let text = "\
data;
/* Set of nodes */
set N :=
  1  2  3;
set A_OUT[3] :=
;
param ORIGIN :=
  od_0  1;
param C :=
  [arc_1_2, *]  0  4  1  3.52
  [arc_2_3, *]  0  6  1  5.28
;
param B := 100;
end;
";
        let data = parse_mathprog(text).unwrap();
        assert_eq!(data.set("N").unwrap(), &["1", "2", "3"]);
        assert!(data.set("A_OUT[3]").unwrap().is_empty());
        assert_eq!(data.value("ORIGIN", &["od_0"]), Some("1"));
        assert_eq!(data.number("C", &["arc_2_3", "1"]), Some(5.28));
        assert_eq!(data.scalar("B"), Some(100.0));
    }

    #[test]
    fn test_errors() {
        assert!(parse_mathprog("set N 1 2;").is_err());
        assert!(parse_mathprog("/* open").is_err());
        assert!(parse_mathprog("param C := [a, *] 0;").is_err());
        assert!(parse_mathprog("set N := 1; set N := 2;").is_err());
        assert!(parse_mathprog("var x;").is_err());
    }
}
