//! Textual interchange form of a compiled [`Index`].
//!
//! One fact per line, `%` starts a comment:
//!
//! ```text
//! symptom(fever).
//! condition(influenza, kind(viral), system(respiratory)).
//! describes(influenza, "Acute viral infection").
//! characterizes(influenza, fever, 3).
//! treats(paracetamol, [common_cold, influenza]).
//! contraindicated_by_allergy(ibuprofen, nsaids).
//! contraindicated_by_chronic(ibuprofen, uncontrolled_hypertension).
//! ```
//!
//! [`parse`] builds an [`Index`] directly from the facts, without going
//! through the store compiler, and is strict: atoms must already be
//! canonical and weights must lie in `[1, 3]`.

use std::fmt::Write as _;

use crate::knowledge::normalize::is_canonical;
use crate::knowledge::types::{MAX_WEIGHT, MIN_WEIGHT};

use super::index::{Index, IndexedCondition, IndexedMedication};
use super::types::CompileError;

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Render `index` as ruleset text, facts in index order.
pub fn render(index: &Index) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "% medilogic ruleset, revision {}", index.revision());

    if !index.symptoms().is_empty() {
        out.push('\n');
    }
    for symptom in index.symptoms() {
        let _ = writeln!(out, "symptom({symptom}).");
    }

    for c in index.conditions() {
        out.push('\n');
        let _ = writeln!(
            out,
            "condition({}, kind({}), system({})).",
            c.name, c.kind, c.system
        );
        if !c.description.is_empty() {
            let _ = writeln!(out, "describes({}, {}).", c.name, quote(&c.description));
        }
        for (symptom, weight) in c.characteristics() {
            let _ = writeln!(out, "characterizes({}, {symptom}, {weight}).", c.name);
        }
    }

    for m in index.medications() {
        out.push('\n');
        let treats: Vec<&str> = m.treats.iter().map(String::as_str).collect();
        let _ = writeln!(out, "treats({}, [{}]).", m.name, treats.join(", "));
        for allergy in &m.disallowed_allergies {
            let _ = writeln!(out, "contraindicated_by_allergy({}, {allergy}).", m.name);
        }
        for chronic in &m.disallowed_chronics {
            let _ = writeln!(out, "contraindicated_by_chronic({}, {chronic}).", m.name);
        }
    }

    out
}

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Parse ruleset text into an [`Index`].
///
/// Errors carry the 1-based line of the offending fact.
pub fn parse(text: &str) -> Result<Index, CompileError> {
    let mut builder = Builder::default();

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }
        let fact = read_fact(trimmed).map_err(|message| CompileError::Ruleset { line, message })?;
        builder
            .apply(fact)
            .map_err(|message| CompileError::Ruleset { line, message })?;
    }

    Ok(builder.finish())
}

#[derive(Debug, Clone, PartialEq)]
enum Term {
    Atom(String),
    Int(i64),
    Str(String),
    Compound(String, Vec<Term>),
    List(Vec<Term>),
}

/// Character cursor over a single fact line.
struct Reader {
    chars: Vec<char>,
    pos: usize,
}

impl Reader {
    fn new(line: &str) -> Self {
        Self {
            chars: line.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn consume(&mut self, want: char) -> Result<(), String> {
        self.skip_ws();
        match self.bump() {
            Some(c) if c == want => Ok(()),
            Some(c) => Err(format!("expected '{want}', found '{c}'")),
            None => Err(format!("expected '{want}', found end of line")),
        }
    }

    fn word(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn string(&mut self) -> Result<String, String> {
        self.consume('"')?;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('r') => out.push('\r'),
                    Some('t') => out.push('\t'),
                    Some(c @ ('"' | '\\')) => out.push(c),
                    Some(c) => return Err(format!("unknown escape '\\{c}'")),
                    None => return Err("unterminated string".into()),
                },
                Some(c) => out.push(c),
                None => return Err("unterminated string".into()),
            }
        }
    }

    fn term(&mut self) -> Result<Term, String> {
        self.skip_ws();
        match self.peek() {
            Some('"') => return self.string().map(Term::Str),
            Some('[') => {
                self.pos += 1;
                return self.arguments(']').map(Term::List);
            }
            _ => {}
        }
        let word = self.word();
        if word.is_empty() {
            return match self.peek() {
                Some(c) => Err(format!("unexpected '{c}'")),
                None => Err("unexpected end of line".into()),
            };
        }
        if let Ok(n) = word.parse::<i64>() {
            return Ok(Term::Int(n));
        }
        if self.peek() == Some('(') {
            self.pos += 1;
            let args = self.arguments(')')?;
            return Ok(Term::Compound(word, args));
        }
        Ok(Term::Atom(word))
    }

    /// Comma-separated terms up to `close`; the opening bracket is consumed.
    fn arguments(&mut self, close: char) -> Result<Vec<Term>, String> {
        let mut args = Vec::new();
        self.skip_ws();
        if self.peek() == Some(close) {
            self.pos += 1;
            return Ok(args);
        }
        loop {
            args.push(self.term()?);
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some(c) if c == close => return Ok(args),
                Some(c) => return Err(format!("expected ',' or '{close}', found '{c}'")),
                None => return Err(format!("missing '{close}'")),
            }
        }
    }
}

fn read_fact(line: &str) -> Result<(String, Vec<Term>), String> {
    let mut reader = Reader::new(line);
    let fact = match reader.term()? {
        Term::Compound(name, args) => (name, args),
        Term::Atom(name) => (name, Vec::new()),
        other => return Err(format!("expected a fact, found {other:?}")),
    };
    reader.consume('.')?;
    reader.skip_ws();
    match reader.peek() {
        None | Some('%') => Ok(fact),
        Some(c) => Err(format!("unexpected '{c}' after end of fact")),
    }
}

fn atom(term: &Term) -> Result<&str, String> {
    match term {
        Term::Atom(a) if is_canonical(a) => Ok(a),
        Term::Atom(a) => Err(format!("'{a}' is not a canonical identifier")),
        other => Err(format!("expected an identifier, found {other:?}")),
    }
}

/// Unwrap a one-argument tag such as `kind(viral)`.
fn tagged<'a>(term: &'a Term, tag: &str) -> Result<&'a str, String> {
    match term {
        Term::Compound(name, args) if name == tag && args.len() == 1 => atom(&args[0]),
        other => Err(format!("expected {tag}(...), found {other:?}")),
    }
}

struct ConditionFacts {
    name: String,
    kind: String,
    system: String,
    description: String,
    characteristics: Vec<(String, u8)>,
}

#[derive(Default)]
struct Builder {
    symptoms: Vec<String>,
    conditions: Vec<ConditionFacts>,
    medications: Vec<IndexedMedication>,
}

impl Builder {
    fn condition_mut(&mut self, name: &str) -> Result<&mut ConditionFacts, String> {
        self.conditions
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| format!("condition '{name}' is not declared"))
    }

    fn medication_mut(&mut self, name: &str) -> Result<&mut IndexedMedication, String> {
        self.medications
            .iter_mut()
            .find(|m| m.name == name)
            .ok_or_else(|| format!("medication '{name}' is not declared"))
    }

    fn apply(&mut self, (name, args): (String, Vec<Term>)) -> Result<(), String> {
        match (name.as_str(), args.as_slice()) {
            ("symptom", [s]) => {
                let s = atom(s)?;
                if !self.symptoms.iter().any(|e| e == s) {
                    self.symptoms.push(s.to_string());
                }
            }
            ("condition", [n, kind, system]) => {
                let n = atom(n)?;
                if self.conditions.iter().any(|c| c.name == n) {
                    return Err(format!("condition '{n}' declared twice"));
                }
                self.conditions.push(ConditionFacts {
                    name: n.to_string(),
                    kind: tagged(kind, "kind")?.to_string(),
                    system: tagged(system, "system")?.to_string(),
                    description: String::new(),
                    characteristics: Vec::new(),
                });
            }
            ("describes", [n, Term::Str(text)]) => {
                let n = atom(n)?;
                self.condition_mut(n)?.description = text.clone();
            }
            ("characterizes", [n, s, Term::Int(w)]) => {
                let (n, s) = (atom(n)?, atom(s)?);
                if !(MIN_WEIGHT as i64..=MAX_WEIGHT as i64).contains(w) {
                    return Err(format!(
                        "weight {w} outside {MIN_WEIGHT}..={MAX_WEIGHT}"
                    ));
                }
                self.condition_mut(n)?
                    .characteristics
                    .push((s.to_string(), *w as u8));
            }
            ("treats", [m, Term::List(items)]) => {
                let m = atom(m)?;
                if self.medications.iter().any(|e| e.name == m) {
                    return Err(format!("medication '{m}' declared twice"));
                }
                let mut medication = IndexedMedication::new(m.to_string());
                for item in items {
                    medication.treats.insert(atom(item)?.to_string());
                }
                self.medications.push(medication);
            }
            ("contraindicated_by_allergy", [m, a]) => {
                let (m, a) = (atom(m)?, atom(a)?);
                self.medication_mut(m)?
                    .disallowed_allergies
                    .insert(a.to_string());
            }
            ("contraindicated_by_chronic", [m, c]) => {
                let (m, c) = (atom(m)?, atom(c)?);
                self.medication_mut(m)?
                    .disallowed_chronics
                    .insert(c.to_string());
            }
            (other, args) => {
                return Err(format!("unknown fact {other}/{}", args.len()));
            }
        }
        Ok(())
    }

    fn finish(self) -> Index {
        let conditions = self
            .conditions
            .into_iter()
            .map(|c| {
                IndexedCondition::new(c.name, c.kind, c.system, c.description, c.characteristics)
            })
            .collect();
        Index::from_parts(self.symptoms, conditions, self.medications)
    }
}
