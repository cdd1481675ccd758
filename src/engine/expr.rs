use std::collections::BTreeSet;

use thiserror::Error;

use crate::data::model::{Dataset, Record};

/// Quality floor applied when a condition selects players with a null
/// column (unattached free agents): only those rated at least this well
/// are worth listing.
const FREE_AGENT_OVERALL_FLOOR: f64 = 75.0;

/// Minimum `potential - overall` difference for the growth-gap pattern.
const GROWTH_GAP_MIN: f64 = 15.0;

/// A condition string that neither the generic parser nor any fallback
/// strategy could interpret against the dataset at hand.
#[derive(Debug, Clone, Error)]
#[error("cannot interpret condition '{cond}': {cause}")]
pub struct ExpressionError {
    pub cond: String,
    pub cause: String,
}

// ---------------------------------------------------------------------------
// Compiled predicates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    Text(String),
}

/// Parsed boolean expression over column comparisons.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Cmp {
        column: String,
        op: CmpOp,
        value: Literal,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    fn collect_columns(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Cmp { column, .. } => {
                out.insert(column.clone());
            }
            Expr::And(a, b) | Expr::Or(a, b) => {
                a.collect_columns(out);
                b.collect_columns(out);
            }
        }
    }
}

/// A compiled filter condition: either a generic parsed expression or one
/// of the pattern-specific fallback interpretations.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Expr(Expr),
    /// Column value present and non-null.
    NotNull { column: String },
    /// Column value null/absent AND `overall` at or above the free-agent
    /// floor. The floor is part of this pattern, not a general null check.
    NullWithFloor { column: String },
    /// `potential - overall >= GROWTH_GAP_MIN`, with no age bound.
    GrowthGap,
}

impl Predicate {
    pub fn matches(&self, rec: &Record) -> bool {
        match self {
            Predicate::Expr(expr) => eval_expr(expr, rec),
            Predicate::NotNull { column } => !rec.is_missing(column),
            Predicate::NullWithFloor { column } => {
                rec.is_missing(column)
                    && rec
                        .number("overall")
                        .is_some_and(|v| v >= FREE_AGENT_OVERALL_FLOOR)
            }
            Predicate::GrowthGap => match (rec.number("potential"), rec.number("overall")) {
                (Some(p), Some(o)) => p - o >= GROWTH_GAP_MIN,
                _ => false,
            },
        }
    }

    /// Columns this predicate reads; all must exist in the dataset schema
    /// for the predicate to be usable.
    fn referenced_columns(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        match self {
            Predicate::Expr(expr) => expr.collect_columns(&mut out),
            Predicate::NotNull { column } => {
                out.insert(column.clone());
            }
            Predicate::NullWithFloor { column } => {
                out.insert(column.clone());
                out.insert("overall".to_string());
            }
            Predicate::GrowthGap => {
                out.insert("potential".to_string());
                out.insert("overall".to_string());
            }
        }
        out
    }
}

/// Comparisons against a missing value are false, whichever the operator.
fn eval_expr(expr: &Expr, rec: &Record) -> bool {
    match expr {
        Expr::Cmp { column, op, value } => match value {
            Literal::Number(n) => rec
                .number(column)
                .is_some_and(|v| cmp_matches(*op, v.partial_cmp(n))),
            Literal::Text(s) => rec
                .text(column)
                .is_some_and(|v| cmp_matches(*op, v.partial_cmp(s.as_str()))),
        },
        Expr::And(a, b) => eval_expr(a, rec) && eval_expr(b, rec),
        Expr::Or(a, b) => eval_expr(a, rec) || eval_expr(b, rec),
    }
}

fn cmp_matches(op: CmpOp, ord: Option<std::cmp::Ordering>) -> bool {
    use std::cmp::Ordering::*;
    match ord {
        None => false,
        Some(ord) => match op {
            CmpOp::Lt => ord == Less,
            CmpOp::Le => ord != Greater,
            CmpOp::Gt => ord == Greater,
            CmpOp::Ge => ord != Less,
            CmpOp::Eq => ord == Equal,
            CmpOp::Ne => ord != Equal,
        },
    }
}

// ---------------------------------------------------------------------------
// Tokenizer + recursive-descent parser for the generic path
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Number(f64),
    Text(String),
    Op(CmpOp),
    And,
    Or,
    LParen,
    RParen,
}

/// Splits a condition into tokens. The grammar the generic path accepts
/// is comparisons (`<`, `<=`, `>`, `>=`, `==`, `!=`) between a column
/// name and a numeric or quoted string literal, joined with `and`/`or`
/// (or `&`/`|`) and grouped with parentheses. Numeric literals may carry
/// a leading minus when it sits directly against the digits; a freestanding
/// `-` is not an operator here, so arithmetic like column differences is
/// left to the fallback strategies.
fn tokenize(cond: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = cond.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '&' => {
                tokens.push(Token::And);
                i += 1;
            }
            '|' => {
                tokens.push(Token::Or);
                i += 1;
            }
            '>' | '<' | '=' | '!' => {
                let two = if i + 1 < chars.len() { chars[i + 1] } else { ' ' };
                let (op, len) = match (c, two) {
                    ('>', '=') => (CmpOp::Ge, 2),
                    ('<', '=') => (CmpOp::Le, 2),
                    ('=', '=') => (CmpOp::Eq, 2),
                    ('!', '=') => (CmpOp::Ne, 2),
                    ('>', _) => (CmpOp::Gt, 1),
                    ('<', _) => (CmpOp::Lt, 1),
                    _ => return Err(format!("unexpected character '{c}' at {i}")),
                };
                tokens.push(Token::Op(op));
                i += len;
            }
            '\'' | '"' => {
                let quote = c;
                let start = i + 1;
                let mut j = start;
                while j < chars.len() && chars[j] != quote {
                    j += 1;
                }
                if j >= chars.len() {
                    return Err("unterminated string literal".to_string());
                }
                tokens.push(Token::Text(chars[start..j].iter().collect()));
                i = j + 1;
            }
            c if c.is_ascii_digit()
                || (c == '-' && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit())) =>
            {
                let start = i;
                if c == '-' {
                    i += 1;
                }
                while i < chars.len()
                    && (chars[i].is_ascii_digit() || chars[i] == '.' || chars[i] == '_')
                {
                    i += 1;
                }
                let raw: String = chars[start..i].iter().filter(|c| **c != '_').collect();
                let n = raw
                    .parse::<f64>()
                    .map_err(|_| format!("bad number '{raw}'"))?;
                tokens.push(Token::Number(n));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                match word.as_str() {
                    "and" => tokens.push(Token::And),
                    "or" => tokens.push(Token::Or),
                    _ => tokens.push(Token::Ident(word)),
                }
            }
            other => return Err(format!("unexpected character '{other}' at {i}")),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn parse_or(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.next();
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_primary()?;
        while self.peek() == Some(&Token::And) {
            self.next();
            let right = self.parse_primary()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<Expr, String> {
        match self.next() {
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err("expected ')'".to_string()),
                }
            }
            Some(Token::Ident(column)) => {
                let op = match self.next() {
                    Some(Token::Op(op)) => op,
                    _ => return Err(format!("expected comparison after '{column}'")),
                };
                match self.next() {
                    Some(Token::Number(n)) => Ok(Expr::Cmp {
                        column,
                        op,
                        value: Literal::Number(n),
                    }),
                    Some(Token::Text(s)) => Ok(Expr::Cmp {
                        column,
                        op,
                        value: Literal::Text(s),
                    }),
                    _ => Err(format!("expected literal after comparison on '{column}'")),
                }
            }
            // Reversed form: `85 <= overall`
            Some(Token::Number(n)) => {
                let op = match self.next() {
                    Some(Token::Op(op)) => flip(op),
                    _ => return Err("expected comparison after number".to_string()),
                };
                match self.next() {
                    Some(Token::Ident(column)) => Ok(Expr::Cmp {
                        column,
                        op,
                        value: Literal::Number(n),
                    }),
                    _ => Err("expected column after comparison".to_string()),
                }
            }
            other => Err(format!("unexpected token {other:?}")),
        }
    }
}

fn flip(op: CmpOp) -> CmpOp {
    match op {
        CmpOp::Lt => CmpOp::Gt,
        CmpOp::Le => CmpOp::Ge,
        CmpOp::Gt => CmpOp::Lt,
        CmpOp::Ge => CmpOp::Le,
        CmpOp::Eq => CmpOp::Eq,
        CmpOp::Ne => CmpOp::Ne,
    }
}

fn parse_expression(cond: &str) -> Result<Expr, String> {
    let tokens = tokenize(cond)?;
    if tokens.is_empty() {
        return Err("empty condition".to_string());
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    if parser.pos != parser.tokens.len() {
        return Err(format!(
            "trailing tokens after expression: {:?}",
            &parser.tokens[parser.pos..]
        ));
    }
    Ok(expr)
}

// ---------------------------------------------------------------------------
// Fallback strategy chain
// ---------------------------------------------------------------------------

/// Pattern-specific interpretations tried, in order, when the generic
/// parser fails (or references columns the dataset does not have). Each
/// strategy either recognizes the condition and yields a predicate, or is
/// not applicable and the next one is tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    NotNullPattern,
    NullWithFloorPattern,
    GrowthGapPattern,
    /// Generic parse retried once as a safety net; parsing is pure, so
    /// this only ever matters if an earlier strategy misfired.
    RetryParse,
}

const FALLBACK_CHAIN: [Strategy; 4] = [
    Strategy::NotNullPattern,
    Strategy::NullWithFloorPattern,
    Strategy::GrowthGapPattern,
    Strategy::RetryParse,
];

impl Strategy {
    fn name(self) -> &'static str {
        match self {
            Strategy::NotNullPattern => "not-null",
            Strategy::NullWithFloorPattern => "null-with-floor",
            Strategy::GrowthGapPattern => "growth-gap",
            Strategy::RetryParse => "retry-parse",
        }
    }

    fn compile(self, cond: &str) -> Option<Predicate> {
        match self {
            Strategy::NotNullPattern => {
                if cond.contains(".notna()") {
                    Some(Predicate::NotNull {
                        column: leading_column(cond),
                    })
                } else {
                    None
                }
            }
            Strategy::NullWithFloorPattern => {
                if cond.contains(".isnull()") {
                    Some(Predicate::NullWithFloor {
                        column: leading_column(cond),
                    })
                } else {
                    None
                }
            }
            Strategy::GrowthGapPattern => {
                if cond.contains("potential - overall") {
                    Some(Predicate::GrowthGap)
                } else {
                    None
                }
            }
            Strategy::RetryParse => parse_expression(cond).ok().map(Predicate::Expr),
        }
    }
}

/// Column name before the first `.` in a method-style condition like
/// `"value_eur.notna()"`.
fn leading_column(cond: &str) -> String {
    cond.split('.').next().unwrap_or(cond).trim().to_string()
}

// ---------------------------------------------------------------------------
// Evaluation entry points
// ---------------------------------------------------------------------------

fn columns_present(dataset: &Dataset, pred: &Predicate) -> bool {
    pred.referenced_columns()
        .iter()
        .all(|c| dataset.has_column(c))
}

/// Compile a condition string against a dataset schema.
///
/// The generic parser runs first; if it fails, or the parsed expression
/// references a column the dataset does not have, the fallback chain is
/// consulted in order and the first applicable strategy wins.
pub fn compile(dataset: &Dataset, cond: &str) -> Result<Predicate, ExpressionError> {
    let primary_err = match parse_expression(cond) {
        Ok(expr) => {
            let pred = Predicate::Expr(expr);
            if columns_present(dataset, &pred) {
                return Ok(pred);
            }
            "expression references a column absent from the dataset".to_string()
        }
        Err(e) => e,
    };

    for strategy in FALLBACK_CHAIN {
        if let Some(pred) = strategy.compile(cond) {
            if columns_present(dataset, &pred) {
                log::debug!("condition '{cond}' matched by {} strategy", strategy.name());
                return Ok(pred);
            }
        }
    }

    Err(ExpressionError {
        cond: cond.to_string(),
        cause: primary_err,
    })
}

/// Evaluate a condition over the whole dataset, returning the matching
/// records in source order. An empty dataset short-circuits to an empty
/// result without compiling anything.
pub fn evaluate(dataset: &Dataset, cond: &str) -> Result<Vec<Record>, ExpressionError> {
    if dataset.is_empty() {
        return Ok(Vec::new());
    }
    let predicate = compile(dataset, cond)?;
    Ok(dataset
        .records
        .iter()
        .filter(|rec| predicate.matches(rec))
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, CoercionPolicy};

    fn player(name: &str, fields: &[(&str, CellValue)]) -> Record {
        let mut rec: Record = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        rec.insert("short_name", CellValue::String(name.to_string()));
        rec
    }

    fn dataset(records: Vec<Record>) -> Dataset {
        // No compact-integer recast here so null cells stay null in tests.
        let policy = CoercionPolicy {
            numeric_name_tokens: Vec::new(),
            compact_integer_max: None,
        };
        Dataset::from_records(records, &policy)
    }

    fn names(records: &[Record]) -> Vec<&str> {
        records.iter().filter_map(|r| r.text("short_name")).collect()
    }

    #[test]
    fn generic_conjunction_of_comparisons() {
        let ds = dataset(vec![
            player(
                "a",
                &[
                    ("overall", CellValue::Integer(85)),
                    ("age", CellValue::Integer(21)),
                ],
            ),
            player(
                "b",
                &[
                    ("overall", CellValue::Integer(85)),
                    ("age", CellValue::Integer(30)),
                ],
            ),
            player(
                "c",
                &[
                    ("overall", CellValue::Integer(70)),
                    ("age", CellValue::Integer(21)),
                ],
            ),
        ]);
        let out = evaluate(&ds, "overall >= 80 and age <= 23").unwrap();
        assert_eq!(names(&out), vec!["a"]);
    }

    #[test]
    fn generic_disjunction_and_parentheses() {
        let ds = dataset(vec![
            player(
                "a",
                &[
                    ("overall", CellValue::Integer(90)),
                    ("age", CellValue::Integer(35)),
                ],
            ),
            player(
                "b",
                &[
                    ("overall", CellValue::Integer(60)),
                    ("age", CellValue::Integer(17)),
                ],
            ),
            player(
                "c",
                &[
                    ("overall", CellValue::Integer(60)),
                    ("age", CellValue::Integer(35)),
                ],
            ),
        ]);
        let out = evaluate(&ds, "(overall >= 88) or (age < 18)").unwrap();
        assert_eq!(names(&out), vec!["a", "b"]);
    }

    #[test]
    fn string_equality_comparison() {
        let ds = dataset(vec![
            player("a", &[("preferred_foot", CellValue::String("Left".into()))]),
            player("b", &[("preferred_foot", CellValue::String("Right".into()))]),
        ]);
        let out = evaluate(&ds, "preferred_foot == 'Left'").unwrap();
        assert_eq!(names(&out), vec!["a"]);
    }

    #[test]
    fn negative_literal_in_comparison() {
        // Derived columns such as net transfer balance can go below zero.
        let ds = dataset(vec![
            player("a", &[("net_spend", CellValue::Integer(-8))]),
            player("b", &[("net_spend", CellValue::Integer(-3))]),
            player("c", &[("net_spend", CellValue::Integer(4))]),
        ]);
        let out = evaluate(&ds, "net_spend >= -5").unwrap();
        assert_eq!(names(&out), vec!["b", "c"]);
    }

    #[test]
    fn freestanding_minus_is_not_subtraction_in_the_generic_path() {
        // `potential - overall` must keep falling through to the
        // growth-gap strategy rather than tokenize as a literal.
        let ds = dataset(vec![
            player(
                "a",
                &[
                    ("overall", CellValue::Integer(74)),
                    ("potential", CellValue::Integer(90)),
                ],
            ),
            player(
                "b",
                &[
                    ("overall", CellValue::Integer(85)),
                    ("potential", CellValue::Integer(88)),
                ],
            ),
        ]);
        let out = evaluate(&ds, "potential - overall >= 15").unwrap();
        assert_eq!(names(&out), vec!["a"]);
    }

    #[test]
    fn notna_fallback_selects_exactly_non_null_rows() {
        let ds = dataset(vec![
            player("a", &[("value_eur", CellValue::Float(5e6))]),
            player("b", &[("value_eur", CellValue::Null)]),
            player("c", &[("value_eur", CellValue::Float(1e6))]),
        ]);
        let out = evaluate(&ds, "value_eur.notna()").unwrap();
        assert_eq!(names(&out), vec!["a", "c"]);
    }

    #[test]
    fn isnull_fallback_applies_overall_floor() {
        let ds = dataset(vec![
            player(
                "free_good",
                &[
                    ("club_name", CellValue::Null),
                    ("overall", CellValue::Integer(80)),
                ],
            ),
            player(
                "free_weak",
                &[
                    ("club_name", CellValue::Null),
                    ("overall", CellValue::Integer(70)),
                ],
            ),
            player(
                "signed",
                &[
                    ("club_name", CellValue::String("Ajax".into())),
                    ("overall", CellValue::Integer(90)),
                ],
            ),
        ]);
        let out = evaluate(&ds, "club_name.isnull()").unwrap();
        assert_eq!(names(&out), vec!["free_good"]);
    }

    #[test]
    fn growth_gap_fallback_ignores_age() {
        let ds = dataset(vec![
            player(
                "young_gem",
                &[
                    ("overall", CellValue::Integer(70)),
                    ("potential", CellValue::Integer(88)),
                    ("age", CellValue::Integer(18)),
                ],
            ),
            player(
                "old_gem",
                &[
                    ("overall", CellValue::Integer(70)),
                    ("potential", CellValue::Integer(85)),
                    ("age", CellValue::Integer(29)),
                ],
            ),
            player(
                "steady",
                &[
                    ("overall", CellValue::Integer(80)),
                    ("potential", CellValue::Integer(84)),
                    ("age", CellValue::Integer(20)),
                ],
            ),
        ]);
        let out = evaluate(&ds, "potential - overall >= 15 and age <= 21").unwrap();
        // Age clause is deliberately not part of this pattern.
        assert_eq!(names(&out), vec!["young_gem", "old_gem"]);
    }

    #[test]
    fn absent_column_exhausts_chain_into_expression_error() {
        let ds = dataset(vec![player("a", &[("overall", CellValue::Integer(85))])]);
        let err = evaluate(&ds, "release_clause_eur >= 1000").unwrap_err();
        assert!(err.to_string().contains("release_clause_eur"));
    }

    #[test]
    fn unparseable_condition_is_an_expression_error() {
        let ds = dataset(vec![player("a", &[("overall", CellValue::Integer(85))])]);
        assert!(evaluate(&ds, "overall >=").is_err());
        assert!(evaluate(&ds, "%%nonsense%%").is_err());
    }

    #[test]
    fn empty_dataset_returns_empty_without_compiling() {
        let ds = dataset(Vec::new());
        // Even a nonsense condition succeeds on an empty dataset.
        let out = evaluate(&ds, "%%nonsense%%").unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn missing_value_compares_false_for_every_operator() {
        let ds = dataset(vec![
            player("a", &[("age", CellValue::Null), ("overall", CellValue::Integer(80))]),
        ]);
        assert!(evaluate(&ds, "age >= 0").unwrap().is_empty());
        assert!(evaluate(&ds, "age != 30").unwrap().is_empty());
    }

    #[test]
    fn reversed_comparison_parses() {
        let ds = dataset(vec![
            player("a", &[("overall", CellValue::Integer(90))]),
            player("b", &[("overall", CellValue::Integer(70))]),
        ]);
        let out = evaluate(&ds, "85 <= overall").unwrap();
        assert_eq!(names(&out), vec!["a"]);
    }
}
