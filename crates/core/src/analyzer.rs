use std::sync::LazyLock;

use regex::Regex;

use crate::model::{Diagnostic, Language, LanguageClass};

//
// ─── CONSTANTS ─────────────────────────────────────────────────────────────────
//

const MISSPELLED_OUTPUT_CALLS: [&str; 2] = ["printt", "printff"];
const STATEMENT_EXEMPT_PREFIXES: [&str; 5] = ["//", "#", "if", "for", "while"];
const DECLARATION_KEYWORDS: [&str; 3] = ["let", "var", "const"];

static OUTPUT_OF_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"console\.log\(([A-Za-z0-9_]+)\)").expect("output-call pattern is valid")
});

//
// ─── SOURCE LINE ───────────────────────────────────────────────────────────────
//

/// One line of a submission, with the context a rule may need.
#[derive(Debug, Clone, Copy)]
pub struct SourceLine<'a> {
    /// 1-based line number.
    pub number: usize,
    pub raw: &'a str,
    pub trimmed: &'a str,
    /// The whole submission, for rules that look beyond the current line.
    pub source: &'a str,
}

impl<'a> SourceLine<'a> {
    fn new(number: usize, raw: &'a str, source: &'a str) -> Self {
        Self {
            number,
            raw,
            trimmed: raw.trim(),
            source,
        }
    }

    fn is_blank(&self) -> bool {
        self.trimmed.is_empty()
    }
}

//
// ─── RULES ─────────────────────────────────────────────────────────────────────
//

/// A single line-level heuristic.
///
/// Rules are independent of each other; a line can trip several of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    MisspelledOutputCall,
    PrintWithoutParentheses,
    QueryWithoutSemicolon,
    PropertyWithoutSemicolon,
    StatementWithoutSemicolon,
    UnmatchedBraces,
    UndeclaredIdentifier,
}

/// Every rule, in the order they are applied to each line.
pub const RULES: [Rule; 7] = [
    Rule::MisspelledOutputCall,
    Rule::PrintWithoutParentheses,
    Rule::QueryWithoutSemicolon,
    Rule::PropertyWithoutSemicolon,
    Rule::StatementWithoutSemicolon,
    Rule::UnmatchedBraces,
    Rule::UndeclaredIdentifier,
];

impl Rule {
    #[must_use]
    pub fn applies_to(self, class: LanguageClass) -> bool {
        match self {
            Rule::MisspelledOutputCall | Rule::UnmatchedBraces => true,
            Rule::PrintWithoutParentheses => class == LanguageClass::Indentation,
            Rule::QueryWithoutSemicolon => class == LanguageClass::Query,
            Rule::PropertyWithoutSemicolon => class == LanguageClass::StyleSheet,
            Rule::StatementWithoutSemicolon => class.has_statements(),
            Rule::UndeclaredIdentifier => class == LanguageClass::Script,
        }
    }

    /// Runs the rule against one line.
    #[must_use]
    pub fn check(self, line: &SourceLine<'_>) -> Option<Diagnostic> {
        match self {
            Rule::MisspelledOutputCall => MISSPELLED_OUTPUT_CALLS
                .iter()
                .any(|name| line.raw.contains(name))
                .then(|| Diagnostic::syntax(line.number, "Function name misspelled")),

            Rule::PrintWithoutParentheses => (line.trimmed.starts_with("print")
                && !line.raw.contains('('))
            .then(|| {
                Diagnostic::syntax(line.number, "Python 3 requires parentheses for print()")
            }),

            Rule::QueryWithoutSemicolon => (!line.is_blank()
                && line.trimmed.to_uppercase().starts_with("SELECT")
                && !line.raw.contains(';'))
            .then(|| Diagnostic::syntax(line.number, "SQL statements should end with semicolon")),

            Rule::PropertyWithoutSemicolon => (!line.is_blank()
                && line.raw.contains(':')
                && !line.raw.contains(';')
                && !line.raw.contains('{'))
            .then(|| Diagnostic::syntax(line.number, "CSS properties should end with semicolon")),

            Rule::StatementWithoutSemicolon => {
                let t = line.trimmed;
                let terminated = t.ends_with(';') || t.ends_with('{') || t.ends_with('}');
                let exempt = STATEMENT_EXEMPT_PREFIXES.iter().any(|p| t.starts_with(p));
                (!line.is_blank() && !terminated && !exempt && !line.raw.contains('(')).then(
                    || Diagnostic::syntax(line.number, "Missing semicolon at end of statement"),
                )
            }

            // Local to the line; braces opened on one line and closed on another are reported.
            Rule::UnmatchedBraces => {
                let open = line.raw.matches('{').count();
                let close = line.raw.matches('}').count();
                (!line.is_blank() && open != close)
                    .then(|| Diagnostic::syntax(line.number, "Unmatched brackets"))
            }

            Rule::UndeclaredIdentifier => {
                if !line.raw.contains("console.log") {
                    return None;
                }
                let name = OUTPUT_OF_IDENTIFIER.captures(line.raw)?.get(1)?.as_str();
                let declared = DECLARATION_KEYWORDS
                    .iter()
                    .any(|kw| line.source.contains(&format!("{kw} {name}")));
                (!declared).then(|| {
                    Diagnostic::reference(
                        line.number,
                        format!("Variable '{name}' may not be defined"),
                    )
                })
            }
        }
    }
}

//
// ─── ANALYZER ──────────────────────────────────────────────────────────────────
//

/// Inspects `source` line by line and reports every heuristic finding.
///
/// Diagnostics come back in discovery order: by line, then by rule order.
/// An empty result means the submission is accepted.
///
/// # Examples
///
/// ```
/// # use practice_core::analyzer::analyze;
/// # use practice_core::model::Language;
/// let diagnostics = analyze("int x = 1;\nprintt(x);", Language::C);
/// assert_eq!(diagnostics.len(), 1);
/// assert_eq!(diagnostics[0].line, 2);
/// ```
#[must_use]
pub fn analyze(source: &str, language: Language) -> Vec<Diagnostic> {
    analyze_class(source, language.class())
}

/// Same as [`analyze`], dispatched directly on a language class.
#[must_use]
pub fn analyze_class(source: &str, class: LanguageClass) -> Vec<Diagnostic> {
    let rules: Vec<Rule> = RULES
        .into_iter()
        .filter(|rule| rule.applies_to(class))
        .collect();

    source
        .split('\n')
        .enumerate()
        .map(|(idx, raw)| SourceLine::new(idx + 1, raw, source))
        .flat_map(|line| {
            rules
                .iter()
                .filter_map(move |rule| rule.check(&line))
                .collect::<Vec<_>>()
        })
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
