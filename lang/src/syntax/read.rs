use std::result::Result;

use pest::{
    error::{Error as PestError, ErrorVariant},
    iterators::Pair,
    Parser,
};
use thiserror::Error;

use crate::syntax::tree::Datum;

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
pub struct SexpReader;

pub type ParseErrorVariant = ErrorVariant<Rule>;
pub type ParseError = PestError<Rule>;

#[derive(Debug, Error)]
#[error("ReadError: {0}")]
pub struct ReadError(pub Box<ParseError>);

impl ReadError {
    pub fn with_path(self, path: &str) -> ReadError {
        ReadError(Box::new(self.0.with_path(path)))
    }
}

impl From<ParseError> for ReadError {
    fn from(e: ParseError) -> Self {
        ReadError(Box::new(e))
    }
}

impl SexpReader {
    /// Reads every top-level datum in `input`.
    pub fn read(input: &str) -> Result<Vec<Datum>, ReadError> {
        let program = match SexpReader::parse(Rule::program, input)?.next() {
            Some(program) => program,
            None => return Ok(Vec::new()),
        };

        program
            .into_inner()
            .filter(|node| node.as_rule() != Rule::EOI)
            .map(read_datum)
            .collect()
    }
}

fn read_datum(node: Pair<Rule>) -> Result<Datum, ReadError> {
    match node.as_rule() {
        Rule::list => node
            .into_inner()
            .map(read_datum)
            .collect::<Result<Vec<_>, _>>()
            .map(Datum::List),
        Rule::integer => node.as_str().parse::<i64>().map(Datum::Int).map_err(|_| {
            let variant = ParseErrorVariant::CustomError {
                message: format!("integer literal out of range: {}", node.as_str()),
            };
            ReadError::from(ParseError::new_from_span(variant, node.as_span()))
        }),
        Rule::string => {
            let raw = node.into_inner().next().map(|raw| raw.as_str()).unwrap_or("");
            Ok(Datum::Text(unescape(raw)))
        }
        Rule::symbol => Ok(Datum::Sym(node.as_str().to_owned())),
        _ => unreachable!("datum should be list, integer, string or symbol"),
    }
}

fn unescape(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('"') => result.push('"'),
            Some('\\') => result.push('\\'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::SexpReader;
    use crate::syntax::tree::Datum;
    use pretty_assertions::assert_eq;

    fn read(input: &str) -> Vec<Datum> {
        SexpReader::read(input).unwrap()
    }

    #[test]
    fn reads_atoms() {
        assert_eq!(
            read("42 -7 \"hi\" x equal? - ++"),
            vec![
                Datum::Int(42),
                Datum::Int(-7),
                Datum::text("hi"),
                Datum::sym("x"),
                Datum::sym("equal?"),
                Datum::sym("-"),
                Datum::sym("++"),
            ]
        );
    }

    #[test]
    fn reads_nested_lists_with_any_brackets() {
        assert_eq!(
            read("{[x y] => (+ x y)}"),
            vec![Datum::List(vec![
                Datum::List(vec![Datum::sym("x"), Datum::sym("y")]),
                Datum::sym("=>"),
                Datum::List(vec![Datum::sym("+"), Datum::sym("x"), Datum::sym("y")]),
            ])]
        );
    }

    #[test]
    fn digits_followed_by_letters_are_a_symbol() {
        assert_eq!(read("1st"), vec![Datum::sym("1st")]);
    }

    #[test]
    fn skips_comments_and_decodes_escapes() {
        assert_eq!(
            read("; leading comment\n\"a\\\"b\\n\" ; trailing\n"),
            vec![Datum::text("a\"b\n")]
        );
    }

    #[test]
    fn empty_input_reads_nothing() {
        assert_eq!(read("   ; nothing here\n"), vec![]);
    }

    #[test]
    fn rejects_unbalanced_and_mismatched_brackets() {
        assert!(SexpReader::read("(+ 1 2").is_err());
        assert!(SexpReader::read("(+ 1 2]").is_err());
        assert!(SexpReader::read(")").is_err());
    }

    #[test]
    fn rejects_out_of_range_integers() {
        let err = SexpReader::read("99999999999999999999").unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }
}
