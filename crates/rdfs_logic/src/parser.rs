//! A parser for the textual query syntax.
//!
//! ```text
//! query    := expr '.'?
//! expr     := disj (('implies' | 'impliedBy' | 'equivalent') disj)?
//! disj     := conj ('or' conj)*
//! conj     := unary ('and' unary)*
//! unary    := 'not' unary
//!           | ('exists' | 'forall') var (',' var)* unary
//!           | '(' expr ')'
//!           | term '[' term ('->>' | 'hasValue') term (',' ...)* ']'
//!           | name '(' terms? ')'
//! term     := ?var | <iri> | prefix:local | name | "string" | number
//!           | true | false | _# | name '(' terms? ')'
//! ```
//!
//! Bare names are resolved against the default namespace, prefixed names
//! against the parser's [`NamespaceMap`].

use crate::error::{Error, Result};
use crate::expr::LogicalExpression;
use crate::term::{Term, Variable};
use rdfs_graph::NamespaceMap;

const KEYWORDS: [&str; 10] = [
    "and",
    "or",
    "not",
    "implies",
    "impliedBy",
    "equivalent",
    "exists",
    "forall",
    "hasValue",
    "_#",
];

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Arrow,
    Dot,
    Var(String),
    Iri(String),
    Str(String),
    Int(i64),
    Double(f64),
    Name(String),
    Eof,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::LBracket => "'['".into(),
            Token::RBracket => "']'".into(),
            Token::LParen => "'('".into(),
            Token::RParen => "')'".into(),
            Token::Comma => "','".into(),
            Token::Arrow => "'->>'".into(),
            Token::Dot => "'.'".into(),
            Token::Var(v) => format!("variable ?{}", v),
            Token::Iri(i) => format!("<{}>", i),
            Token::Str(s) => format!("string {:?}", s),
            Token::Int(i) => format!("integer {}", i),
            Token::Double(d) => format!("decimal {}", d),
            Token::Name(n) => format!("'{}'", n),
            Token::Eof => "end of input".into(),
        }
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Name(n) if n == keyword)
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | ':' | '#' | '.')
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    let error = |position: usize, message: String| Error::Parse { position, message };
    let peek = |j: usize| chars.get(j).map(|(_, c)| *c);

    while i < chars.len() {
        let (pos, c) = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '[' => {
                tokens.push((Token::LBracket, pos));
                i += 1;
            }
            ']' => {
                tokens.push((Token::RBracket, pos));
                i += 1;
            }
            '(' => {
                tokens.push((Token::LParen, pos));
                i += 1;
            }
            ')' => {
                tokens.push((Token::RParen, pos));
                i += 1;
            }
            ',' => {
                tokens.push((Token::Comma, pos));
                i += 1;
            }
            '.' => {
                tokens.push((Token::Dot, pos));
                i += 1;
            }
            '-' if peek(i + 1) == Some('>') && peek(i + 2) == Some('>') => {
                tokens.push((Token::Arrow, pos));
                i += 3;
            }
            '?' => {
                let start = i + 1;
                let mut j = start;
                while j < chars.len() && (chars[j].1.is_alphanumeric() || chars[j].1 == '_') {
                    j += 1;
                }
                if j == start {
                    return Err(error(pos, "expected a variable name after '?'".into()));
                }
                tokens.push((Token::Var(chars[start..j].iter().map(|(_, c)| c).collect()), pos));
                i = j;
            }
            '<' => {
                let mut j = i + 1;
                while j < chars.len() && chars[j].1 != '>' {
                    j += 1;
                }
                if j == chars.len() {
                    return Err(error(pos, "unterminated IRI".into()));
                }
                tokens.push((Token::Iri(chars[i + 1..j].iter().map(|(_, c)| c).collect()), pos));
                i = j + 1;
            }
            '"' => {
                let mut value = String::new();
                let mut j = i + 1;
                loop {
                    match peek(j) {
                        None => return Err(error(pos, "unterminated string".into())),
                        Some('"') => break,
                        Some('\\') => {
                            match peek(j + 1) {
                                Some('n') => value.push('\n'),
                                Some('t') => value.push('\t'),
                                Some(other) => value.push(other),
                                None => return Err(error(pos, "unterminated string".into())),
                            }
                            j += 2;
                        }
                        Some(other) => {
                            value.push(other);
                            j += 1;
                        }
                    }
                }
                tokens.push((Token::Str(value), pos));
                i = j + 1;
            }
            c if c.is_ascii_digit()
                || (c == '-' && peek(i + 1).is_some_and(|n| n.is_ascii_digit())) =>
            {
                let mut j = i + 1;
                let mut seen_dot = false;
                while let Some(n) = peek(j) {
                    if n.is_ascii_digit() {
                        j += 1;
                    } else if n == '.'
                        && !seen_dot
                        && peek(j + 1).is_some_and(|d| d.is_ascii_digit())
                    {
                        seen_dot = true;
                        j += 1;
                    } else {
                        break;
                    }
                }
                let text: String = chars[i..j].iter().map(|(_, c)| c).collect();
                let token = if seen_dot {
                    text.parse().map(Token::Double).ok()
                } else {
                    text.parse().map(Token::Int).ok()
                };
                let token = token.ok_or_else(|| error(pos, format!("invalid number {}", text)))?;
                tokens.push((token, pos));
                i = j;
            }
            c if is_name_char(c) => {
                let mut j = i;
                while let Some(n) = peek(j) {
                    let arrow = n == '-' && peek(j + 1) == Some('>');
                    let trailing_dot = n == '.' && !peek(j + 1).is_some_and(is_name_char);
                    if !is_name_char(n) || arrow || trailing_dot {
                        break;
                    }
                    j += 1;
                }
                tokens.push((Token::Name(chars[i..j].iter().map(|(_, c)| c).collect()), pos));
                i = j;
            }
            other => return Err(error(pos, format!("unexpected character '{}'", other))),
        }
    }
    tokens.push((Token::Eof, input.len()));
    Ok(tokens)
}

/// Parses queries in the textual syntax.
#[derive(Debug, Clone)]
pub struct QueryParser {
    namespaces: NamespaceMap,
    default_namespace: String,
}

impl QueryParser {
    /// Creates a parser with the standard prefixes (`rdf`, `rdfs`, `xsd`, `wsml`).
    pub fn new(default_namespace: impl Into<String>) -> Self {
        Self::with_namespaces(NamespaceMap::with_defaults(), default_namespace)
    }

    /// Creates a parser with a custom prefix map.
    pub fn with_namespaces(namespaces: NamespaceMap, default_namespace: impl Into<String>) -> Self {
        Self {
            namespaces,
            default_namespace: default_namespace.into(),
        }
    }

    /// Parses one query.
    pub fn parse(&self, input: &str) -> Result<LogicalExpression> {
        let tokens = tokenize(input)?;
        let mut cursor = Cursor {
            tokens,
            index: 0,
            parser: self,
        };
        let expr = cursor.expr()?;
        if cursor.peek() == &Token::Dot {
            cursor.advance();
        }
        match cursor.peek() {
            Token::Eof => Ok(expr),
            other => Err(cursor.error(format!("unexpected {}", other.describe()))),
        }
    }

    fn resolve(&self, name: &str, position: usize) -> Result<String> {
        if name.contains(':') {
            self.namespaces.expand(name).map_err(|e| Error::Parse {
                position,
                message: e.to_string(),
            })
        } else {
            Ok(format!("{}{}", self.default_namespace, name))
        }
    }
}

/// Parses `input` with the standard prefixes, resolving bare names against `default_namespace`.
pub fn parse_query(input: &str, default_namespace: &str) -> Result<LogicalExpression> {
    QueryParser::new(default_namespace).parse(input)
}

static EOF: Token = Token::Eof;

struct Cursor<'p> {
    tokens: Vec<(Token, usize)>,
    index: usize,
    parser: &'p QueryParser,
}

impl Cursor<'_> {
    fn peek(&self) -> &Token {
        self.tokens.get(self.index).map_or(&EOF, |(t, _)| t)
    }

    fn position(&self) -> usize {
        self.tokens.get(self.index).map_or(0, |(_, p)| *p)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.index < self.tokens.len() {
            self.index += 1;
        }
        token
    }

    fn error(&self, message: String) -> Error {
        Error::Parse {
            position: self.position(),
            message,
        }
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        if self.peek() == &expected {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!(
                "expected {}, found {}",
                expected.describe(),
                self.peek().describe()
            )))
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek().is_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> Result<LogicalExpression> {
        let left = self.disjunction()?;
        if self.eat_keyword("implies") {
            let right = self.disjunction()?;
            return Ok(LogicalExpression::Implies(Box::new(left), Box::new(right)));
        }
        if self.eat_keyword("impliedBy") {
            let right = self.disjunction()?;
            return Ok(LogicalExpression::ImpliedBy(Box::new(left), Box::new(right)));
        }
        if self.eat_keyword("equivalent") {
            let right = self.disjunction()?;
            return Ok(LogicalExpression::Equivalent(Box::new(left), Box::new(right)));
        }
        Ok(left)
    }

    fn disjunction(&mut self) -> Result<LogicalExpression> {
        let mut expr = self.conjunction()?;
        while self.eat_keyword("or") {
            expr = expr.or(self.conjunction()?);
        }
        Ok(expr)
    }

    fn conjunction(&mut self) -> Result<LogicalExpression> {
        let mut expr = self.unary()?;
        while self.eat_keyword("and") {
            expr = expr.and(self.unary()?);
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<LogicalExpression> {
        if self.eat_keyword("not") {
            return Ok(LogicalExpression::Not(Box::new(self.unary()?)));
        }
        let quantifier = if self.eat_keyword("exists") {
            Some(true)
        } else if self.eat_keyword("forall") {
            Some(false)
        } else {
            None
        };
        if let Some(existential) = quantifier {
            let vars = self.variables()?;
            let body = Box::new(self.unary()?);
            return Ok(if existential {
                LogicalExpression::Exists(vars, body)
            } else {
                LogicalExpression::Forall(vars, body)
            });
        }
        if self.peek() == &Token::LParen {
            self.advance();
            let expr = self.expr()?;
            self.expect(Token::RParen)?;
            return Ok(expr);
        }
        self.molecule_or_atom()
    }

    fn variables(&mut self) -> Result<Vec<Variable>> {
        let mut vars = Vec::new();
        loop {
            match self.advance() {
                Token::Var(v) => vars.push(Variable::new(v)),
                other => {
                    self.index -= 1;
                    return Err(self.error(format!("expected a variable, found {}", other.describe())));
                }
            }
            if self.peek() != &Token::Comma {
                return Ok(vars);
            }
            self.advance();
        }
    }

    fn molecule_or_atom(&mut self) -> Result<LogicalExpression> {
        let start = self.position();
        let subject = self.term()?;
        if self.peek() == &Token::LBracket {
            self.advance();
            let mut expr: Option<LogicalExpression> = None;
            loop {
                let predicate = self.term()?;
                if !self.eat_keyword("hasValue") {
                    self.expect(Token::Arrow)?;
                }
                let object = self.term()?;
                let molecule = LogicalExpression::molecule(subject.clone(), predicate, object);
                expr = Some(match expr {
                    Some(e) => e.and(molecule),
                    None => molecule,
                });
                if self.peek() == &Token::Comma {
                    self.advance();
                    continue;
                }
                self.expect(Token::RBracket)?;
                break;
            }
            return expr.ok_or_else(|| self.error("empty molecule".into()));
        }
        match subject {
            Term::Function { symbol, args } => Ok(LogicalExpression::atom(symbol, args)),
            other => Err(Error::Parse {
                position: start,
                message: format!("expected a molecule or an atom, found the {} {}", other.kind_name(), other),
            }),
        }
    }

    fn term(&mut self) -> Result<Term> {
        let position = self.position();
        let term = match self.advance() {
            Token::Var(v) => Term::variable(v),
            Token::Iri(iri) => Term::identifier(iri),
            Token::Str(s) => Term::string(s),
            Token::Int(i) => Term::Int(i),
            Token::Double(d) => Term::Double(d),
            Token::Name(n) if n == "_#" => Term::Anonymous,
            Token::Name(n) if n == "true" => Term::Bool(true),
            Token::Name(n) if n == "false" => Term::Bool(false),
            Token::Name(n) if !KEYWORDS.contains(&n.as_str()) => {
                Term::identifier(self.parser.resolve(&n, position)?)
            }
            other => {
                self.index -= 1;
                return Err(self.error(format!("expected a term, found {}", other.describe())));
            }
        };
        if self.peek() != &Token::LParen {
            return Ok(term);
        }
        let Some(symbol) = term.as_iri().map(str::to_string) else {
            return Err(self.error(format!("{} cannot be applied to arguments", term)));
        };
        self.advance();
        let mut args = Vec::new();
        if self.peek() != &Token::RParen {
            loop {
                args.push(self.term()?);
                if self.peek() != &Token::Comma {
                    break;
                }
                self.advance();
            }
        }
        self.expect(Token::RParen)?;
        Ok(Term::function(symbol, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdfs_graph::iris;

    const NS: &str = "http://www.example.com/";

    fn parse(text: &str) -> LogicalExpression {
        parse_query(text, NS).unwrap()
    }

    fn ex(local: &str) -> Term {
        Term::identifier(format!("{}{}", NS, local))
    }

    #[test]
    fn test_molecule() {
        let expr = parse("?x[hasMother ->> ?y]");
        assert_eq!(
            expr,
            LogicalExpression::molecule(Term::variable("x"), ex("hasMother"), Term::variable("y"))
        );
    }

    #[test]
    fn test_has_value_keyword_and_trailing_dot() {
        assert_eq!(parse("?x[hasMother hasValue ?y]."), parse("?x[hasMother ->> ?y]"));
    }

    #[test]
    fn test_prefixed_names() {
        let expr = parse("?x[rdf:type ->> rdfs:Class]");
        assert_eq!(
            expr,
            LogicalExpression::molecule(
                Term::variable("x"),
                Term::identifier(iris::RDF_TYPE),
                Term::identifier(iris::RDFS_CLASS)
            )
        );
    }

    #[test]
    fn test_unknown_prefix() {
        let err = parse_query("?x[foo:bar ->> ?y]", NS).unwrap_err();
        assert!(matches!(err, Error::Parse { position: 3, .. }));
    }

    #[test]
    fn test_multiple_attributes_form_conjunction() {
        let expr = parse("john[hasName ->> \"John\", hasAge ->> 30]");
        let expected = LogicalExpression::molecule(ex("john"), ex("hasName"), Term::string("John"))
            .and(LogicalExpression::molecule(ex("john"), ex("hasAge"), Term::Int(30)));
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_precedence() {
        let expr = parse("?x[p ->> ?y] and ?y[q ->> ?z] or ?x[r ->> ?z]");
        assert!(matches!(expr, LogicalExpression::Or(..)));

        let expr = parse("?x[p ->> ?y] and (?y[q ->> ?z] or ?x[r ->> ?z])");
        assert!(matches!(expr, LogicalExpression::And(..)));
    }

    #[test]
    fn test_quantifiers_and_negation() {
        let expr = parse("exists ?y, ?z (?x[p ->> ?y] and ?y[q ->> ?z])");
        match &expr {
            LogicalExpression::Exists(vars, _) => assert_eq!(vars.len(), 2),
            other => panic!("unexpected {}", other),
        }
        assert_eq!(expr.free_variables(), vec![Variable::new("x")]);

        assert!(matches!(parse("not ?x[p ->> ?y]"), LogicalExpression::Not(_)));
        assert!(matches!(
            parse("forall ?x (?x[p ->> ?y])"),
            LogicalExpression::Forall(..)
        ));
        assert!(matches!(
            parse("?x[p ->> ?y] implies ?x[q ->> ?y]"),
            LogicalExpression::Implies(..)
        ));
    }

    #[test]
    fn test_atoms_and_function_terms() {
        let expr = parse("wsml:lessThan(?a, 3.5)");
        assert_eq!(
            expr,
            LogicalExpression::atom(
                "http://www.wsmo.org/wsml/wsml-syntax#lessThan",
                vec![Term::variable("a"), Term::Double(3.5)]
            )
        );

        let expr = parse("knows(?x, pair(anna, -2))");
        match expr {
            LogicalExpression::Atom { predicate, args } => {
                assert_eq!(predicate, format!("{}knows", NS));
                assert_eq!(
                    args[1],
                    Term::function(format!("{}pair", NS), vec![ex("anna"), Term::Int(-2)])
                );
            }
            other => panic!("unexpected {}", other),
        }
    }

    #[test]
    fn test_literals() {
        let expr = parse("?x[p ->> true] and ?x[q ->> _#] and ?x[r ->> \"say \\\"hi\\\"\"]");
        let mut terms = Vec::new();
        fn collect(e: &LogicalExpression, out: &mut Vec<Term>) {
            match e {
                LogicalExpression::And(a, b) => {
                    collect(a, out);
                    collect(b, out);
                }
                LogicalExpression::AttributeValue(m) => out.push(m.right().clone()),
                _ => {}
            }
        }
        collect(&expr, &mut terms);
        assert_eq!(
            terms,
            vec![Term::Bool(true), Term::Anonymous, Term::string("say \"hi\"")]
        );
    }

    #[test]
    fn test_full_iris() {
        let expr = parse("<http://a.org/s>[<http://a.org/p> ->> ?o]");
        assert_eq!(
            expr,
            LogicalExpression::molecule(
                Term::identifier("http://a.org/s"),
                Term::identifier("http://a.org/p"),
                Term::variable("o")
            )
        );
    }

    #[test]
    fn test_errors_carry_position() {
        match parse_query("?x[p ->> ?y", NS) {
            Err(Error::Parse { position, .. }) => assert_eq!(position, 11),
            other => panic!("unexpected {:?}", other),
        }
        assert!(parse_query("?x", NS).is_err());
        assert!(parse_query("?x[p ->> ?y] and", NS).is_err());
        assert!(parse_query("\"open", NS).is_err());
    }
}
