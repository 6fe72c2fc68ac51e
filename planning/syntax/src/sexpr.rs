//! Spanned s-expressions: the first layer of the PDDL reader.

use crate::errors::*;
use crate::input::Input;
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// An atom of an s-expression, with its text as written in the source.
#[derive(Clone)]
pub struct SAtom {
    text: String,
    span: Span,
}

impl SAtom {
    pub fn str(&self) -> &str {
        &self.text
    }

    /// Returns true if the atom is the given keyword. PDDL keywords are case-insensitive.
    pub fn is(&self, keyword: &str) -> bool {
        self.text.eq_ignore_ascii_case(keyword)
    }

    /// Lower case version of the atom, to be used for matching keywords.
    pub fn keyword(&self) -> String {
        self.text.to_ascii_lowercase()
    }
}

impl Spanned for SAtom {
    fn span(&self) -> Option<&Span> {
        Some(&self.span)
    }
}

impl Display for SAtom {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl std::fmt::Debug for SAtom {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A parenthesized list of s-expressions.
#[derive(Clone)]
pub struct SList {
    list: Vec<SExpr>,
    span: Span,
}

impl SList {
    pub fn iter(&self) -> ListIter<'_> {
        ListIter {
            elems: self.list.as_slice(),
            span: &self.span,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }
}

impl Spanned for SList {
    fn span(&self) -> Option<&Span> {
        Some(&self.span)
    }
}

impl Display for SList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", self.list.iter().format(" "))
    }
}

#[derive(Clone)]
pub enum SExpr {
    Atom(SAtom),
    List(SList),
}

impl SExpr {
    pub fn as_atom(&self) -> Option<&SAtom> {
        match self {
            SExpr::Atom(a) => Some(a),
            SExpr::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&SList> {
        match self {
            SExpr::List(l) => Some(l),
            SExpr::Atom(_) => None,
        }
    }

    pub fn as_list_iter(&self) -> Option<ListIter<'_>> {
        self.as_list().map(|l| l.iter())
    }

    pub fn is_atom(&self, keyword: &str) -> bool {
        self.as_atom().is_some_and(|a| a.is(keyword))
    }

    /// Lower case head of a list, if the list is non-empty and starts with an atom.
    pub fn head(&self) -> Option<String> {
        match self {
            SExpr::List(l) => l.list.first().and_then(|h| h.as_atom()).map(|a| a.keyword()),
            SExpr::Atom(_) => None,
        }
    }

    /// If this expression is a list of the form `(head a b ...)` returns the arguments `[a b ...]`.
    pub fn as_application(&self, head: &str) -> Option<&[SExpr]> {
        match self {
            SExpr::List(l) => match l.list.first() {
                Some(SExpr::Atom(h)) if h.is(head) => Some(&l.list[1..]),
                _ => None,
            },
            SExpr::Atom(_) => None,
        }
    }
}

impl Spanned for SExpr {
    fn span(&self) -> Option<&Span> {
        match self {
            SExpr::Atom(a) => a.span(),
            SExpr::List(l) => l.span(),
        }
    }
}

impl Display for SExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SExpr::Atom(a) => write!(f, "{a}"),
            SExpr::List(l) => write!(f, "{l}"),
        }
    }
}

impl std::fmt::Debug for SExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

/// Iterator over the elements of a list, with methods to consume expected elements.
#[derive(Clone)]
pub struct ListIter<'a> {
    elems: &'a [SExpr],
    span: &'a Span,
}

impl<'a> ListIter<'a> {
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elems.len()
    }

    pub fn peek(&self) -> Option<&'a SExpr> {
        self.elems.first()
    }

    pub fn pop(&mut self) -> Res<&'a SExpr> {
        match self.elems.split_first() {
            Some((head, tail)) => {
                self.elems = tail;
                Ok(head)
            }
            None => Err(self.span.end().invalid("Unexpected end of list")),
        }
    }

    pub fn pop_atom(&mut self) -> Res<&'a SAtom> {
        match self.elems.split_first() {
            Some((SExpr::Atom(head), tail)) => {
                self.elems = tail;
                Ok(head)
            }
            Some((l @ SExpr::List(_), _)) => Err(l.invalid("Expected an atom")),
            None => Err(self.span.end().invalid("Expected an atom but got end of list")),
        }
    }

    pub fn pop_list(&mut self) -> Res<&'a SList> {
        match self.elems.split_first() {
            Some((SExpr::List(head), tail)) => {
                self.elems = tail;
                Ok(head)
            }
            Some((a @ SExpr::Atom(_), _)) => Err(a.invalid("Expected a list")),
            None => Err(self.span.end().invalid("Expected a list but got end of list")),
        }
    }

    pub fn pop_known_atom(&mut self, expected: &str) -> Res<&'a SAtom> {
        match self.elems.split_first() {
            Some((SExpr::Atom(head), tail)) if head.is(expected) => {
                self.elems = tail;
                Ok(head)
            }
            Some((e, _)) => Err(e.invalid(format!("Expected the atom `{expected}`"))),
            None => Err(self
                .span
                .end()
                .invalid(format!("Expected the atom `{expected}` but got end of list"))),
        }
    }
}

impl<'a> Iterator for ListIter<'a> {
    type Item = &'a SExpr;

    fn next(&mut self) -> Option<Self::Item> {
        self.pop().ok()
    }
}

impl Spanned for ListIter<'_> {
    fn span(&self) -> Option<&Span> {
        Some(self.span)
    }
}

impl Display for ListIter<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", self.elems.iter().format(" "))
    }
}

#[derive(Debug, PartialEq)]
enum Token {
    /// Symbol spanning the bytes `start..end` (exclusive end)
    Sym { start: usize, end: usize },
    LParen(usize),
    RParen(usize),
}

/// Splits the input into parenthesis and symbols. `;` starts a comment that runs until the end of the line.
fn tokenize(s: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = s.char_indices().peekable();
    // start of the symbol being read, if any
    let mut cur: Option<usize> = None;
    while let Some((i, n)) = chars.next() {
        let is_separator = n.is_whitespace() || n == '(' || n == ')' || n == ';';
        if is_separator {
            if let Some(start) = cur.take() {
                tokens.push(Token::Sym { start, end: i });
            }
        }
        match n {
            '(' => tokens.push(Token::LParen(i)),
            ')' => tokens.push(Token::RParen(i)),
            ';' => {
                while chars.next_if(|(_, c)| *c != '\n').is_some() {}
            }
            _ if n.is_whitespace() => {}
            _ => {
                if cur.is_none() {
                    cur = Some(i);
                }
            }
        }
    }
    if let Some(start) = cur {
        tokens.push(Token::Sym { start, end: s.len() });
    }
    tokens
}

/// Parses a single s-expression from the input. Anything after it is an error.
pub fn parse(input: Arc<Input>) -> Res<SExpr> {
    let mut exprs = parse_many(input.clone())?;
    match exprs.len() {
        1 => Ok(exprs.remove(0)),
        0 => Err(Message::error("Empty input: expected an s-expression")),
        _ => Err(exprs[1].invalid("Unexpected content after the first expression")),
    }
}

/// Parses a sequence of s-expressions.
pub fn parse_many(input: Arc<Input>) -> Res<Vec<SExpr>> {
    let tokens = tokenize(input.text.as_str());
    let mut tokens = tokens.iter().peekable();
    let mut exprs = Vec::new();
    while tokens.peek().is_some() {
        exprs.push(read(&mut tokens, &input)?);
    }
    Ok(exprs)
}

fn read(tokens: &mut std::iter::Peekable<std::slice::Iter<Token>>, input: &Arc<Input>) -> Res<SExpr> {
    match tokens.next() {
        Some(&Token::Sym { start, end }) => Ok(SExpr::Atom(SAtom {
            text: input.text[start..end].to_string(),
            span: Span::new(input.clone(), start, end - 1),
        })),
        Some(&Token::LParen(start)) => {
            let mut es = Vec::new();
            loop {
                match tokens.peek() {
                    Some(Token::RParen(end)) => {
                        let end = *end;
                        tokens.next();
                        return Ok(SExpr::List(SList {
                            list: es,
                            span: Span::new(input.clone(), start, end),
                        }));
                    }
                    Some(_) => es.push(read(tokens, input)?),
                    None => {
                        return Err(Span::new(input.clone(), start, start).invalid("Unclosed parenthesis"));
                    }
                }
            }
        }
        Some(&Token::RParen(i)) => Err(Span::new(input.clone(), i, i).invalid("Unexpected closing parenthesis")),
        None => Err(Message::error("Unexpected end of input")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_str(s: &str) -> Res<SExpr> {
        parse(Arc::new(Input::from_string(s)))
    }

    #[test]
    fn nested_lists() {
        let e = read_str("(define (domain Test) ; comment (ignored\n (:requirements :strips))").unwrap();
        assert_eq!(e.to_string(), "(define (domain Test) (:requirements :strips))");
        let mut items = e.as_list_iter().unwrap();
        items.pop_known_atom("DEFINE").unwrap();
        let decl = items.pop_list().unwrap();
        assert_eq!(decl.loc().str(), "(domain Test)");
        assert_eq!(decl.iter().nth(1).unwrap().as_atom().unwrap().str(), "Test");
    }

    #[test]
    fn spans_of_atoms() {
        let e = read_str("  (at ?r  room-1)").unwrap();
        let atoms: Vec<String> = e
            .as_list_iter()
            .unwrap()
            .map(|a| a.loc().str().to_string())
            .collect();
        assert_eq!(atoms, vec!["at", "?r", "room-1"]);
        assert_eq!(e.loc().start().str(), "(");
        assert_eq!(e.loc().end().str(), ")");
    }

    #[test]
    fn unbalanced() {
        assert!(read_str("(a (b)").is_err());
        assert!(read_str("(a))").is_err());
        assert!(read_str("").is_err());
    }

    #[test]
    fn application() {
        let e = read_str("(AND (p) (q))").unwrap();
        assert_eq!(e.head().as_deref(), Some("and"));
        assert_eq!(e.as_application("and").map(|args| args.len()), Some(2));
        assert!(e.as_application("or").is_none());
    }
}
