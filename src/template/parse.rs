use std::str::FromStr;

use crate::error::{ParseError, ParseErrorKind};

/// A parsed template: literal text and placeholders in source order.
///
/// Adjacent literal text is merged, so two `Literal` segments never follow
/// each other. Parsing the same text twice yields equal templates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Text emitted verbatim, with `{{` / `}}` escapes already resolved.
    Literal(String),
    Placeholder(Placeholder),
}

/// A `{key.modifier(args)...}` reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    pub key: String,
    pub modifiers: Vec<ModifierCall>,
    /// Byte offset of the opening brace.
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModifierCall {
    pub name: String,
    pub args: Vec<f64>,
}

impl Template {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder(p) => Some(p),
            Segment::Literal(_) => None,
        })
    }

    /// Distinct keys referenced by the template, in first-use order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for p in self.placeholders() {
            if !keys.contains(&p.key.as_str()) {
                keys.push(&p.key);
            }
        }
        keys
    }

    pub fn is_static(&self) -> bool {
        self.placeholders().next().is_none()
    }
}

impl FromStr for Template {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Parse template text into a [`Template`].
///
/// `{{` and `}}` are literal braces. Any other `{` opens a placeholder:
/// a name matching `[A-Za-z0-9_]+` followed by zero or more
/// `.modifier` or `.modifier(n, ...)` calls and a closing `}`.
pub fn parse(source: &str) -> Result<Template, ParseError> {
    Parser { source, pos: 0 }.template()
}

struct Parser<'a> {
    source: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn rest_starts_with(&self, pat: &str) -> bool {
        self.source[self.pos..].starts_with(pat)
    }

    fn error_at(&self, offset: usize, kind: ParseErrorKind) -> ParseError {
        ParseError::at(self.source, offset, kind)
    }

    fn template(mut self) -> Result<Template, ParseError> {
        let mut segments = Vec::new();
        let mut literal = String::new();

        while let Some(c) = self.peek() {
            match c {
                '{' if self.rest_starts_with("{{") => {
                    literal.push('{');
                    self.pos += 2;
                }
                '}' if self.rest_starts_with("}}") => {
                    literal.push('}');
                    self.pos += 2;
                }
                '{' => {
                    let placeholder = self.placeholder()?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(placeholder));
                }
                '}' => return Err(self.error_at(self.pos, ParseErrorKind::UnmatchedClose)),
                _ => {
                    literal.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Template { segments })
    }

    /// Parse from an opening `{` through its closing `}`.
    fn placeholder(&mut self) -> Result<Placeholder, ParseError> {
        let open = self.pos;
        self.bump();

        let key = self.name(open)?;
        let mut modifiers = Vec::new();
        loop {
            let at = self.pos;
            match self.bump() {
                Some('}') => break,
                Some('.') => modifiers.push(self.modifier_call(open)?),
                Some(found) => {
                    return Err(self.error_at(at, ParseErrorKind::UnexpectedChar { found }))
                }
                None => return Err(self.error_at(open, ParseErrorKind::Unterminated)),
            }
        }

        Ok(Placeholder {
            key,
            modifiers,
            offset: open,
        })
    }

    fn name(&mut self, open: usize) -> Result<String, ParseError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(match self.peek() {
                None => self.error_at(open, ParseErrorKind::Unterminated),
                found => self.error_at(start, ParseErrorKind::ExpectedName { found }),
            });
        }
        Ok(self.source[start..self.pos].to_owned())
    }

    fn modifier_call(&mut self, open: usize) -> Result<ModifierCall, ParseError> {
        let name = self.name(open)?;
        if self.peek() != Some('(') {
            return Ok(ModifierCall {
                name,
                args: Vec::new(),
            });
        }
        self.bump();

        let args_start = self.pos;
        loop {
            match self.peek() {
                Some(')') => break,
                Some(found @ ('}' | '{' | '\n')) => {
                    return Err(self.error_at(self.pos, ParseErrorKind::UnexpectedChar { found }))
                }
                Some(_) => {
                    self.bump();
                }
                None => return Err(self.error_at(open, ParseErrorKind::Unterminated)),
            }
        }
        let source = self.source;
        let inner = &source[args_start..self.pos];
        self.bump();

        let args = parse_args(inner)
            .map_err(|arg| self.error_at(args_start, ParseErrorKind::InvalidArgument { arg }))?;
        Ok(ModifierCall { name, args })
    }
}

/// Split a comma separated list of numbers. Returns the offending piece on
/// failure.
fn parse_args(inner: &str) -> Result<Vec<f64>, String> {
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    inner
        .split(',')
        .map(|piece| {
            let piece = piece.trim();
            match piece.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(n),
                _ => Err(piece.to_string()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lit(s: &str) -> Segment {
        Segment::Literal(s.to_string())
    }

    fn call(name: &str, args: &[f64]) -> ModifierCall {
        ModifierCall {
            name: name.to_string(),
            args: args.to_vec(),
        }
    }

    fn kind(source: &str) -> ParseErrorKind {
        parse(source).unwrap_err().kind
    }

    #[test]
    fn plain_text_is_one_literal() {
        let template = parse("static int x = 1;\n").unwrap();
        assert_eq!(template.segments(), &[lit("static int x = 1;\n")]);
        assert!(template.is_static());
    }

    #[test]
    fn empty_input_has_no_segments() {
        assert!(parse("").unwrap().segments().is_empty());
    }

    #[test]
    fn placeholder_between_literals() {
        let template = parse("a = \"{color15}\";").unwrap();
        assert_eq!(
            template.segments(),
            &[
                lit("a = \""),
                Segment::Placeholder(Placeholder {
                    key: "color15".into(),
                    modifiers: vec![],
                    offset: 5,
                }),
                lit("\";"),
            ]
        );
    }

    #[test]
    fn single_modifier() {
        let template = parse("0x{color0.strip}ff").unwrap();
        let p = template.placeholders().next().unwrap();
        assert_eq!(p.key, "color0");
        assert_eq!(p.modifiers, vec![call("strip", &[])]);
    }

    #[test]
    fn chained_modifiers_with_arguments() {
        let template = parse("{background.lighten(10).darken(2.5).octal}").unwrap();
        let p = template.placeholders().next().unwrap();
        assert_eq!(
            p.modifiers,
            vec![
                call("lighten", &[10.0]),
                call("darken", &[2.5]),
                call("octal", &[])
            ]
        );
    }

    #[test]
    fn argument_lists() {
        assert_eq!(parse_args("").unwrap(), Vec::<f64>::new());
        assert_eq!(parse_args("100,20.0").unwrap(), vec![100.0, 20.0]);
        assert_eq!(parse_args("-100.0, -20").unwrap(), vec![-100.0, -20.0]);
        assert_eq!(parse_args(" non_numeric, args ").unwrap_err(), "non_numeric");
    }

    #[test]
    fn doubled_braces_are_literal() {
        let template = parse("{{ 0x{color1.strip}ff }},").unwrap();
        assert_eq!(template.segments().first(), Some(&lit("{ 0x")));
        assert_eq!(template.segments().last(), Some(&lit("ff },")));
    }

    #[test]
    fn escaped_placeholder_is_not_a_placeholder() {
        let template = parse("{{foo}}").unwrap();
        assert_eq!(template.segments(), &[lit("{foo}")]);
    }

    #[test]
    fn literal_merges_across_escapes() {
        let template = parse("a{{b}}c").unwrap();
        assert_eq!(template.segments(), &[lit("a{b}c")]);
    }

    #[test]
    fn keys_are_distinct_in_first_use_order() {
        let template = parse("{color15} {color0.strip} {color15} {color8}").unwrap();
        assert_eq!(template.keys(), vec!["color15", "color0", "color8"]);
    }

    #[test]
    fn parse_is_repeatable() {
        let text = "/* {{x}} */ {color0} {color1.lighten(5)}";
        assert_eq!(parse(text).unwrap(), parse(text).unwrap());
        assert_eq!(text.parse::<Template>().unwrap(), parse(text).unwrap());
    }

    #[test]
    fn unterminated_at_end_of_input() {
        let err = parse("abc {color0").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Unterminated);
        assert_eq!(err.offset, 4);
    }

    #[test]
    fn lone_open_brace_at_end() {
        assert_eq!(kind("x {"), ParseErrorKind::Unterminated);
    }

    #[test]
    fn unterminated_argument_list() {
        assert_eq!(kind("{color0.lighten(10"), ParseErrorKind::Unterminated);
    }

    #[test]
    fn empty_placeholder() {
        assert_eq!(
            kind("{}"),
            ParseErrorKind::ExpectedName { found: Some('}') }
        );
    }

    #[test]
    fn spaces_are_not_allowed_in_placeholders() {
        assert_eq!(
            kind("{ color0 }"),
            ParseErrorKind::ExpectedName { found: Some(' ') }
        );
        assert_eq!(
            kind("{color0 }"),
            ParseErrorKind::UnexpectedChar { found: ' ' }
        );
    }

    #[test]
    fn invalid_modifier_name() {
        assert_eq!(
            kind("{color0.invalid-func()}"),
            ParseErrorKind::UnexpectedChar { found: '-' }
        );
        assert_eq!(kind("{color0.}"), ParseErrorKind::ExpectedName { found: Some('}') });
    }

    #[test]
    fn non_numeric_argument() {
        assert_eq!(
            kind("{color0.func(1, invalid_arg)}"),
            ParseErrorKind::InvalidArgument {
                arg: "invalid_arg".into()
            }
        );
    }

    #[test]
    fn brace_inside_argument_list() {
        assert_eq!(
            kind("{color0.lighten(1}"),
            ParseErrorKind::UnexpectedChar { found: '}' }
        );
    }

    #[test]
    fn single_close_brace() {
        let err = parse("int a[] = { 1 };").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ExpectedName { found: Some(' ') });

        let err = parse("done }").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnmatchedClose);
        assert_eq!(err.offset, 5);
    }

    #[test]
    fn multibyte_text_is_preserved() {
        let template = parse("ü {color0} é").unwrap();
        assert_eq!(template.segments()[0], lit("ü "));
        assert_eq!(template.placeholders().next().unwrap().offset, 3);
    }
}
