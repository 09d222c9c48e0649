//! Inline `style` attribute declarations.
//!
//! Declarations are tokenized with `cssparser`, so escapes, strings and
//! comments read the way a browser reads them. Each declaration keeps its
//! decoded text for matching and a re-serialized form for output; the raw
//! attribute text is never written back. Malformed declarations are dropped.

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, ParseError, Parser, ParserInput, ParserState,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser, ToCss, Token,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Unescaped, lowercased property name
    pub name: String,
    /// Serialized value, safe to write back into an attribute
    pub value: String,
    /// Unescaped, lowercased value text with comments and quotes removed
    pub plain: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleDeclarations {
    declarations: Vec<Declaration>,
}

impl StyleDeclarations {
    /// Parses declarations; a repeated property keeps its last value.
    pub fn parse(text: &str) -> Self {
        let mut style = Self::default();
        let mut input = ParserInput::new(text);
        let mut parser = Parser::new(&mut input);
        let mut declarations = InlineDeclarations;

        for item in RuleBodyParser::new(&mut parser, &mut declarations) {
            match item {
                Ok(decl) => style.insert(decl),
                Err((_, source)) => tracing::trace!("Dropping style declaration {:?}", source),
            }
        }
        style
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }

    /// Sets `name` to a plain keyword value.
    pub fn set(&mut self, name: &str, value: &str) {
        self.insert(Declaration {
            name: name.to_string(),
            value: Token::Ident(value.into()).to_css_string(),
            plain: value.to_ascii_lowercase(),
        });
    }

    pub fn remove(&mut self, name: &str) {
        self.declarations.retain(|d| d.name != name);
    }

    /// Serializes as `name: value;` pairs separated by a space.
    pub fn to_css_text(&self) -> String {
        self.declarations
            .iter()
            .map(|d| {
                let name = Token::Ident(d.name.as_str().into()).to_css_string();
                format!("{}: {};", name, d.value)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn insert(&mut self, decl: Declaration) {
        match self.declarations.iter_mut().find(|d| d.name == decl.name) {
            Some(existing) => *existing = decl,
            None => self.declarations.push(decl),
        }
    }
}

/// Accepts declarations only; nested rules are errors in a `style` attribute.
struct InlineDeclarations;

impl<'i> DeclarationParser<'i> for InlineDeclarations {
    type Declaration = Declaration;
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _declaration_start: &ParserState,
    ) -> Result<Declaration, ParseError<'i, ()>> {
        let mut plain = String::new();
        let mut value = String::new();
        read_value(input, &mut plain, &mut value)?;

        let (plain, value) = (plain.trim(), value.trim());
        if value.is_empty() {
            return Err(input.new_custom_error(()));
        }
        Ok(Declaration {
            name: name.to_ascii_lowercase(),
            value: value.to_string(),
            plain: plain.to_ascii_lowercase(),
        })
    }
}

impl<'i> AtRuleParser<'i> for InlineDeclarations {
    type Prelude = ();
    type AtRule = Declaration;
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for InlineDeclarations {
    type Prelude = ();
    type QualifiedRule = Declaration;
    type Error = ();
}

impl<'i> RuleBodyItemParser<'i, Declaration, ()> for InlineDeclarations {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Walks the value's tokens, descending into blocks and functions.
/// `plain` gets decoded text, `css` the re-serialized tokens.
fn read_value<'i>(
    input: &mut Parser<'i, '_>,
    plain: &mut String,
    css: &mut String,
) -> Result<(), ParseError<'i, ()>> {
    while let Ok(token) = input.next_including_whitespace() {
        let token = token.clone();
        let close = match &token {
            Token::Function(name) => {
                plain.push_str(name);
                plain.push('(');
                Some(")")
            }
            Token::ParenthesisBlock => {
                plain.push('(');
                Some(")")
            }
            Token::SquareBracketBlock => {
                plain.push('[');
                Some("]")
            }
            Token::CurlyBracketBlock => {
                plain.push('{');
                Some("}")
            }
            Token::Ident(text)
            | Token::QuotedString(text)
            | Token::UnquotedUrl(text)
            | Token::AtKeyword(text)
            | Token::Hash(text)
            | Token::IDHash(text) => {
                plain.push_str(text);
                None
            }
            other => {
                plain.push_str(&other.to_css_string());
                None
            }
        };
        css.push_str(&token.to_css_string());

        if let Some(close) = close {
            input.parse_nested_block(|nested| read_value(nested, plain, css))?;
            plain.push_str(close);
            css.push_str(close);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(style: &StyleDeclarations) -> Vec<&str> {
        style.iter().map(|d| d.name.as_str()).collect()
    }

    fn plain_of<'a>(style: &'a StyleDeclarations, name: &str) -> Option<&'a str> {
        style.iter().find(|d| d.name == name).map(|d| d.plain.as_str())
    }

    #[test]
    fn test_parse_simple_declarations() {
        let style = StyleDeclarations::parse("color: red; POSITION:fixed ;margin:0 auto");
        assert_eq!(names(&style), vec!["color", "position", "margin"]);
        assert_eq!(style.iter().nth(1).unwrap().value, "fixed");
        assert_eq!(style.iter().nth(2).unwrap().value, "0 auto");
    }

    #[test]
    fn test_semicolons_inside_urls_and_strings() {
        let style = StyleDeclarations::parse(
            r#"background: url("a;b.png"); font-family: 'x;y', serif; width: calc(1px + 2px)"#,
        );
        assert_eq!(names(&style), vec!["background", "font-family", "width"]);
        assert_eq!(style.iter().next().unwrap().value, r#"url("a;b.png")"#);
        assert_eq!(plain_of(&style, "font-family"), Some("x;y, serif"));
        assert_eq!(plain_of(&style, "width"), Some("calc(1px + 2px)"));
    }

    #[test]
    fn test_drops_malformed_declarations_and_comments() {
        let style = StyleDeclarations::parse("/* c; */ color: blue; bogus; : nothing; top:");
        assert_eq!(names(&style), vec!["color"]);
    }

    #[test]
    fn test_escapes_are_decoded() {
        let style = StyleDeclarations::parse(r"p\osition: f\ixed; \63 olor: r\65 d");
        assert_eq!(names(&style), vec!["position", "color"]);
        assert_eq!(plain_of(&style, "position"), Some("fixed"));
        assert_eq!(plain_of(&style, "color"), Some("red"));
        assert_eq!(style.to_css_text(), "position: fixed; color: red;");
    }

    #[test]
    fn test_comment_markers_inside_strings() {
        let style =
            StyleDeclarations::parse("font-family: '/*'; position: fixed; color: '*/'");
        assert_eq!(names(&style), vec!["font-family", "position", "color"]);
        assert_eq!(plain_of(&style, "position"), Some("fixed"));
    }

    #[test]
    fn test_repeated_property_keeps_last_value() {
        let style = StyleDeclarations::parse("position: absolute; color: red; position: fixed");
        assert_eq!(names(&style), vec!["position", "color"]);
        assert_eq!(style.iter().next().unwrap().value, "fixed");
    }

    #[test]
    fn test_set_remove_and_serialize() {
        let mut style = StyleDeclarations::parse("position: fixed; color: red");
        style.set("position", "absolute");
        assert_eq!(style.to_css_text(), "position: absolute; color: red;");

        style.remove("color");
        assert_eq!(style.to_css_text(), "position: absolute;");
        style.remove("position");
        assert!(style.is_empty());
    }
}
