//! EJS-style interpolation templates rendered through `tinytemplate`.
//!
//! Only the variable-substitution subset of EJS is understood:
//!
//! - `<%= name %>` interpolates `name`, HTML-escaped
//! - `<%- name %>` interpolates `name` verbatim
//! - `<%# text %>` is a comment
//! - `<%%` is a literal `<%`
//! - a tag closed with `-%>` swallows the newline that directly follows it
//!
//! Everything else is literal text and is copied through unchanged.

use serde::Serialize;
use serde_json::Value;
use tinytemplate::TinyTemplate;

const TEMPLATE_NAME: &str = "template";
const ESCAPED: &str = "escaped";
const UNESCAPED: &str = "unescaped";
// Context key holding a single backslash, see `guard_trailing_backslash`.
// Must match the rename on `RenderContext::backslash`.
const BACKSLASH_KEY: &str = "__template_backslash";

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("line {line}: {reason}")]
    Compile { line: usize, reason: String },

    #[error(transparent)]
    Render(#[from] tinytemplate::error::Error),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Tag {
    Escaped,
    Raw,
    Comment,
    Scriptlet,
}

impl Tag {
    // Returns the tag kind and the length of its opening marker after `<%`.
    fn detect(after_open: &str) -> (Self, usize) {
        match after_open.as_bytes().first() {
            Some(b'=') => (Tag::Escaped, 1),
            Some(b'-') => (Tag::Raw, 1),
            Some(b'#') => (Tag::Comment, 1),
            _ => (Tag::Scriptlet, 0),
        }
    }
}

/// A template compiled once and renderable against any serializable context.
#[derive(Debug, Clone)]
pub struct Template {
    compiled: String,
}

impl Template {
    pub fn compile(source: &str) -> Result<Self, TemplateError> {
        let mut compiled = String::with_capacity(source.len());
        let mut rest = source;

        while let Some(start) = rest.find("<%") {
            push_literal(&mut compiled, &rest[..start]);

            let consumed = source.len() - rest.len() + start;
            let line = source[..consumed].matches('\n').count() + 1;

            let after_open = &rest[start + 2..];
            if let Some(tail) = after_open.strip_prefix('%') {
                compiled.push_str("<%");
                rest = tail;
                continue;
            }

            let (tag, marker) = Tag::detect(after_open);
            let after_open = &after_open[marker..];
            let end = after_open.find("%>").ok_or_else(|| TemplateError::Compile {
                line,
                reason: "unterminated tag, expected `%>`".to_string(),
            })?;

            let mut body = &after_open[..end];
            rest = &after_open[end + 2..];

            if let Some(trimmed) = body.strip_suffix('-') {
                body = trimmed;
                rest = rest
                    .strip_prefix("\r\n")
                    .or_else(|| rest.strip_prefix('\n'))
                    .unwrap_or(rest);
            }

            match tag {
                Tag::Comment => {}
                Tag::Scriptlet => {
                    return Err(TemplateError::Compile {
                        line,
                        reason: format!("unsupported scriptlet `<%{body}%>`"),
                    });
                }
                Tag::Escaped | Tag::Raw => {
                    let path = body.trim();
                    if !is_variable_path(path) {
                        return Err(TemplateError::Compile {
                            line,
                            reason: format!("`{path}` is not a variable name"),
                        });
                    }

                    guard_trailing_backslash(&mut compiled);
                    compiled.push('{');
                    compiled.push_str(path);
                    compiled.push_str(" | ");
                    compiled.push_str(match tag {
                        Tag::Raw => UNESCAPED,
                        _ => ESCAPED,
                    });
                    compiled.push('}');
                }
            }
        }

        push_literal(&mut compiled, rest);
        guard_trailing_backslash(&mut compiled);

        Ok(Self { compiled })
    }

    pub fn render<C: Serialize>(&self, context: &C) -> Result<String, TemplateError> {
        let mut tt = TinyTemplate::new();
        tt.add_formatter(ESCAPED, format_escaped);
        tt.add_formatter(UNESCAPED, tinytemplate::format_unescaped);
        tt.add_template(TEMPLATE_NAME, &self.compiled)?;

        let context = RenderContext {
            variables: context,
            backslash: "\\",
        };
        Ok(tt.render(TEMPLATE_NAME, &context)?)
    }
}

#[derive(Serialize)]
struct RenderContext<'a, C: Serialize> {
    #[serde(flatten)]
    variables: &'a C,
    #[serde(rename = "__template_backslash")]
    backslash: &'static str,
}

// Same entities as EJS `<%=`.
fn format_escaped(value: &Value, out: &mut String) -> Result<(), tinytemplate::error::Error> {
    let mut raw = String::new();
    tinytemplate::format_unescaped(value, &mut raw)?;
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    Ok(())
}

// tinytemplate treats every `{` as the start of an expression unless it is
// preceded by a backslash.
fn push_literal(out: &mut String, text: &str) {
    for c in text.chars() {
        if c == '{' {
            out.push('\\');
        }
        out.push(c);
    }
}

// A literal backslash right before an expression (or at the very end) would be
// taken by tinytemplate as an escape, so it is read from the context instead.
fn guard_trailing_backslash(out: &mut String) {
    let trimmed = out.trim_end_matches('\\').len();
    let count = out.len() - trimmed;
    out.truncate(trimmed);
    for _ in 0..count {
        out.push('{');
        out.push_str(BACKSLASH_KEY);
        out.push_str(" | ");
        out.push_str(UNESCAPED);
        out.push('}');
    }
}

fn is_variable_path(path: &str) -> bool {
    !path.is_empty()
        && path.split('.').all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn vars(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn render(source: &str, entries: &[(&str, &str)]) -> Result<String, TemplateError> {
        Template::compile(source)?.render(&vars(entries))
    }

    #[test]
    fn test_substitutes_variables() {
        let out = render(
            "host=<%= HostAddress %>\nhandler=<%= HandlerAddress %>",
            &[("HostAddress", "0xAA"), ("HandlerAddress", "0xBB")],
        )
        .unwrap();
        assert_eq!(out, "host=0xAA\nhandler=0xBB");
    }

    #[test]
    fn test_tags_without_spaces() {
        let out = render("<%=a%>/<%-b%>", &[("a", "1"), ("b", "2")]).unwrap();
        assert_eq!(out, "1/2");
    }

    #[test]
    fn test_braces_are_literal() {
        let source = "[chain]\nx = { addr = \"<%= a %>\" }\n{{ not a tag }}\n{# nor this #}";
        let out = render(source, &[("a", "0x1")]).unwrap();
        assert_eq!(
            out,
            "[chain]\nx = { addr = \"0x1\" }\n{{ not a tag }}\n{# nor this #}"
        );
    }

    #[test]
    fn test_backslashes_are_literal() {
        let out = render(r"C:\dir\<%= a %>\{x}\", &[("a", "f")]).unwrap();
        assert_eq!(out, r"C:\dir\f\{x}\");
    }

    #[test]
    fn test_backslash_before_tag_and_at_end() {
        let out = render(r"dir\<%= a %>", &[("a", "0x1")]).unwrap();
        assert_eq!(out, r"dir\0x1");

        let out = render(r"unc\\<%- a %>", &[("a", "host")]).unwrap();
        assert_eq!(out, r"unc\\host");

        let out = render("cmd --x \\", &[("a", "0x1")]).unwrap();
        assert_eq!(out, "cmd --x \\");

        let out = render("x=<%= a %> \\\n", &[("a", "0x1")]).unwrap();
        assert_eq!(out, "x=0x1 \\\n");
    }

    #[test]
    fn test_escaped_and_raw_output() {
        let out = render("<%= v %>|<%- v %>", &[("v", "a<b&c>\"d'")]).unwrap();
        assert_eq!(out, "a&lt;b&amp;c&gt;&#34;d&#39;|a<b&c>\"d'");
    }

    #[test]
    fn test_comments_and_literal_open_tag() {
        let out = render("a<%# ignored %>b <%%= kept", &[]).unwrap();
        assert_eq!(out, "ab <%= kept");
    }

    #[test]
    fn test_trailing_dash_trims_newline() {
        let out = render("<%# header -%>\nvalue=<%= v -%>\n\nend", &[("v", "1")]).unwrap();
        assert_eq!(out, "value=1\nend");
    }

    #[test]
    fn test_missing_variable_is_render_error() {
        let err = render("x=<%= Missing %>", &[("Other", "1")]).unwrap_err();
        assert!(matches!(err, TemplateError::Render(_)), "{err:?}");
    }

    #[test]
    fn test_unterminated_tag() {
        let err = Template::compile("ok\n<%= a").unwrap_err();
        match err {
            TemplateError::Compile { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_scriptlets_and_expressions() {
        assert!(matches!(
            Template::compile("<% if (x) { %>"),
            Err(TemplateError::Compile { .. })
        ));
        assert!(matches!(
            Template::compile("<%= a + b %>"),
            Err(TemplateError::Compile { .. })
        ));
    }

    #[test]
    fn test_render_is_deterministic() {
        let template = Template::compile("a=<%= a %>").unwrap();
        let context = vars(&[("a", "0x01")]);
        assert_eq!(
            template.render(&context).unwrap(),
            template.render(&context).unwrap()
        );
    }
}
