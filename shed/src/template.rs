//! Command template parsing and shell-safe substitution
//!
//! Tool commands are templates with `{{name}}` placeholders. Rendering
//! replaces each placeholder exactly once with the shell-quoted form of the
//! caller's value, so user input always lands as a single literal argv word
//! no matter what metacharacters it contains.
//!
//! The template is tokenized up front rather than substituted by string
//! replacement: unresolved placeholders are reported from the parse, so a
//! value that legitimately contains `{{` never triggers a false positive,
//! and expansion content is never re-scanned (no recursive substitution).

use std::collections::HashMap;
use thiserror::Error;

/// Errors from template parsing or rendering
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Unresolved placeholders in command: {}", names.join(", "))]
    Unresolved { names: Vec<String> },

    #[error("Unterminated placeholder starting at byte {offset}")]
    Unterminated { offset: usize },

    #[error("Placeholder opened inside another placeholder at byte {offset}")]
    Nested { offset: usize },

    #[error("Invalid placeholder name {name:?}")]
    InvalidName { name: String },

    #[error("Value for {name:?} contains a NUL byte and cannot be shell-quoted")]
    Unquotable { name: String },
}

/// One parsed span of a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

/// Tokenize a template into literal and `{{name}}` spans
///
/// Placeholder names are `[A-Za-z0-9_]+`. A `{{` with no closing `}}`, or a
/// `{{` opened inside another placeholder, is rejected as ambiguous.
pub fn parse(template: &str) -> Result<Vec<Segment<'_>>, TemplateError> {
    let mut segments = Vec::new();
    let mut pos = 0;

    while let Some(open) = template[pos..].find("{{") {
        let open_abs = pos + open;
        if open_abs > pos {
            segments.push(Segment::Literal(&template[pos..open_abs]));
        }

        let body_start = open_abs + 2;
        let close = template[body_start..]
            .find("}}")
            .ok_or(TemplateError::Unterminated { offset: open_abs })?;
        let name = &template[body_start..body_start + close];

        if let Some(inner) = name.find("{{") {
            return Err(TemplateError::Nested {
                offset: body_start + inner,
            });
        }
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(TemplateError::InvalidName { name: name.to_string() });
        }

        segments.push(Segment::Placeholder(name));
        pos = body_start + close + 2;
    }

    if pos < template.len() {
        segments.push(Segment::Literal(&template[pos..]));
    }

    Ok(segments)
}

/// Render a command template with every placeholder shell-quoted
///
/// Placeholders with no value in the map are collected and reported as
/// [`TemplateError::Unresolved`]; the command must not be executed in that
/// case, since an unresolved token could otherwise reach the shell as a
/// live argument.
pub fn render_command(template: &str, values: &HashMap<String, String>) -> Result<String, TemplateError> {
    let segments = parse(template)?;
    let mut out = String::with_capacity(template.len());
    let mut unresolved: Vec<String> = Vec::new();

    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder(name) => match values.get(name) {
                Some(value) => {
                    let quoted = shlex::try_quote(value).map_err(|_| TemplateError::Unquotable {
                        name: name.to_string(),
                    })?;
                    out.push_str(&quoted);
                }
                None => {
                    if !unresolved.iter().any(|n| n == name) {
                        unresolved.push(name.to_string());
                    }
                }
            },
        }
    }

    if !unresolved.is_empty() {
        return Err(TemplateError::Unresolved { names: unresolved });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_parse_literal_only() {
        let segments = parse("nmap -sV localhost").unwrap();
        assert_eq!(segments, vec![Segment::Literal("nmap -sV localhost")]);
    }

    #[test]
    fn test_parse_mixed_segments() {
        let segments = parse("nmap {{flags}} {{target}}").unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Literal("nmap "),
                Segment::Placeholder("flags"),
                Segment::Literal(" "),
                Segment::Placeholder("target"),
            ]
        );
    }

    #[test]
    fn test_parse_unterminated() {
        let err = parse("echo {{oops").unwrap_err();
        assert_eq!(err, TemplateError::Unterminated { offset: 5 });
    }

    #[test]
    fn test_parse_nested_rejected() {
        let err = parse("echo {{a{{b}}}}").unwrap_err();
        assert!(matches!(err, TemplateError::Nested { .. }));
    }

    #[test]
    fn test_parse_invalid_name() {
        let err = parse("echo {{bad name}}").unwrap_err();
        assert!(matches!(err, TemplateError::InvalidName { .. }));
    }

    #[test]
    fn test_render_leaves_no_braces() {
        let rendered = render_command("dig {{record}} {{domain}}", &values(&[("record", "MX"), ("domain", "example.com")])).unwrap();
        assert!(!rendered.contains("{{"));
        assert!(!rendered.contains("}}"));
        assert_eq!(rendered, "dig MX example.com");
    }

    #[test]
    fn test_render_quotes_metacharacters() {
        let malicious = "example.com; rm -rf / | $(whoami)";
        let rendered = render_command("whois {{domain}}", &values(&[("domain", malicious)])).unwrap();

        // The value must survive shell word splitting as one literal argument
        let argv = shlex::split(&rendered).unwrap();
        assert_eq!(argv, vec!["whois".to_string(), malicious.to_string()]);
    }

    #[test]
    fn test_render_quotes_spaces_and_quotes() {
        let tricky = r#"it's a "test" value"#;
        let rendered = render_command("echo {{v}}", &values(&[("v", tricky)])).unwrap();

        let argv = shlex::split(&rendered).unwrap();
        assert_eq!(argv, vec!["echo".to_string(), tricky.to_string()]);
    }

    #[test]
    fn test_render_empty_value_is_empty_word() {
        let rendered = render_command("run {{flag}}", &values(&[("flag", "")])).unwrap();

        let argv = shlex::split(&rendered).unwrap();
        assert_eq!(argv, vec!["run".to_string(), "".to_string()]);
    }

    #[test]
    fn test_render_reports_unresolved() {
        let err = render_command("nmap {{flags}} {{target}}", &values(&[("flags", "-sV")])).unwrap_err();
        assert_eq!(
            err,
            TemplateError::Unresolved {
                names: vec!["target".to_string()]
            }
        );
    }

    #[test]
    fn test_render_reports_each_unresolved_once() {
        let err = render_command("{{a}} {{a}} {{b}}", &values(&[])).unwrap_err();
        assert_eq!(
            err,
            TemplateError::Unresolved {
                names: vec!["a".to_string(), "b".to_string()]
            }
        );
    }

    #[test]
    fn test_value_containing_braces_is_not_unresolved() {
        // A substituted value with literal braces must not look like a
        // leftover placeholder
        let rendered = render_command("echo {{v}}", &values(&[("v", "{{sneaky}}")])).unwrap();

        let argv = shlex::split(&rendered).unwrap();
        assert_eq!(argv, vec!["echo".to_string(), "{{sneaky}}".to_string()]);
    }

    #[test]
    fn test_substitution_is_not_recursive() {
        let vals = values(&[("a", "{{b}}"), ("b", "never")]);
        let rendered = render_command("echo {{a}}", &vals).unwrap();

        let argv = shlex::split(&rendered).unwrap();
        assert_eq!(argv[1], "{{b}}");
    }
}
