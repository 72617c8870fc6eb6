//! Prompt template with strict placeholder validation.
//!
//! Templates use `{name}` placeholders. `{}` is an auto-numbered positional
//! field and `{0}` an explicit positional index. `{{` and `}}` render as
//! literal braces. Format specs (`{name:>10}`) and conversions (`{name!r}`)
//! are rejected at parse time.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Errors raised while parsing or rendering a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unmatched '{brace}' at byte {position}")]
    UnmatchedBrace { brace: char, position: usize },

    #[error("unsupported format spec or conversion in field '{field}'")]
    UnsupportedFormatSpec { field: String },

    #[error("keyword arguments do not match template variables: expected {expected:?}, got {supplied:?}")]
    KeywordMismatch {
        expected: Vec<String>,
        supplied: Vec<String>,
    },

    #[error("number of arguments ({supplied}) does not match the number of template variables ({expected})")]
    ArgumentCountMismatch { expected: usize, supplied: usize },

    #[error("mapping keys do not match template variables: expected {expected:?}, got {supplied:?}")]
    MappingMismatch {
        expected: Vec<String>,
        supplied: Vec<String>,
    },

    #[error("no arguments provided, but template expects variables {expected:?}")]
    NoArguments { expected: Vec<String> },

    #[error("missing argument for placeholder '{0}'")]
    MissingArgument(String),

    #[error("template file {path}: {message}")]
    Io { path: String, message: String },
}

/// Arguments supplied to [`PromptTemplate::format`].
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateArgs {
    /// No arguments at all. Only valid for templates without placeholders.
    Empty,
    /// Positional values, consumed by `{}` and `{N}` fields.
    Positional(Vec<String>),
    /// Keyword values. Key set must equal the placeholder set.
    Named(BTreeMap<String, String>),
    /// A single mapping argument.
    ///
    /// Strings render verbatim. Any other value renders as its JSON text, so
    /// `true`, `null` and `1.0` appear exactly like that rather than in a
    /// capitalized `True`/`None` form.
    Mapping(Map<String, Value>),
}

impl TemplateArgs {
    /// Builds keyword arguments from `(name, value)` pairs.
    pub fn named<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Builds positional arguments.
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self::Positional(values.into_iter().map(Into::into).collect())
    }

    fn is_empty(&self) -> bool {
        match self {
            TemplateArgs::Empty => true,
            TemplateArgs::Positional(values) => values.is_empty(),
            TemplateArgs::Named(values) => values.is_empty(),
            TemplateArgs::Mapping(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// An immutable template string plus its parsed placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
    segments: Vec<Segment>,
    variables: Vec<String>,
}

impl PromptTemplate {
    /// Parses a template, extracting its placeholder names.
    pub fn parse(template: impl Into<String>) -> Result<Self, TemplateError> {
        let template = template.into();
        let (segments, variables) = parse_segments(&template)?;
        Ok(Self {
            template,
            segments,
            variables,
        })
    }

    /// Loads and parses a template from a UTF-8 text file.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| TemplateError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Self::parse(content)
    }

    /// Writes the raw template text to a file.
    pub async fn dump(&self, path: impl AsRef<Path>) -> Result<(), TemplateError> {
        let path = path.as_ref();
        tokio::fs::write(path, self.template.as_bytes())
            .await
            .map_err(|e| TemplateError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })
    }

    /// Placeholder names in order of appearance, duplicates included.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Returns the raw template text.
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Renders the template after checking the arguments against the placeholders.
    pub fn format(&self, args: TemplateArgs) -> Result<String, TemplateError> {
        let expected = self.variable_set();

        match &args {
            TemplateArgs::Named(values) if !values.is_empty() => {
                let supplied: BTreeSet<&str> = values.keys().map(String::as_str).collect();
                if supplied != expected {
                    return Err(TemplateError::KeywordMismatch {
                        expected: to_owned_list(&expected),
                        supplied: to_owned_list(&supplied),
                    });
                }
            }
            TemplateArgs::Positional(values) if !values.is_empty() => {
                if values.len() != self.variables.len() {
                    return Err(TemplateError::ArgumentCountMismatch {
                        expected: self.variables.len(),
                        supplied: values.len(),
                    });
                }
            }
            TemplateArgs::Mapping(values) => {
                let supplied: BTreeSet<&str> = values.keys().map(String::as_str).collect();
                if supplied != expected {
                    return Err(TemplateError::MappingMismatch {
                        expected: to_owned_list(&expected),
                        supplied: to_owned_list(&supplied),
                    });
                }
            }
            _ => {}
        }

        if args.is_empty() && !self.variables.is_empty() {
            return Err(TemplateError::NoArguments {
                expected: to_owned_list(&expected),
            });
        }

        self.render(&args)
    }

    fn variable_set(&self) -> BTreeSet<&str> {
        self.variables.iter().map(String::as_str).collect()
    }

    fn render(&self, args: &TemplateArgs) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.template.len());
        let mut next_auto = 0usize;

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(name) => {
                    let value = match args {
                        TemplateArgs::Positional(values) => {
                            let index = if name.is_empty() {
                                let index = next_auto;
                                next_auto += 1;
                                Some(index)
                            } else {
                                name.parse::<usize>().ok()
                            };
                            index.and_then(|i| values.get(i)).cloned()
                        }
                        TemplateArgs::Named(values) => values.get(name).cloned(),
                        TemplateArgs::Mapping(values) => values.get(name).map(value_text),
                        TemplateArgs::Empty => None,
                    };
                    let value = value.ok_or_else(|| TemplateError::MissingArgument(name.clone()))?;
                    out.push_str(&value);
                }
            }
        }

        Ok(out)
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn to_owned_list(set: &BTreeSet<&str>) -> Vec<String> {
    set.iter().map(|s| s.to_string()).collect()
}

fn parse_segments(template: &str) -> Result<(Vec<Segment>, Vec<String>), TemplateError> {
    let mut segments = Vec::new();
    let mut variables = Vec::new();
    let mut literal = String::new();
    let mut chars = template.char_indices().peekable();

    while let Some((position, c)) = chars.next() {
        match c {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    literal.push('{');
                    continue;
                }

                let mut name = String::new();
                let mut closed = false;
                for (_, fc) in chars.by_ref() {
                    match fc {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => {
                            return Err(TemplateError::UnmatchedBrace {
                                brace: '{',
                                position,
                            })
                        }
                        _ => name.push(fc),
                    }
                }
                if !closed {
                    return Err(TemplateError::UnmatchedBrace {
                        brace: '{',
                        position,
                    });
                }
                if name.contains(':') || name.contains('!') {
                    return Err(TemplateError::UnsupportedFormatSpec { field: name });
                }

                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                variables.push(name.clone());
                segments.push(Segment::Field(name));
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    literal.push('}');
                } else {
                    return Err(TemplateError::UnmatchedBrace {
                        brace: '}',
                        position,
                    });
                }
            }
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    Ok((segments, variables))
}
