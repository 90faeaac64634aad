//! Validation result model
//!
//! Validation never fails fast. Every entity reports all of its problems as a
//! list of [`ValidationError`]s; collections nest element errors under an
//! index wrapper so a caller can walk from the job root to the offending field.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::attachment::is_attachment_url;
use crate::ident::Identified;

/// Which field or collection slot an error refers to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldRef {
    Name(String),
    Index(usize),
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRef::Name(name) => write!(f, "{}", name),
            FieldRef::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// One node of a validation error tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: Option<FieldRef>,
    pub message: String,
    /// Short description of the object that owns the field
    pub object: Option<String>,
    pub children: Vec<ValidationError>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
            object: None,
            children: Vec::new(),
        }
    }

    /// Error on a named field
    pub fn field(name: &str, message: impl Into<String>) -> Self {
        Self {
            field: Some(FieldRef::Name(name.to_string())),
            ..Self::new(message)
        }
    }

    /// Error on a collection slot
    pub fn index(index: usize, message: impl Into<String>) -> Self {
        Self {
            field: Some(FieldRef::Index(index)),
            ..Self::new(message)
        }
    }

    pub fn with_object(mut self, object: impl Into<String>) -> Self {
        self.object = Some(object.into());
        self
    }

    pub fn with_children(mut self, children: Vec<ValidationError>) -> Self {
        self.children = children;
        self
    }

    pub fn add_child(&mut self, child: ValidationError) {
        self.children.push(child);
    }

    /// Field name, when the error refers to a named field
    pub fn field_name(&self) -> Option<&str> {
        match &self.field {
            Some(FieldRef::Name(name)) => Some(name),
            _ => None,
        }
    }

    /// Direct child on the named field
    pub fn child(&self, name: &str) -> Option<&ValidationError> {
        self.children.iter().find(|c| c.field_name() == Some(name))
    }

    /// Direct child on a collection slot
    pub fn child_at(&self, index: usize) -> Option<&ValidationError> {
        self.children
            .iter()
            .find(|c| c.field == Some(FieldRef::Index(index)))
    }

    /// Depth-first walk over this node and every descendant
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }

    /// Number of nodes without children
    pub fn leaf_count(&self) -> usize {
        self.iter().filter(|e| e.children.is_empty()).count()
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:width$}", "", width = depth * 2)?;
        if let Some(field) = &self.field {
            write!(f, "{}: ", field)?;
        }
        write!(f, "{}", self.message)?;
        if let Some(object) = &self.object {
            write!(f, " ({})", object)?;
        }
        writeln!(f)?;
        for child in &self.children {
            child.fmt_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

impl std::error::Error for ValidationError {}

/// Options that change how strictly a graph is checked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationContext {
    /// Require every non-attachment filename to exist on the local disk
    pub verify_files: bool,
}

impl ValidationContext {
    pub fn verifying_files() -> Self {
        Self { verify_files: true }
    }
}

/// Entities that can check their own consistency
pub trait Validate {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError>;

    /// Validation with default options
    fn check_valid(&self) -> Vec<ValidationError> {
        self.validate(&ValidationContext::default())
    }

    fn is_valid(&self) -> bool {
        self.check_valid().is_empty()
    }

    /// Short description used on wrapper errors, e.g. `WeatherStream(wxstrm3)`
    fn describe(&self) -> Option<String> {
        None
    }
}

/// Accumulates leaf errors for one entity
/// Characters that end a record field or a line in the wire format
pub(crate) fn breaks_framing(value: &str) -> bool {
    value.contains(|c: char| matches!(c, '|' | '\n' | '\r'))
}

#[derive(Debug, Default)]
pub struct Checks<'a> {
    ctx: ValidationContext,
    errors: Vec<ValidationError>,
    object: Option<&'a str>,
}

impl<'a> Checks<'a> {
    pub fn new(ctx: &ValidationContext) -> Self {
        Self {
            ctx: *ctx,
            errors: Vec::new(),
            object: None,
        }
    }

    /// Tag every leaf with the owning object's description
    pub fn for_object(mut self, object: &'a str) -> Self {
        self.object = Some(object);
        self
    }

    pub fn fail(&mut self, field: &str, message: impl Into<String>) {
        let mut error = ValidationError::field(field, message);
        if let Some(object) = self.object {
            error.object = Some(object.to_string());
        }
        self.errors.push(error);
    }

    /// Attach an already built error (typically a nested group)
    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = ValidationError>) {
        self.errors.extend(errors);
    }

    /// Group errors from a nested object under `field`
    pub fn nested(&mut self, field: &str, errors: Vec<ValidationError>) {
        if !errors.is_empty() {
            let parent = ValidationError::field(field, "contains invalid values");
            self.errors.push(parent.with_children(errors));
        }
    }

    pub fn require<T>(&mut self, field: &str, value: &Option<T>) -> bool {
        if value.is_none() {
            self.fail(field, "is required");
            return false;
        }
        true
    }

    /// Non-empty string that can sit in a record field unescaped
    pub fn require_text(&mut self, field: &str, value: Option<&str>) -> bool {
        match value {
            Some(v) if !v.trim().is_empty() => self.unframed(field, v),
            _ => {
                self.fail(field, "is required");
                false
            },
        }
    }

    /// Rejects the record separator and line breaks in a verbatim field
    pub fn unframed(&mut self, field: &str, value: &str) -> bool {
        if breaks_framing(value) {
            self.fail(field, format!("'{}' contains '|' or a line break", value.escape_debug()));
            return false;
        }
        true
    }

    /// Inclusive range check
    pub fn range(&mut self, field: &str, value: f64, min: f64, max: f64) {
        if !(value >= min && value <= max) {
            self.fail(field, format!("{} is outside [{}, {}]", value, min, max));
        }
    }

    pub fn opt_range(&mut self, field: &str, value: Option<f64>, min: f64, max: f64) {
        if let Some(v) = value {
            self.range(field, v, min, max);
        }
    }

    pub fn int_range(&mut self, field: &str, value: i32, min: i32, max: i32) {
        if value < min || value > max {
            self.fail(field, format!("{} is outside [{}, {}]", value, min, max));
        }
    }

    pub fn at_least(&mut self, field: &str, value: f64, min: f64) {
        if !(value >= min) {
            self.fail(field, format!("{} is less than {}", value, min));
        }
    }

    /// Required filename; checked on disk when the context asks for it
    pub fn file(&mut self, field: &str, value: Option<&str>) {
        match value {
            Some(path) if !path.trim().is_empty() => {
                if !self.unframed(field, path) {
                    return;
                }
                if self.ctx.verify_files && !is_attachment_url(path) && !Path::new(path).is_file()
                {
                    self.fail(field, format!("file '{}' does not exist", path));
                }
            },
            _ => self.fail(field, "is required"),
        }
    }

    /// Optional filename; only checked when present
    pub fn opt_file(&mut self, field: &str, value: Option<&str>) {
        if value.is_some_and(|v| !v.trim().is_empty()) {
            self.file(field, value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> Vec<ValidationError> {
        self.errors
    }
}

/// Validate every element of a collection
///
/// Invalid elements produce a wrapper keyed by index. When `key` yields a
/// value for an element that was already seen (case-insensitively), a child
/// error on `key_field` is added to that later element's wrapper. Wrappers are
/// grouped under one error named `name`.
pub fn validate_collection<T, K>(
    name: &str,
    items: &[T],
    ctx: &ValidationContext,
    key_field: &str,
    key: K,
    seen: &mut HashSet<String>,
) -> Option<ValidationError>
where
    T: Validate,
    K: Fn(&T) -> Option<String>,
{
    let mut wrappers = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let mut errors = item.validate(ctx);
        if let Some(k) = key(item) {
            if !seen.insert(k.to_lowercase()) {
                errors.push(ValidationError::field(
                    key_field,
                    format!("duplicate {} '{}'", key_field, k),
                ));
            }
        }
        if !errors.is_empty() {
            let mut wrapper = ValidationError::index(i, "invalid element").with_children(errors);
            wrapper.object = item.describe();
            wrappers.push(wrapper);
        }
    }
    group(name, wrappers)
}

/// Validate a collection of identified entities, unique by id
pub fn validate_identified<T>(
    name: &str,
    items: &[T],
    ctx: &ValidationContext,
) -> Option<ValidationError>
where
    T: Validate + Identified,
{
    validate_collection(
        name,
        items,
        ctx,
        "id",
        |item| Some(item.id().to_string()),
        &mut HashSet::new(),
    )
}

/// Validate a collection with no uniqueness rule
pub fn validate_all<T: Validate>(
    name: &str,
    items: &[T],
    ctx: &ValidationContext,
) -> Option<ValidationError> {
    validate_collection(name, items, ctx, "", |_| None, &mut HashSet::new())
}

/// Wrap index errors under a named group, if there are any
pub fn group(name: &str, children: Vec<ValidationError>) -> Option<ValidationError> {
    if children.is_empty() {
        None
    } else {
        Some(ValidationError::field(name, "contains invalid entries").with_children(children))
    }
}
