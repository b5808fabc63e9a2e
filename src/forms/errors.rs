//! Validation errors keyed by dotted field paths.
//!
//! An [`ErrorTree`] mirrors the shape of the submitted form: every node may
//! carry its own messages (`_errors`) and named children. Nodes left with no
//! messages and no children are removed, so a present branch always means
//! "something below here is invalid".

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// Key validator uses for struct-level (schema) errors.
const SCHEMA_ERRORS_KEY: &str = "__all__";

/// One or more messages attached to a path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Messages(Vec<String>);

impl Messages {
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for Messages {
    fn from(message: &str) -> Self {
        Self(vec![message.to_string()])
    }
}

impl From<String> for Messages {
    fn from(message: String) -> Self {
        Self(vec![message])
    }
}

impl From<Vec<String>> for Messages {
    fn from(messages: Vec<String>) -> Self {
        Self(messages)
    }
}

impl From<Vec<&str>> for Messages {
    fn from(messages: Vec<&str>) -> Self {
        Self(messages.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Messages {
    fn from(messages: [&str; N]) -> Self {
        Self(messages.into_iter().map(str::to_string).collect())
    }
}

/// Splits a dotted path. Empty paths and empty segments are rejected.
fn segments(path: &str) -> Option<Vec<&str>> {
    if path.is_empty() {
        return None;
    }
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return None;
    }
    Some(segments)
}

/// Serialized shape: `{"_errors": [...], "<child>": {...}}`.
#[derive(Deserialize)]
struct RawErrorTree {
    #[serde(rename = "_errors", default)]
    errors: Vec<String>,
    #[serde(flatten)]
    children: BTreeMap<String, RawErrorTree>,
}

impl From<RawErrorTree> for ErrorTree {
    fn from(raw: RawErrorTree) -> Self {
        let mut tree = ErrorTree {
            errors: raw.errors,
            children: BTreeMap::new(),
        };
        for (name, child) in raw.children {
            tree.merge_child(name, ErrorTree::from(child));
        }
        tree
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawErrorTree")]
pub struct ErrorTree {
    #[serde(rename = "_errors", skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
    #[serde(flatten)]
    children: BTreeMap<String, ErrorTree>,
}

impl ErrorTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no messages exist at any depth.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.children.is_empty()
    }

    /// Form-level messages stored at the root.
    pub fn form_errors(&self) -> &[String] {
        &self.errors
    }

    pub fn set_form_errors(&mut self, messages: impl Into<Messages>) {
        self.errors = messages.into().into_inner();
    }

    pub fn child(&self, name: &str) -> Option<&ErrorTree> {
        self.children.get(name)
    }

    /// Replaces the messages at `path`, creating the branch as needed.
    ///
    /// An empty message list clears the path instead.
    pub fn set_field_error(&mut self, path: &str, messages: impl Into<Messages>) {
        let messages = messages.into().into_inner();
        if messages.is_empty() {
            self.clear_field_error(path);
            return;
        }
        let Some(segments) = segments(path) else {
            return;
        };

        let mut node = self;
        for segment in segments {
            node = node.children.entry(segment.to_string()).or_default();
        }
        node.errors = messages;
    }

    /// Removes the messages at `path` and prunes branches left empty.
    pub fn clear_field_error(&mut self, path: &str) {
        if let Some(segments) = segments(path) {
            self.clear_at(&segments);
        }
    }

    fn clear_at(&mut self, segments: &[&str]) {
        let Some((head, rest)) = segments.split_first() else {
            self.errors.clear();
            return;
        };
        let Some(child) = self.children.get_mut(*head) else {
            return;
        };
        child.clear_at(rest);
        if child.is_empty() {
            self.children.remove(*head);
        }
    }

    fn node(&self, path: &str) -> Option<&ErrorTree> {
        segments(path)?
            .into_iter()
            .try_fold(self, |node, segment| node.children.get(segment))
    }

    /// Messages attached exactly at `path`.
    pub fn field_errors(&self, path: &str) -> &[String] {
        self.node(path)
            .map(|node| node.errors.as_slice())
            .unwrap_or_default()
    }

    /// Deduplicated messages of the whole branch at `path`.
    pub fn messages_under(&self, path: &str) -> Vec<String> {
        self.node(path)
            .map(ErrorTree::collect_all_messages)
            .unwrap_or_default()
    }

    pub fn has_errors_under(&self, path: &str) -> bool {
        self.node(path).is_some_and(|node| !node.is_empty())
    }

    /// Every message in the tree, root first, without duplicates.
    pub fn collect_all_messages(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut messages = Vec::new();
        self.collect_into(&mut seen, &mut messages);
        messages
    }

    fn collect_into<'a>(&'a self, seen: &mut HashSet<&'a str>, out: &mut Vec<String>) {
        for message in &self.errors {
            if seen.insert(message.as_str()) {
                out.push(message.clone());
            }
        }
        for child in self.children.values() {
            child.collect_into(seen, out);
        }
    }

    pub fn message_count(&self) -> usize {
        self.collect_all_messages().len()
    }

    /// Dotted paths of every node carrying its own messages, in key order.
    pub fn error_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for (name, child) in &self.children {
            child.collect_paths(name, &mut paths);
        }
        paths
    }

    fn collect_paths(&self, prefix: &str, out: &mut Vec<String>) {
        if !self.errors.is_empty() {
            out.push(prefix.to_string());
        }
        for (name, child) in &self.children {
            child.collect_paths(&format!("{prefix}.{name}"), out);
        }
    }

    fn merge(&mut self, other: ErrorTree) {
        for message in other.errors {
            if !self.errors.contains(&message) {
                self.errors.push(message);
            }
        }
        for (name, child) in other.children {
            self.merge_child(name, child);
        }
    }

    fn merge_child(&mut self, name: String, child: ErrorTree) {
        if child.is_empty() {
            return;
        }
        self.children.entry(name).or_default().merge(child);
    }
}

fn message_of(error: &ValidationError) -> String {
    match &error.message {
        Some(message) => message.to_string(),
        None => error.code.to_string(),
    }
}

impl From<&ValidationErrors> for ErrorTree {
    /// Field errors land on the field node, nested structs become branches,
    /// list items become branches keyed by index and schema errors attach to
    /// the owning node.
    fn from(errors: &ValidationErrors) -> Self {
        let mut tree = ErrorTree::default();

        for (field, kind) in errors.errors() {
            let field = field.to_string();
            match kind {
                ValidationErrorsKind::Field(list) => {
                    let node = ErrorTree {
                        errors: list.iter().map(message_of).collect(),
                        children: BTreeMap::new(),
                    };
                    if field == SCHEMA_ERRORS_KEY {
                        tree.merge(node);
                    } else {
                        tree.merge_child(field, node);
                    }
                }
                ValidationErrorsKind::Struct(nested) => {
                    tree.merge_child(field, ErrorTree::from(&**nested));
                }
                ValidationErrorsKind::List(items) => {
                    let mut list = ErrorTree::default();
                    for (index, nested) in items {
                        list.merge_child(index.to_string(), ErrorTree::from(&**nested));
                    }
                    tree.merge_child(field, list);
                }
            }
        }

        tree
    }
}

impl From<ValidationErrors> for ErrorTree {
    fn from(errors: ValidationErrors) -> Self {
        ErrorTree::from(&errors)
    }
}

/// The error tree owned by one form for its lifetime.
///
/// A new server validation response replaces the tree wholesale; local edits
/// clear single fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormErrorStore {
    tree: ErrorTree,
}

impl FormErrorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self) -> &ErrorTree {
        &self.tree
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn replace(&mut self, tree: ErrorTree) {
        self.tree = tree;
    }

    pub fn replace_from_validation(&mut self, errors: &ValidationErrors) {
        self.tree = ErrorTree::from(errors);
    }

    pub fn clear_all(&mut self) {
        self.tree = ErrorTree::default();
    }

    pub fn set_field_error(&mut self, path: &str, messages: impl Into<Messages>) {
        self.tree.set_field_error(path, messages);
    }

    pub fn clear_field_error(&mut self, path: &str) {
        self.tree.clear_field_error(path);
    }

    pub fn field_errors(&self, path: &str) -> &[String] {
        self.tree.field_errors(path)
    }

    pub fn messages_under(&self, path: &str) -> Vec<String> {
        self.tree.messages_under(path)
    }

    pub fn has_errors_under(&self, path: &str) -> bool {
        self.tree.has_errors_under(path)
    }

    pub fn collect_all_messages(&self) -> Vec<String> {
        self.tree.collect_all_messages()
    }
}

impl From<ErrorTree> for FormErrorStore {
    fn from(tree: ErrorTree) -> Self {
        Self { tree }
    }
}
