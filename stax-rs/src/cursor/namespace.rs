//! Namespace scope tracking for streaming cursors.

use rustc_hash::FxHashMap;

use crate::constants::XML_NAMESPACE_URI;

/// Tracks namespace bindings while a document is being read.
#[derive(Debug)]
pub struct NamespaceContext {
    /// Stack of scopes, each containing prefix -> URI bindings.
    scopes: Vec<FxHashMap<String, String>>,
}

impl Default for NamespaceContext {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceContext {
    /// Creates a new namespace context with the `xml` prefix pre-bound.
    pub fn new() -> Self {
        let mut ctx = NamespaceContext {
            scopes: vec![FxHashMap::default()],
        };
        ctx.bind("xml", XML_NAMESPACE_URI);
        ctx
    }

    /// Pushes a new scope for entering an element.
    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// Pops the current scope when leaving an element.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Binds a prefix to a URI in the current scope. The empty prefix is the
    /// default namespace.
    pub fn bind(&mut self, prefix: &str, uri: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(prefix.to_string(), uri.to_string());
        }
    }

    /// Resolves a prefix to its URI, searching from the innermost scope.
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(prefix))
            .map(String::as_str)
    }

    /// Returns the number of open scopes, including the document scope.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

/// Splits a qualified name into prefix and local part.
pub(crate) fn split_qname(qname: &str) -> (&str, &str) {
    match qname.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None => ("", qname),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_prefix_is_bound() {
        let ctx = NamespaceContext::new();
        assert_eq!(ctx.resolve("xml"), Some(XML_NAMESPACE_URI));
    }

    #[test]
    fn test_inner_scope_shadows_outer() {
        let mut ctx = NamespaceContext::new();
        ctx.push_scope();
        ctx.bind("p", "urn:outer");
        ctx.push_scope();
        ctx.bind("p", "urn:inner");
        assert_eq!(ctx.resolve("p"), Some("urn:inner"));
        ctx.pop_scope();
        assert_eq!(ctx.resolve("p"), Some("urn:outer"));
        ctx.pop_scope();
        assert_eq!(ctx.resolve("p"), None);
    }

    #[test]
    fn test_document_scope_is_never_popped() {
        let mut ctx = NamespaceContext::new();
        ctx.pop_scope();
        ctx.pop_scope();
        assert_eq!(ctx.depth(), 1);
        assert!(ctx.resolve("xml").is_some());
    }

    #[test]
    fn test_split_qname() {
        assert_eq!(split_qname("p:a"), ("p", "a"));
        assert_eq!(split_qname("a"), ("", "a"));
    }
}
