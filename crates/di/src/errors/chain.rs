use crate::tokens::Token;

/// Ordered list of tokens walked while resolving a dependency, used for
/// error reporting.
///
/// Renders as `A -> B -> C`. Names are captured when the error is built so
/// the chain stays valid after the injectors involved are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyChain {
    tokens: Vec<String>,
}

impl DependencyChain {
    /// Create a chain from already rendered token names
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    /// Create a chain from a sequence of tokens
    pub fn from_tokens<'a>(tokens: impl IntoIterator<Item = &'a Token>) -> Self {
        Self {
            tokens: tokens.into_iter().map(Token::to_string).collect(),
        }
    }

    /// Append a token at the end of the chain
    pub fn push(&mut self, token: &Token) {
        self.tokens.push(token.to_string());
    }

    /// Rendered token names, outermost first
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token the resolution started from
    pub fn first(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    /// Token the resolution failed on
    pub fn last(&self) -> Option<&str> {
        self.tokens.last().map(String::as_str)
    }

    /// Get the chain as a string for error messages
    pub fn path_string(&self) -> String {
        self.tokens.join(" -> ")
    }

    /// ` (A -> B)` suffix appended to error messages, empty for a chain of
    /// a single token.
    pub(crate) fn resolving_path(&self) -> String {
        if self.tokens.len() <= 1 {
            String::new()
        } else {
            format!(" ({})", self.path_string())
        }
    }
}

impl std::fmt::Display for DependencyChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path_string())
    }
}
