/// Where a dependency may be looked up, relative to the injector that owns
/// the provider asking for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// Own injector first, then the parent chain, then siblings
    #[default]
    Default,
    /// Own injector only
    FromSelf,
    /// Parent chain only, skipping the own injector
    SkipSelf,
}

impl Visibility {
    /// Whether the own injector is searched
    pub fn includes_self(&self) -> bool {
        !matches!(self, Visibility::SkipSelf)
    }

    /// Whether the search may continue in the parent and in siblings
    pub fn includes_ancestors(&self) -> bool {
        !matches!(self, Visibility::FromSelf)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Default => "default",
            Visibility::FromSelf => "from_self",
            Visibility::SkipSelf => "skip_self",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
