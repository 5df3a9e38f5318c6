/// Composition options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AtomicConfig {
    /// Component name used in the display name and in logs.
    pub name: Option<String>,
}

impl AtomicConfig {
    /// Configuration with the given component name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    /// `Atomic(<name>)`, or `Atomic(Component)` when unnamed.
    pub fn display_name(&self) -> String {
        format!("Atomic({})", self.name.as_deref().unwrap_or("Component"))
    }
}
