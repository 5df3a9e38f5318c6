use crate::record::Record;

/// Live state together with the actions derived at composition.
#[derive(Clone)]
pub struct Combined<S, A> {
    pub state: S,
    pub actions: A,
}

/// Everything a render function sees.
///
/// Built as combined state, then helper functions, then caller overrides.
/// Each override partial replaces fields of its own layer only, and never
/// writes back into the store.
#[derive(Clone)]
pub struct Props<S, A, F> {
    pub state: S,
    pub actions: A,
    pub functions: F,
}

impl<S: Record, A: Record, F: Record> Props<S, A, F> {
    pub(crate) fn build(
        combined: Combined<S, A>,
        functions: &F,
        overrides: Overrides<S, A, F>,
    ) -> Self {
        let Combined {
            mut state,
            mut actions,
        } = combined;
        let mut functions = functions.clone();
        state.merge(overrides.state);
        actions.merge(overrides.actions);
        functions.merge(overrides.functions);
        Self {
            state,
            actions,
            functions,
        }
    }
}

/// Per-render replacements for state, action and function fields.
#[derive(Clone)]
pub struct Overrides<S: Record, A: Record, F: Record> {
    pub state: S::Partial,
    pub actions: A::Partial,
    pub functions: F::Partial,
}

impl<S: Record, A: Record, F: Record> Overrides<S, A, F> {
    /// No overrides.
    pub fn none() -> Self {
        Self::default()
    }

    /// Replace state fields.
    pub fn with_state(mut self, partial: S::Partial) -> Self {
        self.state = partial;
        self
    }

    /// Replace action fields.
    pub fn with_actions(mut self, partial: A::Partial) -> Self {
        self.actions = partial;
        self
    }

    /// Replace helper function fields.
    pub fn with_functions(mut self, partial: F::Partial) -> Self {
        self.functions = partial;
        self
    }
}

impl<S: Record, A: Record, F: Record> Default for Overrides<S, A, F> {
    fn default() -> Self {
        Self {
            state: S::Partial::default(),
            actions: A::Partial::default(),
            functions: F::Partial::default(),
        }
    }
}
