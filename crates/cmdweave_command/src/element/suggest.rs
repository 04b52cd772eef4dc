//! Wrappers that change what an element suggests without changing how it
//! parses.

use std::fmt;
use std::sync::Arc;

use super::Element;
use crate::args::CommandArgs;
use crate::context::CommandContext;
use crate::source::CommandSource;

type SuggestionsFn = dyn Fn(&dyn CommandSource) -> Vec<String> + Send + Sync;
type PredicateFn = dyn Fn(&str) -> bool + Send + Sync;

/// Replaces an element's completions with a fixed or computed list.
#[derive(Clone)]
pub struct WithSuggestions {
    pub(crate) element: Box<Element>,
    suggestions: Arc<SuggestionsFn>,
    require_begin: bool,
}

impl WithSuggestions {
    pub(crate) fn new(
        element: Element,
        suggestions: Arc<SuggestionsFn>,
        require_begin: bool,
    ) -> Self {
        Self {
            element: Box::new(element),
            suggestions,
            require_begin,
        }
    }

    pub(crate) fn complete(&self, source: &dyn CommandSource, args: &mut CommandArgs) -> Vec<String> {
        let suggestions = (self.suggestions)(source);
        if !self.require_begin {
            return suggestions;
        }
        let prefix = args.next_if_present().unwrap_or_default();
        suggestions
            .into_iter()
            .filter(|s| s.starts_with(&prefix))
            .collect()
    }
}

impl fmt::Debug for WithSuggestions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WithSuggestions")
            .field("element", &self.element)
            .field("require_begin", &self.require_begin)
            .finish_non_exhaustive()
    }
}

/// Filters an element's own completions through a predicate.
#[derive(Clone)]
pub struct ConstrainedSuggestions {
    pub(crate) element: Box<Element>,
    predicate: Arc<PredicateFn>,
}

impl ConstrainedSuggestions {
    pub(crate) fn new(element: Element, predicate: Arc<PredicateFn>) -> Self {
        Self {
            element: Box::new(element),
            predicate,
        }
    }

    pub(crate) fn complete(
        &self,
        source: &dyn CommandSource,
        args: &mut CommandArgs,
        context: &mut CommandContext,
    ) -> Vec<String> {
        self.element
            .complete(source, args, context)
            .into_iter()
            .filter(|s| (self.predicate)(s))
            .collect()
    }
}

impl fmt::Debug for ConstrainedSuggestions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstrainedSuggestions")
            .field("element", &self.element)
            .finish_non_exhaustive()
    }
}
