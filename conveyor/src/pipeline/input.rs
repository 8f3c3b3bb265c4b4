//! Lazily produced pipeline input.

use crate::errors::BlockError;
use std::fmt;

/// Name under which input materialization is reported when none is given.
pub const DEFAULT_INPUT_NAME: &str = "Input";

pub(crate) type ItemIter<T> = Box<dyn Iterator<Item = Result<T, BlockError>>>;
type Source<T> = Box<dyn Fn() -> ItemIter<T> + Send + Sync>;

/// Finite, lazily produced sequence of items (or batches) for one step.
///
/// The source is invoked once per execution and its iterator is drained in
/// order, never rewound. Producing an element may fail; the failure is
/// attributed to the input's name.
pub struct PipelineInput<T> {
    name: String,
    expected_item_count: usize,
    source: Source<T>,
}

impl<T: 'static> PipelineInput<T> {
    /// Input over a fixed collection; the expected count is its length.
    pub fn from_vec(items: Vec<T>) -> Self
    where
        T: Clone + Send + Sync,
    {
        let expected_item_count = items.len();
        Self::from_fn(expected_item_count, move || items.clone())
    }

    /// Input produced by `source` each time the step runs.
    pub fn from_fn<F, I>(expected_item_count: usize, source: F) -> Self
    where
        F: Fn() -> I + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Self::try_from_fn(expected_item_count, move || source().into_iter().map(Ok))
    }

    /// Input whose elements may fail to materialize.
    pub fn try_from_fn<F, I>(expected_item_count: usize, source: F) -> Self
    where
        F: Fn() -> I + Send + Sync + 'static,
        I: IntoIterator<Item = Result<T, BlockError>>,
        I::IntoIter: 'static,
    {
        Self {
            name: DEFAULT_INPUT_NAME.to_string(),
            expected_item_count,
            source: Box::new(move || Box::new(source().into_iter()) as ItemIter<T>),
        }
    }
}

impl<T> PipelineInput<T> {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_expected_item_count(mut self, expected_item_count: usize) -> Self {
        self.expected_item_count = expected_item_count;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hint used for progress estimation; the actual count may differ.
    pub fn expected_item_count(&self) -> usize {
        self.expected_item_count
    }

    pub(crate) fn materialize(&self) -> ItemIter<T> {
        (self.source)()
    }
}

impl<T> fmt::Debug for PipelineInput<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineInput")
            .field("name", &self.name)
            .field("expected_item_count", &self.expected_item_count)
            .finish_non_exhaustive()
    }
}
