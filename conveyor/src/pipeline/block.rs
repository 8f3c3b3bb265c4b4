//! Pipeline blocks.

use crate::errors::BlockError;
use serde_json::Value;
use std::fmt;

type Body<T> = Box<dyn Fn(&mut T) -> Result<(), BlockError> + Send + Sync>;
type Extractor<T> = Box<dyn Fn(&T) -> Option<Value> + Send + Sync>;

/// A named processing stage applied to every item of a pipeline step.
pub struct PipelineBlock<T> {
    name: String,
    body: Body<T>,
    exception_data: Option<Extractor<T>>,
}

impl<T> PipelineBlock<T> {
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut T) -> Result<(), BlockError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            body: Box::new(body),
            exception_data: None,
        }
    }

    /// Attach an extractor that is invoked only when the body fails, to
    /// capture diagnostic data about the failing item.
    pub fn with_exception_data<F>(mut self, extractor: F) -> Self
    where
        F: Fn(&T) -> Option<Value> + Send + Sync + 'static,
    {
        self.exception_data = Some(Box::new(extractor));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn invoke(&self, item: &mut T) -> Result<(), BlockError> {
        (self.body)(item)
    }

    pub(crate) fn exception_data(&self, item: &T) -> Option<Value> {
        self.exception_data.as_ref().and_then(|extract| extract(item))
    }
}

impl<U: 'static> PipelineBlock<Vec<U>> {
    /// Block over a batch whose body runs once per element, in batch order.
    /// The first failing element aborts the rest of the batch.
    pub fn item_body<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut U) -> Result<(), BlockError> + Send + Sync + 'static,
    {
        Self::new(name, move |batch: &mut Vec<U>| {
            batch.iter_mut().try_for_each(&body)
        })
    }

    /// Block whose body receives the whole batch.
    pub fn batch_body<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut Vec<U>) -> Result<(), BlockError> + Send + Sync + 'static,
    {
        Self::new(name, body)
    }
}

impl<T> fmt::Debug for PipelineBlock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBlock")
            .field("name", &self.name)
            .field("exception_data", &self.exception_data.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::block_error;
    use serde_json::json;

    #[derive(Debug)]
    struct Negative(i32);

    impl fmt::Display for Negative {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "negative value {}", self.0)
        }
    }

    impl std::error::Error for Negative {}

    #[test]
    fn test_item_body_visits_batch_in_order() {
        let block = PipelineBlock::item_body("Double", |x: &mut i32| {
            *x *= 2;
            Ok(())
        });

        let mut batch = vec![1, 2, 3];
        block.invoke(&mut batch).unwrap();
        assert_eq!(batch, vec![2, 4, 6]);
    }

    #[test]
    fn test_item_body_stops_at_first_failure() {
        let block = PipelineBlock::item_body("Validate", |x: &mut i32| {
            if *x < 0 {
                return Err(block_error(Negative(*x)));
            }
            *x += 100;
            Ok(())
        });

        let mut batch = vec![1, -2, 3];
        let err = block.invoke(&mut batch).unwrap_err();
        assert_eq!(err.to_string(), "negative value -2");
        assert_eq!(batch, vec![101, -2, 3]);
    }

    #[test]
    fn test_exception_data_only_when_configured() {
        let plain = PipelineBlock::new("Plain", |_: &mut i32| Ok(()));
        assert_eq!(plain.exception_data(&7), None);

        let with_data = PipelineBlock::new("Data", |_: &mut i32| Ok(()))
            .with_exception_data(|x| Some(json!({ "value": x })));
        assert_eq!(with_data.exception_data(&7), Some(json!({ "value": 7 })));
    }
}
