//! Procedural translation values
//!
//! Records flagged `is_procedural` carry source instead of a literal. The
//! store never runs that source itself; the host supplies a
//! [`ValueEvaluator`].

use crate::{LookupOptions, Result, TranslationRecord};
use serde_json::Value;

/// Produces the value of a procedural record at read time.
pub trait ValueEvaluator: Send + Sync {
    /// Evaluate `record.value` for the current request.
    ///
    /// Returning `Ok(None)` makes the lookup a miss.
    fn evaluate(&self, record: &TranslationRecord, options: &LookupOptions)
    -> Result<Option<Value>>;
}

/// [`ValueEvaluator`] backed by a closure.
pub struct FnEvaluator<F>(F);

impl<F> FnEvaluator<F>
where
    F: Fn(&TranslationRecord, &LookupOptions) -> Result<Option<Value>> + Send + Sync,
{
    /// Wrap a closure.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> std::fmt::Debug for FnEvaluator<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnEvaluator").finish_non_exhaustive()
    }
}

impl<F> ValueEvaluator for FnEvaluator<F>
where
    F: Fn(&TranslationRecord, &LookupOptions) -> Result<Option<Value>> + Send + Sync,
{
    fn evaluate(
        &self,
        record: &TranslationRecord,
        options: &LookupOptions,
    ) -> Result<Option<Value>> {
        (self.0)(record, options)
    }
}
