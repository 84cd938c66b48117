//! Error aggregation.
//!
//! [`MultiError`] collects any number of failures while a diff keeps going,
//! and surfaces them as one error at the end. Adding a `MultiError` to
//! another flattens its members in, so nesting never happens.

use std::error::Error as StdError;
use std::fmt;

/// A boxed error that can cross thread boundaries.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// A flat list of errors.
#[derive(Debug, Default)]
pub struct MultiError {
    errors: Vec<BoxError>,
}

impl MultiError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an error, flattening it if it is itself a `MultiError`.
    pub fn add<E>(&mut self, err: E)
    where
        E: Into<BoxError>,
    {
        match err.into().downcast::<MultiError>() {
            Ok(multi) => self.errors.extend(multi.errors),
            Err(single) => self.errors.push(single),
        }
    }

    /// Record the error of `result`, if any, and hand back its value.
    pub fn add_result<T, E>(&mut self, result: Result<T, E>) -> Option<T>
    where
        E: Into<BoxError>,
    {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.add(e);
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(dyn StdError + Send + Sync + 'static)> {
        self.errors.iter().map(|e| e.as_ref())
    }

    /// `Ok(())` when nothing was collected, otherwise the aggregate itself.
    pub fn into_result(self) -> Result<(), MultiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} errors: ", self.errors.len())?;
        for (i, err) in self.errors.iter().enumerate() {
            if i != 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl StdError for MultiError {}

impl Extend<BoxError> for MultiError {
    fn extend<I: IntoIterator<Item = BoxError>>(&mut self, iter: I) {
        for err in iter {
            self.add(err);
        }
    }
}
