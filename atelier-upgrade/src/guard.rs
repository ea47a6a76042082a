//! Per-call error boundary around migration code.
//!
//! A migration's `applies` or `migrate` may return an error or panic; either
//! way the caller gets a [`Fault`] and the run carries on with the next
//! migration.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;

use atelier_core::{MigrationError, Version};

/// Which call faulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Predicate, before any write.
    Applies,
    /// Transform.
    Migrate,
    /// Writing the transform's output.
    Write,
    /// Predicate re-check right after writing.
    Verify,
    /// Predicate re-check in the final full-registry pass.
    Rescan,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Applies => "applies",
            Stage::Migrate => "migrate",
            Stage::Write => "write",
            Stage::Verify => "verify",
            Stage::Rescan => "rescan",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub version: Version,
    pub stage: Stage,
    pub message: String,
}

/// Run `f`, converting an `Err` or a panic into a [`Fault`].
pub(crate) fn guarded<T>(
    version: Version,
    stage: Stage,
    f: impl FnOnce() -> Result<T, MigrationError>,
) -> Result<T, Fault> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(Fault {
            version,
            stage,
            message: err.to_string(),
        }),
        Err(payload) => Err(Fault {
            version,
            stage,
            message: format!("panicked: {}", panic_message(payload.as_ref())),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
