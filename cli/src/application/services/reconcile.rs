//! Application service: fetch, compare, apply.
//!
//! Every stateful module drives its resource through [`reconcile`]. A
//! [`Reconciler`] only knows how to read, create, diff, change and delete
//! one resource; idempotency lives here.

use std::fmt;

use anyhow::Result;

use crate::application::ports::ProgressReporter;
use crate::domain::args::Ensure;

/// One resource type's primitive operations.
pub trait Reconciler {
    type Resource;
    type Change: fmt::Display;

    /// Short human name of the resource, e.g. `volume 10`.
    fn describe(&self) -> String;

    /// Current state, `None` when the resource does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the array cannot be queried.
    fn fetch(&self) -> Result<Option<Self::Resource>>;

    /// Create the resource and return it as the array now reports it.
    ///
    /// # Errors
    ///
    /// Returns an error if the spec is incomplete or creation fails.
    fn create(&self) -> Result<Self::Resource>;

    /// Differences between `current` and the spec, in apply order.
    ///
    /// # Errors
    ///
    /// Returns an error if the spec asks for an impossible change.
    fn plan(&self, current: &Self::Resource) -> Result<Vec<Self::Change>>;

    /// Apply one planned change.
    ///
    /// # Errors
    ///
    /// Returns an error if the array rejects the change.
    fn apply(&self, current: &Self::Resource, change: &Self::Change) -> Result<()>;

    /// Re-read `current` after changes were applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be read back.
    fn refresh(&self, current: &Self::Resource) -> Result<Self::Resource>;

    /// Delete `current`.
    ///
    /// # Errors
    ///
    /// Returns an error if the array refuses the deletion.
    fn delete(&self, current: &Self::Resource) -> Result<()>;
}

/// What [`reconcile`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled<R> {
    /// The resource after reconciliation; `None` once absent.
    pub resource: Option<R>,
    pub changed: bool,
    pub message: String,
}

/// Bring the resource described by `reconciler` to `ensure`.
///
/// # Errors
///
/// Returns the first error from any primitive; later steps are skipped.
pub fn reconcile<Rc: Reconciler>(
    reconciler: &Rc,
    ensure: Ensure,
    reporter: &impl ProgressReporter,
) -> Result<Reconciled<Rc::Resource>> {
    let name = reconciler.describe();
    let current = reconciler.fetch()?;

    match (ensure, current) {
        (Ensure::Absent, None) => Ok(Reconciled {
            resource: None,
            changed: false,
            message: format!("{name} is already absent"),
        }),
        (Ensure::Absent, Some(current)) => {
            reporter.step(&format!("deleting {name}..."));
            reconciler.delete(&current)?;
            reporter.success(&format!("{name} deleted"));
            Ok(Reconciled {
                resource: None,
                changed: true,
                message: format!("{name} deleted"),
            })
        }
        (Ensure::Present, None) => {
            reporter.step(&format!("creating {name}..."));
            let created = reconciler.create()?;
            let (resource, _) = converge(reconciler, created, reporter)?;
            reporter.success(&format!("{name} created"));
            Ok(Reconciled {
                resource: Some(resource),
                changed: true,
                message: format!("{name} created"),
            })
        }
        (Ensure::Present, Some(current)) => {
            let (resource, applied) = converge(reconciler, current, reporter)?;
            let message = if applied == 0 {
                format!("{name} is up to date")
            } else {
                reporter.success(&format!("{name} updated"));
                format!("{name} updated ({applied} change(s))")
            };
            Ok(Reconciled {
                resource: Some(resource),
                changed: applied > 0,
                message,
            })
        }
    }
}

/// Apply the plan for `current`, returning the refreshed resource and the
/// number of changes applied.
fn converge<Rc: Reconciler>(
    reconciler: &Rc,
    current: Rc::Resource,
    reporter: &impl ProgressReporter,
) -> Result<(Rc::Resource, usize)> {
    let changes = reconciler.plan(&current)?;
    if changes.is_empty() {
        return Ok((current, 0));
    }
    for change in &changes {
        reporter.step(&format!("{}: {change}", reconciler.describe()));
        tracing::info!(resource = %reconciler.describe(), %change, "applying change");
        reconciler.apply(&current, change)?;
    }
    Ok((reconciler.refresh(&current)?, changes.len()))
}
