//! Application service: ShadowImage pair use-cases.
//!
//! `present`/`absent` go through [`reconcile`]; `split` and `resync` are
//! planned as a single pair action. `split` may create the pair first;
//! `resync` needs one that already exists.
//! After any change the pair is polled until it reaches the status the state
//! implies; a pair still moving at the poll ceiling is reported as last seen.

use anyhow::Result;
use vsp_common::{LocalClonePair, PairStatus};

use crate::application::ports::{HttpTransport, ProgressReporter, Sleeper};
use crate::application::services::connection_manager::ConnectionManager;
use crate::application::services::reconcile::{Reconciled, Reconciler, reconcile};
use crate::domain::args::{Ensure, State};
use crate::domain::endpoint::EndpointKey;
use crate::domain::error::RestError;
use crate::domain::shadow_image::{
    PairAction, PairActionParameters, PairActionRequest, ShadowImageFactsSpec, ShadowImageSpec,
    target_status, transition,
};

struct PairReconciler<'a, T: HttpTransport, S: Sleeper> {
    cm: &'a ConnectionManager<T, S>,
    spec: &'a ShadowImageSpec,
    state: State,
}

impl<T: HttpTransport, S: Sleeper> PairReconciler<'_, T, S> {
    fn find(&self) -> Result<Option<LocalClonePair>, RestError> {
        let (pvol, svol) = self.spec.volumes();
        let pairs: Vec<LocalClonePair> = self.cm.list(
            EndpointKey::LocalClonePairs,
            &[],
            &[("pvolLdevId", pvol.to_string())],
        )?;
        Ok(pairs.into_iter().find(|p| p.svol_ldev_id == svol))
    }

    fn require(&self) -> Result<LocalClonePair, RestError> {
        self.find()?.ok_or_else(|| RestError::NotFound {
            status: 404,
            message: format!("{} disappeared", self.describe()),
        })
    }

    /// Poll until the pair reports `target`; returns the last observation
    /// either way.
    fn wait_for(&self, target: &PairStatus) -> Result<LocalClonePair> {
        let outcome = self.cm.poll(|| self.require(), |p| p.status() == *target)?;
        if !outcome.is_done() {
            tracing::warn!(
                pair = %self.describe(),
                target = %target,
                "pair did not reach the target status before the poll ceiling"
            );
        }
        Ok(outcome.into_inner())
    }

    fn invoke(&self, pair: &LocalClonePair, action: PairAction) -> Result<()> {
        let key = match action {
            PairAction::Split => EndpointKey::LocalClonePairSplit,
            PairAction::Resync => EndpointKey::LocalClonePairResync,
        };
        let body = PairActionRequest {
            parameters: PairActionParameters {
                copy_pace: self.spec.pace()?.as_wire(),
            },
        };
        self.cm
            .post(key, &[&pair.local_clone_copypair_id], &body)?;
        Ok(())
    }
}

impl<T: HttpTransport, S: Sleeper> Reconciler for PairReconciler<'_, T, S> {
    type Resource = LocalClonePair;
    type Change = PairAction;

    fn describe(&self) -> String {
        let (pvol, svol) = self.spec.volumes();
        format!("ShadowImage pair {pvol} -> {svol}")
    }

    fn fetch(&self) -> Result<Option<LocalClonePair>> {
        Ok(self.find()?)
    }

    fn create(&self) -> Result<LocalClonePair> {
        if self.state == State::Resync {
            return Err(RestError::NotFound {
                status: 404,
                message: format!("{}: pair not found; resync needs an existing pair", self.describe()),
            }
            .into());
        }
        let request = self.spec.create_request()?;
        self.cm.post(EndpointKey::LocalClonePairs, &[], &request)?;
        self.wait_for(&target_status(self.state, self.spec.auto_split))
    }

    fn plan(&self, current: &LocalClonePair) -> Result<Vec<PairAction>> {
        Ok(transition(&current.status(), self.state)?
            .into_iter()
            .collect())
    }

    fn apply(&self, current: &LocalClonePair, change: &PairAction) -> Result<()> {
        self.invoke(current, *change)
    }

    fn refresh(&self, _current: &LocalClonePair) -> Result<LocalClonePair> {
        self.wait_for(&target_status(self.state, self.spec.auto_split))
    }

    fn delete(&self, current: &LocalClonePair) -> Result<()> {
        if matches!(current.status(), PairStatus::Pair | PairStatus::Copy) {
            tracing::info!(pair = %self.describe(), "splitting before delete");
            self.invoke(current, PairAction::Split)?;
            self.wait_for(&PairStatus::Split)?;
        }
        self.cm.delete(
            EndpointKey::LocalClonePair,
            &[&current.local_clone_copypair_id],
        )?;
        Ok(())
    }
}

/// Bring one pair to `state`.
///
/// # Errors
///
/// Returns a validation error before any request, an error when the pair's
/// status forbids the transition, otherwise the first REST failure.
pub fn ensure_pair(
    cm: &ConnectionManager<impl HttpTransport, impl Sleeper>,
    spec: &ShadowImageSpec,
    state: State,
    reporter: &impl ProgressReporter,
) -> Result<Reconciled<LocalClonePair>> {
    spec.validate()?;
    let mut spec = spec.clone();
    if state == State::Split {
        spec.auto_split = true;
    }
    let ensure = match state {
        State::Absent => Ensure::Absent,
        _ => Ensure::Present,
    };
    reconcile(
        &PairReconciler {
            cm,
            spec: &spec,
            state,
        },
        ensure,
        reporter,
    )
}

/// Pairs whose P-VOL is `spec.pvol`, or every pair when omitted.
///
/// # Errors
///
/// Returns the first REST failure.
pub fn pair_facts(
    cm: &ConnectionManager<impl HttpTransport, impl Sleeper>,
    spec: &ShadowImageFactsSpec,
) -> Result<Vec<LocalClonePair>> {
    let query: Vec<(&str, String)> = spec
        .pvol
        .map(|p| ("pvolLdevId", p.get().to_string()))
        .into_iter()
        .collect();
    Ok(cm.list(EndpointKey::LocalClonePairs, &[], &query)?)
}
