//! Application service: pool use-cases.

use anyhow::{Context, Result};
use vsp_common::{Pool, Volume};

use crate::application::ports::{HttpTransport, ProgressReporter, Sleeper};
use crate::application::services::connection_manager::ConnectionManager;
use crate::application::services::reconcile::{Reconciled, Reconciler, reconcile};
use crate::domain::args::Ensure;
use crate::domain::endpoint::EndpointKey;
use crate::domain::pool::{
    ExpandPoolParameters, ExpandPoolRequest, PoolChange, PoolFactsSpec, PoolSpec, PoolState, plan,
};

struct PoolReconciler<'a, T: HttpTransport, S: Sleeper> {
    cm: &'a ConnectionManager<T, S>,
    spec: &'a PoolSpec,
}

impl<T: HttpTransport, S: Sleeper> PoolReconciler<'_, T, S> {
    fn find(&self) -> Result<Option<Pool>> {
        if let Some(id) = self.spec.id {
            return Ok(self.cm.get_optional(EndpointKey::Pool, &[&id])?);
        }
        let pools: Vec<Pool> = self.cm.list(EndpointKey::Pools, &[], &[])?;
        Ok(pools
            .into_iter()
            .find(|p| Some(&p.pool_name) == self.spec.name.as_ref()))
    }

    /// The pool plus which requested LDEVs are already its pool volumes.
    fn state_of(&self, pool: Pool) -> Result<PoolState> {
        let mut pool_volume_ids = Vec::new();
        for ldev in &self.spec.ldev_ids {
            let volume: Option<Volume> = self.cm.get_optional(EndpointKey::Ldev, &[ldev])?;
            if volume.is_some_and(|v| v.is_pool_volume_of(pool.pool_id)) {
                pool_volume_ids.push(ldev.get());
            }
        }
        Ok(PoolState {
            pool,
            pool_volume_ids,
        })
    }
}

impl<T: HttpTransport, S: Sleeper> Reconciler for PoolReconciler<'_, T, S> {
    type Resource = PoolState;
    type Change = PoolChange;

    fn describe(&self) -> String {
        match (self.spec.id, &self.spec.name) {
            (Some(id), _) => format!("pool {id}"),
            (None, Some(name)) => format!("pool '{name}'"),
            (None, None) => "pool".to_string(),
        }
    }

    fn fetch(&self) -> Result<Option<PoolState>> {
        self.find()?.map(|p| self.state_of(p)).transpose()
    }

    fn create(&self) -> Result<PoolState> {
        let request = self.spec.create_request()?;
        let done = self.cm.post(EndpointKey::Pools, &[], &request)?;
        let id: u32 = match self.spec.id {
            Some(id) => id,
            None => done
                .affected_id()
                .context("array did not report the new pool id")?
                .parse()
                .context("array reported a non-numeric pool id")?,
        };
        let pool: Pool = self.cm.get(EndpointKey::Pool, &[&id])?;
        self.state_of(pool)
    }

    fn plan(&self, current: &PoolState) -> Result<Vec<PoolChange>> {
        Ok(plan(current, self.spec))
    }

    fn apply(&self, current: &PoolState, change: &PoolChange) -> Result<()> {
        let id = current.pool.pool_id;
        match change {
            PoolChange::AddVolumes(ldev_ids) => {
                let body = ExpandPoolRequest {
                    parameters: ExpandPoolParameters {
                        ldev_ids: ldev_ids.clone(),
                    },
                };
                self.cm.post(EndpointKey::PoolExpand, &[&id], &body)?;
            }
            PoolChange::Update(update) => {
                self.cm.patch(EndpointKey::Pool, &[&id], update)?;
            }
        }
        Ok(())
    }

    fn refresh(&self, current: &PoolState) -> Result<PoolState> {
        let pool: Pool = self.cm.get(EndpointKey::Pool, &[&current.pool.pool_id])?;
        self.state_of(pool)
    }

    fn delete(&self, current: &PoolState) -> Result<()> {
        self.cm
            .delete(EndpointKey::Pool, &[&current.pool.pool_id])
            .with_context(|| format!("cannot delete pool {}", current.pool.pool_id))?;
        Ok(())
    }
}

/// Bring one pool to `ensure`.
///
/// # Errors
///
/// Returns a validation error before any request, otherwise the first REST
/// failure.
pub fn ensure_pool(
    cm: &ConnectionManager<impl HttpTransport, impl Sleeper>,
    spec: &PoolSpec,
    ensure: Ensure,
    reporter: &impl ProgressReporter,
) -> Result<Reconciled<PoolState>> {
    spec.validate(ensure)?;
    reconcile(&PoolReconciler { cm, spec }, ensure, reporter)
}

/// Pools matching `spec`.
///
/// # Errors
///
/// Returns the first REST failure.
pub fn pool_facts(
    cm: &ConnectionManager<impl HttpTransport, impl Sleeper>,
    spec: &PoolFactsSpec,
) -> Result<Vec<Pool>> {
    if let Some(id) = spec.id {
        let pool: Option<Pool> = cm.get_optional(EndpointKey::Pool, &[&id])?;
        return Ok(pool.into_iter().collect());
    }
    let mut pools: Vec<Pool> = cm.list(EndpointKey::Pools, &[], &[])?;
    if let Some(name) = &spec.name {
        pools.retain(|p| &p.pool_name == name);
    }
    Ok(pools)
}
