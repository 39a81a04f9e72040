//! Application service: volume (LDEV) use-cases.
//!
//! Imports only from `crate::domain` and `crate::application`.

use anyhow::{Context, Result, bail};
use vsp_common::Volume;

use crate::application::ports::{HttpTransport, ProgressReporter, Sleeper};
use crate::application::services::connection_manager::ConnectionManager;
use crate::application::services::reconcile::{Reconciled, Reconciler, reconcile};
use crate::domain::args::Ensure;
use crate::domain::endpoint::EndpointKey;
use crate::domain::volume::{
    ExpandLdevParameters, ExpandLdevRequest, UpdateLdevRequest, VolumeChange, VolumeFactsSpec,
    VolumeSpec, plan,
};

/// Listing size used to find a volume by label; the array's maximum page.
const LABEL_LOOKUP_COUNT: u32 = 16_384;

struct VolumeReconciler<'a, T: HttpTransport, S: Sleeper> {
    cm: &'a ConnectionManager<T, S>,
    spec: &'a VolumeSpec,
}

impl<T: HttpTransport, S: Sleeper> Reconciler for VolumeReconciler<'_, T, S> {
    type Resource = Volume;
    type Change = VolumeChange;

    fn describe(&self) -> String {
        match (self.spec.ldev_id, &self.spec.name) {
            (Some(id), _) => format!("volume {id}"),
            (None, Some(name)) => format!("volume '{name}'"),
            (None, None) => "new volume".to_string(),
        }
    }

    /// By id when given, otherwise the one defined volume labelled `name`.
    fn fetch(&self) -> Result<Option<Volume>> {
        if let Some(id) = self.spec.ldev_id {
            let volume: Option<Volume> = self.cm.get_optional(EndpointKey::Ldev, &[&id])?;
            return Ok(volume.filter(Volume::is_defined));
        }
        let Some(name) = &self.spec.name else {
            return Ok(None);
        };
        let lookup = VolumeFactsSpec {
            name: Some(name.clone()),
            count: Some(LABEL_LOOKUP_COUNT),
            ..VolumeFactsSpec::default()
        };
        let mut found = volume_facts(self.cm, &lookup)?;
        if found.len() > 1 {
            let ids: Vec<String> = found.iter().map(|v| v.ldev_id.to_string()).collect();
            bail!(
                "{} volumes are labelled '{name}' (LDEVs {}); set ldev_id to pick one",
                found.len(),
                ids.join(", ")
            );
        }
        Ok(found.pop())
    }

    fn create(&self) -> Result<Volume> {
        let request = self.spec.create_request()?;
        let done = self.cm.post(EndpointKey::Ldevs, &[], &request)?;
        let id = match self.spec.ldev_id {
            Some(id) => id.get(),
            None => done
                .affected_id()
                .context("array did not report the new LDEV id")?
                .parse()
                .context("array reported a non-numeric LDEV id")?,
        };
        tracing::info!(ldev_id = id, "volume created");
        Ok(self.cm.get(EndpointKey::Ldev, &[&id])?)
    }

    fn plan(&self, current: &Volume) -> Result<Vec<VolumeChange>> {
        Ok(plan(current, self.spec)?)
    }

    fn apply(&self, current: &Volume, change: &VolumeChange) -> Result<()> {
        let id = current.ldev_id;
        match change {
            VolumeChange::Expand { additional_blocks } => {
                let body = ExpandLdevRequest {
                    parameters: ExpandLdevParameters {
                        additional_block_capacity: *additional_blocks,
                    },
                };
                self.cm.post(EndpointKey::LdevExpand, &[&id], &body)?;
            }
            VolumeChange::Rename(name) => {
                let body = UpdateLdevRequest {
                    label: Some(name.clone()),
                    ..UpdateLdevRequest::default()
                };
                self.cm.patch(EndpointKey::Ldev, &[&id], &body)?;
            }
            VolumeChange::CapacitySaving(mode) => {
                let body = UpdateLdevRequest {
                    data_reduction_mode: Some(mode.as_wire()),
                    ..UpdateLdevRequest::default()
                };
                self.cm.patch(EndpointKey::Ldev, &[&id], &body)?;
            }
        }
        Ok(())
    }

    fn refresh(&self, current: &Volume) -> Result<Volume> {
        Ok(self.cm.get(EndpointKey::Ldev, &[&current.ldev_id])?)
    }

    fn delete(&self, current: &Volume) -> Result<()> {
        let id = current.ldev_id;
        if !current.ports.is_empty() {
            if !self.spec.force {
                bail!(
                    "volume {id} is presented on {} host path(s); unmap it first or set force: true",
                    current.ports.len()
                );
            }
            for port in &current.ports {
                tracing::info!(ldev_id = id, port = %port.port_id, lun = port.lun, "unmapping before delete");
                self.cm
                    .delete(
                        EndpointKey::Lun,
                        &[&port.port_id, &port.host_group_number, &port.lun],
                    )
                    .with_context(|| {
                        format!("cannot unmap volume {id} from {}", port.port_id)
                    })?;
            }
        }
        self.cm.delete(EndpointKey::Ldev, &[&id])?;
        Ok(())
    }
}

/// Bring one volume to `ensure`.
///
/// # Errors
///
/// Returns a validation error before any request when the spec is
/// inconsistent, otherwise the first REST failure.
pub fn ensure_volume(
    cm: &ConnectionManager<impl HttpTransport, impl Sleeper>,
    spec: &VolumeSpec,
    ensure: Ensure,
    reporter: &impl ProgressReporter,
) -> Result<Reconciled<Volume>> {
    spec.validate(ensure)?;
    reconcile(&VolumeReconciler { cm, spec }, ensure, reporter)
}

/// Volumes matching `spec`: one by id, or a listing of defined volumes.
///
/// # Errors
///
/// Returns the first REST failure.
pub fn volume_facts(
    cm: &ConnectionManager<impl HttpTransport, impl Sleeper>,
    spec: &VolumeFactsSpec,
) -> Result<Vec<Volume>> {
    if let Some(id) = spec.ldev_id {
        let volume: Option<Volume> = cm.get_optional(EndpointKey::Ldev, &[&id])?;
        return Ok(volume.filter(Volume::is_defined).into_iter().collect());
    }
    let mut volumes: Vec<Volume> = cm.list(EndpointKey::Ldevs, &[], &spec.list_query())?;
    if let Some(name) = &spec.name {
        volumes.retain(|v| v.label.as_deref() == Some(name.as_str()));
    }
    Ok(volumes)
}
