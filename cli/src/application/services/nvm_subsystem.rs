//! Application service: NVM subsystem use-cases.

use anyhow::Result;
use vsp_common::{HostNqn, Namespace, NvmSubsystem, NvmSubsystemDetails, NvmSubsystemPort};

use crate::application::ports::{HttpTransport, ProgressReporter, Sleeper};
use crate::application::services::connection_manager::ConnectionManager;
use crate::application::services::reconcile::{Reconciled, Reconciler, reconcile};
use crate::domain::args::Ensure;
use crate::domain::endpoint::EndpointKey;
use crate::domain::error::RestError;
use crate::domain::nvm::{
    AddHostNqnRequest, AddNamespaceRequest, AddNvmPortRequest, NvmChange, NvmSubsystemFactsSpec,
    NvmSubsystemSpec, RenameNvmSubsystemRequest, plan,
};

fn details_of(
    cm: &ConnectionManager<impl HttpTransport, impl Sleeper>,
    subsystem: NvmSubsystem,
) -> Result<NvmSubsystemDetails, RestError> {
    let query = [("nvmSubsystemId", subsystem.nvm_subsystem_id.to_string())];
    let ports: Vec<NvmSubsystemPort> = cm.list(EndpointKey::NvmSubsystemPorts, &[], &query)?;
    let host_nqns: Vec<HostNqn> = cm.list(EndpointKey::HostNqns, &[], &query)?;
    let namespaces: Vec<Namespace> = cm.list(EndpointKey::Namespaces, &[], &query)?;
    Ok(NvmSubsystemDetails {
        subsystem,
        ports: ports.into_iter().map(|p| p.port_id).collect(),
        host_nqns: host_nqns.into_iter().map(|h| h.host_nqn).collect(),
        namespaces,
    })
}

struct NvmReconciler<'a, T: HttpTransport, S: Sleeper> {
    cm: &'a ConnectionManager<T, S>,
    spec: &'a NvmSubsystemSpec,
}

impl<T: HttpTransport, S: Sleeper> NvmReconciler<'_, T, S> {
    fn id(&self) -> u32 {
        self.spec.id.unwrap_or_default()
    }
}

impl<T: HttpTransport, S: Sleeper> Reconciler for NvmReconciler<'_, T, S> {
    type Resource = NvmSubsystemDetails;
    type Change = NvmChange;

    fn describe(&self) -> String {
        format!("NVM subsystem {}", self.id())
    }

    fn fetch(&self) -> Result<Option<NvmSubsystemDetails>> {
        let subsystem: Option<NvmSubsystem> =
            self.cm.get_optional(EndpointKey::NvmSubsystem, &[&self.id()])?;
        Ok(subsystem.map(|s| details_of(self.cm, s)).transpose()?)
    }

    fn create(&self) -> Result<NvmSubsystemDetails> {
        self.cm
            .post(EndpointKey::NvmSubsystems, &[], &self.spec.create_request())?;
        let subsystem: NvmSubsystem = self.cm.get(EndpointKey::NvmSubsystem, &[&self.id()])?;
        Ok(details_of(self.cm, subsystem)?)
    }

    fn plan(&self, current: &NvmSubsystemDetails) -> Result<Vec<NvmChange>> {
        Ok(plan(current, self.spec))
    }

    fn apply(&self, current: &NvmSubsystemDetails, change: &NvmChange) -> Result<()> {
        let id = current.subsystem.nvm_subsystem_id;
        match change {
            NvmChange::Rename(name) => {
                let body = RenameNvmSubsystemRequest {
                    nvm_subsystem_name: name.clone(),
                };
                self.cm.patch(EndpointKey::NvmSubsystem, &[&id], &body)?;
            }
            NvmChange::AddPort(port) => {
                let body = AddNvmPortRequest {
                    nvm_subsystem_id: id,
                    port_id: port.clone(),
                };
                self.cm.post(EndpointKey::NvmSubsystemPorts, &[], &body)?;
            }
            NvmChange::AddHostNqn(nqn) => {
                let body = AddHostNqnRequest {
                    nvm_subsystem_id: id,
                    host_nqn: nqn.clone(),
                };
                self.cm.post(EndpointKey::HostNqns, &[], &body)?;
            }
            NvmChange::AddNamespace(ldev_id) => {
                let body = AddNamespaceRequest {
                    nvm_subsystem_id: id,
                    ldev_id: *ldev_id,
                };
                self.cm.post(EndpointKey::Namespaces, &[], &body)?;
            }
        }
        Ok(())
    }

    fn refresh(&self, current: &NvmSubsystemDetails) -> Result<NvmSubsystemDetails> {
        let subsystem: NvmSubsystem = self
            .cm
            .get(EndpointKey::NvmSubsystem, &[&current.subsystem.nvm_subsystem_id])?;
        Ok(details_of(self.cm, subsystem)?)
    }

    fn delete(&self, current: &NvmSubsystemDetails) -> Result<()> {
        self.cm.delete(
            EndpointKey::NvmSubsystem,
            &[&current.subsystem.nvm_subsystem_id],
        )?;
        Ok(())
    }
}

/// Bring one NVM subsystem to `ensure`. Ports, host NQNs and namespaces are
/// only ever added.
///
/// # Errors
///
/// Returns a validation error before any request, otherwise the first REST
/// failure.
pub fn ensure_nvm_subsystem(
    cm: &ConnectionManager<impl HttpTransport, impl Sleeper>,
    mut spec: NvmSubsystemSpec,
    ensure: Ensure,
    reporter: &impl ProgressReporter,
) -> Result<Reconciled<NvmSubsystemDetails>> {
    spec.validate()?;
    reconcile(&NvmReconciler { cm, spec: &spec }, ensure, reporter)
}

/// NVM subsystems matching `spec`, with their members.
///
/// # Errors
///
/// Returns the first REST failure.
pub fn nvm_subsystem_facts(
    cm: &ConnectionManager<impl HttpTransport, impl Sleeper>,
    spec: &NvmSubsystemFactsSpec,
) -> Result<Vec<NvmSubsystemDetails>> {
    let mut subsystems: Vec<NvmSubsystem> = match spec.id {
        Some(id) => cm
            .get_optional(EndpointKey::NvmSubsystem, &[&id])?
            .into_iter()
            .collect(),
        None => cm.list(EndpointKey::NvmSubsystems, &[], &[])?,
    };
    if let Some(name) = &spec.name {
        subsystems.retain(|s| s.nvm_subsystem_name.as_ref() == Some(name));
    }
    Ok(subsystems
        .into_iter()
        .map(|s| details_of(cm, s))
        .collect::<Result<Vec<_>, _>>()?)
}
