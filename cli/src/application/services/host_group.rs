//! Application service: host group use-cases.

use anyhow::{Context, Result};
use vsp_common::{HostGroup, HostGroupDetails, HostWwn, LunPath};

use crate::application::ports::{HttpTransport, ProgressReporter, Sleeper};
use crate::application::services::connection_manager::ConnectionManager;
use crate::application::services::reconcile::{Reconciled, Reconciler, reconcile};
use crate::domain::args::Ensure;
use crate::domain::endpoint::EndpointKey;
use crate::domain::error::RestError;
use crate::domain::host_group::{
    AddLunRequest, AddWwnRequest, HostGroupChange, HostGroupFactsSpec, HostGroupSpec,
    filter_by_lun, normalize_port, plan,
};

/// A host group with its WWNs and LU paths.
fn details_of(
    cm: &ConnectionManager<impl HttpTransport, impl Sleeper>,
    host_group: HostGroup,
) -> Result<HostGroupDetails, RestError> {
    let query = [
        ("portId", host_group.port_id.clone()),
        ("hostGroupNumber", host_group.host_group_number.to_string()),
    ];
    let wwns: Vec<HostWwn> = cm.list(EndpointKey::HostWwns, &[], &query)?;
    let lun_paths: Vec<LunPath> = cm.list(EndpointKey::Luns, &[], &query)?;
    Ok(HostGroupDetails {
        host_group,
        wwns,
        lun_paths,
    })
}

struct HostGroupReconciler<'a, T: HttpTransport, S: Sleeper> {
    cm: &'a ConnectionManager<T, S>,
    spec: &'a HostGroupSpec,
}

impl<T: HttpTransport, S: Sleeper> HostGroupReconciler<'_, T, S> {
    fn get_group(&self, number: u32) -> Result<HostGroupDetails> {
        let group: HostGroup = self
            .cm
            .get(EndpointKey::HostGroup, &[&self.spec.port_id(), &number])?;
        Ok(details_of(self.cm, group)?)
    }
}

impl<T: HttpTransport, S: Sleeper> Reconciler for HostGroupReconciler<'_, T, S> {
    type Resource = HostGroupDetails;
    type Change = HostGroupChange;

    fn describe(&self) -> String {
        match (&self.spec.name, self.spec.host_group_number) {
            (Some(name), _) => format!("host group '{name}' on {}", self.spec.port_id()),
            (None, Some(n)) => format!("host group {},{n}", self.spec.port_id()),
            (None, None) => format!("host group on {}", self.spec.port_id()),
        }
    }

    fn fetch(&self) -> Result<Option<HostGroupDetails>> {
        let port = self.spec.port_id();
        let group: Option<HostGroup> = match self.spec.host_group_number {
            Some(number) => self.cm.get_optional(EndpointKey::HostGroup, &[&port, &number])?,
            None => {
                let groups: Vec<HostGroup> = self.cm.list(
                    EndpointKey::HostGroups,
                    &[],
                    &[("portId", port.to_string())],
                )?;
                groups
                    .into_iter()
                    .find(|g| Some(&g.host_group_name) == self.spec.name.as_ref())
            }
        };
        Ok(group.map(|g| details_of(self.cm, g)).transpose()?)
    }

    fn create(&self) -> Result<HostGroupDetails> {
        let request = self.spec.create_request()?;
        let done = self.cm.post(EndpointKey::HostGroups, &[], &request)?;
        let number: u32 = match self.spec.host_group_number {
            Some(n) => n,
            None => done
                .affected_id()
                .and_then(|id| id.rsplit(',').next())
                .context("array did not report the new host group number")?
                .parse()
                .context("array reported a non-numeric host group number")?,
        };
        self.get_group(number)
    }

    fn plan(&self, current: &HostGroupDetails) -> Result<Vec<HostGroupChange>> {
        Ok(plan(current, self.spec))
    }

    fn apply(&self, current: &HostGroupDetails, change: &HostGroupChange) -> Result<()> {
        let port = &current.host_group.port_id;
        let number = current.host_group.host_group_number;
        match change {
            HostGroupChange::SetHostMode(body) => {
                self.cm.patch(EndpointKey::HostGroup, &[port, &number], body)?;
            }
            HostGroupChange::AddWwn(wwn) => {
                let body = AddWwnRequest {
                    host_wwn: wwn.clone(),
                    port_id: port.clone(),
                    host_group_number: number,
                };
                self.cm.post(EndpointKey::HostWwns, &[], &body)?;
            }
            HostGroupChange::RemoveWwn(wwn) => {
                self.cm.delete(EndpointKey::HostWwn, &[port, &number, wwn])?;
            }
            HostGroupChange::MapLdev(ldev_id) => {
                let body = AddLunRequest {
                    port_id: port.clone(),
                    host_group_number: number,
                    ldev_id: *ldev_id,
                };
                self.cm
                    .post(EndpointKey::Luns, &[], &body)
                    .with_context(|| format!("cannot map LDEV {ldev_id} to {port},{number}"))?;
            }
            HostGroupChange::UnmapLun { lun, .. } => {
                self.cm.delete(EndpointKey::Lun, &[port, &number, lun])?;
            }
        }
        Ok(())
    }

    fn refresh(&self, current: &HostGroupDetails) -> Result<HostGroupDetails> {
        self.get_group(current.host_group.host_group_number)
    }

    fn delete(&self, current: &HostGroupDetails) -> Result<()> {
        let group = &current.host_group;
        self.cm.delete(
            EndpointKey::HostGroup,
            &[&group.port_id, &group.host_group_number],
        )?;
        Ok(())
    }
}

/// Bring one host group to `ensure`.
///
/// # Errors
///
/// Returns a validation error before any request, otherwise the first REST
/// failure.
pub fn ensure_host_group(
    cm: &ConnectionManager<impl HttpTransport, impl Sleeper>,
    mut spec: HostGroupSpec,
    ensure: Ensure,
    reporter: &impl ProgressReporter,
) -> Result<Reconciled<HostGroupDetails>> {
    spec.validate()?;
    reconcile(&HostGroupReconciler { cm, spec: &spec }, ensure, reporter)
}

/// Host groups matching `spec`, with WWNs and LU paths. With `lun`, only
/// groups presenting that LDEV are kept, each with just those paths.
///
/// # Errors
///
/// Returns a validation error for a malformed port, otherwise the first REST
/// failure.
pub fn host_group_facts(
    cm: &ConnectionManager<impl HttpTransport, impl Sleeper>,
    spec: &HostGroupFactsSpec,
) -> Result<Vec<HostGroupDetails>> {
    let ports = spec
        .ports
        .iter()
        .map(String::as_str)
        .map(normalize_port)
        .collect::<Result<Vec<_>, _>>()?;

    let mut groups: Vec<HostGroup> = Vec::new();
    if ports.is_empty() {
        groups = cm.list(EndpointKey::HostGroups, &[], &[])?;
    } else {
        for port in ports {
            let on_port: Vec<HostGroup> =
                cm.list(EndpointKey::HostGroups, &[], &[("portId", port)])?;
            groups.extend(on_port);
        }
    }
    if let Some(name) = &spec.name {
        groups.retain(|g| &g.host_group_name == name);
    }

    let details = groups
        .into_iter()
        .map(|g| details_of(cm, g))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(match spec.lun {
        Some(ldev) => filter_by_lun(details, ldev),
        None => details,
    })
}
