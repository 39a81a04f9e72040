//! Static table of REST endpoint templates.
//!
//! Templates use positional `{}` placeholders filled left to right. Paths are
//! relative to the connection's base URL (see
//! [`ConnectionInfo::base_url`](crate::domain::connection::ConnectionInfo::base_url)).

use std::fmt::Display;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::domain::error::EndpointError;

/// Characters left as-is in query values (RFC 3986 unreserved).
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// One row of the endpoint table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub template: &'static str,
    /// Whether the UAIG gateway exposes this endpoint.
    pub gateway: bool,
}

/// Operation names the endpoint table is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKey {
    Sessions,
    Session,
    Job,
    Task,
    Storages,
    Ldevs,
    Ldev,
    LdevExpand,
    Pools,
    Pool,
    PoolExpand,
    HostGroups,
    HostGroup,
    HostWwns,
    HostWwn,
    Luns,
    Lun,
    LocalClonePairs,
    LocalClonePair,
    LocalClonePairSplit,
    LocalClonePairResync,
    NvmSubsystems,
    NvmSubsystem,
    NvmSubsystemPorts,
    HostNqns,
    Namespaces,
}

impl EndpointKey {
    /// Look up the table row for this operation.
    #[must_use]
    pub const fn endpoint(self) -> Endpoint {
        let (template, gateway) = match self {
            Self::Sessions => ("v1/objects/sessions", false),
            Self::Session => ("v1/objects/sessions/{}", false),
            Self::Job => ("v1/objects/jobs/{}", false),
            Self::Task => ("v1/tasks/{}", true),
            Self::Storages => ("v1/objects/storages", true),
            Self::Ldevs => ("v1/objects/ldevs", true),
            Self::Ldev => ("v1/objects/ldevs/{}", true),
            Self::LdevExpand => ("v1/objects/ldevs/{}/actions/expand/invoke", true),
            Self::Pools => ("v1/objects/pools", true),
            Self::Pool => ("v1/objects/pools/{}", true),
            Self::PoolExpand => ("v1/objects/pools/{}/actions/expand/invoke", false),
            Self::HostGroups => ("v1/objects/host-groups", true),
            Self::HostGroup => ("v1/objects/host-groups/{},{}", true),
            Self::HostWwns => ("v1/objects/host-wwns", true),
            Self::HostWwn => ("v1/objects/host-wwns/{},{},{}", false),
            Self::Luns => ("v1/objects/luns", true),
            Self::Lun => ("v1/objects/luns/{},{},{}", false),
            Self::LocalClonePairs => ("v1/objects/local-clone-copypairs", false),
            Self::LocalClonePair => ("v1/objects/local-clone-copypairs/{}", false),
            Self::LocalClonePairSplit => {
                ("v1/objects/local-clone-copypairs/{}/actions/split/invoke", false)
            }
            Self::LocalClonePairResync => {
                ("v1/objects/local-clone-copypairs/{}/actions/resync/invoke", false)
            }
            Self::NvmSubsystems => ("v1/objects/nvm-subsystems", false),
            Self::NvmSubsystem => ("v1/objects/nvm-subsystems/{}", false),
            Self::NvmSubsystemPorts => ("v1/objects/nvm-subsystem-ports", false),
            Self::HostNqns => ("v1/objects/host-nqns", false),
            Self::Namespaces => ("v1/objects/namespaces", false),
        };
        Endpoint { template, gateway }
    }

    /// Short operation name used in logs and errors.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Sessions | Self::Session => "session",
            Self::Job => "job",
            Self::Task => "task",
            Self::Storages => "storages",
            Self::Ldevs | Self::Ldev => "ldev",
            Self::LdevExpand => "ldev expand",
            Self::Pools | Self::Pool => "pool",
            Self::PoolExpand => "pool expand",
            Self::HostGroups | Self::HostGroup => "host group",
            Self::HostWwns | Self::HostWwn => "host wwn",
            Self::Luns | Self::Lun => "lun",
            Self::LocalClonePairs | Self::LocalClonePair => "local clone pair",
            Self::LocalClonePairSplit => "local clone pair split",
            Self::LocalClonePairResync => "local clone pair resync",
            Self::NvmSubsystems | Self::NvmSubsystem => "nvm subsystem",
            Self::NvmSubsystemPorts => "nvm subsystem port",
            Self::HostNqns => "host nqn",
            Self::Namespaces => "namespace",
        }
    }

    /// Fill the template's placeholders with `args`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::Arity`] if the argument count does not match
    /// the number of placeholders.
    pub fn fill(self, args: &[&dyn Display]) -> Result<String, EndpointError> {
        let template = self.endpoint().template;
        let expected = template.matches("{}").count();
        if expected != args.len() {
            return Err(EndpointError::Arity {
                template,
                expected,
                got: args.len(),
            });
        }

        let mut out = String::with_capacity(template.len() + 8 * args.len());
        let mut pieces = template.split("{}");
        if let Some(head) = pieces.next() {
            out.push_str(head);
        }
        for (arg, piece) in args.iter().zip(pieces) {
            out.push_str(&arg.to_string());
            out.push_str(piece);
        }
        Ok(out)
    }
}

/// Append `?k=v&…` to `path`, percent-encoding values. Empty queries leave
/// the path untouched.
#[must_use]
pub fn with_query(path: &str, query: &[(&str, String)]) -> String {
    if query.is_empty() {
        return path.to_string();
    }
    let qs = query
        .iter()
        .map(|(k, v)| format!("{k}={}", utf8_percent_encode(v, QUERY_VALUE)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{path}?{qs}")
}
