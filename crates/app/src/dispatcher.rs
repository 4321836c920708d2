//! Command dispatch — forwards a group command to every member.

use climate_group_domain::climate::ClimateCommand;
use climate_group_domain::error::ClimateGroupError;
use climate_group_domain::id::EntityId;
use climate_group_domain::service::ServiceCall;

use crate::ports::ServiceCaller;

/// What [`dispatch`] did with a command.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// One call was delivered to all members.
    Sent(ServiceCall),
    /// The command carried nothing to forward.
    Skipped,
}

/// Translate `command` into a single service call addressed to all
/// `members` (available or not) and wait for the host to complete it.
///
/// Nothing is retried and the composite state is not touched here.
///
/// # Errors
///
/// Propagates the host's delivery error.
pub async fn dispatch<C: ServiceCaller>(
    caller: &C,
    members: &[EntityId],
    command: &ClimateCommand,
) -> Result<DispatchOutcome, ClimateGroupError> {
    let Some(call) = command.to_service_call(members) else {
        tracing::debug!(service = %command.service(), "command has no parameters, nothing sent");
        return Ok(DispatchOutcome::Skipped);
    };

    tracing::debug!(%call, "forwarding command to members");
    caller
        .call_service(call.clone())
        .await
        .inspect_err(|err| tracing::warn!(%call, error = %err, "command delivery failed"))?;
    Ok(DispatchOutcome::Sent(call))
}
