//! Observability helpers shared by the auth layer and the domain operations.
//!
//! Every operation runs inside a `cf_broker_client.operation` span carrying the
//! `operation` field. Enable the `metrics` feature to increment the
//! `cf_broker_client_operation_total` counter for every attempt/success/failure, labeled by
//! `operation` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operation families observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Token acquisition against the UAA token endpoint.
	ObtainToken,
	/// Instance counting per offering or plan.
	CountInstances,
	/// Instance listing, optionally filtered by org/space.
	ListInstances,
	/// Single-instance reads, upgrades, and deletions.
	Instance,
	/// Plan public flag and visibility management.
	PlanAccess,
	/// Broker registration, update, listing, and deregistration.
	Broker,
	/// `/v2/info` reads and the OSBAPI version gate.
	Info,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::ObtainToken => "obtain_token",
			OperationKind::CountInstances => "count_instances",
			OperationKind::ListInstances => "list_instances",
			OperationKind::Instance => "instance",
			OperationKind::PlanAccess => "plan_access",
			OperationKind::Broker => "broker",
			OperationKind::Info => "info",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OperationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Success => "success",
			OperationOutcome::Failure => "failure",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside an operation span and records its outcome.
pub(crate) async fn observe<T, F>(kind: OperationKind, stage: &'static str, fut: F) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	let span = OperationSpan::new(kind, stage);

	record_operation_outcome(kind, OperationOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_operation_outcome(kind, OperationOutcome::Success),
		Err(_) => record_operation_outcome(kind, OperationOutcome::Failure),
	}

	result
}
