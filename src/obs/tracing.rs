// self
use crate::{_prelude::*, obs::OperationKind};

/// Future instrumented with an operation span.
pub type InstrumentedOperation<F> = tracing::instrument::Instrumented<F>;

/// A span builder used by client operations.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	span: tracing::Span,
}
impl OperationSpan {
	/// Creates a new span tagged with the provided operation kind + stage.
	pub fn new(kind: OperationKind, stage: &'static str) -> Self {
		let span = tracing::info_span!("cf_broker_client.operation", operation = kind.as_str(), stage);

		Self { span }
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOperation<Fut>
	where
		Fut: Future,
	{
		use tracing::Instrument;

		fut.instrument(self.span.clone())
	}
}
