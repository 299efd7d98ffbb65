use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;

use crate::{Error, Result};

fn runtime_handle() -> Result<Handle> {
	if let Ok(handle) = Handle::try_current() {
		return Ok(handle);
	}

	static GLOBAL_RT: OnceLock<Option<Runtime>> = OnceLock::new();
	let runtime = GLOBAL_RT.get_or_init(|| {
		tokio::runtime::Builder::new_multi_thread()
			.enable_all()
			.worker_threads(1)
			.thread_name("jsbridge-worker-global")
			.build()
			.inspect_err(|err| tracing::error!(error = %err, "worker.runtime.build_failed"))
			.ok()
	});
	runtime.as_ref().map(|rt| rt.handle().clone()).ok_or(Error::NoRuntime)
}

/// Spawns `fut` on the ambient tokio runtime, or on a shared fallback runtime
/// when called outside one (e.g. from a platform UI thread).
pub(crate) fn spawn<F>(name: &'static str, fut: F) -> Result<JoinHandle<F::Output>>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	tracing::trace!(worker = name, "worker.spawn");
	Ok(runtime_handle()?.spawn(fut))
}
