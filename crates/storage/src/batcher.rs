//! Debounce-and-accumulate batching
//!
//! Wraps an async operation with a quiet window and an argument-merging
//! function. Calls landing inside the window merge their arguments into one
//! accumulator and share a single pending result; once the window elapses
//! with no new calls the operation runs exactly once with the merged
//! arguments. Calls arriving after the flush started open a fresh batch.

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

type MergeFn<A> = dyn Fn(Option<A>, A) -> A + Send + Sync;
type RunFn<A, T> = dyn Fn(A) -> BoxFuture<'static, T> + Send + Sync;

struct BatchState<A> {
	args: Option<A>,
	deadline: Instant,
}

struct PendingBatch<A, T: Clone> {
	state: Arc<Mutex<BatchState<A>>>,
	shared: Shared<BoxFuture<'static, T>>,
}

pub struct Batcher<A, T>
where
	A: Send + 'static,
	T: Clone + Send + Sync + 'static,
{
	window: Duration,
	merge: Arc<MergeFn<A>>,
	run: Arc<RunFn<A, T>>,
	pending: Arc<Mutex<Option<PendingBatch<A, T>>>>,
}

impl<A, T> Batcher<A, T>
where
	A: Send + 'static,
	T: Clone + Send + Sync + 'static,
{
	pub fn new(
		window: Duration,
		merge: impl Fn(Option<A>, A) -> A + Send + Sync + 'static,
		run: impl Fn(A) -> BoxFuture<'static, T> + Send + Sync + 'static,
	) -> Self {
		Self {
			window,
			merge: Arc::new(merge),
			run: Arc::new(run),
			pending: Arc::new(Mutex::new(None)),
		}
	}

	/// Merge `args` into the pending batch (opening one if needed) and await
	/// the batch result.
	pub async fn call(&self, args: A) -> T {
		let shared = {
			let mut pending = self.pending.lock().expect("batcher lock poisoned");
			match pending.as_ref() {
				Some(batch) => {
					let mut state = batch.state.lock().expect("batcher lock poisoned");
					state.args = Some((self.merge)(state.args.take(), args));
					state.deadline = Instant::now() + self.window;
					drop(state);
					batch.shared.clone()
				}
				None => {
					let state = Arc::new(Mutex::new(BatchState {
						args: Some((self.merge)(None, args)),
						deadline: Instant::now() + self.window,
					}));
					let shared =
						Self::drive(state.clone(), self.run.clone(), self.pending.clone())
							.boxed()
							.shared();
					*pending = Some(PendingBatch {
						state,
						shared: shared.clone(),
					});
					shared
				}
			}
		};

		shared.await
	}

	/// Waits out the quiet window (re-sleeping whenever a merge pushed the
	/// deadline), detaches the batch so later calls start fresh, then runs
	/// the operation once with the merged arguments.
	async fn drive(
		state: Arc<Mutex<BatchState<A>>>,
		run: Arc<RunFn<A, T>>,
		pending: Arc<Mutex<Option<PendingBatch<A, T>>>>,
	) -> T {
		loop {
			let deadline = state.lock().expect("batcher lock poisoned").deadline;
			if Instant::now() >= deadline {
				break;
			}
			tokio::time::sleep_until(deadline).await;
		}

		let args = {
			let mut pending = pending.lock().expect("batcher lock poisoned");
			let args = state.lock().expect("batcher lock poisoned").args.take();
			*pending = None;
			args.expect("batch flushed without arguments")
		};

		run(args).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::BTreeSet;
	use std::sync::atomic::{AtomicUsize, Ordering};

	fn union_batcher(
		calls: Arc<AtomicUsize>,
	) -> Batcher<BTreeSet<&'static str>, BTreeSet<&'static str>> {
		Batcher::new(
			Duration::from_millis(50),
			|acc: Option<BTreeSet<&'static str>>, next| {
				let mut merged = acc.unwrap_or_default();
				merged.extend(next);
				merged
			},
			move |args| {
				let calls = calls.clone();
				async move {
					calls.fetch_add(1, Ordering::SeqCst);
					args
				}
				.boxed()
			},
		)
	}

	#[tokio::test(start_paused = true)]
	async fn calls_within_window_merge_into_one_invocation() {
		let calls = Arc::new(AtomicUsize::new(0));
		let batcher = Arc::new(union_batcher(calls.clone()));

		let (a, b) = tokio::join!(
			batcher.call(BTreeSet::from(["alice"])),
			batcher.call(BTreeSet::from(["bob"])),
		);

		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert_eq!(a, BTreeSet::from(["alice", "bob"]));
		assert_eq!(b, a);
	}

	#[tokio::test(start_paused = true)]
	async fn flushed_batches_do_not_absorb_later_calls() {
		let calls = Arc::new(AtomicUsize::new(0));
		let batcher = Arc::new(union_batcher(calls.clone()));

		let first = batcher.call(BTreeSet::from(["alice"])).await;
		let second = batcher.call(BTreeSet::from(["bob"])).await;

		assert_eq!(calls.load(Ordering::SeqCst), 2);
		assert_eq!(first, BTreeSet::from(["alice"]));
		assert_eq!(second, BTreeSet::from(["bob"]));
	}
}
