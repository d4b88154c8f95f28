//! In-flight call deduplication
//!
//! Concurrent calls that share a key share one execution: the first caller's
//! future runs, every caller awaits the same shared result, and the key is
//! released when the call settles no matter which caller observed it first.
//!
//! The key is computed by the caller and should embed whatever identifies the
//! logical request (owning instance, method, serialized arguments).

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

struct Flight<T: Clone> {
	generation: u64,
	shared: Shared<BoxFuture<'static, T>>,
}

pub struct SingleFlight<K, T>
where
	K: Eq + Hash + Clone,
	T: Clone,
{
	inflight: Mutex<HashMap<K, Flight<T>>>,
	generations: AtomicU64,
}

impl<K, T> Default for SingleFlight<K, T>
where
	K: Eq + Hash + Clone,
	T: Clone + Send + Sync + 'static,
{
	fn default() -> Self {
		Self::new()
	}
}

impl<K, T> SingleFlight<K, T>
where
	K: Eq + Hash + Clone,
	T: Clone + Send + Sync + 'static,
{
	pub fn new() -> Self {
		Self {
			inflight: Mutex::new(HashMap::new()),
			generations: AtomicU64::new(0),
		}
	}

	/// Join the in-flight call for `key`, or start one by invoking `make`.
	///
	/// Errors fan out to every waiter the same as values do; wrap them in
	/// `Arc` when the error type itself is not `Clone`.
	pub async fn run<F, Fut>(&self, key: K, make: F) -> T
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = T> + Send + 'static,
	{
		let (shared, generation) = {
			let mut inflight = self.inflight.lock().expect("single-flight lock poisoned");
			if let Some(flight) = inflight.get(&key) {
				(flight.shared.clone(), flight.generation)
			} else {
				let generation = self.generations.fetch_add(1, Ordering::Relaxed);
				let shared = make().boxed().shared();
				inflight.insert(
					key.clone(),
					Flight {
						generation,
						shared: shared.clone(),
					},
				);
				(shared, generation)
			}
		};

		let result = shared.await;

		// Release the key once settled. The generation check keeps a caller
		// that settled late from evicting a newer flight under the same key.
		let mut inflight = self.inflight.lock().expect("single-flight lock poisoned");
		if inflight.get(&key).is_some_and(|flight| flight.generation == generation) {
			inflight.remove(&key);
		}

		result
	}

	/// Number of currently in-flight keys.
	pub fn len(&self) -> usize {
		self.inflight.lock().expect("single-flight lock poisoned").len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::AtomicUsize;
	use std::sync::Arc;
	use std::time::Duration;

	#[tokio::test]
	async fn concurrent_calls_share_one_invocation() {
		let flight = Arc::new(SingleFlight::<&'static str, u32>::new());
		let calls = Arc::new(AtomicUsize::new(0));

		let (a, b) = tokio::join!(
			flight.run("balance", {
				let calls = calls.clone();
				move || async move {
					calls.fetch_add(1, Ordering::SeqCst);
					tokio::time::sleep(Duration::from_millis(10)).await;
					7
				}
			}),
			flight.run("balance", {
				let calls = calls.clone();
				move || async move {
					calls.fetch_add(1, Ordering::SeqCst);
					tokio::time::sleep(Duration::from_millis(10)).await;
					7
				}
			}),
		);

		assert_eq!((a, b), (7, 7));
		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert!(flight.is_empty());
	}

	#[tokio::test]
	async fn distinct_keys_run_independently() {
		let flight = Arc::new(SingleFlight::<u8, u8>::new());
		let calls = Arc::new(AtomicUsize::new(0));

		let run = |key: u8| {
			let flight = flight.clone();
			let calls = calls.clone();
			async move {
				flight
					.run(key, move || async move {
						calls.fetch_add(1, Ordering::SeqCst);
						key
					})
					.await
			}
		};

		let (a, b) = tokio::join!(run(1), run(2));
		assert_eq!((a, b), (1, 2));
		assert_eq!(calls.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn key_is_released_after_settling() {
		let flight = SingleFlight::<&'static str, u32>::new();
		let first = flight.run("k", || async { 1 }).await;
		let second = flight.run("k", || async { 2 }).await;
		assert_eq!((first, second), (1, 2));
	}

	#[tokio::test]
	async fn failures_fan_out_to_every_waiter() {
		let flight = Arc::new(SingleFlight::<&'static str, Result<u32, Arc<String>>>::new());
		let calls = Arc::new(AtomicUsize::new(0));

		let run = || {
			let flight = flight.clone();
			let calls = calls.clone();
			async move {
				flight
					.run("fails", move || async move {
						calls.fetch_add(1, Ordering::SeqCst);
						tokio::time::sleep(Duration::from_millis(5)).await;
						Err(Arc::new("boom".to_string()))
					})
					.await
			}
		};

		let (a, b) = tokio::join!(run(), run());
		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert_eq!(a.unwrap_err().as_str(), "boom");
		assert_eq!(b.unwrap_err().as_str(), "boom");
	}
}
