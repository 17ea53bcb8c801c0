use std::{
  future::Future,
  sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
  thread::{self, ThreadId},
};

use tokio::task::JoinHandle;

#[derive(Debug)]
struct GateState {
  open: bool,
  /// Thread running a delivery right now, if any.
  delivering: Option<ThreadId>,
}

#[derive(Debug)]
struct Shared {
  state: Mutex<GateState>,
  idle: Condvar,
}

/// Lets deliveries through until closed. Closing waits for a delivery in
/// progress on another thread, so nothing is delivered once `close`
/// returns. Closing from inside a delivery returns at once; that delivery
/// is the last one.
#[derive(Debug, Clone)]
pub(crate) struct Gate(Arc<Shared>);
impl Gate {
  fn new() -> Self {
    Self(Arc::new(Shared {
      state: Mutex::new(GateState {
        open: true,
        delivering: None,
      }),
      idle: Condvar::new(),
    }))
  }

  fn state(&self) -> MutexGuard<'_, GateState> {
    self.0.state.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Runs `deliver` unless the gate is closed. Returns whether it ran.
  pub(crate) fn pass(&self, deliver: impl FnOnce()) -> bool {
    {
      let mut state = self.state();
      if !state.open {
        return false;
      }
      state.delivering = Some(thread::current().id());
    }

    let delivery = Delivery(self);
    deliver();
    drop(delivery);
    true
  }

  fn finish_delivery(&self) {
    self.state().delivering = None;
    self.0.idle.notify_all();
  }

  fn close(&self) {
    let me = thread::current().id();
    let mut state = self.state();
    state.open = false;
    let state = self
      .0
      .idle
      .wait_while(state, |s| s.delivering.is_some_and(|at| at != me))
      .unwrap_or_else(PoisonError::into_inner);
    drop(state);
  }
}

/// Marks the end of a delivery, even one that panicked.
struct Delivery<'a>(&'a Gate);
impl Drop for Delivery<'_> {
  fn drop(&mut self) {
    self.0.finish_delivery();
  }
}

/// A running subscription chain. Dropping it unsubscribes.
#[derive(Debug)]
pub struct SubscriptionHandle {
  gate: Gate,
  task: JoinHandle<()>,
}
impl SubscriptionHandle {
  /// Spawns `run` on the runtime. Everything it hands to callers must go
  /// through the gate it is given.
  pub(crate) fn spawn<F, Fut>(run: F) -> Self
  where
    F: FnOnce(Gate) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
  {
    let gate = Gate::new();
    let task = tokio::spawn(run(gate.clone()));
    Self { gate, task }
  }

  /// Stops the chain and every store subscription it holds. Once this
  /// returns the callback is never invoked again. Calling it more than once,
  /// or from inside the callback, is harmless.
  pub fn unsubscribe(&self) {
    self.gate.close();
    self.task.abort();
  }

  /// Whether the chain has nothing left to deliver.
  #[must_use]
  pub fn is_finished(&self) -> bool {
    self.task.is_finished()
  }
}
impl Drop for SubscriptionHandle {
  fn drop(&mut self) {
    self.unsubscribe();
  }
}
