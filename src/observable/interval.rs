use crate::{
  observable::Observable,
  observer::Observer,
  scheduler::{Duration, Instant, Scheduler},
  subscriber::Subscriber,
};

/// Creates an observable which will fire at `dur` time into the future,
/// and will repeat every `dur` interval after.
///
/// Emits an increasing counter starting at 0 and never completes on its own;
/// releasing the subscription cancels the repeating task.
pub fn interval<SD: Scheduler>(dur: Duration, scheduler: SD) -> IntervalOp<SD> {
  IntervalOp { dur, at: None, scheduler }
}

/// [`interval`] on the shared [`computation()`](crate::scheduler::computation)
/// pool.
#[cfg(feature = "futures-scheduler")]
pub fn interval_on_computation(dur: Duration) -> IntervalOp<futures::executor::ThreadPool> {
  interval(dur, crate::scheduler::computation())
}

/// Creates an observable which will fire at the time specified by `at`,
/// and then will repeat every `dur` interval after
pub fn interval_at<SD: Scheduler>(at: Instant, dur: Duration, scheduler: SD) -> IntervalOp<SD> {
  IntervalOp { dur, at: Some(at), scheduler }
}

#[derive(Clone)]
pub struct IntervalOp<SD> {
  scheduler: SD,
  dur: Duration,
  at: Option<Instant>,
}

impl<SD: Scheduler> Observable for IntervalOp<SD> {
  type Item = usize;

  fn actual_subscribe(&self, mut subscriber: Subscriber<usize>) {
    let subscription = subscriber.subscription().clone();
    let handle = self.scheduler.schedule_repeating(
      move |seq| {
        if subscriber.is_finished() {
          return false;
        }
        subscriber.next(seq);
        !subscriber.is_finished()
      },
      self.dur,
      self.at,
    );
    subscription.add(handle);
  }
}
