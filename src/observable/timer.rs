use crate::{
  observable::Observable,
  observer::Observer,
  scheduler::{Duration, Scheduler},
  subscriber::Subscriber,
};

/// Emits `item` once, `delay` after subscription, then completes.
pub fn timer<Item, SD>(item: Item, delay: Duration, scheduler: SD) -> TimerOp<Item, SD>
where
  Item: Clone + Send + Sync + 'static,
  SD: Scheduler,
{
  TimerOp { item, delay, scheduler }
}

#[derive(Clone)]
pub struct TimerOp<Item, SD> {
  item: Item,
  delay: Duration,
  scheduler: SD,
}

impl<Item, SD> Observable for TimerOp<Item, SD>
where
  Item: Clone + Send + Sync + 'static,
  SD: Scheduler,
{
  type Item = Item;

  fn actual_subscribe(&self, mut subscriber: Subscriber<Item>) {
    let subscription = subscriber.subscription().clone();
    let item = self.item.clone();
    let handle = self.scheduler.schedule(
      move || {
        subscriber.next(item);
        subscriber.complete();
      },
      Some(self.delay),
    );
    subscription.add(handle);
  }
}
