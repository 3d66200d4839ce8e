//! Active-use store for pooled entities.
//!
//! Entities ask to go back to their pool by emitting a return request; the
//! request lands in an inbound queue that is drained once per tick. Parties
//! interested in departures subscribe and read notices from their own inbox,
//! and unsubscribe explicitly when they go away.

use bevy::log::warn;
use bevy::prelude::Resource;
use sk_core::Poolable;
use std::collections::{BTreeMap, VecDeque};

use crate::pool::{ReleaseOutcome, TypedObjectPool};

/// Generational handle to an entity held by a [`LiveSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LiveId {
    index: u32,
    generation: u32,
}

impl LiveId {
    pub fn index(&self) -> u32 {
        self.index
    }
}

/// Handle returned by [`LiveSet::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u32);

/// Notice delivered to subscribers when an entity left the live set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Departed<K> {
    pub id: LiveId,
    pub key: K,
    pub outcome: ReleaseOutcome,
}

/// Summary of one [`LiveSet::drain_returns`] call.
pub struct ReturnReport<T: Poolable> {
    pub queued: usize,
    pub disposed: usize,
    /// Entities whose pool refused them; the caller decides their fate.
    pub rejected: Vec<T>,
}

impl<T: Poolable> ReturnReport<T> {
    pub fn returned(&self) -> usize {
        self.queued + self.disposed
    }
}

impl<T: Poolable> Default for ReturnReport<T> {
    fn default() -> Self {
        Self {
            queued: 0,
            disposed: 0,
            rejected: Vec::new(),
        }
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Live entities of one pool category, addressed by [`LiveId`].
#[derive(Resource)]
pub struct LiveSet<T: Poolable> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
    pending: VecDeque<LiveId>,
    subscribers: BTreeMap<SubscriptionId, VecDeque<Departed<T::Key>>>,
    next_subscription: u32,
}

impl<T: Poolable> Default for LiveSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Poolable> LiveSet<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            pending: VecDeque::new(),
            subscribers: BTreeMap::new(),
            next_subscription: 0,
        }
    }

    /// Take ownership of a freshly acquired entity.
    pub fn insert(&mut self, entity: T) -> LiveId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(entity);
            return LiveId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(entity),
        });
        LiveId {
            index,
            generation: 0,
        }
    }

    /// Remove an entity without returning it to any pool.
    pub fn remove(&mut self, id: LiveId) -> Option<T> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, id: LiveId) -> Option<&T> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.value.as_ref()
    }

    pub fn get_mut(&mut self, id: LiveId) -> Option<&mut T> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.value.as_mut()
    }

    pub fn contains(&self, id: LiveId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of live entities with the given key.
    pub fn count_of(&self, key: T::Key) -> usize {
        self.iter().filter(|(_, e)| e.key() == key).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LiveId, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value.as_ref().map(|value| {
                (
                    LiveId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    value,
                )
            })
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (LiveId, &mut T)> + '_ {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.value.as_mut().map(|value| {
                (
                    LiveId {
                        index: index as u32,
                        generation,
                    },
                    value,
                )
            })
        })
    }

    pub fn ids(&self) -> Vec<LiveId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Entity-initiated return. The request is queued and served by the next
    /// [`drain_returns`](Self::drain_returns); duplicate requests are ignored.
    ///
    /// Returns `false` when the id is stale or already queued.
    pub fn request_return(&mut self, id: LiveId) -> bool {
        if !self.contains(id) || self.pending.contains(&id) {
            return false;
        }
        self.pending.push_back(id);
        true
    }

    pub fn pending_returns(&self) -> usize {
        self.pending.len()
    }

    /// Release every requested entity to `pool` in request order.
    pub fn drain_returns(&mut self, pool: &mut TypedObjectPool<T>) -> ReturnReport<T> {
        let mut report = ReturnReport::default();

        while let Some(id) = self.pending.pop_front() {
            let Some(entity) = self.remove(id) else {
                continue;
            };
            let key = entity.key();

            match pool.release(entity) {
                Ok(outcome) => {
                    match outcome {
                        ReleaseOutcome::Queued => report.queued += 1,
                        ReleaseOutcome::Disposed => report.disposed += 1,
                    }
                    self.notify(Departed { id, key, outcome });
                }
                Err(rejected) => {
                    warn!(
                        "{}: could not return {:?}: {}",
                        pool.label(),
                        id,
                        rejected.error
                    );
                    report.rejected.push(rejected.into_entity());
                }
            }
        }

        report
    }

    /// Queue every live entity for return and drain immediately.
    pub fn return_all(&mut self, pool: &mut TypedObjectPool<T>) -> ReturnReport<T> {
        for id in self.ids() {
            self.request_return(id);
        }
        self.drain_returns(pool)
    }

    /// Open an inbox for departure notices.
    pub fn subscribe(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.insert(id, VecDeque::new());
        id
    }

    /// Close an inbox. Undelivered notices are dropped.
    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        self.subscribers.remove(&subscription).is_some()
    }

    /// Take all notices delivered to `subscription` since the last call.
    pub fn take_departures(&mut self, subscription: SubscriptionId) -> Vec<Departed<T::Key>> {
        self.subscribers
            .get_mut(&subscription)
            .map(|inbox| inbox.drain(..).collect())
            .unwrap_or_default()
    }

    fn notify(&mut self, notice: Departed<T::Key>) {
        for inbox in self.subscribers.values_mut() {
            inbox.push_back(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::tests::{pool_with, token_factory, Shape, Token};

    fn live_tokens(count: usize) -> (LiveSet<Token>, TypedObjectPool<Token>, Vec<LiveId>) {
        let (mut pool, _) = pool_with(count);
        let mut live = LiveSet::new();
        let ids = (0..count)
            .map(|_| live.insert(pool.acquire(Shape::Round).unwrap()))
            .collect();
        (live, pool, ids)
    }

    #[test]
    fn stale_ids_do_not_resolve() {
        let (mut live, _pool, ids) = live_tokens(1);
        let token = live.remove(ids[0]).unwrap();
        let reused = live.insert(token);

        assert_eq!(reused.index(), ids[0].index());
        assert!(live.get(ids[0]).is_none());
        assert!(live.get(reused).is_some());
    }

    #[test]
    fn returns_are_served_on_drain_only() {
        let (mut live, mut pool, ids) = live_tokens(2);

        assert!(live.request_return(ids[0]));
        assert_eq!(live.len(), 2);
        assert_eq!(pool.active_count(Shape::Round), Some(2));

        let report = live.drain_returns(&mut pool);
        assert_eq!(report.queued, 1);
        assert_eq!(live.len(), 1);
        assert_eq!(pool.active_count(Shape::Round), Some(1));
        assert!(!live.contains(ids[0]));
    }

    #[test]
    fn duplicate_requests_release_once() {
        let (mut live, mut pool, ids) = live_tokens(1);
        assert!(live.request_return(ids[0]));
        assert!(!live.request_return(ids[0]));

        let report = live.drain_returns(&mut pool);
        assert_eq!(report.returned(), 1);
        assert_eq!(pool.available_count(Shape::Round), Some(1));
    }

    #[test]
    fn subscribers_receive_departures_until_unsubscribed() {
        let (mut live, mut pool, ids) = live_tokens(2);
        let sub = live.subscribe();

        live.request_return(ids[0]);
        live.drain_returns(&mut pool);
        let notices = live.take_departures(sub);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].id, ids[0]);
        assert_eq!(notices[0].key, Shape::Round);
        assert_eq!(notices[0].outcome, ReleaseOutcome::Queued);

        assert!(live.unsubscribe(sub));
        live.request_return(ids[1]);
        live.drain_returns(&mut pool);
        assert!(live.take_departures(sub).is_empty());
    }

    #[test]
    fn rejected_entities_are_handed_back() {
        let (mut pool, disposals) = pool_with(1);
        let mut live = LiveSet::new();
        let stray = live.insert(token_factory(disposals)(Shape::Square));

        live.request_return(stray);
        let report = live.drain_returns(&mut pool);
        assert_eq!(report.returned(), 0);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].shape, Shape::Square);
    }

    #[test]
    fn return_all_empties_the_set() {
        let (mut live, mut pool, _ids) = live_tokens(3);
        let report = live.return_all(&mut pool);
        assert_eq!(report.returned(), 3);
        assert!(live.is_empty());
        assert_eq!(pool.active_count(Shape::Round), Some(0));
    }
}
