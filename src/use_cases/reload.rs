// Pending reload deadlines, polled by the world task.

use crate::domain::{PlayerId, WeaponKind};
use std::collections::BTreeMap;

type ReloadKey = (PlayerId, WeaponKind);

#[derive(Debug, Default)]
pub struct ReloadScheduler {
    pending: BTreeMap<ReloadKey, u64>,
}

impl ReloadScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when a reload for this weapon is already pending.
    pub fn schedule(&mut self, player_id: PlayerId, weapon: WeaponKind, due_ms: u64) -> bool {
        if self.pending.contains_key(&(player_id, weapon)) {
            return false;
        }
        self.pending.insert((player_id, weapon), due_ms);
        true
    }

    pub fn is_pending(&self, player_id: PlayerId, weapon: WeaponKind) -> bool {
        self.pending.contains_key(&(player_id, weapon))
    }

    pub fn cancel_player(&mut self, player_id: PlayerId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|(owner, _), _| *owner != player_id);
        before - self.pending.len()
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.values().min().copied()
    }

    /// Removes and returns every reload due at `now_ms`, earliest deadline first.
    pub fn take_due(&mut self, now_ms: u64) -> Vec<ReloadKey> {
        let mut due: Vec<(u64, ReloadKey)> = self
            .pending
            .iter()
            .filter(|&(_, &at)| at <= now_ms)
            .map(|(&key, &at)| (at, key))
            .collect();
        due.sort_unstable();

        for (_, key) in &due {
            self.pending.remove(key);
        }
        due.into_iter().map(|(_, key)| key).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
