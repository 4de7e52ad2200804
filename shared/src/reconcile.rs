//! Planning half of the leaderboard reconciler.
//!
//! The client owns the DOM; this module only decides what has to happen to it.
//! Keeping the decisions pure lets the identity rules be tested without a browser.

use std::collections::HashSet;

use crate::agent::AgentRecord;

pub const PODIUM_SLOTS: usize = 3;

/// Split rank-ordered records into the podium (top three) and the list (rank 4+).
pub fn split_podium(records: &[AgentRecord]) -> (&[AgentRecord], &[AgentRecord]) {
    records.split_at(records.len().min(PODIUM_SLOTS))
}

#[derive(Debug, Clone, PartialEq)]
pub struct PodiumPlan<'a> {
    /// Slot 0 is first place. `None` renders the slot empty.
    pub slots: [Option<&'a AgentRecord>; PODIUM_SLOTS],
    /// The identity in first place changed since the last cycle.
    pub crown_changed: bool,
}

impl PodiumPlan<'_> {
    pub fn top_id(&self) -> Option<&str> {
        self.slots[0].map(|record| record.id.as_str())
    }
}

/// `previous_top` is the id that held first place on screen before this cycle.
/// A first render (nothing on screen yet) does not count as a crown change.
pub fn plan_podium<'a>(previous_top: Option<&str>, records: &'a [AgentRecord]) -> PodiumPlan<'a> {
    let (podium, _) = split_podium(records);
    let mut slots = [None; PODIUM_SLOTS];
    for (slot, record) in slots.iter_mut().zip(podium) {
        *slot = Some(record);
    }

    let crown_changed = match (previous_top, slots[0]) {
        (Some(prev), Some(top)) => prev != top.id,
        _ => false,
    };

    PodiumPlan {
        slots,
        crown_changed,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    /// An element is already bound to this id; update it in place.
    Reuse,
    /// No element for this id yet.
    Create,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowStep<'a> {
    pub record: &'a AgentRecord,
    pub action: RowAction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListPlan<'a> {
    /// Target rows in final on-screen order.
    pub rows: Vec<RowStep<'a>>,
    /// Bound ids with no record this cycle.
    pub removed: Vec<String>,
    /// The container's child order differs from the target order.
    pub reordered: bool,
}

impl ListPlan<'_> {
    pub fn is_noop(&self) -> bool {
        !self.reordered
            && self.removed.is_empty()
            && self.rows.iter().all(|step| step.action == RowAction::Reuse)
    }

    pub fn created(&self) -> impl Iterator<Item = &AgentRecord> {
        self.rows
            .iter()
            .filter(|step| step.action == RowAction::Create)
            .map(|step| step.record)
    }
}

/// Match list records against the ids currently bound on screen (in DOM order).
pub fn plan_list<'a>(bound: &[String], records: &'a [AgentRecord]) -> ListPlan<'a> {
    let bound_set: HashSet<&str> = bound.iter().map(String::as_str).collect();
    let next_set: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();

    let rows: Vec<RowStep<'a>> = records
        .iter()
        .map(|record| RowStep {
            record,
            action: if bound_set.contains(record.id.as_str()) {
                RowAction::Reuse
            } else {
                RowAction::Create
            },
        })
        .collect();

    let removed: Vec<String> = bound
        .iter()
        .filter(|id| !next_set.contains(id.as_str()))
        .cloned()
        .collect();

    let surviving = bound.iter().filter(|id| next_set.contains(id.as_str()));
    let reordered = !surviving
        .map(String::as_str)
        .eq(records.iter().map(|r| r.id.as_str()));

    ListPlan {
        rows,
        removed,
        reordered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(id: &str, rank: u32) -> AgentRecord {
        AgentRecord {
            id: id.to_string(),
            rank,
            name: id.to_uppercase(),
            team: String::new(),
            avatar_url: String::new(),
            amount: 100.0 * rank as f64,
            sales: rank as u64,
        }
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn podium_fills_missing_slots_with_none() {
        let records = vec![agent("a", 1)];
        let plan = plan_podium(None, &records);
        assert_eq!(plan.top_id(), Some("a"));
        assert!(plan.slots[1].is_none());
        assert!(plan.slots[2].is_none());
        assert!(!plan.crown_changed);
    }

    #[test]
    fn podium_swap_moves_records_between_slots() {
        let records = vec![agent("b", 1), agent("a", 2), agent("c", 3)];
        let plan = plan_podium(Some("a"), &records);
        assert_eq!(plan.slots[1].map(|r| r.id.as_str()), Some("a"));
        assert!(plan.crown_changed);
    }

    #[test]
    fn crown_unchanged_when_same_leader() {
        let records = vec![agent("a", 1), agent("b", 2)];
        assert!(!plan_podium(Some("a"), &records).crown_changed);
        assert!(!plan_podium(Some("a"), &[]).crown_changed);
    }

    #[test]
    fn split_keeps_rank_four_onwards_for_list() {
        let records: Vec<_> = (1..=5).map(|r| agent(&format!("x{r}"), r)).collect();
        let (podium, list) = split_podium(&records);
        assert_eq!(podium.len(), 3);
        assert_eq!(list.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![4, 5]);
        let (podium, list) = split_podium(&records[..2]);
        assert_eq!(podium.len(), 2);
        assert!(list.is_empty());
    }

    #[test]
    fn swap_reuses_bindings_and_flags_reorder() {
        let next = vec![agent("b", 1), agent("a", 2), agent("c", 3)];
        let plan = plan_list(&ids(&["a", "b", "c"]), &next);
        assert!(plan.rows.iter().all(|s| s.action == RowAction::Reuse));
        assert_eq!(plan.rows[1].record.id, "a");
        assert!(plan.removed.is_empty());
        assert!(plan.reordered);
    }

    #[test]
    fn new_and_vanished_ids_are_planned() {
        let next = vec![agent("a", 4), agent("d", 5)];
        let plan = plan_list(&ids(&["a", "b"]), &next);
        assert_eq!(plan.rows[0].action, RowAction::Reuse);
        assert_eq!(plan.rows[1].action, RowAction::Create);
        assert_eq!(plan.removed, ids(&["b"]));
        assert_eq!(plan.created().map(|r| r.id.as_str()).collect::<Vec<_>>(), vec!["d"]);
        assert!(plan.reordered);
    }

    #[test]
    fn removal_alone_does_not_reorder() {
        let next = vec![agent("a", 4), agent("c", 5)];
        let plan = plan_list(&ids(&["a", "b", "c"]), &next);
        assert_eq!(plan.removed, ids(&["b"]));
        assert!(!plan.reordered);
    }

    #[test]
    fn identical_list_is_noop() {
        let next = vec![agent("a", 4), agent("b", 5)];
        let plan = plan_list(&ids(&["a", "b"]), &next);
        assert!(plan.is_noop());
    }

    #[test]
    fn empty_records_remove_everything() {
        let plan = plan_list(&ids(&["a", "b"]), &[]);
        assert!(plan.rows.is_empty());
        assert_eq!(plan.removed, ids(&["a", "b"]));
        assert!(!plan.reordered);
    }
}
