//! Proximity clustering of a roster into tactical groups

use crate::core::config::EngagementTuning;
use crate::groups::group::UnitGroup;
use crate::units::Unit;

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra == rb {
        return;
    }
    // Lower index stays root so group order follows input order
    if ra < rb {
        parent[rb] = ra;
    } else {
        parent[ra] = rb;
    }
}

/// Split `units` into connected components of the proximity graph
///
/// Two units are linked when closer than `join_distance`. Groups come out
/// ordered by their first member in input order, members in input order.
pub fn group_units(units: &[Unit], join_distance: f32) -> Vec<Vec<Unit>> {
    let n = units.len();
    let mut parent: Vec<usize> = (0..n).collect();
    let limit = join_distance * join_distance;

    for i in 0..n {
        for j in (i + 1)..n {
            if units[i].position.distance_squared(units[j].position) <= limit {
                union(&mut parent, i, j);
            }
        }
    }

    let mut slot_of_root = vec![usize::MAX; n];
    let mut groups: Vec<Vec<Unit>> = Vec::new();
    for i in 0..n {
        let root = find(&mut parent, i);
        if slot_of_root[root] == usize::MAX {
            slot_of_root[root] = groups.len();
            groups.push(Vec::new());
        }
        groups[slot_of_root[root]].push(units[i].clone());
    }
    groups
}

/// Cluster `units` and build a `UnitGroup` per cluster
pub fn build_groups(units: &[Unit], tuning: &EngagementTuning) -> Vec<UnitGroup> {
    group_units(units, tuning.group_join_distance)
        .into_iter()
        .map(|members| UnitGroup::new(members, tuning))
        .collect()
}
