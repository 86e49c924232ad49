#![allow(dead_code)]

extern crate std;

use std::collections::BTreeSet;

use soroban_sdk::testutils::{AuthorizedFunction, AuthorizedInvocation};
use soroban_sdk::{Address, Env, Symbol, Val, Vec};

use crate::{Todo, TodoRegistryClient, TodoStats};

/// The last invocation was authorized by `signer` alone, for exactly
/// `fn_name` on the registry with `args`.
pub fn assert_signed_by(
    env: &Env,
    client: &TodoRegistryClient,
    signer: &Address,
    fn_name: &str,
    args: Vec<Val>,
) {
    assert_eq!(
        env.auths(),
        std::vec![(
            signer.clone(),
            AuthorizedInvocation {
                function: AuthorizedFunction::Contract((
                    client.address.clone(),
                    Symbol::new(env, fn_name),
                    args,
                )),
                sub_invocations: std::vec![],
            }
        )]
    );
}

/// `completed + pending == total` and high-priority pending never exceeds pending.
pub fn assert_stats_consistent(stats: &TodoStats) {
    assert_eq!(
        stats.completed + stats.pending,
        stats.total,
        "stats out of balance: {} completed + {} pending != {} total",
        stats.completed,
        stats.pending,
        stats.total
    );
    assert!(
        stats.high_priority_pending <= stats.pending,
        "high priority pending ({}) exceeds pending ({})",
        stats.high_priority_pending,
        stats.pending
    );
}

/// Stats must be a recount of the todos they describe.
pub fn assert_stats_match_todos(stats: &TodoStats, todos: &Vec<Todo>) {
    let completed = todos.iter().filter(|t| t.completed).count() as u32;
    let high = todos
        .iter()
        .filter(|t| !t.completed && t.priority == crate::Priority::High)
        .count() as u32;
    assert_eq!(stats.total, todos.len(), "total does not match todo count");
    assert_eq!(stats.completed, completed, "completed does not match recount");
    assert_eq!(stats.high_priority_pending, high, "high priority pending does not match recount");
}

/// Enumeration order is insertion order, so ids must be strictly increasing.
pub fn assert_ids_strictly_increasing(todos: &Vec<Todo>) {
    let mut previous = 0u64;
    for todo in todos.iter() {
        assert!(
            todo.id > previous,
            "todo id {} does not follow {}",
            todo.id,
            previous
        );
        previous = todo.id;
    }
}

/// `completed_at` is present exactly while the todo is completed.
pub fn assert_completion_timestamps(todo: &Todo) {
    assert_eq!(
        todo.completed,
        todo.completed_at.is_some(),
        "todo {} has completed={} but completed_at={:?}",
        todo.id,
        todo.completed,
        todo.completed_at
    );
    assert!(
        todo.updated_at >= todo.created_at,
        "todo {} was updated before it was created",
        todo.id
    );
}

/// Every enumerated owner maps to exactly one live list, and no two owners
/// share a reference.
pub fn assert_one_list_per_owner(client: &TodoRegistryClient) {
    let count = client.get_owner_count();
    let owners = client.list_owners(&0, &count);
    let mut refs = BTreeSet::new();
    for owner in owners.iter() {
        let list_ref = client
            .get_list(&owner)
            .expect("enumerated owner has no list");
        assert!(refs.insert(list_ref), "list reference {} shared", list_ref);
    }
    assert_eq!(refs.len() as u32, count);
}

/// The incrementally maintained aggregate equals a full recount.
pub fn assert_aggregate_matches_recount(client: &TodoRegistryClient) {
    let count = client.get_owner_count();
    let owners = client.list_owners(&0, &count);
    let mut todos = 0u64;
    let mut completed = 0u64;
    for owner in owners.iter() {
        let list_ref = client.get_list(&owner).expect("owner without list");
        let stats = client.get_stats(&list_ref);
        todos += stats.total as u64;
        completed += stats.completed as u64;
    }

    let aggregate = client.get_aggregate_stats();
    assert_eq!(aggregate.total_users, count, "total_users drifted");
    assert_eq!(aggregate.total_todos, todos, "total_todos drifted");
    assert_eq!(
        aggregate.total_completed_todos, completed,
        "total_completed_todos drifted"
    );
}

/// Run every list-level invariant against one list.
pub fn assert_list_invariants(client: &TodoRegistryClient, list_ref: u64) {
    let todos = client.get_all_todos(&list_ref);
    let stats = client.get_stats(&list_ref);
    assert_stats_consistent(&stats);
    assert_stats_match_todos(&stats, &todos);
    assert_ids_strictly_increasing(&todos);
    for todo in todos.iter() {
        assert_completion_timestamps(&todo);
    }
    assert!(stats.total <= client.get_limits().max_todos_per_list);
}

/// Run every registry-level and list-level invariant.
pub fn assert_all_invariants(client: &TodoRegistryClient) {
    assert_one_list_per_owner(client);
    assert_aggregate_matches_recount(client);
    let count = client.get_owner_count();
    for owner in client.list_owners(&0, &count).iter() {
        if let Some(list_ref) = client.get_list(&owner) {
            assert_list_invariants(client, list_ref);
        }
    }
}
