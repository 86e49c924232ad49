extern crate std;

use soroban_sdk::{
    testutils::{Address as _, MockAuth, MockAuthInvoke},
    vec, Address, Env, IntoVal, String, Vec,
};

use crate::invariants::{assert_all_invariants, assert_signed_by};
use crate::storage::OWNER_PAGE_SIZE;
use crate::{Error, ListLimits, TodoRegistry, TodoRegistryClient};

fn setup() -> (Env, TodoRegistryClient<'static>) {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register(TodoRegistry, ());
    let client = TodoRegistryClient::new(&env, &contract_id);
    (env, client)
}

fn setup_with_init() -> (Env, TodoRegistryClient<'static>, Address) {
    let (env, client) = setup();
    let admin = Address::generate(&env);
    client.init(&admin);
    (env, client, admin)
}

fn add_todo(
    env: &Env,
    client: &TodoRegistryClient,
    owner: &Address,
    list_ref: u64,
    title: &str,
) -> u64 {
    client.create_todo(
        owner,
        &list_ref,
        &String::from_str(env, title),
        &String::from_str(env, ""),
        &1,
        &None,
    )
}

#[test]
fn test_registry_starts_empty() {
    let (env, client) = setup();
    let alice = Address::generate(&env);

    assert_eq!(client.get_owner_count(), 0);
    assert_eq!(client.list_owners(&0, &10).len(), 0);
    assert_eq!(client.get_list(&alice), None);

    let stats = client.get_aggregate_stats();
    assert_eq!(stats.total_users, 0);
    assert_eq!(stats.total_todos, 0);
    assert_eq!(stats.total_completed_todos, 0);
}

#[test]
fn test_create_list_records_owner() {
    let (env, client) = setup();
    let alice = Address::generate(&env);

    let list_ref = client.create_list(&alice);

    assert_eq!(client.get_list(&alice), Some(list_ref));
    assert_eq!(client.get_owner_count(), 1);
    assert_eq!(client.list_owners(&0, &10), vec![&env, alice.clone()]);
    assert_eq!(client.get_all_todos(&list_ref).len(), 0);
    assert_all_invariants(&client);
}

#[test]
fn test_create_list_twice_fails_already_exists() {
    let (env, client) = setup();
    let alice = Address::generate(&env);

    let list_ref = client.create_list(&alice);
    assert_eq!(client.try_create_list(&alice), Err(Ok(Error::AlreadyExists)));

    // The failed call changed nothing.
    assert_eq!(client.get_list(&alice), Some(list_ref));
    assert_eq!(client.get_owner_count(), 1);
}

#[test]
fn test_each_owner_gets_a_distinct_list() {
    let (env, client) = setup();
    let alice = Address::generate(&env);
    let bob = Address::generate(&env);
    let carol = Address::generate(&env);

    let a = client.create_list(&alice);
    let b = client.create_list(&bob);
    let c = client.create_list(&carol);

    assert_ne!(a, b);
    assert_ne!(b, c);
    assert_ne!(a, c);
    assert_eq!(client.get_owner_count(), 3);
    assert_all_invariants(&client);
}

#[test]
fn test_delete_list_without_list_fails_not_found() {
    let (env, client) = setup();
    let alice = Address::generate(&env);

    assert_eq!(client.try_delete_list(&alice), Err(Ok(Error::NotFound)));
}

#[test]
fn test_delete_list_clears_mapping_and_enumeration() {
    let (env, client) = setup();
    let alice = Address::generate(&env);

    let list_ref = client.create_list(&alice);
    add_todo(&env, &client, &alice, list_ref, "Buy milk");
    client.delete_list(&alice);

    assert_eq!(client.get_list(&alice), None);
    assert_eq!(client.get_owner_count(), 0);
    assert_eq!(client.list_owners(&0, &10).len(), 0);
    // The old reference no longer resolves.
    assert_eq!(client.try_get_all_todos(&list_ref), Err(Ok(Error::NotFound)));
    assert_eq!(client.try_get_todo(&list_ref, &1), Err(Ok(Error::NotFound)));
    assert_eq!(client.try_delete_list(&alice), Err(Ok(Error::NotFound)));
}

#[test]
fn test_recreated_list_starts_fresh() {
    let (env, client) = setup();
    let alice = Address::generate(&env);

    let first = client.create_list(&alice);
    for title in ["one", "two", "three"] {
        add_todo(&env, &client, &alice, first, title);
    }
    client.delete_list(&alice);

    let second = client.create_list(&alice);
    assert_ne!(first, second);
    assert_eq!(client.get_all_todos(&second).len(), 0);
    assert_eq!(client.get_stats(&second).total, 0);

    // Counters reset with the new instance.
    let id = add_todo(&env, &client, &alice, second, "again");
    assert_eq!(id, 1);
    assert_all_invariants(&client);
}

#[test]
fn test_delete_list_keeps_other_owners_in_order() {
    let (env, client) = setup();
    let alice = Address::generate(&env);
    let bob = Address::generate(&env);
    let carol = Address::generate(&env);

    client.create_list(&alice);
    client.create_list(&bob);
    client.create_list(&carol);
    client.delete_list(&bob);

    assert_eq!(
        client.list_owners(&0, &10),
        vec![&env, alice.clone(), carol.clone()]
    );

    // A re-created list goes to the back of the enumeration.
    client.create_list(&bob);
    assert_eq!(
        client.list_owners(&0, &10),
        vec![&env, alice.clone(), carol.clone(), bob.clone()]
    );
}

#[test]
fn test_list_owners_pagination() {
    let (env, client) = setup();
    let alice = Address::generate(&env);
    let bob = Address::generate(&env);
    let carol = Address::generate(&env);
    client.create_list(&alice);
    client.create_list(&bob);
    client.create_list(&carol);

    assert_eq!(client.list_owners(&0, &2), vec![&env, alice.clone(), bob.clone()]);
    assert_eq!(client.list_owners(&2, &2), vec![&env, carol.clone()]);
    assert_eq!(
        client.list_owners(&1, &10),
        vec![&env, bob.clone(), carol.clone()]
    );
    assert_eq!(client.list_owners(&0, &100).len(), 3);
}

#[test]
fn test_list_owners_boundaries_return_empty() {
    let (env, client) = setup();
    let alice = Address::generate(&env);
    client.create_list(&alice);

    assert_eq!(client.list_owners(&1, &5).len(), 0);
    assert_eq!(client.list_owners(&10, &5).len(), 0);
    assert_eq!(client.list_owners(&0, &0).len(), 0);
    assert_eq!(client.list_owners(&u32::MAX, &u32::MAX).len(), 0);
    assert_eq!(client.list_owners(&0, &u32::MAX), vec![&env, alice]);
}

#[test]
fn test_owner_enumeration_spans_pages() {
    let (env, client) = setup();
    let page = OWNER_PAGE_SIZE as usize;
    let mut owners: std::vec::Vec<Address> =
        (0..page * 2 + 10).map(|_| Address::generate(&env)).collect();
    for owner in &owners {
        client.create_list(owner);
    }
    let total = owners.len() as u32;
    assert_eq!(client.get_owner_count(), total);

    // A window across the first page boundary.
    assert_eq!(
        client.list_owners(&(OWNER_PAGE_SIZE - 2), &4),
        Vec::from_slice(&env, &owners[page - 2..page + 2])
    );

    // Removing an owner from the middle page keeps everyone else in order.
    let gone = owners.remove(page + 5);
    client.delete_list(&gone);
    assert_eq!(client.get_owner_count(), total - 1);
    assert_eq!(client.get_aggregate_stats().total_users, total - 1);
    assert_eq!(client.list_owners(&0, &total), Vec::from_slice(&env, &owners));
    assert_eq!(
        client.list_owners(&(OWNER_PAGE_SIZE + 3), &4),
        Vec::from_slice(&env, &owners[page + 3..page + 7])
    );

    // Re-created, the owner goes to the back of the last page.
    client.create_list(&gone);
    owners.push(gone);
    assert_eq!(
        client.list_owners(&(total - 3), &10),
        Vec::from_slice(&env, &owners[total as usize - 3..])
    );
    assert_all_invariants(&client);
}

#[test]
fn test_emptied_last_page_is_reused() {
    let (env, client) = setup();
    let mut owners: std::vec::Vec<Address> = (0..OWNER_PAGE_SIZE + 1)
        .map(|_| Address::generate(&env))
        .collect();
    for owner in &owners {
        client.create_list(owner);
    }

    // The only owner on the second page leaves, then a newcomer arrives.
    let last = owners.pop().unwrap();
    client.delete_list(&last);
    assert_eq!(client.get_owner_count(), OWNER_PAGE_SIZE);

    let newcomer = Address::generate(&env);
    client.create_list(&newcomer);
    owners.push(newcomer);
    assert_eq!(
        client.list_owners(&0, &u32::MAX),
        Vec::from_slice(&env, &owners)
    );
    assert_eq!(client.get_list(&last), None);
}

#[test]
fn test_create_and_delete_list_are_signed_by_the_owner() {
    let (env, client) = setup();
    let alice = Address::generate(&env);

    client.create_list(&alice);
    assert_signed_by(&env, &client, &alice, "create_list", (alice.clone(),).into_val(&env));

    client.delete_list(&alice);
    assert_signed_by(&env, &client, &alice, "delete_list", (alice.clone(),).into_val(&env));
}

#[test]
fn test_create_list_for_someone_else_is_rejected() {
    let (env, client) = setup();
    let alice = Address::generate(&env);
    let bob = Address::generate(&env);

    env.mock_auths(&[MockAuth {
        address: &bob,
        invoke: &MockAuthInvoke {
            contract: &client.address,
            fn_name: "create_list",
            args: (alice.clone(),).into_val(&env),
            sub_invokes: &[],
        },
    }]);
    assert!(client.try_create_list(&alice).is_err());
    assert_eq!(client.get_list(&alice), None);
    assert_eq!(client.get_owner_count(), 0);
}

#[test]
fn test_aggregate_stats_follow_every_list() {
    let (env, client) = setup();
    let alice = Address::generate(&env);
    let bob = Address::generate(&env);

    let a = client.create_list(&alice);
    let b = client.create_list(&bob);
    add_todo(&env, &client, &alice, a, "a1");
    add_todo(&env, &client, &alice, a, "a2");
    let b1 = add_todo(&env, &client, &bob, b, "b1");
    client.toggle_completion(&bob, &b, &b1);

    let stats = client.get_aggregate_stats();
    assert_eq!(stats.total_users, 2);
    assert_eq!(stats.total_todos, 3);
    assert_eq!(stats.total_completed_todos, 1);
    assert_all_invariants(&client);

    client.delete_list(&bob);
    let stats = client.get_aggregate_stats();
    assert_eq!(stats.total_users, 1);
    assert_eq!(stats.total_todos, 2);
    assert_eq!(stats.total_completed_todos, 0);
    assert_all_invariants(&client);
}

// ─────────────────────────────────────────────────────────
// Administration
// ─────────────────────────────────────────────────────────

#[test]
fn test_init_sets_admin_once() {
    let (env, client, admin) = setup_with_init();
    assert_eq!(client.admin(), Some(admin));

    let other = Address::generate(&env);
    assert_eq!(client.try_init(&other), Err(Ok(Error::AlreadyInitialized)));
}

#[test]
fn test_admin_calls_require_init() {
    let (env, client) = setup();
    let someone = Address::generate(&env);

    assert_eq!(client.admin(), None);
    assert_eq!(client.try_transfer_admin(&someone), Err(Ok(Error::NotInitialized)));
    assert_eq!(
        client.try_set_limits(&ListLimits::default()),
        Err(Ok(Error::NotInitialized))
    );
}

#[test]
fn test_transfer_admin() {
    let (env, client, _admin) = setup_with_init();
    let next = Address::generate(&env);

    client.transfer_admin(&next);
    assert_eq!(client.admin(), Some(next));
}

#[test]
fn test_default_limits() {
    let (_env, client) = setup();
    let limits = client.get_limits();
    assert_eq!(limits.max_title_length, 100);
    assert_eq!(limits.max_description_length, 500);
    assert_eq!(limits.max_todos_per_list, 50);
}

#[test]
fn test_set_limits_rejects_zero() {
    let (_env, client, _admin) = setup_with_init();
    let limits = ListLimits {
        max_title_length: 0,
        max_description_length: 500,
        max_todos_per_list: 50,
    };
    assert_eq!(client.try_set_limits(&limits), Err(Ok(Error::InvalidLimits)));
    assert_eq!(client.get_limits(), ListLimits::default());
}

#[test]
fn test_set_limits_bounds_new_todos() {
    let (env, client, _admin) = setup_with_init();
    let alice = Address::generate(&env);
    let list_ref = client.create_list(&alice);

    client.set_limits(&ListLimits {
        max_title_length: 5,
        max_description_length: 10,
        max_todos_per_list: 2,
    });

    assert_eq!(
        client.try_create_todo(
            &alice,
            &list_ref,
            &String::from_str(&env, "too long"),
            &String::from_str(&env, ""),
            &0,
            &None,
        ),
        Err(Ok(Error::TitleTooLong))
    );

    add_todo(&env, &client, &alice, list_ref, "one");
    add_todo(&env, &client, &alice, list_ref, "two");
    assert_eq!(
        client.try_create_todo(
            &alice,
            &list_ref,
            &String::from_str(&env, "three"),
            &String::from_str(&env, ""),
            &0,
            &None,
        ),
        Err(Ok(Error::ListFull))
    );
}
