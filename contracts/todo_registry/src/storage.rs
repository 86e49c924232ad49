//! # Storage
//!
//! Provides typed helpers over Soroban's two storage tiers used by the registry:
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key           | Type         | Description                              |
//! |---------------|--------------|------------------------------------------|
//! | `Admin`       | `Address`    | Registry administrator                   |
//! | `Limits`      | `ListLimits` | Title/description/capacity bounds        |
//! | `NextListRef` | `u64`        | Last allocated list reference            |
//! | `Totals`      | `Totals`     | Running todo / completed counters        |
//! | `OwnerCount`  | `u32`        | Owners that currently hold a list        |
//! | `OwnerPages`  | `u32`        | Owner pages opened so far                |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                | Type           | Description                        |
//! |--------------------|----------------|------------------------------------|
//! | `OwnerPage(n)`     | `Vec<Address>` | Up to 64 owners in creation order  |
//! | `OwnerSlot(owner)` | `u32`          | Owner → page holding it            |
//! | `ListOf(owner)`    | `u64`          | Owner → list reference             |
//! | `List(ref)`        | `ListMeta`     | Owner, id counter and todo order   |
//! | `Todo(ref, id)`    | `Todo`         | One todo record                    |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.
//! An absent `ListOf` entry is the "no list" state; there is no zero sentinel.
//!
//! New owners are appended to the last page until it holds
//! [`OWNER_PAGE_SIZE`] entries. Removing an owner rewrites only its own page,
//! so every write stays within one bounded entry and creation order survives.
//! Pages are never merged; an emptied page is removed from storage and reads
//! back as empty.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::types::{ListLimits, ListMeta, Todo, Totals};

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

/// Instance storage: bump by 7 days when below 1 day remaining.
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

/// Persistent storage: bump by 30 days when below 7 days remaining.
const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

/// Owners stored per `OwnerPage` entry.
pub const OWNER_PAGE_SIZE: u32 = 64;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Registry administrator (Instance).
    Admin,
    /// Deployment limits (Instance).
    Limits,
    /// List reference counter (Instance).
    NextListRef,
    /// Aggregate counters (Instance).
    Totals,
    /// Live owner count (Instance).
    OwnerCount,
    /// Number of owner pages ever opened (Instance).
    OwnerPages,
    /// One page of the ordered owner enumeration (Persistent).
    OwnerPage(u32),
    /// Owner → index of the page holding it (Persistent).
    OwnerSlot(Address),
    /// Owner → list reference (Persistent).
    ListOf(Address),
    /// List instance state keyed by reference (Persistent).
    List(u64),
    /// Todo keyed by (list reference, todo id) (Persistent).
    Todo(u64, u64),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

/// Extend instance storage TTL if it falls below the threshold.
fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn get_admin(env: &Env) -> Option<Address> {
    bump_instance(env);
    env.storage().instance().get(&DataKey::Admin)
}

pub fn set_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&DataKey::Admin, admin);
    bump_instance(env);
}

/// Configured limits, or the defaults when none were ever set.
pub fn get_limits(env: &Env) -> ListLimits {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Limits)
        .unwrap_or_default()
}

pub fn set_limits(env: &Env, limits: &ListLimits) {
    env.storage().instance().set(&DataKey::Limits, limits);
    bump_instance(env);
}

/// Allocates the next list reference. References start at 1 and are never
/// handed out twice, even after the list they named is deleted.
pub fn next_list_ref(env: &Env) -> u64 {
    bump_instance(env);
    let current: u64 = env
        .storage()
        .instance()
        .get(&DataKey::NextListRef)
        .unwrap_or(0);
    let next = current + 1;
    env.storage().instance().set(&DataKey::NextListRef, &next);
    next
}

pub fn load_totals(env: &Env) -> Totals {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Totals)
        .unwrap_or_default()
}

pub fn save_totals(env: &Env, totals: &Totals) {
    env.storage().instance().set(&DataKey::Totals, totals);
    bump_instance(env);
}

pub fn owner_count(env: &Env) -> u32 {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::OwnerCount)
        .unwrap_or(0)
}

fn set_owner_count(env: &Env, count: u32) {
    env.storage().instance().set(&DataKey::OwnerCount, &count);
    bump_instance(env);
}

fn owner_page_count(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::OwnerPages)
        .unwrap_or(0)
}

// ── Persistent Storage Helpers ───────────────────────────────────────

/// Extend the TTL for a persistent storage key. The key must exist.
fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Read a persistent entry, bumping its TTL only when it exists.
fn read_persistent<V>(env: &Env, key: &DataKey) -> Option<V>
where
    V: soroban_sdk::TryFromVal<Env, soroban_sdk::Val>,
{
    let value = env.storage().persistent().get(key);
    if value.is_some() {
        bump_persistent(env, key);
    }
    value
}

fn write_persistent<V>(env: &Env, key: &DataKey, value: &V)
where
    V: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage().persistent().set(key, value);
    bump_persistent(env, key);
}

fn load_owner_page(env: &Env, page: u32) -> Vec<Address> {
    read_persistent(env, &DataKey::OwnerPage(page)).unwrap_or_else(|| Vec::new(env))
}

fn save_owner_page(env: &Env, page: u32, owners: &Vec<Address>) {
    if owners.is_empty() {
        env.storage().persistent().remove(&DataKey::OwnerPage(page));
    } else {
        write_persistent(env, &DataKey::OwnerPage(page), owners);
    }
}

/// Append `owner` to the enumeration, opening a new page when the last one
/// is full.
pub fn push_owner(env: &Env, owner: &Address) {
    let pages = owner_page_count(env);
    let (page, mut owners) = match pages.checked_sub(1) {
        Some(last) => {
            let owners = load_owner_page(env, last);
            if owners.len() < OWNER_PAGE_SIZE {
                (last, owners)
            } else {
                (pages, Vec::new(env))
            }
        }
        None => (0, Vec::new(env)),
    };
    if page == pages {
        env.storage().instance().set(&DataKey::OwnerPages, &(pages + 1));
    }

    owners.push_back(owner.clone());
    save_owner_page(env, page, &owners);
    write_persistent(env, &DataKey::OwnerSlot(owner.clone()), &page);
    set_owner_count(env, owner_count(env) + 1);
}

/// Drop `owner` from the enumeration. Unknown owners are ignored.
pub fn remove_owner(env: &Env, owner: &Address) {
    let slot = DataKey::OwnerSlot(owner.clone());
    let page: u32 = match read_persistent(env, &slot) {
        Some(page) => page,
        None => return,
    };

    let mut owners = load_owner_page(env, page);
    if let Some(index) = owners.first_index_of(owner.clone()) {
        owners.remove(index);
    }
    save_owner_page(env, page, &owners);
    env.storage().persistent().remove(&slot);
    set_owner_count(env, owner_count(env).saturating_sub(1));
}

/// Up to `limit` owners starting at `offset`, walking pages in order.
pub fn owners_from(env: &Env, offset: u32, limit: u32) -> Vec<Address> {
    let mut result = Vec::new(env);
    if limit == 0 || offset >= owner_count(env) {
        return result;
    }

    let mut skip = offset;
    for page in 0..owner_page_count(env) {
        let owners = load_owner_page(env, page);
        if skip >= owners.len() {
            skip -= owners.len();
            continue;
        }
        for owner in owners.iter().skip(skip as usize) {
            result.push_back(owner);
            if result.len() == limit {
                return result;
            }
        }
        skip = 0;
    }
    result
}

pub fn get_list_of(env: &Env, owner: &Address) -> Option<u64> {
    read_persistent(env, &DataKey::ListOf(owner.clone()))
}

pub fn set_list_of(env: &Env, owner: &Address, list_ref: u64) {
    write_persistent(env, &DataKey::ListOf(owner.clone()), &list_ref);
}

pub fn remove_list_of(env: &Env, owner: &Address) {
    env.storage()
        .persistent()
        .remove(&DataKey::ListOf(owner.clone()));
}

pub fn load_list(env: &Env, list_ref: u64) -> Option<ListMeta> {
    read_persistent(env, &DataKey::List(list_ref))
}

pub fn save_list(env: &Env, list_ref: u64, meta: &ListMeta) {
    write_persistent(env, &DataKey::List(list_ref), meta);
}

pub fn remove_list(env: &Env, list_ref: u64) {
    env.storage().persistent().remove(&DataKey::List(list_ref));
}

pub fn load_todo(env: &Env, list_ref: u64, id: u64) -> Option<Todo> {
    read_persistent(env, &DataKey::Todo(list_ref, id))
}

pub fn save_todo(env: &Env, list_ref: u64, todo: &Todo) {
    write_persistent(env, &DataKey::Todo(list_ref, todo.id), todo);
}

pub fn remove_todo(env: &Env, list_ref: u64, id: u64) {
    env.storage().persistent().remove(&DataKey::Todo(list_ref, id));
}
