//! # Events
//!
//! Every committed state change publishes exactly one event. Topics carry the
//! short event symbol and, for list and todo events, the owner address so
//! clients can subscribe per owner.
//!
//! | Topic                    | Data                 |
//! |--------------------------|----------------------|
//! | `("list_new", owner)`    | [`ListCreated`]      |
//! | `("list_del", owner)`    | [`ListDeleted`]      |
//! | `("todo_new", owner)`    | [`TodoCreated`]      |
//! | `("todo_upd", owner)`    | [`TodoUpdated`]      |
//! | `("todo_tgl", owner)`    | [`TodoToggled`]      |
//! | `("todo_del", owner)`    | [`TodoDeleted`]      |
//! | `("admin",)`             | [`AdminChanged`]     |
//! | `("limits",)`            | [`ListLimits`]       |

use soroban_sdk::{contracttype, symbol_short, Address, Env, String};

use crate::types::{ListLimits, Priority};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ListCreated {
    pub owner: Address,
    pub list_ref: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ListDeleted {
    pub owner: Address,
    pub list_ref: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TodoCreated {
    pub owner: Address,
    pub list_ref: u64,
    pub id: u64,
    pub title: String,
    pub priority: Priority,
}

/// Carries the post-update title and priority.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TodoUpdated {
    pub owner: Address,
    pub list_ref: u64,
    pub id: u64,
    pub title: String,
    pub priority: Priority,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TodoToggled {
    pub owner: Address,
    pub list_ref: u64,
    pub id: u64,
    pub completed: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TodoDeleted {
    pub owner: Address,
    pub list_ref: u64,
    pub id: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminChanged {
    pub previous: Option<Address>,
    pub current: Address,
}

pub fn list_created(env: &Env, owner: &Address, list_ref: u64) {
    env.events().publish(
        (symbol_short!("list_new"), owner.clone()),
        ListCreated {
            owner: owner.clone(),
            list_ref,
        },
    );
}

pub fn list_deleted(env: &Env, owner: &Address, list_ref: u64) {
    env.events().publish(
        (symbol_short!("list_del"), owner.clone()),
        ListDeleted {
            owner: owner.clone(),
            list_ref,
        },
    );
}

pub fn todo_created(
    env: &Env,
    owner: &Address,
    list_ref: u64,
    id: u64,
    title: String,
    priority: Priority,
) {
    env.events().publish(
        (symbol_short!("todo_new"), owner.clone()),
        TodoCreated {
            owner: owner.clone(),
            list_ref,
            id,
            title,
            priority,
        },
    );
}

pub fn todo_updated(
    env: &Env,
    owner: &Address,
    list_ref: u64,
    id: u64,
    title: String,
    priority: Priority,
) {
    env.events().publish(
        (symbol_short!("todo_upd"), owner.clone()),
        TodoUpdated {
            owner: owner.clone(),
            list_ref,
            id,
            title,
            priority,
        },
    );
}

pub fn todo_toggled(env: &Env, owner: &Address, list_ref: u64, id: u64, completed: bool) {
    env.events().publish(
        (symbol_short!("todo_tgl"), owner.clone()),
        TodoToggled {
            owner: owner.clone(),
            list_ref,
            id,
            completed,
        },
    );
}

pub fn todo_deleted(env: &Env, owner: &Address, list_ref: u64, id: u64) {
    env.events().publish(
        (symbol_short!("todo_del"), owner.clone()),
        TodoDeleted {
            owner: owner.clone(),
            list_ref,
            id,
        },
    );
}

pub fn admin_changed(env: &Env, previous: Option<Address>, current: &Address) {
    env.events().publish(
        (symbol_short!("admin"),),
        AdminChanged {
            previous,
            current: current.clone(),
        },
    );
}

pub fn limits_changed(env: &Env, limits: &ListLimits) {
    env.events()
        .publish((symbol_short!("limits"),), limits.clone());
}
