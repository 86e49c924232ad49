//! # Todo Registry Contract
//!
//! Single Soroban contract `TodoRegistry` that acts both as the per-owner list
//! factory and as the host of every list instance it creates.
//!
//! | Phase        | Entry Point(s)                                                   |
//! |--------------|------------------------------------------------------------------|
//! | Bootstrap    | [`TodoRegistry::init`]                                           |
//! | Admin        | `transfer_admin`, `set_limits`                                   |
//! | Registry     | `create_list`, `delete_list`                                     |
//! | List         | `create_todo`, `update_todo`, `toggle_completion`, `delete_todo` |
//! | Queries      | `get_list`, `get_owner_count`, `list_owners`,                    |
//! |              | `get_aggregate_stats`, `get_todo`, `get_all_todos`, `get_stats`, |
//! |              | `get_limits`, `admin`                                            |
//!
//! ## Architecture
//!
//! Input rules (lengths, priority codes, due dates, capacity) come from the
//! shared `todo_rules` crate so the off-chain ledger rejects exactly the same
//! inputs. Storage access is fully delegated to [`storage`], event shapes to
//! [`events`]. Every entry point checks all preconditions before its first
//! write, and every write path ends with one event.
//!
//! Reads are public. Every list mutation requires the caller's signature and
//! that the caller owns the addressed list.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, Address, Env, String, Vec};
use todo_rules::{Limits, PatchDraft, RuleError, Tally, TodoDraft};

mod events;
mod storage;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_registry;

pub use events::{
    AdminChanged, ListCreated, ListDeleted, TodoCreated, TodoDeleted, TodoToggled, TodoUpdated,
};
pub use types::{AggregateStats, ListLimits, ListMeta, Priority, Todo, TodoPatch, TodoStats};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyExists      = 1,
    NotFound           = 2,
    Unauthorized       = 3,
    EmptyTitle         = 4,
    TitleTooLong       = 5,
    DescriptionTooLong = 6,
    InvalidPriority    = 7,
    DueDateInPast      = 8,
    ListFull           = 9,
    AlreadyInitialized = 10,
    NotInitialized     = 11,
    InvalidLimits      = 12,
}

impl From<RuleError> for Error {
    fn from(e: RuleError) -> Self {
        match e {
            RuleError::EmptyTitle => Error::EmptyTitle,
            RuleError::TitleTooLong => Error::TitleTooLong,
            RuleError::DescriptionTooLong => Error::DescriptionTooLong,
            RuleError::InvalidPriority => Error::InvalidPriority,
            RuleError::DueDateInPast => Error::DueDateInPast,
            RuleError::ListFull => Error::ListFull,
            RuleError::InvalidLimits => Error::InvalidLimits,
        }
    }
}

#[contract]
pub struct TodoRegistry;

#[contractimpl]
impl TodoRegistry {
    // ─────────────────────────────────────────────────────────
    // Administration
    // ─────────────────────────────────────────────────────────

    /// Set the registry administrator.
    ///
    /// Callable once; subsequent calls fail with `Error::AlreadyInitialized`.
    /// List operations do not depend on it and work before `init` with the
    /// default limits.
    pub fn init(env: Env, admin: Address) -> Result<(), Error> {
        admin.require_auth();
        if storage::get_admin(&env).is_some() {
            return Err(Error::AlreadyInitialized);
        }
        storage::set_admin(&env, &admin);
        events::admin_changed(&env, None, &admin);
        Ok(())
    }

    pub fn admin(env: Env) -> Option<Address> {
        storage::get_admin(&env)
    }

    /// Hand the admin role to `new_admin`. Both parties must sign.
    pub fn transfer_admin(env: Env, new_admin: Address) -> Result<(), Error> {
        let current = storage::get_admin(&env).ok_or(Error::NotInitialized)?;
        current.require_auth();
        new_admin.require_auth();
        storage::set_admin(&env, &new_admin);
        events::admin_changed(&env, Some(current), &new_admin);
        Ok(())
    }

    /// Replace the deployment limits.
    ///
    /// Lowering `max_todos_per_list` below a list's current size keeps the
    /// existing todos; that list just cannot grow until it shrinks below the
    /// new bound.
    pub fn set_limits(env: Env, limits: ListLimits) -> Result<(), Error> {
        let admin = storage::get_admin(&env).ok_or(Error::NotInitialized)?;
        admin.require_auth();
        Limits::from(&limits).validate()?;
        storage::set_limits(&env, &limits);
        events::limits_changed(&env, &limits);
        Ok(())
    }

    pub fn get_limits(env: Env) -> ListLimits {
        storage::get_limits(&env)
    }

    // ─────────────────────────────────────────────────────────
    // Registry
    // ─────────────────────────────────────────────────────────

    /// Create the caller's list and return its reference.
    ///
    /// Fails with `Error::AlreadyExists` while the caller still owns a list.
    pub fn create_list(env: Env, caller: Address) -> Result<u64, Error> {
        caller.require_auth();
        if storage::get_list_of(&env, &caller).is_some() {
            return Err(Error::AlreadyExists);
        }

        let list_ref = storage::next_list_ref(&env);
        let meta = ListMeta {
            owner: caller.clone(),
            next_id: 1,
            todo_ids: Vec::new(&env),
        };
        storage::save_list(&env, list_ref, &meta);
        storage::set_list_of(&env, &caller, list_ref);

        storage::push_owner(&env, &caller);

        events::list_created(&env, &caller, list_ref);
        Ok(list_ref)
    }

    /// Detach the caller's list from the registry and reclaim its storage.
    ///
    /// The caller may call `create_list` again afterwards and receives a new,
    /// empty list under a new reference.
    pub fn delete_list(env: Env, caller: Address) -> Result<(), Error> {
        caller.require_auth();
        let list_ref = storage::get_list_of(&env, &caller).ok_or(Error::NotFound)?;

        let mut totals = storage::load_totals(&env);
        if let Some(meta) = storage::load_list(&env, list_ref) {
            for id in meta.todo_ids.iter() {
                if let Some(todo) = storage::load_todo(&env, list_ref, id) {
                    totals.todos -= 1;
                    if todo.completed {
                        totals.completed -= 1;
                    }
                    storage::remove_todo(&env, list_ref, id);
                }
            }
            storage::remove_list(&env, list_ref);
        }
        storage::save_totals(&env, &totals);
        storage::remove_list_of(&env, &caller);

        storage::remove_owner(&env, &caller);

        events::list_deleted(&env, &caller, list_ref);
        Ok(())
    }

    /// The list reference owned by `owner`, or `None`.
    pub fn get_list(env: Env, owner: Address) -> Option<u64> {
        storage::get_list_of(&env, &owner)
    }

    pub fn get_owner_count(env: Env) -> u32 {
        storage::owner_count(&env)
    }

    /// Up to `limit` owners starting at `offset`, in list-creation order.
    pub fn list_owners(env: Env, offset: u32, limit: u32) -> Vec<Address> {
        storage::owners_from(&env, offset, limit)
    }

    pub fn get_aggregate_stats(env: Env) -> AggregateStats {
        let totals = storage::load_totals(&env);
        AggregateStats {
            total_users: storage::owner_count(&env),
            total_todos: totals.todos,
            total_completed_todos: totals.completed,
        }
    }

    // ─────────────────────────────────────────────────────────
    // List mutations (owner only)
    // ─────────────────────────────────────────────────────────

    /// Append a todo to the list and return its id.
    pub fn create_todo(
        env: Env,
        caller: Address,
        list_ref: u64,
        title: String,
        description: String,
        priority: u32,
        due_date: Option<u64>,
    ) -> Result<u64, Error> {
        let mut meta = require_owner(&env, &caller, list_ref)?;
        let limits = Limits::from(&storage::get_limits(&env));
        let now = env.ledger().timestamp();

        let draft = TodoDraft {
            title_len: title.len(),
            description_len: description.len(),
            priority,
            due_date,
        };
        let priority: Priority = limits.check_draft(&draft, now)?.into();
        limits.check_capacity(meta.todo_ids.len())?;

        let id = meta.next_id;
        meta.next_id += 1;
        meta.todo_ids.push_back(id);

        let todo = Todo {
            id,
            title: title.clone(),
            description,
            priority,
            completed: false,
            created_at: now,
            updated_at: now,
            completed_at: None,
            due_date,
        };
        storage::save_todo(&env, list_ref, &todo);
        storage::save_list(&env, list_ref, &meta);

        let mut totals = storage::load_totals(&env);
        totals.todos += 1;
        storage::save_totals(&env, &totals);

        events::todo_created(&env, &caller, list_ref, id, title, priority);
        Ok(id)
    }

    /// Apply `patch` to todo `id`. Fields left as `None` are not touched.
    pub fn update_todo(
        env: Env,
        caller: Address,
        list_ref: u64,
        id: u64,
        patch: TodoPatch,
    ) -> Result<(), Error> {
        require_owner(&env, &caller, list_ref)?;
        let mut todo = storage::load_todo(&env, list_ref, id).ok_or(Error::NotFound)?;
        let limits = Limits::from(&storage::get_limits(&env));
        let now = env.ledger().timestamp();

        let draft = PatchDraft {
            title_len: patch.title.as_ref().map(|t| t.len()),
            description_len: patch.description.as_ref().map(|d| d.len()),
            priority: patch.priority,
            due_date: patch.due_date,
        };
        let priority = limits.check_patch(&draft, now)?;

        if let Some(title) = patch.title {
            todo.title = title;
        }
        if let Some(description) = patch.description {
            todo.description = description;
        }
        if let Some(priority) = priority {
            todo.priority = priority.into();
        }
        if let Some(due) = patch.due_date {
            todo.due_date = Some(due);
        }
        todo.updated_at = now;
        storage::save_todo(&env, list_ref, &todo);

        events::todo_updated(&env, &caller, list_ref, id, todo.title, todo.priority);
        Ok(())
    }

    /// Flip the completion flag of todo `id` and return the new state.
    pub fn toggle_completion(
        env: Env,
        caller: Address,
        list_ref: u64,
        id: u64,
    ) -> Result<bool, Error> {
        require_owner(&env, &caller, list_ref)?;
        let mut todo = storage::load_todo(&env, list_ref, id).ok_or(Error::NotFound)?;
        let now = env.ledger().timestamp();

        todo.completed = !todo.completed;
        todo.completed_at = if todo.completed { Some(now) } else { None };
        todo.updated_at = now;
        storage::save_todo(&env, list_ref, &todo);

        let mut totals = storage::load_totals(&env);
        if todo.completed {
            totals.completed += 1;
        } else {
            totals.completed -= 1;
        }
        storage::save_totals(&env, &totals);

        events::todo_toggled(&env, &caller, list_ref, id, todo.completed);
        Ok(todo.completed)
    }

    /// Remove todo `id`. The remaining todos keep their ids and order.
    pub fn delete_todo(env: Env, caller: Address, list_ref: u64, id: u64) -> Result<(), Error> {
        let mut meta = require_owner(&env, &caller, list_ref)?;
        let index = meta.todo_ids.first_index_of(id).ok_or(Error::NotFound)?;
        let todo = storage::load_todo(&env, list_ref, id).ok_or(Error::NotFound)?;

        meta.todo_ids.remove(index);
        storage::save_list(&env, list_ref, &meta);
        storage::remove_todo(&env, list_ref, id);

        let mut totals = storage::load_totals(&env);
        totals.todos -= 1;
        if todo.completed {
            totals.completed -= 1;
        }
        storage::save_totals(&env, &totals);

        events::todo_deleted(&env, &caller, list_ref, id);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // List queries (public)
    // ─────────────────────────────────────────────────────────

    pub fn get_todo(env: Env, list_ref: u64, id: u64) -> Result<Todo, Error> {
        storage::load_todo(&env, list_ref, id).ok_or(Error::NotFound)
    }

    /// All live todos of the list in insertion order.
    pub fn get_all_todos(env: Env, list_ref: u64) -> Result<Vec<Todo>, Error> {
        let meta = storage::load_list(&env, list_ref).ok_or(Error::NotFound)?;
        let mut todos = Vec::new(&env);
        for id in meta.todo_ids.iter() {
            if let Some(todo) = storage::load_todo(&env, list_ref, id) {
                todos.push_back(todo);
            }
        }
        Ok(todos)
    }

    pub fn get_stats(env: Env, list_ref: u64) -> Result<TodoStats, Error> {
        let todos = Self::get_all_todos(env, list_ref)?;
        let tally: Tally = todos
            .iter()
            .map(|t| (t.completed, todo_rules::Priority::from(t.priority)))
            .collect();
        Ok(tally.into())
    }
}

/// Load the list and check that `caller` signed and owns it.
fn require_owner(env: &Env, caller: &Address, list_ref: u64) -> Result<ListMeta, Error> {
    caller.require_auth();
    let meta = storage::load_list(env, list_ref).ok_or(Error::NotFound)?;
    if meta.owner != *caller {
        return Err(Error::Unauthorized);
    }
    Ok(meta)
}
