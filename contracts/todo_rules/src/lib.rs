//! # Todo Rules
//!
//! The validation rules and statistics that every todo list implementation
//! must agree on, independent of where the list lives:
//!
//! | Concern        | Item                                   |
//! |----------------|----------------------------------------|
//! | Bounds         | [`Limits`]                             |
//! | Priorities     | [`Priority`], [`PRIORITY_UNCHANGED`]   |
//! | Input checks   | [`TodoDraft`], [`PatchDraft`]          |
//! | Statistics     | [`Tally`]                              |
//! | Rejections     | [`RuleError`]                          |
//!
//! The crate is `no_std` and allocation free so the Soroban contract can link
//! it directly. Strings are never inspected here, only their byte lengths.

#![no_std]

mod limits;
mod priority;
mod stats;

use core::fmt;

pub use limits::{check_due_date, Limits, PatchDraft, TodoDraft};
pub use limits::{
    DEFAULT_MAX_DESCRIPTION_LENGTH, DEFAULT_MAX_TITLE_LENGTH, DEFAULT_MAX_TODOS_PER_LIST,
};
pub use priority::{priority_change, Priority, PRIORITY_UNCHANGED};
pub use stats::Tally;

/// A todo input that breaks one of the list rules.
///
/// Checks run in declaration order, so the first failing rule wins.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RuleError {
    EmptyTitle,
    TitleTooLong,
    DescriptionTooLong,
    InvalidPriority,
    DueDateInPast,
    ListFull,
    /// A configured limit of zero.
    InvalidLimits,
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            RuleError::EmptyTitle => "title cannot be empty",
            RuleError::TitleTooLong => "title is too long",
            RuleError::DescriptionTooLong => "description is too long",
            RuleError::InvalidPriority => "invalid priority value",
            RuleError::DueDateInPast => "due date is in the past",
            RuleError::ListFull => "todo list is full",
            RuleError::InvalidLimits => "limits must be greater than zero",
        };
        f.write_str(msg)
    }
}
