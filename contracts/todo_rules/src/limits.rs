use crate::priority::Priority;
use crate::RuleError;

pub const DEFAULT_MAX_TITLE_LENGTH: u32 = 100;
pub const DEFAULT_MAX_DESCRIPTION_LENGTH: u32 = 500;
pub const DEFAULT_MAX_TODOS_PER_LIST: u32 = 50;

/// Per-deployment bounds on todo input and list capacity.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Limits {
    /// Maximum title length in bytes.
    pub max_title_length: u32,
    /// Maximum description length in bytes.
    pub max_description_length: u32,
    /// Maximum number of live todos in one list.
    pub max_todos_per_list: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_title_length: DEFAULT_MAX_TITLE_LENGTH,
            max_description_length: DEFAULT_MAX_DESCRIPTION_LENGTH,
            max_todos_per_list: DEFAULT_MAX_TODOS_PER_LIST,
        }
    }
}

/// Byte lengths and raw codes of a todo about to be created.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TodoDraft {
    pub title_len: u32,
    pub description_len: u32,
    pub priority: u32,
    pub due_date: Option<u64>,
}

/// The fields an update wants to change; `None` leaves a field untouched.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PatchDraft {
    pub title_len: Option<u32>,
    pub description_len: Option<u32>,
    pub priority: Option<u32>,
    pub due_date: Option<u64>,
}

impl Limits {
    /// Every limit must allow at least one unit.
    pub fn validate(&self) -> Result<(), RuleError> {
        if self.max_title_length == 0
            || self.max_description_length == 0
            || self.max_todos_per_list == 0
        {
            return Err(RuleError::InvalidLimits);
        }
        Ok(())
    }

    pub fn check_title(&self, len: u32) -> Result<(), RuleError> {
        if len == 0 {
            return Err(RuleError::EmptyTitle);
        }
        if len > self.max_title_length {
            return Err(RuleError::TitleTooLong);
        }
        Ok(())
    }

    pub fn check_description(&self, len: u32) -> Result<(), RuleError> {
        if len > self.max_description_length {
            return Err(RuleError::DescriptionTooLong);
        }
        Ok(())
    }

    /// `current` is the number of todos already in the list.
    pub fn check_capacity(&self, current: u32) -> Result<(), RuleError> {
        if current >= self.max_todos_per_list {
            return Err(RuleError::ListFull);
        }
        Ok(())
    }

    /// Validate a new todo's fields, returning the decoded priority.
    ///
    /// Capacity is not part of the draft; callers check it with
    /// [`Limits::check_capacity`] after the fields pass.
    pub fn check_draft(&self, draft: &TodoDraft, now: u64) -> Result<Priority, RuleError> {
        self.check_title(draft.title_len)?;
        self.check_description(draft.description_len)?;
        let priority = Priority::from_code(draft.priority)?;
        if let Some(due) = draft.due_date {
            check_due_date(due, now)?;
        }
        Ok(priority)
    }

    /// Validate only the fields an update touches.
    pub fn check_patch(
        &self,
        patch: &PatchDraft,
        now: u64,
    ) -> Result<Option<Priority>, RuleError> {
        if let Some(len) = patch.title_len {
            self.check_title(len)?;
        }
        if let Some(len) = patch.description_len {
            self.check_description(len)?;
        }
        let priority = match patch.priority {
            Some(code) => Some(Priority::from_code(code)?),
            None => None,
        };
        if let Some(due) = patch.due_date {
            check_due_date(due, now)?;
        }
        Ok(priority)
    }
}

/// A due date equal to `now` is still accepted.
pub fn check_due_date(due: u64, now: u64) -> Result<(), RuleError> {
    if due < now {
        return Err(RuleError::DueDateInPast);
    }
    Ok(())
}
