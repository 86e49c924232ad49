use crate::RuleError;

/// Priority code meaning "leave the priority as it is" in a sentinel-style update.
pub const PRIORITY_UNCHANGED: u32 = u32::MAX;

/// Priority of a todo. The discriminants are the wire codes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
#[repr(u32)]
pub enum Priority {
    Low = 0,
    Medium = 1,
    High = 2,
}

impl Priority {
    pub fn from_code(code: u32) -> Result<Self, RuleError> {
        match code {
            0 => Ok(Priority::Low),
            1 => Ok(Priority::Medium),
            2 => Ok(Priority::High),
            _ => Err(RuleError::InvalidPriority),
        }
    }

    pub const fn code(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for Priority {
    type Error = RuleError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Priority::from_code(code)
    }
}

/// Decode a sentinel-style priority argument: [`PRIORITY_UNCHANGED`] maps to
/// `None`, every other code is a requested change (validated later).
pub fn priority_change(code: u32) -> Option<u32> {
    if code == PRIORITY_UNCHANGED {
        None
    } else {
        Some(code)
    }
}
