use crate::priority::Priority;

/// Counts over one list's todos.
///
/// `pending` and `high_priority_pending` are derived while recording, so a
/// tally built through [`Tally::record`] is always consistent.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tally {
    pub total: u32,
    pub completed: u32,
    pub pending: u32,
    /// Incomplete todos with [`Priority::High`].
    pub high_priority_pending: u32,
}

impl Tally {
    pub fn record(&mut self, completed: bool, priority: Priority) {
        self.total += 1;
        if completed {
            self.completed += 1;
        } else {
            self.pending += 1;
            if priority == Priority::High {
                self.high_priority_pending += 1;
            }
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.completed + self.pending == self.total && self.high_priority_pending <= self.pending
    }
}

impl FromIterator<(bool, Priority)> for Tally {
    fn from_iter<I: IntoIterator<Item = (bool, Priority)>>(iter: I) -> Self {
        let mut tally = Tally::default();
        for (completed, priority) in iter {
            tally.record(completed, priority);
        }
        tally
    }
}
