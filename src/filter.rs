//! Target-year predicate over sessions and messages.
//!
//! Years are local calendar years. A session belongs to the year of its first
//! valid message; when it ended does not matter.

use crate::record::{MessageRecord, SessionRecord};
use chrono::Datelike;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearFilter {
    pub year: i32,
}

impl YearFilter {
    pub fn new(year: i32) -> Self {
        Self { year }
    }

    #[inline]
    pub fn contains_message(&self, message: &MessageRecord) -> bool {
        message.year() == self.year
    }

    #[inline]
    pub fn contains_session(&self, session: &SessionRecord) -> bool {
        session.first_message_at.year() == self.year
    }

    pub fn messages<'a>(
        &'a self,
        messages: &'a [MessageRecord],
    ) -> impl Iterator<Item = &'a MessageRecord> + 'a {
        messages.iter().filter(move |m| self.contains_message(m))
    }

    pub fn sessions<'a>(
        &'a self,
        sessions: &'a [SessionRecord],
    ) -> impl Iterator<Item = &'a SessionRecord> + 'a {
        sessions.iter().filter(move |s| self.contains_session(s))
    }
}
