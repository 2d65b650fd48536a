//! Background work: the weekly coaching email pass and the loop that runs it.

pub mod scheduler;
pub mod weekly_emails;
