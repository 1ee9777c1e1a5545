//! Employee activity log generation.

use time::PrimitiveDateTime;
use time::macros::datetime;

use super::{RowGenerator, require_pool};
use crate::error::PopulateError;
use crate::rng::SeedStream;

/// Kind of recorded employee activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityType {
    Login,
    Update,
    Delete,
    Create,
    View,
}

impl ActivityType {
    pub const ALL: [ActivityType; 5] = [
        ActivityType::Login,
        ActivityType::Update,
        ActivityType::Delete,
        ActivityType::Create,
        ActivityType::View,
    ];

    /// Returns the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Login => "login",
            ActivityType::Update => "update",
            ActivityType::Delete => "delete",
            ActivityType::Create => "create",
            ActivityType::View => "view",
        }
    }
}

/// Generated activity log entry ready for database insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedActivityLog {
    pub employee_id: i64,
    pub activity_type: ActivityType,
    pub activity_time: PrimitiveDateTime,
    pub details: String,
}

/// Generates activity log entries for persisted employees.
pub struct ActivityLogGenerator<'a> {
    window_start: PrimitiveDateTime,
    window_days: i64,
    employee_ids: &'a [i64],
}

impl<'a> ActivityLogGenerator<'a> {
    pub fn new(employee_ids: &'a [i64]) -> Result<Self, PopulateError> {
        require_pool(employee_ids, "activity logs", "employees")?;
        Ok(Self {
            window_start: datetime!(2017-01-01 0:00),
            window_days: 1500,
            employee_ids,
        })
    }

    pub fn generate(&self, rng: &mut SeedStream) -> GeneratedActivityLog {
        let employee_id = self.employee_ids[rng.index(self.employee_ids.len())];
        let activity_type = ActivityType::ALL[rng.index(ActivityType::ALL.len())];
        let activity_time = rng.moment_after(self.window_start, self.window_days);
        let details = format!("{} {}", activity_type.as_str(), rng.alphanumeric(20));

        GeneratedActivityLog {
            employee_id,
            activity_type,
            activity_time,
            details,
        }
    }

    pub fn generate_batch(&self, count: usize, rng: &mut SeedStream) -> Vec<GeneratedActivityLog> {
        (0..count).map(|_| self.generate(rng)).collect()
    }
}

impl RowGenerator for ActivityLogGenerator<'_> {
    type Row = GeneratedActivityLog;

    fn generate_row(
        &mut self,
        _index: usize,
        rng: &mut SeedStream,
    ) -> Result<GeneratedActivityLog, PopulateError> {
        Ok(self.generate(rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_batch() {
        let employees = [1_i64, 2, 3, 4];
        let log_gen = ActivityLogGenerator::new(&employees).unwrap();
        let mut rng = SeedStream::new(42);

        for log in log_gen.generate_batch(1_000, &mut rng) {
            assert!(employees.contains(&log.employee_id));
            assert!(log.details.starts_with(log.activity_type.as_str()));
            assert!(log.activity_time >= datetime!(2017-01-01 0:00));
            assert!(log.activity_time <= datetime!(2021-02-11 0:00));
        }
    }

    #[test]
    fn test_empty_employees_fail_fast() {
        assert!(matches!(
            ActivityLogGenerator::new(&[]),
            Err(PopulateError::EmptyParentPool {
                entity: "activity logs",
                parent: "employees"
            })
        ));
    }
}
