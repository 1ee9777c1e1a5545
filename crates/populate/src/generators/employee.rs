//! Employee generation.

use time::Date;
use time::macros::date;

use super::{RowGenerator, require_pool};
use crate::error::PopulateError;
use crate::rng::SeedStream;

/// Generated employee ready for database insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedEmployee {
    pub name: String,
    pub department_id: i64,
    pub hire_date: Date,
    pub salary: f64,
}

/// Configuration for employee generation.
#[derive(Debug, Clone)]
pub struct EmployeeGenConfig {
    /// First possible hire date.
    pub hire_window_start: Date,
    /// Width of the hire window in days.
    pub hire_window_days: i64,
    /// Salary bounds, sampled uniformly and rounded to cents.
    pub salary_range: (f64, f64),
}

impl Default for EmployeeGenConfig {
    fn default() -> Self {
        Self {
            hire_window_start: date!(2000 - 01 - 01),
            hire_window_days: 9000,
            salary_range: (40_000.0, 200_000.0),
        }
    }
}

/// Generates employees assigned to persisted departments.
pub struct EmployeeGenerator<'a> {
    config: EmployeeGenConfig,
    department_ids: &'a [i64],
}

impl<'a> EmployeeGenerator<'a> {
    /// Creates a generator over persisted department identities.
    pub fn new(department_ids: &'a [i64]) -> Result<Self, PopulateError> {
        Self::with_config(EmployeeGenConfig::default(), department_ids)
    }

    /// Creates a generator with custom configuration.
    pub fn with_config(
        config: EmployeeGenConfig,
        department_ids: &'a [i64],
    ) -> Result<Self, PopulateError> {
        require_pool(department_ids, "employees", "departments")?;
        let (low, high) = config.salary_range;
        if !(low.is_finite() && high.is_finite() && low <= high) {
            return Err(PopulateError::InvalidConfig(format!(
                "employee salary range {:?} must be finite and non-empty",
                config.salary_range
            )));
        }
        Ok(Self {
            config,
            department_ids,
        })
    }

    /// Generates the employee at `index` (0-based).
    pub fn generate(&self, index: usize, rng: &mut SeedStream) -> GeneratedEmployee {
        let department_id = self.department_ids[rng.index(self.department_ids.len())];
        let hire_date = rng.days_after(self.config.hire_window_start, self.config.hire_window_days);
        let (low, high) = self.config.salary_range;
        let salary = (rng.real_in(low, high) * 100.0).round() / 100.0;

        GeneratedEmployee {
            name: format!("Employee_{}", index + 1),
            department_id,
            hire_date,
            salary,
        }
    }

    /// Generates `count` employees.
    pub fn generate_batch(&self, count: usize, rng: &mut SeedStream) -> Vec<GeneratedEmployee> {
        (0..count).map(|i| self.generate(i, rng)).collect()
    }
}

impl RowGenerator for EmployeeGenerator<'_> {
    type Row = GeneratedEmployee;

    fn generate_row(
        &mut self,
        index: usize,
        rng: &mut SeedStream,
    ) -> Result<GeneratedEmployee, PopulateError> {
        Ok(self.generate(index, rng))
    }
}
