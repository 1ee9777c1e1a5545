//! Department generation.

use super::RowGenerator;
use crate::error::PopulateError;
use crate::rng::SeedStream;

/// Generated department ready for database insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDepartment {
    pub name: String,
}

/// Generates numbered departments. Draws nothing from the random stream.
#[derive(Debug, Default)]
pub struct DepartmentGenerator;

impl DepartmentGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generates the department at `index` (0-based).
    pub fn generate(&self, index: usize) -> GeneratedDepartment {
        GeneratedDepartment {
            name: format!("Department {}", index + 1),
        }
    }

    /// Generates `count` departments.
    pub fn generate_batch(&self, count: usize) -> Vec<GeneratedDepartment> {
        (0..count).map(|i| self.generate(i)).collect()
    }
}

impl RowGenerator for DepartmentGenerator {
    type Row = GeneratedDepartment;

    fn generate_row(
        &mut self,
        index: usize,
        _rng: &mut SeedStream,
    ) -> Result<GeneratedDepartment, PopulateError> {
        Ok(self.generate(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_batch() {
        let departments = DepartmentGenerator::new().generate_batch(10);

        assert_eq!(departments.len(), 10);
        assert_eq!(departments[0].name, "Department 1");
        assert_eq!(departments[9].name, "Department 10");
    }
}
