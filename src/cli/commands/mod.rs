pub mod exams;
pub mod results;
pub mod take;
