pub mod ops_check;
pub mod ops_plan;
pub mod ops_pom;
pub mod ops_tasks;
