pub mod employees;

pub use employees::Model as Employee;
