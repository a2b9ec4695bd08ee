pub mod auth;
pub mod course;
pub mod enrollment;
pub mod user;
