pub mod deedy;
pub mod resume;
