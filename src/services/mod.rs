// Record surfaces
pub mod financial;
pub mod records;

// Portal users and courses
pub mod users;

// External Services
pub mod video_catalog;
