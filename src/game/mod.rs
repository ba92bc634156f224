pub mod combo;
pub mod difficulty;
pub mod feedback;
pub mod judgment;
pub mod note;
pub mod notefield;
pub mod scheduler;
pub mod scores;
