pub mod audio;
pub mod present;
pub mod scheduler;
pub mod skeleton;
pub mod space;
