pub mod collision;
pub mod frame;
pub mod players;
pub mod scene;
pub mod script;
pub mod stage;
pub mod things;
pub mod timer;
