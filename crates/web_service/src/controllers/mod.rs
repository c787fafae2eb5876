pub mod chat_controller;
pub mod system_controller;
