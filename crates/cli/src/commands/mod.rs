pub mod config;
pub mod doctor;
pub mod smoke;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}
