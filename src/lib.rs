// Library exports for reuse by the CLI, the GUI and other applications
pub mod cli;
pub mod commands;
pub mod config_file;
pub mod error;
pub mod frontend;
pub mod grid_processing;
pub mod json_output;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use error::{GridError, GridResult};
pub use frontend::{collect_request, select_front_end, ConversionRequest, FrontEnd, InputProvider};
pub use grid_processing::{
    ConversionConfig, ConversionOutcome, GridConverter, GridEnvelope, GridSize, ResizeFilter,
};
pub use json_output::JsonMessage;
