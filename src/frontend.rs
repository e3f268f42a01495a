//! Front-end plumbing shared by the command-line and interactive entry points.
//!
//! The converter never talks to a UI. Front ends collect a
//! [`ConversionRequest`] through an [`InputProvider`] and hand it over.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::grid_processing::batch::grid_output_path;

/// Which front end the entry point should run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontEnd {
    Interactive,
    CommandLine,
}

/// The interactive flow only runs for a bare invocation with the GUI compiled in;
/// any argument routes to the command line.
pub fn select_front_end(args: &[OsString], gui_available: bool) -> FrontEnd {
    if gui_available && args.len() <= 1 {
        FrontEnd::Interactive
    } else {
        FrontEnd::CommandLine
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub width: i64,
    pub height: i64,
}

/// Supplies the four conversion inputs. `None` means the user cancelled.
pub trait InputProvider {
    fn source_path(&mut self) -> Option<PathBuf>;

    fn grid_size(&mut self) -> Option<(i64, i64)>;

    /// `suggested` is the default `<stem>_grid.json` next to the source
    fn destination_path(&mut self, source: &Path, suggested: &Path) -> Option<PathBuf>;
}

/// Ask the provider for source, size and destination, in that order.
///
/// Stops at the first cancellation.
pub fn collect_request<P: InputProvider + ?Sized>(provider: &mut P) -> Option<ConversionRequest> {
    let source = provider.source_path()?;
    let (width, height) = provider.grid_size()?;
    let suggested = grid_output_path(&source, None);
    let destination = provider.destination_path(&source, &suggested)?;

    Some(ConversionRequest {
        source,
        destination,
        width,
        height,
    })
}
