//! Display and Resource Capabilities

use crate::errors::DisplayError;

/// A small text display (e.g. a 128x64 OLED)
///
/// Implementations clear the panel and draw `lines` top to bottom.
pub trait DisplayCapability {
    /// Replace the screen contents with `lines`
    fn render(&mut self, lines: &[&str]) -> Result<(), DisplayError>;
}

#[cfg(feature = "alloc")]
impl<D: DisplayCapability + ?Sized> DisplayCapability for alloc::boxed::Box<D> {
    fn render(&mut self, lines: &[&str]) -> Result<(), DisplayError> {
        (**self).render(lines)
    }
}

/// Heap statistics, where the platform can report them
pub trait MemoryProbe {
    /// Free heap in bytes
    fn free_bytes(&self) -> Option<usize>;

    /// Allocated heap in bytes
    fn allocated_bytes(&self) -> Option<usize>;
}

/// Probe for platforms without heap statistics
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMemoryProbe;

impl MemoryProbe for NoMemoryProbe {
    fn free_bytes(&self) -> Option<usize> {
        None
    }

    fn allocated_bytes(&self) -> Option<usize> {
        None
    }
}
