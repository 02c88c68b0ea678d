use crate::host::Phase;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Category not present in reference graph: {name}")]
    MissingCategory { name: String },

    #[error("Reference graph is empty or has a degenerate value-to-height ratio")]
    DegenerateReference,

    #[error("Circular flow: column assignment did not converge")]
    CircularFlow,

    #[error("Operation requires phase {expected:?} but host is {actual:?}")]
    Lifecycle { expected: Phase, actual: Phase },

    #[error("Frame provider error: {message}")]
    Provider { message: String },

    #[error("Reveal callback error: {message}")]
    Reveal { message: String },
}
