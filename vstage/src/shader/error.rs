use thiserror::Error;

/// Error type for loading and checking the stage shader
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShaderError {
    #[error("WGSL parse error:\n{0}")]
    Parse(String),

    #[error("Shader validation error:\n{0}")]
    Validation(String),

    #[error("Entry point '{0}' not found")]
    MissingEntryPoint(String),

    #[error("Entry point '{name}' has unsupported {direction} type")]
    UnsupportedIoType {
        name: String,
        direction: &'static str,
    },

    #[error(transparent)]
    Interface(#[from] InterfaceError),
}

/// A mismatch between the shader's entry point and the declared stage bindings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterfaceError {
    #[error("Entry point is a {0} stage, expected vertex")]
    NotVertexStage(String),

    #[error("Missing input at location {0}")]
    MissingInput(u32),

    #[error("Missing output at location {0}")]
    MissingOutput(u32),

    #[error("Missing builtin position output")]
    MissingPosition,

    #[error("{direction} at {slot} has type {found}, expected {expected}")]
    TypeMismatch {
        direction: &'static str,
        slot: String,
        expected: &'static str,
        found: String,
    },

    /// WGSL requires integer inter-stage values to be flat and naga rejects
    /// anything else, so a module parsed from WGSL fails the `u32` type check
    /// first. Only reachable for interfaces built or edited by hand.
    #[error("Output at location {0} must use flat interpolation")]
    NotFlat(u32),

    #[error("Unexpected {direction} at {slot}")]
    Unexpected {
        direction: &'static str,
        slot: String,
    },
}
