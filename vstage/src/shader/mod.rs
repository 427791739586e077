//! Stage shader sources and interface checks
//!
//! `passthrough.wgsl` is the stage itself. `probe.wgsl` adds a fragment entry
//! point that writes the flat texture index into an `R32Uint` target; the
//! headless renderer compiles the two together to observe what the stage
//! forwards.
//!
//! Both sources are validated with naga by `build.rs`.

mod error;
mod interface;

pub use error::{InterfaceError, ShaderError};
pub use interface::{InterfaceVariable, IoType, Slot, StageInterface};

use naga::valid::{Capabilities, ModuleInfo, ValidationFlags, Validator};
use naga::{Expression, Literal, Module};

/// WGSL source of the vertex pass-through stage
pub const PASSTHROUGH_WGSL: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/shaders/passthrough.wgsl"
));

/// WGSL source of the probe fragment entry point
pub const PROBE_WGSL: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/probe.wgsl"));

/// Vertex entry point name
pub const VERTEX_ENTRY: &str = "vs";
/// Probe fragment entry point name
pub const PROBE_FRAGMENT_ENTRY: &str = "fs_probe";
/// Pipeline-overridable constant holding the fourth clip-space component
pub const CLIP_W_CONSTANT: &str = "CLIP_W";

/// Source of the module used by the probe pipeline (stage + probe fragment).
pub fn probe_source() -> String {
    format!("{}\n{}", PASSTHROUGH_WGSL, PROBE_WGSL)
}

/// Parse WGSL and run full naga validation.
pub fn parse_and_validate(source: &str) -> Result<(Module, ModuleInfo), ShaderError> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| ShaderError::Parse(e.emit_to_string(source)))?;

    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
    let info = validator
        .validate(&module)
        .map_err(|e| ShaderError::Validation(e.emit_to_string(source)))?;

    Ok((module, info))
}

/// Parse, validate and check `source` against the pass-through contract.
///
/// Returns the reflected interface of [`VERTEX_ENTRY`] on success.
pub fn check_passthrough(source: &str) -> Result<StageInterface, ShaderError> {
    let (module, _info) = parse_and_validate(source)?;
    let iface = StageInterface::reflect(&module, VERTEX_ENTRY)?;
    iface.check_passthrough_contract()?;

    tracing::debug!(
        "Stage interface OK: {} inputs, {} outputs",
        iface.inputs.len(),
        iface.outputs.len()
    );
    Ok(iface)
}

/// Default value of an `f32` override constant, if declared with a literal.
pub fn override_default(module: &Module, name: &str) -> Option<f32> {
    let (_, ov) = module
        .overrides
        .iter()
        .find(|(_, ov)| ov.name.as_deref() == Some(name))?;
    match module.global_expressions[ov.init?] {
        Expression::Literal(Literal::F32(v)) => Some(v),
        _ => None,
    }
}
