//! Entry point interface reflection
//!
//! Flattens the arguments and result of a naga entry point (including struct
//! members) into a list of bound variables, then checks them against the
//! pass-through contract:
//!
//! - input `@location(0)`: `vec3<f32>`
//! - input `@location(1)`: `u32`
//! - output `@builtin(position)`: `vec4<f32>`
//! - output `@location(1)`: `u32`, `@interpolate(flat)`

use std::fmt;

use naga::{Binding, BuiltIn, Handle, Interpolation, Module, ScalarKind, ShaderStage, TypeInner};

use vstage_common::{LOC_POSITION, LOC_TEX_INDEX, LOC_TEX_INDEX_OUT};

use super::error::{InterfaceError, ShaderError};

/// Scalar or vector type of an inter-stage variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoType {
    pub kind: ScalarKind,
    /// Scalar width in bytes
    pub width: u8,
    /// 1 for scalars
    pub components: u8,
}

impl IoType {
    pub const F32X3: Self = Self::new(ScalarKind::Float, 4, 3);
    pub const F32X4: Self = Self::new(ScalarKind::Float, 4, 4);
    pub const U32: Self = Self::new(ScalarKind::Uint, 4, 1);

    pub const fn new(kind: ScalarKind, width: u8, components: u8) -> Self {
        Self {
            kind,
            width,
            components,
        }
    }

    fn from_naga(module: &Module, ty: Handle<naga::Type>) -> Option<Self> {
        match module.types[ty].inner {
            TypeInner::Scalar(scalar) => Some(Self::new(scalar.kind, scalar.width, 1)),
            TypeInner::Vector { size, scalar } => {
                Some(Self::new(scalar.kind, scalar.width, size as u8))
            }
            _ => None,
        }
    }
}

impl fmt::Display for IoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scalar = match self.kind {
            ScalarKind::Float => "f",
            ScalarKind::Uint => "u",
            ScalarKind::Sint => "i",
            ScalarKind::Bool => return write!(f, "bool"),
            _ => "?",
        };
        if self.components == 1 {
            write!(f, "{}{}", scalar, self.width as u32 * 8)
        } else {
            write!(
                f,
                "vec{}<{}{}>",
                self.components,
                scalar,
                self.width as u32 * 8
            )
        }
    }
}

/// Where a variable is bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Location {
        location: u32,
        interpolation: Option<Interpolation>,
    },
    BuiltIn(BuiltIn),
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Location { location, .. } => write!(f, "location {}", location),
            Slot::BuiltIn(b) => write!(f, "builtin {:?}", b),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceVariable {
    pub name: Option<String>,
    pub slot: Slot,
    pub ty: IoType,
}

/// Reflected inputs and outputs of one entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageInterface {
    pub entry_point: String,
    pub stage: ShaderStage,
    pub inputs: Vec<InterfaceVariable>,
    pub outputs: Vec<InterfaceVariable>,
}

fn slot_of(binding: &Binding) -> Slot {
    match *binding {
        Binding::BuiltIn(b) => Slot::BuiltIn(b),
        Binding::Location {
            location,
            interpolation,
            ..
        } => Slot::Location {
            location,
            interpolation,
        },
    }
}

/// Collect bound variables from a value of type `ty`, descending into structs.
fn flatten(
    module: &Module,
    entry: &str,
    direction: &'static str,
    name: Option<&String>,
    ty: Handle<naga::Type>,
    binding: Option<&Binding>,
    out: &mut Vec<InterfaceVariable>,
) -> Result<(), ShaderError> {
    let unsupported = || ShaderError::UnsupportedIoType {
        name: entry.to_string(),
        direction,
    };

    match binding {
        Some(binding) => {
            out.push(InterfaceVariable {
                name: name.cloned(),
                slot: slot_of(binding),
                ty: IoType::from_naga(module, ty).ok_or_else(unsupported)?,
            });
        }
        None => match &module.types[ty].inner {
            TypeInner::Struct { members, .. } => {
                for member in members {
                    flatten(
                        module,
                        entry,
                        direction,
                        member.name.as_ref(),
                        member.ty,
                        member.binding.as_ref(),
                        out,
                    )?;
                }
            }
            _ => return Err(unsupported()),
        },
    }
    Ok(())
}

impl StageInterface {
    /// Reflect the interface of entry point `entry`.
    pub fn reflect(module: &Module, entry: &str) -> Result<Self, ShaderError> {
        let ep = module
            .entry_points
            .iter()
            .find(|ep| ep.name == entry)
            .ok_or_else(|| ShaderError::MissingEntryPoint(entry.to_string()))?;

        let mut inputs = Vec::new();
        for arg in &ep.function.arguments {
            flatten(
                module,
                entry,
                "input",
                arg.name.as_ref(),
                arg.ty,
                arg.binding.as_ref(),
                &mut inputs,
            )?;
        }

        let mut outputs = Vec::new();
        if let Some(result) = &ep.function.result {
            flatten(
                module,
                entry,
                "output",
                None,
                result.ty,
                result.binding.as_ref(),
                &mut outputs,
            )?;
        }

        Ok(Self {
            entry_point: ep.name.clone(),
            stage: ep.stage,
            inputs,
            outputs,
        })
    }

    pub fn input_at(&self, location: u32) -> Option<&InterfaceVariable> {
        find_location(&self.inputs, location)
    }

    pub fn output_at(&self, location: u32) -> Option<&InterfaceVariable> {
        find_location(&self.outputs, location)
    }

    pub fn position_output(&self) -> Option<&InterfaceVariable> {
        self.outputs
            .iter()
            .find(|v| matches!(v.slot, Slot::BuiltIn(BuiltIn::Position { .. })))
    }

    /// Verify the declared pass-through bindings.
    ///
    /// Extra inputs or outputs are rejected: the stage declares exactly two of
    /// each.
    pub fn check_passthrough_contract(&self) -> Result<(), InterfaceError> {
        if self.stage != ShaderStage::Vertex {
            return Err(InterfaceError::NotVertexStage(format!("{:?}", self.stage)));
        }

        expect_location(
            "input",
            self.input_at(LOC_POSITION),
            IoType::F32X3,
            "vec3<f32>",
            InterfaceError::MissingInput(LOC_POSITION),
        )?;
        expect_location(
            "input",
            self.input_at(LOC_TEX_INDEX),
            IoType::U32,
            "u32",
            InterfaceError::MissingInput(LOC_TEX_INDEX),
        )?;

        for var in &self.inputs {
            let expected = match var.slot {
                Slot::Location { location, .. } => {
                    location == LOC_POSITION || location == LOC_TEX_INDEX
                }
                Slot::BuiltIn(_) => false,
            };
            if !expected {
                return Err(InterfaceError::Unexpected {
                    direction: "input",
                    slot: var.slot.to_string(),
                });
            }
        }

        let position = self
            .position_output()
            .ok_or(InterfaceError::MissingPosition)?;
        if position.ty != IoType::F32X4 {
            return Err(InterfaceError::TypeMismatch {
                direction: "output",
                slot: position.slot.to_string(),
                expected: "vec4<f32>",
                found: position.ty.to_string(),
            });
        }

        let tex_out = expect_location(
            "output",
            self.output_at(LOC_TEX_INDEX_OUT),
            IoType::U32,
            "u32",
            InterfaceError::MissingOutput(LOC_TEX_INDEX_OUT),
        )?;
        // Always true for WGSL u32 outputs; checked for hand-built interfaces
        if !matches!(
            tex_out.slot,
            Slot::Location {
                interpolation: Some(Interpolation::Flat),
                ..
            }
        ) {
            return Err(InterfaceError::NotFlat(LOC_TEX_INDEX_OUT));
        }

        for var in &self.outputs {
            let expected = match var.slot {
                Slot::BuiltIn(BuiltIn::Position { .. }) => true,
                Slot::Location { location, .. } => location == LOC_TEX_INDEX_OUT,
                Slot::BuiltIn(_) => false,
            };
            if !expected {
                return Err(InterfaceError::Unexpected {
                    direction: "output",
                    slot: var.slot.to_string(),
                });
            }
        }

        Ok(())
    }
}

fn find_location(vars: &[InterfaceVariable], location: u32) -> Option<&InterfaceVariable> {
    vars.iter()
        .find(|v| matches!(v.slot, Slot::Location { location: l, .. } if l == location))
}

fn expect_location<'a>(
    direction: &'static str,
    var: Option<&'a InterfaceVariable>,
    expected: IoType,
    expected_name: &'static str,
    missing: InterfaceError,
) -> Result<&'a InterfaceVariable, InterfaceError> {
    let var = var.ok_or(missing)?;
    if var.ty != expected {
        return Err(InterfaceError::TypeMismatch {
            direction,
            slot: var.slot.to_string(),
            expected: expected_name,
            found: var.ty.to_string(),
        });
    }
    Ok(var)
}
