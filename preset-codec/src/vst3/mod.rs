//! VST3 `.vstpreset` container
//!
//! ```text
//! "VST3" | u32 version | char[32] classId | i64 listOffset
//! regions...
//! "List" | u32 count | count × { tag[4], i64 offset, i64 size }
//! ```
//!
//! Container integers are little-endian. The component region (`Comp`) is
//! opaque plugin state, often a VST2 wrapper around an FXP record or a raw
//! parameter stream; see [`crate::component`] for classifying it.

mod class_id;
mod meta;
mod params;
mod read;
mod wrapper;
mod write;


pub use class_id::{CLASS_ID_SIZE, ClassId};
pub use meta::{MetaAttribute, MetaInfo};
pub use params::{PARAMETER_RECORD_SIZE, Parameter, ParameterSet, decode_stream, encode_stream};
pub use wrapper::{WRAPPER_HEADER_SIZE, WRAPPER_MAGIC, WRAPPER_VERSION, WrappedFxp};

pub use read::{read, read_index};

use std::path::Path;

use crate::cursor::{BinaryCursor, Endian};
use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::error::Result;
use crate::fourcc::FourCC;
use crate::fxp::FxpContent;

pub const PRESET_MAGIC: FourCC = FourCC::new(*b"VST3");
pub const LIST_TAG: FourCC = FourCC::new(*b"List");
pub const COMPONENT_TAG: FourCC = FourCC::new(*b"Comp");
pub const CONTROLLER_TAG: FourCC = FourCC::new(*b"Cont");
pub const INFO_TAG: FourCC = FourCC::new(*b"Info");

/// Container format version written by current hosts
pub const PRESET_VERSION: u32 = 1;
/// Magic + version + class id + list offset
pub const HEADER_SIZE: u64 = 48;
/// tag + offset + size
pub const LIST_ENTRY_SIZE: u64 = 20;

/// One entry of the trailing chunk list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionEntry {
    pub tag: FourCC,
    pub offset: u64,
    pub size: u64,
}

/// A decoded `.vstpreset`
#[derive(Debug, Clone, PartialEq)]
pub struct VstPreset {
    pub version: u32,
    pub class_id: ClassId,
    pub component: Vec<u8>,
    /// `None` when the list has no `Cont` entry
    pub controller: Option<Vec<u8>>,
    pub meta_info: Option<MetaInfo>,
}

impl VstPreset {
    pub fn new(class_id: ClassId, component: Vec<u8>) -> Self {
        Self {
            version: PRESET_VERSION,
            class_id,
            component,
            controller: None,
            meta_info: None,
        }
    }

    /// Parameter preset: stream in the component, names in the meta XML
    pub fn from_parameters(class_id: ClassId, parameters: &ParameterSet) -> Self {
        let mut meta = MetaInfo::preset();
        meta.parameters = parameters.as_slice().to_vec();
        Self {
            meta_info: Some(meta),
            ..Self::new(class_id, parameters.to_stream())
        }
    }

    /// Wrap an FXP/FXB record the way the VST2 wrapper stores it
    pub fn wrap_fxp(content: FxpContent, plugin_name: &str) -> Result<Self> {
        let class_id = ClassId::vst2_wrapped(content.header().fx_id, plugin_name);
        let component = WrappedFxp::new(content).encode()?;
        let mut meta = MetaInfo::preset();
        meta.attributes
            .push(MetaAttribute::string("PlugInName", plugin_name));
        Ok(Self {
            meta_info: Some(meta),
            ..Self::new(class_id, component)
        })
    }

    /// Parameters from the component stream, named from the meta XML
    pub fn parameters(&self) -> Result<ParameterSet> {
        let stream = decode_stream(&self.component)?;
        let declared = self
            .meta_info
            .as_ref()
            .map(|m| m.parameters.as_slice())
            .unwrap_or(&[]);
        Ok(ParameterSet::from_parts(declared, &stream))
    }

    pub fn from_bytes_with(data: &[u8], diagnostics: &mut dyn Diagnostics) -> Result<Self> {
        let mut cursor = BinaryCursor::from_slice(data, Endian::Little);
        read(&mut cursor, diagnostics)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with(data, &mut TracingDiagnostics)
    }

    pub fn read_file(path: &Path) -> Result<Self> {
        let mut cursor = BinaryCursor::open(path, Endian::Little)?;
        read(&mut cursor, &mut TracingDiagnostics)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        write::to_bytes(self)
    }

    pub fn write_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}
