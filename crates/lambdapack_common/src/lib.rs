mod bundler_options;
mod chunk;
mod ecmascript;
mod module;
mod module_loader;
mod types;

pub use bundler_options::{
  BundlerOptions,
  build_mode::BuildMode,
  filename_template::{FileNameRenderOptions, FilenameTemplate},
  input_item::InputItem,
  module_type::ModuleType,
  normalized_bundler_options::{NormalizedBundlerOptions, NormalizedResolveOptions},
  output_format::OutputFormat,
  platform::Platform,
  resolve_options::ResolveOptions,
  sourcemap_type::SourceMapType,
  target::{ESTarget, Target},
};

pub use crate::{
  chunk::{Chunk, ModuleInclusion},
  ecmascript::ecma_view::{EcmaView, EcmaViewMeta},
  module::{IndexModules, Module, external_module::ExternalModule, normal_module::NormalModule},
  module_loader::{
    ModuleLoaderMsg,
    runtime_module_brief::{RUNTIME_MODULE_ID, RuntimeModuleBrief},
    runtime_task_result::RuntimeModuleTaskResult,
    task_result::NormalModuleTaskResult,
  },
  types::{
    entry_point::EntryPoint,
    exports_kind::ExportsKind,
    import_kind::ImportKind,
    import_record::{ImportRecordMeta, RawImportRecord, ResolvedImportRecord},
    module_id::ModuleId,
    named_export::LocalExport,
    named_import::{NamedImport, Specifier},
    namespace_alias::NamespaceAlias,
    output_asset::{OutputAsset, OutputAssetKind},
    raw_idx::{ChunkIdx, ImportRecordIdx, ModuleIdx, StmtInfoIdx, SymbolIdx},
    resolved_id::ResolvedId,
    side_effects,
    stmt_info::{
      CallSite, EnumEdit, EnumMemberEdit, EnumMemberValue, OccurrenceKind, SourceEdit, StmtInfo,
      StmtInfos, StmtKind, SymbolOccurrence,
    },
    symbol_ref::SymbolRef,
    symbol_ref_db::{SymbolRefData, SymbolRefDb, SymbolRefDbForModule},
  },
};
