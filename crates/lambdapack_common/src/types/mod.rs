pub mod entry_point;
pub mod exports_kind;
pub mod import_kind;
pub mod import_record;
pub mod module_id;
pub mod named_export;
pub mod named_import;
pub mod namespace_alias;
pub mod output_asset;
pub mod raw_idx;
pub mod resolved_id;
pub mod side_effects;
pub mod stmt_info;
pub mod symbol_ref;
pub mod symbol_ref_db;
