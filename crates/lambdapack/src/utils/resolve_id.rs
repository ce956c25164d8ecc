use std::path::Path;

use lambdapack_common::{ImportKind, ResolvedId};
use lambdapack_error::{Diagnostic, DiagnosticKind, Location};
use lambdapack_resolver::Resolver;

/// Where an import appears, for error messages.
pub struct ImportSite<'a> {
  pub importer: &'a Path,
  pub stable_id: &'a str,
  pub source: &'a str,
  pub offset: u32,
}

pub fn resolve_id(
  resolver: &Resolver,
  specifier: &str,
  kind: ImportKind,
  site: &ImportSite<'_>,
) -> anyhow::Result<ResolvedId> {
  resolver.resolve(Some(site.importer), specifier, kind).map_err(|err| {
    tracing::debug!(specifier, importer = site.stable_id, %err, "failed to resolve");
    Diagnostic::new(
      DiagnosticKind::UnresolvedImport,
      format!("Could not resolve \"{specifier}\" (imported by {}): {err}", site.stable_id),
    )
    .with_location(Location::from_offset(site.stable_id, site.source, site.offset))
    .into()
  })
}
