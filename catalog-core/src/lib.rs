//! Catalog data model and store for the bilingual app directory.
//!
//! This crate owns:
//! - the entity model ([`CatalogEntry`], [`Category`], [`MetadataType`],
//!   [`MetadataOption`] and their assignments),
//! - [`CatalogStore`], the process-local repository standing in for the
//!   relational tables (the search engine only reads entries and writes the
//!   embedding/enrichment fields),
//! - [`MetadataRegistry`] and the pure filter-resolution step that turns a
//!   raw query-parameter map into option-id sets,
//! - a JSONL seed loader for bootstrapping a catalog dump.

mod entry;
mod errors;
mod metadata;
mod registry;
mod seed;
mod store;

pub use entry::{Category, CatalogEntry, Developer, EnrichmentCache, EntryStatus, Platform};
pub use errors::CatalogError;
pub use metadata::{MetadataOption, MetadataType};
pub use registry::{MetadataRegistry, RegistryType, ResolvedFilters, TypeFilter};
pub use store::CatalogStore;
