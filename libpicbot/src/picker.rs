//! Picking one ready-to-upload image from the catalog
//!
//! The catalog is streamed line by line through the reservoir selector, so
//! it is never held in memory. Lines are kept as raw bytes until one wins;
//! only the winner has to be valid UTF-8. The winning line is parsed and its
//! reference resolved; a bad winner is an error, not a reason to draw again.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rand::Rng;
use tracing::{debug, info};

use crate::error::{CatalogError, Result};
use crate::record::parse_record;
use crate::resolver::Resolver;
use crate::selector::{try_select_one, Selection};
use crate::types::{CatalogRecord, ResolvedResource};

/// Choose one record from the catalog at `catalog_path`.
///
/// The file is closed before this returns.
pub fn select_record<R: Rng + ?Sized>(catalog_path: &Path, rng: &mut R) -> Result<CatalogRecord> {
    let file = File::open(catalog_path).map_err(|source| CatalogError::Unavailable {
        path: catalog_path.to_path_buf(),
        source,
    })?;

    let selection = try_select_one(BufReader::new(file).split(b'\n'), rng).map_err(|source| {
        CatalogError::Read {
            path: catalog_path.to_path_buf(),
            source,
        }
    })?;

    let Selection { mut item, position } =
        selection.ok_or_else(|| CatalogError::EmptySelection {
            path: catalog_path.to_path_buf(),
        })?;
    debug!("Selected line {} of {}", position, catalog_path.display());

    if item.last() == Some(&b'\r') {
        item.pop();
    }
    let line = String::from_utf8(item)
        .map_err(|_| CatalogError::InvalidEncoding { line: position })?;

    parse_record(&line, position)
}

/// Choose a record and open the image it refers to.
pub async fn pick_image<R: Rng + ?Sized>(
    catalog_path: &Path,
    resolver: &Resolver,
    rng: &mut R,
) -> Result<ResolvedResource> {
    let record = select_record(catalog_path, rng)?;
    let resource = resolver.resolve(record).await?;
    info!("Picked image {}", resource.location);
    Ok(resource)
}
