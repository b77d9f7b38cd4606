//! Remove the output directory

use anyhow::{Context, Result};
use std::fs;

use crate::Site;

/// Delete the output directory if it exists
pub fn run(site: &Site) -> Result<()> {
    if site.output_dir.exists() {
        fs::remove_dir_all(&site.output_dir)
            .with_context(|| format!("Failed to delete {:?}", site.output_dir))?;
        tracing::info!("Deleted: {:?}", site.output_dir);
    } else {
        tracing::info!("Nothing to clean at {:?}", site.output_dir);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_site;

    #[test]
    fn test_clean_removes_output() {
        let (_dir, site) = sample_site();
        crate::commands::build::run(&site).unwrap();
        assert!(site.output_dir.join("index.html").exists());

        run(&site).unwrap();
        assert!(!site.output_dir.exists());
        assert!(site.input_dir.join("index.md").exists());

        // Cleaning twice is fine
        run(&site).unwrap();
    }
}
