// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output tree management.

use std::fs;
use std::io;
use std::path::Path;

use lesewerk_core::OutputLayout;
use lesewerk_core::error::{LesewerkError, Result};
use tracing::debug;

/// Remove `dir` with everything in it (if present) and create it empty.
pub fn reset_tree(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => debug!(dir = %dir.display(), "Removed previous output"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(LesewerkError::Config(format!(
                "cannot clear {}: {}",
                dir.display(),
                err
            )));
        }
    }
    ensure_dir(dir)
}

/// Create `dir` and its parents if needed.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|err| {
        LesewerkError::Config(format!("cannot create {}: {}", dir.display(), err))
    })
}

/// Reset all four output trees of `layout`.
pub fn reset_layout(layout: &OutputLayout) -> Result<()> {
    for root in layout.roots() {
        reset_tree(root)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_removes_stale_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let tree = dir.path().join("risultato");
        fs::create_dir_all(tree.join("old")).expect("mkdir");
        fs::write(tree.join("old").join("stale.txt"), "x").expect("write");

        reset_tree(&tree).expect("reset");

        assert!(tree.is_dir());
        assert_eq!(fs::read_dir(&tree).expect("list").count(), 0);
    }

    #[test]
    fn reset_creates_missing_tree() {
        let dir = tempfile::tempdir().expect("tempdir");
        let tree = dir.path().join("a").join("b");
        reset_tree(&tree).expect("reset");
        assert!(tree.is_dir());
    }

    #[test]
    fn reset_layout_touches_every_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let layout = OutputLayout::under(dir.path());
        reset_layout(&layout).expect("reset");
        for root in layout.roots() {
            assert!(root.is_dir(), "{} missing", root.display());
        }
    }
}
